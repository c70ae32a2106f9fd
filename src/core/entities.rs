//! Markup Entity Codec
//!
//! Handles decoding of entity references:
//! - Built-in entities: &lt; &gt; &amp; &quot; &apos;
//! - Numeric character references: &#123; &#x7B;
//!
//! and escaping for serialization. Uses Cow for zero-copy when nothing
//! needs to change.

use memchr::{memchr, memchr3};
use std::borrow::Cow;

/// Decode text content, handling entity references
///
/// Returns Borrowed if no entities present (zero-copy),
/// returns Owned if entities were decoded.
#[inline]
pub fn decode_text(input: &str) -> Cow<'_, str> {
    // Fast path: check if there are any entities using SIMD
    if memchr(b'&', input.as_bytes()).is_none() {
        return Cow::Borrowed(input);
    }
    Cow::Owned(decode_entities(input))
}

/// Decode all entity references in the input
///
/// Unknown or unterminated references are kept as written.
pub fn decode_entities(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut result = String::with_capacity(input.len());
    let mut pos = 0;

    while let Some(amp_offset) = memchr(b'&', &bytes[pos..]) {
        let amp = pos + amp_offset;
        result.push_str(&input[pos..amp]);

        let decoded = memchr(b';', &bytes[amp..])
            .and_then(|semi| decode_entity(&input[amp + 1..amp + semi]).map(|c| (c, semi)));

        match decoded {
            Some((c, semi)) => {
                result.push(c);
                pos = amp + semi + 1;
            }
            None => {
                result.push('&');
                pos = amp + 1;
            }
        }
    }

    result.push_str(&input[pos..]);
    result
}

/// Decode a single entity (without & and ;)
fn decode_entity(entity: &str) -> Option<char> {
    if let Some(numeric) = entity.strip_prefix('#') {
        return decode_numeric_entity(numeric);
    }

    match entity {
        "lt" => Some('<'),
        "gt" => Some('>'),
        "amp" => Some('&'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => None,
    }
}

/// Decode a numeric character reference
fn decode_numeric_entity(entity: &str) -> Option<char> {
    let codepoint = match entity.strip_prefix(['x', 'X']) {
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        None => entity.parse::<u32>().ok()?,
    };

    if !is_valid_xml_char(codepoint) {
        return None;
    }
    char::from_u32(codepoint)
}

/// Check if a code point is a valid XML 1.0 Char
/// Char ::= #x9 | #xA | #xD | [#x20-#xD7FF] | [#xE000-#xFFFD] | [#x10000-#x10FFFF]
#[inline]
pub fn is_valid_xml_char(codepoint: u32) -> bool {
    matches!(codepoint,
        0x9 | 0xA | 0xD |
        0x20..=0xD7FF |
        0xE000..=0xFFFD |
        0x10000..=0x10FFFF
    )
}

/// Encode text for markup output (escape `<`, `>` and `&`)
pub fn encode_text(input: &str) -> Cow<'_, str> {
    // Fast path: check if any escaping needed
    if memchr3(b'<', b'>', b'&', input.as_bytes()).is_none() {
        return Cow::Borrowed(input);
    }

    let mut result = String::with_capacity(input.len() + 16);
    for c in input.chars() {
        match c {
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '&' => result.push_str("&amp;"),
            _ => result.push(c),
        }
    }
    Cow::Owned(result)
}

/// Encode text for use in double-quoted attribute values
pub fn encode_attribute(input: &str) -> Cow<'_, str> {
    if !input.bytes().any(|b| matches!(b, b'<' | b'>' | b'&' | b'"')) {
        return Cow::Borrowed(input);
    }

    let mut result = String::with_capacity(input.len() + 16);
    for c in input.chars() {
        match c {
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '&' => result.push_str("&amp;"),
            '"' => result.push_str("&quot;"),
            _ => result.push(c),
        }
    }
    Cow::Owned(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_entities() {
        let result = decode_text("Hello, World!");
        assert!(matches!(result, Cow::Borrowed(_)));
        assert_eq!(result, "Hello, World!");
    }

    #[test]
    fn test_basic_entities() {
        let result = decode_text("&lt;hello&gt; &amp; &quot;world&quot;");
        assert_eq!(result, "<hello> & \"world\"");
    }

    #[test]
    fn test_numeric_references() {
        assert_eq!(decode_text("&#65;&#66;&#67;"), "ABC");
        assert_eq!(decode_text("&#x41;&#x42;&#x43;"), "ABC");
        assert_eq!(decode_text("&#x1F600;"), "😀");
    }

    #[test]
    fn test_unknown_entity() {
        assert_eq!(decode_text("&unknown; & tail"), "&unknown; & tail");
        assert_eq!(decode_text("&#0;"), "&#0;");
    }

    #[test]
    fn test_encode_text() {
        assert_eq!(encode_text("<hello> & \"world\""), "&lt;hello&gt; &amp; \"world\"");
        assert!(matches!(encode_text("plain"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_encode_attribute() {
        assert_eq!(encode_attribute("say \"hi\" & <go>"), "say &quot;hi&quot; &amp; &lt;go&gt;");
    }
}
