//! Attribute Tokenizing
//!
//! Splits the inside of a start tag into raw name/value pairs. Names are left
//! unresolved; the tree builder binds prefixes once every declaration on the
//! tag has been seen.

use super::entities::decode_text;
use super::scanner::{is_name_byte, is_name_start_byte, is_whitespace};
use std::borrow::Cow;

/// A raw attribute as written in a start tag
#[derive(Debug, Clone, PartialEq)]
pub struct RawAttribute<'a> {
    /// Attribute name (may include namespace prefix)
    pub name: &'a str,
    /// Attribute value (entities decoded)
    pub value: Cow<'a, str>,
}

impl<'a> RawAttribute<'a> {
    /// Namespace prefix (before colon), if any
    pub fn prefix(&self) -> Option<&'a str> {
        self.name.split_once(':').map(|(p, _)| p)
    }

    /// Local name (after colon)
    pub fn local_name(&self) -> &'a str {
        self.name.split_once(':').map_or(self.name, |(_, l)| l)
    }
}

/// Parse attributes from raw tag content (after the element name)
///
/// Returns the byte offset of the problem and a message when the content is
/// not a well-formed attribute list.
pub fn parse_attributes(input: &str) -> Result<Vec<RawAttribute<'_>>, (usize, &'static str)> {
    let bytes = input.as_bytes();
    let mut attrs = Vec::new();
    let mut pos = 0;

    loop {
        let ws_start = pos;
        while pos < bytes.len() && is_whitespace(bytes[pos]) {
            pos += 1;
        }
        if pos >= bytes.len() {
            break;
        }
        if pos == ws_start && !attrs.is_empty() {
            return Err((pos, "attributes must be separated by whitespace"));
        }

        // Attribute name
        let name_start = pos;
        if !is_name_start_byte(bytes[pos]) {
            return Err((pos, "attribute name must start with a letter, underscore, or colon"));
        }
        while pos < bytes.len() && is_name_byte(bytes[pos]) {
            pos += 1;
        }
        let name = &input[name_start..pos];

        // Skip whitespace around '='
        while pos < bytes.len() && is_whitespace(bytes[pos]) {
            pos += 1;
        }
        if pos >= bytes.len() || bytes[pos] != b'=' {
            return Err((pos, "attribute value required"));
        }
        pos += 1;
        while pos < bytes.len() && is_whitespace(bytes[pos]) {
            pos += 1;
        }

        // Quoted value
        let quote = match bytes.get(pos) {
            Some(&q) if q == b'"' || q == b'\'' => q,
            _ => return Err((pos, "attribute value must be quoted")),
        };
        pos += 1;
        let value_start = pos;
        while pos < bytes.len() && bytes[pos] != quote {
            if bytes[pos] == b'<' {
                return Err((pos, "attribute value cannot contain '<'"));
            }
            pos += 1;
        }
        if pos >= bytes.len() {
            return Err((value_start, "attribute value has mismatched quotes"));
        }

        attrs.push(RawAttribute {
            name,
            value: decode_text(&input[value_start..pos]),
        });
        pos += 1; // Skip closing quote
    }

    Ok(attrs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_attributes() {
        let attrs = parse_attributes(" id=\"test\" class='foo'").unwrap();
        assert_eq!(attrs.len(), 2);
        assert_eq!(attrs[0].name, "id");
        assert_eq!(attrs[0].value, "test");
        assert_eq!(attrs[1].name, "class");
        assert_eq!(attrs[1].value, "foo");
    }

    #[test]
    fn test_namespaced_attribute() {
        let attrs = parse_attributes(" xmlns:xlink=\"http://www.w3.org/1999/xlink\"").unwrap();
        assert_eq!(attrs[0].prefix(), Some("xmlns"));
        assert_eq!(attrs[0].local_name(), "xlink");
    }

    #[test]
    fn test_entity_in_value() {
        let attrs = parse_attributes(" title=\"&lt;hello&gt;\"").unwrap();
        assert_eq!(attrs[0].value, "<hello>");
    }

    #[test]
    fn test_whitespace_handling() {
        let attrs = parse_attributes("  id  =  \"test\"  ").unwrap();
        assert_eq!(attrs.len(), 1);
        assert_eq!(attrs[0].value, "test");
    }

    #[test]
    fn test_malformed() {
        assert!(parse_attributes(" id=test").is_err());
        assert!(parse_attributes(" id").is_err());
        assert!(parse_attributes(" id=\"open").is_err());
        assert!(parse_attributes(" a=\"1\"b=\"2\"").is_err());
        assert!(parse_attributes("").unwrap().is_empty());
    }
}
