//! Slice Reader
//!
//! Pull parser over an in-memory `&str`. Names, comments and unescaped text
//! are borrowed straight from the input.

use super::events::{MarkupEvent, StartTag};
use crate::core::attributes::parse_attributes;
use crate::core::entities::decode_text;
use crate::core::scanner::Scanner;
use crate::error::{Result, ValueError};

/// Markup reader from a string slice
pub struct SliceReader<'a> {
    input: &'a str,
    scanner: Scanner<'a>,
}

impl<'a> SliceReader<'a> {
    pub fn new(input: &'a str) -> Self {
        SliceReader {
            input,
            scanner: Scanner::new(input),
        }
    }

    /// Current byte offset
    pub fn position(&self) -> usize {
        self.scanner.position()
    }

    /// Get the next markup event, or `None` at end of input
    pub fn next_event(&mut self) -> Result<Option<MarkupEvent<'a>>> {
        if self.scanner.is_eof() {
            return Ok(None);
        }

        let start = self.scanner.position();

        if self.scanner.peek() != Some(b'<') {
            let end = self.scanner.find_tag_start().unwrap_or(self.input.len());
            self.scanner.set_position(end);
            return Ok(Some(MarkupEvent::Text(decode_text(&self.input[start..end]))));
        }

        if self.scanner.starts_with("<!--") {
            self.scanner.advance(4);
            let end = self.expect("-->", start, "unterminated comment")?;
            return Ok(Some(MarkupEvent::Comment(&self.input[start + 4..end])));
        }

        if self.scanner.starts_with("<![CDATA[") {
            self.scanner.advance(9);
            let end = self.expect("]]>", start, "unterminated CDATA section")?;
            return Ok(Some(MarkupEvent::CData(&self.input[start + 9..end])));
        }

        if self.scanner.starts_with("<?") {
            self.scanner.advance(2);
            let end = self.expect("?>", start, "unterminated processing instruction")?;
            return Ok(Some(self.processing_instruction(start, &self.input[start + 2..end])?));
        }

        if self.scanner.starts_with("<!DOCTYPE") {
            let end = self
                .scanner
                .find_doctype_end()
                .ok_or_else(|| parse_error(start, "unterminated DOCTYPE"))?;
            self.scanner.set_position(end + 1);
            return Ok(Some(MarkupEvent::DocType));
        }

        if self.scanner.starts_with("</") {
            self.scanner.advance(2);
            let name = self
                .scanner
                .read_name()
                .ok_or_else(|| parse_error(start, "missing name in closing tag"))?;
            self.scanner.skip_whitespace();
            if self.scanner.peek() != Some(b'>') {
                return Err(parse_error(self.scanner.position(), "expected '>' after closing tag name"));
            }
            self.scanner.advance(1);
            return Ok(Some(MarkupEvent::EndElement(name)));
        }

        self.start_tag(start).map(Some)
    }

    /// Consume up to and including `terminator`, returning where it starts
    fn expect(&mut self, terminator: &str, start: usize, message: &'static str) -> Result<usize> {
        let end = self
            .scanner
            .find_str(terminator)
            .ok_or_else(|| parse_error(start, message))?;
        self.scanner.set_position(end + terminator.len());
        Ok(end)
    }

    fn processing_instruction(&self, start: usize, body: &'a str) -> Result<MarkupEvent<'a>> {
        let (target, data) = match body.find(|c: char| c.is_ascii_whitespace()) {
            Some(split) => (&body[..split], body[split..].trim_start()),
            None => (body, ""),
        };
        if target.is_empty() {
            return Err(parse_error(start, "processing instruction without a target"));
        }
        if target.eq_ignore_ascii_case("xml") {
            return Ok(MarkupEvent::Declaration);
        }
        Ok(MarkupEvent::ProcessingInstruction { target, data })
    }

    fn start_tag(&mut self, start: usize) -> Result<MarkupEvent<'a>> {
        self.scanner.advance(1); // Skip '<'
        let name = self
            .scanner
            .read_name()
            .ok_or_else(|| parse_error(start, "expected element name after '<'"))?;

        let attr_start = self.scanner.position();
        let end = self
            .scanner
            .find_tag_end_quoted()
            .ok_or_else(|| parse_error(start, "unterminated start tag"))?;
        self.scanner.set_position(end + 1);

        let mut body = &self.input[attr_start..end];
        let empty = body.ends_with('/');
        if empty {
            body = &body[..body.len() - 1];
        }

        let attributes = parse_attributes(body)
            .map_err(|(offset, message)| parse_error(attr_start + offset, message))?;
        let tag = StartTag {
            name,
            position: start,
            attributes,
        };

        Ok(if empty {
            MarkupEvent::EmptyElement(tag)
        } else {
            MarkupEvent::StartElement(tag)
        })
    }
}

fn parse_error(position: usize, detail: &str) -> ValueError {
    ValueError::Parse {
        position,
        detail: detail.to_string(),
    }
}

/// Parse markup text and return all events
pub fn parse_events(input: &str) -> Result<Vec<MarkupEvent<'_>>> {
    let mut reader = SliceReader::new(input);
    let mut events = Vec::new();
    while let Some(event) = reader.next_event()? {
        events.push(event);
    }
    Ok(events)
}
