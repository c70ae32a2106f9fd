//! Markup Event Types
//!
//! Event types for pull-parser style markup processing.

use crate::core::attributes::RawAttribute;
use std::borrow::Cow;

/// Markup parsing event
#[derive(Debug, Clone, PartialEq)]
pub enum MarkupEvent<'a> {
    /// Start of an element: <name attrs...>
    StartElement(StartTag<'a>),
    /// End of an element: </name>
    EndElement(&'a str),
    /// Empty element: <name attrs.../>
    EmptyElement(StartTag<'a>),
    /// Text content between tags (entities decoded)
    Text(Cow<'a, str>),
    /// CDATA section content
    CData(&'a str),
    /// Comment content
    Comment(&'a str),
    /// Processing instruction: <?target data?>
    ProcessingInstruction { target: &'a str, data: &'a str },
    /// XML declaration: <?xml version="1.0"?>
    Declaration,
    /// DOCTYPE declaration
    DocType,
}

/// Start tag data
#[derive(Debug, Clone, PartialEq)]
pub struct StartTag<'a> {
    /// Full element name (may include prefix)
    pub name: &'a str,
    /// Byte offset of the tag in the input
    pub position: usize,
    /// Element attributes, namespace declarations included
    pub attributes: Vec<RawAttribute<'a>>,
}

impl<'a> StartTag<'a> {
    /// Split the name into prefix and local name
    pub fn split_name(&self) -> (Option<&'a str>, &'a str) {
        match self.name.split_once(':') {
            Some((prefix, local)) => (Some(prefix), local),
            None => (None, self.name),
        }
    }
}
