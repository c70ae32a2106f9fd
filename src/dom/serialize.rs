//! Markup Serialization
//!
//! Writes nodes back to markup text. Namespace declarations are written
//! before ordinary attributes; elements without children use `/>`.

use super::attributes::StoreEntry;
use super::node::{Element, MarkupNode};
use crate::core::entities::{encode_attribute, encode_text};
use std::fmt::{self, Write};

/// Write one node and its subtree
pub fn write_node<W: Write>(out: &mut W, node: &MarkupNode) -> fmt::Result {
    match node {
        MarkupNode::Element(element) => write_element(out, element),
        MarkupNode::Text(text) => out.write_str(&encode_text(text)),
        MarkupNode::Comment(text) => write!(out, "<!--{}-->", text),
        MarkupNode::ProcessingInstruction { target, data } if data.is_empty() => {
            write!(out, "<?{}?>", target)
        }
        MarkupNode::ProcessingInstruction { target, data } => write!(out, "<?{} {}?>", target, data),
    }
}

fn write_element<W: Write>(out: &mut W, element: &Element) -> fmt::Result {
    write!(out, "<{}", element.name)?;
    for entry in element.attributes.iter() {
        match entry {
            StoreEntry::Declaration(decl) => {
                write!(out, " {}=\"{}\"", decl.attribute_name(), encode_attribute(&decl.uri))?
            }
            StoreEntry::Attribute(attr) => {
                write!(out, " {}=\"{}\"", attr.name, encode_attribute(&attr.value))?
            }
        }
    }

    if element.children.is_empty() {
        return out.write_str("/>");
    }
    out.write_char('>')?;
    for child in &element.children {
        write_node(out, child)?;
    }
    write!(out, "</{}>", element.name)
}

/// Serialize a run of nodes
pub fn to_markup_string(nodes: &[MarkupNode]) -> String {
    let mut out = String::new();
    for node in nodes {
        // Writing into a String cannot fail
        let _ = write_node(&mut out, node);
    }
    out
}

impl fmt::Display for MarkupNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_node(f, self)
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_element(f, self)
    }
}
