//! Tree Builder
//!
//! Drives the slice reader and assembles owned nodes, resolving every
//! element and attribute prefix against the namespace scope stack as tags
//! are opened.

use super::attributes::AttributeStore;
use super::namespace::{ns, NamespaceResolver};
use super::node::{Element, MarkupNode, QName};
use crate::core::attributes::RawAttribute;
use crate::core::scanner::is_blank;
use crate::error::{Result, ValueError};
use crate::reader::{MarkupEvent, SliceReader, StartTag};

/// Parse markup text into top-level nodes
pub fn parse(input: &str) -> Result<Vec<MarkupNode>> {
    let mut reader = SliceReader::new(input);
    let mut builder = TreeBuilder::new();

    while let Some(event) = reader.next_event()? {
        match event {
            MarkupEvent::StartElement(tag) => {
                let element = builder.open(&tag)?;
                builder.stack.push(element);
            }
            MarkupEvent::EmptyElement(tag) => {
                let element = builder.open(&tag)?;
                builder.resolver.pop_scope();
                builder.append(MarkupNode::Element(element));
            }
            MarkupEvent::EndElement(name) => builder.close(name, reader.position())?,
            MarkupEvent::Text(text) => builder.text(&text),
            MarkupEvent::CData(text) => builder.text(text),
            MarkupEvent::Comment(text) => builder.append(MarkupNode::Comment(text.to_string())),
            MarkupEvent::ProcessingInstruction { target, data } => {
                builder.append(MarkupNode::ProcessingInstruction {
                    target: target.to_string(),
                    data: data.to_string(),
                })
            }
            MarkupEvent::Declaration | MarkupEvent::DocType => builder.after_prolog = true,
        }
    }

    if let Some(open) = builder.stack.last() {
        return Err(ValueError::Parse {
            position: input.len(),
            detail: format!("unclosed element '{}'", open.name),
        });
    }
    Ok(builder.top)
}

struct TreeBuilder {
    resolver: NamespaceResolver,
    /// Open elements, innermost last
    stack: Vec<Element>,
    /// Completed top-level nodes
    top: Vec<MarkupNode>,
    /// Set after a declaration or DOCTYPE; whitespace that follows is layout
    after_prolog: bool,
}

impl TreeBuilder {
    fn new() -> Self {
        TreeBuilder {
            resolver: NamespaceResolver::new(),
            stack: Vec::new(),
            top: Vec::new(),
            after_prolog: false,
        }
    }

    /// Build an element from a start tag and enter its scope
    fn open(&mut self, tag: &StartTag<'_>) -> Result<Element> {
        let mut store = AttributeStore::new();

        // First pass: namespace declarations
        for attr in &tag.attributes {
            match (attr.prefix(), attr.local_name()) {
                (None, "xmlns") => store.declare(None, &attr.value),
                (Some("xmlns"), prefix) => {
                    check_declaration(tag, prefix, &attr.value)?;
                    if prefix != "xml" {
                        store.declare(Some(prefix), &attr.value);
                    }
                }
                _ => {}
            }
        }
        self.resolver.enter(&store);

        let (prefix, local) = tag.split_name();
        let namespace = match prefix {
            Some(p) => Some(self.resolve(tag, p)?),
            None => self.resolver.resolve_default(),
        };
        let name = QName::new(local, namespace, prefix);

        // Second pass: ordinary attributes
        for attr in &tag.attributes {
            if is_declaration(attr) {
                continue;
            }
            let name = match attr.prefix() {
                Some(p) => QName::new(attr.local_name(), Some(self.resolve(tag, p)?), Some(p)),
                None => QName::local(attr.name),
            };
            if store.get(name.local_name(), name.namespace()).is_some() {
                return Err(ValueError::Parse {
                    position: tag.position,
                    detail: format!("duplicate attribute '{}' on element '{}'", attr.name, tag.name),
                });
            }
            store.set(name, &attr.value);
        }

        let mut element = Element::new(name);
        element.attributes = store;
        Ok(element)
    }

    fn resolve(&self, tag: &StartTag<'_>, prefix: &str) -> Result<&str> {
        self.resolver.resolve(prefix).ok_or_else(|| ValueError::Parse {
            position: tag.position,
            detail: format!("prefix '{}' is not bound to a namespace", prefix),
        })
    }

    fn close(&mut self, name: &str, position: usize) -> Result<()> {
        let element = self.stack.pop().ok_or_else(|| ValueError::Parse {
            position,
            detail: format!("closing tag '{}' without an open element", name),
        })?;
        if element.name.lexical() != name {
            return Err(ValueError::Parse {
                position,
                detail: format!("expected '</{}>', found '</{}>'", element.name, name),
            });
        }
        self.resolver.pop_scope();
        self.append(MarkupNode::Element(element));
        Ok(())
    }

    fn text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if self.stack.is_empty() && self.after_prolog && is_blank(text) {
            return;
        }
        self.append(MarkupNode::Text(text.to_string()));
    }

    /// Append to the innermost open element, merging adjacent text
    fn append(&mut self, node: MarkupNode) {
        let nodes = match self.stack.last_mut() {
            Some(parent) => &mut parent.children,
            None => {
                self.after_prolog = false;
                &mut self.top
            }
        };
        if let (Some(MarkupNode::Text(previous)), MarkupNode::Text(text)) = (nodes.last_mut(), &node) {
            previous.push_str(text);
            return;
        }
        nodes.push(node);
    }
}

#[inline]
fn is_declaration(attr: &RawAttribute<'_>) -> bool {
    attr.name == "xmlns" || attr.prefix() == Some("xmlns")
}

fn check_declaration(tag: &StartTag<'_>, prefix: &str, uri: &str) -> Result<()> {
    let problem = match prefix {
        "xml" if uri != ns::XML => Some("prefix 'xml' cannot be rebound"),
        "xmlns" => Some("prefix 'xmlns' cannot be declared"),
        _ if uri.is_empty() => Some("a prefixed namespace declaration cannot be empty"),
        _ => None,
    };
    match problem {
        Some(detail) => Err(ValueError::Parse {
            position: tag.position,
            detail: detail.to_string(),
        }),
        None => Ok(()),
    }
}
