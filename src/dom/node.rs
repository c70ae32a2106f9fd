//! Markup Node representation
//!
//! Owned tree nodes. Every element and attribute name carries the namespace
//! URI it resolved to when it was built, so a subtree can be moved between
//! parents and the declarations it needs can be recomputed from the names.

use super::attributes::AttributeStore;
use std::fmt;

/// Type of markup node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Element node
    Element,
    /// Text content (CDATA sections are read as text)
    Text,
    /// Comment
    Comment,
    /// Processing instruction
    ProcessingInstruction,
}

impl NodeKind {
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Element => "element",
            NodeKind::Text => "text",
            NodeKind::Comment => "comment",
            NodeKind::ProcessingInstruction => "pi",
        }
    }
}

/// Qualified name: local name, namespace URI and the prefix used to write it
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QName {
    local: String,
    namespace: Option<String>,
    prefix: Option<String>,
}

impl QName {
    /// Name in no namespace
    pub fn local(local: &str) -> Self {
        QName {
            local: local.to_string(),
            namespace: None,
            prefix: None,
        }
    }

    /// Name in `namespace`, written with `prefix` (or the default namespace when `None`)
    ///
    /// An empty namespace is the same as no namespace.
    pub fn new(local: &str, namespace: Option<&str>, prefix: Option<&str>) -> Self {
        QName {
            local: local.to_string(),
            namespace: namespace.filter(|ns| !ns.is_empty()).map(str::to_string),
            prefix: prefix.filter(|p| !p.is_empty()).map(str::to_string),
        }
    }

    pub fn local_name(&self) -> &str {
        &self.local
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    pub(crate) fn set_prefix(&mut self, prefix: Option<&str>) {
        self.prefix = prefix.map(str::to_string);
    }

    /// Name as written in markup: `prefix:local` or `local`
    pub fn lexical(&self) -> String {
        match &self.prefix {
            Some(p) => format!("{}:{}", p, self.local),
            None => self.local.clone(),
        }
    }

    /// Expanded name: `{uri}local`, or just `local` outside any namespace
    pub fn expanded(&self) -> String {
        match &self.namespace {
            Some(ns) => format!("{{{}}}{}", ns, self.local),
            None => self.local.clone(),
        }
    }
}

/// Split `prefix:local` into its parts
#[inline]
pub fn split_qualified(name: &str) -> (Option<&str>, &str) {
    match name.split_once(':') {
        Some((prefix, local)) => (Some(prefix), local),
        None => (None, name),
    }
}

/// Split an expanded name `{uri}local` into its parts
pub fn split_expanded(name: &str) -> (Option<&str>, &str) {
    if let Some(rest) = name.strip_prefix('{') {
        if let Some((uri, local)) = rest.split_once('}') {
            return (Some(uri), local);
        }
    }
    (None, name)
}

/// An element: name, attributes with namespace declarations, children
#[derive(Debug, Clone)]
pub struct Element {
    pub(crate) name: QName,
    pub(crate) attributes: AttributeStore,
    pub(crate) children: Vec<MarkupNode>,
    /// Next candidate for a synthesized `nsN` prefix on this element
    pub(crate) next_prefix: u32,
}

impl PartialEq for Element {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.attributes == other.attributes
            && self.children == other.children
    }
}

impl Element {
    /// Create an element with no attributes and no children
    pub fn new(name: QName) -> Self {
        Element {
            name,
            attributes: AttributeStore::new(),
            children: Vec::new(),
            next_prefix: 0,
        }
    }

    pub fn name(&self) -> &QName {
        &self.name
    }

    pub fn attributes(&self) -> &AttributeStore {
        &self.attributes
    }

    pub fn children(&self) -> &[MarkupNode] {
        &self.children
    }

    /// Append a child without any namespace bookkeeping
    pub fn push(&mut self, child: MarkupNode) {
        self.children.push(child);
    }

    /// Builder form of `push`
    pub fn with_child(mut self, child: MarkupNode) -> Self {
        self.children.push(child);
        self
    }

    /// Concatenated text of every descendant text node
    pub fn text(&self) -> String {
        let mut out = String::new();
        collect_text(&self.children, &mut out);
        out
    }

    /// Replace all children with a single text node
    pub fn set_text(&mut self, text: &str) {
        self.children.clear();
        if !text.is_empty() {
            self.children.push(MarkupNode::Text(text.to_string()));
        }
    }

    /// Pre-order iterator over descendant elements, excluding `self`
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants {
            stack: self.children.iter().rev().collect(),
        }
    }
}

fn collect_text(nodes: &[MarkupNode], out: &mut String) {
    for node in nodes {
        match node {
            MarkupNode::Text(t) => out.push_str(t),
            MarkupNode::Element(e) => collect_text(&e.children, out),
            MarkupNode::Comment(_) | MarkupNode::ProcessingInstruction { .. } => {}
        }
    }
}

/// Iterator over descendant elements in document order
pub struct Descendants<'a> {
    stack: Vec<&'a MarkupNode>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(node) = self.stack.pop() {
            if let MarkupNode::Element(e) = node {
                self.stack.extend(e.children.iter().rev());
                return Some(e);
            }
        }
        None
    }
}

/// A markup tree node
#[derive(Debug, Clone, PartialEq)]
pub enum MarkupNode {
    Element(Element),
    Text(String),
    Comment(String),
    ProcessingInstruction { target: String, data: String },
}

impl MarkupNode {
    /// Element with the given local name and no namespace
    pub fn element(local: &str) -> Self {
        MarkupNode::Element(Element::new(QName::local(local)))
    }

    pub fn text(text: &str) -> Self {
        MarkupNode::Text(text.to_string())
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            MarkupNode::Element(_) => NodeKind::Element,
            MarkupNode::Text(_) => NodeKind::Text,
            MarkupNode::Comment(_) => NodeKind::Comment,
            MarkupNode::ProcessingInstruction { .. } => NodeKind::ProcessingInstruction,
        }
    }

    #[inline]
    pub fn is_element(&self) -> bool {
        matches!(self, MarkupNode::Element(_))
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            MarkupNode::Element(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            MarkupNode::Element(e) => Some(e),
            _ => None,
        }
    }

    /// String value: descendant text for elements, content otherwise
    pub fn string_value(&self) -> String {
        match self {
            MarkupNode::Element(e) => e.text(),
            MarkupNode::Text(t) | MarkupNode::Comment(t) => t.clone(),
            MarkupNode::ProcessingInstruction { data, .. } => data.clone(),
        }
    }

    /// Replace the textual content of this node
    pub fn set_string_value(&mut self, value: &str) {
        match self {
            MarkupNode::Element(e) => e.set_text(value),
            MarkupNode::Text(t) | MarkupNode::Comment(t) => *t = value.to_string(),
            MarkupNode::ProcessingInstruction { data, .. } => *data = value.to_string(),
        }
    }

    /// Child node at `path`, each entry an index into `children`
    pub(crate) fn at_path(&self, path: &[usize]) -> Option<&MarkupNode> {
        let mut node = self;
        for &index in path {
            node = node.as_element()?.children.get(index)?;
        }
        Some(node)
    }

    pub(crate) fn at_path_mut(&mut self, path: &[usize]) -> Option<&mut MarkupNode> {
        let mut node = self;
        for &index in path {
            node = node.as_element_mut()?.children.get_mut(index)?;
        }
        Some(node)
    }
}

impl From<Element> for MarkupNode {
    fn from(e: Element) -> Self {
        MarkupNode::Element(e)
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.prefix {
            Some(p) => write!(f, "{}:{}", p, self.local),
            None => f.write_str(&self.local),
        }
    }
}
