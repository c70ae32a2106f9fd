//! Markup Values
//!
//! `Markup` is what the value model carries: either a single node or an
//! ordered sequence of nodes. A sequence of length one behaves exactly like
//! its sole item everywhere a single node is required.

use super::builder;
use super::namespace::detach;
use super::node::{split_expanded, Element, MarkupNode};
use super::serialize::write_node;
use crate::core::scanner::is_blank;
use crate::error::{Result, ValueError};
use indexmap::IndexMap;
use std::fmt;
use std::slice;

/// A single markup node or an ordered sequence of nodes
#[derive(Debug, Clone)]
pub enum Markup {
    Item(MarkupNode),
    Sequence(Vec<MarkupNode>),
}

impl PartialEq for Markup {
    fn eq(&self, other: &Self) -> bool {
        self.nodes() == other.nodes()
    }
}

impl Default for Markup {
    fn default() -> Self {
        Markup::empty()
    }
}

impl From<MarkupNode> for Markup {
    fn from(node: MarkupNode) -> Self {
        Markup::Item(node)
    }
}

impl From<Element> for Markup {
    fn from(element: Element) -> Self {
        Markup::Item(MarkupNode::Element(element))
    }
}

/// Element name filter: local name and namespace, each optional
///
/// An absent part matches anything; an empty namespace matches elements in
/// no namespace.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementFilter {
    local: Option<String>,
    namespace: Option<String>,
}

impl ElementFilter {
    /// Matches every element
    pub fn any() -> Self {
        Self::default()
    }

    /// Matches a local name in any namespace
    pub fn named(local: &str) -> Self {
        ElementFilter {
            local: Some(local.to_string()),
            namespace: None,
        }
    }

    /// Restrict to one namespace (`""` for no namespace)
    pub fn with_namespace(mut self, namespace: &str) -> Self {
        self.namespace = Some(namespace.to_string());
        self
    }

    /// Parse `{uri}local`, `local` or `*`
    pub fn parse(filter: &str) -> Self {
        let (namespace, local) = split_expanded(filter);
        ElementFilter {
            local: (local != "*").then(|| local.to_string()),
            namespace: namespace.map(str::to_string),
        }
    }

    pub fn matches(&self, element: &Element) -> bool {
        let local_ok = match &self.local {
            Some(local) => element.name.local_name() == local,
            None => true,
        };
        let namespace_ok = match &self.namespace {
            Some(ns) => element.name.namespace().unwrap_or("") == ns,
            None => true,
        };
        local_ok && namespace_ok
    }
}

impl Markup {
    /// Empty sequence
    pub fn empty() -> Self {
        Markup::Sequence(Vec::new())
    }

    pub fn from_nodes(nodes: Vec<MarkupNode>) -> Self {
        Markup::Sequence(nodes)
    }

    /// A single node as an item, anything else as a sequence
    pub fn collapse(mut nodes: Vec<MarkupNode>) -> Self {
        match nodes.pop() {
            Some(node) if nodes.is_empty() => Markup::Item(node),
            Some(node) => {
                nodes.push(node);
                Markup::Sequence(nodes)
            }
            None => Markup::empty(),
        }
    }

    /// Parse markup text
    pub fn parse(text: &str) -> Result<Markup> {
        Ok(Markup::collapse(builder::parse(text)?))
    }

    pub fn len(&self) -> usize {
        match self {
            Markup::Item(_) => 1,
            Markup::Sequence(nodes) => nodes.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Markup::Item(_) => false,
            Markup::Sequence(nodes) => nodes.is_empty(),
        }
    }

    pub fn is_singleton(&self) -> bool {
        self.len() == 1
    }

    pub fn nodes(&self) -> &[MarkupNode] {
        match self {
            Markup::Item(node) => slice::from_ref(node),
            Markup::Sequence(nodes) => nodes,
        }
    }

    pub fn into_nodes(self) -> Vec<MarkupNode> {
        match self {
            Markup::Item(node) => vec![node],
            Markup::Sequence(nodes) => nodes,
        }
    }

    /// The sole node, for operations that need exactly one
    pub fn single(&self, operation: &'static str) -> Result<&MarkupNode> {
        match self.nodes() {
            [node] => Ok(node),
            nodes => Err(ValueError::QueryOnSequence {
                operation,
                length: nodes.len(),
            }),
        }
    }

    pub fn single_mut(&mut self, operation: &'static str) -> Result<&mut MarkupNode> {
        let length = self.len();
        match self {
            Markup::Item(node) => Ok(node),
            Markup::Sequence(nodes) if length == 1 => Ok(&mut nodes[0]),
            Markup::Sequence(_) => Err(ValueError::QueryOnSequence { operation, length }),
        }
    }

    fn single_element(&self, operation: &'static str) -> Result<&Element> {
        let node = self.single(operation)?;
        node.as_element().ok_or(ValueError::Unsupported {
            operation,
            kind: node.kind().name(),
        })
    }

    fn single_element_mut(&mut self, operation: &'static str) -> Result<&mut Element> {
        let node = self.single_mut(operation)?;
        let kind = node.kind().name();
        node.as_element_mut()
            .ok_or(ValueError::Unsupported { operation, kind })
    }

    /// Item at `index`, detached from this sequence
    pub fn item(&self, index: usize) -> Result<Markup> {
        let nodes = self.nodes();
        nodes
            .get(index)
            .map(|node| Markup::Item(detach(node)))
            .ok_or(ValueError::IndexOutOfRange {
                index: index as i64,
                length: nodes.len(),
            })
    }

    /// `element`, `text`, `comment` or `pi`; empty for a non-singleton
    pub fn item_type(&self) -> &'static str {
        match self.nodes() {
            [node] => node.kind().name(),
            _ => "",
        }
    }

    /// Expanded name `{uri}local` of a single element
    pub fn element_name(&self) -> Result<String> {
        Ok(self.single_element("get element name")?.name.expanded())
    }

    /// String value of a single node
    pub fn text_value(&self) -> Result<String> {
        Ok(self.single("get text value")?.string_value())
    }

    /// Replace the content of a single node
    pub fn set_text(&mut self, text: &str) -> Result<()> {
        self.single_mut("set text value")?.set_string_value(text);
        Ok(())
    }

    /// Children of every element item, in order
    pub fn children(&self) -> Markup {
        self.collect_children(&ElementFilter::any(), false)
    }

    /// Element children matching `filter`, in order
    pub fn select_children(&self, filter: &ElementFilter) -> Markup {
        self.collect_children(filter, true)
    }

    fn collect_children(&self, filter: &ElementFilter, elements_only: bool) -> Markup {
        let nodes = self
            .nodes()
            .iter()
            .filter_map(MarkupNode::as_element)
            .flat_map(|e| e.children.iter())
            .filter(|child| match child.as_element() {
                Some(e) => !elements_only || filter.matches(e),
                None => !elements_only,
            })
            .map(detach)
            .collect();
        Markup::collapse(nodes)
    }

    /// Element items of this sequence matching `filter`
    pub fn elements(&self, filter: &ElementFilter) -> Markup {
        let nodes = self
            .nodes()
            .iter()
            .filter(|node| node.as_element().is_some_and(|e| filter.matches(e)))
            .map(detach)
            .collect();
        Markup::collapse(nodes)
    }

    /// Descendant elements of every element item, in document order
    ///
    /// Elements nested inside a match are visited too.
    pub fn select_descendants(&self, filter: &ElementFilter) -> Markup {
        let nodes = self
            .nodes()
            .iter()
            .filter_map(MarkupNode::as_element)
            .flat_map(|e| e.descendants())
            .filter(|e| filter.matches(e))
            .map(|e| detach(&MarkupNode::Element(e.clone())))
            .collect();
        Markup::collapse(nodes)
    }

    /// Replace the children of a single element
    pub fn set_children(&mut self, children: Markup) -> Result<()> {
        self.single_element_mut("set children")?
            .set_children(children.into_nodes());
        Ok(())
    }

    /// Items `start..end`; a negative bound means the start or end
    pub fn slice(&self, start: i64, end: i64) -> Result<Markup> {
        let length = self.len();
        let from = start.max(0);
        let to = if end < 0 { length as i64 } else { end };
        if from > to || to > length as i64 {
            return Err(ValueError::Range { start, end, length });
        }
        let nodes = self.nodes()[from as usize..to as usize]
            .iter()
            .map(detach)
            .collect();
        Ok(Markup::from_nodes(nodes))
    }

    /// Drop whitespace-only text items, and optionally comments and PIs
    pub fn strip(&self, drop_comments: bool, drop_pis: bool) -> Markup {
        let keep = |node: &&MarkupNode| match node {
            MarkupNode::Text(text) => !is_blank(text),
            MarkupNode::Comment(_) => !drop_comments,
            MarkupNode::ProcessingInstruction { .. } => !drop_pis,
            MarkupNode::Element(_) => true,
        };
        let nodes: Vec<MarkupNode> = self.nodes().iter().filter(keep).cloned().collect();
        match self {
            Markup::Item(_) => Markup::collapse(nodes),
            Markup::Sequence(_) => Markup::from_nodes(nodes),
        }
    }

    /// Concatenate sequences; adjacent text items merge
    pub fn concat(parts: impl IntoIterator<Item = Markup>) -> Markup {
        let mut nodes: Vec<MarkupNode> = Vec::new();
        for node in parts.into_iter().flat_map(Markup::into_nodes) {
            if let (Some(MarkupNode::Text(previous)), MarkupNode::Text(text)) = (nodes.last_mut(), &node) {
                previous.push_str(text);
                continue;
            }
            nodes.push(node);
        }
        Markup::from_nodes(nodes)
    }

    /// Attribute of a single element; `""` when it is not present
    pub fn get_attribute(&self, name: &str, namespace: Option<&str>) -> Result<String> {
        Ok(self
            .single_element("get attribute")?
            .get_attribute(name, namespace))
    }

    /// Add or update an attribute of a single element
    pub fn add_attribute(&mut self, name: &str, value: &str, namespace: Option<&str>) -> Result<()> {
        self.single_element_mut("set attribute")?
            .add_attribute(name, value, namespace)
    }

    /// Attributes and declarations of a single element keyed by expanded name
    pub fn attributes_map(&self) -> Result<IndexMap<String, String>> {
        Ok(self.single_element("get attributes")?.attributes.to_map())
    }
}

impl fmt::Display for Markup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for node in self.nodes() {
            write_node(f, node)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn markup(text: &str) -> Markup {
        Markup::parse(text).unwrap()
    }

    #[test]
    fn test_singleton_and_empty() {
        let item = markup("<a/>");
        assert!(item.is_singleton());
        assert!(!item.is_empty());
        assert!(Markup::empty().is_empty());
        assert_eq!(Markup::from_nodes(vec![MarkupNode::element("a")]), item);
        assert_eq!(markup("<a/><b/>").len(), 2);
    }

    #[test]
    fn test_query_on_sequence() {
        let seq = markup("<a/><b/>");
        let err = seq.text_value().unwrap_err();
        assert!(err.to_string().starts_with("cannot execute query on a sequence"));
        assert_eq!(seq.item_type(), "");
    }

    #[test]
    fn test_singleton_sequence_acts_as_node() {
        let mut seq = Markup::from_nodes(vec![MarkupNode::element("a")]);
        seq.set_text("hello").unwrap();
        assert_eq!(seq.text_value().unwrap(), "hello");
        assert_eq!(seq.item_type(), "element");
    }

    #[test]
    fn test_element_name() {
        let m = markup(r#"<p:a xmlns:p="http://p"/>"#);
        assert_eq!(m.element_name().unwrap(), "{http://p}a");
        let err = markup("text").element_name().unwrap_err();
        assert!(matches!(err, ValueError::Unsupported { kind: "text", .. }));
    }

    #[test]
    fn test_children_and_filters() {
        let m = markup(r#"<root xmlns:p="http://p"><a/>text<p:b/><a/></root>"#);
        assert_eq!(m.children().len(), 4);
        assert_eq!(m.select_children(&ElementFilter::named("a")).len(), 2);
        let b = m.select_children(&ElementFilter::parse("{http://p}b"));
        assert_eq!(b.to_string(), r#"<p:b xmlns:p="http://p"/>"#);
        assert_eq!(m.select_children(&ElementFilter::named("a").with_namespace("")).len(), 2);
        assert_eq!(m.select_children(&ElementFilter::named("b").with_namespace("")).len(), 0);
    }

    #[test]
    fn test_children_of_default_namespaced_parent() {
        let m = markup(r#"<r xmlns="http://d"><plain xmlns=""/><inner/></r>"#);
        assert_eq!(m.children().to_string(), r#"<plain/><inner xmlns="http://d"/>"#);
    }

    #[test]
    fn test_elements_of_sequence() {
        let m = markup("<a/>text<b/><!--c--><a/>");
        assert_eq!(m.elements(&ElementFilter::any()).len(), 3);
        assert_eq!(m.elements(&ElementFilter::parse("a")).len(), 2);
    }

    #[test]
    fn test_descendants_pre_order() {
        let m = markup("<r><a><b/><a/></a><c><a/></c></r>");
        let found = m.select_descendants(&ElementFilter::any());
        let names: Vec<String> = found
            .nodes()
            .iter()
            .map(|n| n.as_element().unwrap().name().local_name().to_string())
            .collect();
        assert_eq!(names, ["a", "b", "a", "c", "a"]);
        assert_eq!(m.select_descendants(&ElementFilter::named("a")).len(), 3);
    }

    #[test]
    fn test_slice_bounds() {
        let m = markup("<a/><b/><c/><d/><e/>");
        let err = m.slice(4, 10).unwrap_err();
        assert!(err.to_string().contains("[4,10]"));
        assert!(m.slice(3, 2).is_err());
        assert_eq!(m.slice(1, 3).unwrap().len(), 2);
        assert_eq!(m.slice(2, -1).unwrap().len(), 3);
        assert_eq!(m.slice(5, 5).unwrap().len(), 0);
    }

    #[test]
    fn test_strip() {
        let m = markup("<a/> <!--c--> <?p?><b/>");
        assert_eq!(m.strip(false, false).len(), 4);
        assert_eq!(m.strip(true, true).to_string(), "<a/><b/>");
        let single = markup("<a> </a>");
        assert!(single.strip(true, true).is_singleton());
    }

    #[test]
    fn test_concat_merges_text() {
        let joined = Markup::concat([markup("<a/>"), markup("x"), markup("y"), markup("<b/>")]);
        assert_eq!(joined.len(), 3);
        assert_eq!(joined.to_string(), "<a/>xy<b/>");
    }

    #[test]
    fn test_set_children_on_text_fails() {
        let mut m = markup("text");
        let err = m.set_children(markup("<a/>")).unwrap_err();
        assert!(matches!(err, ValueError::Unsupported { .. }));
    }

    #[test]
    fn test_set_children_keeps_namespaces() {
        let mut m = markup(r#"<ns0:name xmlns:ns0="http://test"/>"#);
        let child = markup(r#"<pre:residency xmlns:pre="http://code" citizen="true"/>"#);
        m.set_children(child).unwrap();
        let reparsed = markup(&m.to_string());
        assert_eq!(reparsed, m);
    }

    #[test]
    fn test_copy_is_independent() {
        let original = markup("<a><b>1</b></a>");
        let mut copy = original.clone();
        copy.set_text("changed").unwrap();
        assert_eq!(original.to_string(), "<a><b>1</b></a>");
        assert_eq!(copy.to_string(), "<a>changed</a>");
    }

    #[test]
    fn test_attribute_access() {
        let mut m = markup("<root/>");
        m.add_attribute("foo", "bar", Some("http://example.com")).unwrap();
        assert_eq!(m.to_string(), r#"<root xmlns:ns0="http://example.com" ns0:foo="bar"/>"#);
        assert_eq!(m.get_attribute("foo", Some("http://example.com")).unwrap(), "bar");
        assert_eq!(m.get_attribute("missing", None).unwrap(), "");
        let map = m.attributes_map().unwrap();
        assert_eq!(map.get("{http://example.com}foo").map(String::as_str), Some("bar"));
    }

    #[test]
    fn test_item_detaches() {
        let m = markup(r#"<root xmlns:p="http://p"><p:a/></root>"#).children();
        let item = m.item(0).unwrap();
        assert_eq!(item.to_string(), r#"<p:a xmlns:p="http://p"/>"#);
        assert!(m.item(3).is_err());
    }
}
