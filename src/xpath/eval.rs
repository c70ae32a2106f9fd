//! Selector Evaluation Engine
//!
//! Evaluates compiled selectors against an owned markup tree. Nodes are
//! addressed by their child-index path from the root, so hits can be used
//! to mutate the tree after evaluation.

use super::parser::{Axis, NodeTest, Predicate, Selector, Step};
use crate::dom::node::{Element, MarkupNode};
use crate::dom::NamespaceResolver;
use crate::error::{Result, ValueError};
use std::cmp::Ordering;

/// A node selected by a selector
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Hit {
    /// The document node above the root
    Document,
    /// Node at a child-index path from the root
    Node(Vec<usize>),
    /// Attribute `index` of the element at a path
    Attribute(Vec<usize>, usize),
}

impl Hit {
    fn order_key(&self) -> (&[usize], u8, usize) {
        match self {
            Hit::Document => (&[][..], 0, 0),
            Hit::Node(path) => (path.as_slice(), 1, 0),
            Hit::Attribute(path, index) => (path.as_slice(), 2, *index),
        }
    }

    fn document_order(&self, other: &Hit) -> Ordering {
        self.order_key().cmp(&other.order_key())
    }
}

/// Evaluation context
struct EvalContext<'a> {
    root: &'a MarkupNode,
    scope: NamespaceResolver,
}

/// Evaluate a selector against `root`, returning hits in document order
///
/// A relative selector starts at `root`; an absolute one at the document node
/// above it. Prefixes resolve against the declarations made on `root`.
pub fn evaluate(selector: &Selector, root: &MarkupNode) -> Result<Vec<Hit>> {
    let mut scope = NamespaceResolver::new();
    if let Some(element) = root.as_element() {
        scope.enter(element.attributes());
    }
    if let Some(prefix) = selector.prefixes().find(|p| scope.resolve(p).is_none()) {
        return Err(ValueError::malformed_query(
            selector.source(),
            format!("prefix '{}' is not bound on the root element", prefix),
        ));
    }

    let ctx = EvalContext { root, scope };
    let mut current = vec![if selector.is_absolute() {
        Hit::Document
    } else {
        Hit::Node(Vec::new())
    }];

    for step in selector.steps() {
        let mut next = Vec::new();
        for context in &current {
            let mut candidates = ctx.navigate(context, step);
            for predicate in &step.predicates {
                candidates = ctx.filter(candidates, predicate);
            }
            next.extend(candidates);
        }
        next.sort_by(Hit::document_order);
        next.dedup();
        current = next;
        if current.is_empty() {
            break;
        }
    }

    Ok(current)
}

impl<'a> EvalContext<'a> {
    fn node(&self, path: &[usize]) -> Option<&'a MarkupNode> {
        self.root.at_path(path)
    }

    /// Candidates along `step.axis` from `context` that pass the node test
    fn navigate(&self, context: &Hit, step: &Step) -> Vec<Hit> {
        let test = &step.test;
        let mut out = Vec::new();
        match (context, step.axis) {
            (Hit::Document, Axis::Child) => self.push_if(&mut out, Vec::new(), test),
            (Hit::Document, Axis::Descendant) => self.descend(&mut out, Vec::new(), test),
            (Hit::Document, Axis::DescendantOrSelf) => {
                if *test == NodeTest::Node {
                    out.push(Hit::Document);
                }
                self.descend(&mut out, Vec::new(), test);
            }
            (Hit::Document, Axis::SelfNode) if *test == NodeTest::Node => out.push(Hit::Document),
            (Hit::Document, _) => {}

            (Hit::Node(path), Axis::Child) => {
                if let Some(element) = self.node(path).and_then(MarkupNode::as_element) {
                    for index in 0..element.children().len() {
                        self.push_if(&mut out, child_path(path, index), test);
                    }
                }
            }
            (Hit::Node(path), Axis::Descendant) => self.descend_children(&mut out, path, test),
            (Hit::Node(path), Axis::DescendantOrSelf) => {
                self.push_if(&mut out, path.clone(), test);
                self.descend_children(&mut out, path, test);
            }
            (Hit::Node(path), Axis::SelfNode) => self.push_if(&mut out, path.clone(), test),
            (Hit::Node(path), Axis::Parent) => match path.split_last() {
                Some((_, parent)) => self.push_if(&mut out, parent.to_vec(), test),
                None if *test == NodeTest::Node => out.push(Hit::Document),
                None => {}
            },
            (Hit::Node(path), Axis::Attribute) => {
                if let Some(element) = self.node(path).and_then(MarkupNode::as_element) {
                    for (index, attr) in element.attributes().attributes().iter().enumerate() {
                        if self.matches_attribute(attr.name.local_name(), attr.name.namespace(), test) {
                            out.push(Hit::Attribute(path.clone(), index));
                        }
                    }
                }
            }

            (Hit::Attribute(path, _), Axis::Parent) => self.push_if(&mut out, path.clone(), test),
            (Hit::Attribute(..), _) => {}
        }
        out
    }

    fn push_if(&self, out: &mut Vec<Hit>, path: Vec<usize>, test: &NodeTest) {
        if self.node(&path).is_some_and(|node| self.matches_node(node, test)) {
            out.push(Hit::Node(path));
        }
    }

    /// The node at `path` and everything below it, in document order
    fn descend(&self, out: &mut Vec<Hit>, path: Vec<usize>, test: &NodeTest) {
        self.push_if(out, path.clone(), test);
        self.descend_children(out, &path, test);
    }

    fn descend_children(&self, out: &mut Vec<Hit>, path: &[usize], test: &NodeTest) {
        let Some(element) = self.node(path).and_then(MarkupNode::as_element) else {
            return;
        };
        for index in 0..element.children().len() {
            self.descend(out, child_path(path, index), test);
        }
    }

    fn resolve(&self, prefix: &str) -> &str {
        // Prefixes were checked before evaluation started
        self.scope.resolve(prefix).unwrap_or_default()
    }

    fn matches_node(&self, node: &MarkupNode, test: &NodeTest) -> bool {
        match (test, node) {
            (NodeTest::Node, _) => true,
            (NodeTest::Text, MarkupNode::Text(_)) => true,
            (NodeTest::Comment, MarkupNode::Comment(_)) => true,
            (NodeTest::Name { prefix, local }, MarkupNode::Element(e)) => {
                e.name().local_name() == local.as_str()
                    && match prefix {
                        // Unprefixed names match in any namespace
                        None => true,
                        Some(p) => e.name().namespace() == Some(self.resolve(p)),
                    }
            }
            (NodeTest::Wildcard { prefix }, MarkupNode::Element(e)) => match prefix {
                None => true,
                Some(p) => e.name().namespace() == Some(self.resolve(p)),
            },
            _ => false,
        }
    }

    fn matches_attribute(&self, local: &str, namespace: Option<&str>, test: &NodeTest) -> bool {
        match test {
            NodeTest::Node => true,
            NodeTest::Name { prefix: None, local: name } => local == name.as_str() && namespace.is_none(),
            NodeTest::Name { prefix: Some(p), local: name } => {
                local == name.as_str() && namespace == Some(self.resolve(p))
            }
            NodeTest::Wildcard { prefix: None } => true,
            NodeTest::Wildcard { prefix: Some(p) } => namespace == Some(self.resolve(p)),
            NodeTest::Text | NodeTest::Comment => false,
        }
    }

    fn filter(&self, candidates: Vec<Hit>, predicate: &Predicate) -> Vec<Hit> {
        match predicate {
            Predicate::Position(n) => candidates.into_iter().nth(n - 1).into_iter().collect(),
            Predicate::Attribute { test, value } => candidates
                .into_iter()
                .filter(|hit| {
                    self.hit_element(hit).is_some_and(|e| {
                        e.attributes().attributes().iter().any(|a| {
                            self.matches_attribute(a.name.local_name(), a.name.namespace(), test)
                                && value.as_ref().is_none_or(|v| a.value == *v)
                        })
                    })
                })
                .collect(),
            Predicate::Child { test, value } => candidates
                .into_iter()
                .filter(|hit| {
                    self.hit_element(hit).is_some_and(|e| {
                        e.children().iter().any(|child| {
                            self.matches_node(child, test)
                                && value.as_ref().is_none_or(|v| child.string_value() == *v)
                        })
                    })
                })
                .collect(),
        }
    }

    fn hit_element(&self, hit: &Hit) -> Option<&'a Element> {
        match hit {
            Hit::Node(path) => self.node(path).and_then(MarkupNode::as_element),
            _ => None,
        }
    }
}

fn child_path(path: &[usize], index: usize) -> Vec<usize> {
    let mut child = Vec::with_capacity(path.len() + 1);
    child.extend_from_slice(path);
    child.push(index);
    child
}
