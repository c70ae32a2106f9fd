//! Selector-driven reads and edits on markup values
//!
//! Every operation here needs a single root node; a sequence of any other
//! length fails with a query-on-sequence error. Edits apply to all hits in
//! reverse document order so earlier paths stay valid.

use super::eval::{evaluate, Hit};
use super::parser::Selector;
use crate::dom::namespace::detach;
use crate::dom::{Element, Markup, MarkupNode, NamespaceResolver};
use crate::error::{Result, ValueError};

impl Markup {
    /// Every hit as a sequence; attribute hits become text nodes
    pub fn select(&self, selector: &Selector) -> Result<Markup> {
        let root = self.single("select")?;
        let nodes = evaluate(selector, root)?
            .iter()
            .filter_map(|hit| hit_node(root, hit))
            .collect();
        Ok(Markup::collapse(nodes))
    }

    /// String value of the first hit
    pub fn select_string(&self, selector: &Selector) -> Result<String> {
        let root = self.single("get string")?;
        let hits = evaluate(selector, root)?;
        let first = hits.first().ok_or_else(|| no_match(selector))?;
        Ok(match first {
            Hit::Document => root.string_value(),
            Hit::Node(path) => root.at_path(path).map(MarkupNode::string_value).unwrap_or_default(),
            Hit::Attribute(path, index) => attribute_value(root, path, *index).unwrap_or_default(),
        })
    }

    /// First hit, which must be an element, as a standalone item
    pub fn select_markup(&self, selector: &Selector) -> Result<Markup> {
        let root = self.single("get markup")?;
        let hits = evaluate(selector, root)?;
        match hits.first() {
            None => Err(no_match(selector)),
            Some(Hit::Node(path)) => match root.at_path(path) {
                Some(node @ MarkupNode::Element(_)) => Ok(Markup::Item(detach(node))),
                _ => Err(not_element(selector)),
            },
            Some(_) => Err(not_element(selector)),
        }
    }

    /// Replace the content of every hit; nothing happens without a hit
    pub fn set_text_at(&mut self, selector: &Selector, text: &str) -> Result<()> {
        let root = self.single_mut("set string")?;
        let hits = evaluate(selector, root)?;
        for hit in hits.iter().rev() {
            match hit {
                Hit::Document => root.set_string_value(text),
                Hit::Node(path) => {
                    if let Some(node) = root.at_path_mut(path) {
                        node.set_string_value(text);
                    }
                }
                Hit::Attribute(path, index) => {
                    let attr = root
                        .at_path_mut(path)
                        .and_then(MarkupNode::as_element_mut)
                        .and_then(|e| e.attributes.attributes_mut().get_mut(*index));
                    if let Some(attr) = attr {
                        attr.value = text.to_string();
                    }
                }
            }
        }
        Ok(())
    }

    /// Replace the children of every hit; nothing happens without a hit
    pub fn set_children_at(&mut self, selector: &Selector, children: &Markup) -> Result<()> {
        let root = self.single_mut("set markup")?;
        let paths = element_paths(selector, root)?;
        for path in paths.iter().rev() {
            let scope = NamespaceResolver::for_path(root, path);
            if let Some(element) = element_at(root, path) {
                element.set_children_in(&scope, children.nodes().to_vec());
            }
        }
        Ok(())
    }

    /// Append `children` to every hit
    pub fn add_element_at(&mut self, selector: &Selector, children: &Markup) -> Result<()> {
        let root = self.single_mut("add element")?;
        let paths = element_paths(selector, root)?;
        if paths.is_empty() {
            return Err(no_match(selector));
        }
        for path in paths.iter().rev() {
            let scope = NamespaceResolver::for_path(root, path);
            if let Some(element) = element_at(root, path) {
                element.append_children_in(&scope, children.nodes().to_vec());
            }
        }
        Ok(())
    }

    /// Add or update an attribute on every hit
    ///
    /// Either every hit is updated or, on error, none is.
    pub fn add_attribute_at(
        &mut self,
        selector: &Selector,
        name: &str,
        value: &str,
        namespace: Option<&str>,
    ) -> Result<()> {
        let root = self.single_mut("add attribute")?;
        let paths = element_paths(selector, root)?;
        if paths.is_empty() {
            return Err(no_match(selector));
        }
        let mut working = root.clone();
        for path in paths.iter().rev() {
            let scope = NamespaceResolver::for_path(&working, path);
            if let Some(element) = element_at(&mut working, path) {
                element.add_attribute_in(&scope, name, value, namespace)?;
            }
        }
        *root = working;
        Ok(())
    }

    /// Remove every hit; nothing happens without a hit
    pub fn remove_at(&mut self, selector: &Selector) -> Result<()> {
        let root = self.single_mut("remove")?;
        let hits = evaluate(selector, root)?;
        if hits.iter().any(|hit| matches!(hit, Hit::Document) || *hit == Hit::Node(Vec::new())) {
            return Err(ValueError::QueryTarget {
                query: selector.source().to_string(),
                expected: "removable",
            });
        }
        for hit in hits.iter().rev() {
            match hit {
                Hit::Node(path) => {
                    if let Some((last, parent)) = path.split_last() {
                        if let Some(element) = element_at(root, parent) {
                            if *last < element.children.len() {
                                element.children.remove(*last);
                            }
                        }
                    }
                }
                Hit::Attribute(path, index) => {
                    if let Some(element) = element_at(root, path) {
                        element.attributes.remove_at(*index);
                    }
                }
                Hit::Document => {}
            }
        }
        Ok(())
    }
}

fn hit_node(root: &MarkupNode, hit: &Hit) -> Option<MarkupNode> {
    match hit {
        Hit::Document => Some(detach(root)),
        Hit::Node(path) => root.at_path(path).map(detach),
        Hit::Attribute(path, index) => attribute_value(root, path, *index).map(MarkupNode::Text),
    }
}

fn attribute_value(root: &MarkupNode, path: &[usize], index: usize) -> Option<String> {
    let element = root.at_path(path)?.as_element()?;
    element.attributes().attributes().get(index).map(|a| a.value.clone())
}

fn element_at<'a>(root: &'a mut MarkupNode, path: &[usize]) -> Option<&'a mut Element> {
    root.at_path_mut(path)?.as_element_mut()
}

/// Paths of every hit, all of which must be elements
fn element_paths(selector: &Selector, root: &MarkupNode) -> Result<Vec<Vec<usize>>> {
    evaluate(selector, root)?
        .into_iter()
        .map(|hit| match hit {
            Hit::Node(path) if root.at_path(&path).is_some_and(MarkupNode::is_element) => Ok(path),
            _ => Err(not_element(selector)),
        })
        .collect()
}

fn no_match(selector: &Selector) -> ValueError {
    ValueError::NoMatch {
        query: selector.source().to_string(),
    }
}

fn not_element(selector: &Selector) -> ValueError {
    ValueError::QueryTarget {
        query: selector.source().to_string(),
        expected: "an element",
    }
}
