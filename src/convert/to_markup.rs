//! Document to Markup conversion
//!
//! Object keys name elements, keys starting with the attribute prefix become
//! attributes, `#text` becomes character content and arrays repeat their key.
//! Namespace declarations arrive as `xmlns` attribute keys and are resolved
//! with the same scoped resolver the parser uses.

use super::options::ToMarkupOptions;
use crate::core::scanner::{is_ncname, is_qualified_name};
use crate::dom::node::split_qualified;
use crate::dom::{AttributeStore, Element, Markup, MarkupNode, NamespaceResolver, QName};
use crate::error::{Result, ValueError};
use serde_json::{Map, Value as Json};

const TEXT_KEY: &str = "#text";

/// Convert a document to markup
///
/// `null` yields the empty sequence, a scalar yields a text node and a
/// top-level array yields one entry element per item.
pub fn to_markup(document: &Json, options: &ToMarkupOptions) -> Result<Markup> {
    let converter = Converter { options };
    let scope = NamespaceResolver::new();
    let nodes = match document {
        Json::Null => Vec::new(),
        Json::Object(map) => converter.top_level(map, &scope)?,
        Json::Array(items) => {
            let mut nodes = Vec::with_capacity(items.len());
            for item in items {
                nodes.extend(converter.elements(&options.array_entry_tag_name, item, &scope)?);
            }
            nodes
        }
        scalar => {
            let text = scalar_text(scalar, TEXT_KEY)?;
            if text.is_empty() {
                Vec::new()
            } else {
                vec![MarkupNode::Text(text)]
            }
        }
    };
    Ok(Markup::collapse(nodes))
}

struct Converter<'a> {
    options: &'a ToMarkupOptions,
}

impl Converter<'_> {
    fn attribute_key<'k>(&self, key: &'k str) -> Option<&'k str> {
        if self.options.attribute_prefix.is_empty() {
            return None;
        }
        key.strip_prefix(self.options.attribute_prefix.as_str())
    }

    fn top_level(&self, map: &Map<String, Json>, scope: &NamespaceResolver) -> Result<Vec<MarkupNode>> {
        let mut nodes = Vec::new();
        for (key, value) in map {
            if key == TEXT_KEY {
                let text = scalar_text(value, key)?;
                if !text.is_empty() {
                    nodes.push(MarkupNode::Text(text));
                }
            } else if self.attribute_key(key).is_some() {
                return Err(ValueError::conversion(format!(
                    "attribute '{}' has no element to attach to",
                    key
                )));
            } else {
                nodes.extend(self.elements(key, value, scope)?);
            }
        }
        Ok(nodes)
    }

    /// Elements named `key`; an array repeats the name once per item
    fn elements(&self, key: &str, value: &Json, scope: &NamespaceResolver) -> Result<Vec<MarkupNode>> {
        match value {
            Json::Array(items) => items
                .iter()
                .map(|item| self.element(key, item, scope).map(MarkupNode::Element))
                .collect(),
            _ => Ok(vec![MarkupNode::Element(self.element(key, value, scope)?)]),
        }
    }

    fn element(&self, key: &str, value: &Json, scope: &NamespaceResolver) -> Result<Element> {
        if !is_qualified_name(key) {
            return Err(ValueError::conversion(format!("'{}' is not a valid element name", key)));
        }

        match value {
            Json::Object(map) => self.object_element(key, map, scope),
            Json::Array(items) => {
                // Nested arrays become entry elements under `key`
                let mut element = Element::new(resolve_element(key, scope)?);
                for item in items {
                    let nested = self.elements(&self.options.array_entry_tag_name, item, scope)?;
                    element.children.extend(nested);
                }
                Ok(element)
            }
            scalar => {
                let mut element = Element::new(resolve_element(key, scope)?);
                let text = scalar_text(scalar, key)?;
                if !text.is_empty() {
                    element.children.push(MarkupNode::Text(text));
                }
                Ok(element)
            }
        }
    }

    fn object_element(&self, key: &str, map: &Map<String, Json>, outer: &NamespaceResolver) -> Result<Element> {
        // Declarations first so the element's own name can use them
        let mut store = AttributeStore::new();
        for (entry, value) in map {
            if entry == TEXT_KEY {
                continue;
            }
            let Some(attr) = self.attribute_key(entry) else { continue };
            if attr == "xmlns" {
                store.declare(None, &scalar_text(value, entry)?);
            } else if let Some(prefix) = attr.strip_prefix("xmlns:") {
                if !is_ncname(prefix) || prefix == "xml" || prefix == "xmlns" {
                    return Err(ValueError::conversion(format!("cannot declare namespace prefix '{}'", prefix)));
                }
                let uri = scalar_text(value, entry)?;
                if uri.is_empty() {
                    return Err(ValueError::conversion(format!("prefix '{}' cannot be bound to an empty namespace", prefix)));
                }
                store.declare(Some(prefix), &uri);
            }
        }

        let mut scope = outer.clone();
        scope.enter(&store);

        let mut element = Element::new(resolve_element(key, &scope)?);
        element.attributes = store;

        for (entry, value) in map {
            if entry == TEXT_KEY {
                let text = scalar_text(value, entry)?;
                if !text.is_empty() {
                    element.children.push(MarkupNode::Text(text));
                }
            } else if let Some(attr) = self.attribute_key(entry) {
                if attr == "xmlns" || attr.starts_with("xmlns:") {
                    continue;
                }
                if value.is_null() {
                    continue;
                }
                let name = resolve_attribute(attr, &scope)?;
                element.attributes.set(name, &scalar_text(value, entry)?);
            } else {
                let children = self.elements(entry, value, &scope)?;
                element.children.extend(children);
            }
        }
        Ok(element)
    }
}

fn resolve_element(key: &str, scope: &NamespaceResolver) -> Result<QName> {
    let (prefix, local) = split_qualified(key);
    let namespace = match prefix {
        Some(p) => Some(
            scope
                .resolve(p)
                .ok_or_else(|| ValueError::conversion(format!("prefix '{}' of element '{}' is not bound", p, key)))?,
        ),
        None => scope.resolve_default(),
    };
    Ok(QName::new(local, namespace, prefix))
}

fn resolve_attribute(name: &str, scope: &NamespaceResolver) -> Result<QName> {
    if !is_qualified_name(name) {
        return Err(ValueError::conversion(format!("'{}' is not a valid attribute name", name)));
    }
    let (prefix, local) = split_qualified(name);
    match prefix {
        Some(p) => {
            let uri = scope
                .resolve(p)
                .ok_or_else(|| ValueError::conversion(format!("prefix '{}' of attribute '{}' is not bound", p, name)))?;
            Ok(QName::new(local, Some(uri), Some(p)))
        }
        None => Ok(QName::local(local)),
    }
}

/// Character content for a scalar; objects and arrays cannot be flattened
fn scalar_text(value: &Json, key: &str) -> Result<String> {
    match value {
        Json::Null => Ok(String::new()),
        Json::String(s) => Ok(s.clone()),
        Json::Bool(b) => Ok(b.to_string()),
        Json::Number(n) => Ok(n.to_string()),
        Json::Array(_) | Json::Object(_) => Err(ValueError::conversion(format!(
            "'{}' must hold a scalar value",
            key
        ))),
    }
}
