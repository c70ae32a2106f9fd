//! Markup to Document conversion
//!
//! Elements become single-key objects, attributes become prefixed keys, and
//! repeated sibling names collect into arrays in document order.

use super::options::ToDocumentOptions;
use crate::core::scanner::is_blank;
use crate::dom::attributes::StoreEntry;
use crate::dom::{Element, Markup, MarkupNode};
use indexmap::IndexMap;
use serde_json::{Map, Value as Json};

/// Convert markup to a document
///
/// An empty sequence, a comment and a processing instruction all convert to
/// an empty object.
pub fn to_document(markup: &Markup, options: &ToDocumentOptions) -> Json {
    match markup.nodes() {
        [] => Json::Object(Map::new()),
        [node] => node_value(node, options),
        nodes => sequence_value(nodes, options),
    }
}

fn node_value(node: &MarkupNode, options: &ToDocumentOptions) -> Json {
    match node {
        MarkupNode::Element(element) => {
            let mut map = Map::new();
            map.insert(element_key(element, options), element_value(element, options));
            Json::Object(map)
        }
        MarkupNode::Text(text) => Json::String(text.clone()),
        MarkupNode::Comment(_) | MarkupNode::ProcessingInstruction { .. } => Json::Object(Map::new()),
    }
}

fn sequence_value(nodes: &[MarkupNode], options: &ToDocumentOptions) -> Json {
    let has_elements = nodes.iter().any(MarkupNode::is_element);
    let kept: Vec<&MarkupNode> = nodes
        .iter()
        .filter(|node| match node {
            MarkupNode::Element(_) => true,
            MarkupNode::Text(text) => !(has_elements && is_blank(text)),
            MarkupNode::Comment(_) | MarkupNode::ProcessingInstruction { .. } => false,
        })
        .collect();

    if kept.is_empty() {
        return Json::Object(Map::new());
    }
    if kept.iter().all(|node| node.is_element()) {
        let elements = kept.iter().filter_map(|node| node.as_element());
        return Json::Object(group_elements(elements, options));
    }

    // Text stays in place; every element merges into one object at the first
    // element's position
    let mut entries = Vec::with_capacity(kept.len());
    let mut grouped = false;
    for node in &kept {
        match node {
            MarkupNode::Text(text) => entries.push(Json::String(text.clone())),
            MarkupNode::Element(_) if !grouped => {
                grouped = true;
                let elements = kept.iter().filter_map(|node| node.as_element());
                entries.push(Json::Object(group_elements(elements, options)));
            }
            _ => {}
        }
    }
    Json::Array(entries)
}

/// Merge sibling elements into one object, one key per distinct name
fn group_elements<'a>(
    elements: impl Iterator<Item = &'a Element>,
    options: &ToDocumentOptions,
) -> Map<String, Json> {
    let mut grouped: IndexMap<String, Vec<Json>> = IndexMap::new();
    for element in elements {
        grouped
            .entry(element_key(element, options))
            .or_default()
            .push(element_value(element, options));
    }

    grouped
        .into_iter()
        .map(|(key, mut values)| {
            let value = if values.len() == 1 {
                values.remove(0)
            } else {
                Json::Array(values)
            };
            (key, value)
        })
        .collect()
}

fn element_key(element: &Element, options: &ToDocumentOptions) -> String {
    if options.preserve_namespaces {
        element.name().lexical()
    } else {
        element.name().local_name().to_string()
    }
}

fn element_value(element: &Element, options: &ToDocumentOptions) -> Json {
    let mut map = Map::new();
    let prefix = &options.attribute_prefix;

    for entry in element.attributes().iter() {
        match entry {
            StoreEntry::Declaration(decl) if options.preserve_namespaces => {
                map.insert(format!("{}{}", prefix, decl.attribute_name()), Json::String(decl.uri.clone()));
            }
            StoreEntry::Declaration(_) => {}
            StoreEntry::Attribute(attr) => {
                let name = if options.preserve_namespaces {
                    attr.name.lexical()
                } else {
                    attr.name.local_name().to_string()
                };
                map.insert(format!("{}{}", prefix, name), Json::String(attr.value.clone()));
            }
        }
    }

    let text: String = element
        .children()
        .iter()
        .filter_map(|child| match child {
            MarkupNode::Text(text) => Some(text.as_str()),
            _ => None,
        })
        .collect();
    let children: Vec<&Element> = element.children().iter().filter_map(MarkupNode::as_element).collect();

    if children.is_empty() {
        if map.is_empty() {
            return Json::String(text);
        }
        if !text.is_empty() {
            map.insert("#text".to_string(), Json::String(text));
        }
        return Json::Object(map);
    }

    if !is_blank(&text) {
        map.insert("#text".to_string(), Json::String(text));
    }
    map.extend(group_elements(children.into_iter(), options));
    Json::Object(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn convert(xml: &str) -> Json {
        to_document(&Markup::parse(xml).unwrap(), &ToDocumentOptions::default())
    }

    #[test]
    fn test_person() {
        assert_eq!(
            convert("<person><name>Jack</name><age>40</age></person>"),
            json!({"person": {"name": "Jack", "age": "40"}})
        );
    }

    #[test]
    fn test_attribute_and_text() {
        assert_eq!(convert(r#"<name test="5">Jack</name>"#), json!({"name": {"@test": "5", "#text": "Jack"}}));
        assert_eq!(convert(r#"<name test="5"/>"#), json!({"name": {"@test": "5"}}));
        assert_eq!(convert("<name/>"), json!({"name": ""}));
    }

    #[test]
    fn test_repeated_children() {
        assert_eq!(convert("<r><item>1</item></r>"), json!({"r": {"item": "1"}}));
        assert_eq!(
            convert("<r><item>1</item><item>2</item><other/></r>"),
            json!({"r": {"item": ["1", "2"], "other": ""}})
        );
    }

    #[test]
    fn test_whitespace_around_elements_ignored() {
        assert_eq!(
            convert("<r>\n  <a>x</a>\n  <b>y</b>\n</r>"),
            json!({"r": {"a": "x", "b": "y"}})
        );
        assert_eq!(convert("<r>t<a/></r>"), json!({"r": {"#text": "t", "a": ""}}));
    }

    #[test]
    fn test_comments_and_pis() {
        assert_eq!(convert("<!--c-->"), json!({}));
        assert_eq!(convert("<?pi x?>"), json!({}));
        assert_eq!(convert("<r><!--c-->text</r>"), json!({"r": "text"}));
        assert_eq!(convert("<a/><!--c--><b/>"), json!({"a": "", "b": ""}));
    }

    #[test]
    fn test_top_level_sequences() {
        assert_eq!(to_document(&Markup::empty(), &ToDocumentOptions::default()), json!({}));
        assert_eq!(convert("<a>1</a><b>2</b><a>3</a>"), json!({"a": ["1", "3"], "b": "2"}));
        assert_eq!(convert("text"), json!("text"));
    }

    fn text_then(elements: &str) -> Markup {
        let mut nodes = vec![MarkupNode::Text("a".to_string()), MarkupNode::Text("b".to_string())];
        nodes.extend(Markup::parse(elements).unwrap().nodes().iter().cloned());
        Markup::from_nodes(nodes)
    }

    #[test]
    fn test_mixed_sequence_groups_elements() {
        let options = ToDocumentOptions::default();
        let distinct = text_then(
            "<key>value3</key><key>value4</key><key>value4</key>\
             <bookName>Book1</bookName><bookId>001</bookId><bookId>001</bookId>",
        );
        assert_eq!(
            to_document(&distinct, &options),
            json!(["a", "b", {"key": ["value3", "value4", "value4"], "bookName": "Book1", "bookId": ["001", "001"]}])
        );

        let repeated = text_then("<key>value1</key><key>value2</key>");
        assert_eq!(to_document(&repeated, &options), json!(["a", "b", {"key": ["value1", "value2"]}]));

        assert_eq!(convert("<a>1</a>text<a>2</a>"), json!([{"a": ["1", "2"]}, "text"]));
    }

    #[test]
    fn test_namespaces() {
        let xml = r#"<ns0:r xmlns:ns0="http://x" ns0:k="v"><ns0:a>1</ns0:a></ns0:r>"#;
        assert_eq!(
            convert(xml),
            json!({"ns0:r": {"@xmlns:ns0": "http://x", "@ns0:k": "v", "ns0:a": "1"}})
        );

        let options = ToDocumentOptions { preserve_namespaces: false, ..Default::default() };
        let stripped = to_document(&Markup::parse(xml).unwrap(), &options);
        assert_eq!(stripped, json!({"r": {"@k": "v", "a": "1"}}));
    }

    #[test]
    fn test_custom_attribute_prefix() {
        let options = ToDocumentOptions { attribute_prefix: "_".to_string(), ..Default::default() };
        let doc = to_document(&Markup::parse(r#"<a id="1"/>"#).unwrap(), &options);
        assert_eq!(doc, json!({"a": {"_id": "1"}}));
    }
}
