use proptest::prelude::*;
use rustyvalue::{
    to_document, to_markup, BinaryOp, Markup, MarkupNode, Selector, ToDocumentOptions, ToMarkupOptions, Value,
};
use std::collections::HashSet;

fn attributes() -> impl Strategy<Value = String> {
    prop::sample::subsequence(vec!["id", "k", "x"], 0..=3)
        .prop_flat_map(|names| {
            let count = names.len();
            (Just(names), prop::collection::vec("[a-z0-9]{0,5}", count))
        })
        .prop_map(|(names, values)| {
            names
                .iter()
                .zip(values)
                .map(|(name, value)| format!(" {name}=\"{value}\""))
                .collect::<String>()
        })
}

/// Element-only markup; same-named siblings are always adjacent
fn element(name: &'static str, depth: u32) -> BoxedStrategy<String> {
    let leaf = (attributes(), "[a-z0-9]{0,6}").prop_map(move |(attrs, text)| {
        if text.is_empty() {
            format!("<{name}{attrs}/>")
        } else {
            format!("<{name}{attrs}>{text}</{name}>")
        }
    });
    if depth == 0 {
        return leaf.boxed();
    }

    let inner = (attributes(), prop::sample::subsequence(vec!["a", "b", "c"], 1..=3))
        .prop_flat_map(move |(attrs, names)| {
            let groups: Vec<BoxedStrategy<String>> = names
                .into_iter()
                .map(|child| {
                    prop::collection::vec(element(child, depth - 1), 1..3)
                        .prop_map(|siblings| siblings.concat())
                        .boxed()
                })
                .collect();
            (Just(attrs), groups)
        })
        .prop_map(move |(attrs, groups)| format!("<{name}{attrs}>{}</{name}>", groups.concat()));

    prop_oneof![leaf, inner].boxed()
}

fn document_root() -> impl Strategy<Value = String> {
    (element("r", 2), any::<bool>()).prop_map(|(xml, default_namespace)| {
        if default_namespace {
            xml.replacen("<r", "<r xmlns=\"http://d\"", 1)
        } else {
            xml
        }
    })
}

fn present_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<bool>().prop_map(Value::Boolean),
        any::<i64>().prop_map(Value::Integer),
        "[a-z]{0,8}".prop_map(Value::from),
        Just(Value::array(Vec::new())),
        Just(Value::markup(Markup::empty())),
    ]
}

proptest! {
    #[test]
    fn parse_never_panics(input in "\\PC*") {
        let _ = Markup::parse(&input);
    }

    #[test]
    fn serialization_reparses_identically(xml in document_root()) {
        let markup = Markup::parse(&xml).unwrap();
        prop_assert_eq!(markup.to_string(), xml.clone());
        prop_assert_eq!(Markup::parse(&markup.to_string()).unwrap(), markup);
    }

    #[test]
    fn document_round_trip(xml in document_root()) {
        let markup = Markup::parse(&xml).unwrap();
        let document = to_document(&markup, &ToDocumentOptions::default());
        let back = to_markup(&document, &ToMarkupOptions::default()).unwrap();
        prop_assert_eq!(back.to_string(), xml);
    }

    #[test]
    fn copy_is_independent(xml in document_root(), text in "[a-z]{1,6}") {
        let original = Markup::parse(&xml).unwrap();
        let snapshot = original.to_string();
        let mut copy = original.clone();
        copy.set_text_at(&Selector::parse("//*").unwrap(), &text).unwrap();
        copy.add_attribute("extra", "1", Some("http://extra")).unwrap();
        prop_assert_eq!(original.to_string(), snapshot);
        prop_assert_ne!(copy.to_string(), original.to_string());
    }

    #[test]
    fn synthesized_prefixes_are_distinct(count in 1usize..8) {
        let mut root = Markup::parse("<root/>").unwrap();
        for i in 0..count {
            root.add_attribute(&format!("a{i}"), "v", Some(format!("http://n{i}").as_str())).unwrap();
        }
        let node = root.single("inspect").unwrap().as_element().unwrap();
        let prefixes: HashSet<_> = node
            .attributes()
            .declarations()
            .iter()
            .map(|decl| decl.prefix.clone())
            .collect();
        prop_assert_eq!(prefixes.len(), count);
        prop_assert!(prefixes.iter().all(Option::is_some));
        for i in 0..count {
            let value = root.get_attribute(&format!("a{i}"), Some(format!("http://n{i}").as_str())).unwrap();
            prop_assert_eq!(value, "v");
        }
    }

    #[test]
    fn singleton_sequence_interchangeable(xml in element("r", 1)) {
        let item = Markup::parse(&xml).unwrap();
        let sequence = Markup::from_nodes(item.nodes().to_vec());
        prop_assert!(sequence.is_singleton());
        prop_assert_eq!(item.text_value().unwrap(), sequence.text_value().unwrap());
        prop_assert_eq!(item.element_name().unwrap(), sequence.element_name().unwrap());
        prop_assert_eq!(item.get_attribute("id", None).unwrap(), sequence.get_attribute("id", None).unwrap());
        let options = ToDocumentOptions::default();
        prop_assert_eq!(to_document(&item, &options), to_document(&sequence, &options));
        let selector = Selector::parse("*").unwrap();
        prop_assert_eq!(item.select(&selector).unwrap(), sequence.select(&selector).unwrap());
    }

    #[test]
    fn repeated_children_collect_into_arrays(count in 1usize..6) {
        let xml = format!("<r>{}</r>", "<item>v</item>".repeat(count));
        let document = to_document(&Markup::parse(&xml).unwrap(), &ToDocumentOptions::default());
        let items = &document["r"]["item"];
        if count == 1 {
            prop_assert_eq!(items, &serde_json::json!("v"));
        } else {
            prop_assert_eq!(items.as_array().map(Vec::len), Some(count));
        }
    }

    #[test]
    fn mixed_sequence_merges_elements(
        texts in prop::collection::vec("[a-z]{1,4}", 1..4),
        values in prop::collection::vec("[a-z0-9]{1,4}", 1..5),
    ) {
        let mut nodes: Vec<MarkupNode> = texts.iter().cloned().map(MarkupNode::Text).collect();
        let elements = values.iter().map(|v| format!("<key>{v}</key>")).collect::<String>();
        nodes.extend(Markup::parse(&elements).unwrap().nodes().iter().cloned());
        nodes.push(MarkupNode::Text("tail".to_string()));

        let document = to_document(&Markup::from_nodes(nodes), &ToDocumentOptions::default());
        let entries = document.as_array().unwrap();
        prop_assert_eq!(entries.len(), texts.len() + 2);
        for (entry, text) in entries.iter().zip(&texts) {
            prop_assert_eq!(entry.as_str(), Some(text.as_str()));
        }
        let grouped = &entries[texts.len()]["key"];
        if values.len() == 1 {
            prop_assert_eq!(grouped, &serde_json::json!(values[0]));
        } else {
            prop_assert_eq!(grouped, &serde_json::json!(values));
        }
        prop_assert_eq!(entries[texts.len() + 1].as_str(), Some("tail"));
    }

    #[test]
    fn absent_equality_law(value in present_value()) {
        let absent = Value::Absent;
        prop_assert_eq!(absent.binary(BinaryOp::Eq, &Value::Absent).unwrap(), Value::Boolean(true));
        prop_assert_eq!(absent.binary(BinaryOp::Ne, &Value::Absent).unwrap(), Value::Boolean(false));
        prop_assert_eq!(absent.binary(BinaryOp::Eq, &value).unwrap(), Value::Boolean(false));
        prop_assert_eq!(value.binary(BinaryOp::Ne, &absent).unwrap(), Value::Boolean(true));
        prop_assert!(absent.binary(BinaryOp::Lt, &value).is_err());
    }
}
