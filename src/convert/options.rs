//! Conversion Options
//!
//! Option records for the markup/document converters. They load from any
//! serde format with camelCase keys, and can also be passed from
//! interpreted code as struct values.

use crate::error::{Result, ValueError};
use crate::value::{FieldDef, StructType, StructValue, Value, ValueKind};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Options for markup to document conversion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ToDocumentOptions {
    /// Prefix marking attribute keys
    pub attribute_prefix: String,
    /// Keep prefixes and namespace declarations in keys
    pub preserve_namespaces: bool,
}

impl Default for ToDocumentOptions {
    fn default() -> Self {
        ToDocumentOptions {
            attribute_prefix: "@".to_string(),
            preserve_namespaces: true,
        }
    }
}

impl ToDocumentOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schema of the struct value interpreted code passes
    pub fn struct_type() -> Result<Arc<StructType>> {
        StructType::new(
            "ToDocumentOptions",
            vec![
                FieldDef::new("attributePrefix", ValueKind::String).with_default("@"),
                FieldDef::new("preserveNamespaces", ValueKind::Boolean).with_default(true),
            ],
        )
        .map(Arc::new)
    }

    pub fn from_struct(value: &StructValue) -> Result<Self> {
        Ok(ToDocumentOptions {
            attribute_prefix: string_field(value, "attributePrefix")?,
            preserve_namespaces: bool_field(value, "preserveNamespaces")?,
        })
    }
}

/// Options for document to markup conversion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ToMarkupOptions {
    /// Prefix marking attribute keys
    pub attribute_prefix: String,
    /// Element name for the entries of a top-level array
    pub array_entry_tag_name: String,
}

impl Default for ToMarkupOptions {
    fn default() -> Self {
        ToMarkupOptions {
            attribute_prefix: "@".to_string(),
            array_entry_tag_name: "item".to_string(),
        }
    }
}

impl ToMarkupOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn struct_type() -> Result<Arc<StructType>> {
        StructType::new(
            "ToMarkupOptions",
            vec![
                FieldDef::new("attributePrefix", ValueKind::String).with_default("@"),
                FieldDef::new("arrayEntryTagName", ValueKind::String).with_default("item"),
            ],
        )
        .map(Arc::new)
    }

    pub fn from_struct(value: &StructValue) -> Result<Self> {
        Ok(ToMarkupOptions {
            attribute_prefix: string_field(value, "attributePrefix")?,
            array_entry_tag_name: string_field(value, "arrayEntryTagName")?,
        })
    }
}

fn string_field(value: &StructValue, field: &str) -> Result<String> {
    match value.get(field)? {
        Value::String(s) => Ok(s.clone()),
        other => Err(ValueError::mismatch(
            format!("read option '{}' from", field),
            other.kind().name(),
        )),
    }
}

fn bool_field(value: &StructValue, field: &str) -> Result<bool> {
    match value.get(field)? {
        Value::Boolean(b) => Ok(*b),
        other => Err(ValueError::mismatch(
            format!("read option '{}' from", field),
            other.kind().name(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = ToDocumentOptions::default();
        assert_eq!(options.attribute_prefix, "@");
        assert!(options.preserve_namespaces);
        assert_eq!(ToMarkupOptions::new().array_entry_tag_name, "item");
    }

    #[test]
    fn test_serde_camel_case_with_defaults() {
        let options: ToDocumentOptions = serde_json::from_str(r#"{"preserveNamespaces": false}"#).unwrap();
        assert_eq!(options.attribute_prefix, "@");
        assert!(!options.preserve_namespaces);

        let json = serde_json::to_value(ToMarkupOptions::default()).unwrap();
        assert_eq!(json["arrayEntryTagName"], "item");
    }

    #[test]
    fn test_from_struct() {
        let ty = ToMarkupOptions::struct_type().unwrap();
        let mut value = StructValue::new(ty.clone());
        value.set_field(ty.slot("arrayEntryTagName").unwrap(), Value::from("entry")).unwrap();
        let options = ToMarkupOptions::from_struct(&value).unwrap();
        assert_eq!(options.array_entry_tag_name, "entry");
        assert_eq!(options.attribute_prefix, "@");
    }

    #[test]
    fn test_from_struct_of_wrong_shape() {
        let ty = ToMarkupOptions::struct_type().unwrap();
        let value = StructValue::new(ty);
        assert!(ToDocumentOptions::from_struct(&value).is_err());
    }
}
