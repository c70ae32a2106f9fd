//! Runtime Values
//!
//! One closed variant type for every value interpreted code, native
//! operations and connectors exchange. Composite values are shared through
//! `Arc`; writers go through `Arc::make_mut`, so a value that has been handed
//! to someone else is copied rather than mutated under them.
//!
//! `Value::Absent` is the "no value" state of a reference slot. It is never
//! equal to an empty string, array or map.

mod ops;
mod structure;

pub use ops::BinaryOp;
pub use structure::{field_at, FieldDef, StructType, StructValue};

use crate::dom::Markup;
use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;

/// Insertion-ordered map with unique string keys
pub type ValueMap = IndexMap<String, Value>;

/// A runtime value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Absent,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Array(Arc<Vec<Value>>),
    Map(Arc<ValueMap>),
    Struct(Arc<StructValue>),
    Markup(Arc<Markup>),
    Document(Arc<serde_json::Value>),
    Connector(ConnectorHandle),
}

/// The kind of a value, as declared by native signatures and struct fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Absent,
    Boolean,
    Integer,
    Float,
    String,
    Array,
    Map,
    Struct,
    Markup,
    Document,
    Connector,
    /// Accepts every kind
    Any,
}

impl ValueKind {
    pub fn name(&self) -> &'static str {
        match self {
            ValueKind::Absent => "absent",
            ValueKind::Boolean => "boolean",
            ValueKind::Integer => "integer",
            ValueKind::Float => "float",
            ValueKind::String => "string",
            ValueKind::Array => "array",
            ValueKind::Map => "map",
            ValueKind::Struct => "struct",
            ValueKind::Markup => "markup",
            ValueKind::Document => "document",
            ValueKind::Connector => "connector",
            ValueKind::Any => "any",
        }
    }

    /// Whether a value of this kind can be stored in a slot declared as `self`
    #[inline]
    pub fn accepts(&self, value: &Value) -> bool {
        *self == ValueKind::Any || *self == value.kind()
    }

    /// Initial value for a non-nullable slot of this kind with no declared default
    pub fn zero(&self) -> Option<Value> {
        match self {
            ValueKind::Boolean => Some(Value::Boolean(false)),
            ValueKind::Integer => Some(Value::Integer(0)),
            ValueKind::Float => Some(Value::Float(0.0)),
            ValueKind::String => Some(Value::String(String::new())),
            ValueKind::Array => Some(Value::Array(Arc::new(Vec::new()))),
            ValueKind::Map => Some(Value::Map(Arc::new(ValueMap::new()))),
            ValueKind::Markup => Some(Value::Markup(Arc::new(Markup::empty()))),
            ValueKind::Document => Some(Value::Document(Arc::new(serde_json::Value::Null))),
            ValueKind::Absent
            | ValueKind::Struct
            | ValueKind::Connector
            | ValueKind::Any => None,
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Opaque handle to a protocol connector instance
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConnectorHandle {
    connector: Arc<str>,
    id: u64,
}

impl ConnectorHandle {
    pub fn new(connector: &str, id: u64) -> Self {
        ConnectorHandle {
            connector: Arc::from(connector),
            id,
        }
    }

    pub fn connector(&self) -> &str {
        &self.connector
    }

    pub fn id(&self) -> u64 {
        self.id
    }
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Absent => ValueKind::Absent,
            Value::Boolean(_) => ValueKind::Boolean,
            Value::Integer(_) => ValueKind::Integer,
            Value::Float(_) => ValueKind::Float,
            Value::String(_) => ValueKind::String,
            Value::Array(_) => ValueKind::Array,
            Value::Map(_) => ValueKind::Map,
            Value::Struct(_) => ValueKind::Struct,
            Value::Markup(_) => ValueKind::Markup,
            Value::Document(_) => ValueKind::Document,
            Value::Connector(_) => ValueKind::Connector,
        }
    }

    #[inline]
    pub fn is_absent(&self) -> bool {
        matches!(self, Value::Absent)
    }

    /// Borrow the value, failing with a reference-absence error when it is absent
    pub fn require(&self, operation: &str) -> crate::Result<&Value> {
        if self.is_absent() {
            Err(crate::ValueError::absent(operation))
        } else {
            Ok(self)
        }
    }

    pub fn string(s: impl Into<String>) -> Self {
        Value::String(s.into())
    }

    pub fn array(items: Vec<Value>) -> Self {
        Value::Array(Arc::new(items))
    }

    pub fn map(entries: ValueMap) -> Self {
        Value::Map(Arc::new(entries))
    }

    pub fn markup(markup: Markup) -> Self {
        Value::Markup(Arc::new(markup))
    }

    pub fn document(document: serde_json::Value) -> Self {
        Value::Document(Arc::new(document))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_markup(&self) -> Option<&Markup> {
        match self {
            Value::Markup(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_document(&self) -> Option<&serde_json::Value> {
        match self {
            Value::Document(d) => Some(d),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Markup> for Value {
    fn from(m: Markup) -> Self {
        Value::markup(m)
    }
}

impl From<serde_json::Value> for Value {
    fn from(d: serde_json::Value) -> Self {
        Value::document(d)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Absent => f.write_str("null"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Integer(n) => write!(f, "{}", n),
            Value::Float(n) => write!(f, "{}", n),
            Value::String(s) => f.write_str(s),
            Value::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write_nested(f, item)?;
                }
                f.write_str("]")
            }
            Value::Map(entries) => {
                f.write_str("{")?;
                for (i, (key, item)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{:?}: ", key)?;
                    write_nested(f, item)?;
                }
                f.write_str("}")
            }
            Value::Struct(s) => write!(f, "{}", s),
            Value::Markup(m) => write!(f, "{}", m),
            Value::Document(d) => write!(f, "{}", d),
            Value::Connector(c) => write!(f, "connector:{}#{}", c.connector, c.id),
        }
    }
}

/// Strings are quoted when they appear inside a composite
pub(crate) fn write_nested(f: &mut fmt::Formatter<'_>, value: &Value) -> fmt::Result {
    match value {
        Value::String(s) => write!(f, "{:?}", s),
        other => write!(f, "{}", other),
    }
}
