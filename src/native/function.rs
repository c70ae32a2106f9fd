//! Native Functions
//!
//! A host operation with its declared signature, and positional access to
//! the arguments of one call.

use crate::dom::Markup;
use crate::error::{BoxError, Result, ValueError};
use crate::value::{StructValue, Value, ValueKind};
use std::fmt;

/// Outcome of a host implementation; any error type may be returned
pub type NativeResult = std::result::Result<Value, BoxError>;

/// Host implementation of a native operation
pub type NativeFnInner = dyn Fn(&NativeArgs<'_>) -> NativeResult + Send + Sync;

/// A host operation callable from interpreted code
pub struct NativeFunction {
    pub namespace: String,
    pub name: String,
    /// Declared kinds of the positional parameters
    pub params: Vec<ValueKind>,
    pub returns: ValueKind,
    pub func: Box<NativeFnInner>,
}

impl NativeFunction {
    pub fn new(
        namespace: impl Into<String>,
        name: impl Into<String>,
        params: Vec<ValueKind>,
        returns: ValueKind,
        f: impl Fn(&NativeArgs<'_>) -> NativeResult + Send + Sync + 'static,
    ) -> Self {
        NativeFunction {
            namespace: namespace.into(),
            name: name.into(),
            params,
            returns,
            func: Box::new(f),
        }
    }

    #[inline]
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// `namespace:name`
    pub fn qualified_name(&self) -> String {
        format!("{}:{}", self.namespace, self.name)
    }
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<native-fn {}/{}>", self.qualified_name(), self.arity())
    }
}

/// Arguments of one native call
///
/// Accessors never coerce: a value of the wrong kind is a type mismatch and
/// an absent value is a reference-absence error.
#[derive(Debug, Clone, Copy)]
pub struct NativeArgs<'a> {
    operation: &'a str,
    values: &'a [Value],
}

impl<'a> NativeArgs<'a> {
    pub fn new(operation: &'a str, values: &'a [Value]) -> Self {
        NativeArgs { operation, values }
    }

    pub fn operation(&self) -> &str {
        self.operation
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Argument `index`, which may be absent
    pub fn value(&self, index: usize) -> Result<&'a Value> {
        self.values.get(index).ok_or_else(|| {
            ValueError::schema(format!(
                "'{}' has no argument {} ({} given)",
                self.operation,
                index,
                self.values.len()
            ))
        })
    }

    fn present(&self, index: usize) -> Result<&'a Value> {
        self.value(index)?
            .require(&format!("call '{}' with", self.operation))
    }

    fn mismatch(&self, index: usize, expected: ValueKind, found: &Value) -> ValueError {
        ValueError::mismatch(
            format!("read argument {} of '{}' as {} from", index, self.operation, expected),
            found.kind().name(),
        )
    }

    pub fn markup(&self, index: usize) -> Result<&'a Markup> {
        match self.present(index)? {
            Value::Markup(markup) => Ok(markup.as_ref()),
            other => Err(self.mismatch(index, ValueKind::Markup, other)),
        }
    }

    pub fn document(&self, index: usize) -> Result<&'a serde_json::Value> {
        match self.present(index)? {
            Value::Document(document) => Ok(document.as_ref()),
            other => Err(self.mismatch(index, ValueKind::Document, other)),
        }
    }

    pub fn string(&self, index: usize) -> Result<&'a str> {
        match self.present(index)? {
            Value::String(s) => Ok(s.as_str()),
            other => Err(self.mismatch(index, ValueKind::String, other)),
        }
    }

    pub fn integer(&self, index: usize) -> Result<i64> {
        match self.present(index)? {
            Value::Integer(i) => Ok(*i),
            other => Err(self.mismatch(index, ValueKind::Integer, other)),
        }
    }

    pub fn boolean(&self, index: usize) -> Result<bool> {
        match self.present(index)? {
            Value::Boolean(b) => Ok(*b),
            other => Err(self.mismatch(index, ValueKind::Boolean, other)),
        }
    }

    pub fn structure(&self, index: usize) -> Result<&'a StructValue> {
        match self.present(index)? {
            Value::Struct(value) => Ok(value.as_ref()),
            other => Err(self.mismatch(index, ValueKind::Struct, other)),
        }
    }

    pub fn array(&self, index: usize) -> Result<&'a [Value]> {
        match self.present(index)? {
            Value::Array(items) => Ok(items.as_slice()),
            other => Err(self.mismatch(index, ValueKind::Array, other)),
        }
    }
}
