//! Runtime Errors
//!
//! Every failure this crate reports is a `ValueError`. Each variant renders
//! with a stable prefix followed by contextual detail, so callers can match
//! on the message as well as on the variant.

use std::error::Error as StdError;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, ValueError>;

/// Boxed host error carried as the cause of a failed native call
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

#[derive(Debug, thiserror::Error)]
pub enum ValueError {
    // Value model
    #[error("reference absence: cannot {operation} an absent value")]
    ReferenceAbsence { operation: String },

    #[error("type mismatch: cannot {operation} {found}")]
    TypeMismatch { operation: String, found: String },

    #[error("arithmetic error: {detail}")]
    Arithmetic { detail: String },

    #[error("schema error: {detail}")]
    Schema { detail: String },

    // Bounds
    #[error("index out of range: [{start},{end}] for length {length}")]
    Range { start: i64, end: i64, length: usize },

    #[error("index out of range: index {index} for length {length}")]
    IndexOutOfRange { index: i64, length: usize },

    // Names and namespaces
    #[error(
        "prefix collision: failed to add attribute '{attribute}'. prefix '{prefix}' is already bound to namespace '{bound}', not '{requested}'"
    )]
    PrefixCollision {
        attribute: String,
        prefix: String,
        bound: String,
        requested: String,
    },

    #[error("invalid name: {detail}")]
    InvalidName { detail: String },

    // Markup queries
    #[error("cannot execute query on a sequence: {operation} needs a single item, got {length}")]
    QueryOnSequence { operation: &'static str, length: usize },

    #[error("malformed query '{query}': {reason}")]
    MalformedQuery { query: String, reason: String },

    #[error("query '{query}' did not match any node")]
    NoMatch { query: String },

    #[error("query '{query}' selected a node that is not {expected}")]
    QueryTarget { query: String, expected: &'static str },

    #[error("unsupported operation: cannot {operation} on a {kind} node")]
    Unsupported { operation: &'static str, kind: &'static str },

    // Text and conversion
    #[error("malformed markup at byte {position}: {detail}")]
    Parse { position: usize, detail: String },

    #[error("conversion error: {detail}")]
    Conversion { detail: String },

    // Host boundary
    #[error("native operation '{operation}' failed: {message}")]
    Native {
        operation: String,
        message: String,
        #[source]
        source: Option<BoxError>,
    },
}

impl ValueError {
    pub(crate) fn absent(operation: impl Into<String>) -> Self {
        ValueError::ReferenceAbsence { operation: operation.into() }
    }

    pub(crate) fn mismatch(operation: impl Into<String>, found: impl Into<String>) -> Self {
        ValueError::TypeMismatch {
            operation: operation.into(),
            found: found.into(),
        }
    }

    pub(crate) fn schema(detail: impl Into<String>) -> Self {
        ValueError::Schema { detail: detail.into() }
    }

    pub(crate) fn invalid_name(detail: impl Into<String>) -> Self {
        ValueError::InvalidName { detail: detail.into() }
    }

    pub(crate) fn conversion(detail: impl Into<String>) -> Self {
        ValueError::Conversion { detail: detail.into() }
    }

    pub(crate) fn malformed_query(query: &str, reason: impl Into<String>) -> Self {
        ValueError::MalformedQuery {
            query: query.to_string(),
            reason: reason.into(),
        }
    }

    /// The error a native call was re-signaled from, if it was a `ValueError`
    pub fn native_cause(&self) -> Option<&ValueError> {
        match self {
            ValueError::Native { source: Some(source), .. } => source.downcast_ref::<ValueError>(),
            _ => None,
        }
    }
}
