//! RustyValue - Runtime values with namespace-aware markup
//!
//! Layers:
//! A: Value model (absent-aware values, structs with slot access)
//! B: Markup text (zero-copy scanner and pull reader)
//! C: Markup trees with namespace reconciliation and selectors
//! D: Markup/document conversion
//! E: Native call bridge (registry of host operations)
//! F: Parallel selection and batch conversion

// ============================================================================
// Modules
// ============================================================================

pub mod config;
pub mod convert;
pub mod core;
pub mod dom;
pub mod error;
pub mod native;
pub mod reader;
pub mod strategy;
pub mod value;
pub mod xpath;

// ============================================================================
// Re-exports
// ============================================================================

pub use config::RuntimeConfig;
pub use convert::{to_document, to_markup, ToDocumentOptions, ToMarkupOptions};
pub use dom::{AttributeStore, Element, ElementFilter, Markup, MarkupNode, NamespaceResolver, NodeKind, QName};
pub use error::{BoxError, Result, ValueError};
pub use native::{NativeArgs, NativeFunction, NativeRegistry, NativeResult};
pub use value::{field_at, BinaryOp, ConnectorHandle, FieldDef, StructType, StructValue, Value, ValueKind, ValueMap};
pub use xpath::{Selector, SelectorCache};
