//! Markup/Document Conversion
//!
//! Converts between markup values and JSON-like documents:
//! - `to_document`: elements to keyed objects, attributes to prefixed keys
//! - `to_markup`: objects to elements with namespace-aware name resolution

pub mod options;
pub mod to_document;
pub mod to_markup;

pub use options::{ToDocumentOptions, ToMarkupOptions};
pub use to_document::to_document;
pub use to_markup::to_markup;
