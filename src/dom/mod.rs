//! DOM Module - Owned markup trees
//!
//! Implements the markup tree the value model carries:
//! - Owned nodes whose names keep their resolved namespace URI
//! - Attribute store with namespace declarations kept apart
//! - Namespace resolution stack and prefix reconciliation
//! - `Markup` item/sequence values with the tree operations
//! - Builder (text to tree) and serializer (tree to text)

pub mod attributes;
pub mod builder;
pub mod namespace;
pub mod node;
pub mod sequence;
pub mod serialize;

pub use attributes::{Attribute, AttributeStore, NamespaceDecl, StoreEntry};
pub use namespace::{ns, NamespaceResolver};
pub use node::{Element, MarkupNode, NodeKind, QName};
pub use sequence::{ElementFilter, Markup};
