//! Path Selector Engine
//!
//! Constrained XPath-style selection over owned markup trees:
//! - Child, descendant, self, parent and attribute axes
//! - Name, wildcard and node-type tests with namespace prefixes
//! - Positional, attribute and child-value predicates
//! - Compiled selector caching

pub mod cache;
pub mod eval;
pub mod lexer;
pub mod parser;
mod query;

pub use cache::SelectorCache;
pub use eval::{evaluate, Hit};
pub use parser::{Axis, NodeTest, Predicate, Selector, Step};
