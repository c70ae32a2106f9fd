//! Evaluation Strategies
//!
//! Ways to run read-only work over shared markup values:
//! - Parallel selection, single or keyed (`select_parallel`, `xmap`)
//! - Parallel mapping over selected nodes (`select_map`)
//! - Batch conversion to documents (`to_documents_parallel`)

pub mod parallel;

pub use parallel::{select_map, select_parallel, to_documents_parallel, xmap};
