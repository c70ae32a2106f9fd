//! Runtime Configuration
//!
//! Settings a host supplies when it builds a native registry. Everything
//! has a default, and the record loads from any serde format.

use crate::convert::{ToDocumentOptions, ToMarkupOptions};
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;

const DEFAULT_SELECTOR_CACHE_CAPACITY: NonZeroUsize = match NonZeroUsize::new(64) {
    Some(capacity) => capacity,
    None => NonZeroUsize::MIN,
};

/// Runtime configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RuntimeConfig {
    /// Number of compiled selectors kept in the registry's cache
    pub selector_cache_capacity: NonZeroUsize,

    /// Options used when a conversion call passes none
    pub to_document: ToDocumentOptions,

    pub to_markup: ToMarkupOptions,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        RuntimeConfig {
            selector_cache_capacity: DEFAULT_SELECTOR_CACHE_CAPACITY,
            to_document: ToDocumentOptions::default(),
            to_markup: ToMarkupOptions::default(),
        }
    }
}

impl RuntimeConfig {
    /// Create a configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }
}
