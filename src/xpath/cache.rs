//! Compiled Selector Cache
//!
//! LRU cache of parsed selectors keyed by their source text.

use super::parser::Selector;
use crate::error::Result;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Thread-safe LRU of compiled selectors
pub struct SelectorCache {
    entries: Mutex<LruCache<String, Arc<Selector>>>,
}

impl SelectorCache {
    pub fn new(capacity: NonZeroUsize) -> Self {
        SelectorCache {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Cached selector for `source`, parsing it on a miss
    ///
    /// Malformed selectors are not cached.
    pub fn get_or_compile(&self, source: &str) -> Result<Arc<Selector>> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(selector) = entries.get(source) {
            return Ok(Arc::clone(selector));
        }

        debug!(selector = source, "selector cache miss");
        let selector = Arc::new(Selector::parse(source)?);
        entries.put(source.to_string(), Arc::clone(&selector));
        Ok(selector)
    }

    /// Number of cached selectors
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reuses_compiled_selector() {
        let cache = SelectorCache::new(NonZeroUsize::new(4).unwrap());
        let first = cache.get_or_compile("/a/b").unwrap();
        let second = cache.get_or_compile("/a/b").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_evicts_least_recent() {
        let cache = SelectorCache::new(NonZeroUsize::new(2).unwrap());
        let a = cache.get_or_compile("a").unwrap();
        cache.get_or_compile("b").unwrap();
        cache.get_or_compile("c").unwrap();
        assert_eq!(cache.len(), 2);
        let again = cache.get_or_compile("a").unwrap();
        assert!(!Arc::ptr_eq(&a, &again));
    }

    #[test]
    fn test_malformed_not_cached() {
        let cache = SelectorCache::new(NonZeroUsize::new(2).unwrap());
        assert!(cache.get_or_compile("a[").is_err());
        assert!(cache.is_empty());
    }
}
