//! Metadata context
//!
//! A [`MetadataContext`] is an immutable string-keyed bag of values threaded
//! through resolution calls. Providers use it for per-request hints; most
//! requests carry the shared empty context.

use std::sync::Arc;

use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;

use crate::value::Value;

static EMPTY: Lazy<MetadataContext> = Lazy::new(MetadataContext::new);

/// Immutable key/value context for a resolution request
#[derive(Clone, Debug, Default)]
pub struct MetadataContext {
    entries: FxHashMap<Arc<str>, Value>,
}

impl MetadataContext {
    /// Create an empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// The shared empty context
    pub fn empty() -> &'static MetadataContext {
        &EMPTY
    }

    /// Add an entry, consuming and returning the context
    pub fn with(mut self, key: impl Into<Arc<str>>, value: Value) -> Self {
        self.entries.insert(key.into(), value);
        self
    }

    /// Look up an entry
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Whether the context holds `key`
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the context is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_and_get() {
        let ctx = MetadataContext::new()
            .with("mode", Value::str("one-way"))
            .with("depth", Value::int(2));

        assert_eq!(ctx.get("mode"), Some(&Value::str("one-way")));
        assert_eq!(ctx.get("depth"), Some(&Value::int(2)));
        assert_eq!(ctx.get("missing"), None);
        assert_eq!(ctx.len(), 2);
    }

    #[test]
    fn test_empty_is_shared() {
        let a = MetadataContext::empty();
        let b = MetadataContext::empty();
        assert!(std::ptr::eq(a, b));
        assert!(a.is_empty());
    }
}
