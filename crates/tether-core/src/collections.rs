//! Light hash container
//!
//! [`LightMap`] is a thin contract layer over the standard hash map with the
//! Fx hasher: unique insert that fails on duplicates, a panicking indexer
//! next to non-panicking lookup, clone-with-transform, and an occupancy-based
//! trim for caches that grow large and then empty out.

use std::collections::HashMap;
use std::hash::Hash;
use std::ops::Index;

use rustc_hash::FxBuildHasher;

use crate::error::{MemberError, MemberResult};

/// Tables over this many slots are eligible for [`LightMap::trim_excess`]
const TRIM_MIN_CAPACITY: usize = 1000;

/// Hash map wrapper used for member caches and registration tables
#[derive(Clone)]
pub struct LightMap<K, V> {
    map: HashMap<K, V, FxBuildHasher>,
}

impl<K: Eq + Hash, V> LightMap<K, V> {
    /// Create an empty map
    pub fn new() -> Self {
        Self {
            map: HashMap::default(),
        }
    }

    /// Create a map with room for `capacity` entries
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            map: HashMap::with_capacity_and_hasher(capacity, FxBuildHasher),
        }
    }

    /// Number of live entries
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Whether the map is empty
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Insert, replacing and returning any previous value
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        self.map.insert(key, value)
    }

    /// Insert, failing with `DuplicateKey` when the key is present
    pub fn insert_unique(&mut self, key: K, value: V) -> MemberResult<()>
    where
        K: std::fmt::Debug,
    {
        match self.map.entry(key) {
            std::collections::hash_map::Entry::Occupied(e) => Err(MemberError::DuplicateKey {
                key: format!("{:?}", e.key()),
            }),
            std::collections::hash_map::Entry::Vacant(e) => {
                e.insert(value);
                Ok(())
            }
        }
    }

    /// Non-panicking lookup
    pub fn get(&self, key: &K) -> Option<&V> {
        self.map.get(key)
    }

    /// Non-panicking mutable lookup
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        self.map.get_mut(key)
    }

    /// Whether `key` is present
    pub fn contains_key(&self, key: &K) -> bool {
        self.map.contains_key(key)
    }

    /// Remove and return the value for `key`
    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.map.remove(key)
    }

    /// Keep only the entries the predicate approves
    pub fn retain(&mut self, f: impl FnMut(&K, &mut V) -> bool) {
        self.map.retain(f);
    }

    /// Remove all entries
    pub fn clear(&mut self) {
        self.map.clear();
    }

    /// Iterate over live entries
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.map.iter()
    }

    /// Iterate over live keys
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.map.keys()
    }

    /// Iterate over live values
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.map.values()
    }

    /// Clone the map, transforming each value
    pub fn clone_with<U>(&self, mut transform: impl FnMut(&K, &V) -> U) -> LightMap<K, U>
    where
        K: Clone,
    {
        let mut out = LightMap::with_capacity(self.map.len());
        for (k, v) in &self.map {
            out.map.insert(k.clone(), transform(k, v));
        }
        out
    }

    /// Shrink the table when a large map has mostly emptied out
    ///
    /// A no-op unless capacity exceeds `TRIM_MIN_CAPACITY` slots and
    /// occupancy has fallen below a quarter of it.
    pub fn trim_excess(&mut self) {
        let capacity = self.map.capacity();
        if capacity > TRIM_MIN_CAPACITY && self.map.len() * 4 < capacity {
            self.map.shrink_to_fit();
        }
    }
}

impl<K: Eq + Hash, V> Default for LightMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Eq + Hash, V> Index<&K> for LightMap<K, V> {
    type Output = V;

    /// Panics when the key is absent; use [`LightMap::get`] for a
    /// non-panicking lookup
    fn index(&self, key: &K) -> &V {
        match self.map.get(key) {
            Some(value) => value,
            None => panic!("key not found in LightMap"),
        }
    }
}

impl<K: Eq + Hash, V> FromIterator<(K, V)> for LightMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            map: HashMap::from_iter(iter),
        }
    }
}

impl<K: Eq + Hash + std::fmt::Debug, V> std::fmt::Debug for LightMap<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LightMap").field("len", &self.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_get_remove() {
        let mut map = LightMap::new();
        assert_eq!(map.insert("a", 1), None);
        assert_eq!(map.insert("a", 2), Some(1));
        assert_eq!(map.get(&"a"), Some(&2));
        assert_eq!(map.remove(&"a"), Some(2));
        assert!(map.is_empty());
    }

    #[test]
    fn test_insert_unique_rejects_duplicates() {
        let mut map = LightMap::new();
        map.insert_unique("a", 1).unwrap();
        assert!(matches!(
            map.insert_unique("a", 2),
            Err(MemberError::DuplicateKey { .. })
        ));
        assert_eq!(map.get(&"a"), Some(&1));
    }

    #[test]
    #[should_panic(expected = "key not found")]
    fn test_index_panics_on_missing_key() {
        let map: LightMap<&str, i32> = LightMap::new();
        let _ = map[&"missing"];
    }

    #[test]
    fn test_clone_with_transform() {
        let mut map = LightMap::new();
        map.insert("a", 1);
        map.insert("b", 2);
        let doubled = map.clone_with(|_, v| v * 2);
        assert_eq!(doubled.get(&"a"), Some(&2));
        assert_eq!(doubled.get(&"b"), Some(&4));
        assert_eq!(doubled.len(), 2);
    }

    #[test]
    fn test_trim_excess_only_when_large_and_sparse() {
        let mut map = LightMap::with_capacity(2048);
        for i in 0..2000 {
            map.insert(i, i);
        }
        map.retain(|&k, _| k < 10);
        let before = map.map.capacity();
        map.trim_excess();
        assert!(map.map.capacity() < before);
        assert_eq!(map.len(), 10);

        // Small maps are left alone.
        let mut small = LightMap::new();
        small.insert(1, 1);
        small.trim_excess();
        assert_eq!(small.get(&1), Some(&1));
    }

    /// Keys supply their own equality semantics; a case-insensitive wrapper
    /// folds on hash and compare.
    #[derive(Debug, Clone)]
    struct CaseInsensitive(&'static str);

    impl PartialEq for CaseInsensitive {
        fn eq(&self, other: &Self) -> bool {
            self.0.eq_ignore_ascii_case(other.0)
        }
    }
    impl Eq for CaseInsensitive {}
    impl Hash for CaseInsensitive {
        fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
            for b in self.0.bytes() {
                state.write_u8(b.to_ascii_lowercase());
            }
        }
    }

    #[test]
    fn test_custom_key_semantics() {
        let mut map = LightMap::new();
        map.insert(CaseInsensitive("Name"), 1);
        assert_eq!(map.get(&CaseInsensitive("name")), Some(&1));
        assert_eq!(map.get(&CaseInsensitive("NAME")), Some(&1));
        assert!(map.insert_unique(CaseInsensitive("nAmE"), 2).is_err());
    }
}
