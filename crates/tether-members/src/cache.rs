//! Request-shaped member cache
//!
//! [`MemberCache`] memoizes selected resolution results keyed by the full
//! request shape: (type, name, kind mask, flag mask). Negative results are
//! cached too, so a binding path that misses does not re-walk providers on
//! every evaluation.
//!
//! A cache entry is either valid or invalidated; registration changes
//! propagate through [`InvalidationListener`] and remove only the entries
//! whose key's type matches the mutated registration (a full clear when no
//! type is given).

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, trace};

use tether_core::{LightMap, TypeId};

use crate::member::{MemberCandidates, MemberFlags, MemberKindMask};

/// Receives registration-change signals from registrable providers
pub trait InvalidationListener: Send + Sync {
    /// Called after a registration mutation; `type_id` scopes the change to
    /// one declaring type, `None` means everything may have changed
    fn on_members_changed(&self, type_id: Option<TypeId>);
}

/// Full request shape used as the cache key
///
/// Equality is structural; the hash combines the type identity with the name
/// hash (and the request masks).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// Requested type
    pub type_id: TypeId,
    /// Requested member name (may carry indexer/call syntax)
    pub name: Arc<str>,
    /// Requested kind mask
    pub kinds: MemberKindMask,
    /// Requested flag mask
    pub flags: MemberFlags,
}

/// Cache of selected member results per request shape
pub struct MemberCache {
    entries: RwLock<LightMap<CacheKey, MemberCandidates>>,
}

impl MemberCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(LightMap::new()),
        }
    }

    /// Cached result for `key`, if any (empty results count as hits)
    pub fn get(&self, key: &CacheKey) -> Option<MemberCandidates> {
        let hit = self.entries.read().get(key).cloned();
        if hit.is_some() {
            trace!(name = %key.name, type_id = %key.type_id, "member cache hit");
        }
        hit
    }

    /// Store the selected result for `key`
    pub fn insert(&self, key: CacheKey, result: MemberCandidates) {
        self.entries.write().insert(key, result);
    }

    /// Drop entries whose key's type matches, or everything when `None`
    pub fn invalidate(&self, type_id: Option<TypeId>) {
        let mut entries = self.entries.write();
        match type_id {
            Some(t) => {
                let before = entries.len();
                entries.retain(|key, _| key.type_id != t);
                debug!(type_id = %t, removed = before - entries.len(), "member cache invalidated by type");
            }
            None => {
                debug!(removed = entries.len(), "member cache cleared");
                entries.clear();
            }
        }
        entries.trim_excess();
    }

    /// Number of cached entries
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether the cache is empty
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl Default for MemberCache {
    fn default() -> Self {
        Self::new()
    }
}

impl InvalidationListener for MemberCache {
    fn on_members_changed(&self, type_id: Option<TypeId>) {
        self.invalidate(type_id);
    }
}

impl std::fmt::Debug for MemberCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemberCache")
            .field("entries", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::member::{Member, MemberOrigin};
    use smallvec::smallvec;
    use tether_core::Value;

    fn key(type_id: u32, name: &str) -> CacheKey {
        CacheKey {
            type_id: TypeId::from_raw(type_id),
            name: Arc::from(name),
            kinds: MemberKindMask::all(),
            flags: MemberFlags::all(),
        }
    }

    fn candidate(type_id: u32, name: &str) -> MemberCandidates {
        smallvec![Arc::new(Member::constant(
            name,
            TypeId::from_raw(type_id),
            Value::int(1),
            MemberOrigin::Instance,
        ))]
    }

    #[test]
    fn test_hit_and_negative_caching() {
        let cache = MemberCache::new();
        assert!(cache.get(&key(1, "X")).is_none());

        cache.insert(key(1, "X"), candidate(1, "X"));
        cache.insert(key(1, "missing"), MemberCandidates::new());

        assert_eq!(cache.get(&key(1, "X")).unwrap().len(), 1);
        // Empty result is a hit, not a miss.
        assert_eq!(cache.get(&key(1, "missing")).unwrap().len(), 0);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_type_scoped_invalidation() {
        let cache = MemberCache::new();
        cache.insert(key(1, "X"), candidate(1, "X"));
        cache.insert(key(1, "Y"), candidate(1, "Y"));
        cache.insert(key(2, "X"), candidate(2, "X"));

        cache.invalidate(Some(TypeId::from_raw(1)));

        assert!(cache.get(&key(1, "X")).is_none());
        assert!(cache.get(&key(1, "Y")).is_none());
        // Entries for unrelated types survive.
        assert!(cache.get(&key(2, "X")).is_some());
    }

    #[test]
    fn test_full_invalidation() {
        let cache = MemberCache::new();
        cache.insert(key(1, "X"), candidate(1, "X"));
        cache.insert(key(2, "X"), candidate(2, "X"));

        cache.invalidate(None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_key_equality_includes_masks() {
        let cache = MemberCache::new();
        cache.insert(key(1, "X"), candidate(1, "X"));

        let narrowed = CacheKey {
            kinds: MemberKindMask::METHOD,
            ..key(1, "X")
        };
        assert!(cache.get(&narrowed).is_none());
    }
}
