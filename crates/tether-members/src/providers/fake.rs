//! Fake member provider
//!
//! Binding paths sometimes need a target that does not exist on any type —
//! design-time placeholders, relative-source markers. Names carrying the
//! reserved prefix resolve to a placeholder constant member that reads null,
//! swallows writes, and observes nothing, so the pipeline never fails on
//! them.

use std::sync::Arc;

use parking_lot::RwLock;

use tether_core::{LightMap, MetadataContext, TypeId};

use crate::member::{Member, MemberCandidates};
use crate::providers::{component_priority, MemberProviderComponent, ResolutionContext};

/// Reserved prefix character for fake member names
pub const FAKE_MEMBER_PREFIX: char = '#';

/// Reserved prefix word for fake member names
pub const FAKE_MEMBER_PREFIX_SYMBOL: &str = "Fake";

type MemoKey = (TypeId, Arc<str>);

/// Provider answering reserved placeholder names
pub struct FakeMemberProvider {
    memo: RwLock<LightMap<MemoKey, MemberCandidates>>,
}

impl FakeMemberProvider {
    /// Create the provider
    pub fn new() -> Self {
        Self {
            memo: RwLock::new(LightMap::new()),
        }
    }

    /// Whether `name` is reserved for fake members
    pub fn is_fake_name(name: &str) -> bool {
        name.starts_with(FAKE_MEMBER_PREFIX) || name.starts_with(FAKE_MEMBER_PREFIX_SYMBOL)
    }
}

impl Default for FakeMemberProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MemberProviderComponent for FakeMemberProvider {
    fn component_name(&self) -> &'static str {
        "fake"
    }

    fn priority(&self) -> i32 {
        component_priority::FAKE
    }

    fn try_get_members(
        &self,
        _ctx: &ResolutionContext<'_>,
        type_id: TypeId,
        name: &str,
        _metadata: &MetadataContext,
    ) -> MemberCandidates {
        if !Self::is_fake_name(name) {
            return MemberCandidates::new();
        }
        let key: MemoKey = (type_id, Arc::from(name));
        if let Some(hit) = self.memo.read().get(&key) {
            return hit.clone();
        }
        let resolved: MemberCandidates =
            smallvec::smallvec![Arc::new(Member::fake(name, type_id))];
        self.memo.write().insert(key, resolved.clone());
        resolved
    }
}

impl std::fmt::Debug for FakeMemberProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FakeMemberProvider")
            .field("memo", &self.memo.read().len())
            .finish()
    }
}
