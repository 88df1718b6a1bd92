//! Attached member provider
//!
//! Application code attaches members to types at runtime:
//! `register(declaring_type, member)` makes the member resolvable on the
//! declaring type and everything assignable to it; `unregister` takes it
//! back. Registration mutation clears the provider memo wholesale and
//! signals type-scoped invalidation to the pipeline cache.

use std::sync::{Arc, Weak};

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use tracing::debug;

use tether_core::{LightMap, MetadataContext, TypeId};

use crate::cache::InvalidationListener;
use crate::member::{MemberCandidates, MemberRef};
use crate::providers::{component_priority, ListenerSet, MemberProviderComponent, ResolutionContext};

type MemoKey = (TypeId, Arc<str>);

struct AttachedRegistration {
    declaring: TypeId,
    member: MemberRef,
}

/// Provider over runtime member registrations
pub struct AttachedMemberProvider {
    registrations: RwLock<FxHashMap<Arc<str>, Vec<AttachedRegistration>>>,
    memo: RwLock<LightMap<MemoKey, MemberCandidates>>,
    listeners: ListenerSet,
}

impl AttachedMemberProvider {
    /// Create the provider
    pub fn new() -> Self {
        Self {
            registrations: RwLock::new(FxHashMap::default()),
            memo: RwLock::new(LightMap::new()),
            listeners: ListenerSet::default(),
        }
    }

    /// Attach `member` to `declaring` under the member's own name
    pub fn register(&self, declaring: TypeId, member: MemberRef) {
        let name = member.name().clone();
        debug!(member = %name, type_id = %declaring, "attached member registered");
        self.registrations
            .write()
            .entry(name)
            .or_default()
            .push(AttachedRegistration { declaring, member });
        self.invalidate(Some(declaring));
    }

    /// Remove registrations on `declaring`; `name` narrows to one member,
    /// `None` removes them all. Returns the number removed.
    pub fn unregister(&self, declaring: TypeId, name: Option<&str>) -> usize {
        let mut removed = 0usize;
        {
            let mut registrations = self.registrations.write();
            match name {
                Some(name) => {
                    if let Some(entries) = registrations.get_mut(name) {
                        let before = entries.len();
                        entries.retain(|r| r.declaring != declaring);
                        removed = before - entries.len();
                        if entries.is_empty() {
                            registrations.remove(name);
                        }
                    }
                }
                None => {
                    registrations.retain(|_, entries| {
                        let before = entries.len();
                        entries.retain(|r| r.declaring != declaring);
                        removed += before - entries.len();
                        !entries.is_empty()
                    });
                }
            }
        }
        if removed > 0 {
            debug!(type_id = %declaring, removed, "attached members unregistered");
            self.invalidate(Some(declaring));
        }
        removed
    }

    /// Subscribe a pipeline cache to registration changes
    pub fn add_invalidation_listener(&self, listener: Weak<dyn InvalidationListener>) {
        self.listeners.add(listener);
    }

    fn invalidate(&self, type_id: Option<TypeId>) {
        self.memo.write().clear();
        self.listeners.notify(type_id);
    }
}

impl Default for AttachedMemberProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MemberProviderComponent for AttachedMemberProvider {
    fn component_name(&self) -> &'static str {
        "attached"
    }

    fn priority(&self) -> i32 {
        component_priority::ATTACHED
    }

    fn try_get_members(
        &self,
        ctx: &ResolutionContext<'_>,
        type_id: TypeId,
        name: &str,
        _metadata: &MetadataContext,
    ) -> MemberCandidates {
        let key: MemoKey = (type_id, Arc::from(name));
        if let Some(hit) = self.memo.read().get(&key) {
            return hit.clone();
        }

        let resolved: MemberCandidates = {
            let registrations = self.registrations.read();
            match registrations.get(name) {
                Some(entries) => entries
                    .iter()
                    .filter(|r| ctx.registry.is_assignable(type_id, r.declaring))
                    .map(|r| r.member.clone())
                    .collect(),
                None => MemberCandidates::new(),
            }
        };
        self.memo.write().insert(key, resolved.clone());
        resolved
    }
}

impl std::fmt::Debug for AttachedMemberProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AttachedMemberProvider")
            .field("registrations", &self.registrations.read().len())
            .field("memo", &self.memo.read().len())
            .finish()
    }
}
