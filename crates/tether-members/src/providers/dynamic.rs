//! Dynamic member provider
//!
//! Members resolved by callback at query time. Handlers run in registration
//! order, optionally scoped to a declaring type by assignability; the first
//! hit wins. Results are memoized like every other provider, so a handler is
//! consulted once per (type, name) until a registration change.

use std::sync::{Arc, Weak};

use parking_lot::RwLock;
use tracing::debug;

use tether_core::{LightMap, MetadataContext, TypeId};

use crate::cache::InvalidationListener;
use crate::member::{MemberCandidates, MemberRef};
use crate::providers::{component_priority, ListenerSet, MemberProviderComponent, ResolutionContext};

/// Callback resolving a member for a (type, name) query
pub type DynamicMemberHandler =
    Arc<dyn Fn(TypeId, &str, &MetadataContext) -> Option<MemberRef> + Send + Sync>;

type MemoKey = (TypeId, Arc<str>);

struct HandlerEntry {
    token: u64,
    scope: Option<TypeId>,
    handler: DynamicMemberHandler,
}

/// Provider over registered dynamic handlers
pub struct DynamicMemberProvider {
    handlers: RwLock<Vec<HandlerEntry>>,
    memo: RwLock<LightMap<MemoKey, MemberCandidates>>,
    listeners: ListenerSet,
    next_token: std::sync::atomic::AtomicU64,
}

impl DynamicMemberProvider {
    /// Create the provider
    pub fn new() -> Self {
        Self {
            handlers: RwLock::new(Vec::new()),
            memo: RwLock::new(LightMap::new()),
            listeners: ListenerSet::default(),
            next_token: std::sync::atomic::AtomicU64::new(1),
        }
    }

    /// Register a handler; `scope` restricts it to types assignable to the
    /// given one. Returns a token for unregistration.
    pub fn register_handler(
        &self,
        scope: Option<TypeId>,
        handler: DynamicMemberHandler,
    ) -> u64 {
        let token = self
            .next_token
            .fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        self.handlers.write().push(HandlerEntry {
            token,
            scope,
            handler,
        });
        debug!(token, "dynamic member handler registered");
        self.invalidate(scope);
        token
    }

    /// Remove a handler by its token
    pub fn unregister_handler(&self, token: u64) -> bool {
        let scope = {
            let mut handlers = self.handlers.write();
            let position = handlers.iter().position(|h| h.token == token);
            match position {
                Some(i) => Some(handlers.remove(i).scope),
                None => None,
            }
        };
        match scope {
            Some(scope) => {
                debug!(token, "dynamic member handler unregistered");
                self.invalidate(scope);
                true
            }
            None => false,
        }
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

impl Default for DynamicMemberProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MemberProviderComponent for DynamicMemberProvider {
    fn component_name(&self) -> &'static str {
        "dynamic"
    }

    fn priority(&self) -> i32 {
        component_priority::DYNAMIC
    }

    fn try_get_members(
        &self,
        ctx: &ResolutionContext<'_>,
        type_id: TypeId,
        name: &str,
        metadata: &MetadataContext,
    ) -> MemberCandidates {
        let key: MemoKey = (type_id, Arc::from(name));
        if let Some(hit) = self.memo.read().get(&key) {
            return hit.clone();
        }

        let mut resolved = MemberCandidates::new();
        {
            let handlers = self.handlers.read();
            for entry in handlers.iter() {
                if let Some(scope) = entry.scope {
                    if !ctx.registry.is_assignable(type_id, scope) {
                        continue;
                    }
                }
                if let Some(member) = (entry.handler)(type_id, name, metadata) {
                    resolved.push(member);
                    break;
                }
            }
        }
        self.memo.write().insert(key, resolved.clone());
        resolved
    }
}

impl std::fmt::Debug for DynamicMemberProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DynamicMemberProvider")
            .field("handlers", &self.handlers.read().len())
            .field("memo", &self.memo.read().len())
            .finish()
    }
}
