//! Member provider components
//!
//! Each provider implements one resolution strategy behind the shared
//! [`MemberProviderComponent`] contract and memoizes its own (type, name)
//! lookups, including negative results. Registrable providers clear their
//! memo on mutation and signal the pipeline cache through
//! [`InvalidationListener`](crate::cache::InvalidationListener).

use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use tether_core::{
    MetadataContext, ParamSchema, TypeId, TypeRegistry, Value, ValueConverter, ValueList,
};

use crate::cache::InvalidationListener;
use crate::member::{ArgSpecificity, MemberCandidates};

pub mod attached;
pub mod declared;
pub mod dynamic;
pub mod extension;
pub mod fake;

pub use attached::AttachedMemberProvider;
pub use declared::DeclaredMemberProvider;
pub use dynamic::{DynamicMemberHandler, DynamicMemberProvider};
pub use extension::{ExtensionMemberProvider, ExtensionMethod};
pub use fake::{FakeMemberProvider, FAKE_MEMBER_PREFIX, FAKE_MEMBER_PREFIX_SYMBOL};

/// Default chain ordering of the built-in components
pub mod component_priority {
    /// Attached members resolve ahead of declared ones
    pub const ATTACHED: i32 = 300;
    /// Declared-schema walk
    pub const DECLARED: i32 = 200;
    /// Extension sets
    pub const EXTENSION: i32 = 100;
    /// Dynamic handlers
    pub const DYNAMIC: i32 = 0;
    /// Fake placeholders resolve last
    pub const FAKE: i32 = -100;
}

/// Per-call context threaded through provider calls
///
/// Carries the registry and converter explicitly; providers never reach for
/// globals.
pub struct ResolutionContext<'a> {
    /// Type registry the request resolves against
    pub registry: &'a Arc<TypeRegistry>,
    /// Converter for literal indexer/call arguments
    pub converter: &'a Arc<ValueConverter>,
}

/// Contract shared by all provider components
pub trait MemberProviderComponent: Send + Sync {
    /// Stable component name, used for chain management
    fn component_name(&self) -> &'static str;

    /// Chain ordering; higher runs earlier
    fn priority(&self) -> i32;

    /// Resolve candidates for `name` on `type_id`; empty when the strategy
    /// has nothing to offer
    fn try_get_members(
        &self,
        ctx: &ResolutionContext<'_>,
        type_id: TypeId,
        name: &str,
        metadata: &MetadataContext,
    ) -> MemberCandidates;
}

/// Weak listener set used by registrable providers
#[derive(Default)]
pub(crate) struct ListenerSet {
    listeners: Mutex<Vec<Weak<dyn InvalidationListener>>>,
}

impl ListenerSet {
    pub(crate) fn add(&self, listener: Weak<dyn InvalidationListener>) {
        self.listeners.lock().push(listener);
    }

    /// Notify live listeners, pruning dead ones
    pub(crate) fn notify(&self, type_id: Option<TypeId>) {
        let mut listeners = self.listeners.lock();
        listeners.retain(|weak| match weak.upgrade() {
            Some(listener) => {
                listener.on_members_changed(type_id);
                true
            }
            None => false,
        });
    }
}

/// Result of binding raw literal arguments against a parameter list
pub(crate) struct BoundArgs {
    pub values: Vec<Value>,
    pub specificity: ArgSpecificity,
    /// Scalar-typed parameter count, the non-boxing tie-breaker
    pub scalar_params: usize,
}

/// Convert raw literal arguments against `params`
///
/// Optional parameters may be omitted (bound as null); a rest parameter
/// collapses the remaining arguments into a list. `None` means the candidate
/// does not apply — conversion failures are swallowed, not surfaced.
pub(crate) fn bind_args(
    ctx: &ResolutionContext<'_>,
    raws: &[&str],
    params: &[ParamSchema],
) -> Option<BoundArgs> {
    let mut values = Vec::with_capacity(params.len());
    let mut used_optional = false;
    let mut used_rest = false;
    let mut next = 0usize;

    for param in params {
        if param.rest {
            let mut tail = Vec::new();
            while next < raws.len() {
                tail.push(ctx.converter.convert(raws[next], &param.value_type, ctx.registry)?);
                next += 1;
            }
            values.push(Value::list(ValueList::from_vec(tail)));
            used_rest = true;
        } else if next < raws.len() {
            values.push(ctx.converter.convert(raws[next], &param.value_type, ctx.registry)?);
            next += 1;
        } else if param.optional {
            values.push(Value::Null);
            used_optional = true;
        } else {
            return None;
        }
    }
    if next < raws.len() {
        return None;
    }

    let specificity = if used_rest {
        ArgSpecificity::Rest
    } else if used_optional {
        ArgSpecificity::Optional
    } else {
        ArgSpecificity::Exact
    };
    Some(BoundArgs {
        values,
        specificity,
        scalar_params: params.iter().filter(|p| p.value_type.is_scalar()).count(),
    })
}
