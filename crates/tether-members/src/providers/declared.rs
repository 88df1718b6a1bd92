//! Declared-schema member provider
//!
//! Walks the requested type's descriptor chain for fields, properties,
//! events, and methods by name. Indexer syntax against the builtin list type
//! yields an element accessor; method-call syntax binds literal arguments
//! against the declared overloads, preferring the candidate with the most
//! scalar parameters when the convertible-argument count ties.
//!
//! Candidates from every level of the chain are returned; the selector keeps
//! the one declared closest to the requested type.

use std::sync::Arc;

use parking_lot::RwLock;
use smallvec::smallvec;
use tracing::trace;

use tether_core::{LightMap, MetadataContext, TypeId};

use crate::member::{Member, MemberCandidates, MemberOrigin, MemberRef};
use crate::path;
use crate::providers::{bind_args, component_priority, MemberProviderComponent, ResolutionContext};

type MemoKey = (TypeId, Arc<str>);

/// Provider over registered type descriptors
pub struct DeclaredMemberProvider {
    memo: RwLock<LightMap<MemoKey, MemberCandidates>>,
}

impl DeclaredMemberProvider {
    /// Create the provider
    pub fn new() -> Self {
        Self {
            memo: RwLock::new(LightMap::new()),
        }
    }

    fn resolve_uncached(
        &self,
        ctx: &ResolutionContext<'_>,
        type_id: TypeId,
        name: &str,
    ) -> MemberCandidates {
        if let Some((base, raws)) = path::indexer_args_raw(name) {
            return self.resolve_list_element(ctx, type_id, name, base, &raws);
        }
        if let Some((base, raws)) = path::method_args_raw(name) {
            return self.resolve_bound_methods(ctx, type_id, name, base, &raws);
        }
        self.resolve_plain(ctx, type_id, name)
    }

    fn resolve_plain(
        &self,
        ctx: &ResolutionContext<'_>,
        type_id: TypeId,
        name: &str,
    ) -> MemberCandidates {
        let mut out = MemberCandidates::new();
        for desc in ctx.registry.hierarchy(type_id) {
            if let Some((schema, slot)) = desc.field(name) {
                out.push(Arc::new(Member::field(
                    schema.name.clone(),
                    desc.id(),
                    schema.value_type,
                    slot,
                    schema.readonly,
                )));
            }
            if let Some((schema, slot)) = desc.static_field(name) {
                out.push(Arc::new(Member::static_field(
                    schema.name.clone(),
                    desc.id(),
                    schema.value_type,
                    slot,
                    schema.readonly,
                    desc.clone(),
                )));
            }
            if let Some(schema) = desc.property(name) {
                out.push(Arc::new(Member::property(
                    schema.name.clone(),
                    desc.id(),
                    schema.value_type,
                    Some(desc.clone()),
                    schema.backing.clone(),
                    MemberOrigin::Instance,
                )));
            }
            if desc.event(name).is_some() {
                out.push(Arc::new(Member::event(name, desc.id())));
            }
            for schema in desc.methods_named(name) {
                out.push(Arc::new(Member::method(
                    schema.name.clone(),
                    desc.id(),
                    schema.params.clone(),
                    schema.return_type,
                    schema.invoke.clone(),
                    MemberOrigin::Instance,
                )));
            }
        }
        out
    }

    fn resolve_list_element(
        &self,
        ctx: &ResolutionContext<'_>,
        type_id: TypeId,
        name: &str,
        base: &str,
        raws: &[&str],
    ) -> MemberCandidates {
        if type_id != ctx.registry.list_type() {
            return MemberCandidates::new();
        }
        if !(base.is_empty() || base == "Item") || raws.len() != 1 {
            return MemberCandidates::new();
        }
        let index = match ctx
            .converter
            .convert(raws[0], &tether_core::ValueType::Int, ctx.registry)
            .and_then(|v| v.as_int())
        {
            Some(i) if i >= 0 => i as usize,
            _ => {
                trace!(name, "list element index did not convert, skipping");
                return MemberCandidates::new();
            }
        };
        smallvec![Arc::new(Member::array_element(name, type_id, index))]
    }

    fn resolve_bound_methods(
        &self,
        ctx: &ResolutionContext<'_>,
        type_id: TypeId,
        name: &str,
        base: &str,
        raws: &[&str],
    ) -> MemberCandidates {
        // Bind each overload; keep only the best tier of (specificity,
        // scalar-parameter count). A remaining tie is the selector's problem.
        let mut best_rank: Option<(u8, usize)> = None;
        let mut best: Vec<MemberRef> = Vec::new();

        for desc in ctx.registry.hierarchy(type_id) {
            for schema in desc.methods_named(base) {
                let Some(bound) = bind_args(ctx, raws, &schema.params) else {
                    trace!(name, method = %schema.name, "arguments did not convert, skipping candidate");
                    continue;
                };
                let rank = (bound.specificity.rank(), bound.scalar_params);
                let member = Arc::new(Member::bound_method(
                    name,
                    desc.id(),
                    schema.params.clone(),
                    schema.return_type,
                    schema.invoke.clone(),
                    bound.values,
                    bound.specificity,
                    MemberOrigin::Instance,
                ));
                match best_rank {
                    Some(current) if rank < current => {}
                    Some(current) if rank == current => best.push(member),
                    _ => {
                        best_rank = Some(rank);
                        best = vec![member];
                    }
                }
            }
        }
        best.into_iter().collect()
    }
}

impl Default for DeclaredMemberProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MemberProviderComponent for DeclaredMemberProvider {
    fn component_name(&self) -> &'static str {
        "declared"
    }

    fn priority(&self) -> i32 {
        component_priority::DECLARED
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
        let resolved = self.resolve_uncached(ctx, type_id, name);
        self.memo.write().insert(key, resolved.clone());
        resolved
    }
}

impl std::fmt::Debug for DeclaredMemberProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeclaredMemberProvider")
            .field("memo", &self.memo.read().len())
            .finish()
    }
}
