//! Indexer accessor decoration
//!
//! For indexer-syntax names the providers did not serve (list elements are
//! the declared provider's job), the decorator resolves a `get_<Base>` /
//! `set_<Base>` method pair through the decorated chain, pairs them by
//! arity and value type, converts the literal arguments against the getter's
//! parameters, and builds one dedicated indexer member wrapping both.
//! Segments without indexer syntax fall through to the underlying pipeline
//! untouched.

use std::sync::Arc;

use smallvec::smallvec;
use tracing::trace;

use tether_core::{TypeId, ValueType};

use crate::member::{Member, MemberCandidates, MemberRef, MethodMember};
use crate::path;
use crate::providers::{bind_args, BoundArgs, ResolutionContext};

/// Builds indexer accessor members from getter/setter method pairs
#[derive(Debug, Default, Clone, Copy)]
pub struct IndexerAccessorDecorator;

impl IndexerAccessorDecorator {
    /// Create the decorator
    pub fn new() -> Self {
        Self
    }

    /// Resolve `name` as an indexer pair through `resolve`, the decorated
    /// chain. `None` means the name carries no indexer syntax; `Some` with
    /// an empty result means the syntax matched but no pair applies.
    pub fn try_resolve(
        &self,
        ctx: &ResolutionContext<'_>,
        type_id: TypeId,
        name: &str,
        resolve: &dyn Fn(&str) -> MemberCandidates,
    ) -> Option<MemberCandidates> {
        let (base, raws) = path::indexer_args_raw(name)?;
        let base = if base.is_empty() { "Item" } else { base };
        trace!(%type_id, name, "resolving indexer accessor pair");

        let getters = resolve(&format!("get_{}", base));
        let Some((getter_ref, getter, bound)) = self.match_getter(ctx, &getters, &raws) else {
            return Some(MemberCandidates::new());
        };

        let setters = resolve(&format!("set_{}", base));
        let setter = self.match_setter(&setters, getter, getter.return_type());

        let member = Member::indexer(
            name,
            getter_ref.declaring_type(),
            getter.return_type(),
            method_fn(getter),
            setter,
            bound.values,
            getter_ref.origin(),
        );
        Some(smallvec![Arc::new(member)])
    }

    /// Pick the getter whose parameters convert the arguments, preferring
    /// the most scalar parameters on a tie of specificity
    #[allow(clippy::type_complexity)]
    fn match_getter<'m>(
        &self,
        ctx: &ResolutionContext<'_>,
        getters: &'m MemberCandidates,
        raws: &[&str],
    ) -> Option<(&'m MemberRef, &'m MethodMember, BoundArgs)> {
        let mut best: Option<(&MemberRef, &MethodMember, BoundArgs)> = None;
        for candidate in getters {
            let Some(method) = candidate.as_method() else {
                continue;
            };
            if method.params().len() != raws.len() {
                continue;
            }
            let Some(bound) = bind_args(ctx, raws, method.params()) else {
                trace!(member = %candidate.name(), "indexer arguments did not convert, skipping");
                continue;
            };
            let better = match &best {
                Some((_, _, current)) => {
                    (bound.specificity.rank(), bound.scalar_params)
                        > (current.specificity.rank(), current.scalar_params)
                }
                None => true,
            };
            if better {
                best = Some((candidate, method, bound));
            }
        }
        best
    }

    /// Pair a setter by arity (getter arity + 1) and trailing value type
    fn match_setter(
        &self,
        setters: &MemberCandidates,
        getter: &MethodMember,
        value_type: ValueType,
    ) -> Option<tether_core::MethodFn> {
        for candidate in setters {
            let Some(method) = candidate.as_method() else {
                continue;
            };
            let params = method.params();
            if params.len() != getter.params().len() + 1 {
                continue;
            }
            let key_params_match = params
                .iter()
                .zip(getter.params())
                .all(|(s, g)| s.value_type == g.value_type || s.value_type == ValueType::Any);
            if !key_params_match {
                continue;
            }
            let last = &params[params.len() - 1];
            if last.value_type == ValueType::Any
                || value_type == ValueType::Any
                || last.value_type == value_type
            {
                return Some(method_fn(method));
            }
        }
        None
    }
}

/// Rewrap a resolved method as a bare invoke closure for the indexer payload
fn method_fn(method: &MethodMember) -> tether_core::MethodFn {
    let inner = method.clone();
    Arc::new(move |target, args| inner.invoke(target, args))
}
