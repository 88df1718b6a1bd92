//! Extension member provider
//!
//! Extension sets are named groups of methods defined away from the types
//! they apply to; a method's receiver type decides where it resolves. Two
//! phases per request: a plain name yields the method as a get-capable
//! member, call syntax (`Name(args)`) parses and converts the literal
//! arguments and yields a bound accessor.

use std::sync::{Arc, Weak};

use parking_lot::RwLock;
use tracing::{debug, trace};

use tether_core::{LightMap, MetadataContext, MethodFn, ParamSchema, TypeId, ValueType};

use crate::cache::InvalidationListener;
use crate::member::{Member, MemberCandidates, MemberOrigin, MemberRef};
use crate::path;
use crate::providers::{bind_args, component_priority, ListenerSet, MemberProviderComponent, ResolutionContext};

/// A method defined in an extension set
///
/// The receiver is the bound target at invocation time, not a declared
/// parameter: `invoke` gets it as the target value.
pub struct ExtensionMethod {
    /// Method name
    pub name: Arc<str>,
    /// Receiver type the method applies to; `Any` applies everywhere
    pub receiver: ValueType,
    /// Declared parameters (excluding the receiver)
    pub params: Vec<ParamSchema>,
    /// Return type
    pub return_type: ValueType,
    /// Implementation
    pub invoke: MethodFn,
}

impl ExtensionMethod {
    /// Create an extension method
    pub fn new(
        name: impl Into<Arc<str>>,
        receiver: ValueType,
        params: Vec<ParamSchema>,
        return_type: ValueType,
        invoke: MethodFn,
    ) -> Self {
        Self {
            name: name.into(),
            receiver,
            params,
            return_type,
            invoke,
        }
    }
}

struct ExtensionSet {
    name: Arc<str>,
    methods: Vec<Arc<ExtensionMethod>>,
}

type MemoKey = (TypeId, Arc<str>);

/// Provider over registered extension sets
pub struct ExtensionMemberProvider {
    sets: RwLock<Vec<ExtensionSet>>,
    memo: RwLock<LightMap<MemoKey, MemberCandidates>>,
    listeners: ListenerSet,
}

impl ExtensionMemberProvider {
    /// Create the provider
    pub fn new() -> Self {
        Self {
            sets: RwLock::new(Vec::new()),
            memo: RwLock::new(LightMap::new()),
            listeners: ListenerSet::default(),
        }
    }

    /// Register a named set of extension methods, replacing any set with the
    /// same name
    pub fn register_set(&self, name: impl Into<Arc<str>>, methods: Vec<ExtensionMethod>) {
        let name = name.into();
        debug!(set = %name, methods = methods.len(), "extension set registered");
        let set = ExtensionSet {
            name: name.clone(),
            methods: methods.into_iter().map(Arc::new).collect(),
        };
        {
            let mut sets = self.sets.write();
            sets.retain(|s| s.name != name);
            sets.push(set);
        }
        self.invalidate();
    }

    /// Remove a set by name
    pub fn unregister_set(&self, name: &str) -> bool {
        let removed = {
            let mut sets = self.sets.write();
            let before = sets.len();
            sets.retain(|s| s.name.as_ref() != name);
            before != sets.len()
        };
        if removed {
            debug!(set = %name, "extension set unregistered");
            self.invalidate();
        }
        removed
    }

    /// Subscribe a pipeline cache to registration changes
    pub fn add_invalidation_listener(&self, listener: Weak<dyn InvalidationListener>) {
        self.listeners.add(listener);
    }

    /// Extension sets are not tied to one declaring type: mutation clears
    /// everything.
    fn invalidate(&self) {
        self.memo.write().clear();
        self.listeners.notify(None);
    }

    fn applies(&self, ctx: &ResolutionContext<'_>, type_id: TypeId, receiver: &ValueType) -> bool {
        match receiver {
            ValueType::Any => true,
            ValueType::List => type_id == ctx.registry.list_type(),
            ValueType::Object(declared) => ctx.registry.is_assignable(type_id, *declared),
            _ => false,
        }
    }

    fn resolve_uncached(
        &self,
        ctx: &ResolutionContext<'_>,
        type_id: TypeId,
        name: &str,
    ) -> MemberCandidates {
        match path::method_args_raw(name) {
            Some((base, raws)) => self.resolve_call(ctx, type_id, name, base, &raws),
            None => self.resolve_plain(ctx, type_id, name),
        }
    }

    fn resolve_plain(
        &self,
        ctx: &ResolutionContext<'_>,
        type_id: TypeId,
        name: &str,
    ) -> MemberCandidates {
        let sets = self.sets.read();
        let mut out = MemberCandidates::new();
        for set in sets.iter() {
            for method in &set.methods {
                if method.name.as_ref() != name
                    || !self.applies(ctx, type_id, &method.receiver)
                {
                    continue;
                }
                out.push(Arc::new(Member::method(
                    method.name.clone(),
                    type_id,
                    method.params.clone(),
                    method.return_type,
                    method.invoke.clone(),
                    MemberOrigin::Extension,
                )));
            }
        }
        out
    }

    fn resolve_call(
        &self,
        ctx: &ResolutionContext<'_>,
        type_id: TypeId,
        name: &str,
        base: &str,
        raws: &[&str],
    ) -> MemberCandidates {
        let sets = self.sets.read();
        let mut best_rank: Option<(u8, usize)> = None;
        let mut best: Vec<MemberRef> = Vec::new();

        for set in sets.iter() {
            for method in &set.methods {
                if method.name.as_ref() != base
                    || !self.applies(ctx, type_id, &method.receiver)
                {
                    continue;
                }
                let Some(bound) = bind_args(ctx, raws, &method.params) else {
                    trace!(name, set = %set.name, "extension arguments did not convert, skipping");
                    continue;
                };
                let rank = (bound.specificity.rank(), bound.scalar_params);
                let member = Arc::new(Member::bound_method(
                    name,
                    type_id,
                    method.params.clone(),
                    method.return_type,
                    method.invoke.clone(),
                    bound.values,
                    bound.specificity,
                    MemberOrigin::Extension,
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

impl Default for ExtensionMemberProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MemberProviderComponent for ExtensionMemberProvider {
    fn component_name(&self) -> &'static str {
        "extension"
    }

    fn priority(&self) -> i32 {
        component_priority::EXTENSION
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

impl std::fmt::Debug for ExtensionMemberProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtensionMemberProvider")
            .field("sets", &self.sets.read().len())
            .field("memo", &self.memo.read().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::member::MemberKind;
    use tether_core::{MemberError, TypeRegistry, Value, ValueConverter, ValueList};

    fn sum_method() -> ExtensionMethod {
        ExtensionMethod::new(
            "Sum",
            ValueType::List,
            Vec::new(),
            ValueType::Int,
            Arc::new(|target, _| {
                let list = target
                    .as_list()
                    .ok_or_else(|| MemberError::type_mismatch("list", target.type_name()))?;
                let total: i64 = list
                    .snapshot()
                    .iter()
                    .filter_map(|v| v.as_int())
                    .sum();
                Ok(Value::int(total))
            }),
        )
    }

    fn clamp_method() -> ExtensionMethod {
        ExtensionMethod::new(
            "Clamp",
            ValueType::Any,
            vec![
                ParamSchema::new("min", ValueType::Int),
                ParamSchema::new("max", ValueType::Int),
            ],
            ValueType::Int,
            Arc::new(|target, args| {
                let v = target.as_int().unwrap_or(0);
                let min = args[0].as_int().unwrap_or(i64::MIN);
                let max = args[1].as_int().unwrap_or(i64::MAX);
                Ok(Value::int(v.clamp(min, max)))
            }),
        )
    }

    fn fixture() -> (Arc<TypeRegistry>, Arc<ValueConverter>) {
        (
            Arc::new(TypeRegistry::new()),
            Arc::new(ValueConverter::new()),
        )
    }

    #[test]
    fn test_get_only_phase_on_list() {
        let (registry, converter) = fixture();
        let provider = ExtensionMemberProvider::new();
        provider.register_set("list-ext", vec![sum_method()]);

        let ctx = ResolutionContext {
            registry: &registry,
            converter: &converter,
        };
        let list_type = registry.list_type();
        let members = provider.try_get_members(&ctx, list_type, "Sum", MetadataContext::empty());
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].kind(), MemberKind::Method);
        assert_eq!(members[0].origin(), MemberOrigin::Extension);

        let list = ValueList::from_vec(vec![Value::int(1), Value::int(2), Value::int(3)]);
        assert_eq!(
            members[0].get_value(&Value::list(list)).unwrap(),
            Value::int(6)
        );
    }

    #[test]
    fn test_call_syntax_phase() {
        let (registry, converter) = fixture();
        let provider = ExtensionMemberProvider::new();
        provider.register_set("num-ext", vec![clamp_method()]);

        let ctx = ResolutionContext {
            registry: &registry,
            converter: &converter,
        };
        let vm = registry
            .register(tether_core::TypeDescriptor::builder("Num"))
            .unwrap();
        let members =
            provider.try_get_members(&ctx, vm, "Clamp(0, 10)", MetadataContext::empty());
        assert_eq!(members.len(), 1);
        assert_eq!(
            members[0].get_value(&Value::int(42)).unwrap(),
            Value::int(10)
        );
    }

    #[test]
    fn test_receiver_filter() {
        let (registry, converter) = fixture();
        let provider = ExtensionMemberProvider::new();
        provider.register_set("list-ext", vec![sum_method()]);

        let ctx = ResolutionContext {
            registry: &registry,
            converter: &converter,
        };
        let other = registry
            .register(tether_core::TypeDescriptor::builder("Plain"))
            .unwrap();
        assert!(provider
            .try_get_members(&ctx, other, "Sum", MetadataContext::empty())
            .is_empty());
    }

    #[test]
    fn test_unregister_set() {
        let (registry, converter) = fixture();
        let provider = ExtensionMemberProvider::new();
        provider.register_set("list-ext", vec![sum_method()]);
        let ctx = ResolutionContext {
            registry: &registry,
            converter: &converter,
        };
        let list_type = registry.list_type();

        assert!(!provider
            .try_get_members(&ctx, list_type, "Sum", MetadataContext::empty())
            .is_empty());
        assert!(provider.unregister_set("list-ext"));
        assert!(provider
            .try_get_members(&ctx, list_type, "Sum", MetadataContext::empty())
            .is_empty());
        assert!(!provider.unregister_set("list-ext"));
    }
}
