//! Member manager
//!
//! The manager owns the resolution pipeline: an ordered component chain, the
//! selector, the request-shaped cache, and the indexer decorator. A request
//! flows cache → providers → (indexer decoration) → selector → cache, and
//! every stage is a pure function of the current registration state.
//!
//! Registrable providers are wired to the cache at build time so attaching
//! or removing members invalidates exactly the affected cache partition.

use std::sync::{Arc, Weak};

use tracing::debug;

use tether_core::{MemberResult, MetadataContext, TypeId, TypeRegistry, ValueConverter};

use crate::cache::{CacheKey, InvalidationListener, MemberCache};
use crate::indexer::IndexerAccessorDecorator;
use crate::member::{MemberCandidates, MemberFlags, MemberKindMask, MemberRef};
use crate::providers::{
    AttachedMemberProvider, DeclaredMemberProvider, DynamicMemberProvider,
    ExtensionMemberProvider, FakeMemberProvider, MemberProviderComponent, ResolutionContext,
};
use crate::selector::MemberSelector;

/// Owner of the member resolution pipeline
pub struct MemberManager {
    registry: Arc<TypeRegistry>,
    converter: Arc<ValueConverter>,
    components: Vec<Arc<dyn MemberProviderComponent>>,
    selector: MemberSelector,
    cache: Arc<MemberCache>,
    indexer: IndexerAccessorDecorator,

    attached: Arc<AttachedMemberProvider>,
    dynamic: Arc<DynamicMemberProvider>,
    extension: Arc<ExtensionMemberProvider>,
}

impl MemberManager {
    /// Start building a manager over `registry`
    pub fn builder(registry: Arc<TypeRegistry>) -> MemberManagerBuilder {
        MemberManagerBuilder {
            registry,
            converter: None,
            extra_components: Vec::new(),
        }
    }

    /// The registry requests resolve against
    pub fn registry(&self) -> &Arc<TypeRegistry> {
        &self.registry
    }

    /// The converter used for literal arguments
    pub fn converter(&self) -> &Arc<ValueConverter> {
        &self.converter
    }

    /// The attached-member registration surface
    pub fn attached_members(&self) -> &Arc<AttachedMemberProvider> {
        &self.attached
    }

    /// The dynamic-member registration surface
    pub fn dynamic_members(&self) -> &Arc<DynamicMemberProvider> {
        &self.dynamic
    }

    /// The extension-set registration surface
    pub fn extension_members(&self) -> &Arc<ExtensionMemberProvider> {
        &self.extension
    }

    /// Invalidation hook for custom registrable components
    pub fn invalidation_listener(&self) -> Weak<dyn InvalidationListener> {
        let cache: Arc<dyn InvalidationListener> = self.cache.clone();
        let weak: Weak<dyn InvalidationListener> = Arc::downgrade(&cache);
        weak
    }

    /// Explicitly drop cached results, scoped to one type or everything
    pub fn invalidate(&self, type_id: Option<TypeId>) {
        self.cache.invalidate(type_id);
    }

    /// Number of cached request shapes
    pub fn cached_requests(&self) -> usize {
        self.cache.len()
    }

    /// Resolve the single best member for the request, or `None`
    pub fn try_get_member(
        &self,
        type_id: TypeId,
        name: &str,
        kinds: MemberKindMask,
        flags: MemberFlags,
        metadata: &MetadataContext,
    ) -> MemberResult<Option<MemberRef>> {
        let selected = self.resolve(type_id, name, kinds, flags, metadata)?;
        Ok(selected.first().cloned())
    }

    /// Resolve every selected member for the request, ordered by descending
    /// priority
    pub fn try_get_members(
        &self,
        type_id: TypeId,
        name: &str,
        kinds: MemberKindMask,
        flags: MemberFlags,
        metadata: &MetadataContext,
    ) -> MemberResult<MemberCandidates> {
        self.resolve(type_id, name, kinds, flags, metadata)
    }

    /// Append a component and rebuild the chain
    pub fn add_component(&mut self, component: Arc<dyn MemberProviderComponent>) {
        self.components.push(component);
        self.rebuild_pipeline();
    }

    /// Remove a component by name; returns whether anything was removed
    pub fn remove_component(&mut self, name: &str) -> bool {
        let before = self.components.len();
        self.components.retain(|c| c.component_name() != name);
        let removed = self.components.len() != before;
        if removed {
            self.rebuild_pipeline();
        }
        removed
    }

    /// Re-sort the chain and drop every cached result
    fn rebuild_pipeline(&mut self) {
        self.components
            .sort_by_key(|c| std::cmp::Reverse(c.priority()));
        self.cache.invalidate(None);
        debug!(components = self.components.len(), "member pipeline rebuilt");
    }

    fn resolve(
        &self,
        type_id: TypeId,
        name: &str,
        kinds: MemberKindMask,
        flags: MemberFlags,
        metadata: &MetadataContext,
    ) -> MemberResult<MemberCandidates> {
        let key = CacheKey {
            type_id,
            name: Arc::from(name),
            kinds,
            flags,
        };
        if let Some(hit) = self.cache.get(&key) {
            return Ok(hit);
        }

        let ctx = ResolutionContext {
            registry: &self.registry,
            converter: &self.converter,
        };
        let mut candidates = self.collect(&ctx, type_id, name, metadata);
        if candidates.is_empty() {
            let chain = |segment: &str| self.collect(&ctx, type_id, segment, metadata);
            if let Some(decorated) = self.indexer.try_resolve(&ctx, type_id, name, &chain) {
                candidates = decorated;
            }
        }

        let selected = self
            .selector
            .select(&self.registry, type_id, candidates, kinds, flags)?;
        self.cache.insert(key, selected.clone());
        Ok(selected)
    }

    fn collect(
        &self,
        ctx: &ResolutionContext<'_>,
        type_id: TypeId,
        name: &str,
        metadata: &MetadataContext,
    ) -> MemberCandidates {
        let mut out = MemberCandidates::new();
        for component in &self.components {
            out.extend(component.try_get_members(ctx, type_id, name, metadata));
        }
        out
    }
}

impl std::fmt::Debug for MemberManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemberManager")
            .field("components", &self.components.len())
            .field("cached", &self.cache.len())
            .finish()
    }
}

/// Builder assembling the default pipeline
pub struct MemberManagerBuilder {
    registry: Arc<TypeRegistry>,
    converter: Option<Arc<ValueConverter>>,
    extra_components: Vec<Arc<dyn MemberProviderComponent>>,
}

impl MemberManagerBuilder {
    /// Use a pre-configured converter
    pub fn converter(mut self, converter: Arc<ValueConverter>) -> Self {
        self.converter = Some(converter);
        self
    }

    /// Add a custom component to the chain
    pub fn component(mut self, component: Arc<dyn MemberProviderComponent>) -> Self {
        self.extra_components.push(component);
        self
    }

    /// Assemble the manager with the default component chain and cache
    /// wiring
    pub fn build(self) -> MemberManager {
        let cache = Arc::new(MemberCache::new());
        let attached = Arc::new(AttachedMemberProvider::new());
        let dynamic = Arc::new(DynamicMemberProvider::new());
        let extension = Arc::new(ExtensionMemberProvider::new());
        let declared = Arc::new(DeclaredMemberProvider::new());
        let fake = Arc::new(FakeMemberProvider::new());

        let cache_listener: Arc<dyn InvalidationListener> = cache.clone();
        let listener: Weak<dyn InvalidationListener> = Arc::downgrade(&cache_listener);
        attached.add_invalidation_listener(listener.clone());
        dynamic.add_invalidation_listener(listener.clone());
        extension.add_invalidation_listener(listener);

        let mut components: Vec<Arc<dyn MemberProviderComponent>> = vec![
            attached.clone(),
            declared,
            extension.clone(),
            dynamic.clone(),
            fake,
        ];
        components.extend(self.extra_components);
        components.sort_by_key(|c| std::cmp::Reverse(c.priority()));

        MemberManager {
            registry: self.registry,
            converter: self
                .converter
                .unwrap_or_else(|| Arc::new(ValueConverter::new())),
            components,
            selector: MemberSelector::new(),
            cache,
            indexer: IndexerAccessorDecorator::new(),
            attached,
            dynamic,
            extension,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::member::{Member, MemberKind, MemberOrigin};
    use tether_core::{TypeDescriptor, Value, ValueType};

    fn manager() -> (MemberManager, TypeId) {
        let registry = Arc::new(TypeRegistry::new());
        let person = registry
            .register(
                TypeDescriptor::builder("Person")
                    .field("name", ValueType::Str)
                    .field("age", ValueType::Int),
            )
            .unwrap();
        (MemberManager::builder(registry).build(), person)
    }

    #[test]
    fn test_resolution_and_cache_identity() {
        let (manager, person) = manager();
        let first = manager
            .try_get_member(
                person,
                "name",
                MemberKindMask::all(),
                MemberFlags::all(),
                MetadataContext::empty(),
            )
            .unwrap()
            .unwrap();
        let second = manager
            .try_get_member(
                person,
                "name",
                MemberKindMask::all(),
                MemberFlags::all(),
                MetadataContext::empty(),
            )
            .unwrap()
            .unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.kind(), MemberKind::Field);
    }

    #[test]
    fn test_negative_result_cached() {
        let (manager, person) = manager();
        let missing = manager
            .try_get_member(
                person,
                "nope",
                MemberKindMask::all(),
                MemberFlags::all(),
                MetadataContext::empty(),
            )
            .unwrap();
        assert!(missing.is_none());
        assert_eq!(manager.cached_requests(), 1);
    }

    #[test]
    fn test_component_management_rebuilds() {
        let (mut manager, person) = manager();
        manager
            .try_get_member(
                person,
                "name",
                MemberKindMask::all(),
                MemberFlags::all(),
                MetadataContext::empty(),
            )
            .unwrap();
        assert_eq!(manager.cached_requests(), 1);

        assert!(manager.remove_component("fake"));
        // The rebuild clears the cache.
        assert_eq!(manager.cached_requests(), 0);
        assert!(!manager.remove_component("fake"));
    }

    #[test]
    fn test_fake_members_resolve() {
        let (manager, person) = manager();
        let member = manager
            .try_get_member(
                person,
                "#design",
                MemberKindMask::all(),
                MemberFlags::all(),
                MetadataContext::empty(),
            )
            .unwrap()
            .unwrap();
        assert_eq!(member.get_value(&Value::Null).unwrap(), Value::Null);
    }

    #[test]
    fn test_attached_beats_declared_in_ordering() {
        let (manager, person) = manager();
        manager.attached_members().register(
            person,
            Arc::new(Member::attached_property(
                "name",
                person,
                ValueType::Str,
                Value::str("attached"),
            )),
        );

        let members = manager
            .try_get_members(
                person,
                "name",
                MemberKindMask::all(),
                MemberFlags::all(),
                MetadataContext::empty(),
            )
            .unwrap();
        // Property (attached) and field (declared) both resolve; attached
        // origin ranks first.
        assert_eq!(members.len(), 2);
        assert_eq!(members[0].origin(), MemberOrigin::Attached);
    }
}
