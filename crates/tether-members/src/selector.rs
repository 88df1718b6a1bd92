//! Member selection
//!
//! The selector post-processes the flat candidate list a request collected:
//! filters by kind and flag masks, groups collisions by (kind, parameter
//! shape), and keeps the highest-priority member per group. Method-kind ties
//! are an error; any other tie silently keeps the first candidate in chain
//! order.

use rustc_hash::FxHashMap;

use tether_core::{MemberError, MemberResult, TypeId, TypeRegistry, ValueType};

use crate::member::{MemberCandidates, MemberFlags, MemberKind, MemberKindMask};
use crate::priority::member_priority;

type CollisionKey = (MemberKind, Option<Vec<ValueType>>);

/// Filters candidates and breaks priority ties
#[derive(Debug, Default, Clone, Copy)]
pub struct MemberSelector;

impl MemberSelector {
    /// Create a selector
    pub fn new() -> Self {
        Self
    }

    /// Select the winners from `candidates` for a request against
    /// `requested`
    ///
    /// The result is ordered by descending priority. Two method-kind
    /// candidates tying on priority within one collision group raise
    /// [`MemberError::AmbiguousMatch`].
    pub fn select(
        &self,
        registry: &TypeRegistry,
        requested: TypeId,
        candidates: MemberCandidates,
        kinds: MemberKindMask,
        flags: MemberFlags,
    ) -> MemberResult<MemberCandidates> {
        let mut groups: FxHashMap<CollisionKey, usize> = FxHashMap::default();
        let mut winners: Vec<(crate::member::MemberRef, i64)> = Vec::new();

        for member in candidates {
            if !kinds.contains(member.kind().mask()) || !member.flags().intersects(flags) {
                continue;
            }
            let priority = member_priority(registry, requested, &member);
            let key: CollisionKey = (member.kind(), member.shape());

            match groups.entry(key) {
                std::collections::hash_map::Entry::Vacant(slot) => {
                    slot.insert(winners.len());
                    winners.push((member, priority));
                }
                std::collections::hash_map::Entry::Occupied(slot) => {
                    let index = *slot.get();
                    let (current, current_priority) = &winners[index];
                    if priority > *current_priority {
                        winners[index] = (member, priority);
                    } else if priority == *current_priority
                        && member.kind() == MemberKind::Method
                    {
                        return Err(MemberError::AmbiguousMatch {
                            type_name: registry.type_name(requested).to_string(),
                            member: current.name().to_string(),
                        });
                    }
                    // Equal-priority non-method collisions keep the first
                    // candidate seen.
                }
            }
        }

        winners.sort_by(|a, b| b.1.cmp(&a.1));
        Ok(winners.into_iter().map(|(member, _)| member).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::member::{Member, MemberOrigin};
    use smallvec::smallvec;
    use std::sync::Arc;
    use tether_core::{ParamSchema, TypeDescriptor, Value};

    fn registry() -> (TypeRegistry, TypeId, TypeId) {
        let registry = TypeRegistry::new();
        let base = registry.register(TypeDescriptor::builder("Base")).unwrap();
        let derived = registry
            .register(TypeDescriptor::builder("Derived").parent(base))
            .unwrap();
        (registry, base, derived)
    }

    fn method(name: &str, declaring: TypeId, param: ValueType) -> crate::member::MemberRef {
        Arc::new(Member::method(
            name,
            declaring,
            vec![ParamSchema::new("a", param)],
            ValueType::Any,
            Arc::new(|_, _| Ok(Value::Null)),
            MemberOrigin::Instance,
        ))
    }

    #[test]
    fn test_closer_method_wins() {
        let (registry, base, derived) = registry();
        let selector = MemberSelector::new();

        let candidates: MemberCandidates = smallvec![
            method("M", base, ValueType::Int),
            method("M", derived, ValueType::Int),
        ];
        let selected = selector
            .select(
                &registry,
                derived,
                candidates,
                MemberKindMask::all(),
                MemberFlags::all(),
            )
            .unwrap();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].declaring_type(), derived);
    }

    #[test]
    fn test_equal_priority_methods_are_ambiguous() {
        let (registry, _, derived) = registry();
        let selector = MemberSelector::new();

        let candidates: MemberCandidates = smallvec![
            method("M", derived, ValueType::Int),
            method("M", derived, ValueType::Int),
        ];
        assert!(matches!(
            selector.select(
                &registry,
                derived,
                candidates,
                MemberKindMask::all(),
                MemberFlags::all(),
            ),
            Err(MemberError::AmbiguousMatch { .. })
        ));
    }

    #[test]
    fn test_different_shapes_do_not_collide() {
        let (registry, _, derived) = registry();
        let selector = MemberSelector::new();

        let candidates: MemberCandidates = smallvec![
            method("M", derived, ValueType::Int),
            method("M", derived, ValueType::Str),
        ];
        let selected = selector
            .select(
                &registry,
                derived,
                candidates,
                MemberKindMask::all(),
                MemberFlags::all(),
            )
            .unwrap();
        assert_eq!(selected.len(), 2);
    }

    #[test]
    fn test_equal_priority_non_methods_keep_first() {
        let (registry, _, derived) = registry();
        let selector = MemberSelector::new();

        let first = Arc::new(Member::constant(
            "C",
            derived,
            Value::int(1),
            MemberOrigin::Instance,
        ));
        let second = Arc::new(Member::constant(
            "C",
            derived,
            Value::int(2),
            MemberOrigin::Instance,
        ));
        let candidates: MemberCandidates = smallvec![first.clone(), second];
        let selected = selector
            .select(
                &registry,
                derived,
                candidates,
                MemberKindMask::all(),
                MemberFlags::all(),
            )
            .unwrap();
        assert_eq!(selected.len(), 1);
        assert!(Arc::ptr_eq(&selected[0], &first));
    }

    #[test]
    fn test_kind_and_flag_filtering() {
        let (registry, _, derived) = registry();
        let selector = MemberSelector::new();

        let constant = Arc::new(Member::constant(
            "X",
            derived,
            Value::int(1),
            MemberOrigin::Instance,
        ));
        let m = method("X", derived, ValueType::Int);
        let candidates: MemberCandidates = smallvec![constant, m];

        let only_methods = selector
            .select(
                &registry,
                derived,
                candidates.clone(),
                MemberKindMask::METHOD,
                MemberFlags::all(),
            )
            .unwrap();
        assert_eq!(only_methods.len(), 1);
        assert_eq!(only_methods[0].kind(), MemberKind::Method);

        let static_only = selector
            .select(
                &registry,
                derived,
                candidates,
                MemberKindMask::all(),
                MemberFlags::STATIC,
            )
            .unwrap();
        assert!(static_only.is_empty());
    }

    #[test]
    fn test_attached_outranks_instance() {
        let (registry, _, derived) = registry();
        let selector = MemberSelector::new();

        let instance = Arc::new(Member::constant(
            "P",
            derived,
            Value::int(1),
            MemberOrigin::Instance,
        ));
        let attached =
            Arc::new(Member::attached_property("P", derived, ValueType::Any, Value::int(2)));

        // Different kinds do not collide, but ordering is by priority:
        // attached first.
        let candidates: MemberCandidates = smallvec![instance, attached.clone()];
        let selected = selector
            .select(
                &registry,
                derived,
                candidates,
                MemberKindMask::all(),
                MemberFlags::all(),
            )
            .unwrap();
        assert_eq!(selected.len(), 2);
        assert!(Arc::ptr_eq(&selected[0], &attached));
    }
}
