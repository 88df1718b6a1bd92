//! Candidate priority ranking
//!
//! When several members answer one request, the selector keeps the highest
//! priority per collision group. Priority composes three components in
//! strictly dominating order:
//!
//! 1. origin: attached > instance > extension > dynamic
//! 2. declaring-type proximity: exact > base-class distance > interface
//! 3. argument-binding specificity: exact > optional > rest

use tether_core::{Proximity, TypeId, TypeRegistry};

use crate::member::{Member, MemberPayload};

const ORIGIN_WEIGHT: i64 = 1_000_000;
const PROXIMITY_WEIGHT: i64 = 10;

/// Compute the ranking of `member` for a request against `requested`
pub fn member_priority(registry: &TypeRegistry, requested: TypeId, member: &Member) -> i64 {
    let origin = member.origin().rank() as i64;
    let proximity = match registry.proximity(requested, member.declaring_type()) {
        Some(Proximity::Exact) => 10_000,
        Some(Proximity::Base(depth)) => 9_000 - depth.min(8_000) as i64,
        Some(Proximity::Interface(depth)) => 500 - depth.min(400) as i64,
        None => 0,
    };
    let args = match member.payload() {
        MemberPayload::Method(m) => m.specificity().rank() as i64,
        _ => 2,
    };
    origin * ORIGIN_WEIGHT + proximity * PROXIMITY_WEIGHT + args
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::member::MemberOrigin;
    use std::sync::Arc;
    use tether_core::{ParamSchema, TypeDescriptor, Value, ValueType};

    fn registry_with_chain() -> (TypeRegistry, TypeId, TypeId) {
        let registry = TypeRegistry::new();
        let base = registry
            .register(TypeDescriptor::builder("Base"))
            .unwrap();
        let derived = registry
            .register(TypeDescriptor::builder("Derived").parent(base))
            .unwrap();
        (registry, base, derived)
    }

    #[test]
    fn test_closer_declaring_type_ranks_higher() {
        let (registry, base, derived) = registry_with_chain();
        let on_base = Member::constant("X", base, Value::int(1), MemberOrigin::Instance);
        let on_derived = Member::constant("X", derived, Value::int(2), MemberOrigin::Instance);

        let pb = member_priority(&registry, derived, &on_base);
        let pd = member_priority(&registry, derived, &on_derived);
        assert!(pd > pb);
    }

    #[test]
    fn test_origin_dominates_proximity() {
        let (registry, base, derived) = registry_with_chain();
        // Attached on the base type still beats instance on the exact type.
        let attached = Member::attached_property("X", base, ValueType::Any, Value::Null);
        let instance = Member::constant("X", derived, Value::int(1), MemberOrigin::Instance);

        let pa = member_priority(&registry, derived, &attached);
        let pi = member_priority(&registry, derived, &instance);
        assert!(pa > pi);
    }

    #[test]
    fn test_specificity_breaks_method_ties() {
        let (registry, _, derived) = registry_with_chain();
        let exact = Member::method(
            "M",
            derived,
            vec![ParamSchema::new("a", ValueType::Int)],
            ValueType::Any,
            Arc::new(|_, _| Ok(Value::Null)),
            MemberOrigin::Instance,
        );
        let rest = Member::method(
            "M",
            derived,
            vec![ParamSchema::new("a", ValueType::Int).rest()],
            ValueType::Any,
            Arc::new(|_, _| Ok(Value::Null)),
            MemberOrigin::Instance,
        );

        assert!(member_priority(&registry, derived, &exact) > member_priority(&registry, derived, &rest));
    }

    #[test]
    fn test_interface_ranks_below_base_chain() {
        let registry = TypeRegistry::new();
        let iface = registry
            .register(TypeDescriptor::builder("IThing"))
            .unwrap();
        let base = registry
            .register(TypeDescriptor::builder("Base2"))
            .unwrap();
        let derived = registry
            .register(
                TypeDescriptor::builder("Derived2")
                    .parent(base)
                    .interface(iface),
            )
            .unwrap();

        let on_iface = Member::constant("X", iface, Value::int(1), MemberOrigin::Instance);
        let on_base = Member::constant("X", base, Value::int(2), MemberOrigin::Instance);
        assert!(
            member_priority(&registry, derived, &on_base)
                > member_priority(&registry, derived, &on_iface)
        );
    }
}
