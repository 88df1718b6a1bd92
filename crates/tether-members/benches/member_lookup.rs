//! Resolution micro-benchmarks: cache hit vs full pipeline walk

use std::hint::black_box;
use std::sync::Arc;

use criterion::{criterion_group, criterion_main, Criterion};
use tether_core::{MetadataContext, PropertySchema, TypeDescriptor, TypeRegistry, ValueType};
use tether_members::{MemberFlags, MemberKindMask, MemberManager};

fn setup() -> (MemberManager, tether_core::TypeId) {
    let registry = Arc::new(TypeRegistry::new());
    let person = registry
        .register(
            TypeDescriptor::builder("Person")
                .field("name", ValueType::Str)
                .field("age", ValueType::Int)
                .property(PropertySchema::aliased("Name", ValueType::Str, "name")),
        )
        .unwrap();
    (MemberManager::builder(registry).build(), person)
}

fn bench_member_lookup(c: &mut Criterion) {
    let (manager, person) = setup();

    c.bench_function("resolve_cached", |b| {
        // Prime once; every iteration is a cache hit.
        manager
            .try_get_member(
                person,
                "name",
                MemberKindMask::all(),
                MemberFlags::all(),
                MetadataContext::empty(),
            )
            .unwrap();
        b.iter(|| {
            let member = manager
                .try_get_member(
                    black_box(person),
                    black_box("name"),
                    MemberKindMask::all(),
                    MemberFlags::all(),
                    MetadataContext::empty(),
                )
                .unwrap();
            black_box(member)
        });
    });

    c.bench_function("resolve_pipeline_miss", |b| {
        b.iter(|| {
            manager.invalidate(None);
            let member = manager
                .try_get_member(
                    black_box(person),
                    black_box("Name"),
                    MemberKindMask::all(),
                    MemberFlags::all(),
                    MetadataContext::empty(),
                )
                .unwrap();
            black_box(member)
        });
    });
}

criterion_group!(benches, bench_member_lookup);
criterion_main!(benches);
