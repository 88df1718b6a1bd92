//! Shared fixture for the end-to-end resolution tests
#![allow(dead_code)]

use std::sync::Arc;

use tether_core::{
    FieldSchema, MemberError, MethodSchema, ParamSchema, PropertySchema, TypeDescriptor, TypeId,
    TypeRegistry, Value, ValueType,
};
use tether_members::MemberManager;

pub struct Harness {
    pub registry: Arc<TypeRegistry>,
    pub manager: MemberManager,
    pub person: TypeId,
    pub employee: TypeId,
}

/// A registry with a small view-model hierarchy:
///
/// `Person { name: Str, age: Int, Name (alias), Closed event, Kind(), Bump(by) }`
/// `Employee : Person { company: Str, Kind() }`
pub fn harness() -> Harness {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();

    let registry = Arc::new(TypeRegistry::new());

    let person = registry
        .register(
            TypeDescriptor::builder("Person")
                .field("name", ValueType::Str)
                .field("age", ValueType::Int)
                .static_field(FieldSchema::new("Population", ValueType::Int).with_default(Value::int(0)))
                .property(PropertySchema::aliased("Name", ValueType::Str, "name"))
                .event("Closed")
                .method(MethodSchema::new(
                    "Kind",
                    Vec::new(),
                    ValueType::Str,
                    Arc::new(|_, _| Ok(Value::str("person"))),
                ))
                .method(MethodSchema::new(
                    "Bump",
                    vec![ParamSchema::new("by", ValueType::Int)],
                    ValueType::Int,
                    Arc::new(|target, args| {
                        let obj = target.as_object().ok_or_else(|| {
                            MemberError::type_mismatch("object", target.type_name())
                        })?;
                        let age = obj.get_field(1).and_then(|v| v.as_int()).unwrap_or(0);
                        Ok(Value::int(age + args[0].as_int().unwrap_or(0)))
                    }),
                )),
        )
        .unwrap();

    let employee = registry
        .register(
            TypeDescriptor::builder("Employee")
                .parent(person)
                .field("company", ValueType::Str)
                .method(MethodSchema::new(
                    "Kind",
                    Vec::new(),
                    ValueType::Str,
                    Arc::new(|_, _| Ok(Value::str("employee"))),
                )),
        )
        .unwrap();

    let manager = MemberManager::builder(registry.clone()).build();
    Harness {
        registry,
        manager,
        person,
        employee,
    }
}
