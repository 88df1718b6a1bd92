//! Type registry
//!
//! Single source of truth for registered bindable types. Provides id
//! allocation, name lookup, instantiation with declared defaults, and the
//! assignability/proximity queries the resolution pipeline ranks candidates
//! with. The builtin `List` type is pre-registered so list values have a
//! declaring type for indexer and `Count` resolution.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::descriptor::{PropertySchema, TypeDescriptor, TypeDescriptorBuilder};
use crate::error::{MemberError, MemberResult};
use crate::object::DynamicObject;
use crate::value::{Value, ValueType};

/// Opaque handle of a registered type
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TypeId(u32);

impl TypeId {
    /// Build a handle from a raw index; only meaningful for handles obtained
    /// from a registry (exposed for tests and storage keys)
    pub fn from_raw(raw: u32) -> Self {
        TypeId(raw)
    }

    /// Raw index of this handle
    pub fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeId(#{})", self.0)
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// How close a member's declaring type is to the requested type
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Proximity {
    /// Declared on the requested type itself
    Exact,
    /// Declared on an ancestor, `n` parent links away
    Base(u32),
    /// Declared on an implemented interface, found `n` links up the chain
    Interface(u32),
}

/// Registry of type descriptors
pub struct TypeRegistry {
    types: RwLock<Vec<Arc<TypeDescriptor>>>,
    by_name: RwLock<FxHashMap<Arc<str>, TypeId>>,
    list_type: TypeId,
}

impl TypeRegistry {
    /// Create a registry with the builtin types registered
    pub fn new() -> Self {
        let registry = Self {
            types: RwLock::new(Vec::new()),
            by_name: RwLock::new(FxHashMap::default()),
            list_type: TypeId(0),
        };

        // Builtin List: Count is a computed read-only property over the
        // list value itself.
        let count_getter: crate::descriptor::GetterFn = Arc::new(|target: &Value| match target {
            Value::List(list) => Ok(Value::int(list.len() as i64)),
            other => Err(MemberError::type_mismatch("list", other.type_name())),
        });
        let list_id = registry
            .register(
                TypeDescriptor::builder("List").property(PropertySchema::computed(
                    "Count",
                    ValueType::Int,
                    Some(count_getter),
                    None,
                )),
            )
            .unwrap_or(TypeId(0));
        debug_assert_eq!(list_id, TypeId(0));
        registry
    }

    /// ID of the builtin `List` type
    pub fn list_type(&self) -> TypeId {
        self.list_type
    }

    /// Register a descriptor; allocates its id and slot layout
    ///
    /// The parent, if set, must already be registered: the new type's fields
    /// are laid out after the parent's. Fails with `DuplicateKey` when the
    /// name is already taken.
    pub fn register(&self, builder: TypeDescriptorBuilder) -> MemberResult<TypeId> {
        let mut types = self.types.write();
        let mut by_name = self.by_name.write();

        if let Some(name) = builder.type_name() {
            if by_name.contains_key(name) {
                return Err(MemberError::DuplicateKey {
                    key: name.to_string(),
                });
            }
        }
        let field_offset = match builder.parent_id() {
            Some(parent) => match types.get(parent.raw() as usize) {
                Some(desc) => desc.total_field_count(),
                None => {
                    return Err(MemberError::InvalidTarget {
                        member: format!("parent type {}", parent),
                    })
                }
            },
            None => 0,
        };

        let id = TypeId(types.len() as u32);
        let descriptor = Arc::new(builder.build(id, field_offset));
        by_name.insert(descriptor.name().clone(), id);
        debug!(type_name = %descriptor.name(), %id, "registered type");
        types.push(descriptor);
        Ok(id)
    }

    /// Get a descriptor by id
    pub fn get(&self, id: TypeId) -> Option<Arc<TypeDescriptor>> {
        self.types.read().get(id.raw() as usize).cloned()
    }

    /// Get a descriptor by name
    pub fn get_by_name(&self, name: &str) -> Option<Arc<TypeDescriptor>> {
        let id = *self.by_name.read().get(name)?;
        self.get(id)
    }

    /// Display name for a type id
    pub fn type_name(&self, id: TypeId) -> Arc<str> {
        match self.get(id) {
            Some(desc) => desc.name().clone(),
            None => Arc::from("<unknown>"),
        }
    }

    /// Number of registered types
    pub fn len(&self) -> usize {
        self.types.read().len()
    }

    /// Whether the registry holds no types (never true: builtins)
    pub fn is_empty(&self) -> bool {
        self.types.read().is_empty()
    }

    /// The inheritance chain from `id` up to the root, self first
    pub fn hierarchy(&self, id: TypeId) -> Vec<Arc<TypeDescriptor>> {
        let mut chain = Vec::new();
        let mut current = Some(id);
        while let Some(id) = current {
            match self.get(id) {
                Some(desc) => {
                    current = desc.parent();
                    chain.push(desc);
                }
                None => break,
            }
        }
        chain
    }

    /// Create an instance of `id` with declared field defaults applied
    pub fn instantiate(&self, id: TypeId) -> MemberResult<Arc<DynamicObject>> {
        let chain = self.hierarchy(id);
        if chain.is_empty() {
            return Err(MemberError::InvalidTarget {
                member: format!("type {}", id),
            });
        }
        let total = chain[0].total_field_count();
        let mut fields = vec![Value::Null; total];
        for desc in chain.iter().rev() {
            for (i, schema) in desc.fields().iter().enumerate() {
                fields[desc.field_offset() + i] = schema.default.clone();
            }
        }
        Ok(DynamicObject::with_fields(id, fields))
    }

    /// Whether `from` is `to` or derives from it (parent chain and
    /// implemented interfaces, transitively)
    pub fn is_assignable(&self, from: TypeId, to: TypeId) -> bool {
        self.proximity(from, to).is_some()
    }

    /// Distance between `from` and a base/interface type `to`
    ///
    /// Walks the parent chain; at each level, implemented interfaces are
    /// searched with their own parent chains. Returns `None` when `to` is
    /// unrelated.
    pub fn proximity(&self, from: TypeId, to: TypeId) -> Option<Proximity> {
        if from == to {
            return Some(Proximity::Exact);
        }
        let mut depth = 0u32;
        let mut current = Some(from);
        while let Some(id) = current {
            let desc = self.get(id)?;
            if depth > 0 && id == to {
                return Some(Proximity::Base(depth));
            }
            for &iface in desc.interfaces() {
                if self.interface_reaches(iface, to) {
                    return Some(Proximity::Interface(depth));
                }
            }
            current = desc.parent();
            depth += 1;
        }
        None
    }

    /// The declaring type a value resolves members against
    pub fn value_type_id(&self, value: &Value) -> Option<TypeId> {
        match value {
            Value::Object(obj) => Some(obj.type_id()),
            Value::List(_) => Some(self.list_type),
            _ => None,
        }
    }

    fn interface_reaches(&self, iface: TypeId, to: TypeId) -> bool {
        if iface == to {
            return true;
        }
        let Some(desc) = self.get(iface) else {
            return false;
        };
        if let Some(parent) = desc.parent() {
            if self.interface_reaches(parent, to) {
                return true;
            }
        }
        desc.interfaces()
            .iter()
            .any(|&i| self.interface_reaches(i, to))
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("types", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_lookup() {
        let registry = TypeRegistry::new();
        let id = registry
            .register(TypeDescriptor::builder("User").field("name", ValueType::Str))
            .unwrap();

        assert_eq!(registry.get(id).unwrap().name().as_ref(), "User");
        assert_eq!(registry.get_by_name("User").unwrap().id(), id);
        assert!(registry.get_by_name("Unknown").is_none());
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let registry = TypeRegistry::new();
        registry
            .register(TypeDescriptor::builder("User"))
            .unwrap();
        assert!(matches!(
            registry.register(TypeDescriptor::builder("User")),
            Err(MemberError::DuplicateKey { .. })
        ));
    }

    #[test]
    fn test_hierarchy_and_field_layout() {
        let registry = TypeRegistry::new();
        let animal = registry
            .register(TypeDescriptor::builder("Animal").field("name", ValueType::Str))
            .unwrap();
        let dog = registry
            .register(
                TypeDescriptor::builder("Dog")
                    .parent(animal)
                    .field("breed", ValueType::Str),
            )
            .unwrap();

        let chain = registry.hierarchy(dog);
        assert_eq!(chain.len(), 2);
        assert_eq!(chain[0].name().as_ref(), "Dog");
        assert_eq!(chain[1].name().as_ref(), "Animal");

        // Dog's own field lands after Animal's.
        let (_, slot) = chain[0].field("breed").unwrap();
        assert_eq!(slot, 1);
        assert_eq!(chain[0].total_field_count(), 2);
    }

    #[test]
    fn test_instantiate_applies_defaults() {
        let registry = TypeRegistry::new();
        let base = registry
            .register(
                TypeDescriptor::builder("Base").field_schema(
                    crate::descriptor::FieldSchema::new("kind", ValueType::Str)
                        .with_default(Value::str("base")),
                ),
            )
            .unwrap();
        let derived = registry
            .register(
                TypeDescriptor::builder("Derived")
                    .parent(base)
                    .field_schema(
                        crate::descriptor::FieldSchema::new("extra", ValueType::Int)
                            .with_default(Value::int(7)),
                    ),
            )
            .unwrap();

        let obj = registry.instantiate(derived).unwrap();
        assert_eq!(obj.field_count(), 2);
        assert_eq!(obj.get_field(0), Some(Value::str("base")));
        assert_eq!(obj.get_field(1), Some(Value::int(7)));
    }

    #[test]
    fn test_proximity_parent_chain() {
        let registry = TypeRegistry::new();
        let a = registry.register(TypeDescriptor::builder("A")).unwrap();
        let b = registry
            .register(TypeDescriptor::builder("B").parent(a))
            .unwrap();
        let c = registry
            .register(TypeDescriptor::builder("C").parent(b))
            .unwrap();

        assert_eq!(registry.proximity(c, c), Some(Proximity::Exact));
        assert_eq!(registry.proximity(c, b), Some(Proximity::Base(1)));
        assert_eq!(registry.proximity(c, a), Some(Proximity::Base(2)));
        assert_eq!(registry.proximity(a, c), None);
        assert!(registry.is_assignable(c, a));
        assert!(!registry.is_assignable(a, c));
    }

    #[test]
    fn test_proximity_interfaces() {
        let registry = TypeRegistry::new();
        let observable = registry
            .register(TypeDescriptor::builder("IObservable"))
            .unwrap();
        let base = registry
            .register(TypeDescriptor::builder("ViewModelBase").interface(observable))
            .unwrap();
        let vm = registry
            .register(TypeDescriptor::builder("MainViewModel").parent(base))
            .unwrap();

        assert_eq!(
            registry.proximity(base, observable),
            Some(Proximity::Interface(0))
        );
        assert_eq!(
            registry.proximity(vm, observable),
            Some(Proximity::Interface(1))
        );
    }

    #[test]
    fn test_builtin_list_type() {
        let registry = TypeRegistry::new();
        let list = registry.get(registry.list_type()).unwrap();
        assert_eq!(list.name().as_ref(), "List");
        assert!(list.property("Count").is_some());

        let value = Value::list(crate::value::ValueList::new());
        assert_eq!(registry.value_type_id(&value), Some(registry.list_type()));
        assert_eq!(registry.value_type_id(&Value::int(1)), None);
    }
}
