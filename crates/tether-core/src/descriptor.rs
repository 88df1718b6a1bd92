//! Type descriptors and member schemas
//!
//! A [`TypeDescriptor`] is the registered shape of a bindable type: its
//! declared fields, properties, methods, and events, plus the parent and
//! interface links the resolver walks. Descriptors are built with the fluent
//! [`TypeDescriptorBuilder`] and registered through `TypeRegistry::register`,
//! which assigns the `TypeId` and the field slot layout.

use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::error::{MemberError, MemberResult};
use crate::registry::TypeId;
use crate::value::{Value, ValueType};

/// Getter closure: reads a value off a target
pub type GetterFn = Arc<dyn Fn(&Value) -> MemberResult<Value> + Send + Sync>;

/// Setter closure: writes a value onto a target
pub type SetterFn = Arc<dyn Fn(&Value, Value) -> MemberResult<()> + Send + Sync>;

/// Method closure: invokes with a target and argument list
pub type MethodFn = Arc<dyn Fn(&Value, &[Value]) -> MemberResult<Value> + Send + Sync>;

/// Declared parameter of a method
#[derive(Clone, Debug)]
pub struct ParamSchema {
    /// Parameter name
    pub name: Arc<str>,
    /// Parameter type
    pub value_type: ValueType,
    /// May be omitted at the call site (bound as null)
    pub optional: bool,
    /// Collects the remaining arguments into a list
    pub rest: bool,
}

impl ParamSchema {
    /// Create a required parameter
    pub fn new(name: impl Into<Arc<str>>, value_type: ValueType) -> Self {
        Self {
            name: name.into(),
            value_type,
            optional: false,
            rest: false,
        }
    }

    /// Mark as optional
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Mark as a rest parameter (collects the argument tail)
    pub fn rest(mut self) -> Self {
        self.rest = true;
        self
    }
}

/// Declared field of a type
#[derive(Clone, Debug)]
pub struct FieldSchema {
    /// Field name
    pub name: Arc<str>,
    /// Field type
    pub value_type: ValueType,
    /// Rejects writes through members
    pub readonly: bool,
    /// Default value applied at instantiation
    pub default: Value,
}

impl FieldSchema {
    /// Create a writable field with a null default
    pub fn new(name: impl Into<Arc<str>>, value_type: ValueType) -> Self {
        Self {
            name: name.into(),
            value_type,
            readonly: false,
            default: Value::Null,
        }
    }

    /// Mark as readonly
    pub fn readonly(mut self) -> Self {
        self.readonly = true;
        self
    }

    /// Set the default value
    pub fn with_default(mut self, default: Value) -> Self {
        self.default = default;
        self
    }
}

/// How a property reads and writes its value
#[derive(Clone)]
pub enum PropertyBacking {
    /// Aliases a declared field; the slot is resolved on first access
    Field(Arc<str>),
    /// Computed get/set closures
    Computed {
        /// Getter, if the property is readable
        getter: Option<GetterFn>,
        /// Setter, if the property is writable
        setter: Option<SetterFn>,
    },
}

impl std::fmt::Debug for PropertyBacking {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PropertyBacking::Field(name) => f.debug_tuple("Field").field(name).finish(),
            PropertyBacking::Computed { getter, setter } => f
                .debug_struct("Computed")
                .field("getter", &getter.is_some())
                .field("setter", &setter.is_some())
                .finish(),
        }
    }
}

/// Declared property of a type
#[derive(Clone, Debug)]
pub struct PropertySchema {
    /// Property name
    pub name: Arc<str>,
    /// Property value type
    pub value_type: ValueType,
    /// Read/write backing
    pub backing: PropertyBacking,
}

impl PropertySchema {
    /// Property aliasing a declared field
    pub fn aliased(
        name: impl Into<Arc<str>>,
        value_type: ValueType,
        field: impl Into<Arc<str>>,
    ) -> Self {
        Self {
            name: name.into(),
            value_type,
            backing: PropertyBacking::Field(field.into()),
        }
    }

    /// Property computed by closures
    pub fn computed(
        name: impl Into<Arc<str>>,
        value_type: ValueType,
        getter: Option<GetterFn>,
        setter: Option<SetterFn>,
    ) -> Self {
        Self {
            name: name.into(),
            value_type,
            backing: PropertyBacking::Computed { getter, setter },
        }
    }
}

/// Declared method of a type
#[derive(Clone)]
pub struct MethodSchema {
    /// Method name
    pub name: Arc<str>,
    /// Declared parameters
    pub params: Vec<ParamSchema>,
    /// Return type
    pub return_type: ValueType,
    /// Implementation
    pub invoke: MethodFn,
}

impl MethodSchema {
    /// Create a method schema
    pub fn new(
        name: impl Into<Arc<str>>,
        params: Vec<ParamSchema>,
        return_type: ValueType,
        invoke: MethodFn,
    ) -> Self {
        Self {
            name: name.into(),
            params,
            return_type,
            invoke,
        }
    }
}

impl std::fmt::Debug for MethodSchema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MethodSchema")
            .field("name", &self.name)
            .field("params", &self.params.len())
            .field("return_type", &self.return_type)
            .finish()
    }
}

/// Declared event of a type, observed through the instance change hub
#[derive(Clone, Debug)]
pub struct EventSchema {
    /// Event name
    pub name: Arc<str>,
}

/// Registered shape of a bindable type
pub struct TypeDescriptor {
    id: TypeId,
    name: Arc<str>,
    parent: Option<TypeId>,
    interfaces: Vec<TypeId>,

    fields: Vec<FieldSchema>,
    field_indices: FxHashMap<Arc<str>, usize>,
    /// First slot of this descriptor's own fields in the instance layout
    field_offset: usize,
    /// Total slots including inherited fields
    total_field_count: usize,

    properties: Vec<PropertySchema>,
    property_indices: FxHashMap<Arc<str>, usize>,

    methods: Vec<MethodSchema>,
    method_indices: FxHashMap<Arc<str>, Vec<usize>>,

    events: Vec<EventSchema>,
    event_indices: FxHashMap<Arc<str>, usize>,

    statics: Vec<FieldSchema>,
    static_indices: FxHashMap<Arc<str>, usize>,
    static_values: RwLock<Vec<Value>>,
}

impl TypeDescriptor {
    /// Start building a descriptor
    pub fn builder(name: impl Into<Arc<str>>) -> TypeDescriptorBuilder {
        TypeDescriptorBuilder::new(name)
    }

    /// Type ID assigned at registration
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Type name
    pub fn name(&self) -> &Arc<str> {
        &self.name
    }

    /// Parent type, if any
    pub fn parent(&self) -> Option<TypeId> {
        self.parent
    }

    /// Implemented interfaces
    pub fn interfaces(&self) -> &[TypeId] {
        &self.interfaces
    }

    /// Instance slot count including inherited fields
    pub fn total_field_count(&self) -> usize {
        self.total_field_count
    }

    /// First slot of this descriptor's own fields
    pub fn field_offset(&self) -> usize {
        self.field_offset
    }

    /// This descriptor's own instance fields, in declaration order
    pub fn fields(&self) -> &[FieldSchema] {
        &self.fields
    }

    /// Look up an own instance field; returns the schema and absolute slot
    pub fn field(&self, name: &str) -> Option<(&FieldSchema, usize)> {
        let local = *self.field_indices.get(name)?;
        Some((&self.fields[local], self.field_offset + local))
    }

    /// Look up an own property
    pub fn property(&self, name: &str) -> Option<&PropertySchema> {
        self.property_indices
            .get(name)
            .map(|&i| &self.properties[i])
    }

    /// Look up own methods by name (all overloads)
    pub fn methods_named(&self, name: &str) -> Vec<&MethodSchema> {
        match self.method_indices.get(name) {
            Some(indices) => indices.iter().map(|&i| &self.methods[i]).collect(),
            None => Vec::new(),
        }
    }

    /// Look up an own event
    pub fn event(&self, name: &str) -> Option<&EventSchema> {
        self.event_indices.get(name).map(|&i| &self.events[i])
    }

    /// Look up an own static field; returns the schema and static slot
    pub fn static_field(&self, name: &str) -> Option<(&FieldSchema, usize)> {
        let slot = *self.static_indices.get(name)?;
        Some((&self.statics[slot], slot))
    }

    /// Read a static field slot
    pub fn get_static(&self, slot: usize) -> Option<Value> {
        self.static_values.read().get(slot).cloned()
    }

    /// Write a static field slot
    pub fn set_static(&self, slot: usize, value: Value) -> MemberResult<()> {
        let mut values = self.static_values.write();
        let len = values.len();
        match values.get_mut(slot) {
            Some(v) => {
                *v = value;
                Ok(())
            }
            None => Err(MemberError::IndexOutOfBounds { index: slot, len }),
        }
    }
}

impl std::fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("parent", &self.parent)
            .field("fields", &self.fields.len())
            .field("properties", &self.properties.len())
            .field("methods", &self.methods.len())
            .finish()
    }
}

/// Fluent builder for [`TypeDescriptor`]
#[derive(Default)]
pub struct TypeDescriptorBuilder {
    name: Option<Arc<str>>,
    parent: Option<TypeId>,
    interfaces: Vec<TypeId>,
    fields: Vec<FieldSchema>,
    statics: Vec<FieldSchema>,
    properties: Vec<PropertySchema>,
    methods: Vec<MethodSchema>,
    events: Vec<EventSchema>,
}

impl TypeDescriptorBuilder {
    /// Create a builder for a named type
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    /// Set the parent type (must already be registered)
    pub fn parent(mut self, parent: TypeId) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Add an implemented interface (must already be registered)
    pub fn interface(mut self, interface: TypeId) -> Self {
        self.interfaces.push(interface);
        self
    }

    /// Add a writable instance field with a null default
    pub fn field(mut self, name: impl Into<Arc<str>>, value_type: ValueType) -> Self {
        self.fields.push(FieldSchema::new(name, value_type));
        self
    }

    /// Add an instance field from a full schema
    pub fn field_schema(mut self, schema: FieldSchema) -> Self {
        self.fields.push(schema);
        self
    }

    /// Add a static field from a full schema
    pub fn static_field(mut self, schema: FieldSchema) -> Self {
        self.statics.push(schema);
        self
    }

    /// Add a property
    pub fn property(mut self, schema: PropertySchema) -> Self {
        self.properties.push(schema);
        self
    }

    /// Add a method (overloads allowed under one name)
    pub fn method(mut self, schema: MethodSchema) -> Self {
        self.methods.push(schema);
        self
    }

    /// Add an event
    pub fn event(mut self, name: impl Into<Arc<str>>) -> Self {
        self.events.push(EventSchema { name: name.into() });
        self
    }

    /// Name the builder was created with
    pub fn type_name(&self) -> Option<&Arc<str>> {
        self.name.as_ref()
    }

    /// Parent the builder points at
    pub fn parent_id(&self) -> Option<TypeId> {
        self.parent
    }

    /// Finalize into a descriptor; called by the registry, which assigns the
    /// id and the inherited field offset
    pub(crate) fn build(self, id: TypeId, field_offset: usize) -> TypeDescriptor {
        let name = self.name.unwrap_or_else(|| Arc::from("<anonymous>"));

        let mut field_indices = FxHashMap::default();
        for (i, f) in self.fields.iter().enumerate() {
            field_indices.insert(f.name.clone(), i);
        }
        let mut property_indices = FxHashMap::default();
        for (i, p) in self.properties.iter().enumerate() {
            property_indices.insert(p.name.clone(), i);
        }
        let mut method_indices: FxHashMap<Arc<str>, Vec<usize>> = FxHashMap::default();
        for (i, m) in self.methods.iter().enumerate() {
            method_indices.entry(m.name.clone()).or_default().push(i);
        }
        let mut event_indices = FxHashMap::default();
        for (i, e) in self.events.iter().enumerate() {
            event_indices.insert(e.name.clone(), i);
        }
        let mut static_indices = FxHashMap::default();
        for (i, s) in self.statics.iter().enumerate() {
            static_indices.insert(s.name.clone(), i);
        }
        let static_values: Vec<Value> = self.statics.iter().map(|s| s.default.clone()).collect();

        let total_field_count = field_offset + self.fields.len();
        TypeDescriptor {
            id,
            name,
            parent: self.parent,
            interfaces: self.interfaces,
            fields: self.fields,
            field_indices,
            field_offset,
            total_field_count,
            properties: self.properties,
            property_indices,
            methods: self.methods,
            method_indices,
            events: self.events,
            event_indices,
            statics: self.statics,
            static_indices,
            static_values: RwLock::new(static_values),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop_method() -> MethodFn {
        Arc::new(|_, _| Ok(Value::Null))
    }

    #[test]
    fn test_builder_field_layout() {
        let desc = TypeDescriptor::builder("Point")
            .field("x", ValueType::Float)
            .field("y", ValueType::Float)
            .build(TypeId::from_raw(1), 0);

        assert_eq!(desc.total_field_count(), 2);
        let (schema, slot) = desc.field("y").unwrap();
        assert_eq!(&*schema.name, "y");
        assert_eq!(slot, 1);
        assert!(desc.field("z").is_none());
    }

    #[test]
    fn test_builder_field_offset() {
        let desc = TypeDescriptor::builder("Point3")
            .field("z", ValueType::Float)
            .build(TypeId::from_raw(2), 2);

        assert_eq!(desc.total_field_count(), 3);
        let (_, slot) = desc.field("z").unwrap();
        assert_eq!(slot, 2);
    }

    #[test]
    fn test_method_overloads() {
        let desc = TypeDescriptor::builder("Calc")
            .method(MethodSchema::new(
                "add",
                vec![ParamSchema::new("a", ValueType::Int)],
                ValueType::Int,
                noop_method(),
            ))
            .method(MethodSchema::new(
                "add",
                vec![
                    ParamSchema::new("a", ValueType::Int),
                    ParamSchema::new("b", ValueType::Int),
                ],
                ValueType::Int,
                noop_method(),
            ))
            .build(TypeId::from_raw(3), 0);

        assert_eq!(desc.methods_named("add").len(), 2);
        assert!(desc.methods_named("sub").is_empty());
    }

    #[test]
    fn test_static_field_slots() {
        let desc = TypeDescriptor::builder("Config")
            .static_field(FieldSchema::new("Version", ValueType::Int).with_default(Value::int(3)))
            .build(TypeId::from_raw(4), 0);

        let (schema, slot) = desc.static_field("Version").unwrap();
        assert_eq!(&*schema.name, "Version");
        assert_eq!(desc.get_static(slot), Some(Value::int(3)));
        desc.set_static(slot, Value::int(4)).unwrap();
        assert_eq!(desc.get_static(slot), Some(Value::int(4)));
        assert!(desc.set_static(9, Value::Null).is_err());
    }

    #[test]
    fn test_param_schema_builders() {
        let p = ParamSchema::new("rest", ValueType::Int).rest();
        assert!(p.rest);
        let p = ParamSchema::new("opt", ValueType::Str).optional();
        assert!(p.optional);
    }
}
