//! Member model
//!
//! A [`Member`] is a resolved accessor for one named member of a type. The
//! kind is a closed discriminator ([`MemberKind`]) with a kind-specific
//! payload; there is no downcasting anywhere in the pipeline. Members expose
//! the three operations the binding engine consumes: [`Member::get_value`],
//! [`Member::set_value`], and [`Member::try_observe`].
//!
//! Members are constructed once per (declaring type, name) on first
//! resolution and cached until invalidation, so a repeated request returns
//! reference-identical `Arc`s.

use std::sync::Arc;

use bitflags::bitflags;
use once_cell::sync::OnceCell;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use tether_core::{
    ChangeListener, GetterFn, MemberError, MemberResult, MethodFn, ParamSchema, PropertyBacking,
    SetterFn, Subscription, TypeDescriptor, TypeId, Value, ValueList, ValueType,
};

/// Shared handle to a resolved member
pub type MemberRef = Arc<Member>;

/// One-or-many member result shape used throughout the pipeline
pub type MemberCandidates = SmallVec<[MemberRef; 1]>;

bitflags! {
    /// Access flags used for request filtering
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct MemberFlags: u16 {
        /// Publicly accessible member
        const PUBLIC = 1 << 0;
        /// Member not part of the public surface
        const NON_PUBLIC = 1 << 1;
        /// Static member (no instance target)
        const STATIC = 1 << 2;
        /// Instance member
        const INSTANCE = 1 << 3;
        /// Registered attached member
        const ATTACHED = 1 << 4;
        /// Extension-set member
        const EXTENSION = 1 << 5;
        /// Dynamically resolved member
        const DYNAMIC = 1 << 6;
    }
}

bitflags! {
    /// Member kind mask used for request filtering
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct MemberKindMask: u8 {
        /// Declared field
        const FIELD = 1 << 0;
        /// Property
        const PROPERTY = 1 << 1;
        /// Event
        const EVENT = 1 << 2;
        /// Method
        const METHOD = 1 << 3;
        /// Indexer accessor
        const INDEXER = 1 << 4;
        /// List element accessor
        const ARRAY_ELEMENT = 1 << 5;
        /// Constant (including fake placeholders)
        const CONSTANT = 1 << 6;
    }
}

impl MemberKindMask {
    /// The readable/writable kinds
    pub const ACCESSOR: MemberKindMask = MemberKindMask::FIELD
        .union(MemberKindMask::PROPERTY)
        .union(MemberKindMask::INDEXER)
        .union(MemberKindMask::ARRAY_ELEMENT)
        .union(MemberKindMask::CONSTANT);
}

/// Closed member kind discriminator
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MemberKind {
    /// Declared field
    Field,
    /// Property (declared, computed, or attached)
    Property,
    /// Event
    Event,
    /// Method
    Method,
    /// Indexer accessor built from a getter/setter pair
    Indexer,
    /// List element accessor
    ArrayElement,
    /// Constant value (including fake placeholders)
    Constant,
}

impl MemberKind {
    /// The mask bit for this kind
    pub fn mask(self) -> MemberKindMask {
        match self {
            MemberKind::Field => MemberKindMask::FIELD,
            MemberKind::Property => MemberKindMask::PROPERTY,
            MemberKind::Event => MemberKindMask::EVENT,
            MemberKind::Method => MemberKindMask::METHOD,
            MemberKind::Indexer => MemberKindMask::INDEXER,
            MemberKind::ArrayElement => MemberKindMask::ARRAY_ELEMENT,
            MemberKind::Constant => MemberKindMask::CONSTANT,
        }
    }
}

/// Where a member came from; the coarse component of priority ranking
///
/// Variants are declared in ascending rank: attached beats instance beats
/// extension beats dynamic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MemberOrigin {
    /// Resolved by a dynamic handler
    Dynamic,
    /// Extension-set member
    Extension,
    /// Declared on the type itself
    Instance,
    /// Registered attached member
    Attached,
}

impl MemberOrigin {
    /// Numeric rank, ascending
    pub fn rank(self) -> u8 {
        match self {
            MemberOrigin::Dynamic => 0,
            MemberOrigin::Extension => 1,
            MemberOrigin::Instance => 2,
            MemberOrigin::Attached => 3,
        }
    }

    fn flag(self) -> MemberFlags {
        match self {
            MemberOrigin::Dynamic => MemberFlags::DYNAMIC,
            MemberOrigin::Extension => MemberFlags::EXTENSION,
            MemberOrigin::Instance => MemberFlags::empty(),
            MemberOrigin::Attached => MemberFlags::ATTACHED,
        }
    }
}

/// How tightly a method binding matched its arguments
///
/// Variants are declared in ascending rank: exact beats optional beats rest.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ArgSpecificity {
    /// Bound through a rest parameter
    Rest,
    /// Bound with omitted optional parameters
    Optional,
    /// Every parameter bound exactly
    Exact,
}

impl ArgSpecificity {
    /// Numeric rank, ascending
    pub fn rank(self) -> u8 {
        match self {
            ArgSpecificity::Rest => 0,
            ArgSpecificity::Optional => 1,
            ArgSpecificity::Exact => 2,
        }
    }

    /// Specificity implied by a signature alone
    pub fn of_signature(params: &[ParamSchema]) -> Self {
        if params.iter().any(|p| p.rest) {
            ArgSpecificity::Rest
        } else if params.iter().any(|p| p.optional) {
            ArgSpecificity::Optional
        } else {
            ArgSpecificity::Exact
        }
    }
}

/// Field accessor payload
pub struct FieldMember {
    slot: usize,
    readonly: bool,
    /// Present for static fields: the declaring descriptor owns the slots
    statics: Option<Arc<TypeDescriptor>>,
}

/// Property accessor payload
///
/// Accessors compile lazily: the schema backing is held uncompiled and the
/// compiled closure is installed through an explicit two-state `OnceCell`,
/// so concurrent first reads race benignly on a fully-built closure.
pub struct PropertyMember {
    descriptor: Option<Arc<TypeDescriptor>>,
    backing: PropertyBacking,
    getter: OnceCell<Option<GetterFn>>,
    setter: OnceCell<Option<SetterFn>>,
}

impl PropertyMember {
    fn getter(&self, name: &Arc<str>) -> Option<GetterFn> {
        self.getter
            .get_or_init(|| self.compile_getter(name))
            .clone()
    }

    fn setter(&self, name: &Arc<str>) -> Option<SetterFn> {
        self.setter
            .get_or_init(|| self.compile_setter(name))
            .clone()
    }

    fn compile_getter(&self, name: &Arc<str>) -> Option<GetterFn> {
        match &self.backing {
            PropertyBacking::Computed { getter, .. } => getter.clone(),
            PropertyBacking::Field(field) => {
                let (_, slot) = self.descriptor.as_ref()?.field(field)?;
                let member = name.clone();
                Some(Arc::new(move |target: &Value| {
                    let obj = target.as_object().ok_or_else(|| {
                        MemberError::type_mismatch("object", target.type_name())
                    })?;
                    obj.get_field(slot).ok_or_else(|| MemberError::InvalidTarget {
                        member: member.to_string(),
                    })
                }))
            }
        }
    }

    fn compile_setter(&self, _name: &Arc<str>) -> Option<SetterFn> {
        match &self.backing {
            PropertyBacking::Computed { setter, .. } => setter.clone(),
            PropertyBacking::Field(field) => {
                let (schema, slot) = self.descriptor.as_ref()?.field(field)?;
                if schema.readonly {
                    return None;
                }
                Some(Arc::new(move |target: &Value, value: Value| {
                    let obj = target.as_object().ok_or_else(|| {
                        MemberError::type_mismatch("object", target.type_name())
                    })?;
                    obj.set_field(slot, value)
                }))
            }
        }
    }
}

/// Event payload; only observable
pub struct EventMember {
    event: Arc<str>,
}

/// Method payload
#[derive(Clone)]
pub struct MethodMember {
    params: Arc<[ParamSchema]>,
    return_type: ValueType,
    invoke: MethodFn,
    /// Literal arguments bound by call syntax; a bound method reads by
    /// invoking with them
    bound_args: Option<Arc<[Value]>>,
    specificity: ArgSpecificity,
}

impl MethodMember {
    /// Declared parameters
    pub fn params(&self) -> &[ParamSchema] {
        &self.params
    }

    /// Declared return type
    pub fn return_type(&self) -> ValueType {
        self.return_type
    }

    /// Bound call-syntax arguments, if any
    pub fn bound_args(&self) -> Option<&[Value]> {
        self.bound_args.as_deref()
    }

    /// Argument-binding specificity for priority ranking
    pub fn specificity(&self) -> ArgSpecificity {
        self.specificity
    }

    /// Declared parameter types
    pub fn param_types(&self) -> Vec<ValueType> {
        self.params.iter().map(|p| p.value_type).collect()
    }

    /// Invoke with explicit arguments
    pub fn invoke(&self, target: &Value, args: &[Value]) -> MemberResult<Value> {
        (self.invoke)(target, args)
    }

    fn get(&self, target: &Value, name: &str) -> MemberResult<Value> {
        if let Some(args) = &self.bound_args {
            return (self.invoke)(target, args);
        }
        if self.params.is_empty() {
            return (self.invoke)(target, &[]);
        }
        // Callable with nothing bound: optionals default to null, a rest
        // parameter to an empty list.
        if self.params.iter().all(|p| p.optional || p.rest) {
            let defaults: Vec<Value> = self
                .params
                .iter()
                .map(|p| {
                    if p.rest {
                        Value::list(ValueList::new())
                    } else {
                        Value::Null
                    }
                })
                .collect();
            return (self.invoke)(target, &defaults);
        }
        Err(MemberError::must_be_readable(name))
    }
}

/// Indexer payload wrapping a getter/setter method pair with bound arguments
pub struct IndexerMember {
    getter: MethodFn,
    setter: Option<MethodFn>,
    args: Arc<[Value]>,
}

impl IndexerMember {
    /// The converted indexer arguments
    pub fn args(&self) -> &[Value] {
        &self.args
    }
}

/// List element payload
pub struct ArrayElementMember {
    index: usize,
}

impl ArrayElementMember {
    /// Element index
    pub fn index(&self) -> usize {
        self.index
    }
}

/// Constant payload
pub struct ConstantMember {
    value: Value,
    /// Fake placeholders accept writes as no-ops
    write_noop: bool,
}

/// Kind-specific member payload
pub enum MemberPayload {
    /// Field accessor
    Field(FieldMember),
    /// Property accessor
    Property(PropertyMember),
    /// Event
    Event(EventMember),
    /// Method
    Method(MethodMember),
    /// Indexer accessor
    Indexer(IndexerMember),
    /// List element accessor
    ArrayElement(ArrayElementMember),
    /// Constant value
    Constant(ConstantMember),
}

/// A resolved member of a type
pub struct Member {
    name: Arc<str>,
    declaring_type: TypeId,
    value_type: ValueType,
    flags: MemberFlags,
    origin: MemberOrigin,
    payload: MemberPayload,
}

impl Member {
    // ========================================================================
    // Constructors
    // ========================================================================

    /// Instance field member
    pub fn field(
        name: impl Into<Arc<str>>,
        declaring_type: TypeId,
        value_type: ValueType,
        slot: usize,
        readonly: bool,
    ) -> Member {
        Member {
            name: name.into(),
            declaring_type,
            value_type,
            flags: MemberFlags::PUBLIC | MemberFlags::INSTANCE,
            origin: MemberOrigin::Instance,
            payload: MemberPayload::Field(FieldMember {
                slot,
                readonly,
                statics: None,
            }),
        }
    }

    /// Static field member; slots live on the declaring descriptor
    pub fn static_field(
        name: impl Into<Arc<str>>,
        declaring_type: TypeId,
        value_type: ValueType,
        slot: usize,
        readonly: bool,
        descriptor: Arc<TypeDescriptor>,
    ) -> Member {
        Member {
            name: name.into(),
            declaring_type,
            value_type,
            flags: MemberFlags::PUBLIC | MemberFlags::STATIC,
            origin: MemberOrigin::Instance,
            payload: MemberPayload::Field(FieldMember {
                slot,
                readonly,
                statics: Some(descriptor),
            }),
        }
    }

    /// Property member over a schema backing
    ///
    /// `descriptor` is required for field-aliased backings; computed backings
    /// may pass `None`.
    pub fn property(
        name: impl Into<Arc<str>>,
        declaring_type: TypeId,
        value_type: ValueType,
        descriptor: Option<Arc<TypeDescriptor>>,
        backing: PropertyBacking,
        origin: MemberOrigin,
    ) -> Member {
        Member {
            name: name.into(),
            declaring_type,
            value_type,
            flags: MemberFlags::PUBLIC | MemberFlags::INSTANCE | origin.flag(),
            origin,
            payload: MemberPayload::Property(PropertyMember {
                descriptor,
                backing,
                getter: OnceCell::new(),
                setter: OnceCell::new(),
            }),
        }
    }

    /// Attached property member with per-instance storage and a default
    pub fn attached_property(
        name: impl Into<Arc<str>>,
        declaring_type: TypeId,
        value_type: ValueType,
        default: Value,
    ) -> Member {
        let store: Arc<RwLock<FxHashMap<u64, Value>>> =
            Arc::new(RwLock::new(FxHashMap::default()));

        let read_store = store.clone();
        let getter: GetterFn = Arc::new(move |target: &Value| {
            let obj = target
                .as_object()
                .ok_or_else(|| MemberError::type_mismatch("object", target.type_name()))?;
            Ok(read_store
                .read()
                .get(&obj.object_id())
                .cloned()
                .unwrap_or_else(|| default.clone()))
        });
        let setter: SetterFn = Arc::new(move |target: &Value, value: Value| {
            let obj = target
                .as_object()
                .ok_or_else(|| MemberError::type_mismatch("object", target.type_name()))?;
            store.write().insert(obj.object_id(), value);
            Ok(())
        });

        Member::property(
            name,
            declaring_type,
            value_type,
            None,
            PropertyBacking::Computed {
                getter: Some(getter),
                setter: Some(setter),
            },
            MemberOrigin::Attached,
        )
    }

    /// Event member observed through the instance change hub
    pub fn event(name: impl Into<Arc<str>>, declaring_type: TypeId) -> Member {
        let name = name.into();
        Member {
            name: name.clone(),
            declaring_type,
            value_type: ValueType::Any,
            flags: MemberFlags::PUBLIC | MemberFlags::INSTANCE,
            origin: MemberOrigin::Instance,
            payload: MemberPayload::Event(EventMember { event: name }),
        }
    }

    /// Method member
    pub fn method(
        name: impl Into<Arc<str>>,
        declaring_type: TypeId,
        params: Vec<ParamSchema>,
        return_type: ValueType,
        invoke: MethodFn,
        origin: MemberOrigin,
    ) -> Member {
        let specificity = ArgSpecificity::of_signature(&params);
        Member {
            name: name.into(),
            declaring_type,
            value_type: return_type,
            flags: MemberFlags::PUBLIC | MemberFlags::INSTANCE | origin.flag(),
            origin,
            payload: MemberPayload::Method(MethodMember {
                params: params.into(),
                return_type,
                invoke,
                bound_args: None,
                specificity,
            }),
        }
    }

    /// Method member with call-syntax arguments already bound
    pub fn bound_method(
        name: impl Into<Arc<str>>,
        declaring_type: TypeId,
        params: Vec<ParamSchema>,
        return_type: ValueType,
        invoke: MethodFn,
        bound_args: Vec<Value>,
        specificity: ArgSpecificity,
        origin: MemberOrigin,
    ) -> Member {
        Member {
            name: name.into(),
            declaring_type,
            value_type: return_type,
            flags: MemberFlags::PUBLIC | MemberFlags::INSTANCE | origin.flag(),
            origin,
            payload: MemberPayload::Method(MethodMember {
                params: params.into(),
                return_type,
                invoke,
                bound_args: Some(bound_args.into()),
                specificity,
            }),
        }
    }

    /// Indexer member wrapping a getter/setter pair and converted arguments
    pub fn indexer(
        name: impl Into<Arc<str>>,
        declaring_type: TypeId,
        value_type: ValueType,
        getter: MethodFn,
        setter: Option<MethodFn>,
        args: Vec<Value>,
        origin: MemberOrigin,
    ) -> Member {
        Member {
            name: name.into(),
            declaring_type,
            value_type,
            flags: MemberFlags::PUBLIC | MemberFlags::INSTANCE | origin.flag(),
            origin,
            payload: MemberPayload::Indexer(IndexerMember {
                getter,
                setter,
                args: args.into(),
            }),
        }
    }

    /// List element accessor
    pub fn array_element(
        name: impl Into<Arc<str>>,
        declaring_type: TypeId,
        index: usize,
    ) -> Member {
        Member {
            name: name.into(),
            declaring_type,
            value_type: ValueType::Any,
            flags: MemberFlags::PUBLIC | MemberFlags::INSTANCE,
            origin: MemberOrigin::Instance,
            payload: MemberPayload::ArrayElement(ArrayElementMember { index }),
        }
    }

    /// Constant member
    pub fn constant(
        name: impl Into<Arc<str>>,
        declaring_type: TypeId,
        value: Value,
        origin: MemberOrigin,
    ) -> Member {
        Member {
            name: name.into(),
            declaring_type,
            value_type: ValueType::Any,
            flags: MemberFlags::PUBLIC | MemberFlags::INSTANCE | origin.flag(),
            origin,
            payload: MemberPayload::Constant(ConstantMember {
                value,
                write_noop: false,
            }),
        }
    }

    /// Fake placeholder member: reads null, swallows writes, observes nothing
    pub fn fake(name: impl Into<Arc<str>>, declaring_type: TypeId) -> Member {
        Member {
            name: name.into(),
            declaring_type,
            value_type: ValueType::Any,
            flags: MemberFlags::PUBLIC | MemberFlags::INSTANCE,
            origin: MemberOrigin::Instance,
            payload: MemberPayload::Constant(ConstantMember {
                value: Value::Null,
                write_noop: true,
            }),
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Member name (the request name it resolves under)
    pub fn name(&self) -> &Arc<str> {
        &self.name
    }

    /// Declaring type
    pub fn declaring_type(&self) -> TypeId {
        self.declaring_type
    }

    /// Member value type (return type for methods)
    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    /// Access flags
    pub fn flags(&self) -> MemberFlags {
        self.flags
    }

    /// Member origin
    pub fn origin(&self) -> MemberOrigin {
        self.origin
    }

    /// Kind discriminator
    pub fn kind(&self) -> MemberKind {
        match &self.payload {
            MemberPayload::Field(_) => MemberKind::Field,
            MemberPayload::Property(_) => MemberKind::Property,
            MemberPayload::Event(_) => MemberKind::Event,
            MemberPayload::Method(_) => MemberKind::Method,
            MemberPayload::Indexer(_) => MemberKind::Indexer,
            MemberPayload::ArrayElement(_) => MemberKind::ArrayElement,
            MemberPayload::Constant(_) => MemberKind::Constant,
        }
    }

    /// Kind-specific payload
    pub fn payload(&self) -> &MemberPayload {
        &self.payload
    }

    /// Method payload, when this member is a method
    pub fn as_method(&self) -> Option<&MethodMember> {
        match &self.payload {
            MemberPayload::Method(m) => Some(m),
            _ => None,
        }
    }

    /// Collision shape for selection: methods collide per parameter list,
    /// other kinds collide per kind
    pub fn shape(&self) -> Option<Vec<ValueType>> {
        match &self.payload {
            MemberPayload::Method(m) => Some(m.param_types()),
            _ => None,
        }
    }

    // ========================================================================
    // Access
    // ========================================================================

    /// Read the member value off `target`
    pub fn get_value(&self, target: &Value) -> MemberResult<Value> {
        match &self.payload {
            MemberPayload::Field(f) => match &f.statics {
                Some(desc) => desc.get_static(f.slot).ok_or_else(|| {
                    MemberError::InvalidTarget {
                        member: self.name.to_string(),
                    }
                }),
                None => {
                    let obj = target.as_object().ok_or_else(|| {
                        MemberError::type_mismatch("object", target.type_name())
                    })?;
                    obj.get_field(f.slot)
                        .ok_or_else(|| MemberError::InvalidTarget {
                            member: self.name.to_string(),
                        })
                }
            },
            MemberPayload::Property(p) => match p.getter(&self.name) {
                Some(getter) => getter(target),
                None => Err(MemberError::must_be_readable(self.name.as_ref())),
            },
            MemberPayload::Event(_) => Err(MemberError::must_be_readable(self.name.as_ref())),
            MemberPayload::Method(m) => m.get(target, &self.name),
            MemberPayload::Indexer(ix) => (ix.getter)(target, &ix.args),
            MemberPayload::ArrayElement(a) => {
                let list = target
                    .as_list()
                    .ok_or_else(|| MemberError::type_mismatch("list", target.type_name()))?;
                list.get(a.index)
            }
            MemberPayload::Constant(c) => Ok(c.value.clone()),
        }
    }

    /// Write `value` through the member onto `target`
    ///
    /// Successful instance writes notify the target's change hub under this
    /// member's name; list elements notify through the list itself.
    pub fn set_value(&self, target: &Value, value: Value) -> MemberResult<()> {
        match &self.payload {
            MemberPayload::Field(f) => {
                if f.readonly {
                    return Err(MemberError::must_be_writable(self.name.as_ref()));
                }
                match &f.statics {
                    Some(desc) => desc.set_static(f.slot, value),
                    None => {
                        let obj = target.as_object().ok_or_else(|| {
                            MemberError::type_mismatch("object", target.type_name())
                        })?;
                        obj.set_field(f.slot, value)?;
                        obj.changes().notify(&self.name);
                        Ok(())
                    }
                }
            }
            MemberPayload::Property(p) => {
                let setter = p
                    .setter(&self.name)
                    .ok_or_else(|| MemberError::must_be_writable(self.name.as_ref()))?;
                setter(target, value)?;
                if let Some(obj) = target.as_object() {
                    obj.changes().notify(&self.name);
                }
                Ok(())
            }
            MemberPayload::Event(_) => Err(MemberError::must_be_writable(self.name.as_ref())),
            MemberPayload::Method(_) => Err(MemberError::must_be_writable(self.name.as_ref())),
            MemberPayload::Indexer(ix) => {
                let setter = ix
                    .setter
                    .as_ref()
                    .ok_or_else(|| MemberError::must_be_writable(self.name.as_ref()))?;
                let mut args = ix.args.to_vec();
                args.push(value);
                setter(target, &args)?;
                if let Some(obj) = target.as_object() {
                    obj.changes().notify(&self.name);
                }
                Ok(())
            }
            MemberPayload::ArrayElement(a) => {
                let list = target
                    .as_list()
                    .ok_or_else(|| MemberError::type_mismatch("list", target.type_name()))?;
                list.set(a.index, value)
            }
            MemberPayload::Constant(c) => {
                if c.write_noop {
                    Ok(())
                } else {
                    Err(MemberError::must_be_writable(self.name.as_ref()))
                }
            }
        }
    }

    /// Observe changes of this member on `target`
    ///
    /// Members without change semantics (methods, constants, static fields)
    /// return a no-op token rather than failing, so observation setup never
    /// breaks a binding.
    pub fn try_observe(
        &self,
        target: &Value,
        listener: ChangeListener,
    ) -> MemberResult<Subscription> {
        match &self.payload {
            MemberPayload::Field(f) => {
                if f.statics.is_some() {
                    return Ok(Subscription::noop());
                }
                Ok(self.observe_named(target, listener))
            }
            MemberPayload::Property(_) | MemberPayload::Indexer(_) => {
                Ok(self.observe_named(target, listener))
            }
            MemberPayload::Event(e) => match target {
                Value::Object(obj) => Ok(obj.changes().subscribe(Some(e.event.as_ref()), listener)),
                Value::List(list) => Ok(list.changes().subscribe(Some(e.event.as_ref()), listener)),
                other => Err(MemberError::type_mismatch("object", other.type_name())),
            },
            MemberPayload::Method(_) | MemberPayload::Constant(_) => Ok(Subscription::noop()),
            MemberPayload::ArrayElement(a) => {
                let list = target
                    .as_list()
                    .ok_or_else(|| MemberError::type_mismatch("list", target.type_name()))?;
                let filter = format!("[{}]", a.index);
                Ok(list.changes().subscribe(Some(filter.as_str()), listener))
            }
        }
    }

    fn observe_named(&self, target: &Value, listener: ChangeListener) -> Subscription {
        match target {
            Value::Object(obj) => obj.changes().subscribe(Some(self.name.as_ref()), listener),
            Value::List(list) => list.changes().subscribe(Some(self.name.as_ref()), listener),
            _ => Subscription::noop(),
        }
    }
}

impl std::fmt::Debug for Member {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Member")
            .field("name", &self.name)
            .field("kind", &self.kind())
            .field("declaring_type", &self.declaring_type)
            .field("origin", &self.origin)
            .field("flags", &self.flags)
            .finish()
    }
}
