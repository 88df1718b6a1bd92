//! Tether core model
//!
//! This crate provides the data model the tether resolution pipeline works
//! against:
//! - Dynamic values and shared lists ([`Value`], [`ValueList`])
//! - Object instances with change notification ([`DynamicObject`])
//! - Registered type descriptors and the registry ([`TypeDescriptor`],
//!   [`TypeRegistry`])
//! - Literal argument conversion ([`ValueConverter`])
//! - The light hash container backing caches ([`LightMap`])

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod collections;
pub mod convert;
pub mod descriptor;
pub mod error;
pub mod metadata;
pub mod object;
pub mod registry;
pub mod value;

pub use collections::LightMap;
pub use convert::{LiteralParser, ValueConverter};
pub use descriptor::{
    EventSchema, FieldSchema, GetterFn, MethodFn, MethodSchema, ParamSchema, PropertyBacking,
    PropertySchema, SetterFn, TypeDescriptor, TypeDescriptorBuilder,
};
pub use error::{MemberError, MemberResult};
pub use metadata::MetadataContext;
pub use object::{ChangeHub, ChangeListener, DynamicObject, Subscription};
pub use registry::{Proximity, TypeId, TypeRegistry};
pub use value::{Value, ValueList, ValueType};
