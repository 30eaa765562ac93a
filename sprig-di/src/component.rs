//! Static descriptions of injectable types. Every type managed by the container is described by
//! a [TypeDescriptor] - a concrete [component](TypeKind::Component), a plain
//! [interface](TypeKind::Interface) or a [mapper](TypeKind::Mapper) interface. Descriptors replace
//! runtime reflection: fields, interfaces and constructors are listed explicitly, usually by the
//! derive macros.
//!
//! ## Registering concrete components
//!
//! ```
//! use sprig_di::instance::{Autowired, Value};
//! use sprig_di::{injectable, Component};
//!
//! #[injectable]
//! trait Repository {}
//!
//! #[derive(Component, Default)]
//! #[component(alias = "jdbc", stereotype = "repository", interfaces = ["Repository"])]
//! struct JdbcRepository {
//!     #[value("db.url")]
//!     url: Value<String>,
//! }
//!
//! impl Repository for JdbcRepository {}
//!
//! #[derive(Component, Default)]
//! #[component(stereotype = "service")]
//! struct UserService {
//!     #[autowired]
//!     repository: Autowired<dyn Repository + Send + Sync>,
//!     // not managed by the container
//!     retries: u8,
//! }
//! # fn main() {}
//! ```
//!
//! ### Supported `#[component]` struct configuration
//!
//! * `alias = "name"` - register an additional name for the component
//! * `stereotype = "component" | "service" | "controller" | "repository"` - services and
//! controllers are additionally registered under their first interface
//! * `interfaces = ["Trait", ...]` - injectable traits implemented by the component, in
//! declaration order
//! * `constructor = "path"` - call `path()` returning `Result<Self, ErrorPtr>` instead of
//! `Default::default()`
//!
//! ### Supported field attributes
//!
//! * `#[autowired]` - inject the dependency into an [Autowired](crate::instance::Autowired) field
//! * `#[value("key")]` - assign the property `key` to a [Value](crate::instance::Value) field
//! * `#[autowired(type_name = "name")]` - override the declared type name

use crate::error::ErrorPtr;
use crate::instance::{ComponentInstanceAnyPtr, IncompatibleInstance, ValueError};
use derivative::Derivative;
use std::any::Any;
use std::str::FromStr;
use thiserror::Error;

/// Zero-argument constructor of a bare component instance.
pub type ConstructorFunction = fn() -> Result<ComponentInstanceAnyPtr, ErrorPtr>;

/// Converts a concrete instance into its interface view.
pub type UpcastFunction = fn(ComponentInstanceAnyPtr) -> Option<ComponentInstanceAnyPtr>;

/// Assigns a dependency to a field of the target instance, or clears it on `None`.
pub type InjectFunction =
    fn(target: &dyn Any, value: Option<ComponentInstanceAnyPtr>) -> Result<(), FieldAccessError>;

/// Reads the current dependency of a field of the target instance.
pub type CurrentFunction = fn(target: &dyn Any) -> Result<Option<ComponentInstanceAnyPtr>, FieldAccessError>;

/// Assigns a raw property value to a field of the target instance.
pub type AssignFunction = fn(target: &dyn Any, raw: &str) -> Result<(), FieldAccessError>;

/// Error returned by field accessors.
#[derive(Error, Clone, Debug, Eq, PartialEq)]
pub enum FieldAccessError {
    /// The target is not an instance of the component owning the field.
    #[error("Target instance has wrong type")]
    IncompatibleTarget,
    #[error(transparent)]
    IncompatibleValue(#[from] IncompatibleInstance),
    #[error("Invalid property: {0}")]
    InvalidProperty(#[from] ValueError),
}

/// Role of a component. Services and controllers are additionally registered under their first
/// interface when finalized.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub enum Stereotype {
    #[default]
    Component,
    Service,
    Controller,
    Repository,
}

impl Stereotype {
    #[inline]
    pub fn registers_interface(&self) -> bool {
        matches!(self, Stereotype::Service | Stereotype::Controller)
    }
}

impl FromStr for Stereotype {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "component" => Ok(Stereotype::Component),
            "service" => Ok(Stereotype::Service),
            "controller" => Ok(Stereotype::Controller),
            "repository" => Ok(Stereotype::Repository),
            other => Err(format!("unknown stereotype: {other}")),
        }
    }
}

/// An interface implemented by a component.
#[derive(Derivative, Clone)]
#[derivative(Debug)]
pub struct InterfaceDescriptor {
    pub name: String,

    #[derivative(Debug = "ignore")]
    pub upcast: UpcastFunction,
}

/// How a field gets its value.
#[derive(Derivative, Clone)]
#[derivative(Debug)]
pub enum FieldInjector {
    /// Autowired dependency.
    Dependency {
        #[derivative(Debug = "ignore")]
        inject: InjectFunction,
        #[derivative(Debug = "ignore")]
        current: CurrentFunction,
    },
    /// Externally configured value.
    Property {
        key: String,
        #[derivative(Debug = "ignore")]
        assign: AssignFunction,
    },
}

/// A field of a component which is managed by the container.
#[derive(Clone, Debug)]
pub struct FieldDescriptor {
    pub name: String,

    /// Canonical name of the declared field type.
    pub type_name: String,

    pub injector: FieldInjector,
}

impl FieldDescriptor {
    #[inline]
    pub fn is_dependency(&self) -> bool {
        matches!(self.injector, FieldInjector::Dependency { .. })
    }
}

/// Registration information for a concrete component.
#[derive(Derivative, Clone, Default)]
#[derivative(Debug)]
pub struct ComponentMetadata {
    pub stereotype: Stereotype,

    /// Implemented interfaces, in declaration order.
    pub interfaces: Vec<InterfaceDescriptor>,

    pub fields: Vec<FieldDescriptor>,

    #[derivative(Debug = "ignore")]
    pub constructor: Option<ConstructorFunction>,
}

impl ComponentMetadata {
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|field| field.name == name)
    }
}

/// Binding annotation of a mapper method, as declared by the user.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct BindingMetadata {
    /// Canonical name of the implementation class.
    pub class_name: String,
    pub method_name: String,
    pub parameter_types: Vec<String>,
    pub parameter_values: Vec<String>,
    pub description: String,
}

/// A method declared by a mapper interface.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MapperMethod {
    pub name: String,

    /// Methods without a binding annotation are declared, but fail when invoked.
    pub binding: Option<BindingMetadata>,
}

#[derive(Clone, Debug)]
pub enum TypeKind {
    Component(ComponentMetadata),
    Interface,
    Mapper(Vec<MapperMethod>),
}

/// Description of a discovered type.
#[derive(Clone, Debug)]
pub struct TypeDescriptor {
    /// Unique canonical name.
    pub name: String,

    pub alias: Option<String>,

    pub kind: TypeKind,
}

impl TypeDescriptor {
    #[inline]
    pub fn is_interface(&self) -> bool {
        !matches!(self.kind, TypeKind::Component(_))
    }

    #[inline]
    pub fn is_mapper(&self) -> bool {
        matches!(self.kind, TypeKind::Mapper(_))
    }

    #[inline]
    pub fn component(&self) -> Option<&ComponentMetadata> {
        match &self.kind {
            TypeKind::Component(metadata) => Some(metadata),
            _ => None,
        }
    }
}
