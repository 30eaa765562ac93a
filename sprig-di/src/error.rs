use crate::component::FieldAccessError;
use crate::resource::ResourceError;
use std::error::Error;
use std::sync::Arc;
use thiserror::Error;

/// Shared pointer to an arbitrary error returned by user code, e.g. custom constructors or mapper
/// target methods.
pub type ErrorPtr = Arc<dyn Error + Send + Sync>;

/// Fatal errors which prevent the container from being created.
#[derive(Error, Clone, Debug)]
pub enum BootstrapError {
    #[error("Type {0} is not an application entry point - is it missing #[derive(Application)]?")]
    MissingApplicationMarker(String),
    #[error("Cannot load application resources: {0}")]
    Configuration(#[from] ResourceError),
}

/// Error related to component registries.
#[derive(Error, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug)]
pub enum ComponentDefinitionRegistryError {
    #[error("Attempted to register a duplicated type with canonical name: {0}")]
    DuplicateRegistration(String),
}

/// Reasons for a failed component construction.
#[derive(Error, Clone, Debug)]
pub enum InstantiationFailure {
    #[error("no zero-argument constructor is available")]
    NoDefaultConstructor,
    #[error("constructor failed: {0}")]
    Constructor(ErrorPtr),
}

/// Errors related to creating and wiring components. Those are recovered locally during the
/// graph build and only logged.
#[derive(Error, Clone, Debug)]
pub enum ComponentInstanceProviderError {
    #[error("Cannot instantiate component {name}: {source}")]
    Instantiation {
        name: String,
        #[source]
        source: InstantiationFailure,
    },
    #[error("Cannot inject field {field} of component {component}: {source}")]
    FieldInjection {
        component: String,
        field: String,
        #[source]
        source: FieldAccessError,
    },
    #[error("Detected dependency cycle at injection path: {path}")]
    DependencyCycle { path: String },
    #[error("Cannot resolve deferred injection path {path}: {reason}")]
    UnresolvedPath { path: String, reason: String },
}

/// Errors surfaced to the callers of [MapperProxy](crate::proxy::MapperProxy) methods.
#[derive(Error, Clone, Debug)]
pub enum MapperInvocationError {
    #[error("Method {method} of mapper {interface} has no bound implementation")]
    UnboundMethod { interface: String, method: String },
    #[error("Binding {key} refers to unknown implementation {class_name}::{method_name}")]
    MissingTarget {
        key: String,
        class_name: String,
        method_name: String,
    },
    #[error("Bound implementation failed: {0}")]
    TargetFailed(ErrorPtr),
    #[error("Cannot convert argument {index} of type {type_name}: {reason}")]
    InvalidArgument {
        index: usize,
        type_name: String,
        reason: String,
    },
    #[error("Mapper result is not of the expected type {0}")]
    IncompatibleResult(&'static str),
}
