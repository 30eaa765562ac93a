//! Mapper proxies. A mapper is an injectable trait without a hand-written implementation: its
//! methods are bound to implementation methods through a
//! [MethodMappingTable](crate::mapping::MethodMappingTable). The [ProxySynthesizer] turns such a
//! table into a [MapperProxy] - a dispatch table with a single [invoke](MapperProxy::invoke)
//! entry point. The `#[mapper]` macro implements the mapper trait for [MapperProxy] by forwarding
//! every method to `invoke`.
//!
//! Implementation methods are registered with [method_target!](crate::method_target) and receive
//! the static parameter values declared by the binding. Arguments passed at the call site are not
//! forwarded to the implementation.
//!
//! ```
//! use sprig_di::error::MapperInvocationError;
//! use sprig_di::method_target;
//! use sprig_di::proxy::{Argument, MethodTargetResult};
//!
//! #[derive(Default)]
//! struct UserDaoImpl;
//!
//! impl UserDaoImpl {
//!     fn select_by_id(&self, id: &str) -> String {
//!         format!("user {id}")
//!     }
//! }
//!
//! fn select_by_id(arguments: &[Argument]) -> MethodTargetResult {
//!     let id: String = arguments
//!         .first()
//!         .ok_or(MapperInvocationError::InvalidArgument {
//!             index: 0,
//!             type_name: "String".to_string(),
//!             reason: "missing".to_string(),
//!         })?
//!         .parse()?;
//!     Ok(Box::new(UserDaoImpl::default().select_by_id(&id)))
//! }
//!
//! method_target!(UserDaoImpl::select_by_id => select_by_id);
//! # fn main() {}
//! ```

use crate::error::MapperInvocationError;
use crate::instance::{ComponentInstanceAnyPtr, ComponentInstancePtr};
use crate::mapping::{MethodBinding, MethodMappingTable};
use crate::store::SingletonStore;
use derivative::Derivative;
use fxhash::FxHashMap;
use itertools::Itertools;
use std::any::{type_name, Any};
use std::fmt::Display;
use std::str::FromStr;
use tracing::{debug, warn};

/// Result of calling a bound implementation method.
pub type MethodTargetResult = Result<Box<dyn Any + Send>, MapperInvocationError>;

/// Bound implementation method, called with the static arguments of a binding.
pub type MethodTargetFunction = fn(arguments: &[Argument]) -> MethodTargetResult;

/// Registers an implementation method which mapper bindings can refer to. The class name is the
/// given type name qualified with the current module path.
///
/// ```ignore
/// method_target!(UserDaoImpl::select_by_id => select_by_id_target);
/// ```
#[macro_export]
macro_rules! method_target {
    ($class:ident :: $method:ident => $target:expr) => {
        $crate::component_registry::internal::submit! {
            $crate::component_registry::internal::MethodTargetRegisterer {
                class_name: concat!(module_path!(), "::", stringify!($class)),
                method_name: stringify!($method),
                target: $target,
            }
        }
    };
}

/// A static argument declared by a binding.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Argument {
    pub index: usize,

    /// Declared parameter type name, if any.
    pub type_name: String,

    pub value: String,
}

impl Argument {
    /// Creates arguments from parallel lists of declared types and values. Missing types are
    /// left empty.
    pub fn from_binding(binding: &MethodBinding) -> Vec<Argument> {
        binding
            .parameter_values
            .iter()
            .enumerate()
            .map(|(index, value)| Argument {
                index,
                type_name: binding
                    .parameter_types
                    .get(index)
                    .cloned()
                    .unwrap_or_default(),
                value: value.clone(),
            })
            .collect_vec()
    }

    /// Converts the raw value into the requested type.
    pub fn parse<T: FromStr>(&self) -> Result<T, MapperInvocationError>
    where
        T::Err: Display,
    {
        self.value
            .parse()
            .map_err(|error: T::Err| MapperInvocationError::InvalidArgument {
                index: self.index,
                type_name: type_name::<T>().to_string(),
                reason: error.to_string(),
            })
    }
}

/// Implementation methods available to mapper bindings, keyed by class and method name.
#[derive(Clone, Default, Derivative)]
#[derivative(Debug)]
pub struct MethodTargetRegistry {
    #[derivative(Debug = "ignore")]
    targets: FxHashMap<(String, String), MethodTargetFunction>,
}

impl MethodTargetRegistry {
    /// Creates a registry with all targets registered with [method_target!](crate::method_target).
    pub fn from_inventory() -> Self {
        let mut registry = Self::default();
        for registerer in
            inventory::iter::<crate::component_registry::internal::MethodTargetRegisterer>
        {
            registry.register(
                registerer.class_name,
                registerer.method_name,
                registerer.target,
            );
        }

        registry
    }

    /// Registers a target. A later registration for the same class and method replaces the
    /// earlier one.
    pub fn register(&mut self, class_name: &str, method_name: &str, target: MethodTargetFunction) {
        if self
            .targets
            .insert((class_name.to_string(), method_name.to_string()), target)
            .is_some()
        {
            warn!(class_name, method_name, "Replacing method target.");
        }
    }

    #[inline]
    pub fn get(&self, class_name: &str, method_name: &str) -> Option<MethodTargetFunction> {
        self.targets
            .get(&(class_name.to_string(), method_name.to_string()))
            .copied()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

/// Synthesized implementation of a mapper interface.
#[derive(Derivative)]
#[derivative(Debug)]
pub struct MapperProxy {
    interface: String,
    table: MethodMappingTable,

    #[derivative(Debug = "ignore")]
    targets: FxHashMap<String, MethodTargetFunction>,
}

impl MapperProxy {
    pub fn new(table: MethodMappingTable, targets: &MethodTargetRegistry) -> Self {
        let targets = table
            .bindings()
            .filter_map(|binding| {
                let target = targets.get(&binding.class_name, &binding.method_name);
                if target.is_none() {
                    warn!(
                        key = %binding.key,
                        class_name = %binding.class_name,
                        method_name = %binding.method_name,
                        "Binding refers to an unregistered method target."
                    );
                }

                target.map(|target| (binding.key.clone(), target))
            })
            .collect();

        Self {
            interface: table.interface().to_string(),
            table,
            targets,
        }
    }

    /// Canonical name of the implemented mapper interface.
    #[inline]
    pub fn interface(&self) -> &str {
        &self.interface
    }

    #[inline]
    pub fn table(&self) -> &MethodMappingTable {
        &self.table
    }

    /// Dispatches a call of the given interface method to its bound implementation, using the
    /// binding's static arguments.
    pub fn invoke(&self, method: &str) -> MethodTargetResult {
        let binding =
            self.table
                .binding_for(method)
                .ok_or_else(|| MapperInvocationError::UnboundMethod {
                    interface: self.interface.clone(),
                    method: method.to_string(),
                })?;

        let target =
            self.targets
                .get(&binding.key)
                .ok_or_else(|| MapperInvocationError::MissingTarget {
                    key: binding.key.clone(),
                    class_name: binding.class_name.clone(),
                    method_name: binding.method_name.clone(),
                })?;

        debug!(key = %binding.key, "Invoking bound method.");
        target(&Argument::from_binding(binding))
    }

    /// Same as [invoke](Self::invoke), but converts the result into the expected type.
    pub fn invoke_typed<R: Any>(&self, method: &str) -> Result<R, MapperInvocationError> {
        self.invoke(method)?
            .downcast::<R>()
            .map(|result| *result)
            .map_err(|_| MapperInvocationError::IncompatibleResult(type_name::<R>()))
    }
}

/// Creates mapper singletons.
#[derive(Debug)]
pub struct ProxySynthesizer<'a> {
    targets: &'a MethodTargetRegistry,
}

impl<'a> ProxySynthesizer<'a> {
    pub fn new(targets: &'a MethodTargetRegistry) -> Self {
        Self { targets }
    }

    /// Returns the singleton of the table's interface, creating and installing a [MapperProxy]
    /// when the store holds none yet.
    pub fn synthesize(
        &self,
        table: &MethodMappingTable,
        store: &SingletonStore,
    ) -> ComponentInstanceAnyPtr {
        store.get_or_insert_with(table.interface(), || {
            debug!(interface = table.interface(), "Synthesizing mapper proxy.");
            ComponentInstancePtr::new(MapperProxy::new(table.clone(), self.targets))
                as ComponentInstanceAnyPtr
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::component::{BindingMetadata, MapperMethod};
    use crate::error::MapperInvocationError;
    use crate::instance::ComponentInstancePtr;
    use crate::mapping::MethodMappingTable;
    use crate::proxy::{
        Argument, MapperProxy, MethodTargetRegistry, MethodTargetResult, ProxySynthesizer,
    };
    use crate::store::SingletonStore;
    use itertools::Itertools;

    const INTERFACE: &str = "mapper::UserMapper";

    fn echo(arguments: &[Argument]) -> MethodTargetResult {
        Ok(Box::new(
            arguments.iter().map(|argument| argument.value.clone()).collect_vec(),
        ))
    }

    fn sum(arguments: &[Argument]) -> MethodTargetResult {
        let mut total = 0i32;
        for argument in arguments {
            total += argument.parse::<i32>()?;
        }

        Ok(Box::new(total))
    }

    fn table() -> MethodMappingTable {
        let bind = |method: &str, values: &[&str]| BindingMetadata {
            class_name: "dao::UserDaoImpl".to_string(),
            method_name: method.to_string(),
            parameter_types: vec![],
            parameter_values: values.iter().map(|value| value.to_string()).collect(),
            description: String::new(),
        };

        MethodMappingTable::from_mapper(
            INTERFACE,
            &[
                MapperMethod {
                    name: "find_by_id".to_string(),
                    binding: Some(bind("echo", &["id", "name"])),
                },
                MapperMethod {
                    name: "count".to_string(),
                    binding: Some(bind("sum", &["1", "2"])),
                },
                MapperMethod {
                    name: "broken".to_string(),
                    binding: Some(bind("missing", &[])),
                },
                MapperMethod {
                    name: "unbound".to_string(),
                    binding: None,
                },
            ],
        )
    }

    fn targets() -> MethodTargetRegistry {
        let mut targets = MethodTargetRegistry::default();
        targets.register("dao::UserDaoImpl", "echo", echo);
        targets.register("dao::UserDaoImpl", "sum", sum);
        targets
    }

    #[test]
    fn should_dispatch_with_static_arguments() {
        let proxy = MapperProxy::new(table(), &targets());

        assert_eq!(
            proxy.invoke_typed::<Vec<String>>("find_by_id").unwrap(),
            vec!["id".to_string(), "name".to_string()]
        );
        assert_eq!(proxy.invoke_typed::<i32>("count").unwrap(), 3);
    }

    #[test]
    fn should_fail_unbound_method() {
        let proxy = MapperProxy::new(table(), &targets());

        assert!(matches!(
            proxy.invoke("unbound"),
            Err(MapperInvocationError::UnboundMethod { interface, method })
                if interface == INTERFACE && method == "unbound"
        ));
        assert!(matches!(
            proxy.invoke("undeclared"),
            Err(MapperInvocationError::UnboundMethod { .. })
        ));
    }

    #[test]
    fn should_fail_missing_target() {
        let proxy = MapperProxy::new(table(), &targets());
        assert!(matches!(
            proxy.invoke("broken"),
            Err(MapperInvocationError::MissingTarget { method_name, .. }) if method_name == "missing"
        ));
    }

    #[test]
    fn should_fail_incompatible_result() {
        let proxy = MapperProxy::new(table(), &targets());
        assert!(matches!(
            proxy.invoke_typed::<String>("count"),
            Err(MapperInvocationError::IncompatibleResult(_))
        ));
    }

    #[test]
    fn should_report_invalid_argument() {
        let argument = Argument {
            index: 2,
            type_name: "i32".to_string(),
            value: "two".to_string(),
        };

        assert!(matches!(
            argument.parse::<i32>(),
            Err(MapperInvocationError::InvalidArgument { index: 2, .. })
        ));
    }

    #[test]
    fn should_synthesize_once() {
        let targets = targets();
        let synthesizer = ProxySynthesizer::new(&targets);
        let store = SingletonStore::default();

        let first = synthesizer.synthesize(&table(), &store);
        let second = synthesizer.synthesize(&table(), &store);

        assert!(ComponentInstancePtr::ptr_eq(&first, &second));
        assert!(ComponentInstancePtr::ptr_eq(&store.get(INTERFACE).unwrap(), &first));
        assert_eq!(
            first.downcast::<MapperProxy>().unwrap().interface(),
            INTERFACE
        );
    }
}
