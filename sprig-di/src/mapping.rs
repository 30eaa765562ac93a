//! Method-mapping tables of mapper interfaces. Each bound mapper method gets a [MethodBinding]
//! describing which implementation method is called and with what static arguments.

use crate::component::MapperMethod;
use fxhash::FxHashMap;
use tracing::debug;

/// Creates the binding key for a given interface method.
#[inline]
pub fn binding_key(interface: &str, method: &str) -> String {
    format!("{interface}.{method}")
}

/// Invocation spec of a single mapper method.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MethodBinding {
    /// `interface + "." + method`
    pub key: String,
    pub class_name: String,
    pub method_name: String,
    pub parameter_types: Vec<String>,
    pub parameter_values: Vec<String>,
    pub description: String,
}

/// Bindings of a single mapper interface, keyed by binding key. Built once while scanning and
/// never mutated afterwards.
#[derive(Clone, Debug, Default)]
pub struct MethodMappingTable {
    interface: String,
    bindings: FxHashMap<String, MethodBinding>,
}

impl MethodMappingTable {
    pub fn new(interface: &str) -> Self {
        Self {
            interface: interface.to_string(),
            bindings: Default::default(),
        }
    }

    /// Builds a table from the declared mapper methods. Methods without a binding annotation are
    /// skipped.
    pub fn from_mapper(interface: &str, methods: &[MapperMethod]) -> Self {
        let mut table = Self::new(interface);
        for method in methods {
            if let Some(binding) = &method.binding {
                table.insert(MethodBinding {
                    key: binding_key(interface, &method.name),
                    class_name: binding.class_name.clone(),
                    method_name: binding.method_name.clone(),
                    parameter_types: binding.parameter_types.clone(),
                    parameter_values: binding.parameter_values.clone(),
                    description: binding.description.clone(),
                });
            }
        }

        table
    }

    /// Adds a binding, unless one with the same key already exists - the first binding wins and
    /// later ones are silently ignored. Returns if the binding was added.
    pub fn insert(&mut self, binding: MethodBinding) -> bool {
        if self.bindings.contains_key(&binding.key) {
            debug!(key = %binding.key, "Ignoring duplicate method binding.");
            return false;
        }

        self.bindings.insert(binding.key.clone(), binding);
        true
    }

    #[inline]
    pub fn interface(&self) -> &str {
        &self.interface
    }

    #[inline]
    pub fn get(&self, key: &str) -> Option<&MethodBinding> {
        self.bindings.get(key)
    }

    #[inline]
    pub fn binding_for(&self, method: &str) -> Option<&MethodBinding> {
        self.get(&binding_key(&self.interface, method))
    }

    #[inline]
    pub fn bindings(&self) -> impl Iterator<Item = &MethodBinding> {
        self.bindings.values()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
