//! Functionality related to registering descriptions of discovered types. The
//! [MetadataRegistry] is built once during bootstrap and read-only afterwards. User-assigned
//! aliases are kept in an [AliasRegistry](alias::AliasRegistry).

pub mod alias;

use crate::component::TypeDescriptor;
use crate::component_registry::alias::AliasRegistry;
use crate::error::ComponentDefinitionRegistryError;
use fxhash::FxHashMap;
use tracing::debug;

/// Registry of discovered type descriptors, keyed by canonical name.
#[derive(Clone, Debug, Default)]
pub struct MetadataRegistry {
    descriptors: FxHashMap<String, TypeDescriptor>,
    order: Vec<String>,
    aliases: AliasRegistry,
}

impl MetadataRegistry {
    /// Registers a new descriptor. Registration is a strict uniqueness contract: a duplicated
    /// canonical name is rejected and the first descriptor is kept. A declared alias is
    /// registered as a side effect of a successful registration.
    pub fn register(
        &mut self,
        descriptor: TypeDescriptor,
    ) -> Result<(), ComponentDefinitionRegistryError> {
        if self.descriptors.contains_key(&descriptor.name) {
            return Err(ComponentDefinitionRegistryError::DuplicateRegistration(
                descriptor.name,
            ));
        }

        if let Some(alias) = descriptor.alias.as_deref().filter(|alias| !alias.is_empty()) {
            self.aliases.register_alias(&descriptor.name, alias);
        }

        debug!(
            name = %descriptor.name,
            interface = descriptor.is_interface(),
            mapper = descriptor.is_mapper(),
            "Registered type."
        );

        self.order.push(descriptor.name.clone());
        self.descriptors.insert(descriptor.name.clone(), descriptor);

        Ok(())
    }

    #[inline]
    pub fn get(&self, name: &str) -> Option<&TypeDescriptor> {
        self.descriptors.get(name)
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.descriptors.contains_key(name)
    }

    /// Returns the canonical name for an alias, or the input itself.
    #[inline]
    pub fn resolve_alias<'a>(&'a self, name: &'a str) -> &'a str {
        self.aliases.canonical_name(name)
    }

    /// Iterates descriptors in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &TypeDescriptor> {
        self.order
            .iter()
            .filter_map(|name| self.descriptors.get(name))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    #[inline]
    pub fn aliases(&self) -> &AliasRegistry {
        &self.aliases
    }
}

#[doc(hidden)]
pub mod internal {
    use crate::component::TypeDescriptor;
    use crate::proxy::MethodTargetFunction;
    use crate::scanner::ComponentScan;
    use inventory::collect;
    pub use inventory::submit;
    use std::any::TypeId;

    pub struct TypeRegisterer {
        pub register: fn() -> TypeDescriptor,
    }

    pub struct MethodTargetRegisterer {
        pub class_name: &'static str,
        pub method_name: &'static str,
        pub target: MethodTargetFunction,
    }

    /// Application entry point marker.
    pub struct ApplicationRegisterer {
        pub type_id: fn() -> TypeId,
        pub name: &'static str,
        pub scan: fn() -> ComponentScan,
        pub resources: Option<&'static str>,
    }

    collect!(TypeRegisterer);
    collect!(MethodTargetRegisterer);
    collect!(ApplicationRegisterer);
}
