//! The [Container] owns all singletons of an application. It is created by a single call to
//! [init](Container::init), which runs the whole bootstrap in five ordered phases:
//!
//! 1. configuration - the scan filter is taken from the application marker and properties are
//!    loaded from the application resources,
//! 2. types within the scan are registered and mapper binding tables are built,
//! 3. mapper proxies are synthesized,
//! 4. every registered type is resolved and finalized,
//! 5. deferred interface dependencies are swept.
//!
//! Only configuration failures are fatal. Everything else is logged and degrades the resulting
//! object graph. After `init` the container is read-only and can be shared between threads.

use crate::builder::InstanceGraphBuilder;
use crate::component::TypeKind;
use crate::component_registry::internal::ApplicationRegisterer;
use crate::component_registry::MetadataRegistry;
use crate::error::BootstrapError;
use crate::instance::{ComponentInstanceAnyPtr, ComponentInstancePtr, Injectable};
use crate::mapping::MethodMappingTable;
use crate::proxy::{MethodTargetRegistry, ProxySynthesizer};
use crate::resource::{ConfigResourceLoader, Properties, ResourceLoader, DEFAULT_RESOURCE};
use crate::scanner::{ComponentScan, InventoryTypeScanner, TypeScanner};
use crate::store::SingletonStore;
use fxhash::FxHashMap;
use std::any::{type_name, TypeId};
use tracing::{debug, error, info};

/// Bootstrap configuration of an application, usually declared by `#[derive(Application)]`.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ApplicationMetadata {
    /// Canonical name of the application marker type.
    pub name: String,

    pub scan: ComponentScan,

    /// Resource path. [DEFAULT_RESOURCE] is used when not given.
    pub resources: Option<String>,
}

impl ApplicationMetadata {
    /// Looks up metadata of an application marker type.
    pub fn of<Root: 'static>() -> Result<Self, BootstrapError> {
        let type_id = TypeId::of::<Root>();
        inventory::iter::<ApplicationRegisterer>
            .into_iter()
            .find(|registerer| (registerer.type_id)() == type_id)
            .map(|registerer| Self {
                name: registerer.name.to_string(),
                scan: (registerer.scan)(),
                resources: registerer.resources.map(str::to_string),
            })
            .ok_or_else(|| BootstrapError::MissingApplicationMarker(type_name::<Root>().to_string()))
    }
}

/// Dependency injection container holding finished singletons.
#[derive(Debug)]
pub struct Container {
    registry: MetadataRegistry,
    mappings: FxHashMap<String, MethodMappingTable>,
    store: SingletonStore,
    properties: Properties,
}

impl Container {
    /// Bootstraps a container for an application marked with `#[derive(Application)]`, using
    /// types submitted by the derive macros and the default resource loader.
    pub fn init<Root: 'static>() -> Result<Self, BootstrapError> {
        let metadata = ApplicationMetadata::of::<Root>()?;
        Self::init_with(&metadata, &InventoryTypeScanner, &ConfigResourceLoader)
    }

    /// Bootstraps a container with the given collaborators.
    pub fn init_with(
        metadata: &ApplicationMetadata,
        scanner: &dyn TypeScanner,
        loader: &dyn ResourceLoader,
    ) -> Result<Self, BootstrapError> {
        Self::init_with_targets(
            metadata,
            scanner,
            loader,
            &MethodTargetRegistry::from_inventory(),
        )
    }

    /// Bootstraps a container with the given collaborators and mapper method targets.
    pub fn init_with_targets(
        metadata: &ApplicationMetadata,
        scanner: &dyn TypeScanner,
        loader: &dyn ResourceLoader,
        targets: &MethodTargetRegistry,
    ) -> Result<Self, BootstrapError> {
        info!(application = %metadata.name, package = %metadata.scan.package, "Loading configuration.");
        let properties =
            loader.load(metadata.resources.as_deref().unwrap_or(DEFAULT_RESOURCE))?;

        info!("Registering types.");
        let mut registry = MetadataRegistry::default();
        let mut mappings = FxHashMap::default();
        for descriptor in scanner.scan(&metadata.scan) {
            let table = match &descriptor.kind {
                TypeKind::Mapper(methods) => {
                    Some(MethodMappingTable::from_mapper(&descriptor.name, methods))
                }
                _ => None,
            };

            let name = descriptor.name.clone();
            match registry.register(descriptor) {
                Ok(_) => {
                    if let Some(table) = table {
                        mappings.insert(name, table);
                    }
                }
                Err(error) => error!(%error, "Ignoring type."),
            }
        }

        let container = Self {
            registry,
            mappings,
            store: SingletonStore::default(),
            properties,
        };

        info!(count = container.mappings.len(), "Synthesizing mapper proxies.");
        let synthesizer = ProxySynthesizer::new(targets);
        for descriptor in container.registry.iter().filter(|descriptor| descriptor.is_mapper()) {
            if let Some(table) = container.mappings.get(&descriptor.name) {
                synthesizer.synthesize(table, &container.store);
            }
        }

        info!(count = container.registry.len(), "Building components.");
        let builder =
            InstanceGraphBuilder::new(&container.registry, &container.store, &container.properties);
        builder.build();

        info!("Resolving deferred dependencies.");
        let resolved = builder.sweep();
        debug!(resolved, singletons = container.store.len(), "Container ready.");

        Ok(container)
    }

    /// Returns the singleton registered under the given name or alias.
    #[inline]
    pub fn bean(&self, name: &str) -> Option<ComponentInstanceAnyPtr> {
        self.store.get(self.canonical_name(name))
    }

    /// Returns the singleton of the given type.
    #[inline]
    pub fn typed_bean<T: Injectable + ?Sized>(&self) -> Option<ComponentInstancePtr<T>> {
        self.named_bean(T::canonical_name())
    }

    /// Returns the singleton registered under the given name or alias, as the given type.
    pub fn named_bean<T: Injectable + ?Sized>(&self, name: &str) -> Option<ComponentInstancePtr<T>> {
        self.bean(name).and_then(T::from_instance)
    }

    /// Returns all component singletons implementing the given interface, in registration order.
    /// Unlike [typed_bean](Self::typed_bean), plain components are included too.
    pub fn instances<T: Injectable + ?Sized>(&self) -> Vec<ComponentInstancePtr<T>> {
        let interface = T::canonical_name();
        self.registry
            .iter()
            .filter_map(|descriptor| {
                let upcast = descriptor
                    .component()?
                    .interfaces
                    .iter()
                    .find(|candidate| candidate.name == interface)?
                    .upcast;
                upcast(self.store.get(&descriptor.name)?)
            })
            .filter_map(T::from_instance)
            .collect()
    }

    #[inline]
    pub fn contains_bean(&self, name: &str) -> bool {
        self.store.contains(self.canonical_name(name))
    }

    /// Resolves an alias to its canonical name.
    #[inline]
    pub fn canonical_name<'a>(&'a self, name: &'a str) -> &'a str {
        self.registry.resolve_alias(name)
    }

    /// Names of all singletons.
    #[inline]
    pub fn bean_names(&self) -> Vec<String> {
        self.store.names()
    }

    #[inline]
    pub fn registry(&self) -> &MetadataRegistry {
        &self.registry
    }

    #[inline]
    pub fn mapping_table(&self, interface: &str) -> Option<&MethodMappingTable> {
        self.mappings.get(self.canonical_name(interface))
    }

    /// Properties loaded from the application resources.
    #[inline]
    pub fn properties(&self) -> &Properties {
        &self.properties
    }
}
