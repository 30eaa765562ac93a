//! The instance graph builder constructs and wires every concrete component.
//!
//! Resolution of a type always happens along an [InjectionPath] - the name of the root type
//! followed by the chain of fields leading to the requested instance. Root resolutions end up in
//! the [SingletonStore], while nested ones are remembered in a short-lived conversion cache keyed
//! by the path suffix, so the same field chain is never resolved twice.
//!
//! Dependencies on plain interfaces cannot be satisfied while walking the graph, since the
//! implementing component might not be built yet. Such paths are deferred and resolved by
//! [sweep](InstanceGraphBuilder::sweep) once all components are finalized.
//!
//! Failures are local: a component which cannot be constructed or wired is logged and skipped,
//! leaving the fields of its dependents unset. Mutual dependencies between concrete components
//! are reported as [DependencyCycle](ComponentInstanceProviderError::DependencyCycle) errors and
//! the field closing the cycle is never wired, not even by a later root resolution.

use crate::component::{
    ComponentMetadata, FieldAccessError, FieldDescriptor, FieldInjector, TypeDescriptor, TypeKind,
};
use crate::component_registry::MetadataRegistry;
use crate::error::{ComponentInstanceProviderError, InstantiationFailure};
use crate::instance::ComponentInstanceAnyPtr;
use crate::resource::Properties;
use crate::store::SingletonStore;
use fxhash::{FxHashMap, FxHashSet};
use itertools::Itertools;
use parking_lot::Mutex;
use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};
use tracing::{error, trace, warn};

/// Root type name followed by a chain of field names, e.g. `app::Controller$service$repository`.
#[derive(Clone, Debug, Ord, PartialOrd, Eq, PartialEq, Hash)]
pub struct InjectionPath(String);

impl InjectionPath {
    pub const DELIMITER: char = '$';

    #[inline]
    pub fn root(name: &str) -> Self {
        Self(name.to_string())
    }

    #[inline]
    pub fn child(&self, field: &str) -> Self {
        Self(format!("{}{}{field}", self.0, Self::DELIMITER))
    }

    #[inline]
    pub fn is_root(&self) -> bool {
        !self.0.contains(Self::DELIMITER)
    }

    #[inline]
    pub fn root_name(&self) -> &str {
        self.0
            .split_once(Self::DELIMITER)
            .map(|(root, _)| root)
            .unwrap_or(&self.0)
    }

    /// The field chain, starting with the first delimiter. Empty for root paths.
    #[inline]
    pub fn suffix(&self) -> &str {
        self.0
            .find(Self::DELIMITER)
            .map(|index| &self.0[index..])
            .unwrap_or_default()
    }

    /// Field names of the chain.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split(Self::DELIMITER).skip(1)
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for InjectionPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug)]
struct CachedInstance {
    type_name: String,
    instance: ComponentInstanceAnyPtr,
}

#[derive(Debug, Default)]
struct BuildState {
    // constructed components with properties, but without dependencies
    bare_instances: FxHashMap<String, ComponentInstanceAnyPtr>,
    conversion_cache: FxHashMap<String, CachedInstance>,
    deferred: BTreeSet<InjectionPath>,
    in_progress: Vec<String>,
    // (owner, field) dependencies rejected as cycles; never wired
    cyclic_edges: FxHashSet<(String, String)>,
    failed: FxHashMap<String, ComponentInstanceProviderError>,
}

/// Builds the singleton graph of a container. Lives only for the duration of the bootstrap.
#[derive(Debug)]
pub struct InstanceGraphBuilder<'a> {
    registry: &'a MetadataRegistry,
    store: &'a SingletonStore,
    properties: &'a Properties,
    state: Mutex<BuildState>,
}

impl<'a> InstanceGraphBuilder<'a> {
    pub fn new(
        registry: &'a MetadataRegistry,
        store: &'a SingletonStore,
        properties: &'a Properties,
    ) -> Self {
        Self {
            registry,
            store,
            properties,
            state: Default::default(),
        }
    }

    /// Resolves every registered type as a root, in registration order.
    pub fn build(&self) {
        for descriptor in self.registry.iter() {
            self.resolve_root(&descriptor.name);
        }
    }

    /// Resolves a type as a root of the graph. Concrete components are finalized in the store.
    pub fn resolve_root(&self, name: &str) -> Option<ComponentInstanceAnyPtr> {
        let name = self.registry.resolve_alias(name);
        let mut state = self.state.lock();
        self.resolve(&mut state, name, InjectionPath::root(name))
    }

    /// Paths waiting for the sweep.
    pub fn deferred_paths(&self) -> Vec<InjectionPath> {
        self.state.lock().deferred.iter().cloned().collect_vec()
    }

    /// Assigns all deferred interface fields. Returns the number of resolved paths.
    pub fn sweep(&self) -> usize {
        let deferred = std::mem::take(&mut self.state.lock().deferred);
        deferred
            .iter()
            .filter(|path| match self.resolve_deferred(path) {
                Ok(_) => {
                    trace!(%path, "Resolved deferred path.");
                    true
                }
                Err(error) => {
                    error!(%error, "Cannot resolve deferred dependency.");
                    false
                }
            })
            .count()
    }

    fn resolve(
        &self,
        state: &mut BuildState,
        name: &str,
        path: InjectionPath,
    ) -> Option<ComponentInstanceAnyPtr> {
        let descriptor = match self.registry.get(name) {
            Some(descriptor) => descriptor,
            None => {
                trace!(name, %path, "Skipping unregistered type.");
                return None;
            }
        };

        match &descriptor.kind {
            TypeKind::Mapper(_) => self.store.get(name),
            TypeKind::Interface => {
                if !path.is_root() {
                    trace!(%path, "Deferring interface dependency.");
                    state.deferred.insert(path);
                }

                None
            }
            TypeKind::Component(metadata) => {
                match self.resolve_component(state, descriptor, metadata, &path) {
                    Ok(instance) => Some(instance),
                    Err(error) => {
                        error!(%error, %path, "Cannot resolve component.");
                        None
                    }
                }
            }
        }
    }

    fn resolve_component(
        &self,
        state: &mut BuildState,
        descriptor: &TypeDescriptor,
        metadata: &ComponentMetadata,
        path: &InjectionPath,
    ) -> Result<ComponentInstanceAnyPtr, ComponentInstanceProviderError> {
        let instance = self.bare_instance(state, descriptor, metadata)?;

        state.in_progress.push(descriptor.name.clone());
        let injected = self.inject_dependencies(state, descriptor, metadata, &instance, path);
        state.in_progress.pop();
        injected?;

        if path.is_root() {
            let instance = self.store.insert_if_absent(&descriptor.name, instance);
            if metadata.stereotype.registers_interface() {
                if let Some(interface) = metadata.interfaces.first() {
                    match (interface.upcast)(instance.clone()) {
                        Some(view) => {
                            self.store.insert_if_absent(&interface.name, view);
                        }
                        None => warn!(
                            name = %descriptor.name,
                            interface = %interface.name,
                            "Cannot register component under its interface."
                        ),
                    }
                }
            }

            trace!(name = %descriptor.name, "Finalized singleton.");
            Ok(instance)
        } else {
            state.conversion_cache.insert(
                path.suffix().to_string(),
                CachedInstance {
                    type_name: descriptor.name.clone(),
                    instance: instance.clone(),
                },
            );
            Ok(instance)
        }
    }

    fn bare_instance(
        &self,
        state: &mut BuildState,
        descriptor: &TypeDescriptor,
        metadata: &ComponentMetadata,
    ) -> Result<ComponentInstanceAnyPtr, ComponentInstanceProviderError> {
        if let Some(error) = state.failed.get(&descriptor.name) {
            return Err(error.clone());
        }

        if let Some(instance) = state.bare_instances.get(&descriptor.name) {
            return Ok(instance.clone());
        }

        let instance = self
            .construct(descriptor, metadata)
            .map_err(|error| {
                state.failed.insert(descriptor.name.clone(), error.clone());
                error
            })?;

        state
            .bare_instances
            .insert(descriptor.name.clone(), instance.clone());
        Ok(instance)
    }

    fn construct(
        &self,
        descriptor: &TypeDescriptor,
        metadata: &ComponentMetadata,
    ) -> Result<ComponentInstanceAnyPtr, ComponentInstanceProviderError> {
        let instantiation_error = |source| ComponentInstanceProviderError::Instantiation {
            name: descriptor.name.clone(),
            source,
        };

        let constructor = metadata
            .constructor
            .ok_or_else(|| instantiation_error(InstantiationFailure::NoDefaultConstructor))?;
        let instance =
            constructor().map_err(|error| instantiation_error(InstantiationFailure::Constructor(error)))?;

        for field in &metadata.fields {
            if let FieldInjector::Property { key, assign } = &field.injector {
                match self.properties.get(key) {
                    Some(raw) => assign(&*instance, raw).map_err(|error| {
                        field_injection_error(descriptor, field, error)
                    })?,
                    None => warn!(
                        name = %descriptor.name,
                        field = %field.name,
                        key = %key,
                        "Missing property for component field."
                    ),
                }
            }
        }

        trace!(name = %descriptor.name, "Constructed component.");
        Ok(instance)
    }

    fn inject_dependencies(
        &self,
        state: &mut BuildState,
        descriptor: &TypeDescriptor,
        metadata: &ComponentMetadata,
        instance: &ComponentInstanceAnyPtr,
        path: &InjectionPath,
    ) -> Result<(), ComponentInstanceProviderError> {
        for field in &metadata.fields {
            let inject = match &field.injector {
                FieldInjector::Dependency { inject, .. } => inject,
                FieldInjector::Property { .. } => continue,
            };

            let type_name = self.registry.resolve_alias(&field.type_name);
            if !self.registry.contains(type_name) {
                trace!(field = %field.name, type_name, "Skipping unmanaged field.");
                continue;
            }

            let child = path.child(&field.name);
            let edge = (descriptor.name.clone(), field.name.clone());
            if state.cyclic_edges.contains(&edge) {
                trace!(path = %child, "Skipping cyclic dependency.");
                continue;
            }

            if state.in_progress.iter().any(|name| name == type_name) {
                let error = ComponentInstanceProviderError::DependencyCycle {
                    path: child.to_string(),
                };
                error!(%error, "Leaving cyclic dependency unset.");
                state.cyclic_edges.insert(edge);
                continue;
            }

            let cached = state
                .conversion_cache
                .get(child.suffix())
                .filter(|cached| cached.type_name == type_name)
                .map(|cached| cached.instance.clone());

            let value = match cached {
                Some(value) => {
                    trace!(path = %child, "Reusing converted instance.");
                    Some(value)
                }
                None => self.resolve(state, type_name, child),
            };

            // unresolved dependencies keep the previous value
            if value.is_some() {
                inject(&**instance, value)
                    .map_err(|error| field_injection_error(descriptor, field, error))?;
            }
        }

        Ok(())
    }

    fn resolve_deferred(&self, path: &InjectionPath) -> Result<(), ComponentInstanceProviderError> {
        let unresolved = |reason: String| ComponentInstanceProviderError::UnresolvedPath {
            path: path.to_string(),
            reason,
        };

        let mut type_name = path.root_name();
        let mut instance = self
            .store
            .get(type_name)
            .ok_or_else(|| unresolved(format!("no singleton registered for {type_name}")))?;

        let segments = path.segments().collect_vec();
        let (terminal, intermediate) = segments
            .split_last()
            .ok_or_else(|| unresolved("path has no fields".to_string()))?;

        for segment in intermediate {
            let field = self.dependency_field(type_name, segment).map_err(&unresolved)?;
            if let FieldInjector::Dependency { current, .. } = &field.injector {
                instance = current(&*instance)
                    .map_err(|error| unresolved(error.to_string()))?
                    .ok_or_else(|| unresolved(format!("field {segment} of {type_name} is not injected")))?;
            }

            type_name = self.registry.resolve_alias(&field.type_name);
        }

        let field = self.dependency_field(type_name, terminal).map_err(&unresolved)?;
        let interface = self.registry.resolve_alias(&field.type_name);
        let value = self
            .interface_instance(interface)
            .ok_or_else(|| unresolved(format!("no instance registered for {interface}")))?;

        if let FieldInjector::Dependency { inject, .. } = &field.injector {
            let descriptor = self
                .registry
                .get(type_name)
                .ok_or_else(|| unresolved(format!("unknown type {type_name}")))?;
            inject(&*instance, Some(value))
                .map_err(|error| field_injection_error(descriptor, field, error))?;
        }

        Ok(())
    }

    fn dependency_field(&self, type_name: &str, field: &str) -> Result<&'a FieldDescriptor, String> {
        self.registry
            .get(type_name)
            .and_then(TypeDescriptor::component)
            .ok_or_else(|| format!("{type_name} is not a registered component"))?
            .field(field)
            .filter(|field| field.is_dependency())
            .ok_or_else(|| format!("{type_name} has no dependency field {field}"))
    }

    // the store only knows interfaces of services and controllers, so look for any finalized
    // implementation as well
    fn interface_instance(&self, interface: &str) -> Option<ComponentInstanceAnyPtr> {
        self.store.get(interface).or_else(|| {
            self.registry.iter().find_map(|descriptor| {
                let upcast = descriptor
                    .component()?
                    .interfaces
                    .iter()
                    .find(|candidate| candidate.name == interface)?
                    .upcast;
                upcast(self.store.get(&descriptor.name)?)
            })
        })
    }
}

fn field_injection_error(
    descriptor: &TypeDescriptor,
    field: &FieldDescriptor,
    source: FieldAccessError,
) -> ComponentInstanceProviderError {
    ComponentInstanceProviderError::FieldInjection {
        component: descriptor.name.clone(),
        field: field.name.clone(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use crate::builder::{InjectionPath, InstanceGraphBuilder};
    use crate::component::{
        ComponentMetadata, FieldAccessError, FieldDescriptor, FieldInjector, InterfaceDescriptor,
        Stereotype, TypeDescriptor, TypeKind,
    };
    use crate::component_registry::MetadataRegistry;
    use crate::error::{ComponentInstanceProviderError, ErrorPtr};
    use crate::instance::{
        from_interface_view, interface_view, Autowired, ComponentInstanceAnyPtr,
        ComponentInstancePtr, Injectable, Value, ValueError,
    };
    use crate::resource::Properties;
    use crate::store::SingletonStore;
    use std::any::Any;
    use std::error::Error;
    use std::fmt::{Display, Formatter};

    trait Storage: Send + Sync {
        fn id(&self) -> u8;
    }

    impl Injectable for dyn Storage + Send + Sync {
        fn canonical_name() -> &'static str {
            "tests::Storage"
        }

        fn from_instance(instance: ComponentInstanceAnyPtr) -> Option<ComponentInstancePtr<Self>> {
            from_interface_view(instance)
        }
    }

    macro_rules! injectable {
        ($ty:ident) => {
            impl Injectable for $ty {
                fn canonical_name() -> &'static str {
                    concat!("tests::", stringify!($ty))
                }

                fn from_instance(
                    instance: ComponentInstanceAnyPtr,
                ) -> Option<ComponentInstancePtr<Self>> {
                    instance.downcast().ok()
                }
            }
        };
    }

    #[derive(Default)]
    struct Repo;

    #[derive(Default)]
    struct MemoryStorage;

    impl Storage for MemoryStorage {
        fn id(&self) -> u8 {
            7
        }
    }

    #[derive(Default)]
    struct Service {
        repo: Autowired<Repo>,
        storage: Autowired<dyn Storage + Send + Sync>,
        name: Value<String>,
    }

    #[derive(Default)]
    struct Controller {
        service: Autowired<Service>,
    }

    #[derive(Default)]
    struct Left {
        right: Autowired<Right>,
    }

    #[derive(Default)]
    struct Right {
        left: Autowired<Left>,
    }

    #[derive(Default)]
    struct Pool {
        size: Value<u16>,
    }

    injectable!(Repo);
    injectable!(Pool);
    injectable!(MemoryStorage);
    injectable!(Service);
    injectable!(Controller);
    injectable!(Left);
    injectable!(Right);

    #[derive(Debug)]
    struct TestError;

    impl Display for TestError {
        fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
            write!(f, "test error")
        }
    }

    impl std::error::Error for TestError {}

    fn construct<T: Default + Send + Sync + 'static>() -> Result<ComponentInstanceAnyPtr, ErrorPtr> {
        Ok(ComponentInstancePtr::new(T::default()) as ComponentInstanceAnyPtr)
    }

    fn failing_constructor() -> Result<ComponentInstanceAnyPtr, ErrorPtr> {
        Err(ComponentInstancePtr::new(TestError) as ErrorPtr)
    }

    fn target<T: 'static>(target: &dyn Any) -> Result<&T, FieldAccessError> {
        target
            .downcast_ref::<T>()
            .ok_or(FieldAccessError::IncompatibleTarget)
    }

    fn component(
        name: &str,
        stereotype: Stereotype,
        fields: Vec<FieldDescriptor>,
        constructor: Option<fn() -> Result<ComponentInstanceAnyPtr, ErrorPtr>>,
    ) -> TypeDescriptor {
        TypeDescriptor {
            name: name.to_string(),
            alias: None,
            kind: TypeKind::Component(ComponentMetadata {
                stereotype,
                interfaces: vec![],
                fields,
                constructor,
            }),
        }
    }

    fn dependency(name: &str, type_name: &str, injector: FieldInjector) -> FieldDescriptor {
        FieldDescriptor {
            name: name.to_string(),
            type_name: type_name.to_string(),
            injector,
        }
    }

    fn repo() -> TypeDescriptor {
        component("tests::Repo", Stereotype::Repository, vec![], Some(construct::<Repo>))
    }

    fn memory_storage(stereotype: Stereotype) -> TypeDescriptor {
        let mut descriptor = component(
            "tests::MemoryStorage",
            stereotype,
            vec![],
            Some(construct::<MemoryStorage>),
        );
        if let TypeKind::Component(metadata) = &mut descriptor.kind {
            metadata.interfaces.push(InterfaceDescriptor {
                name: "tests::Storage".to_string(),
                upcast: |instance| {
                    instance
                        .downcast::<MemoryStorage>()
                        .ok()
                        .map(|instance| interface_view(instance as ComponentInstancePtr<dyn Storage + Send + Sync>))
                },
            });
        }

        descriptor
    }

    fn service(constructor: Option<fn() -> Result<ComponentInstanceAnyPtr, ErrorPtr>>) -> TypeDescriptor {
        component(
            "tests::Service",
            Stereotype::Service,
            vec![
                dependency(
                    "repo",
                    "tests::Repo",
                    FieldInjector::Dependency {
                        inject: |instance, value| Ok(target::<Service>(instance)?.repo.inject(value)?),
                        current: |instance| Ok(target::<Service>(instance)?.repo.instance()),
                    },
                ),
                dependency(
                    "storage",
                    "tests::Storage",
                    FieldInjector::Dependency {
                        inject: |instance, value| Ok(target::<Service>(instance)?.storage.inject(value)?),
                        current: |instance| Ok(target::<Service>(instance)?.storage.instance()),
                    },
                ),
                dependency(
                    "name",
                    "String",
                    FieldInjector::Property {
                        key: "service.name".to_string(),
                        assign: |instance, raw| {
                            target::<Service>(instance)?
                                .name
                                .assign(raw)
                                .map_err(FieldAccessError::InvalidProperty)
                        },
                    },
                ),
            ],
            constructor,
        )
    }

    fn controller() -> TypeDescriptor {
        component(
            "tests::Controller",
            Stereotype::Controller,
            vec![dependency(
                "service",
                "tests::Service",
                FieldInjector::Dependency {
                    inject: |instance, value| Ok(target::<Controller>(instance)?.service.inject(value)?),
                    current: |instance| Ok(target::<Controller>(instance)?.service.instance()),
                },
            )],
            Some(construct::<Controller>),
        )
    }

    fn storage_interface() -> TypeDescriptor {
        TypeDescriptor {
            name: "tests::Storage".to_string(),
            alias: None,
            kind: TypeKind::Interface,
        }
    }

    fn registry(descriptors: Vec<TypeDescriptor>) -> MetadataRegistry {
        let mut registry = MetadataRegistry::default();
        for descriptor in descriptors {
            registry.register(descriptor).unwrap();
        }

        registry
    }

    fn typed<T: Injectable>(store: &SingletonStore, name: &str) -> ComponentInstancePtr<T> {
        T::from_instance(store.get(name).unwrap()).unwrap()
    }

    #[test]
    fn should_build_injection_paths() {
        let path = InjectionPath::root("app::Controller")
            .child("service")
            .child("repo");

        assert_eq!(path.as_str(), "app::Controller$service$repo");
        assert_eq!(path.root_name(), "app::Controller");
        assert_eq!(path.suffix(), "$service$repo");
        assert_eq!(path.segments().collect::<Vec<_>>(), vec!["service", "repo"]);
        assert!(!path.is_root());

        let root = InjectionPath::root("app::Controller");
        assert!(root.is_root());
        assert_eq!(root.suffix(), "");
        assert_eq!(root.segments().count(), 0);
    }

    #[test]
    fn should_wire_scenario_graph() {
        let registry = registry(vec![
            controller(),
            service(Some(construct::<Service>)),
            repo(),
        ]);
        let store = SingletonStore::default();
        let properties: Properties = [("service.name", "users")].into_iter().collect();

        let builder = InstanceGraphBuilder::new(&registry, &store, &properties);
        builder.build();

        let controller = typed::<Controller>(&store, "tests::Controller");
        let service = controller.service.get().unwrap();
        assert!(ComponentInstancePtr::ptr_eq(
            &service,
            &typed::<Service>(&store, "tests::Service")
        ));
        assert!(ComponentInstancePtr::ptr_eq(
            &service.repo.get().unwrap(),
            &typed::<Repo>(&store, "tests::Repo")
        ));
        assert_eq!(service.name.get().map(String::as_str), Some("users"));
    }

    #[test]
    fn should_resolve_deferred_interface() {
        let registry = registry(vec![
            controller(),
            service(Some(construct::<Service>)),
            repo(),
            storage_interface(),
            memory_storage(Stereotype::Component),
        ]);
        let store = SingletonStore::default();
        let properties = Properties::default();

        let builder = InstanceGraphBuilder::new(&registry, &store, &properties);
        builder.build();

        assert_eq!(
            builder
                .deferred_paths()
                .iter()
                .map(InjectionPath::as_str)
                .collect::<Vec<_>>(),
            vec!["tests::Controller$service$storage", "tests::Service$storage"]
        );
        assert!(typed::<Service>(&store, "tests::Service")
            .storage
            .get()
            .is_none());

        assert_eq!(builder.sweep(), 2);

        let storage = typed::<Service>(&store, "tests::Service")
            .storage
            .get()
            .unwrap();
        assert_eq!(storage.id(), 7);
        assert_eq!(
            ComponentInstancePtr::as_ptr(&storage) as *const (),
            ComponentInstancePtr::as_ptr(&typed::<MemoryStorage>(&store, "tests::MemoryStorage"))
                as *const ()
        );
        assert!(builder.deferred_paths().is_empty());
    }

    #[test]
    fn should_register_service_under_first_interface() {
        let registry = registry(vec![storage_interface(), memory_storage(Stereotype::Service)]);
        let store = SingletonStore::default();
        let properties = Properties::default();

        InstanceGraphBuilder::new(&registry, &store, &properties).build();

        let storage =
            <dyn Storage + Send + Sync as Injectable>::from_instance(store.get("tests::Storage").unwrap())
                .unwrap();
        assert_eq!(storage.id(), 7);
    }

    #[test]
    fn should_not_register_component_under_interface() {
        let registry = registry(vec![storage_interface(), memory_storage(Stereotype::Component)]);
        let store = SingletonStore::default();
        let properties = Properties::default();

        InstanceGraphBuilder::new(&registry, &store, &properties).build();

        assert!(store.contains("tests::MemoryStorage"));
        assert!(!store.contains("tests::Storage"));
    }

    #[test]
    fn should_leave_fields_of_failed_dependency_unset() {
        let registry = registry(vec![controller(), service(Some(failing_constructor)), repo()]);
        let store = SingletonStore::default();
        let properties = Properties::default();

        InstanceGraphBuilder::new(&registry, &store, &properties).build();

        assert!(typed::<Controller>(&store, "tests::Controller")
            .service
            .get()
            .is_none());
        assert!(!store.contains("tests::Service"));
        assert!(store.contains("tests::Repo"));
    }

    #[test]
    fn should_fail_without_constructor() {
        let registry = registry(vec![controller(), service(None), repo()]);
        let store = SingletonStore::default();
        let properties = Properties::default();

        let builder = InstanceGraphBuilder::new(&registry, &store, &properties);
        builder.build();

        assert!(builder.resolve_root("tests::Service").is_none());
        assert!(store.contains("tests::Controller"));
    }

    #[test]
    fn should_leave_missing_property_unset() {
        let registry = registry(vec![service(Some(construct::<Service>)), repo()]);
        let store = SingletonStore::default();
        let properties = Properties::default();

        InstanceGraphBuilder::new(&registry, &store, &properties).build();

        assert!(typed::<Service>(&store, "tests::Service").name.get().is_none());
    }

    #[test]
    fn should_fail_component_with_unparseable_property() {
        let registry = registry(vec![component(
            "tests::Pool",
            Stereotype::Component,
            vec![dependency(
                "size",
                "u16",
                FieldInjector::Property {
                    key: "pool.size".to_string(),
                    assign: |instance, raw| Ok(target::<Pool>(instance)?.size.assign(raw)?),
                },
            )],
            Some(construct::<Pool>),
        )]);
        let store = SingletonStore::default();
        let properties: Properties = [("pool.size", "large")].into_iter().collect();

        let builder = InstanceGraphBuilder::new(&registry, &store, &properties);
        builder.build();

        assert!(!store.contains("tests::Pool"));
        let state = builder.state.lock();
        let error = state.failed.get("tests::Pool").unwrap();
        assert!(matches!(
            error,
            ComponentInstanceProviderError::FieldInjection {
                field,
                source: FieldAccessError::InvalidProperty(ValueError::Unparseable { .. }),
                ..
            } if field == "size"
        ));
        assert!(Error::source(error).is_some());
    }

    #[test]
    fn should_leave_concrete_cycle_unwired() {
        let registry = registry(vec![
            component(
                "tests::Left",
                Stereotype::Component,
                vec![dependency(
                    "right",
                    "tests::Right",
                    FieldInjector::Dependency {
                        inject: |instance, value| Ok(target::<Left>(instance)?.right.inject(value)?),
                        current: |instance| Ok(target::<Left>(instance)?.right.instance()),
                    },
                )],
                Some(construct::<Left>),
            ),
            component(
                "tests::Right",
                Stereotype::Component,
                vec![dependency(
                    "left",
                    "tests::Left",
                    FieldInjector::Dependency {
                        inject: |instance, value| Ok(target::<Right>(instance)?.left.inject(value)?),
                        current: |instance| Ok(target::<Right>(instance)?.left.instance()),
                    },
                )],
                Some(construct::<Right>),
            ),
        ]);
        let store = SingletonStore::default();
        let properties = Properties::default();

        let builder = InstanceGraphBuilder::new(&registry, &store, &properties);
        builder.build();

        let left = typed::<Left>(&store, "tests::Left");
        let right = typed::<Right>(&store, "tests::Right");
        assert!(ComponentInstancePtr::ptr_eq(&left.right.get().unwrap(), &right));
        assert!(right.left.get().is_none());

        // repeated resolution must not close the rejected edge
        builder.resolve_root("tests::Right");
        builder.resolve_root("tests::Left");
        assert!(right.left.get().is_none());

        let weak = ComponentInstancePtr::downgrade(&left);
        drop(left);
        drop(right);
        drop(builder);
        drop(store);
        assert!(weak.upgrade().is_none());
    }

    #[test]
    fn should_skip_unregistered_field_types() {
        let registry = registry(vec![controller()]);
        let store = SingletonStore::default();
        let properties = Properties::default();

        InstanceGraphBuilder::new(&registry, &store, &properties).build();

        assert!(typed::<Controller>(&store, "tests::Controller")
            .service
            .get()
            .is_none());
    }

    #[test]
    fn should_report_unresolvable_deferred_path() {
        let registry = registry(vec![
            service(Some(construct::<Service>)),
            repo(),
            storage_interface(),
        ]);
        let store = SingletonStore::default();
        let properties = Properties::default();

        let builder = InstanceGraphBuilder::new(&registry, &store, &properties);
        builder.build();

        assert_eq!(builder.sweep(), 0);
    }
}
