//! The [SingletonStore] holds finished singletons for the lifetime of the container. Reads are
//! lock-free and safe for any number of concurrent callers; writes happen only during bootstrap.

use crate::instance::ComponentInstanceAnyPtr;
use dashmap::DashMap;
use itertools::Itertools;
use tracing::trace;

#[derive(Debug, Default)]
pub struct SingletonStore {
    instances: DashMap<String, ComponentInstanceAnyPtr>,
}

impl SingletonStore {
    #[inline]
    pub fn get(&self, name: &str) -> Option<ComponentInstanceAnyPtr> {
        self.instances.get(name).map(|instance| instance.value().clone())
    }

    /// Installs an instance, unless one is already present for the given name. Returns the
    /// instance which ends up in the store.
    pub fn insert_if_absent(
        &self,
        name: &str,
        instance: ComponentInstanceAnyPtr,
    ) -> ComponentInstanceAnyPtr {
        self.get_or_insert_with(name, || instance)
    }

    /// Returns the instance stored for the given name or atomically installs one created by
    /// `factory`. The factory is not called if an instance is present.
    pub fn get_or_insert_with<F>(&self, name: &str, factory: F) -> ComponentInstanceAnyPtr
    where
        F: FnOnce() -> ComponentInstanceAnyPtr,
    {
        if let Some(instance) = self.get(name) {
            return instance;
        }

        self.instances
            .entry(name.to_string())
            .or_insert_with(|| {
                trace!(name, "Installing singleton.");
                factory()
            })
            .value()
            .clone()
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.instances.contains_key(name)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Names of all stored singletons, sorted.
    pub fn names(&self) -> Vec<String> {
        self.instances
            .iter()
            .map(|entry| entry.key().clone())
            .sorted()
            .collect_vec()
    }
}
