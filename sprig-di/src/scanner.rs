//! Discovery of candidate types. Components, injectable traits and mappers submit their
//! descriptors at link time, which is why the default [InventoryTypeScanner] only needs to filter
//! the submitted descriptors by their module path.

use crate::component::TypeDescriptor;
use crate::component_registry::internal::TypeRegisterer;
use itertools::Itertools;
#[cfg(test)]
use mockall::automock;
use tracing::trace;

/// Module path of this crate - its own types are never scanned.
pub const FRAMEWORK_PACKAGE: &str = "sprig_di";

/// Module path filter of a scan.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ComponentScan {
    /// Scan root. An empty root accepts all module paths.
    pub package: String,

    /// Additional module path prefixes to accept. An empty prefix accepts all module paths.
    pub include: Vec<String>,

    /// Module path prefixes to reject, even if accepted by the root or the include list. An empty
    /// prefix rejects all module paths.
    pub exclude: Vec<String>,
}

impl ComponentScan {
    pub fn new(package: &str) -> Self {
        Self {
            package: package.to_string(),
            ..Default::default()
        }
    }

    /// Checks if a canonical name lies within the scan.
    pub fn accepts(&self, name: &str) -> bool {
        let included = has_prefix(name, &self.package)
            || self.include.iter().any(|prefix| has_prefix(name, prefix));

        included
            && !has_prefix(name, FRAMEWORK_PACKAGE)
            && !self.exclude.iter().any(|prefix| has_prefix(name, prefix))
    }
}

// an empty prefix is the root of every path
fn has_prefix(name: &str, prefix: &str) -> bool {
    let prefix = prefix.trim_end_matches("::");
    if prefix.is_empty() {
        return true;
    }

    match name.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with("::"),
        None => false,
    }
}

/// Produces descriptors of candidate types within a scan.
#[cfg_attr(test, automock)]
pub trait TypeScanner {
    fn scan(&self, scan: &ComponentScan) -> Vec<TypeDescriptor>;
}

/// Scanner of descriptors submitted at link time by the derive macros.
#[derive(Clone, Copy, Debug, Default)]
pub struct InventoryTypeScanner;

impl TypeScanner for InventoryTypeScanner {
    fn scan(&self, scan: &ComponentScan) -> Vec<TypeDescriptor> {
        inventory::iter::<TypeRegisterer>
            .into_iter()
            .map(|registerer| (registerer.register)())
            .filter(|descriptor| {
                let accepted = scan.accepts(&descriptor.name);
                trace!(name = %descriptor.name, accepted, "Scanned type.");
                accepted
            })
            .collect_vec()
    }
}
