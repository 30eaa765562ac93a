//! Canonical-name resolution for user-assigned aliases.

use fxhash::FxHashMap;
use tracing::{debug, warn};

/// Maps aliases to canonical names. Each canonical name has at most one alias - registering a
/// new one replaces the previous.
#[derive(Clone, Debug, Default)]
pub struct AliasRegistry {
    aliases: FxHashMap<String, String>,
    alias_by_name: FxHashMap<String, String>,
}

impl AliasRegistry {
    pub fn register_alias(&mut self, name: &str, alias: &str) {
        if alias == name {
            if let Some(previous) = self.alias_by_name.remove(name) {
                self.aliases.remove(&previous);
            }

            self.aliases.remove(alias);
            return;
        }

        if let Some(previous) = self.alias_by_name.insert(name.to_string(), alias.to_string()) {
            if previous != alias {
                debug!(name, previous = %previous, alias, "Replacing alias.");
                self.aliases.remove(&previous);
            }
        }

        if let Some(previous_name) = self.aliases.insert(alias.to_string(), name.to_string()) {
            if previous_name != name {
                debug!(alias, previous = %previous_name, name, "Alias moved to another name.");
                self.alias_by_name.remove(&previous_name);
            }
        }
    }

    /// Returns the canonical name, following alias chains. Unknown names are returned unchanged.
    pub fn canonical_name<'a>(&'a self, name: &'a str) -> &'a str {
        let mut current = name;
        for _ in 0..=self.aliases.len() {
            match self.aliases.get(current) {
                Some(target) => current = target.as_str(),
                None => return current,
            }
        }

        warn!(name, "Circular alias chain detected.");
        current
    }

    #[inline]
    pub fn alias_of(&self, name: &str) -> Option<&str> {
        self.alias_by_name.get(name).map(String::as_str)
    }

    #[inline]
    pub fn is_alias(&self, name: &str) -> bool {
        self.aliases.contains_key(name)
    }
}
