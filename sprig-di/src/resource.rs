//! Application resources - externally configured properties assigned to `#[value("key")]` fields.
//!
//! The default [ConfigResourceLoader] reads an optional resource file (`application.json`,
//! `application.toml`, `application.yaml`, etc.) and overlays it with environment variables
//! prefixed with `SPRIG_PROPERTY_`, using `__` as the nesting separator, e.g.
//! `SPRIG_PROPERTY_DB__URL` sets `db.url`. Nested tables are flattened into dotted keys.

use config::{Config, Environment, File, Source, Value, ValueKind};
use fxhash::FxHashMap;
#[cfg(test)]
use mockall::automock;
use thiserror::Error;
use tracing::{debug, warn};

const RESOURCE_ENV_PREFIX: &str = "SPRIG_PROPERTY";
const RESOURCE_ENV_SEPARATOR: &str = "__";

/// Name of the default resource file, without extension.
pub const DEFAULT_RESOURCE: &str = "application";

#[derive(Error, Clone, Debug, Eq, PartialEq)]
pub enum ResourceError {
    #[error("Malformed resource {path}: {reason}")]
    Malformed { path: String, reason: String },
}

/// Flat `key -> value` properties.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Properties {
    values: FxHashMap<String, String>,
}

impl Properties {
    #[inline]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    #[inline]
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Properties {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}

/// Loads properties for a given resource path.
#[cfg_attr(test, automock)]
pub trait ResourceLoader {
    /// Loads properties. A missing resource is not an error, while a malformed one is.
    fn load(&self, path: &str) -> Result<Properties, ResourceError>;
}

/// Resource loader based on the `config` crate.
#[derive(Clone, Copy, Debug, Default)]
pub struct ConfigResourceLoader;

impl ResourceLoader for ConfigResourceLoader {
    fn load(&self, path: &str) -> Result<Properties, ResourceError> {
        let malformed = |error: config::ConfigError| ResourceError::Malformed {
            path: path.to_string(),
            reason: error.to_string(),
        };

        let values = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(
                Environment::with_prefix(RESOURCE_ENV_PREFIX)
                    .prefix_separator("_")
                    .separator(RESOURCE_ENV_SEPARATOR),
            )
            .build()
            .and_then(|config| config.collect())
            .map_err(malformed)?;

        let mut properties = Properties::default();
        for (key, value) in values {
            flatten(&key, value, &mut properties);
        }

        debug!(path, count = properties.len(), "Loaded resource properties.");
        Ok(properties)
    }
}

fn flatten(key: &str, value: Value, properties: &mut Properties) {
    match value.kind {
        ValueKind::Table(table) => {
            for (nested_key, nested_value) in table {
                flatten(&format!("{key}.{nested_key}"), nested_value, properties);
            }
        }
        ValueKind::Array(_) | ValueKind::Nil => {
            warn!(key, "Ignoring property which is not a scalar value.");
        }
        _ => match value.into_string() {
            Ok(string) => properties.insert(key, string),
            Err(error) => warn!(key, %error, "Ignoring unreadable property."),
        },
    }
}
