//! Configuration model for the asset cache

use crate::cache::Cache;
use ashlar_core::Result;
use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// Zero-argument factory producing a cache provider
pub type CacheFactory = Arc<dyn Fn() -> Arc<dyn Cache> + Send + Sync>;

/// Options passed to a provider constructor, keyed by parameter name
pub type CacheOptions = BTreeMap<String, toml::Value>;

/// Where a cache provider comes from.
///
/// Configuration files can only express `Named`; factories and pre-built
/// instances are registered through the API. A `Named` value is
/// disambiguated at resolution time: registered service first, then
/// shorthand provider name.
#[derive(Clone)]
pub enum CacheSource {
    /// Shorthand provider name or registered service name
    Named(String),
    /// Invoked per resolution; options are ignored
    Factory(CacheFactory),
    /// Returned as-is; options are ignored
    Instance(Arc<dyn Cache>),
}

impl fmt::Debug for CacheSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheSource::Named(name) => f.debug_tuple("Named").field(name).finish(),
            CacheSource::Factory(_) => f.write_str("Factory(..)"),
            CacheSource::Instance(_) => f.write_str("Instance(..)"),
        }
    }
}

impl PartialEq for CacheSource {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (CacheSource::Named(a), CacheSource::Named(b)) => a == b,
            (CacheSource::Factory(a), CacheSource::Factory(b)) => Arc::ptr_eq(a, b),
            (CacheSource::Instance(a), CacheSource::Instance(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl<'de> Deserialize<'de> for CacheSource {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(CacheSource::Named(String::deserialize(deserializer)?))
    }
}

/// Per-asset-path cache configuration: the provider source plus any
/// constructor options
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CacheBinding {
    pub cache: CacheSource,
    #[serde(default)]
    pub options: CacheOptions,
}

impl CacheBinding {
    /// Bind to a shorthand provider name or registered service name
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            cache: CacheSource::Named(name.into()),
            options: CacheOptions::new(),
        }
    }

    /// Bind to a factory closure
    pub fn factory<F>(factory: F) -> Self
    where
        F: Fn() -> Arc<dyn Cache> + Send + Sync + 'static,
    {
        Self {
            cache: CacheSource::Factory(Arc::new(factory)),
            options: CacheOptions::new(),
        }
    }

    /// Bind to a pre-built provider instance
    pub fn instance(cache: Arc<dyn Cache>) -> Self {
        Self {
            cache: CacheSource::Instance(cache),
            options: CacheOptions::new(),
        }
    }

    /// Add a constructor option
    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<toml::Value>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }
}

/// Alias configuration section
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ResolverConfigs {
    #[serde(default)]
    pub aliases: BTreeMap<String, String>,
}

/// Top-level asset cache configuration.
///
/// Both sections default to empty: a missing section is not an error,
/// it just means nothing is aliased or cached.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AssetConfig {
    #[serde(default)]
    pub resolver_configs: ResolverConfigs,
    #[serde(default)]
    pub caching: BTreeMap<String, CacheBinding>,
}

impl AssetConfig {
    /// Parse configuration from a TOML string
    pub fn from_toml_str(input: &str) -> Result<Self> {
        Ok(toml::from_str(input)?)
    }

    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }
}
