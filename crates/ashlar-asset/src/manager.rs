//! Cache-provider resolution and asset decoration

use crate::cache::{Cache, FilePathCache, FilesystemCache};
use crate::config::{AssetConfig, CacheBinding, CacheFactory, CacheOptions, CacheSource};
use crate::types::{Asset, CachedAsset};
use ashlar_core::{AshlarError, Result};
use log::debug;
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// Fallback key consulted when an asset path has no binding of its own
const DEFAULT_KEY: &str = "default";

/// Lookup capability for externally owned cache services.
///
/// Replaces ambient container access: the manager only ever sees this
/// narrow interface, supplied at construction.
pub trait ServiceRegistry: Send + Sync {
    /// Check whether a service is registered under a name
    fn has(&self, name: &str) -> bool;

    /// Fetch the service registered under a name
    fn get(&self, name: &str) -> Option<Arc<dyn Cache>>;
}

/// Map-backed service registry.
///
/// Holds eager instances and lazy factories; a factory runs at most once
/// and its product is shared by every subsequent `get`.
#[derive(Default)]
pub struct ServiceMap {
    services: HashMap<String, Arc<dyn Cache>>,
    factories: HashMap<String, CacheFactory>,
    resolved: Mutex<HashMap<String, Arc<dyn Cache>>>,
}

impl ServiceMap {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a pre-built service instance
    pub fn register(&mut self, name: impl Into<String>, service: Arc<dyn Cache>) {
        self.services.insert(name.into(), service);
    }

    /// Register a factory; it runs on first `get` and its product is shared
    pub fn register_factory<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn() -> Arc<dyn Cache> + Send + Sync + 'static,
    {
        self.factories.insert(name.into(), Arc::new(factory));
    }
}

impl ServiceRegistry for ServiceMap {
    fn has(&self, name: &str) -> bool {
        self.services.contains_key(name) || self.factories.contains_key(name)
    }

    fn get(&self, name: &str) -> Option<Arc<dyn Cache>> {
        if let Some(service) = self.services.get(name) {
            return Some(service.clone());
        }

        let factory = self.factories.get(name)?;
        // A panicked factory poisons the lock; the map itself is still
        // valid, so recover the guard rather than dropping the service
        let mut resolved = self
            .resolved
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let service = resolved
            .entry(name.to_string())
            .or_insert_with(|| factory());
        Some(service.clone())
    }
}

/// The provider kinds the manager can construct itself
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Filesystem,
    FilePath,
}

impl ProviderKind {
    /// Map a shorthand or canonical provider name to its kind.
    ///
    /// Unrecognized names return None; the caller decides whether that
    /// means a service name or a configuration error.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Filesystem" | "FilesystemCache" => Some(ProviderKind::Filesystem),
            "FilePath" | "FilePathCache" => Some(ProviderKind::FilePath),
            _ => None,
        }
    }

    /// The canonical name for this kind
    pub fn canonical_name(&self) -> &'static str {
        match self {
            ProviderKind::Filesystem => "FilesystemCache",
            ProviderKind::FilePath => "FilePathCache",
        }
    }

    /// Construct a provider of this kind from constructor options.
    ///
    /// Options are consulted by name, never by position. `dir` is the
    /// only option either kind accepts; when absent the provider roots
    /// itself under the system temp directory. Unknown keys are fatal.
    pub fn build(&self, options: &CacheOptions) -> Result<Arc<dyn Cache>> {
        for key in options.keys() {
            if key != "dir" {
                return Err(AshlarError::InvalidCacheOptions {
                    provider: self.canonical_name().to_string(),
                    reason: format!("unknown option `{}`", key),
                });
            }
        }

        let dir = match options.get("dir") {
            Some(value) => {
                let dir = value.as_str().ok_or_else(|| AshlarError::InvalidCacheOptions {
                    provider: self.canonical_name().to_string(),
                    reason: "option `dir` must be a string".to_string(),
                })?;
                PathBuf::from(dir)
            }
            None => std::env::temp_dir().join("ashlar-cache"),
        };

        let provider: Arc<dyn Cache> = match self {
            ProviderKind::Filesystem => Arc::new(FilesystemCache::new(dir)),
            ProviderKind::FilePath => Arc::new(FilePathCache::new(dir)),
        };

        Ok(provider)
    }
}

/// Decides which cache provider backs each asset path and wraps assets
/// in the caching decorator.
pub struct AssetCacheManager {
    registry: Box<dyn ServiceRegistry>,
    caching: BTreeMap<String, CacheBinding>,
}

impl AssetCacheManager {
    /// Create a manager from a service registry and a caching table
    pub fn new(registry: Box<dyn ServiceRegistry>, caching: BTreeMap<String, CacheBinding>) -> Self {
        Self { registry, caching }
    }

    /// Create a manager from parsed configuration
    pub fn from_config(registry: Box<dyn ServiceRegistry>, config: &AssetConfig) -> Self {
        Self::new(registry, config.caching.clone())
    }

    /// The caching table this manager resolves against
    pub fn cache_config(&self) -> &BTreeMap<String, CacheBinding> {
        &self.caching
    }

    /// Look up the binding for an asset path: exact key first, then the
    /// `default` key. Exact string equality only, no prefix matching.
    pub fn cache_config_for(&self, asset_path: &str) -> Option<&CacheBinding> {
        self.caching
            .get(asset_path)
            .or_else(|| self.caching.get(DEFAULT_KEY))
    }

    /// Resolve the cache provider for an asset path.
    ///
    /// Ok(None) means the path is uncached. Resolution failures
    /// (unmappable provider name, bad options) are fatal and propagate.
    pub fn provider_for(&self, asset_path: &str) -> Result<Option<Arc<dyn Cache>>> {
        let Some(binding) = self.cache_config_for(asset_path) else {
            debug!("no cache binding for `{}`", asset_path);
            return Ok(None);
        };

        match &binding.cache {
            CacheSource::Factory(factory) => {
                debug!("cache provider for `{}` from factory", asset_path);
                Ok(Some(factory()))
            }
            CacheSource::Instance(cache) => Ok(Some(cache.clone())),
            CacheSource::Named(name) => {
                if self.registry.has(name) {
                    debug!("cache provider for `{}` from service `{}`", asset_path, name);
                    return Ok(self.registry.get(name));
                }

                let kind = ProviderKind::from_name(name)
                    .ok_or_else(|| AshlarError::UnknownCacheProvider(name.clone()))?;
                debug!(
                    "cache provider for `{}` constructed as {}",
                    asset_path,
                    kind.canonical_name()
                );
                Ok(Some(kind.build(&binding.options)?))
            }
        }
    }

    /// Wrap an asset in a caching decorator if a provider resolves for
    /// its path; otherwise hand the asset back unchanged.
    pub fn set_cache(&self, asset_path: &str, asset: Box<dyn Asset>) -> Result<Box<dyn Asset>> {
        match self.provider_for(asset_path)? {
            Some(provider) => Ok(Box::new(CachedAsset::new(provider, asset_path, asset))),
            None => Ok(asset),
        }
    }
}
