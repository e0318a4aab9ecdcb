//! Ashlar Asset - Cache management for static assets
//!
//! This crate decides which cache provider backs a given asset path,
//! wraps assets in a read-through caching decorator, and resolves
//! aliased asset names to filesystem paths.

mod alias;
mod cache;
mod config;
mod manager;
mod types;

pub use alias::AliasPathStack;
pub use cache::{Cache, FilePathCache, FilesystemCache};
pub use config::{AssetConfig, CacheBinding, CacheFactory, CacheOptions, CacheSource, ResolverConfigs};
pub use manager::{AssetCacheManager, ProviderKind, ServiceMap, ServiceRegistry};
pub use types::{Asset, CachedAsset, FileAsset, StringAsset};
