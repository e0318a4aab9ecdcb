//! Asset types and the caching decorator

use crate::cache::Cache;
use ashlar_core::Result;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

/// The read contract every asset exposes
pub trait Asset: Send + Sync {
    /// The asset's content bytes
    fn content(&self) -> Result<Vec<u8>>;

    /// The asset's mimetype, if known
    fn mimetype(&self) -> Option<&str>;

    /// When the asset was last modified, if known
    fn last_modified(&self) -> Option<SystemTime>;
}

fn mimetype_for_extension(ext: &str) -> Option<&'static str> {
    let mime = match ext {
        "css" => "text/css",
        "js" => "application/javascript",
        "json" => "application/json",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "html" | "htm" => "text/html",
        "txt" => "text/plain",
        _ => return None,
    };
    Some(mime)
}

/// An asset backed by a file on disk
pub struct FileAsset {
    path: PathBuf,
    mimetype: Option<String>,
}

impl FileAsset {
    /// Create a file asset, guessing the mimetype from the extension
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let mimetype = path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(mimetype_for_extension)
            .map(String::from);

        Self { path, mimetype }
    }

    /// Override the guessed mimetype
    pub fn with_mimetype(mut self, mimetype: impl Into<String>) -> Self {
        self.mimetype = Some(mimetype.into());
        self
    }

    /// The backing file path
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Asset for FileAsset {
    fn content(&self) -> Result<Vec<u8>> {
        Ok(fs::read(&self.path)?)
    }

    fn mimetype(&self) -> Option<&str> {
        self.mimetype.as_deref()
    }

    fn last_modified(&self) -> Option<SystemTime> {
        fs::metadata(&self.path).ok()?.modified().ok()
    }
}

/// An asset held entirely in memory
pub struct StringAsset {
    content: Vec<u8>,
    mimetype: Option<String>,
    last_modified: Option<SystemTime>,
}

impl StringAsset {
    /// Create an in-memory asset with no mimetype
    pub fn new(content: impl Into<Vec<u8>>) -> Self {
        Self {
            content: content.into(),
            mimetype: None,
            last_modified: None,
        }
    }

    /// Set the mimetype
    pub fn with_mimetype(mut self, mimetype: impl Into<String>) -> Self {
        self.mimetype = Some(mimetype.into());
        self
    }

    /// Set the last-modified timestamp
    pub fn with_last_modified(mut self, when: SystemTime) -> Self {
        self.last_modified = Some(when);
        self
    }
}

impl Asset for StringAsset {
    fn content(&self) -> Result<Vec<u8>> {
        Ok(self.content.clone())
    }

    fn mimetype(&self) -> Option<&str> {
        self.mimetype.as_deref()
    }

    fn last_modified(&self) -> Option<SystemTime> {
        self.last_modified
    }
}

/// Read-through caching decorator over an asset.
///
/// Content is served from the provider when cached, and the provider is
/// populated on a miss. Metadata delegates to the wrapped asset, so the
/// decorator is indistinguishable from the original for everything but
/// where the bytes come from. A faulty cache never makes the asset
/// unservable: read faults fall through to the asset, write faults are
/// logged and dropped.
pub struct CachedAsset {
    inner: Box<dyn Asset>,
    provider: Arc<dyn Cache>,
    key: String,
}

impl CachedAsset {
    /// Wrap an asset with a cache provider, keyed by the asset path
    pub fn new(provider: Arc<dyn Cache>, key: impl Into<String>, inner: Box<dyn Asset>) -> Self {
        Self {
            inner,
            provider,
            key: key.into(),
        }
    }

    /// The cache key this decorator reads and writes
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl Asset for CachedAsset {
    fn content(&self) -> Result<Vec<u8>> {
        if let Some(cached) = self.provider.get(&self.key) {
            return Ok(cached);
        }

        let content = self.inner.content()?;
        if let Err(err) = self.provider.set(&self.key, &content) {
            log::warn!("failed to cache asset `{}`: {}", self.key, err);
        }

        Ok(content)
    }

    fn mimetype(&self) -> Option<&str> {
        self.inner.mimetype()
    }

    fn last_modified(&self) -> Option<SystemTime> {
        self.inner.last_modified()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::FilesystemCache;
    use ashlar_core::AshlarError;

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("ashlar_test_{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    /// Asset that fails every read; used to prove cache hits skip the inner asset
    struct FailingAsset;

    impl Asset for FailingAsset {
        fn content(&self) -> Result<Vec<u8>> {
            Err(AshlarError::AssetError("unreadable".to_string()))
        }

        fn mimetype(&self) -> Option<&str> {
            None
        }

        fn last_modified(&self) -> Option<SystemTime> {
            None
        }
    }

    #[test]
    fn test_file_asset_guesses_mimetype() {
        assert_eq!(FileAsset::new("site.css").mimetype(), Some("text/css"));
        assert_eq!(FileAsset::new("logo.png").mimetype(), Some("image/png"));
        assert_eq!(FileAsset::new("README.weird").mimetype(), None);
    }

    #[test]
    fn test_file_asset_mimetype_override() {
        let asset = FileAsset::new("data.bin").with_mimetype("application/octet-stream");
        assert_eq!(asset.mimetype(), Some("application/octet-stream"));
    }

    #[test]
    fn test_file_asset_content() {
        let dir = temp_dir();
        let file = dir.join("site.css");
        fs::write(&file, b"body{}").unwrap();

        let asset = FileAsset::new(&file);
        assert_eq!(asset.content().unwrap(), b"body{}");
        assert!(asset.last_modified().is_some());

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_cached_asset_preserves_metadata() {
        let dir = temp_dir();
        let provider: Arc<dyn Cache> = Arc::new(FilesystemCache::new(&dir));

        let asset = StringAsset::new("body{}").with_mimetype("text/css");
        let cached = CachedAsset::new(provider, "assets/site.css", Box::new(asset));

        assert_eq!(cached.mimetype(), Some("text/css"));

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_cached_asset_populates_cache_on_miss() {
        let dir = temp_dir();
        let provider: Arc<dyn Cache> = Arc::new(FilesystemCache::new(&dir));

        let asset = StringAsset::new("body{}");
        let cached = CachedAsset::new(provider.clone(), "assets/site.css", Box::new(asset));

        assert_eq!(cached.content().unwrap(), b"body{}");
        assert!(provider.has("assets/site.css"));

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_cached_asset_serves_hit_without_inner_read() {
        let dir = temp_dir();
        let provider: Arc<dyn Cache> = Arc::new(FilesystemCache::new(&dir));
        provider.set("assets/site.css", b"cached bytes").unwrap();

        let cached = CachedAsset::new(provider, "assets/site.css", Box::new(FailingAsset));
        assert_eq!(cached.content().unwrap(), b"cached bytes");

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_cached_asset_survives_cache_write_failure() {
        let dir = temp_dir();

        // Root the provider at a regular file so every write fails
        let blocker = dir.join("blocker");
        fs::write(&blocker, b"").unwrap();
        let provider: Arc<dyn Cache> = Arc::new(FilesystemCache::new(&blocker));

        let asset = StringAsset::new("body{}");
        let cached = CachedAsset::new(provider.clone(), "assets/site.css", Box::new(asset));

        assert_eq!(cached.content().unwrap(), b"body{}");
        assert!(!provider.has("assets/site.css"));

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_cached_asset_miss_with_failing_inner_propagates() {
        let dir = temp_dir();
        let provider: Arc<dyn Cache> = Arc::new(FilesystemCache::new(&dir));

        let cached = CachedAsset::new(provider, "assets/site.css", Box::new(FailingAsset));
        assert!(cached.content().is_err());

        fs::remove_dir_all(&dir).ok();
    }
}
