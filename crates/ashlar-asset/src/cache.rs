//! Cache providers for asset content

use ashlar_core::{CacheKey, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Minimal capability a cache provider must offer.
///
/// Providers are shared behind `Arc`, so all operations take `&self`;
/// implementations are responsible for their own write coordination.
pub trait Cache: Send + Sync {
    /// Fetch the cached value for a key, if present and readable
    fn get(&self, key: &str) -> Option<Vec<u8>>;

    /// Store a value under a key
    fn set(&self, key: &str, value: &[u8]) -> Result<()>;

    /// Check whether a key has a cached value
    fn has(&self, key: &str) -> bool;

    /// Remove a cached value; returns whether an entry existed
    fn remove(&self, key: &str) -> Result<bool>;
}

/// Filesystem cache that stores one file per key.
///
/// File names are the SHA-256 hex of the key, so arbitrary key strings
/// (paths, query-suffixed names) never escape the cache directory.
pub struct FilesystemCache {
    dir: PathBuf,
}

impl FilesystemCache {
    /// Create a cache rooted at the given directory
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// The cache directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for_key(&self, key: &str) -> PathBuf {
        self.dir.join(CacheKey::from_path(key).to_hex())
    }
}

impl Cache for FilesystemCache {
    fn get(&self, key: &str) -> Option<Vec<u8>> {
        fs::read(self.path_for_key(key)).ok()
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.path_for_key(key), value)?;
        Ok(())
    }

    fn has(&self, key: &str) -> bool {
        self.path_for_key(key).exists()
    }

    fn remove(&self, key: &str) -> Result<bool> {
        let path = self.path_for_key(key);
        if path.exists() {
            fs::remove_file(path)?;
            Ok(true)
        } else {
            Ok(false)
        }
    }
}

/// Cache that mirrors the asset path verbatim under its directory.
///
/// A key `assets/site.css` is cached at `<dir>/assets/site.css`, which
/// keeps the cache browsable and lets a web server serve it directly.
pub struct FilePathCache {
    dir: PathBuf,
}

impl FilePathCache {
    /// Create a cache rooted at the given directory
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// The cache directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for_key(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }
}

impl Cache for FilePathCache {
    fn get(&self, key: &str) -> Option<Vec<u8>> {
        fs::read(self.path_for_key(key)).ok()
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        let path = self.path_for_key(key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, value)?;
        Ok(())
    }

    fn has(&self, key: &str) -> bool {
        self.path_for_key(key).exists()
    }

    fn remove(&self, key: &str) -> Result<bool> {
        let path = self.path_for_key(key);
        if path.exists() {
            fs::remove_file(path)?;
            Ok(true)
        } else {
            Ok(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("ashlar_test_{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_filesystem_set_and_get() {
        let dir = temp_dir();
        let cache = FilesystemCache::new(&dir);

        cache.set("assets/site.css", b"body{}").unwrap();
        assert!(cache.has("assets/site.css"));
        assert_eq!(cache.get("assets/site.css").unwrap(), b"body{}");

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_filesystem_hashes_file_names() {
        let dir = temp_dir();
        let cache = FilesystemCache::new(&dir);

        cache.set("a/b/../c?v=2", b"x").unwrap();

        let expected = dir.join(CacheKey::from_path("a/b/../c?v=2").to_hex());
        assert!(expected.exists());

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_filesystem_get_missing() {
        let dir = temp_dir();
        let cache = FilesystemCache::new(&dir);

        assert!(cache.get("never/set").is_none());
        assert!(!cache.has("never/set"));

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_filesystem_remove() {
        let dir = temp_dir();
        let cache = FilesystemCache::new(&dir);

        cache.set("assets/app.js", b"x=1").unwrap();
        assert!(cache.remove("assets/app.js").unwrap());
        assert!(!cache.has("assets/app.js"));
        assert!(!cache.remove("assets/app.js").unwrap());

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_filepath_mirrors_key_path() {
        let dir = temp_dir();
        let cache = FilePathCache::new(&dir);

        cache.set("assets/site.css", b"body{}").unwrap();

        assert!(dir.join("assets").join("site.css").exists());
        assert_eq!(cache.get("assets/site.css").unwrap(), b"body{}");

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_filepath_remove_missing() {
        let dir = temp_dir();
        let cache = FilePathCache::new(&dir);

        assert!(!cache.remove("assets/site.css").unwrap());

        fs::remove_dir_all(&dir).ok();
    }
}
