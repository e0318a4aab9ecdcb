//! Error types for Ashlar

use thiserror::Error;

/// The main error type for Ashlar operations
#[derive(Debug, Error)]
pub enum AshlarError {
    #[error("Config parse error: {0}")]
    ConfigParseError(String),

    #[error("Unknown cache provider: {0}")]
    UnknownCacheProvider(String),

    #[error("Invalid cache options for {provider}: {reason}")]
    InvalidCacheOptions { provider: String, reason: String },

    #[error("Cache error: {0}")]
    CacheError(String),

    #[error("Asset error: {0}")]
    AssetError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type alias for Ashlar operations
pub type Result<T> = std::result::Result<T, AshlarError>;

impl From<toml::de::Error> for AshlarError {
    fn from(err: toml::de::Error) -> Self {
        AshlarError::ConfigParseError(err.to_string())
    }
}
