//! Ashlar Core - Foundational types for the Ashlar asset cache
//!
//! This crate provides the types the other Ashlar crates depend on:
//! - `CacheKey` - SHA-256 based cache-key hashing
//! - Error types and Result alias

mod error;
mod key;

pub use error::{AshlarError, Result};
pub use key::CacheKey;
