//! AppCache trait definition.

use std::time::Duration;

use async_trait::async_trait;

use crate::cache::CacheError;

/// Trait for cache operations.
///
/// Backends store opaque bytes; typed access lives in `CacheManager`.
#[async_trait]
pub trait AppCache: Send + Sync {
    /// Get a fresh value from the cache. Expired entries are dropped here.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError>;

    /// Set a value with an optional TTL override, replacing any previous entry.
    async fn set(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>)
    -> Result<(), CacheError>;

    /// Remove a value from the cache.
    async fn remove(&self, key: &str) -> Result<(), CacheError>;

    /// Remove every entry whose key contains `matching`, or all entries when `None`.
    ///
    /// Returns the number of entries removed.
    async fn clear(&self, matching: Option<&str>) -> Result<usize, CacheError>;

    /// Number of entries currently held, expired-but-unread ones included.
    async fn len(&self) -> Result<usize, CacheError>;
}
