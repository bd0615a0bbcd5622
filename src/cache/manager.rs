//! Cache manager that dispatches to the configured backend.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::cache::memory::MemoryCache;
use crate::cache::noop::NoOpCache;
use crate::cache::{AppCache, CacheError};
use crate::config::settings::CacheConfig;

/// Hit/miss counters for a cache manager.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

#[derive(Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
}

/// Cache manager that provides typed access to the configured cache backend.
///
/// Cloning is cheap; clones share the same backend and counters.
#[derive(Clone)]
pub struct CacheManager {
    backend: Arc<dyn AppCache>,
    config: CacheConfig,
    counters: Arc<Counters>,
}

impl CacheManager {
    /// Create a new cache manager with the given configuration.
    ///
    /// If caching is disabled, a NoOpCache is used.
    pub fn new(config: CacheConfig) -> Self {
        let backend: Arc<dyn AppCache> = if config.enabled {
            Arc::new(MemoryCache::new(config.default_ttl()))
        } else {
            Arc::new(NoOpCache::new())
        };

        Self::with_backend(backend, config)
    }

    /// Create a manager over an explicit backend.
    pub fn with_backend(backend: Arc<dyn AppCache>, config: CacheConfig) -> Self {
        Self {
            backend,
            config,
            counters: Arc::new(Counters::default()),
        }
    }

    /// Get a reference to the cache backend.
    pub fn backend(&self) -> &Arc<dyn AppCache> {
        &self.backend
    }

    /// Get the cache configuration.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Check if caching is enabled.
    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.counters.hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
        }
    }

    // ========================================================================
    // Typed access
    // ========================================================================

    /// Read and decode a cached value.
    ///
    /// An entry that no longer decodes as `T` is dropped and reported as a miss.
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, CacheError> {
        let Some(bytes) = self.backend.get(key).await? else {
            self.counters.misses.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(key, "Cache miss");
            return Ok(None);
        };

        match serde_json::from_slice(&bytes) {
            Ok(value) => {
                self.counters.hits.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(key, "Cache hit");
                Ok(Some(value))
            }
            Err(e) => {
                tracing::warn!(key, error = %e, "Dropping undecodable cache entry");
                self.backend.remove(key).await?;
                self.counters.misses.fetch_add(1, Ordering::Relaxed);
                Ok(None)
            }
        }
    }

    /// Encode and store a value.
    pub async fn set_json<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        ttl: Option<Duration>,
    ) -> Result<(), CacheError> {
        let bytes =
            serde_json::to_vec(value).map_err(|e| CacheError::Serialization(e.to_string()))?;
        self.backend.set(key, bytes, ttl).await
    }

    // ========================================================================
    // AppCache proxy methods
    // ========================================================================

    /// Get a value from the cache.
    pub async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        self.backend.get(key).await
    }

    /// Set a value in the cache.
    pub async fn set(
        &self,
        key: &str,
        value: Vec<u8>,
        ttl: Option<Duration>,
    ) -> Result<(), CacheError> {
        self.backend.set(key, value, ttl).await
    }

    /// Remove a value from the cache.
    pub async fn remove(&self, key: &str) -> Result<(), CacheError> {
        self.backend.remove(key).await
    }

    /// Clear entries whose key contains `matching`, or everything.
    pub async fn clear(&self, matching: Option<&str>) -> Result<usize, CacheError> {
        let removed = self.backend.clear(matching).await?;
        tracing::debug!(matching, removed, "Cache cleared");
        Ok(removed)
    }

    pub async fn len(&self) -> Result<usize, CacheError> {
        self.backend.len().await
    }
}
