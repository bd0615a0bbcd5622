//! NoOp cache implementation.
//!
//! Used when caching is disabled. Every read misses.

use std::time::Duration;

use async_trait::async_trait;

use crate::cache::{AppCache, CacheError};

/// A cache that stores nothing.
///
/// Used when `cache.enabled = false` in configuration.
#[derive(Default)]
pub struct NoOpCache;

impl NoOpCache {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AppCache for NoOpCache {
    async fn get(&self, _key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        Ok(None)
    }

    async fn set(
        &self,
        _key: &str,
        _value: Vec<u8>,
        _ttl: Option<Duration>,
    ) -> Result<(), CacheError> {
        Ok(())
    }

    async fn remove(&self, _key: &str) -> Result<(), CacheError> {
        Ok(())
    }

    async fn clear(&self, _matching: Option<&str>) -> Result<usize, CacheError> {
        Ok(0)
    }

    async fn len(&self) -> Result<usize, CacheError> {
        Ok(0)
    }
}
