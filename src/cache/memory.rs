//! In-memory cache with per-entry TTL and lazy expiry.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use crate::cache::{AppCache, CacheError};

struct CacheEntry {
    value: Vec<u8>,
    stored_at: Instant,
    ttl: Duration,
}

impl CacheEntry {
    fn is_fresh(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.stored_at) < self.ttl
    }
}

/// In-memory key/value cache.
///
/// Expiry is checked when a key is read; nothing sweeps in the background, so
/// an expired entry keeps its memory until its key is read again or cleared.
pub struct MemoryCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    default_ttl: Duration,
}

impl MemoryCache {
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            default_ttl,
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, CacheEntry>>, CacheError> {
        self.entries
            .lock()
            .map_err(|e| CacheError::Operation(e.to_string()))
    }
}

#[async_trait]
impl AppCache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let mut entries = self.lock()?;
        let now = Instant::now();

        match entries.get(key) {
            Some(entry) if entry.is_fresh(now) => Ok(Some(entry.value.clone())),
            Some(_) => {
                entries.remove(key);
                tracing::trace!(key, "Evicted expired cache entry");
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set(
        &self,
        key: &str,
        value: Vec<u8>,
        ttl: Option<Duration>,
    ) -> Result<(), CacheError> {
        let entry = CacheEntry {
            value,
            stored_at: Instant::now(),
            ttl: ttl.unwrap_or(self.default_ttl),
        };
        self.lock()?.insert(key.to_string(), entry);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), CacheError> {
        self.lock()?.remove(key);
        Ok(())
    }

    async fn clear(&self, matching: Option<&str>) -> Result<usize, CacheError> {
        let mut entries = self.lock()?;
        let before = entries.len();
        match matching {
            Some(pattern) => entries.retain(|key, _| !key.contains(pattern)),
            None => entries.clear(),
        }
        Ok(before - entries.len())
    }

    async fn len(&self) -> Result<usize, CacheError> {
        Ok(self.lock()?.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache() -> MemoryCache {
        MemoryCache::new(Duration::from_secs(300))
    }

    #[tokio::test(start_paused = true)]
    async fn test_get_set() {
        let cache = cache();
        cache
            .set("key", b"value".to_vec(), Some(Duration::from_millis(1)))
            .await
            .unwrap();
        assert_eq!(cache.get("key").await.unwrap(), Some(b"value".to_vec()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_overwrites_existing_entry() {
        let cache = cache();
        cache.set("key", b"old".to_vec(), None).await.unwrap();
        cache.set("key", b"new".to_vec(), None).await.unwrap();
        assert_eq!(cache.get("key").await.unwrap(), Some(b"new".to_vec()));
        assert_eq!(cache.len().await.unwrap(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_entry_is_purged_on_read() {
        let cache = cache();
        cache
            .set("a", b"1".to_vec(), Some(Duration::from_millis(500)))
            .await
            .unwrap();
        cache
            .set("b", b"2".to_vec(), Some(Duration::from_secs(10)))
            .await
            .unwrap();

        tokio::time::advance(Duration::from_millis(500)).await;

        // Expired but unread: still occupies the map
        assert_eq!(cache.len().await.unwrap(), 2);
        assert_eq!(cache.get("a").await.unwrap(), None);
        assert_eq!(cache.len().await.unwrap(), 1);
        assert_eq!(cache.get("b").await.unwrap(), Some(b"2".to_vec()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_default_ttl_applies() {
        let cache = MemoryCache::new(Duration::from_secs(1));
        cache.set("key", b"value".to_vec(), None).await.unwrap();
        tokio::time::advance(Duration::from_millis(999)).await;
        assert!(cache.get("key").await.unwrap().is_some());
        tokio::time::advance(Duration::from_millis(1)).await;
        assert!(cache.get("key").await.unwrap().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_ttl_is_never_readable() {
        let cache = cache();
        cache
            .set("key", b"value".to_vec(), Some(Duration::ZERO))
            .await
            .unwrap();
        assert_eq!(cache.get("key").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_clear_matching_substring() {
        let cache = cache();
        cache
            .set("/api/applications?user_id=1", b"a".to_vec(), None)
            .await
            .unwrap();
        cache
            .set("/api/applications?user_id=2", b"b".to_vec(), None)
            .await
            .unwrap();
        cache.set("/api/jobs{}", b"c".to_vec(), None).await.unwrap();

        let removed = cache.clear(Some("/api/applications")).await.unwrap();
        assert_eq!(removed, 2);
        assert_eq!(cache.len().await.unwrap(), 1);
        assert!(cache.get("/api/jobs{}").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_clear_all() {
        let cache = cache();
        cache.set("k1", b"v1".to_vec(), None).await.unwrap();
        cache.set("k2", b"v2".to_vec(), None).await.unwrap();
        assert_eq!(cache.clear(None).await.unwrap(), 2);
        assert_eq!(cache.get("k1").await.unwrap(), None);
        assert_eq!(cache.get("k2").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_remove() {
        let cache = cache();
        cache.set("key", b"value".to_vec(), None).await.unwrap();
        cache.remove("key").await.unwrap();
        assert_eq!(cache.get("key").await.unwrap(), None);
    }
}
