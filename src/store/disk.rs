//! Persistent store on top of the `cached` disk store.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use cached::IOCached;
use cached::stores::DiskCache;
use tokio::sync::Mutex;

use crate::store::{CollectionStore, StoreError};

/// Collections never expire; the underlying store requires a lifespan so it
/// gets a very long one.
const RETENTION: Duration = Duration::from_secs(86400 * 365 * 10);

/// On-disk collection store.
///
/// Only one `DiskStore` may have a given directory open at a time.
pub struct DiskStore {
    store: Mutex<DiskCache<String, String>>,
}

impl DiskStore {
    pub fn open(directory: impl AsRef<Path>, name: &str) -> Result<Self, StoreError> {
        let store = DiskCache::new(name)
            .set_disk_directory(directory)
            .set_lifespan(RETENTION)
            .build()
            .map_err(StoreError::backend)?;
        Ok(Self {
            store: Mutex::new(store),
        })
    }
}

#[async_trait]
impl CollectionStore for DiskStore {
    async fn read_raw(&self, name: &str) -> Result<Option<String>, StoreError> {
        let store = self.store.lock().await;
        store
            .cache_get(&name.to_string())
            .map_err(StoreError::backend)
    }

    async fn write_raw(&self, name: &str, document: String) -> Result<(), StoreError> {
        let store = self.store.lock().await;
        store
            .cache_set(name.to_string(), document)
            .map_err(StoreError::backend)?;
        store.connection().flush().map_err(StoreError::backend)?;
        Ok(())
    }

    async fn remove(&self, name: &str) -> Result<(), StoreError> {
        let store = self.store.lock().await;
        store
            .cache_remove(&name.to_string())
            .map_err(StoreError::backend)?;
        Ok(())
    }
}
