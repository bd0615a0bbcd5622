//! Typed access to named, ordered collections.

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::config::settings::{FallbackBackend, FallbackConfig};
use crate::store::{CollectionStore, DiskStore, MemoryStore, StoreError};

/// Prefix applied to every collection name.
pub const COLLECTION_PREFIX: &str = "jobstir_";

pub const JOBS_COLLECTION: &str = "jobs";
pub const APPLICATIONS_COLLECTION: &str = "applications";

/// Collection store used when the API is not available.
///
/// A collection is a JSON array written and read as a whole, so element order
/// survives a round trip. Cloning shares the backend.
#[derive(Clone)]
pub struct FallbackStore {
    backend: Arc<dyn CollectionStore>,
}

impl FallbackStore {
    pub fn new(backend: Arc<dyn CollectionStore>) -> Self {
        Self { backend }
    }

    /// In-memory store.
    pub fn memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    pub fn from_config(config: &FallbackConfig) -> Result<Self, StoreError> {
        let backend: Arc<dyn CollectionStore> = match config.backend {
            FallbackBackend::Memory => Arc::new(MemoryStore::new()),
            FallbackBackend::Disk => {
                std::fs::create_dir_all(&config.directory).map_err(StoreError::backend)?;
                Arc::new(DiskStore::open(&config.directory, "jobstir")?)
            }
        };
        tracing::debug!(backend = ?config.backend, "Fallback store ready");
        Ok(Self::new(backend))
    }

    fn key(name: &str) -> String {
        format!("{COLLECTION_PREFIX}{name}")
    }

    /// Every record in `name`, in stored order. A missing collection is empty.
    pub async fn read_collection<T: DeserializeOwned>(
        &self,
        name: &str,
    ) -> Result<Vec<T>, StoreError> {
        let key = Self::key(name);
        match self.backend.read_raw(&key).await? {
            Some(document) => {
                serde_json::from_str(&document).map_err(|source| StoreError::Serialization {
                    collection: key,
                    source,
                })
            }
            None => Ok(Vec::new()),
        }
    }

    /// Replace `name` with `records`.
    pub async fn write_collection<T: Serialize>(
        &self,
        name: &str,
        records: &[T],
    ) -> Result<(), StoreError> {
        let key = Self::key(name);
        let document =
            serde_json::to_string(records).map_err(|source| StoreError::Serialization {
                collection: key.clone(),
                source,
            })?;
        tracing::debug!(collection = %key, count = records.len(), "Writing collection");
        self.backend.write_raw(&key, document).await
    }

    pub async fn clear_collection(&self, name: &str) -> Result<(), StoreError> {
        self.backend.remove(&Self::key(name)).await
    }
}
