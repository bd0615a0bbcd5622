//! Process-local store. Contents are lost when the client is dropped.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::store::{CollectionStore, StoreError};

#[derive(Default)]
pub struct MemoryStore {
    documents: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CollectionStore for MemoryStore {
    async fn read_raw(&self, name: &str) -> Result<Option<String>, StoreError> {
        Ok(self.documents.lock().await.get(name).cloned())
    }

    async fn write_raw(&self, name: &str, document: String) -> Result<(), StoreError> {
        self.documents.lock().await.insert(name.to_string(), document);
        Ok(())
    }

    async fn remove(&self, name: &str) -> Result<(), StoreError> {
        self.documents.lock().await.remove(name);
        Ok(())
    }
}
