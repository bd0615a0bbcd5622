use async_trait::async_trait;

use crate::store::StoreError;

/// Key-value backend holding one serialized document per collection.
#[async_trait]
pub trait CollectionStore: Send + Sync {
    /// Raw document stored under `name`, if any.
    async fn read_raw(&self, name: &str) -> Result<Option<String>, StoreError>;

    /// Replace the document stored under `name`.
    async fn write_raw(&self, name: &str, document: String) -> Result<(), StoreError>;

    async fn remove(&self, name: &str) -> Result<(), StoreError>;
}
