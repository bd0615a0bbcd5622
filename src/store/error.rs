use thiserror::Error;

/// Fallback store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Backend failed to open, read or write
    #[error("Store backend error: {0}")]
    Backend(String),

    /// A collection could not be encoded or decoded
    #[error("Collection '{collection}' is not valid JSON: {source}")]
    Serialization {
        collection: String,
        #[source]
        source: serde_json::Error,
    },
}

impl StoreError {
    pub fn backend(error: impl std::fmt::Display) -> Self {
        StoreError::Backend(error.to_string())
    }
}
