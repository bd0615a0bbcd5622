//! Fallback collection store.
//!
//! Backends:
//! - Memory store (default)
//! - Disk store (`fallback.backend = "disk"`), persisted across runs
//!
//! # Configuration
//!
//! ```toml
//! [fallback]
//! backend = "disk"
//! directory = "./data/fallback"
//! seed_placeholders = true
//! ```

mod disk;
mod error;
mod fallback;
mod memory;
mod placeholder;
mod traits;

pub use disk::DiskStore;
pub use error::StoreError;
pub use fallback::{APPLICATIONS_COLLECTION, COLLECTION_PREFIX, FallbackStore, JOBS_COLLECTION};
pub use memory::MemoryStore;
pub use placeholder::placeholder_jobs;
pub use traits::CollectionStore;
