//! Response cache with per-entry TTL and request coalescing.
//!
//! The cache is an explicitly constructed component: the job client owns a
//! `CacheManager` and tears it down on shutdown. Backends:
//! - Memory cache (default)
//! - NoOp cache (when `cache.enabled = false`)
//!
//! # Configuration
//!
//! ```toml
//! [cache]
//! enabled = true
//! default_ttl_ms = 300000
//! jobs_ttl_ms = 300000
//! job_detail_ttl_ms = 600000
//! applications_ttl_ms = 60000
//! ```
//!
//! Expiry is lazy: an entry is checked, and purged if stale, only when its key
//! is read.

mod error;
mod flight;
mod manager;
mod memory;
mod noop;
mod traits;

pub use error::CacheError;
pub use flight::{Flight, SingleFlight};
pub use manager::{CacheManager, CacheStats};
pub use memory::MemoryCache;
pub use noop::NoOpCache;
pub use traits::AppCache;

pub use crate::config::settings::CacheConfig;
