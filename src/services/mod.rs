//! Client operations built on the cache, fetcher and fallback store.
//!
//! [`JobClient`] is the single entry point callers use. It is constructed
//! explicitly from [`Settings`](crate::config::settings::Settings) and passed
//! around by clone.

mod job_client;

pub use job_client::{ClientMode, JobClient};
