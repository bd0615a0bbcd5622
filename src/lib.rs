//! JobStir client data layer
//!
//! Cached, coalesced and retrying access to the JobStir job board API, with a
//! local fallback store that keeps listings available when the API is not.

use shadow_rs::shadow;
shadow!(build);

pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod external;
pub mod logger;
pub mod models;
pub mod sanitize;
pub mod services;
pub mod store;

pub use services::JobClient;

pub fn pkg_version() -> &'static str {
    build::PKG_VERSION
}

pub fn clap_long_version() -> &'static str {
    build::CLAP_LONG_VERSION
}
