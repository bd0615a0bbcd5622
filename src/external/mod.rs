//! Remote API access: HTTP client construction, the transport seam and the
//! retrying fetcher.

mod client;
mod error;
mod fetcher;
#[cfg(test)]
pub(crate) mod mock;
mod transport;

pub use client::build_http_client;
pub use error::{FetchError, TransportError, TransportErrorKind};
pub use fetcher::{ResilientFetcher, RetryPolicy};
pub use transport::{ApiRequest, ApiResponse, HttpMethod, ReqwestTransport, Transport};
