//! Remote request error types.

use thiserror::Error;

/// Failure of a single remote request, after any retries.
///
/// Cloneable so a result shared between coalesced callers can be handed to
/// each of them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Transport-level failure; retried before being reported
    #[error("Network error after {attempts} attempt(s): {message}")]
    Network { message: String, attempts: u32 },

    /// Non-2xx response; never retried
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// 2xx response whose body is not JSON
    #[error("Invalid response body: {message}")]
    Decode { message: String },

    /// Request could not be built (bad URL, bad header)
    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },
}

/// Transport failure classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    Connect,
    Timeout,
    Send,
    Build,
}

impl std::fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TransportErrorKind::Connect => "connect",
            TransportErrorKind::Timeout => "timeout",
            TransportErrorKind::Send => "send",
            TransportErrorKind::Build => "build",
        };
        f.write_str(name)
    }
}

/// Error raised by a `Transport` before any HTTP status was received.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind} error: {message}")]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub message: String,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Whether re-issuing the same request could succeed.
    pub fn is_transient(&self) -> bool {
        self.kind != TransportErrorKind::Build
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(error: reqwest::Error) -> Self {
        let kind = if error.is_builder() {
            TransportErrorKind::Build
        } else if error.is_timeout() {
            TransportErrorKind::Timeout
        } else if error.is_connect() {
            TransportErrorKind::Connect
        } else {
            TransportErrorKind::Send
        };
        Self::new(kind, error.to_string())
    }
}
