use thiserror::Error;

use crate::cache::CacheError;
use crate::external::FetchError;
use crate::store::StoreError;

/// Crate-wide error type returned by the job client.
///
/// Validation failures are raised before any I/O. Remote failures keep the
/// classification made by the fetcher so callers can tell a transport outage
/// from an HTTP status.
#[derive(Error, Debug)]
pub enum AppError {
    /// Missing or malformed caller input
    #[error("Validation failed for {field}: {reason}")]
    Validation { field: String, reason: String },

    /// Resource not found error with entity, field, and value information
    #[error("Resource not found: {entity} with {field}={value}")]
    NotFound {
        entity: String,
        field: String,
        value: String,
    },

    /// Remote request failure (network, HTTP status or undecodable body)
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Operation has no meaningful answer in the current mode
    #[error("Unavailable: {message}")]
    Unavailable { message: String },

    /// Fallback store failure with operation context
    #[error("Fallback store operation failed: {operation}")]
    Store {
        operation: String,
        #[source]
        source: StoreError,
    },

    /// Cache backend failure
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// Configuration error with key information
    #[error("Configuration error: {key}")]
    Configuration {
        key: String,
        #[source]
        source: anyhow::Error,
    },

    /// Internal error for unexpected failures
    #[error("Internal error")]
    Internal {
        #[source]
        source: anyhow::Error,
    },
}

impl AppError {
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        AppError::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn not_found(
        entity: impl Into<String>,
        field: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        AppError::NotFound {
            entity: entity.into(),
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn store(operation: impl Into<String>, source: StoreError) -> Self {
        AppError::Store {
            operation: operation.into(),
            source,
        }
    }

    /// True when the remote API could not be reached at all.
    pub fn is_network(&self) -> bool {
        matches!(self, AppError::Fetch(FetchError::Network { .. }))
    }

    /// HTTP status attached to the failure, if any.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            AppError::Fetch(FetchError::Http { status, .. }) => Some(*status),
            _ => None,
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        AppError::Internal { source: error }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
        fields.sort_by(|a, b| a.0.cmp(&b.0));

        match fields.first() {
            Some((field, errs)) => {
                let reason = errs
                    .first()
                    .and_then(|e| e.message.as_ref())
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "invalid value".to_string());
                AppError::validation(field.to_string(), reason)
            }
            None => AppError::validation("request", "invalid request"),
        }
    }
}

/// Type alias for Result with AppError to simplify function signatures
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Applicant {
        #[validate(length(min = 1, message = "user_id is required"))]
        user_id: String,
    }

    #[test]
    fn test_validation_errors_convert_to_field_error() {
        let applicant = Applicant {
            user_id: String::new(),
        };
        let err: AppError = applicant.validate().unwrap_err().into();
        match err {
            AppError::Validation { field, reason } => {
                assert_eq!(field, "user_id");
                assert_eq!(reason, "user_id is required");
            }
            other => panic!("Expected Validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_http_status_only_for_http_failures() {
        let http = AppError::Fetch(FetchError::Http {
            status: 503,
            message: "down".into(),
        });
        assert_eq!(http.http_status(), Some(503));
        assert!(!http.is_network());

        let net = AppError::Fetch(FetchError::Network {
            message: "refused".into(),
            attempts: 4,
        });
        assert_eq!(net.http_status(), None);
        assert!(net.is_network());
    }

    #[test]
    fn test_display_messages() {
        let err = AppError::not_found("job", "id", "42");
        assert_eq!(err.to_string(), "Resource not found: job with id=42");

        let err = AppError::validation("job_id", "must not be empty");
        assert_eq!(err.to_string(), "Validation failed for job_id: must not be empty");
    }
}
