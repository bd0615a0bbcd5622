//! JSON request execution with bounded retry.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use super::error::FetchError;
use super::transport::{ApiRequest, ApiResponse, Transport};
use crate::config::settings::ApiConfig;

/// Backoff schedule for transport failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Re-issues allowed after the first attempt
    pub max_retries: u32,
    /// Delay before the first retry
    pub initial_delay: Duration,
    /// Factor applied to the delay after each retry
    pub multiplier: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(1000),
            multiplier: 2,
        }
    }
}

impl RetryPolicy {
    pub fn from_config(config: &ApiConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            initial_delay: Duration::from_millis(config.retry_initial_delay_ms),
            multiplier: config.retry_backoff_multiplier,
        }
    }

    /// Delay before retry number `retry` (0-based): 1s, 2s, 4s, ... by default.
    pub fn delay_for(&self, retry: u32) -> Duration {
        self.initial_delay
            .saturating_mul(self.multiplier.saturating_pow(retry))
    }
}

/// Issues API requests through a `Transport`, retrying transport failures.
///
/// Only failures that happen before a status is received are retried. Any
/// HTTP status outside 2xx is reported at once. A retry sends the identical
/// request again, so callers must only allow retries for idempotent calls.
#[derive(Clone)]
pub struct ResilientFetcher {
    transport: Arc<dyn Transport>,
    policy: RetryPolicy,
}

impl ResilientFetcher {
    pub fn new(transport: Arc<dyn Transport>, policy: RetryPolicy) -> Self {
        Self { transport, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Send with the policy's retry bound.
    pub async fn request(&self, request: &ApiRequest) -> Result<Value, FetchError> {
        self.request_with_retries(request, self.policy.max_retries)
            .await
    }

    pub async fn request_with_retries(
        &self,
        request: &ApiRequest,
        max_retries: u32,
    ) -> Result<Value, FetchError> {
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;
            tracing::debug!(
                method = %request.method,
                path = %request.route(),
                attempt,
                "Sending API request"
            );

            let err = match self.transport.send(request).await {
                Ok(response) => return decode(response),
                Err(err) => err,
            };

            if !err.is_transient() {
                tracing::error!(path = %request.route(), error = %err, "API request could not be built");
                return Err(FetchError::InvalidRequest {
                    message: err.to_string(),
                });
            }

            if attempt > max_retries {
                tracing::error!(
                    method = %request.method,
                    path = %request.route(),
                    attempts = attempt,
                    error = %err,
                    "API request failed, retries exhausted"
                );
                return Err(FetchError::Network {
                    message: err.to_string(),
                    attempts: attempt,
                });
            }

            let delay = self.policy.delay_for(attempt - 1);
            tracing::warn!(
                method = %request.method,
                path = %request.route(),
                attempt,
                delay_ms = delay.as_millis() as u64,
                error = %err,
                "API request failed, retrying"
            );
            tokio::time::sleep(delay).await;
        }
    }
}

fn decode(response: ApiResponse) -> Result<Value, FetchError> {
    if !response.is_success() {
        return Err(FetchError::Http {
            status: response.status,
            message: error_message(&response),
        });
    }

    if response.body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }

    serde_json::from_slice(&response.body).map_err(|e| FetchError::Decode {
        message: e.to_string(),
    })
}

/// Best-effort message for a failed response.
fn error_message(response: &ApiResponse) -> String {
    if let Ok(body) = serde_json::from_slice::<Value>(&response.body) {
        for field in ["error", "message", "detail"] {
            if let Some(message) = body.get(field).and_then(Value::as_str) {
                return message.to_string();
            }
        }
    }

    let text = String::from_utf8_lossy(&response.body);
    let text = text.trim();
    if !text.is_empty() {
        return text.chars().take(200).collect();
    }

    reqwest::StatusCode::from_u16(response.status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("request failed")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::mock::MockTransport;
    use serde_json::json;

    fn fetcher(mock: &Arc<MockTransport>) -> ResilientFetcher {
        ResilientFetcher::new(mock.clone(), RetryPolicy::default())
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_transport_failures_with_doubling_delay() {
        let mock = Arc::new(MockTransport::new());
        mock.push_connect_error()
            .push_connect_error()
            .push_json(200, json!({"ok": true}));

        let value = fetcher(&mock)
            .request(&ApiRequest::get("/api/jobs"))
            .await
            .unwrap();

        assert_eq!(value, json!({"ok": true}));
        assert_eq!(mock.call_count(), 3);

        let times = mock.call_times();
        assert_eq!(times[1] - times[0], Duration::from_millis(1000));
        assert_eq!(times[2] - times[1], Duration::from_millis(2000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_reissue_identical_request() {
        let mock = Arc::new(MockTransport::new());
        mock.push_connect_error().push_json(201, json!({"id": "a1"}));

        let request = ApiRequest::post("/api/jobs/7/apply", json!({"user_id": "u1"}));
        fetcher(&mock).request(&request).await.unwrap();

        let sent = mock.requests();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0], request);
        assert_eq!(sent[1], request);
    }

    #[tokio::test(start_paused = true)]
    async fn test_http_error_is_not_retried() {
        let mock = Arc::new(MockTransport::new());
        mock.always(Ok(ApiResponse::json(500, &json!({"error": "boom"}))));

        let err = fetcher(&mock)
            .request(&ApiRequest::get("/api/jobs"))
            .await
            .unwrap_err();

        assert_eq!(mock.call_count(), 1);
        assert_eq!(
            err,
            FetchError::Http {
                status: 500,
                message: "boom".into()
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_retries_report_network_error() {
        let mock = Arc::new(MockTransport::unreachable());
        let start = tokio::time::Instant::now();

        let err = fetcher(&mock)
            .request(&ApiRequest::get("/api/health"))
            .await
            .unwrap_err();

        assert_eq!(mock.call_count(), 4);
        assert!(matches!(err, FetchError::Network { attempts: 4, .. }));
        // 1s + 2s + 4s of backoff
        assert_eq!(start.elapsed(), Duration::from_secs(7));
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_retries_means_single_attempt() {
        let mock = Arc::new(MockTransport::unreachable());
        let err = fetcher(&mock)
            .request_with_retries(&ApiRequest::get("/api/health"), 0)
            .await
            .unwrap_err();
        assert_eq!(mock.call_count(), 1);
        assert!(matches!(err, FetchError::Network { attempts: 1, .. }));
    }

    #[tokio::test]
    async fn test_build_error_is_not_retried() {
        let mock = Arc::new(MockTransport::new());
        mock.always(Err(crate::external::TransportError::new(
            crate::external::TransportErrorKind::Build,
            "bad url",
        )));
        let err = fetcher(&mock)
            .request(&ApiRequest::get("::"))
            .await
            .unwrap_err();
        assert_eq!(mock.call_count(), 1);
        assert!(matches!(err, FetchError::InvalidRequest { .. }));
    }

    #[tokio::test]
    async fn test_non_json_success_body_is_decode_error() {
        let mock = Arc::new(MockTransport::new());
        mock.push(Ok(ApiResponse::new(200, "<html>")));
        let err = fetcher(&mock)
            .request(&ApiRequest::get("/api/jobs"))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Decode { .. }));
    }

    #[tokio::test]
    async fn test_empty_success_body_is_null() {
        let mock = Arc::new(MockTransport::new());
        mock.push(Ok(ApiResponse::new(204, "")));
        let value = fetcher(&mock)
            .request(&ApiRequest::delete("/api/jobs/1"))
            .await
            .unwrap();
        assert_eq!(value, Value::Null);
    }

    #[test]
    fn test_error_message_falls_back_to_reason_phrase() {
        assert_eq!(error_message(&ApiResponse::new(404, "")), "Not Found");
        assert_eq!(
            error_message(&ApiResponse::new(502, "upstream gone")),
            "upstream gone"
        );
        assert_eq!(
            error_message(&ApiResponse::json(422, &json!({"detail": "bad input"}))),
            "bad input"
        );
    }

    #[test]
    fn test_delay_schedule() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(0), Duration::from_secs(1));
        assert_eq!(policy.delay_for(1), Duration::from_secs(2));
        assert_eq!(policy.delay_for(2), Duration::from_secs(4));
    }
}
