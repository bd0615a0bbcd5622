use std::time::Duration;

use crate::config::settings::ApiConfig;

/// Build the shared HTTP client for the JobStir API.
///
/// One client is created per `JobClient` and reused for every request, so
/// connections and DNS lookups are pooled.
///
/// # Features
/// - **Timeouts**: request and connect timeouts from `[api]` configuration
/// - **Compression**: gzip, deflate, brotli and zstd responses
/// - **HTTP/2**: adaptive window sizing and keep-alive
/// - **User-Agent**: `api.user_agent`
pub fn build_http_client(config: &ApiConfig) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        // Timeouts
        .timeout(Duration::from_secs(config.request_timeout))
        .connect_timeout(Duration::from_secs(config.connect_timeout))
        // Connection pooling
        .pool_max_idle_per_host(10)
        .pool_idle_timeout(Duration::from_secs(90))
        // HTTP/2 settings
        .http2_adaptive_window(true)
        .http2_keep_alive_interval(Duration::from_secs(10))
        .http2_keep_alive_timeout(Duration::from_secs(20))
        // Enable compression (gzip, deflate, brotli, zstd)
        .gzip(true)
        .deflate(true)
        .brotli(true)
        .zstd(true)
        .user_agent(config.user_agent.as_str())
        .build()
}
