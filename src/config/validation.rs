//! Configuration validation logic
//!
//! This module provides validation methods for all configuration structures
//! to ensure configuration values are within acceptable ranges and formats.

use crate::config::error::ConfigError;
use crate::config::settings::{
    ApiConfig, CacheConfig, FallbackBackend, FallbackConfig, FileSettings, LoggerSettings,
    Settings,
};

/// Valid log levels
const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Valid log formats
const VALID_LOG_FORMATS: &[&str] = &["full", "compact", "json"];

/// Upper bound on retries; with the default backoff this is already ~17 minutes.
const MAX_RETRIES_LIMIT: u32 = 10;

impl ApiConfig {
    /// Validate API configuration
    ///
    /// # Validation Rules
    /// - A non-empty base URL must use the http or https scheme
    /// - Timeouts must be greater than 0
    /// - Retries are capped at 10 and the backoff multiplier must be at least 1
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.is_configured() {
            let invalid = |reason: String| ConfigError::InvalidBaseUrl {
                url: self.base_url.clone(),
                reason,
            };
            let url = reqwest::Url::parse(self.base_url.trim()).map_err(|e| invalid(e.to_string()))?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err(invalid(format!(
                    "scheme '{}' is not supported, use http or https",
                    url.scheme()
                )));
            }
        }

        if self.request_timeout == 0 {
            return Err(ConfigError::invalid(
                "api",
                "request_timeout",
                "must be greater than 0 seconds",
            ));
        }

        if self.connect_timeout == 0 {
            return Err(ConfigError::invalid(
                "api",
                "connect_timeout",
                "must be greater than 0 seconds",
            ));
        }

        if self.max_retries > MAX_RETRIES_LIMIT {
            return Err(ConfigError::invalid(
                "api",
                "max_retries",
                format!("{} exceeds the limit of {MAX_RETRIES_LIMIT}", self.max_retries),
            ));
        }

        if self.retry_backoff_multiplier == 0 {
            return Err(ConfigError::invalid(
                "api",
                "retry_backoff_multiplier",
                "must be at least 1",
            ));
        }

        if self.user_agent.trim().is_empty() {
            return Err(ConfigError::invalid("api", "user_agent", "cannot be empty"));
        }

        Ok(())
    }
}

impl CacheConfig {
    /// Validate cache configuration
    ///
    /// TTLs are only checked when caching is enabled.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.enabled {
            return Ok(());
        }

        let ttls = [
            ("default_ttl_ms", self.default_ttl_ms),
            ("jobs_ttl_ms", self.jobs_ttl_ms),
            ("job_detail_ttl_ms", self.job_detail_ttl_ms),
            ("applications_ttl_ms", self.applications_ttl_ms),
        ];
        if let Some((key, _)) = ttls.into_iter().find(|(_, ttl)| *ttl == 0) {
            return Err(ConfigError::invalid(
                "cache",
                key,
                "must be greater than 0 ms while the cache is enabled",
            ));
        }

        Ok(())
    }
}

impl FallbackConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.backend == FallbackBackend::Disk && self.directory.trim().is_empty() {
            return Err(ConfigError::MissingFallbackDirectory);
        }
        Ok(())
    }
}

impl FileSettings {
    /// Validate file settings
    fn validate(&self) -> Result<(), ConfigError> {
        if self.enabled && self.path.trim().is_empty() {
            return Err(ConfigError::invalid(
                "logger.file",
                "path",
                "is required when file logging is enabled",
            ));
        }

        if !VALID_LOG_FORMATS.contains(&self.format.to_lowercase().as_str()) {
            return Err(ConfigError::invalid(
                "logger.file",
                "format",
                format!(
                    "'{}' is not one of {}",
                    self.format,
                    VALID_LOG_FORMATS.join(", ")
                ),
            ));
        }

        Ok(())
    }
}

impl LoggerSettings {
    /// Validate logger settings
    ///
    /// # Validation Rules
    /// - Log level must be one of: trace, debug, info, warn, error
    /// - If file logging is enabled, path must not be empty
    /// - Log format must be one of: full, compact, json
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !VALID_LOG_LEVELS.contains(&self.level.to_lowercase().as_str()) {
            return Err(ConfigError::invalid(
                "logger",
                "level",
                format!("'{}' is not one of {}", self.level, VALID_LOG_LEVELS.join(", ")),
            ));
        }

        self.file.validate()?;

        Ok(())
    }
}

impl Settings {
    /// Validate all configuration settings
    ///
    /// Returns the first validation error encountered.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.api.validate()?;
        self.cache.validate()?;
        self.fallback.validate()?;
        self.logger.validate()?;
        Ok(())
    }
}
