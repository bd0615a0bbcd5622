//! Configuration settings structures for jobstir-client
//!
//! This module defines all configuration structures that can be loaded from
//! TOML files and environment variables.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::error::ConfigError;
use crate::logger::{ConsoleConfig, FileConfig, LogFormat, LoggerConfig};

// ============================================================================
// Default value functions
// ============================================================================

fn default_app_name() -> String {
    "jobstir-client".to_string()
}

fn default_app_version() -> String {
    crate::pkg_version().to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_initial_delay_ms() -> u64 {
    1000
}

fn default_retry_backoff_multiplier() -> u32 {
    2
}

fn default_user_agent() -> String {
    format!("jobstir-client/{}", crate::pkg_version())
}

fn default_true() -> bool {
    true
}

fn default_ttl_ms() -> u64 {
    5 * 60 * 1000
}

fn default_job_detail_ttl_ms() -> u64 {
    10 * 60 * 1000
}

fn default_applications_ttl_ms() -> u64 {
    60 * 1000
}

fn default_fallback_directory() -> String {
    "data/fallback".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_path() -> String {
    "logs/jobstir.log".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

// ============================================================================
// Application Configuration
// ============================================================================

/// Application basic information configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Application name
    #[serde(default = "default_app_name")]
    pub name: String,

    /// Application version
    #[serde(default = "default_app_version")]
    pub version: String,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            name: default_app_name(),
            version: default_app_version(),
        }
    }
}

// ============================================================================
// API Configuration
// ============================================================================

/// Remote JobStir API settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL, e.g. `https://api.jobstir.example`. Empty selects fallback mode.
    #[serde(default)]
    pub base_url: String,

    /// Whole-request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,

    /// Connect timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: u64,

    /// Re-issues allowed after a transport failure
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Delay before the first retry in milliseconds
    #[serde(default = "default_retry_initial_delay_ms")]
    pub retry_initial_delay_ms: u64,

    /// Factor applied to the delay after each retry
    #[serde(default = "default_retry_backoff_multiplier")]
    pub retry_backoff_multiplier: u32,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            request_timeout: default_request_timeout(),
            connect_timeout: default_connect_timeout(),
            max_retries: default_max_retries(),
            retry_initial_delay_ms: default_retry_initial_delay_ms(),
            retry_backoff_multiplier: default_retry_backoff_multiplier(),
            user_agent: default_user_agent(),
        }
    }
}

impl ApiConfig {
    /// Whether a remote API is configured at all.
    pub fn is_configured(&self) -> bool {
        !self.base_url.trim().is_empty()
    }
}

// ============================================================================
// Cache Configuration
// ============================================================================

/// Response cache configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Whether caching is enabled
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// TTL for entries stored without an explicit one
    #[serde(default = "default_ttl_ms")]
    pub default_ttl_ms: u64,

    /// TTL for job listings
    #[serde(default = "default_ttl_ms")]
    pub jobs_ttl_ms: u64,

    /// TTL for single job reads
    #[serde(default = "default_job_detail_ttl_ms")]
    pub job_detail_ttl_ms: u64,

    /// TTL for a user's applications
    #[serde(default = "default_applications_ttl_ms")]
    pub applications_ttl_ms: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            default_ttl_ms: default_ttl_ms(),
            jobs_ttl_ms: default_ttl_ms(),
            job_detail_ttl_ms: default_job_detail_ttl_ms(),
            applications_ttl_ms: default_applications_ttl_ms(),
        }
    }
}

impl CacheConfig {
    pub fn default_ttl(&self) -> Duration {
        Duration::from_millis(self.default_ttl_ms)
    }

    pub fn jobs_ttl(&self) -> Duration {
        Duration::from_millis(self.jobs_ttl_ms)
    }

    pub fn job_detail_ttl(&self) -> Duration {
        Duration::from_millis(self.job_detail_ttl_ms)
    }

    pub fn applications_ttl(&self) -> Duration {
        Duration::from_millis(self.applications_ttl_ms)
    }
}

// ============================================================================
// Fallback Store Configuration
// ============================================================================

/// Fallback store backend type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FallbackBackend {
    #[default]
    Memory,
    Disk,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FallbackConfig {
    #[serde(default)]
    pub backend: FallbackBackend,

    /// Directory used by the disk backend
    #[serde(default = "default_fallback_directory")]
    pub directory: String,

    /// Write the built-in placeholder jobs into an empty store on startup
    #[serde(default = "default_true")]
    pub seed_placeholders: bool,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            backend: FallbackBackend::default(),
            directory: default_fallback_directory(),
            seed_placeholders: true,
        }
    }
}

// ============================================================================
// Logger Settings
// ============================================================================

/// Console output settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsoleSettings {
    /// Whether console output is enabled
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Whether to use colored output
    #[serde(default = "default_true")]
    pub colored: bool,
}

impl Default for ConsoleSettings {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            colored: default_true(),
        }
    }
}

/// File output settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSettings {
    /// Whether file output is enabled
    #[serde(default)]
    pub enabled: bool,

    /// Path to the log file
    #[serde(default = "default_log_path")]
    pub path: String,

    /// Whether to append to existing file
    #[serde(default = "default_true")]
    pub append: bool,

    /// Log format: "full", "compact", or "json"
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for FileSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            path: default_log_path(),
            append: default_true(),
            format: default_log_format(),
        }
    }
}

/// Logger configuration settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggerSettings {
    /// Log level: "trace", "debug", "info", "warn", "error"
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub console: ConsoleSettings,

    #[serde(default)]
    pub file: FileSettings,
}

impl Default for LoggerSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            console: ConsoleSettings::default(),
            file: FileSettings::default(),
        }
    }
}

impl LoggerSettings {
    /// Convert the file representation into the runtime `LoggerConfig`.
    pub fn into_logger_config(self) -> Result<LoggerConfig, ConfigError> {
        let has_output = self.console.enabled || self.file.enabled;
        let console = ConsoleConfig::new(self.console.enabled, self.console.colored);
        let file = self.file.into_file_config()?;

        LoggerConfig::new(console, file, self.level).map_err(|e| {
            let key = if has_output { "level" } else { "console" };
            ConfigError::invalid("logger", key, format!("{e:#}"))
        })
    }
}

impl FileSettings {
    pub fn into_file_config(self) -> Result<FileConfig, ConfigError> {
        let format = self
            .format
            .parse::<LogFormat>()
            .map_err(|e| ConfigError::invalid("logger.file", "format", e.to_string()))?;

        FileConfig::new(self.enabled, PathBuf::from(self.path), self.append, format)
            .map_err(|e| ConfigError::invalid("logger.file", "path", e.to_string()))
    }
}

// ============================================================================
// Main Settings Structure
// ============================================================================

/// Complete client settings
///
/// This structure represents the entire configuration that can be loaded
/// from TOML files and environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Settings {
    /// Application information
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Remote API
    #[serde(default)]
    pub api: ApiConfig,

    /// Response cache
    #[serde(default)]
    pub cache: CacheConfig,

    /// Fallback store
    #[serde(default)]
    pub fallback: FallbackConfig,

    /// Logger configuration
    #[serde(default)]
    pub logger: LoggerSettings,
}
