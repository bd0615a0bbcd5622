//! Errors raised while loading and checking the jobstir configuration

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// `api.base_url` is set but cannot be used to reach the API.
    #[error("[api] base_url '{url}' is invalid: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    /// The disk fallback backend was chosen without a directory.
    #[error("[fallback] directory is required when backend = \"disk\"")]
    MissingFallbackDirectory,

    /// Any other setting outside what the client accepts.
    #[error("[{section}] {key}: {message}")]
    Invalid {
        section: &'static str,
        key: &'static str,
        message: String,
    },

    /// `default.toml` of the layered directory, or the file given with
    /// `--config`/`JOBSTIR_CONFIG_FILE`, does not exist.
    #[error("configuration file {} not found", .0.display())]
    MissingFile(PathBuf),

    #[error("{dir_var} and {file_var} cannot both be set; pick a directory or a single file")]
    ConflictingSources {
        dir_var: &'static str,
        file_var: &'static str,
    },

    #[error(
        "unknown environment '{0}', expected development, test, staging or production"
    )]
    UnknownEnvironment(String),

    /// The merged sources do not fit the settings sections.
    #[error("configuration does not match the expected sections: {0}")]
    Shape(#[source] config::ConfigError),

    /// A source could not be read or parsed.
    #[error("failed to read configuration: {0}")]
    Source(#[from] config::ConfigError),
}

impl ConfigError {
    pub fn invalid(section: &'static str, key: &'static str, message: impl Into<String>) -> Self {
        ConfigError::Invalid {
            section,
            key,
            message: message.into(),
        }
    }

    /// Dotted `section.key` of the offending setting, when there is one.
    pub fn setting(&self) -> Option<String> {
        match self {
            ConfigError::InvalidBaseUrl { .. } => Some("api.base_url".to_string()),
            ConfigError::MissingFallbackDirectory => Some("fallback.directory".to_string()),
            ConfigError::Invalid { section, key, .. } => Some(format!("{section}.{key}")),
            _ => None,
        }
    }
}
