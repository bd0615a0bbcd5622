//! CLI argument validation functions
//!
//! Value parsers for arguments clap cannot check on its own.

use std::fs;
use std::path::PathBuf;

use reqwest::Url;

/// Validate that a file path is accessible (exists and is readable)
pub fn validate_readable_file(path_str: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(path_str);

    if !path.exists() {
        return Err(format!("File does not exist: '{}'", path_str));
    }
    if !path.is_file() {
        return Err(format!("Path is not a file: '{}'", path_str));
    }

    match fs::File::open(&path) {
        Ok(_) => Ok(path),
        Err(e) => Err(format!("Cannot read file '{}': {}", path_str, e)),
    }
}

/// Validate a configuration file path
pub fn validate_config_file_path(path_str: &str) -> Result<PathBuf, String> {
    validate_readable_file(path_str).map_err(|e| format!("Invalid configuration file: {e}"))
}

/// Validate an API base URL (absolute, http or https)
pub fn validate_base_url(url_str: &str) -> Result<String, String> {
    let url_str = url_str.trim();
    let url = Url::parse(url_str).map_err(|e| format!("Invalid URL '{}': {}", url_str, e))?;

    match url.scheme() {
        "http" | "https" => Ok(url_str.to_string()),
        other => Err(format!("URL scheme must be http or https, got: '{}'", other)),
    }
}

/// Parse a `KEY=VALUE` filter. The key must be non-empty; the value may be.
pub fn parse_filter(filter: &str) -> Result<(String, String), String> {
    let (key, value) = filter
        .split_once('=')
        .ok_or_else(|| format!("Filter must look like KEY=VALUE, got: '{}'", filter))?;

    let key = key.trim();
    if key.is_empty() {
        return Err(format!("Filter key cannot be empty: '{}'", filter));
    }

    Ok((key.to_string(), value.trim().to_string()))
}

/// Non-blank identifier, trimmed
pub fn validate_identifier(id: &str) -> Result<String, String> {
    let id = id.trim();
    if id.is_empty() {
        return Err("Identifier cannot be empty".to_string());
    }
    Ok(id.to_string())
}
