//! CLI module for the `jobstir` binary
//!
//! - Argument parsing with clap
//! - Configuration merging (CLI args + config files)
//! - Command execution against a [`JobClient`](crate::services::JobClient)

pub mod config_merger;
pub mod executor;
pub mod parser;
pub mod validation;

pub use config_merger::ConfigurationMerger;
pub use executor::execute_command;
pub use parser::{Cli, Commands, Environment};

use crate::config::settings::Settings;
use crate::logger::init_logger;

/// Load configuration and apply CLI overrides.
///
/// # Errors
/// Returns an error if loading, merging or validation fails.
pub fn load_and_merge_config(cli: &Cli) -> anyhow::Result<Settings> {
    let merger = ConfigurationMerger::load(cli)?;
    Ok(merger.merge_cli_args(cli)?)
}

/// Initialize logging from the `[logger]` section.
pub fn init_logger_from_settings(settings: &Settings) -> anyhow::Result<()> {
    let logger_config = settings.logger.clone().into_logger_config()?;
    init_logger(logger_config)
}
