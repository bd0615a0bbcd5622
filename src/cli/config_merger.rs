//! Configuration merger for CLI arguments and config files
//!
//! CLI flags override values loaded from files and `JOBSTIR_*` variables.

use super::parser::Cli;
use crate::config::error::ConfigError;
use crate::config::{ConfigLoader, settings::Settings};

/// Applies CLI overrides on top of file-based configuration.
pub struct ConfigurationMerger {
    base_config: Settings,
}

impl ConfigurationMerger {
    pub fn new(base_config: Settings) -> Self {
        Self { base_config }
    }

    /// Load the base configuration the way the CLI asked for it.
    ///
    /// `--config` replaces the layered directory with a single file and
    /// `--env` overrides `JOBSTIR_APP_ENV`.
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let mut loader = ConfigLoader::new()?;

        if let Some(path) = &cli.config {
            loader = loader.with_config_file(path);
        }
        if let Some(env) = cli.env {
            loader = loader.with_environment(env.into());
        }

        Ok(Self::new(loader.load()?))
    }

    /// Merge CLI arguments into a copy of the base configuration and
    /// validate the result.
    pub fn merge_cli_args(&self, cli: &Cli) -> Result<Settings, ConfigError> {
        let mut config = self.base_config.clone();

        if cli.verbose {
            config.logger.level = "debug".to_string();
        } else if cli.quiet {
            config.logger.level = "error".to_string();
        }

        if let Some(base_url) = &cli.base_url {
            config.api.base_url = base_url.clone();
        }

        config.validate()?;
        Ok(config)
    }

    pub fn config(&self) -> &Settings {
        &self.base_config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("jobstir").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_merge_without_flags_keeps_base() {
        let base = Settings::default();
        let merger = ConfigurationMerger::new(base.clone());

        let merged = merger.merge_cli_args(&parse(&["health"])).unwrap();
        assert_eq!(&merged, merger.config());
    }

    #[test]
    fn test_merge_verbose_and_quiet() {
        let merger = ConfigurationMerger::new(Settings::default());

        let merged = merger.merge_cli_args(&parse(&["-v", "health"])).unwrap();
        assert_eq!(merged.logger.level, "debug");

        let merged = merger.merge_cli_args(&parse(&["-q", "health"])).unwrap();
        assert_eq!(merged.logger.level, "error");
    }

    #[test]
    fn test_merge_base_url() {
        let merger = ConfigurationMerger::new(Settings::default());
        assert!(!merger.config().api.is_configured());

        let merged = merger
            .merge_cli_args(&parse(&["--base-url", "http://localhost:8080", "health"]))
            .unwrap();
        assert_eq!(merged.api.base_url, "http://localhost:8080");
        assert!(merged.api.is_configured());
    }

    #[test]
    fn test_merge_revalidates() {
        let mut base = Settings::default();
        base.api.max_retries = 99;
        let merger = ConfigurationMerger::new(base);

        assert!(merger.merge_cli_args(&parse(&["health"])).is_err());
    }
}
