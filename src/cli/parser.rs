//! CLI argument parsing with clap
//!
//! Defines the `jobstir` diagnostic command line: global configuration flags
//! plus one subcommand per client operation worth poking at from a shell.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::build;

/// Diagnostic client for the JobStir job board API
#[derive(Parser, Debug)]
#[command(name = "jobstir")]
#[command(about = "Diagnostic client for the JobStir job board API")]
#[command(long_about = "
jobstir talks to the JobStir API through the same cached, retrying client the
application uses. When the API is down or not configured, listings are served
from the local fallback store and the output says so.

Results are printed as JSON on stdout; logs go to stderr.

EXAMPLES:
    # Check the API health
    jobstir --base-url https://api.jobstir.example health

    # List remote jobs in Berlin
    jobstir jobs --filter location=Berlin --filter remote=remote

    # Show one job
    jobstir job 42

    # Applications submitted by a user
    jobstir applications user-17

    # Score a resume stored in a file
    jobstir evaluate --resume-file cv.txt --job \"Senior Rust engineer\"

    # Use a specific configuration file with debug logging
    jobstir --config /etc/jobstir/production.toml --verbose jobs
")]
#[command(version = build::CLAP_LONG_VERSION)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path
    ///
    /// Load this TOML file instead of the layered `config/` directory.
    /// The file must exist and be readable.
    #[arg(short, long, value_name = "FILE", value_parser = super::validation::validate_config_file_path)]
    pub config: Option<PathBuf>,

    /// Override environment detection
    ///
    /// Selects which `config/{environment}.toml` layer is loaded.
    #[arg(short, long, value_enum)]
    pub env: Option<Environment>,

    /// JobStir API base URL
    ///
    /// Overrides `api.base_url` from configuration. Must be http or https.
    #[arg(long, value_name = "URL", value_parser = super::validation::validate_base_url)]
    pub base_url: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Check whether the API is reachable
    Health,

    /// List jobs
    ///
    /// Examples:
    ///   jobstir jobs
    ///   jobstir jobs --filter type=full-time --filter location=remote
    Jobs {
        /// Filter as KEY=VALUE; repeat for several filters
        #[arg(short, long = "filter", value_name = "KEY=VALUE", value_parser = super::validation::parse_filter)]
        filters: Vec<(String, String)>,
    },

    /// Show a single job
    Job {
        /// Job identifier
        #[arg(value_parser = super::validation::validate_identifier)]
        id: String,
    },

    /// List applications submitted by a user
    Applications {
        /// User identifier
        #[arg(value_parser = super::validation::validate_identifier)]
        user_id: String,
    },

    /// Score a resume against a job description
    Evaluate {
        /// Resume text
        #[arg(long, value_name = "TEXT", required_unless_present = "resume_file")]
        resume: Option<String>,

        /// Read the resume from a file instead
        #[arg(long, value_name = "FILE", conflicts_with = "resume", value_parser = super::validation::validate_readable_file)]
        resume_file: Option<PathBuf>,

        /// Job description text
        #[arg(short, long = "job", value_name = "TEXT")]
        job_description: String,
    },
}

/// Environment options
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Environment {
    #[value(name = "development", alias = "dev")]
    Development,
    #[value(name = "staging", alias = "stage")]
    Staging,
    #[value(name = "production", alias = "prod")]
    Production,
    #[value(name = "test")]
    Test,
}

impl From<Environment> for crate::config::Environment {
    fn from(env: Environment) -> Self {
        match env {
            Environment::Development => crate::config::Environment::Development,
            Environment::Staging => crate::config::Environment::Staging,
            Environment::Production => crate::config::Environment::Production,
            Environment::Test => crate::config::Environment::Test,
        }
    }
}
