use std::process::ExitCode;

use clap::Parser;

use jobstir_client::cli::{self, Cli};
use jobstir_client::services::JobClient;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let settings = cli::load_and_merge_config(&cli)?;
    cli::init_logger_from_settings(&settings)?;

    tracing::debug!(
        version = jobstir_client::pkg_version(),
        command = ?cli.command,
        "Starting jobstir"
    );

    let client = JobClient::new(&settings).await?;
    let result = cli::execute_command(&cli.command, &client, &mut std::io::stdout().lock()).await;
    client.shutdown().await;

    match result {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(e) => {
            tracing::error!(error = %e, "Command failed");
            eprintln!("error: {e}");
            Ok(ExitCode::FAILURE)
        }
    }
}
