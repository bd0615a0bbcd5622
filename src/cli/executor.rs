//! Command executor for dispatching CLI commands
//!
//! Each subcommand maps onto one [`JobClient`] operation; the result is
//! written to `out` as pretty-printed JSON.

use std::io::Write;

use serde::Serialize;

use super::parser::Commands;
use crate::error::{AppError, AppResult};
use crate::models::FilterSet;
use crate::services::JobClient;

/// Run `command` against `client`, writing the result to `out`.
///
/// # Errors
/// Returns the client error for failed operations, and
/// [`AppError::Unavailable`] when `health` finds the API unhealthy (after
/// printing the report).
pub async fn execute_command<W: Write>(
    command: &Commands,
    client: &JobClient,
    out: &mut W,
) -> AppResult<()> {
    match command {
        Commands::Health => {
            let report = client.check_health().await;
            print_json(out, &report)?;
            if !report.is_healthy() {
                return Err(AppError::Unavailable {
                    message: report
                        .error
                        .unwrap_or_else(|| "API reported unhealthy".to_string()),
                });
            }
        }
        Commands::Jobs { filters } => {
            let filters: FilterSet = filters.iter().cloned().collect();
            let listing = client.list_jobs(&filters).await;
            if let Some(error) = &listing.error {
                tracing::warn!(error = %error, "Showing fallback jobs");
            }
            print_json(out, &listing)?;
        }
        Commands::Job { id } => {
            let job = client.get_job_details(id).await?;
            print_json(out, &job)?;
        }
        Commands::Applications { user_id } => {
            let applications = client.get_user_applications(user_id).await?;
            print_json(out, &applications)?;
        }
        Commands::Evaluate {
            resume,
            resume_file,
            job_description,
        } => {
            let resume = match (resume, resume_file) {
                (Some(text), _) => text.clone(),
                (None, Some(path)) => tokio::fs::read_to_string(path).await.map_err(|e| {
                    anyhow::Error::new(e).context(format!("reading {}", path.display()))
                })?,
                (None, None) => return Err(AppError::validation("resume", "resume is required")),
            };
            let evaluation = client.evaluate_resume(&resume, job_description).await?;
            print_json(out, &evaluation)?;
        }
    }

    Ok(())
}

fn print_json<W: Write, T: Serialize>(out: &mut W, value: &T) -> AppResult<()> {
    serde_json::to_writer_pretty(&mut *out, value).map_err(anyhow::Error::from)?;
    writeln!(out).map_err(anyhow::Error::from)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheManager;
    use crate::config::settings::CacheConfig;
    use crate::external::RetryPolicy;
    use crate::models::{HealthReport, JobListing, JobRecord};
    use crate::store::FallbackStore;

    fn offline_client() -> JobClient {
        JobClient::with_parts(
            None,
            CacheManager::new(CacheConfig::default()),
            FallbackStore::memory(),
            RetryPolicy::default(),
        )
    }

    async fn run(command: Commands) -> (AppResult<()>, Vec<u8>) {
        let mut out = Vec::new();
        let result = execute_command(&command, &offline_client(), &mut out).await;
        (result, out)
    }

    #[tokio::test]
    async fn test_jobs_prints_listing() {
        let (result, out) = run(Commands::Jobs {
            filters: vec![("level".to_string(), "junior".to_string())],
        })
        .await;
        result.unwrap();

        let listing: JobListing = serde_json::from_slice(&out).unwrap();
        assert_eq!(listing.jobs.len(), 1);
        assert_eq!(listing.jobs[0].id, "placeholder-3");
    }

    #[tokio::test]
    async fn test_job_prints_record() {
        let (result, out) = run(Commands::Job {
            id: "placeholder-1".to_string(),
        })
        .await;
        result.unwrap();

        let job: JobRecord = serde_json::from_slice(&out).unwrap();
        assert_eq!(job.company, "TechCorp");
    }

    #[tokio::test]
    async fn test_missing_job_is_an_error() {
        let (result, out) = run(Commands::Job {
            id: "nope".to_string(),
        })
        .await;

        assert!(matches!(result, Err(AppError::NotFound { .. })));
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_unhealthy_report_is_printed_then_fails() {
        let (result, out) = run(Commands::Health).await;

        assert!(matches!(result, Err(AppError::Unavailable { .. })));
        let report: HealthReport = serde_json::from_slice(&out).unwrap();
        assert!(!report.is_healthy());
    }

    #[tokio::test]
    async fn test_evaluate_reads_resume_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.txt");

        let (result, _) = run(Commands::Evaluate {
            resume: None,
            resume_file: Some(missing),
            job_description: "Rust".to_string(),
        })
        .await;
        assert!(matches!(result, Err(AppError::Internal { .. })));

        let file = dir.path().join("cv.txt");
        std::fs::write(&file, "ten years of Rust").unwrap();
        let (result, _) = run(Commands::Evaluate {
            resume: None,
            resume_file: Some(file),
            job_description: "Rust".to_string(),
        })
        .await;
        assert!(matches!(result, Err(AppError::Unavailable { .. })));
    }
}
