//! Domain models shared by the client, the sanitizer and the fallback store.

mod application;
mod evaluation;
mod filter;
mod health;
mod job;

use serde::{Deserialize, Serialize};

pub use application::{
    ApplicationData, ApplicationList, ApplicationRecord, ApplicationResult, ApplicationStatus,
};
pub use evaluation::{EvaluationRequest, EvaluationResult};
pub use filter::FilterSet;
pub use health::{HealthReport, HealthStatus};
pub use job::{
    DEFAULT_COMPANY, DEFAULT_DESCRIPTION, DEFAULT_JOB_TITLE, DEFAULT_LOCATION, DEFAULT_SALARY,
    ExperienceLevel, JobDraft, JobListing, JobRecord, JobStatus, JobType, RemotePolicy,
};

/// Where a result came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    /// The remote API
    Live,
    /// The local fallback store or built-in placeholders
    Fallback,
}
