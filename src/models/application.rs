//! Job application models.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use validator::Validate;

use super::DataSource;
use super::job::normalize_token;

/// Review state. Changed by the hiring workflow, never by this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    #[default]
    Pending,
    Reviewing,
    Interview,
    Offer,
    Rejected,
}

impl ApplicationStatus {
    pub fn parse(value: &str) -> Option<Self> {
        match normalize_token(value).as_str() {
            "pending" | "submitted" | "new" => Some(ApplicationStatus::Pending),
            "reviewing" | "in-review" | "under-review" => Some(ApplicationStatus::Reviewing),
            "interview" | "interviewing" => Some(ApplicationStatus::Interview),
            "offer" | "offered" => Some(ApplicationStatus::Offer),
            "rejected" | "declined" => Some(ApplicationStatus::Rejected),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationRecord {
    pub id: String,
    pub job_id: String,
    pub user_id: String,
    pub submitted_at: Timestamp,
    pub status: ApplicationStatus,
}

impl Default for ApplicationRecord {
    fn default() -> Self {
        Self {
            id: String::new(),
            job_id: String::new(),
            user_id: String::new(),
            submitted_at: Timestamp::UNIX_EPOCH,
            status: ApplicationStatus::default(),
        }
    }
}

/// Payload submitted with an application.
///
/// Fields other than the named ones are forwarded to the API untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct ApplicationData {
    #[validate(length(min = 1, message = "user_id is required"))]
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_letter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resume_url: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ApplicationData {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            ..Self::default()
        }
    }
}

/// Result of `apply_to_job`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationResult {
    pub application: ApplicationRecord,
    pub source: DataSource,
}

/// Result of `get_user_applications`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationList {
    pub applications: Vec<ApplicationRecord>,
    pub total: u64,
    pub source: DataSource,
    #[serde(default)]
    pub cached: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ApplicationList {
    pub fn empty_with_error(source: DataSource, error: impl Into<String>) -> Self {
        Self {
            applications: Vec::new(),
            total: 0,
            source,
            cached: false,
            error: Some(error.into()),
        }
    }
}
