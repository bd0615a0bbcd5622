//! Job posting models.
//!
//! `JobRecord` is the canonical, fully populated shape every remote or stored
//! job is normalized into before it reaches a caller.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{DataSource, FilterSet};

pub const DEFAULT_JOB_TITLE: &str = "Untitled Position";
pub const DEFAULT_COMPANY: &str = "Unknown Company";
pub const DEFAULT_LOCATION: &str = "Location not specified";
pub const DEFAULT_SALARY: &str = "Competitive";
pub const DEFAULT_DESCRIPTION: &str = "No description available.";

/// Lowercase, trim, and fold `_` and spaces into `-` so loosely written enum
/// values compare equal.
pub(crate) fn normalize_token(value: &str) -> String {
    value
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| if c == '_' || c.is_whitespace() { '-' } else { c })
        .collect()
}

// ============================================================================
// Enums
// ============================================================================

/// Employment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum JobType {
    #[default]
    FullTime,
    PartTime,
    Contract,
    Remote,
}

impl JobType {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobType::FullTime => "full-time",
            JobType::PartTime => "part-time",
            JobType::Contract => "contract",
            JobType::Remote => "remote",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match normalize_token(value).as_str() {
            "full-time" | "fulltime" | "permanent" => Some(JobType::FullTime),
            "part-time" | "parttime" => Some(JobType::PartTime),
            "contract" | "contractor" | "freelance" | "temporary" => Some(JobType::Contract),
            "remote" => Some(JobType::Remote),
            _ => None,
        }
    }
}

/// Where the work happens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemotePolicy {
    #[default]
    Onsite,
    Remote,
    Hybrid,
}

impl RemotePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            RemotePolicy::Onsite => "onsite",
            RemotePolicy::Remote => "remote",
            RemotePolicy::Hybrid => "hybrid",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match normalize_token(value).as_str() {
            "onsite" | "on-site" | "office" | "in-office" | "in-person" => {
                Some(RemotePolicy::Onsite)
            }
            "remote" | "fully-remote" => Some(RemotePolicy::Remote),
            "hybrid" => Some(RemotePolicy::Hybrid),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExperienceLevel {
    Junior,
    #[default]
    Mid,
    Senior,
}

impl ExperienceLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExperienceLevel::Junior => "junior",
            ExperienceLevel::Mid => "mid",
            ExperienceLevel::Senior => "senior",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match normalize_token(value).as_str() {
            "junior" | "entry" | "entry-level" | "intern" => Some(ExperienceLevel::Junior),
            "mid" | "mid-level" | "intermediate" => Some(ExperienceLevel::Mid),
            "senior" | "lead" | "principal" => Some(ExperienceLevel::Senior),
            _ => None,
        }
    }
}

/// Posting status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    #[default]
    Active,
    Inactive,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Active => "active",
            JobStatus::Inactive => "inactive",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match normalize_token(value).as_str() {
            "active" | "open" | "published" => Some(JobStatus::Active),
            "inactive" | "closed" | "draft" | "archived" => Some(JobStatus::Inactive),
            _ => None,
        }
    }
}

// ============================================================================
// JobRecord
// ============================================================================

/// Canonical job posting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRecord {
    pub id: String,
    pub title: String,
    pub company: String,
    pub location: String,
    #[serde(rename = "type")]
    pub job_type: JobType,
    /// Free text, e.g. "$120k - $150k"
    pub salary: String,
    pub description: String,
    pub requirements: Vec<String>,
    pub responsibilities: Vec<String>,
    pub benefits: Vec<String>,
    pub remote: RemotePolicy,
    pub experience_level: ExperienceLevel,
    pub created_at: Timestamp,
    pub status: JobStatus,
    pub applicants: u64,
    pub views: u64,
}

impl Default for JobRecord {
    fn default() -> Self {
        Self {
            id: String::new(),
            title: DEFAULT_JOB_TITLE.to_string(),
            company: DEFAULT_COMPANY.to_string(),
            location: DEFAULT_LOCATION.to_string(),
            job_type: JobType::default(),
            salary: DEFAULT_SALARY.to_string(),
            description: DEFAULT_DESCRIPTION.to_string(),
            requirements: Vec::new(),
            responsibilities: Vec::new(),
            benefits: Vec::new(),
            remote: RemotePolicy::default(),
            experience_level: ExperienceLevel::default(),
            created_at: Timestamp::UNIX_EPOCH,
            status: JobStatus::default(),
            applicants: 0,
            views: 0,
        }
    }
}

impl JobRecord {
    /// Whether this record satisfies every filter this layer understands.
    ///
    /// Used when listings are served from the fallback store. Unknown filter
    /// keys are ignored, text filters match case-insensitively by substring.
    pub fn matches(&self, filters: &FilterSet) -> bool {
        filters.iter().all(|(key, value)| {
            let needle = value.to_lowercase();
            match normalize_token(key).as_str() {
                "search" | "q" | "query" | "keyword" => [
                    &self.title,
                    &self.company,
                    &self.description,
                ]
                .iter()
                .any(|field| field.to_lowercase().contains(&needle)),
                "title" => self.title.to_lowercase().contains(&needle),
                "company" => self.company.to_lowercase().contains(&needle),
                "location" => self.location.to_lowercase().contains(&needle),
                "type" | "job-type" => JobType::parse(value) == Some(self.job_type),
                "remote" => RemotePolicy::parse(value) == Some(self.remote),
                "experience-level" | "experiencelevel" | "level" => {
                    ExperienceLevel::parse(value) == Some(self.experience_level)
                }
                "status" => JobStatus::parse(value) == Some(self.status),
                _ => true,
            }
        })
    }
}

/// Writable fields of a job posting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct JobDraft {
    #[validate(length(min = 1, message = "title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "company is required"))]
    pub company: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub job_type: Option<JobType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub requirements: Vec<String>,
    #[serde(default)]
    pub responsibilities: Vec<String>,
    #[serde(default)]
    pub benefits: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote: Option<RemotePolicy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experience_level: Option<ExperienceLevel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<JobStatus>,
}

impl JobDraft {
    pub fn new(title: impl Into<String>, company: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            company: company.into(),
            ..Self::default()
        }
    }

    /// Overwrite `record` with every field the draft sets.
    pub fn apply_to(&self, record: &mut JobRecord) {
        record.title = self.title.trim().to_string();
        record.company = self.company.trim().to_string();
        if let Some(location) = &self.location {
            record.location = location.clone();
        }
        if let Some(job_type) = self.job_type {
            record.job_type = job_type;
        }
        if let Some(salary) = &self.salary {
            record.salary = salary.clone();
        }
        if let Some(description) = &self.description {
            record.description = description.clone();
        }
        record.requirements = self.requirements.clone();
        record.responsibilities = self.responsibilities.clone();
        record.benefits = self.benefits.clone();
        if let Some(remote) = self.remote {
            record.remote = remote;
        }
        if let Some(level) = self.experience_level {
            record.experience_level = level;
        }
        if let Some(status) = self.status {
            record.status = status;
        }
    }

    pub fn into_record(self, id: String, created_at: Timestamp) -> JobRecord {
        let mut record = JobRecord {
            id,
            created_at,
            ..JobRecord::default()
        };
        self.apply_to(&mut record);
        record
    }
}

/// Result of `list_jobs`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobListing {
    pub jobs: Vec<JobRecord>,
    pub total: u64,
    pub source: DataSource,
    /// Served from the response cache
    #[serde(default)]
    pub cached: bool,
    /// Why the listing is degraded, when it is
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl JobListing {
    pub fn is_degraded(&self) -> bool {
        self.source == DataSource::Fallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_enum_parsing_is_lenient() {
        assert_eq!(JobType::parse("Full Time"), Some(JobType::FullTime));
        assert_eq!(JobType::parse("part_time"), Some(JobType::PartTime));
        assert_eq!(JobType::parse("seasonal"), None);
        assert_eq!(RemotePolicy::parse("On-Site"), Some(RemotePolicy::Onsite));
        assert_eq!(ExperienceLevel::parse("Entry Level"), Some(ExperienceLevel::Junior));
        assert_eq!(JobStatus::parse("closed"), Some(JobStatus::Inactive));
    }

    #[test]
    fn test_record_wire_format_is_camel_case() {
        let value = serde_json::to_value(JobRecord::default()).unwrap();
        assert_eq!(value["type"], json!("full-time"));
        assert_eq!(value["experienceLevel"], json!("mid"));
        assert_eq!(value["createdAt"], json!("1970-01-01T00:00:00Z"));
        assert_eq!(value["remote"], json!("onsite"));
    }

    #[test]
    fn test_matches_filters() {
        let job = JobRecord {
            id: "1".into(),
            title: "Rust Engineer".into(),
            company: "Ferrous".into(),
            location: "Berlin, DE".into(),
            remote: RemotePolicy::Hybrid,
            ..JobRecord::default()
        };

        assert!(job.matches(&FilterSet::new()));
        assert!(job.matches(&FilterSet::new().with("search", "rust")));
        assert!(job.matches(&FilterSet::new().with("location", "berlin")));
        assert!(job.matches(&FilterSet::new().with("remote", "hybrid")));
        assert!(job.matches(&FilterSet::new().with("unknown", "x")));
        assert!(!job.matches(&FilterSet::new().with("remote", "remote")));
        assert!(!job.matches(&FilterSet::new().with("experience_level", "senior")));
    }

    #[test]
    fn test_draft_into_record_keeps_defaults_for_unset_fields() {
        let draft = JobDraft {
            salary: Some("$100k".into()),
            ..JobDraft::new("Designer", "Acme")
        };
        let record = draft.into_record("j-1".into(), Timestamp::UNIX_EPOCH);
        assert_eq!(record.title, "Designer");
        assert_eq!(record.salary, "$100k");
        assert_eq!(record.location, DEFAULT_LOCATION);
        assert_eq!(record.status, JobStatus::Active);
    }
}
