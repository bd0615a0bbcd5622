//! Normalization of loosely typed API payloads into canonical records.
//!
//! Every function here is total: any JSON shape, including `null` or a
//! missing value, produces a fully populated record. A field that is absent,
//! blank, or of the wrong type takes its default. Unknown fields are dropped.
//! Keys are accepted in camelCase and snake_case.

use jiff::Timestamp;
use jiff::tz::TimeZone;
use serde_json::{Map, Value};

use crate::models::{
    ApplicationRecord, ApplicationStatus, EvaluationResult, ExperienceLevel, JobRecord, JobStatus,
    JobType, RemotePolicy,
};

/// Sanitize a single job. `None` (or any non-object) yields the default record.
pub fn sanitize_job(raw: Option<&Value>) -> JobRecord {
    let defaults = JobRecord::default();
    let Some(obj) = raw.and_then(Value::as_object) else {
        return defaults;
    };

    JobRecord {
        id: id(obj, &["id", "job_id", "jobId"]).unwrap_or(defaults.id),
        title: text(obj, &["title"]).unwrap_or(defaults.title),
        company: text(obj, &["company", "company_name", "companyName"]).unwrap_or(defaults.company),
        location: text(obj, &["location"]).unwrap_or(defaults.location),
        job_type: text(obj, &["type", "job_type", "jobType"])
            .and_then(|v| JobType::parse(&v))
            .unwrap_or(defaults.job_type),
        salary: salary(obj).unwrap_or(defaults.salary),
        description: text(obj, &["description"]).unwrap_or(defaults.description),
        requirements: list(obj, &["requirements"]),
        responsibilities: list(obj, &["responsibilities"]),
        benefits: list(obj, &["benefits"]),
        remote: remote(obj).unwrap_or(defaults.remote),
        experience_level: text(obj, &["experienceLevel", "experience_level"])
            .and_then(|v| ExperienceLevel::parse(&v))
            .unwrap_or(defaults.experience_level),
        created_at: timestamp(obj, &["createdAt", "created_at"]).unwrap_or(defaults.created_at),
        status: text(obj, &["status"])
            .and_then(|v| JobStatus::parse(&v))
            .unwrap_or(defaults.status),
        applicants: count(obj, &["applicants", "applicant_count", "applicantCount"])
            .unwrap_or(defaults.applicants),
        views: count(obj, &["views", "view_count", "viewCount"]).unwrap_or(defaults.views),
    }
}

pub fn sanitize_application(raw: Option<&Value>) -> ApplicationRecord {
    let defaults = ApplicationRecord::default();
    let Some(obj) = raw.and_then(Value::as_object) else {
        return defaults;
    };

    ApplicationRecord {
        id: id(obj, &["id", "application_id", "applicationId"]).unwrap_or(defaults.id),
        job_id: id(obj, &["jobId", "job_id"]).unwrap_or(defaults.job_id),
        user_id: id(obj, &["userId", "user_id"]).unwrap_or(defaults.user_id),
        submitted_at: timestamp(obj, &["submittedAt", "submitted_at", "createdAt", "created_at"])
            .unwrap_or(defaults.submitted_at),
        status: text(obj, &["status"])
            .and_then(|v| ApplicationStatus::parse(&v))
            .unwrap_or(defaults.status),
    }
}

pub fn sanitize_evaluation(raw: Option<&Value>) -> EvaluationResult {
    let defaults = EvaluationResult::default();
    let Some(obj) = raw.and_then(Value::as_object) else {
        return defaults;
    };

    EvaluationResult {
        score: score(obj).unwrap_or(defaults.score),
        summary: text(obj, &["summary", "feedback", "analysis"]).unwrap_or(defaults.summary),
        strengths: list(obj, &["strengths", "matched_skills", "matchedSkills"]),
        gaps: list(obj, &["gaps", "weaknesses", "missing_skills", "missingSkills"]),
        recommendations: list(obj, &["recommendations", "suggestions"]),
    }
}

// ============================================================================
// Envelope handling
// ============================================================================

/// Items of a list response, bare (`[...]`) or wrapped (`{"jobs": [...]}`).
pub fn extract_list<'a>(value: &'a Value, keys: &[&str]) -> &'a [Value] {
    if let Some(items) = value.as_array() {
        return items;
    }
    keys.iter()
        .chain(["data", "results", "items"].iter())
        .find_map(|key| value.get(*key).and_then(Value::as_array))
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// Declared total of a list response, if it carries a usable one.
pub fn extract_total(value: &Value) -> Option<u64> {
    value.as_object().and_then(|obj| count(obj, &["total", "count"]))
}

/// The record inside a single-item response, bare or wrapped (`{"job": {...}}`).
pub fn extract_item<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    match value.get(key).or_else(|| value.get("data")) {
        Some(inner) if inner.is_object() => Some(inner),
        _ if value.is_object() => Some(value),
        _ => None,
    }
}

// ============================================================================
// Field helpers
// ============================================================================

fn field<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| obj.get(*key))
        .find(|value| !value.is_null())
}

/// Non-blank string.
fn text(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    field(obj, keys)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Identifier: non-blank string, or an integer rendered as a string.
fn id(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    match field(obj, keys)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) if n.is_u64() || n.is_i64() => Some(n.to_string()),
        _ => None,
    }
}

/// Ordered non-blank strings. Anything but an array yields an empty list.
fn list(obj: &Map<String, Value>, keys: &[&str]) -> Vec<String> {
    field(obj, keys)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Non-negative integer.
fn count(obj: &Map<String, Value>, keys: &[&str]) -> Option<u64> {
    field(obj, keys).and_then(Value::as_u64)
}

fn timestamp(obj: &Map<String, Value>, keys: &[&str]) -> Option<Timestamp> {
    match field(obj, keys)? {
        Value::String(s) => parse_timestamp(s),
        Value::Number(n) => n
            .as_i64()
            .and_then(|ms| Timestamp::from_millisecond(ms).ok()),
        _ => None,
    }
}

pub(crate) fn parse_timestamp(value: &str) -> Option<Timestamp> {
    let value = value.trim();
    if let Ok(ts) = value.parse::<Timestamp>() {
        return Some(ts);
    }
    if let Ok(dt) = value.parse::<jiff::civil::DateTime>() {
        return dt.to_zoned(TimeZone::UTC).ok().map(|z| z.timestamp());
    }
    if let Ok(date) = value.parse::<jiff::civil::Date>() {
        return date.to_zoned(TimeZone::UTC).ok().map(|z| z.timestamp());
    }
    None
}

/// Salary is free text; a bare number is rendered as-is.
fn salary(obj: &Map<String, Value>) -> Option<String> {
    let keys = ["salary", "salary_range", "salaryRange"];
    match field(obj, &keys)? {
        Value::Number(n) => Some(n.to_string()),
        _ => text(obj, &keys),
    }
}

/// Remote policy, also accepting a boolean `remote` flag.
fn remote(obj: &Map<String, Value>) -> Option<RemotePolicy> {
    match field(obj, &["remote", "remote_policy", "remotePolicy", "work_mode", "workMode"])? {
        Value::Bool(true) => Some(RemotePolicy::Remote),
        Value::Bool(false) => Some(RemotePolicy::Onsite),
        Value::String(s) => RemotePolicy::parse(s),
        _ => None,
    }
}

fn score(obj: &Map<String, Value>) -> Option<f64> {
    let raw = match field(obj, &["score", "match_score", "matchScore", "overall_score"])? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches('%').parse::<f64>().ok(),
        _ => None,
    }?;
    raw.is_finite().then(|| raw.clamp(0.0, 100.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DEFAULT_COMPANY, DEFAULT_JOB_TITLE};
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn test_null_yields_default_record() {
        assert_eq!(sanitize_job(None), JobRecord::default());
        assert_eq!(sanitize_job(Some(&Value::Null)), JobRecord::default());
        assert_eq!(sanitize_job(Some(&json!("oops"))), JobRecord::default());
    }

    #[test]
    fn test_single_field_keeps_every_other_default() {
        let record = sanitize_job(Some(&json!({"title": "X"})));
        assert_eq!(
            record,
            JobRecord {
                title: "X".into(),
                ..JobRecord::default()
            }
        );
    }

    #[test]
    fn test_full_snake_case_payload() {
        let raw = json!({
            "id": 42,
            "title": "  Backend Engineer ",
            "company_name": "Acme",
            "location": "Remote, EU",
            "job_type": "Part Time",
            "salary": 95000,
            "description": "Build things",
            "requirements": ["Rust", 3, "", "SQL"],
            "responsibilities": "not a list",
            "benefits": ["Health"],
            "remote": true,
            "experience_level": "Senior",
            "created_at": "2024-03-01T10:00:00+00:00",
            "status": "closed",
            "applicants": 12,
            "views": -5,
            "internal_score": 99
        });

        let record = sanitize_job(Some(&raw));
        assert_eq!(record.id, "42");
        assert_eq!(record.title, "Backend Engineer");
        assert_eq!(record.company, "Acme");
        assert_eq!(record.job_type, JobType::PartTime);
        assert_eq!(record.salary, "95000");
        assert_eq!(record.requirements, vec!["Rust", "SQL"]);
        assert!(record.responsibilities.is_empty());
        assert_eq!(record.remote, RemotePolicy::Remote);
        assert_eq!(record.experience_level, ExperienceLevel::Senior);
        assert_eq!(record.created_at.to_string(), "2024-03-01T10:00:00Z");
        assert_eq!(record.status, JobStatus::Inactive);
        assert_eq!(record.applicants, 12);
        assert_eq!(record.views, 0);
    }

    #[test]
    fn test_wrong_types_fall_back() {
        let raw = json!({
            "title": 7,
            "company": "   ",
            "type": "seasonal",
            "createdAt": "yesterday",
            "applicants": "12",
            "views": 3.5
        });
        let record = sanitize_job(Some(&raw));
        assert_eq!(record.title, DEFAULT_JOB_TITLE);
        assert_eq!(record.company, DEFAULT_COMPANY);
        assert_eq!(record.job_type, JobType::FullTime);
        assert_eq!(record.created_at, Timestamp::UNIX_EPOCH);
        assert_eq!(record.applicants, 0);
        assert_eq!(record.views, 0);
    }

    #[test]
    fn test_date_only_timestamp() {
        let record = sanitize_job(Some(&json!({"createdAt": "2024-01-15"})));
        assert_eq!(record.created_at.to_string(), "2024-01-15T00:00:00Z");
    }

    #[test]
    fn test_application_defaults_and_aliases() {
        assert_eq!(sanitize_application(None), ApplicationRecord::default());

        let record = sanitize_application(Some(&json!({
            "id": "a1",
            "job_id": 7,
            "user_id": "u1",
            "created_at": "2024-05-01T12:00:00Z",
            "status": "interviewing"
        })));
        assert_eq!(record.job_id, "7");
        assert_eq!(record.status, ApplicationStatus::Interview);
        assert_eq!(record.submitted_at.to_string(), "2024-05-01T12:00:00Z");
    }

    #[test]
    fn test_evaluation_score_is_clamped() {
        let result = sanitize_evaluation(Some(&json!({
            "score": "135%",
            "feedback": "Strong match",
            "missing_skills": ["Kubernetes"]
        })));
        assert_eq!(result.score, 100.0);
        assert_eq!(result.summary, "Strong match");
        assert_eq!(result.gaps, vec!["Kubernetes"]);
        assert_eq!(sanitize_evaluation(None), EvaluationResult::default());
    }

    #[test]
    fn test_extract_list_envelopes() {
        let bare = json!([{"id": 1}]);
        let wrapped = json!({"jobs": [{"id": 1}, {"id": 2}], "total": 10});
        let data = json!({"data": [{"id": 1}]});
        assert_eq!(extract_list(&bare, &["jobs"]).len(), 1);
        assert_eq!(extract_list(&wrapped, &["jobs"]).len(), 2);
        assert_eq!(extract_list(&data, &["jobs"]).len(), 1);
        assert!(extract_list(&json!({"jobs": "nope"}), &["jobs"]).is_empty());
        assert_eq!(extract_total(&wrapped), Some(10));
        assert_eq!(extract_total(&bare), None);
    }

    #[test]
    fn test_extract_item_envelopes() {
        let wrapped = json!({"job": {"id": "1"}});
        let bare = json!({"id": "1"});
        assert_eq!(extract_item(&wrapped, "job"), Some(&json!({"id": "1"})));
        assert_eq!(extract_item(&bare, "job"), Some(&bare));
        assert_eq!(extract_item(&json!([1]), "job"), None);
    }

    fn arb_json() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(|n| json!(n)),
            any::<f64>().prop_map(|f| json!(f)),
            "[a-zA-Z0-9 _-]{0,12}".prop_map(Value::String),
        ];
        leaf.prop_recursive(3, 32, 6, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
                prop::collection::hash_map(
                    prop_oneof![
                        Just("id".to_string()),
                        Just("title".to_string()),
                        Just("requirements".to_string()),
                        Just("createdAt".to_string()),
                        Just("applicants".to_string()),
                        Just("remote".to_string()),
                        Just("score".to_string()),
                        "[a-z]{1,8}",
                    ],
                    inner,
                    0..6
                )
                .prop_map(|m| Value::Object(m.into_iter().collect())),
            ]
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        /// Any input shape produces a record whose text fields are never blank
        /// (except the id) and whose lists hold no blank entries.
        #[test]
        fn prop_sanitize_job_is_total(raw in arb_json()) {
            let record = sanitize_job(Some(&raw));
            prop_assert!(!record.title.is_empty());
            prop_assert!(!record.company.is_empty());
            prop_assert!(!record.location.is_empty());
            prop_assert!(!record.salary.is_empty());
            prop_assert!(!record.description.is_empty());
            prop_assert!(record.requirements.iter().all(|r| !r.trim().is_empty()));

            let evaluation = sanitize_evaluation(Some(&raw));
            prop_assert!((0.0..=100.0).contains(&evaluation.score));

            let _ = sanitize_application(Some(&raw));
        }

        /// Sanitizing the serialized form of a sanitized record is a no-op.
        #[test]
        fn prop_sanitize_job_is_idempotent(raw in arb_json()) {
            let once = sanitize_job(Some(&raw));
            let value = serde_json::to_value(&once).unwrap();
            prop_assert_eq!(sanitize_job(Some(&value)), once);
        }
    }
}
