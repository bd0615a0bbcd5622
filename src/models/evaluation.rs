use serde::{Deserialize, Serialize};
use validator::Validate;

/// Body of `POST /api/evaluate-resume`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct EvaluationRequest {
    #[validate(length(min = 1, message = "resume_text is required"))]
    pub resume_text: String,
    #[validate(length(min = 1, message = "job_description is required"))]
    pub job_description: String,
}

/// Resume-to-job match assessment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    /// 0 to 100
    pub score: f64,
    pub summary: String,
    pub strengths: Vec<String>,
    pub gaps: Vec<String>,
    pub recommendations: Vec<String>,
}
