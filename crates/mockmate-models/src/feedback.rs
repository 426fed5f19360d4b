//! Feedback request/response schemas.
//!
//! Verbal feedback takes an answered question, runs keypoint scoring, then
//! asks the generative model to grade it. Non-verbal feedback takes the
//! aggregated facial metrics the client accumulated from the stream.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// An answered question as submitted by the client for grading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AnswerSubmission {
    pub question_id: u32,
    pub question_level: String,
    pub question: String,
    pub keypoints: Vec<String>,
    #[serde(default)]
    pub possible_answers: Vec<String>,
    pub user_answer: String,
}

/// A submission augmented with keypoint-detection results. This record is
/// embedded verbatim in the grading prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ScoredAnswer {
    pub question_id: u32,
    pub question_level: String,
    pub question: String,
    pub keypoints: Vec<String>,
    pub user_answer: String,
    pub detected_keypoints: Vec<String>,
    pub missing_keypoints: Vec<String>,
}

/// Aggregated non-verbal metrics posted by the client after an interview.
///
/// The metric shape is client-defined (per-label percentages plus the raw
/// state counts that produced them), so it is carried opaquely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FacialMetrics {
    #[serde(rename = "nonVerbalMetrics")]
    pub non_verbal_metrics: serde_json::Value,
}
