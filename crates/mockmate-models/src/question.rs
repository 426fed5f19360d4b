//! Interview question records.
//!
//! Question banks are JSON documents keyed by technical domain, each mapping
//! a difficulty level to an array of these records. Field names are
//! snake_case on disk and on the wire, matching the dataset format.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A single interview question with its grading material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Question {
    pub question_id: u32,
    pub question_level: String,
    pub question: String,
    /// Keypoints that must appear in a correct answer; single words,
    /// no punctuation, per the dataset contract.
    pub keypoints: Vec<String>,
    /// Alternative phrasings of an acceptable answer.
    #[serde(default)]
    pub possible_answers: Vec<String>,
}

/// Question difficulty level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum QuestionLevel {
    Beginner,
    Intermediate,
    Advanced,
}

impl QuestionLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionLevel::Beginner => "beginner",
            QuestionLevel::Intermediate => "intermediate",
            QuestionLevel::Advanced => "advanced",
        }
    }
}

impl std::fmt::Display for QuestionLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error for unrecognized level names in query parameters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("There is no such question level!!")]
pub struct QuestionLevelError(pub String);

impl std::str::FromStr for QuestionLevel {
    type Err = QuestionLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "beginner" => Ok(QuestionLevel::Beginner),
            "intermediate" => Ok(QuestionLevel::Intermediate),
            "advanced" => Ok(QuestionLevel::Advanced),
            other => Err(QuestionLevelError(other.to_string())),
        }
    }
}
