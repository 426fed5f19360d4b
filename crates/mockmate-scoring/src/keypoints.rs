//! Keypoint partitioning for a submitted answer.

use mockmate_models::{AnswerSubmission, ScoredAnswer};
use tracing::debug;

use crate::similarity::{keypoint_confidence, tokenize};

/// Combined similarity at or above which a keypoint counts as covered.
pub const SIMILARITY_THRESHOLD: f64 = 0.6;

/// Partition a submission's keypoints into detected and missing.
///
/// A keypoint is detected when it occurs verbatim in the lowercased
/// answer, or when its best window confidence reaches
/// [`SIMILARITY_THRESHOLD`]. A blank answer leaves every keypoint missing.
pub fn score_answer(submission: AnswerSubmission) -> ScoredAnswer {
    let AnswerSubmission {
        question_id,
        question_level,
        question,
        keypoints,
        possible_answers: _,
        user_answer,
    } = submission;

    if user_answer.trim().is_empty() {
        return ScoredAnswer {
            question_id,
            question_level,
            question,
            keypoints: keypoints.clone(),
            user_answer,
            detected_keypoints: Vec::new(),
            missing_keypoints: keypoints,
        };
    }

    let answer_lower = user_answer.to_lowercase();
    let answer_tokens = tokenize(&user_answer);

    let mut detected_keypoints = Vec::new();
    let mut missing_keypoints = Vec::new();
    for keypoint in &keypoints {
        if answer_lower.contains(&keypoint.to_lowercase()) {
            detected_keypoints.push(keypoint.clone());
            continue;
        }

        let confidence = keypoint_confidence(&answer_tokens, &tokenize(keypoint));
        debug!(keypoint = %keypoint, confidence, "keypoint similarity");
        if confidence >= SIMILARITY_THRESHOLD {
            detected_keypoints.push(keypoint.clone());
        } else {
            missing_keypoints.push(keypoint.clone());
        }
    }

    ScoredAnswer {
        question_id,
        question_level,
        question,
        keypoints,
        user_answer,
        detected_keypoints,
        missing_keypoints,
    }
}
