//! Answer keypoint detection.
//!
//! Partitions a question's keypoints into detected and missing against the
//! candidate's transcribed answer, combining verbatim matching with a
//! lexical similarity score. The scored record feeds the grading prompt.

pub mod keypoints;
pub mod similarity;

pub use keypoints::{score_answer, SIMILARITY_THRESHOLD};
