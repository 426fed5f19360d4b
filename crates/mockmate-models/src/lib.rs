//! Shared data models for MockMate backend.
//!
//! This crate provides Serde-serializable types for:
//! - Gaze/head/mouth direction labels
//! - Per-frame analysis replies sent over the WebSocket stream
//! - Interview question records and difficulty levels
//! - Answer-feedback request/response schemas

pub mod direction;
pub mod feedback;
pub mod frame;
pub mod question;

// Re-export common types
pub use direction::{EyeDirection, HeadDirection, MouthState};
pub use feedback::{AnswerSubmission, FacialMetrics, ScoredAnswer};
pub use frame::{Classification, FrameReply};
pub use question::{Question, QuestionLevel, QuestionLevelError};
