//! Error types for vision operations.

use thiserror::Error;

/// Result type for vision operations.
pub type VisionResult<T> = Result<T, VisionError>;

/// Errors that can occur during frame analysis.
#[derive(Debug, Error)]
pub enum VisionError {
    #[error("Image decode failed: {0}")]
    ImageDecode(String),

    #[error("Landmark index {index} out of range (frame has {count} points)")]
    MissingLandmark { index: usize, count: usize },

    #[error("Head pose solve failed: {0}")]
    PoseSolveFailed(String),

    #[error("Face detection failed: {0}")]
    DetectionFailed(String),

    #[error("Model not found: {0}")]
    ModelNotFound(String),
}

impl VisionError {
    /// Create an image decode error.
    pub fn image_decode(message: impl Into<String>) -> Self {
        Self::ImageDecode(message.into())
    }

    /// Create a missing landmark error.
    pub fn missing_landmark(index: usize, count: usize) -> Self {
        Self::MissingLandmark { index, count }
    }

    /// Create a pose solve error.
    pub fn pose_solve_failed(message: impl Into<String>) -> Self {
        Self::PoseSolveFailed(message.into())
    }

    /// Create a detection failure error.
    pub fn detection_failed(message: impl Into<String>) -> Self {
        Self::DetectionFailed(message.into())
    }

    /// Create a model not found error.
    pub fn model_not_found(path: impl Into<String>) -> Self {
        Self::ModelNotFound(path.into())
    }
}
