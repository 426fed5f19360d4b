//! Per-frame analysis replies.
//!
//! Exactly one of these is sent for every inbound frame on the analysis
//! stream. Field names are camelCase on the wire; the interview client
//! switches on `eyeDirection` / `error` to pick a rendering path.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::direction::{EyeDirection, HeadDirection, MouthState};

/// Full classification payload, sent once the session is calibrated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Classification {
    #[serde(rename = "eyeDirection")]
    pub eye_direction: EyeDirection,
    #[serde(rename = "headDirection")]
    pub head_direction: HeadDirection,
    #[serde(rename = "smoothedHorizontal")]
    pub smoothed_horizontal: f64,
    #[serde(rename = "smoothedVertical")]
    pub smoothed_vertical: f64,
    #[serde(rename = "centerHorizontal")]
    pub center_horizontal: f64,
    #[serde(rename = "centerVertical")]
    pub center_vertical: f64,
    #[serde(rename = "mouthOpeningPercent")]
    pub mouth_opening_percent: f64,
    #[serde(rename = "mouthState")]
    pub mouth_state: MouthState,
}

/// One reply per observation on the analysis stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum FrameReply {
    /// Transport frame could not be decoded into an image.
    BadImage { error: String, detail: String },

    /// Baseline not established yet; `progress` is in [0, 1].
    Calibrating {
        #[serde(rename = "eyeDirection")]
        eye_direction: String,
        #[serde(rename = "headDirection")]
        head_direction: String,
        progress: f64,
    },

    /// Detector found no face in the frame. Not an error.
    NoFace {
        #[serde(rename = "eyeDirection")]
        eye_direction: String,
        #[serde(rename = "headDirection")]
        head_direction: String,
    },

    /// Landmark geometry could not be computed for this frame.
    AnalysisError {
        #[serde(rename = "eyeDirection")]
        eye_direction: String,
        #[serde(rename = "headDirection")]
        head_direction: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        detail: Option<String>,
    },

    /// Calibrated classification result.
    Classification(Classification),
}

impl FrameReply {
    /// Create a decode-failure reply.
    pub fn bad_image(detail: impl Into<String>) -> Self {
        FrameReply::BadImage {
            error: "bad_image".to_string(),
            detail: detail.into(),
        }
    }

    /// Create a calibration-progress reply. Progress is clamped to [0, 1].
    pub fn calibrating(progress: f64) -> Self {
        FrameReply::Calibrating {
            eye_direction: "Calibrating".to_string(),
            head_direction: "Calibrating".to_string(),
            progress: progress.clamp(0.0, 1.0),
        }
    }

    /// Create a no-face reply.
    pub fn no_face() -> Self {
        FrameReply::NoFace {
            eye_direction: "No face detected".to_string(),
            head_direction: "No face detected".to_string(),
        }
    }

    /// Create an analysis-error reply.
    pub fn analysis_error(detail: impl Into<String>) -> Self {
        FrameReply::AnalysisError {
            eye_direction: "error".to_string(),
            head_direction: "error".to_string(),
            detail: Some(detail.into()),
        }
    }
}

impl From<Classification> for FrameReply {
    fn from(classification: Classification) -> Self {
        FrameReply::Classification(classification)
    }
}
