//! Threshold classification of smoothed signals into discrete labels.
//!
//! All three classifiers are pure functions evaluated in a fixed priority
//! order, so identical inputs always produce identical labels.

use mockmate_models::{EyeDirection, HeadDirection, MouthState};

use crate::calibration::GazeCenter;

/// Horizontal gaze deviation from center that counts as looking aside.
pub const HORIZONTAL_THRESHOLD: f64 = 0.08;

/// Vertical gaze deviation from center that counts as looking down.
pub const VERTICAL_THRESHOLD: f64 = 0.06;

/// Smoothed mouth-opening percentage above which the user is speaking.
pub const SPEAKING_THRESHOLD: f64 = 20.0;

/// Head rotation in degrees beyond which the head is turned.
pub const HEAD_ANGLE_THRESHOLD: f64 = 10.0;

/// Classify gaze from smoothed ratios against the calibrated center.
///
/// Horizontal deviation wins over vertical; an in-threshold gaze reports
/// "Looking Up" because the label set carries no centered state.
pub fn classify_eye_direction(
    smoothed_horizontal: f64,
    smoothed_vertical: f64,
    center: GazeCenter,
) -> EyeDirection {
    let dh = smoothed_horizontal - center.horizontal;
    let dv = smoothed_vertical - center.vertical;

    if dh < -HORIZONTAL_THRESHOLD {
        EyeDirection::LookingLeft
    } else if dh > HORIZONTAL_THRESHOLD {
        EyeDirection::LookingRight
    } else if dv > VERTICAL_THRESHOLD {
        EyeDirection::LookingDown
    } else {
        EyeDirection::LookingUp
    }
}

/// Classify head orientation from Euler angles in degrees.
///
/// Yaw dominates pitch when both exceed their thresholds.
pub fn classify_head_direction(pitch: f64, yaw: f64) -> HeadDirection {
    if yaw < -HEAD_ANGLE_THRESHOLD {
        HeadDirection::LookingLeft
    } else if yaw > HEAD_ANGLE_THRESHOLD {
        HeadDirection::LookingRight
    } else if pitch < -HEAD_ANGLE_THRESHOLD {
        HeadDirection::LookingDown
    } else if pitch > HEAD_ANGLE_THRESHOLD {
        HeadDirection::LookingUp
    } else {
        HeadDirection::Center
    }
}

/// Classify speech from the smoothed mouth-opening percentage.
pub fn classify_mouth_state(smoothed_mouth_percent: f64) -> MouthState {
    if smoothed_mouth_percent > SPEAKING_THRESHOLD {
        MouthState::Speaking
    } else {
        MouthState::Silent
    }
}
