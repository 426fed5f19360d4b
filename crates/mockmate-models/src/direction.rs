//! Discrete gaze, head, and mouth labels.
//!
//! Wire values match what the interview client renders verbatim, so the
//! serde renames are part of the protocol.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Classified eye-gaze direction.
///
/// There is deliberately no centered variant: an in-threshold gaze reports
/// `LookingUp`. Clients aggregate on these exact strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum EyeDirection {
    #[serde(rename = "Looking Left")]
    LookingLeft,
    #[serde(rename = "Looking Right")]
    LookingRight,
    #[serde(rename = "Looking Up")]
    LookingUp,
    #[serde(rename = "Looking Down")]
    LookingDown,
}

impl EyeDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            EyeDirection::LookingLeft => "Looking Left",
            EyeDirection::LookingRight => "Looking Right",
            EyeDirection::LookingUp => "Looking Up",
            EyeDirection::LookingDown => "Looking Down",
        }
    }
}

impl std::fmt::Display for EyeDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Classified head orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum HeadDirection {
    #[serde(rename = "Looking Left")]
    LookingLeft,
    #[serde(rename = "Looking Right")]
    LookingRight,
    #[serde(rename = "Looking Up")]
    LookingUp,
    #[serde(rename = "Looking Down")]
    LookingDown,
    Center,
    /// Pose solver failed for this frame; degrades only this field.
    #[serde(rename = "error")]
    Error,
}

impl HeadDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            HeadDirection::LookingLeft => "Looking Left",
            HeadDirection::LookingRight => "Looking Right",
            HeadDirection::LookingUp => "Looking Up",
            HeadDirection::LookingDown => "Looking Down",
            HeadDirection::Center => "Center",
            HeadDirection::Error => "error",
        }
    }
}

impl std::fmt::Display for HeadDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Mouth activity derived from the smoothed opening percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum MouthState {
    Speaking,
    Silent,
}

impl MouthState {
    pub fn as_str(&self) -> &'static str {
        match self {
            MouthState::Speaking => "Speaking",
            MouthState::Silent => "Silent",
        }
    }
}

impl std::fmt::Display for MouthState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eye_direction_wire_values() {
        let json = serde_json::to_string(&EyeDirection::LookingLeft).unwrap();
        assert_eq!(json, "\"Looking Left\"");
        let parsed: EyeDirection = serde_json::from_str("\"Looking Right\"").unwrap();
        assert_eq!(parsed, EyeDirection::LookingRight);
    }

    #[test]
    fn test_head_direction_error_label_is_lowercase() {
        let json = serde_json::to_string(&HeadDirection::Error).unwrap();
        assert_eq!(json, "\"error\"");
        assert_eq!(HeadDirection::Center.as_str(), "Center");
    }

    #[test]
    fn test_mouth_state_round_trip() {
        let json = serde_json::to_string(&MouthState::Speaking).unwrap();
        assert_eq!(json, "\"Speaking\"");
        let parsed: MouthState = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, MouthState::Speaking);
    }
}
