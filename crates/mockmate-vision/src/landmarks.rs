//! Face mesh landmark frame and the index contract used by the analyzers.
//!
//! Landmarks arrive as normalized coordinates in `[0, 1]` relative to the
//! source frame, 478 points per face (468 mesh points plus 10 iris points).
//!
//! # Landmark Layout (478-point face mesh)
//!
//! - 33 / 133: right eye outer / inner corner
//! - 362 / 263: left eye outer / inner corner
//! - 468: right iris center
//! - 473: left iris center
//! - 159 / 145: left eye upper / lower lid
//! - 61 / 291: mouth corners
//! - 1: nose tip, 199: chin (used for head pose)

use crate::error::{VisionError, VisionResult};

/// Number of points produced by the iris-refined face mesh model.
pub const MESH_LANDMARK_COUNT: usize = 478;

/// Right eye corners (subject's right, image left).
pub const RIGHT_EYE_OUTER: usize = 33;
pub const RIGHT_EYE_INNER: usize = 133;

/// Left eye corners.
pub const LEFT_EYE_OUTER: usize = 362;
pub const LEFT_EYE_INNER: usize = 263;

/// Iris centers.
pub const RIGHT_IRIS: usize = 468;
pub const LEFT_IRIS: usize = 473;

/// Left eye lids, used for the vertical gaze ratio.
pub const LEFT_EYE_UPPER_LID: usize = 159;
pub const LEFT_EYE_LOWER_LID: usize = 145;

/// Mouth corners.
pub const MOUTH_CORNER_LEFT: usize = 61;
pub const MOUTH_CORNER_RIGHT: usize = 291;

/// Upper lip contour points.
pub const UPPER_LIP: &[usize] = &[
    185, 40, 39, 37, 0, 267, 269, 270, 409, 191, 80, 81, 82, 13, 312, 311, 310, 415, 308,
];

/// Lower lip contour points (includes the mouth corners).
pub const LOWER_LIP: &[usize] = &[
    61, 146, 91, 181, 84, 17, 314, 405, 321, 375, 291, 78, 95, 88, 178, 87, 14, 317, 402, 318,
    324,
];

/// Reference points for head pose estimation: right eye outer corner,
/// left eye inner corner, nose tip, mouth corners, chin.
pub const HEAD_POSE: &[usize] = &[33, 263, 1, 61, 291, 199];

/// A single face mesh point in normalized coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Landmark {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// One detected face's landmarks for a single frame.
#[derive(Debug, Clone)]
pub struct LandmarkFrame {
    points: Vec<Landmark>,
}

impl LandmarkFrame {
    /// Create a frame from a vector of points.
    pub fn new(points: Vec<Landmark>) -> Self {
        Self { points }
    }

    /// Number of points in the frame.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the frame holds no points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Get a landmark by mesh index.
    pub fn get(&self, index: usize) -> VisionResult<&Landmark> {
        self.points
            .get(index)
            .ok_or_else(|| VisionError::missing_landmark(index, self.points.len()))
    }

    /// Get a landmark's position in pixel coordinates for the given
    /// frame dimensions.
    pub fn pixel(&self, index: usize, width: u32, height: u32) -> VisionResult<(f64, f64)> {
        let point = self.get(index)?;
        Ok((point.x * width as f64, point.y * height as f64))
    }
}
