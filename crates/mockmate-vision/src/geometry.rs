//! Per-frame geometric measurements over a landmark frame.
//!
//! All ratios are computed in pixel space so they stay comparable across
//! frame sizes. Division guards use a small epsilon rather than failing,
//! matching how degenerate landmark placements are tolerated elsewhere.

use mockmate_models::MouthState;
use nalgebra::{Point2, Point3};

use crate::error::VisionResult;
use crate::landmarks::{
    LandmarkFrame, HEAD_POSE, LEFT_EYE_INNER, LEFT_EYE_LOWER_LID, LEFT_EYE_OUTER,
    LEFT_EYE_UPPER_LID, LEFT_IRIS, LOWER_LIP, MOUTH_CORNER_LEFT, MOUTH_CORNER_RIGHT,
    RIGHT_EYE_INNER, RIGHT_EYE_OUTER, RIGHT_IRIS, UPPER_LIP,
};
use crate::pose::{euler_from_rotation_vector, CameraIntrinsics, EulerAngles, PoseSolver};

/// Guard against division by zero in ratio denominators.
pub const EPSILON: f64 = 1e-6;

/// Raw per-frame mouth opening (percent of mouth width) above which the
/// unsmoothed measurement counts as speech.
pub const RAW_SPEAKING_THRESHOLD: f64 = 2.0;

/// Normalized gaze position within the eyes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EyeRatios {
    /// Iris offset from the outer corner, as a fraction of eye width,
    /// averaged over both eyes.
    pub horizontal: f64,
    /// Iris height between the left eye's lids, 0 at the upper lid.
    pub vertical: f64,
}

/// Mouth opening measurement for a single frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MouthOpening {
    /// Lip gap as a percentage of mouth width, rounded to two decimals.
    pub percent: f64,
    /// Classification of this frame's raw measurement.
    pub state: MouthState,
}

/// Compute the horizontal and vertical gaze ratios.
pub fn eye_ratios(frame: &LandmarkFrame, width: u32, height: u32) -> VisionResult<EyeRatios> {
    let left_outer = frame.pixel(LEFT_EYE_OUTER, width, height)?;
    let left_inner = frame.pixel(LEFT_EYE_INNER, width, height)?;
    let left_iris = frame.pixel(LEFT_IRIS, width, height)?;

    let right_outer = frame.pixel(RIGHT_EYE_OUTER, width, height)?;
    let right_inner = frame.pixel(RIGHT_EYE_INNER, width, height)?;
    let right_iris = frame.pixel(RIGHT_IRIS, width, height)?;

    let left_ratio =
        distance(left_iris, left_outer) / (distance(left_outer, left_inner) + EPSILON);
    let right_ratio =
        distance(right_iris, right_outer) / (distance(right_outer, right_inner) + EPSILON);

    let upper_lid = frame.pixel(LEFT_EYE_UPPER_LID, width, height)?;
    let lower_lid = frame.pixel(LEFT_EYE_LOWER_LID, width, height)?;
    let vertical = (left_iris.1 - upper_lid.1) / (lower_lid.1 - upper_lid.1 + EPSILON);

    Ok(EyeRatios {
        horizontal: (left_ratio + right_ratio) / 2.0,
        vertical,
    })
}

/// Measure the lip gap relative to mouth width.
pub fn mouth_opening(frame: &LandmarkFrame, width: u32, height: u32) -> VisionResult<MouthOpening> {
    let upper_mean = mean_point(frame, UPPER_LIP, width, height)?;
    let lower_mean = mean_point(frame, LOWER_LIP, width, height)?;
    let gap = (lower_mean.1 - upper_mean.1).max(0.0);

    let corner_left = frame.pixel(MOUTH_CORNER_LEFT, width, height)?;
    let corner_right = frame.pixel(MOUTH_CORNER_RIGHT, width, height)?;
    let mouth_width = distance(corner_left, corner_right) + EPSILON;

    let percent = round2(gap / mouth_width * 100.0);
    let state = if percent > RAW_SPEAKING_THRESHOLD {
        MouthState::Speaking
    } else {
        MouthState::Silent
    };

    Ok(MouthOpening { percent, state })
}

/// Solve for head orientation from the pose reference landmarks.
///
/// Object points pair each landmark's pixel position with its normalized
/// mesh depth; image points are the pixel positions alone.
pub fn head_pose_angles(
    frame: &LandmarkFrame,
    width: u32,
    height: u32,
    solver: &dyn PoseSolver,
) -> VisionResult<EulerAngles> {
    let mut object_points = Vec::with_capacity(HEAD_POSE.len());
    let mut image_points = Vec::with_capacity(HEAD_POSE.len());
    for &index in HEAD_POSE {
        let (px, py) = frame.pixel(index, width, height)?;
        let depth = frame.get(index)?.z;
        object_points.push(Point3::new(px, py, depth));
        image_points.push(Point2::new(px, py));
    }

    let intrinsics = CameraIntrinsics::from_frame(width, height);
    let rotation_vector = solver.solve(&object_points, &image_points, &intrinsics)?;
    Ok(euler_from_rotation_vector(&rotation_vector))
}

/// Euclidean distance between two pixel positions.
fn distance(a: (f64, f64), b: (f64, f64)) -> f64 {
    ((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)).sqrt()
}

/// Mean pixel position over a set of landmark indices.
fn mean_point(
    frame: &LandmarkFrame,
    indices: &[usize],
    width: u32,
    height: u32,
) -> VisionResult<(f64, f64)> {
    let mut sum_x = 0.0;
    let mut sum_y = 0.0;
    for &index in indices {
        let (px, py) = frame.pixel(index, width, height)?;
        sum_x += px;
        sum_y += py;
    }
    let count = indices.len() as f64;
    Ok((sum_x / count, sum_y / count))
}

/// Round to two decimal places.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
