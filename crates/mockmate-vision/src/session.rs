//! Per-connection analysis session.
//!
//! A session owns everything that must survive between frames on one
//! stream: the smoothing windows, the calibration state, and the pose
//! solver. Sessions are single-owner; the protocol layer holds each one
//! exclusively for its connection's lifetime and drops it on disconnect.

use std::time::Instant;

use tracing::{debug, info};
use uuid::Uuid;

use mockmate_models::{Classification, FrameReply, HeadDirection};

use crate::calibration::{CalibrationUpdate, Calibrator};
use crate::classifier::{classify_eye_direction, classify_head_direction, classify_mouth_state};
use crate::geometry::{self, round2};
use crate::landmarks::LandmarkFrame;
use crate::pose::{IterativePnpSolver, PoseSolver};
use crate::smoothing::SignalSmoother;

/// Mutable analysis state for one connection.
pub struct Session {
    id: Uuid,
    smoother: SignalSmoother,
    calibrator: Calibrator,
    solver: Box<dyn PoseSolver>,
}

impl Session {
    /// Create a session with the default iterative pose solver; the
    /// calibration clock starts now.
    pub fn new() -> Self {
        Self::with_parts(Box::new(IterativePnpSolver::default()), Instant::now())
    }

    /// Create a session with an explicit solver and calibration start.
    pub fn with_parts(solver: Box<dyn PoseSolver>, calibration_start: Instant) -> Self {
        Self {
            id: Uuid::new_v4(),
            smoother: SignalSmoother::new(),
            calibrator: Calibrator::with_start(calibration_start),
            solver,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Whether the gaze baseline is still being collected.
    pub fn is_calibrating(&self) -> bool {
        self.calibrator.is_calibrating()
    }

    /// Analyze one landmark frame and produce the reply to send.
    ///
    /// `now` drives the calibration clock; passing it in keeps the state
    /// machine deterministic under test.
    pub fn process(
        &mut self,
        frame: &LandmarkFrame,
        width: u32,
        height: u32,
        now: Instant,
    ) -> FrameReply {
        // Measure before mutating so a malformed frame leaves the
        // smoothing windows and calibration samples untouched.
        let ratios = match geometry::eye_ratios(frame, width, height) {
            Ok(ratios) => ratios,
            Err(e) => {
                debug!(session = %self.id, "Eye geometry failed: {}", e);
                return FrameReply::analysis_error(e.to_string());
            }
        };
        let mouth = match geometry::mouth_opening(frame, width, height) {
            Ok(mouth) => mouth,
            Err(e) => {
                debug!(session = %self.id, "Mouth geometry failed: {}", e);
                return FrameReply::analysis_error(e.to_string());
            }
        };

        let smoothed = self
            .smoother
            .push(ratios.horizontal, ratios.vertical, mouth.percent);

        // Raw (unsmoothed) ratios feed the baseline. The frame that
        // completes calibration falls through and gets classified.
        let center = match self.calibrator.center() {
            Some(center) => center,
            None => match self.calibrator.record(ratios.horizontal, ratios.vertical, now) {
                CalibrationUpdate::InProgress { progress } => {
                    return FrameReply::calibrating(progress);
                }
                CalibrationUpdate::Completed(center) => {
                    info!(
                        session = %self.id,
                        horizontal = center.horizontal,
                        vertical = center.vertical,
                        "Gaze calibration complete"
                    );
                    center
                }
            },
        };

        let eye_direction = classify_eye_direction(smoothed.horizontal, smoothed.vertical, center);

        // Head pose failure degrades this field only; the reply still
        // carries the rest of the classification.
        let head_direction =
            match geometry::head_pose_angles(frame, width, height, self.solver.as_ref()) {
                Ok(angles) => classify_head_direction(angles.pitch, angles.yaw),
                Err(e) => {
                    debug!(session = %self.id, "Head pose solve failed: {}", e);
                    HeadDirection::Error
                }
            };

        let mouth_state = classify_mouth_state(smoothed.mouth_percent);

        Classification {
            eye_direction,
            head_direction,
            smoothed_horizontal: smoothed.horizontal,
            smoothed_vertical: smoothed.vertical,
            center_horizontal: center.horizontal,
            center_vertical: center.vertical,
            mouth_opening_percent: round2(smoothed.mouth_percent),
            mouth_state,
        }
        .into()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
