#![deny(unreachable_patterns)]
//! Facial-signal analysis for interview practice sessions.
//!
//! This crate provides:
//! - Data-URL frame decoding into RGB pixels
//! - Face mesh landmark detection (ONNX Runtime, `face-detection` feature)
//! - Gaze, mouth, and head-pose geometry over landmark frames
//! - Per-session calibration, smoothing, and direction classification

pub mod calibration;
pub mod classifier;
pub mod decode;
pub mod detector;
pub mod error;
pub mod geometry;
pub mod landmarks;
pub mod pose;
pub mod session;
pub mod smoothing;

pub use calibration::{CalibrationUpdate, Calibrator, GazeCenter};
pub use decode::decode_frame;
pub use detector::{default_detector, DisabledLandmarkDetector, LandmarkDetector};
pub use error::{VisionError, VisionResult};
pub use geometry::{eye_ratios, head_pose_angles, mouth_opening, EyeRatios, MouthOpening};
pub use landmarks::{Landmark, LandmarkFrame, MESH_LANDMARK_COUNT};
pub use pose::{CameraIntrinsics, EulerAngles, IterativePnpSolver, PoseSolver};
pub use session::Session;
pub use smoothing::{SignalSmoother, SmoothedSignals, SmoothingBuffer};

#[cfg(feature = "face-detection")]
pub use detector::OrtFaceMesh;
