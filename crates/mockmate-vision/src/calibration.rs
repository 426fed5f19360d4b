//! Per-session gaze baseline calibration.
//!
//! A fresh session spends its first moments collecting raw eye ratios and
//! fixes their mean as the neutral center. Classification only runs against
//! that center, so it adapts to each user's camera placement and eye shape.

use std::mem;
use std::time::{Duration, Instant};

/// Wall-clock bound on the calibration phase.
pub const CALIBRATION_SECONDS: f64 = 3.0;

/// Sample-count bound, caps memory at high frame rates.
pub const MAX_CALIBRATION_SAMPLES: usize = 40;

/// The fixed neutral gaze established by calibration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GazeCenter {
    pub horizontal: f64,
    pub vertical: f64,
}

/// Outcome of feeding one observation to the calibrator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CalibrationUpdate {
    /// Still collecting; `progress` is the elapsed fraction of the
    /// calibration window.
    InProgress { progress: f64 },
    /// This observation completed calibration.
    Completed(GazeCenter),
}

/// Collects gaze samples until either bound is hit, then fixes the center.
///
/// The center is set exactly once; `record` must not be called after it
/// completes.
#[derive(Debug)]
pub struct Calibrator {
    started_at: Instant,
    samples: Vec<(f64, f64)>,
    center: Option<GazeCenter>,
}

impl Calibrator {
    pub fn new() -> Self {
        Self::with_start(Instant::now())
    }

    /// Start the calibration clock at an explicit instant.
    pub fn with_start(started_at: Instant) -> Self {
        Self {
            started_at,
            samples: Vec::with_capacity(MAX_CALIBRATION_SAMPLES),
            center: None,
        }
    }

    /// Whether the baseline is still being collected.
    pub fn is_calibrating(&self) -> bool {
        self.center.is_none()
    }

    /// The fixed center, once calibration has completed.
    pub fn center(&self) -> Option<GazeCenter> {
        self.center
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    /// Record one observation and report whether calibration finished.
    ///
    /// Completion occurs once the elapsed time reaches the wall-clock
    /// bound or this sample is the 40th, whichever happens first.
    pub fn record(&mut self, horizontal: f64, vertical: f64, now: Instant) -> CalibrationUpdate {
        self.samples.push((horizontal, vertical));

        let elapsed = now.duration_since(self.started_at);
        if elapsed >= Duration::from_secs_f64(CALIBRATION_SECONDS)
            || self.samples.len() >= MAX_CALIBRATION_SAMPLES
        {
            let samples = mem::take(&mut self.samples);
            let count = samples.len() as f64;
            let (sum_h, sum_v) = samples
                .iter()
                .fold((0.0, 0.0), |(h, v), (sh, sv)| (h + sh, v + sv));
            let center = GazeCenter {
                horizontal: sum_h / count,
                vertical: sum_v / count,
            };
            self.center = Some(center);
            CalibrationUpdate::Completed(center)
        } else {
            CalibrationUpdate::InProgress {
                progress: elapsed.as_secs_f64() / CALIBRATION_SECONDS,
            }
        }
    }
}

impl Default for Calibrator {
    fn default() -> Self {
        Self::new()
    }
}
