//! Rolling-mean smoothing of per-frame gaze and mouth signals.
//!
//! Raw per-frame measurements jitter with landmark noise; classification
//! runs on the mean of the most recent frames instead.

use std::collections::VecDeque;

/// Number of recent frames the rolling mean covers.
pub const HISTORY_LEN: usize = 8;

/// Fixed-capacity rolling window over a scalar signal.
#[derive(Debug, Clone)]
pub struct SmoothingBuffer {
    values: VecDeque<f64>,
    capacity: usize,
}

impl SmoothingBuffer {
    /// Create a buffer holding up to `capacity` recent values.
    pub fn new(capacity: usize) -> Self {
        Self {
            values: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Push a value, evicting the oldest when full.
    pub fn push(&mut self, value: f64) {
        if self.values.len() == self.capacity {
            self.values.pop_front();
        }
        self.values.push_back(value);
    }

    /// Mean of the buffered values, 0.0 when empty.
    pub fn mean(&self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        self.values.iter().sum::<f64>() / self.values.len() as f64
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Smoothed values for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmoothedSignals {
    pub horizontal: f64,
    pub vertical: f64,
    pub mouth_percent: f64,
}

/// Rolling smoother over the three per-frame signals.
#[derive(Debug, Clone)]
pub struct SignalSmoother {
    horizontal: SmoothingBuffer,
    vertical: SmoothingBuffer,
    mouth: SmoothingBuffer,
}

impl SignalSmoother {
    pub fn new() -> Self {
        Self {
            horizontal: SmoothingBuffer::new(HISTORY_LEN),
            vertical: SmoothingBuffer::new(HISTORY_LEN),
            mouth: SmoothingBuffer::new(HISTORY_LEN),
        }
    }

    /// Record one frame's raw measurements and return the new means.
    pub fn push(&mut self, horizontal: f64, vertical: f64, mouth_percent: f64) -> SmoothedSignals {
        self.horizontal.push(horizontal);
        self.vertical.push(vertical);
        self.mouth.push(mouth_percent);
        SmoothedSignals {
            horizontal: self.horizontal.mean(),
            vertical: self.vertical.mean(),
            mouth_percent: self.mouth.mean(),
        }
    }

    /// Frames recorded so far, capped at the window length.
    pub fn frames_buffered(&self) -> usize {
        self.horizontal.len()
    }
}

impl Default for SignalSmoother {
    fn default() -> Self {
        Self::new()
    }
}
