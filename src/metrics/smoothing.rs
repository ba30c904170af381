//! Power and stroke-rate smoothing.
//!
//! T019: Implement fixed-divisor trailing average
//! T020: Implement rolling average for live display

use std::collections::VecDeque;

/// Trailing moving average over a full series, fixed-divisor policy.
///
/// `smoothed[i]` is the sum of the current sample and up to `kernel - 1`
/// preceding samples, divided by `kernel` regardless of how many samples
/// were actually available. The first `kernel - 1` values are therefore
/// attenuated (`V * min(i+1, kernel) / kernel` for a constant input V).
/// This matches the behaviour of the recorded-session analyser this crate
/// replaces, so historic sessions re-plot identically.
///
/// A kernel of 1 is the identity transform. Output length always equals
/// input length.
pub fn trailing_average(raw: &[f64], kernel: usize) -> Vec<f64> {
    let kernel = kernel.max(1);
    let mut smoothed = Vec::with_capacity(raw.len());
    let mut sum = 0.0;

    for (i, value) in raw.iter().enumerate() {
        sum += value;
        if i >= kernel {
            sum -= raw[i - kernel];
        }
        smoothed.push(sum / kernel as f64);
    }

    smoothed
}

/// Rolling average calculator for live display smoothing.
///
/// Holds the last `window_size` values in an explicit ring and keeps a
/// running sum. Unlike [`trailing_average`] this divides by the number of
/// samples actually held; a live gauge should not read artificially low
/// during the first few strokes.
#[derive(Debug, Clone)]
pub struct RollingAverage {
    /// Buffer of recent values
    buffer: VecDeque<f64>,
    /// Window size in samples
    window_size: usize,
    /// Running sum for efficient calculation
    sum: f64,
}

impl RollingAverage {
    /// Create a new rolling average with the given window size.
    pub fn new(window_size: usize) -> Self {
        Self {
            buffer: VecDeque::with_capacity(window_size),
            window_size: window_size.max(1),
            sum: 0.0,
        }
    }

    /// Add a new value and return the current average.
    pub fn add(&mut self, value: f64) -> f64 {
        self.buffer.push_back(value);
        self.sum += value;

        if self.buffer.len() > self.window_size {
            if let Some(old) = self.buffer.pop_front() {
                self.sum -= old;
            }
        }

        self.sum / self.buffer.len() as f64
    }

    /// Get the current average without adding a value.
    pub fn average(&self) -> Option<f64> {
        if self.buffer.is_empty() {
            None
        } else {
            Some(self.sum / self.buffer.len() as f64)
        }
    }

    /// Check if the buffer holds a full window of samples.
    pub fn is_full(&self) -> bool {
        self.buffer.len() >= self.window_size
    }

    /// Get the number of samples in the buffer.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Check if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Reset the rolling average.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.sum = 0.0;
    }
}
