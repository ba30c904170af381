//! Sample types for flywheel revolution measurements.
//!
//! T005: Define RevolutionSample, EnergySample structs

use serde::{Deserialize, Serialize};

/// A single timed flywheel revolution from the cadence sensor.
///
/// The stock ergo sensor is a normally open switch on the flywheel hub,
/// timed by a 1 MHz counter, so periods arrive as integer microseconds.
/// Timestamps are seconds since session start or seconds since midnight;
/// the analysis only requires them to be non-decreasing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RevolutionSample {
    /// Timestamp of the revolution in seconds
    pub timestamp_secs: f64,
    /// Revolution period in microseconds
    pub period_us: u32,
}

impl RevolutionSample {
    /// Create a sample from a timestamp and a microsecond period.
    pub fn new(timestamp_secs: f64, period_us: u32) -> Self {
        Self {
            timestamp_secs,
            period_us,
        }
    }

    /// Revolution period in seconds.
    pub fn period_secs(&self) -> f64 {
        self.period_us as f64 * 1e-6
    }

    /// Instantaneous flywheel speed in revolutions per minute.
    ///
    /// Returns 0 for a zero period rather than dividing by it; zero
    /// periods are sensor glitches and are dropped by the period filter
    /// before reaching the analysis.
    pub fn rpm(&self) -> f64 {
        if self.period_us == 0 {
            0.0
        } else {
            60.0 / self.period_secs()
        }
    }
}

/// A revolution converted to rotational kinetic energy.
///
/// Input to the stroke segmenter. Produced by
/// [`Flywheel::energy_sample`](crate::flywheel::Flywheel::energy_sample).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnergySample {
    /// Timestamp of the revolution in seconds
    pub timestamp_secs: f64,
    /// Rotational kinetic energy of the flywheel in joules
    pub energy_joules: f64,
}

impl EnergySample {
    /// Create an energy sample.
    pub fn new(timestamp_secs: f64, energy_joules: f64) -> Self {
        Self {
            timestamp_secs,
            energy_joules,
        }
    }
}
