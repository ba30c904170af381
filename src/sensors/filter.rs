//! Raw revolution-period filtering.
//!
//! T008: Implement period validation (sensor glitch rejection)

use crate::sensors::types::RevolutionSample;

/// Filter for raw revolution periods from the flywheel sensor.
///
/// The sensor switch occasionally bounces or misses an edge, producing
/// zero or implausible periods. Everything the filter passes is a strictly
/// positive period within the configured bounds, which the energy
/// conversion and segmenter rely on.
#[derive(Debug, Clone)]
pub struct PeriodFilter {
    /// Minimum plausible revolution period in microseconds
    min_period_us: u32,
    /// Maximum plausible revolution period in microseconds
    max_period_us: u32,
}

impl PeriodFilter {
    /// Create a filter with default bounds.
    ///
    /// The defaults pass anything between 1 ms (60,000 rpm, far beyond any
    /// flywheel) and 10 s (6 rpm, effectively stationary).
    pub fn new() -> Self {
        Self {
            min_period_us: 1_000,
            max_period_us: 10_000_000,
        }
    }

    /// Create a filter with explicit period bounds in microseconds.
    pub fn with_bounds(min_period_us: u32, max_period_us: u32) -> Self {
        Self {
            min_period_us,
            max_period_us,
        }
    }

    /// Check whether a raw period is plausible.
    pub fn is_valid(&self, period_us: u32) -> bool {
        period_us >= self.min_period_us && period_us <= self.max_period_us
    }

    /// Filter a revolution sample.
    ///
    /// Returns `None` if the sample should be discarded (switch bounce or
    /// missed edge), `Some(sample)` if it is valid.
    pub fn filter(&self, sample: RevolutionSample) -> Option<RevolutionSample> {
        if self.is_valid(sample.period_us) {
            Some(sample)
        } else {
            tracing::trace!(
                period_us = sample.period_us,
                timestamp = sample.timestamp_secs,
                "dropping implausible revolution period"
            );
            None
        }
    }
}

impl Default for PeriodFilter {
    fn default() -> Self {
        Self::new()
    }
}
