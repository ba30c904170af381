//! Batch analysis of a recorded session.
//!
//! T023: Implement full-series power/stroke-rate assembly
//! T024: Implement SessionSummary aggregation
//!
//! Mirrors the live pipeline over a complete in-memory recording: filter
//! raw revolutions, convert to energy, segment into strokes, replicate
//! each stroke's power and rate across the samples it spans, then smooth.

use crate::config::{MachineProfile, StrokeRateUnit};
use crate::metrics::error::{AnalysisError, AnalysisResult};
use crate::metrics::segmenter::{Stroke, StrokeSegmenter};
use crate::metrics::smoothing::trailing_average;
use crate::sensors::filter::PeriodFilter;
use crate::sensors::types::{EnergySample, RevolutionSample};
use serde::{Deserialize, Serialize};

/// Per-sample output series of a segmented session.
///
/// All four vectors have the same length as the (filtered) input
/// sequence. Power and rate are step functions: every sample within a
/// stroke carries that stroke's single aggregate value.
#[derive(Debug, Clone, Default)]
pub struct SegmentedSeries {
    /// Raw per-sample power in watts
    pub power: Vec<f64>,
    /// Raw per-sample stroke rate
    pub stroke_rate: Vec<f64>,
    /// The completed strokes, in order
    pub strokes: Vec<Stroke>,
}

/// Complete analysis of one recorded session.
#[derive(Debug, Clone, Default)]
pub struct SessionAnalysis {
    /// Timestamps of the retained samples in seconds
    pub timestamps: Vec<f64>,
    /// Rotational energy per retained sample in joules
    pub energy: Vec<f64>,
    /// Flywheel speed per retained sample in rpm
    pub rpm: Vec<f64>,
    /// Raw per-sample power in watts
    pub power: Vec<f64>,
    /// Raw per-sample stroke rate
    pub stroke_rate: Vec<f64>,
    /// Smoothed per-sample power in watts
    pub smoothed_power: Vec<f64>,
    /// Smoothed per-sample stroke rate
    pub smoothed_stroke_rate: Vec<f64>,
    /// The completed strokes, in order
    pub strokes: Vec<Stroke>,
    /// Whole-session aggregates
    pub summary: SessionSummary,
}

/// Whole-session aggregates in the style of an activity file footer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionSummary {
    /// Session duration in seconds (first to last retained sample)
    pub elapsed_secs: f64,
    /// Number of retained flywheel revolutions
    pub revolutions: u32,
    /// Distance under the machine's per-revolution model, in metres
    pub distance_m: f64,
    /// Average speed in km/h
    pub avg_speed_kmh: f64,
    /// Maximum speed in km/h
    pub max_speed_kmh: f64,
    /// Mean of the raw power series in watts
    pub avg_power_watts: f64,
    /// Maximum per-stroke power in watts
    pub max_power_watts: f64,
    /// Number of completed strokes
    pub stroke_count: u32,
    /// Crude calorie estimate (1000 kcal per hour of session time)
    pub calories: u32,
}

/// Segment a pre-converted energy sequence into per-sample power and
/// stroke-rate series.
///
/// Boundary policy, in order of application:
/// - negative or non-monotonic timestamps are rejected;
/// - samples before the first detected minimum are backfilled with zero
///   (no stroke can be estimated there);
/// - each completed stroke's power and rate are replicated over
///   `[start_index, end_index)`;
/// - the span of a dropped degenerate stroke (tied timestamps) keeps the
///   previous stroke's power and rate rather than dipping to zero;
/// - trailing samples after the last closed stroke keep the last computed
///   power and rate, assuming the partial stroke in progress continues at
///   the observed effort;
/// - a sequence too short to close a single stroke yields all zeros of
///   matching length, which is a valid "no strokes yet" result, not an
///   error.
pub fn segment_series(
    samples: &[EnergySample],
    rate_unit: StrokeRateUnit,
) -> AnalysisResult<SegmentedSeries> {
    validate_timestamps(samples.iter().map(|s| s.timestamp_secs))?;

    let mut segmenter = StrokeSegmenter::new(rate_unit);
    let mut series = SegmentedSeries {
        power: vec![0.0; samples.len()],
        stroke_rate: vec![0.0; samples.len()],
        strokes: Vec::new(),
    };

    for &sample in samples {
        if let Some(stroke) = segmenter.push(sample) {
            // a degenerate stroke dropped in between leaves a gap before
            // this stroke's span; carry the previous values over it
            if let Some(prev) = series.strokes.last().copied() {
                for i in prev.end_index..stroke.start_index {
                    series.power[i] = prev.power_watts;
                    series.stroke_rate[i] = prev.rate;
                }
            }
            for i in stroke.start_index..stroke.end_index {
                series.power[i] = stroke.power_watts;
                series.stroke_rate[i] = stroke.rate;
            }
            series.strokes.push(stroke);
        }
    }

    // an unfinished stroke at the end of the recording continues at the
    // last observed power rather than dropping to zero
    if let Some(last) = series.strokes.last() {
        for i in last.end_index..samples.len() {
            series.power[i] = last.power_watts;
            series.stroke_rate[i] = last.rate;
        }
    }

    Ok(series)
}

/// Analyse a complete recorded session of raw revolution samples.
///
/// Implausible periods are dropped by the machine's [`PeriodFilter`]
/// before any further processing, exactly as the live pipeline does; all
/// output series are indexed by the retained samples.
pub fn analyze_session(
    samples: &[RevolutionSample],
    profile: &MachineProfile,
) -> AnalysisResult<SessionAnalysis> {
    let filter = PeriodFilter::with_bounds(profile.min_period_us, profile.max_period_us);
    let retained: Vec<RevolutionSample> = samples
        .iter()
        .filter_map(|&s| filter.filter(s))
        .collect();

    let energy_samples: Vec<EnergySample> = retained
        .iter()
        .map(|s| profile.flywheel.energy_sample(s))
        .collect();

    let series = segment_series(&energy_samples, profile.rate_unit)?;
    let smoothed_power = trailing_average(&series.power, profile.smoothing_kernel);
    let smoothed_stroke_rate = trailing_average(&series.stroke_rate, profile.smoothing_kernel);

    let summary = summarize(&retained, &series, profile);
    tracing::info!(
        revolutions = summary.revolutions,
        strokes = summary.stroke_count,
        elapsed_secs = summary.elapsed_secs,
        avg_power_watts = summary.avg_power_watts,
        "session analysed"
    );

    Ok(SessionAnalysis {
        timestamps: retained.iter().map(|s| s.timestamp_secs).collect(),
        energy: energy_samples.iter().map(|s| s.energy_joules).collect(),
        rpm: retained.iter().map(|s| s.rpm()).collect(),
        power: series.power,
        stroke_rate: series.stroke_rate,
        smoothed_power,
        smoothed_stroke_rate,
        strokes: series.strokes,
        summary,
    })
}

fn summarize(
    retained: &[RevolutionSample],
    series: &SegmentedSeries,
    profile: &MachineProfile,
) -> SessionSummary {
    let revolutions = retained.len() as u32;
    let elapsed_secs = match (retained.first(), retained.last()) {
        (Some(first), Some(last)) => last.timestamp_secs - first.timestamp_secs,
        _ => 0.0,
    };
    let distance_m = f64::from(revolutions) * profile.distance_per_rev_m;
    let avg_speed_kmh = if elapsed_secs > 0.0 {
        distance_m / elapsed_secs * 3.6
    } else {
        0.0
    };
    let max_speed_kmh = retained
        .iter()
        .map(|s| profile.speed_kmh(s.rpm()))
        .fold(0.0, f64::max);
    let avg_power_watts = if series.power.is_empty() {
        0.0
    } else {
        series.power.iter().sum::<f64>() / series.power.len() as f64
    };
    let max_power_watts = series
        .strokes
        .iter()
        .map(|s| s.power_watts)
        .fold(0.0, f64::max);

    SessionSummary {
        elapsed_secs,
        revolutions,
        distance_m,
        avg_speed_kmh,
        max_speed_kmh,
        avg_power_watts,
        max_power_watts,
        stroke_count: series.strokes.len() as u32,
        calories: (1000.0 * elapsed_secs / 3600.0) as u32,
    }
}

fn validate_timestamps(timestamps: impl Iterator<Item = f64>) -> AnalysisResult<()> {
    let mut prev = f64::NEG_INFINITY;
    for (index, t) in timestamps.enumerate() {
        if t < 0.0 {
            return Err(AnalysisError::NegativeTimestamp { index });
        }
        if t < prev {
            return Err(AnalysisError::NonMonotonicTimestamp { index });
        }
        prev = t;
    }
    Ok(())
}
