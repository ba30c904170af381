//! Stroke segmentation state machine.
//!
//! T015: Implement StrokeSegmenter three-state machine
//! T016: Implement per-stroke power and rate calculation
//!
//! A kayak stroke shows up in the energy trace as a rising flank (power
//! phase: the pull spins the flywheel up) followed by a falling flank
//! (setup phase: air resistance spins it down). The segmenter walks the
//! trace looking for the local-minimum → local-maximum → local-minimum
//! pattern and treats each minimum-to-minimum span as one stroke:
//!
//! ```text
//!                E2
//!                o. max
//!               /: `.
//!              / :   `.
//!             o  :     o.
//!            /   :       `.
//!           /    :<-tpower->.
//!          o     :           o.    o
//!         /      :             `. /
//!        /       :<---tsetup---->o min
//!     \ /        :               E3
//!  min o<-tpower>:
//!      E1
//! ```
//!
//! The energy put in by the athlete is the measured rise E2−E1 plus the
//! energy lost to fan drag during the pull. Drag loss is estimated from
//! the spin-down gradient (E2−E3)/tsetup extended over tpower:
//!
//! ```text
//! Ein = (E2−E1) + tpower·(E2−E3)/tsetup
//! Pin = Ein / (tpower + tsetup)
//! ```

use crate::config::StrokeRateUnit;
use crate::sensors::types::EnergySample;

/// What the segmenter is currently scanning for.
///
/// The machine starts in `Minimum`, then alternates between `Maximum` and
/// `NextMinimum` for the rest of the sequence. Exactly one local maximum
/// is recorded between two local minima by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SeekState {
    /// Hunting for the first local minimum (no stroke under way)
    #[default]
    Minimum,
    /// Inside the power phase, waiting for the energy to top out
    Maximum,
    /// Inside the setup phase, waiting for the closing minimum
    NextMinimum,
}

/// One completed stroke, bounded by two consecutive local energy minima.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    /// Estimated mean power input in watts
    pub power_watts: f64,
    /// Minimum-to-minimum stroke period in seconds
    pub period_secs: f64,
    /// Stroke rate in the segmenter's configured unit
    pub rate: f64,
    /// Sample index of the opening minimum
    pub start_index: usize,
    /// Sample index of the closing minimum (exclusive when replicating
    /// per-stroke values over the span; this index opens the next stroke)
    pub end_index: usize,
    /// Timestamp of the opening minimum (t1)
    pub start_secs: f64,
    /// Timestamp of the closing minimum (t3)
    pub end_secs: f64,
}

/// Streaming three-state stroke detector.
///
/// Feed energy samples in arrival order with [`push`](Self::push); a
/// [`Stroke`] is returned whenever a closing minimum is observed. State
/// between samples is O(1): the previous sample (one-step lookahead), the
/// provisional extrema, and the seek state. The same machine serves batch
/// analysis ([`session`](crate::metrics::session)) and live use.
#[derive(Debug, Clone)]
pub struct StrokeSegmenter {
    /// Stroke rate unit for emitted strokes
    rate_unit: StrokeRateUnit,
    /// Current seek state
    state: SeekState,
    /// Previously pushed sample, compared against the next arrival
    pending: Option<EnergySample>,
    /// Index of the pending sample within the pushed sequence
    index: usize,
    /// Provisional opening minimum (E1, t1)
    local_min: Option<(f64, f64)>,
    /// Provisional maximum (E2, t2)
    local_max: Option<(f64, f64)>,
    /// Index of the most recent minimum
    min_index: usize,
}

impl StrokeSegmenter {
    /// Create a segmenter emitting rates in the given unit.
    pub fn new(rate_unit: StrokeRateUnit) -> Self {
        Self {
            rate_unit,
            state: SeekState::default(),
            pending: None,
            index: 0,
            local_min: None,
            local_max: None,
            min_index: 0,
        }
    }

    /// Current seek state.
    pub fn state(&self) -> SeekState {
        self.state
    }

    /// Sample index of the most recent local minimum.
    ///
    /// After the last push this is where tail padding starts when
    /// assembling a full series.
    pub fn last_minimum_index(&self) -> usize {
        self.min_index
    }

    /// Number of samples pushed so far.
    pub fn samples_seen(&self) -> usize {
        self.index + usize::from(self.pending.is_some())
    }

    /// Push the next energy sample.
    ///
    /// Trend decisions compare the previous sample against this one, so a
    /// stroke is only ever emitted one sample after its closing minimum.
    /// Equal consecutive energies extend the current trend and trigger no
    /// transition.
    pub fn push(&mut self, sample: EnergySample) -> Option<Stroke> {
        let prev = self.pending.replace(sample)?;

        let i = self.index;
        self.index += 1;
        let rising = prev.energy_joules < sample.energy_joules;
        let falling = prev.energy_joules > sample.energy_joules;

        match self.state {
            SeekState::Minimum if rising => {
                self.local_min = Some((prev.energy_joules, prev.timestamp_secs));
                self.min_index = i;
                self.state = SeekState::Maximum;
                None
            }
            SeekState::Maximum if falling => {
                self.local_max = Some((prev.energy_joules, prev.timestamp_secs));
                self.state = SeekState::NextMinimum;
                None
            }
            SeekState::NextMinimum if rising => {
                let stroke = self.close_stroke(prev, i);
                // the closing minimum opens the next stroke
                self.local_min = Some((prev.energy_joules, prev.timestamp_secs));
                self.local_max = None;
                self.min_index = i;
                self.state = SeekState::Maximum;
                stroke
            }
            _ => None,
        }
    }

    /// Reset to the initial state, dropping all partial-stroke state.
    pub fn reset(&mut self) {
        self.state = SeekState::default();
        self.pending = None;
        self.index = 0;
        self.local_min = None;
        self.local_max = None;
        self.min_index = 0;
    }

    /// Compute the stroke closed by the minimum at `(prev, end_index)`.
    ///
    /// Degenerate detections (a phase of zero duration, possible when
    /// timestamps merely tie) are dropped: no value is emitted and the
    /// series builder carries the previous power forward, so no NaN or
    /// infinity can enter the output.
    fn close_stroke(&self, prev: EnergySample, end_index: usize) -> Option<Stroke> {
        let (e1, t1) = self.local_min?;
        let (e2, t2) = self.local_max?;
        let (e3, t3) = (prev.energy_joules, prev.timestamp_secs);

        let t_power = t2 - t1;
        let t_setup = t3 - t2;
        let period = t3 - t1;

        if t_power <= 0.0 || t_setup <= 0.0 {
            tracing::warn!(
                t1,
                t2,
                t3,
                "dropping degenerate stroke with a zero-length phase"
            );
            return None;
        }

        let energy_in = (e2 - e1) + t_power * (e2 - e3) / t_setup;
        let power_watts = energy_in / period;
        let rate = self.rate_unit.rate(period);

        tracing::debug!(
            power_watts,
            rate,
            period_secs = period,
            start_index = self.min_index,
            end_index,
            "stroke detected"
        );

        Some(Stroke {
            power_watts,
            period_secs: period,
            rate,
            start_index: self.min_index,
            end_index,
            start_secs: t1,
            end_secs: t3,
        })
    }
}

impl Default for StrokeSegmenter {
    fn default() -> Self {
        Self::new(StrokeRateUnit::default())
    }
}
