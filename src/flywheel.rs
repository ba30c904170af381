//! Flywheel physical model and rotational energy conversion.
//!
//! T012: Implement Flywheel rotational energy conversion

use crate::sensors::types::{EnergySample, RevolutionSample};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Physical description of an ergo flywheel.
///
/// Mass and radius are machine constants injected wherever the energy
/// conversion is needed; they are never module-level globals. To weigh
/// the flywheel you will have to dismantle your machine - a bit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Flywheel {
    /// Flywheel mass in kilogrammes
    pub mass_kg: f64,
    /// Flywheel radius in metres
    pub radius_m: f64,
}

impl Default for Flywheel {
    /// The Lawler ergo flywheel.
    fn default() -> Self {
        Self {
            mass_kg: 4.36,
            radius_m: 0.20,
        }
    }
}

impl Flywheel {
    /// Create a flywheel model from mass and radius.
    pub fn new(mass_kg: f64, radius_m: f64) -> Self {
        Self { mass_kg, radius_m }
    }

    /// Moment of inertia in kg·m², treating the flywheel as a solid disc
    /// (I = ½·m·r²).
    pub fn moment_of_inertia(&self) -> f64 {
        0.5 * self.mass_kg * self.radius_m * self.radius_m
    }

    /// Rotational kinetic energy in joules for one timed revolution.
    ///
    /// KE = ½·I·ω² with ω = 2π/period collapses to m·(r·π/period)².
    /// The period must be strictly positive; the period filter upstream
    /// guarantees this.
    pub fn energy(&self, period_secs: f64) -> f64 {
        let rim_factor = self.radius_m * PI / period_secs;
        self.mass_kg * rim_factor * rim_factor
    }

    /// Convert a raw revolution sample into an energy sample.
    pub fn energy_sample(&self, sample: &RevolutionSample) -> EnergySample {
        EnergySample::new(sample.timestamp_secs, self.energy(sample.period_secs()))
    }

    /// Validate mass (0.5-50 kg covers every real machine).
    pub fn validate_mass(mass_kg: f64) -> bool {
        (0.5..=50.0).contains(&mass_kg)
    }

    /// Validate radius (0.05-1.0 m).
    pub fn validate_radius(radius_m: f64) -> bool {
        (0.05..=1.0).contains(&radius_m)
    }
}
