//! Machine profile and analysis configuration.
//!
//! T010: Implement MachineProfile loading from TOML
//! T011: Define StrokeRateUnit enum

use crate::flywheel::Flywheel;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Unit convention for reported stroke rate.
///
/// The rate is always derived from the minimum-to-minimum stroke period;
/// only the numerator differs. Kayak convention counts full two-sided
/// paddle cycles, so a "stroke" spans two pulls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrokeRateUnit {
    /// Full two-sided paddle cycles per minute: 30/(t3−t1)
    #[default]
    DoubleStrokesPerMinute,
    /// Single strokes per minute: 60/(t3−t1)
    StrokesPerMinute,
}

impl StrokeRateUnit {
    /// Numerator over the stroke period when computing a rate.
    pub fn numerator(&self) -> f64 {
        match self {
            StrokeRateUnit::DoubleStrokesPerMinute => 30.0,
            StrokeRateUnit::StrokesPerMinute => 60.0,
        }
    }

    /// Rate for one stroke of the given period in seconds.
    ///
    /// Returns 0 for a non-positive period rather than dividing by it.
    pub fn rate(&self, stroke_period_secs: f64) -> f64 {
        if stroke_period_secs > 0.0 {
            self.numerator() / stroke_period_secs
        } else {
            0.0
        }
    }
}

impl std::fmt::Display for StrokeRateUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StrokeRateUnit::DoubleStrokesPerMinute => write!(f, "dspm"),
            StrokeRateUnit::StrokesPerMinute => write!(f, "spm"),
        }
    }
}

/// Ergo machine profile: physical constants and analysis settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MachineProfile {
    /// Unique identifier
    pub id: Uuid,
    /// Display name
    pub name: String,
    /// Trailing moving-average kernel width in samples
    pub smoothing_kernel: usize,
    /// Minimum plausible revolution period in microseconds
    pub min_period_us: u32,
    /// Maximum plausible revolution period in microseconds
    pub max_period_us: u32,
    /// Stroke rate unit convention
    pub rate_unit: StrokeRateUnit,
    /// Distance credited per flywheel revolution in metres
    pub distance_per_rev_m: f64,
    /// Profile creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp
    pub updated_at: DateTime<Utc>,
    /// Flywheel physical model (a TOML table, so it serializes last)
    pub flywheel: Flywheel,
}

impl Default for MachineProfile {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: "Lawler".to_string(),
            flywheel: Flywheel::default(),
            smoothing_kernel: 40,
            min_period_us: 1_000,
            max_period_us: 10_000_000,
            rate_unit: StrokeRateUnit::default(),
            // 750 rpm = 11 km/h on the reference machine, so one
            // revolution covers 11000/(60*750) m
            distance_per_rev_m: 11_000.0 / (60.0 * 750.0),
            created_at: now,
            updated_at: now,
        }
    }
}

impl MachineProfile {
    /// Create a new profile with the given name.
    pub fn new(name: String) -> Self {
        Self {
            name,
            ..Default::default()
        }
    }

    /// Update the flywheel model, validating mass and radius.
    pub fn set_flywheel(&mut self, flywheel: Flywheel) -> Result<(), ConfigError> {
        if !Flywheel::validate_mass(flywheel.mass_kg) {
            return Err(ConfigError::InvalidValue(
                "Flywheel mass must be between 0.5 and 50 kg".to_string(),
            ));
        }
        if !Flywheel::validate_radius(flywheel.radius_m) {
            return Err(ConfigError::InvalidValue(
                "Flywheel radius must be between 0.05 and 1.0 m".to_string(),
            ));
        }
        self.flywheel = flywheel;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Update the smoothing kernel width (must be at least 1).
    pub fn set_smoothing_kernel(&mut self, kernel: usize) -> Result<(), ConfigError> {
        if kernel == 0 {
            return Err(ConfigError::InvalidValue(
                "Smoothing kernel must be at least 1 sample".to_string(),
            ));
        }
        self.smoothing_kernel = kernel;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Speed in km/h for a given flywheel rpm under this profile's
    /// distance model.
    pub fn speed_kmh(&self, rpm: f64) -> f64 {
        rpm * self.distance_per_rev_m * 60.0 / 1000.0
    }
}

/// Get the application configuration directory.
pub fn get_config_dir() -> PathBuf {
    directories::ProjectDirs::from("com", "paddlepower", "PaddlePower")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Get the machine profile file path.
pub fn get_profile_path() -> PathBuf {
    get_config_dir().join("machine.toml")
}

/// Load the machine profile from the default location.
///
/// A missing file is not an error; the default Lawler profile is returned.
pub fn load_profile() -> Result<MachineProfile, ConfigError> {
    load_profile_from(&get_profile_path())
}

/// Load a machine profile from an explicit path.
pub fn load_profile_from(path: &Path) -> Result<MachineProfile, ConfigError> {
    if !path.exists() {
        tracing::info!(path = %path.display(), "no machine profile found, using defaults");
        return Ok(MachineProfile::default());
    }

    let content =
        std::fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;

    let profile: MachineProfile =
        toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))?;

    tracing::info!(path = %path.display(), name = %profile.name, "loaded machine profile");
    Ok(profile)
}

/// Save the machine profile to the default location.
pub fn save_profile(profile: &MachineProfile) -> Result<(), ConfigError> {
    save_profile_to(profile, &get_profile_path())
}

/// Save a machine profile to an explicit path.
pub fn save_profile_to(profile: &MachineProfile, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| ConfigError::IoError(e.to_string()))?;
    }

    let content =
        toml::to_string_pretty(profile).map_err(|e| ConfigError::SerializeError(e.to_string()))?;

    std::fs::write(path, content).map_err(|e| ConfigError::IoError(e.to_string()))?;

    tracing::info!(path = %path.display(), name = %profile.name, "saved machine profile");
    Ok(())
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialize error: {0}")]
    SerializeError(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_profile_is_lawler() {
        let profile = MachineProfile::default();
        assert_eq!(profile.name, "Lawler");
        assert_eq!(profile.smoothing_kernel, 40);
        assert!((profile.flywheel.mass_kg - 4.36).abs() < 1e-12);
        assert!((profile.distance_per_rev_m - 0.2444444444).abs() < 1e-9);
    }

    #[test]
    fn test_speed_model_reference_point() {
        // 750 rpm on the reference machine is 11 km/h
        let profile = MachineProfile::default();
        assert!((profile.speed_kmh(750.0) - 11.0).abs() < 1e-9);
    }

    #[test]
    fn test_rate_unit_numerators() {
        // a 2 s stroke period is 15 dspm or 30 spm
        assert_eq!(StrokeRateUnit::DoubleStrokesPerMinute.rate(2.0), 15.0);
        assert_eq!(StrokeRateUnit::StrokesPerMinute.rate(2.0), 30.0);
        assert_eq!(StrokeRateUnit::default().rate(0.0), 0.0);
    }

    #[test]
    fn test_set_flywheel_validation() {
        let mut profile = MachineProfile::default();
        assert!(profile.set_flywheel(Flywheel::new(3.0, 0.18)).is_ok());
        assert!(profile.set_flywheel(Flywheel::new(0.0, 0.18)).is_err());
        assert!(profile.set_smoothing_kernel(0).is_err());
    }
}
