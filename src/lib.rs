//! PaddlePower - Kayak Ergometer Power Analysis
//!
//! Estimates athlete power output on flywheel-based kayak ergometers from
//! raw per-revolution rotation periods. Provides the stroke segmentation
//! state machine, per-stroke power estimation with air-resistance
//! correction, smoothing, and both batch (recorded session) and live
//! (incremental) pipelines.

pub mod config;
pub mod flywheel;
pub mod metrics;
pub mod sensors;

// Re-export commonly used types
pub use config::{MachineProfile, StrokeRateUnit};
pub use flywheel::Flywheel;
pub use metrics::session::{analyze_session, SessionAnalysis};
pub use metrics::telemetry::ErgMonitor;
pub use sensors::types::{EnergySample, RevolutionSample};
