//! Sensor sample types and raw input filtering.

pub mod filter;
pub mod types;

pub use filter::PeriodFilter;
pub use types::{EnergySample, RevolutionSample};
