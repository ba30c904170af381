//! Analysis error types.
//!
//! T004: Create AnalysisError types with thiserror

use thiserror::Error;

/// Errors that can occur during session analysis.
///
/// Only fundamentally malformed input is rejected. Degenerate strokes and
/// sequences too short to contain a stroke resolve to defined output
/// values instead (see the segmenter and session modules).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AnalysisError {
    /// A sample carries a negative timestamp.
    #[error("Negative timestamp at sample {index}")]
    NegativeTimestamp { index: usize },

    /// A sample's timestamp precedes its predecessor's.
    #[error("Non-monotonic timestamp at sample {index}")]
    NonMonotonicTimestamp { index: usize },
}

/// Result type for analysis operations.
pub type AnalysisResult<T> = Result<T, AnalysisError>;
