//! Stroke segmentation, power estimation and smoothing.

pub mod error;
pub mod live;
pub mod segmenter;
pub mod session;
pub mod smoothing;
pub mod telemetry;

pub use error::{AnalysisError, AnalysisResult};
pub use live::{LiveStroke, LiveStrokeMonitor};
pub use segmenter::{SeekState, Stroke, StrokeSegmenter};
pub use session::{analyze_session, segment_series, SessionAnalysis, SessionSummary};
pub use smoothing::{trailing_average, RollingAverage};
pub use telemetry::{ErgMonitor, LiveTelemetry};
