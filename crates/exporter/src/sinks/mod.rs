//! Export sink implementations

use contracts::SessionWindow;
use std::path::PathBuf;

mod json;
mod log;
mod report;

pub use json::JsonFileSink;
pub use log::LogSink;
pub use report::ReportSink;

/// Run-level context shared by the document-producing sinks.
///
/// Snapshot of the inputs a run was configured with; sinks echo it into the
/// synced-pose document metadata and the Markdown report.
#[derive(Debug, Clone)]
pub struct RunContext {
    /// Source video path
    pub video_path: PathBuf,

    /// Container-level frame rate (informational; alignment uses per-frame stamps)
    pub nominal_fps: f64,

    /// Absolute timestamp of video frame 0 after calibration
    pub calibrated_start: f64,

    /// Max bracket width treated as continuous motion (seconds)
    pub gap_threshold: f64,

    /// Session windows derived from the motion log
    pub windows: Vec<SessionWindow>,
}
