//! Pipeline configuration contracts shared across crates.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use validator::Validate;

/// Default gap threshold in seconds: consecutive samples further apart than
/// this belong to different session runs.
pub const DEFAULT_GAP_THRESHOLD: f64 = 0.2;

/// Plausible Unix-epoch bounds for a calibrated start timestamp
/// (2001-09-09 .. 2096-10-02). Values outside are taken for unit mistakes
/// (milliseconds, relative seconds) and rejected.
pub const MIN_PLAUSIBLE_EPOCH: f64 = 1.0e9;
pub const MAX_PLAUSIBLE_EPOCH: f64 = 4.0e9;

/// Full pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PipelineConfig {
    /// Video file to align
    pub video_path: PathBuf,

    /// Directory of pose-log JSON files
    pub motion_dir: PathBuf,

    /// Where exports and reports land
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Alignment parameters
    #[serde(default)]
    #[validate(nested)]
    pub sync: SyncConfig,

    /// Export toggles
    #[serde(default)]
    #[validate(nested)]
    pub export: ExportConfig,

    /// Prometheus exporter port (0 = disabled)
    #[serde(default)]
    pub metrics_port: u16,
}

/// Alignment parameters
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SyncConfig {
    /// Seconds between consecutive samples beyond which they are separate
    /// sessions rather than a continuous run
    #[serde(default = "default_gap_threshold")]
    #[validate(range(min = 0.0, message = "gap threshold must be non-negative"))]
    pub gap_threshold: f64,

    /// Absolute Unix time of video frame 0, operator-supplied
    #[serde(default)]
    #[validate(range(
        min = 1.0e9,
        max = 4.0e9,
        message = "calibrated start must be Unix-epoch seconds"
    ))]
    pub calibrated_start: Option<f64>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            gap_threshold: DEFAULT_GAP_THRESHOLD,
            calibrated_start: None,
        }
    }
}

/// Export toggles
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ExportConfig {
    /// Write the synced-pose JSON document
    #[serde(default = "default_true")]
    pub write_json: bool,

    /// Write the Markdown run report
    #[serde(default = "default_true")]
    pub write_report: bool,

    /// Progress log cadence, in frames
    #[serde(default = "default_log_every")]
    #[validate(range(min = 1, message = "log_every must be at least 1"))]
    pub log_every: u64,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            write_json: true,
            write_report: true,
            log_every: default_log_every(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

fn default_gap_threshold() -> f64 {
    DEFAULT_GAP_THRESHOLD
}

fn default_true() -> bool {
    true
}

fn default_log_every() -> u64 {
    100
}
