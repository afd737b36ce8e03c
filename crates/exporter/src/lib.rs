//! # Exporter
//!
//! Aligned-frame output stage.
//!
//! Responsibilities:
//! - Consume `AlignedFrame` values from the alignment loop
//! - Fan out to the registered sinks (synced JSON, report, log)
//! - Isolate a slow or failing sink from the rest of the run
//! - Extract per-session clips via ffmpeg stream copy

pub mod clips;
pub mod dispatcher;
pub mod handle;
pub mod metrics;
pub mod sinks;

pub use clips::{ClipOutcome, FfmpegClipWriter, write_clip_manifest};
pub use contracts::{AlignedFrame, AlignedFrameSink};
pub use dispatcher::Dispatcher;
pub use handle::SinkHandle;
pub use metrics::{MetricsSnapshot, SinkMetrics};
pub use sinks::{JsonFileSink, LogSink, ReportSink, RunContext};
