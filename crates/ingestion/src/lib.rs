//! # Ingestion
//!
//! Input loading for the alignment pipeline.
//!
//! Responsibilities:
//! - Parse pose-log JSON files into a typed `PoseSequence`
//! - Extract per-frame decoded timestamps from videos via `ffprobe`
//! - Probe container metadata for diagnostics (fps, duration, start hint)
//!
//! Everything downstream operates on `contracts` types; loosely-typed JSON
//! never leaves this crate.
//!
//! ## Usage Example
//!
//! ```ignore
//! use contracts::FrameTimestampSource;
//! use ingestion::{FfprobeSource, MotionLoader};
//!
//! let sequence = MotionLoader::load(Path::new("data/motion"))?;
//! let source = FfprobeSource::new("data/MR_View.mp4");
//! let timeline = source.frame_timeline()?;
//! ```
//!
//! ## Mock Testing
//!
//! ```ignore
//! use ingestion::MockVideoSource;
//!
//! let source = MockVideoSource::constant_rate(30.0, 300);
//! let timeline = source.frame_timeline()?;
//! ```

mod motion;
mod video;

// Re-exports
pub use contracts::{FrameTimeline, FrameTimestampSource, PoseSequence, VideoInfo};
pub use motion::MotionLoader;
pub use video::{FfprobeSource, MockVideoSource};
