//! FrameTimestampSource trait - video timeline abstraction
//!
//! Decouples the alignment engine from how frame timestamps are obtained.
//! An ffprobe-backed file source and an in-memory synthetic source both
//! implement this.

use crate::{AlignError, FrameTimeline};

/// Ordered, finite, restartable per-frame timestamp source.
///
/// `frame_timeline` may be called more than once and must yield the same
/// timeline each time; implementors that probe external tools should cache.
pub trait FrameTimestampSource: Send + Sync {
    /// Short name for logging and error messages
    fn source_name(&self) -> &str;

    /// Materialize the full (frame_index, timestamp) list.
    ///
    /// # Errors
    /// Probe or decode failures; an empty video is an error here, not a
    /// valid empty timeline.
    fn frame_timeline(&self) -> Result<FrameTimeline, AlignError>;
}
