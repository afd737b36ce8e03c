//! VideoFrameRef / FrameTimeline / VideoInfo - VideoLoader output
//!
//! Per-frame decoded timestamps; frame index is never multiplied by a
//! nominal fps to fake a clock.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One decoded frame's index and timestamp.
///
/// The timestamp's clock domain depends on context: relative to stream
/// start inside a `FrameTimeline`, absolute Unix-epoch seconds once the
/// calibrated start offset is applied.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VideoFrameRef {
    pub frame_index: u64,
    pub timestamp: f64,
}

impl VideoFrameRef {
    pub fn new(frame_index: u64, timestamp: f64) -> Self {
        Self {
            frame_index,
            timestamp,
        }
    }
}

/// Ordered per-frame timestamps for one video, relative to stream start.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameTimeline {
    /// One entry per decoded frame, timestamps monotonically non-decreasing
    pub frames: Vec<VideoFrameRef>,

    /// Container-declared frame rate; diagnostics only
    pub nominal_fps: f64,

    /// Container-declared duration in seconds
    pub duration: f64,
}

impl FrameTimeline {
    pub fn new(frames: Vec<VideoFrameRef>, nominal_fps: f64, duration: f64) -> Self {
        Self {
            frames,
            nominal_fps,
            duration,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn first_timestamp(&self) -> Option<f64> {
        self.frames.first().map(|f| f.timestamp)
    }

    pub fn last_timestamp(&self) -> Option<f64> {
        self.frames.last().map(|f| f.timestamp)
    }
}

/// Probe summary for one video file, for diagnostics and reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoInfo {
    pub path: PathBuf,

    pub nominal_fps: f64,

    /// Seconds
    pub duration: f64,

    pub frame_count: u64,

    /// File mtime minus duration: a hint for the operator, never an input
    /// to alignment or cropping
    pub start_hint: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeline_bounds() {
        let timeline = FrameTimeline::new(
            vec![VideoFrameRef::new(0, 0.0), VideoFrameRef::new(1, 0.033)],
            30.0,
            0.066,
        );
        assert_eq!(timeline.len(), 2);
        assert_eq!(timeline.first_timestamp(), Some(0.0));
        assert_eq!(timeline.last_timestamp(), Some(0.033));
    }

    #[test]
    fn test_empty_timeline() {
        let timeline = FrameTimeline::default();
        assert!(timeline.is_empty());
        assert_eq!(timeline.first_timestamp(), None);
    }
}
