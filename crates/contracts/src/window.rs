//! SessionWindow / ClipSpec - cropper input and output

use serde::{Deserialize, Serialize};

use crate::SessionId;

/// Absolute time window covered by one session run.
///
/// Derived from a pose sequence's session runs; bounds are the first and
/// last sample timestamps of the run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionWindow {
    pub session_id: SessionId,

    /// Unix-epoch seconds, inclusive
    pub start: f64,

    /// Unix-epoch seconds, inclusive
    pub end: f64,
}

impl SessionWindow {
    pub fn new(session_id: SessionId, start: f64, end: f64) -> Self {
        Self {
            session_id,
            start,
            end,
        }
    }

    #[inline]
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// Closed-interval membership: a timestamp landing exactly on a bound
    /// belongs to this window, not the adjacent one.
    #[inline]
    pub fn contains(&self, timestamp: f64) -> bool {
        self.start <= timestamp && timestamp <= self.end
    }
}

/// Frame-accurate clip boundaries for one session window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipSpec {
    pub session_id: SessionId,

    /// First included frame index
    pub start_frame: u64,

    /// Last included frame index (inclusive)
    pub end_frame: u64,

    /// Absolute timestamp of the first included frame
    pub start_timestamp: f64,

    /// Absolute timestamp of the last included frame
    pub end_timestamp: f64,

    /// Number of frames in the clip
    pub frame_count: u64,
}
