//! Per-frame alignment driver.
//!
//! Composes the matcher and interpolator over video frames whose timestamps
//! have already been shifted to absolute Unix-epoch seconds, and tags each
//! result with its bracket classification for downstream sinks and stats.

use contracts::{AlignError, AlignedFrame, Bracket, PoseSequence, VideoFrameRef};
use tracing::{instrument, trace};

use crate::{interpolate, MotionMatcher};

/// How matched brackets become poses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlignMode {
    /// Lerp position and shortest-arc slerp rotation between the bracket
    #[default]
    Interpolated,

    /// Snap to the nearer bracketing sample and return it unmodified, for
    /// consumers that must only ever see recorded poses
    NearestRaw,
}

impl AlignMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlignMode::Interpolated => "interpolated",
            AlignMode::NearestRaw => "nearest_raw",
        }
    }
}

/// Aligns video frames against one validated pose sequence.
#[derive(Debug, Clone, Copy)]
pub struct Aligner<'a> {
    matcher: MotionMatcher<'a>,
    mode: AlignMode,
}

impl<'a> Aligner<'a> {
    /// Validates the sequence once; per-frame calls stay on the fast path.
    pub fn new(
        sequence: &'a PoseSequence,
        gap_threshold: f64,
        mode: AlignMode,
    ) -> Result<Self, AlignError> {
        Ok(Self {
            matcher: MotionMatcher::new(sequence, gap_threshold)?,
            mode,
        })
    }

    pub fn mode(&self) -> AlignMode {
        self.mode
    }

    /// Align one frame. `frame.timestamp` must be absolute epoch seconds.
    ///
    /// Out-of-range and in-gap frames are not errors: they come back as
    /// aligned frames whose pose is the explicit invalid value. The only
    /// error here is a degenerate bracket (duplicate sample timestamps).
    #[instrument(
        level = "trace",
        name = "align_frame",
        skip(self, frame),
        fields(frame = frame.frame_index, mode = self.mode.as_str())
    )]
    pub fn align_frame(&self, frame: &VideoFrameRef) -> Result<AlignedFrame, AlignError> {
        let bracket = match self.mode {
            AlignMode::Interpolated => self.matcher.locate(frame.timestamp),
            AlignMode::NearestRaw => self.matcher.locate_nearest(frame.timestamp),
        }?;

        let classification = bracket.kind();
        metrics::counter!("align_frames_total", "classification" => classification.as_str())
            .increment(1);
        if let Bracket::Matched {
            left,
            right,
            fraction,
        } = &bracket
        {
            metrics::histogram!("align_fraction").record(*fraction);
            metrics::histogram!("align_bracket_width").record(right.timestamp - left.timestamp);
        }

        let pose = interpolate(&bracket, frame.timestamp);
        trace!(
            classification = classification.as_str(),
            valid = pose.valid,
            "frame aligned"
        );

        Ok(AlignedFrame {
            frame_index: frame.frame_index,
            timestamp: frame.timestamp,
            classification,
            pose,
        })
    }
}
