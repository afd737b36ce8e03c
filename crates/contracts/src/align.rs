//! Bracket / InterpolatedPose / AlignedFrame - alignment engine output
//!
//! One bracket per query timestamp, one aligned frame per video frame.

use serde::{Deserialize, Serialize};

use crate::{PoseSample, Quat, Vec3};

/// Matcher result for one query timestamp.
///
/// Transient computed value; fraction is only meaningful for `Matched`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Bracket {
    /// Query falls between two samples of one continuous run
    Matched {
        left: PoseSample,
        right: PoseSample,
        /// Interpolation fraction in [0, 1]
        fraction: f64,
    },

    /// Query precedes the first sample
    BeforeStart,

    /// Query follows the last sample
    AfterEnd,

    /// Query falls between two samples separated by more than the gap
    /// threshold; interpolating across it would make up motion
    InGap {
        left_session_end: f64,
        right_session_start: f64,
    },
}

impl Bracket {
    #[inline]
    pub fn kind(&self) -> BracketKind {
        match self {
            Bracket::Matched { .. } => BracketKind::Matched,
            Bracket::BeforeStart => BracketKind::BeforeStart,
            Bracket::AfterEnd => BracketKind::AfterEnd,
            Bracket::InGap { .. } => BracketKind::InGap,
        }
    }

    #[inline]
    pub fn is_matched(&self) -> bool {
        matches!(self, Bracket::Matched { .. })
    }
}

/// Bracket classification without payload, for tagging and counting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BracketKind {
    Matched,
    BeforeStart,
    AfterEnd,
    InGap,
}

impl BracketKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BracketKind::Matched => "matched",
            BracketKind::BeforeStart => "before_start",
            BracketKind::AfterEnd => "after_end",
            BracketKind::InGap => "in_gap",
        }
    }
}

/// Interpolated pose for one video frame.
///
/// When `valid` is false the position/rotation fields are placeholders and
/// must not be consumed; "no pose available" is this flag, never a zero pose.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterpolatedPose {
    /// Query timestamp (Unix-epoch seconds)
    pub timestamp: f64,

    pub position: Vec3,

    pub rotation: Quat,

    /// False for before-start / after-end / in-gap queries
    pub valid: bool,
}

impl InterpolatedPose {
    /// The explicit "no pose available" value for one timestamp.
    pub fn invalid(timestamp: f64) -> Self {
        Self {
            timestamp,
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            valid: false,
        }
    }
}

/// Per-frame alignment record streamed to export sinks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignedFrame {
    /// Frame index within the source video
    pub frame_index: u64,

    /// Absolute frame timestamp (Unix-epoch seconds)
    pub timestamp: f64,

    /// How the matcher classified this frame's timestamp
    pub classification: BracketKind,

    /// Interpolated pose; `pose.valid` mirrors the classification
    pub pose: InterpolatedPose,
}
