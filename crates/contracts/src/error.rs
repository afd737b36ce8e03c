//! Layered error definitions
//!
//! Categorized by source: config / alignment / crop / load / export

use thiserror::Error;

use crate::SessionId;

/// Crate-wide result alias
pub type Result<T, E = AlignError> = std::result::Result<T, E>;

/// Unified error type
#[derive(Debug, Error)]
pub enum AlignError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Alignment Errors =====
    /// Matcher precondition violated (unsorted or empty pose sequence)
    #[error("invalid pose sequence: {reason}")]
    InvalidInput { reason: String },

    /// Bracketing samples share one timestamp, no interpolation axis exists
    #[error("degenerate bracket: duplicate sample timestamp {timestamp}")]
    DegenerateBracket { timestamp: f64 },

    // ===== Crop Errors =====
    /// A session window matched no video frame, calibration is suspect
    #[error("no frames in window '{session_id}' [{start:.3}, {end:.3}]")]
    NoFramesInWindow {
        session_id: SessionId,
        start: f64,
        end: f64,
    },

    // ===== Load Errors =====
    /// Pose-log parse error
    #[error("motion log parse error in '{path}': {message}")]
    MotionParse { path: String, message: String },

    /// Video probe error (ffprobe missing, failed, or unparsable output)
    #[error("video probe error: {message}")]
    VideoProbe {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    // ===== Export Errors =====
    /// Sink write error
    #[error("sink '{sink_name}' write error: {message}")]
    SinkWrite { sink_name: String, message: String },

    /// Clip extraction error
    #[error("clip '{clip}' write error: {message}")]
    ClipWrite { clip: String, message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl AlignError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create matcher precondition error
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }

    /// Create empty-window error
    pub fn no_frames_in_window(session_id: SessionId, start: f64, end: f64) -> Self {
        Self::NoFramesInWindow {
            session_id,
            start,
            end,
        }
    }

    /// Create pose-log parse error
    pub fn motion_parse(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MotionParse {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create video probe error
    pub fn video_probe(message: impl Into<String>) -> Self {
        Self::VideoProbe {
            message: message.into(),
            source: None,
        }
    }

    /// Create sink write error
    pub fn sink_write(sink_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkWrite {
            sink_name: sink_name.into(),
            message: message.into(),
        }
    }

    /// Create clip extraction error
    pub fn clip_write(clip: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ClipWrite {
            clip: clip.into(),
            message: message.into(),
        }
    }
}
