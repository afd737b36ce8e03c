//! # Align Engine
//!
//! Temporal alignment and pose interpolation core.
//!
//! Responsibilities:
//! - Bracket each video-frame timestamp against the pose sequence
//! - Interpolate a 6-DoF pose per bracket (lerp position, slerp rotation)
//! - Split a pose sequence into session windows at gaps
//! - Map session windows onto a video's own frame timestamps
//!
//! Everything here is synchronous and pure over in-memory data; I/O lives
//! in `ingestion` and `exporter`.
//!
//! ## Usage
//!
//! ```
//! use align_engine::{interpolate, locate};
//! use contracts::{PoseSample, PoseSequence, Quat, Vec3};
//!
//! let seq = PoseSequence::new(vec![
//!     PoseSample::new(10.0, Vec3::new(0.0, 0.0, 0.0), Quat::IDENTITY, "take".into()),
//!     PoseSample::new(10.1, Vec3::new(1.0, 0.0, 0.0), Quat::IDENTITY, "take".into()),
//! ])
//! .unwrap();
//!
//! let bracket = locate(&seq, 10.05, 0.2).unwrap();
//! let pose = interpolate(&bracket, 10.05);
//! assert!(pose.valid);
//! ```

mod aligner;
mod cropper;
mod interpolator;
mod matcher;
mod session;

pub use aligner::{AlignMode, Aligner};
pub use cropper::{CropOutcome, VideoCropper};
pub use interpolator::interpolate;
pub use matcher::{locate, locate_nearest, MotionMatcher};
pub use session::derive_session_windows;

// Re-export contracts types callers always need alongside the engine
pub use contracts::{AlignedFrame, Bracket, BracketKind, InterpolatedPose, SessionWindow};
