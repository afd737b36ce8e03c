//! # Contracts
//!
//! Frozen interface contracts, defining inter-crate data structures and traits.
//! All business crates can only depend on this crate, reverse dependencies are prohibited.
//!
//! ## Time Model
//! - Pose-log timestamps are Unix-epoch seconds (f64), the primary clock
//! - Video frame timestamps are seconds relative to stream start until the
//!   calibrated start offset is applied; after that they share the pose clock
//! - `frame_index` orders frames within one video and is never used for time math

mod align;
mod config;
mod error;
mod pose;
mod session_id;
mod sink;
mod source;
mod video;
mod window;

pub use align::*;
pub use config::*;
pub use error::*;
pub use pose::*;
pub use session_id::SessionId;
pub use sink::*;
pub use source::FrameTimestampSource;
pub use video::*;
pub use window::*;
