//! PoseSample / PoseSequence - MotionLoader output
//!
//! Typed pose records; loose JSON never crosses this boundary.

use serde::{Deserialize, Serialize};

use crate::{AlignError, SessionId};

/// 3D position vector
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const ZERO: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    #[inline]
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Linear interpolation, endpoint-exact at t = 0 and t = 1.
    #[inline]
    pub fn lerp(&self, other: &Self, t: f64) -> Self {
        let s = 1.0 - t;
        Self {
            x: self.x * s + other.x * t,
            y: self.y * s + other.y * t,
            z: self.z * s + other.z * t,
        }
    }
}

/// Unit quaternion, (x, y, z, w) scalar-last as in the pose-log wire format
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quat {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

impl Quat {
    pub const IDENTITY: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
        w: 1.0,
    };

    #[inline]
    pub fn new(x: f64, y: f64, z: f64, w: f64) -> Self {
        Self { x, y, z, w }
    }

    /// Four-component dot product. Negative means the two quaternions sit on
    /// opposite hemispheres and represent the rotation pair via the long arc.
    #[inline]
    pub fn dot(&self, other: &Self) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z + self.w * other.w
    }

    /// Component-wise negation; same physical rotation, opposite hemisphere.
    #[inline]
    pub fn negated(&self) -> Self {
        Self {
            x: -self.x,
            y: -self.y,
            z: -self.z,
            w: -self.w,
        }
    }
}

impl Default for Quat {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// One pose record: where the hand was at one instant of one session.
///
/// Immutable once loaded; timestamps are Unix-epoch seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoseSample {
    /// Unix-epoch seconds
    pub timestamp: f64,

    /// Position in the capture frame (meters)
    pub position: Vec3,

    /// Orientation as a unit quaternion
    pub rotation: Quat,

    /// Recording session this sample belongs to
    pub session_id: SessionId,
}

impl PoseSample {
    pub fn new(timestamp: f64, position: Vec3, rotation: Quat, session_id: SessionId) -> Self {
        Self {
            timestamp,
            position,
            rotation,
            session_id,
        }
    }
}

/// Ordered pose-sample collection for one pipeline run.
///
/// Invariant: sorted ascending by timestamp. Within a session run timestamps
/// are unique and increasing; across session boundaries a time gap is
/// expected, not an error. `new` enforces the ordering; duplicate neighbor
/// timestamps are representable and surface later as `DegenerateBracket`
/// when a query lands on them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PoseSequence {
    samples: Vec<PoseSample>,
}

impl PoseSequence {
    /// Build a sequence, rejecting out-of-order timestamps.
    ///
    /// NaN timestamps fail the ordering comparison and are rejected too.
    pub fn new(samples: Vec<PoseSample>) -> Result<Self, AlignError> {
        for pair in samples.windows(2) {
            if !(pair[0].timestamp <= pair[1].timestamp) {
                return Err(AlignError::invalid_input(format!(
                    "samples out of order: {} before {}",
                    pair[0].timestamp, pair[1].timestamp
                )));
            }
        }
        Ok(Self { samples })
    }

    /// Build without the ordering check.
    ///
    /// For callers that already hold validated data, and for exercising the
    /// matcher's own precondition handling.
    pub fn from_unchecked(samples: Vec<PoseSample>) -> Self {
        Self { samples }
    }

    #[inline]
    pub fn samples(&self) -> &[PoseSample] {
        &self.samples
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    #[inline]
    pub fn first(&self) -> Option<&PoseSample> {
        self.samples.first()
    }

    #[inline]
    pub fn last(&self) -> Option<&PoseSample> {
        self.samples.last()
    }

    /// Whether timestamps are ascending (ties allowed, NaN fails).
    pub fn is_sorted_ascending(&self) -> bool {
        self.samples
            .windows(2)
            .all(|pair| pair[0].timestamp <= pair[1].timestamp)
    }

    /// First and last timestamp, if any samples exist.
    pub fn time_range(&self) -> Option<(f64, f64)> {
        match (self.samples.first(), self.samples.last()) {
            (Some(first), Some(last)) => Some((first.timestamp, last.timestamp)),
            _ => None,
        }
    }

    /// Distinct session labels in first-seen order.
    pub fn session_ids(&self) -> Vec<SessionId> {
        let mut out: Vec<SessionId> = Vec::new();
        for sample in &self.samples {
            if out.last() != Some(&sample.session_id) && !out.contains(&sample.session_id) {
                out.push(sample.session_id.clone());
            }
        }
        out
    }
}
