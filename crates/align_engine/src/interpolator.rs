//! Pose interpolation over a located bracket.

use contracts::{Bracket, InterpolatedPose, Quat};
use nalgebra::{Quaternion, UnitQuaternion};

const SLERP_EPSILON: f64 = 1.0e-9;

/// Produce the pose for one query timestamp from its bracket.
///
/// `Matched` brackets interpolate linearly in position and spherically in
/// rotation along the shorter arc. Fractions of exactly 0 or 1 return the
/// endpoint sample verbatim, bit for bit. Non-matched brackets return the
/// explicit invalid pose; its position/rotation fields must not be consumed.
pub fn interpolate(bracket: &Bracket, query_ts: f64) -> InterpolatedPose {
    match bracket {
        Bracket::Matched {
            left,
            right,
            fraction,
        } => {
            if *fraction == 0.0 {
                return InterpolatedPose {
                    timestamp: query_ts,
                    position: left.position,
                    rotation: left.rotation,
                    valid: true,
                };
            }
            if *fraction == 1.0 {
                return InterpolatedPose {
                    timestamp: query_ts,
                    position: right.position,
                    rotation: right.rotation,
                    valid: true,
                };
            }

            InterpolatedPose {
                timestamp: query_ts,
                position: left.position.lerp(&right.position, *fraction),
                rotation: slerp_shortest(&left.rotation, &right.rotation, *fraction),
                valid: true,
            }
        }
        Bracket::BeforeStart | Bracket::AfterEnd | Bracket::InGap { .. } => {
            InterpolatedPose::invalid(query_ts)
        }
    }
}

/// Shortest-arc spherical interpolation between two unit quaternions.
///
/// Antipodal representations of the same orientation are sign-aligned
/// first, so the result never traverses the long arc regardless of the
/// input's hemisphere convention.
fn slerp_shortest(a: &Quat, b: &Quat, t: f64) -> Quat {
    // Identical rotations have no interpolation axis; return unchanged
    if a == b {
        return *a;
    }

    let b_aligned = if a.dot(b) < 0.0 { b.negated() } else { *b };

    let ua = to_na(a);
    let ub = to_na(&b_aligned);

    match ua.try_slerp(&ub, t, SLERP_EPSILON) {
        Some(q) => from_na(&q),
        // Numerically coincident after sign alignment
        None => *a,
    }
}

fn to_na(q: &Quat) -> UnitQuaternion<f64> {
    UnitQuaternion::from_quaternion(Quaternion::new(q.w, q.x, q.y, q.z))
}

fn from_na(q: &UnitQuaternion<f64>) -> Quat {
    let inner = q.quaternion();
    Quat::new(inner.i, inner.j, inner.k, inner.w)
}
