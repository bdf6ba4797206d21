//! Geometry predicates used by perception and locomotion
//!
//! All radius and range tests are strict (`<`): a point exactly on the
//! boundary is outside.

use crate::vector::Vec3;

/// Euclidean distance between two points
#[inline]
pub fn distance(a: Vec3, b: Vec3) -> f32 {
    a.distance(b)
}

/// Unit vector from `from` toward `to`, `None` if they coincide
#[inline]
pub fn direction(from: Vec3, to: Vec3) -> Option<Vec3> {
    (to - from).try_normalize()
}

/// Angle between two vectors in radians, in `[0, PI]`.
///
/// A zero-length input has no direction and yields `0.0`.
pub fn angle_between(a: Vec3, b: Vec3) -> f32 {
    let mag_a = a.length();
    let mag_b = b.length();

    if mag_a == 0.0 || mag_b == 0.0 {
        return 0.0;
    }

    let cos_angle = (a.dot(b) / (mag_a * mag_b)).clamp(-1.0, 1.0);
    cos_angle.acos()
}

/// Whether `point` lies strictly inside the radius around `center`
#[inline]
pub fn point_in_circle(center: Vec3, radius: f32, point: Vec3) -> bool {
    distance(center, point) < radius
}

/// Whether `point` lies strictly inside a view cone.
///
/// `half_angle` is in radians, measured from `forward`. A point at the apex
/// counts as inside.
pub fn point_in_cone(apex: Vec3, forward: Vec3, half_angle: f32, range: f32, point: Vec3) -> bool {
    let offset = point - apex;
    if offset.length() >= range {
        return false;
    }
    if offset.try_normalize().is_none() {
        return true;
    }
    angle_between(forward, offset) < half_angle
}

/// Step from `current` toward `target` by at most `max_delta`, never past it
pub fn move_towards(current: Vec3, target: Vec3, max_delta: f32) -> Vec3 {
    let offset = target - current;
    let dist = offset.length();
    if dist <= max_delta || dist == 0.0 {
        return target;
    }
    if max_delta <= 0.0 {
        return current;
    }
    current + offset / dist * max_delta
}
