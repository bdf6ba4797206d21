//! Quaternion for agent orientation
//!
//! Convention: an agent's local forward is `+Z` and up is `+Y`, so the
//! identity quaternion faces down the world `+Z` axis.

use crate::vector::Vec3;
use core::ops::{Mul, MulAssign};

/// Unit quaternion rotation
#[derive(Clone, Copy, Debug, PartialEq)]
#[repr(C)]
pub struct Quat {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Quat {
    /// No rotation
    pub const IDENTITY: Self = Self::new(0.0, 0.0, 0.0, 1.0);

    /// Raw components, not normalized
    #[inline]
    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    /// Rotation of `angle` radians about `axis`
    pub fn from_axis_angle(axis: Vec3, angle: f32) -> Self {
        let half = angle * 0.5;
        let (sin, cos) = half.sin_cos();
        let axis = axis.normalize();
        Self::new(axis.x * sin, axis.y * sin, axis.z * sin, cos)
    }

    /// Create from rotation around Y axis (yaw)
    #[inline]
    pub fn from_rotation_y(angle: f32) -> Self {
        let half = angle * 0.5;
        Self::new(0.0, half.sin(), 0.0, half.cos())
    }

    /// Create from an orthonormal basis (right, up, forward as matrix columns)
    pub fn from_basis(right: Vec3, up: Vec3, forward: Vec3) -> Self {
        let trace = right.x + up.y + forward.z;

        if trace > 0.0 {
            let s = (trace + 1.0).sqrt() * 2.0;
            Self::new(
                (up.z - forward.y) / s,
                (forward.x - right.z) / s,
                (right.y - up.x) / s,
                0.25 * s,
            )
        } else if right.x > up.y && right.x > forward.z {
            let s = (1.0 + right.x - up.y - forward.z).sqrt() * 2.0;
            Self::new(
                0.25 * s,
                (right.y + up.x) / s,
                (forward.x + right.z) / s,
                (up.z - forward.y) / s,
            )
        } else if up.y > forward.z {
            let s = (1.0 + up.y - right.x - forward.z).sqrt() * 2.0;
            Self::new(
                (right.y + up.x) / s,
                0.25 * s,
                (up.z + forward.y) / s,
                (forward.x - right.z) / s,
            )
        } else {
            let s = (1.0 + forward.z - right.x - up.y).sqrt() * 2.0;
            Self::new(
                (forward.x + right.z) / s,
                (up.z + forward.y) / s,
                0.25 * s,
                (right.y - up.x) / s,
            )
        }
        .normalize()
    }

    /// Shortest rotation taking direction `from` onto `to`
    pub fn from_rotation_arc(from: Vec3, to: Vec3) -> Self {
        let from = from.normalize();
        let to = to.normalize();

        let dot = from.dot(to);

        if dot > 0.99999 {
            return Self::IDENTITY;
        }

        if dot < -0.99999 {
            // Opposite vectors, any perpendicular axis works
            let axis = Vec3::X.cross(from);
            let axis = if axis.length_squared() < 1e-6 {
                Vec3::Y.cross(from)
            } else {
                axis
            };
            return Self::from_axis_angle(axis.normalize(), core::f32::consts::PI);
        }

        let axis = from.cross(to);
        let s = ((1.0 + dot) * 2.0).sqrt();
        let inv_s = 1.0 / s;

        Self::new(axis.x * inv_s, axis.y * inv_s, axis.z * inv_s, s * 0.5)
    }

    /// Orientation whose forward (`+Z`) points along `direction`, keeping
    /// `up` as close to vertical as possible.
    ///
    /// Returns `None` for a zero-length direction.
    pub fn look_rotation(direction: Vec3, up: Vec3) -> Option<Self> {
        let forward = direction.try_normalize()?;
        match up.cross(forward).try_normalize() {
            Some(right) => {
                let up = forward.cross(right);
                Some(Self::from_basis(right, up, forward))
            }
            // Looking straight along `up`
            None => Some(Self::from_rotation_arc(Vec3::Z, forward)),
        }
    }

    /// World-space forward vector of this orientation
    #[inline]
    pub fn forward(self) -> Vec3 {
        self.rotate(Vec3::Z)
    }

    /// Heading around the vertical axis, in radians
    pub fn yaw(self) -> f32 {
        let forward = self.forward().horizontal();
        if forward.length_squared() > 1e-8 {
            forward.x.atan2(forward.z)
        } else {
            // Pitched straight up or down; the right vector still carries the heading
            let right = self.rotate(Vec3::X);
            (-right.z).atan2(right.x)
        }
    }

    /// Same heading, with pitch and roll removed
    #[inline]
    pub fn leveled(self) -> Self {
        Self::from_rotation_y(self.yaw())
    }

    /// Squared norm
    #[inline]
    pub fn length_squared(self) -> f32 {
        self.x * self.x + self.y * self.y + self.z * self.z + self.w * self.w
    }

    /// Norm
    #[inline]
    pub fn length(self) -> f32 {
        self.length_squared().sqrt()
    }

    /// Unit-length copy
    #[inline]
    pub fn normalize(self) -> Self {
        let len = self.length();
        if len > 0.0 {
            Self::new(self.x / len, self.y / len, self.z / len, self.w / len)
        } else {
            Self::IDENTITY
        }
    }

    /// 4D dot product
    #[inline]
    pub fn dot(self, other: Self) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z + self.w * other.w
    }

    /// Angle between two orientations, in radians
    pub fn angle_to(self, other: Self) -> f32 {
        let dot = self.dot(other).abs().clamp(0.0, 1.0);
        2.0 * dot.acos()
    }

    /// Spherical interpolation toward `other`, `t` in `[0, 1]`
    pub fn slerp(self, other: Self, t: f32) -> Self {
        let mut dot = self.dot(other);
        let mut other = other;

        // Shortest path; epsilon avoids sign flapping near 90 degree differences
        const EPSILON: f32 = 1e-6;
        if dot < -EPSILON {
            other = Self::new(-other.x, -other.y, -other.z, -other.w);
            dot = -dot;
        }

        dot = dot.clamp(-1.0, 1.0);

        // Nearly identical: lerp avoids dividing by sin(theta) ~ 0
        if dot > 0.9995 {
            return Self::new(
                self.x + (other.x - self.x) * t,
                self.y + (other.y - self.y) * t,
                self.z + (other.z - self.z) * t,
                self.w + (other.w - self.w) * t,
            )
            .normalize();
        }

        let theta = dot.acos();
        let sin_theta = theta.sin();
        let s1 = ((1.0 - t) * theta).sin() / sin_theta;
        let s2 = (t * theta).sin() / sin_theta;

        Self::new(
            self.x * s1 + other.x * s2,
            self.y * s1 + other.y * s2,
            self.z * s1 + other.z * s2,
            self.w * s1 + other.w * s2,
        )
    }

    /// Apply this rotation to `v`
    pub fn rotate(self, v: Vec3) -> Vec3 {
        let qv = Vec3::new(self.x, self.y, self.z);
        let uv = qv.cross(v);
        let uuv = qv.cross(uv);
        v + (uv * self.w + uuv) * 2.0
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite() && self.w.is_finite()
    }
}

impl Default for Quat {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Quat {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        Self::new(
            self.w * rhs.x + self.x * rhs.w + self.y * rhs.z - self.z * rhs.y,
            self.w * rhs.y - self.x * rhs.z + self.y * rhs.w + self.z * rhs.x,
            self.w * rhs.z + self.x * rhs.y - self.y * rhs.x + self.z * rhs.w,
            self.w * rhs.w - self.x * rhs.x - self.y * rhs.y - self.z * rhs.z,
        )
    }
}

impl MulAssign for Quat {
    fn mul_assign(&mut self, rhs: Self) {
        *self = *self * rhs;
    }
}

impl Mul<Vec3> for Quat {
    type Output = Vec3;

    fn mul(self, rhs: Vec3) -> Vec3 {
        self.rotate(rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::f32::consts::{FRAC_PI_2, PI};

    fn assert_vec_near(a: Vec3, b: Vec3) {
        assert!((a - b).length() < 1e-4, "{:?} != {:?}", a, b);
    }

    #[test]
    fn test_quaternion_identity() {
        let v = Vec3::new(1.0, 2.0, 3.0);
        assert_vec_near(Quat::IDENTITY * v, v);
    }

    #[test]
    fn test_quaternion_rotation_y() {
        let q = Quat::from_rotation_y(FRAC_PI_2);
        assert_vec_near(q * Vec3::X, Vec3::NEG_Z);
        assert_vec_near(q.forward(), Vec3::X);
    }

    #[test]
    fn test_look_rotation_points_forward() {
        for dir in [
            Vec3::X,
            Vec3::NEG_X,
            Vec3::Z,
            Vec3::NEG_Z,
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(-3.0, -2.0, 5.0),
        ] {
            let q = Quat::look_rotation(dir, Vec3::Y).unwrap();
            assert_vec_near(q.forward(), dir.normalize());
        }
    }

    #[test]
    fn test_look_rotation_keeps_up_vertical() {
        let q = Quat::look_rotation(Vec3::new(1.0, 0.0, 1.0), Vec3::Y).unwrap();
        assert_vec_near(q.rotate(Vec3::Y), Vec3::Y);
    }

    #[test]
    fn test_look_rotation_straight_up() {
        let q = Quat::look_rotation(Vec3::Y, Vec3::Y).unwrap();
        assert_vec_near(q.forward(), Vec3::Y);
    }

    #[test]
    fn test_look_rotation_zero_direction() {
        assert!(Quat::look_rotation(Vec3::ZERO, Vec3::Y).is_none());
    }

    #[test]
    fn test_leveled_keeps_yaw() {
        let pitched = Quat::look_rotation(Vec3::new(1.0, 1.0, 0.0), Vec3::Y).unwrap();
        let level = pitched.leveled();
        assert_vec_near(level.forward(), Vec3::X);
        assert_vec_near(level.rotate(Vec3::Y), Vec3::Y);
    }

    #[test]
    fn test_quaternion_slerp() {
        let q1 = Quat::IDENTITY;
        let q2 = Quat::from_rotation_y(PI);

        let mid = q1.slerp(q2, 0.5);
        let expected = Quat::from_rotation_y(PI / 2.0);

        assert!((mid.dot(expected)).abs() > 0.999);
    }

    #[test]
    fn test_slerp_endpoints() {
        let a = Quat::from_rotation_y(0.3);
        let b = Quat::from_rotation_y(1.2);
        assert!(a.slerp(b, 0.0).angle_to(a) < 1e-3);
        assert!(a.slerp(b, 1.0).angle_to(b) < 1e-3);
    }
}
