//! 3D ray for line-of-sight queries
//!
//! Perception casts a ray from the agent toward its target and hands it to
//! whatever occlusion backend the host provides.

use crate::geometry::direction;
use crate::vector::Vec3;

/// 3D ray with a unit-length direction
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    /// Start point
    pub origin: Vec3,
    /// Ray direction (normalized)
    pub direction: Vec3,
}

impl Ray {
    /// Ray from `origin` along `direction` (normalized here)
    #[inline]
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    /// Ray from `eye` toward `target`, or `None` when the two coincide
    pub fn line_of_sight(eye: Vec3, target: Vec3) -> Option<Self> {
        direction(eye, target).map(|direction| Self {
            origin: eye,
            direction,
        })
    }

    /// Point `t` units along the ray
    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Point on the ray nearest to `point` (the origin if `point` is behind it)
    pub fn closest_point(&self, point: Vec3) -> Vec3 {
        let t = (point - self.origin).dot(self.direction);
        if t <= 0.0 {
            self.origin
        } else {
            self.at(t)
        }
    }

    /// Distance from `point` to the ray
    pub fn distance_to_point(&self, point: Vec3) -> f32 {
        (point - self.closest_point(point)).length()
    }
}
