//! # sentinel_math - Agent Math Primitives
//!
//! Plain value types for agent perception and locomotion: vectors,
//! quaternions, rays, and the geometry predicates the AI core is built on.
//! Everything here is `Copy` and side-effect free.

pub mod geometry;
pub mod quaternion;
pub mod ray;
pub mod vector;

pub use geometry::*;
pub use quaternion::*;
pub use ray::*;
pub use vector::*;

/// Common math constants
pub mod consts {
    pub const PI: f32 = core::f32::consts::PI;
    pub const TAU: f32 = PI * 2.0;
    pub const DEG_TO_RAD: f32 = PI / 180.0;
    pub const RAD_TO_DEG: f32 = 180.0 / PI;
    /// Below this length a direction is treated as undefined
    pub const DIRECTION_EPSILON: f32 = 1e-6;
}

/// Convert degrees to radians
#[inline]
pub fn radians(degrees: f32) -> f32 {
    degrees * consts::DEG_TO_RAD
}

/// Convert radians to degrees
#[inline]
pub fn degrees(radians: f32) -> f32 {
    radians * consts::RAD_TO_DEG
}

pub mod prelude {
    pub use crate::geometry::{
        angle_between, direction, distance, move_towards, point_in_circle, point_in_cone,
    };
    pub use crate::quaternion::Quat;
    pub use crate::ray::Ray;
    pub use crate::vector::Vec3;
    pub use crate::{degrees, radians};
}
