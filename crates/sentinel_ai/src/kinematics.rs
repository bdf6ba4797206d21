//! Kinematic executor
//!
//! Turns a [`BehaviorDecision`] into the next pose: a capped straight-line
//! step toward the goal plus a slerp toward the desired facing.

use crate::behavior::BehaviorDecision;
use sentinel_math::{move_towards, Quat, Vec3};

/// Position and orientation of an agent
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Pose {
    pub position: Vec3,
    pub orientation: Quat,
}

impl Pose {
    pub fn new(position: Vec3, orientation: Quat) -> Self {
        Self {
            position,
            orientation,
        }
    }

    /// Pose at `position` facing world `+Z`
    pub fn at(position: Vec3) -> Self {
        Self::new(position, Quat::IDENTITY)
    }

    /// World-space facing direction
    pub fn forward(&self) -> Vec3 {
        self.orientation.forward()
    }

    pub fn is_finite(&self) -> bool {
        self.position.is_finite() && self.orientation.is_finite()
    }
}

/// Advance `pose` by one tick of `dt` seconds.
///
/// Translation never overshoots the goal. Facing turns toward
/// `decision.face_target` (seen from the new position) or else toward the
/// direction of travel; a degenerate direction leaves the orientation as is.
pub fn step(pose: Pose, decision: &BehaviorDecision, rotation_speed: f32, dt: f32) -> Pose {
    let max_step = (decision.move_speed * dt).max(0.0);
    let position = move_towards(pose.position, decision.goal_position, max_step);

    let facing = match decision.face_target {
        Some(target) => target - position,
        None => decision.goal_position - pose.position,
    };

    let orientation = match Quat::look_rotation(facing, Vec3::Y) {
        Some(desired) => turn_towards(pose.orientation, desired, rotation_speed, dt),
        None => pose.orientation,
    };

    Pose {
        position,
        orientation,
    }
}

/// Slerp `current` toward `desired` by `rotation_speed * dt`, clamped to `[0, 1]`
pub fn turn_towards(current: Quat, desired: Quat, rotation_speed: f32, dt: f32) -> Quat {
    let t = (rotation_speed * dt).clamp(0.0, 1.0);
    current.slerp(desired, t).normalize()
}
