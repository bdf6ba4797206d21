//! Navigation backend interface
//!
//! Agents move in straight lines by default. A host with a navigation mesh
//! can plug in a [`Navigator`]; patrol and return goals are then handed to it
//! and the host moves the agent, writing the pose back each tick.

use sentinel_math::Vec3;

/// Progress of the most recent path request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NavStatus {
    /// Nothing requested yet
    #[default]
    Idle,
    /// Path accepted and being followed
    Pending,
    /// Destination reached
    Reached,
    /// No path exists to the destination
    Unreachable,
}

/// Path-finding collaborator
pub trait Navigator: Send {
    /// Ask for a path to `goal`; `false` if the request was rejected outright
    fn request_path(&mut self, goal: Vec3) -> bool;

    /// Status of the last accepted request
    fn status(&self) -> NavStatus;
}

/// Tracks which goal is currently delegated so requests are only sent when
/// the goal changes.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NavRequest {
    goal: Option<Vec3>,
}

impl NavRequest {
    /// Goals closer than this are considered the same request
    const SAME_GOAL: f32 = 1e-3;

    /// Currently delegated goal
    pub fn goal(&self) -> Option<Vec3> {
        self.goal
    }

    /// Send `goal` to `navigator` if it differs from the last one.
    ///
    /// Returns `false` when the navigator rejected a new request.
    pub fn submit(&mut self, navigator: &mut dyn Navigator, goal: Vec3) -> bool {
        if let Some(current) = self.goal {
            if current.distance(goal) < Self::SAME_GOAL {
                return true;
            }
        }
        if navigator.request_path(goal) {
            self.goal = Some(goal);
            true
        } else {
            self.goal = None;
            false
        }
    }

    /// Forget the delegated goal (e.g. when pursuit takes over)
    pub fn clear(&mut self) {
        self.goal = None;
    }
}
