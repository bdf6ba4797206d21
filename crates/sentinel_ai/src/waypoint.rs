//! Patrol waypoints and the cyclic cursor over them

use parking_lot::RwLock;
use sentinel_math::Vec3;
use std::sync::Arc;

/// Distance at which a goal counts as reached
pub const ARRIVAL_EPSILON: f32 = 0.1;

/// Waypoint set shared between the level (writer) and its agents (readers).
///
/// Agents only read; the set may be resized between ticks.
#[derive(Debug, Clone, Default)]
pub struct SharedWaypoints(Arc<RwLock<Vec<Vec3>>>);

impl SharedWaypoints {
    /// Create a shared set from points
    pub fn new(points: Vec<Vec3>) -> Self {
        Self(Arc::new(RwLock::new(points)))
    }

    /// An empty set
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of waypoints right now
    pub fn len(&self) -> usize {
        self.0.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.read().is_empty()
    }

    /// Copy of the current points
    pub fn snapshot(&self) -> Vec<Vec3> {
        self.0.read().clone()
    }

    /// Replace all points
    pub fn replace(&self, points: Vec<Vec3>) {
        *self.0.write() = points;
    }

    /// Append a point
    pub fn push(&self, point: Vec3) {
        self.0.write().push(point);
    }

    /// Run `f` with read access to the points
    pub fn with_points<R>(&self, f: impl FnOnce(&[Vec3]) -> R) -> R {
        f(&self.0.read())
    }
}

impl From<Vec<Vec3>> for SharedWaypoints {
    fn from(points: Vec<Vec3>) -> Self {
        Self::new(points)
    }
}

/// Pick the current patrol goal, advancing the index once it is reached.
///
/// A stale `index` (the set shrank) is clamped to the last waypoint. An empty
/// set yields the agent's own position, i.e. stand still.
pub fn advance_if_arrived(position: Vec3, waypoints: &[Vec3], index: usize) -> (Vec3, usize) {
    let len = waypoints.len();
    if len == 0 {
        return (position, 0);
    }

    let index = index.min(len - 1);
    if position.distance(waypoints[index]) < ARRIVAL_EPSILON {
        let next = (index + 1) % len;
        (waypoints[next], next)
    } else {
        (waypoints[index], index)
    }
}

/// Stateful cursor into a patrol route
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WaypointCursor {
    index: usize,
}

impl WaypointCursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current index
    pub fn index(&self) -> usize {
        self.index
    }

    /// Goal for this tick; advances on arrival
    pub fn goal(&mut self, position: Vec3, waypoints: &[Vec3]) -> Vec3 {
        let (goal, index) = advance_if_arrived(position, waypoints, self.index);
        self.index = index;
        goal
    }

    /// Skip the current waypoint (unreachable)
    pub fn skip(&mut self, len: usize) {
        self.index = if len == 0 { 0 } else { (self.index.min(len - 1) + 1) % len };
    }
}
