//! Debug visualization hooks
//!
//! [`draw_gizmos`] describes an agent's perception ranges, patrol route and
//! current goal through a host-provided [`DebugDraw`]. Drawing never affects
//! behavior.

use crate::config::PatrolRoute;
use crate::controller::AgentController;
use crate::perception::PerceptionPolicy;
use sentinel_math::{radians, Quat, Vec3};

/// RGBA color
pub type Color = [f32; 4];

/// Gizmo palette
pub mod colors {
    use super::Color;

    pub const DETECTION: Color = [1.0, 1.0, 0.4, 1.0];
    pub const ALERT: Color = [1.0, 0.4, 0.4, 1.0];
    pub const FIELD_OF_VIEW: Color = [0.4, 0.6, 1.0, 1.0];
    pub const WAYPOINT: Color = [0.4, 1.0, 0.4, 1.0];
    pub const WANDER: Color = [0.4, 1.0, 1.0, 0.5];
    pub const GOAL: Color = [1.0, 1.0, 1.0, 1.0];
}

/// Radius of the sphere drawn at each waypoint
pub const WAYPOINT_MARKER_RADIUS: f32 = 0.3;

/// Immediate-mode line drawing provided by the host
pub trait DebugDraw {
    /// Horizontal circle around `center`
    fn circle(&mut self, center: Vec3, radius: f32, color: Color);
    fn line(&mut self, from: Vec3, to: Vec3, color: Color);
    fn sphere(&mut self, center: Vec3, radius: f32, color: Color);
}

/// Emit gizmos for one agent
pub fn draw_gizmos(controller: &AgentController, draw: &mut dyn DebugDraw) {
    let pose = controller.pose();
    let position = pose.position;

    let perception = controller.config().perception;
    draw.circle(position, perception.max_range(), colors::DETECTION);
    match perception {
        PerceptionPolicy::RadiusWithAlert { alert_radius, .. } => {
            draw.circle(position, alert_radius, colors::ALERT);
        }
        PerceptionPolicy::ConeOcclusion {
            detection_range,
            field_of_view_degrees,
        } => {
            let half = radians(field_of_view_degrees * 0.5);
            let forward = pose.forward();
            for angle in [-half, half] {
                let edge = Quat::from_rotation_y(angle).rotate(forward);
                draw.line(position, position + edge * detection_range, colors::FIELD_OF_VIEW);
            }
        }
        PerceptionPolicy::RadiusOnly { .. } | PerceptionPolicy::WaypointFollow { .. } => {}
    }

    match controller.config().patrol {
        PatrolRoute::Waypoints => controller.waypoints().with_points(|points| {
            for point in points {
                draw.sphere(*point, WAYPOINT_MARKER_RADIUS, colors::WAYPOINT);
            }
        }),
        PatrolRoute::Wander { radius, .. } => {
            // Goals are picked around the current position
            draw.circle(position, radius, colors::WANDER);
        }
        PatrolRoute::Stationary => {}
    }

    if let Some(decision) = controller.last_decision() {
        if decision.goal_position.distance(position) > f32::EPSILON {
            draw.line(position, decision.goal_position, colors::GOAL);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AgentConfig;
    use crate::kinematics::Pose;
    use crate::waypoint::SharedWaypoints;

    #[derive(Default)]
    struct Recorder {
        circles: Vec<(Vec3, f32)>,
        lines: Vec<(Vec3, Vec3)>,
        spheres: Vec<Vec3>,
    }

    impl DebugDraw for Recorder {
        fn circle(&mut self, center: Vec3, radius: f32, _color: Color) {
            self.circles.push((center, radius));
        }

        fn line(&mut self, from: Vec3, to: Vec3, _color: Color) {
            self.lines.push((from, to));
        }

        fn sphere(&mut self, center: Vec3, _radius: f32, _color: Color) {
            self.spheres.push(center);
        }
    }

    #[test]
    fn test_surveillance_rings() {
        let ctrl = AgentController::new(
            Pose::at(Vec3::ZERO),
            AgentConfig::surveillance(),
            SharedWaypoints::empty(),
        );
        let mut rec = Recorder::default();
        draw_gizmos(&ctrl, &mut rec);

        assert_eq!(rec.circles, vec![(Vec3::ZERO, 30.0), (Vec3::ZERO, 15.0)]);
        // No tick yet, so no goal line
        assert!(rec.lines.is_empty());
    }

    #[test]
    fn test_cone_edges_are_symmetric() {
        let ctrl = AgentController::new(
            Pose::at(Vec3::ZERO),
            AgentConfig::tracking(),
            SharedWaypoints::empty(),
        );
        let mut rec = Recorder::default();
        draw_gizmos(&ctrl, &mut rec);

        assert_eq!(rec.circles, vec![(Vec3::ZERO, 10.0)]);
        assert_eq!(rec.lines.len(), 2);
        let (_, left) = rec.lines[0];
        let (_, right) = rec.lines[1];
        assert!((left.length() - 10.0).abs() < 1e-4);
        assert!((left.x + right.x).abs() < 1e-4);
        assert!((left.z - right.z).abs() < 1e-4);
        assert!(left.z > 0.0);
    }

    #[test]
    fn test_waypoints_and_goal_line() {
        let points = vec![Vec3::new(4.0, 0.0, 0.0), Vec3::new(4.0, 0.0, 4.0)];
        let mut ctrl = AgentController::new(
            Pose::at(Vec3::ZERO),
            AgentConfig::patrol_and_follow(),
            SharedWaypoints::new(points.clone()),
        );
        ctrl.tick(None, 0.1).unwrap();

        let mut rec = Recorder::default();
        draw_gizmos(&ctrl, &mut rec);
        assert_eq!(rec.spheres, points);
        assert_eq!(rec.lines, vec![(ctrl.pose().position, points[0])]);
    }

    #[test]
    fn test_wander_circle_follows_agent() {
        let mut ctrl = AgentController::new(
            Pose::at(Vec3::ZERO),
            AgentConfig::wander_patrol(),
            SharedWaypoints::empty(),
        );
        let moved = Vec3::new(3.0, 0.0, -2.0);
        ctrl.set_pose(Pose::at(moved));

        let mut rec = Recorder::default();
        draw_gizmos(&ctrl, &mut rec);
        assert_eq!(rec.circles, vec![(moved, 10.0), (moved, 10.0)]);
    }
}
