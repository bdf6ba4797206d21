//! Perception and sensing
//!
//! [`evaluate`] is a pure function of geometry, policy and an optional
//! line-of-sight backend. It never touches agent memory, so every policy can
//! be unit tested without a live scene.

use sentinel_math::{distance, point_in_circle, point_in_cone, radians, Ray, Vec3};
use serde::{Deserialize, Serialize};

/// How an agent decides whether it can see its target
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum PerceptionPolicy {
    /// Visible inside a fixed radius
    RadiusOnly { detection_radius: f32 },
    /// Visible inside `detection_radius`; pursuit only inside `alert_radius`
    RadiusWithAlert { detection_radius: f32, alert_radius: f32 },
    /// Visible inside a view cone with clear line of sight
    ConeOcclusion {
        detection_range: f32,
        field_of_view_degrees: f32,
    },
    /// Binary near/far switch used by patrolling agents
    WaypointFollow { follow_distance: f32 },
}

impl PerceptionPolicy {
    /// Outermost distance at which this policy can ever see a target
    pub fn max_range(&self) -> f32 {
        match *self {
            Self::RadiusOnly { detection_radius } => detection_radius,
            Self::RadiusWithAlert {
                detection_radius, ..
            } => detection_radius,
            Self::ConeOcclusion {
                detection_range, ..
            } => detection_range,
            Self::WaypointFollow { follow_distance } => follow_distance,
        }
    }

    /// Whether this policy needs an [`OcclusionQuery`]
    pub fn uses_line_of_sight(&self) -> bool {
        matches!(self, Self::ConeOcclusion { .. })
    }
}

/// First surface struck by a line-of-sight ray
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitInfo {
    /// Distance from the ray origin
    pub distance: f32,
    /// Whether the surface belongs to the target
    pub is_target: bool,
}

/// Line-of-sight backend provided by the host's physics layer.
///
/// Treated as an instantaneous pure query; any time slicing is the host's job.
pub trait OcclusionQuery: Send {
    /// Cast `ray` up to `max_distance`; `None` means nothing was struck
    fn cast(&self, ray: &Ray, max_distance: f32) -> Option<HitInfo>;
}

impl<F> OcclusionQuery for F
where
    F: Fn(&Ray, f32) -> Option<HitInfo> + Send,
{
    fn cast(&self, ray: &Ray, max_distance: f32) -> Option<HitInfo> {
        self(ray, max_distance)
    }
}

/// Outcome of one perception pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerceptionResult {
    /// Target passes every test of the policy
    pub target_visible: bool,
    /// Distance to the target (infinite when there is none)
    pub distance: f32,
    /// Target is inside the alert zone (`RadiusWithAlert` only)
    pub in_alert_zone: bool,
}

impl PerceptionResult {
    /// Result for a tick without any target
    pub fn unseen() -> Self {
        Self {
            target_visible: false,
            distance: f32::INFINITY,
            in_alert_zone: false,
        }
    }
}

/// Evaluate whether `target` is perceived from `position` facing `forward`.
///
/// `occlusion` is consulted only by [`PerceptionPolicy::ConeOcclusion`]; when
/// it is `None` that policy falls back to range and angle tests alone.
pub fn evaluate(
    position: Vec3,
    forward: Vec3,
    target: Vec3,
    policy: &PerceptionPolicy,
    occlusion: Option<&dyn OcclusionQuery>,
) -> PerceptionResult {
    let dist = distance(position, target);

    let (target_visible, in_alert_zone) = match *policy {
        PerceptionPolicy::RadiusOnly { detection_radius } => {
            (point_in_circle(position, detection_radius, target), false)
        }
        PerceptionPolicy::RadiusWithAlert {
            detection_radius,
            alert_radius,
        } => {
            // Alert zone never extends past detection
            let alert_radius = alert_radius.min(detection_radius);
            (
                point_in_circle(position, detection_radius, target),
                point_in_circle(position, alert_radius, target),
            )
        }
        PerceptionPolicy::ConeOcclusion {
            detection_range,
            field_of_view_degrees,
        } => (
            cone_visible(
                position,
                forward,
                target,
                detection_range,
                field_of_view_degrees,
                occlusion,
            ),
            false,
        ),
        PerceptionPolicy::WaypointFollow { follow_distance } => {
            (point_in_circle(position, follow_distance, target), false)
        }
    };

    PerceptionResult {
        target_visible,
        distance: dist,
        in_alert_zone,
    }
}

fn cone_visible(
    position: Vec3,
    forward: Vec3,
    target: Vec3,
    range: f32,
    fov_degrees: f32,
    occlusion: Option<&dyn OcclusionQuery>,
) -> bool {
    if !point_in_cone(position, forward, radians(fov_degrees) / 2.0, range, target) {
        return false;
    }

    let ray = match Ray::line_of_sight(position, target) {
        Some(ray) => ray,
        // Target is on top of us
        None => return true,
    };

    match occlusion {
        Some(query) => query
            .cast(&ray, range)
            .map(|hit| hit.is_target)
            .unwrap_or(false),
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn radius(r: f32) -> PerceptionPolicy {
        PerceptionPolicy::RadiusOnly { detection_radius: r }
    }

    fn cone(range: f32, fov: f32) -> PerceptionPolicy {
        PerceptionPolicy::ConeOcclusion {
            detection_range: range,
            field_of_view_degrees: fov,
        }
    }

    fn clear_sight(_ray: &Ray, max: f32) -> Option<HitInfo> {
        Some(HitInfo {
            distance: max * 0.5,
            is_target: true,
        })
    }

    fn blocked(_ray: &Ray, _max: f32) -> Option<HitInfo> {
        Some(HitInfo {
            distance: 1.0,
            is_target: false,
        })
    }

    fn nothing_hit(_ray: &Ray, _max: f32) -> Option<HitInfo> {
        None
    }

    #[test]
    fn test_radius_strict_boundary() {
        let policy = radius(30.0);
        for (d, expected) in [(0.0, true), (29.9, true), (30.0, false), (40.0, false)] {
            let result = evaluate(Vec3::ZERO, Vec3::Z, Vec3::new(d, 0.0, 0.0), &policy, None);
            assert_eq!(result.target_visible, expected, "distance {}", d);
            assert!(!result.in_alert_zone);
            assert!((result.distance - d).abs() < 1e-5);
        }
    }

    #[test]
    fn test_radius_ignores_facing() {
        let result = evaluate(
            Vec3::ZERO,
            Vec3::Z,
            Vec3::new(0.0, 0.0, -5.0),
            &radius(10.0),
            Some(&blocked),
        );
        assert!(result.target_visible);
    }

    #[test]
    fn test_alert_zone_implies_visible() {
        let policy = PerceptionPolicy::RadiusWithAlert {
            detection_radius: 30.0,
            alert_radius: 15.0,
        };

        let mut d = 0.0;
        while d < 50.0 {
            let result = evaluate(Vec3::ZERO, Vec3::Z, Vec3::new(0.0, 0.0, d), &policy, None);
            if result.in_alert_zone {
                assert!(result.target_visible);
            }
            d += 0.5;
        }

        let aware = evaluate(Vec3::ZERO, Vec3::Z, Vec3::new(20.0, 0.0, 0.0), &policy, None);
        assert!(aware.target_visible);
        assert!(!aware.in_alert_zone);

        let alert = evaluate(Vec3::ZERO, Vec3::Z, Vec3::new(10.0, 0.0, 0.0), &policy, None);
        assert!(alert.target_visible);
        assert!(alert.in_alert_zone);
    }

    #[test]
    fn test_alert_wider_than_detection_is_clamped() {
        let policy = PerceptionPolicy::RadiusWithAlert {
            detection_radius: 10.0,
            alert_radius: 50.0,
        };
        let result = evaluate(Vec3::ZERO, Vec3::Z, Vec3::new(20.0, 0.0, 0.0), &policy, None);
        assert!(!result.target_visible);
        assert!(!result.in_alert_zone);
    }

    #[test]
    fn test_cone_dead_ahead_visible_for_any_fov() {
        for fov in [0.5, 10.0, 45.0, 90.0, 180.0, 360.0] {
            let result = evaluate(
                Vec3::ZERO,
                Vec3::Z,
                Vec3::new(0.0, 0.0, 5.0),
                &cone(10.0, fov),
                Some(&clear_sight),
            );
            assert!(result.target_visible, "fov {}", fov);
        }
    }

    #[test]
    fn test_cone_outside_angle() {
        // 45 degree cone: half-angle 22.5, target at 45 degrees off-axis
        let result = evaluate(
            Vec3::ZERO,
            Vec3::Z,
            Vec3::new(5.0, 0.0, 5.0),
            &cone(20.0, 45.0),
            Some(&clear_sight),
        );
        assert!(!result.target_visible);
    }

    #[test]
    fn test_cone_out_of_range() {
        let result = evaluate(
            Vec3::ZERO,
            Vec3::Z,
            Vec3::new(0.0, 0.0, 10.0),
            &cone(10.0, 90.0),
            Some(&clear_sight),
        );
        assert!(!result.target_visible);
    }

    #[test]
    fn test_cone_occluded() {
        let target = Vec3::new(0.0, 0.0, 5.0);
        let policy = cone(10.0, 90.0);

        let result = evaluate(Vec3::ZERO, Vec3::Z, target, &policy, Some(&blocked));
        assert!(!result.target_visible);

        // Nothing struck means nothing seen either
        let result = evaluate(Vec3::ZERO, Vec3::Z, target, &policy, Some(&nothing_hit));
        assert!(!result.target_visible);
    }

    #[test]
    fn test_cone_without_occlusion_is_angle_only() {
        let result = evaluate(
            Vec3::ZERO,
            Vec3::Z,
            Vec3::new(0.0, 0.0, 5.0),
            &cone(10.0, 45.0),
            None,
        );
        assert!(result.target_visible);
    }

    #[test]
    fn test_cone_ray_aims_at_target() {
        let agent = Vec3::new(1.0, 0.0, 1.0);
        let target = Vec3::new(1.0, 0.0, 7.0);
        let check = move |ray: &Ray, max: f32| {
            assert_eq!(ray.origin, agent);
            assert!((ray.direction - Vec3::Z).length() < 1e-5);
            assert_eq!(max, 10.0);
            Some(HitInfo {
                distance: 6.0,
                is_target: true,
            })
        };
        let result = evaluate(agent, Vec3::Z, target, &cone(10.0, 30.0), Some(&check));
        assert!(result.target_visible);
    }

    #[test]
    fn test_waypoint_follow() {
        let policy = PerceptionPolicy::WaypointFollow { follow_distance: 5.0 };
        let near = evaluate(Vec3::ZERO, Vec3::Z, Vec3::new(4.0, 0.0, 0.0), &policy, None);
        let far = evaluate(Vec3::ZERO, Vec3::Z, Vec3::new(5.0, 0.0, 0.0), &policy, None);
        assert!(near.target_visible);
        assert!(!far.target_visible);
    }

    #[test]
    fn test_unseen() {
        let result = PerceptionResult::unseen();
        assert!(!result.target_visible);
        assert!(!result.in_alert_zone);
        assert!(result.distance.is_infinite());
    }
}
