//! Behavior states and per-state decisions
//!
//! One state machine serves every perception policy. The policy only shapes
//! the [`TransitionContext`] (whether a visible target is pursued, and
//! whether pursuit is following or line-of-sight tracking).

use crate::config::MovementSettings;
use crate::perception::{PerceptionPolicy, PerceptionResult};
use crate::state_machine::{State, StateMachine};
use sentinel_math::Vec3;
use serde::{Deserialize, Serialize};

/// Exclusive behavior of an agent for one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BehaviorState {
    /// Stationary; faces the target if it is visible but not pursued
    Idle,
    /// Walking back to the spawn position
    Returning,
    /// Cycling waypoints or wandering
    Patrolling,
    /// Moving toward a visible target
    Following,
    /// Line-of-sight pursuit under a field-of-view policy
    Tracking,
}

impl State for BehaviorState {}

impl BehaviorState {
    /// Short lowercase name for logs
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Returning => "returning",
            Self::Patrolling => "patrolling",
            Self::Following => "following",
            Self::Tracking => "tracking",
        }
    }

    /// Whether the agent is chasing its target
    pub fn is_pursuit(&self) -> bool {
        matches!(self, Self::Following | Self::Tracking)
    }
}

impl std::fmt::Display for BehaviorState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Kind of pursuit a visible target triggers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Engagement {
    Follow,
    Track,
}

impl Engagement {
    pub fn for_policy(policy: &PerceptionPolicy) -> Self {
        if policy.uses_line_of_sight() {
            Self::Track
        } else {
            Self::Follow
        }
    }
}

/// Facts the state machine sees each tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitionContext {
    /// Target passes the perception policy
    pub visible: bool,
    /// A visible target should be chased (alert zone, or any sighting for
    /// policies without one)
    pub pursue: bool,
    /// Following or tracking
    pub engage: Engagement,
    /// Target was detected last tick and is gone now
    pub lost_target: bool,
    /// Within arrival epsilon of home
    pub at_home: bool,
    /// A patrol route is available (non-empty waypoints or wander)
    pub can_patrol: bool,
}

impl TransitionContext {
    /// Derive the context from a perception pass
    pub fn from_perception(
        perception: &PerceptionResult,
        policy: &PerceptionPolicy,
        was_detected: bool,
        at_home: bool,
        can_patrol: bool,
    ) -> Self {
        let pursue = match policy {
            PerceptionPolicy::RadiusWithAlert { .. } => perception.in_alert_zone,
            _ => perception.target_visible,
        };
        Self {
            visible: perception.target_visible,
            pursue: perception.target_visible && pursue,
            engage: Engagement::for_policy(policy),
            lost_target: was_detected && !perception.target_visible,
            at_home,
            can_patrol,
        }
    }
}

/// Build the behavior state machine, starting in [`BehaviorState::Idle`]
pub fn build_state_machine() -> StateMachine<BehaviorState, TransitionContext> {
    use BehaviorState::*;

    let mut fsm = StateMachine::new(Idle);

    // Sightings pre-empt everything else
    fsm.add_global_transition(Tracking, |ctx: &TransitionContext| {
        ctx.visible && ctx.engage == Engagement::Track
    });
    fsm.add_global_transition(Following, |ctx: &TransitionContext| {
        ctx.pursue && ctx.engage == Engagement::Follow
    });
    // Aware but not pursuing: hold position and watch
    fsm.add_global_transition(Idle, |ctx: &TransitionContext| {
        ctx.visible && !ctx.pursue && ctx.engage == Engagement::Follow
    });

    fsm.add_transition(Following, Returning, |ctx: &TransitionContext| !ctx.visible);
    fsm.add_transition(Tracking, Returning, |ctx: &TransitionContext| !ctx.visible);
    fsm.add_transition(Returning, Idle, |ctx: &TransitionContext| ctx.at_home);

    fsm.add_transition_priority(
        Idle,
        Returning,
        |ctx: &TransitionContext| ctx.lost_target && !ctx.at_home,
        1,
    );
    fsm.add_transition(Idle, Patrolling, |ctx: &TransitionContext| {
        ctx.can_patrol && !ctx.visible
    });
    fsm.add_transition(Patrolling, Idle, |ctx: &TransitionContext| !ctx.can_patrol);

    fsm
}

/// What the kinematic executor should do this tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BehaviorDecision {
    /// Point to move toward
    pub goal_position: Vec3,
    /// Point to turn toward; travel direction when `None`
    pub face_target: Option<Vec3>,
    /// Travel speed (units/s)
    pub move_speed: f32,
}

impl BehaviorDecision {
    /// Stand still, optionally watching a point
    pub fn hold(position: Vec3, face_target: Option<Vec3>) -> Self {
        Self {
            goal_position: position,
            face_target,
            move_speed: 0.0,
        }
    }

    /// Travel to `goal` facing the direction of motion
    pub fn travel(goal: Vec3, speed: f32) -> Self {
        Self {
            goal_position: goal,
            face_target: None,
            move_speed: speed,
        }
    }

    /// Close on a target while facing it
    pub fn pursue(target: Vec3, speed: f32) -> Self {
        Self {
            goal_position: target,
            face_target: Some(target),
            move_speed: speed,
        }
    }
}

/// Decision for every state except [`BehaviorState::Patrolling`], whose goal
/// comes from the patrol route.
///
/// `visible_target` is the target position when perception reports it visible.
pub fn decide(
    state: BehaviorState,
    position: Vec3,
    home: Vec3,
    visible_target: Option<Vec3>,
    movement: &MovementSettings,
    patrol_goal: Vec3,
) -> BehaviorDecision {
    match state {
        BehaviorState::Idle => BehaviorDecision::hold(position, visible_target),
        BehaviorState::Returning => BehaviorDecision::travel(home, movement.return_speed),
        BehaviorState::Patrolling => BehaviorDecision::travel(patrol_goal, movement.patrol_speed),
        BehaviorState::Following | BehaviorState::Tracking => match visible_target {
            Some(target) => BehaviorDecision::pursue(target, movement.follow_speed),
            // Pursuit states are only held while the target is visible
            None => BehaviorDecision::hold(position, None),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(visible: bool, pursue: bool, engage: Engagement) -> TransitionContext {
        TransitionContext {
            visible,
            pursue,
            engage,
            lost_target: false,
            at_home: true,
            can_patrol: false,
        }
    }

    #[test]
    fn test_idle_stays_idle_without_patrol() {
        let mut fsm = build_state_machine();
        assert_eq!(fsm.update(&ctx(false, false, Engagement::Follow)), None);
        assert!(fsm.is_in(&BehaviorState::Idle));
    }

    #[test]
    fn test_idle_to_patrolling() {
        let mut fsm = build_state_machine();
        let context = TransitionContext {
            can_patrol: true,
            ..ctx(false, false, Engagement::Follow)
        };
        fsm.update(&context);
        assert!(fsm.is_in(&BehaviorState::Patrolling));

        // Waypoints removed at runtime
        let context = TransitionContext {
            can_patrol: false,
            ..context
        };
        fsm.update(&context);
        assert!(fsm.is_in(&BehaviorState::Idle));
    }

    #[test]
    fn test_visible_target_followed() {
        let mut fsm = build_state_machine();
        fsm.update(&ctx(true, true, Engagement::Follow));
        assert!(fsm.is_in(&BehaviorState::Following));

        // Stays put while visible
        assert_eq!(fsm.update(&ctx(true, true, Engagement::Follow)), None);

        fsm.update(&TransitionContext {
            at_home: false,
            lost_target: true,
            ..ctx(false, false, Engagement::Follow)
        });
        assert!(fsm.is_in(&BehaviorState::Returning));
    }

    #[test]
    fn test_patrolling_interrupted_by_sighting() {
        let mut fsm = build_state_machine();
        fsm.force_transition(BehaviorState::Patrolling);
        fsm.update(&TransitionContext {
            can_patrol: true,
            ..ctx(true, true, Engagement::Follow)
        });
        assert!(fsm.is_in(&BehaviorState::Following));
    }

    #[test]
    fn test_cone_policy_tracks() {
        let mut fsm = build_state_machine();
        fsm.update(&ctx(true, true, Engagement::Track));
        assert!(fsm.is_in(&BehaviorState::Tracking));
        assert_eq!(fsm.update(&ctx(true, true, Engagement::Track)), None);

        fsm.update(&ctx(false, false, Engagement::Track));
        assert!(fsm.is_in(&BehaviorState::Returning));
    }

    #[test]
    fn test_aware_but_outside_alert_holds() {
        let mut fsm = build_state_machine();
        fsm.force_transition(BehaviorState::Following);
        fsm.update(&ctx(true, false, Engagement::Follow));
        assert!(fsm.is_in(&BehaviorState::Idle));

        // Target slips away while holding away from home
        fsm.update(&TransitionContext {
            at_home: false,
            lost_target: true,
            can_patrol: true,
            ..ctx(false, false, Engagement::Follow)
        });
        assert!(fsm.is_in(&BehaviorState::Returning));
    }

    #[test]
    fn test_returning_arrives_home() {
        let mut fsm = build_state_machine();
        fsm.force_transition(BehaviorState::Returning);

        fsm.update(&TransitionContext {
            at_home: false,
            ..ctx(false, false, Engagement::Follow)
        });
        assert!(fsm.is_in(&BehaviorState::Returning));

        let change = fsm.update(&ctx(false, false, Engagement::Follow)).unwrap();
        assert_eq!(change.from, BehaviorState::Returning);
        assert_eq!(change.to, BehaviorState::Idle);
    }

    #[test]
    fn test_context_alert_policy() {
        let policy = PerceptionPolicy::RadiusWithAlert {
            detection_radius: 30.0,
            alert_radius: 15.0,
        };
        let aware = PerceptionResult {
            target_visible: true,
            distance: 20.0,
            in_alert_zone: false,
        };
        let context = TransitionContext::from_perception(&aware, &policy, false, true, false);
        assert!(context.visible);
        assert!(!context.pursue);

        let alert = PerceptionResult {
            in_alert_zone: true,
            distance: 10.0,
            ..aware
        };
        let context = TransitionContext::from_perception(&alert, &policy, true, true, false);
        assert!(context.pursue);
        assert_eq!(context.engage, Engagement::Follow);
    }

    #[test]
    fn test_context_lost_target() {
        let policy = PerceptionPolicy::RadiusOnly { detection_radius: 5.0 };
        let context = TransitionContext::from_perception(
            &PerceptionResult::unseen(),
            &policy,
            true,
            false,
            false,
        );
        assert!(context.lost_target);
        assert!(!context.pursue);
    }

    #[test]
    fn test_decisions() {
        let movement = MovementSettings {
            patrol_speed: 1.0,
            follow_speed: 2.0,
            return_speed: 3.0,
            rotation_speed: 4.0,
        };
        let pos = Vec3::new(1.0, 0.0, 1.0);
        let home = Vec3::ZERO;
        let target = Vec3::new(5.0, 0.0, 5.0);
        let waypoint = Vec3::new(-4.0, 0.0, 0.0);

        let idle = decide(BehaviorState::Idle, pos, home, None, &movement, waypoint);
        assert_eq!(idle, BehaviorDecision::hold(pos, None));

        let watching = decide(BehaviorState::Idle, pos, home, Some(target), &movement, waypoint);
        assert_eq!(watching.face_target, Some(target));
        assert_eq!(watching.move_speed, 0.0);

        let back = decide(BehaviorState::Returning, pos, home, None, &movement, waypoint);
        assert_eq!(back.goal_position, home);
        assert_eq!(back.move_speed, 3.0);

        let patrol = decide(BehaviorState::Patrolling, pos, home, None, &movement, waypoint);
        assert_eq!(patrol.goal_position, waypoint);
        assert_eq!(patrol.move_speed, 1.0);
        assert_eq!(patrol.face_target, None);

        let chase = decide(BehaviorState::Following, pos, home, Some(target), &movement, waypoint);
        assert_eq!(chase, BehaviorDecision::pursue(target, 2.0));

        let track = decide(BehaviorState::Tracking, pos, home, Some(target), &movement, waypoint);
        assert_eq!(track.goal_position, target);
    }
}
