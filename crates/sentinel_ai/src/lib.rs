//! Sentinel AI - NPC perception and behavior
//!
//! Decision core for autonomous agents that watch for a single target,
//! pursue it when it comes close and otherwise stand guard, walk a patrol
//! route or wander.
//!
//! # Features
//!
//! - Pluggable perception policies (radius, alert ring, view cone with line of sight)
//! - Finite state machine driving Idle/Returning/Patrolling/Following/Tracking
//! - Shared, runtime-resizable waypoint routes and random wander
//! - Kinematic executor or an external navigation backend
//! - Group ticking against one target snapshot
//!
//! # Example
//!
//! ```ignore
//! use sentinel_ai::prelude::*;
//!
//! let mut guard = AgentController::new(
//!     Pose::at(Vec3::ZERO),
//!     AgentConfig::surveillance(),
//!     SharedWaypoints::empty(),
//! );
//! let report = guard.tick(Some(Vec3::new(10.0, 0.0, 0.0)), 1.0 / 60.0)?;
//! assert_eq!(report.state, BehaviorState::Following);
//! ```

pub mod behavior;
pub mod config;
pub mod controller;
pub mod debug;
pub mod error;
pub mod group;
pub mod kinematics;
pub mod navigation;
pub mod perception;
pub mod state_machine;
pub mod waypoint;

pub mod prelude {
    pub use crate::behavior::{BehaviorDecision, BehaviorState};
    pub use crate::config::{AgentConfig, MovementSettings, PatrolRoute};
    pub use crate::controller::{AgentController, AgentMemory, TickReport};
    pub use crate::debug::{draw_gizmos, DebugDraw};
    pub use crate::error::{AgentError, ConfigError};
    pub use crate::group::{AgentGroup, AgentId, SharedTarget, TargetProvider};
    pub use crate::kinematics::Pose;
    pub use crate::navigation::{NavStatus, Navigator};
    pub use crate::perception::{HitInfo, OcclusionQuery, PerceptionPolicy, PerceptionResult};
    pub use crate::state_machine::{State, StateChange, StateMachine};
    pub use crate::waypoint::{SharedWaypoints, ARRIVAL_EPSILON};
    pub use sentinel_math::{Quat, Ray, Vec3};
}

pub use prelude::*;
