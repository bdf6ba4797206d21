//! Per-agent controller
//!
//! Owns one agent and runs its full pipeline once per [`AgentController::tick`]:
//! perception, state machine, decision, then either direct kinematics or a
//! hand-off to the navigation backend.

use crate::behavior::{build_state_machine, decide, BehaviorDecision, BehaviorState, TransitionContext};
use crate::config::{AgentConfig, PatrolRoute};
use crate::error::AgentError;
use crate::kinematics::{step, Pose};
use crate::navigation::{NavRequest, NavStatus, Navigator};
use crate::perception::{evaluate, OcclusionQuery, PerceptionResult};
use crate::state_machine::{StateChange, StateMachine};
use crate::waypoint::{SharedWaypoints, WaypointCursor, ARRIVAL_EPSILON};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use sentinel_math::{consts::TAU, Vec3};

/// Per-agent memory carried between ticks
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AgentMemory {
    /// Target was visible last tick
    pub detected: bool,
    /// Index of the waypoint currently headed for
    pub current_waypoint_index: usize,
    /// Seconds since the last wander destination was picked
    pub wander_timer: f32,
    /// Current wander destination
    pub wander_goal: Option<Vec3>,
}

/// Mutable agent data
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Agent {
    pub pose: Pose,
    /// Spawn position, captured once
    pub home_position: Vec3,
    pub memory: AgentMemory,
}

/// Everything that happened to an agent in one tick
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    /// State after this tick's transition
    pub state: BehaviorState,
    /// Transition taken this tick, if any
    pub transition: Option<StateChange<BehaviorState>>,
    pub perception: PerceptionResult,
    pub decision: BehaviorDecision,
}

/// Decision core for a single agent
pub struct AgentController {
    label: String,
    config: AgentConfig,
    agent: Agent,
    fsm: StateMachine<BehaviorState, TransitionContext>,
    cursor: WaypointCursor,
    waypoints: SharedWaypoints,
    occlusion: Option<Box<dyn OcclusionQuery>>,
    navigator: Option<Box<dyn Navigator>>,
    nav_request: NavRequest,
    rng: SmallRng,
    last_decision: Option<BehaviorDecision>,
    diagnostics: Vec<AgentError>,
}

impl AgentController {
    /// Spawn an agent at `spawn`; its position becomes home.
    ///
    /// Invalid configuration values are clamped and reported in one warning.
    pub fn new(spawn: Pose, config: AgentConfig, waypoints: SharedWaypoints) -> Self {
        let (config, issues) = config.validated();
        if !issues.is_empty() {
            let summary: Vec<String> = issues.iter().map(ToString::to_string).collect();
            log::warn!("Agent config adjusted: {}", summary.join("; "));
        }

        let rng = match config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };

        let mut memory = AgentMemory::default();
        if let PatrolRoute::Wander { interval, .. } = config.patrol {
            // First patrol tick picks a destination immediately
            memory.wander_timer = interval;
        }

        Self {
            label: "agent".to_string(),
            config,
            agent: Agent {
                pose: spawn,
                home_position: spawn.position,
                memory,
            },
            fsm: build_state_machine(),
            cursor: WaypointCursor::new(),
            waypoints,
            occlusion: None,
            navigator: None,
            nav_request: NavRequest::default(),
            rng,
            last_decision: None,
            diagnostics: issues,
        }
    }

    /// Name used in log lines
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Wire a line-of-sight backend
    pub fn with_occlusion(mut self, occlusion: Box<dyn OcclusionQuery>) -> Self {
        self.occlusion = Some(occlusion);
        self
    }

    /// Wire a navigation backend for patrol and return movement
    pub fn with_navigator(mut self, navigator: Box<dyn Navigator>) -> Self {
        self.navigator = Some(navigator);
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn agent(&self) -> &Agent {
        &self.agent
    }

    pub fn pose(&self) -> Pose {
        self.agent.pose
    }

    pub fn state(&self) -> BehaviorState {
        *self.fsm.current()
    }

    pub fn home(&self) -> Vec3 {
        self.agent.home_position
    }

    pub fn memory(&self) -> &AgentMemory {
        &self.agent.memory
    }

    /// Shared waypoint handle this agent patrols
    pub fn waypoints(&self) -> &SharedWaypoints {
        &self.waypoints
    }

    /// Decision from the most recent tick
    pub fn last_decision(&self) -> Option<&BehaviorDecision> {
        self.last_decision.as_ref()
    }

    /// Conditions reported so far (each kind at most once, plus config clamps)
    pub fn diagnostics(&self) -> &[AgentError] {
        &self.diagnostics
    }

    /// Overwrite the pose, e.g. after the navigation backend moved the agent
    pub fn set_pose(&mut self, pose: Pose) {
        self.agent.pose = pose;
    }

    /// Run one tick against a target snapshot.
    ///
    /// Rejects unusable input without touching the agent.
    pub fn tick(&mut self, target: Option<Vec3>, dt: f32) -> Result<TickReport, AgentError> {
        if !dt.is_finite() || dt < 0.0 {
            return Err(AgentError::InvalidInput("dt must be finite and non-negative"));
        }
        if target.map_or(false, |t| !t.is_finite()) {
            return Err(AgentError::InvalidInput("target position is not finite"));
        }
        if !self.agent.pose.is_finite() {
            return Err(AgentError::InvalidInput("agent pose is not finite"));
        }

        if self.config.perception.uses_line_of_sight() && self.occlusion.is_none() {
            self.report_once(AgentError::OcclusionQueryUnavailable);
        }

        let pose = self.agent.pose;
        let perception = match target {
            Some(target) => evaluate(
                pose.position,
                pose.forward(),
                target,
                &self.config.perception,
                self.occlusion.as_deref(),
            ),
            None => {
                self.report_once(AgentError::MissingTarget);
                PerceptionResult::unseen()
            }
        };

        if perception.target_visible && !self.agent.memory.detected {
            log::info!("{}: target detected at {:.2}", self.label, perception.distance);
        }

        let can_patrol = self.can_patrol();
        let at_home = pose.position.distance(self.agent.home_position) < ARRIVAL_EPSILON;
        let context = TransitionContext::from_perception(
            &perception,
            &self.config.perception,
            self.agent.memory.detected,
            at_home,
            can_patrol,
        );

        let mut transition = self.fsm.update(&context);
        if let Some(change) = &transition {
            self.on_transition(change);
        }
        self.agent.memory.detected = perception.target_visible;

        let state = self.state();
        let visible_target = target.filter(|_| perception.target_visible);
        let patrol_goal = if state == BehaviorState::Patrolling {
            self.patrol_goal(dt)
        } else {
            self.agent.pose.position
        };

        let decision = decide(
            state,
            self.agent.pose.position,
            self.agent.home_position,
            visible_target,
            &self.config.movement,
            patrol_goal,
        );

        let delegated = self.navigator.is_some()
            && matches!(state, BehaviorState::Patrolling | BehaviorState::Returning);
        if delegated {
            if let Some(change) = self.navigate(state, decision.goal_position) {
                transition = Some(change);
            }
        } else {
            self.agent.pose = step(
                self.agent.pose,
                &decision,
                self.config.movement.rotation_speed,
                dt,
            );
        }

        self.last_decision = Some(decision);
        log::trace!(
            "{}: {} goal=({:.2}, {:.2}, {:.2}) speed={:.2}",
            self.label,
            state,
            decision.goal_position.x,
            decision.goal_position.y,
            decision.goal_position.z,
            decision.move_speed
        );

        Ok(TickReport {
            state: self.state(),
            transition,
            perception,
            decision,
        })
    }

    fn can_patrol(&mut self) -> bool {
        match self.config.patrol {
            PatrolRoute::Stationary => false,
            PatrolRoute::Wander { .. } => true,
            PatrolRoute::Waypoints => {
                let has_points = !self.waypoints.is_empty();
                if !has_points {
                    self.report_once(AgentError::EmptyWaypointSet);
                }
                has_points
            }
        }
    }

    fn on_transition(&mut self, change: &StateChange<BehaviorState>) {
        log::info!("{}: {} -> {}", self.label, change.from, change.to);

        if change.from == BehaviorState::Returning && change.to == BehaviorState::Idle {
            // Back on station: keep heading, drop any pitch or roll
            self.agent.pose.orientation = self.agent.pose.orientation.leveled();
        }
        if change.to.is_pursuit() || change.from == BehaviorState::Returning {
            self.nav_request.clear();
        }
        if change.from == BehaviorState::Patrolling {
            self.agent.memory.wander_goal = None;
            self.agent.memory.wander_timer = 0.0;
        }
    }

    fn patrol_goal(&mut self, dt: f32) -> Vec3 {
        let position = self.agent.pose.position;
        match self.config.patrol {
            PatrolRoute::Stationary => position,
            PatrolRoute::Waypoints => {
                let cursor = &mut self.cursor;
                let goal = self.waypoints.with_points(|points| cursor.goal(position, points));
                if cursor.index() != self.agent.memory.current_waypoint_index {
                    log::debug!("{}: heading for waypoint {}", self.label, cursor.index());
                    self.agent.memory.current_waypoint_index = cursor.index();
                }
                goal
            }
            PatrolRoute::Wander { radius, interval } => {
                let memory = &mut self.agent.memory;
                memory.wander_timer += dt;
                let timer = memory.wander_timer;
                if let Some(goal) = memory.wander_goal.filter(|_| timer < interval) {
                    return goal;
                }

                // Uniform over the disc
                let angle = self.rng.gen_range(0.0..TAU);
                let reach = radius * self.rng.gen::<f32>().sqrt();
                let goal = position + Vec3::new(reach * angle.cos(), 0.0, reach * angle.sin());
                memory.wander_goal = Some(goal);
                memory.wander_timer = 0.0;
                log::debug!(
                    "{}: wandering to ({:.2}, {:.2}, {:.2})",
                    self.label,
                    goal.x,
                    goal.y,
                    goal.z
                );
                goal
            }
        }
    }

    /// Hand `goal` to the navigator; returns a forced transition if the
    /// outcome ended the current state.
    fn navigate(&mut self, state: BehaviorState, goal: Vec3) -> Option<StateChange<BehaviorState>> {
        let navigator = self.navigator.as_deref_mut()?;
        if !self.nav_request.submit(navigator, goal) {
            return self.path_failed(state, goal);
        }
        match navigator.status() {
            NavStatus::Unreachable => self.path_failed(state, goal),
            NavStatus::Reached => self.path_reached(state),
            NavStatus::Idle | NavStatus::Pending => None,
        }
    }

    fn path_reached(&mut self, state: BehaviorState) -> Option<StateChange<BehaviorState>> {
        self.nav_request.clear();
        match state {
            BehaviorState::Returning => Some(self.settle_idle()),
            BehaviorState::Patrolling => {
                self.next_patrol_goal();
                None
            }
            _ => None,
        }
    }

    fn path_failed(&mut self, state: BehaviorState, goal: Vec3) -> Option<StateChange<BehaviorState>> {
        // The first failure is also warned through the diagnostics
        log::debug!(
            "{}: no path to ({:.2}, {:.2}, {:.2}) while {}",
            self.label,
            goal.x,
            goal.y,
            goal.z,
            state
        );
        self.report_once(AgentError::PathUnreachable(goal.x, goal.y, goal.z));
        self.nav_request.clear();
        match state {
            // Give up on home and hold where we are
            BehaviorState::Returning => Some(self.settle_idle()),
            BehaviorState::Patrolling => {
                self.next_patrol_goal();
                None
            }
            _ => None,
        }
    }

    fn settle_idle(&mut self) -> StateChange<BehaviorState> {
        let change = self.fsm.force_transition(BehaviorState::Idle);
        self.on_transition(&change);
        change
    }

    fn next_patrol_goal(&mut self) {
        match self.config.patrol {
            PatrolRoute::Waypoints => {
                self.cursor.skip(self.waypoints.len());
                self.agent.memory.current_waypoint_index = self.cursor.index();
            }
            PatrolRoute::Wander { .. } => self.agent.memory.wander_goal = None,
            PatrolRoute::Stationary => {}
        }
    }

    fn report_once(&mut self, error: AgentError) {
        let kind = std::mem::discriminant(&error);
        if self.diagnostics.iter().any(|e| std::mem::discriminant(e) == kind) {
            return;
        }
        log::warn!("{}: {}", self.label, error);
        self.diagnostics.push(error);
    }
}

impl std::fmt::Debug for AgentController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentController")
            .field("label", &self.label)
            .field("state", &self.state())
            .field("agent", &self.agent)
            .field("has_occlusion", &self.occlusion.is_some())
            .field("has_navigator", &self.navigator.is_some())
            .finish()
    }
}
