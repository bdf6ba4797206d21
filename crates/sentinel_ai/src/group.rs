//! Many agents sharing one target
//!
//! The target is sampled once per group tick so every agent reacts to the
//! same snapshot. A failing agent is logged and skipped; the rest still run.

use crate::config::AgentConfig;
use crate::controller::{AgentController, TickReport};
use crate::error::AgentError;
use crate::kinematics::Pose;
use crate::waypoint::SharedWaypoints;
use parking_lot::RwLock;
use sentinel_math::Vec3;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Source of the shared target position
pub trait TargetProvider: Send + Sync {
    /// Current target position, `None` if there is no target
    fn target_position(&self) -> Option<Vec3>;
}

impl<F> TargetProvider for F
where
    F: Fn() -> Option<Vec3> + Send + Sync,
{
    fn target_position(&self) -> Option<Vec3> {
        self()
    }
}

/// Target slot written by the host, read by the group
#[derive(Debug, Clone, Default)]
pub struct SharedTarget(Arc<RwLock<Option<Vec3>>>);

impl SharedTarget {
    pub fn new(position: Option<Vec3>) -> Self {
        Self(Arc::new(RwLock::new(position)))
    }

    pub fn set(&self, position: Vec3) {
        *self.0.write() = Some(position);
    }

    pub fn clear(&self) {
        *self.0.write() = None;
    }

    pub fn get(&self) -> Option<Vec3> {
        *self.0.read()
    }
}

impl TargetProvider for SharedTarget {
    fn target_position(&self) -> Option<Vec3> {
        self.get()
    }
}

/// Handle of an agent within a group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AgentId(u32);

impl AgentId {
    pub fn raw(&self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for AgentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "agent#{}", self.0)
    }
}

/// Agents ticked together against one target
pub struct AgentGroup {
    provider: Box<dyn TargetProvider>,
    agents: BTreeMap<AgentId, AgentController>,
    next_id: u32,
}

impl AgentGroup {
    pub fn new(provider: impl TargetProvider + 'static) -> Self {
        Self {
            provider: Box::new(provider),
            agents: BTreeMap::new(),
            next_id: 0,
        }
    }

    /// Spawn an agent at `spawn` with its own config
    pub fn spawn(&mut self, spawn: Pose, config: AgentConfig, waypoints: SharedWaypoints) -> AgentId {
        let id = AgentId(self.next_id);
        self.next_id += 1;
        let controller = AgentController::new(spawn, config, waypoints).with_label(id.to_string());
        log::debug!(
            "Spawned {} at ({:.2}, {:.2}, {:.2})",
            id,
            spawn.position.x,
            spawn.position.y,
            spawn.position.z
        );
        self.agents.insert(id, controller);
        id
    }

    /// Add an already configured controller (e.g. with collaborators wired)
    pub fn insert(&mut self, controller: AgentController) -> AgentId {
        let id = AgentId(self.next_id);
        self.next_id += 1;
        self.agents.insert(id, controller);
        id
    }

    pub fn despawn(&mut self, id: AgentId) -> Option<AgentController> {
        self.agents.remove(&id)
    }

    pub fn get(&self, id: AgentId) -> Option<&AgentController> {
        self.agents.get(&id)
    }

    pub fn get_mut(&mut self, id: AgentId) -> Option<&mut AgentController> {
        self.agents.get_mut(&id)
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Agents in spawn order
    pub fn iter(&self) -> impl Iterator<Item = (AgentId, &AgentController)> {
        self.agents.iter().map(|(id, ctrl)| (*id, ctrl))
    }

    /// Tick every agent against one target snapshot, in spawn order
    pub fn tick(&mut self, dt: f32) -> Vec<(AgentId, Result<TickReport, AgentError>)> {
        let target = self.provider.target_position();
        self.agents
            .iter_mut()
            .map(|(id, ctrl)| {
                let result = ctrl.tick(target, dt);
                if let Err(err) = &result {
                    log::error!("{} tick failed: {}", id, err);
                }
                (*id, result)
            })
            .collect()
    }
}

impl std::fmt::Debug for AgentGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentGroup")
            .field("agents", &self.agents.len())
            .field("next_id", &self.next_id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behavior::BehaviorState;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_spawn_and_despawn() {
        let mut group = AgentGroup::new(|| None::<Vec3>);
        let a = group.spawn(Pose::at(Vec3::ZERO), AgentConfig::surveillance(), SharedWaypoints::empty());
        let b = group.spawn(Pose::at(Vec3::X), AgentConfig::surveillance(), SharedWaypoints::empty());
        assert_ne!(a, b);
        assert_eq!(group.len(), 2);
        assert_eq!(group.get(b).map(|c| c.home()), Some(Vec3::X));
        assert_eq!(group.get(a).map(|c| c.label()), Some("agent#0"));

        assert!(group.despawn(a).is_some());
        assert!(group.get(a).is_none());
        assert_eq!(group.len(), 1);

        // Ids are never reused
        let c = group.spawn(Pose::at(Vec3::ZERO), AgentConfig::surveillance(), SharedWaypoints::empty());
        assert_eq!(c.raw(), 2);
    }

    #[test]
    fn test_target_sampled_once_per_tick() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let mut group = AgentGroup::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Some(Vec3::new(5.0, 0.0, 0.0))
        });
        for x in 0..4 {
            group.spawn(
                Pose::at(Vec3::new(x as f32, 0.0, 0.0)),
                AgentConfig::surveillance(),
                SharedWaypoints::empty(),
            );
        }

        let results = group.tick(0.1);
        assert_eq!(results.len(), 4);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        for (_, result) in results {
            assert_eq!(result.unwrap().state, BehaviorState::Following);
        }
    }

    #[test]
    fn test_shared_target() {
        let target = SharedTarget::default();
        let mut group = AgentGroup::new(target.clone());
        let id = group.spawn(Pose::at(Vec3::ZERO), AgentConfig::surveillance(), SharedWaypoints::empty());

        group.tick(0.1);
        assert_eq!(group.get(id).map(|c| c.state()), Some(BehaviorState::Idle));

        target.set(Vec3::new(0.0, 0.0, 8.0));
        group.tick(0.1);
        assert_eq!(group.get(id).map(|c| c.state()), Some(BehaviorState::Following));

        target.clear();
        group.tick(0.1);
        assert_eq!(group.get(id).map(|c| c.state()), Some(BehaviorState::Returning));
    }

    #[test]
    fn test_failing_agent_does_not_stop_others() {
        let mut group = AgentGroup::new(|| Some(Vec3::new(3.0, 0.0, 0.0)));
        let bad = group.spawn(Pose::at(Vec3::ZERO), AgentConfig::surveillance(), SharedWaypoints::empty());
        let good = group.spawn(Pose::at(Vec3::ZERO), AgentConfig::surveillance(), SharedWaypoints::empty());

        if let Some(ctrl) = group.get_mut(bad) {
            ctrl.set_pose(Pose::at(Vec3::new(f32::NAN, 0.0, 0.0)));
        }

        let results = group.tick(0.1);
        assert!(matches!(results[0], (id, Err(AgentError::InvalidInput(_))) if id == bad));
        assert!(matches!(&results[1], (id, Ok(report)) if *id == good && report.state == BehaviorState::Following));
    }
}
