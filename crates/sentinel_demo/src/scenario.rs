//! Scenario files
//!
//! A scenario places agents, an optional waypoint route and walls, and moves
//! the target along keyframes.
//!
//! # Example Scenario File
//!
//! ```toml
//! name = "gatehouse"
//! dt = 0.05
//! duration = 20.0
//! waypoints = [[10.0, 0.0, 0.0], [10.0, 0.0, 10.0]]
//!
//! [[walls]]
//! from = [-2.0, 6.0]   # x, z
//! to = [2.0, 6.0]
//!
//! [[agents]]
//! label = "gate_guard"
//! spawn = [0.0, 0.0, 0.0]
//!
//! [agents.config.perception]
//! policy = "radius_with_alert"
//! detection_radius = 30.0
//! alert_radius = 15.0
//!
//! [[target]]
//! time = 0.0
//! position = [0.0, 0.0, 40.0]   # omit position for "no target"
//! ```

use sentinel_ai::prelude::*;
use sentinel_math::radians;
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

/// Radius of the target's body for line-of-sight checks
const TARGET_RADIUS: f32 = 0.5;

/// Scenario loading errors
#[derive(Error, Debug)]
pub enum ScenarioError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid scenario: {0}")]
    Invalid(String),
}

fn default_name() -> String {
    "untitled".to_string()
}

fn default_dt() -> f32 {
    1.0 / 30.0
}

/// One agent to spawn
#[derive(Debug, Clone, Deserialize)]
pub struct AgentSpec {
    pub label: String,
    pub spawn: [f32; 3],
    /// Initial heading around +Y, 0 faces +Z
    #[serde(default)]
    pub yaw_degrees: f32,
    pub config: AgentConfig,
}

/// Vertical wall between two points on the ground plane (x, z)
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Wall {
    pub from: [f32; 2],
    pub to: [f32; 2],
}

impl Wall {
    /// Ray parameter where `ray` crosses this wall, if it does
    pub fn intersect(&self, ray: &Ray) -> Option<f32> {
        let cross = |ax: f32, az: f32, bx: f32, bz: f32| ax * bz - az * bx;

        let (ex, ez) = (self.to[0] - self.from[0], self.to[1] - self.from[1]);
        let (dx, dz) = (ray.direction.x, ray.direction.z);
        let denom = cross(dx, dz, ex, ez);
        if denom.abs() < 1e-6 {
            return None;
        }

        let (wx, wz) = (self.from[0] - ray.origin.x, self.from[1] - ray.origin.z);
        let t = cross(wx, wz, ex, ez) / denom;
        let s = cross(wx, wz, dx, dz) / denom;
        (t > 0.0 && (0.0..=1.0).contains(&s)).then_some(t)
    }
}

/// Target position at a point in time
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Keyframe {
    pub time: f32,
    #[serde(default)]
    pub position: Option<[f32; 3]>,
}

/// A complete scenario
#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_dt")]
    pub dt: f32,
    pub duration: f32,
    #[serde(default)]
    pub waypoints: Vec<[f32; 3]>,
    #[serde(default)]
    pub walls: Vec<Wall>,
    pub agents: Vec<AgentSpec>,
    #[serde(default)]
    pub target: Vec<Keyframe>,
}

impl Scenario {
    /// Parse and check a scenario from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self, ScenarioError> {
        let mut scenario: Scenario = toml::from_str(text)?;
        if !(scenario.dt.is_finite() && scenario.dt > 0.0) {
            return Err(ScenarioError::Invalid(format!("dt must be positive, got {}", scenario.dt)));
        }
        if !(scenario.duration.is_finite() && scenario.duration >= 0.0) {
            return Err(ScenarioError::Invalid(format!(
                "duration must be non-negative, got {}",
                scenario.duration
            )));
        }
        if scenario.agents.is_empty() {
            return Err(ScenarioError::Invalid("no agents".to_string()));
        }
        scenario.target.sort_by(|a, b| a.time.total_cmp(&b.time));
        Ok(scenario)
    }

    /// Load a scenario file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ScenarioError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let scenario = Self::from_toml_str(&text)?;
        log::info!("Loaded scenario '{}' from {}", scenario.name, path.display());
        Ok(scenario)
    }

    /// Number of ticks to run
    pub fn steps(&self) -> usize {
        (self.duration / self.dt).ceil() as usize
    }

    /// Target position at `time`, linearly interpolated between keyframes.
    ///
    /// A keyframe without a position removes the target until the next one.
    pub fn target_at(&self, time: f32) -> Option<Vec3> {
        let first = self.target.first()?;
        if time <= first.time {
            return first.position.map(Vec3::from);
        }

        for pair in self.target.windows(2) {
            let (from, to) = (pair[0], pair[1]);
            if time < to.time {
                return match (from.position, to.position) {
                    (Some(a), Some(b)) => {
                        let span = (to.time - from.time).max(f32::EPSILON);
                        let t = (time - from.time) / span;
                        Some(Vec3::from(a).lerp(Vec3::from(b), t))
                    }
                    (a, _) => a.map(Vec3::from),
                };
            }
        }

        self.target.last().and_then(|k| k.position.map(Vec3::from))
    }

    /// Spawn every agent into a group fed by `target`.
    ///
    /// Cone agents get line of sight against the scenario's walls.
    pub fn build_group(&self, target: SharedTarget) -> AgentGroup {
        let waypoints = SharedWaypoints::new(self.waypoints.iter().copied().map(Vec3::from).collect());
        let mut group = AgentGroup::new(target.clone());

        for spec in &self.agents {
            let spawn = Pose::new(
                Vec3::from(spec.spawn),
                Quat::from_rotation_y(radians(spec.yaw_degrees)),
            );
            let mut controller = AgentController::new(spawn, spec.config.clone(), waypoints.clone())
                .with_label(spec.label.clone());
            if spec.config.perception.uses_line_of_sight() {
                controller = controller.with_occlusion(Box::new(wall_occlusion(
                    self.walls.clone(),
                    target.clone(),
                )));
            }
            log::debug!("Spawning {} facing {:.0} degrees", spec.label, spec.yaw_degrees);
            group.insert(controller);
        }
        group
    }
}

/// Line of sight against vertical walls; the target is struck when no wall is
/// closer along the ray.
pub fn wall_occlusion(
    walls: Vec<Wall>,
    target: SharedTarget,
) -> impl Fn(&Ray, f32) -> Option<HitInfo> + Send {
    move |ray: &Ray, max_distance: f32| {
        let wall_hit = walls
            .iter()
            .filter_map(|wall| wall.intersect(ray))
            .filter(|t| *t < max_distance)
            .min_by(|a, b| a.total_cmp(b));

        let target_hit = target.get().and_then(|position| {
            if ray.distance_to_point(position) > TARGET_RADIUS {
                return None;
            }
            let body = (position - ray.origin).length() - TARGET_RADIUS;
            (body < max_distance).then_some(body)
        });

        match (wall_hit, target_hit) {
            (Some(wall), Some(body)) if body < wall => Some(HitInfo {
                distance: body,
                is_target: true,
            }),
            (Some(wall), _) => Some(HitInfo {
                distance: wall,
                is_target: false,
            }),
            (None, Some(body)) => Some(HitInfo {
                distance: body,
                is_target: true,
            }),
            (None, None) => None,
        }
    }
}
