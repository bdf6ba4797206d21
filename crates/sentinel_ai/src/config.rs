//! Agent configuration
//!
//! Configuration is fixed at spawn. Out-of-range values are clamped once by
//! [`AgentConfig::validated`] and reported as warnings; nothing downstream
//! ever sees a negative radius or speed.
//!
//! # Example Config File
//!
//! ```toml
//! seed = 7
//!
//! [perception]
//! policy = "radius_with_alert"   # radius_only, radius_with_alert, cone_occlusion, waypoint_follow
//! detection_radius = 30.0
//! alert_radius = 15.0
//!
//! [movement]
//! follow_speed = 5.0
//! rotation_speed = 5.0
//!
//! [patrol]
//! mode = "wander"                # stationary, waypoints, wander
//! radius = 10.0
//! interval = 5.0
//! ```

use crate::error::{AgentError, Result};
use crate::perception::PerceptionPolicy;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Speeds used by the kinematic executor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementSettings {
    /// Travel speed while patrolling (units/s)
    pub patrol_speed: f32,
    /// Travel speed while following or tracking a target (units/s)
    pub follow_speed: f32,
    /// Travel speed while returning home (units/s)
    pub return_speed: f32,
    /// Slerp rate toward the desired facing (per second)
    pub rotation_speed: f32,
}

impl Default for MovementSettings {
    fn default() -> Self {
        Self {
            patrol_speed: 5.0,
            follow_speed: 5.0,
            return_speed: 5.0,
            rotation_speed: 5.0,
        }
    }
}

impl MovementSettings {
    /// Same speed for every behavior
    pub fn uniform(speed: f32) -> Self {
        Self {
            patrol_speed: speed,
            follow_speed: speed,
            return_speed: speed,
            rotation_speed: speed,
        }
    }
}

/// What an agent does when it has no target
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum PatrolRoute {
    /// Hold position at home
    Stationary,
    /// Cycle through the shared waypoint set
    #[default]
    Waypoints,
    /// Pick a random destination within `radius` every `interval` seconds
    Wander { radius: f32, interval: f32 },
}

/// Complete spawn-time configuration for one agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentConfig {
    /// How the target is detected
    pub perception: PerceptionPolicy,
    /// Movement speeds
    #[serde(default)]
    pub movement: MovementSettings,
    /// Idle-time behavior
    #[serde(default)]
    pub patrol: PatrolRoute,
    /// Seed for wander destinations (entropy if absent)
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self::surveillance()
    }
}

impl AgentConfig {
    /// Guard that watches a radius, turns toward intruders and chases them
    /// once they come inside the alert zone.
    pub fn surveillance() -> Self {
        Self {
            perception: PerceptionPolicy::RadiusWithAlert {
                detection_radius: 30.0,
                alert_radius: 15.0,
            },
            movement: MovementSettings::uniform(5.0),
            patrol: PatrolRoute::Stationary,
            seed: None,
        }
    }

    /// Walks a waypoint loop and follows anyone who comes close.
    pub fn patrol_and_follow() -> Self {
        Self {
            perception: PerceptionPolicy::WaypointFollow { follow_distance: 5.0 },
            movement: MovementSettings::uniform(8.0),
            patrol: PatrolRoute::Waypoints,
            seed: None,
        }
    }

    /// Stands watch with a narrow view cone and needs clear line of sight.
    pub fn tracking() -> Self {
        Self {
            perception: PerceptionPolicy::ConeOcclusion {
                detection_range: 10.0,
                field_of_view_degrees: 45.0,
            },
            movement: MovementSettings {
                patrol_speed: 8.0,
                follow_speed: 8.0,
                return_speed: 8.0,
                rotation_speed: 5.0,
            },
            patrol: PatrolRoute::Stationary,
            seed: None,
        }
    }

    /// Roams randomly around its current position until something is in range.
    pub fn wander_patrol() -> Self {
        Self {
            perception: PerceptionPolicy::RadiusOnly { detection_radius: 10.0 },
            movement: MovementSettings {
                patrol_speed: 3.5,
                follow_speed: 5.0,
                return_speed: 3.5,
                rotation_speed: 5.0,
            },
            patrol: PatrolRoute::Wander {
                radius: 10.0,
                interval: 5.0,
            },
            seed: None,
        }
    }

    /// Set perception policy
    pub fn with_perception(mut self, perception: PerceptionPolicy) -> Self {
        self.perception = perception;
        self
    }

    /// Set movement speeds
    pub fn with_movement(mut self, movement: MovementSettings) -> Self {
        self.movement = movement;
        self
    }

    /// Set patrol route
    pub fn with_patrol(mut self, patrol: PatrolRoute) -> Self {
        self.patrol = patrol;
        self
    }

    /// Set wander seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&text)?;
        log::info!("Loaded agent config from {}", path.display());
        Ok(config)
    }

    /// Clamp every out-of-range value, returning the fixed config and one
    /// [`AgentError::InvalidConfiguration`] per clamped field.
    pub fn validated(mut self) -> (Self, Vec<AgentError>) {
        let mut issues = Vec::new();

        self.perception = match self.perception {
            PerceptionPolicy::RadiusOnly { detection_radius } => PerceptionPolicy::RadiusOnly {
                detection_radius: non_negative("detection_radius", detection_radius, &mut issues),
            },
            PerceptionPolicy::RadiusWithAlert {
                detection_radius,
                alert_radius,
            } => {
                let detection_radius =
                    non_negative("detection_radius", detection_radius, &mut issues);
                let mut alert_radius = non_negative("alert_radius", alert_radius, &mut issues);
                if alert_radius > detection_radius {
                    issues.push(AgentError::InvalidConfiguration {
                        field: "alert_radius",
                        value: alert_radius,
                        clamped_to: detection_radius,
                    });
                    alert_radius = detection_radius;
                }
                PerceptionPolicy::RadiusWithAlert {
                    detection_radius,
                    alert_radius,
                }
            }
            PerceptionPolicy::ConeOcclusion {
                detection_range,
                field_of_view_degrees,
            } => {
                let detection_range = non_negative("detection_range", detection_range, &mut issues);
                let mut fov = non_negative("field_of_view_degrees", field_of_view_degrees, &mut issues);
                if fov > 360.0 {
                    issues.push(AgentError::InvalidConfiguration {
                        field: "field_of_view_degrees",
                        value: fov,
                        clamped_to: 360.0,
                    });
                    fov = 360.0;
                }
                PerceptionPolicy::ConeOcclusion {
                    detection_range,
                    field_of_view_degrees: fov,
                }
            }
            PerceptionPolicy::WaypointFollow { follow_distance } => {
                PerceptionPolicy::WaypointFollow {
                    follow_distance: non_negative("follow_distance", follow_distance, &mut issues),
                }
            }
        };

        let m = &mut self.movement;
        m.patrol_speed = non_negative("patrol_speed", m.patrol_speed, &mut issues);
        m.follow_speed = non_negative("follow_speed", m.follow_speed, &mut issues);
        m.return_speed = non_negative("return_speed", m.return_speed, &mut issues);
        m.rotation_speed = non_negative("rotation_speed", m.rotation_speed, &mut issues);

        if let PatrolRoute::Wander { radius, interval } = self.patrol {
            self.patrol = PatrolRoute::Wander {
                radius: non_negative("wander_radius", radius, &mut issues),
                interval: non_negative("wander_interval", interval, &mut issues),
            };
        }

        (self, issues)
    }
}

/// Finite and at least zero, otherwise clamped to zero
fn non_negative(field: &'static str, value: f32, issues: &mut Vec<AgentError>) -> f32 {
    if !value.is_finite() || value < 0.0 {
        issues.push(AgentError::InvalidConfiguration {
            field,
            value,
            clamped_to: 0.0,
        });
        0.0
    } else {
        value
    }
}
