//! Error types for the agent core
//!
//! None of these are fatal to a simulation tick. Controllers degrade to a
//! fallback behavior, log the condition once and keep going.

use thiserror::Error;

/// Conditions an agent controller detects and recovers from
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AgentError {
    /// No target exists this tick; treated as not visible
    #[error("No target available; treating target as not visible")]
    MissingTarget,

    /// Patrol requested with no waypoints; agent stays idle
    #[error("Patrol requested with an empty waypoint set; agent will stay idle")]
    EmptyWaypointSet,

    /// A configuration value was out of range and has been clamped
    #[error("Invalid configuration: {field} = {value} (clamped to {clamped_to})")]
    InvalidConfiguration {
        field: &'static str,
        value: f32,
        clamped_to: f32,
    },

    /// Cone policy without a line-of-sight backend; visibility is angle-only
    #[error("No occlusion query wired for a field-of-view agent; line of sight is assumed clear")]
    OcclusionQueryUnavailable,

    /// Navigation backend could not reach the requested goal
    #[error("Navigation goal unreachable: ({0}, {1}, {2})")]
    PathUnreachable(f32, f32, f32),

    /// Tick inputs were unusable; the tick was skipped for this agent
    #[error("Invalid tick input: {0}")]
    InvalidInput(&'static str),
}

/// Errors raised while loading agent configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// Config file is not valid TOML for this schema
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Result type for configuration loading
pub type Result<T> = std::result::Result<T, ConfigError>;
