//! Sentinel scenario runner
//!
//! Runs a scenario headless and prints every behavior transition.
//!
//! Run with: cargo run -p sentinel_demo -- [scenario.toml]
//!       or: SENTINEL_SCENARIO=path/to/scenario.toml cargo run --bin sentinel
//!
//! Without a path the bundled gatehouse scenario is used. Set
//! `RUST_LOG=debug` to see gizmo output and waypoint progress.

mod scenario;

use scenario::{Scenario, ScenarioError};
use sentinel_ai::prelude::*;
use sentinel_ai::debug::Color;

const DEFAULT_SCENARIO: &str = include_str!("../scenarios/gatehouse.toml");

fn main() {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let scenario = match load_scenario() {
        Ok(scenario) => scenario,
        Err(e) => {
            log::error!("Failed to load scenario: {}", e);
            std::process::exit(1);
        }
    };

    run(&scenario);
}

/// Scenario from the first argument, `SENTINEL_SCENARIO`, or the bundled default
fn load_scenario() -> Result<Scenario, ScenarioError> {
    let path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("SENTINEL_SCENARIO").ok());

    match path {
        Some(path) => Scenario::load(path),
        None => {
            log::info!("No scenario given, using bundled gatehouse");
            Scenario::from_toml_str(DEFAULT_SCENARIO)
        }
    }
}

fn run(scenario: &Scenario) {
    let target = SharedTarget::default();
    let mut group = scenario.build_group(target.clone());

    println!(
        "Scenario '{}': {} agents, {} ticks of {:.3}s",
        scenario.name,
        group.len(),
        scenario.steps(),
        scenario.dt
    );

    let mut failures = 0usize;
    for step in 0..scenario.steps() {
        let time = step as f32 * scenario.dt;
        match scenario.target_at(time) {
            Some(position) => target.set(position),
            None => target.clear(),
        }

        for (id, result) in group.tick(scenario.dt) {
            let report = match result {
                Ok(report) => report,
                Err(_) => {
                    failures += 1;
                    continue;
                }
            };
            if let Some(change) = report.transition {
                let label = group.get(id).map(|a| a.label()).unwrap_or("?");
                println!(
                    "[{:6.2}s] {:<12} {:>10} -> {:<10} (target at {:.1})",
                    time, label, change.from, change.to, report.perception.distance
                );
            }
        }
    }

    println!();
    println!("Final state:");
    for (_, agent) in group.iter() {
        let pos = agent.pose().position;
        println!(
            "  {:<12} {:<10} at ({:6.2}, {:6.2}, {:6.2}), {} diagnostics",
            agent.label(),
            agent.state(),
            pos.x,
            pos.y,
            pos.z,
            agent.diagnostics().len()
        );

        if log::log_enabled!(log::Level::Debug) {
            let mut gizmos = GizmoLog::default();
            draw_gizmos(agent, &mut gizmos);
            log::debug!("{}: {}", agent.label(), gizmos.summary());
        }
    }

    if failures > 0 {
        log::warn!("{} agent ticks failed", failures);
    }
}

/// Debug draw sink that only counts primitives
#[derive(Default)]
struct GizmoLog {
    circles: usize,
    lines: usize,
    spheres: usize,
}

impl GizmoLog {
    fn summary(&self) -> String {
        format!(
            "{} circles, {} lines, {} spheres",
            self.circles, self.lines, self.spheres
        )
    }
}

impl DebugDraw for GizmoLog {
    fn circle(&mut self, center: Vec3, radius: f32, _color: Color) {
        log::trace!("circle at ({:.1}, {:.1}) r={:.1}", center.x, center.z, radius);
        self.circles += 1;
    }

    fn line(&mut self, from: Vec3, to: Vec3, _color: Color) {
        log::trace!(
            "line ({:.1}, {:.1}) -> ({:.1}, {:.1})",
            from.x,
            from.z,
            to.x,
            to.z
        );
        self.lines += 1;
    }

    fn sphere(&mut self, center: Vec3, radius: f32, _color: Color) {
        log::trace!("sphere at ({:.1}, {:.1}) r={:.1}", center.x, center.z, radius);
        self.spheres += 1;
    }
}
