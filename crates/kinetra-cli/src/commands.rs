//! CLI command implementations.

use std::time::Instant;

use kinetra_core::{ConstraintSolver, EulerImplicitLinearized};
use kinetra_io::config::{SimulationConfig, SolverConfig};
use kinetra_io::{read_checkpoint_file, write_checkpoint_file, write_povray_scene_file};
use kinetra_math::DVec3;
use kinetra_physics::System;
use kinetra_solver::{PsorSolver, SchurSolver};
use kinetra_telemetry::{EventBus, EventKind, SimulationEvent, TracingSink};

use crate::scenarios;

/// Run a built-in scenario under the given config.
pub fn simulate(
    config_path: Option<&str>,
    scenario_name: &str,
    output_path: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = match config_path {
        Some(path) => SimulationConfig::load(path)?,
        None => SimulationConfig::default(),
    };

    let build = scenarios::by_name(scenario_name).ok_or_else(|| {
        format!(
            "Unknown scenario: '{scenario_name}'. Available: {}",
            scenarios::NAMES.join(", ")
        )
    })?;
    let mut system = build();
    system.gravity = DVec3::from(config.gravity);

    let mut integrator = EulerImplicitLinearized::new();
    integrator.recovery_clamp = config.recovery_clamp;
    integrator.use_clamping = config.use_clamping;

    let mut bus = EventBus::new();
    bus.add_sink(Box::new(TracingSink::new(tracing::Level::INFO)));

    println!("Kinetra Simulation");
    println!("──────────────────");
    println!("Scenario: {scenario_name}");
    println!("Timestep: {}s, duration: {}s", config.timestep, config.duration);
    println!();

    match config.solver {
        SolverConfig::Psor {
            max_iterations,
            omega,
            tolerance,
        } => {
            let mut solver = PsorSolver::new();
            solver.max_iterations = max_iterations;
            solver.omega = omega;
            solver.tolerance = tolerance;
            run_loop(&mut system, &mut integrator, &mut solver, &config, &mut bus)?;
        }
        SolverConfig::Schur { cfm } => {
            let mut solver = SchurSolver::new();
            solver.cfm = cfm;
            run_loop(&mut system, &mut integrator, &mut solver, &config, &mut bus)?;
        }
    }

    if let Some(path) = output_path {
        write_checkpoint_file(path, system.bodies())?;
        bus.emit(SimulationEvent::new(
            0,
            EventKind::CheckpointWritten {
                path: path.to_string(),
                body_count: system.bodies().len() as u32,
            },
        ));
        println!("Checkpoint written to: {path}");
    }
    bus.shutdown();
    Ok(())
}

fn run_loop<C: ConstraintSolver>(
    system: &mut System,
    integrator: &mut EulerImplicitLinearized,
    solver: &mut C,
    config: &SimulationConfig,
    bus: &mut EventBus,
) -> Result<(), Box<dyn std::error::Error>> {
    let n_steps = (config.duration / config.timestep).round() as u32;
    let started = Instant::now();

    for step in 0..n_steps {
        bus.emit(SimulationEvent::new(
            step,
            EventKind::StepBegin {
                sim_time: system.time(),
            },
        ));
        let step_started = Instant::now();

        let result = system.do_step(integrator, solver, config.timestep)?;

        bus.emit(SimulationEvent::new(
            step,
            EventKind::Solve {
                iterations: result.solve.iterations as u32,
                residual: result.solve.residual,
                converged: result.solve.converged,
                n_dof: result.solve.n_dof as u32,
                n_constraints: result.solve.n_constraints as u32,
            },
        ));
        bus.emit(SimulationEvent::new(
            step,
            EventKind::StepEnd {
                wall_time: step_started.elapsed().as_secs_f64(),
            },
        ));
        bus.flush();
    }

    println!(
        "Simulated {} steps to t = {:.4}s in {:.3}s wall time",
        n_steps,
        system.time(),
        started.elapsed().as_secs_f64()
    );
    Ok(())
}

/// Read a checkpoint and rewrite it, validating every record on the way.
pub fn checkpoint(input: &str, output: &str) -> Result<(), Box<dyn std::error::Error>> {
    let bodies = read_checkpoint_file(input)?;
    write_checkpoint_file(output, &bodies)?;
    println!("Rewrote {} bodies: {input} -> {output}", bodies.len());
    Ok(())
}

/// Export a checkpoint as a POV-Ray scene listing.
pub fn export(input: &str, output: &str) -> Result<(), Box<dyn std::error::Error>> {
    let bodies = read_checkpoint_file(input)?;
    let mut system = System::new();
    for body in bodies {
        system.add_body(body);
    }
    write_povray_scene_file(output, &system)?;
    println!(
        "Exported {} bodies to POV-Ray scene: {output}",
        system.bodies().len()
    );
    Ok(())
}

/// Inspect a checkpoint file.
pub fn inspect(path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let bodies = read_checkpoint_file(path)?;

    println!("Kinetra Checkpoint Inspector");
    println!("────────────────────────────");
    println!();
    println!("Bodies:   {}", bodies.len());

    let fixed = bodies.iter().filter(|b| b.is_fixed()).count();
    let assets: usize = bodies.iter().map(|b| b.shapes().len()).sum();
    println!("Fixed:    {fixed}");
    println!("Assets:   {assets}");

    if !bodies.is_empty() {
        let min_y = bodies
            .iter()
            .map(|b| b.pos().y)
            .fold(f64::INFINITY, f64::min);
        let max_y = bodies
            .iter()
            .map(|b| b.pos().y)
            .fold(f64::NEG_INFINITY, f64::max);
        println!("Y range:  [{min_y:.4}, {max_y:.4}]");

        let max_speed = bodies
            .iter()
            .map(|b| b.lin_vel().length())
            .fold(0.0, f64::max);
        println!("Max |v|:  {max_speed:.4} m/s");
    }
    Ok(())
}
