//! Particle cluster tests: shared mass, cluster-wide forces, and speed
//! limiting.

use kinetra_core::EulerImplicitLinearized;
use kinetra_math::{DVec3, Frame};
use kinetra_physics::body::SpeedLimit;
use kinetra_physics::{ParticleCluster, System};
use kinetra_solver::PsorSolver;

fn cluster_at(mass: f64, positions: &[DVec3]) -> ParticleCluster {
    let mut cluster = ParticleCluster::new(mass, DVec3::ONE);
    for &p in positions {
        cluster.add_particle(Frame::from_pos(p));
    }
    cluster
}

#[test]
fn particles_free_fall_uniformly() {
    let mut system = System::new();
    let ci = system.add_cluster(cluster_at(
        2.0,
        &[
            DVec3::ZERO,
            DVec3::new(1.0, 0.0, 0.0),
            DVec3::new(0.0, 0.0, 3.0),
        ],
    ));

    let mut integrator = EulerImplicitLinearized::new();
    let mut solver = PsorSolver::new();
    let h = 0.01;
    system.do_step(&mut integrator, &mut solver, h).unwrap();

    for p in system.cluster(ci).particles() {
        assert!((p.lin_vel.y + 9.81 * h).abs() < 1e-12);
        assert!(p.lin_vel.x.abs() < 1e-12 && p.lin_vel.z.abs() < 1e-12);
        // Semi-implicit: the new velocity moves the position.
        assert!((p.frame.pos.y + 9.81 * h * h).abs() < 1e-12);
    }
    // Lateral placement is untouched by a uniform field.
    assert!((system.cluster(ci).particles()[1].frame.pos.x - 1.0).abs() < 1e-12);
}

#[test]
fn cluster_force_scales_with_the_shared_mass() {
    let mut system = System::new();
    system.gravity = DVec3::ZERO;
    let ci = system.add_cluster(cluster_at(1.0, &[DVec3::ZERO, DVec3::X]));

    let mut integrator = EulerImplicitLinearized::new();
    let mut solver = PsorSolver::new();
    let h = 0.01;

    system.cluster_mut(ci).apply_force_all(DVec3::X);
    system.do_step(&mut integrator, &mut solver, h).unwrap();
    for p in system.cluster(ci).particles() {
        assert!((p.lin_vel.x - h).abs() < 1e-12);
    }

    // Doubling the shared mass halves the next impulse for every clone.
    system.cluster_mut(ci).set_mass(2.0);
    system.cluster_mut(ci).apply_force_all(DVec3::X);
    system.do_step(&mut integrator, &mut solver, h).unwrap();
    for p in system.cluster(ci).particles() {
        assert!((p.lin_vel.x - 1.5 * h).abs() < 1e-12, "vx = {}", p.lin_vel.x);
    }
}

#[test]
fn speed_limit_clamps_every_particle() {
    let mut system = System::new();
    system.gravity = DVec3::ZERO;
    let mut cluster = cluster_at(1.0, &[DVec3::ZERO, DVec3::X]);
    cluster.speed_limit = Some(SpeedLimit {
        max_linear: 1.0,
        max_angular: 0.5,
    });
    cluster.particles_mut()[0].lin_vel = DVec3::new(5.0, 0.0, 0.0);
    cluster.particles_mut()[1].ang_vel_local = DVec3::new(0.0, 2.0, 0.0);
    let ci = system.add_cluster(cluster);

    let mut integrator = EulerImplicitLinearized::new();
    let mut solver = PsorSolver::new();
    system.do_step(&mut integrator, &mut solver, 0.01).unwrap();

    let c = system.cluster(ci);
    assert!(c.particles()[0].lin_vel.length() <= 1.0 + 1e-9);
    assert!(c.particles()[1].ang_vel_local.length() <= 0.5 + 1e-9);
}

#[test]
fn resizing_adds_origin_particles() {
    let mut cluster = cluster_at(1.0, &[DVec3::new(2.0, 0.0, 0.0)]);
    cluster.resize(3);
    assert_eq!(cluster.len(), 3);
    assert_eq!(cluster.particles()[0].frame.pos, DVec3::new(2.0, 0.0, 0.0));
    assert_eq!(cluster.particles()[2].frame.pos, DVec3::ZERO);
    cluster.resize(1);
    assert_eq!(cluster.len(), 1);
    assert!(!cluster.is_empty());
}
