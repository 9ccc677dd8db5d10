//! Conveyor tests: belt speed through the rheonomic lock row, plate
//! re-seating, and mass split.

use kinetra_core::EulerImplicitLinearized;
use kinetra_math::DVec3;
use kinetra_physics::{Conveyor, System};
use kinetra_solver::PsorSolver;

fn fixed_belt(speed: f64) -> Conveyor {
    let mut belt = Conveyor::new(10.0, 1.0, 0.1, 0.5);
    belt.truss_mut().set_fixed(true);
    belt.set_conveyor_speed(speed);
    belt
}

#[test]
fn plate_reaches_belt_speed_after_one_step() {
    let mut system = System::new();
    let ci = system.add_conveyor(fixed_belt(2.0));

    let mut integrator = EulerImplicitLinearized::new();
    let mut solver = PsorSolver::new();
    system.do_step(&mut integrator, &mut solver, 0.01).unwrap();

    let belt = system.conveyor(ci);
    let v = belt.plate().lin_vel();
    assert!((v.x - 2.0).abs() < 1e-4, "vx = {}", v.x);
    // The remaining lock rows hold the plate against gravity.
    assert!(v.y.abs() < 1e-4 && v.z.abs() < 1e-4);
    assert!((belt.surface_point_velocity().x - 2.0).abs() < 1e-4);
}

#[test]
fn plate_stays_seated_on_the_truss() {
    let mut system = System::new();
    let ci = system.add_conveyor(fixed_belt(2.0));

    let mut integrator = EulerImplicitLinearized::new();
    let mut solver = PsorSolver::new();
    for _ in 0..100 {
        system.do_step(&mut integrator, &mut solver, 0.01).unwrap();
    }

    // The plate keeps its solved sliding velocity but never runs off:
    // each update re-seats it at the truss top.
    let belt = system.conveyor(ci);
    let p = belt.plate().pos();
    assert!(p.x.abs() < 1e-9, "plate drifted to x = {}", p.x);
    assert!((p.y - 0.05).abs() < 1e-9);
    assert!((belt.plate().lin_vel().x - 2.0).abs() < 1e-3);
}

#[test]
fn zero_speed_belt_is_a_static_lock() {
    let mut system = System::new();
    let ci = system.add_conveyor(fixed_belt(0.0));

    let mut integrator = EulerImplicitLinearized::new();
    let mut solver = PsorSolver::new();
    for _ in 0..10 {
        system.do_step(&mut integrator, &mut solver, 0.01).unwrap();
    }
    assert!(system.conveyor(ci).plate().lin_vel().length() < 1e-6);
}

#[test]
fn plate_mass_is_a_tenth_of_the_total() {
    let belt = Conveyor::new(10.0, 1.0, 0.1, 0.5);
    assert!((belt.plate().mass() - 1.0).abs() < 1e-12);
    assert!((belt.truss().mass() - 10.0).abs() < 1e-12);
    assert_eq!(belt.dimensions(), (1.0, 0.1, 0.5));
    // The belt surface sits at half the truss thickness.
    assert!((belt.plate().pos().y - 0.05).abs() < 1e-12);
    assert!(belt.plate().is_collide());
}

#[test]
fn moving_the_conveyor_carries_the_plate() {
    let mut belt = Conveyor::new(10.0, 1.0, 0.1, 0.5);
    belt.set_frame(kinetra_math::Frame::from_pos(DVec3::new(3.0, 1.0, 0.0)));
    let p = belt.plate().pos();
    assert!((p - DVec3::new(3.0, 1.05, 0.0)).length() < 1e-12);
}
