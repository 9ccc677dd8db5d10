//! System-level stepping tests: gear couplings, joint maintenance under
//! gravity, sleeping, and update idempotence.

use kinetra_core::EulerImplicitLinearized;
use kinetra_math::{DVec3, Frame};
use kinetra_physics::body::SleepParams;
use kinetra_physics::{Joint, JointKind, RigidBody, Shaft, ShaftGear, System};
use kinetra_solver::{PsorSolver, SchurSolver};

#[test]
fn gear_enforces_ratio_and_reaction_signs() {
    let mut system = System::new();
    let s1 = system.add_shaft(Shaft::new(1.0));
    let s2 = system.add_shaft(Shaft::new(1.0));
    system.shaft_mut(s1).set_speed(3.0);
    let gi = system.add_gear(ShaftGear::new(s1, s2, 2.0));

    let mut integrator = EulerImplicitLinearized::new();
    let mut solver = PsorSolver::new();
    let h = 0.01;
    system.do_step(&mut integrator, &mut solver, h).unwrap();

    let w1 = system.shaft(s1).speed();
    let w2 = system.shaft(s2).speed();
    // ratio*w1 = w2 with momentum exchanged through J^T.
    assert!((2.0 * w1 - w2).abs() < 1e-6, "w1 = {w1}, w2 = {w2}");
    assert!((w1 - 0.6).abs() < 1e-6);
    assert!((w2 - 1.2).abs() < 1e-6);

    // tau1 = ratio*tau, tau2 = -tau: braking shaft 1, driving shaft 2.
    let gear = system.gear(gi);
    let t1 = gear.torque_on_shaft_1();
    let t2 = gear.torque_on_shaft_2();
    assert!(t1 < 0.0 && t2 > 0.0);
    assert!((t1 + 2.0 * t2).abs() < 1e-6, "t1 = {t1}, t2 = {t2}");
    assert!((t2 - (-(-1.2) / h)).abs() < 1e-3);
}

#[test]
fn gear_against_fixed_shaft_brakes_the_free_one() {
    let mut system = System::new();
    let s1 = system.add_shaft(Shaft::new(1.0));
    let s2 = system.add_shaft(Shaft::new(1.0));
    system.shaft_mut(s1).set_speed(5.0);
    system.shaft_mut(s2).set_fixed(true);
    system.add_gear(ShaftGear::new(s1, s2, 2.0));

    let mut integrator = EulerImplicitLinearized::new();
    let mut solver = PsorSolver::new();
    system.do_step(&mut integrator, &mut solver, 0.01).unwrap();

    assert!(system.shaft(s1).speed().abs() < 1e-6);
    assert_eq!(system.shaft(s2).speed(), 0.0);
}

#[test]
fn pendulum_keeps_markers_coincident() {
    let mut system = System::new();

    let mut anchor = RigidBody::new(1.0, DVec3::ONE);
    anchor.set_fixed(true);
    let anchor = system.add_body(anchor);

    let mut bob = RigidBody::new(2.0, DVec3::splat(0.02));
    bob.set_frame(Frame::from_pos(DVec3::new(1.0, 0.0, 0.0)));
    let bob = system.add_body(bob);

    let ji = system.add_joint(Joint::new(
        JointKind::Spherical,
        anchor,
        bob,
        system.bodies(),
        Frame::IDENTITY,
    ));

    let mut integrator = EulerImplicitLinearized::new();
    let mut solver = SchurSolver::new();
    for _ in 0..200 {
        system.do_step(&mut integrator, &mut solver, 0.005).unwrap();
    }

    // The bob swung down and the marker pair stayed together.
    assert!(system.body(bob).pos().y < -0.1);
    let joint = system.joint(ji);
    let m1 = system.body(anchor).frame().compose(&joint.frame_1);
    let m2 = system.body(bob).frame().compose(&joint.frame_2);
    assert!((m2.pos - m1.pos).length() < 5e-3);

    // Swinging under gravity needs a centripetal/weight reaction.
    assert!(joint.react_force.length() > 1.0);
}

#[test]
fn still_body_falls_asleep_and_stops_moving() {
    let mut system = System::new();
    system.gravity = DVec3::ZERO;

    let mut body = RigidBody::new(1.0, DVec3::ONE);
    body.sleep_params = Some(SleepParams {
        min_speed: 1e-3,
        min_ang_speed: 1e-3,
        min_still_time: 0.05,
    });
    let h = system.add_body(body);

    let mut integrator = EulerImplicitLinearized::new();
    let mut solver = PsorSolver::new();
    for _ in 0..20 {
        system.do_step(&mut integrator, &mut solver, 0.01).unwrap();
    }
    assert!(system.body(h).is_sleeping());

    // A sleeping body injects nothing and its pose is frozen.
    let before = system.body(h).pos();
    system.do_step(&mut integrator, &mut solver, 0.01).unwrap();
    assert_eq!(system.body(h).pos(), before);

    // An external force wakes it.
    system.body_mut(h).apply_force(DVec3::new(1.0, 0.0, 0.0));
    assert!(system.body(h).is_active());
}

#[test]
fn fixed_body_ignores_gravity() {
    let mut system = System::new();
    let mut body = RigidBody::new(1.0, DVec3::ONE);
    body.set_fixed(true);
    body.set_frame(Frame::from_pos(DVec3::new(0.0, 5.0, 0.0)));
    let h = system.add_body(body);

    let mut integrator = EulerImplicitLinearized::new();
    let mut solver = PsorSolver::new();
    for _ in 0..10 {
        system.do_step(&mut integrator, &mut solver, 0.01).unwrap();
    }
    assert_eq!(system.body(h).pos(), DVec3::new(0.0, 5.0, 0.0));
    assert_eq!(system.body(h).lin_vel(), DVec3::ZERO);
}

#[test]
fn update_is_idempotent() {
    use kinetra_core::{Integrable, Updatable};

    let mut system = System::new();
    let mut body = RigidBody::new(1.0, DVec3::ONE);
    body.speed_limit = Some(kinetra_physics::body::SpeedLimit {
        max_linear: 1.0,
        max_angular: 1.0,
    });
    body.set_lin_vel(DVec3::new(5.0, 0.0, 0.0));
    let h = system.add_body(body);

    system.update(0.0, true);
    let frame1 = *system.body(h).frame();
    let vel1 = system.body(h).lin_vel();
    assert!((vel1.length() - 1.0).abs() < 1e-12);

    system.update(0.0, true);
    assert_eq!(*system.body(h).frame(), frame1);
    assert_eq!(system.body(h).lin_vel(), vel1);

    // A lone conveyor re-seats its plate to the same pose every time.
    let mut belt = kinetra_physics::Conveyor::new(10.0, 1.0, 0.1, 0.5);
    belt.update(0.0, false);
    let plate1 = *belt.plate().frame();
    belt.update(0.0, false);
    assert_eq!(*belt.plate().frame(), plate1);
}

#[test]
fn simulated_clock_advances_with_steps() {
    let mut system = System::new();
    system.add_body(RigidBody::new(1.0, DVec3::ONE));

    let mut integrator = EulerImplicitLinearized::new();
    let mut solver = PsorSolver::new();
    for _ in 0..5 {
        system.do_step(&mut integrator, &mut solver, 0.02).unwrap();
    }
    assert!((system.time() - 0.1).abs() < 1e-12);
}
