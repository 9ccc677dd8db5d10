//! Built-in demonstration scenarios.
//!
//! Each builder returns a populated `System` ready to step. The
//! scenarios double as smoke coverage for the joint family, the shaft
//! couplings, and the conveyor.

use kinetra_math::{DVec3, Frame};
use kinetra_physics::{
    Conveyor, Joint, JointKind, RigidBody, Shaft, ShaftGear, ShapeGeometry, System, VisualShape,
};

/// A sphere bob hanging from a fixed anchor through a revolute joint.
///
/// Released horizontally, so the first steps show both the constraint
/// reaction and gravity-driven swing.
pub fn pendulum() -> System {
    let mut system = System::new();

    let mut anchor = RigidBody::new(1.0, DVec3::ONE);
    anchor.set_fixed(true);
    let anchor = system.add_body(anchor);

    let mut bob = RigidBody::new(2.0, DVec3::splat(0.02));
    bob.set_frame(Frame::from_pos(DVec3::new(1.0, 0.0, 0.0)));
    bob.add_shape(VisualShape::new(ShapeGeometry::Sphere { radius: 0.1 }));
    let bob = system.add_body(bob);

    let hinge = Joint::new(
        JointKind::Revolute,
        anchor,
        bob,
        system.bodies(),
        Frame::IDENTITY,
    );
    system.add_joint(hinge);
    system
}

/// Two shafts coupled 2:1, the first spun up to 1 rad/s.
pub fn gear_train() -> System {
    let mut system = System::new();

    let drive = system.add_shaft(Shaft::new(0.5));
    let driven = system.add_shaft(Shaft::new(1.0));
    system.add_gear(ShaftGear::new(drive, driven, 2.0));

    system.shaft_mut(drive).set_speed(1.0);
    system
}

/// A fixed conveyor running at 2 m/s.
pub fn conveyor() -> System {
    let mut system = System::new();

    let mut belt = Conveyor::new(10.0, 1.0, 0.1, 0.5);
    belt.truss_mut().set_fixed(true);
    belt.set_conveyor_speed(2.0);
    system.add_conveyor(belt);
    system
}

/// Looks up a scenario builder by name.
pub fn by_name(name: &str) -> Option<fn() -> System> {
    match name {
        "pendulum" => Some(pendulum),
        "gear_train" => Some(gear_train),
        "conveyor" => Some(conveyor),
        _ => None,
    }
}

/// Names accepted by [`by_name`].
pub const NAMES: &[&str] = &["pendulum", "gear_train", "conveyor"];
