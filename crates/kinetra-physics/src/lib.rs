//! # kinetra-physics
//!
//! The simulated entities of the Kinetra engine and the `System` that
//! owns them. Entities implement the capability traits from
//! `kinetra-core` (state, variables, constraints, update) and the
//! `System` drives them through the assembly cycle as one
//! [`Integrable`](kinetra_core::Integrable).
//!
//! ## Key Types
//!
//! - [`RigidBody`] — 6-DOF body with quaternion orientation, visual
//!   shapes, and a contact material
//! - [`Shaft`] / [`ShaftGear`] — 1-DOF rotational nodes and the ratio
//!   coupling between them
//! - [`Joint`] / [`JointKind`] — the lock-joint family (revolute,
//!   spherical, prismatic, universal, distance, screw, engine, spring)
//! - [`Conveyor`] — truss + plate pair with an internal lock whose belt
//!   speed enters through the rheonomic term
//! - [`ParticleCluster`] — clone particles sharing one mass operator and
//!   one shape
//! - [`System`] — entity arenas, gravity, and the step pipeline

pub mod body;
pub mod conveyor;
pub mod gear;
pub mod joint;
pub mod material;
pub mod particles;
pub mod shaft;
pub mod shape;
pub mod system;

pub use body::RigidBody;
pub use conveyor::Conveyor;
pub use gear::ShaftGear;
pub use joint::{Joint, JointKind};
pub use material::ContactMaterial;
pub use particles::ParticleCluster;
pub use shaft::Shaft;
pub use shape::{ShapeGeometry, TriMesh, VisualShape};
pub use system::{AttachedItem, System};
