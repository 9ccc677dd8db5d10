//! # kinetra-fea
//!
//! Finite-element nodes and the bilateral links that couple them to
//! each other and to rigid bodies. An [`FeaAssembly`] owns its node and
//! link arenas and attaches to a `System` through the
//! [`AttachedItem`](kinetra_physics::AttachedItem) seam, so the
//! multibody side never depends on FEA types.
//!
//! ## Key Types
//!
//! - [`FeaNodeXyz`] — 3-DOF point node
//! - [`FeaNodeXyzD`] — 6-DOF point + direction node (direction slots
//!   massless by default)
//! - [`PointPointLink`] — 3 rows pinning two point nodes together
//! - [`DirFrameLink`] — 2 rows keeping a node direction parallel to a
//!   rigid-body frame direction
//! - [`FeaAssembly`] — the owning container and `AttachedItem` impl

pub mod assembly;
pub mod dir_frame;
pub mod node;
pub mod point_point;

pub use assembly::FeaAssembly;
pub use dir_frame::DirFrameLink;
pub use node::{FeaNodeXyz, FeaNodeXyzD};
pub use point_point::PointPointLink;
