//! Visual/collision shapes attached to bodies.
//!
//! A shape is a geometry variant plus a placement frame relative to the
//! owning body and an RGB color. The primitive variants carry a small
//! checkpoint tag; meshes and curves are exportable to POV-Ray include
//! files but have no checkpoint representation.

use serde::{Deserialize, Serialize};

use kinetra_math::{DVec3, Frame};
use kinetra_types::Real;

/// Indexed triangle mesh for visualization export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct TriMesh {
    pub vertices: Vec<DVec3>,
    pub normals: Vec<DVec3>,
    /// Vertex index triples, counter-clockwise winding.
    pub faces: Vec<[u32; 3]>,
}

/// Shape geometry variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ShapeGeometry {
    Sphere { radius: Real },
    Ellipsoid { radii: DVec3 },
    Box { half_extents: DVec3 },
    Cylinder { radius: Real, half_length: Real },
    Cone { radius: Real, half_length: Real },
    Capsule { radius: Real, half_length: Real },
    Mesh(TriMesh),
    /// Polyline swept as a thin tube on export.
    Curve { points: Vec<DVec3>, radius: Real },
}

impl ShapeGeometry {
    /// Numeric id of the variant. Coincides with the checkpoint tag for
    /// primitives; the non-checkpointable variants get ids outside the
    /// tag range, used in error reports.
    pub fn kind_id(&self) -> u32 {
        match self {
            ShapeGeometry::Sphere { .. } => 0,
            ShapeGeometry::Ellipsoid { .. } => 1,
            ShapeGeometry::Box { .. } => 2,
            ShapeGeometry::Cylinder { .. } => 3,
            ShapeGeometry::Cone { .. } => 4,
            ShapeGeometry::Capsule { .. } => 5,
            ShapeGeometry::Mesh(_) => 100,
            ShapeGeometry::Curve { .. } => 101,
        }
    }

    /// Checkpoint shape tag for the primitive variants. Meshes and
    /// curves have none and make a checkpoint write fail.
    pub fn checkpoint_tag(&self) -> Option<u32> {
        match self {
            ShapeGeometry::Sphere { .. } => Some(0),
            ShapeGeometry::Ellipsoid { .. } => Some(1),
            ShapeGeometry::Box { .. } => Some(2),
            ShapeGeometry::Cylinder { .. } => Some(3),
            ShapeGeometry::Cone { .. } => Some(4),
            ShapeGeometry::Capsule { .. } => Some(5),
            ShapeGeometry::Mesh(_) | ShapeGeometry::Curve { .. } => None,
        }
    }

    /// Geometry parameters in the checkpoint field order for the
    /// primitive variants.
    pub fn checkpoint_params(&self) -> Vec<Real> {
        match *self {
            ShapeGeometry::Sphere { radius } => vec![radius],
            ShapeGeometry::Ellipsoid { radii } => vec![radii.x, radii.y, radii.z],
            ShapeGeometry::Box { half_extents } => {
                vec![half_extents.x, half_extents.y, half_extents.z]
            }
            ShapeGeometry::Cylinder {
                radius,
                half_length,
            }
            | ShapeGeometry::Cone {
                radius,
                half_length,
            }
            | ShapeGeometry::Capsule {
                radius,
                half_length,
            } => vec![radius, half_length],
            ShapeGeometry::Mesh(_) | ShapeGeometry::Curve { .. } => Vec::new(),
        }
    }

    /// Rebuilds a primitive geometry from a checkpoint tag and params.
    pub fn from_checkpoint(tag: u32, p: &[Real]) -> Option<Self> {
        match (tag, p.len()) {
            (0, 1) => Some(ShapeGeometry::Sphere { radius: p[0] }),
            (1, 3) => Some(ShapeGeometry::Ellipsoid {
                radii: DVec3::new(p[0], p[1], p[2]),
            }),
            (2, 3) => Some(ShapeGeometry::Box {
                half_extents: DVec3::new(p[0], p[1], p[2]),
            }),
            (3, 2) => Some(ShapeGeometry::Cylinder {
                radius: p[0],
                half_length: p[1],
            }),
            (4, 2) => Some(ShapeGeometry::Cone {
                radius: p[0],
                half_length: p[1],
            }),
            (5, 2) => Some(ShapeGeometry::Capsule {
                radius: p[0],
                half_length: p[1],
            }),
            _ => None,
        }
    }
}

/// A geometry placed on a body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualShape {
    /// Placement relative to the owning body's frame.
    pub pose: Frame,
    pub geometry: ShapeGeometry,
    /// RGB in [0, 1].
    pub color: DVec3,
}

impl VisualShape {
    pub fn new(geometry: ShapeGeometry) -> Self {
        Self {
            pose: Frame::IDENTITY,
            geometry,
            color: DVec3::new(0.6, 0.6, 0.6),
        }
    }

    pub fn with_pose(mut self, pose: Frame) -> Self {
        self.pose = pose;
        self
    }

    pub fn with_color(mut self, color: DVec3) -> Self {
        self.color = color;
        self
    }

    /// World placement given the owning body's frame.
    pub fn world_pose(&self, body_frame: &Frame) -> Frame {
        body_frame.compose(&self.pose)
    }
}
