//! The lock-joint family: up to six bilateral rows between two rigid
//! bodies with attachment frames.
//!
//! Each variant selects which scalar rows it enforces. Translation rows
//! measure the marker separation along a marker-1 axis; rotation rows
//! measure the small-angle residual of the relative marker orientation.
//! The screw variant replaces the free Z translation with a row coupling
//! it to the rotation angle (`z = tau·alpha`); the engine variant
//! prescribes the relative rotation speed through the rheonomic term.
//!
//! Jacobians are laid out `[linear(3), angular_local(3)]` per body, the
//! rigid-body variable-block order.

use kinetra_core::{
    ConstraintBlock, ConstraintHandle, LoadParams, SystemDescriptor, VariableHandle,
};
use kinetra_math::{rotation, DVec3, Frame};
use kinetra_types::constants::{EPSILON, TWO_PI};
use kinetra_types::{BodyHandle, KinetraResult, Real};

use crate::body::RigidBody;

/// Joint variants, each a row selection over the generic lock machinery
/// (plus the spring, which contributes forces instead of rows).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum JointKind {
    /// All six rows: full rigid lock.
    Lock,
    /// Free rotation about marker Z.
    Revolute,
    /// Translation rows only.
    Spherical,
    /// Free translation along marker Z.
    Prismatic,
    /// Point coincidence plus one cross-axis perpendicularity row.
    Universal,
    /// One row holding the marker distance.
    Distance { distance: Real },
    /// Revolute with Z translation coupled to the rotation angle.
    Screw { tau: Real },
    /// Revolute with prescribed relative rotation speed about Z.
    Engine { speed: Real },
    /// No rows; applies a spring-damper force along the marker line.
    Spring {
        stiffness: Real,
        damping: Real,
        rest_length: Real,
    },
}

/// Scalar row identities within a joint.
#[derive(Debug, Clone, Copy, PartialEq)]
enum RowKind {
    /// Marker separation along marker-1 axis k.
    Trans(usize),
    /// Orientation residual component k.
    Rot(usize),
    /// `z − tau·alpha`.
    ScrewZ,
    /// `|d| − distance`.
    Gap,
    /// `x̂₁ · ŷ₂`.
    Cross,
    /// Rotation-Z velocity row with prescribed speed.
    EngineZ,
}

/// Dense per-row data in variable-block layout.
struct RowData {
    j1: [Real; 6],
    j2: [Real; 6],
    c: Real,
    ct: Real,
}

/// A constraint between two rigid bodies referenced by arena handle.
#[derive(Debug, Clone)]
pub struct Joint {
    pub body_1: BodyHandle,
    pub body_2: BodyHandle,
    /// Attachment frame in body-1 coordinates.
    pub frame_1: Frame,
    /// Attachment frame in body-2 coordinates.
    pub frame_2: Frame,
    kind: JointKind,
    rows: Vec<(RowKind, Option<ConstraintHandle>)>,
    /// Reaction force on body 2 in marker-1 basis.
    pub react_force: DVec3,
    /// Reaction torque on body 2 in marker-1 basis.
    pub react_torque: DVec3,
}

impl Joint {
    /// Creates a joint whose shared attachment frame is given in world
    /// coordinates at the current body placement.
    pub fn new(
        kind: JointKind,
        body_1: BodyHandle,
        body_2: BodyHandle,
        bodies: &[RigidBody],
        abs_frame: Frame,
    ) -> Self {
        let frame_1 = bodies[body_1.index()].frame().inverse().compose(&abs_frame);
        let frame_2 = bodies[body_2.index()].frame().inverse().compose(&abs_frame);
        Self::from_local_frames(kind, body_1, body_2, frame_1, frame_2)
    }

    pub fn from_local_frames(
        kind: JointKind,
        body_1: BodyHandle,
        body_2: BodyHandle,
        frame_1: Frame,
        frame_2: Frame,
    ) -> Self {
        Self {
            body_1,
            body_2,
            frame_1,
            frame_2,
            kind,
            rows: Vec::new(),
            react_force: DVec3::ZERO,
            react_torque: DVec3::ZERO,
        }
    }

    pub fn kind(&self) -> JointKind {
        self.kind
    }

    /// Translation-per-radian coupling of a screw joint.
    pub fn tau(&self) -> Option<Real> {
        match self.kind {
            JointKind::Screw { tau } => Some(tau),
            _ => None,
        }
    }

    pub fn set_tau(&mut self, tau: Real) {
        if let JointKind::Screw { tau: t } = &mut self.kind {
            *t = tau;
        }
    }

    /// Screw thread: advance per full turn, `tau·2π`.
    pub fn thread(&self) -> Option<Real> {
        self.tau().map(|t| t * TWO_PI)
    }

    pub fn set_thread(&mut self, thread: Real) {
        self.set_tau(thread / TWO_PI);
    }

    pub fn set_engine_speed(&mut self, speed: Real) {
        if let JointKind::Engine { speed: s } = &mut self.kind {
            *s = speed;
        }
    }

    /// Row identities for the current kind.
    fn row_kinds(&self) -> Vec<RowKind> {
        use RowKind::*;
        match self.kind {
            JointKind::Lock => vec![Trans(0), Trans(1), Trans(2), Rot(0), Rot(1), Rot(2)],
            JointKind::Revolute => vec![Trans(0), Trans(1), Trans(2), Rot(0), Rot(1)],
            JointKind::Spherical => vec![Trans(0), Trans(1), Trans(2)],
            JointKind::Prismatic => vec![Trans(0), Trans(1), Rot(0), Rot(1), Rot(2)],
            JointKind::Universal => vec![Trans(0), Trans(1), Trans(2), Cross],
            JointKind::Distance { .. } => vec![Gap],
            JointKind::Screw { .. } => vec![Trans(0), Trans(1), Rot(0), Rot(1), ScrewZ],
            JointKind::Engine { .. } => {
                vec![Trans(0), Trans(1), Trans(2), Rot(0), Rot(1), EngineZ]
            }
            JointKind::Spring { .. } => Vec::new(),
        }
    }

    /// Marker separation row along marker-1 axis `k`.
    fn trans_row(m1: &Frame, m2: &Frame, b1: &RigidBody, b2: &RigidBody, k: usize) -> RowData {
        let a = match k {
            0 => m1.x_axis(),
            1 => m1.y_axis(),
            _ => m1.z_axis(),
        };
        let d = m2.pos - m1.pos;
        // Body-1 lever reaches to marker 2 so the rotating-axis term of
        // d/dt (a·d) is captured exactly.
        let s1 = m2.pos - b1.pos();
        let r2 = m2.pos - b2.pos();
        let j1_ang = b1.frame().dir_to_local(-s1.cross(a));
        let j2_ang = b2.frame().dir_to_local(r2.cross(a));
        RowData {
            j1: [-a.x, -a.y, -a.z, j1_ang.x, j1_ang.y, j1_ang.z],
            j2: [a.x, a.y, a.z, j2_ang.x, j2_ang.y, j2_ang.z],
            c: a.dot(d),
            ct: 0.0,
        }
    }

    /// Orientation residual row, component `k` in the marker-1 frame.
    fn rot_row(m1: &Frame, m2: &Frame, b1: &RigidBody, b2: &RigidBody, k: usize) -> RowData {
        let a = match k {
            0 => m1.x_axis(),
            1 => m1.y_axis(),
            _ => m1.z_axis(),
        };
        let res = rotation::rotation_residual(m1.rot, m2.rot);
        let j1_ang = b1.frame().dir_to_local(-a);
        let j2_ang = b2.frame().dir_to_local(a);
        RowData {
            j1: [0.0, 0.0, 0.0, j1_ang.x, j1_ang.y, j1_ang.z],
            j2: [0.0, 0.0, 0.0, j2_ang.x, j2_ang.y, j2_ang.z],
            c: res[k],
            ct: 0.0,
        }
    }

    fn row_data(&self, b1: &RigidBody, b2: &RigidBody, kind: RowKind) -> RowData {
        let m1 = b1.frame().compose(&self.frame_1);
        let m2 = b2.frame().compose(&self.frame_2);
        match kind {
            RowKind::Trans(k) => Self::trans_row(&m1, &m2, b1, b2, k),
            RowKind::Rot(k) => Self::rot_row(&m1, &m2, b1, b2, k),
            RowKind::ScrewZ => {
                let tau = match self.kind {
                    JointKind::Screw { tau } => tau,
                    _ => 0.0,
                };
                let tz = Self::trans_row(&m1, &m2, b1, b2, 2);
                let rz = Self::rot_row(&m1, &m2, b1, b2, 2);
                let alpha = rotation::relative_z_angle(m1.rot, m2.rot);
                let mut j1 = [0.0; 6];
                let mut j2 = [0.0; 6];
                for i in 0..6 {
                    j1[i] = tz.j1[i] - tau * rz.j1[i];
                    j2[i] = tz.j2[i] - tau * rz.j2[i];
                }
                RowData {
                    j1,
                    j2,
                    c: tz.c - tau * alpha,
                    ct: 0.0,
                }
            }
            RowKind::Gap => {
                let target = match self.kind {
                    JointKind::Distance { distance } => distance,
                    _ => 0.0,
                };
                let d = m2.pos - m1.pos;
                let len = d.length();
                if len < EPSILON {
                    // Degenerate configuration: the row vanishes and the
                    // solver skips it this step.
                    return RowData {
                        j1: [0.0; 6],
                        j2: [0.0; 6],
                        c: -target,
                        ct: 0.0,
                    };
                }
                let u = d / len;
                let r1 = m1.pos - b1.pos();
                let r2 = m2.pos - b2.pos();
                let j1_ang = b1.frame().dir_to_local(-r1.cross(u));
                let j2_ang = b2.frame().dir_to_local(r2.cross(u));
                RowData {
                    j1: [-u.x, -u.y, -u.z, j1_ang.x, j1_ang.y, j1_ang.z],
                    j2: [u.x, u.y, u.z, j2_ang.x, j2_ang.y, j2_ang.z],
                    c: len - target,
                    ct: 0.0,
                }
            }
            RowKind::Cross => {
                let a1 = m1.x_axis();
                let a2 = m2.y_axis();
                let g = a1.cross(a2);
                let j1_ang = b1.frame().dir_to_local(g);
                let j2_ang = b2.frame().dir_to_local(-g);
                RowData {
                    j1: [0.0, 0.0, 0.0, j1_ang.x, j1_ang.y, j1_ang.z],
                    j2: [0.0, 0.0, 0.0, j2_ang.x, j2_ang.y, j2_ang.z],
                    c: a1.dot(a2),
                    ct: 0.0,
                }
            }
            RowKind::EngineZ => {
                let speed = match self.kind {
                    JointKind::Engine { speed } => speed,
                    _ => 0.0,
                };
                let rz = Self::rot_row(&m1, &m2, b1, b2, 2);
                RowData {
                    j1: rz.j1,
                    j2: rz.j2,
                    c: 0.0,
                    // Solved relative speed about Z equals +speed.
                    ct: -speed,
                }
            }
        }
    }

    fn make_block(
        h1: Option<VariableHandle>,
        h2: Option<VariableHandle>,
        data: &RowData,
    ) -> Option<ConstraintBlock> {
        match (h1, h2) {
            (Some(a), Some(b)) => {
                let mut block = ConstraintBlock::pair(a, 6, b, 6);
                block.jac_a.copy_from_slice(&data.j1);
                block.jac_b.copy_from_slice(&data.j2);
                Some(block)
            }
            (Some(a), None) => {
                let mut block = ConstraintBlock::single(a, 6);
                block.jac_a.copy_from_slice(&data.j1);
                Some(block)
            }
            (None, Some(b)) => {
                let mut block = ConstraintBlock::single(b, 6);
                block.jac_a.copy_from_slice(&data.j2);
                Some(block)
            }
            (None, None) => None,
        }
    }

    pub fn inject_constraints(
        &mut self,
        descriptor: &mut SystemDescriptor,
        bodies: &[RigidBody],
    ) -> KinetraResult<()> {
        let b1 = &bodies[self.body_1.index()];
        let b2 = &bodies[self.body_2.index()];
        let h1 = b1.var_handle();
        let h2 = b2.var_handle();
        self.rows.clear();
        for kind in self.row_kinds() {
            let data = self.row_data(b1, b2, kind);
            let handle = match Self::make_block(h1, h2, &data) {
                Some(block) => Some(descriptor.inject_constraint(block)?),
                None => None,
            };
            self.rows.push((kind, handle));
        }
        Ok(())
    }

    pub fn load_constraint_terms(
        &mut self,
        descriptor: &mut SystemDescriptor,
        params: &LoadParams,
        bodies: &[RigidBody],
    ) -> KinetraResult<()> {
        let b1 = &bodies[self.body_1.index()];
        let b2 = &bodies[self.body_2.index()];
        for &(kind, handle) in &self.rows {
            let Some(h) = handle else { continue };
            let data = self.row_data(b1, b2, kind);
            let row = descriptor.constraint_mut(h)?;
            row.bi_reset();
            row.bi_load_c(data.c, params.c_factor, params.recovery_clamp, params.do_clamp);
            if data.ct != 0.0 {
                row.bi_load_ct(data.ct, params.ct_factor);
            }
        }
        Ok(())
    }

    /// Reads the solved multipliers back into `react_force` /
    /// `react_torque` (marker-1 basis, acting on body 2).
    pub fn fetch_reactions(
        &mut self,
        descriptor: &SystemDescriptor,
        factor: Real,
    ) -> KinetraResult<()> {
        self.react_force = DVec3::ZERO;
        self.react_torque = DVec3::ZERO;
        let screw_tau = self.tau().unwrap_or(0.0);
        for &(kind, handle) in &self.rows {
            let Some(h) = handle else { continue };
            let r = descriptor.constraint(h)?.react(factor);
            match kind {
                RowKind::Trans(k) => self.react_force[k] = r,
                RowKind::Rot(k) => self.react_torque[k] = r,
                RowKind::ScrewZ => {
                    self.react_force.z = r;
                    self.react_torque.z = -screw_tau * r;
                }
                RowKind::Gap => self.react_force.x = r,
                RowKind::Cross => self.react_torque.x = r,
                RowKind::EngineZ => self.react_torque.z = r,
            }
        }
        Ok(())
    }

    /// Handle of the i-th row in this assembly, `None` when the row was
    /// not injected (both bodies inactive) or out of range.
    pub fn row_handle(&self, index: usize) -> Option<ConstraintHandle> {
        self.rows.get(index).and_then(|&(_, h)| h)
    }

    /// Relative Z rotation angle between the two markers, the `alpha`
    /// of the screw coupling.
    pub fn relative_angle(&self, bodies: &[RigidBody]) -> Real {
        let m1 = bodies[self.body_1.index()].frame().compose(&self.frame_1);
        let m2 = bodies[self.body_2.index()].frame().compose(&self.frame_2);
        rotation::relative_z_angle(m1.rot, m2.rot)
    }

    /// Marker separation along marker-1 Z, the `z` of the screw
    /// coupling.
    pub fn relative_z(&self, bodies: &[RigidBody]) -> Real {
        let m1 = bodies[self.body_1.index()].frame().compose(&self.frame_1);
        let m2 = bodies[self.body_2.index()].frame().compose(&self.frame_2);
        m1.z_axis().dot(m2.pos - m1.pos)
    }

    /// Applies the spring-damper force pair for spring joints. Other
    /// kinds are unaffected.
    pub fn apply_spring_forces(&self, bodies: &mut [RigidBody]) {
        let JointKind::Spring {
            stiffness,
            damping,
            rest_length,
        } = self.kind
        else {
            return;
        };
        let m1 = bodies[self.body_1.index()].frame().compose(&self.frame_1);
        let m2 = bodies[self.body_2.index()].frame().compose(&self.frame_2);
        let d = m2.pos - m1.pos;
        let len = d.length();
        if len < EPSILON {
            return;
        }
        let u = d / len;
        let v_rel = bodies[self.body_2.index()].point_velocity(m2.pos)
            - bodies[self.body_1.index()].point_velocity(m1.pos);
        let magnitude = stiffness * (len - rest_length) + damping * v_rel.dot(u);
        // Positive magnitude pulls the markers together.
        bodies[self.body_2.index()].apply_force_at_point(-magnitude * u, m2.pos);
        bodies[self.body_1.index()].apply_force_at_point(magnitude * u, m1.pos);
    }
}
