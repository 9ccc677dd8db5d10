//! Integration tests for kinetra-core: descriptor lifecycle, constraint
//! block loading, and the integrator pipeline on an unconstrained point
//! mass.

use kinetra_core::{
    ConstraintBlock, ConstraintSolver, EulerImplicitLinearized, Integrable, LoadParams,
    MassOperator, ReactionVec, SolveReport, StateDelta, StateDims, StateVector,
    SystemDescriptor, VariableHandle,
};
use kinetra_math::DVec3;
use kinetra_types::{KinetraError, KinetraResult, Real};

#[test]
fn descriptor_assigns_contiguous_offsets() {
    let mut desc = SystemDescriptor::new();
    desc.begin_assembly();
    let b = desc.inject_variable(MassOperator::Body {
        mass: 1.0,
        inertia: DVec3::ONE,
    });
    let s = desc.inject_variable(MassOperator::Shaft { inertia: 0.5 });
    let n = desc.inject_variable(MassOperator::Node { mass: 2.0 });

    assert_eq!(desc.variable(b).unwrap().offset(), 0);
    assert_eq!(desc.variable(s).unwrap().offset(), 6);
    assert_eq!(desc.variable(n).unwrap().offset(), 7);
    assert_eq!(desc.n_dof(), 10);
}

#[test]
fn stale_handle_is_rejected_after_new_assembly() {
    let mut desc = SystemDescriptor::new();
    desc.begin_assembly();
    let h = desc.inject_variable(MassOperator::Shaft { inertia: 1.0 });
    assert!(desc.variable(h).is_ok());

    desc.begin_assembly();
    match desc.variable(h) {
        Err(KinetraError::StaleHandle { held, current }) => {
            assert_eq!(current, held + 1);
        }
        other => panic!("expected StaleHandle, got {other:?}"),
    }
}

#[test]
fn constraint_rejects_jacobian_length_mismatch() {
    let mut desc = SystemDescriptor::new();
    desc.begin_assembly();
    let h = desc.inject_variable(MassOperator::Body {
        mass: 1.0,
        inertia: DVec3::ONE,
    });
    // A 6-DOF block needs a 6-entry segment.
    let block = ConstraintBlock::single(h, 3);
    assert!(matches!(
        desc.inject_constraint(block),
        Err(KinetraError::InactiveVariable)
    ));
}

#[test]
fn constraint_rows_are_indexed_in_injection_order() {
    let mut desc = SystemDescriptor::new();
    desc.begin_assembly();
    let h = desc.inject_variable(MassOperator::Node { mass: 1.0 });
    let c0 = desc.inject_constraint(ConstraintBlock::single(h, 3)).unwrap();
    let c1 = desc.inject_constraint(ConstraintBlock::single(h, 3)).unwrap();
    assert_eq!(desc.constraint(c0).unwrap().row(), 0);
    assert_eq!(desc.constraint(c1).unwrap().row(), 1);
    assert_eq!(desc.n_constraints(), 2);
}

#[test]
fn violation_recovery_is_clamped() {
    let mut desc = SystemDescriptor::new();
    desc.begin_assembly();
    let h = desc.inject_variable(MassOperator::Node { mass: 1.0 });
    let c = desc.inject_constraint(ConstraintBlock::single(h, 3)).unwrap();

    let row = desc.constraint_mut(c).unwrap();
    // C/h would be 100; the clamp caps the recovery speed at 0.1.
    row.bi_load_c(1.0, 100.0, 0.1, true);
    assert_eq!(row.rhs, 0.1);
    assert_eq!(row.violation, 1.0);

    row.bi_reset();
    row.bi_load_c(-1.0, 100.0, 0.1, true);
    assert_eq!(row.rhs, -0.1);

    row.bi_reset();
    row.bi_load_c(1.0, 100.0, 0.1, false);
    assert_eq!(row.rhs, 100.0);
}

#[test]
fn rheonomic_term_accumulates_onto_rhs() {
    let mut desc = SystemDescriptor::new();
    desc.begin_assembly();
    let h = desc.inject_variable(MassOperator::Shaft { inertia: 1.0 });
    let c = desc.inject_constraint(ConstraintBlock::single(h, 1)).unwrap();
    let row = desc.constraint_mut(c).unwrap();
    row.bi_load_c(0.02, 10.0, 1.0, true);
    row.bi_load_ct(-2.0, 1.0);
    assert!((row.rhs - (0.2 - 2.0)).abs() < 1e-12);
}

#[test]
fn reactions_round_trip_through_the_multiplier_vector() {
    let mut desc = SystemDescriptor::new();
    desc.begin_assembly();
    let h = desc.inject_variable(MassOperator::Node { mass: 1.0 });
    let c0 = desc.inject_constraint(ConstraintBlock::single(h, 3)).unwrap();
    let c1 = desc.inject_constraint(ConstraintBlock::single(h, 3)).unwrap();
    desc.constraint_mut(c0).unwrap().lambda = 2.5;
    desc.constraint_mut(c1).unwrap().lambda = -0.5;

    let mut reactions = ReactionVec::zeros(desc.n_constraints());
    desc.gather_reactions(&mut reactions);
    assert_eq!(reactions.as_slice(), &[2.5, -0.5]);

    // A fresh assembly of the same shape can be seeded from the vector.
    desc.begin_assembly();
    let h = desc.inject_variable(MassOperator::Node { mass: 1.0 });
    desc.inject_constraint(ConstraintBlock::single(h, 3)).unwrap();
    desc.inject_constraint(ConstraintBlock::single(h, 3)).unwrap();
    desc.scatter_reactions(&reactions);
    assert_eq!(desc.constraints()[0].lambda, 2.5);
    assert_eq!(desc.constraints()[1].lambda, -0.5);
}

#[test]
fn singular_mass_ignores_forces() {
    let mut desc = SystemDescriptor::new();
    desc.begin_assembly();
    let h = desc.inject_variable(MassOperator::Node { mass: 0.0 });
    let var = desc.variable_mut(h).unwrap();
    var.load_speed(&[1.0, 2.0, 3.0]);
    var.load_forces(&[100.0, 100.0, 100.0], 1.0);
    var.increment_from_forces();
    assert_eq!(var.qb, vec![1.0, 2.0, 3.0]);
}

// ─── integrator on a free point mass ───

struct PointMass {
    mass: Real,
    pos: DVec3,
    vel: DVec3,
    gravity: DVec3,
    /// Inject a single row pinning the X velocity to zero.
    pin_x: bool,
    var: Option<VariableHandle>,
}

impl Integrable for PointMass {
    fn state_dims(&self) -> StateDims {
        StateDims::new(3, 3)
    }

    fn update(&mut self, _time: Real, _update_assets: bool) {}

    fn inject(&mut self, descriptor: &mut SystemDescriptor) -> KinetraResult<()> {
        let var = descriptor.inject_variable(MassOperator::Node { mass: self.mass });
        self.var = Some(var);
        if self.pin_x {
            let mut block = ConstraintBlock::single(var, 3);
            block.jac_a[0] = 1.0;
            descriptor.inject_constraint(block)?;
        }
        Ok(())
    }

    fn load(
        &mut self,
        descriptor: &mut SystemDescriptor,
        params: &LoadParams,
    ) -> KinetraResult<()> {
        let h = self.var.ok_or(KinetraError::InactiveVariable)?;
        let f = self.gravity * self.mass;
        let var = descriptor.variable_mut(h)?;
        var.load_forces(&[f.x, f.y, f.z], params.force_factor);
        var.load_speed(&[self.vel.x, self.vel.y, self.vel.z]);
        Ok(())
    }

    fn apply_solution(
        &mut self,
        descriptor: &SystemDescriptor,
        _react_factor: Real,
    ) -> KinetraResult<()> {
        let h = self.var.ok_or(KinetraError::InactiveVariable)?;
        let qb = &descriptor.variable(h)?.qb;
        self.vel = DVec3::new(qb[0], qb[1], qb[2]);
        Ok(())
    }

    fn gather_state(&self, x: &mut StateVector, v: &mut StateDelta) {
        x.set_vec3(0, self.pos);
        v.set_vec3(0, self.vel);
    }

    fn scatter_state(&mut self, x: &StateVector, v: &StateDelta) -> KinetraResult<()> {
        self.pos = x.vec3(0);
        self.vel = v.vec3(0);
        Ok(())
    }

    fn state_increment(&self, x_new: &mut StateVector, x: &StateVector, dx: &StateDelta) {
        x_new.set_vec3(0, x.vec3(0) + dx.vec3(0));
    }
}

/// Unconstrained solver: folds forces into speeds and reports success.
struct FreeSolver;

impl ConstraintSolver for FreeSolver {
    fn solve(&mut self, descriptor: &mut SystemDescriptor) -> KinetraResult<SolveReport> {
        let (vars, _) = descriptor.parts_mut();
        for var in vars.iter_mut() {
            var.increment_from_forces();
        }
        Ok(SolveReport {
            iterations: 1,
            converged: true,
            residual: 0.0,
            n_dof: descriptor.n_dof(),
            n_constraints: 0,
        })
    }
}

#[test]
fn free_fall_one_step() {
    let g = DVec3::new(0.0, -9.81, 0.0);
    let mut point = PointMass {
        mass: 2.0,
        pos: DVec3::ZERO,
        vel: DVec3::ZERO,
        gravity: g,
        pin_x: false,
        var: None,
    };
    let mut integrator = EulerImplicitLinearized::new();
    let h = 0.01;
    let result = integrator.advance(&mut point, &mut FreeSolver, 0.0, h).unwrap();

    assert_eq!(result.t_end, h);
    // Semi-implicit: v1 = g*h, x1 = v1*h.
    assert!((point.vel.y - g.y * h).abs() < 1e-12);
    assert!((point.pos.y - g.y * h * h).abs() < 1e-12);
}

#[test]
fn integrator_rejects_nonpositive_step() {
    let mut point = PointMass {
        mass: 1.0,
        pos: DVec3::ZERO,
        vel: DVec3::ZERO,
        gravity: DVec3::ZERO,
        pin_x: false,
        var: None,
    };
    let mut integrator = EulerImplicitLinearized::new();
    assert!(matches!(
        integrator.advance(&mut point, &mut FreeSolver, 0.0, 0.0),
        Err(KinetraError::InvalidConfig(_))
    ));
}

/// Records the first row's seeded multiplier, then leaves a marker
/// value behind for the next step to see.
struct ProbeSolver {
    seen: Vec<Real>,
}

impl ConstraintSolver for ProbeSolver {
    fn solve(&mut self, descriptor: &mut SystemDescriptor) -> KinetraResult<SolveReport> {
        let n_dof = descriptor.n_dof();
        let n_constraints = descriptor.n_constraints();
        let (vars, cons) = descriptor.parts_mut();
        for var in vars.iter_mut() {
            var.increment_from_forces();
        }
        self.seen.push(cons[0].lambda);
        cons[0].lambda = 7.0;
        Ok(SolveReport {
            iterations: 1,
            converged: true,
            residual: 0.0,
            n_dof,
            n_constraints,
        })
    }
}

#[test]
fn warm_start_seeds_the_next_assembly() {
    let mut point = PointMass {
        mass: 1.0,
        pos: DVec3::ZERO,
        vel: DVec3::ZERO,
        gravity: DVec3::ZERO,
        pin_x: true,
        var: None,
    };
    let mut probe = ProbeSolver { seen: Vec::new() };

    let mut integrator = EulerImplicitLinearized::new();
    integrator.advance(&mut point, &mut probe, 0.0, 0.01).unwrap();
    integrator.advance(&mut point, &mut probe, 0.01, 0.01).unwrap();
    assert_eq!(probe.seen, vec![0.0, 7.0]);

    // With warm starting off, every assembly starts from zero.
    let mut integrator = EulerImplicitLinearized::new();
    integrator.warm_start = false;
    let mut probe = ProbeSolver { seen: Vec::new() };
    integrator.advance(&mut point, &mut probe, 0.0, 0.01).unwrap();
    integrator.advance(&mut point, &mut probe, 0.01, 0.01).unwrap();
    assert_eq!(probe.seen, vec![0.0, 0.0]);
}
