//! Integration tests for the constraint solvers on small assembled
//! systems with known solutions.

use kinetra_core::{
    ConstraintBlock, ConstraintMode, ConstraintSolver, MassOperator, SystemDescriptor,
    VariableHandle,
};
use kinetra_solver::{PsorSolver, SchurSolver};
use kinetra_types::KinetraError;

fn node(desc: &mut SystemDescriptor, mass: f64, vx: f64) -> VariableHandle {
    let h = desc.inject_variable(MassOperator::Node { mass });
    desc.variable_mut(h)
        .unwrap()
        .load_speed(&[vx, 0.0, 0.0]);
    h
}

/// Equal-x-velocity row between two 3-DOF blocks.
fn equal_vx_row(a: VariableHandle, b: VariableHandle) -> ConstraintBlock {
    let mut block = ConstraintBlock::pair(a, 3, b, 3);
    block.jac_a[0] = 1.0;
    block.jac_b[0] = -1.0;
    block
}

#[test]
fn bilateral_row_equalizes_momenta() {
    for solver in [true, false] {
        let mut desc = SystemDescriptor::new();
        desc.begin_assembly();
        let a = node(&mut desc, 1.0, 1.0);
        let b = node(&mut desc, 1.0, 0.0);
        desc.inject_constraint(equal_vx_row(a, b)).unwrap();

        let report = if solver {
            PsorSolver::new().solve(&mut desc).unwrap()
        } else {
            SchurSolver::new().solve(&mut desc).unwrap()
        };

        // Equal masses: the shared velocity is the average.
        let va = desc.variable(a).unwrap().qb[0];
        let vb = desc.variable(b).unwrap().qb[0];
        assert!((va - 0.5).abs() < 1e-6, "va = {va}");
        assert!((vb - 0.5).abs() < 1e-6, "vb = {vb}");
        assert!(report.converged);
        assert!(report.residual < 1e-6);
    }
}

#[test]
fn solvers_agree_on_chained_rows() {
    let build = |desc: &mut SystemDescriptor| {
        desc.begin_assembly();
        let a = node(desc, 2.0, 3.0);
        let b = node(desc, 1.0, 0.0);
        let c = node(desc, 4.0, -1.0);
        desc.inject_constraint(equal_vx_row(a, b)).unwrap();
        desc.inject_constraint(equal_vx_row(b, c)).unwrap();
        (a, b, c)
    };

    let mut d1 = SystemDescriptor::new();
    let (a1, b1, c1) = build(&mut d1);
    let mut psor = PsorSolver::new();
    psor.max_iterations = 500;
    psor.solve(&mut d1).unwrap();

    let mut d2 = SystemDescriptor::new();
    let (a2, b2, c2) = build(&mut d2);
    SchurSolver::new().solve(&mut d2).unwrap();

    // Common velocity from momentum conservation: (2*3 + 0 - 4) / 7.
    let expected = 2.0 / 7.0;
    for (d, h) in [(&d1, a1), (&d1, b1), (&d1, c1), (&d2, a2), (&d2, b2), (&d2, c2)] {
        let v = d.variable(h).unwrap().qb[0];
        assert!((v - expected).abs() < 1e-5, "v = {v}");
    }

    // Multipliers agree between the two solvers.
    for i in 0..2 {
        let l1 = d1.constraints()[i].lambda;
        let l2 = d2.constraints()[i].lambda;
        assert!((l1 - l2).abs() < 1e-5, "row {i}: {l1} vs {l2}");
    }
}

#[test]
fn kinematic_partner_drives_the_free_block() {
    for solver in [true, false] {
        let mut desc = SystemDescriptor::new();
        desc.begin_assembly();
        // Zero mass marks the kinematic block; its speed is data.
        let driver = node(&mut desc, 0.0, 3.0);
        let follower = node(&mut desc, 1.0, 0.0);
        desc.inject_constraint(equal_vx_row(driver, follower)).unwrap();

        if solver {
            PsorSolver::new().solve(&mut desc).unwrap();
        } else {
            SchurSolver::new().solve(&mut desc).unwrap();
        }

        assert!((desc.variable(driver).unwrap().qb[0] - 3.0).abs() < 1e-9);
        assert!((desc.variable(follower).unwrap().qb[0] - 3.0).abs() < 1e-5);
    }
}

#[test]
fn fully_kinematic_row_is_skipped() {
    let mut desc = SystemDescriptor::new();
    desc.begin_assembly();
    let a = node(&mut desc, 0.0, 1.0);
    let b = node(&mut desc, 0.0, -1.0);
    desc.inject_constraint(equal_vx_row(a, b)).unwrap();

    let report = PsorSolver::new().solve(&mut desc).unwrap();
    assert!(report.converged);
    assert_eq!(desc.constraints()[0].lambda, 0.0);
    assert_eq!(desc.variable(a).unwrap().qb[0], 1.0);
    assert_eq!(desc.variable(b).unwrap().qb[0], -1.0);
}

#[test]
fn rheonomic_rhs_prescribes_speed() {
    for solver in [true, false] {
        let mut desc = SystemDescriptor::new();
        desc.begin_assembly();
        let a = node(&mut desc, 1.0, 0.0);
        let mut block = ConstraintBlock::single(a, 3);
        block.jac_a[0] = 1.0;
        let h = desc.inject_constraint(block).unwrap();
        // J·v + b = 0 with b = -2 forces vx = 2.
        desc.constraint_mut(h).unwrap().bi_load_ct(-2.0, 1.0);

        if solver {
            PsorSolver::new().solve(&mut desc).unwrap();
        } else {
            SchurSolver::new().solve(&mut desc).unwrap();
        }
        assert!((desc.variable(a).unwrap().qb[0] - 2.0).abs() < 1e-6);
    }
}

#[test]
fn unilateral_row_only_pushes() {
    // Separating: residual positive, multiplier projected to zero.
    let mut desc = SystemDescriptor::new();
    desc.begin_assembly();
    let a = node(&mut desc, 1.0, 1.0);
    let mut block = ConstraintBlock::single(a, 3);
    block.jac_a[0] = 1.0;
    block.mode = ConstraintMode::Unilateral;
    desc.inject_constraint(block).unwrap();

    PsorSolver::new().solve(&mut desc).unwrap();
    assert_eq!(desc.constraints()[0].lambda, 0.0);
    assert_eq!(desc.variable(a).unwrap().qb[0], 1.0);

    // Approaching: the row stops the block.
    let mut desc = SystemDescriptor::new();
    desc.begin_assembly();
    let a = node(&mut desc, 1.0, -1.0);
    let mut block = ConstraintBlock::single(a, 3);
    block.jac_a[0] = 1.0;
    block.mode = ConstraintMode::Unilateral;
    desc.inject_constraint(block).unwrap();

    PsorSolver::new().solve(&mut desc).unwrap();
    assert!(desc.constraints()[0].lambda > 0.0);
    assert!(desc.variable(a).unwrap().qb[0].abs() < 1e-6);
}

#[test]
fn schur_rejects_unilateral_rows() {
    let mut desc = SystemDescriptor::new();
    desc.begin_assembly();
    let a = node(&mut desc, 1.0, 0.0);
    let mut block = ConstraintBlock::single(a, 3);
    block.jac_a[0] = 1.0;
    block.mode = ConstraintMode::Unilateral;
    desc.inject_constraint(block).unwrap();

    assert!(matches!(
        SchurSolver::new().solve(&mut desc),
        Err(KinetraError::InvalidConfig(_))
    ));
}

#[test]
fn empty_assembly_is_a_noop_for_schur() {
    let mut desc = SystemDescriptor::new();
    desc.begin_assembly();
    node(&mut desc, 1.0, 1.0);
    let report = SchurSolver::new().solve(&mut desc).unwrap();
    assert_eq!(report.n_constraints, 0);
    assert!(report.converged);
}
