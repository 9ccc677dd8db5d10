//! Checkpoint, POV-Ray, and configuration round trips.

use kinetra_io::{
    checkpoint_from_str, checkpoint_to_string, write_curve_include, write_mesh_include,
    write_povray_scene, SimulationConfig, SolverConfig,
};
use kinetra_math::{DQuat, DVec3, Frame};
use kinetra_physics::{
    ContactMaterial, Joint, JointKind, RigidBody, ShapeGeometry, System, TriMesh, VisualShape,
};
use kinetra_types::KinetraError;

fn sample_bodies() -> Vec<RigidBody> {
    let mut a = RigidBody::new(2.0, DVec3::new(1.0, 2.0, 3.0));
    a.id = 7;
    a.family_group = 2;
    a.family_mask = 0xff;
    a.material = ContactMaterial::Nsc {
        friction: 0.4,
        rolling_friction: 0.01,
        spinning_friction: 0.0,
        restitution: 0.3,
        cohesion: 0.0,
        compliance: 1e-8,
        compliance_tangential: 1e-8,
        damping: 0.2,
    };
    a.set_frame(Frame::new(
        DVec3::new(0.5, -1.0, 2.0),
        DQuat::from_axis_angle(DVec3::new(1.0, 1.0, 0.0).normalize(), 0.7),
    ));
    a.set_lin_vel(DVec3::new(0.1, 0.2, -0.3));
    a.set_ang_vel_local(DVec3::new(0.0, 0.5, 1.0));
    a.add_shape(VisualShape::new(ShapeGeometry::Sphere { radius: 0.25 }));
    a.add_shape(
        VisualShape::new(ShapeGeometry::Box {
            half_extents: DVec3::new(0.1, 0.2, 0.3),
        })
        .with_pose(Frame::from_pos(DVec3::new(0.0, 0.4, 0.0))),
    );

    let mut b = RigidBody::new(5.0, DVec3::ONE);
    b.id = 8;
    b.set_fixed(true);
    b.set_collide(true);
    b.material = ContactMaterial::default_smc();
    b.add_shape(VisualShape::new(ShapeGeometry::Capsule {
        radius: 0.1,
        half_length: 0.6,
    }));
    vec![a, b]
}

#[test]
fn checkpoint_round_trips_mixed_materials() {
    let bodies = sample_bodies();
    let text = checkpoint_to_string(&bodies).unwrap();
    let back = checkpoint_from_str(&text).unwrap();
    assert_eq!(back.len(), 2);

    for (orig, read) in bodies.iter().zip(&back) {
        assert_eq!(read.id, orig.id);
        assert_eq!(read.is_fixed(), orig.is_fixed());
        assert_eq!(read.is_collide(), orig.is_collide());
        assert_eq!(read.family_group, orig.family_group);
        assert_eq!(read.family_mask, orig.family_mask);
        assert_eq!(read.mass(), orig.mass());
        assert_eq!(read.inertia(), orig.inertia());
        assert_eq!(read.material, orig.material);
        assert!((read.pos() - orig.pos()).length() < 1e-12);
        assert!(read.frame().rot.dot(orig.frame().rot).abs() > 1.0 - 1e-12);
        assert!((read.lin_vel() - orig.lin_vel()).length() < 1e-12);
        assert!((read.ang_vel_local() - orig.ang_vel_local()).length() < 1e-9);
        assert_eq!(read.shapes().len(), orig.shapes().len());
        for (s0, s1) in orig.shapes().iter().zip(read.shapes()) {
            assert_eq!(s1.geometry, s0.geometry);
            assert!((s1.pose.pos - s0.pose.pos).length() < 1e-12);
        }
    }
}

#[test]
fn mesh_and_curve_shapes_fail_the_checkpoint_write() {
    let mut body = RigidBody::new(1.0, DVec3::ONE);
    body.add_shape(VisualShape::new(ShapeGeometry::Mesh(TriMesh::default())));
    match checkpoint_to_string(std::slice::from_ref(&body)) {
        Err(KinetraError::UnsupportedShape(100)) => {}
        other => panic!("expected UnsupportedShape(100), got {other:?}"),
    }

    let mut body = RigidBody::new(1.0, DVec3::ONE);
    body.add_shape(VisualShape::new(ShapeGeometry::Curve {
        points: vec![DVec3::ZERO],
        radius: 0.01,
    }));
    assert!(matches!(
        checkpoint_to_string(std::slice::from_ref(&body)),
        Err(KinetraError::UnsupportedShape(101))
    ));
}

#[test]
fn unknown_shape_tag_fails_the_read() {
    let mut body = RigidBody::new(1.0, DVec3::ONE);
    body.add_shape(VisualShape::new(ShapeGeometry::Sphere { radius: 0.5 }));
    let text = checkpoint_to_string(std::slice::from_ref(&body)).unwrap();
    // Retag the sphere asset line (field 8) with an unknown id.
    let hacked = text.replace(" 0 0.5", " 9 0.5");
    assert!(matches!(
        checkpoint_from_str(&hacked),
        Err(KinetraError::UnsupportedShape(9))
    ));
}

#[test]
fn truncated_and_garbled_records_are_malformed() {
    let bodies = sample_bodies();
    let text = checkpoint_to_string(&bodies).unwrap();

    // Cut after the last body's header: its material line is missing.
    let lines: Vec<&str> = text.lines().collect();
    let truncated = lines[..lines.len() - 2].join("\n");
    assert!(matches!(
        checkpoint_from_str(&truncated),
        Err(KinetraError::Malformed(_))
    ));

    assert!(matches!(
        checkpoint_from_str("0 1 0 0 nonsense"),
        Err(KinetraError::Malformed(_))
    ));

    // A header with the wrong arity is rejected before parsing further.
    assert!(matches!(
        checkpoint_from_str("0 1 0 0 0 0 1.0"),
        Err(KinetraError::Malformed(_))
    ));
}

#[test]
fn blank_lines_between_records_are_tolerated() {
    let bodies = sample_bodies();
    let text = checkpoint_to_string(&bodies).unwrap();
    let spaced = text.replace('\n', "\n\n");
    assert_eq!(checkpoint_from_str(&spaced).unwrap().len(), 2);
}

#[test]
fn scene_header_counts_only_exported_links() {
    let mut system = System::new();
    let mut a = RigidBody::new(1.0, DVec3::ONE);
    a.add_shape(VisualShape::new(ShapeGeometry::Sphere { radius: 0.5 }));
    let a = system.add_body(a);
    let mut b = RigidBody::new(1.0, DVec3::ONE);
    b.set_frame(Frame::from_pos(DVec3::new(2.0, 0.0, 0.0)));
    b.add_shape(VisualShape::new(ShapeGeometry::Sphere { radius: 0.2 }));
    b.add_shape(VisualShape::new(ShapeGeometry::Cone {
        radius: 0.2,
        half_length: 0.4,
    }));
    let b = system.add_body(b);

    let link = |kind| Joint::from_local_frames(kind, a, b, Frame::IDENTITY, Frame::IDENTITY);
    system.add_joint(link(JointKind::Revolute));
    // Lock and Screw have no scene representation and are skipped.
    system.add_joint(link(JointKind::Lock));
    system.add_joint(link(JointKind::Screw { tau: 0.1 }));
    system.add_joint(link(JointKind::Distance { distance: 2.0 }));

    let mut buf = Vec::new();
    write_povray_scene(&mut buf, &system).unwrap();
    let text = String::from_utf8(buf).unwrap();
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines[0], "2, 3, 2");
    assert_eq!(lines.len(), 1 + 3 + 2);

    // Asset lines: id, active, pose(7), color(3), tag, params.
    let first: Vec<&str> = lines[1].split(", ").collect();
    assert_eq!(first.len(), 14);
    assert_eq!(first[0], "0");

    // Revolute carries its marker and axis, Distance both endpoints.
    let revolute: Vec<&str> = lines[4].split(", ").collect();
    assert_eq!(revolute.len(), 7);
    assert_eq!(revolute[0], "0");
    let distance: Vec<&str> = lines[5].split(", ").collect();
    assert_eq!(distance.len(), 7);
    assert_eq!(distance[0], "4");
    assert_eq!(&distance[1..4], ["0", "0", "0"]);
    assert_eq!(&distance[4..7], ["2", "0", "0"]);
}

#[test]
fn mesh_include_swaps_y_and_z() {
    let mesh = TriMesh {
        vertices: vec![
            DVec3::new(1.0, 2.0, 3.0),
            DVec3::new(0.0, 0.0, 1.0),
            DVec3::new(0.0, 1.0, 0.0),
        ],
        normals: Vec::new(),
        faces: vec![[0, 1, 2]],
    };
    let mut buf = Vec::new();
    write_mesh_include(&mut buf, "belt_guard", &mesh).unwrap();
    let text = String::from_utf8(buf).unwrap();

    assert!(text.starts_with("#declare belt_guard = mesh2 {"));
    assert!(text.contains("<1, 3, 2>,"));
    assert!(text.contains("vertex_vectors"));
    assert!(!text.contains("normal_vectors"));
    assert!(text.contains("face_indices"));
    assert!(text.contains("<0, 1, 2>,"));
    assert!(text.contains("pigment"));
}

#[test]
fn curve_include_is_a_sphere_sweep() {
    let points = vec![DVec3::ZERO, DVec3::new(0.0, 1.0, 0.0)];
    let mut buf = Vec::new();
    write_curve_include(&mut buf, "cable", &points, 0.02).unwrap();
    let text = String::from_utf8(buf).unwrap();

    assert!(text.starts_with("#declare cable = sphere_sweep {"));
    assert!(text.contains("linear_spline"));
    assert!(text.contains("  2,"));
    // Second point swaps into POV-Ray's Z slot.
    assert!(text.contains("<0, 0, 1>, 0.02"));
}

#[test]
fn config_round_trips_through_toml() {
    let config = SimulationConfig {
        timestep: 0.002,
        duration: 3.5,
        gravity: [0.0, 0.0, -9.81],
        recovery_clamp: 0.05,
        use_clamping: false,
        solver: SolverConfig::Schur { cfm: 1e-7 },
    };
    let text = config.to_toml_string().unwrap();
    assert_eq!(SimulationConfig::from_toml_str(&text).unwrap(), config);
}

#[test]
fn empty_config_falls_back_to_defaults() {
    let config = SimulationConfig::from_toml_str("").unwrap();
    assert_eq!(config, SimulationConfig::default());
    assert!(matches!(config.solver, SolverConfig::Psor { .. }));
}

#[test]
fn partial_solver_table_fills_in_defaults() {
    let config = SimulationConfig::from_toml_str(
        "timestep = 0.005\n\n[solver]\nkind = \"psor\"\nmax_iterations = 200\n",
    )
    .unwrap();
    assert_eq!(config.timestep, 0.005);
    match config.solver {
        SolverConfig::Psor {
            max_iterations,
            omega,
            tolerance,
        } => {
            assert_eq!(max_iterations, 200);
            assert_eq!(omega, 1.0);
            assert_eq!(tolerance, 1e-10);
        }
        other => panic!("expected psor, got {other:?}"),
    }
}

#[test]
fn invalid_configs_are_rejected() {
    assert!(matches!(
        SimulationConfig::from_toml_str("timestep = 0.0"),
        Err(KinetraError::InvalidConfig(_))
    ));
    assert!(matches!(
        SimulationConfig::from_toml_str("duration = -1.0"),
        Err(KinetraError::InvalidConfig(_))
    ));
    assert!(matches!(
        SimulationConfig::from_toml_str("[solver]\nkind = \"psor\"\nmax_iterations = 0"),
        Err(KinetraError::InvalidConfig(_))
    ));
    // Unparseable TOML surfaces as a serialization error, not a panic.
    assert!(matches!(
        SimulationConfig::from_toml_str("timestep = \"fast\""),
        Err(KinetraError::Serialization(_))
    ));
}
