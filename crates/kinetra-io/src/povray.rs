//! POV-Ray export.
//!
//! The scene listing is a comma-separated text consumed by a POV-Ray
//! postprocessing script: a header with element counts, one line per
//! visual asset, and one line per supported joint. Joint kinds outside
//! the supported set are omitted without incrementing the count.
//!
//! Mesh and curve shapes are emitted as separate include files with
//! `mesh2` / `sphere_sweep` declarations. POV-Ray is left-handed with Y
//! up in screen space; the writers swap Y and Z between the engine's
//! right-handed frame and the renderer's convention.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use kinetra_math::DVec3;
use kinetra_physics::{Joint, JointKind, System, TriMesh};
use kinetra_types::{KinetraResult, Real};

/// Export tag per supported joint kind.
fn link_tag(kind: JointKind) -> Option<u32> {
    match kind {
        JointKind::Revolute => Some(0),
        JointKind::Spherical => Some(1),
        JointKind::Prismatic => Some(2),
        JointKind::Universal => Some(3),
        JointKind::Distance { .. } => Some(4),
        JointKind::Spring { .. } => Some(5),
        JointKind::Engine { .. } => Some(6),
        JointKind::Lock | JointKind::Screw { .. } => None,
    }
}

fn fmt_floats(values: &[Real]) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Writes the scene listing for the current system state.
pub fn write_povray_scene<W: Write>(out: &mut W, system: &System) -> KinetraResult<()> {
    let asset_count: usize = system.bodies().iter().map(|b| b.shapes().len()).sum();
    let link_count = system
        .joints()
        .iter()
        .filter(|j| link_tag(j.kind()).is_some())
        .count();
    writeln!(
        out,
        "{}, {}, {}",
        system.bodies().len(),
        asset_count,
        link_count
    )?;

    for body in system.bodies() {
        for shape in body.shapes() {
            let pose = shape.world_pose(body.frame());
            let tag = shape.geometry.kind_id();
            let mut fields = vec![
                body.id as Real,
                body.is_active() as u8 as Real,
                pose.pos.x,
                pose.pos.y,
                pose.pos.z,
                pose.rot.w,
                pose.rot.x,
                pose.rot.y,
                pose.rot.z,
                shape.color.x,
                shape.color.y,
                shape.color.z,
                tag as Real,
            ];
            fields.extend(shape.geometry.checkpoint_params());
            writeln!(out, "{}", fmt_floats(&fields))?;
        }
    }

    for joint in system.joints() {
        let Some(tag) = link_tag(joint.kind()) else {
            continue;
        };
        write_link_line(out, system, joint, tag)?;
    }
    Ok(())
}

fn write_link_line<W: Write>(
    out: &mut W,
    system: &System,
    joint: &Joint,
    tag: u32,
) -> KinetraResult<()> {
    let m1 = system.body(joint.body_1).frame().compose(&joint.frame_1);
    let m2 = system.body(joint.body_2).frame().compose(&joint.frame_2);
    let axis = m1.z_axis();
    let mut fields = vec![tag as Real, m1.pos.x, m1.pos.y, m1.pos.z];
    match joint.kind() {
        // Point-like joints need only the marker.
        JointKind::Spherical => {}
        // Axis joints add the marker-1 Z axis.
        JointKind::Revolute | JointKind::Prismatic | JointKind::Engine { .. } => {
            fields.extend([axis.x, axis.y, axis.z]);
        }
        JointKind::Universal => {
            let cross = m2.y_axis();
            fields.extend([axis.x, axis.y, axis.z, cross.x, cross.y, cross.z]);
        }
        // Two-endpoint joints add the second marker.
        JointKind::Distance { .. } | JointKind::Spring { .. } => {
            fields.extend([m2.pos.x, m2.pos.y, m2.pos.z]);
        }
        JointKind::Lock | JointKind::Screw { .. } => unreachable!("filtered by link_tag"),
    }
    writeln!(out, "{}", fmt_floats(&fields))?;
    Ok(())
}

pub fn write_povray_scene_file<P: AsRef<Path>>(path: P, system: &System) -> KinetraResult<()> {
    let mut out = BufWriter::new(File::create(path)?);
    write_povray_scene(&mut out, system)
}

// Right-handed engine frame to POV-Ray: swap Y and Z.
fn pov_vec(v: DVec3) -> (Real, Real, Real) {
    (v.x, v.z, v.y)
}

const PIGMENT_STANZA: &str = concat!(
    "  texture {\n",
    "    pigment { color rgb <0.8, 0.8, 0.85> }\n",
    "    finish { ambient 0.2 diffuse 0.7 specular 0.3 }\n",
    "  }\n"
);

/// Writes a `mesh2` declaration for an indexed triangle mesh.
pub fn write_mesh_include<W: Write>(out: &mut W, name: &str, mesh: &TriMesh) -> KinetraResult<()> {
    writeln!(out, "#declare {name} = mesh2 {{")?;

    writeln!(out, "  vertex_vectors {{")?;
    writeln!(out, "    {},", mesh.vertices.len())?;
    for v in &mesh.vertices {
        let (x, y, z) = pov_vec(*v);
        writeln!(out, "    <{x}, {y}, {z}>,")?;
    }
    writeln!(out, "  }}")?;

    if !mesh.normals.is_empty() {
        writeln!(out, "  normal_vectors {{")?;
        writeln!(out, "    {},", mesh.normals.len())?;
        for n in &mesh.normals {
            let (x, y, z) = pov_vec(*n);
            writeln!(out, "    <{x}, {y}, {z}>,")?;
        }
        writeln!(out, "  }}")?;
    }

    writeln!(out, "  face_indices {{")?;
    writeln!(out, "    {},", mesh.faces.len())?;
    for f in &mesh.faces {
        writeln!(out, "    <{}, {}, {}>,", f[0], f[1], f[2])?;
    }
    writeln!(out, "  }}")?;

    write!(out, "{PIGMENT_STANZA}")?;
    writeln!(out, "}}")?;
    Ok(())
}

pub fn write_mesh_include_file<P: AsRef<Path>>(
    path: P,
    name: &str,
    mesh: &TriMesh,
) -> KinetraResult<()> {
    let mut out = BufWriter::new(File::create(path)?);
    write_mesh_include(&mut out, name, mesh)
}

/// Writes a `sphere_sweep` declaration for a polyline swept as a thin
/// tube.
pub fn write_curve_include<W: Write>(
    out: &mut W,
    name: &str,
    points: &[DVec3],
    radius: Real,
) -> KinetraResult<()> {
    writeln!(out, "#declare {name} = sphere_sweep {{")?;
    writeln!(out, "  linear_spline")?;
    writeln!(out, "  {},", points.len())?;
    for p in points {
        let (x, y, z) = pov_vec(*p);
        writeln!(out, "  <{x}, {y}, {z}>, {radius}")?;
    }
    write!(out, "{PIGMENT_STANZA}")?;
    writeln!(out, "}}")?;
    Ok(())
}

pub fn write_curve_include_file<P: AsRef<Path>>(
    path: P,
    name: &str,
    points: &[DVec3],
    radius: Real,
) -> KinetraResult<()> {
    let mut out = BufWriter::new(File::create(path)?);
    write_curve_include(&mut out, name, points, radius)
}
