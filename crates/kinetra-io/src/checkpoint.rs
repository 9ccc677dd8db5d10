//! Checkpoint CSV dialect: body state, material, and visual assets.
//!
//! Per body, three header lines then one line per asset:
//!
//! ```text
//! bodyType bodyId fixed collide group mask mass Ixx Iyy Izz pos(3) quat(4) vel(3) dquat(4)
//! <material fields: 8 for non-smooth, 7 for smooth>
//! <asset count>
//! pos(3) quat(4) shapeTag params...
//! ```
//!
//! Quaternions are stored w-first; the rotational velocity is written
//! as the quaternion time derivative. Only the primitive shape variants
//! have a tag; encountering any other shape fails the write, and an
//! unknown tag fails the read. Neither path skips silently.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use kinetra_math::{rotation, DQuat, DVec3, Frame};
use kinetra_physics::{ContactMaterial, RigidBody, ShapeGeometry, VisualShape};
use kinetra_types::{KinetraError, KinetraResult, Real};

/// Writes the checkpoint records for `bodies`.
pub fn write_checkpoint<W: Write>(out: &mut W, bodies: &[RigidBody]) -> KinetraResult<()> {
    for body in bodies {
        let inertia = body.inertia();
        let pos = body.pos();
        let q = body.frame().rot;
        let vel = body.lin_vel();
        let dq = body.quat_derivative();
        writeln!(
            out,
            "{} {} {} {} {} {} {} {} {} {} {} {} {} {} {} {} {} {} {} {} {} {} {} {}",
            body.material.type_tag(),
            body.id,
            body.is_fixed() as u8,
            body.is_collide() as u8,
            body.family_group,
            body.family_mask,
            body.mass(),
            inertia.x,
            inertia.y,
            inertia.z,
            pos.x,
            pos.y,
            pos.z,
            q.w,
            q.x,
            q.y,
            q.z,
            vel.x,
            vel.y,
            vel.z,
            dq[0],
            dq[1],
            dq[2],
            dq[3],
        )?;

        let fields = body.material.fields();
        let line: Vec<String> = fields.iter().map(|f| f.to_string()).collect();
        writeln!(out, "{}", line.join(" "))?;

        writeln!(out, "{}", body.shapes().len())?;
        for shape in body.shapes() {
            let tag = shape
                .geometry
                .checkpoint_tag()
                .ok_or_else(|| KinetraError::UnsupportedShape(shape.geometry.kind_id()))?;
            let p = shape.pose.pos;
            let r = shape.pose.rot;
            let mut line = format!(
                "{} {} {} {} {} {} {} {}",
                p.x, p.y, p.z, r.w, r.x, r.y, r.z, tag
            );
            for param in shape.geometry.checkpoint_params() {
                line.push(' ');
                line.push_str(&param.to_string());
            }
            writeln!(out, "{line}")?;
        }
    }
    Ok(())
}

pub fn write_checkpoint_file<P: AsRef<Path>>(path: P, bodies: &[RigidBody]) -> KinetraResult<()> {
    let mut out = BufWriter::new(File::create(path)?);
    write_checkpoint(&mut out, bodies)
}

pub fn checkpoint_to_string(bodies: &[RigidBody]) -> KinetraResult<String> {
    let mut buf = Vec::new();
    write_checkpoint(&mut buf, bodies)?;
    String::from_utf8(buf).map_err(|e| KinetraError::Serialization(e.to_string()))
}

fn parse_fields(line: &str) -> KinetraResult<Vec<Real>> {
    line.split_whitespace()
        .map(|tok| {
            tok.parse::<Real>()
                .map_err(|_| KinetraError::Malformed(format!("bad numeric field `{tok}`")))
        })
        .collect()
}

// Blank separators between records are tolerated; a record truncated
// mid-body is not.
fn next_line<R: BufRead>(lines: &mut std::io::Lines<R>) -> KinetraResult<Option<String>> {
    for line in lines.by_ref() {
        let line = line?;
        if !line.trim().is_empty() {
            return Ok(Some(line));
        }
    }
    Ok(None)
}

fn require_line<R: BufRead>(lines: &mut std::io::Lines<R>, what: &str) -> KinetraResult<String> {
    next_line(lines)?
        .ok_or_else(|| KinetraError::Malformed(format!("unexpected end of data, expected {what}")))
}

/// Reads checkpoint records until end of input.
pub fn read_checkpoint<R: BufRead>(input: R) -> KinetraResult<Vec<RigidBody>> {
    let mut lines = input.lines();
    let mut bodies = Vec::new();

    while let Some(header) = next_line(&mut lines)? {
        let f = parse_fields(&header)?;
        if f.len() != 24 {
            return Err(KinetraError::Malformed(format!(
                "body line has {} fields, expected 24",
                f.len()
            )));
        }
        let type_tag = f[0] as u32;
        let mass = f[6];
        let inertia = DVec3::new(f[7], f[8], f[9]);
        let mut body = RigidBody::new(mass, inertia);
        body.id = f[1] as u32;
        body.set_fixed(f[2] != 0.0);
        body.set_collide(f[3] != 0.0);
        body.family_group = f[4] as u32;
        body.family_mask = f[5] as u32;
        let rot = DQuat::from_xyzw(f[14], f[15], f[16], f[13]).normalize();
        body.set_frame(Frame::new(DVec3::new(f[10], f[11], f[12]), rot));
        body.set_lin_vel(DVec3::new(f[17], f[18], f[19]));
        body.set_ang_vel_local(rotation::angular_velocity_from_derivative(
            rot,
            [f[20], f[21], f[22], f[23]],
        ));

        let material_line = require_line(&mut lines, "material line")?;
        let mf = parse_fields(&material_line)?;
        body.material = ContactMaterial::from_fields(type_tag, &mf).ok_or_else(|| {
            KinetraError::Malformed(format!(
                "material line has {} fields for body type {type_tag}",
                mf.len()
            ))
        })?;

        let count_line = require_line(&mut lines, "asset count")?;
        let count: usize = count_line
            .trim()
            .parse()
            .map_err(|_| KinetraError::Malformed(format!("bad asset count `{count_line}`")))?;

        for _ in 0..count {
            let asset_line = require_line(&mut lines, "asset line")?;
            let af = parse_fields(&asset_line)?;
            if af.len() < 8 {
                return Err(KinetraError::Malformed(format!(
                    "asset line has {} fields, expected at least 8",
                    af.len()
                )));
            }
            let pose = Frame::new(
                DVec3::new(af[0], af[1], af[2]),
                DQuat::from_xyzw(af[4], af[5], af[6], af[3]).normalize(),
            );
            let tag = af[7] as u32;
            let geometry = ShapeGeometry::from_checkpoint(tag, &af[8..])
                .ok_or(KinetraError::UnsupportedShape(tag))?;
            body.add_shape(VisualShape::new(geometry).with_pose(pose));
        }

        bodies.push(body);
    }
    Ok(bodies)
}

pub fn read_checkpoint_file<P: AsRef<Path>>(path: P) -> KinetraResult<Vec<RigidBody>> {
    read_checkpoint(BufReader::new(File::open(path)?))
}

pub fn checkpoint_from_str(data: &str) -> KinetraResult<Vec<RigidBody>> {
    read_checkpoint(data.as_bytes())
}
