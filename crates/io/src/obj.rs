//! The surface `.obj` layout written by the MNI/BIC surface tools.
//!
//! This is NOT Wavefront OBJ. The layout is positional rather than tagged, so it is decoded by
//! line offsets (0-based, blank lines counted):
//!
//! ```text
//! 0          P <ambient> <diffuse> <specular> <shininess> <transparency> <n>
//! 1..=n      x y z
//! n+1        (blank)
//! n+2..=2n+1 vertex normals
//! 2n+2       (blank)
//! 2n+3       <m>
//! 2n+4       colour flag and RGBA
//! 2n+5       (blank)
//! ...        m end indices (3, 6, .., 3m), wrapped
//! (blank)
//! ...        3m vertex indices, wrapped
//! ```

use std::io::Write;
use std::path::Path;

use cgmath::InnerSpace;
use laminar_mesh::{Facet, Geometry, Vector3};

use crate::error::{Error, Result};
use crate::text::{all_lines, parse_token, read_text, Line};

const FORMAT: &str = "OBJ";
const VALUES_PER_LINE: usize = 8;

pub fn read_obj<P: AsRef<Path>>(p: P) -> Result<Geometry> {
    let text = read_text(p.as_ref(), FORMAT)?;
    parse_obj(&text)
}

pub fn parse_obj(text: &str) -> Result<Geometry> {
    let lines = all_lines(text);
    let line = |i: usize| {
        lines.get(i).copied().ok_or_else(|| {
            Error::malformed(
                lines.len(),
                format!("file ends before line {} of the surface object", i + 1),
            )
        })
    };

    let n: usize = line(0)?.field(6, "vertex count")?;
    // Vertices, normals and the face header take 2n + 6 lines before any index.
    let body = n.checked_mul(2).and_then(|l| l.checked_add(6));
    if body.map_or(true, |l| l > lines.len()) {
        return Err(Error::malformed(
            lines.len(),
            format!("file is too short for {n} vertices"),
        ));
    }
    let mut vertices = Vec::with_capacity(n);
    for i in 1..=n {
        let l = line(i)?;
        vertices.push(Vector3::new(
            l.field(0, "x coordinate")?,
            l.field(1, "y coordinate")?,
            l.field(2, "z coordinate")?,
        ));
    }

    let m: usize = line(2 * n + 3)?.field(0, "face count")?;
    log::debug!("surface object: {n} vertices, {m} faces");

    // End indices run up to the next blank line; the vertex indices follow it.
    let rest = lines.get(2 * n + 6..).unwrap_or(&[]);
    let split = rest.iter().position(Line::is_blank).unwrap_or(rest.len());
    let ends = tokens(&rest[..split])?;
    let indices = tokens(rest.get(split + 1..).unwrap_or(&[]))?;

    if ends.len() != m {
        return Err(Error::malformed(
            line(2 * n + 3)?.number,
            format!("expected {m} end indices, found {}", ends.len()),
        ));
    }
    let mut previous = 0;
    for (face, &end) in ends.iter().enumerate() {
        let corners = end.checked_sub(previous).unwrap_or(0) as usize;
        if corners != 3 {
            return Err(Error::NonTriangularFace {
                face,
                vertices: corners,
            });
        }
        previous = end;
    }
    if indices.len() != 3 * m {
        return Err(Error::malformed(
            lines.len(),
            format!("expected {} vertex indices, found {}", 3 * m, indices.len()),
        ));
    }

    let facets = indices
        .chunks_exact(3)
        .map(|i| Facet::new(i[0], i[1], i[2]))
        .collect();
    Ok(Geometry::new(vertices, facets)?)
}

fn tokens(lines: &[Line<'_>]) -> Result<Vec<u32>> {
    let mut out = Vec::new();
    for line in lines {
        for token in line.tokens() {
            out.push(parse_token(token, line.number, "index")?);
        }
    }
    Ok(out)
}

/// Area-weighted vertex normals. Vertices that belong to no facet get a zero normal.
fn vertex_normals(geometry: &Geometry) -> Vec<Vector3> {
    let mut normals = vec![Vector3::new(0.0, 0.0, 0.0); geometry.vertex_count()];
    for (f, t) in geometry.facets().iter().zip(geometry.triangles()) {
        let n = t.area_normal();
        for i in f.indices() {
            normals[i as usize] += n;
        }
    }
    for n in &mut normals {
        if n.magnitude2() > 0.0 {
            *n = n.normalize();
        }
    }
    normals
}

fn write_wrapped<W: Write + ?Sized>(w: &mut W, values: impl Iterator<Item = u32>) -> Result<()> {
    let values: Vec<String> = values.map(|v| v.to_string()).collect();
    for row in values.chunks(VALUES_PER_LINE) {
        writeln!(w, " {}", row.join(" "))?;
    }
    Ok(())
}

pub fn write_obj<W: Write + ?Sized>(geometry: &Geometry, w: &mut W) -> Result<()> {
    let n = geometry.vertex_count();
    let m = geometry.facet_count() as u32;
    writeln!(w, "P 0.3 0.3 0.4 10 1 {n}")?;
    for v in geometry.vertices() {
        writeln!(w, " {} {} {}", v.x, v.y, v.z)?;
    }
    writeln!(w)?;
    for v in vertex_normals(geometry) {
        writeln!(w, " {} {} {}", v.x, v.y, v.z)?;
    }
    writeln!(w)?;
    writeln!(w, " {m}")?;
    writeln!(w, " 0 1 1 1 1")?;
    writeln!(w)?;
    write_wrapped(w, (1..=m).map(|i| 3 * i))?;
    writeln!(w)?;
    write_wrapped(w, geometry.facets().iter().flat_map(|f| f.indices()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const TETRAHEDRON: &str = "P 0.3 0.3 0.4 10 1 4
 0 0 0
 1 0 0
 0 1 0
 0 0 1

 -0.57735 -0.57735 -0.57735
 0 0 -1
 0 0 -1
 0 -1 0

 2
 0 1 1 1 1

 3 6

 0 1 2 0 1 3
";

    #[test]
    fn parse_tetrahedron() {
        let mesh = parse_obj(TETRAHEDRON).unwrap();
        assert_eq!(4, mesh.vertex_count());
        assert_eq!(Vector3::new(0.0, 0.0, 1.0), mesh.vertices()[3]);
        assert_eq!(&[Facet::new(0, 1, 2), Facet::new(0, 1, 3)], mesh.facets());
    }

    #[test]
    fn non_triangular_end_indices_are_rejected() {
        let quads = TETRAHEDRON.replace(" 3 6\n", " 4 6\n");
        assert!(matches!(
            parse_obj(&quads),
            Err(Error::NonTriangularFace {
                face: 0,
                vertices: 4
            })
        ));
    }

    #[test]
    fn face_count_must_match() {
        let wrong = TETRAHEDRON.replace("\n 2\n", "\n 3\n");
        assert!(matches!(parse_obj(&wrong), Err(Error::Malformed { .. })));
    }

    #[test]
    fn huge_vertex_count_is_malformed() {
        for count in ["4000000000000", "18446744073709551615"] {
            let text = TETRAHEDRON.replacen("1 4\n", &format!("1 {count}\n"), 1);
            assert!(matches!(parse_obj(&text), Err(Error::Malformed { .. })), "{count}");
        }
    }

    #[test]
    fn normals_point_away_from_facets() {
        let mesh = parse_obj(TETRAHEDRON).unwrap();
        let normals = vertex_normals(&mesh);
        // Vertex 2 only belongs to facet (0, 1, 2), which lies in the z = 0 plane.
        assert_eq!(Vector3::new(0.0, 0.0, 1.0), normals[2]);
    }

    #[test]
    fn write_then_parse() {
        let mesh = parse_obj(TETRAHEDRON).unwrap();
        let mut out = Vec::new();
        write_obj(&mesh, &mut out).unwrap();
        assert_eq!(mesh, parse_obj(std::str::from_utf8(&out).unwrap()).unwrap());
    }
}
