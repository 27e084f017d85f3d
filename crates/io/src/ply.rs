//! Stanford PLY, ASCII coded. Vertex properties beyond x, y and z (colours, normals) are
//! skipped, and per-vertex data is not read.

use std::io::Write;
use std::path::Path;

use laminar_mesh::{Facet, Geometry, Vector3};

use crate::error::{Error, Result};
use crate::text::{non_empty_lines, read_text, Line};

const FORMAT: &str = "PLY";

struct Header {
    vertices: usize,
    faces: usize,
    vertex_properties: usize,
    /// Index of the first body line.
    body: usize,
}

pub fn read_ply<P: AsRef<Path>>(p: P) -> Result<Geometry> {
    let text = read_text(p.as_ref(), FORMAT)?;
    parse_ply(&text)
}

pub fn parse_ply(text: &str) -> Result<Geometry> {
    let lines = non_empty_lines(text);
    let header = read_header(&lines)?;
    log::debug!(
        "PLY header: {} vertices, {} faces",
        header.vertices,
        header.faces
    );
    if header.vertex_properties > 3 {
        log::warn!(
            "ignoring {} extra vertex properties",
            header.vertex_properties - 3
        );
    }

    let body = &lines[header.body..];
    let needed = match header.vertices.checked_add(header.faces) {
        Some(needed) if needed <= body.len() => needed,
        _ => {
            return Err(Error::malformed(
                lines.last().map_or(0, |l| l.number),
                format!(
                    "expected {} vertex and {} face rows, found {}",
                    header.vertices,
                    header.faces,
                    body.len()
                ),
            ))
        }
    };

    let mut vertices = Vec::with_capacity(header.vertices);
    for line in &body[..header.vertices] {
        vertices.push(Vector3::new(
            line.field(0, "x coordinate")?,
            line.field(1, "y coordinate")?,
            line.field(2, "z coordinate")?,
        ));
    }

    let mut facets = Vec::with_capacity(header.faces);
    for (face, line) in body[header.vertices..needed].iter().enumerate() {
        let corners: usize = line.field(0, "face vertex count")?;
        if corners != 3 {
            return Err(Error::NonTriangularFace {
                face,
                vertices: corners,
            });
        }
        facets.push(Facet::new(
            line.field(1, "vertex index")?,
            line.field(2, "vertex index")?,
            line.field(3, "vertex index")?,
        ));
    }

    Ok(Geometry::new(vertices, facets)?)
}

fn read_header(lines: &[Line<'_>]) -> Result<Header> {
    match lines.first() {
        Some(l) if l.text.trim() == "ply" => {}
        first => {
            return Err(Error::malformed(
                first.map_or(1, |l| l.number),
                "missing \"ply\" magic line",
            ))
        }
    }

    let mut vertices = None;
    let mut faces = None;
    let mut vertex_properties = 0;
    let mut element = "";
    for (i, line) in lines.iter().enumerate().skip(1) {
        let mut tokens = line.tokens();
        match tokens.next() {
            Some("format") => {
                let kind = tokens.next().unwrap_or("");
                if kind != "ascii" {
                    return Err(Error::BinaryUnsupported { format: FORMAT });
                }
            }
            Some("element") => {
                element = tokens.next().unwrap_or("");
                match element {
                    "vertex" => vertices = Some(line.field(2, "vertex count")?),
                    "face" => faces = Some(line.field(2, "face count")?),
                    other => log::warn!("line {}: skipping PLY element {other:?}", line.number),
                }
            }
            Some("property") if element == "vertex" => vertex_properties += 1,
            Some("end_header") => {
                return Ok(Header {
                    vertices: vertices.ok_or_else(|| {
                        Error::malformed(line.number, "header has no vertex element")
                    })?,
                    faces: faces.unwrap_or(0),
                    vertex_properties,
                    body: i + 1,
                })
            }
            _ => {}
        }
    }
    Err(Error::malformed(
        lines.last().map_or(1, |l| l.number),
        "missing end_header",
    ))
}

pub fn write_ply<W: Write + ?Sized>(geometry: &Geometry, w: &mut W) -> Result<()> {
    writeln!(w, "ply")?;
    writeln!(w, "format ascii 1.0")?;
    writeln!(w, "element vertex {}", geometry.vertex_count())?;
    writeln!(w, "property float x")?;
    writeln!(w, "property float y")?;
    writeln!(w, "property float z")?;
    writeln!(w, "element face {}", geometry.facet_count())?;
    writeln!(w, "property list uchar int vertex_indices")?;
    writeln!(w, "end_header")?;
    for v in geometry.vertices() {
        writeln!(w, "{} {} {}", v.x, v.y, v.z)?;
    }
    for f in geometry.facets() {
        writeln!(w, "3 {} {} {}", f.p0, f.p1, f.p2)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const COLOURED_TRIANGLE: &str = "ply
format ascii 1.0
comment exported with colours
element vertex 3
property float x
property float y
property float z
property uchar red
property uchar green
property uchar blue
element face 1
property list uchar int vertex_indices
end_header
0 0 0 255 0 0
1 0 0 0 255 0
0 1 0 0 0 255
3 0 1 2
";

    #[test]
    fn colours_are_skipped() {
        let mesh = parse_ply(COLOURED_TRIANGLE).unwrap();
        assert_eq!(
            &[
                Vector3::new(0.0, 0.0, 0.0),
                Vector3::new(1.0, 0.0, 0.0),
                Vector3::new(0.0, 1.0, 0.0),
            ],
            mesh.vertices()
        );
        assert_eq!(&[Facet::new(0, 1, 2)], mesh.facets());
    }

    #[test]
    fn quads_are_rejected() {
        let quad = COLOURED_TRIANGLE.replace("3 0 1 2", "4 0 1 2 2");
        assert!(matches!(
            parse_ply(&quad),
            Err(Error::NonTriangularFace {
                face: 0,
                vertices: 4
            })
        ));
    }

    #[test]
    fn binary_format_is_rejected() {
        let binary = COLOURED_TRIANGLE.replace("format ascii 1.0", "format binary_little_endian 1.0");
        assert!(matches!(
            parse_ply(&binary),
            Err(Error::BinaryUnsupported { format: "PLY" })
        ));
    }

    #[test]
    fn truncated_body_is_malformed() {
        let truncated = COLOURED_TRIANGLE.replace("3 0 1 2\n", "");
        assert!(matches!(parse_ply(&truncated), Err(Error::Malformed { .. })));
    }

    #[test]
    fn huge_counts_are_malformed() {
        for (from, to) in [
            ("element vertex 3", "element vertex 18446744073709551615"),
            ("element face 1", "element face 18446744073709551615"),
            ("element vertex 3", "element vertex 5000000000000"),
        ] {
            let text = COLOURED_TRIANGLE.replace(from, to);
            assert!(matches!(parse_ply(&text), Err(Error::Malformed { .. })), "{to}");
        }
    }

    #[test]
    fn write_then_parse() {
        let mesh = parse_ply(COLOURED_TRIANGLE).unwrap();
        let mut out = Vec::new();
        write_ply(&mesh, &mut out).unwrap();
        assert_eq!(mesh, parse_ply(std::str::from_utf8(&out).unwrap()).unwrap());
    }
}
