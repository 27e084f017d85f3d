//! Legacy VTK PolyData, ASCII coded.
//!
//! ```text
//! # vtk DataFile Version 3.0
//! <title>
//! ASCII
//! DATASET POLYDATA
//! POINTS <n> float
//! x y z                  (one vertex per row, or three vertices per row)
//! POLYGONS <m> <4m>
//! 3 a b c
//! POINT_DATA <n>         (optional)
//! SCALARS <name> float <k>
//! LOOKUP_TABLE default
//! v0 .. vk-1
//! ```

use std::io::Write;
use std::path::Path;

use laminar_mesh::{Facet, Geometry, Vector3, VertexData};

use crate::error::{Error, Result};
use crate::text::{find_keyword, non_empty_lines, read_text, Line};

const FORMAT: &str = "VTK";

/// Reads an ASCII VTK PolyData file, including its POINT_DATA block if there is one.
pub fn read_vtk<P: AsRef<Path>>(p: P) -> Result<Geometry> {
    let text = read_text(p.as_ref(), FORMAT)?;
    parse_vtk(&text)
}

pub fn parse_vtk(text: &str) -> Result<Geometry> {
    let lines = non_empty_lines(text);
    let mut coding_at = 2;
    if matches!(lines.get(1).map(|l| l.text.trim()), Some("ASCII" | "BINARY")) {
        log::warn!("VTK title line is missing");
        coding_at = 1;
    }
    if lines.get(coding_at).map(|l| l.text.trim()) == Some("BINARY") {
        return Err(Error::BinaryUnsupported { format: FORMAT });
    }

    let (points_at, number_vertices) = header(&lines, "POINTS")?;
    let (polygons_at, number_faces) = header(&lines, "POLYGONS")?;
    log::debug!("VTK header: {number_vertices} vertices, {number_faces} faces");

    let vertices = read_vertices(&lines, points_at + 1, number_vertices)?;
    let facets = read_facets(&lines, polygons_at + 1, number_faces)?;
    let geometry = Geometry::new(vertices, facets)?;

    match read_point_data(&lines, number_vertices)? {
        Some(data) => Ok(geometry.with_vertex_data(data)?),
        None => Ok(geometry),
    }
}

/// Reads only the POINT_DATA block of an ASCII VTK file.
///
/// Returns `None` if the file has no per-vertex data.
pub fn read_vtk_data<P: AsRef<Path>>(p: P) -> Result<Option<VertexData>> {
    let text = read_text(p.as_ref(), FORMAT)?;
    let lines = non_empty_lines(&text);
    let (_, number_vertices) = header(&lines, "POINTS")?;
    read_point_data(&lines, number_vertices)
}

/// Locates the `keyword` line and parses the count in its second field.
fn header(lines: &[Line<'_>], keyword: &str) -> Result<(usize, usize)> {
    let at = find_keyword(lines, keyword).ok_or_else(|| {
        Error::malformed(
            lines.last().map_or(0, |l| l.number),
            format!("no {keyword} section"),
        )
    })?;
    let count = lines[at].field(1, &format!("{keyword} count"))?;
    Ok((at, count))
}

fn block<'l, 'a>(lines: &'l [Line<'a>], start: usize, rows: usize, what: &str) -> Result<&'l [Line<'a>]> {
    let end = start.checked_add(rows);
    end.and_then(|end| lines.get(start..end)).ok_or_else(|| {
        Error::malformed(
            lines.last().map_or(0, |l| l.number),
            format!("file ends before {rows} {what} rows were read"),
        )
    })
}

fn read_vertices(lines: &[Line<'_>], start: usize, count: usize) -> Result<Vec<Vector3>> {
    if count == 0 {
        return Ok(Vec::new());
    }
    let first = block(lines, start, 1, "vertex")?[0];
    let columns = first.tokens().count();
    let coords: Vec<f32> = match columns {
        3 => {
            let rows = block(lines, start, count, "vertex")?;
            let mut coords = Vec::with_capacity(rows.len() * 3);
            for line in rows {
                let row: Vec<f32> = line.values("coordinate")?;
                if row.len() != 3 {
                    return Err(Error::malformed(
                        line.number,
                        format!("expected 3 coordinates, found {}", row.len()),
                    ));
                }
                coords.extend(row);
            }
            coords
        }
        // Some exporters pack three vertices on each row. Walk the rows triple by triple and
        // drop whatever pads the final row.
        9 => {
            let rows = block(lines, start, count.div_ceil(3), "vertex")?;
            let mut coords = Vec::with_capacity(rows.len() * 9);
            for line in rows {
                let row: Vec<f32> = line.values("coordinate")?;
                if row.len() > 9 || row.len() % 3 != 0 {
                    return Err(Error::malformed(
                        line.number,
                        format!("expected up to 3 packed vertices, found {} values", row.len()),
                    ));
                }
                coords.extend(row);
            }
            if coords.len() < count * 3 {
                return Err(Error::malformed(
                    lines[start].number,
                    format!("expected {count} vertices, found {}", coords.len() / 3),
                ));
            }
            coords.truncate(count * 3);
            coords
        }
        n => {
            return Err(Error::malformed(
                first.number,
                format!("vertex rows out of shape: {n} columns"),
            ))
        }
    };
    Ok(coords
        .chunks_exact(3)
        .map(|c| Vector3::new(c[0], c[1], c[2]))
        .collect())
}

fn read_facets(lines: &[Line<'_>], start: usize, count: usize) -> Result<Vec<Facet>> {
    block(lines, start, count, "polygon")?
        .iter()
        .enumerate()
        .map(|(face, line)| {
            let row: Vec<u32> = line.values("vertex index")?;
            let vertices = row.first().copied().unwrap_or(0) as usize;
            if vertices != 3 || row.len() != 4 {
                return Err(Error::NonTriangularFace {
                    face,
                    vertices: if vertices == 3 { row.len() - 1 } else { vertices },
                });
            }
            Ok(Facet::new(row[1], row[2], row[3]))
        })
        .collect()
}

fn read_point_data(lines: &[Line<'_>], count: usize) -> Result<Option<VertexData>> {
    let Some(at) = find_keyword(lines, "POINT_DATA") else {
        return Ok(None);
    };
    // POINT_DATA is followed by the SCALARS and LOOKUP_TABLE lines.
    let rows = block(lines, at + 3, count, "point data")?;
    let columns = rows.first().map_or(1, |l| l.tokens().count());
    let mut values = Vec::with_capacity(rows.len() * columns);
    for line in rows {
        let row: Vec<f32> = line.values("data value")?;
        if row.len() != columns {
            return Err(Error::malformed(
                line.number,
                format!("expected {columns} data values, found {}", row.len()),
            ));
        }
        values.extend(row);
    }
    Ok(VertexData::from_rows(columns, values))
}

/// Writes `geometry` as ASCII VTK PolyData, with a POINT_DATA block if it carries vertex data.
pub fn write_vtk<W: Write + ?Sized>(geometry: &Geometry, w: &mut W) -> Result<()> {
    writeln!(w, "# vtk DataFile Version 3.0")?;
    writeln!(w, "laminar surface")?;
    writeln!(w, "ASCII")?;
    writeln!(w, "DATASET POLYDATA")?;
    writeln!(w, "POINTS {} float", geometry.vertex_count())?;
    for v in geometry.vertices() {
        writeln!(w, "{} {} {}", v.x, v.y, v.z)?;
    }
    let m = geometry.facet_count();
    writeln!(w, "POLYGONS {} {}", m, m * 4)?;
    for f in geometry.facets() {
        writeln!(w, "3 {} {} {}", f.p0, f.p1, f.p2)?;
    }
    if let Some(data) = geometry.vertex_data() {
        writeln!(w, "POINT_DATA {}", data.len())?;
        writeln!(w, "SCALARS scalars float {}", data.columns())?;
        writeln!(w, "LOOKUP_TABLE default")?;
        for row in data.rows() {
            let row: Vec<String> = row.iter().map(f32::to_string).collect();
            writeln!(w, "{}", row.join(" "))?;
        }
    }
    Ok(())
}
