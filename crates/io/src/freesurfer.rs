//! FreeSurfer binary surfaces (`lh.white`, `rh.pial`, ...), per-vertex morphometry files
//! (`lh.thickness`, `lh.curv`, ...) and parcellations (`lh.aparc.annot`), all big-endian, plus
//! ASCII `.label` files.
//!
//! Header counts are never trusted for allocation: every reader grows its buffers from the
//! values actually present, so a truncated file ends in an I/O error.

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use std::io::{BufRead, BufReader, Read, Write};
use std::path::Path;

use laminar_mesh::{Facet, Geometry, Vector3, VertexData};

use crate::error::{Error, Result};
use crate::text::{all_lines, read_text};

const FORMAT: &str = "FreeSurfer";

/// Triangle surface. The quad variants predate it and are not supported.
pub const TRIANGLE_MAGIC: u32 = 0xFF_FF_FE;
pub const QUAD_MAGIC: u32 = 0xFF_FF_FF;
pub const NEW_QUAD_MAGIC: u32 = 0xFF_FF_FD;
/// Shares its value with [`QUAD_MAGIC`]; the two never appear in the same kind of file.
pub const CURV_MAGIC: u32 = 0xFF_FF_FF;

fn read_magic<R: Read>(r: &mut R) -> Result<u32> {
    Ok(r.read_u24::<BigEndian>()?)
}

fn read_count<R: Read>(r: &mut R, what: &str) -> Result<usize> {
    let n = r.read_i32::<BigEndian>()?;
    usize::try_from(n).map_err(|_| Error::invalid(FORMAT, format!("negative {what} ({n})")))
}

fn read_surface_from<R: BufRead>(r: &mut R) -> Result<Geometry> {
    match read_magic(r)? {
        TRIANGLE_MAGIC => {}
        QUAD_MAGIC | NEW_QUAD_MAGIC => {
            return Err(Error::NonTriangularFace {
                face: 0,
                vertices: 4,
            })
        }
        other => {
            return Err(Error::invalid(
                FORMAT,
                format!("unknown surface magic {other:#08x}"),
            ))
        }
    }

    // The creator comment is two newline-terminated lines, the second usually empty.
    let mut comment = Vec::new();
    r.read_until(b'\n', &mut comment)?;
    r.read_until(b'\n', &mut comment)?;
    log::debug!(
        "FreeSurfer surface: {}",
        String::from_utf8_lossy(&comment).trim()
    );

    let n_vertices = read_count(r, "vertex count")?;
    let n_faces = read_count(r, "face count")?;

    let mut vertices = Vec::new();
    for _ in 0..n_vertices {
        vertices.push(Vector3::new(
            r.read_f32::<BigEndian>()?,
            r.read_f32::<BigEndian>()?,
            r.read_f32::<BigEndian>()?,
        ));
    }

    let mut facets = Vec::new();
    for _ in 0..n_faces {
        let mut corner = || -> Result<u32> {
            let i = r.read_i32::<BigEndian>()?;
            u32::try_from(i).map_err(|_| Error::invalid(FORMAT, format!("negative vertex index {i}")))
        };
        facets.push(Facet::new(corner()?, corner()?, corner()?));
    }

    // Anything after the faces (volume geometry tags) is not needed.
    Ok(Geometry::new(vertices, facets)?)
}

pub fn read_surface<P: AsRef<Path>>(p: P) -> Result<Geometry> {
    let mut f = BufReader::new(std::fs::File::open(p)?);
    read_surface_from(&mut f)
}

pub fn parse_surface(data: &[u8]) -> Result<Geometry> {
    let mut c = std::io::Cursor::new(data);
    read_surface_from(&mut c)
}

pub fn write_surface<W: Write + ?Sized>(geometry: &Geometry, w: &mut W) -> Result<()> {
    w.write_u24::<BigEndian>(TRIANGLE_MAGIC)?;
    w.write_all(b"created by laminar\n\n")?;
    w.write_i32::<BigEndian>(count_to_i32(geometry.vertex_count())?)?;
    w.write_i32::<BigEndian>(count_to_i32(geometry.facet_count())?)?;
    for v in geometry.vertices() {
        w.write_f32::<BigEndian>(v.x)?;
        w.write_f32::<BigEndian>(v.y)?;
        w.write_f32::<BigEndian>(v.z)?;
    }
    for f in geometry.facets() {
        for i in f.indices() {
            w.write_i32::<BigEndian>(count_to_i32(i as usize)?)?;
        }
    }
    Ok(())
}

fn count_to_i32(n: usize) -> Result<i32> {
    i32::try_from(n).map_err(|_| Error::invalid(FORMAT, format!("{n} does not fit in a FreeSurfer file")))
}

fn read_morph_from<R: Read>(r: &mut R) -> Result<VertexData> {
    let magic = read_magic(r)?;
    if magic != CURV_MAGIC {
        return Err(Error::invalid(
            FORMAT,
            format!("unknown morphometry magic {magic:#08x}"),
        ));
    }
    let n_vertices = read_count(r, "vertex count")?;
    let _n_faces = read_count(r, "face count")?;
    let per_vertex = read_count(r, "values per vertex")?;
    if per_vertex == 0 {
        return Err(Error::invalid(FORMAT, "zero values per vertex"));
    }

    let count = n_vertices
        .checked_mul(per_vertex)
        .ok_or_else(|| Error::invalid(FORMAT, format!("{n_vertices} x {per_vertex} values")))?;
    let mut values = Vec::new();
    for _ in 0..count {
        values.push(r.read_f32::<BigEndian>()?);
    }
    VertexData::from_rows(per_vertex, values)
        .ok_or_else(|| Error::invalid(FORMAT, "ragged morphometry data"))
}

/// Reads a `curv`/`sulc`/`thickness` style file.
pub fn read_morph_data<P: AsRef<Path>>(p: P) -> Result<VertexData> {
    let mut f = BufReader::new(std::fs::File::open(p)?);
    read_morph_from(&mut f)
}

pub fn parse_morph_data(data: &[u8]) -> Result<VertexData> {
    let mut c = std::io::Cursor::new(data);
    read_morph_from(&mut c)
}

/// Writes scalar morphometry data. `faces` is recorded in the header only.
pub fn write_morph_data<W: Write + ?Sized>(values: &[f32], faces: usize, w: &mut W) -> Result<()> {
    w.write_u24::<BigEndian>(CURV_MAGIC)?;
    w.write_i32::<BigEndian>(count_to_i32(values.len())?)?;
    w.write_i32::<BigEndian>(count_to_i32(faces)?)?;
    w.write_i32::<BigEndian>(1)?;
    for &v in values {
        w.write_f32::<BigEndian>(v)?;
    }
    Ok(())
}

/// An ASCII FreeSurfer label: a subset of surface vertices with their positions and a value.
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub vertices: Vec<u32>,
    pub coords: Vec<Vector3>,
    pub values: Vec<f32>,
}

/// Parses a `.label` file: a comment line, the row count, then `vertex x y z value` rows.
pub fn parse_label(text: &str) -> Result<Label> {
    let lines = all_lines(text);
    let count_line = lines
        .get(1)
        .ok_or_else(|| Error::malformed(lines.len(), "label has no row count"))?;
    let count: usize = count_line.field(0, "label row count")?;
    let rows = lines
        .get(2..)
        .map(|rest| &rest[..rest.len().min(count)])
        .unwrap_or(&[]);
    if rows.len() != count {
        return Err(Error::malformed(
            lines.len(),
            format!("expected {count} label rows, found {}", rows.len()),
        ));
    }

    let mut label = Label {
        vertices: Vec::with_capacity(count),
        coords: Vec::with_capacity(count),
        values: Vec::with_capacity(count),
    };
    for line in rows {
        label.vertices.push(line.field(0, "vertex index")?);
        label.coords.push(Vector3::new(
            line.field(1, "x coordinate")?,
            line.field(2, "y coordinate")?,
            line.field(3, "z coordinate")?,
        ));
        label.values.push(line.field(4, "label value")?);
    }
    Ok(label)
}

pub fn read_label<P: AsRef<Path>>(p: P) -> Result<Label> {
    let text = read_text(p.as_ref(), "label")?;
    parse_label(&text)
}

/// One structure of an annotation's colour table.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorEntry {
    pub id: i32,
    pub name: String,
    pub rgba: [i32; 4],
}

impl ColorEntry {
    /// The packed colour that vertices of this structure carry in the annotation file.
    pub fn annotation(&self) -> i32 {
        self.rgba[0] + (self.rgba[1] << 8) + (self.rgba[2] << 16)
    }
}

/// A surface parcellation.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    /// Structure id of every vertex, or -1 where the vertex is unlabelled.
    pub labels: Vec<i32>,
    pub colortable: Vec<ColorEntry>,
}

fn read_string<R: Read>(r: &mut R, what: &str) -> Result<String> {
    let len = read_count(r, what)?;
    let mut bytes = Vec::new();
    r.by_ref().take(len as u64).read_to_end(&mut bytes)?;
    if bytes.len() != len {
        return Err(std::io::Error::from(std::io::ErrorKind::UnexpectedEof).into());
    }
    Ok(String::from_utf8_lossy(&bytes)
        .trim_end_matches('\0')
        .to_string())
}

fn read_rgba<R: Read>(r: &mut R) -> Result<[i32; 4]> {
    Ok([
        r.read_i32::<BigEndian>()?,
        r.read_i32::<BigEndian>()?,
        r.read_i32::<BigEndian>()?,
        r.read_i32::<BigEndian>()?,
    ])
}

fn read_colortable<R: Read>(r: &mut R) -> Result<Vec<ColorEntry>> {
    let n = r.read_i32::<BigEndian>()?;
    let mut entries = Vec::new();
    if n > 0 {
        // Original layout: entries are numbered by position.
        let _file_name = read_string(r, "colour table name length")?;
        for id in 0..n {
            let name = read_string(r, "structure name length")?;
            entries.push(ColorEntry {
                id,
                name,
                rgba: read_rgba(r)?,
            });
        }
        return Ok(entries);
    }

    let version = n.unsigned_abs();
    if version != 2 {
        return Err(Error::invalid(
            FORMAT,
            format!("unsupported colour table version {version}"),
        ));
    }
    let _max_structure = read_count(r, "structure count")?;
    let _file_name = read_string(r, "colour table name length")?;
    let count = read_count(r, "colour table entry count")?;
    for _ in 0..count {
        let id = r.read_i32::<BigEndian>()?;
        let name = read_string(r, "structure name length")?;
        entries.push(ColorEntry {
            id,
            name,
            rgba: read_rgba(r)?,
        });
    }
    Ok(entries)
}

fn read_annot_from<R: Read>(r: &mut R) -> Result<Annotation> {
    let n_vertices = read_count(r, "vertex count")?;
    let mut pairs = Vec::new();
    for _ in 0..n_vertices {
        pairs.push((r.read_i32::<BigEndian>()?, r.read_i32::<BigEndian>()?));
    }
    let mut annotations = vec![0i32; pairs.len()];
    for &(vertex, value) in &pairs {
        let slot = usize::try_from(vertex)
            .ok()
            .and_then(|v| annotations.get_mut(v))
            .ok_or_else(|| {
                Error::invalid(
                    FORMAT,
                    format!("annotation for vertex {vertex} of {}", pairs.len()),
                )
            })?;
        *slot = value;
    }

    let tag = r.read_i32::<BigEndian>()?;
    if tag != 1 {
        return Err(Error::invalid(FORMAT, "annotation has no colour table"));
    }
    let colortable = read_colortable(r)?;

    let labels = annotations
        .iter()
        .map(|&a| {
            colortable
                .iter()
                .find(|e| a != 0 && e.annotation() == a)
                .map_or(-1, |e| e.id)
        })
        .collect();
    Ok(Annotation { labels, colortable })
}

/// Reads a `.annot` parcellation.
pub fn read_annot<P: AsRef<Path>>(p: P) -> Result<Annotation> {
    let mut f = BufReader::new(std::fs::File::open(p)?);
    read_annot_from(&mut f)
}

pub fn parse_annot(data: &[u8]) -> Result<Annotation> {
    let mut c = std::io::Cursor::new(data);
    read_annot_from(&mut c)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> Geometry {
        Geometry::new(
            vec![
                Vector3::new(-1.5, 0.0, 2.25),
                Vector3::new(10.0, 20.0, 30.0),
                Vector3::new(0.0, 1.0, 0.0),
            ],
            vec![Facet::new(2, 1, 0)],
        )
        .unwrap()
    }

    #[test]
    fn surface_layout() {
        let mut out = Vec::new();
        write_surface(&triangle(), &mut out).unwrap();
        assert_eq!(&[0xFF, 0xFF, 0xFE], &out[..3]);
        // magic + comment + 2 counts + 9 floats + 3 indices.
        assert_eq!(3 + 20 + 8 + 36 + 12, out.len());
        assert_eq!(triangle(), parse_surface(&out).unwrap());
    }

    #[test]
    fn quad_surfaces_are_rejected() {
        let mut out = Vec::new();
        write_surface(&triangle(), &mut out).unwrap();
        out[2] = 0xFF;
        assert!(matches!(
            parse_surface(&out),
            Err(Error::NonTriangularFace { vertices: 4, .. })
        ));
    }

    #[test]
    fn truncated_surface_is_an_io_error() {
        let mut out = Vec::new();
        write_surface(&triangle(), &mut out).unwrap();
        out.truncate(out.len() - 2);
        assert!(matches!(parse_surface(&out), Err(Error::Io(_))));
    }

    #[test]
    fn huge_surface_counts_are_io_errors() {
        let mut out = Vec::new();
        write_surface(&triangle(), &mut out).unwrap();
        // Vertex count follows the magic and the 20 byte comment.
        out[23..27].copy_from_slice(&i32::MAX.to_be_bytes());
        assert!(matches!(parse_surface(&out), Err(Error::Io(_))));

        let mut out = Vec::new();
        write_surface(&triangle(), &mut out).unwrap();
        out[27..31].copy_from_slice(&i32::MAX.to_be_bytes());
        assert!(matches!(parse_surface(&out), Err(Error::Io(_))));
    }

    #[test]
    fn huge_morph_counts_are_io_errors() {
        let mut data = vec![0xFF, 0xFF, 0xFF];
        data.extend(i32::MAX.to_be_bytes());
        data.extend(0i32.to_be_bytes());
        data.extend(i32::MAX.to_be_bytes());
        assert!(matches!(parse_morph_data(&data), Err(Error::Io(_))));
    }

    #[test]
    fn negative_counts_are_invalid() {
        let mut data = vec![0xFF, 0xFF, 0xFF];
        data.extend((-4i32).to_be_bytes());
        assert!(matches!(
            parse_morph_data(&data),
            Err(Error::InvalidData { .. })
        ));
    }

    #[test]
    fn label_rows() {
        let label = parse_label(
            "#!ascii label  , from subject bert vox2ras=TkReg\n2\n3  1.5 -2.0 0.25 0.000000\n0  0.0 0.0 1.0 0.5\n",
        )
        .unwrap();
        assert_eq!(vec![3, 0], label.vertices);
        assert_eq!(Vector3::new(1.5, -2.0, 0.25), label.coords[0]);
        assert_eq!(vec![0.0, 0.5], label.values);
    }

    #[test]
    fn huge_label_count_is_malformed() {
        let text = "#!ascii label\n18446744073709551615\n3 1.5 -2.0 0.25 0.0\n";
        assert!(matches!(parse_label(text), Err(Error::Malformed { .. })));
    }

    fn annot_bytes(pairs: &[(i32, i32)], entries: &[(i32, &str, [i32; 4])]) -> Vec<u8> {
        let mut out = Vec::new();
        out.write_i32::<BigEndian>(pairs.len() as i32).unwrap();
        for &(v, a) in pairs {
            out.write_i32::<BigEndian>(v).unwrap();
            out.write_i32::<BigEndian>(a).unwrap();
        }
        out.write_i32::<BigEndian>(1).unwrap();
        out.write_i32::<BigEndian>(-2).unwrap();
        out.write_i32::<BigEndian>(entries.len() as i32).unwrap();
        out.write_i32::<BigEndian>(0).unwrap();
        out.write_i32::<BigEndian>(entries.len() as i32).unwrap();
        for &(id, name, rgba) in entries {
            out.write_i32::<BigEndian>(id).unwrap();
            out.write_i32::<BigEndian>(name.len() as i32).unwrap();
            out.write_all(name.as_bytes()).unwrap();
            for c in rgba {
                out.write_i32::<BigEndian>(c).unwrap();
            }
        }
        out
    }

    #[test]
    fn annotation_labels() {
        let cortex = 220 + (20 << 8) + (10 << 16);
        let data = annot_bytes(
            &[(2, cortex), (0, 25 + (5 << 8) + (25 << 16)), (1, 0)],
            &[(0, "unknown", [25, 5, 25, 0]), (1, "cortex", [220, 20, 10, 0])],
        );
        let annot = parse_annot(&data).unwrap();
        assert_eq!(vec![0, -1, 1], annot.labels);
        assert_eq!("cortex", annot.colortable[1].name);
        assert_eq!(cortex, annot.colortable[1].annotation());
    }

    #[test]
    fn annotation_vertex_out_of_range() {
        let data = annot_bytes(&[(5, 0)], &[]);
        assert!(matches!(parse_annot(&data), Err(Error::InvalidData { .. })));
    }

    #[test]
    fn huge_annotation_counts_are_io_errors() {
        let mut data = annot_bytes(&[(0, 0)], &[]);
        data[..4].copy_from_slice(&i32::MAX.to_be_bytes());
        assert!(matches!(parse_annot(&data), Err(Error::Io(_))));
    }

    #[test]
    fn morph_data() {
        let mut out = Vec::new();
        write_morph_data(&[0.5, -1.0, 2.5], 1, &mut out).unwrap();
        assert_eq!(3 + 12 + 12, out.len());
        let data = parse_morph_data(&out).unwrap();
        assert_eq!(1, data.columns());
        assert_eq!(&[0.5, -1.0, 2.5], data.values());
    }
}
