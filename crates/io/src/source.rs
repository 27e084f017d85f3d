use std::path::{Path, PathBuf};

use laminar_mesh::{Facet, Geometry, Vector3};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::format::{read_geometry, write_geometry, MeshFormat};

/// An in-memory `{coords, faces}` table, as handed over by scripts or deserialized from JSON.
///
/// Both entries are optional here so that an incomplete mapping can be reported as
/// [`Error::MalformedMapping`] rather than as a deserialization failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeshMapping {
    #[serde(default)]
    pub coords: Option<Vec<[f32; 3]>>,
    #[serde(default)]
    pub faces: Option<Vec<[u32; 3]>>,
}

impl MeshMapping {
    pub fn into_geometry(self) -> Result<Geometry> {
        let coords = self
            .coords
            .ok_or(Error::MalformedMapping { missing: "coords" })?;
        let faces = self
            .faces
            .ok_or(Error::MalformedMapping { missing: "faces" })?;
        Ok(Geometry::new(
            coords.into_iter().map(Vector3::from).collect(),
            faces.into_iter().map(Facet::from).collect(),
        )?)
    }
}

impl From<&Geometry> for MeshMapping {
    fn from(g: &Geometry) -> Self {
        Self {
            coords: Some(g.vertices().iter().map(|&v| v.into()).collect()),
            faces: Some(g.facets().iter().map(Facet::indices).collect()),
        }
    }
}

/// Where a surface comes from.
#[derive(Debug, Clone)]
pub enum Source {
    FilePath(PathBuf),
    Mapping(MeshMapping),
    Inline(Geometry),
}

impl From<PathBuf> for Source {
    fn from(p: PathBuf) -> Self {
        Source::FilePath(p)
    }
}

impl From<&Path> for Source {
    fn from(p: &Path) -> Self {
        Source::FilePath(p.to_path_buf())
    }
}

impl From<&str> for Source {
    fn from(p: &str) -> Self {
        Source::FilePath(PathBuf::from(p))
    }
}

impl From<MeshMapping> for Source {
    fn from(m: MeshMapping) -> Self {
        Source::Mapping(m)
    }
}

impl From<Geometry> for Source {
    fn from(g: Geometry) -> Self {
        Source::Inline(g)
    }
}

/// Loads a surface from a file (format chosen by suffix) or an in-memory table.
///
/// Every call builds a fresh [`Geometry`]; nothing is cached between calls.
pub fn load_geometry<S: Into<Source>>(source: S) -> Result<Geometry> {
    match source.into() {
        Source::FilePath(p) => {
            let format = MeshFormat::from_path(&p)?;
            read_geometry(format, &p)
        }
        Source::Mapping(m) => m.into_geometry(),
        Source::Inline(g) => Ok(g),
    }
}

/// Writes `geometry` to `p`, choosing the encoder by suffix.
///
/// The file is only created once the format is known to be writable.
pub fn save_geometry<P: AsRef<Path>>(p: P, geometry: &Geometry) -> Result<()> {
    let p = p.as_ref();
    let format = MeshFormat::from_path(p)?;
    if format.encoder().is_none() {
        return Err(Error::UnsupportedFormat(format!("{format} files cannot be written")));
    }
    log::debug!("writing {} as {format}", p.display());
    let mut f = std::io::BufWriter::new(std::fs::File::create(p)?);
    write_geometry(format, geometry, &mut f)?;
    std::io::Write::flush(&mut f)?;
    Ok(())
}
