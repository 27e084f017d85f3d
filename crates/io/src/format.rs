use std::io::Write;
use std::path::Path;

use laminar_mesh::Geometry;

use crate::error::{Error, Result};
use crate::{freesurfer, gifti, obj, ply, vtk};

pub type DecodeFn = fn(&Path) -> Result<Geometry>;
pub type EncodeFn = fn(&Geometry, &mut dyn Write) -> Result<()>;

/// The closed set of surface formats this crate can read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeshFormat {
    /// FreeSurfer binary triangle surface (`lh.white`, `rh.pial`, ...).
    FreeSurfer,
    Gifti,
    /// Legacy VTK PolyData, ASCII coded.
    Vtk,
    /// Stanford PLY, ASCII coded.
    Ply,
    /// MNI/BIC surface object (not Wavefront OBJ).
    Obj,
}

/// File name endings and the format each selects, checked in order.
const SUFFIXES: &[(&str, MeshFormat)] = &[
    ("orig", MeshFormat::FreeSurfer),
    ("pial", MeshFormat::FreeSurfer),
    ("white", MeshFormat::FreeSurfer),
    ("sphere", MeshFormat::FreeSurfer),
    ("inflated", MeshFormat::FreeSurfer),
    ("gii", MeshFormat::Gifti),
    ("vtk", MeshFormat::Vtk),
    ("ply", MeshFormat::Ply),
    ("obj", MeshFormat::Obj),
];

fn read_freesurfer(p: &Path) -> Result<Geometry> {
    freesurfer::read_surface(p)
}

fn read_gifti(p: &Path) -> Result<Geometry> {
    gifti::read_gifti(p)
}

fn read_vtk(p: &Path) -> Result<Geometry> {
    vtk::read_vtk(p)
}

fn read_ply(p: &Path) -> Result<Geometry> {
    ply::read_ply(p)
}

fn read_obj(p: &Path) -> Result<Geometry> {
    obj::read_obj(p)
}

fn write_freesurfer(g: &Geometry, w: &mut dyn Write) -> Result<()> {
    freesurfer::write_surface(g, w)
}

fn write_vtk(g: &Geometry, w: &mut dyn Write) -> Result<()> {
    vtk::write_vtk(g, w)
}

fn write_ply(g: &Geometry, w: &mut dyn Write) -> Result<()> {
    ply::write_ply(g, w)
}

fn write_obj(g: &Geometry, w: &mut dyn Write) -> Result<()> {
    obj::write_obj(g, w)
}

impl MeshFormat {
    /// Selects a format from the end of the file name.
    pub fn from_path<P: AsRef<Path>>(p: P) -> Result<Self> {
        let p = p.as_ref();
        let name = p
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default();
        SUFFIXES
            .iter()
            .find(|(suffix, _)| name.ends_with(suffix))
            .map(|&(_, format)| format)
            .ok_or_else(|| Error::UnsupportedFormat(format!("{} (format of data file not recognized)", p.display())))
    }

    pub fn name(self) -> &'static str {
        match self {
            MeshFormat::FreeSurfer => "FreeSurfer",
            MeshFormat::Gifti => "GIFTI",
            MeshFormat::Vtk => "VTK",
            MeshFormat::Ply => "PLY",
            MeshFormat::Obj => "OBJ",
        }
    }

    pub fn decoder(self) -> DecodeFn {
        match self {
            MeshFormat::FreeSurfer => read_freesurfer,
            MeshFormat::Gifti => read_gifti,
            MeshFormat::Vtk => read_vtk,
            MeshFormat::Ply => read_ply,
            MeshFormat::Obj => read_obj,
        }
    }

    /// Returns `None` for formats that can only be read.
    pub fn encoder(self) -> Option<EncodeFn> {
        match self {
            MeshFormat::FreeSurfer => Some(write_freesurfer),
            MeshFormat::Gifti => None,
            MeshFormat::Vtk => Some(write_vtk),
            MeshFormat::Ply => Some(write_ply),
            MeshFormat::Obj => Some(write_obj),
        }
    }
}

impl std::fmt::Display for MeshFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Decodes `p` with the reader for `format`.
pub fn read_geometry<P: AsRef<Path>>(format: MeshFormat, p: P) -> Result<Geometry> {
    log::debug!("reading {} as {format}", p.as_ref().display());
    (format.decoder())(p.as_ref())
}

/// Encodes `geometry` as `format`.
pub fn write_geometry<W: Write>(format: MeshFormat, geometry: &Geometry, w: &mut W) -> Result<()> {
    let encode = format
        .encoder()
        .ok_or_else(|| Error::UnsupportedFormat(format!("{format} files cannot be written")))?;
    encode(geometry, w)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suffix_table() {
        for (name, format) in [
            ("lh.orig", MeshFormat::FreeSurfer),
            ("/subjects/bert/surf/rh.pial", MeshFormat::FreeSurfer),
            ("lh.white", MeshFormat::FreeSurfer),
            ("lh.sphere", MeshFormat::FreeSurfer),
            ("lh.inflated", MeshFormat::FreeSurfer),
            ("lh.pial.surf.gii", MeshFormat::Gifti),
            ("mid.vtk", MeshFormat::Vtk),
            ("scan.ply", MeshFormat::Ply),
            ("gray_surface.obj", MeshFormat::Obj),
        ] {
            assert_eq!(format, MeshFormat::from_path(name).unwrap(), "{name}");
        }
    }

    #[test]
    fn unknown_suffix() {
        assert!(matches!(
            MeshFormat::from_path("points.xyz"),
            Err(Error::UnsupportedFormat(_))
        ));
        assert!(matches!(
            MeshFormat::from_path("/"),
            Err(Error::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn gifti_is_read_only() {
        assert!(MeshFormat::Gifti.encoder().is_none());
        let mesh = Geometry::new(Vec::new(), Vec::new()).unwrap();
        assert!(matches!(
            write_geometry(MeshFormat::Gifti, &mesh, &mut Vec::<u8>::new()),
            Err(Error::UnsupportedFormat(_))
        ));
    }
}
