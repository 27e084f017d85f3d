use std::path::{Path, PathBuf};

use laminar_mesh::VertexData;

use crate::error::{Error, Result};
use crate::{freesurfer, gifti, vtk};

/// Where per-vertex data comes from.
#[derive(Debug, Clone)]
pub enum DataSource {
    FilePath(PathBuf),
    Values(VertexData),
}

impl From<&Path> for DataSource {
    fn from(p: &Path) -> Self {
        DataSource::FilePath(p.to_path_buf())
    }
}

impl From<PathBuf> for DataSource {
    fn from(p: PathBuf) -> Self {
        DataSource::FilePath(p)
    }
}

impl From<&str> for DataSource {
    fn from(p: &str) -> Self {
        DataSource::FilePath(PathBuf::from(p))
    }
}

impl From<VertexData> for DataSource {
    fn from(d: VertexData) -> Self {
        DataSource::Values(d)
    }
}

const MORPH_SUFFIXES: &[&str] = &["curv", "sulc", "thickness"];

/// Loads per-vertex data. For GIFTI files the first data array is used; see
/// [`load_vertex_data_array`] to pick another.
pub fn load_vertex_data<S: Into<DataSource>>(source: S) -> Result<VertexData> {
    match source.into() {
        DataSource::FilePath(p) => load_vertex_data_array(p, 0),
        DataSource::Values(d) => Ok(d),
    }
}

/// Loads per-vertex data from a file, taking data array `index` if the file is GIFTI.
pub fn load_vertex_data_array<P: AsRef<Path>>(p: P, index: usize) -> Result<VertexData> {
    let p = p.as_ref();
    let name = p
        .file_name()
        .map(|n| n.to_string_lossy())
        .unwrap_or_default();
    if MORPH_SUFFIXES.iter().any(|s| name.ends_with(s)) {
        freesurfer::read_morph_data(p)
    } else if name.ends_with("annot") {
        let annot = freesurfer::read_annot(p)?;
        Ok(VertexData::scalar(annot.labels.iter().map(|&l| l as f32).collect()))
    } else if name.ends_with("label") {
        // A label names vertices rather than giving a value for each of them.
        let label = freesurfer::read_label(p)?;
        Ok(VertexData::scalar(label.vertices.iter().map(|&v| v as f32).collect()))
    } else if name.ends_with("gii") {
        gifti::read_gifti_data(p, index)
    } else if name.ends_with("vtk") {
        vtk::read_vtk_data(p)?
            .ok_or_else(|| Error::invalid("VTK", format!("{} has no POINT_DATA section", p.display())))
    } else {
        Err(Error::UnsupportedFormat(format!(
            "{} (format of data file not recognized)",
            p.display()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_pass_through() {
        let d = VertexData::scalar(vec![1.0, 2.0]);
        assert_eq!(d, load_vertex_data(d.clone()).unwrap());
    }

    #[test]
    fn unknown_data_suffix() {
        assert!(matches!(
            load_vertex_data("lh.area.mgz"),
            Err(Error::UnsupportedFormat(_))
        ));
    }
}
