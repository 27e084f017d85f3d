//! Readers and writers for cortical surface meshes.
//!
//! Every supported format decodes into the same [`Geometry`]: FreeSurfer binary surfaces,
//! GIFTI, ASCII VTK PolyData, ASCII PLY and MNI surface objects. [`load_geometry`] picks the
//! decoder from the file name; [`save_geometry`] does the same for the encoders.

mod data;
mod error;
mod format;
mod source;
mod text;

pub mod freesurfer;
pub mod gifti;
pub mod obj;
pub mod ply;
pub mod vtk;

pub use data::*;
pub use error::*;
pub use format::*;
pub use source::*;

pub use laminar_mesh::{Geometry, VertexData};
