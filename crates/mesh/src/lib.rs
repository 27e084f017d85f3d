mod geometry;
mod mesh;
mod order;
mod vertex_data;

pub use geometry::*;
pub use mesh::*;
pub use order::*;
pub use vertex_data::*;
