#[derive(Debug, thiserror::Error, PartialEq)]
pub enum SampleError {
    #[error("vertex {vertex} maps to voxel {index:?}, outside a volume of {dims:?} voxels")]
    OutOfBounds {
        vertex: usize,
        index: [i64; 3],
        dims: [usize; 3],
    },

    #[error("voxel spacing {value} on axis {axis} must be finite and non-zero")]
    InvalidSpacing { axis: usize, value: f32 },

    #[error("volume dimensions {0:?} are not a non-empty 3-D or 4-D grid")]
    InvalidDimensions(Vec<usize>),

    #[error("buffer holds {actual} values but the dimensions need {expected}")]
    ShapeMismatch { expected: usize, actual: usize },
}

pub type Result<T> = std::result::Result<T, SampleError>;
