use laminar_mesh::MemoryOrder;
use ndarray::{Array3, Array4, Axis, ShapeBuilder};

use crate::error::{Result, SampleError};

/// A scalar volume or a time series of volumes on a regular voxel grid.
///
/// 3-D volumes are stored with a time axis of length one, so every volume is indexed as
/// `[x, y, z, t]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Volume {
    data: Array4<f32>,
    spacing: [f32; 3],
}

fn check_spacing(spacing: [f32; 3]) -> Result<()> {
    for (axis, &value) in spacing.iter().enumerate() {
        if !value.is_finite() || value == 0.0 {
            return Err(SampleError::InvalidSpacing { axis, value });
        }
    }
    Ok(())
}

impl Volume {
    pub fn new(data: Array4<f32>, spacing: [f32; 3]) -> Result<Self> {
        check_spacing(spacing)?;
        if data.is_empty() {
            return Err(SampleError::InvalidDimensions(data.shape().to_vec()));
        }
        Ok(Self { data, spacing })
    }

    pub fn from_array3(data: Array3<f32>, spacing: [f32; 3]) -> Result<Self> {
        Self::new(data.insert_axis(Axis(3)), spacing)
    }

    /// Builds a volume from a flat buffer laid out in `order`.
    ///
    /// `dims` is `[nx, ny, nz]` or `[nx, ny, nz, nt]`. Buffers coming back from the layering
    /// engine are column-major.
    pub fn from_buffer(
        buffer: Vec<f32>,
        dims: &[usize],
        spacing: [f32; 3],
        order: MemoryOrder,
    ) -> Result<Self> {
        let shape = match *dims {
            [nx, ny, nz] => (nx, ny, nz, 1),
            [nx, ny, nz, nt] => (nx, ny, nz, nt),
            _ => return Err(SampleError::InvalidDimensions(dims.to_vec())),
        };
        let expected = dims
            .iter()
            .try_fold(1usize, |n, &d| n.checked_mul(d))
            .ok_or_else(|| SampleError::InvalidDimensions(dims.to_vec()))?;
        if buffer.len() != expected {
            return Err(SampleError::ShapeMismatch {
                expected,
                actual: buffer.len(),
            });
        }
        let data = match order {
            MemoryOrder::RowMajor => Array4::from_shape_vec(shape, buffer),
            MemoryOrder::ColumnMajor => Array4::from_shape_vec(shape.f(), buffer),
        }
        .map_err(|_| SampleError::InvalidDimensions(dims.to_vec()))?;
        Self::new(data, spacing)
    }

    /// Flattens the volume (including its time axis) in `order`.
    pub fn to_buffer(&self, order: MemoryOrder) -> Vec<f32> {
        match order {
            MemoryOrder::RowMajor => self.data.iter().copied().collect(),
            MemoryOrder::ColumnMajor => self.data.t().iter().copied().collect(),
        }
    }

    /// Spatial dimensions `[nx, ny, nz]`.
    pub fn dims(&self) -> [usize; 3] {
        let (nx, ny, nz, _) = self.data.dim();
        [nx, ny, nz]
    }

    pub fn timepoints(&self) -> usize {
        self.data.dim().3
    }

    /// Voxel size along each axis, in the units of the surface coordinates.
    pub fn spacing(&self) -> [f32; 3] {
        self.spacing
    }

    pub fn data(&self) -> &Array4<f32> {
        &self.data
    }

    pub(crate) fn value(&self, index: [usize; 3], t: usize) -> f32 {
        self.data[[index[0], index[1], index[2], t]]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_major_buffers() {
        // 2 x 2 x 1 volume, value = x + 10 * y.
        let f = vec![0.0, 1.0, 10.0, 11.0];
        let v = Volume::from_buffer(f.clone(), &[2, 2, 1], [1.0; 3], MemoryOrder::ColumnMajor)
            .unwrap();
        assert_eq!(1.0, v.value([1, 0, 0], 0));
        assert_eq!(10.0, v.value([0, 1, 0], 0));
        assert_eq!(f, v.to_buffer(MemoryOrder::ColumnMajor));
        assert_eq!(vec![0.0, 10.0, 1.0, 11.0], v.to_buffer(MemoryOrder::RowMajor));
    }

    #[test]
    fn time_series_dims() {
        let v = Volume::from_buffer(vec![0.0; 24], &[2, 3, 2, 2], [1.0; 3], MemoryOrder::RowMajor)
            .unwrap();
        assert_eq!([2, 3, 2], v.dims());
        assert_eq!(2, v.timepoints());
    }

    #[test]
    fn buffer_length_must_match() {
        assert_eq!(
            Err(SampleError::ShapeMismatch {
                expected: 8,
                actual: 7
            }),
            Volume::from_buffer(vec![0.0; 7], &[2, 2, 2], [1.0; 3], MemoryOrder::RowMajor)
        );
    }

    #[test]
    fn zero_spacing_is_rejected() {
        assert_eq!(
            Err(SampleError::InvalidSpacing {
                axis: 1,
                value: 0.0
            }),
            Volume::from_buffer(vec![0.0; 8], &[2, 2, 2], [1.0, 0.0, 1.0], MemoryOrder::RowMajor)
        );
    }

    #[test]
    fn overflowing_dimensions_are_rejected() {
        assert_eq!(
            Err(SampleError::InvalidDimensions(vec![usize::MAX, 2, 1])),
            Volume::from_buffer(vec![0.0; 4], &[usize::MAX, 2, 1], [1.0; 3], MemoryOrder::RowMajor)
        );
    }

    #[test]
    fn two_dimensional_buffers_are_rejected() {
        assert!(matches!(
            Volume::from_buffer(vec![0.0; 4], &[2, 2], [1.0; 3], MemoryOrder::RowMajor),
            Err(SampleError::InvalidDimensions(_))
        ));
    }
}
