use laminar_mesh::{Vector3, VertexData};

use crate::error::{Result, SampleError};
use crate::volume::Volume;

/// What to do with a vertex whose nearest voxel lies outside the volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoundsPolicy {
    /// Stop with [`SampleError::OutOfBounds`].
    #[default]
    Fail,
    /// Use the closest voxel on the volume's edge.
    Clamp,
}

/// The voxel grid index nearest to `vertex`, before any bounds check.
///
/// Each coordinate is divided by the voxel spacing of its axis and rounded to the nearest
/// integer, with ties going to the even neighbour.
pub fn voxel_index(vertex: Vector3, spacing: [f32; 3]) -> [i64; 3] {
    [
        (vertex.x / spacing[0]).round_ties_even() as i64,
        (vertex.y / spacing[1]).round_ties_even() as i64,
        (vertex.z / spacing[2]).round_ties_even() as i64,
    ]
}

fn resolve(
    vertex: usize,
    index: [i64; 3],
    dims: [usize; 3],
    policy: BoundsPolicy,
) -> Result<[usize; 3]> {
    let mut out = [0usize; 3];
    for axis in 0..3 {
        let n = dims[axis] as i64;
        let i = index[axis];
        out[axis] = match policy {
            BoundsPolicy::Fail if i < 0 || i >= n => {
                return Err(SampleError::OutOfBounds {
                    vertex,
                    index,
                    dims,
                })
            }
            BoundsPolicy::Fail => i as usize,
            BoundsPolicy::Clamp => i.clamp(0, n - 1) as usize,
        };
    }
    Ok(out)
}

fn voxels(volume: &Volume, vertices: &[Vector3], policy: BoundsPolicy) -> Result<Vec<[usize; 3]>> {
    let dims = volume.dims();
    let spacing = volume.spacing();
    let mut clamped = 0usize;
    let out = vertices
        .iter()
        .enumerate()
        .map(|(i, &v)| {
            let raw = voxel_index(v, spacing);
            let index = resolve(i, raw, dims, policy)?;
            if index.iter().zip(raw).any(|(&a, b)| a as i64 != b) {
                clamped += 1;
            }
            Ok(index)
        })
        .collect::<Result<Vec<_>>>()?;
    if clamped > 0 {
        log::warn!("{clamped} of {} vertices fell outside the volume and were clamped", vertices.len());
    }
    Ok(out)
}

/// Samples the first timepoint of `volume` at the voxel nearest each vertex.
///
/// No interpolation is done. Vertex coordinates are taken to be in the volume's voxel space
/// scaled by its spacing, with voxel `(0, 0, 0)` at the origin.
pub fn sample_volume(volume: &Volume, vertices: &[Vector3], policy: BoundsPolicy) -> Result<Vec<f32>> {
    Ok(voxels(volume, vertices, policy)?
        .into_iter()
        .map(|index| volume.value(index, 0))
        .collect())
}

/// Samples every timepoint of `volume` at the voxel nearest each vertex.
///
/// Row `i` of the result is the intensity profile of vertex `i`, one column per timepoint (for
/// a depth-sampled volume, one column per cortical depth).
pub fn generate_profiles(
    volume: &Volume,
    vertices: &[Vector3],
    policy: BoundsPolicy,
) -> Result<VertexData> {
    let timepoints = volume.timepoints();
    let mut values = Vec::with_capacity(vertices.len() * timepoints);
    for index in voxels(volume, vertices, policy)? {
        values.extend((0..timepoints).map(|t| volume.value(index, t)));
    }
    VertexData::from_rows(timepoints, values)
        .ok_or_else(|| SampleError::InvalidDimensions(volume.data().shape().to_vec()))
}

/// Converts voxel-space coordinates to the unsigned, unit-spacing convention used by MIPAV.
///
/// Axes may be flipped in the source (negative spacing), but MIPAV voxel coordinates are
/// always positive.
pub fn voxel_to_mipav(vertices: &[Vector3], spacing: [f32; 3]) -> Vec<Vector3> {
    vertices
        .iter()
        .map(|v| {
            Vector3::new(
                (v.x / spacing[0]).abs(),
                (v.y / spacing[1]).abs(),
                (v.z / spacing[2]).abs(),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_eq::assert_float_eq;
    use laminar_mesh::MemoryOrder;

    /// 4 x 3 x 2 volume where each voxel holds `x + 10 y + 100 z`.
    fn ramp() -> Volume {
        let mut buffer = Vec::new();
        for z in 0..2 {
            for y in 0..3 {
                for x in 0..4 {
                    buffer.push((x + 10 * y + 100 * z) as f32);
                }
            }
        }
        Volume::from_buffer(buffer, &[4, 3, 2], [1.0; 3], MemoryOrder::ColumnMajor).unwrap()
    }

    #[test]
    fn nearest_voxel() {
        let values = sample_volume(&ramp(), &[Vector3::new(2.0, 0.0, 0.0)], BoundsPolicy::Fail).unwrap();
        assert_eq!(vec![2.0], values);
    }

    #[test]
    fn coordinates_are_scaled_by_spacing() {
        let mut v = ramp();
        v = Volume::new(v.data().clone(), [2.0, 0.5, 1.0]).unwrap();
        let values = sample_volume(&v, &[Vector3::new(5.8, 0.9, 1.2)], BoundsPolicy::Fail).unwrap();
        // (2.9, 1.8, 1.2) rounds to (3, 2, 1).
        assert_eq!(vec![123.0], values);
    }

    #[test]
    fn ties_round_to_even() {
        assert_eq!([2, 0, -2], voxel_index(Vector3::new(2.5, 0.5, -1.5), [1.0; 3]));
    }

    #[test]
    fn out_of_bounds_fails_by_default() {
        let err = sample_volume(
            &ramp(),
            &[Vector3::new(0.0, 0.0, 0.0), Vector3::new(4.0, -1.0, 0.0)],
            BoundsPolicy::default(),
        )
        .unwrap_err();
        assert_eq!(
            SampleError::OutOfBounds {
                vertex: 1,
                index: [4, -1, 0],
                dims: [4, 3, 2]
            },
            err
        );
    }

    #[test]
    fn clamping_uses_the_edge_voxel() {
        let values = sample_volume(&ramp(), &[Vector3::new(9.0, -3.0, 1.0)], BoundsPolicy::Clamp).unwrap();
        assert_eq!(vec![103.0], values);
    }

    #[test]
    fn profiles_have_one_column_per_timepoint() {
        // 2 x 1 x 1 x 3 series where voxel x at time t holds 10 t + x.
        let buffer = vec![0.0, 1.0, 10.0, 11.0, 20.0, 21.0];
        let v = Volume::from_buffer(buffer, &[2, 1, 1, 3], [1.0; 3], MemoryOrder::ColumnMajor).unwrap();
        let profiles = generate_profiles(
            &v,
            &[Vector3::new(1.0, 0.0, 0.0), Vector3::new(0.0, 0.0, 0.0)],
            BoundsPolicy::Fail,
        )
        .unwrap();
        assert_eq!(3, profiles.columns());
        assert_eq!(&[1.0, 11.0, 21.0], profiles.row(0));
        assert_eq!(&[0.0, 10.0, 20.0], profiles.row(1));
    }

    #[test]
    fn mipav_coordinates_are_unsigned() {
        let out = voxel_to_mipav(&[Vector3::new(-3.0, 1.0, 4.0)], [-1.5, 0.5, 2.0]);
        assert_eq!(vec![Vector3::new(2.0, 2.0, 2.0)], out);
    }

    #[test]
    fn mipav_coordinates_with_fractional_spacing() {
        let out = voxel_to_mipav(&[Vector3::new(0.7, -0.3, 2.0)], [0.7, 0.3, 0.8]);
        assert_float_eq!([1.0, 1.0, 2.5], [out[0].x, out[0].y, out[0].z], rmax_all <= 1e-6);
    }
}
