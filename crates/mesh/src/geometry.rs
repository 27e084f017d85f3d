pub type Vector3 = cgmath::Vector3<f32>;

// We rely on Vector3 being repr(c).
static_assertions::assert_eq_size!(Vector3, [f32; 3]);
static_assertions::assert_eq_align!(Vector3, f32);

/// The three corner positions of a single facet, resolved from a [`crate::Geometry`].
#[derive(Debug, PartialEq, Copy, Clone)]
#[repr(C)]
pub struct Triangle {
    pub p0: Vector3,
    pub p1: Vector3,
    pub p2: Vector3,
}

impl Triangle {
    /// Returns the (unnormalized) face normal. Its length is twice the triangle's area.
    pub fn area_normal(&self) -> Vector3 {
        (self.p1 - self.p0).cross(self.p2 - self.p0)
    }
}

impl std::default::Default for Triangle {
    fn default() -> Self {
        let origin = Vector3::new(0.0, 0.0, 0.0);
        Self {
            p0: origin,
            p1: origin,
            p2: origin,
        }
    }
}

/// Reinterprets a slice of vertices as the flat `[x0, y0, z0, x1, ...]` buffer backing it.
pub(crate) fn as_float_slice(points: &[Vector3]) -> &[f32] {
    // Safety: Vector3 has the same size and alignment as [f32; 3] (asserted above), so a slice
    // of n vectors covers exactly 3n contiguous floats.
    unsafe { std::slice::from_raw_parts(points.as_ptr() as *const f32, points.len() * 3) }
}
