use crate::geometry::{as_float_slice, Triangle, Vector3};
use crate::order::{reorder, MemoryOrder};
use crate::vertex_data::VertexData;

/// Maintains geometry for a single facet.
///
/// The points here are only indices into the vertex list of the owning [`Geometry`], so each
/// corner costs 4 bytes instead of the 12 bytes of a full Vector3, and shared corners are
/// stored once. Cortical surfaces routinely have a few hundred thousand vertices, each shared
/// by about six facets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Facet {
    pub p0: u32,
    pub p1: u32,
    pub p2: u32,
}

impl Facet {
    pub fn new(p0: u32, p1: u32, p2: u32) -> Self {
        Self { p0, p1, p2 }
    }

    pub fn indices(&self) -> [u32; 3] {
        [self.p0, self.p1, self.p2]
    }
}

impl From<[u32; 3]> for Facet {
    fn from(i: [u32; 3]) -> Self {
        Self::new(i[0], i[1], i[2])
    }
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum GeometryError {
    #[error("facet {facet} references vertex {index} but the mesh has {vertices} vertices")]
    FacetOutOfRange {
        facet: usize,
        index: u32,
        vertices: usize,
    },
    #[error("vertex data has {rows} rows but the mesh has {vertices} vertices")]
    VertexDataLength { rows: usize, vertices: usize },
    #[error("buffer of length {len} cannot hold rows of {width} values")]
    BufferShape { len: usize, width: usize },
}

/// The canonical in-memory surface: an indexed triangle mesh with optional per-vertex data.
///
/// Vertex order is significant since facets refer to vertices by position. A `Geometry` can
/// only be built through the validating constructors, so every facet index is in range and
/// any attached [`VertexData`] has exactly one row per vertex.
#[derive(Debug, Clone, PartialEq)]
pub struct Geometry {
    vertices: Vec<Vector3>,
    facets: Vec<Facet>,
    vertex_data: Option<VertexData>,
}

impl Geometry {
    pub fn new(vertices: Vec<Vector3>, facets: Vec<Facet>) -> Result<Self, GeometryError> {
        let n = vertices.len();
        for (facet, f) in facets.iter().enumerate() {
            if let Some(&index) = f.indices().iter().find(|&&i| i as usize >= n) {
                return Err(GeometryError::FacetOutOfRange {
                    facet,
                    index,
                    vertices: n,
                });
            }
        }
        Ok(Self {
            vertices,
            facets,
            vertex_data: None,
        })
    }

    /// Attaches per-vertex data, replacing any already present.
    pub fn with_vertex_data(mut self, data: VertexData) -> Result<Self, GeometryError> {
        if data.len() != self.vertices.len() {
            return Err(GeometryError::VertexDataLength {
                rows: data.len(),
                vertices: self.vertices.len(),
            });
        }
        self.vertex_data = Some(data);
        Ok(self)
    }

    /// Rebuilds a geometry from flat buffers, e.g. as returned by the native engine.
    ///
    /// `vertices` holds `3n` coordinates and `facets` holds `3m` indices, both laid out in
    /// `order`.
    pub fn from_buffers(
        vertices: &[f32],
        facets: &[u32],
        order: MemoryOrder,
    ) -> Result<Self, GeometryError> {
        for (len, width) in [(vertices.len(), 3), (facets.len(), 3)] {
            if len % width != 0 {
                return Err(GeometryError::BufferShape { len, width });
            }
        }
        let coords = reorder(vertices, vertices.len() / 3, 3, order, MemoryOrder::RowMajor);
        let indices = reorder(facets, facets.len() / 3, 3, order, MemoryOrder::RowMajor);
        Self::new(
            coords
                .chunks_exact(3)
                .map(|c| Vector3::new(c[0], c[1], c[2]))
                .collect(),
            indices
                .chunks_exact(3)
                .map(|i| Facet::new(i[0], i[1], i[2]))
                .collect(),
        )
    }

    pub fn vertices(&self) -> &[Vector3] {
        &self.vertices
    }

    pub fn facets(&self) -> &[Facet] {
        &self.facets
    }

    pub fn vertex_data(&self) -> Option<&VertexData> {
        self.vertex_data.as_ref()
    }

    pub fn take_vertex_data(&mut self) -> Option<VertexData> {
        self.vertex_data.take()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn facet_count(&self) -> usize {
        self.facets.len()
    }

    /// Returns an iterator over the facets resolved to their corner positions.
    pub fn triangles(&self) -> impl Iterator<Item = Triangle> + '_ {
        self.facets.iter().map(|f| Triangle {
            p0: self.vertices[f.p0 as usize],
            p1: self.vertices[f.p1 as usize],
            p2: self.vertices[f.p2 as usize],
        })
    }

    /// The coordinates as a borrowed row-major buffer of `3n` floats.
    pub fn vertex_slice(&self) -> &[f32] {
        as_float_slice(&self.vertices)
    }

    /// The coordinates flattened into a new buffer laid out in `order`.
    pub fn vertex_buffer(&self, order: MemoryOrder) -> Vec<f32> {
        reorder(
            self.vertex_slice(),
            self.vertices.len(),
            3,
            MemoryOrder::RowMajor,
            order,
        )
    }

    /// The facet indices flattened into a new buffer laid out in `order`.
    pub fn facet_buffer(&self, order: MemoryOrder) -> Vec<u32> {
        let rows: Vec<u32> = self.facets.iter().flat_map(|f| f.indices()).collect();
        reorder(&rows, self.facets.len(), 3, MemoryOrder::RowMajor, order)
    }

    pub fn into_parts(self) -> (Vec<Vector3>, Vec<Facet>, Option<VertexData>) {
        (self.vertices, self.facets, self.vertex_data)
    }
}
