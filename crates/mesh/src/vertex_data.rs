/// Per-vertex attributes (intensity, curvature, labels, depth profiles, ...).
///
/// Values are stored row-major: row `i` holds the `columns` values of vertex `i`. A scalar
/// field is a single column.
#[derive(Debug, Clone, PartialEq)]
pub struct VertexData {
    columns: usize,
    values: Vec<f32>,
}

impl VertexData {
    /// One value per vertex.
    pub fn scalar(values: Vec<f32>) -> Self {
        Self { columns: 1, values }
    }

    /// Builds a table with `columns` values per vertex.
    ///
    /// Returns `None` if `columns` is zero or `values` is not a whole number of rows.
    pub fn from_rows(columns: usize, values: Vec<f32>) -> Option<Self> {
        if columns == 0 || values.len() % columns != 0 {
            return None;
        }
        Some(Self { columns, values })
    }

    /// Number of vertices this table describes.
    pub fn len(&self) -> usize {
        self.values.len() / self.columns
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn row(&self, i: usize) -> &[f32] {
        &self.values[i * self.columns..(i + 1) * self.columns]
    }

    pub fn rows(&self) -> std::slice::Chunks<'_, f32> {
        self.values.chunks(self.columns)
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    pub fn into_values(self) -> Vec<f32> {
        self.values
    }
}
