use laminar_mesh::GeometryError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The file suffix does not name a supported format, or the input is neither a path nor a
    /// coords/faces mapping.
    #[error("unsupported mesh format: {0}")]
    UnsupportedFormat(String),

    #[error("mesh mapping must contain both \"coords\" and \"faces\"; \"{missing}\" is missing")]
    MalformedMapping { missing: &'static str },

    #[error("this {format} file appears to be binary coded; only ASCII coded {format} files can be read")]
    BinaryUnsupported { format: &'static str },

    #[error("face {face} has {vertices} vertices; only triangles are supported")]
    NonTriangularFace { face: usize, vertices: usize },

    /// A text format did not have the expected structure. `line` is 1-based.
    #[error("line {line}: {reason}")]
    Malformed { line: usize, reason: String },

    /// A binary or XML container did not have the expected structure.
    #[error("invalid {format} data: {reason}")]
    InvalidData {
        format: &'static str,
        reason: String,
    },

    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn malformed(line: usize, reason: impl Into<String>) -> Self {
        Error::Malformed {
            line,
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid(format: &'static str, reason: impl Into<String>) -> Self {
        Error::InvalidData {
            format,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
