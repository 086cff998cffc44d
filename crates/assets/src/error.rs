use std::path::PathBuf;

/// Errors from reading, writing or generating mesh and texture data.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("mesh data truncated: expected {expected} bytes, found {actual}")]
    Truncated { expected: u64, actual: u64 },
    #[error("mesh header has negative {field}: {value}")]
    NegativeCount { field: &'static str, value: i32 },
    #[error("index {index} at position {position} is out of range for {vertex_count} vertices")]
    IndexOutOfRange {
        position: usize,
        index: u32,
        vertex_count: u32,
    },
    #[error("{field} of {value} does not fit the mesh header")]
    TooLarge { field: &'static str, value: usize },
    #[error("invalid primitive: {0}")]
    InvalidPrimitive(String),
    #[error("invalid texture: {0}")]
    InvalidTexture(String),
}

impl AssetError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
