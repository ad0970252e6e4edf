use thiserror::Error;

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("snapshot serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("vector dimension mismatch: index holds {expected}, entry has {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("entry has an empty vector")]
    EmptyVector,
}

pub type IndexResult<T> = std::result::Result<T, IndexError>;
