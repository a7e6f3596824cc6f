use thiserror::Error;

#[derive(Error, Debug)]
pub enum GoatError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Index {index} out of bounds (len {len})")]
    OutOfBounds { index: usize, len: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Backend error: {0}")]
    Api(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
