use thiserror::Error;

/// Storage layer errors
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Container is not empty: {0}")]
    NotEmpty(String),

    #[error("Resource is outside the store: {0}")]
    OutsideBase(String),

    #[error("Invalid path segment in {0}")]
    InvalidPath(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error(transparent)]
    RdfError(#[from] webacl_rdf::RdfError),

    #[error(transparent)]
    CoreError(#[from] webacl_core::error::CoreError),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;
