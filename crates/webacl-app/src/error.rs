use thiserror::Error;

/// Application-level errors (HTTP layer)
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    ServiceError(#[from] webacl_service::error::ServiceError),

    #[error(transparent)]
    StoreError(#[from] webacl_store::StoreError),

    #[error(transparent)]
    RdfError(#[from] webacl_rdf::RdfError),

    #[error(transparent)]
    CoreError(#[from] webacl_core::error::CoreError),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

pub type AppResult<T> = std::result::Result<T, AppError>;
