use thiserror::Error;

/// Service layer errors - combines all error types
#[derive(Error, Debug)]
pub enum ServiceError {
    /// The store could not answer while locating or loading an ACL.
    #[error("Access evaluation failed: {0}")]
    EvaluationFailed(String),

    #[error(transparent)]
    StoreError(#[from] webacl_store::StoreError),

    #[error(transparent)]
    RdfError(#[from] webacl_rdf::RdfError),

    #[error(transparent)]
    CoreError(#[from] webacl_core::error::CoreError),

    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Authorization error: {0}")]
    AuthorizationError(String),

    #[error("Invalid certificate: {0}")]
    InvalidCertificate(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Invariant violation: {0}")]
    InvariantViolation(&'static str),
}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;
