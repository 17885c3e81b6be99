use thiserror::Error;

use crate::turtle::parse::ParseError;

/// Graph document decoding errors
#[derive(Error, Debug)]
pub enum RdfError {
    #[error("Turtle parse error: {0}")]
    ParseError(#[from] ParseError),

    #[error("Document is not valid UTF-8: {0}")]
    EncodingError(#[from] std::str::Utf8Error),
}

pub type RdfResult<T> = std::result::Result<T, RdfError>;
