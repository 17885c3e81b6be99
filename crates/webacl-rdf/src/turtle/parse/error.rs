//! Turtle parse error types.

use std::fmt;

/// Result type for Turtle parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// An error that occurred during Turtle parsing.
#[derive(Debug, Clone)]
pub struct ParseError {
    /// The kind of error.
    pub kind: ParseErrorKind,
    /// Line number where the error occurred (1-based).
    pub line: usize,
    /// Additional context or message.
    pub message: String,
}

impl ParseError {
    /// Creates a new parse error.
    #[must_use]
    pub fn new(kind: ParseErrorKind, line: usize, message: impl Into<String>) -> Self {
        Self {
            kind,
            line,
            message: message.into(),
        }
    }

    /// Creates an unexpected token error.
    #[must_use]
    pub fn unexpected(line: usize, expected: &str, found: impl fmt::Display) -> Self {
        Self::new(
            ParseErrorKind::UnexpectedToken,
            line,
            format!("expected {expected}, found {found}"),
        )
    }

    #[must_use]
    pub fn eof(line: usize, expected: &str) -> Self {
        Self::new(
            ParseErrorKind::UnexpectedEof,
            line,
            format!("expected {expected}"),
        )
    }

    #[must_use]
    pub fn invalid_iri(line: usize, message: impl Into<String>) -> Self {
        Self::new(ParseErrorKind::InvalidIri, line, message)
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}: {}", self.line, self.kind, self.message)
    }
}

impl std::error::Error for ParseError {}

/// The kind of parse error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// Unexpected end of input.
    UnexpectedEof,
    /// Unexpected token or character.
    UnexpectedToken,
    /// Character that cannot start any token.
    InvalidCharacter,
    /// Malformed or unresolvable IRI.
    InvalidIri,
    /// Prefixed name whose prefix was never declared.
    UndefinedPrefix,
    /// Bad escape sequence in a string or IRI.
    InvalidEscape,
    /// String literal missing its closing quote.
    UnterminatedString,
    /// Blank node property lists or collections nested too deeply.
    NestingTooDeep,
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedEof => write!(f, "unexpected end of input"),
            Self::UnexpectedToken => write!(f, "unexpected token"),
            Self::InvalidCharacter => write!(f, "invalid character"),
            Self::InvalidIri => write!(f, "invalid IRI"),
            Self::UndefinedPrefix => write!(f, "undefined prefix"),
            Self::InvalidEscape => write!(f, "invalid escape sequence"),
            Self::UnterminatedString => write!(f, "unterminated string"),
            Self::NestingTooDeep => write!(f, "nesting too deep"),
        }
    }
}
