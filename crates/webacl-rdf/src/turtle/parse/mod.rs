//! Turtle parsing.
//!
//! Supports the full Turtle 1.1 surface syntax used by WAC documents and
//! `WebID` profiles: `@prefix`/`@base` (and their SPARQL forms), relative IRIs,
//! `;` and `,` lists, blank node property lists, collections, and literals
//! with language tags or datatypes.

mod error;
mod lexer;
mod parser;

pub use error::{ParseError, ParseErrorKind, ParseResult};
pub use lexer::{Spanned, Token, tokenize};
pub use parser::{MAX_NESTING, parse};
