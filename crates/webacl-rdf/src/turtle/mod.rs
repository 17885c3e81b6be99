//! Turtle reader and writer.

pub mod build;
pub mod parse;


pub use build::to_turtle;
pub use parse::parse;

use crate::error::RdfResult;
use crate::graph::Graph;

/// Parses a Turtle document from raw bytes.
///
/// ## Errors
///
/// Returns an error if the bytes are not UTF-8 or not valid Turtle.
pub fn parse_bytes(bytes: &[u8], base: Option<&str>) -> RdfResult<Graph> {
    let input = std::str::from_utf8(bytes)?;
    Ok(parse(input, base)?)
}
