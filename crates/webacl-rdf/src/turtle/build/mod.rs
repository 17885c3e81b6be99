//! Turtle serialization.

mod serializer;

pub use serializer::to_turtle;
