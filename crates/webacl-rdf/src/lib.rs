//! Graph model and Turtle reader/writer used by the ACL engine.
//!
//! ## Usage
//!
//! ```rust
//! use webacl_rdf::{Term, turtle};
//!
//! let input = "@prefix acl: <http://www.w3.org/ns/auth/acl#> .\n\
//!              <#owner> acl:mode acl:Read .";
//!
//! let graph = turtle::parse(input, Some("https://example.org/d/.acl")).unwrap();
//! let owner = Term::iri("https://example.org/d/.acl#owner");
//! let modes: Vec<_> = graph
//!     .objects(&owner, "http://www.w3.org/ns/auth/acl#mode")
//!     .collect();
//! assert_eq!(modes, vec![&Term::iri("http://www.w3.org/ns/auth/acl#Read")]);
//! ```

pub mod error;
pub mod graph;
pub mod turtle;

pub use error::{RdfError, RdfResult};
pub use graph::{Graph, Literal, Term, Triple};
