//! The requesting agent.
//!
//! An agent is either anonymous or identified by a verified `WebID`. Only the
//! identity resolver produces `WebId` agents; everything downstream trusts
//! the value it finds in the depot.

use std::fmt;

use url::Url;
use webacl_rdf::Term;

/// The agent a request is evaluated for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Agent {
    /// No verified identity.
    #[default]
    Anonymous,
    /// A `WebID` whose profile vouches for the presented key.
    WebId(Url),
}

impl Agent {
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self, Self::WebId(_))
    }

    #[must_use]
    pub const fn web_id(&self) -> Option<&Url> {
        match self {
            Self::WebId(url) => Some(url),
            Self::Anonymous => None,
        }
    }

    /// The `WebID` as a graph term, for membership lookups.
    #[must_use]
    pub fn as_term(&self) -> Option<Term> {
        self.web_id().map(|url| Term::iri(url.as_str()))
    }
}

impl fmt::Display for Agent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Anonymous => f.write_str("anonymous"),
            Self::WebId(url) => f.write_str(url.as_str()),
        }
    }
}
