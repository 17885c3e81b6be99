//! Authorization entries parsed from an ACL graph.

use url::Url;
use webacl_core::constants::{acl, rdf};
use webacl_core::types::ResourceId;
use webacl_rdf::{Graph, Term};

use super::mode::{AccessMode, ModeSet};

/// Predicates that make a subject node an authorization entry.
const ENTRY_PREDICATES: [&str; 9] = [
    acl::ACCESS_TO,
    acl::DEFAULT_FOR_NEW,
    acl::DEFAULT,
    acl::AGENT,
    acl::AGENT_CLASS,
    acl::AGENT_GROUP,
    acl::ORIGIN,
    acl::MODE,
    acl::OWNER,
];

/// One rule of an ACL document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationEntry {
    /// The node the rule was read from.
    pub id: Term,
    pub access_to: Vec<String>,
    /// Containers whose descendants inherit this rule (`acl:defaultForNew` or `acl:default`).
    pub default_for_new: Vec<String>,
    pub agents: Vec<String>,
    /// Agent classes, including group IRIs given with `acl:agentGroup`.
    pub agent_classes: Vec<String>,
    pub owners: Vec<String>,
    /// Normalized origins (`scheme://host[:port]`); empty means unrestricted.
    pub origins: Vec<String>,
    pub modes: ModeSet,
}

impl AuthorizationEntry {
    /// ## Summary
    /// Extracts every authorization entry from an ACL graph.
    ///
    /// A node is an entry if it carries any WAC predicate or is typed
    /// `acl:Authorization`. Unknown mode IRIs are ignored.
    #[must_use]
    pub fn from_graph(graph: &Graph) -> Vec<Self> {
        let mut nodes = graph.subjects_with_any(&ENTRY_PREDICATES);
        let authorization = Term::iri(acl::AUTHORIZATION);
        for typed in graph.subjects(rdf::TYPE, &authorization) {
            if !nodes.contains(&typed) {
                nodes.push(typed);
            }
        }

        nodes
            .into_iter()
            .map(|node| Self::from_node(graph, node))
            .collect()
    }

    fn from_node(graph: &Graph, node: &Term) -> Self {
        let iris = |predicate: &str| -> Vec<String> {
            graph
                .objects(node, predicate)
                .filter_map(Term::as_iri)
                .map(str::to_owned)
                .collect()
        };

        let mut default_for_new = iris(acl::DEFAULT_FOR_NEW);
        default_for_new.extend(iris(acl::DEFAULT));

        let mut agent_classes = iris(acl::AGENT_CLASS);
        agent_classes.extend(iris(acl::AGENT_GROUP));

        let origins = graph
            .objects(node, acl::ORIGIN)
            .map(|term| normalize_origin(term.lexical()))
            .collect();

        let modes = graph
            .objects(node, acl::MODE)
            .filter_map(Term::as_iri)
            .filter_map(AccessMode::from_iri)
            .collect();

        Self {
            id: node.clone(),
            access_to: iris(acl::ACCESS_TO),
            default_for_new,
            agents: iris(acl::AGENT),
            agent_classes,
            owners: iris(acl::OWNER),
            origins,
            modes,
        }
    }

    /// An entry naming nobody never grants anything.
    #[must_use]
    pub fn is_inert(&self) -> bool {
        self.agents.is_empty() && self.agent_classes.is_empty() && self.owners.is_empty()
    }

    /// Modes the entry grants to one of its owners: the listed modes plus
    /// `Control`. Other grantees of the entry only get `modes`.
    #[must_use]
    pub fn owner_modes(&self) -> ModeSet {
        let mut modes = self.modes;
        modes.insert(AccessMode::Control);
        modes
    }

    /// Whether `web_id` is named with `acl:owner`.
    #[must_use]
    pub fn is_owner(&self, web_id: &str) -> bool {
        self.owners.iter().any(|o| o == web_id)
    }

    /// Whether the entry covers `resource`.
    ///
    /// Entries of an ACL found on the resource itself apply through
    /// `accessTo`; entries inherited from an ancestor's ACL apply through
    /// `defaultForNew` on any ancestor container. Container IRIs in
    /// `defaultForNew` match with or without their trailing `/`.
    #[must_use]
    pub fn covers(&self, resource: &ResourceId, applies_as_default: bool) -> bool {
        if !applies_as_default {
            return self.access_to.iter().any(|t| t == resource.as_str());
        }

        resource.ancestors().any(|ancestor| {
            let with_slash = ancestor.as_str();
            let without_slash = with_slash.strip_suffix('/').unwrap_or(with_slash);
            self.default_for_new
                .iter()
                .any(|t| t == with_slash || t == without_slash)
        })
    }
}

/// Reduces an origin IRI or header value to `scheme://host[:port]`.
///
/// Values that do not parse as URLs are kept verbatim minus a trailing `/`.
#[must_use]
pub fn normalize_origin(value: &str) -> String {
    let value = value.trim();
    match Url::parse(value) {
        Ok(url) if url.has_host() => url.origin().ascii_serialization(),
        _ => value.trim_end_matches('/').to_string(),
    }
}
