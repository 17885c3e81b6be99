//! Matches authorization entries against a request.

use std::sync::Arc;

use url::Url;
use webacl_core::config::OriginPolicy;
use webacl_core::constants::{acl, foaf};
use webacl_core::types::ResourceId;

use super::entry::{AuthorizationEntry, normalize_origin};
use super::group::GroupResolver;
use super::mode::AccessMode;
use super::service::Decision;
use super::subject::Agent;

/// Decides whether a set of entries grants a mode to an agent.
#[derive(Clone)]
pub struct Evaluator {
    groups: Arc<dyn GroupResolver>,
    origin_policy: OriginPolicy,
    trusted_origins: Vec<String>,
}

/// The request being evaluated.
#[derive(Debug, Clone, Copy)]
pub struct Request<'a> {
    pub resource: &'a ResourceId,
    /// Whether the entries were inherited from an ancestor's ACL.
    pub applies_as_default: bool,
    pub mode: AccessMode,
    pub agent: &'a Agent,
    /// Value of the `Origin` header, if any.
    pub origin: Option<&'a str>,
}

/// Outcome of the checks that need no I/O.
enum Match<'e> {
    No,
    Yes,
    /// Only group membership could still match.
    Groups(&'e [String]),
}

impl Evaluator {
    #[must_use]
    pub fn new(
        groups: Arc<dyn GroupResolver>,
        origin_policy: OriginPolicy,
        trusted_origins: &[String],
    ) -> Self {
        Self {
            groups,
            origin_policy,
            trusted_origins: trusted_origins
                .iter()
                .map(|o| normalize_origin(o))
                .collect(),
        }
    }

    /// ## Summary
    /// Evaluates `entries` for `request`.
    ///
    /// An entry grants when it covers the resource, admits the request
    /// origin, names the agent (directly, as owner, through an agent class or
    /// a group) and its modes imply the requested one. Group documents are
    /// only dereferenced for entries that pass every other check.
    ///
    /// Denials distinguish anonymous agents (`DenyUnauthenticated`) from
    /// authenticated ones (`DenyForbidden`).
    #[tracing::instrument(skip_all, fields(
        resource = %request.resource,
        mode = %request.mode,
        agent = %request.agent,
        origin = ?request.origin,
        entries = entries.len(),
    ))]
    pub async fn evaluate(&self, entries: &[AuthorizationEntry], request: Request<'_>) -> Decision {
        let mut group_candidates = Vec::new();

        for entry in entries {
            match self.precheck(entry, &request) {
                Match::Yes => {
                    tracing::debug!(entry = %entry.id, "Entry grants access");
                    return Decision::Allow;
                }
                Match::Groups(classes) => group_candidates.push((entry, classes)),
                Match::No => {}
            }
        }

        if let Some(web_id) = request.agent.web_id() {
            for (entry, classes) in group_candidates {
                for group in classes {
                    if self.groups.is_member(web_id, group).await {
                        tracing::debug!(entry = %entry.id, %group, "Entry grants access through group");
                        return Decision::Allow;
                    }
                }
            }
        }

        tracing::debug!("No entry grants access");
        Decision::deny_for(request.agent)
    }

    fn precheck<'e>(&self, entry: &'e AuthorizationEntry, request: &Request<'_>) -> Match<'e> {
        if entry.is_inert()
            || !entry.covers(request.resource, request.applies_as_default)
            || !self.origin_allowed(entry, request.origin)
        {
            return Match::No;
        }

        let web_id = request.agent.web_id().map(Url::as_str);
        if web_id.is_some_and(|w| entry.is_owner(w)) && entry.owner_modes().permits(request.mode) {
            return Match::Yes;
        }
        // Every other grantee only holds the listed modes.
        if !entry.modes.permits(request.mode) {
            return Match::No;
        }

        if entry
            .agent_classes
            .iter()
            .any(|class| class == foaf::AGENT)
        {
            return Match::Yes;
        }

        let Some(web_id) = web_id else {
            return Match::No;
        };

        if entry.agents.iter().any(|a| a == web_id) {
            return Match::Yes;
        }
        if entry
            .agent_classes
            .iter()
            .any(|class| class == acl::AUTHENTICATED_AGENT)
        {
            return Match::Yes;
        }

        if entry.agent_classes.is_empty() {
            Match::No
        } else {
            Match::Groups(&entry.agent_classes)
        }
    }

    fn origin_allowed(&self, entry: &AuthorizationEntry, origin: Option<&str>) -> bool {
        if entry.origins.is_empty() {
            return true;
        }
        let Some(origin) = origin else {
            return self.origin_policy == OriginPolicy::TrustMissing;
        };

        let origin = normalize_origin(origin);
        self.trusted_origins.contains(&origin) || entry.origins.contains(&origin)
    }
}
