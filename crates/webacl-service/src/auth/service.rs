//! Access decisions for the HTTP layer.
//!
//! [`Authorizer::check_access`] is the one call handlers make: it locates the
//! governing ACL, loads its entries and asks the [`Evaluator`] for a verdict,
//! applying the configured fallback when no ACL exists.

use std::sync::Arc;

use url::Url;
use webacl_core::config::{AclConfig, FallbackPolicy};
use webacl_core::types::ResourceId;
use webacl_store::GraphStore;

use super::entry::AuthorizationEntry;
use super::evaluator::{Evaluator, Request};
use super::group::GroupResolver;
use super::locator::{AclLocation, AclLocator};
use super::mode::AccessMode;
use super::subject::Agent;
use crate::error::{ServiceError, ServiceResult};

/// Result of an access check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    /// Denied, and the agent is anonymous: authenticating might help.
    DenyUnauthenticated,
    /// Denied to an authenticated agent.
    DenyForbidden,
}

impl Decision {
    #[must_use]
    pub const fn is_allowed(self) -> bool {
        matches!(self, Self::Allow)
    }

    /// The denial appropriate for `agent`.
    #[must_use]
    pub const fn deny_for(agent: &Agent) -> Self {
        if agent.is_authenticated() {
            Self::DenyForbidden
        } else {
            Self::DenyUnauthenticated
        }
    }

    /// Convert to a `Result`.
    ///
    /// ## Errors
    ///
    /// Returns `NotAuthenticated` or `AuthorizationError` for the two denials.
    pub fn require(self, resource: &ResourceId, mode: AccessMode) -> ServiceResult<()> {
        match self {
            Self::Allow => Ok(()),
            Self::DenyUnauthenticated => Err(ServiceError::NotAuthenticated),
            Self::DenyForbidden => Err(ServiceError::AuthorizationError(format!(
                "{mode} denied on {resource}"
            ))),
        }
    }
}

/// An ACL located and parsed.
struct Governing {
    location: AclLocation,
    entries: Vec<AuthorizationEntry>,
}

/// Authorization service for checking access to resources.
pub struct Authorizer {
    store: Arc<dyn GraphStore>,
    locator: AclLocator,
    evaluator: Evaluator,
    fallback: FallbackPolicy,
    owners: Vec<Url>,
}

impl Authorizer {
    /// ## Errors
    ///
    /// Returns `InvalidConfiguration` if a configured owner is not a URL.
    pub fn new(
        store: Arc<dyn GraphStore>,
        groups: Arc<dyn GroupResolver>,
        config: &AclConfig,
    ) -> ServiceResult<Self> {
        let owners = config
            .owners
            .iter()
            .map(|owner| {
                Url::parse(owner).map_err(|e| {
                    ServiceError::InvalidConfiguration(format!("acl.owners: {owner}: {e}"))
                })
            })
            .collect::<ServiceResult<Vec<_>>>()?;

        Ok(Self {
            locator: AclLocator::new(Arc::clone(&store), config.suffix.as_str(), config.max_depth),
            evaluator: Evaluator::new(groups, config.origin_policy, &config.trusted_origins),
            store,
            fallback: config.fallback,
            owners,
        })
    }

    #[must_use]
    pub const fn locator(&self) -> &AclLocator {
        &self.locator
    }

    /// ## Summary
    /// Decides whether `agent` may use `mode` on `resource`.
    ///
    /// Requests against an ACL document are decided against the resource it
    /// governs: anything but `Read` needs `Control` there, and `Read` is also
    /// allowed when the governing ACL grants `Read` on the ACL document
    /// itself through `acl:accessTo`.
    ///
    /// ## Errors
    ///
    /// Returns `EvaluationFailed` if the store cannot answer or the ACL
    /// document is not valid Turtle. Store failures never turn into a
    /// decision.
    #[tracing::instrument(skip_all, fields(
        resource = %resource,
        mode = %mode,
        agent = %agent,
        origin = ?origin,
    ))]
    pub async fn check_access(
        &self,
        resource: &ResourceId,
        agent: &Agent,
        mode: AccessMode,
        origin: Option<&str>,
    ) -> ServiceResult<Decision> {
        let decision = match self.locator.governed_by(resource) {
            Some(governed) => self.check_acl_access(resource, &governed, agent, mode, origin).await?,
            None => {
                let governing = self.governing(resource).await?;
                self.decide(governing.as_ref(), resource, agent, mode, origin)
                    .await
            }
        };

        tracing::debug!(?decision, "Access decided");
        Ok(decision)
    }

    async fn check_acl_access(
        &self,
        acl: &ResourceId,
        governed: &ResourceId,
        agent: &Agent,
        mode: AccessMode,
        origin: Option<&str>,
    ) -> ServiceResult<Decision> {
        let governing = self.governing(governed).await?;
        let control = self
            .decide(governing.as_ref(), governed, agent, AccessMode::Control, origin)
            .await;
        if control.is_allowed() || mode != AccessMode::Read {
            return Ok(control);
        }

        let Some(governing) = governing else {
            return Ok(control);
        };
        let request = Request {
            resource: acl,
            applies_as_default: false,
            mode: AccessMode::Read,
            agent,
            origin,
        };
        Ok(self.evaluator.evaluate(&governing.entries, request).await)
    }

    async fn decide(
        &self,
        governing: Option<&Governing>,
        resource: &ResourceId,
        agent: &Agent,
        mode: AccessMode,
        origin: Option<&str>,
    ) -> Decision {
        let Some(governing) = governing else {
            return self.fallback(agent, mode);
        };

        let request = Request {
            resource,
            applies_as_default: governing.location.applies_as_default,
            mode,
            agent,
            origin,
        };
        self.evaluator.evaluate(&governing.entries, request).await
    }

    /// Locates and parses the ACL governing `resource`.
    async fn governing(&self, resource: &ResourceId) -> ServiceResult<Option<Governing>> {
        let Some(location) = self
            .locator
            .locate(resource)
            .await
            .map_err(|e| ServiceError::EvaluationFailed(format!("{resource}: {e}")))?
        else {
            return Ok(None);
        };

        let Some(graph) = self
            .store
            .graph(&location.acl)
            .await
            .map_err(|e| ServiceError::EvaluationFailed(format!("{}: {e}", location.acl)))?
        else {
            // Deleted between the existence check and the read.
            tracing::warn!(acl = %location.acl, "ACL disappeared while loading");
            return Ok(None);
        };

        let entries = AuthorizationEntry::from_graph(&graph);
        tracing::trace!(acl = %location.acl, entries = entries.len(), "Loaded ACL");
        Ok(Some(Governing { location, entries }))
    }

    fn fallback(&self, agent: &Agent, mode: AccessMode) -> Decision {
        let is_owner = agent.web_id().is_some_and(|id| self.owners.contains(id));
        let decision = match self.fallback {
            FallbackPolicy::DenyAll => Decision::deny_for(agent),
            FallbackPolicy::OwnerOnly | FallbackPolicy::PublicRead if is_owner => Decision::Allow,
            FallbackPolicy::PublicRead if mode == AccessMode::Read => Decision::Allow,
            FallbackPolicy::OwnerOnly | FallbackPolicy::PublicRead => Decision::deny_for(agent),
        };
        tracing::debug!(policy = ?self.fallback, ?decision, "No ACL found, applied fallback");
        decision
    }
}
