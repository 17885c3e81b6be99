//! Depot helpers for sharing the access-control services with Salvo handlers.

use std::sync::Arc;

use salvo::async_trait;
use webacl_core::config::Settings;
use webacl_core::types::ResourceId;
use webacl_store::GraphStore;

use super::group::GraphGroupResolver;
use super::identity::WebIdVerifier;
use super::service::Authorizer;
use super::subject::Agent;
use crate::error::{ServiceError, ServiceResult};
use crate::fetch::{Dereferencer, RoutingDereferencer};

/// The identity resolver, group resolver and authorizer of one server.
pub struct AccessControl {
    pub authorizer: Arc<Authorizer>,
    pub verifier: Arc<WebIdVerifier>,
    pub groups: Arc<GraphGroupResolver>,
}

impl AccessControl {
    /// ## Summary
    /// Wires the services for a store served at `settings.server.base_url()`.
    ///
    /// Profile and group documents under the base URL are read from `store`;
    /// everything else goes through `remote`.
    ///
    /// ## Errors
    /// Returns `CoreError` for an invalid base URL and `InvalidConfiguration`
    /// for invalid ACL settings.
    pub fn new(
        settings: &Settings,
        store: Arc<dyn GraphStore>,
        remote: Arc<dyn Dereferencer>,
    ) -> ServiceResult<Self> {
        let base = ResourceId::parse(&settings.server.base_url())?;
        let ttl = settings.fetch.cache_ttl();
        let capacity = settings.fetch.cache_capacity;
        let dereferencer: Arc<dyn Dereferencer> =
            Arc::new(RoutingDereferencer::new(base, Arc::clone(&store), remote));

        let groups = Arc::new(GraphGroupResolver::new(
            Arc::clone(&dereferencer),
            ttl,
            capacity,
        ));
        let verifier = Arc::new(WebIdVerifier::new(dereferencer, ttl, capacity));
        let authorizer = Arc::new(Authorizer::new(store, groups.clone(), &settings.acl)?);

        tracing::info!(
            fallback = ?settings.acl.fallback,
            owners = settings.acl.owners.len(),
            cache_ttl_secs = settings.fetch.cache_ttl_secs,
            "Access control initialized"
        );

        Ok(Self {
            authorizer,
            verifier,
            groups,
        })
    }

    /// Drops cached group and profile data derived from `resource` after it
    /// was written or deleted.
    pub async fn invalidate(&self, resource: &ResourceId) {
        self.groups.invalidate(resource.as_url()).await;
        self.verifier.invalidate(resource.as_url()).await;
    }
}

/// Hoop injecting [`AccessControl`] into the depot.
pub struct AccessControlHandler {
    pub access: Arc<AccessControl>,
}

#[async_trait]
impl salvo::Handler for AccessControlHandler {
    #[tracing::instrument(skip(self, _req, depot, _res, _ctrl))]
    async fn handle(
        &self,
        _req: &mut salvo::Request,
        depot: &mut salvo::Depot,
        _res: &mut salvo::Response,
        _ctrl: &mut salvo::FlowCtrl,
    ) {
        depot.inject(Arc::clone(&self.access));
    }
}

/// ## Summary
/// Retrieves the access-control services from the depot.
///
/// ## Errors
/// Returns `InvariantViolation` if [`AccessControlHandler`] did not run.
pub fn access_from_depot(depot: &salvo::Depot) -> ServiceResult<Arc<AccessControl>> {
    depot
        .obtain::<Arc<AccessControl>>()
        .cloned()
        .map_err(|_err| ServiceError::InvariantViolation("Access control not found in depot"))
}

/// Create an authorizer handle from the depot.
///
/// ## Errors
///
/// Returns `InvariantViolation` if [`AccessControlHandler`] did not run.
pub fn authorizer_from_depot(depot: &salvo::Depot) -> ServiceResult<Arc<Authorizer>> {
    Ok(Arc::clone(&access_from_depot(depot)?.authorizer))
}

/// ## Summary
/// Retrieves the agent the authentication middleware resolved.
///
/// ## Errors
/// Returns `InvariantViolation` if authentication did not run.
pub fn agent_from_depot(depot: &salvo::Depot) -> ServiceResult<&Agent> {
    depot
        .obtain::<Agent>()
        .map_err(|_err| ServiceError::InvariantViolation("Agent not found in depot"))
}
