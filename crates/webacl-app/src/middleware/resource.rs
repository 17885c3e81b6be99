//! Maps the request path onto a resource identifier under the base URL.

use salvo::Depot;
use salvo::http::StatusCode;
use tracing::error;
use webacl_core::types::ResourceId;

use crate::config::get_config_from_depot;
use crate::error::{AppError, AppResult};

/// ## Summary
/// Resolves the [`ResourceId`] a request addresses.
///
/// The request path is resolved relative to the configured base URL, so a
/// server mounted at `https://pod.example.org/alice/` serves `/notes` as
/// `https://pod.example.org/alice/notes`.
///
/// ## Side Effects
/// Inserts the [`ResourceId`] into the depot.
///
/// ## Errors
/// Returns 400 for paths that resolve outside the base URL and 500 if the
/// configuration is missing.
pub struct ResourceMiddleware;

#[salvo::async_trait]
impl salvo::Handler for ResourceMiddleware {
    #[tracing::instrument(skip(self, req, depot, res, ctrl), fields(path = %req.uri().path()))]
    async fn handle(
        &self,
        req: &mut salvo::Request,
        depot: &mut Depot,
        res: &mut salvo::Response,
        ctrl: &mut salvo::FlowCtrl,
    ) {
        match resolve(req.uri().path(), depot) {
            Ok(resource) => {
                tracing::trace!(%resource, "Resource resolved");
                depot.inject(resource);
            }
            Err(AppError::InvalidRequest(reason)) => {
                tracing::debug!(%reason, "Rejecting request path");
                res.status_code(StatusCode::BAD_REQUEST);
                ctrl.skip_rest();
            }
            Err(e) => {
                error!(error = ?e, "Failed to resolve resource");
                res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
                ctrl.skip_rest();
            }
        }
    }
}

fn resolve(path: &str, depot: &Depot) -> AppResult<ResourceId> {
    let base = base_from_depot(depot)?;
    let resource = base
        .join(path.trim_start_matches('/'))
        .map_err(|e| AppError::InvalidRequest(e.to_string()))?;

    if resource != base && !base.contains(&resource) {
        return Err(AppError::InvalidRequest(format!(
            "{resource} is outside {base}"
        )));
    }
    Ok(resource)
}

/// ## Summary
/// Returns the root container of the pod.
///
/// ## Errors
/// Returns an error if the configuration is missing or its base URL is invalid.
pub fn base_from_depot(depot: &Depot) -> AppResult<ResourceId> {
    let config = get_config_from_depot(depot)?;
    Ok(ResourceId::parse(&config.server.base_url())?)
}

/// ## Summary
/// Retrieves the resource the request addresses.
///
/// ## Errors
/// Returns an error if [`ResourceMiddleware`] did not run.
pub fn resource_from_depot(depot: &Depot) -> AppResult<ResourceId> {
    depot.obtain::<ResourceId>().cloned().map_err(|_err| {
        webacl_core::error::CoreError::InvariantViolation("Resource not found in depot").into()
    })
}
