//! PUT handler.

use salvo::http::StatusCode;
use salvo::{Depot, Request, Response, handler};
use webacl_rdf::turtle;
use webacl_service::auth::access_from_depot;
use webacl_store::StoreError;

use crate::error::{AppError, AppResult};
use crate::middleware::resource::resource_from_depot;
use crate::store_handler::get_store_from_depot;

/// ## Summary
/// Stores the request body at the addressed resource, creating missing
/// parent containers.
///
/// ACL documents must be valid Turtle; anything else is stored as sent.
///
/// ## Side Effects
/// Writes to the store and drops cached group and profile data derived
/// from the document.
///
/// ## Errors
/// Returns 400 for unreadable bodies, invalid ACL documents and invalid
/// paths, 500 for store failures.
#[handler]
#[tracing::instrument(skip_all, fields(path = %req.uri().path()))]
pub async fn put(req: &mut Request, res: &mut Response, depot: &Depot) {
    match store_body(req, depot).await {
        Ok(()) => {
            res.status_code(StatusCode::CREATED);
        }
        Err(
            e @ (AppError::InvalidRequest(_)
            | AppError::RdfError(_)
            | AppError::StoreError(StoreError::InvalidPath(_) | StoreError::OutsideBase(_))),
        ) => {
            tracing::debug!(error = %e, "Rejecting PUT");
            res.status_code(StatusCode::BAD_REQUEST);
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to store resource");
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
        }
    }
}

async fn store_body(req: &mut Request, depot: &Depot) -> AppResult<()> {
    let store = get_store_from_depot(depot)?;
    let access = access_from_depot(depot)?;
    let resource = resource_from_depot(depot)?;

    let body = req
        .payload()
        .await
        .map_err(|e| AppError::InvalidRequest(format!("unreadable body: {e}")))?
        .to_vec();

    if access.authorizer.locator().is_acl(&resource) {
        turtle::parse_bytes(&body, Some(resource.as_str()))?;
    }

    store.write(&resource, body).await?;
    access.invalidate(&resource).await;

    tracing::info!(%resource, "Resource stored");
    Ok(())
}
