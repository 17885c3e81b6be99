//! DELETE handler.

use salvo::http::StatusCode;
use salvo::{Depot, Request, Response, handler};
use webacl_service::auth::access_from_depot;
use webacl_store::StoreError;

use crate::error::{AppError, AppResult};
use crate::middleware::access::method_not_allowed;
use crate::middleware::resource::{base_from_depot, resource_from_depot};
use crate::store_handler::get_store_from_depot;

/// ## Summary
/// Removes a document or an empty container.
///
/// ## Side Effects
/// Deletes from the store and drops cached group and profile data derived
/// from the document.
///
/// ## Errors
/// Returns 405 for the root container, 404 for unknown resources, 409 for
/// non-empty containers and 500 for store failures.
#[handler]
#[tracing::instrument(skip_all, fields(path = %req.uri().path()))]
pub async fn delete(req: &mut Request, res: &mut Response, depot: &Depot) {
    match remove(depot).await {
        Ok(Removal::Deleted) => {
            res.status_code(StatusCode::OK);
        }
        Ok(Removal::Root) => {
            tracing::debug!("Refusing to delete the root container");
            method_not_allowed(res);
        }
        Err(AppError::StoreError(StoreError::NotFound(_))) => {
            res.status_code(StatusCode::NOT_FOUND);
        }
        Err(AppError::StoreError(StoreError::NotEmpty(_))) => {
            res.status_code(StatusCode::CONFLICT);
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to delete resource");
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
        }
    }
}

enum Removal {
    Deleted,
    Root,
}

async fn remove(depot: &Depot) -> AppResult<Removal> {
    let resource = resource_from_depot(depot)?;
    if resource == base_from_depot(depot)? {
        return Ok(Removal::Root);
    }

    let store = get_store_from_depot(depot)?;
    let access = access_from_depot(depot)?;
    store.delete(&resource).await?;
    access.invalidate(&resource).await;

    tracing::info!(%resource, "Resource deleted");
    Ok(Removal::Deleted)
}
