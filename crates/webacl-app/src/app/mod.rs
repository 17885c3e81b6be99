pub mod api;

use std::sync::Arc;

use salvo::Router;
use webacl_service::auth::{AccessControl, AccessControlHandler};
use webacl_service::fetch::Dereferencer;
use webacl_store::GraphStore;

use crate::config::{ConfigHandler, Settings};
use crate::error::AppResult;
use crate::store_handler::StoreHandler;

/// ## Summary
/// Builds the service router over `store`, injecting the settings, the
/// store and the access-control services ahead of [`api::routes`].
///
/// Profile and group documents outside the pod are fetched through `remote`.
///
/// ## Errors
/// Returns an error if the base URL or the ACL settings are invalid.
pub fn router(
    settings: &Settings,
    store: Arc<dyn GraphStore>,
    remote: Arc<dyn Dereferencer>,
) -> AppResult<Router> {
    let access = Arc::new(AccessControl::new(settings, Arc::clone(&store), remote)?);

    Ok(Router::new()
        .hoop(ConfigHandler {
            settings: settings.clone(),
        })
        .hoop(StoreHandler { store })
        .hoop(AccessControlHandler { access })
        .push(api::routes()))
}
