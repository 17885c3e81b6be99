//! GET and HEAD handlers.

use salvo::http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use salvo::http::{HeaderValue, StatusCode};
use salvo::{Depot, Request, Response, handler};
use webacl_core::constants::ldp;
use webacl_rdf::turtle;
use webacl_store::{Resource, container_graph, content_type_for};

use crate::config::get_config_from_depot;
use crate::error::AppResult;
use crate::middleware::resource::resource_from_depot;
use crate::store_handler::get_store_from_depot;

#[handler]
#[tracing::instrument(skip_all, fields(path = %req.uri().path()))]
pub async fn get(req: &mut Request, res: &mut Response, depot: &Depot) {
    handle_get_or_head(res, depot, false).await;
}

#[handler]
#[tracing::instrument(skip_all, fields(path = %req.uri().path()))]
pub async fn head(req: &mut Request, res: &mut Response, depot: &Depot) {
    handle_get_or_head(res, depot, true).await;
}

/// ## Summary
/// Shared implementation for GET and HEAD.
///
/// Documents are served as stored; containers are served as their
/// `ldp:contains` listing in Turtle.
///
/// ## Side Effects
/// Sets the status, `Content-Type` and `Content-Length`; writes the body
/// unless `is_head`.
async fn handle_get_or_head(res: &mut Response, depot: &Depot, is_head: bool) {
    match load(depot).await {
        Ok(Some((content_type, body))) => {
            #[expect(
                clippy::let_underscore_must_use,
                reason = "Header addition failure is non-fatal"
            )]
            let _ = res.add_header(CONTENT_TYPE, HeaderValue::from_static(content_type), true);
            if is_head {
                #[expect(
                    clippy::let_underscore_must_use,
                    reason = "Header addition failure is non-fatal"
                )]
                let _ = res.add_header(CONTENT_LENGTH, HeaderValue::from(body.len()), true);
            } else {
                res.body(body);
            }
            res.status_code(StatusCode::OK);
        }
        Ok(None) => {
            tracing::debug!("Resource not found");
            res.status_code(StatusCode::NOT_FOUND);
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to load resource");
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
        }
    }
}

async fn load(depot: &Depot) -> AppResult<Option<(&'static str, Vec<u8>)>> {
    let config = get_config_from_depot(depot)?;
    let store = get_store_from_depot(depot)?;
    let resource = resource_from_depot(depot)?;

    let Some(found) = store.read(&resource).await? else {
        return Ok(None);
    };
    let body = match found {
        Resource::Document(body) => body,
        Resource::Container(members) => {
            let listing = container_graph(&resource, &members);
            turtle::to_turtle(&listing, &[("ldp", ldp::NS)]).into_bytes()
        }
    };

    tracing::debug!(%resource, bytes = body.len(), "Serving resource");
    Ok(Some((content_type_for(&resource, &config.acl.suffix), body)))
}
