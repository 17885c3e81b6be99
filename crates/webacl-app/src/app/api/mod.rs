mod resource;
mod whoami;

use salvo::Router;

use crate::middleware::auth::AuthMiddleware;

/// ## Summary
/// Constructs the router serving the pod and the well-known endpoints.
///
/// Every route runs behind [`AuthMiddleware`]; resource routes additionally
/// resolve the addressed resource and enforce its ACL.
#[must_use]
pub fn routes() -> Router {
    Router::new()
        .hoop(AuthMiddleware)
        .push(whoami::routes())
        .push(resource::routes())
}
