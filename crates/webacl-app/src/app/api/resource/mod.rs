//! Handlers serving the documents and containers of the pod.

mod delete;
mod get_head;
mod options;
mod put;


use salvo::{Response, Router, handler};

use crate::middleware::access::{AccessMiddleware, method_not_allowed};
use crate::middleware::resource::ResourceMiddleware;

/// Fallback for methods without a handler.
#[handler]
async fn unsupported(res: &mut Response) {
    method_not_allowed(res);
}

#[must_use]
pub fn routes() -> Router {
    Router::with_path("{**rest}")
        .hoop(ResourceMiddleware)
        .hoop(AccessMiddleware)
        .get(get_head::get)
        .head(get_head::head)
        .put(put::put)
        .delete(delete::delete)
        .options(options::options)
        .push(Router::new().goal(unsupported))
}
