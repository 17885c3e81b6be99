//! OPTIONS handler.

use salvo::http::{HeaderValue, StatusCode};
use salvo::{Depot, Request, Response, handler};

use crate::middleware::access::ALLOWED_METHODS;
use crate::middleware::resource::{base_from_depot, resource_from_depot};

/// ## Summary
/// Advertises the methods the addressed resource supports.
///
/// Everything except the root container may also be deleted.
///
/// ## Side Effects
/// Sets the `Allow` header.
#[handler]
#[tracing::instrument(skip_all, fields(path = %req.uri().path()))]
pub async fn options(req: &mut Request, res: &mut Response, depot: &Depot) {
    let deletable = matches!(
        (resource_from_depot(depot), base_from_depot(depot)),
        (Ok(resource), Ok(base)) if resource != base
    );
    let allow = if deletable {
        "OPTIONS, HEAD, GET, PUT, DELETE"
    } else {
        ALLOWED_METHODS
    };

    #[expect(
        clippy::let_underscore_must_use,
        reason = "Header addition failure is non-fatal"
    )]
    let _ = res.add_header("Allow", HeaderValue::from_static(allow), true);
    res.status_code(StatusCode::OK);
}
