//! Enforces the access decision before any handler touches the store.

use salvo::Depot;
use salvo::http::header::{ORIGIN, WWW_AUTHENTICATE};
use salvo::http::{HeaderValue, StatusCode};
use tracing::error;
use tracing_unwrap::ResultExt;
use webacl_service::auth::{
    AccessMode, Decision, agent_from_depot, authorizer_from_depot, mode_for_method,
};

use crate::config::get_config_from_depot;
use crate::error::AppResult;
use crate::middleware::resource::resource_from_depot;

/// Methods advertised when a method is refused.
pub const ALLOWED_METHODS: &str = "OPTIONS, HEAD, GET, PUT";

/// ## Summary
/// Writes a 405 response with the `Allow` header.
pub fn method_not_allowed(res: &mut salvo::Response) {
    #[expect(
        clippy::let_underscore_must_use,
        reason = "Header addition failure is non-fatal"
    )]
    let _ = res.add_header("Allow", HeaderValue::from_static(ALLOWED_METHODS), true);
    res.status_code(StatusCode::METHOD_NOT_ALLOWED);
}

/// ## Summary
/// Access middleware that checks the requesting agent against the ACL
/// governing the addressed resource.
///
/// The HTTP method selects the required mode and the `Origin` header, when
/// present, is matched against origin-restricted entries.
///
/// ## Errors
/// Stops the request with 405 for unsupported methods, 401 with a `WebID-TLS`
/// challenge for anonymous denials, 403 for authenticated denials and 500
/// when the decision cannot be computed.
pub struct AccessMiddleware;

#[salvo::async_trait]
impl salvo::Handler for AccessMiddleware {
    #[tracing::instrument(skip(self, req, depot, res, ctrl), fields(
        method = %req.method(),
        path = %req.uri().path()
    ))]
    async fn handle(
        &self,
        req: &mut salvo::Request,
        depot: &mut Depot,
        res: &mut salvo::Response,
        ctrl: &mut salvo::FlowCtrl,
    ) {
        let config = match get_config_from_depot(depot) {
            Ok(cfg) => cfg,
            Err(e) => {
                error!(error = ?e, "Failed to get config from depot");
                res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
                ctrl.skip_rest();
                return;
            }
        };

        let Some(mode) = mode_for_method(req.method(), config.acl.append_policy) else {
            tracing::debug!("Method not supported");
            method_not_allowed(res);
            ctrl.skip_rest();
            return;
        };

        let origin = req
            .headers()
            .get(ORIGIN)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);

        match decide(depot, mode, origin.as_deref()).await {
            Ok(Decision::Allow) => {
                tracing::trace!(%mode, "Access granted");
            }
            Ok(Decision::DenyUnauthenticated) => {
                tracing::debug!(%mode, "Authentication required");
                let challenge = format!("WebID-TLS realm=\"{}\"", config.auth.realm);
                if let Some(value) = HeaderValue::from_str(&challenge).ok_or_log() {
                    #[expect(
                        clippy::let_underscore_must_use,
                        reason = "Header addition failure is non-fatal"
                    )]
                    let _ = res.add_header(WWW_AUTHENTICATE, value, true);
                }
                res.status_code(StatusCode::UNAUTHORIZED);
                ctrl.skip_rest();
            }
            Ok(Decision::DenyForbidden) => {
                tracing::debug!(%mode, "Access forbidden");
                res.status_code(StatusCode::FORBIDDEN);
                ctrl.skip_rest();
            }
            Err(e) => {
                error!(error = %e, "Access evaluation failed");
                res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
                ctrl.skip_rest();
            }
        }
    }
}

async fn decide(depot: &Depot, mode: AccessMode, origin: Option<&str>) -> AppResult<Decision> {
    let resource = resource_from_depot(depot)?;
    let authorizer = authorizer_from_depot(depot)?;
    let agent = agent_from_depot(depot)?;
    Ok(authorizer
        .check_access(&resource, agent, mode, origin)
        .await?)
}
