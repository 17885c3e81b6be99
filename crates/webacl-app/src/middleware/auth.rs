use salvo::Depot;
use salvo::http::{HeaderValue, StatusCode};
use tracing::error;
use tracing_unwrap::ResultExt;

use crate::config::{AuthConfig, AuthMethod, get_config_from_depot};
use webacl_core::constants::USER_HEADER;
use webacl_service::auth::{Agent, access_from_depot};

/// ## Summary
/// Authentication middleware that resolves the requesting agent and stores it in the depot.
///
/// With `auth.method = proxy_certificate` the client certificate forwarded by one of
/// the `auth.trusted_proxies` is verified against the `WebID` profile it names. A missing or
/// unverifiable certificate leaves the request anonymous; the access check decides
/// whether that is enough.
///
/// ## Side Effects
/// Inserts the [`Agent`] into the depot and sets the `User` response header for
/// authenticated agents.
///
/// ## Errors
/// Returns an HTTP 500 response if the configuration or access-control services are
/// missing from the depot.
#[salvo::async_trait]
impl salvo::Handler for AuthMiddleware {
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
        tracing::trace!("Authenticating request");

        let config = match get_config_from_depot(depot) {
            Ok(cfg) => cfg,
            Err(e) => {
                error!(error = ?e, "Failed to get config from depot");
                res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
                ctrl.skip_rest();
                return;
            }
        };

        let certificate = match config.auth.method {
            AuthMethod::None => None,
            AuthMethod::ProxyCertificate => forwarded_certificate(req, &config.auth),
        };

        let agent = match certificate {
            None => Agent::Anonymous,
            Some(certificate) => match access_from_depot(depot) {
                Ok(access) => access.verifier.resolve(&certificate).await,
                Err(e) => {
                    error!(error = ?e, "Failed to get access control from depot");
                    res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
                    ctrl.skip_rest();
                    return;
                }
            },
        };

        if let Some(web_id) = agent.web_id() {
            tracing::debug!(%web_id, "Agent authenticated");
            if let Some(value) = HeaderValue::from_str(web_id.as_str()).ok_or_log() {
                #[expect(
                    clippy::let_underscore_must_use,
                    reason = "Header addition failure is non-fatal"
                )]
                let _ = res.add_header(USER_HEADER, value, true);
            }
        } else {
            tracing::debug!("Request is anonymous");
        }

        depot.inject(agent);
    }
}

/// Returns the certificate forwarded by a trusted proxy, ignoring the header
/// when the peer is not one.
fn forwarded_certificate(req: &salvo::Request, auth: &AuthConfig) -> Option<String> {
    let certificate = req
        .headers()
        .get(auth.certificate_header.as_str())
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())?;

    let peer = req.remote_addr().clone().into_std().map(|addr| addr.ip());
    if !auth.trusts(peer) {
        tracing::warn!(?peer, "Ignoring certificate header from untrusted peer");
        return None;
    }
    Some(certificate.to_owned())
}

/// ## Summary
/// Middleware handler for authentication.
/// Every route that consults the requesting agent runs behind it.
pub struct AuthMiddleware;
