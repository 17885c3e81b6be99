use salvo::prelude::Json;
use salvo::{Depot, Router, handler};
use serde::Serialize;

use webacl_core::constants::{WELL_KNOWN_ROUTE_COMPONENT, WHOAMI_ROUTE_COMPONENT};
use webacl_service::auth::agent_from_depot;

#[derive(Debug, Serialize)]
struct WhoAmI {
    webid: Option<String>,
}

/// ## Summary
/// Returns the `WebID` the request was authenticated as, or `null`.
/// The agent is retrieved from the depot set by the `AuthMiddleware`.
#[handler]
async fn whoami(depot: &Depot) -> Json<WhoAmI> {
    let webid = agent_from_depot(depot)
        .ok()
        .and_then(|agent| agent.web_id())
        .map(ToString::to_string);
    Json(WhoAmI { webid })
}

#[must_use]
pub fn routes() -> Router {
    Router::with_path(WELL_KNOWN_ROUTE_COMPONENT)
        .push(Router::with_path(WHOAMI_ROUTE_COMPONENT).get(whoami))
}
