use salvo::async_trait;
use std::sync::Arc;

use crate::error::AppResult;
use webacl_core::error::CoreError;
use webacl_store::GraphStore;

/// Hoop injecting the document store into the depot.
pub struct StoreHandler {
    pub store: Arc<dyn GraphStore>,
}

#[async_trait]
impl salvo::Handler for StoreHandler {
    #[tracing::instrument(skip(self, _req, depot, _res, _ctrl))]
    async fn handle(
        &self,
        _req: &mut salvo::Request,
        depot: &mut salvo::Depot,
        _res: &mut salvo::Response,
        _ctrl: &mut salvo::FlowCtrl,
    ) {
        depot.inject(Arc::clone(&self.store));
    }
}

/// ## Summary
/// Retrieves the document store from the depot.
///
/// ## Errors
/// Returns an error if the store is not found in the depot.
pub fn get_store_from_depot(depot: &salvo::Depot) -> AppResult<Arc<dyn GraphStore>> {
    depot
        .obtain::<Arc<dyn GraphStore>>()
        .cloned()
        .map_err(|_err| CoreError::InvariantViolation("Document store not found in depot").into())
}
