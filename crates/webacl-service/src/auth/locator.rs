//! Finds the ACL document governing a resource.

use std::collections::HashSet;
use std::sync::Arc;

use webacl_core::types::ResourceId;
use webacl_store::{GraphStore, StoreResult};

/// Where the governing ACL was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AclLocation {
    /// The ACL document.
    pub acl: ResourceId,
    /// The resource whose ACL it is: the target itself or an ancestor container.
    pub governs: ResourceId,
    /// `true` when inherited from an ancestor, so `defaultForNew` entries apply.
    pub applies_as_default: bool,
}

/// Walks the containment hierarchy looking for ACL documents.
#[derive(Clone)]
pub struct AclLocator {
    store: Arc<dyn GraphStore>,
    suffix: String,
    max_depth: usize,
}

impl AclLocator {
    #[must_use]
    pub fn new(store: Arc<dyn GraphStore>, suffix: impl Into<String>, max_depth: usize) -> Self {
        Self {
            store,
            suffix: suffix.into(),
            max_depth,
        }
    }

    #[must_use]
    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// The conventional ACL identifier for `resource`. The ACL of `D/` is `D/.acl`.
    #[must_use]
    pub fn acl_for(&self, resource: &ResourceId) -> ResourceId {
        resource.with_suffix(&self.suffix)
    }

    /// Whether `resource` is itself an ACL document.
    #[must_use]
    pub fn is_acl(&self, resource: &ResourceId) -> bool {
        self.governed_by(resource).is_some()
    }

    /// The resource an ACL document governs, or `None` if `acl` is not one.
    #[must_use]
    pub fn governed_by(&self, acl: &ResourceId) -> Option<ResourceId> {
        if self.suffix.is_empty() || acl.is_container() {
            return None;
        }
        acl.strip_suffix(&self.suffix)
    }

    /// ## Summary
    /// Finds the ACL governing `resource`.
    ///
    /// For an ACL document the search starts from the resource it governs.
    /// The walk checks the resource's own ACL, then each ancestor container's,
    /// stopping at the root, after `max_depth` steps, or on a repeated
    /// identifier. `None` means no ACL exists anywhere on the path.
    ///
    /// ## Errors
    /// Returns the store's error if an existence check fails.
    #[tracing::instrument(skip_all, fields(resource = %resource))]
    pub async fn locate(&self, resource: &ResourceId) -> StoreResult<Option<AclLocation>> {
        let start = self
            .governed_by(resource)
            .unwrap_or_else(|| resource.clone());

        let mut visited = HashSet::new();
        let mut current = Some(start);
        let mut applies_as_default = false;
        let mut depth = 0;

        while let Some(candidate) = current {
            if depth > self.max_depth {
                tracing::warn!(max_depth = self.max_depth, "ACL search depth exceeded");
                return Ok(None);
            }
            if !visited.insert(candidate.clone()) {
                tracing::warn!(at = %candidate, "Cycle in resource hierarchy");
                return Ok(None);
            }

            let acl = self.acl_for(&candidate);
            tracing::trace!(%acl, "Checking for ACL");
            if self.store.exists(&acl).await? {
                tracing::debug!(%acl, governs = %candidate, applies_as_default, "Found ACL");
                return Ok(Some(AclLocation {
                    acl,
                    governs: candidate,
                    applies_as_default,
                }));
            }

            current = candidate.parent();
            applies_as_default = true;
            depth += 1;
        }

        tracing::debug!("No ACL on the path to the root");
        Ok(None)
    }
}
