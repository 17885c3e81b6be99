//! In-memory store for tests and embedding.

use std::collections::{BTreeMap, BTreeSet};

use tokio::sync::RwLock;
use webacl_core::types::ResourceId;

use super::{GraphStore, Resource, StoreFuture};
use crate::error::StoreError;

/// Documents keyed by identifier. Containers exist when created explicitly or
/// when they hold a document; the root of every origin always exists.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    documents: BTreeMap<ResourceId, Vec<u8>>,
    containers: BTreeSet<ResourceId>,
}

impl Inner {
    fn add_ancestors(&mut self, id: &ResourceId) {
        for ancestor in id.ancestors() {
            self.containers.insert(ancestor);
        }
    }

    fn members(&self, container: &ResourceId) -> Vec<ResourceId> {
        let direct = |id: &&ResourceId| id.parent().as_ref() == Some(container);
        let mut members: Vec<ResourceId> = self
            .documents
            .keys()
            .chain(self.containers.iter())
            .filter(direct)
            .cloned()
            .collect();
        members.sort();
        members.dedup();
        members
    }
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a Turtle document.
    pub async fn insert(&self, id: &ResourceId, turtle: &str) {
        let mut inner = self.inner.write().await;
        inner.add_ancestors(id);
        inner.documents.insert(id.clone(), turtle.as_bytes().to_vec());
    }

    /// Removes every resource.
    pub async fn clear(&self) {
        let mut inner = self.inner.write().await;
        inner.documents.clear();
        inner.containers.clear();
    }
}

impl GraphStore for MemoryStore {
    fn read<'a>(&'a self, id: &'a ResourceId) -> StoreFuture<'a, Option<Resource>> {
        Box::pin(async move {
            let inner = self.inner.read().await;
            if id.is_container() {
                if id.is_root() || inner.containers.contains(id) {
                    return Ok(Some(Resource::Container(inner.members(id))));
                }
                return Ok(None);
            }
            Ok(inner.documents.get(id).cloned().map(Resource::Document))
        })
    }

    fn exists<'a>(&'a self, id: &'a ResourceId) -> StoreFuture<'a, bool> {
        Box::pin(async move {
            let inner = self.inner.read().await;
            Ok(if id.is_container() {
                id.is_root() || inner.containers.contains(id)
            } else {
                inner.documents.contains_key(id)
            })
        })
    }

    fn write<'a>(&'a self, id: &'a ResourceId, body: Vec<u8>) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            let mut inner = self.inner.write().await;
            inner.add_ancestors(id);
            if id.is_container() {
                inner.containers.insert(id.clone());
            } else {
                inner.documents.insert(id.clone(), body);
            }
            Ok(())
        })
    }

    fn delete<'a>(&'a self, id: &'a ResourceId) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            let mut inner = self.inner.write().await;
            if !id.is_container() {
                return inner
                    .documents
                    .remove(id)
                    .map(|_| ())
                    .ok_or_else(|| StoreError::NotFound(id.to_string()));
            }

            if !inner.containers.contains(id) {
                return Err(StoreError::NotFound(id.to_string()));
            }
            if !inner.members(id).is_empty() {
                return Err(StoreError::NotEmpty(id.to_string()));
            }
            inner.containers.remove(id);
            Ok(())
        })
    }
}
