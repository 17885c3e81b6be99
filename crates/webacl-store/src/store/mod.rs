//! The [`GraphStore`] trait and its implementations.

mod file;
mod memory;


use std::future::Future;
use std::pin::Pin;

use webacl_core::constants::{TURTLE_CONTENT_TYPE, ldp, rdf};
use webacl_core::types::ResourceId;
use webacl_rdf::{Graph, Term, Triple, turtle};

use crate::error::StoreResult;

pub use file::FileStore;
pub use memory::MemoryStore;

pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = StoreResult<T>> + Send + 'a>>;

/// A stored resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resource {
    /// Raw document bytes.
    Document(Vec<u8>),
    /// Identifiers of the container's direct members, sorted.
    Container(Vec<ResourceId>),
}

/// Read/write access to the documents of a pod.
///
/// Absence is `Ok(None)` / `Ok(false)`; an `Err` always means the store
/// could not answer.
pub trait GraphStore: Send + Sync {
    /// Loads a resource.
    fn read<'a>(&'a self, id: &'a ResourceId) -> StoreFuture<'a, Option<Resource>>;

    /// Checks whether a resource exists.
    fn exists<'a>(&'a self, id: &'a ResourceId) -> StoreFuture<'a, bool>;

    /// Stores a document, creating missing parent containers. Writing a
    /// container identifier creates the container; `body` is ignored.
    fn write<'a>(&'a self, id: &'a ResourceId, body: Vec<u8>) -> StoreFuture<'a, ()>;

    /// Removes a document or an empty container.
    fn delete<'a>(&'a self, id: &'a ResourceId) -> StoreFuture<'a, ()>;

    /// ## Summary
    /// Loads a resource as a graph.
    ///
    /// Documents are parsed as Turtle with the resource identifier as base;
    /// containers yield their `ldp:contains` listing.
    ///
    /// ## Errors
    /// Returns `RdfError` if the document is not valid Turtle, or any error
    /// from [`GraphStore::read`].
    fn graph<'a>(&'a self, id: &'a ResourceId) -> StoreFuture<'a, Option<Graph>> {
        Box::pin(async move {
            match self.read(id).await? {
                None => Ok(None),
                Some(Resource::Container(members)) => Ok(Some(container_graph(id, &members))),
                Some(Resource::Document(body)) => {
                    let graph = turtle::parse_bytes(&body, Some(id.as_str()))?;
                    Ok(Some(graph))
                }
            }
        })
    }
}

/// Builds the `ldp:contains` listing of a container.
#[must_use]
pub fn container_graph(id: &ResourceId, members: &[ResourceId]) -> Graph {
    let subject = Term::iri(id.as_str());
    let mut graph = Graph::new();
    graph.insert(Triple::new(
        subject.clone(),
        rdf::TYPE,
        Term::iri(ldp::BASIC_CONTAINER),
    ));
    for member in members {
        graph.insert(Triple::new(
            subject.clone(),
            ldp::CONTAINS,
            Term::iri(member.as_str()),
        ));
    }
    graph
}

/// Media type a resource is served with.
#[must_use]
pub fn content_type_for(id: &ResourceId, acl_suffix: &str) -> &'static str {
    let name = id.name();
    if id.is_container()
        || name.ends_with(".ttl")
        || (!acl_suffix.is_empty() && name.ends_with(acl_suffix))
    {
        TURTLE_CONTENT_TYPE
    } else {
        "application/octet-stream"
    }
}
