//! Document storage for the pod.
//!
//! [`GraphStore`] is the seam the authorization engine reads ACL documents
//! through; the HTTP layer uses the same trait to serve and modify documents.

pub mod error;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use store::{
    FileStore, GraphStore, MemoryStore, Resource, StoreFuture, container_graph, content_type_for,
};
