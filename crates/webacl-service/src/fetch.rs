//! Dereferencing of profile and group documents.
//!
//! The identity and group resolvers only ever need one capability: fetch the
//! graph behind a document IRI. [`Dereferencer`] is that capability; tests
//! substitute their own implementation.

use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use thiserror::Error;
use url::Url;
use webacl_core::config::FetchConfig;
use webacl_core::constants::TURTLE_CONTENT_TYPE;
use webacl_core::types::ResourceId;
use webacl_rdf::{Graph, turtle};
use webacl_store::{GraphStore, StoreError};

use crate::error::{ServiceError, ServiceResult};

/// Why a document could not be dereferenced. Callers treat every variant as
/// "no information"; the distinction exists for logging.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Document not found: {0}")]
    NotFound(String),

    #[error("Document is not valid Turtle: {0}")]
    Unparsable(String),

    #[error("Timed out fetching {0}")]
    Timeout(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Document {0} exceeds {1} bytes")]
    TooLarge(String, u64),
}

pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Fetches the graph of a document.
pub trait Dereferencer: Send + Sync {
    /// Fetches and parses the document at `document` (an IRI without fragment).
    fn dereference<'a>(&'a self, document: &'a Url) -> BoxFuture<'a, FetchResult<Graph>>;
}

/// Returns the document IRI of `iri` (fragment removed).
#[must_use]
pub fn document_of(iri: &Url) -> Url {
    let mut document = iri.clone();
    document.set_fragment(None);
    document
}

/// Fetches documents over HTTP(S).
#[derive(Debug, Clone)]
pub struct HttpDereferencer {
    client: reqwest::Client,
    timeout: Duration,
    max_bytes: u64,
}

impl HttpDereferencer {
    /// ## Errors
    /// Returns `InvalidConfiguration` if the HTTP client cannot be built.
    pub fn new(config: &FetchConfig) -> ServiceResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| ServiceError::InvalidConfiguration(format!("HTTP client: {e}")))?;

        Ok(Self {
            client,
            timeout: config.timeout(),
            max_bytes: config.max_document_bytes,
        })
    }

    /// Reads the body, giving up as soon as it grows past `max_bytes`.
    async fn read_body(&self, document: &Url, mut response: reqwest::Response) -> FetchResult<Vec<u8>> {
        let too_large = || FetchError::TooLarge(document.to_string(), self.max_bytes);
        if response.content_length().is_some_and(|len| len > self.max_bytes) {
            return Err(too_large());
        }

        let mut body = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?
        {
            let size = u64::try_from(body.len() + chunk.len()).unwrap_or(u64::MAX);
            if size > self.max_bytes {
                return Err(too_large());
            }
            body.extend_from_slice(&chunk);
        }
        Ok(body)
    }
}

impl Dereferencer for HttpDereferencer {
    #[tracing::instrument(skip(self), fields(document = %document))]
    fn dereference<'a>(&'a self, document: &'a Url) -> BoxFuture<'a, FetchResult<Graph>> {
        Box::pin(async move {
            let timed_out = |_| FetchError::Timeout(document.to_string());
            let transport = |e: reqwest::Error| {
                if e.is_timeout() {
                    FetchError::Timeout(document.to_string())
                } else {
                    FetchError::Transport(e.to_string())
                }
            };

            let request = self
                .client
                .get(document.clone())
                .header(reqwest::header::ACCEPT, TURTLE_CONTENT_TYPE)
                .send();
            let response = tokio::time::timeout(self.timeout, request)
                .await
                .map_err(timed_out)?
                .map_err(transport)?;

            let status = response.status();
            if status == reqwest::StatusCode::NOT_FOUND || status == reqwest::StatusCode::GONE {
                return Err(FetchError::NotFound(document.to_string()));
            }
            if !status.is_success() {
                return Err(FetchError::Transport(format!("{document}: HTTP {status}")));
            }

            let body = tokio::time::timeout(self.timeout, self.read_body(document, response))
                .await
                .map_err(timed_out)??;

            turtle::parse_bytes(&body, Some(document.as_str()))
                .map_err(|e| FetchError::Unparsable(format!("{document}: {e}")))
        })
    }
}

/// Reads documents from the local store.
#[derive(Clone)]
pub struct StoreDereferencer {
    store: Arc<dyn GraphStore>,
}

impl StoreDereferencer {
    #[must_use]
    pub fn new(store: Arc<dyn GraphStore>) -> Self {
        Self { store }
    }
}

impl Dereferencer for StoreDereferencer {
    fn dereference<'a>(&'a self, document: &'a Url) -> BoxFuture<'a, FetchResult<Graph>> {
        Box::pin(async move {
            let id = ResourceId::from_url(document.clone())
                .map_err(|e| FetchError::NotFound(e.to_string()))?;

            match self.store.graph(&id).await {
                Ok(Some(graph)) => Ok(graph),
                Ok(None) => Err(FetchError::NotFound(document.to_string())),
                Err(StoreError::RdfError(e)) => {
                    Err(FetchError::Unparsable(format!("{document}: {e}")))
                }
                Err(e) => Err(FetchError::Transport(e.to_string())),
            }
        })
    }
}

/// Serves documents under the pod's base URL from the store and everything
/// else from `remote`.
#[derive(Clone)]
pub struct RoutingDereferencer {
    base: ResourceId,
    local: StoreDereferencer,
    remote: Arc<dyn Dereferencer>,
}

impl RoutingDereferencer {
    #[must_use]
    pub fn new(base: ResourceId, store: Arc<dyn GraphStore>, remote: Arc<dyn Dereferencer>) -> Self {
        Self {
            base: base.as_container(),
            local: StoreDereferencer::new(store),
            remote,
        }
    }

    fn is_local(&self, document: &Url) -> bool {
        ResourceId::from_url(document.clone())
            .is_ok_and(|id| id == self.base || self.base.contains(&id))
    }
}

impl Dereferencer for RoutingDereferencer {
    fn dereference<'a>(&'a self, document: &'a Url) -> BoxFuture<'a, FetchResult<Graph>> {
        if self.is_local(document) {
            tracing::trace!(%document, "Dereferencing from local store");
            self.local.dereference(document)
        } else {
            self.remote.dereference(document)
        }
    }
}
