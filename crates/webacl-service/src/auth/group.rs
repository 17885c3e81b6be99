//! Group membership by dereferencing group documents.

use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use moka::future::Cache;
use url::Url;
use webacl_core::constants::{foaf, vcard};
use webacl_rdf::{Graph, Term};

use crate::fetch::{Dereferencer, document_of};

/// Answers whether an agent belongs to a group.
pub trait GroupResolver: Send + Sync {
    /// `group` is the group IRI as written in the ACL, fragment included.
    /// Resolution failures answer `false`.
    fn is_member<'a>(&'a self, agent: &'a Url, group: &'a str) -> BoxFuture<'a, bool>;
}

/// Resolves membership from `vcard:hasMember` / `foaf:member` triples of the
/// group document.
pub struct GraphGroupResolver {
    dereferencer: Arc<dyn Dereferencer>,
    /// Parsed group documents; `None` when caching is off.
    cache: Option<Cache<Url, Arc<Graph>>>,
}

impl GraphGroupResolver {
    /// Caches up to `capacity` group documents for `cache_ttl`; a zero TTL
    /// dereferences on every lookup.
    #[must_use]
    pub fn new(dereferencer: Arc<dyn Dereferencer>, cache_ttl: Duration, capacity: u64) -> Self {
        let cache = (!cache_ttl.is_zero()).then(|| {
            Cache::builder()
                .max_capacity(capacity)
                .time_to_live(cache_ttl)
                .build()
        });
        Self {
            dereferencer,
            cache,
        }
    }

    /// Drops the cached copy of a group document after it was written.
    pub async fn invalidate(&self, document: &Url) {
        let Some(cache) = &self.cache else {
            return;
        };
        let document = document_of(document);
        if cache.contains_key(&document) {
            cache.invalidate(&document).await;
            tracing::debug!(%document, "Invalidated cached group document");
        }
    }

    async fn group_graph(&self, document: &Url) -> Option<Arc<Graph>> {
        if let Some(cache) = &self.cache
            && let Some(graph) = cache.get(document).await
        {
            tracing::trace!(%document, "Group document cache hit");
            return Some(graph);
        }

        match self.dereferencer.dereference(document).await {
            Ok(graph) => {
                let graph = Arc::new(graph);
                if let Some(cache) = &self.cache {
                    cache.insert(document.clone(), Arc::clone(&graph)).await;
                }
                Some(graph)
            }
            Err(error) => {
                tracing::warn!(%document, %error, "Could not dereference group document");
                None
            }
        }
    }
}

impl GroupResolver for GraphGroupResolver {
    #[tracing::instrument(skip_all, fields(agent = %agent, group = %group))]
    fn is_member<'a>(&'a self, agent: &'a Url, group: &'a str) -> BoxFuture<'a, bool> {
        Box::pin(async move {
            let Ok(group_iri) = Url::parse(group) else {
                tracing::warn!("Group is not an absolute IRI");
                return false;
            };
            let document = document_of(&group_iri);
            let Some(graph) = self.group_graph(&document).await else {
                return false;
            };

            let group_term = Term::iri(group_iri.as_str());
            let agent_term = Term::iri(agent.as_str());
            let member = graph.contains(&group_term, vcard::HAS_MEMBER, &agent_term)
                || graph.contains(&group_term, foaf::MEMBER, &agent_term);

            tracing::debug!(member, "Group membership resolved");
            member
        })
    }
}
