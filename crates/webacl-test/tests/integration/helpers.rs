#![allow(clippy::unused_async, clippy::expect_used, dead_code)]
//! Test helpers for integration tests.
//!
//! Provides utilities for:
//! - Setting up an isolated pod (one temporary directory per test)
//! - Serving `WebID` profiles and remote group documents without a network
//! - Making HTTP requests, optionally presenting a client certificate
//! - Asserting on responses

use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use futures::future::BoxFuture;
use salvo::Service;
use salvo::http::header::HeaderName;
use salvo::http::{Method, ReqBody, StatusCode};
use salvo::test::{RequestBuilder, ResponseExt, TestClient};
use tempfile::TempDir;
use url::Url;

use webacl_test::component::app::router;
use webacl_test::component::config::Settings;
use webacl_test::component::fetch::{Dereferencer, FetchError, FetchResult};
use webacl_test::component::rdf::{Graph, turtle};
use webacl_test::component::store::{FileStore, GraphStore};
use webacl_test::component::types::ResourceId;

pub use tracing;

pub const BASE: &str = "https://pod.example.org/";
pub const CERTIFICATE_HEADER: &str = "X-SSL-Client-Cert";

pub const USER1: &str = "https://user1.example.org/profile/card#me";
pub const USER2: &str = "https://user2.example.org/profile/card#me";

const USER1_PEM: &str = include_str!("../../fixtures/user1.pem");
const USER2_PEM: &str = include_str!("../../fixtures/user2.pem");
const USER1_PROFILE: &str = include_str!("../../fixtures/user1-profile.ttl");
const USER2_PROFILE: &str = include_str!("../../fixtures/user2-profile.ttl");

/// Turtle prefixes shared by the ACL documents in tests.
pub const ACL_PREFIXES: &str = "@prefix acl: <http://www.w3.org/ns/auth/acl#> .
@prefix foaf: <http://xmlns.com/foaf/0.1/> .
@prefix vcard: <http://www.w3.org/2006/vcard/ns#> .
";

/// Test users with a certificate fixture and a published profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum User {
    One,
    Two,
}

impl User {
    #[must_use]
    pub const fn web_id(self) -> &'static str {
        match self {
            Self::One => USER1,
            Self::Two => USER2,
        }
    }

    #[must_use]
    pub const fn pem(self) -> &'static str {
        match self {
            Self::One => USER1_PEM,
            Self::Two => USER2_PEM,
        }
    }

    /// The certificate folded onto one line, the way a TLS-terminating
    /// proxy forwards it in a header.
    #[must_use]
    pub fn certificate_header(self) -> String {
        self.pem()
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Serves documents outside the pod from memory and counts requests.
#[derive(Default)]
pub struct RemoteDocuments {
    docs: RwLock<HashMap<String, String>>,
    hits: AtomicUsize,
}

impl RemoteDocuments {
    /// Remote documents with both test users' profiles published.
    #[must_use]
    pub fn with_profiles() -> Self {
        let remote = Self::default();
        remote.publish("https://user1.example.org/profile/card", USER1_PROFILE);
        remote.publish("https://user2.example.org/profile/card", USER2_PROFILE);
        remote
    }

    /// Publishes (or replaces) a Turtle document.
    pub fn publish(&self, url: &str, body: &str) {
        self.docs
            .write()
            .expect("documents lock")
            .insert(url.to_string(), body.to_string());
    }

    /// Removes a document.
    pub fn withdraw(&self, url: &str) {
        self.docs.write().expect("documents lock").remove(url);
    }

    #[must_use]
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

impl Dereferencer for RemoteDocuments {
    fn dereference<'a>(&'a self, document: &'a Url) -> BoxFuture<'a, FetchResult<Graph>> {
        Box::pin(async move {
            self.hits.fetch_add(1, Ordering::SeqCst);
            let body = self
                .docs
                .read()
                .expect("documents lock")
                .get(document.as_str())
                .cloned()
                .ok_or_else(|| FetchError::NotFound(document.to_string()))?;
            turtle::parse(&body, Some(document.as_str()))
                .map_err(|e| FetchError::Unparsable(e.to_string()))
        })
    }
}

/// An isolated pod served from a temporary directory.
pub struct TestPod {
    dir: TempDir,
    pub store: Arc<FileStore>,
    pub remote: Arc<RemoteDocuments>,
    pub service: Service,
}

impl TestPod {
    /// ## Summary
    /// Creates a pod with default settings.
    ///
    /// ## Panics
    /// Panics if the temporary directory cannot be created.
    #[must_use]
    pub fn new() -> Self {
        Self::with_settings(|_| {})
    }

    /// ## Summary
    /// Creates a pod after letting `configure` adjust the default settings.
    ///
    /// ## Panics
    /// Panics if the temporary directory cannot be created or the settings
    /// are rejected.
    #[must_use]
    pub fn with_settings(configure: impl FnOnce(&mut Settings)) -> Self {
        let dir = tempfile::tempdir().expect("Failed to create pod directory");
        let mut settings = Settings::for_store(BASE, dir.path());
        configure(&mut settings);

        let store = Arc::new(FileStore::new(resource(BASE), dir.path()));
        let remote = Arc::new(RemoteDocuments::with_profiles());
        let router = router(
            &settings,
            Arc::clone(&store) as Arc<dyn GraphStore>,
            Arc::clone(&remote) as Arc<dyn Dereferencer>,
        )
        .expect("Failed to build router");

        Self {
            dir,
            store,
            remote,
            service: Service::new(router),
        }
    }

    /// ## Summary
    /// Writes a document straight into the store, bypassing access control.
    ///
    /// ## Panics
    /// Panics if the store rejects the write.
    pub async fn seed(&self, path: &str, body: &str) {
        self.store
            .write(&resource_at(path), body.as_bytes().to_vec())
            .await
            .expect("Failed to seed document");
    }

    /// ## Summary
    /// Writes an ACL document, prefixing the shared vocabulary.
    ///
    /// ## Panics
    /// Panics if the store rejects the write.
    pub async fn seed_acl(&self, path: &str, rules: &str) {
        self.seed(path, &format!("{ACL_PREFIXES}{rules}")).await;
    }

    /// Checks whether a resource exists in the store.
    pub async fn exists(&self, path: &str) -> bool {
        self.store
            .exists(&resource_at(path))
            .await
            .expect("Store should answer")
    }

    #[must_use]
    pub fn root(&self) -> &std::path::Path {
        self.dir.path()
    }
}

/// Parses an absolute resource identifier.
#[must_use]
pub fn resource(url: &str) -> ResourceId {
    ResourceId::parse(url).expect("Valid resource id")
}

/// The identifier of `path` inside the test pod.
#[must_use]
pub fn resource_at(path: &str) -> ResourceId {
    resource(BASE)
        .join(path.trim_start_matches('/'))
        .expect("Valid path")
}

/// Represents an HTTP test request.
pub struct TestRequest {
    method: Method,
    path: String,
    headers: Vec<(String, String)>,
    body: Option<Vec<u8>>,
    peer: IpAddr,
}

impl TestRequest {
    /// Creates a new request with the given method and path.
    #[must_use]
    pub fn new(method: Method, path: &str) -> Self {
        Self {
            method,
            path: path.to_string(),
            headers: Vec::new(),
            body: None,
            peer: IpAddr::V4(Ipv4Addr::LOCALHOST),
        }
    }

    /// Creates a new GET request.
    #[must_use]
    pub fn get(path: &str) -> Self {
        Self::new(Method::GET, path)
    }

    /// Creates a new HEAD request.
    #[must_use]
    pub fn head(path: &str) -> Self {
        Self::new(Method::HEAD, path)
    }

    /// Creates a new PUT request.
    #[must_use]
    pub fn put(path: &str) -> Self {
        Self::new(Method::PUT, path)
    }

    /// Creates a new DELETE request.
    #[must_use]
    pub fn delete(path: &str) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Creates a new OPTIONS request.
    #[must_use]
    pub fn options(path: &str) -> Self {
        Self::new(Method::OPTIONS, path)
    }

    /// Adds a header to the request.
    #[must_use]
    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    /// Presents `user`'s client certificate.
    #[must_use]
    pub fn as_user(self, user: User) -> Self {
        let certificate = user.certificate_header();
        self.header(CERTIFICATE_HEADER, &certificate)
    }

    /// Sends the request from `peer` instead of the loopback proxy.
    #[must_use]
    pub fn from_peer(mut self, peer: IpAddr) -> Self {
        self.peer = peer;
        self
    }

    /// Sets the Origin header.
    #[must_use]
    pub fn origin(self, origin: &str) -> Self {
        self.header("Origin", origin)
    }

    /// Sets the request body.
    #[must_use]
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Sets a Turtle request body.
    #[must_use]
    pub fn turtle_body(self, turtle: &str) -> Self {
        self.header("Content-Type", "text/turtle")
            .body(turtle.as_bytes().to_vec())
    }

    /// Sends the request to the test service and returns the response.
    ///
    /// ## Panics
    /// Panics if the request cannot be sent or the response cannot be read.
    pub async fn send(self, service: &Service) -> TestResponse {
        let url = format!("http://127.0.0.1:5800{}", self.path);

        let mut client = match self.method.as_str() {
            "GET" => TestClient::get(&url),
            "HEAD" => TestClient::head(&url),
            "PUT" => TestClient::put(&url),
            "DELETE" => TestClient::delete(&url),
            "OPTIONS" => TestClient::options(&url),
            _ => RequestBuilder::new(&url, self.method.clone()),
        };

        for (name, value) in self.headers {
            if let Ok(header_name) = HeaderName::try_from(name.as_str()) {
                client = client.add_header(header_name, value, true);
            }
        }

        if let Some(body_bytes) = self.body {
            client = client.body(ReqBody::Once(body_bytes.into()));
        }

        let mut request = client.build();
        *request.remote_addr_mut() = SocketAddr::new(self.peer, 41_000).into();
        let mut response = service.handle(request).await;

        let status = response
            .status_code
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let headers: Vec<(String, String)> = response
            .headers()
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or("").to_string()))
            .collect();

        let body: Vec<u8> = response.take_bytes(None).await.unwrap_or_default().to_vec();

        TestResponse {
            status,
            headers,
            body,
        }
    }
}

/// Represents an HTTP test response for assertions.
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl TestResponse {
    /// Asserts that the response status matches the expected code.
    #[must_use]
    pub fn assert_status(self, expected: StatusCode) -> Self {
        assert_eq!(
            self.status,
            expected,
            "Expected status {expected} but got {}: {}",
            self.status,
            self.body_string()
        );
        self
    }

    /// Asserts that a header exists with the expected value.
    #[must_use]
    pub fn assert_header(self, name: &str, expected: &str) -> Self {
        let value = self.get_header(name);
        assert!(value.is_some(), "Header '{name}' not found in response");
        assert_eq!(
            value,
            Some(expected),
            "Header '{name}' expected '{expected}' but got '{value:?}'"
        );
        self
    }

    /// Asserts that a header is absent.
    #[must_use]
    pub fn assert_no_header(self, name: &str) -> Self {
        let value = self.get_header(name);
        assert!(value.is_none(), "Header '{name}' unexpectedly set to '{value:?}'");
        self
    }

    /// Asserts that the response body contains the expected substring.
    #[must_use]
    pub fn assert_body_contains(self, expected: &str) -> Self {
        let body = self.body_string();
        assert!(
            body.contains(expected),
            "Expected body to contain '{expected}' but got:\n{body}"
        );
        self
    }

    /// Asserts that the response body is empty.
    #[must_use]
    pub fn assert_body_empty(self) -> Self {
        assert!(
            self.body.is_empty(),
            "Expected empty body but got {} bytes",
            self.body.len()
        );
        self
    }

    /// Returns the body as a UTF-8 string.
    #[must_use]
    pub fn body_string(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Parses the body as JSON.
    ///
    /// ## Panics
    /// Panics if the body is not JSON.
    #[must_use]
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).expect("JSON body")
    }

    /// Gets a header value by name (case-insensitive).
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}
