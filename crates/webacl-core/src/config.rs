use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use config::Config;
use serde::Deserialize;

use crate::constants::DEFAULT_ACL_SUFFIX;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub auth: AuthConfig,
    pub acl: AclConfig,
    pub fetch: FetchConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthMethod {
    /// Every request is anonymous.
    None,
    /// A TLS-terminating proxy forwards the client certificate in a header.
    ProxyCertificate,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    pub method: AuthMethod,
    /// Header carrying the PEM (or base64 DER) client certificate.
    pub certificate_header: String,
    /// Realm advertised in the `WWW-Authenticate` challenge.
    pub realm: String,
    /// Peers allowed to supply the certificate header. The proxy must drop
    /// any copy of the header sent by the client itself.
    #[serde(default = "default_trusted_proxies")]
    pub trusted_proxies: Vec<IpAddr>,
}

impl AuthConfig {
    /// Whether a certificate header from `peer` may be believed.
    /// Unknown peers (e.g. Unix sockets) are not trusted.
    #[must_use]
    pub fn trusts(&self, peer: Option<IpAddr>) -> bool {
        peer.is_some_and(|peer| self.trusted_proxies.contains(&peer.to_canonical()))
    }
}

fn default_trusted_proxies() -> Vec<IpAddr> {
    vec![IpAddr::V4(Ipv4Addr::LOCALHOST), IpAddr::V6(Ipv6Addr::LOCALHOST)]
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Public base URL of the store, e.g. `https://pod.example.org/`.
    pub base_url: Option<String>,
}

impl ServerConfig {
    /// ## Summary
    /// Returns the address the server is reachable at when no base URL is configured.
    #[must_use]
    pub fn serve_origin(&self) -> String {
        format!("http://{}:{}/", self.host, self.port)
    }

    /// ## Summary
    /// Returns the public base URL, always ending in `/`.
    #[must_use]
    pub fn base_url(&self) -> String {
        match &self.base_url {
            Some(base) if base.ends_with('/') => base.clone(),
            Some(base) => format!("{base}/"),
            None => self.serve_origin(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Directory the base URL's path hierarchy is mapped onto.
    pub root: PathBuf,
}

/// What to do when no ACL document exists anywhere up the hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackPolicy {
    /// Nobody gets access.
    DenyAll,
    /// The configured owners get every mode, everyone else is denied.
    OwnerOnly,
    /// Owners get every mode, everyone may read.
    PublicRead,
}

/// Whether an `Append` grant is enough to replace a document wholesale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppendPolicy {
    /// Replacing a document requires `Write`.
    AppendOnly,
    /// `PUT` is satisfied by `Append`.
    PermitsReplace,
}

/// How entries with an origin restriction treat requests without `Origin`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OriginPolicy {
    /// A missing `Origin` header matches no restricted entry.
    Strict,
    /// A missing `Origin` header is treated as a trusted, non-browser client.
    TrustMissing,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AclConfig {
    pub suffix: String,
    pub fallback: FallbackPolicy,
    #[serde(default)]
    pub owners: Vec<String>,
    pub append_policy: AppendPolicy,
    pub origin_policy: OriginPolicy,
    #[serde(default)]
    pub trusted_origins: Vec<String>,
    /// Upper bound on the number of containers visited while locating an ACL.
    pub max_depth: usize,
}

impl Default for AclConfig {
    fn default() -> Self {
        Self {
            suffix: DEFAULT_ACL_SUFFIX.to_string(),
            fallback: FallbackPolicy::OwnerOnly,
            owners: Vec::new(),
            append_policy: AppendPolicy::AppendOnly,
            origin_policy: OriginPolicy::Strict,
            trusted_origins: Vec::new(),
            max_depth: 64,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct FetchConfig {
    pub timeout_ms: u64,
    pub cache_ttl_secs: u64,
    /// Most entries each cache (profiles, group documents) holds.
    pub cache_capacity: u64,
    /// Largest profile or group document accepted, in bytes.
    pub max_document_bytes: u64,
    pub user_agent: String,
}

impl FetchConfig {
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    #[must_use]
    pub const fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 5000,
            cache_ttl_secs: 300,
            cache_capacity: 10_000,
            max_document_bytes: 1024 * 1024,
            user_agent: concat!("webacl/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Settings {
    /// ## Summary
    /// Loads configuration from defaults, `config.toml` and environment variables.
    /// Environment variables (`WEBACL_SECTION__KEY`) take precedence over the file.
    ///
    /// ## Errors
    /// Returns an error if building the configuration or deserializing it fails.
    pub fn load() -> Result<Self> {
        let acl = AclConfig::default();
        let fetch = FetchConfig::default();

        Ok(Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8443)?
            .set_default("storage.root", "./data")?
            .set_default("auth.method", "proxy_certificate")?
            .set_default("auth.certificate_header", "X-SSL-Client-Cert")?
            .set_default("auth.realm", "webacl")?
            .set_default("acl.suffix", acl.suffix)?
            .set_default("acl.fallback", "owner_only")?
            .set_default("acl.append_policy", "append_only")?
            .set_default("acl.origin_policy", "strict")?
            .set_default("acl.max_depth", 64)?
            .set_default("fetch.timeout_ms", fetch.timeout_ms)?
            .set_default("fetch.cache_ttl_secs", fetch.cache_ttl_secs)?
            .set_default("fetch.cache_capacity", fetch.cache_capacity)?
            .set_default("fetch.user_agent", fetch.user_agent)?
            .set_default("fetch.max_document_bytes", fetch.max_document_bytes)?
            .set_default("logging.level", "info")?
            // TOML file
            .add_source(config::File::with_name("config.toml").required(false))
            // Environment
            .add_source(
                config::Environment::with_prefix("WEBACL")
                    .prefix_separator("_")
                    .separator("__")
                    .ignore_empty(true)
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("auth.trusted_proxies")
                    .with_list_parse_key("acl.owners")
                    .with_list_parse_key("acl.trusted_origins"),
            )
            .build()?
            .try_deserialize::<Settings>()?)
    }

    /// ## Summary
    /// Builds settings for an embedded store rooted at `root` and served at `base_url`,
    /// with every other value at its default.
    #[must_use]
    pub fn for_store(base_url: &str, root: impl Into<PathBuf>) -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8443,
                base_url: Some(base_url.to_string()),
            },
            storage: StorageConfig { root: root.into() },
            auth: AuthConfig {
                method: AuthMethod::ProxyCertificate,
                certificate_header: "X-SSL-Client-Cert".to_string(),
                realm: "webacl".to_string(),
                trusted_proxies: default_trusted_proxies(),
            },
            acl: AclConfig::default(),
            fetch: FetchConfig::default(),
            logging: LoggingConfig {
                level: "info".to_string(),
            },
        }
    }
}

/// ## Summary
/// Loads configuration from environment variables and `.env` file.
///
/// ## Errors
/// Returns an error if loading or deserializing the configuration fails.
pub fn load_config() -> Result<Settings> {
    dotenvy::dotenv().ok();

    Settings::load()
}
