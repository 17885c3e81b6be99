//! `WebID-TLS`: turning a client certificate into a trusted agent.
//!
//! A certificate names candidate `WebIDs` in its `subjectAltName` URIs. A
//! candidate is accepted when its profile document publishes the
//! certificate's RSA public key. Every failure degrades to
//! [`Agent::Anonymous`].

use std::sync::Arc;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use moka::future::Cache;
use rsa::RsaPublicKey;
use rsa::pkcs8::DecodePublicKey;
use rsa::traits::PublicKeyParts;
use sha2::{Digest, Sha256};
use url::Url;
use webacl_core::constants::cert;
use webacl_rdf::{Graph, Term};
use x509_cert::Certificate;
use x509_cert::der::{Decode, Encode};
use x509_cert::ext::pkix::SubjectAltName;
use x509_cert::ext::pkix::name::GeneralName;

use super::subject::Agent;
use crate::error::{ServiceError, ServiceResult};
use crate::fetch::{Dereferencer, document_of};

/// An RSA public key as big-endian magnitudes without leading zero bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RsaKey {
    pub modulus: Vec<u8>,
    pub exponent: Vec<u8>,
}

impl RsaKey {
    #[must_use]
    pub fn new(modulus: &[u8], exponent: &[u8]) -> Self {
        Self {
            modulus: strip_leading_zeros(modulus).to_vec(),
            exponent: strip_leading_zeros(exponent).to_vec(),
        }
    }

    /// ## Summary
    /// Reads a key as published in a profile: hexadecimal modulus (case,
    /// whitespace and leading zeros are ignored) and decimal exponent.
    ///
    /// ## Errors
    /// Returns `InvalidCertificate` if either value is malformed.
    pub fn from_profile(modulus_hex: &str, exponent: &str) -> ServiceResult<Self> {
        let mut digits: String = modulus_hex
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        if digits.len() % 2 == 1 {
            digits.insert(0, '0');
        }
        let modulus = hex::decode(&digits)
            .map_err(|e| ServiceError::InvalidCertificate(format!("modulus: {e}")))?;

        let exponent: u64 = exponent
            .trim()
            .parse()
            .map_err(|e| ServiceError::InvalidCertificate(format!("exponent: {e}")))?;

        Ok(Self::new(&modulus, &exponent.to_be_bytes()))
    }

    fn from_public_key(key: &RsaPublicKey) -> Self {
        Self::new(&key.n().to_bytes_be(), &key.e().to_bytes_be())
    }
}

fn strip_leading_zeros(bytes: &[u8]) -> &[u8] {
    let start = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len());
    &bytes[start..]
}

/// What a certificate claims, before any profile has been consulted.
#[derive(Debug, Clone)]
pub struct CertificateClaims {
    /// `subjectAltName` URIs, in certificate order.
    pub web_ids: Vec<Url>,
    /// `None` for non-RSA keys.
    pub key: Option<RsaKey>,
    /// Hex SHA-256 of the DER encoding.
    pub fingerprint: String,
}

impl CertificateClaims {
    /// ## Summary
    /// Parses a PEM certificate, or a bare base64 DER one.
    ///
    /// Whitespace inside the base64 body is ignored, so certificates whose
    /// line breaks were flattened by a proxy still decode.
    ///
    /// ## Errors
    /// Returns `InvalidCertificate` if the input is not a decodable X.509
    /// certificate.
    pub fn parse(input: &str) -> ServiceResult<Self> {
        let der = decode_certificate(input)?;
        let certificate = Certificate::from_der(&der)
            .map_err(|e| ServiceError::InvalidCertificate(e.to_string()))?;
        let tbs = &certificate.tbs_certificate;

        let web_ids = tbs
            .get::<SubjectAltName>()
            .map_err(|e| ServiceError::InvalidCertificate(format!("subjectAltName: {e}")))?
            .map(|(_, SubjectAltName(names))| {
                names
                    .into_iter()
                    .filter_map(|name| match name {
                        GeneralName::UniformResourceIdentifier(uri) => {
                            Url::parse(AsRef::<str>::as_ref(&uri)).ok()
                        }
                        _ => None,
                    })
                    .collect()
            })
            .unwrap_or_default();

        let spki = tbs
            .subject_public_key_info
            .to_der()
            .map_err(|e| ServiceError::InvalidCertificate(format!("public key: {e}")))?;
        let key = RsaPublicKey::from_public_key_der(&spki)
            .ok()
            .map(|key| RsaKey::from_public_key(&key));

        Ok(Self {
            web_ids,
            key,
            fingerprint: hex::encode(Sha256::digest(&der)),
        })
    }
}

fn decode_certificate(input: &str) -> ServiceResult<Vec<u8>> {
    const BEGIN: &str = "-----BEGIN CERTIFICATE-----";
    const END: &str = "-----END CERTIFICATE-----";

    let body = match input.find(BEGIN) {
        Some(start) => {
            let rest = &input[start + BEGIN.len()..];
            let end = rest
                .find(END)
                .ok_or_else(|| ServiceError::InvalidCertificate("unterminated PEM".into()))?;
            &rest[..end]
        }
        None => input,
    };

    let base64: String = body.chars().filter(|c| !c.is_whitespace()).collect();
    if base64.is_empty() {
        return Err(ServiceError::InvalidCertificate("empty certificate".into()));
    }
    STANDARD
        .decode(base64)
        .map_err(|e| ServiceError::InvalidCertificate(format!("base64: {e}")))
}

/// Keys a profile associates with `web_id`, through `cert:key` or the
/// older inverse `cert:identity`.
fn profile_keys(profile: &Graph, web_id: &Url) -> Vec<RsaKey> {
    let me = Term::iri(web_id.as_str());
    profile
        .objects(&me, cert::KEY)
        .chain(profile.subjects(cert::IDENTITY, &me))
        .filter_map(|key| {
            let modulus = profile.object(key, cert::MODULUS)?.lexical();
            let exponent = profile.object(key, cert::EXPONENT)?.lexical();
            match RsaKey::from_profile(modulus, exponent) {
                Ok(key) => Some(key),
                Err(error) => {
                    tracing::debug!(%web_id, %error, "Skipping malformed profile key");
                    None
                }
            }
        })
        .collect()
}

/// Verifies certificates against `WebID` profiles.
pub struct WebIdVerifier {
    dereferencer: Arc<dyn Dereferencer>,
    /// Verified agents by certificate fingerprint. Failures are not cached.
    cache: Option<Cache<String, Agent>>,
}

impl WebIdVerifier {
    /// Remembers up to `capacity` verifications for `cache_ttl`; a zero TTL
    /// verifies every request.
    #[must_use]
    pub fn new(dereferencer: Arc<dyn Dereferencer>, cache_ttl: Duration, capacity: u64) -> Self {
        let cache = (!cache_ttl.is_zero()).then(|| {
            Cache::builder()
                .max_capacity(capacity)
                .time_to_live(cache_ttl)
                .support_invalidation_closures()
                .build()
        });
        Self {
            dereferencer,
            cache,
        }
    }

    /// ## Summary
    /// Resolves the agent a certificate authenticates.
    ///
    /// Candidates are tried in certificate order; the first whose profile
    /// lists the certificate key wins. Unparsable certificates, non-RSA keys,
    /// unreachable or unparsable profiles and key mismatches all yield
    /// `Anonymous`.
    #[tracing::instrument(skip_all)]
    pub async fn resolve(&self, certificate: &str) -> Agent {
        let claims = match CertificateClaims::parse(certificate) {
            Ok(claims) => claims,
            Err(error) => {
                tracing::warn!(%error, "Rejecting client certificate");
                return Agent::Anonymous;
            }
        };

        if let Some(cache) = &self.cache
            && let Some(agent) = cache.get(&claims.fingerprint).await
        {
            tracing::trace!(%agent, "Certificate verification cache hit");
            return agent;
        }

        let Some(key) = &claims.key else {
            tracing::debug!(fingerprint = %claims.fingerprint, "Certificate key is not RSA");
            return Agent::Anonymous;
        };

        for candidate in &claims.web_ids {
            if self.verify(candidate, key).await {
                tracing::debug!(web_id = %candidate, "WebID verified");
                let agent = Agent::WebId(candidate.clone());
                if let Some(cache) = &self.cache {
                    cache.insert(claims.fingerprint, agent.clone()).await;
                }
                return agent;
            }
        }

        tracing::debug!(
            candidates = claims.web_ids.len(),
            "No WebID candidate vouches for the certificate"
        );
        Agent::Anonymous
    }

    async fn verify(&self, candidate: &Url, key: &RsaKey) -> bool {
        let document = document_of(candidate);
        match self.dereferencer.dereference(&document).await {
            Ok(profile) => profile_keys(&profile, candidate).contains(key),
            Err(error) => {
                tracing::warn!(web_id = %candidate, %error, "Could not dereference WebID profile");
                false
            }
        }
    }

    /// Forgets verifications backed by `document` after it was written.
    pub async fn invalidate(&self, document: &Url) {
        let Some(cache) = &self.cache else {
            return;
        };
        let document = document_of(document);
        let stale = cache.invalidate_entries_if(move |_, agent| {
            agent.web_id().is_some_and(|id| document_of(id) == document)
        });
        if let Err(error) = stale {
            tracing::warn!(?error, "Clearing every cached verification");
            cache.invalidate_all();
        }
    }
}
