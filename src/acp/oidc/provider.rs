//! OIDC provider discovery

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use super::{Config, Tls, ValidationError};

const DISCOVERY_PATH: &str = "/.well-known/openid-configuration";
const DISCOVERY_TIMEOUT: Duration = Duration::from_secs(10);

/// Provider metadata from the discovery document
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ProviderMetadata {
    pub issuer: String,
    pub authorization_endpoint: String,
    pub token_endpoint: String,
    pub jwks_uri: String,
    #[serde(default)]
    pub userinfo_endpoint: Option<String>,
    #[serde(default)]
    pub end_session_endpoint: Option<String>,
    #[serde(default)]
    pub scopes_supported: Vec<String>,
    #[serde(default)]
    pub id_token_signing_alg_values_supported: Vec<String>,
}

/// Failure to discover a provider
#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    #[error("invalid issuer URL")]
    InvalidIssuer(#[from] url::ParseError),

    #[error("invalid CA bundle")]
    InvalidCaBundle(#[source] reqwest::Error),

    #[error("failed to build HTTP client")]
    Client(#[source] reqwest::Error),

    #[error("discovery request failed")]
    Request(#[source] reqwest::Error),

    #[error("discovery endpoint returned {0}")]
    Status(reqwest::StatusCode),

    #[error("invalid discovery document")]
    Document(#[source] reqwest::Error),

    #[error(
        "issuer did not match the issuer returned by provider, expected {expected:?} got {actual:?}"
    )]
    IssuerMismatch { expected: String, actual: String },
}

/// Failure to build a provider from a config
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("invalid OIDC configuration: {0}")]
    Validation(#[from] ValidationError),

    #[error("unable to create provider for {issuer}")]
    Discovery {
        issuer: String,
        #[source]
        source: DiscoveryError,
    },
}

/// Fetches provider metadata for an issuer
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProviderDiscovery: Send + Sync {
    async fn discover(&self, issuer: &str) -> Result<ProviderMetadata, DiscoveryError>;
}

/// Discovery over HTTP through `/.well-known/openid-configuration`
pub struct HttpDiscovery {
    client: reqwest::Client,
}

impl HttpDiscovery {
    pub fn new(tls: Option<&Tls>) -> Result<Self, DiscoveryError> {
        let mut builder = reqwest::Client::builder().timeout(DISCOVERY_TIMEOUT);

        if let Some(tls) = tls {
            if !tls.ca_bundle.is_empty() {
                let certificates = reqwest::Certificate::from_pem_bundle(tls.ca_bundle.as_bytes())
                    .map_err(DiscoveryError::InvalidCaBundle)?;
                for certificate in certificates {
                    builder = builder.add_root_certificate(certificate);
                }
            }
            if tls.insecure_skip_verify {
                tracing::warn!("TLS verification disabled for OIDC provider discovery");
                builder = builder.danger_accept_invalid_certs(true);
            }
        }

        let client = builder.build().map_err(DiscoveryError::Client)?;
        Ok(Self { client })
    }
}

#[async_trait]
impl ProviderDiscovery for HttpDiscovery {
    async fn discover(&self, issuer: &str) -> Result<ProviderMetadata, DiscoveryError> {
        let endpoint = url::Url::parse(&format!(
            "{}{}",
            issuer.trim_end_matches('/'),
            DISCOVERY_PATH
        ))?;

        tracing::debug!(endpoint = %endpoint, "Discovering OIDC provider");

        let resp = self
            .client
            .get(endpoint)
            .send()
            .await
            .map_err(DiscoveryError::Request)?;

        if !resp.status().is_success() {
            return Err(DiscoveryError::Status(resp.status()));
        }

        let metadata: ProviderMetadata = resp.json().await.map_err(DiscoveryError::Document)?;
        check_issuer(issuer, metadata)
    }
}

fn check_issuer(
    expected: &str,
    metadata: ProviderMetadata,
) -> Result<ProviderMetadata, DiscoveryError> {
    if metadata.issuer != expected {
        return Err(DiscoveryError::IssuerMismatch {
            expected: expected.to_string(),
            actual: metadata.issuer,
        });
    }
    Ok(metadata)
}

/// Validate a config and discover its provider.
///
/// Local configuration problems and remote discovery failures surface as
/// distinct `ProviderError` variants.
pub async fn build_provider(
    discovery: &dyn ProviderDiscovery,
    config: &Config,
) -> Result<ProviderMetadata, ProviderError> {
    config.validate()?;

    discovery
        .discover(&config.issuer)
        .await
        .map_err(|source| ProviderError::Discovery {
            issuer: config.issuer.clone(),
            source,
        })
}
