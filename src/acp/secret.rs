//! Secret lookup seam

use async_trait::async_trait;
use std::collections::BTreeMap;

/// Raw fields of a secret
pub type SecretData = BTreeMap<String, Vec<u8>>;

/// Failure to read a secret, other than it not existing
#[derive(Debug, thiserror::Error)]
pub enum SecretStoreError {
    #[error(transparent)]
    Kube(#[from] kube::Error),

    #[error("secret store unavailable: {0}")]
    Unavailable(String),
}

/// Keyed lookup of namespaced secrets
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Fetch a secret, `Ok(None)` when it does not exist
    async fn get(&self, namespace: &str, name: &str)
        -> Result<Option<SecretData>, SecretStoreError>;
}
