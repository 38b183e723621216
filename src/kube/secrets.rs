//! Secret lookup against the API server

use async_trait::async_trait;
use k8s_openapi::api::core::v1::Secret;
use kube::{Api, Client};

use crate::acp::{SecretData, SecretStore, SecretStoreError};

/// `SecretStore` reading core/v1 Secrets
#[derive(Clone)]
pub struct KubeSecretStore {
    client: Client,
}

impl KubeSecretStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SecretStore for KubeSecretStore {
    async fn get(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<SecretData>, SecretStoreError> {
        let api: Api<Secret> = Api::namespaced(self.client.clone(), namespace);

        let Some(secret) = api.get_opt(name).await? else {
            return Ok(None);
        };

        Ok(Some(
            secret
                .data
                .unwrap_or_default()
                .into_iter()
                .map(|(key, value)| (key, value.0))
                .collect(),
        ))
    }
}
