//! Policy resolution
//!
//! Turns an AccessControlPolicy resource into the runtime config of its
//! authentication handler, reading OIDC credentials from the secret store.

use futures::future::join_all;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use super::secret::{SecretData, SecretStore, SecretStoreError};
use super::{basicauth, digestauth, jwt, oidc, Config};
use crate::models::hub;
use crate::topology::object_key;

/// Default deadline for one secret fetch
pub const DEFAULT_SECRET_TIMEOUT: Duration = Duration::from_secs(10);

const CLIENT_SECRET_FIELD: &str = "clientSecret";
const SESSION_KEY_FIELD: &str = "sessionKey";
const STATE_COOKIE_KEY_FIELD: &str = "stateCookieKey";

/// Failure to resolve a policy
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("failed to get secret {namespace}/{name}")]
    SecretStore {
        namespace: String,
        name: String,
        #[source]
        source: SecretStoreError,
    },

    #[error("secret {namespace}/{name} is missing field {field}")]
    MissingSecretField {
        namespace: String,
        name: String,
        field: &'static str,
    },

    #[error("secret {namespace}/{name} field {field} is not valid UTF-8")]
    InvalidSecretField {
        namespace: String,
        name: String,
        field: &'static str,
        #[source]
        source: std::string::FromUtf8Error,
    },

    #[error("timed out after {timeout:?} getting secret {namespace}/{name}")]
    SecretTimeout {
        namespace: String,
        name: String,
        timeout: Duration,
    },
}

/// OIDC credentials held in a secret
struct OidcSecret {
    client_secret: String,
    session_key: String,
    state_cookie_key: String,
}

impl OidcSecret {
    fn from_data(namespace: &str, name: &str, data: &SecretData) -> Result<Self, ResolveError> {
        // Key material is used as-is, never re-encoded.
        let read = |field: &'static str| {
            let value = data
                .get(field)
                .ok_or_else(|| ResolveError::MissingSecretField {
                    namespace: namespace.to_string(),
                    name: name.to_string(),
                    field,
                })?;
            String::from_utf8(value.clone()).map_err(|source| ResolveError::InvalidSecretField {
                namespace: namespace.to_string(),
                name: name.to_string(),
                field,
                source,
            })
        };

        Ok(Self {
            client_secret: read(CLIENT_SECRET_FIELD)?,
            session_key: read(SESSION_KEY_FIELD)?,
            state_cookie_key: read(STATE_COOKIE_KEY_FIELD)?,
        })
    }
}

/// Resolves policies into runtime configs
pub struct PolicyResolver {
    store: Arc<dyn SecretStore>,
    default_namespace: String,
    secret_timeout: Duration,
}

impl PolicyResolver {
    /// `default_namespace` is used for secret references without a namespace.
    pub fn new(store: Arc<dyn SecretStore>, default_namespace: impl Into<String>) -> Self {
        Self {
            store,
            default_namespace: default_namespace.into(),
            secret_timeout: DEFAULT_SECRET_TIMEOUT,
        }
    }

    pub fn with_secret_timeout(mut self, timeout: Duration) -> Self {
        self.secret_timeout = timeout;
        self
    }

    /// Resolve one policy.
    ///
    /// The first populated block decides the method. A policy without any
    /// block resolves to `Config::Empty`.
    pub async fn resolve(&self, policy: &hub::AccessControlPolicy) -> Result<Config, ResolveError> {
        let spec = &policy.spec;

        if let Some(jwt) = &spec.jwt {
            return Ok(Config::Jwt(jwt::Config::from(jwt)));
        }
        if let Some(basic) = &spec.basic_auth {
            return Ok(Config::BasicAuth(basicauth::Config::from(basic)));
        }
        if let Some(digest) = &spec.digest_auth {
            return Ok(Config::DigestAuth(digestauth::Config::from(digest)));
        }
        if let Some(oidc) = &spec.oidc {
            return Ok(Config::Oidc(self.resolve_oidc(oidc).await?));
        }

        Ok(Config::Empty)
    }

    /// Resolve policies concurrently, keyed by `name@namespace`.
    pub async fn resolve_all(
        &self,
        policies: &[hub::AccessControlPolicy],
    ) -> BTreeMap<String, Result<Config, ResolveError>> {
        let resolved = join_all(policies.iter().map(|policy| async move {
            let key = object_key(
                policy.metadata.name.as_deref().unwrap_or_default(),
                policy.metadata.namespace.as_deref().unwrap_or_default(),
            );
            let result = self.resolve(policy).await;
            if let Err(e) = &result {
                tracing::warn!(
                    policy = %key,
                    error = %e,
                    "Failed to resolve access control policy"
                );
            }
            (key, result)
        }))
        .await;

        resolved.into_iter().collect()
    }

    async fn resolve_oidc(
        &self,
        spec: &hub::AccessControlPolicyOidc,
    ) -> Result<oidc::Config, ResolveError> {
        let mut config = oidc::Config::from(spec);

        if let Some(reference) = spec.secret.as_ref().filter(|r| !r.name.is_empty()) {
            let namespace = reference
                .namespace
                .as_deref()
                .filter(|ns| !ns.is_empty())
                .unwrap_or(self.default_namespace.as_str());

            match self.fetch_secret(namespace, &reference.name).await? {
                Some(data) => {
                    let secret = OidcSecret::from_data(namespace, &reference.name, &data)?;
                    config.client_secret = secret.client_secret;
                    config.session.secret = secret.session_key;
                    config.state_cookie.secret = secret.state_cookie_key;
                }
                None => {
                    tracing::debug!(
                        namespace = %namespace,
                        name = %reference.name,
                        "OIDC secret not found yet, using the policy values"
                    );
                }
            }
        }

        Ok(config.with_defaults())
    }

    async fn fetch_secret(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<SecretData>, ResolveError> {
        tokio::time::timeout(self.secret_timeout, self.store.get(namespace, name))
            .await
            .map_err(|_| ResolveError::SecretTimeout {
                namespace: namespace.to_string(),
                name: name.to_string(),
                timeout: self.secret_timeout,
            })?
            .map_err(|source| ResolveError::SecretStore {
                namespace: namespace.to_string(),
                name: name.to_string(),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Store answering from a fixed map and recording lookups
    #[derive(Default)]
    struct MapStore {
        secrets: BTreeMap<(String, String), SecretData>,
        lookups: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl SecretStore for MapStore {
        async fn get(
            &self,
            namespace: &str,
            name: &str,
        ) -> Result<Option<SecretData>, SecretStoreError> {
            self.lookups
                .lock()
                .unwrap()
                .push((namespace.to_string(), name.to_string()));
            Ok(self
                .secrets
                .get(&(namespace.to_string(), name.to_string()))
                .cloned())
        }
    }

    fn oidc_policy(secret: Option<hub::SecretReference>) -> hub::AccessControlPolicy {
        let mut policy = hub::AccessControlPolicy::new(
            "sso",
            hub::AccessControlPolicySpec {
                oidc: Some(hub::AccessControlPolicyOidc {
                    issuer: "https://issuer.example.com".to_string(),
                    client_id: "client".to_string(),
                    client_secret: "inline".to_string(),
                    secret,
                    ..Default::default()
                }),
                ..Default::default()
            },
        );
        policy.metadata.namespace = Some("apps".to_string());
        policy
    }

    fn reference(name: &str) -> Option<hub::SecretReference> {
        Some(hub::SecretReference {
            name: name.to_string(),
            namespace: None,
        })
    }

    #[tokio::test]
    async fn test_secret_namespace_falls_back_to_default() {
        let store = Arc::new(MapStore::default());
        let resolver = PolicyResolver::new(store.clone(), "hub-system");

        resolver.resolve(&oidc_policy(reference("oidc"))).await.unwrap();

        assert_eq!(
            *store.lookups.lock().unwrap(),
            vec![("hub-system".to_string(), "oidc".to_string())]
        );
    }

    #[tokio::test]
    async fn test_empty_secret_name_is_not_looked_up() {
        let store = Arc::new(MapStore::default());
        let resolver = PolicyResolver::new(store.clone(), "default");

        resolver.resolve(&oidc_policy(reference(""))).await.unwrap();

        assert!(store.lookups.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_resolve_all_keys_by_object_key() {
        let resolver = PolicyResolver::new(Arc::new(MapStore::default()), "default");
        let mut empty =
            hub::AccessControlPolicy::new("empty", hub::AccessControlPolicySpec::default());
        empty.metadata.namespace = Some("apps".to_string());

        let resolved = resolver.resolve_all(&[oidc_policy(None), empty]).await;

        assert!(matches!(resolved["sso@apps"], Ok(Config::Oidc(_))));
        assert!(matches!(resolved["empty@apps"], Ok(Config::Empty)));
    }

    #[test]
    fn test_secret_fields_are_decoded_strictly() {
        let mut data = SecretData::new();
        data.insert(CLIENT_SECRET_FIELD.to_string(), vec![0xff, 0xfe]);
        data.insert(SESSION_KEY_FIELD.to_string(), b"session".to_vec());
        data.insert(STATE_COOKIE_KEY_FIELD.to_string(), b"state".to_vec());

        let Err(err) = OidcSecret::from_data("hub", "oidc", &data) else {
            panic!("invalid UTF-8 was accepted");
        };

        assert!(matches!(
            err,
            ResolveError::InvalidSecretField {
                field: CLIENT_SECRET_FIELD,
                ..
            }
        ));
    }
}
