//! AccessControlPolicy resource to snapshot conversion

use std::collections::BTreeMap;

use super::cluster::{
    AccessControlPolicy, AccessControlPolicyBasicAuth, AccessControlPolicyDigestAuth,
    AccessControlPolicyJwt, AccessControlPolicyMethod, AccessControlPolicyOidc,
};
use super::key::object_key;
use crate::models::hub;

/// Build the policy map.
///
/// Policies without any authentication block are left out of the snapshot.
pub(crate) fn build_access_control_policies(
    cluster_id: &str,
    policies: &[hub::AccessControlPolicy],
) -> BTreeMap<String, AccessControlPolicy> {
    let mut result = BTreeMap::new();

    for policy in policies {
        let name = policy.metadata.name.clone().unwrap_or_default();
        let namespace = policy.metadata.namespace.clone().unwrap_or_default();

        let Some(method) = method_of(&policy.spec) else {
            tracing::warn!(
                name = %name,
                namespace = %namespace,
                "Access control policy has no supported authentication method, skipping"
            );
            continue;
        };

        result.insert(
            object_key(&name, &namespace),
            AccessControlPolicy {
                name,
                namespace,
                cluster_id: cluster_id.to_string(),
                method,
            },
        );
    }

    result
}

/// Method of the first populated block, in declaration order
fn method_of(spec: &hub::AccessControlPolicySpec) -> Option<AccessControlPolicyMethod> {
    if let Some(jwt) = &spec.jwt {
        return Some(AccessControlPolicyMethod::Jwt {
            jwt: AccessControlPolicyJwt {
                signing_secret: jwt.signing_secret.clone(),
                signing_secret_base64_encoded: jwt.signing_secret_base64_encoded,
                public_key: jwt.public_key.clone(),
                jwks_file: jwt.jwks_file.clone(),
                jwks_url: jwt.jwks_url.clone(),
                strip_authorization_header: jwt.strip_authorization_header,
                forward_headers: jwt.forward_headers.clone(),
                token_query_key: jwt.token_query_key.clone(),
                claims: jwt.claims.clone(),
            },
        });
    }

    if let Some(basic) = &spec.basic_auth {
        return Some(AccessControlPolicyMethod::BasicAuth {
            basic_auth: AccessControlPolicyBasicAuth {
                users: basic.users.clone(),
                realm: basic.realm.clone(),
                strip_authorization_header: basic.strip_authorization_header,
                forward_username_header: basic.forward_username_header.clone(),
            },
        });
    }

    if let Some(digest) = &spec.digest_auth {
        return Some(AccessControlPolicyMethod::DigestAuth {
            digest_auth: AccessControlPolicyDigestAuth {
                users: digest.users.clone(),
                realm: digest.realm.clone(),
                strip_authorization_header: digest.strip_authorization_header,
                forward_username_header: digest.forward_username_header.clone(),
            },
        });
    }

    spec.oidc.as_ref().map(|oidc| AccessControlPolicyMethod::Oidc {
        oidc: AccessControlPolicyOidc {
            issuer: oidc.issuer.clone(),
            client_id: oidc.client_id.clone(),
            redirect_url: oidc.redirect_url.clone(),
            logout_url: oidc.logout_url.clone(),
            scopes: oidc.scopes.clone(),
            forward_headers: oidc.forward_headers.clone(),
            claims: oidc.claims.clone(),
        },
    })
}
