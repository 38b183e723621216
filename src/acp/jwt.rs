//! JWT authentication config

use std::collections::BTreeMap;

use crate::models::hub;

/// Runtime configuration of the JWT handler
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    pub signing_secret: String,
    pub signing_secret_base64_encoded: bool,
    pub public_key: String,
    /// Path to a JWKS file, or its inline content
    pub jwks_file: String,
    pub jwks_url: String,
    pub strip_authorization_header: bool,
    pub forward_headers: BTreeMap<String, String>,
    pub token_query_key: String,
    pub claims: String,
}

impl From<&hub::AccessControlPolicyJwt> for Config {
    fn from(jwt: &hub::AccessControlPolicyJwt) -> Self {
        Self {
            signing_secret: jwt.signing_secret.clone(),
            signing_secret_base64_encoded: jwt.signing_secret_base64_encoded,
            public_key: jwt.public_key.clone(),
            jwks_file: jwt.jwks_file.clone(),
            jwks_url: jwt.jwks_url.clone(),
            strip_authorization_header: jwt.strip_authorization_header,
            forward_headers: jwt.forward_headers.clone(),
            token_query_key: jwt.token_query_key.clone(),
            claims: jwt.claims.clone(),
        }
    }
}
