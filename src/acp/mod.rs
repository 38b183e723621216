//! Access control policies
//!
//! Runtime configs for each authentication method and the resolver building
//! them from AccessControlPolicy resources.

pub mod basicauth;
pub mod digestauth;
pub mod jwt;
pub mod oidc;
mod resolver;
mod secret;

pub use resolver::{PolicyResolver, ResolveError, DEFAULT_SECRET_TIMEOUT};
pub use secret::{SecretData, SecretStore, SecretStoreError};

/// Resolved configuration of an access control policy
#[derive(Debug, Clone, PartialEq)]
pub enum Config {
    Jwt(jwt::Config),
    BasicAuth(basicauth::Config),
    DigestAuth(digestauth::Config),
    Oidc(oidc::Config),
    /// No supported authentication method was set
    Empty,
}

impl Config {
    /// Method name, `None` for an empty config
    pub fn method(&self) -> Option<&'static str> {
        match self {
            Config::Jwt(_) => Some("jwt"),
            Config::BasicAuth(_) => Some("basicAuth"),
            Config::DigestAuth(_) => Some("digestAuth"),
            Config::Oidc(_) => Some("oidc"),
            Config::Empty => None,
        }
    }
}
