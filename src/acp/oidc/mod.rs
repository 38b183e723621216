//! OpenID Connect config
//!
//! Defaults are applied once with `apply_defaults`, then `validate` checks
//! the result without touching it.

mod provider;

pub use provider::{
    build_provider, DiscoveryError, HttpDiscovery, ProviderDiscovery, ProviderError,
    ProviderMetadata,
};

use std::collections::BTreeMap;

use crate::models::hub;

const DEFAULT_SCOPE: &str = "openid";
const DEFAULT_COOKIE_PATH: &str = "/";
const DEFAULT_SAME_SITE: &str = "lax";
const DEFAULT_REDIRECT_URL: &str = "/callback";

/// Accepted secret lengths, the AES-128, AES-192 and AES-256 key sizes
const SECRET_LENGTHS: [usize; 3] = [16, 24, 32];

/// Runtime configuration of the OIDC handler
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    pub issuer: String,
    pub client_id: String,
    pub client_secret: String,
    pub tls: Option<Tls>,

    pub redirect_url: String,
    pub logout_url: String,
    pub scopes: Vec<String>,
    pub auth_params: BTreeMap<String, String>,
    pub state_cookie: AuthStateCookie,
    pub session: AuthSession,

    /// Headers added to the request, populated from ID token claims
    pub forward_headers: BTreeMap<String, String>,
    /// Expression validating the ID token, e.g. ``Equals(`grp`, `admin`)``
    pub claims: String,
}

/// State cookie settings
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthStateCookie {
    pub secret: String,
    pub path: String,
    pub domain: String,
    pub same_site: String,
    pub secure: bool,
}

/// Session and session cookie settings
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthSession {
    pub secret: String,
    pub path: String,
    pub domain: String,
    pub same_site: String,
    pub secure: bool,
    /// `None` until defaults are applied
    pub refresh: Option<bool>,
}

/// TLS settings used to reach the provider
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tls {
    /// PEM encoded CA certificates
    pub ca_bundle: String,
    pub insecure_skip_verify: bool,
}

/// Configuration check failure, one per checked field
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("missing issuer")]
    MissingIssuer,

    #[error("missing client ID")]
    MissingClientId,

    #[error("missing client secret")]
    MissingClientSecret,

    #[error("missing session secret")]
    MissingSessionSecret,

    #[error("session secret must be 16, 24 or 32 characters long, got {0}")]
    InvalidSessionSecret(usize),

    #[error("missing state secret")]
    MissingStateSecret,

    #[error("state secret must be 16, 24 or 32 characters long, got {0}")]
    InvalidStateSecret(usize),

    #[error("missing redirect URL")]
    MissingRedirectUrl,
}

impl ValidationError {
    /// Name of the offending field
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::MissingIssuer => "issuer",
            ValidationError::MissingClientId => "clientId",
            ValidationError::MissingClientSecret => "clientSecret",
            ValidationError::MissingSessionSecret | ValidationError::InvalidSessionSecret(_) => {
                "session.secret"
            }
            ValidationError::MissingStateSecret | ValidationError::InvalidStateSecret(_) => {
                "stateCookie.secret"
            }
            ValidationError::MissingRedirectUrl => "redirectUrl",
        }
    }
}

impl Config {
    /// Fill every unset field that has a default. Applying it again is a
    /// no-op.
    pub fn apply_defaults(&mut self) {
        if self.scopes.is_empty() {
            self.scopes = vec![DEFAULT_SCOPE.to_string()];
        }

        set_if_empty(&mut self.state_cookie.path, DEFAULT_COOKIE_PATH);
        set_if_empty(&mut self.state_cookie.same_site, DEFAULT_SAME_SITE);

        set_if_empty(&mut self.session.path, DEFAULT_COOKIE_PATH);
        set_if_empty(&mut self.session.same_site, DEFAULT_SAME_SITE);
        self.session.refresh.get_or_insert(true);

        set_if_empty(&mut self.redirect_url, DEFAULT_REDIRECT_URL);
    }

    pub fn with_defaults(mut self) -> Self {
        self.apply_defaults();
        self
    }

    /// Check the configuration, first failure wins.
    ///
    /// Defaults are expected to be applied already.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.issuer.is_empty() {
            return Err(ValidationError::MissingIssuer);
        }
        if self.client_id.is_empty() {
            return Err(ValidationError::MissingClientId);
        }
        if self.client_secret.is_empty() {
            return Err(ValidationError::MissingClientSecret);
        }

        match self.session.secret.len() {
            0 => return Err(ValidationError::MissingSessionSecret),
            n if !SECRET_LENGTHS.contains(&n) => {
                return Err(ValidationError::InvalidSessionSecret(n));
            }
            _ => {}
        }

        match self.state_cookie.secret.len() {
            0 => return Err(ValidationError::MissingStateSecret),
            n if !SECRET_LENGTHS.contains(&n) => {
                return Err(ValidationError::InvalidStateSecret(n));
            }
            _ => {}
        }

        if self.redirect_url.is_empty() {
            return Err(ValidationError::MissingRedirectUrl);
        }

        Ok(())
    }
}

fn set_if_empty(field: &mut String, default: &str) {
    if field.is_empty() {
        *field = default.to_string();
    }
}

impl From<&hub::AccessControlPolicyOidc> for Config {
    fn from(oidc: &hub::AccessControlPolicyOidc) -> Self {
        let state_cookie = oidc
            .state_cookie
            .as_ref()
            .map(|c| AuthStateCookie {
                secret: c.secret.clone(),
                path: c.path.clone(),
                domain: c.domain.clone(),
                same_site: c.same_site.clone(),
                secure: c.secure,
            })
            .unwrap_or_default();

        let session = oidc
            .session
            .as_ref()
            .map(|s| AuthSession {
                secret: s.secret.clone(),
                path: s.path.clone(),
                domain: s.domain.clone(),
                same_site: s.same_site.clone(),
                secure: s.secure,
                refresh: s.refresh,
            })
            .unwrap_or_default();

        Self {
            issuer: oidc.issuer.clone(),
            client_id: oidc.client_id.clone(),
            client_secret: oidc.client_secret.clone(),
            tls: oidc.tls.as_ref().map(|tls| Tls {
                ca_bundle: tls.ca_bundle.clone(),
                insecure_skip_verify: tls.insecure_skip_verify,
            }),
            redirect_url: oidc.redirect_url.clone(),
            logout_url: oidc.logout_url.clone(),
            scopes: oidc.scopes.clone(),
            auth_params: oidc.auth_params.clone(),
            state_cookie,
            session,
            forward_headers: oidc.forward_headers.clone(),
            claims: oidc.claims.clone(),
        }
    }
}
