//! Hub custom resources (`hub.traefik.io/v1alpha1`)
//!
//! Access control policies and the API management resources. Field names
//! follow the CRD schema; every optional block stays an `Option` so a
//! missing block and an empty block remain distinguishable.

use k8s_openapi::apimachinery::pkg::apis::meta::v1::LabelSelector;
use kube::CustomResource;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Access control policy.
///
/// At most one authentication block is expected to be set. The API server
/// cannot enforce that, so consumers pick the first populated block in
/// declaration order.
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[kube(
    group = "hub.traefik.io",
    version = "v1alpha1",
    kind = "AccessControlPolicy",
    namespaced,
    schema = "disabled"
)]
#[serde(rename_all = "camelCase")]
pub struct AccessControlPolicySpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jwt: Option<AccessControlPolicyJwt>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub basic_auth: Option<AccessControlPolicyBasicAuth>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub digest_auth: Option<AccessControlPolicyDigestAuth>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oidc: Option<AccessControlPolicyOidc>,
}

/// JWT authentication settings
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AccessControlPolicyJwt {
    #[serde(default)]
    pub signing_secret: String,
    #[serde(default)]
    pub signing_secret_base64_encoded: bool,
    #[serde(default)]
    pub public_key: String,
    #[serde(default, rename = "jwksFile")]
    pub jwks_file: String,
    #[serde(default, rename = "jwksUrl")]
    pub jwks_url: String,
    #[serde(default)]
    pub strip_authorization_header: bool,
    #[serde(default)]
    pub forward_headers: BTreeMap<String, String>,
    #[serde(default)]
    pub token_query_key: String,
    #[serde(default)]
    pub claims: String,
}

/// HTTP basic authentication settings
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AccessControlPolicyBasicAuth {
    /// Users in htpasswd format, comma separated
    #[serde(default)]
    pub users: String,
    #[serde(default)]
    pub realm: String,
    #[serde(default)]
    pub strip_authorization_header: bool,
    #[serde(default)]
    pub forward_username_header: String,
}

/// HTTP digest authentication settings
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AccessControlPolicyDigestAuth {
    /// Users in htdigest format, comma separated
    #[serde(default)]
    pub users: String,
    #[serde(default)]
    pub realm: String,
    #[serde(default)]
    pub strip_authorization_header: bool,
    #[serde(default)]
    pub forward_username_header: String,
}

/// OpenID Connect settings
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AccessControlPolicyOidc {
    #[serde(default)]
    pub issuer: String,
    #[serde(default, rename = "clientId")]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tls: Option<OidcTls>,
    /// Secret holding `clientSecret`, `sessionKey` and `stateCookieKey`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret: Option<SecretReference>,

    #[serde(default, rename = "redirectUrl")]
    pub redirect_url: String,
    #[serde(default, rename = "logoutUrl")]
    pub logout_url: String,
    #[serde(default)]
    pub scopes: Vec<String>,
    #[serde(default)]
    pub auth_params: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_cookie: Option<StateCookie>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<Session>,

    #[serde(default)]
    pub forward_headers: BTreeMap<String, String>,
    #[serde(default)]
    pub claims: String,
}

/// TLS settings used to reach the OIDC provider
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OidcTls {
    #[serde(default)]
    pub ca_bundle: String,
    #[serde(default)]
    pub insecure_skip_verify: bool,
}

/// Reference to a Secret, namespace optional
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct SecretReference {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

/// OIDC state cookie settings
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StateCookie {
    #[serde(default)]
    pub secret: String,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub domain: String,
    #[serde(default)]
    pub same_site: String,
    #[serde(default)]
    pub secure: bool,
}

/// OIDC session cookie settings
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    #[serde(default)]
    pub secret: String,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub domain: String,
    #[serde(default)]
    pub same_site: String,
    #[serde(default)]
    pub secure: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh: Option<bool>,
}

/// An API exposed through the hub.
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[kube(
    group = "hub.traefik.io",
    version = "v1alpha1",
    kind = "API",
    root = "HubApi",
    namespaced,
    schema = "disabled"
)]
#[serde(rename_all = "camelCase")]
pub struct ApiSpec {
    #[serde(default)]
    pub path_prefix: String,
    pub service: ApiServiceRef,
}

/// Backend service of an API
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ApiServiceRef {
    pub name: String,
    #[serde(default)]
    pub port: ApiServicePort,
    #[serde(default, rename = "openApiSpec")]
    pub open_api_spec: OpenApiSpec,
}

/// Port of an API backend, by name or number
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct ApiServicePort {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub number: i32,
}

/// Location of an API's OpenAPI document
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct OpenApiSpec {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub url: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub path: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub protocol: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<ApiServicePort>,
}

/// A group of APIs selected by labels.
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[kube(
    group = "hub.traefik.io",
    version = "v1alpha1",
    kind = "APICollection",
    root = "ApiCollection",
    schema = "disabled"
)]
#[serde(rename_all = "camelCase")]
pub struct ApiCollectionSpec {
    #[serde(default)]
    pub path_prefix: String,
    #[serde(default)]
    pub api_selector: LabelSelector,
}

/// Grants groups access to APIs and collections.
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[kube(
    group = "hub.traefik.io",
    version = "v1alpha1",
    kind = "APIAccess",
    root = "ApiAccess",
    schema = "disabled"
)]
#[serde(rename_all = "camelCase")]
pub struct ApiAccessSpec {
    #[serde(default)]
    pub groups: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_selector: Option<LabelSelector>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_collection_selector: Option<LabelSelector>,
}

/// Developer portal served by a gateway.
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[kube(
    group = "hub.traefik.io",
    version = "v1alpha1",
    kind = "APIPortal",
    root = "ApiPortal",
    schema = "disabled"
)]
#[serde(rename_all = "camelCase")]
pub struct ApiPortalSpec {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, rename = "apiGateway")]
    pub api_gateway: String,
    #[serde(default)]
    pub custom_domains: Vec<String>,
}

/// Gateway exposing the APIs granted by a set of accesses.
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[kube(
    group = "hub.traefik.io",
    version = "v1alpha1",
    kind = "APIGateway",
    root = "ApiGateway",
    schema = "disabled"
)]
#[serde(rename_all = "camelCase")]
pub struct ApiGatewaySpec {
    #[serde(default, rename = "apiAccesses")]
    pub api_accesses: Vec<String>,
    #[serde(default)]
    pub custom_domains: Vec<String>,
}

fn is_zero(v: &i32) -> bool {
    *v == 0
}
