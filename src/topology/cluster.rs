//! Snapshot data model
//!
//! A `Cluster` is one consistent view of the resources of a cluster and the
//! relationships between them. It is built wholesale by a fetch pass and is
//! never mutated afterwards.

use k8s_openapi::api::networking::v1::{IngressBackend, IngressRule, IngressTLS};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::LabelSelector;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::selector;

/// Cluster snapshot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cluster {
    pub id: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub namespaces: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub apps: BTreeMap<String, App>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub ingresses: BTreeMap<String, Ingress>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub services: BTreeMap<String, Service>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub ingress_controllers: BTreeMap<String, IngressController>,
    #[serde(
        default,
        rename = "externalDNSes",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub external_dnses: BTreeMap<String, ExternalDns>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub access_control_policies: BTreeMap<String, AccessControlPolicy>,

    // API management, empty unless the feature is enabled
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub apis: BTreeMap<String, Api>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub api_collections: BTreeMap<String, ApiCollection>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub api_accesses: BTreeMap<String, ApiAccess>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub api_portals: BTreeMap<String, ApiPortal>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub api_gateways: BTreeMap<String, ApiGateway>,
}

/// Abstraction of Deployments, ReplicaSets, DaemonSets and StatefulSets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct App {
    pub name: String,
    pub kind: String,
    pub namespace: String,
    pub replicas: i32,
    pub ready_replicas: i32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,

    /// Pod template labels, only used for correlation
    #[serde(skip)]
    pub(crate) pod_labels: BTreeMap<String, String>,
    /// Pod template annotations, only used for controller detection
    #[serde(skip)]
    pub(crate) pod_annotations: BTreeMap<String, String>,
}

impl App {
    /// Labels set on the pods this workload creates
    pub fn pod_labels(&self) -> &BTreeMap<String, String> {
        &self.pod_labels
    }

    /// Annotations set on the pods this workload creates
    pub fn pod_annotations(&self) -> &BTreeMap<String, String> {
        &self.pod_annotations
    }

    pub fn with_pod_labels(mut self, labels: BTreeMap<String, String>) -> Self {
        self.pod_labels = labels;
        self
    }

    pub fn with_pod_annotations(mut self, annotations: BTreeMap<String, String>) -> Self {
        self.pod_annotations = annotations;
        self
    }
}

/// An App acting as the cluster's ingress controller
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngressController {
    #[serde(flatten)]
    pub app: App,

    #[serde(rename = "type")]
    pub controller_type: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ingress_classes: Vec<String>,
    #[serde(
        default,
        rename = "metricsURLs",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub metrics_urls: Vec<String>,
    #[serde(default, rename = "publicIPs", skip_serializing_if = "Vec::is_empty")]
    pub public_ips: Vec<String>,
}

/// Kubernetes Service and the Apps it selects
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub name: String,
    pub namespace: String,
    #[serde(rename = "type")]
    pub service_type: String,
    pub selector: BTreeMap<String, String>,
    /// Keys of the Apps whose pod labels satisfy the selector
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub apps: Vec<String>,

    /// Load balancer IPs or hostnames from the Service status
    #[serde(skip)]
    pub(crate) external_addresses: Vec<String>,
    #[serde(skip)]
    pub(crate) ports: Vec<i32>,
}

impl Service {
    pub fn external_addresses(&self) -> &[String] {
        &self.external_addresses
    }

    pub fn ports(&self) -> &[i32] {
        &self.ports
    }
}

/// Kubernetes Ingress
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ingress {
    pub name: String,
    pub namespace: String,
    pub cluster_id: String,
    /// Key of the ingress controller serving this Ingress, empty if unknown
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub controller: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tls: Vec<IngressTLS>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<IngressRule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_service: Option<IngressBackend>,
    /// Backend Service names, deduplicated in order of first reference
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub services: Vec<String>,
}

/// DNS record configured through ExternalDNS
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalDns {
    #[serde(rename = "dnsName")]
    pub dns_name: String,
    pub targets: Vec<String>,
    pub ttl: i64,
}

/// Access control policy as seen in the snapshot.
///
/// Secrets are never part of the snapshot: OIDC policies only carry their
/// public settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessControlPolicy {
    pub name: String,
    pub namespace: String,
    pub cluster_id: String,
    #[serde(flatten)]
    pub method: AccessControlPolicyMethod,
}

/// Authentication method of a policy with its settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method")]
pub enum AccessControlPolicyMethod {
    #[serde(rename = "jwt")]
    Jwt { jwt: AccessControlPolicyJwt },
    #[serde(rename = "basicAuth", rename_all = "camelCase")]
    BasicAuth {
        basic_auth: AccessControlPolicyBasicAuth,
    },
    #[serde(rename = "digestAuth", rename_all = "camelCase")]
    DigestAuth {
        digest_auth: AccessControlPolicyDigestAuth,
    },
    #[serde(rename = "oidc")]
    Oidc { oidc: AccessControlPolicyOidc },
}

impl AccessControlPolicyMethod {
    /// Wire name of the method
    pub fn name(&self) -> &'static str {
        match self {
            AccessControlPolicyMethod::Jwt { .. } => "jwt",
            AccessControlPolicyMethod::BasicAuth { .. } => "basicAuth",
            AccessControlPolicyMethod::DigestAuth { .. } => "digestAuth",
            AccessControlPolicyMethod::Oidc { .. } => "oidc",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessControlPolicyJwt {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub signing_secret: String,
    pub signing_secret_base64_encoded: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub public_key: String,
    #[serde(default, rename = "jwksFile", skip_serializing_if = "String::is_empty")]
    pub jwks_file: String,
    #[serde(default, rename = "jwksUrl", skip_serializing_if = "String::is_empty")]
    pub jwks_url: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub strip_authorization_header: bool,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub forward_headers: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub token_query_key: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub claims: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessControlPolicyBasicAuth {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub users: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub realm: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub strip_authorization_header: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub forward_username_header: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessControlPolicyDigestAuth {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub users: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub realm: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub strip_authorization_header: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub forward_username_header: String,
}

/// Public OIDC settings, the client secret and cookie keys are left out
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessControlPolicyOidc {
    pub issuer: String,
    #[serde(rename = "clientId")]
    pub client_id: String,
    #[serde(default, rename = "redirectUrl", skip_serializing_if = "String::is_empty")]
    pub redirect_url: String,
    #[serde(default, rename = "logoutUrl", skip_serializing_if = "String::is_empty")]
    pub logout_url: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scopes: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub forward_headers: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub claims: String,
}

/// API exposed through the hub
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Api {
    pub name: String,
    pub namespace: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
    pub path_prefix: String,
    pub service: ApiService,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiService {
    pub name: String,
    pub port: ApiServiceBackendPort,
    #[serde(rename = "openApiSpec")]
    pub open_api_spec: OpenApiSpec,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiServiceBackendPort {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default)]
    pub number: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OpenApiSpec {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub url: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub path: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub protocol: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<ApiServiceBackendPort>,
}

/// Group of APIs selected by labels
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiCollection {
    pub name: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
    pub path_prefix: String,
    pub api_selector: LabelSelector,
}

impl ApiCollection {
    pub fn matches_api(&self, api: &Api) -> bool {
        selector::matches(Some(&self.api_selector), &api.labels)
    }

    /// Keys of the APIs belonging to this collection
    pub fn resolve_apis(&self, apis: &BTreeMap<String, Api>) -> Vec<String> {
        apis.iter()
            .filter(|(_, api)| self.matches_api(api))
            .map(|(key, _)| key.clone())
            .collect()
    }
}

/// Access granted to groups over APIs and collections.
///
/// The selectors are kept as-is; matching happens on demand.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiAccess {
    pub name: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_selector: Option<LabelSelector>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_collection_selector: Option<LabelSelector>,
}

impl ApiAccess {
    pub fn matches_api(&self, api: &Api) -> bool {
        selector::matches(self.api_selector.as_ref(), &api.labels)
    }

    pub fn matches_collection(&self, collection: &ApiCollection) -> bool {
        selector::matches(self.api_collection_selector.as_ref(), &collection.labels)
    }

    /// Keys of the APIs selected directly by this access
    pub fn resolve_apis(&self, apis: &BTreeMap<String, Api>) -> Vec<String> {
        apis.iter()
            .filter(|(_, api)| self.matches_api(api))
            .map(|(key, _)| key.clone())
            .collect()
    }

    /// Keys of the collections selected by this access
    pub fn resolve_collections(
        &self,
        collections: &BTreeMap<String, ApiCollection>,
    ) -> Vec<String> {
        collections
            .iter()
            .filter(|(_, collection)| self.matches_collection(collection))
            .map(|(key, _)| key.clone())
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiPortal {
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub title: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(rename = "apiGateway")]
    pub api_gateway: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub custom_domains: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiGateway {
    pub name: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
    #[serde(default, rename = "apiAccesses", skip_serializing_if = "Vec::is_empty")]
    pub api_accesses: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub custom_domains: Vec<String>,
}
