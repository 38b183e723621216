//! Resource listing seam
//!
//! The fetcher never talks to the API server directly. Each resource kind
//! is read through a `ResourceLister`, which is expected to return one
//! consistent point-in-time list per call.

use async_trait::async_trait;
use k8s_openapi::api::apps::v1::{DaemonSet, Deployment, ReplicaSet, StatefulSet};
use k8s_openapi::api::core::v1::{Namespace, Service};
use k8s_openapi::api::networking::v1::{Ingress, IngressClass};

use crate::models::external_dns::DnsEndpoint;
use crate::models::hub::{
    AccessControlPolicy, ApiAccess, ApiCollection, ApiGateway, ApiPortal, HubApi,
};

/// Failure to list one resource kind
#[derive(Debug, thiserror::Error)]
pub enum ListError {
    #[error(transparent)]
    Kube(#[from] kube::Error),

    #[error("resource listing unavailable: {0}")]
    Unavailable(String),
}

/// Result type for listing operations
pub type ListResult<T> = Result<Vec<T>, ListError>;

/// Read access to every resource kind the snapshot is built from
#[async_trait]
pub trait ResourceLister: Send + Sync {
    async fn namespaces(&self) -> ListResult<Namespace>;

    async fn deployments(&self) -> ListResult<Deployment>;
    async fn stateful_sets(&self) -> ListResult<StatefulSet>;
    async fn daemon_sets(&self) -> ListResult<DaemonSet>;
    async fn replica_sets(&self) -> ListResult<ReplicaSet>;

    async fn services(&self) -> ListResult<Service>;
    async fn ingresses(&self) -> ListResult<Ingress>;
    async fn ingress_classes(&self) -> ListResult<IngressClass>;

    async fn access_control_policies(&self) -> ListResult<AccessControlPolicy>;
    async fn dns_endpoints(&self) -> ListResult<DnsEndpoint>;

    async fn apis(&self) -> ListResult<HubApi>;
    async fn api_collections(&self) -> ListResult<ApiCollection>;
    async fn api_accesses(&self) -> ListResult<ApiAccess>;
    async fn api_portals(&self) -> ListResult<ApiPortal>;
    async fn api_gateways(&self) -> ListResult<ApiGateway>;
}
