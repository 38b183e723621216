//! Resource listing against the API server

use async_trait::async_trait;
use k8s_openapi::api::apps::v1::{DaemonSet, Deployment, ReplicaSet, StatefulSet};
use k8s_openapi::api::core::v1::{Namespace, Service};
use k8s_openapi::api::networking::v1::{Ingress, IngressClass};
use kube::api::ListParams;
use kube::{Api, Client};

use crate::models::external_dns::DnsEndpoint;
use crate::models::hub::{
    AccessControlPolicy, ApiAccess, ApiCollection, ApiGateway, ApiPortal, HubApi,
};
use crate::topology::{ListResult, ResourceLister};

/// `ResourceLister` backed by cluster-wide list calls.
///
/// Each call is a single list request, so every kind is read at one
/// resource version.
#[derive(Clone)]
pub struct KubeLister {
    client: Client,
}

impl KubeLister {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

macro_rules! list_all {
    ($self:ident, $type:ty) => {{
        let api: Api<$type> = Api::all($self.client.clone());
        let list = api.list(&ListParams::default()).await?;
        Ok(list.items)
    }};
}

#[async_trait]
impl ResourceLister for KubeLister {
    async fn namespaces(&self) -> ListResult<Namespace> {
        list_all!(self, Namespace)
    }

    async fn deployments(&self) -> ListResult<Deployment> {
        list_all!(self, Deployment)
    }

    async fn stateful_sets(&self) -> ListResult<StatefulSet> {
        list_all!(self, StatefulSet)
    }

    async fn daemon_sets(&self) -> ListResult<DaemonSet> {
        list_all!(self, DaemonSet)
    }

    async fn replica_sets(&self) -> ListResult<ReplicaSet> {
        list_all!(self, ReplicaSet)
    }

    async fn services(&self) -> ListResult<Service> {
        list_all!(self, Service)
    }

    async fn ingresses(&self) -> ListResult<Ingress> {
        list_all!(self, Ingress)
    }

    async fn ingress_classes(&self) -> ListResult<IngressClass> {
        list_all!(self, IngressClass)
    }

    async fn access_control_policies(&self) -> ListResult<AccessControlPolicy> {
        list_all!(self, AccessControlPolicy)
    }

    async fn dns_endpoints(&self) -> ListResult<DnsEndpoint> {
        list_all!(self, DnsEndpoint)
    }

    async fn apis(&self) -> ListResult<HubApi> {
        list_all!(self, HubApi)
    }

    async fn api_collections(&self) -> ListResult<ApiCollection> {
        list_all!(self, ApiCollection)
    }

    async fn api_accesses(&self) -> ListResult<ApiAccess> {
        list_all!(self, ApiAccess)
    }

    async fn api_portals(&self) -> ListResult<ApiPortal> {
        list_all!(self, ApiPortal)
    }

    async fn api_gateways(&self) -> ListResult<ApiGateway> {
        list_all!(self, ApiGateway)
    }
}
