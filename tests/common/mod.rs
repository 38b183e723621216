//! Shared helpers for integration tests
//!
//! `FakeLister` answers every listing from in-memory vectors. Objects are
//! built from JSON the way they come back from the API server.

#![allow(dead_code)]

use async_trait::async_trait;
use k8s_openapi::api::apps::v1::{DaemonSet, Deployment, ReplicaSet, StatefulSet};
use k8s_openapi::api::core::v1::{Namespace, Service};
use k8s_openapi::api::networking::v1::{Ingress, IngressClass};
use serde::de::DeserializeOwned;
use serde_json::json;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use topology_agent::models::ResourceKind;
use topology_agent::models::external_dns::DnsEndpoint;
use topology_agent::models::hub::{
    AccessControlPolicy, ApiAccess, ApiCollection, ApiGateway, ApiPortal, HubApi,
};
use topology_agent::topology::{ListError, ListResult, ResourceLister};

/// In-memory lister
#[derive(Default)]
pub struct FakeLister {
    pub namespaces: Vec<Namespace>,
    pub deployments: Vec<Deployment>,
    pub stateful_sets: Vec<StatefulSet>,
    pub daemon_sets: Vec<DaemonSet>,
    pub replica_sets: Vec<ReplicaSet>,
    pub services: Vec<Service>,
    pub ingresses: Vec<Ingress>,
    pub ingress_classes: Vec<IngressClass>,
    pub access_control_policies: Vec<AccessControlPolicy>,
    pub dns_endpoints: Vec<DnsEndpoint>,
    pub apis: Vec<HubApi>,
    pub api_collections: Vec<ApiCollection>,
    pub api_accesses: Vec<ApiAccess>,
    pub api_portals: Vec<ApiPortal>,
    pub api_gateways: Vec<ApiGateway>,

    /// Delay applied to every listing
    pub delay: Option<Duration>,
    /// Kind whose listing fails, switchable while the lister is in use
    pub failing: Arc<Mutex<Option<ResourceKind>>>,
    /// Kinds listed so far
    pub listed: Arc<Mutex<Vec<ResourceKind>>>,
}

impl FakeLister {
    async fn answer<T: Clone>(&self, kind: ResourceKind, items: &[T]) -> ListResult<T> {
        self.listed.lock().unwrap().push(kind);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if *self.failing.lock().unwrap() == Some(kind) {
            return Err(ListError::Unavailable(format!("{} listing refused", kind)));
        }

        Ok(items.to_vec())
    }
}

#[async_trait]
impl ResourceLister for FakeLister {
    async fn namespaces(&self) -> ListResult<Namespace> {
        self.answer(ResourceKind::Namespace, &self.namespaces).await
    }

    async fn deployments(&self) -> ListResult<Deployment> {
        self.answer(ResourceKind::Deployment, &self.deployments).await
    }

    async fn stateful_sets(&self) -> ListResult<StatefulSet> {
        self.answer(ResourceKind::StatefulSet, &self.stateful_sets).await
    }

    async fn daemon_sets(&self) -> ListResult<DaemonSet> {
        self.answer(ResourceKind::DaemonSet, &self.daemon_sets).await
    }

    async fn replica_sets(&self) -> ListResult<ReplicaSet> {
        self.answer(ResourceKind::ReplicaSet, &self.replica_sets).await
    }

    async fn services(&self) -> ListResult<Service> {
        self.answer(ResourceKind::Service, &self.services).await
    }

    async fn ingresses(&self) -> ListResult<Ingress> {
        self.answer(ResourceKind::Ingress, &self.ingresses).await
    }

    async fn ingress_classes(&self) -> ListResult<IngressClass> {
        self.answer(ResourceKind::IngressClass, &self.ingress_classes)
            .await
    }

    async fn access_control_policies(&self) -> ListResult<AccessControlPolicy> {
        self.answer(
            ResourceKind::AccessControlPolicy,
            &self.access_control_policies,
        )
        .await
    }

    async fn dns_endpoints(&self) -> ListResult<DnsEndpoint> {
        self.answer(ResourceKind::DnsEndpoint, &self.dns_endpoints).await
    }

    async fn apis(&self) -> ListResult<HubApi> {
        self.answer(ResourceKind::Api, &self.apis).await
    }

    async fn api_collections(&self) -> ListResult<ApiCollection> {
        self.answer(ResourceKind::ApiCollection, &self.api_collections)
            .await
    }

    async fn api_accesses(&self) -> ListResult<ApiAccess> {
        self.answer(ResourceKind::ApiAccess, &self.api_accesses).await
    }

    async fn api_portals(&self) -> ListResult<ApiPortal> {
        self.answer(ResourceKind::ApiPortal, &self.api_portals).await
    }

    async fn api_gateways(&self) -> ListResult<ApiGateway> {
        self.answer(ResourceKind::ApiGateway, &self.api_gateways).await
    }
}

/// Deserialize an object from its JSON form
pub fn from_json<T: DeserializeOwned>(value: serde_json::Value) -> T {
    serde_json::from_value(value).unwrap()
}

pub fn namespace(name: &str) -> Namespace {
    from_json(json!({
        "apiVersion": "v1",
        "kind": "Namespace",
        "metadata": {"name": name}
    }))
}

/// Deployment whose pods carry `app=<app_label>`
pub fn deployment(name: &str, namespace: &str, app_label: &str, image: &str) -> Deployment {
    from_json(json!({
        "apiVersion": "apps/v1",
        "kind": "Deployment",
        "metadata": {"name": name, "namespace": namespace},
        "spec": {
            "replicas": 1,
            "selector": {"matchLabels": {"app": app_label}},
            "template": {
                "metadata": {"labels": {"app": app_label}},
                "spec": {"containers": [{"name": name, "image": image}]}
            }
        },
        "status": {"readyReplicas": 1}
    }))
}

pub fn service(name: &str, namespace: &str, app_label: &str) -> Service {
    from_json(json!({
        "apiVersion": "v1",
        "kind": "Service",
        "metadata": {"name": name, "namespace": namespace},
        "spec": {
            "type": "ClusterIP",
            "selector": {"app": app_label},
            "ports": [{"port": 80}]
        }
    }))
}
