//! Aggregation pass
//!
//! `Fetcher` lists every resource kind, joins the results and returns one
//! complete `Cluster`. A pass either succeeds as a whole or fails as a whole;
//! nothing partial ever leaves this module.

use std::future::Future;
use std::time::Duration;

use super::api::{
    build_api_accesses, build_api_collections, build_api_gateways, build_api_portals, build_apis,
};
use super::apps::build_apps;
use super::cluster::Cluster;
use super::external_dns::build_external_dnses;
use super::ingress_controllers::{
    build_ingress_controllers, default_ingress_class, ImageDetector, IngressControllerDetector,
};
use super::ingresses::build_ingresses;
use super::lister::{ListError, ResourceLister};
use super::policies::build_access_control_policies;
use super::services::build_services;
use crate::models::ResourceKind;

/// Default deadline for one aggregation pass
pub const DEFAULT_LIST_TIMEOUT: Duration = Duration::from_secs(30);

/// Failure of an aggregation pass
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("failed to list {kind}")]
    List {
        kind: ResourceKind,
        #[source]
        source: ListError,
    },

    #[error("aggregation pass cancelled")]
    Cancelled,

    #[error("aggregation pass timed out after {0:?}")]
    Timeout(Duration),
}

/// List one kind and tag a failure with it.
macro_rules! list {
    ($kind:expr, $call:expr) => {
        async {
            let kind: ResourceKind = $kind;
            let items = $call
                .await
                .map_err(|source| FetchError::List { kind, source })?;
            tracing::debug!(kind = %kind, count = items.len(), "Listed resources");
            Ok::<_, FetchError>(items)
        }
    };
}

/// Like `list!`, but yields nothing when the kind is disabled.
macro_rules! list_if {
    ($enabled:expr, $kind:expr, $call:expr) => {
        async {
            if !$enabled {
                return Ok::<_, FetchError>(Vec::new());
            }
            list!($kind, $call).await
        }
    };
}

/// Builds cluster snapshots from a `ResourceLister`
pub struct Fetcher<L> {
    lister: L,
    cluster_id: String,
    api_management: bool,
    external_dns: bool,
    list_timeout: Duration,
    detector: Box<dyn IngressControllerDetector>,
}

impl<L: ResourceLister> Fetcher<L> {
    pub fn new(lister: L, cluster_id: impl Into<String>) -> Self {
        Self {
            lister,
            cluster_id: cluster_id.into(),
            api_management: false,
            external_dns: false,
            list_timeout: DEFAULT_LIST_TIMEOUT,
            detector: Box::new(ImageDetector),
        }
    }

    /// Also list the API management resources
    pub fn with_api_management(mut self, enabled: bool) -> Self {
        self.api_management = enabled;
        self
    }

    /// Also list DNSEndpoint resources
    pub fn with_external_dns(mut self, enabled: bool) -> Self {
        self.external_dns = enabled;
        self
    }

    pub fn with_list_timeout(mut self, timeout: Duration) -> Self {
        self.list_timeout = timeout;
        self
    }

    pub fn with_detector(mut self, detector: Box<dyn IngressControllerDetector>) -> Self {
        self.detector = detector;
        self
    }

    pub fn cluster_id(&self) -> &str {
        &self.cluster_id
    }

    /// Run one aggregation pass.
    ///
    /// Fails on the first listing error or when the pass exceeds the list
    /// timeout.
    pub async fn fetch_state(&self) -> Result<Cluster, FetchError> {
        tokio::time::timeout(self.list_timeout, self.run_pass())
            .await
            .map_err(|_| FetchError::Timeout(self.list_timeout))?
    }

    /// Run one aggregation pass, giving up as soon as `cancel` completes.
    ///
    /// The in-flight pass is dropped on cancellation, so its partial results
    /// are never observable.
    pub async fn fetch_state_until<F>(&self, cancel: F) -> Result<Cluster, FetchError>
    where
        F: Future<Output = ()>,
    {
        tokio::select! {
            biased;

            _ = cancel => {
                tracing::debug!("Aggregation pass cancelled");
                Err(FetchError::Cancelled)
            }
            result = self.fetch_state() => result,
        }
    }

    async fn run_pass(&self) -> Result<Cluster, FetchError> {
        let lister = &self.lister;

        let (
            namespaces,
            deployments,
            stateful_sets,
            daemon_sets,
            replica_sets,
            services,
            ingresses,
            ingress_classes,
            policies,
            dns_endpoints,
            apis,
            api_collections,
            api_accesses,
            api_portals,
            api_gateways,
        ) = tokio::try_join!(
            list!(ResourceKind::Namespace, lister.namespaces()),
            list!(ResourceKind::Deployment, lister.deployments()),
            list!(ResourceKind::StatefulSet, lister.stateful_sets()),
            list!(ResourceKind::DaemonSet, lister.daemon_sets()),
            list!(ResourceKind::ReplicaSet, lister.replica_sets()),
            list!(ResourceKind::Service, lister.services()),
            list!(ResourceKind::Ingress, lister.ingresses()),
            list!(ResourceKind::IngressClass, lister.ingress_classes()),
            list!(
                ResourceKind::AccessControlPolicy,
                lister.access_control_policies()
            ),
            list_if!(
                self.external_dns,
                ResourceKind::DnsEndpoint,
                lister.dns_endpoints()
            ),
            list_if!(self.api_management, ResourceKind::Api, lister.apis()),
            list_if!(
                self.api_management,
                ResourceKind::ApiCollection,
                lister.api_collections()
            ),
            list_if!(
                self.api_management,
                ResourceKind::ApiAccess,
                lister.api_accesses()
            ),
            list_if!(
                self.api_management,
                ResourceKind::ApiPortal,
                lister.api_portals()
            ),
            list_if!(
                self.api_management,
                ResourceKind::ApiGateway,
                lister.api_gateways()
            ),
        )?;

        let mut namespace_names: Vec<String> = namespaces
            .into_iter()
            .filter_map(|ns| ns.metadata.name)
            .collect();
        namespace_names.sort();

        let apps = build_apps(&deployments, &stateful_sets, &daemon_sets, &replica_sets);
        let services = build_services(&services, &apps);
        let ingress_controllers =
            build_ingress_controllers(self.detector.as_ref(), &apps, &services, &ingress_classes);
        let default_class = default_ingress_class(&ingress_classes);
        let ingresses = build_ingresses(
            &self.cluster_id,
            &ingresses,
            &ingress_controllers,
            default_class.as_deref(),
        );

        let cluster = Cluster {
            id: self.cluster_id.clone(),
            namespaces: namespace_names,
            apps,
            ingresses,
            services,
            ingress_controllers,
            external_dnses: build_external_dnses(&dns_endpoints),
            access_control_policies: build_access_control_policies(&self.cluster_id, &policies),
            apis: build_apis(&apis),
            api_collections: build_api_collections(&api_collections),
            api_accesses: build_api_accesses(&api_accesses),
            api_portals: build_api_portals(&api_portals),
            api_gateways: build_api_gateways(&api_gateways),
        };

        tracing::debug!(
            cluster_id = %cluster.id,
            apps = cluster.apps.len(),
            services = cluster.services.len(),
            ingresses = cluster.ingresses.len(),
            policies = cluster.access_control_policies.len(),
            "Built cluster snapshot"
        );

        Ok(cluster)
    }
}
