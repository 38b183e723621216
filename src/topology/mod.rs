//! Cluster topology
//!
//! Snapshot model, correlation rules and the aggregation pass that turns raw
//! resource listings into a `Cluster`.

mod api;
mod apps;
mod cluster;
mod external_dns;
mod fetcher;
mod ingress_controllers;
mod ingresses;
mod key;
mod lister;
mod policies;
pub mod selector;
mod services;
mod store;

pub use cluster::{
    AccessControlPolicy, AccessControlPolicyBasicAuth, AccessControlPolicyDigestAuth,
    AccessControlPolicyJwt, AccessControlPolicyMethod, AccessControlPolicyOidc, Api, ApiAccess,
    ApiCollection, ApiGateway, ApiPortal, ApiService, ApiServiceBackendPort, App, Cluster,
    ExternalDns, Ingress, IngressController, OpenApiSpec, Service,
};
pub use fetcher::{FetchError, Fetcher, DEFAULT_LIST_TIMEOUT};
pub use ingress_controllers::{ControllerType, ImageDetector, IngressControllerDetector};
pub use key::{cluster_key, object_key};
pub use lister::{ListError, ListResult, ResourceLister};
pub use store::SnapshotStore;
