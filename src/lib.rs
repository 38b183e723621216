//! topology-agent library
//!
//! Snapshot building, policy resolution and their Kubernetes backed
//! implementations. Used by the binary and by the integration tests.

pub mod acp;
pub mod cli;
pub mod config;
pub mod kube;
pub mod models;
pub mod topology;

pub use topology::{Cluster, FetchError, Fetcher, SnapshotStore};
