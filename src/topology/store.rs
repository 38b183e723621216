//! Published snapshot
//!
//! Holds the latest complete snapshot. A refresh swaps it only after a
//! successful pass; readers never observe a snapshot being built.

use std::future::Future;
use std::sync::{Arc, PoisonError, RwLock};

use super::cluster::Cluster;
use super::fetcher::{FetchError, Fetcher};
use super::lister::ResourceLister;

/// Thread-safe holder of the latest cluster snapshot
pub struct SnapshotStore<L> {
    fetcher: Fetcher<L>,
    current: RwLock<Option<Arc<Cluster>>>,
}

impl<L: ResourceLister> SnapshotStore<L> {
    pub fn new(fetcher: Fetcher<L>) -> Self {
        Self {
            fetcher,
            current: RwLock::new(None),
        }
    }

    /// Latest published snapshot, `None` until a pass succeeded
    pub fn current(&self) -> Option<Arc<Cluster>> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Run a pass and publish its snapshot.
    ///
    /// On failure the previous snapshot stays published and the error is
    /// returned to the caller.
    pub async fn refresh(&self) -> Result<Arc<Cluster>, FetchError> {
        let result = self.fetcher.fetch_state().await;
        self.publish(result)
    }

    /// Same as `refresh`, abandoning the pass when `cancel` completes.
    pub async fn refresh_until<F>(&self, cancel: F) -> Result<Arc<Cluster>, FetchError>
    where
        F: Future<Output = ()>,
    {
        let result = self.fetcher.fetch_state_until(cancel).await;
        self.publish(result)
    }

    fn publish(&self, result: Result<Cluster, FetchError>) -> Result<Arc<Cluster>, FetchError> {
        match result {
            Ok(cluster) => {
                let cluster = Arc::new(cluster);
                *self.current.write().unwrap_or_else(PoisonError::into_inner) =
                    Some(Arc::clone(&cluster));
                tracing::info!(
                    cluster_id = %cluster.id,
                    apps = cluster.apps.len(),
                    services = cluster.services.len(),
                    ingresses = cluster.ingresses.len(),
                    "Published cluster snapshot"
                );
                Ok(cluster)
            }
            Err(e) => {
                tracing::error!(
                    cluster_id = %self.fetcher.cluster_id(),
                    error = %e,
                    retained = self.current().is_some(),
                    "Aggregation pass failed, keeping previous snapshot"
                );
                Err(e)
            }
        }
    }
}
