//! Snapshot, watch and policy subcommands

use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::sync::watch;

use crate::acp::oidc::{build_provider, HttpDiscovery};
use crate::acp::{Config as AcpConfig, PolicyResolver};
use crate::config::Config;
use crate::kube::{KubeLister, KubeSecretStore};
use crate::topology::{FetchError, Fetcher, ResourceLister, SnapshotStore};

fn build_fetcher(client: kube::Client, config: &Config) -> Fetcher<KubeLister> {
    Fetcher::new(KubeLister::new(client), config.cluster_id.clone())
        .with_api_management(config.api_management)
        .with_external_dns(config.external_dns)
        .with_list_timeout(config.list_timeout())
}

/// Receiver flipped to `true` on Ctrl-C
fn shutdown_signal() -> watch::Receiver<bool> {
    let (tx, rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupted, shutting down");
            let _ = tx.send(true);
        }
    });
    rx
}

/// Completes once shutdown was requested, never if it cannot be
async fn wait_for_shutdown(mut rx: watch::Receiver<bool>) {
    if rx.wait_for(|stopped| *stopped).await.is_err() {
        std::future::pending::<()>().await;
    }
}

/// Print one snapshot as JSON
pub async fn run_snapshot(client: kube::Client, config: &Config, pretty: bool) -> Result<()> {
    let fetcher = build_fetcher(client, config);
    let shutdown = shutdown_signal();

    let cluster = fetcher
        .fetch_state_until(wait_for_shutdown(shutdown))
        .await
        .context("Failed to build cluster snapshot")?;

    let json = if pretty {
        serde_json::to_string_pretty(&cluster)
    } else {
        serde_json::to_string(&cluster)
    }
    .context("Failed to serialize snapshot")?;

    println!("{}", json);
    Ok(())
}

/// Refresh the snapshot on an interval until Ctrl-C, printing each
/// published snapshot as one JSON line
pub async fn run_watch(client: kube::Client, config: &Config) -> Result<()> {
    let store = SnapshotStore::new(build_fetcher(client, config));
    let shutdown = shutdown_signal();
    let interval = config.refresh_interval();

    tracing::info!(
        cluster_id = %config.cluster_id,
        interval_seconds = interval.as_secs(),
        "Watching cluster topology"
    );

    loop {
        match store.refresh_until(wait_for_shutdown(shutdown.clone())).await {
            Ok(cluster) => {
                let json = serde_json::to_string(cluster.as_ref())
                    .context("Failed to serialize snapshot")?;
                println!("{}", json);
            }
            Err(FetchError::Cancelled) => break,
            // Logged by the store, the next pass retries.
            Err(_) => {}
        }

        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            _ = wait_for_shutdown(shutdown.clone()) => break,
        }
    }

    Ok(())
}

/// Resolve every access control policy and print one line per policy.
///
/// Secrets are never printed.
pub async fn run_policies(client: kube::Client, config: &Config, discover: bool) -> Result<()> {
    let lister = KubeLister::new(client.clone());
    let policies = lister
        .access_control_policies()
        .await
        .context("Failed to list access control policies")?;

    let resolver = PolicyResolver::new(
        Arc::new(KubeSecretStore::new(client)),
        config.secret_namespace.clone(),
    )
    .with_secret_timeout(config.secret_timeout());

    let resolved = resolver.resolve_all(&policies).await;
    let mut failures = 0;

    for (key, result) in &resolved {
        let status = match result {
            Err(e) => {
                failures += 1;
                format!("error: {}", error_chain(e))
            }
            Ok(AcpConfig::Empty) => "no supported method".to_string(),
            Ok(AcpConfig::Oidc(oidc)) => {
                let checked = match oidc.validate() {
                    Err(e) => Err(format!("invalid: {}", e)),
                    Ok(()) if discover => {
                        match HttpDiscovery::new(oidc.tls.as_ref()) {
                            Ok(discovery) => build_provider(&discovery, oidc)
                                .await
                                .map(|provider| format!("ok, provider {}", provider.issuer))
                                .map_err(|e| format!("discovery failed: {}", error_chain(&e))),
                            Err(e) => Err(format!("discovery failed: {}", e)),
                        }
                    }
                    Ok(()) => Ok("ok".to_string()),
                };
                checked.unwrap_or_else(|e| {
                    failures += 1;
                    e
                })
            }
            Ok(_) => "ok".to_string(),
        };

        let method = result
            .as_ref()
            .ok()
            .and_then(AcpConfig::method)
            .unwrap_or("-");
        println!("{}\t{}\t{}", key, method, status);
    }

    if failures > 0 {
        anyhow::bail!("{} of {} policies failed", failures, resolved.len());
    }
    Ok(())
}

/// `error: cause: cause` on one line
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        out.push_str(": ");
        out.push_str(&cause.to_string());
        source = cause.source();
    }
    out
}
