//! Kubernetes client and live implementations of the listing and secret
//! seams.
//!
//! Proxy settings come from the standard `HTTP_PROXY`, `HTTPS_PROXY` and
//! `NO_PROXY` variables. API servers on private addresses are added to
//! `NO_PROXY` so an agent behind a corporate proxy still reaches its own
//! cluster directly.

mod fetch;
mod secrets;

pub use fetch::KubeLister;
pub use secrets::KubeSecretStore;

use anyhow::{Context, Result};
use kube::{Client, Config};
use url::Url;

/// Build a client from the in-cluster config, `KUBECONFIG` or `~/.kube/config`
pub async fn create_client() -> Result<Client> {
    let config = Config::infer()
        .await
        .context("Failed to infer Kubernetes configuration")?;

    if let Some(host) = Url::parse(&config.cluster_url.to_string())
        .ok()
        .and_then(|url| url.host_str().map(str::to_string))
    {
        ensure_no_proxy_bypass(&host);
    }

    tracing::debug!(cluster_url = %config.cluster_url, "Connecting to Kubernetes API");

    Client::try_from(config).context("Failed to create Kubernetes client")
}

fn ensure_no_proxy_bypass(host: &str) {
    if !is_private_host(host) {
        return;
    }

    let current = std::env::var("NO_PROXY")
        .or_else(|_| std::env::var("no_proxy"))
        .unwrap_or_default();

    if no_proxy_contains(&current, host) {
        return;
    }

    let updated = if current.is_empty() {
        host.to_string()
    } else {
        format!("{},{}", current, host)
    };

    tracing::debug!(host = %host, "Bypassing proxy for private API server");

    // Runs before the runtime spawns any task reading the environment.
    unsafe {
        std::env::set_var("NO_PROXY", &updated);
        std::env::set_var("no_proxy", &updated);
    }
}

/// Loopback, RFC 1918 addresses and internal DNS suffixes
fn is_private_host(host: &str) -> bool {
    if let Ok(ip) = host.trim_matches(['[', ']']).parse::<std::net::IpAddr>() {
        return match ip {
            std::net::IpAddr::V4(v4) => v4.is_private() || v4.is_loopback(),
            std::net::IpAddr::V6(v6) => v6.is_loopback(),
        };
    }

    host == "localhost"
        || [".local", ".internal", ".cluster.local"]
            .iter()
            .any(|suffix| host.ends_with(suffix))
}

/// Whether a `NO_PROXY` value already covers `host`, including `.domain`
/// and bare domain patterns matching subdomains
fn no_proxy_contains(no_proxy: &str, host: &str) -> bool {
    no_proxy
        .split(',')
        .map(str::trim)
        .filter(|pattern| !pattern.is_empty())
        .any(|pattern| {
            let domain = pattern.strip_prefix('.').unwrap_or(pattern);
            host == domain || host.ends_with(&format!(".{}", domain))
        })
}
