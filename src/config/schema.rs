//! Configuration schema definitions
//!
//! Defines the structure of the configuration file using serde for
//! serialization. Every key is optional in the file.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Config {
    /// Identifier stamped on snapshots, ingresses and policies
    #[serde(default)]
    pub cluster_id: String,

    /// Namespace for OIDC secret references that do not name one
    #[serde(default = "default_secret_namespace")]
    pub secret_namespace: String,

    /// List the API management resources
    #[serde(default)]
    pub api_management: bool,

    /// List ExternalDNS DNSEndpoint resources
    #[serde(default)]
    pub external_dns: bool,

    /// Deadline for one aggregation pass
    #[serde(default = "default_list_timeout_seconds")]
    pub list_timeout_seconds: u64,

    /// Deadline for one secret fetch
    #[serde(default = "default_secret_timeout_seconds")]
    pub secret_timeout_seconds: u64,

    /// Interval between passes in watch mode
    #[serde(default = "default_refresh_interval_seconds")]
    pub refresh_interval_seconds: u64,
}

impl Config {
    pub fn list_timeout(&self) -> Duration {
        Duration::from_secs(self.list_timeout_seconds)
    }

    pub fn secret_timeout(&self) -> Duration {
        Duration::from_secs(self.secret_timeout_seconds)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_seconds)
    }
}

fn default_secret_namespace() -> String {
    "default".to_string()
}

fn default_list_timeout_seconds() -> u64 {
    30
}

fn default_secret_timeout_seconds() -> u64 {
    10
}

fn default_refresh_interval_seconds() -> u64 {
    60
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cluster_id: String::new(),
            secret_namespace: default_secret_namespace(),
            api_management: false,
            external_dns: false,
            list_timeout_seconds: default_list_timeout_seconds(),
            secret_timeout_seconds: default_secret_timeout_seconds(),
            refresh_interval_seconds: default_refresh_interval_seconds(),
        }
    }
}
