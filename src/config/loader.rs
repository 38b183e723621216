//! Configuration loading
//!
//! Precedence order (highest to lowest):
//! 1. Environment variable overrides
//! 2. Config file (explicit path, or the root config path)
//! 3. Built-in defaults

use super::{paths, schema::Config};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

pub const CLUSTER_ID_ENV: &str = "TOPOLOGY_AGENT_CLUSTER_ID";
pub const SECRET_NAMESPACE_ENV: &str = "TOPOLOGY_AGENT_SECRET_NAMESPACE";
pub const API_MANAGEMENT_ENV: &str = "TOPOLOGY_AGENT_API_MANAGEMENT";
pub const EXTERNAL_DNS_ENV: &str = "TOPOLOGY_AGENT_EXTERNAL_DNS";

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with all layers merged.
    ///
    /// An explicit path must exist. Without one, a missing root config file
    /// just means defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Config> {
        let mut config = match explicit {
            Some(path) => Self::load_file(path)?,
            None => {
                let path = paths::root_config_path();
                if path.exists() {
                    Self::load_file(&path)?
                } else {
                    tracing::debug!(path = %path.display(), "No config file, using defaults");
                    Config::default()
                }
            }
        };

        Self::apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
        Self::validate(&config)?;

        Ok(config)
    }

    /// Path `load` reads from
    pub fn resolve_path(explicit: Option<&Path>) -> PathBuf {
        explicit
            .map(Path::to_path_buf)
            .unwrap_or_else(paths::root_config_path)
    }

    /// Load configuration from a file
    pub fn load_file(path: &Path) -> Result<Config> {
        if !path.exists() {
            return Err(anyhow::anyhow!("Config file not found: {}", path.display()));
        }

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        tracing::debug!(path = %path.display(), "Loaded config file");

        Ok(config)
    }

    /// Check values serde cannot reject on its own
    pub fn validate(config: &Config) -> Result<()> {
        if config.secret_namespace.is_empty() {
            anyhow::bail!("secretNamespace must not be empty");
        }
        if config.list_timeout_seconds == 0 {
            anyhow::bail!("listTimeoutSeconds must be greater than 0");
        }
        if config.secret_timeout_seconds == 0 {
            anyhow::bail!("secretTimeoutSeconds must be greater than 0");
        }
        if config.refresh_interval_seconds == 0 {
            anyhow::bail!("refreshIntervalSeconds must be greater than 0");
        }
        Ok(())
    }

    /// Apply environment variable overrides read through `lookup`
    pub fn apply_env_overrides<F>(config: &mut Config, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(cluster_id) = lookup(CLUSTER_ID_ENV) {
            config.cluster_id = cluster_id;
        }

        if let Some(namespace) = lookup(SECRET_NAMESPACE_ENV) {
            config.secret_namespace = namespace;
        }

        if let Some(value) = lookup(API_MANAGEMENT_ENV) {
            config.api_management = value
                .parse()
                .with_context(|| format!("{} must be 'true' or 'false'", API_MANAGEMENT_ENV))?;
        }

        if let Some(value) = lookup(EXTERNAL_DNS_ENV) {
            config.external_dns = value
                .parse()
                .with_context(|| format!("{} must be 'true' or 'false'", EXTERNAL_DNS_ENV))?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_load_explicit_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "clusterId: staging").unwrap();
        writeln!(file, "externalDns: true").unwrap();
        writeln!(file, "listTimeoutSeconds: 5").unwrap();

        let config = ConfigLoader::load_file(file.path()).unwrap();

        assert_eq!(config.cluster_id, "staging");
        assert!(config.external_dns);
        assert_eq!(config.list_timeout_seconds, 5);
        assert_eq!(config.secret_timeout_seconds, 10);
    }

    #[test]
    fn test_missing_explicit_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.yaml");

        assert!(ConfigLoader::load(Some(&path)).is_err());
    }

    #[test]
    fn test_invalid_yaml_fails() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "listTimeoutSeconds: soon").unwrap();

        assert!(ConfigLoader::load_file(file.path()).is_err());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();

        ConfigLoader::apply_env_overrides(
            &mut config,
            env(&[
                (CLUSTER_ID_ENV, "prod"),
                (SECRET_NAMESPACE_ENV, "hub"),
                (API_MANAGEMENT_ENV, "true"),
            ]),
        )
        .unwrap();

        assert_eq!(config.cluster_id, "prod");
        assert_eq!(config.secret_namespace, "hub");
        assert!(config.api_management);
        assert!(!config.external_dns);
    }

    #[test]
    fn test_invalid_bool_override_fails() {
        let mut config = Config::default();

        let result =
            ConfigLoader::apply_env_overrides(&mut config, env(&[(EXTERNAL_DNS_ENV, "yes")]));

        assert!(result.is_err());
    }

    #[test]
    fn test_validate() {
        assert!(ConfigLoader::validate(&Config::default()).is_ok());

        let config = Config {
            list_timeout_seconds: 0,
            ..Default::default()
        };
        assert!(ConfigLoader::validate(&config).is_err());

        let config = Config {
            secret_namespace: String::new(),
            ..Default::default()
        };
        assert!(ConfigLoader::validate(&config).is_err());
    }
}
