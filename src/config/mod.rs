//! Agent configuration
//!
//! Layered configuration: built-in defaults, a YAML file and environment
//! overrides.

pub mod loader;
pub mod paths;
pub mod schema;

pub use loader::ConfigLoader;
pub use schema::Config;

/// Keys accepted by `get_config_value`, in file order
pub const CONFIG_KEYS: &[&str] = &[
    "clusterId",
    "secretNamespace",
    "apiManagement",
    "externalDns",
    "listTimeoutSeconds",
    "secretTimeoutSeconds",
    "refreshIntervalSeconds",
];

/// Get a configuration value by key
pub fn get_config_value(config: &Config, key: &str) -> anyhow::Result<String> {
    match key {
        "clusterId" => Ok(config.cluster_id.clone()),
        "secretNamespace" => Ok(config.secret_namespace.clone()),
        "apiManagement" => Ok(config.api_management.to_string()),
        "externalDns" => Ok(config.external_dns.to_string()),
        "listTimeoutSeconds" => Ok(config.list_timeout_seconds.to_string()),
        "secretTimeoutSeconds" => Ok(config.secret_timeout_seconds.to_string()),
        "refreshIntervalSeconds" => Ok(config.refresh_interval_seconds.to_string()),
        _ => Err(anyhow::anyhow!("Unknown configuration key: {}", key)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_key_is_readable() {
        let config = Config::default();
        for key in CONFIG_KEYS {
            assert!(get_config_value(&config, key).is_ok(), "{}", key);
        }
        assert_eq!(get_config_value(&config, "secretNamespace").unwrap(), "default");
        assert!(get_config_value(&config, "readOnly").is_err());
    }
}
