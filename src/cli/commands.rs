//! Config subcommand handlers

use anyhow::{Context, Result};
use clap::Subcommand;
use std::path::Path;

use crate::config::{get_config_value, ConfigLoader, CONFIG_KEYS};

/// Configuration management subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigSubcommand {
    /// Get configuration value
    Get {
        /// Configuration key (e.g., "clusterId", "listTimeoutSeconds")
        key: Option<String>,
    },
    /// List all configuration
    List,
    /// Show configuration file path
    Path,
    /// Validate configuration
    Validate,
}

/// Handle configuration subcommands
pub fn handle_config_command(cmd: ConfigSubcommand, config_path: Option<&Path>) -> Result<()> {
    match cmd {
        ConfigSubcommand::Get { key } => {
            let config = ConfigLoader::load(config_path).context("Failed to load configuration")?;

            if let Some(key) = key {
                println!("{}", get_config_value(&config, &key)?);
            } else {
                let yaml =
                    serde_yaml::to_string(&config).context("Failed to serialize configuration")?;
                print!("{}", yaml);
            }
        }
        ConfigSubcommand::List => {
            let config = ConfigLoader::load(config_path).context("Failed to load configuration")?;

            for key in CONFIG_KEYS {
                println!("{}: {}", key, get_config_value(&config, key)?);
            }
        }
        ConfigSubcommand::Path => {
            println!("{}", ConfigLoader::resolve_path(config_path).display());
        }
        ConfigSubcommand::Validate => match ConfigLoader::load(config_path) {
            Ok(_) => println!("Configuration is valid"),
            Err(e) => anyhow::bail!("Configuration validation failed: {:#}", e),
        },
    }

    Ok(())
}
