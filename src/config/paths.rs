//! Where the agent looks for its configuration file

use directories::ProjectDirs;
use std::path::PathBuf;

/// Environment variable overriding the configuration directory
pub const CONFIG_DIR_ENV: &str = "TOPOLOGY_AGENT_CONFIG_DIR";

const CONFIG_FILE: &str = "config.yaml";

/// Configuration directory.
///
/// `TOPOLOGY_AGENT_CONFIG_DIR` wins when set and non-empty. Otherwise the
/// platform config directory for `topology-agent` is used, which honours
/// `XDG_CONFIG_HOME` on Linux.
pub fn config_dir() -> PathBuf {
    config_dir_with(|key| std::env::var(key).ok())
}

fn config_dir_with(lookup: impl Fn(&str) -> Option<String>) -> PathBuf {
    if let Some(dir) = lookup(CONFIG_DIR_ENV).filter(|dir| !dir.is_empty()) {
        return PathBuf::from(dir);
    }

    // No home directory, e.g. a bare container user.
    ProjectDirs::from("io", "traefik", "topology-agent")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".topology-agent"))
}

/// Config file read when no explicit path is given
pub fn root_config_path() -> PathBuf {
    config_dir().join(CONFIG_FILE)
}
