//! CLI command handling module
//!
//! Handles all CLI subcommands and logging setup.

mod agent;
mod commands;
mod logging;
mod version;

pub use agent::{run_policies, run_snapshot, run_watch};
pub use commands::{handle_config_command, ConfigSubcommand};
pub use logging::init_logging;
pub use version::display_version;
