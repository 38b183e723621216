//! topology-agent - Cluster topology snapshots for Kubernetes fleet agents
//!
//! Lists the workloads, services, ingresses and API management resources of
//! a cluster into one keyed snapshot, and resolves access control policies
//! into the runtime configuration of their authentication handlers.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use topology_agent::cli::{self, ConfigSubcommand};
use topology_agent::config::ConfigLoader;

/// Cluster topology snapshots and access control policy resolution
#[derive(Parser, Debug)]
#[command(name = "topology-agent")]
#[command(
    about = "Cluster topology snapshots and access control policy resolution",
    long_about = None
)]
struct Args {
    /// Enable debug logging
    #[arg(long, short = 'd', global = true)]
    debug: bool,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Configuration file, defaults to the user config directory
    #[arg(long, short = 'c', global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

/// Main commands
#[derive(Subcommand, Debug)]
enum Command {
    /// Build one topology snapshot and print it as JSON
    Snapshot {
        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },
    /// Refresh the snapshot periodically, one JSON line per snapshot
    Watch,
    /// Resolve access control policies and report their state
    Policies {
        /// Also run OIDC provider discovery for valid OIDC policies
        #[arg(long)]
        discover: bool,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    match args.command {
        Command::Version => {
            cli::display_version();
            return Ok(());
        }
        Command::Config { subcommand } => {
            return cli::handle_config_command(subcommand, args.config.as_deref());
        }
        _ => {}
    }

    cli::init_logging(args.debug, args.log_file.as_deref())?;

    let config = ConfigLoader::load(args.config.as_deref())?;
    tracing::debug!(
        cluster_id = %config.cluster_id,
        api_management = config.api_management,
        external_dns = config.external_dns,
        "Configuration loaded"
    );

    tracing::debug!("Initializing Kubernetes client");
    let client = topology_agent::kube::create_client().await?;

    match args.command {
        Command::Snapshot { pretty } => cli::run_snapshot(client, &config, pretty).await,
        Command::Watch => cli::run_watch(client, &config).await,
        Command::Policies { discover } => cli::run_policies(client, &config, discover).await,
        Command::Config { .. } | Command::Version => Ok(()),
    }
}
