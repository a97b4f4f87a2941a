//! # Command Line Interface
//!
//! `konnect-provisioner mesh-manager create-zone` and
//! `konnect-provisioner runtime-group create`. Both print a single JSON line
//! on success; logs go to stderr.

pub mod args;
pub mod config;
pub mod mesh;
pub mod output;
pub mod runtime_group;

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config::ProvisionerConfig;
use crate::konnect::{ClientConfig, KonnectClient};
use crate::observability::{init_logging, LogFormat};
use crate::secrets::{backends, SecretStore, SecretString};
use args::{ConnectionArgs, RotationArgs, StoreArgs};

#[derive(Parser, Debug)]
#[command(name = "konnect-provisioner")]
#[command(about = "Provision Kong Konnect control planes and rotate their credentials into a secret store")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log line format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text, env = "KONNECT_LOG_FORMAT")]
    pub log_format: LogFormat,

    /// Configuration file [default: ~/.konnect-provisioner/config.toml]
    #[arg(long, global = true, env = "KONNECT_PROVISIONER_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub connection: ConnectionArgs,

    #[command(flatten)]
    pub store: StoreArgs,

    #[command(flatten)]
    pub rotation: RotationArgs,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Kong Mesh commands
    MeshManager {
        #[command(subcommand)]
        command: mesh::MeshCommands,
    },

    /// Kong Gateway runtime group commands
    RuntimeGroup {
        #[command(subcommand)]
        command: runtime_group::RuntimeGroupCommands,
    },
}

/// Resolved settings shared by every command
#[derive(Debug, Clone)]
pub struct Runtime {
    pub config: ProvisionerConfig,
    pub token: SecretString,
    pub verbose: bool,
}

impl Runtime {
    /// Konnect client using the configured API version, or `default_version`
    pub fn konnect_client(&self, default_version: &str) -> anyhow::Result<KonnectClient> {
        let api = &self.config.api;
        let config = ClientConfig {
            base_url: api.endpoint.clone(),
            api_version: api.api_version.clone().unwrap_or_else(|| default_version.to_string()),
            token: self.token.clone(),
            timeout: api.timeout_seconds,
            page_size: api.page_size,
            verbose: self.verbose,
        };
        Ok(KonnectClient::new(config)?)
    }

    /// Connect to the configured secret store
    pub async fn secret_store(&self) -> anyhow::Result<Arc<dyn SecretStore>> {
        let backend = self.config.secret_store.backend;
        backends::connect(&self.config.secret_store)
            .await
            .with_context(|| format!("Failed to initialise {} secret store", backend))
    }
}

/// Run CLI commands
pub async fn run_cli() -> anyhow::Result<()> {
    run(Cli::parse()).await
}

/// Run an already parsed command line
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    init_logging(cli.verbose, cli.log_format);

    let config =
        config::resolve_config(cli.config.as_deref(), &cli.connection, &cli.store, &cli.rotation)?;
    config.validate()?;
    let token = config::resolve_token(
        cli.connection.personal_access_token.clone(),
        cli.connection.token_file.clone(),
        &config,
    )?;

    info!(
        version = crate::VERSION,
        endpoint = %config.api.endpoint,
        secret_store = %config.secret_store.backend,
        "Starting konnect-provisioner"
    );

    let runtime = Runtime { config, token, verbose: cli.verbose };
    let cancel = CancellationToken::new();
    let interrupt = spawn_interrupt_handler(cancel.clone());

    let outcome = match cli.command {
        Commands::MeshManager { command } => {
            mesh::handle_mesh_command(command, runtime, cancel).await
        }
        Commands::RuntimeGroup { command } => {
            runtime_group::handle_runtime_group_command(command, runtime, cancel).await
        }
    };

    interrupt.abort();
    outcome
}

/// Cancel the run on Ctrl-C
fn spawn_interrupt_handler(cancel: CancellationToken) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, cancelling");
            cancel.cancel();
        }
    })
}
