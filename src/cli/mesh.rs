//! `mesh-manager` commands

use anyhow::Result;
use clap::{Args, Subcommand};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use super::{output, Runtime};
use crate::services::{ProvisioningPipeline, ZoneProvisioning};

/// API version used by the mesh endpoints
pub const MESH_API_VERSION: &str = "v0";

#[derive(Subcommand, Debug)]
pub enum MeshCommands {
    /// Create (or reuse) a global control plane, provision a zone and store its token
    CreateZone(CreateZoneArgs),
}

#[derive(Args, Debug, Clone)]
pub struct CreateZoneArgs {
    /// Global control plane name
    #[arg(long, default_value = "default", env = "KONNECT_CONTROL_PLANE_NAME")]
    pub control_plane_name: String,

    /// Zone name
    #[arg(long, default_value = "default", env = "KONNECT_ZONE_NAME")]
    pub zone_name: String,
}

pub async fn handle_mesh_command(
    command: MeshCommands,
    runtime: Runtime,
    cancel: CancellationToken,
) -> Result<()> {
    match command {
        MeshCommands::CreateZone(args) => create_zone(args, runtime, cancel).await,
    }
}

async fn create_zone(args: CreateZoneArgs, runtime: Runtime, cancel: CancellationToken) -> Result<()> {
    if args.zone_name.trim().is_empty() {
        anyhow::bail!("Configuration error: zone name cannot be empty");
    }

    let client = runtime.konnect_client(MESH_API_VERSION)?;
    let store = runtime.secret_store().await?;
    let pipeline = ProvisioningPipeline::new(
        Arc::new(client),
        store,
        runtime.config.api.page_size,
        runtime.config.rotation.policy(),
    )
    .with_cancellation(cancel);

    let result = pipeline
        .provision_zone(&ZoneProvisioning {
            control_plane_name: args.control_plane_name,
            zone_name: args.zone_name,
        })
        .await?;

    output::print_json(&result.summary)
}
