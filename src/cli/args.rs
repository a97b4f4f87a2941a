//! Flags shared by every command.

use clap::Args;
use std::path::PathBuf;

use crate::secrets::SecretBackendType;

/// Konnect API connection flags
#[derive(Args, Debug, Clone, Default)]
pub struct ConnectionArgs {
    /// Konnect API endpoint [default: https://us.api.konghq.com]
    #[arg(long, global = true, env = "KONNECT_API_ENDPOINT")]
    pub api_endpoint: Option<String>,

    /// API version path segment [default: v2 for runtime groups, v0 for mesh]
    #[arg(long, global = true, env = "KONNECT_API_VERSION")]
    pub api_version: Option<String>,

    /// Konnect personal access token
    #[arg(long, global = true, env = "KONNECT_PAT", hide_env_values = true)]
    pub personal_access_token: Option<String>,

    /// Path to file containing the personal access token
    #[arg(long, global = true)]
    pub token_file: Option<PathBuf>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Page size for list calls
    #[arg(long, global = true)]
    pub page_size: Option<u32>,
}

/// Secret store flags
#[derive(Args, Debug, Clone, Default)]
pub struct StoreArgs {
    /// Secret store backend: aws, vault or memory
    #[arg(long, global = true, env = "KONNECT_SECRET_STORE")]
    pub secret_store: Option<SecretBackendType>,

    /// AWS region for Secrets Manager
    #[arg(long, global = true)]
    pub aws_region: Option<String>,

    /// Custom Secrets Manager endpoint (e.g. LocalStack)
    #[arg(long, global = true)]
    pub aws_endpoint_url: Option<String>,

    /// Vault server address
    #[arg(long, global = true)]
    pub vault_addr: Option<String>,

    /// Vault namespace
    #[arg(long, global = true)]
    pub vault_namespace: Option<String>,

    /// Vault KV v2 mount path
    #[arg(long, global = true)]
    pub vault_mount: Option<String>,
}

/// Rotation timing flags
#[derive(Args, Debug, Clone, Default)]
pub struct RotationArgs {
    /// Seconds between deletion convergence polls
    #[arg(long, global = true)]
    pub rotation_poll_interval: Option<u64>,

    /// Maximum seconds to wait for a deletion to converge
    #[arg(long, global = true)]
    pub rotation_max_wait: Option<u64>,
}
