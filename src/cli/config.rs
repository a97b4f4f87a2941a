//! Configuration resolution for the CLI
//!
//! Each setting is taken from the first source that provides it:
//! 1. command line flag (or its `KONNECT_*` environment variable)
//! 2. ~/.konnect-provisioner/config.toml (or `--config`)
//! 3. built-in default

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

use super::args::{ConnectionArgs, RotationArgs, StoreArgs};
use crate::config::ProvisionerConfig;
use crate::secrets::SecretString;

/// Build the effective configuration from the config file and flags.
pub fn resolve_config(
    config_path: Option<&Path>,
    connection: &ConnectionArgs,
    store: &StoreArgs,
    rotation: &RotationArgs,
) -> Result<ProvisionerConfig> {
    let mut config = ProvisionerConfig::load(config_path)?;

    if let Some(endpoint) = &connection.api_endpoint {
        config.api.endpoint = endpoint.clone();
    }
    if let Some(version) = &connection.api_version {
        config.api.api_version = Some(version.clone());
    }
    if let Some(timeout) = connection.timeout {
        config.api.timeout_seconds = timeout;
    }
    if let Some(page_size) = connection.page_size {
        config.api.page_size = page_size;
    }

    let secret_store = &mut config.secret_store;
    if let Some(backend) = store.secret_store {
        secret_store.backend = backend;
    }
    if let Some(region) = &store.aws_region {
        secret_store.aws.region = Some(region.clone());
    }
    if let Some(endpoint) = &store.aws_endpoint_url {
        secret_store.aws.endpoint_url = Some(endpoint.clone());
    }
    secret_store.vault = std::mem::take(&mut secret_store.vault).merge_env();
    if let Some(addr) = &store.vault_addr {
        secret_store.vault.address = addr.clone();
    }
    if let Some(namespace) = &store.vault_namespace {
        secret_store.vault.namespace = Some(namespace.clone());
    }
    if let Some(mount) = &store.vault_mount {
        secret_store.vault.mount_path = mount.clone();
    }

    if let Some(interval) = rotation.rotation_poll_interval {
        config.rotation.poll_interval_secs = interval;
    }
    if let Some(max_wait) = rotation.rotation_max_wait {
        config.rotation.max_wait_secs = max_wait;
    }

    Ok(config)
}

/// Resolve the personal access token from multiple sources
///
/// Checks sources in the following priority order:
/// 1. --personal-access-token flag or KONNECT_PAT
/// 2. --token-file flag
/// 3. personal_access_token in the config file
pub fn resolve_token(
    token_flag: Option<String>,
    token_file_flag: Option<PathBuf>,
    config: &ProvisionerConfig,
) -> Result<SecretString> {
    if let Some(token) = token_flag.filter(|t| !t.trim().is_empty()) {
        debug!("Using token from --personal-access-token flag");
        return Ok(SecretString::new(token.trim()));
    }

    if let Some(token_file) = token_file_flag {
        debug!("Reading token from file: {}", token_file.display());
        let token = std::fs::read_to_string(&token_file)
            .with_context(|| format!("Failed to read token file: {}", token_file.display()))?;
        let token = token.trim();

        if token.is_empty() {
            anyhow::bail!("Token file is empty: {}", token_file.display());
        }

        return Ok(SecretString::new(token));
    }

    if let Some(token) = config.token() {
        debug!("Using token from config file");
        return Ok(token);
    }

    anyhow::bail!(
        "No personal access token found. Please provide one via \
         --personal-access-token, KONNECT_PAT, --token-file or \
         ~/.konnect-provisioner/config.toml"
    )
}
