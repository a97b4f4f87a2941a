//! HashiCorp Vault KV v2 secret store
//!
//! Maps the store primitives onto KV v2:
//! - describe: `read_metadata` (404 means absent)
//! - force delete: `delete_metadata`, which drops every version with no undelete
//! - create: `set`, storing the payload under a `value` field
//!
//! ## Configuration
//!
//! - `VAULT_ADDR`: Vault server address
//! - `VAULT_TOKEN`: Authentication token
//! - `VAULT_NAMESPACE`: Optional namespace
//! - `VAULT_MOUNT_PATH`: KV v2 mount path (default: "secret")

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{error, info};
use vaultrs::client::{VaultClient, VaultClientSettingsBuilder};
use vaultrs::error::ClientError;
use vaultrs::kv2;

use crate::secrets::error::{Result, SecretsError};
use crate::secrets::store::{SecretBackendType, SecretMetadata, SecretStore};
use crate::secrets::types::SecretString;

/// Field the payload is stored under inside the KV v2 secret
const VALUE_FIELD: &str = "value";

/// Configuration for the Vault store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VaultConfig {
    /// Vault server address (e.g., "https://vault.example.com:8200")
    pub address: String,

    /// Vault authentication token
    pub token: Option<SecretString>,

    /// Vault namespace (for Enterprise multi-tenancy)
    pub namespace: Option<String>,

    /// KV v2 mount path (default: "secret")
    pub mount_path: String,
}

fn default_mount_path() -> String {
    "secret".to_string()
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            address: "http://127.0.0.1:8200".to_string(),
            token: None,
            namespace: None,
            mount_path: default_mount_path(),
        }
    }
}

impl VaultConfig {
    /// Override fields with any `VAULT_*` environment variables that are set.
    pub fn merge_env(mut self) -> Self {
        if let Ok(address) = std::env::var("VAULT_ADDR") {
            self.address = address;
        }
        if let Ok(token) = std::env::var("VAULT_TOKEN") {
            self.token = Some(SecretString::new(token));
        }
        if let Ok(namespace) = std::env::var("VAULT_NAMESPACE") {
            self.namespace = Some(namespace);
        }
        if let Ok(mount_path) = std::env::var("VAULT_MOUNT_PATH") {
            self.mount_path = mount_path;
        }
        self
    }
}

/// [`SecretStore`] backed by Vault KV v2
pub struct VaultSecretStore {
    client: VaultClient,
    address: String,
    mount_path: String,
}

impl std::fmt::Debug for VaultSecretStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultSecretStore")
            .field("address", &self.address)
            .field("mount_path", &self.mount_path)
            .field("client", &"[VaultClient]")
            .finish()
    }
}

impl VaultSecretStore {
    /// Creates a new Vault store and verifies the server is reachable.
    ///
    /// # Errors
    ///
    /// - [`SecretsError::ConfigError`] if the configuration is invalid
    /// - [`SecretsError::ConnectionFailed`] if Vault is unreachable
    pub async fn new(config: VaultConfig) -> Result<Self> {
        if config.address.is_empty() {
            return Err(SecretsError::config_error("Vault address cannot be empty"));
        }

        let mut settings_builder = VaultClientSettingsBuilder::default();
        settings_builder.address(&config.address);

        if let Some(ref token) = config.token {
            settings_builder.token(token.expose_secret());
        }

        if let Some(namespace) = config.namespace.clone() {
            settings_builder.namespace(Some(namespace));
        }

        let settings = settings_builder.build().map_err(|e| {
            SecretsError::config_error(format!("Invalid Vault configuration: {}", e))
        })?;

        let client = VaultClient::new(settings).map_err(|e| {
            SecretsError::connection_failed(format!("Failed to create Vault client: {}", e))
        })?;

        if let Err(e) = vaultrs::sys::health(&client).await {
            error!(error = %e, address = %config.address, "Failed to connect to Vault");
            return Err(SecretsError::connection_failed(format!(
                "Vault health check failed: {}",
                e
            )));
        }
        info!(address = %config.address, mount_path = %config.mount_path, "Connected to Vault");

        Ok(Self { client, address: config.address, mount_path: config.mount_path })
    }

    fn path_identifier(&self, name: &str) -> String {
        format!("{}/{}", self.mount_path, name)
    }
}

/// Translate a Vault client error into the store taxonomy.
fn classify(name: &str, operation: &str, err: ClientError) -> SecretsError {
    match err {
        ClientError::APIError { code: 404, .. } => SecretsError::not_found(name),
        ClientError::APIError { code: 401 | 403, errors } => SecretsError::authentication_failed(
            format!("Vault denied {} for '{}': {}", operation, name, errors.join(", ")),
        ),
        other => SecretsError::backend_error(format!(
            "Vault {} failed for '{}': {}",
            operation, name, other
        )),
    }
}

fn parse_vault_time(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value).ok().map(|dt| dt.with_timezone(&Utc))
}

#[async_trait]
impl SecretStore for VaultSecretStore {
    async fn describe_secret(&self, name: &str) -> Result<SecretMetadata> {
        let metadata = kv2::read_metadata(&self.client, &self.mount_path, name)
            .await
            .map_err(|e| classify(name, "describe", e))?;

        let mut described = SecretMetadata::new(name).with_identifier(self.path_identifier(name));
        described.created_at = parse_vault_time(&metadata.created_time);
        Ok(described)
    }

    async fn force_delete_secret(&self, name: &str) -> Result<()> {
        kv2::delete_metadata(&self.client, &self.mount_path, name)
            .await
            .map_err(|e| classify(name, "delete", e))?;

        info!(secret = %name, mount_path = %self.mount_path, "Deleted all versions of secret");
        Ok(())
    }

    async fn create_secret(&self, name: &str, value: &SecretString) -> Result<SecretMetadata> {
        let mut data = HashMap::new();
        data.insert(VALUE_FIELD.to_string(), value.expose_secret().to_string());

        let version = kv2::set(&self.client, &self.mount_path, name, &data)
            .await
            .map_err(|e| classify(name, "create", e))?;

        let mut created = SecretMetadata::new(name).with_identifier(self.path_identifier(name));
        created.created_at = parse_vault_time(&version.created_time);
        Ok(created)
    }

    fn backend_type(&self) -> SecretBackendType {
        SecretBackendType::Vault
    }
}
