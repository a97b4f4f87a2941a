//! Secret store backends.
//!
//! Each backend implements [`SecretStore`](super::SecretStore). Use
//! [`connect`] to build one from configuration.

pub mod aws;
pub mod memory;
pub mod vault;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::error::Result;
use super::store::{SecretBackendType, SecretStore};
use aws::AwsSecretsManagerConfig;
use vault::VaultConfig;

/// Which backend to use and how to reach it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecretStoreConfig {
    pub backend: SecretBackendType,
    #[serde(default)]
    pub aws: AwsSecretsManagerConfig,
    #[serde(default)]
    pub vault: VaultConfig,
}

impl Default for SecretStoreConfig {
    fn default() -> Self {
        Self {
            backend: SecretBackendType::Aws,
            aws: AwsSecretsManagerConfig::default(),
            vault: VaultConfig::default(),
        }
    }
}

/// Build the configured store.
pub async fn connect(config: &SecretStoreConfig) -> Result<Arc<dyn SecretStore>> {
    match config.backend {
        SecretBackendType::Memory => Ok(Arc::new(memory::InMemorySecretStore::new())),
        SecretBackendType::Vault => {
            Ok(Arc::new(vault::VaultSecretStore::new(config.vault.clone()).await?))
        }
        #[cfg(feature = "aws")]
        SecretBackendType::Aws => {
            Ok(Arc::new(aws::AwsSecretsManagerStore::new(config.aws.clone()).await?))
        }
        #[cfg(not(feature = "aws"))]
        SecretBackendType::Aws => Err(super::error::SecretsError::config_error(
            "AWS Secrets Manager support not compiled in. Rebuild with --features aws.",
        )),
    }
}
