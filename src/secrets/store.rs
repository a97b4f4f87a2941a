//! Secret store trait and types.
//!
//! The provisioner only needs three primitives from a store: describe a
//! secret by name, force-delete it, and create it with a value. Update in
//! place is deliberately absent; [`SecretRotator`](super::SecretRotator)
//! composes delete and create instead.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::{Result, SecretsError};
use super::types::SecretString;

/// Type of secret store backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecretBackendType {
    /// AWS Secrets Manager
    Aws,
    /// HashiCorp Vault KV v2
    Vault,
    /// Process-local store, for dry runs and tests
    Memory,
}

impl SecretBackendType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Aws => "aws",
            Self::Vault => "vault",
            Self::Memory => "memory",
        }
    }
}

impl FromStr for SecretBackendType {
    type Err = SecretsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "aws" | "aws_secrets_manager" => Ok(Self::Aws),
            "vault" => Ok(Self::Vault),
            "memory" => Ok(Self::Memory),
            other => Err(SecretsError::config_error(format!(
                "Unknown secret store '{}'. Use 'aws', 'vault' or 'memory'.",
                other
            ))),
        }
    }
}

impl fmt::Display for SecretBackendType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What a store reports about a secret, without its value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SecretMetadata {
    /// Secret name (the unique key in the store)
    pub name: String,

    /// Backend identifier, e.g. the AWS ARN or the Vault path
    pub identifier: Option<String>,

    /// When the secret was created, if the backend reports it
    pub created_at: Option<DateTime<Utc>>,

    /// Set while a deletion is in progress on backends that expose it
    pub deleted_at: Option<DateTime<Utc>>,
}

impl SecretMetadata {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), identifier: None, created_at: None, deleted_at: None }
    }

    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = Some(identifier.into());
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }
}

/// Secret store backend.
///
/// Implementations MUST NOT log secret values and MUST report an absent
/// secret as [`SecretsError::NotFound`]; every other error is treated as
/// fatal by the rotator.
#[async_trait]
pub trait SecretStore: Send + Sync + fmt::Debug {
    /// Describe a secret by name.
    ///
    /// # Errors
    ///
    /// - [`SecretsError::NotFound`] if no secret with this name exists
    /// - [`SecretsError::AuthenticationFailed`] if the store rejects our credentials
    async fn describe_secret(&self, name: &str) -> Result<SecretMetadata>;

    /// Delete a secret immediately, without a recovery window.
    ///
    /// Deletion may complete asynchronously: the secret can stay visible to
    /// [`describe_secret`](Self::describe_secret) for a while after this returns.
    async fn force_delete_secret(&self, name: &str) -> Result<()>;

    /// Create a new secret.
    ///
    /// # Errors
    ///
    /// - [`SecretsError::AlreadyExists`] if the name is taken or pending deletion
    async fn create_secret(&self, name: &str, value: &SecretString) -> Result<SecretMetadata>;

    /// Backend type identifier
    fn backend_type(&self) -> SecretBackendType;

    /// Check if a secret exists.
    async fn secret_exists(&self, name: &str) -> Result<bool> {
        match self.describe_secret(name).await {
            Ok(_) => Ok(true),
            Err(SecretsError::NotFound { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }
}
