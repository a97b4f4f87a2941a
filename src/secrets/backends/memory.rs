//! In-memory secret store
//!
//! Mirrors the behaviour of an asynchronous-deletion store: a forced delete can
//! stay visible for a configurable number of describe calls before the secret
//! disappears, and creating a name that is still pending deletion fails. Every
//! call is recorded so callers can assert on the exact sequence of operations.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::secrets::error::{Result, SecretsError};
use crate::secrets::store::{SecretBackendType, SecretMetadata, SecretStore};
use crate::secrets::types::SecretString;

/// A call made against the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    Describe(String),
    Delete(String),
    Create(String),
}

#[derive(Debug)]
struct StoredSecret {
    value: SecretString,
    metadata: SecretMetadata,
    /// Describes remaining before a pending deletion becomes visible
    pending_deletion: Option<u32>,
}

#[derive(Debug, Default)]
struct MemoryState {
    secrets: HashMap<String, StoredSecret>,
    deletion_lag: u32,
    deny_all: bool,
    calls: Vec<StoreCall>,
}

/// Process-local [`SecretStore`]
#[derive(Debug, Clone, Default)]
pub struct InMemorySecretStore {
    state: Arc<RwLock<MemoryState>>,
}

impl InMemorySecretStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep force-deleted secrets visible for `describes` further describe calls
    pub fn with_deletion_lag(describes: u32) -> Self {
        let state = MemoryState { deletion_lag: describes, ..MemoryState::default() };
        Self { state: Arc::new(RwLock::new(state)) }
    }

    /// Seed a secret without recording a call
    pub async fn insert(&self, name: &str, value: &str) {
        let mut state = self.state.write().await;
        state.secrets.insert(
            name.to_string(),
            StoredSecret {
                value: SecretString::new(value),
                metadata: SecretMetadata::new(name)
                    .with_identifier(format!("memory://{}", name))
                    .with_created_at(Utc::now()),
                pending_deletion: None,
            },
        );
    }

    /// Reject every call with an authentication error
    pub async fn deny_all(&self) {
        self.state.write().await.deny_all = true;
    }

    /// Current value of a live secret
    pub async fn value(&self, name: &str) -> Option<String> {
        let state = self.state.read().await;
        state
            .secrets
            .get(name)
            .filter(|s| s.pending_deletion.is_none())
            .map(|s| s.value.expose_secret().to_string())
    }

    /// Names of all secrets, including those pending deletion
    pub async fn names(&self) -> Vec<String> {
        let state = self.state.read().await;
        let mut names: Vec<String> = state.secrets.keys().cloned().collect();
        names.sort();
        names
    }

    /// Every call made so far, in order
    pub async fn calls(&self) -> Vec<StoreCall> {
        self.state.read().await.calls.clone()
    }

    pub async fn delete_count(&self) -> usize {
        self.calls().await.iter().filter(|c| matches!(c, StoreCall::Delete(_))).count()
    }

    pub async fn create_count(&self) -> usize {
        self.calls().await.iter().filter(|c| matches!(c, StoreCall::Create(_))).count()
    }

    fn check_access(state: &MemoryState) -> Result<()> {
        if state.deny_all {
            return Err(SecretsError::authentication_failed("in-memory store denies all access"));
        }
        Ok(())
    }
}

#[async_trait]
impl SecretStore for InMemorySecretStore {
    async fn describe_secret(&self, name: &str) -> Result<SecretMetadata> {
        let mut state = self.state.write().await;
        state.calls.push(StoreCall::Describe(name.to_string()));
        Self::check_access(&state)?;

        let Some(secret) = state.secrets.get_mut(name) else {
            return Err(SecretsError::not_found(name));
        };

        match secret.pending_deletion {
            None => Ok(secret.metadata.clone()),
            Some(0) => {
                state.secrets.remove(name);
                Err(SecretsError::not_found(name))
            }
            Some(remaining) => {
                secret.pending_deletion = Some(remaining - 1);
                Ok(secret.metadata.clone())
            }
        }
    }

    async fn force_delete_secret(&self, name: &str) -> Result<()> {
        let mut state = self.state.write().await;
        state.calls.push(StoreCall::Delete(name.to_string()));
        Self::check_access(&state)?;

        let lag = state.deletion_lag;
        match state.secrets.get_mut(name) {
            None => Err(SecretsError::not_found(name)),
            Some(_) if lag == 0 => {
                state.secrets.remove(name);
                Ok(())
            }
            Some(secret) => {
                secret.metadata.deleted_at = Some(Utc::now());
                secret.pending_deletion = Some(lag);
                Ok(())
            }
        }
    }

    async fn create_secret(&self, name: &str, value: &SecretString) -> Result<SecretMetadata> {
        let mut state = self.state.write().await;
        state.calls.push(StoreCall::Create(name.to_string()));
        Self::check_access(&state)?;

        if name.is_empty() {
            return Err(SecretsError::invalid_key(name, "secret name cannot be empty"));
        }
        if state.secrets.contains_key(name) {
            return Err(SecretsError::already_exists(name));
        }

        let metadata = SecretMetadata::new(name)
            .with_identifier(format!("memory://{}", name))
            .with_created_at(Utc::now());
        state.secrets.insert(
            name.to_string(),
            StoredSecret { value: value.clone(), metadata: metadata.clone(), pending_deletion: None },
        );
        Ok(metadata)
    }

    fn backend_type(&self) -> SecretBackendType {
        SecretBackendType::Memory
    }
}
