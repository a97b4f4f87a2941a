//! Secret rotation over a store without update-in-place.
//!
//! A rotation walks a small state machine:
//!
//! ```text
//! CHECK ──absent──────────────────────────────▶ CREATE ──▶ DONE
//!   │                                             ▲
//!   └─present──▶ DELETE ──▶ WAIT_ABSENT ──────────┘
//! ```
//!
//! `CHECK` and `WAIT_ABSENT` both rely on the store reporting
//! [`SecretsError::NotFound`]; any other error at any state aborts the
//! rotation. `WAIT_ABSENT` polls on a fixed interval and gives up with
//! [`SecretsError::ConvergenceTimeout`] once the wait budget is spent.
//!
//! While `WAIT_ABSENT` runs the secret does not exist at all, so callers must
//! not rotate names that need to stay readable throughout.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::error::{Result, SecretsError};
use super::store::{SecretMetadata, SecretStore};
use super::types::SecretString;

/// Default interval between convergence polls
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Default upper bound on the convergence wait
pub const DEFAULT_MAX_WAIT: Duration = Duration::from_secs(300);

/// Timing of the convergence wait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotationPolicy {
    pub poll_interval: Duration,
    pub max_wait: Duration,
}

impl Default for RotationPolicy {
    fn default() -> Self {
        Self { poll_interval: DEFAULT_POLL_INTERVAL, max_wait: DEFAULT_MAX_WAIT }
    }
}

/// How a successful rotation reached its final state
#[derive(Debug, Clone, PartialEq)]
pub enum RotationOutcome {
    /// No previous value existed
    Created(SecretMetadata),
    /// A previous value was force-deleted; `polls` describes were needed to observe it gone
    Replaced { metadata: SecretMetadata, polls: u32 },
}

impl RotationOutcome {
    pub fn metadata(&self) -> &SecretMetadata {
        match self {
            Self::Created(metadata) => metadata,
            Self::Replaced { metadata, .. } => metadata,
        }
    }

    pub fn replaced_existing(&self) -> bool {
        matches!(self, Self::Replaced { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RotationState {
    Check,
    Delete,
    WaitAbsent,
    Create { polls: u32 },
}

/// Replaces the value stored under a name with delete-wait-create.
#[derive(Debug, Clone)]
pub struct SecretRotator {
    store: Arc<dyn SecretStore>,
    policy: RotationPolicy,
    cancel: CancellationToken,
}

impl SecretRotator {
    pub fn new(store: Arc<dyn SecretStore>, policy: RotationPolicy) -> Self {
        Self { store, policy, cancel: CancellationToken::new() }
    }

    /// Abort polling and in-flight store calls when `cancel` fires
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn policy(&self) -> RotationPolicy {
        self.policy
    }

    pub fn store(&self) -> &Arc<dyn SecretStore> {
        &self.store
    }

    /// Guarantee that, on success, exactly one secret named `name` holds `value`.
    pub async fn rotate(&self, name: &str, value: &SecretString) -> Result<RotationOutcome> {
        if name.trim().is_empty() {
            return Err(SecretsError::invalid_key(name, "secret name cannot be empty"));
        }

        let mut state = RotationState::Check;
        loop {
            state = match state {
                RotationState::Check => {
                    match self.guard(name, self.store.describe_secret(name)).await {
                        Ok(_) => {
                            info!(secret = %name, "Secret exists, forcing deletion before recreation");
                            RotationState::Delete
                        }
                        Err(SecretsError::NotFound { .. }) => {
                            debug!(secret = %name, "Secret not found, creating");
                            RotationState::Create { polls: 0 }
                        }
                        Err(e) => return Err(e),
                    }
                }
                RotationState::Delete => {
                    self.guard(name, self.store.force_delete_secret(name)).await?;
                    RotationState::WaitAbsent
                }
                RotationState::WaitAbsent => {
                    let polls = self.wait_absent(name).await?;
                    RotationState::Create { polls }
                }
                RotationState::Create { polls } => {
                    let metadata = self.guard(name, self.store.create_secret(name, value)).await?;
                    info!(
                        secret = %name,
                        backend = %self.store.backend_type(),
                        replaced = polls > 0,
                        "Secret stored"
                    );
                    return Ok(if polls > 0 {
                        RotationOutcome::Replaced { metadata, polls }
                    } else {
                        RotationOutcome::Created(metadata)
                    });
                }
            };
        }
    }

    /// Poll until the store reports the secret gone. Returns the number of polls made.
    async fn wait_absent(&self, name: &str) -> Result<u32> {
        let started = Instant::now();
        let deadline = started + self.policy.max_wait;
        let mut polls = 0u32;

        loop {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return Err(SecretsError::cancelled(name)),
                _ = tokio::time::sleep(self.policy.poll_interval) => {}
            }
            polls += 1;

            match self.guard(name, self.store.describe_secret(name)).await {
                Err(SecretsError::NotFound { .. }) => {
                    debug!(secret = %name, polls, "Deletion converged");
                    return Ok(polls);
                }
                Err(e) => return Err(e),
                Ok(_) if Instant::now() >= deadline => {
                    return Err(SecretsError::convergence_timeout(name, polls, started.elapsed()));
                }
                Ok(_) => {
                    debug!(secret = %name, polls, "Secret still exists, waiting for deletion");
                }
            }
        }
    }

    async fn guard<T>(&self, name: &str, operation: impl Future<Output = Result<T>>) -> Result<T> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(SecretsError::cancelled(name)),
            result = operation => result,
        }
    }
}
