//! Secret storage for issued credentials.
//!
//! Everything the provisioner produces (zone tokens, certificates, private
//! keys, the personal access token) ends up in a [`SecretStore`] under a
//! deterministic name. Stores expose only describe, force-delete and create;
//! [`SecretRotator`] turns those into an idempotent "make this name hold this
//! value" operation.
//!
//! # Backends
//!
//! - **AWS Secrets Manager** (`aws` feature, default)
//! - **HashiCorp Vault** KV v2
//! - **In-memory**, for dry runs and tests
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use konnect_provisioner::secrets::{
//!     InMemorySecretStore, RotationPolicy, SecretRotator, SecretString,
//! };
//!
//! let rotator = SecretRotator::new(Arc::new(InMemorySecretStore::new()), RotationPolicy::default());
//! rotator.rotate("cp-id-zone", &SecretString::new("token")).await?;
//! ```
//!
//! # Security Considerations
//!
//! - Secret values are wrapped in [`SecretString`] and never logged
//! - Values are zeroed on drop

pub mod backends;
pub mod error;
pub mod rotator;
pub mod store;
pub mod types;

pub use backends::aws::AwsSecretsManagerConfig;
#[cfg(feature = "aws")]
pub use backends::aws::AwsSecretsManagerStore;
pub use backends::memory::{InMemorySecretStore, StoreCall};
pub use backends::vault::{VaultConfig, VaultSecretStore};
pub use error::SecretsError;
pub use rotator::{RotationOutcome, RotationPolicy, SecretRotator};
pub use store::{SecretBackendType, SecretMetadata, SecretStore};
pub use types::SecretString;
