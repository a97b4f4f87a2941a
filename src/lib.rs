//! # konnect-provisioner
//!
//! Idempotent provisioning of Kong Konnect control-plane resources, with the
//! credentials they need rotated into a secret store.
//!
//! ## Architecture
//!
//! ```text
//! CLI → ProvisioningPipeline ─┬→ ResourceUpserter → Konnect API
//!                             ├→ CertificateIssuer
//!                             └→ SecretRotator → AWS Secrets Manager / Vault
//! ```
//!
//! ## Core Components
//!
//! - **ResourceUpserter**: find-by-name or create, never duplicating a resource
//! - **CertificateIssuer**: self-signed data-plane certificates (RSA-4096 or Ed25519)
//! - **SecretRotator**: delete, wait for convergence, recreate
//! - **ProvisioningPipeline**: the zone and runtime-group flows
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use konnect_provisioner::{
//!     konnect::{ClientConfig, KonnectClient},
//!     secrets::{InMemorySecretStore, RotationPolicy, SecretString},
//!     services::{ProvisioningPipeline, ZoneProvisioning},
//!     Result,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let client = KonnectClient::new(ClientConfig {
//!         api_version: "v0".to_string(),
//!         token: SecretString::new("kpat_..."),
//!         ..Default::default()
//!     })?;
//!     let pipeline = ProvisioningPipeline::new(
//!         Arc::new(client),
//!         Arc::new(InMemorySecretStore::new()),
//!         100,
//!         RotationPolicy::default(),
//!     );
//!     let result = pipeline
//!         .provision_zone(&ZoneProvisioning {
//!             control_plane_name: "default".to_string(),
//!             zone_name: "z1".to_string(),
//!         })
//!         .await?;
//!     println!("{:?}", result.credential_secret_names);
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod domain;
pub mod errors;
pub mod konnect;
pub mod observability;
pub mod pki;
pub mod secrets;
pub mod services;

// Re-export commonly used types and traits
pub use config::ProvisionerConfig;
pub use errors::{ProvisionError, Result};

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name from Cargo.toml
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
