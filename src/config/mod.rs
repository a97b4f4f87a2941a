//! # Configuration Management
//!
//! [`ProvisionerConfig`] is loaded from `~/.konnect-provisioner/config.toml`
//! (or `--config`), then overridden by CLI flags and `KONNECT_*` environment
//! variables in the CLI layer.

pub mod settings;

pub use settings::{ApiConfig, ProvisionerConfig, RotationConfig};
