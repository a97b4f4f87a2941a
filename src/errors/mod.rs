//! # Error Handling
//!
//! Error types for the provisioner. Library code returns [`ProvisionError`];
//! the CLI converts it into a single diagnostic line at the top-level handler.

pub mod types;

pub use types::{ProvisionError, Result};
