//! # Observability
//!
//! Structured logging for the provisioner. See [`logging`].

pub mod logging;

pub use logging::{init_logging, LogFormat};
