//! Error types for secret store operations.

use std::time::Duration;
use thiserror::Error;

/// Result type for secret store operations.
pub type Result<T> = std::result::Result<T, SecretsError>;

/// Errors that can occur during secret store operations.
#[derive(Error, Debug)]
pub enum SecretsError {
    /// Secret not found in the backend.
    ///
    /// The rotator uses this as a control-flow signal; it is never surfaced
    /// for a secret the caller expected to exist.
    #[error("Secret not found: {key}")]
    NotFound { key: String },

    /// A secret with this name already exists (or is still pending deletion).
    #[error("Secret already exists: {key}")]
    AlreadyExists { key: String },

    /// Failed to connect to the secrets backend.
    #[error("Backend connection failed: {message}")]
    ConnectionFailed { message: String },

    /// Authentication with the secrets backend failed.
    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    /// Invalid secret key format.
    #[error("Invalid secret key: {key} - {reason}")]
    InvalidKey { key: String, reason: String },

    /// A forced deletion was not observable as "not found" within the wait budget.
    #[error(
        "Rotation did not converge for secret '{key}': still present after {polls} polls ({}s)",
        waited.as_secs()
    )]
    ConvergenceTimeout { key: String, polls: u32, waited: Duration },

    /// The rotation was cancelled.
    #[error("Rotation cancelled for secret '{key}'")]
    Cancelled { key: String },

    /// Backend-specific error.
    #[error("Backend error: {message}")]
    BackendError { message: String },

    /// Configuration error.
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    /// Generic internal error.
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl SecretsError {
    /// Create a not found error.
    pub fn not_found(key: impl Into<String>) -> Self {
        Self::NotFound { key: key.into() }
    }

    /// Create an already exists error.
    pub fn already_exists(key: impl Into<String>) -> Self {
        Self::AlreadyExists { key: key.into() }
    }

    /// Create a connection failed error.
    pub fn connection_failed(message: impl Into<String>) -> Self {
        Self::ConnectionFailed { message: message.into() }
    }

    /// Create an authentication failed error.
    pub fn authentication_failed(message: impl Into<String>) -> Self {
        Self::AuthenticationFailed { message: message.into() }
    }

    /// Create an invalid key error.
    pub fn invalid_key(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidKey { key: key.into(), reason: reason.into() }
    }

    /// Create a convergence timeout error.
    pub fn convergence_timeout(key: impl Into<String>, polls: u32, waited: Duration) -> Self {
        Self::ConvergenceTimeout { key: key.into(), polls, waited }
    }

    /// Create a cancellation error.
    pub fn cancelled(key: impl Into<String>) -> Self {
        Self::Cancelled { key: key.into() }
    }

    /// Create a backend error.
    pub fn backend_error(message: impl Into<String>) -> Self {
        Self::BackendError { message: message.into() }
    }

    /// Create a config error.
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::ConfigError { message: message.into() }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal { message: message.into() }
    }

    /// True if this is the store's "no such secret" signal.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
