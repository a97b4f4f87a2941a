//! # Error Types
//!
//! Error taxonomy for the provisioning pipeline using `thiserror`.

use crate::secrets::SecretsError;

/// Custom result type for provisioning operations
pub type Result<T> = std::result::Result<T, ProvisionError>;

/// Main error type for the provisioner
#[derive(thiserror::Error, Debug)]
pub enum ProvisionError {
    /// Invalid flag, environment or configuration value. Raised before any network call.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The management API rejected the personal access token (401)
    #[error(
        "Unauthorized during {operation}: validate the personal access token and Konnect RBAC permissions"
    )]
    Unauthorized { operation: String },

    /// The management API reported that the resource already exists (409)
    #[error("Conflict during {operation}: {message}")]
    Conflict { operation: String, message: String },

    /// Any other non-success HTTP status
    #[error("HTTP error during {operation}: status {status}: {body}")]
    Http { operation: String, status: u16, body: String },

    /// Network-level failure talking to the management API
    #[error("Transport error during {operation}: {source}")]
    Transport {
        operation: String,
        #[source]
        source: reqwest::Error,
    },

    /// Response body could not be decoded
    #[error("Failed to decode response for {operation}: {message}")]
    Decode { operation: String, message: String },

    /// Key generation or certificate encoding failure
    #[error("Certificate error: {0}")]
    Certificate(String),

    /// Secret store failure, including rotation convergence timeouts
    #[error(transparent)]
    Secrets(#[from] SecretsError),

    /// The run was cancelled before the operation completed
    #[error("Operation cancelled: {operation}")]
    Cancelled { operation: String },

    /// Internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ProvisionError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    /// Create an unauthorized error for the named operation
    pub fn unauthorized<S: Into<String>>(operation: S) -> Self {
        Self::Unauthorized { operation: operation.into() }
    }

    /// Create a conflict error
    pub fn conflict<O: Into<String>, M: Into<String>>(operation: O, message: M) -> Self {
        Self::Conflict { operation: operation.into(), message: message.into() }
    }

    /// Create an HTTP status error
    pub fn http<O: Into<String>, B: Into<String>>(operation: O, status: u16, body: B) -> Self {
        Self::Http { operation: operation.into(), status, body: body.into() }
    }

    /// Create a decode error
    pub fn decode<O: Into<String>, M: Into<String>>(operation: O, message: M) -> Self {
        Self::Decode { operation: operation.into(), message: message.into() }
    }

    /// Create a certificate error
    pub fn certificate<S: Into<String>>(message: S) -> Self {
        Self::Certificate(message.into())
    }

    /// Create a cancellation error
    pub fn cancelled<S: Into<String>>(operation: S) -> Self {
        Self::Cancelled { operation: operation.into() }
    }

    /// Create an internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal(message.into())
    }

    /// True when the user can fix the failure by changing input or credentials
    pub fn is_user_actionable(&self) -> bool {
        matches!(
            self,
            ProvisionError::Config(_)
                | ProvisionError::Unauthorized { .. }
                | ProvisionError::Conflict { .. }
                | ProvisionError::Secrets(SecretsError::AuthenticationFailed { .. })
        )
    }

    /// Remote operation the error was raised from, when there is one
    pub fn operation(&self) -> Option<&str> {
        match self {
            ProvisionError::Unauthorized { operation }
            | ProvisionError::Conflict { operation, .. }
            | ProvisionError::Http { operation, .. }
            | ProvisionError::Transport { operation, .. }
            | ProvisionError::Decode { operation, .. }
            | ProvisionError::Cancelled { operation } => Some(operation),
            _ => None,
        }
    }

    /// True for 401-class failures from either the management API or the secret store
    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            ProvisionError::Unauthorized { .. }
                | ProvisionError::Secrets(SecretsError::AuthenticationFailed { .. })
        )
    }
}

impl From<validator::ValidationErrors> for ProvisionError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields = Vec::new();
        collect_validation_errors("", &errors, &mut fields);
        fields.sort();

        Self::config(format!("Validation failed: {}", fields.join("; ")))
    }
}

/// Flatten nested validation errors into `path.to.field: message` entries
fn collect_validation_errors(
    prefix: &str,
    errors: &validator::ValidationErrors,
    out: &mut Vec<String>,
) {
    use validator::ValidationErrorsKind;

    for (field, kind) in errors.errors() {
        let path =
            if prefix.is_empty() { field.to_string() } else { format!("{}.{}", prefix, field) };
        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                let error_messages: Vec<String> = field_errors
                    .iter()
                    .map(|e| {
                        e.message.as_ref().map_or("Invalid value".to_string(), |m| m.to_string())
                    })
                    .collect();
                out.push(format!("{}: {}", path, error_messages.join(", ")));
            }
            ValidationErrorsKind::Struct(nested) => collect_validation_errors(&path, nested, out),
            ValidationErrorsKind::List(items) => {
                for (index, nested) in items {
                    collect_validation_errors(&format!("{}[{}]", path, index), nested, out);
                }
            }
        }
    }
}
