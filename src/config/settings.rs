//! # Configuration Settings
//!
//! Defines the configuration structure for the provisioner. Every section
//! has defaults, so a config file only needs the keys it overrides.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;
use validator::Validate;

use crate::errors::{ProvisionError, Result};
use crate::konnect::DEFAULT_API_ENDPOINT;
use crate::pki::CertificateRequest;
use crate::secrets::backends::SecretStoreConfig;
use crate::secrets::{RotationPolicy, SecretString};

/// Main provisioner configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ProvisionerConfig {
    /// Konnect API configuration
    #[validate(nested)]
    pub api: ApiConfig,

    /// Secret rotation timing
    #[validate(nested)]
    pub rotation: RotationConfig,

    /// Data-plane certificate subject and lifetime
    #[validate(nested)]
    pub certificate: CertificateRequest,

    /// Secret store backend
    pub secret_store: SecretStoreConfig,

    /// Personal access token. Prefer `--token-file` or `KONNECT_PAT` over storing it here.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub personal_access_token: Option<SecretString>,
}

impl ProvisionerConfig {
    /// Default configuration file path (~/.konnect-provisioner/config.toml)
    pub fn default_path() -> Option<PathBuf> {
        let home = std::env::var("HOME").or_else(|_| std::env::var("USERPROFILE")).ok()?;

        let mut path = PathBuf::from(home);
        path.push(".konnect-provisioner");
        path.push("config.toml");
        Some(path)
    }

    /// Load configuration.
    ///
    /// An explicit `path` must exist. Without one the default path is used
    /// when present, otherwise built-in defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from_path(path),
            None => match Self::default_path() {
                Some(default) if default.exists() => Self::load_from_path(&default),
                _ => Ok(Self::default()),
            },
        }
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "Loading configuration file");
        let contents = std::fs::read_to_string(path).map_err(|e| {
            ProvisionError::config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;

        toml::from_str(&contents).map_err(|e| {
            ProvisionError::config(format!("Failed to parse config file {}: {}", path.display(), e))
        })
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        Validate::validate(self).map_err(ProvisionError::from)?;

        if self.rotation.max_wait_secs < self.rotation.poll_interval_secs {
            return Err(ProvisionError::config(
                "Rotation max wait must be at least one poll interval",
            ));
        }

        Ok(())
    }

    /// Token from the config file, if set and non-empty
    pub fn token(&self) -> Option<SecretString> {
        self.personal_access_token
            .as_ref()
            .map(|t| t.expose_secret().trim())
            .filter(|t| !t.is_empty())
            .map(SecretString::new)
    }
}

/// Konnect API configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ApiConfig {
    /// Regional API endpoint
    #[validate(url(message = "API endpoint must be a valid URL"))]
    pub endpoint: String,

    /// Overrides the per-command API version (`v2` for runtime groups, `v0` for mesh)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,

    /// Request timeout in seconds
    #[validate(range(min = 1, max = 300, message = "Timeout must be between 1 and 300 seconds"))]
    pub timeout_seconds: u64,

    /// Page size for list calls
    #[validate(range(min = 1, max = 1000, message = "Page size must be between 1 and 1000"))]
    pub page_size: u32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_API_ENDPOINT.to_string(),
            api_version: None,
            timeout_seconds: 30,
            page_size: 100,
        }
    }
}

/// Secret rotation timing
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct RotationConfig {
    /// Seconds between convergence polls after a forced delete
    #[validate(range(min = 1, max = 300, message = "Poll interval must be between 1 and 300 seconds"))]
    pub poll_interval_secs: u64,

    /// Give up waiting for a deletion to converge after this many seconds
    #[validate(range(min = 1, max = 3600, message = "Max wait must be between 1 and 3600 seconds"))]
    pub max_wait_secs: u64,
}

impl Default for RotationConfig {
    fn default() -> Self {
        let policy = RotationPolicy::default();
        Self {
            poll_interval_secs: policy.poll_interval.as_secs(),
            max_wait_secs: policy.max_wait.as_secs(),
        }
    }
}

impl RotationConfig {
    pub fn policy(&self) -> RotationPolicy {
        RotationPolicy {
            poll_interval: Duration::from_secs(self.poll_interval_secs),
            max_wait: Duration::from_secs(self.max_wait_secs),
        }
    }
}
