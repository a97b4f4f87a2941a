//! AWS Secrets Manager secret store
//!
//! Secrets Manager has no synchronous delete: `DeleteSecret` with
//! `ForceDeleteWithoutRecovery` returns immediately while the secret stays
//! visible to `DescribeSecret` for a few seconds, and `CreateSecret` on the
//! same name is refused until it is gone. The rotator's wait state covers that.
//!
//! Credentials and region come from the standard AWS provider chain unless
//! overridden in [`AwsSecretsManagerConfig`].

use serde::{Deserialize, Serialize};

#[cfg(any(feature = "aws", test))]
use crate::secrets::error::SecretsError;

/// Configuration for the AWS Secrets Manager store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AwsSecretsManagerConfig {
    /// AWS region (auto-detected from the environment if None)
    pub region: Option<String>,

    /// Custom endpoint URL, e.g. LocalStack
    pub endpoint_url: Option<String>,
}

/// Map a Secrets Manager error code onto the store taxonomy.
#[cfg(any(feature = "aws", test))]
fn classify_code(name: &str, operation: &str, code: &str, message: &str) -> SecretsError {
    match code {
        "ResourceNotFoundException" => SecretsError::not_found(name),
        "ResourceExistsException" => SecretsError::already_exists(name),
        // Creating a name whose forced deletion has not finished yet
        "InvalidRequestException" if message.contains("scheduled for deletion") => {
            SecretsError::already_exists(name)
        }
        "AccessDeniedException"
        | "UnrecognizedClientException"
        | "InvalidSignatureException"
        | "ExpiredTokenException" => SecretsError::authentication_failed(format!(
            "AWS Secrets Manager denied {} for '{}': {} {}",
            operation, name, code, message
        )),
        _ => SecretsError::backend_error(format!(
            "AWS Secrets Manager {} failed for '{}': {} {}",
            operation, name, code, message
        )),
    }
}

#[cfg(feature = "aws")]
pub use client::AwsSecretsManagerStore;

#[cfg(feature = "aws")]
mod client {
    use async_trait::async_trait;
    use aws_sdk_secretsmanager::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
    use aws_sdk_secretsmanager::Client as SecretsManagerClient;
    use chrono::{DateTime, Utc};
    use tracing::{debug, info};

    use super::{classify_code, AwsSecretsManagerConfig};
    use crate::secrets::error::{Result, SecretsError};
    use crate::secrets::store::{SecretBackendType, SecretMetadata, SecretStore};
    use crate::secrets::types::SecretString;

    /// [`SecretStore`] backed by AWS Secrets Manager
    #[derive(Debug, Clone)]
    pub struct AwsSecretsManagerStore {
        client: SecretsManagerClient,
    }

    impl AwsSecretsManagerStore {
        /// Build a client from the AWS provider chain plus the given overrides.
        pub async fn new(config: AwsSecretsManagerConfig) -> Result<Self> {
            let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());

            if let Some(region) = &config.region {
                loader = loader.region(aws_config::Region::new(region.clone()));
            }

            if let Some(endpoint) = &config.endpoint_url {
                loader = loader.endpoint_url(endpoint);
            }

            let sdk_config = loader.load().await;
            if sdk_config.region().is_none() {
                return Err(SecretsError::config_error(
                    "No AWS region configured. Set AWS_REGION or pass --aws-region.",
                ));
            }

            info!(
                region = ?sdk_config.region().map(|r| r.to_string()),
                endpoint = ?config.endpoint_url,
                "Initialised AWS Secrets Manager client"
            );

            Ok(Self { client: SecretsManagerClient::new(&sdk_config) })
        }

        /// Wrap an existing SDK client.
        pub fn from_client(client: SecretsManagerClient) -> Self {
            Self { client }
        }
    }

    fn classify<E, R>(name: &str, operation: &str, err: SdkError<E, R>) -> SecretsError
    where
        E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
        R: std::fmt::Debug,
    {
        match err.as_service_error() {
            Some(service) => classify_code(
                name,
                operation,
                service.code().unwrap_or("Unknown"),
                service.message().unwrap_or_default(),
            ),
            None => SecretsError::connection_failed(format!(
                "AWS Secrets Manager {} for '{}' failed: {}",
                operation,
                name,
                DisplayErrorContext(&err)
            )),
        }
    }

    fn to_chrono(dt: &aws_sdk_secretsmanager::primitives::DateTime) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(dt.secs(), dt.subsec_nanos())
    }

    #[async_trait]
    impl SecretStore for AwsSecretsManagerStore {
        async fn describe_secret(&self, name: &str) -> Result<SecretMetadata> {
            let output = self
                .client
                .describe_secret()
                .secret_id(name)
                .send()
                .await
                .map_err(|e| classify(name, "describe", e))?;

            let mut metadata = SecretMetadata::new(name);
            metadata.identifier = output.arn().map(str::to_string);
            metadata.created_at = output.created_date().and_then(to_chrono);
            metadata.deleted_at = output.deleted_date().and_then(to_chrono);
            Ok(metadata)
        }

        async fn force_delete_secret(&self, name: &str) -> Result<()> {
            self.client
                .delete_secret()
                .secret_id(name)
                .force_delete_without_recovery(true)
                .send()
                .await
                .map_err(|e| classify(name, "delete", e))?;

            debug!(secret = %name, "Requested forced deletion");
            Ok(())
        }

        async fn create_secret(&self, name: &str, value: &SecretString) -> Result<SecretMetadata> {
            let output = self
                .client
                .create_secret()
                .name(name)
                .secret_string(value.expose_secret())
                .send()
                .await
                .map_err(|e| classify(name, "create", e))?;

            let mut metadata = SecretMetadata::new(name).with_created_at(Utc::now());
            metadata.identifier = output.arn().map(str::to_string);
            Ok(metadata)
        }

        fn backend_type(&self) -> SecretBackendType {
            SecretBackendType::Aws
        }
    }
}
