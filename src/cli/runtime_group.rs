//! `runtime-group` commands

use anyhow::Result;
use clap::{Args, Subcommand};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use validator::Validate;

use super::{output, Runtime};
use crate::domain::ClusterType;
use crate::errors::ProvisionError;
use crate::pki::{CertificateRequest, KeyAlgorithm};
use crate::services::{ProvisioningPipeline, RuntimeGroupProvisioning};

/// API version used by the runtime group endpoints
pub const RUNTIME_GROUP_API_VERSION: &str = "v2";

#[derive(Subcommand, Debug)]
pub enum RuntimeGroupCommands {
    /// Create (or reuse) a runtime group, issue its data-plane certificate and store the credentials
    Create(CreateRuntimeGroupArgs),
}

#[derive(Args, Debug, Clone)]
pub struct CreateRuntimeGroupArgs {
    /// Runtime group name
    #[arg(long, default_value = "default", env = "KONNECT_RUNTIME_GROUP_NAME")]
    pub runtime_group_name: String,

    /// Cluster type: CLUSTER_TYPE_HYBRID, CLUSTER_TYPE_K8S_INGRESS_CONTROLLER or CLUSTER_TYPE_COMPOSITE
    #[arg(long, default_value = "CLUSTER_TYPE_HYBRID", env = "KONNECT_CLUSTER_TYPE")]
    pub cluster_type: String,

    /// Certificate common name
    #[arg(long)]
    pub cert_common_name: Option<String>,

    /// Certificate organization
    #[arg(long)]
    pub cert_organization: Option<String>,

    /// Certificate two-letter country code
    #[arg(long)]
    pub cert_country: Option<String>,

    /// Certificate validity in days
    #[arg(long)]
    pub cert_validity_days: Option<u32>,

    /// Key algorithm: rsa4096 or ed25519
    #[arg(long)]
    pub key_algorithm: Option<String>,
}

impl CreateRuntimeGroupArgs {
    /// Overlay certificate flags on the configured defaults
    pub fn certificate_request(&self, base: &CertificateRequest) -> Result<CertificateRequest> {
        let mut request = base.clone();
        if let Some(cn) = &self.cert_common_name {
            request.common_name = cn.clone();
        }
        if let Some(org) = &self.cert_organization {
            request.organization = org.clone();
        }
        if let Some(country) = &self.cert_country {
            request.country = country.clone();
        }
        if let Some(days) = self.cert_validity_days {
            request.validity_days = days;
        }
        if let Some(algorithm) = &self.key_algorithm {
            request.algorithm = algorithm.parse::<KeyAlgorithm>()?;
        }
        Ok(request)
    }
}

pub async fn handle_runtime_group_command(
    command: RuntimeGroupCommands,
    runtime: Runtime,
    cancel: CancellationToken,
) -> Result<()> {
    match command {
        RuntimeGroupCommands::Create(args) => create(args, runtime, cancel).await,
    }
}

async fn create(
    args: CreateRuntimeGroupArgs,
    runtime: Runtime,
    cancel: CancellationToken,
) -> Result<()> {
    // Reject bad input before any network call
    let cluster_type: ClusterType = args.cluster_type.parse()?;
    let certificate = args.certificate_request(&runtime.config.certificate)?;
    certificate.validate().map_err(ProvisionError::from)?;

    let client = runtime.konnect_client(RUNTIME_GROUP_API_VERSION)?;
    let store = runtime.secret_store().await?;
    let pipeline = ProvisioningPipeline::new(
        Arc::new(client),
        store,
        runtime.config.api.page_size,
        runtime.config.rotation.policy(),
    )
    .with_cancellation(cancel);

    let result = pipeline
        .provision_runtime_group(&RuntimeGroupProvisioning {
            runtime_group_name: args.runtime_group_name,
            cluster_type,
            certificate,
            personal_access_token: runtime.token.clone(),
        })
        .await?;

    output::print_json(&result.summary)
}
