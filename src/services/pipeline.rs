//! End-to-end provisioning flows.
//!
//! Each flow runs strictly in order and stops at the first failure; nothing
//! already created remotely is rolled back.

use std::collections::BTreeSet;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{info, Instrument};

use super::upserter::ResourceUpserter;
use crate::domain::{
    access_token_secret_name, certificate_secret_name, private_key_secret_name,
    zone_token_secret_name, ClusterType, NamedResource, ProvisioningResult, ProvisioningSummary,
    RuntimeGroupSummary, ZoneSummary,
};
use crate::errors::{ProvisionError, Result};
use crate::konnect::{CreateRequest, ResourceApi};
use crate::pki::{CertificateIssuer, CertificateRequest, CredentialBundle};
use crate::provision_span;
use crate::secrets::{RotationPolicy, SecretRotator, SecretStore, SecretString};

/// Inputs for `mesh-manager create-zone`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneProvisioning {
    pub control_plane_name: String,
    pub zone_name: String,
}

/// Inputs for `runtime-group create`
#[derive(Debug, Clone)]
pub struct RuntimeGroupProvisioning {
    pub runtime_group_name: String,
    pub cluster_type: ClusterType,
    pub certificate: CertificateRequest,
    /// Stored as `{id}-pat-token` for the data plane's own use
    pub personal_access_token: SecretString,
}

/// Builds the resource hierarchy and stores its credentials
#[derive(Debug, Clone)]
pub struct ProvisioningPipeline {
    upserter: ResourceUpserter,
    rotator: SecretRotator,
    issuer: CertificateIssuer,
    cancel: CancellationToken,
}

impl ProvisioningPipeline {
    pub fn new(
        api: Arc<dyn ResourceApi>,
        store: Arc<dyn SecretStore>,
        page_size: u32,
        policy: RotationPolicy,
    ) -> Self {
        Self {
            upserter: ResourceUpserter::new(api, page_size),
            rotator: SecretRotator::new(store, policy),
            issuer: CertificateIssuer::new(),
            cancel: CancellationToken::new(),
        }
    }

    /// Abort remote calls, certificate generation and rotation polling when `cancel` fires
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.upserter = self.upserter.with_cancellation(cancel.clone());
        self.rotator = self.rotator.with_cancellation(cancel.clone());
        self.cancel = cancel;
        self
    }

    /// Upsert the global control plane, provision the zone and store its token.
    pub async fn provision_zone(&self, request: &ZoneProvisioning) -> Result<ProvisioningResult> {
        let span = provision_span!(
            "create-zone",
            control_plane = %request.control_plane_name,
            zone = %request.zone_name
        );
        self.run_zone(request).instrument(span).await
    }

    async fn run_zone(&self, request: &ZoneProvisioning) -> Result<ProvisioningResult> {
        let control_plane = self
            .upserter
            .find_or_create(&CreateRequest::control_plane(&request.control_plane_name))
            .await?
            .resource;

        let zone = self
            .upserter
            .create_exclusive(&CreateRequest::zone(&control_plane.id, &request.zone_name))
            .await?;
        let token = zone.credential.ok_or_else(|| {
            ProvisionError::decode("provision zone", "response did not include a zone token")
        })?;

        let secret_name = zone_token_secret_name(&control_plane.id, &request.zone_name);
        self.rotator.rotate(&secret_name, &token).await?;
        info!(secret = %secret_name, "Zone token stored");

        let summary = ProvisioningSummary::Zone(ZoneSummary {
            global_control_plane_name: control_plane.name.clone(),
            global_control_plane_id: control_plane.id.clone(),
            zone_name: request.zone_name.clone(),
            zone_token_secret_name: secret_name.clone(),
        });

        Ok(ProvisioningResult {
            control_plane_name: control_plane.name,
            control_plane_id: control_plane.id,
            zone_name: Some(request.zone_name.clone()),
            credential_secret_names: BTreeSet::from([secret_name]),
            summary,
        })
    }

    /// Upsert the runtime group, issue and register its data-plane
    /// certificate, and store certificate, key and access token.
    pub async fn provision_runtime_group(
        &self,
        request: &RuntimeGroupProvisioning,
    ) -> Result<ProvisioningResult> {
        let span = provision_span!(
            "runtime-group",
            runtime_group = %request.runtime_group_name,
            cluster_type = %request.cluster_type
        );
        self.run_runtime_group(request).instrument(span).await
    }

    async fn run_runtime_group(
        &self,
        request: &RuntimeGroupProvisioning,
    ) -> Result<ProvisioningResult> {
        let create =
            CreateRequest::runtime_group(&request.runtime_group_name, request.cluster_type);
        let upserted = self.upserter.find_or_create(&create).await?;
        let runtime_group = self.with_endpoints(upserted.resource, &create).await?;

        let bundle = self.issue_certificate(request.certificate.clone()).await?;
        self.guard(
            "upload data-plane certificate",
            self.upserter
                .api()
                .register_client_certificate(&runtime_group, &bundle.certificate_pem),
        )
        .await?;
        info!(runtime_group = %runtime_group.id, serial = %bundle.serial_number, "Registered data-plane certificate");

        let cert_secret = certificate_secret_name(&runtime_group.id);
        let key_secret = private_key_secret_name(&runtime_group.id);
        let token_secret = access_token_secret_name(&runtime_group.id);

        self.rotator.rotate(&cert_secret, &SecretString::new(bundle.certificate_pem.as_str())).await?;
        self.rotator.rotate(&key_secret, &bundle.private_key_pem).await?;
        self.rotator.rotate(&token_secret, &request.personal_access_token).await?;

        let summary = ProvisioningSummary::RuntimeGroup(RuntimeGroupSummary {
            cluster_dns: endpoint(&runtime_group, "control_plane_endpoint"),
            telemetry_dns: endpoint(&runtime_group, "telemetry_endpoint"),
            runtime_name: runtime_group.name.clone(),
            cert_secret_name: cert_secret.clone(),
            key_secret_name: key_secret.clone(),
            personal_access_token: token_secret.clone(),
        });

        Ok(ProvisioningResult {
            control_plane_name: runtime_group.name,
            control_plane_id: runtime_group.id,
            zone_name: None,
            credential_secret_names: BTreeSet::from([cert_secret, key_secret, token_secret]),
            summary,
        })
    }

    /// Re-read the runtime group when the create response lacked its endpoints
    async fn with_endpoints(
        &self,
        runtime_group: NamedResource,
        request: &CreateRequest,
    ) -> Result<NamedResource> {
        if !endpoint(&runtime_group, "control_plane_endpoint").is_empty() {
            return Ok(runtime_group);
        }
        Ok(self.upserter.find(request).await?.unwrap_or(runtime_group))
    }

    async fn issue_certificate(&self, request: CertificateRequest) -> Result<CredentialBundle> {
        let issuer = self.issuer;
        let task = tokio::task::spawn_blocking(move || issuer.issue(&request));

        self.guard("issue certificate", async {
            task.await.map_err(|e| {
                ProvisionError::internal(format!("Certificate generation task failed: {}", e))
            })
        })
        .await?
    }

    async fn guard<T>(
        &self,
        operation: &str,
        call: impl std::future::Future<Output = Result<T>>,
    ) -> Result<T> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(ProvisionError::cancelled(operation)),
            result = call => result,
        }
    }
}

fn endpoint(runtime_group: &NamedResource, key: &str) -> String {
    runtime_group.attribute_str(&["config", key]).unwrap_or_default().to_string()
}
