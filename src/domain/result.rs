//! Run summaries.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Summary printed after `mesh-manager create-zone`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneSummary {
    pub global_control_plane_name: String,
    pub global_control_plane_id: String,
    pub zone_name: String,
    pub zone_token_secret_name: String,
}

/// Summary printed after `runtime-group create`
///
/// `personal_access_token` carries the name of the secret holding the token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeGroupSummary {
    pub cluster_dns: String,
    pub telemetry_dns: String,
    pub runtime_name: String,
    pub cert_secret_name: String,
    pub key_secret_name: String,
    pub personal_access_token: String,
}

/// Machine-readable summary for either flow
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProvisioningSummary {
    Zone(ZoneSummary),
    RuntimeGroup(RuntimeGroupSummary),
}

/// Outcome of a successful provisioning run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisioningResult {
    pub control_plane_name: String,
    pub control_plane_id: String,
    /// Set by the zone flow only
    pub zone_name: Option<String>,
    pub credential_secret_names: BTreeSet<String>,
    pub summary: ProvisioningSummary,
}
