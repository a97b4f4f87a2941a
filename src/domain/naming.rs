//! Deterministic secret names.
//!
//! Re-running a flow for the same remote resource always targets the same
//! names, which is what lets rotation replace the previous run's values.

/// Zone token: `{controlPlaneId}-{zoneName}`
pub fn zone_token_secret_name(control_plane_id: &str, zone_name: &str) -> String {
    format!("{}-{}", control_plane_id, zone_name)
}

/// Data-plane certificate: `{runtimeGroupId}-cert`
pub fn certificate_secret_name(runtime_group_id: &str) -> String {
    format!("{}-cert", runtime_group_id)
}

/// Data-plane private key: `{runtimeGroupId}-key`
pub fn private_key_secret_name(runtime_group_id: &str) -> String {
    format!("{}-key", runtime_group_id)
}

/// Personal access token: `{runtimeGroupId}-pat-token`
pub fn access_token_secret_name(runtime_group_id: &str) -> String {
    format!("{}-pat-token", runtime_group_id)
}
