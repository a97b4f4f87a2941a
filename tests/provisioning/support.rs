//! Shared helpers: a wiremock Konnect API and pipelines wired to it.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use konnect_provisioner::konnect::{ClientConfig, KonnectClient};
use konnect_provisioner::secrets::{InMemorySecretStore, RotationPolicy, SecretString};
use konnect_provisioner::services::ProvisioningPipeline;
use serde_json::{json, Value};
use wiremock::MockServer;

pub const TOKEN: &str = "kpat_integration_test";

/// Client against the mock server using the given API version
pub fn client(server: &MockServer, api_version: &str) -> KonnectClient {
    KonnectClient::new(ClientConfig {
        base_url: server.uri(),
        api_version: api_version.to_string(),
        token: SecretString::new(TOKEN),
        timeout: 5,
        page_size: 100,
        verbose: true,
    })
    .expect("client config is valid")
}

pub fn fast_policy() -> RotationPolicy {
    RotationPolicy { poll_interval: Duration::from_millis(5), max_wait: Duration::from_secs(2) }
}

pub fn pipeline(
    server: &MockServer,
    api_version: &str,
    store: &InMemorySecretStore,
) -> ProvisioningPipeline {
    ProvisioningPipeline::new(
        Arc::new(client(server, api_version)),
        Arc::new(store.clone()),
        100,
        fast_policy(),
    )
}

pub fn bearer() -> String {
    format!("Bearer {}", TOKEN)
}

/// `{meta, data}` list body
pub fn list_body(items: Vec<Value>) -> Value {
    json!({
        "meta": { "page": { "number": 1, "size": 100, "total": items.len() } },
        "data": items
    })
}

pub fn control_plane(id: &str, name: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "description": "",
        "labels": {},
        "created_at": "2023-06-01T12:00:00Z",
        "updated_at": "2023-06-01T12:00:00Z"
    })
}

pub fn runtime_group(id: &str, name: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "description": "",
        "labels": {},
        "config": {
            "control_plane_endpoint": format!("https://{}.us.cp0.konghq.com", id),
            "telemetry_endpoint": format!("https://{}.us.tp0.konghq.com", id),
            "cluster_type": "CLUSTER_TYPE_HYBRID"
        },
        "created_at": "2023-06-01T12:00:00Z",
        "updated_at": "2023-06-01T12:00:00Z"
    })
}

/// Run the built binary and capture its output.
///
/// The environment is cleared apart from `PATH` and the given overrides, and
/// the working directory is `cwd` so no stray `.env` or config file is read.
/// Returns stdout on success and stderr on failure.
pub async fn run_cli_command_with_env(
    args: &[&str],
    env_overrides: &[(&str, &str)],
    cwd: &Path,
) -> Result<String, String> {
    use std::process::Command;

    let args_owned: Vec<String> = args.iter().map(|s| s.to_string()).collect();
    let env_owned: Vec<(String, String)> =
        env_overrides.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
    let cwd = cwd.to_path_buf();

    tokio::task::spawn_blocking(move || {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_konnect-provisioner"));
        cmd.args(&args_owned).current_dir(&cwd).env_clear();

        if let Ok(path) = std::env::var("PATH") {
            cmd.env("PATH", path);
        }
        for (key, value) in env_owned {
            cmd.env(key, value);
        }

        let output = cmd.output().expect("failed to execute CLI command");

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).to_string())
        } else {
            Err(String::from_utf8_lossy(&output.stderr).to_string())
        }
    })
    .await
    .expect("task join error")
}
