//! `mesh-manager create-zone` against a mocked API and the in-memory store.

use konnect_provisioner::domain::{ProvisioningSummary, ZoneSummary};
use konnect_provisioner::secrets::{InMemorySecretStore, StoreCall};
use konnect_provisioner::services::ZoneProvisioning;
use konnect_provisioner::ProvisionError;
use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::support::{control_plane, list_body, pipeline};

fn request(control_plane_name: &str, zone_name: &str) -> ZoneProvisioning {
    ZoneProvisioning {
        control_plane_name: control_plane_name.to_string(),
        zone_name: zone_name.to_string(),
    }
}

async fn mount_control_planes(server: &MockServer, items: Vec<serde_json::Value>) {
    Mock::given(method("GET"))
        .and(path("/v0/mesh/control-planes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(list_body(items)))
        .mount(server)
        .await;
}

async fn mount_provision_zone(server: &MockServer, cp_id: &str, zone: &str, token: &str) {
    Mock::given(method("POST"))
        .and(path(format!("/v0/mesh/control-planes/{}/api/provision-zone", cp_id)))
        .and(body_json(json!({ "name": zone })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": token })))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn creates_control_plane_zone_and_secret_from_empty_state() {
    let server = MockServer::start().await;
    mount_control_planes(&server, vec![]).await;
    Mock::given(method("POST"))
        .and(path("/v0/mesh/control-planes"))
        .and(body_json(json!({ "name": "default" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(control_plane("cp-1", "default")))
        .expect(1)
        .mount(&server)
        .await;
    mount_provision_zone(&server, "cp-1", "z1", "spat_zone_token").await;

    let store = InMemorySecretStore::new();
    let result = pipeline(&server, "v0", &store).provision_zone(&request("default", "z1")).await.unwrap();

    assert_eq!(store.create_count().await, 1);
    assert_eq!(store.delete_count().await, 0);
    assert_eq!(store.value("cp-1-z1").await.as_deref(), Some("spat_zone_token"));

    assert_eq!(result.zone_name.as_deref(), Some("z1"));
    assert_eq!(
        result.summary,
        ProvisioningSummary::Zone(ZoneSummary {
            global_control_plane_name: "default".to_string(),
            global_control_plane_id: "cp-1".to_string(),
            zone_name: "z1".to_string(),
            zone_token_secret_name: "cp-1-z1".to_string(),
        })
    );
    assert_eq!(
        serde_json::to_value(&result.summary).unwrap(),
        json!({
            "global_control_plane_name": "default",
            "global_control_plane_id": "cp-1",
            "zone_name": "z1",
            "zone_token_secret_name": "cp-1-z1"
        })
    );
}

#[tokio::test]
async fn existing_control_plane_is_matched_without_regard_to_case() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v0/mesh/control-planes"))
        .and(query_param("filter[name][eq]", "default"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(list_body(vec![control_plane("cp-9", "Default")])),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v0/mesh/control-planes"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;
    mount_provision_zone(&server, "cp-9", "z1", "spat_second").await;

    let store = InMemorySecretStore::new();
    let result = pipeline(&server, "v0", &store).provision_zone(&request("default", "z1")).await.unwrap();

    assert_eq!(result.control_plane_id, "cp-9");
    assert_eq!(result.control_plane_name, "Default");
    assert!(result.credential_secret_names.contains("cp-9-z1"));
}

#[tokio::test]
async fn exact_match_filter_falls_back_to_full_listing() {
    let server = MockServer::start().await;
    // Case-sensitive filter: "default" does not match "Default"
    Mock::given(method("GET"))
        .and(path("/v0/mesh/control-planes"))
        .and(query_param("filter[name][eq]", "default"))
        .respond_with(ResponseTemplate::new(200).set_body_json(list_body(vec![])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v0/mesh/control-planes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(list_body(vec![
            control_plane("cp-2", "other"),
            control_plane("cp-3", "Default"),
        ])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v0/mesh/control-planes"))
        .respond_with(ResponseTemplate::new(201).set_body_json(control_plane("cp-dup", "default")))
        .expect(0)
        .mount(&server)
        .await;
    mount_provision_zone(&server, "cp-3", "z1", "spat_third").await;

    let store = InMemorySecretStore::new();
    let result = pipeline(&server, "v0", &store).provision_zone(&request("default", "z1")).await.unwrap();

    assert_eq!(result.control_plane_id, "cp-3");
    assert_eq!(store.value("cp-3-z1").await.as_deref(), Some("spat_third"));

    let requests = server.received_requests().await.unwrap();
    let fallback = requests
        .iter()
        .filter(|r| r.method.to_string() == "GET")
        .nth(1)
        .unwrap();
    assert!(fallback.url.query_pairs().all(|(key, _)| key != "filter[name][eq]"));
}

#[tokio::test]
async fn unauthorized_listing_never_touches_the_store() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v0/mesh/control-planes"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let store = InMemorySecretStore::new();
    let err = pipeline(&server, "v0", &store).provision_zone(&request("default", "z1")).await.unwrap_err();

    assert!(err.is_unauthorized());
    assert!(store.calls().await.is_empty());
}

#[tokio::test]
async fn existing_zone_requires_manual_remediation() {
    let server = MockServer::start().await;
    mount_control_planes(&server, vec![control_plane("cp-1", "default")]).await;
    Mock::given(method("POST"))
        .and(path("/v0/mesh/control-planes/cp-1/api/provision-zone"))
        .respond_with(ResponseTemplate::new(409).set_body_string("zone already exists"))
        .expect(1)
        .mount(&server)
        .await;

    let store = InMemorySecretStore::new();
    let err = pipeline(&server, "v0", &store).provision_zone(&request("default", "z1")).await.unwrap_err();

    assert!(matches!(err, ProvisionError::Conflict { .. }));
    assert!(err.to_string().contains("manual remediation required"));
    assert!(store.calls().await.is_empty());
}

#[tokio::test]
async fn rerun_replaces_the_stored_token() {
    let server = MockServer::start().await;
    mount_control_planes(&server, vec![control_plane("cp-1", "default")]).await;
    mount_provision_zone(&server, "cp-1", "z1", "spat_new").await;

    let store = InMemorySecretStore::with_deletion_lag(2);
    store.insert("cp-1-z1", "spat_old").await;

    pipeline(&server, "v0", &store).provision_zone(&request("default", "z1")).await.unwrap();

    assert_eq!(store.value("cp-1-z1").await.as_deref(), Some("spat_new"));
    let mutations: Vec<StoreCall> = store
        .calls()
        .await
        .into_iter()
        .filter(|c| !matches!(c, StoreCall::Describe(_)))
        .collect();
    assert_eq!(
        mutations,
        vec![StoreCall::Delete("cp-1-z1".to_string()), StoreCall::Create("cp-1-z1".to_string())]
    );
}
