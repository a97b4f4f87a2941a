//! KonnectClient against a mocked management API.

use konnect_provisioner::domain::{ClusterType, ResourceKind};
use konnect_provisioner::konnect::{CreateRequest, ListQuery, ResourceApi};
use konnect_provisioner::ProvisionError;
use serde_json::json;
use wiremock::matchers::{body_json, body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::support::{bearer, client, control_plane, list_body, runtime_group};

fn query(kind: ResourceKind, name: &str) -> ListQuery {
    ListQuery { kind, parent_id: None, name: Some(name.to_string()), page_number: 1, page_size: 100 }
}

#[tokio::test]
async fn list_sends_name_filter_pagination_and_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v0/mesh/control-planes"))
        .and(query_param("filter[name][eq]", "default"))
        .and(query_param("page[size]", "100"))
        .and(query_param("page[number]", "1"))
        .and(header("authorization", bearer().as_str()))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(list_body(vec![control_plane("cp-1", "default")])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let page = client(&server, "v0")
        .list_resources(&query(ResourceKind::ControlPlane, "default"))
        .await
        .unwrap();

    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].id, "cp-1");
    assert_eq!(page.items[0].kind, ResourceKind::ControlPlane);
    assert_eq!(page.total, Some(1));
}

#[tokio::test]
async fn unfiltered_list_omits_name_filter() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/runtime-groups"))
        .and(query_param("page[number]", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(list_body(vec![])))
        .expect(1)
        .mount(&server)
        .await;

    let mut unfiltered = query(ResourceKind::RuntimeGroup, "edge").unfiltered();
    unfiltered.page_number = 2;
    client(&server, "v2").list_resources(&unfiltered).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert!(requests[0].url.query_pairs().all(|(key, _)| key != "filter[name][eq]"));
}

#[tokio::test]
async fn create_runtime_group_sends_cluster_type() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v2/runtime-groups"))
        .and(body_json(json!({"name": "edge", "cluster_type": "CLUSTER_TYPE_K8S_INGRESS_CONTROLLER"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(runtime_group("rg-1", "edge")))
        .expect(1)
        .mount(&server)
        .await;

    let created = client(&server, "v2")
        .create_resource(&CreateRequest::runtime_group("edge", ClusterType::K8sIngressController))
        .await
        .unwrap();

    assert_eq!(created.resource.id, "rg-1");
    assert!(created.credential.is_none());
    assert_eq!(
        created.resource.attribute_str(&["config", "control_plane_endpoint"]),
        Some("https://rg-1.us.cp0.konghq.com")
    );
}

#[tokio::test]
async fn provision_zone_returns_token_as_credential() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v0/mesh/control-planes/cp-1/api/provision-zone"))
        .and(body_json(json!({"name": "z1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "spat_zone_token"})))
        .expect(1)
        .mount(&server)
        .await;

    let created =
        client(&server, "v0").create_resource(&CreateRequest::zone("cp-1", "z1")).await.unwrap();

    assert_eq!(created.resource.name, "z1");
    assert_eq!(created.resource.kind, ResourceKind::Zone);
    assert_eq!(created.credential.unwrap().expose_secret(), "spat_zone_token");
}

#[tokio::test]
async fn unauthorized_is_classified() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/runtime-groups"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid token"))
        .mount(&server)
        .await;

    let err = client(&server, "v2")
        .list_resources(&query(ResourceKind::RuntimeGroup, "default"))
        .await
        .unwrap_err();

    assert!(err.is_unauthorized());
    assert_eq!(err.operation(), Some("list runtime groups"));
}

#[tokio::test]
async fn conflict_is_classified() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v0/mesh/control-planes"))
        .respond_with(ResponseTemplate::new(409).set_body_string("name already taken"))
        .mount(&server)
        .await;

    let err = client(&server, "v0")
        .create_resource(&CreateRequest::control_plane("default"))
        .await
        .unwrap_err();

    match err {
        ProvisionError::Conflict { operation, message } => {
            assert_eq!(operation, "create control plane");
            assert_eq!(message, "name already taken");
        }
        other => panic!("expected conflict, got {other:?}"),
    }
}

#[tokio::test]
async fn other_status_keeps_code_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v0/mesh/control-planes"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let err = client(&server, "v0")
        .list_resources(&query(ResourceKind::ControlPlane, "default"))
        .await
        .unwrap_err();

    assert!(matches!(err, ProvisionError::Http { status: 503, ref body, .. } if body == "maintenance"));
}

#[tokio::test]
async fn malformed_body_is_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v0/mesh/control-planes"))
        .respond_with(ResponseTemplate::new(201).set_body_string("{not json"))
        .mount(&server)
        .await;

    let err = client(&server, "v0")
        .create_resource(&CreateRequest::control_plane("default"))
        .await
        .unwrap_err();

    assert!(matches!(err, ProvisionError::Decode { .. }));
}

#[tokio::test]
async fn zone_token_never_appears_in_decode_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v0/mesh/control-planes/cp-1/api/provision-zone"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"tok":"spat_leaked"}"#))
        .mount(&server)
        .await;

    let err =
        client(&server, "v0").create_resource(&CreateRequest::zone("cp-1", "z1")).await.unwrap_err();

    assert!(matches!(err, ProvisionError::Decode { .. }));
    assert!(!err.to_string().contains("spat_leaked"));
}

#[tokio::test]
async fn certificate_upload_posts_pem() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v2/runtime-groups/rg-1/dp-client-certificates"))
        .and(body_partial_json(json!({"cert": "-----BEGIN CERTIFICATE-----\nabc\n-----END CERTIFICATE-----\n"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"item": {"id": "cert-1"}})))
        .expect(1)
        .mount(&server)
        .await;

    let rg = konnect_provisioner::domain::NamedResource::new("rg-1", "default", ResourceKind::RuntimeGroup);
    client(&server, "v2")
        .register_client_certificate(
            &rg,
            "-----BEGIN CERTIFICATE-----\nabc\n-----END CERTIFICATE-----\n",
        )
        .await
        .unwrap();
}
