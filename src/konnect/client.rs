//! HTTP client for the Konnect management API
//!
//! Wraps `reqwest` with bearer authentication, status classification and
//! typed decoding. Response bodies are only traced in verbose mode, and never
//! for responses that carry credentials.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::{debug, trace};

use super::api::{CreateRequest, CreatedResource, ListQuery, ResourceApi, ResourcePage};
use super::types::{
    DpClientCertificateRequest, GlobalControlPlane, ListResponse, ProvisionZoneRequest,
    ProvisionZoneResponse, RuntimeGroup,
};
use crate::domain::{NamedResource, ResourceKind};
use crate::errors::{ProvisionError, Result};
use crate::secrets::SecretString;

/// Default Konnect region endpoint
pub const DEFAULT_API_ENDPOINT: &str = "https://us.api.konghq.com";

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL for the Konnect API (e.g., "https://us.api.konghq.com")
    pub base_url: String,

    /// Path prefix version, `v2` for runtime groups and `v0` for mesh
    pub api_version: String,

    /// Personal access token for authentication
    pub token: SecretString,

    /// Request timeout in seconds
    pub timeout: u64,

    /// Page size for filtered list calls
    pub page_size: u32,

    /// Enable verbose request/response logging
    pub verbose: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_ENDPOINT.to_string(),
            api_version: "v2".to_string(),
            token: SecretString::default(),
            timeout: 30,
            page_size: 100,
            verbose: false,
        }
    }
}

/// Authenticated HTTP client for the Konnect API
#[derive(Debug, Clone)]
pub struct KonnectClient {
    client: Client,
    config: ClientConfig,
}

impl KonnectClient {
    /// Create a new client with the given configuration
    pub fn new(mut config: ClientConfig) -> Result<Self> {
        url::Url::parse(&config.base_url).map_err(|e| {
            ProvisionError::config(format!("Invalid API endpoint '{}': {}", config.base_url, e))
        })?;
        if config.token.is_empty() {
            return Err(ProvisionError::config("A personal access token is required"));
        }
        config.base_url = config.base_url.trim_end_matches('/').to_string();
        config.api_version = config.api_version.trim_matches('/').to_string();

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ProvisionError::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    pub fn page_size(&self) -> u32 {
        self.config.page_size
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}{}", self.config.base_url, self.config.api_version, path)
    }

    /// Build a GET request with authentication
    fn get(&self, path: &str) -> RequestBuilder {
        let url = self.url(path);
        debug!("GET {}", url);

        self.client.get(&url).bearer_auth(self.config.token.expose_secret())
    }

    /// Build a POST request with authentication
    fn post(&self, path: &str) -> RequestBuilder {
        let url = self.url(path);
        debug!("POST {}", url);

        self.client.post(&url).bearer_auth(self.config.token.expose_secret())
    }

    async fn get_list<T: DeserializeOwned>(
        &self,
        operation: &str,
        path: &str,
        query: &ListQuery,
    ) -> Result<ListResponse<T>> {
        let mut params = Vec::with_capacity(3);
        if let Some(name) = &query.name {
            params.push(("filter[name][eq]", name.clone()));
        }
        params.push(("page[size]", query.page_size.to_string()));
        params.push(("page[number]", query.page_number.to_string()));

        let response = self
            .get(path)
            .query(&params)
            .send()
            .await
            .map_err(|source| transport(operation, source))?;

        self.handle_response(operation, response, false).await
    }

    async fn post_json<B: Serialize, R: DeserializeOwned>(
        &self,
        operation: &str,
        path: &str,
        body: &B,
        sensitive_response: bool,
    ) -> Result<R> {
        if self.config.verbose {
            let body_json = serde_json::to_string_pretty(body)
                .unwrap_or_else(|_| "<unable to serialize>".to_string());
            trace!("Request body:\n{}", body_json);
        }

        let response = self
            .post(path)
            .json(body)
            .send()
            .await
            .map_err(|source| transport(operation, source))?;

        self.handle_response(operation, response, sensitive_response).await
    }

    /// Check the status, then decode the JSON body
    async fn handle_response<T: DeserializeOwned>(
        &self,
        operation: &str,
        response: Response,
        sensitive: bool,
    ) -> Result<T> {
        let body = self.read_success_body(operation, response).await?;

        if self.config.verbose && !sensitive {
            trace!("Response body:\n{}", body);
        }

        serde_json::from_str(&body).map_err(|e| ProvisionError::decode(operation, e.to_string()))
    }

    async fn read_success_body(&self, operation: &str, response: Response) -> Result<String> {
        let status = response.status();
        debug!(operation, status = %status, "Response status");

        if !status.is_success() {
            let error_text =
                response.text().await.unwrap_or_else(|_| "<unable to read error>".to_string());

            if self.config.verbose {
                trace!("Error response:\n{}", error_text);
            }

            return Err(classify_status(operation, status, error_text));
        }

        response.text().await.map_err(|source| transport(operation, source))
    }

    // === Mesh ===

    pub async fn list_control_planes(&self, query: &ListQuery) -> Result<ResourcePage> {
        let list: ListResponse<GlobalControlPlane> =
            self.get_list("list control planes", "/mesh/control-planes", query).await?;
        Ok(into_page(list, query))
    }

    pub async fn create_control_plane(
        &self,
        name: &str,
        attributes: &Map<String, Value>,
    ) -> Result<GlobalControlPlane> {
        let body = with_name(name, attributes);
        self.post_json("create control plane", "/mesh/control-planes", &body, false).await
    }

    /// Provision a zone. The returned token is not retrievable afterwards.
    pub async fn provision_zone(
        &self,
        control_plane_id: &str,
        zone_name: &str,
    ) -> Result<ProvisionZoneResponse> {
        let path = format!("/mesh/control-planes/{}/api/provision-zone", control_plane_id);
        self.post_json("provision zone", &path, &ProvisionZoneRequest { name: zone_name }, true)
            .await
    }

    // === Runtime groups ===

    pub async fn list_runtime_groups(&self, query: &ListQuery) -> Result<ResourcePage> {
        let list: ListResponse<RuntimeGroup> =
            self.get_list("list runtime groups", "/runtime-groups", query).await?;
        Ok(into_page(list, query))
    }

    pub async fn create_runtime_group(
        &self,
        name: &str,
        attributes: &Map<String, Value>,
    ) -> Result<RuntimeGroup> {
        let body = with_name(name, attributes);
        self.post_json("create runtime group", "/runtime-groups", &body, false).await
    }

    pub async fn upload_dp_client_certificate(
        &self,
        runtime_group_id: &str,
        certificate_pem: &str,
    ) -> Result<()> {
        let operation = "upload data-plane certificate";
        let path = format!("/runtime-groups/{}/dp-client-certificates", runtime_group_id);
        let response = self
            .post(&path)
            .json(&DpClientCertificateRequest { cert: certificate_pem })
            .send()
            .await
            .map_err(|source| transport(operation, source))?;

        self.read_success_body(operation, response).await?;
        Ok(())
    }
}

#[async_trait]
impl ResourceApi for KonnectClient {
    async fn list_resources(&self, query: &ListQuery) -> Result<ResourcePage> {
        match query.kind {
            ResourceKind::ControlPlane => self.list_control_planes(query).await,
            ResourceKind::RuntimeGroup => self.list_runtime_groups(query).await,
            ResourceKind::Zone => {
                Err(ProvisionError::internal("Zones cannot be listed by the management API"))
            }
        }
    }

    async fn create_resource(&self, request: &CreateRequest) -> Result<CreatedResource> {
        match request.kind {
            ResourceKind::ControlPlane => {
                let cp = self.create_control_plane(&request.name, &request.attributes).await?;
                Ok(CreatedResource::new(cp.into()))
            }
            ResourceKind::RuntimeGroup => {
                let rg = self.create_runtime_group(&request.name, &request.attributes).await?;
                Ok(CreatedResource::new(rg.into()))
            }
            ResourceKind::Zone => {
                let control_plane_id = request.parent_id.as_deref().ok_or_else(|| {
                    ProvisionError::internal("Zone provisioning requires a control plane id")
                })?;
                let response = self.provision_zone(control_plane_id, &request.name).await?;
                // Zones have no id of their own; the name identifies them within the control plane
                let zone = NamedResource::new(&request.name, &request.name, ResourceKind::Zone);
                Ok(CreatedResource { resource: zone, credential: Some(response.token) })
            }
        }
    }

    async fn register_client_certificate(
        &self,
        runtime_group: &NamedResource,
        certificate_pem: &str,
    ) -> Result<()> {
        self.upload_dp_client_certificate(&runtime_group.id, certificate_pem).await
    }
}

fn transport(operation: &str, source: reqwest::Error) -> ProvisionError {
    ProvisionError::Transport { operation: operation.to_string(), source }
}

fn classify_status(operation: &str, status: StatusCode, body: String) -> ProvisionError {
    match status {
        StatusCode::UNAUTHORIZED => ProvisionError::unauthorized(operation),
        StatusCode::CONFLICT => ProvisionError::conflict(operation, body),
        _ => ProvisionError::http(operation, status.as_u16(), body),
    }
}

fn with_name(name: &str, attributes: &Map<String, Value>) -> Map<String, Value> {
    let mut body = attributes.clone();
    body.insert("name".to_string(), Value::String(name.to_string()));
    body
}

fn into_page<T: Into<NamedResource>>(list: ListResponse<T>, query: &ListQuery) -> ResourcePage {
    let page = list.meta.map(|m| m.page).unwrap_or_default();
    ResourcePage {
        items: list.data.into_iter().map(Into::into).collect(),
        page_number: if page.number > 0 { page.number } else { query.page_number },
        page_size: if page.size > 0 { page.size } else { query.page_size },
        total: (page.total > 0).then_some(page.total),
    }
}
