//! Wire types for the Konnect management API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::{NamedResource, ResourceKind};
use crate::secrets::SecretString;

/// Pagination block of a list response
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    #[serde(default)]
    pub number: u32,
    #[serde(default)]
    pub size: u32,
    #[serde(default)]
    pub total: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListMeta {
    #[serde(default)]
    pub page: PageMeta,
}

/// `{meta: {page: {...}}, data: [...]}`
#[derive(Debug, Clone, Deserialize)]
pub struct ListResponse<T> {
    #[serde(default)]
    pub meta: Option<ListMeta>,
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
}

/// Global mesh control plane
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalControlPlane {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub labels: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Data-plane connection details of a runtime group
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeGroupConfig {
    #[serde(default)]
    pub control_plane_endpoint: String,
    #[serde(default)]
    pub telemetry_endpoint: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_type: Option<String>,
}

/// Kong Gateway runtime group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuntimeGroup {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub labels: Map<String, Value>,
    #[serde(default)]
    pub config: RuntimeGroupConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Response of `provision-zone`; the token is only ever returned here
#[derive(Debug, Clone, Deserialize)]
pub struct ProvisionZoneResponse {
    pub token: SecretString,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProvisionZoneRequest<'a> {
    pub name: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct DpClientCertificateRequest<'a> {
    pub cert: &'a str,
}

/// Everything except `id` and `name` becomes the resource's attributes.
fn into_named<T: Serialize>(id: String, name: String, kind: ResourceKind, wire: &T) -> NamedResource {
    let mut attributes = match serde_json::to_value(wire) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    };
    attributes.remove("id");
    attributes.remove("name");
    NamedResource::new(id, name, kind).with_attributes(attributes)
}

impl From<GlobalControlPlane> for NamedResource {
    fn from(cp: GlobalControlPlane) -> Self {
        into_named(cp.id.clone(), cp.name.clone(), ResourceKind::ControlPlane, &cp)
    }
}

impl From<RuntimeGroup> for NamedResource {
    fn from(rg: RuntimeGroup) -> Self {
        into_named(rg.id.clone(), rg.name.clone(), ResourceKind::RuntimeGroup, &rg)
    }
}
