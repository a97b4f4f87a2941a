//! The operations the provisioner needs from the management API.
//!
//! [`ResourceApi`] is kind-generic so the upserter can find or create any
//! resource in the hierarchy. [`KonnectClient`](super::KonnectClient) is the
//! HTTP implementation.

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::fmt;

use crate::domain::{ClusterType, NamedResource, ResourceKind};
use crate::errors::Result;
use crate::secrets::SecretString;

/// One page of a filtered list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub kind: ResourceKind,
    pub parent_id: Option<String>,
    /// Server-side `eq` name filter; `None` lists everything
    pub name: Option<String>,
    /// 1-based
    pub page_number: u32,
    pub page_size: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResourcePage {
    pub items: Vec<NamedResource>,
    pub page_number: u32,
    pub page_size: u32,
    /// Total across all pages, when the API reports it
    pub total: Option<u64>,
}

/// A resource to create
#[derive(Debug, Clone, PartialEq)]
pub struct CreateRequest {
    pub kind: ResourceKind,
    pub parent_id: Option<String>,
    pub name: String,
    /// Extra body fields sent next to `name`
    pub attributes: Map<String, Value>,
}

impl CreateRequest {
    pub fn new(kind: ResourceKind, name: impl Into<String>) -> Self {
        Self { kind, parent_id: None, name: name.into(), attributes: Map::new() }
    }

    pub fn control_plane(name: impl Into<String>) -> Self {
        Self::new(ResourceKind::ControlPlane, name)
    }

    pub fn zone(control_plane_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(ResourceKind::Zone, name).with_parent(control_plane_id)
    }

    pub fn runtime_group(name: impl Into<String>, cluster_type: ClusterType) -> Self {
        Self::new(ResourceKind::RuntimeGroup, name)
            .with_attribute("cluster_type", Value::String(cluster_type.as_str().to_string()))
    }

    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: Value) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }

    /// Query for the first page of resources with this name
    pub fn lookup(&self, page_size: u32) -> ListQuery {
        ListQuery {
            kind: self.kind,
            parent_id: self.parent_id.clone(),
            name: Some(self.name.clone()),
            page_number: 1,
            page_size,
        }
    }
}

impl ListQuery {
    /// The same query without the name filter, from the first page
    pub fn unfiltered(&self) -> Self {
        Self { name: None, page_number: 1, ..self.clone() }
    }
}

/// A created resource, plus the credential the API returned with it, if any
#[derive(Debug, Clone)]
pub struct CreatedResource {
    pub resource: NamedResource,
    pub credential: Option<SecretString>,
}

impl CreatedResource {
    pub fn new(resource: NamedResource) -> Self {
        Self { resource, credential: None }
    }
}

/// Management API operations used by provisioning
#[async_trait]
pub trait ResourceApi: Send + Sync + fmt::Debug {
    /// Fetch one page of resources of `query.kind`, filtered by name when `query.name` is set.
    async fn list_resources(&self, query: &ListQuery) -> Result<ResourcePage>;

    /// Create a resource.
    ///
    /// # Errors
    ///
    /// - [`ProvisionError::Conflict`](crate::errors::ProvisionError::Conflict) on 409
    /// - [`ProvisionError::Unauthorized`](crate::errors::ProvisionError::Unauthorized) on 401
    async fn create_resource(&self, request: &CreateRequest) -> Result<CreatedResource>;

    /// Register a data-plane client certificate with a runtime group.
    async fn register_client_certificate(
        &self,
        runtime_group: &NamedResource,
        certificate_pem: &str,
    ) -> Result<()>;
}
