//! Remote resources managed by the provisioner.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Kind of resource in the control-plane hierarchy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// Global mesh control plane
    ControlPlane,
    /// Zone under a mesh control plane
    Zone,
    /// Kong Gateway runtime group
    RuntimeGroup,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ControlPlane => "control plane",
            Self::Zone => "zone",
            Self::RuntimeGroup => "runtime group",
        }
    }

    /// Whether the API can list this kind by name.
    ///
    /// Zones can only be provisioned; their token is returned once and there
    /// is no listing to resolve an existing zone back to a token.
    pub fn supports_lookup(&self) -> bool {
        !matches!(self, Self::Zone)
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A resource as reported by the management API.
///
/// `id` is assigned remotely. `attributes` keeps the rest of the API object
/// so flow-specific fields (endpoints, cluster type) survive the round trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedResource {
    pub id: String,
    pub name: String,
    pub kind: ResourceKind,
    #[serde(default)]
    pub attributes: Map<String, Value>,
}

impl NamedResource {
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: ResourceKind) -> Self {
        Self { id: id.into(), name: name.into(), kind, attributes: Map::new() }
    }

    pub fn with_attributes(mut self, attributes: Map<String, Value>) -> Self {
        self.attributes = attributes;
        self
    }

    /// Case-insensitive name comparison
    pub fn matches_name(&self, name: &str) -> bool {
        names_match(&self.name, name)
    }

    /// String attribute at a nested path, e.g. `["config", "telemetry_endpoint"]`
    pub fn attribute_str(&self, path: &[&str]) -> Option<&str> {
        let (first, rest) = path.split_first()?;
        let mut current = self.attributes.get(*first)?;
        for key in rest {
            current = current.get(*key)?;
        }
        current.as_str()
    }
}

/// Resource names compare without regard to case.
pub fn names_match(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}
