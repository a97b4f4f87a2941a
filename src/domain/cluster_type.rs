//! Runtime group cluster types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::ProvisionError;

/// Cluster type requested when creating a runtime group
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClusterType {
    #[default]
    #[serde(rename = "CLUSTER_TYPE_HYBRID")]
    Hybrid,
    #[serde(rename = "CLUSTER_TYPE_K8S_INGRESS_CONTROLLER")]
    K8sIngressController,
    #[serde(rename = "CLUSTER_TYPE_COMPOSITE")]
    Composite,
}

impl ClusterType {
    pub const ALL: [ClusterType; 3] = [Self::Hybrid, Self::K8sIngressController, Self::Composite];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hybrid => "CLUSTER_TYPE_HYBRID",
            Self::K8sIngressController => "CLUSTER_TYPE_K8S_INGRESS_CONTROLLER",
            Self::Composite => "CLUSTER_TYPE_COMPOSITE",
        }
    }
}

impl fmt::Display for ClusterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ClusterType {
    type Err = ProvisionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL.into_iter().find(|t| t.as_str() == s).ok_or_else(|| {
            ProvisionError::config(format!(
                "Invalid cluster type '{}', please use one of the following: \
                 CLUSTER_TYPE_HYBRID, CLUSTER_TYPE_K8S_INGRESS_CONTROLLER, CLUSTER_TYPE_COMPOSITE",
                s
            ))
        })
    }
}
