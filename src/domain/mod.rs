//! Domain layer
//!
//! Plain types shared by the Konnect client, the upserter and the pipeline,
//! with no I/O of their own.
//!
//! ## Module Organization
//!
//! - `resource`: remote resources and case-insensitive name matching
//! - `cluster_type`: runtime group cluster types
//! - `naming`: deterministic secret names
//! - `result`: run summaries printed by the CLI

pub mod cluster_type;
pub mod naming;
pub mod resource;
pub mod result;

pub use cluster_type::ClusterType;
pub use naming::{
    access_token_secret_name, certificate_secret_name, private_key_secret_name,
    zone_token_secret_name,
};
pub use resource::{names_match, NamedResource, ResourceKind};
pub use result::{ProvisioningResult, ProvisioningSummary, RuntimeGroupSummary, ZoneSummary};
