//! Provisioning services
//!
//! - `upserter`: find-or-create for remote resources
//! - `pipeline`: the zone and runtime-group flows

pub mod pipeline;
pub mod upserter;

pub use pipeline::{ProvisioningPipeline, RuntimeGroupProvisioning, ZoneProvisioning};
pub use upserter::{ResourceUpserter, Upserted};
