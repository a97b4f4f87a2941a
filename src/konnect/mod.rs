//! Kong Konnect management API
//!
//! - `api`: the [`ResourceApi`] trait the upserter and pipeline work against
//! - `client`: [`KonnectClient`], its `reqwest` implementation
//! - `types`: request and response bodies

pub mod api;
pub mod client;
pub mod types;

pub use api::{CreateRequest, CreatedResource, ListQuery, ResourceApi, ResourcePage};
pub use client::{ClientConfig, KonnectClient, DEFAULT_API_ENDPOINT};
pub use types::{GlobalControlPlane, RuntimeGroup, RuntimeGroupConfig};

#[cfg(test)]
pub(crate) mod testing;
