//! Find-or-create for remote resources.
//!
//! Lookups try the API's exact name filter first, then fall back to listing
//! every resource of the kind. Both walk every page and compare names
//! case-insensitively on our side. The first match wins.

use std::future::Future;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::domain::NamedResource;
use crate::errors::{ProvisionError, Result};
use crate::konnect::{CreateRequest, ListQuery, ResourceApi};
use crate::secrets::SecretString;

/// Upper bound on pages read by a single scan
const MAX_LOOKUP_PAGES: u32 = 1000;

/// Result of an upsert
#[derive(Debug, Clone)]
pub struct Upserted {
    pub resource: NamedResource,
    /// False when an existing resource was reused
    pub created: bool,
    /// Credential returned by the create call, if the kind issues one
    pub credential: Option<SecretString>,
}

/// Finds resources by name or creates them
#[derive(Debug, Clone)]
pub struct ResourceUpserter {
    api: Arc<dyn ResourceApi>,
    page_size: u32,
    cancel: CancellationToken,
}

impl ResourceUpserter {
    pub fn new(api: Arc<dyn ResourceApi>, page_size: u32) -> Self {
        Self { api, page_size: page_size.max(1), cancel: CancellationToken::new() }
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn api(&self) -> &Arc<dyn ResourceApi> {
        &self.api
    }

    /// Look up a resource by name across all pages.
    ///
    /// The server filter matches names exactly, so a miss is followed by an
    /// unfiltered scan compared without regard to case.
    pub async fn find(&self, request: &CreateRequest) -> Result<Option<NamedResource>> {
        if !request.kind.supports_lookup() {
            return Err(ProvisionError::internal(format!(
                "Cannot look up a {} by name",
                request.kind
            )));
        }

        let filtered = request.lookup(self.page_size);
        if let Some(found) = self.scan(request, filtered.clone()).await? {
            return Ok(Some(found));
        }

        debug!(kind = %request.kind, name = %request.name, "No exact match, scanning all names");
        self.scan(request, filtered.unfiltered()).await
    }

    async fn scan(
        &self,
        request: &CreateRequest,
        mut query: ListQuery,
    ) -> Result<Option<NamedResource>> {
        let mut scanned = 0u64;
        let mut previous_first: Option<String> = None;
        loop {
            let page = self.guard("list", self.api.list_resources(&query)).await?;
            let returned = page.items.len();
            scanned += returned as u64;

            // A server that ignores page[number] keeps returning the same page
            let first = page.items.first().map(|r| r.id.clone());
            if first.is_some() && first == previous_first {
                warn!(kind = %request.kind, page = query.page_number, "Page repeated, stopping lookup");
                return Ok(None);
            }

            if let Some(found) = page.items.into_iter().find(|r| r.matches_name(&request.name)) {
                debug!(kind = %request.kind, name = %found.name, id = %found.id, "Found existing resource");
                return Ok(Some(found));
            }

            let exhausted = returned == 0
                || returned < page.page_size as usize
                || page.total.is_some_and(|total| scanned >= total);
            if exhausted {
                return Ok(None);
            }
            if query.page_number >= MAX_LOOKUP_PAGES {
                warn!(kind = %request.kind, pages = MAX_LOOKUP_PAGES, "Lookup page limit reached");
                return Ok(None);
            }
            previous_first = first;
            query.page_number += 1;
        }
    }

    /// Return the resource named `request.name`, creating it if needed.
    ///
    /// A 409 on create means someone else holds the name; it is resolved by
    /// looking the resource up again.
    pub async fn find_or_create(&self, request: &CreateRequest) -> Result<Upserted> {
        if let Some(resource) = self.find(request).await? {
            info!(kind = %request.kind, name = %resource.name, id = %resource.id, "Using existing resource");
            return Ok(Upserted { resource, created: false, credential: None });
        }

        match self.guard("create", self.api.create_resource(request)).await {
            Ok(created) => {
                info!(kind = %request.kind, name = %created.resource.name, id = %created.resource.id, "Created resource");
                Ok(Upserted { resource: created.resource, created: true, credential: created.credential })
            }
            Err(ProvisionError::Conflict { operation, message }) => {
                info!(kind = %request.kind, name = %request.name, "Resource already exists, resolving it");
                match self.find(request).await? {
                    Some(resource) => Ok(Upserted { resource, created: false, credential: None }),
                    None => Err(ProvisionError::conflict(
                        operation,
                        format!(
                            "{} '{}' reported as existing but not found by name: {}",
                            request.kind, request.name, message
                        ),
                    )),
                }
            }
            Err(e) => Err(e),
        }
    }

    /// Create a resource that must not already exist.
    ///
    /// Used for kinds whose credential is only handed out at creation, where
    /// reusing an existing resource would leave nothing to store.
    pub async fn create_exclusive(&self, request: &CreateRequest) -> Result<Upserted> {
        match self.guard("create", self.api.create_resource(request)).await {
            Ok(created) => {
                info!(kind = %request.kind, name = %created.resource.name, "Created resource");
                Ok(Upserted { resource: created.resource, created: true, credential: created.credential })
            }
            Err(ProvisionError::Conflict { operation, .. }) => Err(ProvisionError::conflict(
                operation,
                format!(
                    "{kind} '{name}' already exists and its credentials cannot be retrieved again; \
                     manual remediation required: create the secrets manually or delete the {kind} and re-run",
                    kind = request.kind,
                    name = request.name
                ),
            )),
            Err(e) => Err(e),
        }
    }

    async fn guard<T>(&self, operation: &str, call: impl Future<Output = Result<T>>) -> Result<T> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(ProvisionError::cancelled(operation)),
            result = call => result,
        }
    }
}
