//! In-process [`ResourceApi`] for unit tests.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use super::api::{CreateRequest, CreatedResource, ListQuery, ResourceApi, ResourcePage};
use crate::domain::{NamedResource, ResourceKind};
use crate::errors::{ProvisionError, Result};
use crate::secrets::SecretString;

#[derive(Debug, Default)]
struct FakeState {
    resources: Vec<(Option<String>, NamedResource)>,
    /// Exist remotely but are missing from list results until a create conflicts
    hidden: Vec<(Option<String>, NamedResource)>,
    list_calls: usize,
    create_calls: usize,
    certificates: Vec<(String, String)>,
    unauthorized: bool,
    /// Always serve the first page and report no total
    ignore_paging: bool,
    next_id: usize,
}

/// Name filters match exactly and case-sensitively, like the API's `eq` filter.
#[derive(Debug, Clone, Default)]
pub struct FakeResourceApi {
    state: Arc<Mutex<FakeState>>,
}

impl FakeResourceApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, parent_id: Option<&str>, resource: NamedResource) {
        let mut state = self.state.lock().unwrap();
        state.resources.push((parent_id.map(str::to_string), resource));
    }

    pub fn seed_hidden(&self, parent_id: Option<&str>, resource: NamedResource) {
        let mut state = self.state.lock().unwrap();
        state.hidden.push((parent_id.map(str::to_string), resource));
    }

    pub fn deny_all(&self) {
        self.state.lock().unwrap().unauthorized = true;
    }

    pub fn ignore_paging(&self) {
        self.state.lock().unwrap().ignore_paging = true;
    }

    pub fn list_calls(&self) -> usize {
        self.state.lock().unwrap().list_calls
    }

    pub fn create_calls(&self) -> usize {
        self.state.lock().unwrap().create_calls
    }

    pub fn certificates(&self) -> Vec<(String, String)> {
        self.state.lock().unwrap().certificates.clone()
    }
}

#[async_trait]
impl ResourceApi for FakeResourceApi {
    async fn list_resources(&self, query: &ListQuery) -> Result<ResourcePage> {
        let mut state = self.state.lock().unwrap();
        state.list_calls += 1;
        if state.unauthorized {
            return Err(ProvisionError::unauthorized("list"));
        }

        let matching: Vec<NamedResource> = state
            .resources
            .iter()
            .filter(|(parent, r)| r.kind == query.kind && *parent == query.parent_id)
            .filter(|(_, r)| query.name.as_ref().map_or(true, |name| r.name == *name))
            .map(|(_, r)| r.clone())
            .collect();
        let size = query.page_size.max(1) as usize;
        let page = if state.ignore_paging { 0 } else { query.page_number.saturating_sub(1) };
        let start = page as usize * size;

        Ok(ResourcePage {
            items: matching.iter().skip(start).take(size).cloned().collect(),
            page_number: query.page_number,
            page_size: query.page_size,
            total: (!state.ignore_paging).then_some(matching.len() as u64),
        })
    }

    async fn create_resource(&self, request: &CreateRequest) -> Result<CreatedResource> {
        let mut state = self.state.lock().unwrap();
        state.create_calls += 1;
        if state.unauthorized {
            return Err(ProvisionError::unauthorized("create"));
        }

        let same = |(parent, r): &(Option<String>, NamedResource)| {
            r.kind == request.kind && *parent == request.parent_id && r.matches_name(&request.name)
        };
        if let Some(pos) = state.hidden.iter().position(same) {
            let revealed = state.hidden.remove(pos);
            state.resources.push(revealed);
            return Err(ProvisionError::conflict("create", "already exists"));
        }
        if state.resources.iter().any(same) {
            return Err(ProvisionError::conflict("create", "already exists"));
        }

        state.next_id += 1;
        let id = match request.kind {
            ResourceKind::Zone => request.name.clone(),
            _ => format!("{}-{}", request.kind.as_str().replace(' ', "-"), state.next_id),
        };
        let resource = NamedResource::new(id, &request.name, request.kind)
            .with_attributes(request.attributes.clone());
        state.resources.push((request.parent_id.clone(), resource.clone()));

        let credential = (request.kind == ResourceKind::Zone)
            .then(|| SecretString::new(format!("zone-token-{}", request.name)));
        Ok(CreatedResource { resource, credential })
    }

    async fn register_client_certificate(
        &self,
        runtime_group: &NamedResource,
        certificate_pem: &str,
    ) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if state.unauthorized {
            return Err(ProvisionError::unauthorized("upload"));
        }
        state.certificates.push((runtime_group.id.clone(), certificate_pem.to_string()));
        Ok(())
    }
}
