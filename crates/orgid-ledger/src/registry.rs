//! View-call boundary to the ORGiD registry contract.
//!
//! The real binding (RPC transport, ABI decoding) lives outside this
//! workspace. [`InMemoryRegistry`] answers from a table of recorded views and
//! can be told to revert for chosen organizations.

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use async_trait::async_trait;
use orgid_types::{Address, JsonHash, OrgId};
use serde::{Deserialize, Serialize};

use crate::error::{RegistryError, RegistryResult};

/// Decoded result of `getOrganization(orgId)`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationView {
    pub exists: bool,
    pub org_id: OrgId,
    pub org_json_hash: JsonHash,
    #[serde(default)]
    pub org_json_uri_primary: String,
    #[serde(default)]
    pub org_json_uri_backup1: String,
    #[serde(default)]
    pub org_json_uri_backup2: String,
    pub parent_org_id: OrgId,
    pub owner: Address,
    pub director: Address,
    pub is_active: bool,
    pub is_directorship_accepted: bool,
}

impl OrganizationView {
    /// What the contract returns for an id it has never seen.
    pub fn missing(org_id: OrgId) -> Self {
        Self {
            exists: false,
            org_id,
            org_json_hash: JsonHash::zero(),
            org_json_uri_primary: String::new(),
            org_json_uri_backup1: String::new(),
            org_json_uri_backup2: String::new(),
            parent_org_id: OrgId::zero(),
            owner: Address::zero(),
            director: Address::zero(),
            is_active: false,
            is_directorship_accepted: false,
        }
    }

    /// The director, if directorship was accepted by a non-zero address.
    pub fn accepted_director(&self) -> Option<Address> {
        (self.is_directorship_accepted && !self.director.is_zero()).then_some(self.director)
    }

    /// Parent organization for units.
    pub fn parent(&self) -> Option<OrgId> {
        (!self.parent_org_id.is_zero()).then_some(self.parent_org_id)
    }

    /// Non-empty document URIs, primary first.
    pub fn uris(&self) -> Vec<String> {
        [
            &self.org_json_uri_primary,
            &self.org_json_uri_backup1,
            &self.org_json_uri_backup2,
        ]
        .into_iter()
        .filter(|uri| !uri.is_empty())
        .cloned()
        .collect()
    }
}

/// Read access to the ORGiD registry contract.
#[async_trait]
pub trait OrgIdRegistry: Send + Sync {
    /// `getOrganization(orgId)`. A revert is `Err(RegistryError::Reverted)`.
    async fn get_organization(&self, org_id: &OrgId) -> RegistryResult<OrganizationView>;
}

/// Registry backed by recorded views.
#[derive(Debug, Default)]
pub struct InMemoryRegistry {
    views: RwLock<HashMap<OrgId, OrganizationView>>,
    reverting: RwLock<HashSet<OrgId>>,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a list of views, keyed by their `org_id`.
    pub fn from_views(views: impl IntoIterator<Item = OrganizationView>) -> Self {
        let registry = Self::new();
        for view in views {
            registry.insert(view);
        }
        registry
    }

    /// Record (or replace) the view for an organization.
    pub fn insert(&self, view: OrganizationView) {
        self.views
            .write()
            .expect("lock poisoned")
            .insert(view.org_id, view);
    }

    /// Make calls for this organization revert.
    pub fn set_reverting(&self, org_id: OrgId) {
        self.reverting
            .write()
            .expect("lock poisoned")
            .insert(org_id);
    }

    pub fn len(&self) -> usize {
        self.views.read().expect("lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl OrgIdRegistry for InMemoryRegistry {
    async fn get_organization(&self, org_id: &OrgId) -> RegistryResult<OrganizationView> {
        if self.reverting.read().expect("lock poisoned").contains(org_id) {
            return Err(RegistryError::Reverted {
                org_id: *org_id,
                reason: "execution reverted".into(),
            });
        }
        Ok(self
            .views
            .read()
            .expect("lock poisoned")
            .get(org_id)
            .cloned()
            .unwrap_or_else(|| OrganizationView::missing(*org_id)))
    }
}
