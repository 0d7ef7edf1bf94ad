use std::collections::BTreeSet;
use std::fmt;

use orgid_types::{Address, BlockRef, ContentId, JsonHash, OrgId};
use serde::{Deserialize, Serialize};

use crate::entity::{DefaultEntity, Entity, EntityKind};

// ---------------------------------------------------------------------------
// Organization
// ---------------------------------------------------------------------------

/// Which profile document an organization carries.
///
/// Fixed when the organization is created: top-level organizations are legal
/// entities, units created under a parent are organizational units.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrganizationType {
    LegalEntity,
    OrganizationalUnit,
}

impl OrganizationType {
    /// Key of the nested profile object inside the organization document.
    pub fn document_key(&self) -> &'static str {
        match self {
            Self::LegalEntity => "legalEntity",
            Self::OrganizationalUnit => "organizationalUnit",
        }
    }
}

impl fmt::Display for OrganizationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LegalEntity => f.write_str("LegalEntity"),
            Self::OrganizationalUnit => f.write_str("OrganizationalUnit"),
        }
    }
}

/// Link from an organization to its profile entity (by DID).
///
/// Only ever built through [`Organization::link_profile`], so the variant
/// always agrees with the organization's [`OrganizationType`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProfileLink {
    LegalEntity(String),
    OrganizationalUnit(String),
}

impl ProfileLink {
    pub fn did(&self) -> &str {
        match self {
            Self::LegalEntity(did) | Self::OrganizationalUnit(did) => did,
        }
    }

    pub fn organization_type(&self) -> OrganizationType {
        match self {
            Self::LegalEntity(_) => OrganizationType::LegalEntity,
            Self::OrganizationalUnit(_) => OrganizationType::OrganizationalUnit,
        }
    }
}

/// On-chain identity record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    id: String,
    pub org_id: OrgId,
    pub owner: Address,
    pub director: Option<Address>,
    pub is_active: bool,
    organization_type: OrganizationType,
    org_json_hash: Option<JsonHash>,
    ipfs_cid: Option<ContentId>,
    pub org_json_uris: Vec<String>,
    pub created_at: BlockRef,
    pub parent: Option<OrgId>,
    units: Vec<OrgId>,
    profile: Option<ProfileLink>,
}

impl Organization {
    /// Build a new organization. Every required attribute is an argument.
    pub fn new(
        org_id: OrgId,
        organization_type: OrganizationType,
        owner: Address,
        created_at: BlockRef,
    ) -> Self {
        Self {
            id: org_id.to_hex(),
            org_id,
            owner,
            director: None,
            is_active: true,
            organization_type,
            org_json_hash: None,
            ipfs_cid: None,
            org_json_uris: Vec::new(),
            created_at,
            parent: None,
            units: Vec::new(),
            profile: None,
        }
    }

    /// Entity key for an org id.
    pub fn key(org_id: &OrgId) -> String {
        org_id.to_hex()
    }

    pub fn organization_type(&self) -> OrganizationType {
        self.organization_type
    }

    pub fn org_json_hash(&self) -> Option<&JsonHash> {
        self.org_json_hash.as_ref()
    }

    pub fn ipfs_cid(&self) -> Option<&ContentId> {
        self.ipfs_cid.as_ref()
    }

    /// Set the document hash and recompute the content id.
    ///
    /// A zero hash clears both. Returns `true` if the hash changed.
    pub fn set_org_json_hash(&mut self, hash: Option<JsonHash>) -> bool {
        let hash = hash.filter(|h| !h.is_zero());
        if hash == self.org_json_hash {
            return false;
        }
        self.ipfs_cid = hash.as_ref().map(ContentId::from_hash);
        self.org_json_hash = hash;
        true
    }

    pub fn units(&self) -> &[OrgId] {
        &self.units
    }

    /// Record a child unit. Returns `false` if it was already listed.
    pub fn add_unit(&mut self, unit: OrgId) -> bool {
        if self.units.contains(&unit) {
            return false;
        }
        self.units.push(unit);
        true
    }

    pub fn profile(&self) -> Option<&ProfileLink> {
        self.profile.as_ref()
    }

    /// Point this organization at the profile with the given DID, using the
    /// variant dictated by the organization type.
    pub fn link_profile(&mut self, did: impl Into<String>) {
        let did = did.into();
        self.profile = Some(match self.organization_type {
            OrganizationType::LegalEntity => ProfileLink::LegalEntity(did),
            OrganizationType::OrganizationalUnit => ProfileLink::OrganizationalUnit(did),
        });
    }
}

impl Entity for Organization {
    const KIND: EntityKind = EntityKind::Organization;

    fn id(&self) -> &str {
        &self.id
    }
}

// ---------------------------------------------------------------------------
// Profiles
// ---------------------------------------------------------------------------

/// Postal address attached to a profile, keyed by the profile's DID.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrganizationAddress {
    pub id: String,
    pub country: Option<String>,
    pub subdivision: Option<String>,
    pub locality: Option<String>,
    pub street_address: Option<String>,
    pub postal_code: Option<String>,
}

impl Entity for OrganizationAddress {
    const KIND: EntityKind = EntityKind::OrganizationAddress;

    fn id(&self) -> &str {
        &self.id
    }
}

impl DefaultEntity for OrganizationAddress {
    fn with_id(id: &str) -> Self {
        Self {
            id: id.to_string(),
            ..Self::default()
        }
    }
}

/// Profile of a top-level organization.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LegalEntity {
    pub id: String,
    pub legal_name: Option<String>,
    pub legal_type: Option<String>,
    pub legal_identifier: Option<String>,
    pub logo: Option<String>,
    /// Key of the [`OrganizationAddress`] entity.
    pub registered_address: Option<String>,
    /// Organization that links this profile.
    pub organization: Option<OrgId>,
}

impl Entity for LegalEntity {
    const KIND: EntityKind = EntityKind::LegalEntity;

    fn id(&self) -> &str {
        &self.id
    }
}

impl DefaultEntity for LegalEntity {
    fn with_id(id: &str) -> Self {
        Self {
            id: id.to_string(),
            ..Self::default()
        }
    }
}

/// Profile of a unit (sub-organization).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrganizationalUnit {
    pub id: String,
    pub name: Option<String>,
    pub unit_type: Vec<String>,
    pub description: Option<String>,
    pub long_description: Option<String>,
    pub logo: Option<String>,
    /// Key of the [`OrganizationAddress`] entity.
    pub address: Option<String>,
    pub organization: Option<OrgId>,
}

impl Entity for OrganizationalUnit {
    const KIND: EntityKind = EntityKind::OrganizationalUnit;

    fn id(&self) -> &str {
        &self.id
    }
}

impl DefaultEntity for OrganizationalUnit {
    fn with_id(id: &str) -> Self {
        Self {
            id: id.to_string(),
            ..Self::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Directories
// ---------------------------------------------------------------------------

/// A curated directory of organizations, keyed by its contract address.
///
/// `requested` and `registered` index the current join records so a
/// directory can be walked without a store scan. They are maintained
/// together with the records and never shared between the two states.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Directory {
    pub id: String,
    pub segment: Option<String>,
    pub is_removed: bool,
    pub added_at: Option<BlockRef>,
    pub removed_at: Option<BlockRef>,
    pub requested: BTreeSet<OrgId>,
    pub registered: BTreeSet<OrgId>,
}

impl Directory {
    pub fn key(directory: &Address) -> String {
        directory.to_hex()
    }
}

impl Entity for Directory {
    const KIND: EntityKind = EntityKind::Directory;

    fn id(&self) -> &str {
        &self.id
    }
}

impl DefaultEntity for Directory {
    fn with_id(id: &str) -> Self {
        Self {
            id: id.to_string(),
            ..Self::default()
        }
    }
}

/// Key shared by both membership join records of a (directory, organization) pair.
pub fn membership_key(directory: &Address, organization: &OrgId) -> String {
    format!("{}-{}", directory.to_hex(), organization.to_hex())
}

/// Arbitration state of a pending membership request.
///
/// The core never moves a request out of `Unchallenged`; arbitration hooks
/// may.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChallengeState {
    #[default]
    Unchallenged,
    Challenged { since: BlockRef },
    Ruled { ruling: u64, at: BlockRef },
}

/// Pending membership of an organization in a directory.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestedDirectoryOrganization {
    pub id: String,
    pub directory: Address,
    pub organization: OrgId,
    pub segment: Option<String>,
    pub location: Option<String>,
    pub requested_at: BlockRef,
    #[serde(default)]
    pub challenge: ChallengeState,
}

impl RequestedDirectoryOrganization {
    pub fn new(
        directory: Address,
        organization: OrgId,
        segment: Option<String>,
        location: Option<String>,
        requested_at: BlockRef,
    ) -> Self {
        Self {
            id: membership_key(&directory, &organization),
            directory,
            organization,
            segment,
            location,
            requested_at,
            challenge: ChallengeState::Unchallenged,
        }
    }
}

impl Entity for RequestedDirectoryOrganization {
    const KIND: EntityKind = EntityKind::RequestedDirectoryOrganization;

    fn id(&self) -> &str {
        &self.id
    }
}

/// Accepted membership of an organization in a directory.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisteredDirectoryOrganization {
    pub id: String,
    pub directory: Address,
    pub organization: OrgId,
    pub segment: Option<String>,
    pub location: Option<String>,
    pub registered_at: BlockRef,
}

impl RegisteredDirectoryOrganization {
    pub fn new(
        directory: Address,
        organization: OrgId,
        segment: Option<String>,
        location: Option<String>,
        registered_at: BlockRef,
    ) -> Self {
        Self {
            id: membership_key(&directory, &organization),
            directory,
            organization,
            segment,
            location,
            registered_at,
        }
    }
}

impl Entity for RegisteredDirectoryOrganization {
    const KIND: EntityKind = EntityKind::RegisteredDirectoryOrganization;

    fn id(&self) -> &str {
        &self.id
    }
}
