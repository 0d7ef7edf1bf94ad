//! Directory membership: pending and registered join records.
//!
//! Each (directory, organization) pair has at most one of
//! [`RequestedDirectoryOrganization`] and [`RegisteredDirectoryOrganization`],
//! both keyed by [`membership_key`]. Acceptance moves a pair from pending to
//! registered; removal only ever touches the registered set. The index sets on
//! the [`Directory`] are kept in step with the records.

use orgid_store::{
    membership_key, Directory, EntityRepository, EntityStore, LegalEntity, Organization,
    OrganizationAddress, OrganizationalUnit, ProfileLink, RegisteredDirectoryOrganization,
    RequestedDirectoryOrganization, StoreResult,
};
use orgid_types::{Address, BlockRef, OrgId};
use tracing::{debug, error, info};

/// What a membership operation did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MembershipChange {
    /// A join record was created.
    Created,
    /// A join record was deleted.
    Removed,
    /// The directory segment changed; `records` join records were updated.
    Renamed { records: usize },
    /// The record already existed; nothing changed.
    Duplicate,
    /// The record to delete did not exist; nothing changed.
    Missing,
}

/// Applies membership transitions for directories.
pub struct DirectoryManager<'a, S: ?Sized> {
    store: &'a S,
}

impl<'a, S: EntityStore + ?Sized> DirectoryManager<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    fn directory(&self, directory: &Address) -> StoreResult<Directory> {
        Ok(self
            .store
            .load_or_create::<Directory>(&Directory::key(directory))?
            .into_inner())
    }

    /// Country of the organization's profile address, if known.
    pub fn location_of(&self, organization: &OrgId) -> StoreResult<Option<String>> {
        let Some(org) = self
            .store
            .load::<Organization>(&Organization::key(organization))?
        else {
            return Ok(None);
        };
        let address_id = match org.profile() {
            Some(ProfileLink::LegalEntity(did)) => self
                .store
                .load::<LegalEntity>(did)?
                .and_then(|p| p.registered_address),
            Some(ProfileLink::OrganizationalUnit(did)) => self
                .store
                .load::<OrganizationalUnit>(did)?
                .and_then(|p| p.address),
            None => None,
        };
        match address_id {
            Some(id) => Ok(self
                .store
                .load::<OrganizationAddress>(&id)?
                .and_then(|a| a.country)),
            None => Ok(None),
        }
    }

    /// `OrganizationSubmitted`: open a pending request.
    pub fn submit(
        &self,
        directory: &Address,
        organization: &OrgId,
        at: BlockRef,
    ) -> StoreResult<MembershipChange> {
        let key = membership_key(directory, organization);
        if self.store.contains::<RequestedDirectoryOrganization>(&key)? {
            error!(
                directory = %directory,
                org_id = %organization,
                "organization already requested"
            );
            return Ok(MembershipChange::Duplicate);
        }
        if self.store.contains::<RegisteredDirectoryOrganization>(&key)? {
            error!(
                directory = %directory,
                org_id = %organization,
                "organization already registered"
            );
            return Ok(MembershipChange::Duplicate);
        }

        let mut dir = self.directory(directory)?;
        let record = RequestedDirectoryOrganization::new(
            *directory,
            *organization,
            dir.segment.clone(),
            self.location_of(organization)?,
            at,
        );
        self.store.upsert(&record)?;
        dir.requested.insert(*organization);
        self.store.upsert(&dir)?;

        debug!(directory = %directory, org_id = %organization, "membership requested");
        Ok(MembershipChange::Created)
    }

    /// `OrganizationRequestRemoved`: drop a pending request.
    pub fn withdraw_request(
        &self,
        directory: &Address,
        organization: &OrgId,
    ) -> StoreResult<MembershipChange> {
        let key = membership_key(directory, organization);
        if !self.store.remove::<RequestedDirectoryOrganization>(&key)? {
            error!(directory = %directory, org_id = %organization, "no pending request to remove");
            return Ok(MembershipChange::Missing);
        }

        let mut dir = self.directory(directory)?;
        dir.requested.remove(organization);
        self.store.upsert(&dir)?;

        debug!(directory = %directory, org_id = %organization, "membership request removed");
        Ok(MembershipChange::Removed)
    }

    /// `OrganizationAdded`: register an organization.
    ///
    /// A pending request is not required. When one is open it is closed, so
    /// the pair ends up registered only.
    pub fn accept(
        &self,
        directory: &Address,
        organization: &OrgId,
        at: BlockRef,
    ) -> StoreResult<MembershipChange> {
        let key = membership_key(directory, organization);
        if self.store.contains::<RegisteredDirectoryOrganization>(&key)? {
            error!(
                directory = %directory,
                org_id = %organization,
                "organization already registered"
            );
            return Ok(MembershipChange::Duplicate);
        }

        let mut dir = self.directory(directory)?;
        let record = RegisteredDirectoryOrganization::new(
            *directory,
            *organization,
            dir.segment.clone(),
            self.location_of(organization)?,
            at,
        );
        self.store.upsert(&record)?;
        if self.store.remove::<RequestedDirectoryOrganization>(&key)? {
            debug!(directory = %directory, org_id = %organization, "pending request closed");
        }
        dir.requested.remove(organization);
        dir.registered.insert(*organization);
        self.store.upsert(&dir)?;

        info!(directory = %directory, org_id = %organization, "organization registered");
        Ok(MembershipChange::Created)
    }

    /// `OrganizationRemoved`: drop a registration. The pending set is never
    /// touched.
    pub fn remove(
        &self,
        directory: &Address,
        organization: &OrgId,
    ) -> StoreResult<MembershipChange> {
        let key = membership_key(directory, organization);
        if !self.store.remove::<RegisteredDirectoryOrganization>(&key)? {
            error!(directory = %directory, org_id = %organization, "no registration to remove");
            return Ok(MembershipChange::Missing);
        }

        let mut dir = self.directory(directory)?;
        dir.registered.remove(organization);
        self.store.upsert(&dir)?;

        info!(directory = %directory, org_id = %organization, "organization removed");
        Ok(MembershipChange::Removed)
    }

    /// `SegmentChanged`: rename the directory and every current join record.
    pub fn rename_segment(
        &self,
        directory: &Address,
        segment: &str,
    ) -> StoreResult<MembershipChange> {
        let mut dir = self.directory(directory)?;
        dir.segment = Some(segment.to_string());
        self.store.upsert(&dir)?;

        let mut records = 0;
        for organization in &dir.requested {
            let key = membership_key(directory, organization);
            match self.store.load::<RequestedDirectoryOrganization>(&key)? {
                Some(mut record) => {
                    record.segment = dir.segment.clone();
                    self.store.upsert(&record)?;
                    records += 1;
                }
                None => error!(
                    directory = %directory,
                    org_id = %organization,
                    "indexed request has no record"
                ),
            }
        }
        for organization in &dir.registered {
            let key = membership_key(directory, organization);
            match self.store.load::<RegisteredDirectoryOrganization>(&key)? {
                Some(mut record) => {
                    record.segment = dir.segment.clone();
                    self.store.upsert(&record)?;
                    records += 1;
                }
                None => error!(
                    directory = %directory,
                    org_id = %organization,
                    "indexed registration has no record"
                ),
            }
        }

        info!(directory = %directory, segment, records, "segment renamed");
        Ok(MembershipChange::Renamed { records })
    }

    /// `SegmentAdded` on the directory index.
    pub fn list(&self, directory: &Address, at: BlockRef) -> StoreResult<()> {
        let mut dir = self.directory(directory)?;
        dir.is_removed = false;
        dir.added_at = Some(at);
        self.store.upsert(&dir)?;
        info!(directory = %directory, block = %at, "directory listed");
        Ok(())
    }

    /// `SegmentRemoved` on the directory index. Membership is kept.
    pub fn delist(&self, directory: &Address, at: BlockRef) -> StoreResult<()> {
        let mut dir = self.directory(directory)?;
        dir.is_removed = true;
        dir.removed_at = Some(at);
        self.store.upsert(&dir)?;
        info!(directory = %directory, block = %at, "directory delisted");
        Ok(())
    }
}
