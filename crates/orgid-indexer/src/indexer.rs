use orgid_content::{ContentFetcher, ContentResolver, Profile, ProfileResolution};
use orgid_ledger::{
    EventBody, EventSource, LedgerEvent, OrderingGuard, OrgIdRegistry, OrganizationView,
};
use orgid_store::{
    EntityRepository, EntityStore, LegalEntity, Organization, OrganizationType,
    OrganizationalUnit, ProfileLink,
};
use orgid_types::{Address, BlockRef, OrgId};
use tracing::{debug, info, warn};

use crate::arbitration::{ArbitrationHook, NoOpArbitration};
use crate::config::IndexerConfig;
use crate::directory::{DirectoryManager, MembershipChange};
use crate::error::IndexerResult;

/// Why an event left the graph unchanged.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
    /// Emitted by a contract other than the configured one.
    ForeignContract,
    /// The `getOrganization` view call reverted or could not be made.
    ViewCallFailed,
    /// The view call reported that the organization does not exist.
    NotOnChain,
    /// The event targets an organization that was never materialized.
    OrganizationNotFound,
    /// The membership record already exists.
    DuplicateMembership,
    /// The membership record to remove does not exist.
    MissingMembership,
}

/// Result of handling one event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HandleOutcome {
    Applied,
    Skipped(SkipReason),
}

impl HandleOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied)
    }
}

/// Reconciles ledger events into the entity graph.
///
/// Events must be handed over one at a time in ledger order; `handle` takes
/// `&mut self` so two events can never be in flight together. Every domain
/// failure (reverted view call, unreachable or malformed document, unknown
/// organization, inconsistent membership) is logged and reported as
/// [`HandleOutcome::Skipped`]. Only store failures are errors.
pub struct Indexer<S, R, F> {
    config: IndexerConfig,
    store: S,
    registry: R,
    resolver: ContentResolver<F>,
    arbitration: Box<dyn ArbitrationHook>,
    pub(crate) guard: OrderingGuard,
}

impl<S, R, F> Indexer<S, R, F>
where
    S: EntityStore,
    R: OrgIdRegistry,
    F: ContentFetcher,
{
    pub fn new(config: IndexerConfig, store: S, registry: R, resolver: ContentResolver<F>) -> Self {
        Self {
            config,
            store,
            registry,
            resolver,
            arbitration: Box::new(NoOpArbitration),
            guard: OrderingGuard::new(),
        }
    }

    /// Route arbitration events to `hook` instead of ignoring them.
    pub fn with_arbitration(mut self, hook: impl ArbitrationHook + 'static) -> Self {
        self.arbitration = Box::new(hook);
        self
    }

    /// Continue from a stream position recorded by an earlier run.
    pub fn with_guard(mut self, guard: OrderingGuard) -> Self {
        self.guard = guard;
        self
    }

    pub fn config(&self) -> &IndexerConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn guard(&self) -> &OrderingGuard {
        &self.guard
    }

    /// Apply one ledger event.
    pub async fn handle(&mut self, event: &LedgerEvent) -> IndexerResult<HandleOutcome> {
        self.guard.observe(event);
        self.apply(event).await
    }

    pub(crate) async fn apply(&mut self, event: &LedgerEvent) -> IndexerResult<HandleOutcome> {
        if let Some(outcome) = self.check_emitter(event) {
            return Ok(outcome);
        }

        let at = event.block;
        match &event.body {
            EventBody::OrganizationCreated { org_id, .. } => {
                self.materialize(*org_id, OrganizationType::LegalEntity, None, at)
                    .await
            }
            EventBody::UnitCreated {
                parent_org_id,
                unit_org_id,
                ..
            } => {
                self.materialize(
                    *unit_org_id,
                    OrganizationType::OrganizationalUnit,
                    Some(*parent_org_id),
                    at,
                )
                .await
            }
            EventBody::OrgJsonChanged {
                org_id,
                new_org_json_hash,
            } => {
                let Some(mut org) = self.existing(org_id, event)? else {
                    return Ok(HandleOutcome::Skipped(SkipReason::OrganizationNotFound));
                };
                if org.set_org_json_hash(Some(*new_org_json_hash)) {
                    debug!(org_id = %org_id, cid = ?org.ipfs_cid(), "document hash changed");
                }
                self.refresh_profile(&mut org).await?;
                self.store.upsert(&org)?;
                Ok(HandleOutcome::Applied)
            }
            EventBody::OrganizationActiveStateChanged { org_id, new_state } => {
                self.update(org_id, event, |org| org.is_active = *new_state)
            }
            EventBody::OrganizationOwnershipTransferred { org_id, new_owner } => {
                self.update(org_id, event, |org| org.owner = *new_owner)
            }
            EventBody::DirectorshipAccepted { org_id, director } => {
                self.update(org_id, event, |org| org.director = non_zero(*director))
            }
            EventBody::DirectorshipTransferred {
                org_id,
                new_director,
            } => self.update(org_id, event, |org| org.director = non_zero(*new_director)),
            EventBody::DirectorshipRequested { org_id, director }
            | EventBody::DirectorshipRejected { org_id, director } => {
                debug!(
                    org_id = %org_id,
                    director = %director,
                    event = event.body.name(),
                    "directorship not yet accepted; organization unchanged"
                );
                Ok(HandleOutcome::Applied)
            }

            EventBody::SegmentChanged { new_segment } => {
                self.directories()
                    .rename_segment(&event.address, new_segment)?;
                Ok(HandleOutcome::Applied)
            }
            EventBody::OrganizationSubmitted { organization } => Ok(membership_outcome(
                self.directories().submit(&event.address, organization, at)?,
            )),
            EventBody::OrganizationRequestRemoved { organization } => Ok(membership_outcome(
                self.directories()
                    .withdraw_request(&event.address, organization)?,
            )),
            EventBody::OrganizationAdded { organization } => Ok(membership_outcome(
                self.directories().accept(&event.address, organization, at)?,
            )),
            EventBody::OrganizationRemoved { organization } => Ok(membership_outcome(
                self.directories().remove(&event.address, organization)?,
            )),
            EventBody::OrganizationChallenged { .. }
            | EventBody::ChallengeContributed { .. }
            | EventBody::Ruling { .. }
            | EventBody::Dispute { .. }
            | EventBody::Evidence { .. }
            | EventBody::MetaEvidence { .. } => {
                self.arbitration.on_event(&self.store, event).await?;
                Ok(HandleOutcome::Applied)
            }

            EventBody::SegmentAdded { segment, .. } => {
                self.directories().list(segment, at)?;
                Ok(HandleOutcome::Applied)
            }
            EventBody::SegmentRemoved { segment } => {
                self.directories().delist(segment, at)?;
                Ok(HandleOutcome::Applied)
            }
        }
    }

    fn check_emitter(&self, event: &LedgerEvent) -> Option<HandleOutcome> {
        let accepted = match event.body.source() {
            EventSource::OrgId => self.config.accepts_registry(&event.address),
            EventSource::DirectoryIndex => self.config.accepts_directory_index(&event.address),
            EventSource::Directory => true,
        };
        if accepted {
            return None;
        }
        debug!(event = %event, source = %event.body.source(), "event from unconfigured contract");
        Some(HandleOutcome::Skipped(SkipReason::ForeignContract))
    }

    fn directories(&self) -> DirectoryManager<'_, S> {
        DirectoryManager::new(&self.store)
    }

    fn existing(&self, org_id: &OrgId, event: &LedgerEvent) -> IndexerResult<Option<Organization>> {
        let org = self.store.load::<Organization>(&Organization::key(org_id))?;
        if org.is_none() {
            warn!(org_id = %org_id, event = %event, "organization not indexed; event ignored");
        }
        Ok(org)
    }

    fn update(
        &self,
        org_id: &OrgId,
        event: &LedgerEvent,
        apply: impl FnOnce(&mut Organization),
    ) -> IndexerResult<HandleOutcome> {
        let Some(mut org) = self.existing(org_id, event)? else {
            return Ok(HandleOutcome::Skipped(SkipReason::OrganizationNotFound));
        };
        apply(&mut org);
        self.store.upsert(&org)?;
        debug!(org_id = %org_id, event = event.body.name(), "organization updated");
        Ok(HandleOutcome::Applied)
    }

    /// Build or refresh an organization from the registry view.
    ///
    /// The view is the source of truth for every on-chain attribute. The
    /// organization type, creation block, unit list and profile link of an
    /// already indexed organization are kept, so replaying the creation event
    /// converges on the same state.
    async fn materialize(
        &mut self,
        org_id: OrgId,
        organization_type: OrganizationType,
        parent: Option<OrgId>,
        at: BlockRef,
    ) -> IndexerResult<HandleOutcome> {
        let view = match self.registry.get_organization(&org_id).await {
            Ok(view) => view,
            Err(e) => {
                warn!(
                    org_id = %org_id,
                    error = %e,
                    "getOrganization failed; organization not indexed"
                );
                return Ok(HandleOutcome::Skipped(SkipReason::ViewCallFailed));
            }
        };
        if !view.exists {
            warn!(org_id = %org_id, "organization does not exist on chain; not indexed");
            return Ok(HandleOutcome::Skipped(SkipReason::NotOnChain));
        }

        let mut org = match self.store.load::<Organization>(&Organization::key(&org_id))? {
            Some(org) => org,
            None => Organization::new(org_id, organization_type, view.owner, at),
        };
        apply_view(&mut org, &view);
        if organization_type == OrganizationType::OrganizationalUnit {
            org.parent = parent.or_else(|| view.parent());
        }

        self.refresh_profile(&mut org).await?;
        self.store.upsert(&org)?;
        info!(
            org_id = %org_id,
            kind = %org.organization_type(),
            cid = ?org.ipfs_cid(),
            "organization indexed"
        );

        if let Some(parent) = org.parent {
            self.attach_unit(&parent, &org_id)?;
        }
        Ok(HandleOutcome::Applied)
    }

    fn attach_unit(&self, parent: &OrgId, unit: &OrgId) -> IndexerResult<()> {
        match self.store.load::<Organization>(&Organization::key(parent))? {
            Some(mut parent_org) => {
                if parent_org.add_unit(*unit) {
                    self.store.upsert(&parent_org)?;
                    debug!(parent = %parent, unit = %unit, "unit attached");
                }
            }
            None => warn!(parent = %parent, unit = %unit, "parent organization not indexed"),
        }
        Ok(())
    }

    /// Resolve the organization's current document and link the profile.
    ///
    /// When there is no document, or it cannot be fetched or is rejected, the
    /// previous profile link stays in place.
    async fn refresh_profile(&self, org: &mut Organization) -> IndexerResult<()> {
        let Some(cid) = org.ipfs_cid().cloned() else {
            debug!(org_id = %org.org_id, "no document hash; profile unchanged");
            return Ok(());
        };

        let kind = org.organization_type();
        match self.resolver.resolve(&self.store, &cid, kind).await? {
            ProfileResolution::Resolved(profile) => self.link_profile(org, profile)?,
            ProfileResolution::NotFound(_) | ProfileResolution::Invalid(_) => {
                debug!(org_id = %org.org_id, cid = %cid, "keeping previous profile");
            }
        }
        Ok(())
    }

    fn link_profile(&self, org: &mut Organization, profile: Profile) -> IndexerResult<()> {
        if let Some(previous) = org.profile().cloned() {
            if previous.did() != profile.did() {
                self.release_profile(&previous, &org.org_id)?;
            }
        }

        org.link_profile(profile.did());
        match profile {
            Profile::LegalEntity(mut le) => {
                le.organization = Some(org.org_id);
                self.store.upsert(&le)?;
            }
            Profile::OrganizationalUnit(mut unit) => {
                unit.organization = Some(org.org_id);
                self.store.upsert(&unit)?;
            }
        }
        Ok(())
    }

    /// Clear the reverse link of a profile the organization no longer uses.
    fn release_profile(&self, link: &ProfileLink, org_id: &OrgId) -> IndexerResult<()> {
        match link {
            ProfileLink::LegalEntity(did) => {
                if let Some(mut le) = self.store.load::<LegalEntity>(did)? {
                    if le.organization == Some(*org_id) {
                        le.organization = None;
                        self.store.upsert(&le)?;
                    }
                }
            }
            ProfileLink::OrganizationalUnit(did) => {
                if let Some(mut unit) = self.store.load::<OrganizationalUnit>(did)? {
                    if unit.organization == Some(*org_id) {
                        unit.organization = None;
                        self.store.upsert(&unit)?;
                    }
                }
            }
        }
        debug!(org_id = %org_id, did = link.did(), "previous profile released");
        Ok(())
    }
}

fn apply_view(org: &mut Organization, view: &OrganizationView) {
    org.owner = view.owner;
    org.director = view.accepted_director();
    org.is_active = view.is_active;
    org.org_json_uris = view.uris();
    org.set_org_json_hash(Some(view.org_json_hash));
}

fn non_zero(address: Address) -> Option<Address> {
    (!address.is_zero()).then_some(address)
}

fn membership_outcome(change: MembershipChange) -> HandleOutcome {
    match change {
        MembershipChange::Duplicate => HandleOutcome::Skipped(SkipReason::DuplicateMembership),
        MembershipChange::Missing => HandleOutcome::Skipped(SkipReason::MissingMembership),
        MembershipChange::Created
        | MembershipChange::Removed
        | MembershipChange::Renamed { .. } => HandleOutcome::Applied,
    }
}
