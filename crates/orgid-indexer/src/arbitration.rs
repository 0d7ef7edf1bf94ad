use async_trait::async_trait;
use orgid_ledger::LedgerEvent;
use orgid_store::{EntityStore, StoreResult};
use tracing::debug;

/// Extension point for directory arbitration events.
///
/// Receives `OrganizationChallenged`, `ChallengeContributed`, `Dispute`,
/// `Evidence`, `MetaEvidence` and `Ruling`. An implementation may move the
/// [`ChallengeState`](orgid_store::ChallengeState) of requested membership
/// records through the store.
#[async_trait]
pub trait ArbitrationHook: Send + Sync {
    async fn on_event(&self, store: &dyn EntityStore, event: &LedgerEvent) -> StoreResult<()>;
}

/// Accepts arbitration events without changing anything.
pub struct NoOpArbitration;

#[async_trait]
impl ArbitrationHook for NoOpArbitration {
    async fn on_event(&self, _store: &dyn EntityStore, event: &LedgerEvent) -> StoreResult<()> {
        debug!(event = %event, directory = %event.address, "arbitration event ignored");
        Ok(())
    }
}
