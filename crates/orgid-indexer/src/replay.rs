use orgid_content::ContentFetcher;
use orgid_ledger::{Delivery, LedgerEvent, OrgIdRegistry};
use orgid_store::EntityStore;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::IndexerResult;
use crate::indexer::{HandleOutcome, Indexer};

/// Counters for a replayed batch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayReport {
    pub applied: usize,
    pub skipped: usize,
    /// Events at or before the cursor of an earlier event. They are applied
    /// (or skipped) like any other and counted here as well.
    pub redelivered: usize,
}

impl ReplayReport {
    pub fn total(&self) -> usize {
        self.applied + self.skipped
    }
}

impl<S, R, F> Indexer<S, R, F>
where
    S: EntityStore,
    R: OrgIdRegistry,
    F: ContentFetcher,
{
    /// Apply a batch of events in order.
    pub async fn replay<'a, I>(&mut self, events: I) -> IndexerResult<ReplayReport>
    where
        I: IntoIterator<Item = &'a LedgerEvent>,
    {
        let mut report = ReplayReport::default();
        for event in events {
            if let Delivery::Redelivered { .. } = self.guard.observe(event) {
                report.redelivered += 1;
            }
            match self.apply(event).await? {
                HandleOutcome::Applied => report.applied += 1,
                HandleOutcome::Skipped(_) => report.skipped += 1,
            }
        }
        info!(
            applied = report.applied,
            skipped = report.skipped,
            redelivered = report.redelivered,
            cursor = ?self.guard.cursor(),
            "replay finished"
        );
        Ok(report)
    }
}
