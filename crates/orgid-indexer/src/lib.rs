//! Event reconciler for the ORGiD graph indexer.
//!
//! [`Indexer`] consumes decoded ledger events one at a time, in ledger
//! order, and keeps the entity graph consistent with them:
//!
//! - registry events materialize organizations from the `getOrganization`
//!   view call and resolve their profile documents through the
//!   [`ContentResolver`](orgid_content::ContentResolver);
//! - directory events maintain pending and registered membership through
//!   the [`DirectoryManager`];
//! - directory index events list and delist directories;
//! - arbitration events go to an [`ArbitrationHook`].
//!
//! Handlers never fail on bad chain or document data. They log, report
//! [`HandleOutcome::Skipped`] and leave the graph as it was, so the stream
//! keeps advancing.

pub mod arbitration;
pub mod config;
pub mod directory;
pub mod error;
pub mod indexer;
pub mod replay;

pub use arbitration::{ArbitrationHook, NoOpArbitration};
pub use config::IndexerConfig;
pub use directory::{DirectoryManager, MembershipChange};
pub use error::{ConfigError, IndexerError, IndexerResult};
pub use indexer::{HandleOutcome, Indexer, SkipReason};
pub use replay::ReplayReport;
