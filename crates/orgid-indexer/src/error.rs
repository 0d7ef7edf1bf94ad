use std::io;
use std::path::PathBuf;

use orgid_store::StoreError;

/// Errors that stop an event from being processed.
///
/// Bad chain or document data never ends up here; it is logged and the event
/// is reported as skipped. Only entity store failures propagate.
#[derive(Debug, thiserror::Error)]
pub enum IndexerError {
    #[error("entity store error: {0}")]
    Store(#[from] StoreError),
}

/// Convenience alias used throughout the indexer crate.
pub type IndexerResult<T> = std::result::Result<T, IndexerError>;

/// Errors loading an [`IndexerConfig`](crate::config::IndexerConfig).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}
