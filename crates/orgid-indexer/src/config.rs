use std::path::Path;

use orgid_content::GatewayConfig;
use orgid_types::Address;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Indexer settings, read from TOML.
///
/// ```toml
/// orgid_contract = "0x..."
/// directory_index = "0x..."
/// log_filter = "info,orgid_indexer=debug"
///
/// [content]
/// url = "https://ipfs.example.org"
/// timeout_secs = 10
/// max_document_bytes = 262144
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexerConfig {
    /// Address of the ORGiD registry. Registry events from any other contract
    /// are ignored. `None` accepts every emitter.
    pub orgid_contract: Option<Address>,
    /// Address of the directory index contract, with the same rule.
    pub directory_index: Option<Address>,
    /// Where profile documents are fetched from.
    pub content: GatewayConfig,
    /// `tracing` filter directive used by the binary.
    pub log_filter: String,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            orgid_contract: None,
            directory_index: None,
            content: GatewayConfig::default(),
            log_filter: "info".into(),
        }
    }
}

impl IndexerConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Whether `address` may emit registry events.
    pub fn accepts_registry(&self, address: &Address) -> bool {
        self.orgid_contract.map_or(true, |expected| expected == *address)
    }

    /// Whether `address` may emit directory index events.
    pub fn accepts_directory_index(&self, address: &Address) -> bool {
        self.directory_index.map_or(true, |expected| expected == *address)
    }
}
