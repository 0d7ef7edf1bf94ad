use orgid_types::OrgId;

/// Errors produced by registry view calls.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// The contract call reverted.
    #[error("getOrganization reverted for {org_id}: {reason}")]
    Reverted { org_id: OrgId, reason: String },

    /// The call never reached the contract.
    #[error("registry transport error: {0}")]
    Transport(String),
}

/// Result alias for registry calls.
pub type RegistryResult<T> = Result<T, RegistryError>;
