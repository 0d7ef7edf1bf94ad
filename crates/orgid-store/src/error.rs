use crate::entity::EntityKind;

/// Errors from entity store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Serialization or deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A stored value was read back under the wrong kind.
    #[error("kind mismatch for {id}: expected {expected}, found {found}")]
    KindMismatch {
        id: String,
        expected: EntityKind,
        found: EntityKind,
    },

    /// The entity data is malformed or cannot be decoded.
    #[error("corrupt {kind} entity {id}: {reason}")]
    CorruptEntity {
        kind: EntityKind,
        id: String,
        reason: String,
    },

    /// A snapshot named a kind this store does not know.
    #[error("unknown entity kind: {0}")]
    UnknownKind(String),

    /// Attempted to write an entity with an empty id.
    #[error("cannot store {0} entity with empty id")]
    EmptyId(EntityKind),

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
