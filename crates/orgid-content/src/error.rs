use orgid_types::ContentId;
use thiserror::Error;

/// Failure to retrieve document bytes.
///
/// Every variant is recoverable: the caller keeps its existing profile and
/// retries on the next relevant event.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("content not found: {0}")]
    NotFound(ContentId),

    #[error("timed out fetching {0}")]
    Timeout(ContentId),

    #[error("document {cid} exceeds {limit} bytes ({size} bytes seen)")]
    TooLarge {
        cid: ContentId,
        size: u64,
        limit: u64,
    },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type FetchResult<T> = Result<T, FetchError>;

/// Reasons a fetched document is rejected as a whole.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProfileError {
    #[error("document is not valid JSON: {0}")]
    NotJson(String),

    #[error("document root is not an object")]
    NotAnObject,

    #[error("missing required field `{0}`")]
    MissingField(String),

    #[error("field `{field}` should be {expected}")]
    WrongType {
        field: String,
        expected: &'static str,
    },
}
