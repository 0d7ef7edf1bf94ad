use std::fmt;

use serde::{Deserialize, Serialize};

/// Reference to the block an event was emitted in.
///
/// Ordering is by block number, then by timestamp. Two references to the
/// same block carry the same timestamp; the tie-break keeps `Ord` consistent
/// with `Eq` for malformed input.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct BlockRef {
    /// Block height.
    pub number: u64,
    /// Block timestamp, seconds since UNIX epoch.
    pub timestamp: u64,
}

impl BlockRef {
    pub fn new(number: u64, timestamp: u64) -> Self {
        Self { number, timestamp }
    }

    /// The genesis reference.
    pub const fn genesis() -> Self {
        Self {
            number: 0,
            timestamp: 0,
        }
    }
}

impl PartialOrd for BlockRef {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for BlockRef {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.number
            .cmp(&other.number)
            .then(self.timestamp.cmp(&other.timestamp))
    }
}

impl fmt::Debug for BlockRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlockRef(#{}@{})", self.number, self.timestamp)
    }
}

impl fmt::Display for BlockRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.number)
    }
}
