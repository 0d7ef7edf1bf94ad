use std::fmt;

use cid::multihash::Multihash;
use cid::Cid;
use serde::{Deserialize, Serialize};

/// Multicodec for raw binary content.
pub const RAW_CODEC: u64 = 0x55;

/// Multihash function code for keccak-256.
pub const KECCAK_256: u64 = 0x1b;

/// Raw keccak-256 hash of an organization's JSON document, as stored on chain.
///
/// The zero hash means the organization has no document.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JsonHash([u8; 32]);

impl_hex_bytes!(JsonHash, 32, "JsonHash");

/// Content identifier of an organization document on the storage network.
///
/// Always a CIDv1 with the raw codec and a keccak-256 multihash, rendered in
/// lowercase base32 with the multibase `b` prefix. A `ContentId` is a pure
/// function of the [`JsonHash`] it was derived from.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentId(String);

impl ContentId {
    /// Derive the content identifier for a document hash.
    ///
    /// Byte layout before encoding: `01 55 1b 20 <32 hash bytes>`.
    pub fn from_hash(hash: &JsonHash) -> Self {
        let digest = Multihash::<64>::wrap(KECCAK_256, hash.as_bytes())
            .expect("a 32-byte digest always fits a 64-byte multihash");
        Self(Cid::new_v1(RAW_CODEC, digest).to_string())
    }

    /// The encoded identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume into the encoded string.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl From<&JsonHash> for ContentId {
    fn from(hash: &JsonHash) -> Self {
        Self::from_hash(hash)
    }
}

impl AsRef<str> for ContentId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentId({})", self.0)
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
