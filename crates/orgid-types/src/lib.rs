//! Foundation types for the ORGiD graph indexer.
//!
//! Every other crate in the workspace depends on `orgid-types`. The types
//! here are small `Copy` values mirroring what the ledger emits, plus the
//! content identifier codec that turns an on-chain document hash into an
//! address on the content-addressed storage network.
//!
//! # Key Types
//!
//! - [`OrgId`]: 32-byte ORGiD organization identifier
//! - [`Address`]: 20-byte account or contract address
//! - [`JsonHash`]: raw keccak-256 hash of an organization's JSON document
//! - [`ContentId`]: CIDv1 derived deterministically from a [`JsonHash`]
//! - [`BlockRef`]: block number and timestamp of the emitting block

#[macro_use]
mod macros;

pub mod block;
pub mod content;
pub mod error;
pub mod identity;

pub use block::BlockRef;
pub use content::{ContentId, JsonHash};
pub use error::TypeError;
pub use identity::{Address, OrgId};
