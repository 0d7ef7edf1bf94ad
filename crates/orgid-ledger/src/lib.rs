//! Ledger-facing boundary of the ORGiD graph indexer.
//!
//! This crate provides:
//! - The decoded event model ([`LedgerEvent`] / [`EventBody`]) for the ORGiD
//!   registry, arbitrable directories, and the directory index
//! - The [`OrgIdRegistry`] view-call trait and [`InMemoryRegistry`] for
//!   tests, fixtures, and embedding
//! - [`OrderingGuard`], which tracks the canonical (block, log index) cursor
//!   and flags redelivered history

pub mod error;
pub mod event;
pub mod ordering;
pub mod registry;

pub use error::{RegistryError, RegistryResult};
pub use event::{EventBody, EventSource, LedgerEvent};
pub use ordering::{Delivery, EventCursor, OrderingGuard};
pub use registry::{InMemoryRegistry, OrgIdRegistry, OrganizationView};
