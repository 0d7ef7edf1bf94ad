//! Entity model and repository adapter for the ORGiD graph indexer.
//!
//! The indexer never talks to a storage engine directly. Every entity is
//! stored as a [`StoredEntity`] (kind tag + id + JSON value) behind the
//! [`EntityStore`] trait, and the typed [`EntityRepository`] extension layers
//! load / load-or-create / upsert / remove on top.
//!
//! # Entities
//!
//! - [`Organization`] -- on-chain identity record keyed by its ORGiD
//! - [`LegalEntity`] / [`OrganizationalUnit`] -- profiles parsed from the
//!   organization's JSON document, keyed by the document's DID
//! - [`OrganizationAddress`] -- postal address shared by both profiles
//! - [`Directory`] -- a curated directory, keyed by its contract address
//! - [`RequestedDirectoryOrganization`] / [`RegisteredDirectoryOrganization`]
//!   -- membership join records keyed by `{directory}-{organization}`
//!
//! # Design Rules
//!
//! 1. Loads never hand out a null: [`EntityRepository::load_or_create`]
//!    returns [`Loaded::Found`] or [`Loaded::Created`].
//! 2. Only entities with a complete default ([`DefaultEntity`]) can be
//!    created by a load. An [`Organization`] must be built from chain data.
//! 3. Join records are the only entities that are ever deleted.

pub mod entity;
pub mod error;
pub mod memory;
pub mod model;
pub mod traits;

pub use entity::{DefaultEntity, Entity, EntityKind, StoredEntity};
pub use error::{StoreError, StoreResult};
pub use memory::{InMemoryEntityStore, StoreSnapshot};
pub use model::{
    membership_key, ChallengeState, Directory, LegalEntity, Organization, OrganizationAddress,
    OrganizationType, OrganizationalUnit, ProfileLink, RegisteredDirectoryOrganization,
    RequestedDirectoryOrganization,
};
pub use traits::{EntityRepository, EntityStore, Loaded};
