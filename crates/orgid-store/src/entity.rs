use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};

/// The kind of entity stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityKind {
    Organization,
    LegalEntity,
    OrganizationalUnit,
    OrganizationAddress,
    Directory,
    RequestedDirectoryOrganization,
    RegisteredDirectoryOrganization,
}

impl EntityKind {
    /// Every kind, in declaration order.
    pub const ALL: [EntityKind; 7] = [
        Self::Organization,
        Self::LegalEntity,
        Self::OrganizationalUnit,
        Self::OrganizationAddress,
        Self::Directory,
        Self::RequestedDirectoryOrganization,
        Self::RegisteredDirectoryOrganization,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Organization => "Organization",
            Self::LegalEntity => "LegalEntity",
            Self::OrganizationalUnit => "OrganizationalUnit",
            Self::OrganizationAddress => "OrganizationAddress",
            Self::Directory => "Directory",
            Self::RequestedDirectoryOrganization => "RequestedDirectoryOrganization",
            Self::RegisteredDirectoryOrganization => "RegisteredDirectoryOrganization",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("unknown entity kind: {s}"))
    }
}

/// A stored entity: kind tag + key + serialized body.
///
/// `StoredEntity` is the unit of storage. The store never interprets `data`;
/// typed access goes through [`Entity::from_stored`].
#[derive(Clone, Debug, PartialEq)]
pub struct StoredEntity {
    pub kind: EntityKind,
    pub id: String,
    pub data: serde_json::Value,
}

impl StoredEntity {
    pub fn new(kind: EntityKind, id: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            kind,
            id: id.into(),
            data,
        }
    }
}

/// A typed entity that can be persisted in an [`EntityStore`].
///
/// [`EntityStore`]: crate::traits::EntityStore
pub trait Entity: Clone + Serialize + DeserializeOwned {
    /// Kind tag this type is stored under.
    const KIND: EntityKind;

    /// The entity key.
    fn id(&self) -> &str;

    /// Encode for storage.
    fn to_stored(&self) -> StoreResult<StoredEntity> {
        if self.id().is_empty() {
            return Err(StoreError::EmptyId(Self::KIND));
        }
        Ok(StoredEntity::new(
            Self::KIND,
            self.id(),
            serde_json::to_value(self)?,
        ))
    }

    /// Decode from storage, checking the kind tag.
    fn from_stored(stored: &StoredEntity) -> StoreResult<Self> {
        if stored.kind != Self::KIND {
            return Err(StoreError::KindMismatch {
                id: stored.id.clone(),
                expected: Self::KIND,
                found: stored.kind,
            });
        }
        serde_json::from_value(stored.data.clone()).map_err(|e| StoreError::CorruptEntity {
            kind: Self::KIND,
            id: stored.id.clone(),
            reason: e.to_string(),
        })
    }
}

/// An entity whose every field has a meaningful empty value.
///
/// Only these entities may be created by
/// [`EntityRepository::load_or_create`](crate::traits::EntityRepository::load_or_create).
pub trait DefaultEntity: Entity {
    /// A fully initialized, empty entity with the given key.
    fn with_id(id: &str) -> Self;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LegalEntity, OrganizationAddress};

    #[test]
    fn kind_names_roundtrip() {
        for kind in EntityKind::ALL {
            assert_eq!(kind.as_str().parse::<EntityKind>().unwrap(), kind);
        }
        assert!("Segment".parse::<EntityKind>().is_err());
    }

    #[test]
    fn stored_entity_carries_kind_and_id() {
        let address = OrganizationAddress::with_id("did:orgid:0x01");
        let stored = address.to_stored().unwrap();
        assert_eq!(stored.kind, EntityKind::OrganizationAddress);
        assert_eq!(stored.id, "did:orgid:0x01");
        assert_eq!(OrganizationAddress::from_stored(&stored).unwrap(), address);
    }

    #[test]
    fn decoding_under_wrong_kind_fails() {
        let stored = OrganizationAddress::with_id("did:x").to_stored().unwrap();
        let err = LegalEntity::from_stored(&stored).unwrap_err();
        assert!(matches!(
            err,
            StoreError::KindMismatch {
                expected: EntityKind::LegalEntity,
                found: EntityKind::OrganizationAddress,
                ..
            }
        ));
    }

    #[test]
    fn empty_id_is_rejected() {
        let err = OrganizationAddress::with_id("").to_stored().unwrap_err();
        assert!(matches!(err, StoreError::EmptyId(EntityKind::OrganizationAddress)));
    }

    #[test]
    fn corrupt_data_is_reported() {
        let stored = StoredEntity::new(
            EntityKind::LegalEntity,
            "did:x",
            serde_json::json!({ "id": 42 }),
        );
        assert!(matches!(
            LegalEntity::from_stored(&stored),
            Err(StoreError::CorruptEntity { .. })
        ));
    }
}
