use std::sync::Arc;

use crate::entity::{DefaultEntity, Entity, EntityKind, StoredEntity};
use crate::error::StoreResult;

/// Key-value entity store.
///
/// This is the boundary to the external storage engine. Implementations
/// must be thread-safe and apply each `write`/`delete` atomically; the
/// indexer itself serializes all mutation.
pub trait EntityStore: Send + Sync {
    /// Read an entity by kind and key.
    ///
    /// Returns `Ok(None)` if the entity does not exist.
    fn read(&self, kind: EntityKind, id: &str) -> StoreResult<Option<StoredEntity>>;

    /// Create or replace an entity.
    fn write(&self, entity: StoredEntity) -> StoreResult<()>;

    /// Delete an entity. Returns `true` if it existed.
    fn delete(&self, kind: EntityKind, id: &str) -> StoreResult<bool>;

    /// Check whether an entity exists.
    fn exists(&self, kind: EntityKind, id: &str) -> StoreResult<bool> {
        Ok(self.read(kind, id)?.is_some())
    }
}

impl<S: EntityStore + ?Sized> EntityStore for Arc<S> {
    fn read(&self, kind: EntityKind, id: &str) -> StoreResult<Option<StoredEntity>> {
        (**self).read(kind, id)
    }

    fn write(&self, entity: StoredEntity) -> StoreResult<()> {
        (**self).write(entity)
    }

    fn delete(&self, kind: EntityKind, id: &str) -> StoreResult<bool> {
        (**self).delete(kind, id)
    }

    fn exists(&self, kind: EntityKind, id: &str) -> StoreResult<bool> {
        (**self).exists(kind, id)
    }
}

/// Outcome of a load-or-create.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Loaded<E> {
    /// The entity was already stored.
    Found(E),
    /// Nothing was stored; this is a fresh empty entity (not yet persisted).
    Created(E),
}

impl<E> Loaded<E> {
    pub fn is_created(&self) -> bool {
        matches!(self, Self::Created(_))
    }

    pub fn get(&self) -> &E {
        match self {
            Self::Found(e) | Self::Created(e) => e,
        }
    }

    pub fn get_mut(&mut self) -> &mut E {
        match self {
            Self::Found(e) | Self::Created(e) => e,
        }
    }

    pub fn into_inner(self) -> E {
        match self {
            Self::Found(e) | Self::Created(e) => e,
        }
    }
}

/// Typed access over any [`EntityStore`].
pub trait EntityRepository: EntityStore {
    /// Load an entity, `None` if absent.
    fn load<E: Entity>(&self, id: &str) -> StoreResult<Option<E>> {
        self.read(E::KIND, id)?
            .map(|stored| E::from_stored(&stored))
            .transpose()
    }

    /// Load an entity, or build an empty one with this key.
    ///
    /// A created entity is not persisted until the caller upserts it.
    fn load_or_create<E: DefaultEntity>(&self, id: &str) -> StoreResult<Loaded<E>> {
        Ok(match self.load::<E>(id)? {
            Some(entity) => Loaded::Found(entity),
            None => Loaded::Created(E::with_id(id)),
        })
    }

    /// Create or replace an entity.
    fn upsert<E: Entity>(&self, entity: &E) -> StoreResult<()> {
        self.write(entity.to_stored()?)
    }

    /// Delete an entity. Returns `true` if it existed.
    fn remove<E: Entity>(&self, id: &str) -> StoreResult<bool> {
        self.delete(E::KIND, id)
    }

    fn contains<E: Entity>(&self, id: &str) -> StoreResult<bool> {
        self.exists(E::KIND, id)
    }
}

impl<S: EntityStore + ?Sized> EntityRepository for S {}
