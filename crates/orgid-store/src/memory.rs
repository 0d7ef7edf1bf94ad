use std::collections::BTreeMap;
use std::path::Path;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::entity::{Entity, EntityKind, StoredEntity};
use crate::error::{StoreError, StoreResult};
use crate::traits::EntityStore;

/// In-memory, map-based entity store.
///
/// Intended for tests, replays, and embedding. Entities are kept in a
/// `BTreeMap` behind a `RwLock`, so iteration order is deterministic.
pub struct InMemoryEntityStore {
    entities: RwLock<BTreeMap<(EntityKind, String), serde_json::Value>>,
}

/// Serializable dump of a store: kind name -> id -> entity body.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    pub entities: BTreeMap<String, BTreeMap<String, serde_json::Value>>,
}

impl InMemoryEntityStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            entities: RwLock::new(BTreeMap::new()),
        }
    }

    /// Number of entities across all kinds.
    pub fn len(&self) -> usize {
        self.entities.read().expect("lock poisoned").len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.entities.read().expect("lock poisoned").is_empty()
    }

    /// Number of entities of one kind.
    pub fn count(&self, kind: EntityKind) -> usize {
        self.entities
            .read()
            .expect("lock poisoned")
            .keys()
            .filter(|(k, _)| *k == kind)
            .count()
    }

    /// Sorted keys of every entity of one kind.
    pub fn ids(&self, kind: EntityKind) -> Vec<String> {
        self.entities
            .read()
            .expect("lock poisoned")
            .keys()
            .filter(|(k, _)| *k == kind)
            .map(|(_, id)| id.clone())
            .collect()
    }

    /// Decode every entity of type `E`, in key order.
    pub fn all<E: Entity>(&self) -> StoreResult<Vec<E>> {
        let map = self.entities.read().expect("lock poisoned");
        map.iter()
            .filter(|((kind, _), _)| *kind == E::KIND)
            .map(|((kind, id), data)| {
                E::from_stored(&StoredEntity::new(*kind, id.clone(), data.clone()))
            })
            .collect()
    }

    /// Remove everything.
    pub fn clear(&self) {
        self.entities.write().expect("lock poisoned").clear();
    }

    /// Copy the store contents into a serializable snapshot.
    pub fn snapshot(&self) -> StoreSnapshot {
        let map = self.entities.read().expect("lock poisoned");
        let mut snapshot = StoreSnapshot::default();
        for ((kind, id), data) in map.iter() {
            snapshot
                .entities
                .entry(kind.as_str().to_string())
                .or_default()
                .insert(id.clone(), data.clone());
        }
        snapshot
    }

    /// Rebuild a store from a snapshot.
    pub fn from_snapshot(snapshot: StoreSnapshot) -> StoreResult<Self> {
        let mut map = BTreeMap::new();
        for (kind_name, entities) in snapshot.entities {
            let kind: EntityKind = kind_name
                .parse()
                .map_err(|_| StoreError::UnknownKind(kind_name.clone()))?;
            for (id, data) in entities {
                map.insert((kind, id), data);
            }
        }
        Ok(Self {
            entities: RwLock::new(map),
        })
    }

    /// Write the snapshot as pretty-printed JSON.
    pub fn save_snapshot(&self, path: &Path) -> StoreResult<()> {
        let json = serde_json::to_vec_pretty(&self.snapshot())?;
        std::fs::write(path, json)?;
        debug!(path = %path.display(), entities = self.len(), "store snapshot written");
        Ok(())
    }

    /// Load a store from a JSON snapshot file.
    pub fn load_snapshot(path: &Path) -> StoreResult<Self> {
        let bytes = std::fs::read(path)?;
        let snapshot: StoreSnapshot = serde_json::from_slice(&bytes)?;
        Self::from_snapshot(snapshot)
    }
}

impl Default for InMemoryEntityStore {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityStore for InMemoryEntityStore {
    fn read(&self, kind: EntityKind, id: &str) -> StoreResult<Option<StoredEntity>> {
        let map = self.entities.read().expect("lock poisoned");
        Ok(map
            .get(&(kind, id.to_string()))
            .map(|data| StoredEntity::new(kind, id, data.clone())))
    }

    fn write(&self, entity: StoredEntity) -> StoreResult<()> {
        if entity.id.is_empty() {
            return Err(StoreError::EmptyId(entity.kind));
        }
        let mut map = self.entities.write().expect("lock poisoned");
        map.insert((entity.kind, entity.id), entity.data);
        Ok(())
    }

    fn delete(&self, kind: EntityKind, id: &str) -> StoreResult<bool> {
        let mut map = self.entities.write().expect("lock poisoned");
        Ok(map.remove(&(kind, id.to_string())).is_some())
    }
}

impl std::fmt::Debug for InMemoryEntityStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryEntityStore")
            .field("entity_count", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::DefaultEntity;
    use crate::model::{Directory, LegalEntity, OrganizationAddress};
    use crate::traits::EntityRepository;

    fn legal(id: &str, name: &str) -> LegalEntity {
        let mut entity = LegalEntity::with_id(id);
        entity.legal_name = Some(name.to_string());
        entity
    }

    #[test]
    fn write_and_read_back() {
        let store = InMemoryEntityStore::new();
        store.upsert(&legal("did:a", "Acme")).unwrap();
        let loaded: LegalEntity = store.load("did:a").unwrap().expect("should exist");
        assert_eq!(loaded.legal_name.as_deref(), Some("Acme"));
    }

    #[test]
    fn upsert_replaces() {
        let store = InMemoryEntityStore::new();
        store.upsert(&legal("did:a", "Old")).unwrap();
        store.upsert(&legal("did:a", "New")).unwrap();
        assert_eq!(store.len(), 1);
        let loaded: LegalEntity = store.load("did:a").unwrap().unwrap();
        assert_eq!(loaded.legal_name.as_deref(), Some("New"));
    }

    #[test]
    fn write_rejects_empty_id() {
        let store = InMemoryEntityStore::new();
        let err = store
            .write(StoredEntity::new(
                EntityKind::Directory,
                "",
                serde_json::Value::Null,
            ))
            .unwrap_err();
        assert!(matches!(err, StoreError::EmptyId(EntityKind::Directory)));
    }

    #[test]
    fn count_and_ids_are_per_kind() {
        let store = InMemoryEntityStore::new();
        store.upsert(&legal("did:b", "B")).unwrap();
        store.upsert(&legal("did:a", "A")).unwrap();
        store.upsert(&Directory::with_id("0xdir")).unwrap();

        assert_eq!(store.count(EntityKind::LegalEntity), 2);
        assert_eq!(store.count(EntityKind::Directory), 1);
        assert_eq!(store.ids(EntityKind::LegalEntity), vec!["did:a", "did:b"]);
    }

    #[test]
    fn all_decodes_in_key_order() {
        let store = InMemoryEntityStore::new();
        store.upsert(&legal("did:2", "Two")).unwrap();
        store.upsert(&legal("did:1", "One")).unwrap();
        store
            .upsert(&OrganizationAddress::with_id("did:1"))
            .unwrap();

        let all: Vec<LegalEntity> = store.all().unwrap();
        let names: Vec<_> = all.iter().filter_map(|e| e.legal_name.as_deref()).collect();
        assert_eq!(names, vec!["One", "Two"]);
    }

    #[test]
    fn snapshot_roundtrip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graph.json");

        let store = InMemoryEntityStore::new();
        store.upsert(&legal("did:a", "Acme")).unwrap();
        store.upsert(&Directory::with_id("0xdir")).unwrap();
        store.save_snapshot(&path).unwrap();

        let restored = InMemoryEntityStore::load_snapshot(&path).unwrap();
        assert_eq!(restored.snapshot(), store.snapshot());
        assert_eq!(restored.len(), 2);
    }

    #[test]
    fn snapshot_with_unknown_kind_is_rejected() {
        let mut snapshot = StoreSnapshot::default();
        snapshot
            .entities
            .entry("Segment".into())
            .or_default()
            .insert("x".into(), serde_json::Value::Null);
        assert!(matches!(
            InMemoryEntityStore::from_snapshot(snapshot),
            Err(StoreError::UnknownKind(kind)) if kind == "Segment"
        ));
    }

    #[test]
    fn clear_removes_all() {
        let store = InMemoryEntityStore::new();
        store.upsert(&legal("did:a", "A")).unwrap();
        store.clear();
        assert!(store.is_empty());
    }

    #[test]
    fn debug_format() {
        let store = InMemoryEntityStore::new();
        let debug = format!("{store:?}");
        assert!(debug.contains("InMemoryEntityStore"));
        assert!(debug.contains("entity_count"));
    }
}
