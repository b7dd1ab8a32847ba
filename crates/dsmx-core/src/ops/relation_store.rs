use std::collections::HashMap;

use dsmx_core_types::{ElementId, RelationId};

use crate::errors::{DsmError, Result};
use crate::model::relation::RelationKey;
use crate::model::Relation;

/// Result of `RelationStore::add`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddedRelation {
    pub id: RelationId,

    /// True when the weight was folded into an existing relation with the
    /// same (consumer, provider, type) key
    pub merged: bool,
}

/// Flat table of relations
///
/// The store knows nothing about the element hierarchy; existence checks and
/// hierarchical weight bookkeeping happen in `DsmModel`. Removed relations are
/// tombstoned so their ids can be restored.
#[derive(Debug, Clone)]
pub struct RelationStore {
    relations: HashMap<RelationId, Relation>,
    /// Live relations only
    by_key: HashMap<RelationKey, RelationId>,
    next_id: u32,
}

impl Default for RelationStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RelationStore {
    pub fn new() -> Self {
        Self {
            relations: HashMap::new(),
            by_key: HashMap::new(),
            next_id: 1,
        }
    }

    /// Get a live relation
    ///
    /// # Errors
    ///
    /// Returns `RelationNotFound` or `RelationDeleted`.
    pub fn get(&self, id: RelationId) -> Result<&Relation> {
        let relation = self
            .relations
            .get(&id)
            .ok_or(DsmError::RelationNotFound { relation_id: id })?;
        if relation.deleted {
            return Err(DsmError::RelationDeleted { relation_id: id });
        }
        Ok(relation)
    }

    fn get_mut(&mut self, id: RelationId) -> Result<&mut Relation> {
        let relation = self
            .relations
            .get_mut(&id)
            .ok_or(DsmError::RelationNotFound { relation_id: id })?;
        if relation.deleted {
            return Err(DsmError::RelationDeleted { relation_id: id });
        }
        Ok(relation)
    }

    /// Get a relation whether or not it is deleted
    pub fn get_raw(&self, id: RelationId) -> Option<&Relation> {
        self.relations.get(&id)
    }

    pub fn contains(&self, id: RelationId) -> bool {
        self.relations.get(&id).is_some_and(|r| !r.deleted)
    }

    pub fn knows(&self, id: RelationId) -> bool {
        self.relations.contains_key(&id)
    }

    /// Number of live relations
    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }

    /// Live relations sorted by id
    pub fn live(&self) -> Vec<&Relation> {
        let mut result: Vec<&Relation> = self.relations.values().filter(|r| !r.deleted).collect();
        result.sort_by_key(|r| r.id);
        result
    }

    pub fn find_by_key(&self, key: &RelationKey) -> Option<&Relation> {
        self.by_key.get(key).and_then(|id| self.relations.get(id))
    }

    /// Live relations from exactly `consumer` to exactly `provider`, by id
    pub fn find(&self, consumer: ElementId, provider: ElementId) -> Vec<&Relation> {
        let mut result: Vec<&Relation> = self
            .relations
            .values()
            .filter(|r| !r.deleted && r.consumer == consumer && r.provider == provider)
            .collect();
        result.sort_by_key(|r| r.id);
        result
    }

    /// Add a relation or merge its weight into the live relation with the
    /// same key
    ///
    /// When merging, the existing annotation is kept.
    ///
    /// # Errors
    ///
    /// Returns `WeightOverflow` when the merged weight would not fit a `u32`;
    /// the store is unchanged then.
    pub fn add(
        &mut self,
        consumer: ElementId,
        provider: ElementId,
        relation_type: &str,
        weight: u32,
        annotation: Option<&str>,
    ) -> Result<AddedRelation> {
        let key = RelationKey {
            consumer,
            provider,
            relation_type: relation_type.to_string(),
        };
        if let Some(&id) = self.by_key.get(&key) {
            if let Some(existing) = self.relations.get_mut(&id) {
                existing.weight = existing
                    .weight
                    .checked_add(weight)
                    .ok_or(DsmError::WeightOverflow {
                        relation_id: id,
                        weight,
                    })?;
                return Ok(AddedRelation { id, merged: true });
            }
        }

        let id = RelationId(self.next_id);
        self.next_id += 1;
        self.relations.insert(
            id,
            Relation::new(
                id,
                consumer,
                provider,
                key.relation_type.clone(),
                weight,
                annotation.map(str::to_string),
            ),
        );
        self.by_key.insert(key, id);
        Ok(AddedRelation { id, merged: false })
    }

    /// Tombstone a live relation and return a copy of it
    ///
    /// # Errors
    ///
    /// Returns `RelationNotFound` or `RelationDeleted`.
    pub fn remove(&mut self, id: RelationId) -> Result<Relation> {
        let relation = self.get_mut(id)?;
        relation.deleted = true;
        let removed = relation.clone();
        self.by_key.remove(&removed.key());
        Ok(removed)
    }

    /// Bring a tombstoned relation back under its original id
    ///
    /// # Errors
    ///
    /// * `RelationNotFound` - the id was never allocated
    /// * `DuplicateRelation` - a live relation took over its key meanwhile
    /// * `Internal` - the relation is not deleted
    pub fn restore(&mut self, id: RelationId) -> Result<&Relation> {
        let relation = self
            .relations
            .get(&id)
            .ok_or(DsmError::RelationNotFound { relation_id: id })?;
        if !relation.deleted {
            return Err(DsmError::Internal {
                message: format!("relation {} is not deleted", id),
            });
        }
        let key = relation.key();
        if self.by_key.contains_key(&key) {
            return Err(DsmError::DuplicateRelation {
                consumer_id: key.consumer,
                provider_id: key.provider,
                relation_type: key.relation_type,
            });
        }
        self.by_key.insert(key, id);
        let relation = self
            .relations
            .get_mut(&id)
            .ok_or(DsmError::RelationNotFound { relation_id: id })?;
        relation.deleted = false;
        Ok(relation)
    }

    /// Replace the weight, returning the previous one
    ///
    /// # Errors
    ///
    /// Returns `RelationNotFound` or `RelationDeleted`.
    pub fn set_weight(&mut self, id: RelationId, weight: u32) -> Result<u32> {
        let relation = self.get_mut(id)?;
        Ok(std::mem::replace(&mut relation.weight, weight))
    }

    /// Replace the type, returning the previous one
    ///
    /// # Errors
    ///
    /// * `DuplicateRelation` - another live relation already has the new key
    /// * `RelationNotFound` / `RelationDeleted`
    pub fn set_type(&mut self, id: RelationId, relation_type: &str) -> Result<String> {
        let relation = self.get(id)?;
        let old_key = relation.key();
        let new_key = RelationKey {
            relation_type: relation_type.to_string(),
            ..old_key.clone()
        };
        if old_key == new_key {
            return Ok(old_key.relation_type);
        }
        if self.by_key.contains_key(&new_key) {
            return Err(DsmError::DuplicateRelation {
                consumer_id: new_key.consumer,
                provider_id: new_key.provider,
                relation_type: new_key.relation_type,
            });
        }
        self.by_key.remove(&old_key);
        self.by_key.insert(new_key, id);
        let relation = self.get_mut(id)?;
        Ok(std::mem::replace(
            &mut relation.relation_type,
            relation_type.to_string(),
        ))
    }

    /// # Errors
    ///
    /// Returns `RelationNotFound` or `RelationDeleted`.
    pub fn set_annotation(
        &mut self,
        id: RelationId,
        annotation: Option<&str>,
    ) -> Result<Option<String>> {
        let relation = self.get_mut(id)?;
        Ok(std::mem::replace(
            &mut relation.annotation,
            annotation.map(str::to_string),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_merges_same_key() {
        let mut store = RelationStore::new();
        let first = store.add(ElementId(1), ElementId(2), "call", 3, Some("x")).unwrap();
        let second = store.add(ElementId(1), ElementId(2), "call", 4, None).unwrap();
        assert!(!first.merged);
        assert!(second.merged);
        assert_eq!(first.id, second.id);
        assert_eq!(store.len(), 1);
        let relation = store.get(first.id).unwrap();
        assert_eq!(relation.weight, 7);
        assert_eq!(relation.annotation.as_deref(), Some("x"));
    }

    #[test]
    fn test_merge_past_u32_max_is_rejected() {
        let mut store = RelationStore::new();
        let added = store
            .add(ElementId(1), ElementId(2), "call", u32::MAX - 1, None)
            .unwrap();
        let err = store
            .add(ElementId(1), ElementId(2), "call", 5, None)
            .unwrap_err();
        assert!(matches!(err, DsmError::WeightOverflow { weight: 5, .. }));
        assert_eq!(store.get(added.id).unwrap().weight, u32::MAX - 1);

        store.add(ElementId(1), ElementId(2), "call", 1, None).unwrap();
        assert_eq!(store.get(added.id).unwrap().weight, u32::MAX);
    }

    #[test]
    fn test_different_type_is_separate_row() {
        let mut store = RelationStore::new();
        let a = store.add(ElementId(1), ElementId(2), "call", 1, None).unwrap();
        let b = store.add(ElementId(1), ElementId(2), "inherit", 1, None).unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(store.find(ElementId(1), ElementId(2)).len(), 2);
        assert!(store.find(ElementId(2), ElementId(1)).is_empty());
    }

    #[test]
    fn test_remove_then_restore_keeps_id() {
        let mut store = RelationStore::new();
        let added = store.add(ElementId(1), ElementId(2), "call", 5, None).unwrap();
        store.remove(added.id).unwrap();
        assert!(store.is_empty());
        assert!(matches!(
            store.get(added.id),
            Err(DsmError::RelationDeleted { .. })
        ));

        store.restore(added.id).unwrap();
        assert_eq!(store.get(added.id).unwrap().weight, 5);
    }

    #[test]
    fn test_add_after_remove_allocates_new_id() {
        let mut store = RelationStore::new();
        let first = store.add(ElementId(1), ElementId(2), "call", 5, None).unwrap();
        store.remove(first.id).unwrap();
        let second = store.add(ElementId(1), ElementId(2), "call", 2, None).unwrap();
        assert_ne!(first.id, second.id);
        assert!(matches!(
            store.restore(first.id),
            Err(DsmError::DuplicateRelation { .. })
        ));
    }

    #[test]
    fn test_set_type_rejects_key_collision() {
        let mut store = RelationStore::new();
        let a = store.add(ElementId(1), ElementId(2), "call", 1, None).unwrap();
        store.add(ElementId(1), ElementId(2), "inherit", 1, None).unwrap();
        assert!(store.set_type(a.id, "inherit").is_err());
        assert_eq!(store.set_type(a.id, "use").unwrap(), "call");
        let key = RelationKey {
            consumer: ElementId(1),
            provider: ElementId(2),
            relation_type: "use".to_string(),
        };
        assert_eq!(store.find_by_key(&key).map(|r| r.id), Some(a.id));
    }
}
