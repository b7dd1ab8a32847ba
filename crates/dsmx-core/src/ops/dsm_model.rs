use std::collections::{HashMap, HashSet};

use dsmx_core_types::{ElementId, RelationId};

use crate::errors::{DsmError, Result};
use crate::model::MetaData;
use crate::ops::element_store::ElementStore;
use crate::ops::relation_store::{AddedRelation, RelationStore};

/// What `DsmModel::remove_element` took out of the model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovedSubtree {
    pub parent: ElementId,
    pub index: usize,
    /// Removed element ids in pre-order
    pub elements: Vec<ElementId>,
    /// Relations tombstoned because an endpoint was removed, by id
    pub relations: Vec<RelationId>,
}

/// Elements, relations and metadata of one DSM
///
/// `DsmModel` keeps a cache of resolved weights for every ordered pair of
/// distinct elements that has a non-zero one. Every mutation that can change
/// a resolved weight goes through this type so the cache stays exact.
#[derive(Debug, Clone, Default)]
pub struct DsmModel {
    pub(crate) elements: ElementStore,
    pub(crate) relations: RelationStore,
    pub(crate) meta_data: MetaData,
    pub(crate) resolved: HashMap<(ElementId, ElementId), u64>,
}

impl DsmModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn elements(&self) -> &ElementStore {
        &self.elements
    }

    pub fn relations(&self) -> &RelationStore {
        &self.relations
    }

    pub fn meta_data(&self) -> &MetaData {
        &self.meta_data
    }

    pub fn meta_data_mut(&mut self) -> &mut MetaData {
        &mut self.meta_data
    }

    /// Drop everything and start again with a bare root
    pub fn clear(&mut self) {
        *self = Self::new();
    }

    // ===== Resolved weight cache =====

    fn apply_contribution(&mut self, consumer: ElementId, provider: ElementId, weight: u64, add: bool) {
        if weight == 0 {
            return;
        }
        let consumers = self.elements.ancestors_inclusive(consumer);
        let providers = self.elements.ancestors_inclusive(provider);
        for &a in &consumers {
            for &b in &providers {
                if a == b {
                    continue;
                }
                if add {
                    *self.resolved.entry((a, b)).or_insert(0) += weight;
                } else if let Some(total) = self.resolved.get_mut(&(a, b)) {
                    *total = total.saturating_sub(weight);
                    if *total == 0 {
                        self.resolved.remove(&(a, b));
                    }
                }
            }
        }
    }

    fn apply_relation(&mut self, id: RelationId, add: bool) -> Result<()> {
        let relation = self.relations.get(id)?;
        let (consumer, provider, weight) = (relation.consumer, relation.provider, relation.weight);
        self.apply_contribution(consumer, provider, u64::from(weight), add);
        Ok(())
    }

    /// Live relations with at least one endpoint in `ids`, by id
    fn relations_touching(&self, ids: &HashSet<ElementId>) -> Vec<RelationId> {
        self.relations
            .live()
            .into_iter()
            .filter(|r| ids.contains(&r.consumer) || ids.contains(&r.provider))
            .map(|r| r.id)
            .collect()
    }

    /// Summed weight of all relations from `consumer`'s subtree into
    /// `provider`'s subtree; zero when both are the same element
    pub fn dependency_weight(&self, consumer: ElementId, provider: ElementId) -> u64 {
        if consumer == provider {
            return 0;
        }
        self.resolved.get(&(consumer, provider)).copied().unwrap_or(0)
    }

    /// Summed weight of the relations from exactly `consumer` to exactly
    /// `provider`
    pub fn direct_dependency_weight(&self, consumer: ElementId, provider: ElementId) -> u64 {
        self.relations
            .find(consumer, provider)
            .iter()
            .map(|r| u64::from(r.weight))
            .sum()
    }

    // ===== Element mutations =====

    /// Import-style element creation, see `ElementStore::create`
    ///
    /// # Errors
    ///
    /// Propagates the store's name and existence errors.
    pub fn create_element(
        &mut self,
        full_name: &str,
        name_part: &str,
        element_type: &str,
        parent: Option<ElementId>,
        annotation: Option<&str>,
    ) -> Result<ElementId> {
        self.elements
            .create(full_name, name_part, element_type, parent, annotation)
    }

    /// Create one new child element
    ///
    /// # Errors
    ///
    /// Propagates the store's name and existence errors.
    pub fn add_child_element(
        &mut self,
        parent: ElementId,
        name: &str,
        element_type: &str,
        annotation: Option<&str>,
        index: Option<usize>,
    ) -> Result<ElementId> {
        self.elements
            .add_child(parent, name, element_type, annotation, index)
    }

    /// Remove an element, its descendants and every relation touching them
    ///
    /// # Errors
    ///
    /// Fails for the root and for elements that are not live; nothing changes
    /// in that case.
    pub fn remove_element(&mut self, id: ElementId) -> Result<RemovedSubtree> {
        let element = self.elements.get(id)?;
        if element.is_root() {
            return Err(DsmError::CannotDelete {
                element_id: id,
                reason: "the root element cannot be deleted".to_string(),
            });
        }
        let subtree: HashSet<ElementId> = self.elements.subtree(id).into_iter().collect();
        let relation_ids = self.relations_touching(&subtree);
        for &rid in &relation_ids {
            self.apply_relation(rid, false)?;
            self.relations.remove(rid)?;
        }
        let removed = self.elements.remove(id)?;
        Ok(RemovedSubtree {
            parent: removed.parent,
            index: removed.index,
            elements: removed.removed,
            relations: relation_ids,
        })
    }

    /// Undo `remove_element`: put the subtree back and revive `relations`
    ///
    /// # Errors
    ///
    /// Fails if the element is not deleted, the parent is not live, or a
    /// relation cannot be revived.
    pub fn restore_element(
        &mut self,
        id: ElementId,
        parent: ElementId,
        index: usize,
        relations: &[RelationId],
    ) -> Result<()> {
        self.elements.restore(id, parent, index)?;
        for &rid in relations {
            self.restore_relation(rid)?;
        }
        Ok(())
    }

    /// Move an element below a new parent, keeping resolved weights exact
    ///
    /// # Errors
    ///
    /// See `ElementStore::change_parent`; the model is unchanged on error.
    pub fn change_element_parent(
        &mut self,
        id: ElementId,
        new_parent: ElementId,
        index: usize,
    ) -> Result<()> {
        let subtree: HashSet<ElementId> = self.elements.subtree(id).into_iter().collect();
        let touching = self.relations_touching(&subtree);
        for &rid in &touching {
            self.apply_relation(rid, false)?;
        }
        let moved = self.elements.change_parent(id, new_parent, index);
        for &rid in &touching {
            self.apply_relation(rid, true)?;
        }
        moved
    }

    /// # Errors
    ///
    /// See `ElementStore::rename`.
    pub fn rename_element(&mut self, id: ElementId, name: &str) -> Result<String> {
        self.elements.rename(id, name)
    }

    /// # Errors
    ///
    /// Fails if the element is not live.
    pub fn change_element_type(&mut self, id: ElementId, element_type: &str) -> Result<String> {
        self.elements.change_type(id, element_type)
    }

    /// # Errors
    ///
    /// Fails if the element is not live.
    pub fn change_element_annotation(
        &mut self,
        id: ElementId,
        annotation: Option<&str>,
    ) -> Result<Option<String>> {
        self.elements.change_annotation(id, annotation)
    }

    /// # Errors
    ///
    /// Returns `IllegalMove` for the first child or the root.
    pub fn move_element_up(&mut self, id: ElementId) -> Result<()> {
        self.elements.move_up(id)
    }

    /// # Errors
    ///
    /// Returns `IllegalMove` for the last child or the root.
    pub fn move_element_down(&mut self, id: ElementId) -> Result<()> {
        self.elements.move_down(id)
    }

    /// # Errors
    ///
    /// Returns `InvalidSortOrder` unless `order` permutes the children.
    pub fn reorder_children(&mut self, parent: ElementId, order: &[usize]) -> Result<()> {
        self.elements.reorder_children(parent, order)
    }

    pub fn assign_element_order(&mut self) {
        self.elements.assign_element_order();
    }

    /// Presentation state only; not part of the digest
    ///
    /// # Errors
    ///
    /// Fails if the element is not live.
    pub fn set_element_expanded(&mut self, id: ElementId, expanded: bool) -> Result<()> {
        self.elements.set_expanded(id, expanded)
    }

    // ===== Relation mutations =====

    /// Add a relation between two live elements
    ///
    /// Returns `None` for self relations, which are dropped.
    ///
    /// # Errors
    ///
    /// Returns `ElementNotFound` / `ElementDeleted` if an endpoint is not live
    /// and `WeightOverflow` if a merge would exceed `u32::MAX`. Nothing
    /// changes in either case.
    pub fn add_relation(
        &mut self,
        consumer: ElementId,
        provider: ElementId,
        relation_type: &str,
        weight: u32,
        annotation: Option<&str>,
    ) -> Result<Option<AddedRelation>> {
        if consumer == provider {
            return Ok(None);
        }
        self.elements.get(consumer)?;
        self.elements.get(provider)?;
        let added = self
            .relations
            .add(consumer, provider, relation_type, weight, annotation)?;
        self.apply_contribution(consumer, provider, u64::from(weight), true);
        Ok(Some(added))
    }

    /// Tombstone a relation
    ///
    /// # Errors
    ///
    /// Returns `RelationNotFound` / `RelationDeleted`.
    pub fn remove_relation(&mut self, id: RelationId) -> Result<()> {
        self.apply_relation(id, false)?;
        self.relations.remove(id)?;
        Ok(())
    }

    /// Revive a tombstoned relation under its original id
    ///
    /// # Errors
    ///
    /// Fails if an endpoint is not live or the key is taken.
    pub fn restore_relation(&mut self, id: RelationId) -> Result<()> {
        let relation = self
            .relations
            .get_raw(id)
            .ok_or(DsmError::RelationNotFound { relation_id: id })?;
        self.elements.get(relation.consumer)?;
        self.elements.get(relation.provider)?;
        self.relations.restore(id)?;
        self.apply_relation(id, true)
    }

    /// Replace a relation's weight, returning the previous one
    ///
    /// # Errors
    ///
    /// Returns `RelationNotFound` / `RelationDeleted`.
    pub fn change_relation_weight(&mut self, id: RelationId, weight: u32) -> Result<u32> {
        self.apply_relation(id, false)?;
        let old = self.relations.set_weight(id, weight)?;
        self.apply_relation(id, true)?;
        Ok(old)
    }

    /// # Errors
    ///
    /// Returns `DuplicateRelation` if another live relation has the new key.
    pub fn change_relation_type(&mut self, id: RelationId, relation_type: &str) -> Result<String> {
        self.relations.set_type(id, relation_type)
    }

    /// Set a relation's annotation, returning the previous one
    ///
    /// # Errors
    ///
    /// Returns `RelationNotFound` / `RelationDeleted`.
    pub fn change_relation_annotation(
        &mut self,
        id: RelationId,
        annotation: Option<&str>,
    ) -> Result<Option<String>> {
        self.relations.set_annotation(id, annotation)
    }

    /// Rebuild the resolved weight cache from scratch
    ///
    /// Returns true if the rebuilt cache differs from the incremental one.
    pub fn rebuild_resolved_weights(&mut self) -> bool {
        let before = std::mem::take(&mut self.resolved);
        let live: Vec<(ElementId, ElementId, u32)> = self
            .relations
            .live()
            .into_iter()
            .map(|r| (r.consumer, r.provider, r.weight))
            .collect();
        for (consumer, provider, weight) in live {
            self.apply_contribution(consumer, provider, u64::from(weight), true);
        }
        before != self.resolved
    }
}
