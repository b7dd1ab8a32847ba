use std::collections::{HashMap, HashSet};

use dsmx_core_types::ElementId;

use crate::errors::{DsmError, Result};
use crate::model::{name, Element};

/// What `ElementStore::remove` took out of the tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovedElement {
    /// Parent the element was detached from
    pub parent: ElementId,
    /// Index it occupied in the parent's child list
    pub index: usize,
    /// The element and all of its descendants, pre-order
    pub removed: Vec<ElementId>,
}

/// Arena of elements addressed by id
///
/// The store always holds exactly one root (id 0, empty name). Deleted
/// elements stay in the arena with `deleted = true` so that their ids are
/// never reallocated and undo can bring them back unchanged.
#[derive(Debug, Clone)]
pub struct ElementStore {
    elements: HashMap<ElementId, Element>,
    next_id: u32,
}

impl Default for ElementStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ElementStore {
    /// Create a store holding only the root element
    pub fn new() -> Self {
        let mut root = Element::new(ElementId::ROOT, String::new(), String::new(), None, None);
        root.expanded = true;
        let mut elements = HashMap::new();
        elements.insert(ElementId::ROOT, root);
        Self {
            elements,
            next_id: 1,
        }
    }

    pub fn root_id(&self) -> ElementId {
        ElementId::ROOT
    }

    pub fn root(&self) -> &Element {
        // The root is inserted by `new` and can never be removed.
        &self.elements[&ElementId::ROOT]
    }

    /// Get a live element
    ///
    /// # Errors
    ///
    /// Returns `ElementNotFound` for unknown ids and `ElementDeleted` for
    /// tombstoned ones.
    pub fn get(&self, id: ElementId) -> Result<&Element> {
        let element = self
            .elements
            .get(&id)
            .ok_or(DsmError::ElementNotFound { element_id: id })?;
        if element.deleted {
            return Err(DsmError::ElementDeleted { element_id: id });
        }
        Ok(element)
    }

    fn get_mut(&mut self, id: ElementId) -> Result<&mut Element> {
        let element = self
            .elements
            .get_mut(&id)
            .ok_or(DsmError::ElementNotFound { element_id: id })?;
        if element.deleted {
            return Err(DsmError::ElementDeleted { element_id: id });
        }
        Ok(element)
    }

    /// Get an element whether or not it is deleted
    pub fn get_raw(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(&id)
    }

    /// True for live elements
    pub fn contains(&self, id: ElementId) -> bool {
        self.elements.get(&id).is_some_and(|e| !e.deleted)
    }

    /// True for live and deleted elements
    pub fn knows(&self, id: ElementId) -> bool {
        self.elements.contains_key(&id)
    }

    /// Number of live elements, root included
    pub fn len(&self) -> usize {
        self.elements.values().filter(|e| !e.deleted).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() <= 1
    }

    /// All live elements, in no particular order
    pub fn list(&self) -> Vec<&Element> {
        self.elements.values().filter(|e| !e.deleted).collect()
    }

    /// Children of a live element in display order
    ///
    /// # Errors
    ///
    /// Fails if the element is unknown or deleted.
    pub fn children(&self, id: ElementId) -> Result<&[ElementId]> {
        Ok(self.get(id)?.children.as_slice())
    }

    /// Dot-joined names from below the root down to `id`
    ///
    /// # Errors
    ///
    /// Fails if the element is unknown or deleted.
    pub fn full_name(&self, id: ElementId) -> Result<String> {
        self.get(id)?;
        let mut parts = Vec::new();
        let mut current = Some(id);
        while let Some(cid) = current {
            let element = self
                .elements
                .get(&cid)
                .ok_or(DsmError::ElementNotFound { element_id: cid })?;
            if element.parent.is_some() {
                parts.push(element.name.as_str());
            }
            current = element.parent;
        }
        parts.reverse();
        Ok(parts.join(&name::SEPARATOR.to_string()))
    }

    /// Live child of `parent` called `name`
    pub fn find_child_by_name(&self, parent: ElementId, name: &str) -> Option<ElementId> {
        let parent = self.get(parent).ok()?;
        parent
            .children
            .iter()
            .copied()
            .find(|c| self.elements.get(c).is_some_and(|e| e.name == name))
    }

    /// Look up a live element by full name; the empty name is the root
    pub fn find_by_full_name(&self, full_name: &str) -> Option<ElementId> {
        let segments = name::split_full_name(full_name).ok()?;
        let mut current = ElementId::ROOT;
        for segment in segments {
            current = self.find_child_by_name(current, segment)?;
        }
        Some(current)
    }

    fn allocate_id(&mut self) -> ElementId {
        let id = ElementId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Import-style creation along a dotted path
    ///
    /// `full_name` is split into segments relative to `parent` (the root when
    /// `None`). Missing intermediate segments become untyped container
    /// elements; only the terminal element receives `element_type` and
    /// `annotation`. Importing an existing path returns the existing element;
    /// a container created earlier picks up the type and annotation when it is
    /// later imported as a terminal.
    ///
    /// # Errors
    ///
    /// * `InvalidName` - `full_name` is not below `parent`, has an empty
    ///   segment, or its last segment differs from a non-empty `name_part`
    /// * `ElementNotFound` / `ElementDeleted` - `parent` is not live
    pub fn create(
        &mut self,
        full_name: &str,
        name_part: &str,
        element_type: &str,
        parent: Option<ElementId>,
        annotation: Option<&str>,
    ) -> Result<ElementId> {
        let parent_id = parent.unwrap_or(ElementId::ROOT);
        let parent_full_name = self.full_name(parent_id)?;
        let relative = name::relative_to(full_name, &parent_full_name).ok_or_else(|| {
            DsmError::InvalidName {
                name: full_name.to_string(),
                reason: format!("not below parent '{}'", parent_full_name),
            }
        })?;
        let segments = name::split_full_name(relative)?;
        let Some(terminal) = segments.last() else {
            return Err(DsmError::InvalidName {
                name: full_name.to_string(),
                reason: "full name has no segment below its parent".to_string(),
            });
        };
        if !name_part.is_empty() && *terminal != name_part {
            return Err(DsmError::InvalidName {
                name: full_name.to_string(),
                reason: format!("name part '{}' does not end the full name", name_part),
            });
        }

        let last = segments.len() - 1;
        let mut current = parent_id;
        for (i, segment) in segments.iter().enumerate() {
            let is_terminal = i == last;
            current = match self.find_child_by_name(current, segment) {
                Some(existing) => {
                    if is_terminal {
                        let element = self.get_mut(existing)?;
                        if element.element_type.is_empty() && !element_type.is_empty() {
                            element.element_type = element_type.to_string();
                        }
                        if element.annotation.is_none() {
                            element.annotation = annotation.map(str::to_string);
                        }
                    }
                    existing
                }
                None => {
                    let (ty, ann) = if is_terminal {
                        (element_type.to_string(), annotation.map(str::to_string))
                    } else {
                        (String::new(), None)
                    };
                    self.insert_child(current, segment.to_string(), ty, ann, None)?
                }
            };
        }
        Ok(current)
    }

    /// Create a single child below `parent`
    ///
    /// Appends when `index` is `None` or past the end.
    ///
    /// # Errors
    ///
    /// * `InvalidName` - name is empty or contains a dot
    /// * `DuplicateName` - a live sibling already has this name
    /// * `ElementNotFound` / `ElementDeleted` - `parent` is not live
    pub fn add_child(
        &mut self,
        parent: ElementId,
        name: &str,
        element_type: &str,
        annotation: Option<&str>,
        index: Option<usize>,
    ) -> Result<ElementId> {
        name::validate_name_part(name)?;
        self.get(parent)?;
        if self.find_child_by_name(parent, name).is_some() {
            return Err(DsmError::DuplicateName {
                parent_id: parent,
                name: name.to_string(),
            });
        }
        self.insert_child(
            parent,
            name.to_string(),
            element_type.to_string(),
            annotation.map(str::to_string),
            index,
        )
    }

    fn insert_child(
        &mut self,
        parent: ElementId,
        name: String,
        element_type: String,
        annotation: Option<String>,
        index: Option<usize>,
    ) -> Result<ElementId> {
        self.get(parent)?;
        let id = self.allocate_id();
        self.elements.insert(
            id,
            Element::new(id, name, element_type, annotation, Some(parent)),
        );
        let parent = self.get_mut(parent)?;
        let at = index
            .unwrap_or(parent.children.len())
            .min(parent.children.len());
        parent.children.insert(at, id);
        Ok(id)
    }

    /// `id` followed by its ancestors up to the root
    pub fn ancestors_inclusive(&self, id: ElementId) -> Vec<ElementId> {
        let mut chain = Vec::new();
        let mut current = Some(id);
        while let Some(cid) = current {
            chain.push(cid);
            current = self.elements.get(&cid).and_then(|e| e.parent);
        }
        chain
    }

    /// True if `id` equals `subtree_root` or lies below it
    pub fn is_in_subtree(&self, subtree_root: ElementId, id: ElementId) -> bool {
        let mut current = Some(id);
        while let Some(cid) = current {
            if cid == subtree_root {
                return true;
            }
            current = self.elements.get(&cid).and_then(|e| e.parent);
        }
        false
    }

    /// Deepest element containing both `a` and `b` in its subtree
    pub fn lowest_common_ancestor(&self, a: ElementId, b: ElementId) -> Option<ElementId> {
        let above_a: HashSet<ElementId> = self.ancestors_inclusive(a).into_iter().collect();
        self.ancestors_inclusive(b)
            .into_iter()
            .find(|id| above_a.contains(id))
    }

    /// `id` and its descendants in pre-order, following child lists
    ///
    /// Works for deleted subtrees too, which keep their child lists.
    pub fn subtree(&self, id: ElementId) -> Vec<ElementId> {
        let mut result = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(element) = self.elements.get(&current) else {
                continue;
            };
            result.push(current);
            stack.extend(element.children.iter().rev().copied());
        }
        result
    }

    /// Move `id` below `new_parent` at `index` (clamped to the child count)
    ///
    /// The element is first detached from its current parent, so for a move
    /// within the same parent `index` refers to the list without it.
    ///
    /// # Errors
    ///
    /// * `IllegalReparent` - `id` is the root
    /// * `CycleDetected` - `new_parent` is `id` or one of its descendants
    /// * `DuplicateName` - another child of `new_parent` has the same name
    /// * `ElementNotFound` / `ElementDeleted` - either element is not live
    pub fn change_parent(
        &mut self,
        id: ElementId,
        new_parent: ElementId,
        index: usize,
    ) -> Result<()> {
        let element = self.get(id)?;
        let Some(old_parent) = element.parent else {
            return Err(DsmError::IllegalReparent {
                element_id: id,
                reason: "the root element cannot be moved".to_string(),
            });
        };
        self.get(new_parent)?;
        if self.is_in_subtree(id, new_parent) {
            return Err(DsmError::CycleDetected {
                element_id: id,
                new_parent_id: new_parent,
            });
        }
        if let Some(other) = self.find_child_by_name(new_parent, &element.name) {
            if other != id {
                return Err(DsmError::DuplicateName {
                    parent_id: new_parent,
                    name: element.name.clone(),
                });
            }
        }

        self.get_mut(old_parent)?.children.retain(|c| *c != id);
        let parent = self.get_mut(new_parent)?;
        let at = index.min(parent.children.len());
        parent.children.insert(at, id);
        self.get_mut(id)?.parent = Some(new_parent);
        Ok(())
    }

    /// Detach `id` from its parent and tombstone its whole subtree
    ///
    /// # Errors
    ///
    /// * `CannotDelete` - `id` is the root
    /// * `ElementNotFound` / `ElementDeleted` - `id` is not live
    pub fn remove(&mut self, id: ElementId) -> Result<RemovedElement> {
        let element = self.get(id)?;
        let Some(parent) = element.parent else {
            return Err(DsmError::CannotDelete {
                element_id: id,
                reason: "the root element cannot be deleted".to_string(),
            });
        };
        let index = self
            .get(parent)?
            .index_of_child(id)
            .ok_or_else(|| DsmError::Internal {
                message: format!("element {} missing from child list of {}", id, parent),
            })?;

        let removed = self.subtree(id);
        self.get_mut(parent)?.children.remove(index);
        for rid in &removed {
            if let Some(e) = self.elements.get_mut(rid) {
                e.deleted = true;
            }
        }
        Ok(RemovedElement {
            parent,
            index,
            removed,
        })
    }

    /// Bring a tombstoned subtree back below `parent` at `index`
    ///
    /// Returns the restored ids in pre-order.
    ///
    /// # Errors
    ///
    /// * `ElementNotFound` - `id` was never allocated
    /// * `Internal` - `id` is not deleted
    /// * `DuplicateName` - a live child of `parent` took the name meanwhile
    pub fn restore(
        &mut self,
        id: ElementId,
        parent: ElementId,
        index: usize,
    ) -> Result<Vec<ElementId>> {
        let element = self
            .elements
            .get(&id)
            .ok_or(DsmError::ElementNotFound { element_id: id })?;
        if !element.deleted {
            return Err(DsmError::Internal {
                message: format!("element {} is not deleted", id),
            });
        }
        if self.find_child_by_name(parent, &element.name).is_some() {
            return Err(DsmError::DuplicateName {
                parent_id: parent,
                name: element.name.clone(),
            });
        }
        self.get(parent)?;

        let restored = self.subtree(id);
        for rid in &restored {
            if let Some(e) = self.elements.get_mut(rid) {
                e.deleted = false;
            }
        }
        if let Some(e) = self.elements.get_mut(&id) {
            e.parent = Some(parent);
        }
        let parent = self.get_mut(parent)?;
        let at = index.min(parent.children.len());
        parent.children.insert(at, id);
        Ok(restored)
    }

    /// Rename a live element, returning the previous name
    ///
    /// # Errors
    ///
    /// * `InvalidName` - bad name, or `id` is the root
    /// * `DuplicateName` - a sibling already has the name
    pub fn rename(&mut self, id: ElementId, new_name: &str) -> Result<String> {
        name::validate_name_part(new_name)?;
        let element = self.get(id)?;
        let Some(parent) = element.parent else {
            return Err(DsmError::InvalidName {
                name: new_name.to_string(),
                reason: "the root element cannot be renamed".to_string(),
            });
        };
        if let Some(other) = self.find_child_by_name(parent, new_name) {
            if other != id {
                return Err(DsmError::DuplicateName {
                    parent_id: parent,
                    name: new_name.to_string(),
                });
            }
        }
        let element = self.get_mut(id)?;
        Ok(std::mem::replace(&mut element.name, new_name.to_string()))
    }

    /// Change the type tag, returning the previous one
    ///
    /// # Errors
    ///
    /// Fails if the element is unknown or deleted.
    pub fn change_type(&mut self, id: ElementId, element_type: &str) -> Result<String> {
        let element = self.get_mut(id)?;
        Ok(std::mem::replace(
            &mut element.element_type,
            element_type.to_string(),
        ))
    }

    /// Change the annotation, returning the previous one
    ///
    /// # Errors
    ///
    /// Fails if the element is unknown or deleted.
    pub fn change_annotation(
        &mut self,
        id: ElementId,
        annotation: Option<&str>,
    ) -> Result<Option<String>> {
        let element = self.get_mut(id)?;
        Ok(std::mem::replace(
            &mut element.annotation,
            annotation.map(str::to_string),
        ))
    }

    /// # Errors
    ///
    /// Fails if the element is unknown or deleted.
    pub fn set_expanded(&mut self, id: ElementId, expanded: bool) -> Result<()> {
        self.get_mut(id)?.expanded = expanded;
        Ok(())
    }

    /// Rearrange the children of `parent`
    ///
    /// `order[new_position] = old_position`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidSortOrder` unless `order` is a permutation of the
    /// child positions.
    pub fn reorder_children(&mut self, parent: ElementId, order: &[usize]) -> Result<()> {
        let element = self.get(parent)?;
        let count = element.children.len();
        if order.len() != count {
            return Err(DsmError::InvalidSortOrder {
                element_id: parent,
                reason: format!("expected {} positions, got {}", count, order.len()),
            });
        }
        let mut seen = vec![false; count];
        for &old in order {
            if old >= count || std::mem::replace(&mut seen[old], true) {
                return Err(DsmError::InvalidSortOrder {
                    element_id: parent,
                    reason: format!("position {} is out of range or repeated", old),
                });
            }
        }
        let reordered: Vec<ElementId> = order.iter().map(|&old| element.children[old]).collect();
        self.get_mut(parent)?.children = reordered;
        Ok(())
    }

    /// Swap `id` with its previous sibling
    ///
    /// # Errors
    ///
    /// Returns `IllegalMove` if `id` is the root or already the first child.
    pub fn move_up(&mut self, id: ElementId) -> Result<()> {
        let (parent, index) = self.position(id)?;
        if index == 0 {
            return Err(DsmError::IllegalMove {
                element_id: id,
                reason: "already the first child".to_string(),
            });
        }
        self.get_mut(parent)?.children.swap(index - 1, index);
        Ok(())
    }

    /// Swap `id` with its next sibling
    ///
    /// # Errors
    ///
    /// Returns `IllegalMove` if `id` is the root or already the last child.
    pub fn move_down(&mut self, id: ElementId) -> Result<()> {
        let (parent, index) = self.position(id)?;
        if index + 1 >= self.get(parent)?.children.len() {
            return Err(DsmError::IllegalMove {
                element_id: id,
                reason: "already the last child".to_string(),
            });
        }
        self.get_mut(parent)?.children.swap(index, index + 1);
        Ok(())
    }

    fn position(&self, id: ElementId) -> Result<(ElementId, usize)> {
        let parent = self.get(id)?.parent.ok_or_else(|| DsmError::IllegalMove {
            element_id: id,
            reason: "the root element has no siblings".to_string(),
        })?;
        let index = self
            .get(parent)?
            .index_of_child(id)
            .ok_or_else(|| DsmError::Internal {
                message: format!("element {} missing from child list of {}", id, parent),
            })?;
        Ok((parent, index))
    }

    /// Renumber all live elements depth-first, root first, as `0..N-1`
    pub fn assign_element_order(&mut self) {
        let sequence = self.subtree(ElementId::ROOT);
        for (order, id) in sequence.into_iter().enumerate() {
            if let Some(element) = self.elements.get_mut(&id) {
                element.order = order;
            }
        }
    }

    // ===== Navigation =====

    /// Position of `child` within `parent`'s children
    pub fn index_of_child(&self, parent: ElementId, child: ElementId) -> Option<usize> {
        self.get(parent).ok()?.index_of_child(child)
    }

    pub fn has_children(&self, id: ElementId) -> bool {
        self.get(id).is_ok_and(|e| e.has_children())
    }

    pub fn next_sibling(&self, id: ElementId) -> Option<ElementId> {
        let (parent, index) = self.position(id).ok()?;
        self.get(parent).ok()?.children.get(index + 1).copied()
    }

    pub fn previous_sibling(&self, id: ElementId) -> Option<ElementId> {
        let (parent, index) = self.position(id).ok()?;
        let index = index.checked_sub(1)?;
        self.get(parent).ok()?.children.get(index).copied()
    }

    pub fn is_first_child(&self, id: ElementId) -> bool {
        self.position(id).is_ok_and(|(_, index)| index == 0)
    }

    pub fn is_last_child(&self, id: ElementId) -> bool {
        self.position(id).is_ok_and(|(parent, index)| {
            self.get(parent)
                .is_ok_and(|p| index + 1 == p.children.len())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with_pkg() -> (ElementStore, ElementId, ElementId, ElementId) {
        let mut store = ElementStore::new();
        let a = store.create("Pkg.A", "A", "class", None, None).unwrap();
        let b = store.create("Pkg.B", "B", "class", None, None).unwrap();
        let pkg = store.find_by_full_name("Pkg").unwrap();
        (store, pkg, a, b)
    }

    #[test]
    fn test_new_store_has_root() {
        let store = ElementStore::new();
        assert_eq!(store.len(), 1);
        assert!(store.root().is_root());
        assert_eq!(store.full_name(ElementId::ROOT).unwrap(), "");
        assert_eq!(store.find_by_full_name(""), Some(ElementId::ROOT));
    }

    #[test]
    fn test_create_builds_intermediate_containers() {
        let (store, pkg, a, b) = store_with_pkg();
        let pkg_element = store.get(pkg).unwrap();
        assert_eq!(pkg_element.element_type, "");
        assert_eq!(pkg_element.children, vec![a, b]);
        assert_eq!(store.get(a).unwrap().element_type, "class");
        assert_eq!(store.full_name(b).unwrap(), "Pkg.B");
    }

    #[test]
    fn test_create_is_idempotent() {
        let (mut store, _, a, _) = store_with_pkg();
        let again = store.create("Pkg.A", "A", "class", None, None).unwrap();
        assert_eq!(again, a);
        assert_eq!(store.len(), 4);
    }

    #[test]
    fn test_create_relative_to_parent() {
        let (mut store, pkg, _, _) = store_with_pkg();
        let c = store
            .create("Pkg.Sub.C", "C", "struct", Some(pkg), Some("note"))
            .unwrap();
        assert_eq!(store.full_name(c).unwrap(), "Pkg.Sub.C");
        assert_eq!(store.get(c).unwrap().annotation.as_deref(), Some("note"));

        let err = store.create("Other.C", "C", "struct", Some(pkg), None);
        assert!(matches!(err, Err(DsmError::InvalidName { .. })));
    }

    #[test]
    fn test_create_fills_type_of_container() {
        let (mut store, pkg, _, _) = store_with_pkg();
        let again = store.create("Pkg", "Pkg", "namespace", None, None).unwrap();
        assert_eq!(again, pkg);
        assert_eq!(store.get(pkg).unwrap().element_type, "namespace");
    }

    #[test]
    fn test_change_parent_rejects_cycles() {
        let (mut store, pkg, a, _) = store_with_pkg();
        let result = store.change_parent(pkg, a, 0);
        assert!(matches!(result, Err(DsmError::CycleDetected { .. })));
        let result = store.change_parent(pkg, pkg, 0);
        assert!(matches!(result, Err(DsmError::CycleDetected { .. })));
        assert_eq!(store.get(a).unwrap().parent, Some(pkg));
    }

    #[test]
    fn test_change_parent_moves_to_index() {
        let (mut store, pkg, a, b) = store_with_pkg();
        store.change_parent(b, ElementId::ROOT, 0).unwrap();
        assert_eq!(store.root().children, vec![b, pkg]);
        assert_eq!(store.get(pkg).unwrap().children, vec![a]);
        assert_eq!(store.full_name(b).unwrap(), "B");
    }

    #[test]
    fn test_remove_and_restore_keep_ids() {
        let (mut store, pkg, a, b) = store_with_pkg();
        let removed = store.remove(pkg).unwrap();
        assert_eq!(removed.parent, ElementId::ROOT);
        assert_eq!(removed.index, 0);
        assert_eq!(removed.removed, vec![pkg, a, b]);
        assert!(!store.contains(a));
        assert!(store.knows(a));
        assert!(matches!(store.get(a), Err(DsmError::ElementDeleted { .. })));

        let restored = store.restore(pkg, removed.parent, removed.index).unwrap();
        assert_eq!(restored, vec![pkg, a, b]);
        assert_eq!(store.find_by_full_name("Pkg.A"), Some(a));
    }

    #[test]
    fn test_root_cannot_be_removed() {
        let mut store = ElementStore::new();
        assert!(matches!(
            store.remove(ElementId::ROOT),
            Err(DsmError::CannotDelete { .. })
        ));
    }

    #[test]
    fn test_ids_not_reused_after_remove() {
        let (mut store, _, a, _) = store_with_pkg();
        store.remove(a).unwrap();
        let c = store.create("Pkg.C", "C", "class", None, None).unwrap();
        assert_ne!(c, a);
    }

    #[test]
    fn test_assign_order_is_contiguous_preorder() {
        let (mut store, pkg, a, b) = store_with_pkg();
        let c = store.create("Lib.C", "C", "class", None, None).unwrap();
        store.assign_element_order();
        let orders: Vec<usize> = [ElementId::ROOT, pkg, a, b]
            .iter()
            .map(|id| store.get(*id).unwrap().order)
            .collect();
        assert_eq!(orders, vec![0, 1, 2, 3]);
        assert_eq!(store.get(c).unwrap().order, 5);
    }

    #[test]
    fn test_navigation() {
        let (mut store, pkg, a, b) = store_with_pkg();
        let c = store.create("Pkg.C", "C", "class", None, None).unwrap();
        assert_eq!(store.next_sibling(a), Some(b));
        assert_eq!(store.previous_sibling(a), None);
        assert_eq!(store.previous_sibling(c), Some(b));
        assert!(store.is_first_child(a));
        assert!(store.is_last_child(c));
        assert!(!store.is_last_child(b));
        assert_eq!(store.index_of_child(pkg, b), Some(1));
        assert!(store.has_children(pkg));
        assert!(!store.has_children(a));
    }

    #[test]
    fn test_move_up_and_down() {
        let (mut store, pkg, a, b) = store_with_pkg();
        store.move_up(b).unwrap();
        assert_eq!(store.get(pkg).unwrap().children, vec![b, a]);
        assert!(matches!(store.move_up(b), Err(DsmError::IllegalMove { .. })));
        store.move_down(b).unwrap();
        assert_eq!(store.get(pkg).unwrap().children, vec![a, b]);
        assert!(matches!(
            store.move_down(b),
            Err(DsmError::IllegalMove { .. })
        ));
    }

    #[test]
    fn test_reorder_children_validates_permutation() {
        let (mut store, pkg, a, b) = store_with_pkg();
        store.reorder_children(pkg, &[1, 0]).unwrap();
        assert_eq!(store.get(pkg).unwrap().children, vec![b, a]);
        assert!(store.reorder_children(pkg, &[0, 0]).is_err());
        assert!(store.reorder_children(pkg, &[0]).is_err());
    }

    #[test]
    fn test_rename_checks_siblings() {
        let (mut store, _, a, _) = store_with_pkg();
        assert!(matches!(
            store.rename(a, "B"),
            Err(DsmError::DuplicateName { .. })
        ));
        let old = store.rename(a, "A2").unwrap();
        assert_eq!(old, "A");
        assert_eq!(store.find_by_full_name("Pkg.A2"), Some(a));
    }

    #[test]
    fn test_lowest_common_ancestor() {
        let (mut store, pkg, a, b) = store_with_pkg();
        let c = store.create("Lib.C", "C", "class", None, None).unwrap();
        assert_eq!(store.lowest_common_ancestor(a, b), Some(pkg));
        assert_eq!(store.lowest_common_ancestor(a, c), Some(ElementId::ROOT));
        assert_eq!(store.lowest_common_ancestor(a, pkg), Some(pkg));
    }
}
