use std::collections::{HashMap, HashSet};

use dsmx_core_types::{ElementId, RelationId};

use crate::model::relation::RelationKey;
use crate::ops::DsmModel;

/// Live elements other than the root that have no parent
pub fn find_extra_roots(model: &DsmModel) -> Vec<ElementId> {
    let mut roots: Vec<ElementId> = model
        .elements()
        .list()
        .into_iter()
        .filter(|e| e.parent.is_none() && !e.id.is_root())
        .map(|e| e.id)
        .collect();
    roots.sort();
    roots
}

/// Live elements whose parent is unknown or deleted
///
/// Returns (element, parent) pairs.
pub fn find_orphans(model: &DsmModel) -> Vec<(ElementId, ElementId)> {
    let elements = model.elements();
    let mut orphans: Vec<(ElementId, ElementId)> = elements
        .list()
        .into_iter()
        .filter_map(|e| e.parent.map(|p| (e.id, p)))
        .filter(|(_, p)| !elements.contains(*p))
        .collect();
    orphans.sort();
    orphans
}

/// Parent links and child lists that disagree
///
/// Returns (child, parent) pairs where the child names the parent but is
/// missing from its child list, or is listed by a parent it does not name,
/// or is listed while deleted.
pub fn find_membership_mismatches(model: &DsmModel) -> Vec<(ElementId, ElementId)> {
    let elements = model.elements();
    let mut mismatches = Vec::new();

    for element in elements.list() {
        if let Some(parent) = element.parent.and_then(|p| elements.get(p).ok()) {
            if parent.index_of_child(element.id).is_none() {
                mismatches.push((element.id, parent.id));
            }
        }
        for &child in &element.children {
            let listed_correctly = elements
                .get(child)
                .is_ok_and(|c| c.parent == Some(element.id));
            if !listed_correctly {
                mismatches.push((child, element.id));
            }
        }
    }
    mismatches.sort();
    mismatches.dedup();
    mismatches
}

/// Live elements that cannot be reached from the root through child lists
pub fn find_unreachable(model: &DsmModel) -> Vec<ElementId> {
    let elements = model.elements();
    let reachable: HashSet<ElementId> = elements.subtree(elements.root_id()).into_iter().collect();
    let mut unreachable: Vec<ElementId> = elements
        .list()
        .into_iter()
        .map(|e| e.id)
        .filter(|id| !reachable.contains(id))
        .collect();
    unreachable.sort();
    unreachable
}

/// Live relations with an endpoint that is not a live element
pub fn find_dangling_relations(model: &DsmModel) -> Vec<RelationId> {
    let elements = model.elements();
    model
        .relations()
        .live()
        .into_iter()
        .filter(|r| !elements.contains(r.consumer) || !elements.contains(r.provider))
        .map(|r| r.id)
        .collect()
}

/// Live relations whose consumer equals their provider
pub fn find_self_relations(model: &DsmModel) -> Vec<RelationId> {
    model
        .relations()
        .live()
        .into_iter()
        .filter(|r| r.consumer == r.provider)
        .map(|r| r.id)
        .collect()
}

/// Live relations sharing a (consumer, provider, type) key with an earlier
/// one
pub fn find_duplicate_relations(model: &DsmModel) -> Vec<RelationId> {
    let mut seen: HashMap<RelationKey, RelationId> = HashMap::new();
    let mut duplicates = Vec::new();
    for relation in model.relations().live() {
        if seen.insert(relation.key(), relation.id).is_some() {
            duplicates.push(relation.id);
        }
    }
    duplicates
}

/// True when live `order` values are exactly `0..N-1` in depth-first order
pub fn has_contiguous_order(model: &DsmModel) -> bool {
    let elements = model.elements();
    elements
        .subtree(elements.root_id())
        .into_iter()
        .enumerate()
        .all(|(expected, id)| elements.get(id).is_ok_and(|e| e.order == expected))
}

/// True when the incremental resolved weights match a full rebuild
pub fn has_consistent_resolved_weights(model: &DsmModel) -> bool {
    let mut rebuilt = model.clone();
    !rebuilt.rebuild_resolved_weights()
}
