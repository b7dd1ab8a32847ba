//! Relation queries relative to the element hierarchy
//!
//! All results are live relations ordered by relation id.

use std::collections::HashSet;

use dsmx_core_types::ElementId;

use crate::model::Relation;
use crate::ops::DsmModel;

fn subtree_set(model: &DsmModel, element: ElementId) -> HashSet<ElementId> {
    if !model.elements().contains(element) {
        return HashSet::new();
    }
    model.elements().subtree(element).into_iter().collect()
}

fn filter_relations<'a>(
    model: &'a DsmModel,
    mut keep: impl FnMut(&Relation) -> bool,
) -> Vec<&'a Relation> {
    model
        .relations()
        .live()
        .into_iter()
        .filter(|r| keep(*r))
        .collect()
}

/// Relations from exactly `consumer` to exactly `provider`
pub fn find_relations(model: &DsmModel, consumer: ElementId, provider: ElementId) -> Vec<&Relation> {
    model.relations().find(consumer, provider)
}

/// Relations that add up to the resolved weight from `consumer` to
/// `provider`
pub fn find_resolved_relations(
    model: &DsmModel,
    consumer: ElementId,
    provider: ElementId,
) -> Vec<&Relation> {
    if consumer == provider {
        return Vec::new();
    }
    let consumers = subtree_set(model, consumer);
    let providers = subtree_set(model, provider);
    filter_relations(model, |r| {
        consumers.contains(&r.consumer) && providers.contains(&r.provider)
    })
}

/// Relations entering `element`'s subtree from outside
pub fn find_ingoing_relations(model: &DsmModel, element: ElementId) -> Vec<&Relation> {
    let inside = subtree_set(model, element);
    filter_relations(model, |r| {
        !inside.contains(&r.consumer) && inside.contains(&r.provider)
    })
}

/// Relations leaving `element`'s subtree
pub fn find_outgoing_relations(model: &DsmModel, element: ElementId) -> Vec<&Relation> {
    let inside = subtree_set(model, element);
    filter_relations(model, |r| {
        inside.contains(&r.consumer) && !inside.contains(&r.provider)
    })
}

/// Relations with both endpoints in `element`'s subtree
pub fn find_internal_relations(model: &DsmModel, element: ElementId) -> Vec<&Relation> {
    let inside = subtree_set(model, element);
    filter_relations(model, |r| {
        inside.contains(&r.consumer) && inside.contains(&r.provider)
    })
}

/// Relations with both endpoints outside `element`'s subtree
pub fn find_external_relations(model: &DsmModel, element: ElementId) -> Vec<&Relation> {
    let inside = subtree_set(model, element);
    filter_relations(model, |r| {
        !inside.contains(&r.consumer) && !inside.contains(&r.provider)
    })
}

fn distinct(ids: impl IntoIterator<Item = ElementId>) -> Vec<ElementId> {
    let mut seen = HashSet::new();
    ids.into_iter().filter(|id| seen.insert(*id)).collect()
}

/// Elements outside the subtree that `element` depends on
pub fn element_providers(model: &DsmModel, element: ElementId) -> Vec<ElementId> {
    distinct(
        find_outgoing_relations(model, element)
            .into_iter()
            .map(|r| r.provider),
    )
}

/// Elements outside the subtree that depend on `element`
pub fn element_consumers(model: &DsmModel, element: ElementId) -> Vec<ElementId> {
    distinct(
        find_ingoing_relations(model, element)
            .into_iter()
            .map(|r| r.consumer),
    )
}

/// Provider endpoints of the resolved relations between two elements
pub fn relation_providers(model: &DsmModel, consumer: ElementId, provider: ElementId) -> Vec<ElementId> {
    distinct(
        find_resolved_relations(model, consumer, provider)
            .into_iter()
            .map(|r| r.provider),
    )
}

/// Consumer endpoints of the resolved relations between two elements
pub fn relation_consumers(model: &DsmModel, consumer: ElementId, provider: ElementId) -> Vec<ElementId> {
    distinct(
        find_resolved_relations(model, consumer, provider)
            .into_iter()
            .map(|r| r.consumer),
    )
}
