//! Model fingerprints
//!
//! `model_digest` hashes the live structure of a model: elements with their
//! names, types, annotations, parents and child order, relations with their
//! endpoints, types, weights and annotations, and the metadata. Derived state
//! (`order`, the resolved weight cache) and view state (`expanded`) are left
//! out, so two models that differ only in those hash equal.

use dsmx_core_types::{ElementId, RelationId};
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::errors::Result;
use crate::model::MetaData;
use crate::ops::DsmModel;

#[derive(Serialize)]
struct ElementEntry<'a> {
    id: ElementId,
    name: &'a str,
    element_type: &'a str,
    annotation: Option<&'a str>,
    parent: Option<ElementId>,
    children: &'a [ElementId],
}

#[derive(Serialize)]
struct RelationEntry<'a> {
    id: RelationId,
    consumer: ElementId,
    provider: ElementId,
    relation_type: &'a str,
    weight: u32,
    annotation: Option<&'a str>,
}

#[derive(Serialize)]
struct CanonicalModel<'a> {
    elements: Vec<ElementEntry<'a>>,
    relations: Vec<RelationEntry<'a>>,
    meta_data: &'a MetaData,
}

/// Hex-encoded SHA-256 of the canonical JSON form of the live model
///
/// # Errors
///
/// Returns `DsmError::Serialization` if JSON encoding fails.
pub fn model_digest(model: &DsmModel) -> Result<String> {
    let mut elements: Vec<ElementEntry<'_>> = model
        .elements()
        .list()
        .into_iter()
        .map(|e| ElementEntry {
            id: e.id,
            name: &e.name,
            element_type: &e.element_type,
            annotation: e.annotation.as_deref(),
            parent: e.parent,
            children: &e.children,
        })
        .collect();
    elements.sort_by_key(|e| e.id);

    let relations = model
        .relations()
        .live()
        .into_iter()
        .map(|r| RelationEntry {
            id: r.id,
            consumer: r.consumer,
            provider: r.provider,
            relation_type: &r.relation_type,
            weight: r.weight,
            annotation: r.annotation.as_deref(),
        })
        .collect();

    let canonical = serde_json::to_string(&CanonicalModel {
        elements,
        relations,
        meta_data: model.meta_data(),
    })?;
    Ok(hash_string(&canonical))
}

fn hash_string(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}
