use dsmx_core_types::{ElementId, RelationId};
use serde::{Deserialize, Serialize};

/// Relation - a weighted, typed dependency of `consumer` on `provider`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relation {
    pub id: RelationId,
    pub consumer: ElementId,
    pub provider: ElementId,
    pub relation_type: String,
    pub weight: u32,
    pub annotation: Option<String>,

    /// Tombstone flag
    pub deleted: bool,
}

impl Relation {
    pub fn new(
        id: RelationId,
        consumer: ElementId,
        provider: ElementId,
        relation_type: String,
        weight: u32,
        annotation: Option<String>,
    ) -> Self {
        Self {
            id,
            consumer,
            provider,
            relation_type,
            weight,
            annotation,
            deleted: false,
        }
    }

    /// Deduplication key: at most one live relation per key
    pub fn key(&self) -> RelationKey {
        RelationKey {
            consumer: self.consumer,
            provider: self.provider,
            relation_type: self.relation_type.clone(),
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted
    }
}

/// (consumer, provider, type) triple identifying a relation row
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RelationKey {
    pub consumer: ElementId,
    pub provider: ElementId,
    pub relation_type: String,
}
