pub mod dsm_model;
pub mod element_store;
pub mod relation_store;

pub use dsm_model::{DsmModel, RemovedSubtree};
pub use element_store::{ElementStore, RemovedElement};
pub use relation_store::{AddedRelation, RelationStore};
