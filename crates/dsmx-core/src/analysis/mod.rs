//! Read-only analysis of a model: cycles and relation queries

pub mod cycles;
pub mod relations;

pub use cycles::{hierarchical_cycle_count, is_cyclic_dependency, system_cycle_count, CycleType};
pub use relations::{
    element_consumers, element_providers, find_external_relations, find_ingoing_relations,
    find_internal_relations, find_outgoing_relations, find_relations, find_resolved_relations,
    relation_consumers, relation_providers,
};
