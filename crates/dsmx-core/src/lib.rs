//! DSMX Core - Dependency structure matrix engine
//!
//! This crate provides the in-memory model and algorithms behind a DSM
//! viewer, including:
//! - An element hierarchy stored as an id-addressed arena
//! - Weighted relations with cached hierarchical (resolved) weights
//! - Direct and indirect cycle analysis
//! - Partitioning of sibling sets into layers and cyclic clusters
//! - Journaled, undoable mutations with persistable action records
//! - Structural consistency checks and a model digest
//!
//! `DsmCore` is the entry point for importers and presentation code.

pub mod actions;
pub mod analysis;
pub mod config;
pub mod digest;
pub mod dsm;
pub mod errors;
pub mod logging_facility;
pub mod model;
pub mod ops;
pub mod progress;
pub mod rules;
pub mod sorting;

// Re-export commonly used types
pub use actions::{Action, ActionJournal, ActionRecord, ActionType};
pub use analysis::CycleType;
pub use config::DsmConfig;
pub use dsm::DsmCore;
pub use dsmx_core_types::{ElementId, RelationId};
pub use errors::{DsmError, ExError, ExErrorKind, Result};
pub use model::{Element, MetaData, Relation};
pub use ops::DsmModel;
pub use progress::{NoProgress, ProgressInfo, ProgressSink};
pub use sorting::{SortAlgorithm, SortAlgorithmId, SortRegistry, SortResult};
