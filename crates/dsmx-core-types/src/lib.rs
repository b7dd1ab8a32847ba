//! Core types shared across DSMX facilities
//!
//! This crate provides foundational types used by the engine, its error
//! facility and its logging facility:
//!
//! - **Identifiers**: ElementId, RelationId
//! - **Schema constants**: Canonical field keys and event names

pub mod ids;
pub mod schema;

pub use ids::{ElementId, ParseIdError, RelationId};
