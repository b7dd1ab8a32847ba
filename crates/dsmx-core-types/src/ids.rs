//! Integer identifiers for elements and relations
//!
//! Ids are allocated by the stores, are stable for the lifetime of a model and
//! are never reused. Both render as plain decimal integers so they can travel
//! through string-keyed attribute maps.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

/// Error returned when an id cannot be parsed from text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError {
    input: String,
    reason: String,
}

impl ParseIdError {
    fn new(input: &str, err: ParseIntError) -> Self {
        Self {
            input: input.to_string(),
            reason: err.to_string(),
        }
    }

    /// The text that failed to parse
    pub fn input(&self) -> &str {
        &self.input
    }
}

impl fmt::Display for ParseIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid id '{}': {}", self.input, self.reason)
    }
}

impl std::error::Error for ParseIdError {}

/// Identifier of an element in the hierarchy
///
/// The root element always carries id 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(pub u32);

impl ElementId {
    /// Id of the root element
    pub const ROOT: ElementId = ElementId(0);

    /// Raw integer value
    pub fn get(self) -> u32 {
        self.0
    }

    pub fn is_root(self) -> bool {
        self == Self::ROOT
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ElementId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u32>()
            .map(ElementId)
            .map_err(|e| ParseIdError::new(s, e))
    }
}

/// Identifier of a relation between two elements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RelationId(pub u32);

impl RelationId {
    /// Raw integer value
    pub fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for RelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RelationId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u32>()
            .map(RelationId)
            .map_err(|e| ParseIdError::new(s, e))
    }
}
