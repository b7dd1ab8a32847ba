//! Sibling reordering algorithms
//!
//! An algorithm receives the children of one element and returns a
//! permutation of them. Algorithms are registered in a `SortRegistry` under a
//! `SortAlgorithmId`; the façade looks them up by name.

pub mod alphabetical;
pub mod matrix;
pub mod partition;

use std::fmt;
use std::str::FromStr;

use dsmx_core_types::ElementId;
use serde::{Deserialize, Serialize};

use crate::errors::{DsmError, Result};
use crate::ops::DsmModel;
use crate::progress::ProgressSink;

pub use alphabetical::AlphabeticalSort;
pub use matrix::SquareMatrix;
pub use partition::{partition, PartitionSort};

/// Identifier of a registered sort algorithm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortAlgorithmId {
    Partition,
    Alphabetical,
}

impl SortAlgorithmId {
    pub const ALL: [SortAlgorithmId; 2] = [SortAlgorithmId::Partition, SortAlgorithmId::Alphabetical];

    pub fn as_str(self) -> &'static str {
        match self {
            SortAlgorithmId::Partition => "Partition",
            SortAlgorithmId::Alphabetical => "Alphabetical",
        }
    }
}

impl fmt::Display for SortAlgorithmId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortAlgorithmId {
    type Err = DsmError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|id| id.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| DsmError::UnknownSortAlgorithm {
                name: s.to_string(),
            })
    }
}

/// Outcome of sorting `n` siblings
///
/// `order[new_position] = old_position`. `clusters` lists the groups of old
/// positions that ended up in one cyclic block, in final order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SortResult {
    pub order: Vec<usize>,
    pub clusters: Vec<Vec<usize>>,
}

impl SortResult {
    pub fn identity(n: usize) -> Self {
        Self {
            order: (0..n).collect(),
            clusters: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn is_identity(&self) -> bool {
        self.order.iter().enumerate().all(|(new, &old)| new == old)
    }

    /// New position of the sibling that was at `old`
    pub fn position_of(&self, old: usize) -> Option<usize> {
        self.order.iter().position(|&o| o == old)
    }

    /// Permutation that undoes this one
    pub fn inverse(&self) -> Vec<usize> {
        invert_permutation(&self.order)
    }
}

/// Inverse of `order[new] = old`, i.e. `inverse[old] = new`
///
/// Out-of-range entries are skipped.
pub fn invert_permutation(order: &[usize]) -> Vec<usize> {
    let mut inverse = vec![0; order.len()];
    for (new, &old) in order.iter().enumerate() {
        if let Some(slot) = inverse.get_mut(old) {
            *slot = new;
        }
    }
    inverse
}

/// A sibling ordering strategy
pub trait SortAlgorithm: Send + Sync {
    fn id(&self) -> SortAlgorithmId;

    /// Compute a new order for `siblings`, which all share one parent
    fn sort(
        &self,
        model: &DsmModel,
        siblings: &[ElementId],
        progress: Option<&mut dyn ProgressSink>,
    ) -> SortResult;
}

/// Table of available sort algorithms
pub struct SortRegistry {
    algorithms: Vec<Box<dyn SortAlgorithm>>,
}

impl fmt::Debug for SortRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.algorithms.iter().map(|a| a.id()))
            .finish()
    }
}

impl Default for SortRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(Box::new(PartitionSort));
        registry.register(Box::new(AlphabeticalSort));
        registry
    }
}

impl SortRegistry {
    /// Registry with the built-in algorithms
    pub fn new() -> Self {
        Self::default()
    }

    pub fn empty() -> Self {
        Self {
            algorithms: Vec::new(),
        }
    }

    /// Add an algorithm, replacing one registered under the same id
    pub fn register(&mut self, algorithm: Box<dyn SortAlgorithm>) {
        let id = algorithm.id();
        self.algorithms.retain(|a| a.id() != id);
        self.algorithms.push(algorithm);
    }

    /// # Errors
    ///
    /// Returns `UnknownSortAlgorithm` if nothing is registered under `id`.
    pub fn get(&self, id: SortAlgorithmId) -> Result<&dyn SortAlgorithm> {
        self.algorithms
            .iter()
            .find(|a| a.id() == id)
            .map(|a| a.as_ref())
            .ok_or_else(|| DsmError::UnknownSortAlgorithm {
                name: id.to_string(),
            })
    }

    /// # Errors
    ///
    /// Returns `UnknownSortAlgorithm` for unknown or unregistered names.
    pub fn get_by_name(&self, name: &str) -> Result<&dyn SortAlgorithm> {
        self.get(name.parse()?)
    }

    /// Registered ids in registration order
    pub fn supported(&self) -> Vec<SortAlgorithmId> {
        self.algorithms.iter().map(|a| a.id()).collect()
    }
}
