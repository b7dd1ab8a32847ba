use dsmx_core_types::ElementId;

use crate::ops::DsmModel;

/// Dense n x n weight matrix over a sibling set
///
/// Cell `(provider, consumer)` holds the resolved weight of `consumer` on
/// `provider`, so `has_edge(i, j)` reads "sibling j depends on sibling i".
/// The diagonal is always zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SquareMatrix {
    size: usize,
    cells: Vec<u64>,
}

impl SquareMatrix {
    pub fn new(size: usize) -> Self {
        Self {
            size,
            cells: vec![0; size * size],
        }
    }

    /// Build the matrix of resolved weights among `siblings`
    pub fn from_siblings(model: &DsmModel, siblings: &[ElementId]) -> Self {
        let mut matrix = Self::new(siblings.len());
        for (provider, &p) in siblings.iter().enumerate() {
            for (consumer, &c) in siblings.iter().enumerate() {
                matrix.set(provider, consumer, model.dependency_weight(c, p));
            }
        }
        matrix
    }

    /// Build from `(provider, consumer)` pairs with weight 1
    pub fn from_edges(size: usize, edges: &[(usize, usize)]) -> Self {
        let mut matrix = Self::new(size);
        for &(provider, consumer) in edges {
            matrix.set(provider, consumer, 1);
        }
        matrix
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn get(&self, provider: usize, consumer: usize) -> u64 {
        if provider >= self.size || consumer >= self.size {
            return 0;
        }
        self.cells[provider * self.size + consumer]
    }

    /// Out-of-range and diagonal writes are ignored
    pub fn set(&mut self, provider: usize, consumer: usize, weight: u64) {
        if provider >= self.size || consumer >= self.size || provider == consumer {
            return;
        }
        self.cells[provider * self.size + consumer] = weight;
    }

    pub fn has_edge(&self, provider: usize, consumer: usize) -> bool {
        self.get(provider, consumer) > 0
    }

    /// Matrix with rows and columns rearranged by `order[new] = old`
    pub fn permuted(&self, order: &[usize]) -> Self {
        let mut result = Self::new(order.len());
        for (new_p, &old_p) in order.iter().enumerate() {
            for (new_c, &old_c) in order.iter().enumerate() {
                result.set(new_p, new_c, self.get(old_p, old_c));
            }
        }
        result
    }
}
