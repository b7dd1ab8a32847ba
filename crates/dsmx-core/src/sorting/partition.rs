//! Partitioning of a sibling set into layers and cyclic blocks
//!
//! The active set is peeled repeatedly:
//!
//! 1. Sinks (nothing else active depends on them) are placed at the back.
//!    Each newly peeled sink group goes in front of the groups peeled before.
//! 2. Otherwise sources (depend on nothing else active) are appended to the
//!    front region.
//! 3. Otherwise every strongly connected set of the active units is collapsed
//!    into a single unit, and peeling resumes.
//!
//! Inside a group, units keep the order of their smallest original index and
//! the members of a unit stay in ascending original order. The result puts
//! every provider before its consumers except inside a cyclic block, and is a
//! fixed point: partitioning the reordered matrix gives the identity.

use std::collections::HashSet;

use dsmx_core_types::ElementId;

use crate::ops::DsmModel;
use crate::progress::{ProgressSink, ProgressTracker};
use crate::sorting::{SortAlgorithm, SortAlgorithmId, SortResult, SquareMatrix};

/// Registered partitioning algorithm
#[derive(Debug, Clone, Copy, Default)]
pub struct PartitionSort;

impl SortAlgorithm for PartitionSort {
    fn id(&self) -> SortAlgorithmId {
        SortAlgorithmId::Partition
    }

    fn sort(
        &self,
        model: &DsmModel,
        siblings: &[ElementId],
        progress: Option<&mut dyn ProgressSink>,
    ) -> SortResult {
        if siblings.len() <= 1 {
            return SortResult::identity(siblings.len());
        }
        let matrix = SquareMatrix::from_siblings(model, siblings);
        partition(&matrix, progress)
    }
}

struct Peeler<'m> {
    matrix: &'m SquareMatrix,
    /// Members of each unit, ascending
    units: Vec<Vec<usize>>,
    /// Units still to be placed
    active: Vec<usize>,
}

impl<'m> Peeler<'m> {
    fn new(matrix: &'m SquareMatrix) -> Self {
        let n = matrix.size();
        Self {
            matrix,
            units: (0..n).map(|i| vec![i]).collect(),
            active: (0..n).collect(),
        }
    }

    /// Some member of `consumer` depends on some member of `provider`
    fn depends(&self, consumer: usize, provider: usize) -> bool {
        self.units[provider].iter().any(|&p| {
            self.units[consumer]
                .iter()
                .any(|&c| self.matrix.has_edge(p, c))
        })
    }

    fn is_sink(&self, unit: usize) -> bool {
        !self
            .active
            .iter()
            .any(|&other| other != unit && self.depends(other, unit))
    }

    fn is_source(&self, unit: usize) -> bool {
        !self
            .active
            .iter()
            .any(|&other| other != unit && self.depends(unit, other))
    }

    /// Remove the units matching `pick` from the active set, ordered by
    /// smallest member
    fn peel(&mut self, pick: impl Fn(&Self, usize) -> bool) -> Vec<usize> {
        let mut picked: Vec<usize> = self
            .active
            .iter()
            .copied()
            .filter(|&u| pick(self, u))
            .collect();
        if picked.is_empty() {
            return picked;
        }
        self.active.retain(|u| !picked.contains(u));
        picked.sort_by_key(|&u| self.units[u][0]);
        picked
    }

    /// Active units reachable from `start`, following `depends` forwards or
    /// backwards
    fn reach(&self, start: usize, forward: bool) -> HashSet<usize> {
        let mut seen = HashSet::from([start]);
        let mut stack = vec![start];
        while let Some(current) = stack.pop() {
            for &next in &self.active {
                if seen.contains(&next) {
                    continue;
                }
                let linked = if forward {
                    self.depends(current, next)
                } else {
                    self.depends(next, current)
                };
                if linked {
                    seen.insert(next);
                    stack.push(next);
                }
            }
        }
        seen
    }

    /// Replace every strongly connected set of active units by one unit
    fn collapse_cycles(&mut self) {
        let mut remaining = self.active.clone();
        let mut collapsed = Vec::new();
        while let Some(&start) = remaining.first() {
            let forward = self.reach(start, true);
            let backward = self.reach(start, false);
            let component: Vec<usize> = remaining
                .iter()
                .copied()
                .filter(|u| forward.contains(u) && backward.contains(u))
                .collect();
            remaining.retain(|u| !component.contains(u));

            if component.len() == 1 {
                collapsed.push(start);
                continue;
            }
            let mut members: Vec<usize> = component
                .iter()
                .flat_map(|&u| self.units[u].iter().copied())
                .collect();
            members.sort_unstable();
            self.units.push(members);
            collapsed.push(self.units.len() - 1);
        }
        self.active = collapsed;
    }
}

/// Partition the sibling set described by `matrix`
///
/// Sets of one or zero siblings return the identity.
pub fn partition(matrix: &SquareMatrix, progress: Option<&mut dyn ProgressSink>) -> SortResult {
    let n = matrix.size();
    if n <= 1 {
        return SortResult::identity(n);
    }

    let mut tracker = ProgressTracker::new(progress, "Partitioning", "elements", n);
    let mut peeler = Peeler::new(matrix);
    let mut front: Vec<usize> = Vec::new();
    let mut back_groups: Vec<Vec<usize>> = Vec::new();
    let mut placed = 0;

    while !peeler.active.is_empty() {
        let sinks = peeler.peel(|p, u| p.is_sink(u));
        if !sinks.is_empty() {
            placed += sinks.iter().map(|&u| peeler.units[u].len()).sum::<usize>();
            back_groups.push(sinks);
            tracker.update(placed);
            continue;
        }

        let sources = peeler.peel(|p, u| p.is_source(u));
        if !sources.is_empty() {
            placed += sources.iter().map(|&u| peeler.units[u].len()).sum::<usize>();
            front.extend(sources);
            tracker.update(placed);
            continue;
        }

        peeler.collapse_cycles();
    }

    let placed_units: Vec<usize> = front
        .into_iter()
        .chain(back_groups.into_iter().rev().flatten())
        .collect();

    let mut result = SortResult::default();
    for unit in placed_units {
        let members = &peeler.units[unit];
        result.order.extend(members.iter().copied());
        if members.len() > 1 {
            result.clusters.push(members.clone());
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::ProgressInfo;
    use proptest::prelude::*;

    /// Edges are (provider, consumer)
    fn run(n: usize, edges: &[(usize, usize)]) -> SortResult {
        partition(&SquareMatrix::from_edges(n, edges), None)
    }

    #[test]
    fn test_trivial_sizes_are_identity() {
        assert_eq!(run(0, &[]), SortResult::identity(0));
        assert_eq!(run(1, &[]), SortResult::identity(1));
    }

    #[test]
    fn test_chain_layers_providers_first() {
        // B depends on A, C depends on B; given in reverse index order
        let result = run(3, &[(2, 1), (1, 0)]);
        assert_eq!(result.order, vec![2, 1, 0]);
        assert!(result.clusters.is_empty());
    }

    #[test]
    fn test_chain_in_order_is_identity() {
        let result = run(3, &[(0, 1), (1, 2)]);
        assert!(result.is_identity());
    }

    #[test]
    fn test_fully_cyclic_is_one_cluster() {
        let edges = [(0, 1), (0, 2), (1, 0), (1, 2), (2, 0), (2, 1)];
        let result = run(3, &edges);
        assert_eq!(result.order, vec![0, 1, 2]);
        assert_eq!(result.clusters, vec![vec![0, 1, 2]]);
    }

    #[test]
    fn test_isolated_elements_keep_order() {
        let result = run(4, &[]);
        assert!(result.is_identity());
    }

    #[test]
    fn test_cycle_between_layers() {
        // 3 depends on 1 and 2, which form a cycle that depends on 0
        let edges = [(1, 2), (2, 1), (0, 1), (1, 3), (2, 3)];
        let result = run(4, &edges);
        assert_eq!(result.order, vec![0, 1, 2, 3]);
        assert_eq!(result.clusters, vec![vec![1, 2]]);
    }

    #[test]
    fn test_two_separate_cycles() {
        // {0, 2} and {1, 3}; the second depends on the first
        let edges = [(0, 2), (2, 0), (1, 3), (3, 1), (0, 1)];
        let result = run(4, &edges);
        assert_eq!(result.order, vec![0, 2, 1, 3]);
        assert_eq!(result.clusters, vec![vec![0, 2], vec![1, 3]]);
    }

    #[test]
    fn test_progress_reaches_done() {
        let mut reports: Vec<ProgressInfo> = Vec::new();
        let mut sink = |info: &ProgressInfo| reports.push(info.clone());
        let edges = [(0, 1), (1, 2), (2, 3)];
        partition(&SquareMatrix::from_edges(4, &edges), Some(&mut sink));
        assert!(reports.last().is_some_and(|r| r.done));
    }

    fn arb_graph() -> impl Strategy<Value = (usize, Vec<(usize, usize)>)> {
        (2usize..9).prop_flat_map(|n| {
            (
                Just(n),
                prop::collection::vec((0..n, 0..n), 0..(n * n)),
            )
        })
    }

    proptest! {
        #[test]
        fn prop_result_is_permutation((n, edges) in arb_graph()) {
            let result = run(n, &edges);
            let mut sorted = result.order.clone();
            sorted.sort_unstable();
            prop_assert_eq!(sorted, (0..n).collect::<Vec<_>>());
        }

        #[test]
        fn prop_providers_precede_consumers((n, edges) in arb_graph()) {
            let result = run(n, &edges);
            let matrix = SquareMatrix::from_edges(n, &edges);
            let mut block = vec![usize::MAX; n];
            for (b, cluster) in result.clusters.iter().enumerate() {
                for &i in cluster {
                    block[i] = b;
                }
            }
            for p in 0..n {
                for c in 0..n {
                    if !matrix.has_edge(p, c) {
                        continue;
                    }
                    if block[p] != usize::MAX && block[p] == block[c] {
                        continue;
                    }
                    prop_assert!(result.position_of(p) < result.position_of(c));
                }
            }
        }

        #[test]
        fn prop_partition_is_idempotent((n, edges) in arb_graph()) {
            let matrix = SquareMatrix::from_edges(n, &edges);
            let first = partition(&matrix, None);
            let second = partition(&matrix.permuted(&first.order), None);
            prop_assert!(second.is_identity());
            prop_assert_eq!(first.clusters.len(), second.clusters.len());
        }

        #[test]
        fn prop_clusters_are_contiguous((n, edges) in arb_graph()) {
            let result = run(n, &edges);
            for cluster in &result.clusters {
                let mut positions: Vec<usize> = cluster
                    .iter()
                    .filter_map(|&i| result.position_of(i))
                    .collect();
                positions.sort_unstable();
                let span = positions[positions.len() - 1] - positions[0] + 1;
                prop_assert_eq!(span, cluster.len());
            }
        }
    }
}
