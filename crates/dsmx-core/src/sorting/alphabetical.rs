use dsmx_core_types::ElementId;

use crate::ops::DsmModel;
use crate::progress::ProgressSink;
use crate::sorting::{SortAlgorithm, SortAlgorithmId, SortResult};

/// Orders siblings by name, ignoring case; equal names keep their order
#[derive(Debug, Clone, Copy, Default)]
pub struct AlphabeticalSort;

impl SortAlgorithm for AlphabeticalSort {
    fn id(&self) -> SortAlgorithmId {
        SortAlgorithmId::Alphabetical
    }

    fn sort(
        &self,
        model: &DsmModel,
        siblings: &[ElementId],
        _progress: Option<&mut dyn ProgressSink>,
    ) -> SortResult {
        let keys: Vec<String> = siblings
            .iter()
            .map(|&id| {
                model
                    .elements()
                    .get(id)
                    .map(|e| e.name.to_lowercase())
                    .unwrap_or_default()
            })
            .collect();
        let mut order: Vec<usize> = (0..siblings.len()).collect();
        order.sort_by(|&a, &b| keys[a].cmp(&keys[b]));
        SortResult {
            order,
            clusters: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sorts_case_insensitively() {
        let mut model = DsmModel::new();
        let zeta = model.create_element("zeta", "zeta", "", None, None).unwrap();
        let alpha = model.create_element("Alpha", "Alpha", "", None, None).unwrap();
        let beta = model.create_element("beta", "beta", "", None, None).unwrap();

        let result = AlphabeticalSort.sort(&model, &[zeta, alpha, beta], None);
        assert_eq!(result.order, vec![1, 2, 0]);
        assert!(result.clusters.is_empty());
    }
}
