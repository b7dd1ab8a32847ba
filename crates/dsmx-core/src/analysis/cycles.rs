//! Cycle classification over resolved weights
//!
//! A pair (consumer, provider) is cyclic when the provider also depends on
//! the consumer, either directly or through other elements at the sibling
//! level where the two first diverge.

use std::collections::{HashSet, VecDeque};

use dsmx_core_types::ElementId;
use serde::{Deserialize, Serialize};

use crate::ops::DsmModel;

/// Kind of cycle between a consumer and a provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CycleType {
    None,
    /// The provider depends on the consumer
    Direct,
    /// The provider reaches the consumer through other siblings
    Indirect,
}

impl CycleType {
    pub fn is_cyclic(self) -> bool {
        self != CycleType::None
    }
}

/// Classify the dependency of `consumer` on `provider`
pub fn is_cyclic_dependency(model: &DsmModel, consumer: ElementId, provider: ElementId) -> CycleType {
    if consumer == provider || model.dependency_weight(consumer, provider) == 0 {
        return CycleType::None;
    }
    if model.dependency_weight(provider, consumer) > 0 {
        return CycleType::Direct;
    }

    let elements = model.elements();
    let Some(lca) = elements.lowest_common_ancestor(consumer, provider) else {
        return CycleType::None;
    };
    let (Some(lifted_consumer), Some(lifted_provider)) = (
        lift_to_child_of(model, lca, consumer),
        lift_to_child_of(model, lca, provider),
    ) else {
        return CycleType::None;
    };
    let Ok(siblings) = elements.children(lca) else {
        return CycleType::None;
    };
    if reachable(model, siblings, lifted_provider, Direction::Forward).contains(&lifted_consumer) {
        CycleType::Indirect
    } else {
        CycleType::None
    }
}

/// Number of directly cyclic pairs within `element`'s subtree
///
/// Each pair is counted at the element whose children it connects. The
/// element itself is also paired with each of its siblings.
pub fn hierarchical_cycle_count(model: &DsmModel, element: ElementId) -> usize {
    let elements = model.elements();
    let mut count = 0;

    for id in elements.subtree(element) {
        if let Ok(children) = elements.children(id) {
            count += cyclic_pairs(model, children);
        }
    }

    if let Some(parent) = elements.get(element).ok().and_then(|e| e.parent) {
        if let Ok(siblings) = elements.children(parent) {
            count += siblings
                .iter()
                .filter(|&&s| s != element && is_direct_pair(model, element, s))
                .count();
        }
    }
    count
}

/// Number of siblings of `element` that are mutually reachable with it
pub fn system_cycle_count(model: &DsmModel, element: ElementId) -> usize {
    let elements = model.elements();
    let Some(parent) = elements.get(element).ok().and_then(|e| e.parent) else {
        return 0;
    };
    let Ok(siblings) = elements.children(parent) else {
        return 0;
    };
    let forward = reachable(model, siblings, element, Direction::Forward);
    let backward = reachable(model, siblings, element, Direction::Backward);
    forward
        .intersection(&backward)
        .filter(|&&s| s != element)
        .count()
}

fn is_direct_pair(model: &DsmModel, a: ElementId, b: ElementId) -> bool {
    model.dependency_weight(a, b) > 0 && model.dependency_weight(b, a) > 0
}

fn cyclic_pairs(model: &DsmModel, siblings: &[ElementId]) -> usize {
    let mut count = 0;
    for (i, &a) in siblings.iter().enumerate() {
        for &b in &siblings[i + 1..] {
            if is_direct_pair(model, a, b) {
                count += 1;
            }
        }
    }
    count
}

/// Ancestor of `id` that is a direct child of `ancestor`
fn lift_to_child_of(model: &DsmModel, ancestor: ElementId, id: ElementId) -> Option<ElementId> {
    let chain = model.elements().ancestors_inclusive(id);
    let position = chain.iter().position(|&a| a == ancestor)?;
    position.checked_sub(1).map(|p| chain[p])
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    /// Follow consumer -> provider
    Forward,
    /// Follow provider -> consumer
    Backward,
}

/// Siblings reachable from `start`, excluding `start` unless it lies on a
/// cycle
fn reachable(
    model: &DsmModel,
    siblings: &[ElementId],
    start: ElementId,
    direction: Direction,
) -> HashSet<ElementId> {
    let mut seen = HashSet::new();
    let mut queue = VecDeque::from([start]);
    while let Some(current) = queue.pop_front() {
        for &next in siblings {
            if next == current || seen.contains(&next) {
                continue;
            }
            let weight = match direction {
                Direction::Forward => model.dependency_weight(current, next),
                Direction::Backward => model.dependency_weight(next, current),
            };
            if weight > 0 {
                seen.insert(next);
                queue.push_back(next);
            }
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(model: &mut DsmModel, name: &str) -> ElementId {
        let part = name.rsplit('.').next().unwrap();
        model.create_element(name, part, "class", None, None).unwrap()
    }

    #[test]
    fn test_direct_cycle() {
        let mut model = DsmModel::new();
        let a = element(&mut model, "Pkg.A");
        let b = element(&mut model, "Pkg.B");
        model.add_relation(a, b, "call", 3, None).unwrap();
        assert_eq!(is_cyclic_dependency(&model, a, b), CycleType::None);

        model.add_relation(b, a, "call", 2, None).unwrap();
        assert_eq!(is_cyclic_dependency(&model, a, b), CycleType::Direct);
        assert_eq!(is_cyclic_dependency(&model, b, a), CycleType::Direct);
        assert_eq!(is_cyclic_dependency(&model, a, a), CycleType::None);
    }

    #[test]
    fn test_indirect_cycle_through_third_sibling() {
        let mut model = DsmModel::new();
        let a = element(&mut model, "A");
        let b = element(&mut model, "B");
        let c = element(&mut model, "C");
        model.add_relation(a, b, "call", 1, None).unwrap();
        model.add_relation(b, c, "call", 1, None).unwrap();
        assert_eq!(is_cyclic_dependency(&model, a, b), CycleType::None);

        model.add_relation(c, a, "call", 1, None).unwrap();
        assert_eq!(is_cyclic_dependency(&model, a, b), CycleType::Indirect);
        assert_eq!(is_cyclic_dependency(&model, b, c), CycleType::Indirect);
        assert_eq!(is_cyclic_dependency(&model, b, a), CycleType::None);
    }

    #[test]
    fn test_indirect_cycle_lifted_to_common_parent() {
        let mut model = DsmModel::new();
        let a1 = element(&mut model, "P.A.One");
        let a2 = element(&mut model, "P.A.Two");
        let b1 = element(&mut model, "P.B.One");
        model.add_relation(a1, b1, "call", 1, None).unwrap();
        model.add_relation(b1, a2, "call", 1, None).unwrap();
        assert_eq!(is_cyclic_dependency(&model, a1, b1), CycleType::Indirect);
    }

    #[test]
    fn test_hierarchical_cycle_count() {
        let mut model = DsmModel::new();
        let a = element(&mut model, "Pkg.A");
        let b = element(&mut model, "Pkg.B");
        let c = element(&mut model, "Pkg.C");
        let lib = element(&mut model, "Lib");
        let pkg = model.elements().find_by_full_name("Pkg").unwrap();
        model.add_relation(a, b, "call", 1, None).unwrap();
        model.add_relation(b, a, "call", 1, None).unwrap();
        model.add_relation(b, c, "call", 1, None).unwrap();
        model.add_relation(c, lib, "call", 1, None).unwrap();
        model.add_relation(lib, a, "call", 1, None).unwrap();

        assert_eq!(hierarchical_cycle_count(&model, pkg), 2);
        assert_eq!(hierarchical_cycle_count(&model, a), 1);
        assert_eq!(hierarchical_cycle_count(&model, c), 0);
    }

    #[test]
    fn test_system_cycle_count() {
        let mut model = DsmModel::new();
        let a = element(&mut model, "A");
        let b = element(&mut model, "B");
        let c = element(&mut model, "C");
        let d = element(&mut model, "D");
        model.add_relation(a, b, "call", 1, None).unwrap();
        model.add_relation(b, c, "call", 1, None).unwrap();
        model.add_relation(c, a, "call", 1, None).unwrap();
        model.add_relation(d, a, "call", 1, None).unwrap();

        assert_eq!(system_cycle_count(&model, a), 2);
        assert_eq!(system_cycle_count(&model, d), 0);
        assert_eq!(system_cycle_count(&model, ElementId::ROOT), 0);
    }
}
