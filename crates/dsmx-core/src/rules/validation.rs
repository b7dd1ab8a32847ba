use crate::errors::{DsmError, Result};
use crate::ops::DsmModel;

use super::invariants;

fn violation(reason: String) -> DsmError {
    DsmError::InvariantViolation { reason }
}

/// Validate the structure of the model
///
/// Checks, in order:
///
/// 1. The root is the only live element without a parent
/// 2. Parent links point at live elements
/// 3. Parent links and child lists agree
/// 4. Every live element is reachable from the root
/// 5. Live relations connect two distinct live elements
/// 6. No two live relations share a (consumer, provider, type) key
/// 7. The resolved weight cache matches a full rebuild
///
/// # Errors
///
/// Returns `InvariantViolation` describing the first failed check.
pub fn validate_structure(model: &DsmModel) -> Result<()> {
    if let Some(root) = invariants::find_extra_roots(model).first() {
        return Err(violation(format!("element {} has no parent", root)));
    }
    if let Some((element, parent)) = invariants::find_orphans(model).first() {
        return Err(violation(format!(
            "element {} has missing or deleted parent {}",
            element, parent
        )));
    }
    if let Some((child, parent)) = invariants::find_membership_mismatches(model).first() {
        return Err(violation(format!(
            "element {} and parent {} disagree about membership",
            child, parent
        )));
    }
    if let Some(element) = invariants::find_unreachable(model).first() {
        return Err(violation(format!("element {} is unreachable from the root", element)));
    }
    if let Some(relation) = invariants::find_dangling_relations(model).first() {
        return Err(violation(format!("relation {} has a missing endpoint", relation)));
    }
    if let Some(relation) = invariants::find_self_relations(model).first() {
        return Err(violation(format!("relation {} is a self relation", relation)));
    }
    if let Some(relation) = invariants::find_duplicate_relations(model).first() {
        return Err(violation(format!("relation {} duplicates another relation", relation)));
    }
    if !invariants::has_consistent_resolved_weights(model) {
        return Err(violation("resolved weights are out of date".to_string()));
    }
    Ok(())
}

/// Validate structure plus contiguous depth-first `order` values
///
/// Only meaningful after `assign_element_order`, which every journaled
/// mutation and `finalize_import` perform.
///
/// # Errors
///
/// Returns `InvariantViolation` describing the first failed check.
pub fn validate_model(model: &DsmModel) -> Result<()> {
    validate_structure(model)?;
    if !invariants::has_contiguous_order(model) {
        return Err(violation("element order is not contiguous".to_string()));
    }
    Ok(())
}
