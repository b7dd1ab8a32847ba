//! DSM engine façade
//!
//! `DsmCore` owns the model, the action journal, the sort registry and the
//! configuration. Importers use the build API, presentation code uses the
//! query API and changes the model only through the mutation API, which
//! wraps every change in a journaled `Action`.
//!
//! ## Logging Ownership
//!
//! The façade owns lifecycle logging. Queries and history operations use
//! `log_op_start!` / `log_op_end!` / `log_op_error!`; journaled mutations use
//! the `log_action_*` forms so every boundary event carries the action type
//! and the ids it touched.
//!
//! Stores and algorithms below it only use `tracing::debug!()`.

use std::time::Instant;

use dsmx_core_types::{ElementId, RelationId};

use crate::actions::{Action, ActionJournal, ActionRecord};
use crate::analysis::{self, CycleType};
use crate::config::DsmConfig;
use crate::errors::{DsmError, Result};
use crate::model::{Element, MetaDataItem, Relation};
use crate::ops::DsmModel;
use crate::progress::{ProgressSink, ProgressTracker};
use crate::sorting::{SortAlgorithmId, SortRegistry, SortResult};
use crate::{
    log_action_end, log_action_error, log_action_start, log_op_end, log_op_error, log_op_start,
};

fn elapsed_ms(start: Instant) -> u64 {
    start.elapsed().as_millis() as u64
}

#[derive(Debug, Default)]
pub struct DsmCore {
    model: DsmModel,
    journal: ActionJournal,
    registry: SortRegistry,
    config: DsmConfig,
    modified: bool,
}

impl DsmCore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: DsmConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Use a custom set of sort algorithms
    pub fn with_registry(mut self, registry: SortRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn model(&self) -> &DsmModel {
        &self.model
    }

    pub fn config(&self) -> &DsmConfig {
        &self.config
    }

    /// Drop the model and the history
    pub fn clear(&mut self) {
        self.model.clear();
        self.journal.clear();
        self.modified = false;
    }

    // ===== Build API =====

    pub fn import_meta_data_item(&mut self, group: &str, name: &str, value: &str) {
        self.model.meta_data_mut().add_item(group, name, value);
    }

    /// Create the element named `full_name` and any missing ancestors
    ///
    /// Importing the same name twice returns the same id.
    ///
    /// # Errors
    ///
    /// Returns `InvalidName` for malformed names and existence errors for an
    /// unknown `parent`.
    pub fn import_element(
        &mut self,
        full_name: &str,
        name_part: &str,
        element_type: &str,
        parent: Option<ElementId>,
        annotation: Option<&str>,
    ) -> Result<ElementId> {
        self.model
            .create_element(full_name, name_part, element_type, parent, annotation)
    }

    /// Add a relation found by an importer
    ///
    /// Relations to unknown or deleted elements are skipped with a warning,
    /// self relations are dropped silently. Neither is an error.
    pub fn import_relation(
        &mut self,
        consumer: ElementId,
        provider: ElementId,
        relation_type: &str,
        weight: u32,
        annotation: Option<&str>,
    ) -> Option<RelationId> {
        match self
            .model
            .add_relation(consumer, provider, relation_type, weight, annotation)
        {
            Ok(added) => added.map(|a| a.id),
            Err(err) => {
                if self.config.warn_on_skipped_relations {
                    tracing::warn!(
                        component = module_path!(),
                        op = "import_relation",
                        consumer_id = consumer.get(),
                        provider_id = provider.get(),
                        relation_type,
                        reason = %err,
                        "skipped relation"
                    );
                }
                None
            }
        }
    }

    /// Close an import: number the elements, optionally partition every
    /// sibling set, and start a fresh history
    ///
    /// With auto partitioning on, `progress` gets one "Partitioning" report
    /// per sibling set of two or more elements, the last one `done`. It gets
    /// none when there is no such set.
    ///
    /// # Errors
    ///
    /// Returns `UnknownSortAlgorithm` when auto partitioning is configured
    /// with an algorithm that is not registered.
    pub fn finalize_import(&mut self, progress: Option<&mut dyn ProgressSink>) -> Result<()> {
        log_op_start!("finalize_import");
        let start = Instant::now();

        self.finalize_import_impl(progress).map_err(|e| {
            log_op_error!("finalize_import", e.clone(), duration_ms = elapsed_ms(start));
            e
        })?;

        log_op_end!(
            "finalize_import",
            duration_ms = elapsed_ms(start),
            element_count = self.element_count(),
            relation_count = self.model.relations().len()
        );
        Ok(())
    }

    fn finalize_import_impl(&mut self, progress: Option<&mut dyn ProgressSink>) -> Result<()> {
        if self.config.auto_partition {
            self.partition_all(self.config.default_sort_algorithm, progress)?;
        }
        self.model.assign_element_order();
        self.journal.clear();
        self.modified = false;
        Ok(())
    }

    /// Sort the children of every element with more than one child
    fn partition_all(
        &mut self,
        algorithm: SortAlgorithmId,
        progress: Option<&mut dyn ProgressSink>,
    ) -> Result<()> {
        let algorithm = self.registry.get(algorithm)?;
        let elements = self.model.elements();
        let parents: Vec<ElementId> = elements
            .subtree(elements.root_id())
            .into_iter()
            .filter(|id| elements.children(*id).is_ok_and(|c| c.len() > 1))
            .collect();

        let mut tracker = ProgressTracker::new(progress, "Partitioning", "elements", parents.len());
        for (done, parent) in parents.iter().enumerate() {
            let siblings = self.model.elements().children(*parent)?.to_vec();
            let result = algorithm.sort(&self.model, &siblings, None);
            if !result.is_identity() {
                self.model.reorder_children(*parent, &result.order)?;
            }
            tracker.update(done + 1);
        }
        Ok(())
    }

    // ===== Query API =====

    pub fn root_id(&self) -> ElementId {
        self.model.elements().root_id()
    }

    /// # Errors
    ///
    /// Returns `ElementNotFound` / `ElementDeleted`.
    pub fn element(&self, id: ElementId) -> Result<&Element> {
        self.model.elements().get(id)
    }

    /// # Errors
    ///
    /// Returns `ElementNotFound` / `ElementDeleted`.
    pub fn children(&self, id: ElementId) -> Result<&[ElementId]> {
        self.model.elements().children(id)
    }

    pub fn parent(&self, id: ElementId) -> Option<ElementId> {
        self.model.elements().get(id).ok().and_then(|e| e.parent)
    }

    pub fn next_sibling(&self, id: ElementId) -> Option<ElementId> {
        self.model.elements().next_sibling(id)
    }

    pub fn previous_sibling(&self, id: ElementId) -> Option<ElementId> {
        self.model.elements().previous_sibling(id)
    }

    pub fn is_first_child(&self, id: ElementId) -> bool {
        self.model.elements().is_first_child(id)
    }

    pub fn is_last_child(&self, id: ElementId) -> bool {
        self.model.elements().is_last_child(id)
    }

    /// # Errors
    ///
    /// Returns `ElementNotFound` / `ElementDeleted`.
    pub fn full_name(&self, id: ElementId) -> Result<String> {
        self.model.elements().full_name(id)
    }

    /// Collapse or expand an element in the matrix view; not journaled
    ///
    /// # Errors
    ///
    /// Returns `ElementNotFound` / `ElementDeleted`.
    pub fn set_element_expanded(&mut self, id: ElementId, expanded: bool) -> Result<()> {
        self.model.set_element_expanded(id, expanded)
    }

    pub fn find_element(&self, full_name: &str) -> Option<ElementId> {
        self.model.elements().find_by_full_name(full_name)
    }

    /// Live elements whose full name contains `text`, in depth-first order
    pub fn search_elements(&self, text: &str) -> Vec<ElementId> {
        let elements = self.model.elements();
        let needle = if self.config.case_sensitive_search {
            text.to_string()
        } else {
            text.to_lowercase()
        };
        elements
            .subtree(elements.root_id())
            .into_iter()
            .filter(|id| !id.is_root())
            .filter(|id| {
                elements.full_name(*id).is_ok_and(|name| {
                    if self.config.case_sensitive_search {
                        name.contains(&needle)
                    } else {
                        name.to_lowercase().contains(&needle)
                    }
                })
            })
            .collect()
    }

    /// Live elements, excluding the root
    pub fn element_count(&self) -> usize {
        self.model.elements().len().saturating_sub(1)
    }

    /// Number of live elements in the subtree of `id`, itself included
    pub fn element_size(&self, id: ElementId) -> usize {
        if !self.model.elements().contains(id) {
            return 0;
        }
        self.model.elements().subtree(id).len()
    }

    pub fn meta_data_groups(&self) -> Vec<&str> {
        self.model.meta_data().groups().collect()
    }

    pub fn meta_data_items(&self, group: &str) -> &[MetaDataItem] {
        self.model.meta_data().items(group)
    }

    pub fn dependency_weight(&self, consumer: ElementId, provider: ElementId) -> u64 {
        self.model.dependency_weight(consumer, provider)
    }

    pub fn direct_dependency_weight(&self, consumer: ElementId, provider: ElementId) -> u64 {
        self.model.direct_dependency_weight(consumer, provider)
    }

    pub fn is_cyclic_dependency(&self, consumer: ElementId, provider: ElementId) -> CycleType {
        analysis::is_cyclic_dependency(&self.model, consumer, provider)
    }

    pub fn hierarchical_cycle_count(&self, element: ElementId) -> usize {
        analysis::hierarchical_cycle_count(&self.model, element)
    }

    pub fn system_cycle_count(&self, element: ElementId) -> usize {
        analysis::system_cycle_count(&self.model, element)
    }

    /// # Errors
    ///
    /// Returns `RelationNotFound` / `RelationDeleted`.
    pub fn relation(&self, id: RelationId) -> Result<&Relation> {
        self.model.relations().get(id)
    }

    pub fn find_relations(&self, consumer: ElementId, provider: ElementId) -> Vec<&Relation> {
        analysis::find_relations(&self.model, consumer, provider)
    }

    pub fn find_resolved_relations(&self, consumer: ElementId, provider: ElementId) -> Vec<&Relation> {
        analysis::find_resolved_relations(&self.model, consumer, provider)
    }

    pub fn find_ingoing_relations(&self, element: ElementId) -> Vec<&Relation> {
        analysis::find_ingoing_relations(&self.model, element)
    }

    pub fn find_outgoing_relations(&self, element: ElementId) -> Vec<&Relation> {
        analysis::find_outgoing_relations(&self.model, element)
    }

    pub fn find_internal_relations(&self, element: ElementId) -> Vec<&Relation> {
        analysis::find_internal_relations(&self.model, element)
    }

    pub fn find_external_relations(&self, element: ElementId) -> Vec<&Relation> {
        analysis::find_external_relations(&self.model, element)
    }

    pub fn element_providers(&self, element: ElementId) -> Vec<ElementId> {
        analysis::element_providers(&self.model, element)
    }

    pub fn element_consumers(&self, element: ElementId) -> Vec<ElementId> {
        analysis::element_consumers(&self.model, element)
    }

    pub fn relation_providers(&self, consumer: ElementId, provider: ElementId) -> Vec<ElementId> {
        analysis::relation_providers(&self.model, consumer, provider)
    }

    pub fn relation_consumers(&self, consumer: ElementId, provider: ElementId) -> Vec<ElementId> {
        analysis::relation_consumers(&self.model, consumer, provider)
    }

    pub fn supported_sort_algorithms(&self) -> Vec<SortAlgorithmId> {
        self.registry.supported()
    }

    /// Reorder the children of `element` with the algorithm named `algorithm`
    ///
    /// A non-identity result is recorded as an undoable `ElementSort` action.
    ///
    /// # Errors
    ///
    /// Returns `UnknownSortAlgorithm` for unregistered names and existence
    /// errors for `element`.
    pub fn sort(
        &mut self,
        element: ElementId,
        algorithm: &str,
        progress: Option<&mut dyn ProgressSink>,
    ) -> Result<SortResult> {
        log_op_start!("sort", element_id = element.get(), algorithm);
        let start = Instant::now();

        let result = self.sort_impl(element, algorithm, progress).map_err(|e| {
            log_op_error!("sort", e.clone(), duration_ms = elapsed_ms(start));
            e
        })?;

        log_op_end!(
            "sort",
            duration_ms = elapsed_ms(start),
            cluster_count = result.clusters.len()
        );
        Ok(result)
    }

    fn sort_impl(
        &mut self,
        element: ElementId,
        algorithm: &str,
        progress: Option<&mut dyn ProgressSink>,
    ) -> Result<SortResult> {
        let algorithm = self.registry.get_by_name(algorithm)?;
        let siblings = self.model.elements().children(element)?.to_vec();
        let result = algorithm.sort(&self.model, &siblings, progress);
        if !result.is_identity() {
            let action = Action::ElementSort {
                element,
                order: result.order.clone(),
            };
            self.journal.record(&mut self.model, action)?;
            self.modified = true;
        }
        Ok(result)
    }

    // ===== Mutation API =====

    fn record(&mut self, op: &'static str, action: Action) -> Result<()> {
        log_action_start!(op, &action);
        let start = Instant::now();
        let action_type = action.action_type();

        self.journal.record(&mut self.model, action).map_err(|e| {
            log_action_error!(op, action_type, e.clone(), duration_ms = elapsed_ms(start));
            e
        })?;
        self.modified = true;

        log_action_end!(op, self.last_recorded()?, duration_ms = elapsed_ms(start));
        Ok(())
    }

    fn last_recorded(&self) -> Result<&Action> {
        self.journal.actions().last().ok_or_else(|| DsmError::Internal {
            message: "journal is empty after recording".to_string(),
        })
    }

    /// Create a child of `parent`, appended or inserted at `index`
    ///
    /// # Errors
    ///
    /// Returns `DuplicateName` / `InvalidName` or existence errors for
    /// `parent`.
    pub fn create_element(
        &mut self,
        parent: ElementId,
        name: &str,
        element_type: &str,
        annotation: Option<&str>,
        index: Option<usize>,
    ) -> Result<ElementId> {
        let action = Action::element_create(parent, name, element_type, annotation, index);
        self.record("create_element", action)?;
        match self.last_recorded()? {
            Action::ElementCreate {
                created: Some(id), ..
            } => Ok(*id),
            _ => Err(DsmError::Internal {
                message: "created element id was not recorded".to_string(),
            }),
        }
    }

    /// Delete an element, its descendants and their relations
    ///
    /// # Errors
    ///
    /// Returns `CannotDelete` for the root and existence errors otherwise.
    pub fn delete_element(&mut self, element: ElementId) -> Result<()> {
        let action = Action::element_delete(&self.model, element)?;
        self.record("delete_element", action)
    }

    /// # Errors
    ///
    /// Returns `InvalidName`, `DuplicateName` or existence errors.
    pub fn change_element_name(&mut self, element: ElementId, name: &str) -> Result<()> {
        let action = Action::element_change_name(&self.model, element, name)?;
        self.record("change_element_name", action)
    }

    /// # Errors
    ///
    /// Returns existence errors.
    pub fn change_element_type(&mut self, element: ElementId, element_type: &str) -> Result<()> {
        let action = Action::element_change_type(&self.model, element, element_type)?;
        self.record("change_element_type", action)
    }

    /// # Errors
    ///
    /// Returns existence errors.
    pub fn change_element_annotation(
        &mut self,
        element: ElementId,
        annotation: Option<&str>,
    ) -> Result<()> {
        let action = Action::element_change_annotation(&self.model, element, annotation)?;
        self.record("change_element_annotation", action)
    }

    /// Move `element` under `new_parent` at `index`
    ///
    /// # Errors
    ///
    /// Returns `CycleDetected` when `new_parent` lies in the subtree of
    /// `element`, `IllegalReparent` for the root and `DuplicateName` on a
    /// name clash. The model is unchanged then.
    pub fn change_element_parent(
        &mut self,
        element: ElementId,
        new_parent: ElementId,
        index: usize,
    ) -> Result<()> {
        let action = Action::element_change_parent(&self.model, element, new_parent, index)?;
        self.record("change_element_parent", action)
    }

    /// # Errors
    ///
    /// Returns `IllegalMove` for a first child and existence errors.
    pub fn move_element_up(&mut self, element: ElementId) -> Result<()> {
        self.model.elements().get(element)?;
        self.record("move_element_up", Action::ElementMoveUp { element })
    }

    /// # Errors
    ///
    /// Returns `IllegalMove` for a last child and existence errors.
    pub fn move_element_down(&mut self, element: ElementId) -> Result<()> {
        self.model.elements().get(element)?;
        self.record("move_element_down", Action::ElementMoveDown { element })
    }

    /// Create or strengthen a relation
    ///
    /// Returns `None` and records nothing for self relations and relations
    /// whose endpoints are not live.
    ///
    /// # Errors
    ///
    /// Returns `WeightOverflow` when merging into an existing relation would
    /// exceed `u32::MAX`; nothing is recorded then. Endpoint problems yield
    /// `Ok(None)`.
    pub fn create_relation(
        &mut self,
        consumer: ElementId,
        provider: ElementId,
        relation_type: &str,
        weight: u32,
        annotation: Option<&str>,
    ) -> Result<Option<RelationId>> {
        let elements = self.model.elements();
        if consumer == provider || !elements.contains(consumer) || !elements.contains(provider) {
            tracing::debug!(
                consumer_id = consumer.get(),
                provider_id = provider.get(),
                "relation not created"
            );
            return Ok(None);
        }
        let action = Action::relation_create(consumer, provider, relation_type, weight, annotation);
        self.record("create_relation", action)?;
        match self.last_recorded()? {
            Action::RelationCreate {
                created: Some(id), ..
            } => Ok(Some(*id)),
            _ => Err(DsmError::Internal {
                message: "created relation id was not recorded".to_string(),
            }),
        }
    }

    /// # Errors
    ///
    /// Returns `RelationNotFound` / `RelationDeleted`.
    pub fn delete_relation(&mut self, relation: RelationId) -> Result<()> {
        self.model.relations().get(relation)?;
        self.record("delete_relation", Action::RelationDelete { relation })
    }

    /// # Errors
    ///
    /// Returns `DuplicateRelation` when the new key is taken and existence
    /// errors.
    pub fn change_relation_type(&mut self, relation: RelationId, relation_type: &str) -> Result<()> {
        let action = Action::relation_change_type(&self.model, relation, relation_type)?;
        self.record("change_relation_type", action)
    }

    /// # Errors
    ///
    /// Returns existence errors.
    pub fn change_relation_weight(&mut self, relation: RelationId, weight: u32) -> Result<()> {
        let action = Action::relation_change_weight(&self.model, relation, weight)?;
        self.record("change_relation_weight", action)
    }

    // ===== History =====

    /// Revert the latest action; `false` when there is nothing to undo
    ///
    /// # Errors
    ///
    /// Propagates the action's error.
    pub fn undo(&mut self) -> Result<bool> {
        log_op_start!("undo");
        let start = Instant::now();

        let undone = self.journal.undo(&mut self.model).map_err(|e| {
            log_op_error!("undo", e.clone(), duration_ms = elapsed_ms(start));
            e
        })?;
        self.modified |= undone;

        log_op_end!("undo", duration_ms = elapsed_ms(start), undone);
        Ok(undone)
    }

    /// Re-apply the next undone action; `false` when there is nothing to redo
    ///
    /// # Errors
    ///
    /// Propagates the action's error.
    pub fn redo(&mut self) -> Result<bool> {
        log_op_start!("redo");
        let start = Instant::now();

        let redone = self.journal.redo(&mut self.model).map_err(|e| {
            log_op_error!("redo", e.clone(), duration_ms = elapsed_ms(start));
            e
        })?;
        self.modified |= redone;

        log_op_end!("redo", duration_ms = elapsed_ms(start), redone);
        Ok(redone)
    }

    pub fn can_undo(&self) -> bool {
        self.journal.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.journal.can_redo()
    }

    pub fn undo_description(&self) -> Option<String> {
        self.journal.undo_description(&self.model)
    }

    pub fn redo_description(&self) -> Option<String> {
        self.journal.redo_description(&self.model)
    }

    /// Applied actions, oldest first
    pub fn actions(&self) -> &[Action] {
        self.journal.actions()
    }

    pub fn clear_actions(&mut self) {
        self.journal.clear();
        self.modified = false;
    }

    /// True once anything was recorded, undone or redone since the last
    /// import, clear or load
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// # Errors
    ///
    /// Fails if the model digest cannot be computed.
    pub fn make_snapshot(&mut self, name: &str) -> Result<()> {
        let action = Action::snapshot(&self.model, name)?;
        self.record("make_snapshot", action)
    }

    pub fn export_actions(&self) -> Vec<ActionRecord> {
        self.journal.export()
    }

    /// Install a saved history for a model that already reflects it
    ///
    /// # Errors
    ///
    /// Returns `UnknownActionType` / `InvalidActionData` for records that do
    /// not decode against the current model. The history is unchanged then.
    pub fn load_actions(&mut self, records: &[ActionRecord]) -> Result<()> {
        log_op_start!("load_actions", record_count = records.len());
        let start = Instant::now();

        let actions = records
            .iter()
            .map(|r| Action::from_record(&self.model, r))
            .collect::<Result<Vec<_>>>()
            .map_err(|e| {
                log_op_error!("load_actions", e.clone(), duration_ms = elapsed_ms(start));
                e
            })?;
        self.journal.load(actions);
        self.modified = false;

        log_op_end!("load_actions", duration_ms = elapsed_ms(start));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn imported() -> (DsmCore, ElementId, ElementId) {
        let mut core = DsmCore::new();
        let a = core.import_element("Pkg.A", "A", "class", None, None).unwrap();
        let b = core.import_element("Pkg.B", "B", "class", None, None).unwrap();
        core.import_relation(a, b, "call", 3, None);
        core.import_relation(b, a, "call", 2, None);
        core.finalize_import(None).unwrap();
        (core, a, b)
    }

    #[test]
    fn test_import_skips_unknown_and_self_relations() {
        let (mut core, a, _) = imported();
        assert_eq!(core.import_relation(a, ElementId(99), "call", 1, None), None);
        assert_eq!(core.import_relation(a, a, "call", 1, None), None);
        assert_eq!(core.model().relations().len(), 2);
    }

    #[test]
    fn test_finalize_import_starts_clean_history() {
        let (core, _, _) = imported();
        assert!(!core.is_modified());
        assert!(!core.can_undo());
        assert_eq!(core.element_count(), 3);
    }

    #[test]
    fn test_mutation_is_undoable() {
        let (mut core, a, _) = imported();
        core.change_element_name(a, "Alpha").unwrap();
        assert!(core.is_modified());
        assert_eq!(core.find_element("Pkg.Alpha"), Some(a));
        assert!(core.undo().unwrap());
        assert_eq!(core.find_element("Pkg.A"), Some(a));
        assert!(core.redo().unwrap());
        assert!(!core.redo().unwrap());
    }

    #[test]
    fn test_create_relation_on_self_records_nothing() {
        let (mut core, a, _) = imported();
        assert_eq!(core.create_relation(a, a, "call", 1, None).unwrap(), None);
        assert!(!core.can_undo());
    }

    #[test]
    fn test_create_element_returns_new_id() {
        let (mut core, _, _) = imported();
        let pkg = core.find_element("Pkg").unwrap();
        let c = core.create_element(pkg, "C", "class", None, Some(0)).unwrap();
        assert_eq!(core.children(pkg).unwrap()[0], c);
        core.undo().unwrap();
        assert!(core.element(c).is_err());
        core.redo().unwrap();
        assert_eq!(core.full_name(c).unwrap(), "Pkg.C");
    }

    #[test]
    fn test_sort_unknown_algorithm() {
        let (mut core, _, _) = imported();
        let pkg = core.find_element("Pkg").unwrap();
        let result = core.sort(pkg, "Bogus", None);
        assert!(matches!(result, Err(DsmError::UnknownSortAlgorithm { .. })));
    }

    #[test]
    fn test_alphabetical_sort_is_undoable() {
        let mut core = DsmCore::new();
        let zeta = core.import_element("Pkg.zeta", "zeta", "class", None, None).unwrap();
        let alpha = core.import_element("Pkg.Alpha", "Alpha", "class", None, None).unwrap();
        core.finalize_import(None).unwrap();
        let pkg = core.find_element("Pkg").unwrap();

        let result = core.sort(pkg, "alphabetical", None).unwrap();
        assert_eq!(result.order, vec![1, 0]);
        assert_eq!(core.children(pkg).unwrap(), &[alpha, zeta]);
        core.undo().unwrap();
        assert_eq!(core.children(pkg).unwrap(), &[zeta, alpha]);
    }

    #[test]
    fn test_search_respects_case_setting() {
        let (core, a, b) = imported();
        assert_eq!(core.search_elements("pkg."), vec![a, b]);

        let mut sensitive = DsmCore::with_config(DsmConfig {
            case_sensitive_search: true,
            ..DsmConfig::default()
        });
        sensitive.import_element("Pkg.A", "A", "class", None, None).unwrap();
        assert!(sensitive.search_elements("pkg").is_empty());
        assert_eq!(sensitive.search_elements("Pkg").len(), 2);
    }

    #[test]
    fn test_auto_partition_orders_providers_first() {
        let mut core = DsmCore::with_config(DsmConfig {
            auto_partition: true,
            ..DsmConfig::default()
        });
        let a = core.import_element("A", "A", "class", None, None).unwrap();
        let b = core.import_element("B", "B", "class", None, None).unwrap();
        core.import_relation(a, b, "call", 1, None);
        core.finalize_import(None).unwrap();
        assert_eq!(core.children(core.root_id()).unwrap(), &[b, a]);
        assert!(!core.can_undo());
    }

    #[test]
    fn test_expanding_is_not_journaled() {
        let (mut core, _, _) = imported();
        let pkg = core.find_element("Pkg").unwrap();
        core.set_element_expanded(pkg, true).unwrap();
        assert!(core.element(pkg).unwrap().expanded);
        assert!(!core.can_undo());
    }

    #[test]
    fn test_meta_data() {
        let mut core = DsmCore::new();
        core.import_meta_data_item("Analyzer", "Name", "cpp");
        core.import_meta_data_item("Analyzer", "Name", "java");
        assert_eq!(core.meta_data_groups(), vec!["Analyzer"]);
        assert_eq!(core.meta_data_items("Analyzer")[0].value, "java");
    }
}
