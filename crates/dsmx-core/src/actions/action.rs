//! Invertible model mutations
//!
//! Every interactive edit is an `Action`. An action carries exactly the state
//! it needs to be undone, is applied through `apply` and reverted through
//! `undo`, and can be flattened to an `ActionRecord` for persistence.
//!
//! Actions that create things remember the ids they created. Applying them a
//! second time (redo) revives those ids instead of allocating new ones, so
//! later actions in the history keep pointing at the right entities.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use dsmx_core_types::{ElementId, RelationId};
use serde::{Deserialize, Serialize};

use crate::actions::attributes::{ActionAttributes, ActionReadOnlyAttributes};
use crate::digest::model_digest;
use crate::errors::{DsmError, Result};
use crate::ops::DsmModel;
use crate::sorting::invert_permutation;

/// Tag of each action variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionType {
    ElementCreate,
    ElementDelete,
    ElementChangeName,
    ElementChangeType,
    ElementChangeAnnotation,
    ElementChangeParent,
    ElementMoveUp,
    ElementMoveDown,
    ElementSort,
    RelationCreate,
    RelationDelete,
    RelationChangeType,
    RelationChangeWeight,
    Snapshot,
}

impl ActionType {
    pub fn as_str(self) -> &'static str {
        match self {
            ActionType::ElementCreate => "ElementCreate",
            ActionType::ElementDelete => "ElementDelete",
            ActionType::ElementChangeName => "ElementChangeName",
            ActionType::ElementChangeType => "ElementChangeType",
            ActionType::ElementChangeAnnotation => "ElementChangeAnnotation",
            ActionType::ElementChangeParent => "ElementChangeParent",
            ActionType::ElementMoveUp => "ElementMoveUp",
            ActionType::ElementMoveDown => "ElementMoveDown",
            ActionType::ElementSort => "ElementSort",
            ActionType::RelationCreate => "RelationCreate",
            ActionType::RelationDelete => "RelationDelete",
            ActionType::RelationChangeType => "RelationChangeType",
            ActionType::RelationChangeWeight => "RelationChangeWeight",
            ActionType::Snapshot => "Snapshot",
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionType {
    type Err = DsmError;

    fn from_str(s: &str) -> Result<Self> {
        ACTION_REGISTRY
            .iter()
            .map(|(action_type, _)| *action_type)
            .find(|t| t.as_str() == s)
            .ok_or_else(|| DsmError::UnknownActionType {
                action_type: s.to_string(),
            })
    }
}

/// Persistable form of an action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRecord {
    pub action_type: String,
    pub data: BTreeMap<String, String>,
}

/// A recorded, invertible mutation
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    ElementCreate {
        parent: ElementId,
        name: String,
        element_type: String,
        annotation: Option<String>,
        index: Option<usize>,
        created: Option<ElementId>,
        removed_relations: Vec<RelationId>,
    },
    ElementDelete {
        element: ElementId,
        parent: Option<ElementId>,
        index: usize,
        relations: Vec<RelationId>,
    },
    ElementChangeName {
        element: ElementId,
        old_name: String,
        new_name: String,
    },
    ElementChangeType {
        element: ElementId,
        old_type: String,
        new_type: String,
    },
    ElementChangeAnnotation {
        element: ElementId,
        old_annotation: Option<String>,
        new_annotation: Option<String>,
    },
    ElementChangeParent {
        element: ElementId,
        old_parent: ElementId,
        old_index: usize,
        new_parent: ElementId,
        new_index: usize,
    },
    ElementMoveUp {
        element: ElementId,
    },
    ElementMoveDown {
        element: ElementId,
    },
    /// `order[new_position] = old_position` over the element's children
    ElementSort {
        element: ElementId,
        order: Vec<usize>,
    },
    RelationCreate {
        consumer: ElementId,
        provider: ElementId,
        relation_type: String,
        weight: u32,
        annotation: Option<String>,
        created: Option<RelationId>,
        /// The weight was folded into an existing relation
        merged: bool,
    },
    RelationDelete {
        relation: RelationId,
    },
    RelationChangeType {
        relation: RelationId,
        old_type: String,
        new_type: String,
    },
    RelationChangeWeight {
        relation: RelationId,
        old_weight: u32,
        new_weight: u32,
    },
    /// Named checkpoint; leaves the model untouched
    Snapshot {
        name: String,
        created_at: DateTime<Utc>,
        model_digest: String,
    },
}

impl Action {
    // ===== Constructors =====

    pub fn element_create(
        parent: ElementId,
        name: &str,
        element_type: &str,
        annotation: Option<&str>,
        index: Option<usize>,
    ) -> Self {
        Action::ElementCreate {
            parent,
            name: name.to_string(),
            element_type: element_type.to_string(),
            annotation: annotation.map(str::to_string),
            index,
            created: None,
            removed_relations: Vec::new(),
        }
    }

    /// # Errors
    ///
    /// Fails if the element is not live.
    pub fn element_delete(model: &DsmModel, element: ElementId) -> Result<Self> {
        model.elements().get(element)?;
        Ok(Action::ElementDelete {
            element,
            parent: None,
            index: 0,
            relations: Vec::new(),
        })
    }

    /// # Errors
    ///
    /// Fails if the element is not live.
    pub fn element_change_name(model: &DsmModel, element: ElementId, new_name: &str) -> Result<Self> {
        Ok(Action::ElementChangeName {
            element,
            old_name: model.elements().get(element)?.name.clone(),
            new_name: new_name.to_string(),
        })
    }

    /// # Errors
    ///
    /// Fails if the element is not live.
    pub fn element_change_type(model: &DsmModel, element: ElementId, new_type: &str) -> Result<Self> {
        Ok(Action::ElementChangeType {
            element,
            old_type: model.elements().get(element)?.element_type.clone(),
            new_type: new_type.to_string(),
        })
    }

    /// # Errors
    ///
    /// Fails if the element is not live.
    pub fn element_change_annotation(
        model: &DsmModel,
        element: ElementId,
        new_annotation: Option<&str>,
    ) -> Result<Self> {
        Ok(Action::ElementChangeAnnotation {
            element,
            old_annotation: model.elements().get(element)?.annotation.clone(),
            new_annotation: new_annotation.map(str::to_string),
        })
    }

    /// Capture the current parent and index of `element`
    ///
    /// # Errors
    ///
    /// Fails for the root and for elements that are not live.
    pub fn element_change_parent(
        model: &DsmModel,
        element: ElementId,
        new_parent: ElementId,
        new_index: usize,
    ) -> Result<Self> {
        let old_parent = model
            .elements()
            .get(element)?
            .parent
            .ok_or_else(|| DsmError::IllegalReparent {
                element_id: element,
                reason: "the root element cannot be moved".to_string(),
            })?;
        let old_index = model
            .elements()
            .index_of_child(old_parent, element)
            .ok_or_else(|| DsmError::Internal {
                message: format!("element {} missing from child list of {}", element, old_parent),
            })?;
        Ok(Action::ElementChangeParent {
            element,
            old_parent,
            old_index,
            new_parent,
            new_index,
        })
    }

    pub fn relation_create(
        consumer: ElementId,
        provider: ElementId,
        relation_type: &str,
        weight: u32,
        annotation: Option<&str>,
    ) -> Self {
        Action::RelationCreate {
            consumer,
            provider,
            relation_type: relation_type.to_string(),
            weight,
            annotation: annotation.map(str::to_string),
            created: None,
            merged: false,
        }
    }

    /// # Errors
    ///
    /// Fails if the relation is not live.
    pub fn relation_change_type(model: &DsmModel, relation: RelationId, new_type: &str) -> Result<Self> {
        Ok(Action::RelationChangeType {
            relation,
            old_type: model.relations().get(relation)?.relation_type.clone(),
            new_type: new_type.to_string(),
        })
    }

    /// # Errors
    ///
    /// Fails if the relation is not live.
    pub fn relation_change_weight(model: &DsmModel, relation: RelationId, new_weight: u32) -> Result<Self> {
        Ok(Action::RelationChangeWeight {
            relation,
            old_weight: model.relations().get(relation)?.weight,
            new_weight,
        })
    }

    /// Checkpoint stamped with the current time and model digest
    ///
    /// # Errors
    ///
    /// Fails if the digest cannot be computed.
    pub fn snapshot(model: &DsmModel, name: &str) -> Result<Self> {
        Ok(Action::Snapshot {
            name: name.to_string(),
            created_at: Utc::now(),
            model_digest: model_digest(model)?,
        })
    }

    // ===== Execution =====

    /// Perform the action
    ///
    /// # Errors
    ///
    /// Propagates the model's precondition errors; the model is unchanged
    /// when an error is returned.
    pub fn apply(&mut self, model: &mut DsmModel) -> Result<()> {
        match self {
            Action::ElementCreate {
                parent,
                name,
                element_type,
                annotation,
                index,
                created,
                removed_relations,
            } => {
                if let Some(id) = created.filter(|id| model.elements().knows(*id)) {
                    let at = index.unwrap_or(usize::MAX);
                    return model.restore_element(id, *parent, at, removed_relations);
                }
                let id = model.add_child_element(
                    *parent,
                    name,
                    element_type,
                    annotation.as_deref(),
                    *index,
                )?;
                *created = Some(id);
                Ok(())
            }
            Action::ElementDelete {
                element,
                parent,
                index,
                relations,
            } => {
                let removed = model.remove_element(*element)?;
                *parent = Some(removed.parent);
                *index = removed.index;
                *relations = removed.relations;
                Ok(())
            }
            Action::ElementChangeName {
                element, new_name, ..
            } => model.rename_element(*element, new_name).map(drop),
            Action::ElementChangeType {
                element, new_type, ..
            } => model.change_element_type(*element, new_type).map(drop),
            Action::ElementChangeAnnotation {
                element,
                new_annotation,
                ..
            } => model
                .change_element_annotation(*element, new_annotation.as_deref())
                .map(drop),
            Action::ElementChangeParent {
                element,
                new_parent,
                new_index,
                ..
            } => model.change_element_parent(*element, *new_parent, *new_index),
            Action::ElementMoveUp { element } => model.move_element_up(*element),
            Action::ElementMoveDown { element } => model.move_element_down(*element),
            Action::ElementSort { element, order } => model.reorder_children(*element, order),
            Action::RelationCreate {
                consumer,
                provider,
                relation_type,
                weight,
                annotation,
                created,
                merged,
            } => {
                if !*merged {
                    if let Some(id) = created.filter(|id| model.relations().knows(*id)) {
                        return model.restore_relation(id);
                    }
                }
                let added = model
                    .add_relation(
                        *consumer,
                        *provider,
                        relation_type,
                        *weight,
                        annotation.as_deref(),
                    )?
                    .ok_or_else(|| DsmError::InvalidActionData {
                        action_type: ActionType::RelationCreate.to_string(),
                        key: "provider".to_string(),
                        reason: "equals the consumer".to_string(),
                    })?;
                *created = Some(added.id);
                *merged = added.merged;
                Ok(())
            }
            Action::RelationDelete { relation } => model.remove_relation(*relation),
            Action::RelationChangeType {
                relation, new_type, ..
            } => model.change_relation_type(*relation, new_type).map(drop),
            Action::RelationChangeWeight {
                relation,
                new_weight,
                ..
            } => model.change_relation_weight(*relation, *new_weight).map(drop),
            Action::Snapshot { .. } => Ok(()),
        }
    }

    /// Revert a previously applied action
    ///
    /// # Errors
    ///
    /// Returns an error if the model no longer matches the state the action
    /// left behind.
    pub fn undo(&mut self, model: &mut DsmModel) -> Result<()> {
        match self {
            Action::ElementCreate {
                created,
                index,
                removed_relations,
                ..
            } => {
                let id = created.ok_or_else(|| not_applied(ActionType::ElementCreate))?;
                let removed = model.remove_element(id)?;
                *index = Some(removed.index);
                *removed_relations = removed.relations;
                Ok(())
            }
            Action::ElementDelete {
                element,
                parent,
                index,
                relations,
            } => {
                let parent = parent.ok_or_else(|| not_applied(ActionType::ElementDelete))?;
                model.restore_element(*element, parent, *index, relations)
            }
            Action::ElementChangeName {
                element, old_name, ..
            } => model.rename_element(*element, old_name).map(drop),
            Action::ElementChangeType {
                element, old_type, ..
            } => model.change_element_type(*element, old_type).map(drop),
            Action::ElementChangeAnnotation {
                element,
                old_annotation,
                ..
            } => model
                .change_element_annotation(*element, old_annotation.as_deref())
                .map(drop),
            Action::ElementChangeParent {
                element,
                old_parent,
                old_index,
                ..
            } => model.change_element_parent(*element, *old_parent, *old_index),
            Action::ElementMoveUp { element } => model.move_element_down(*element),
            Action::ElementMoveDown { element } => model.move_element_up(*element),
            Action::ElementSort { element, order } => {
                model.reorder_children(*element, &invert_permutation(order))
            }
            Action::RelationCreate {
                weight,
                created,
                merged,
                ..
            } => {
                let id = created.ok_or_else(|| not_applied(ActionType::RelationCreate))?;
                if *merged {
                    let current = model.relations().get(id)?.weight;
                    let restored =
                        current
                            .checked_sub(*weight)
                            .ok_or_else(|| DsmError::InvalidActionData {
                                action_type: ActionType::RelationCreate.to_string(),
                                key: "weight".to_string(),
                                reason: format!("exceeds current weight {}", current),
                            })?;
                    model.change_relation_weight(id, restored).map(drop)
                } else {
                    model.remove_relation(id)
                }
            }
            Action::RelationDelete { relation } => model.restore_relation(*relation),
            Action::RelationChangeType {
                relation, old_type, ..
            } => model.change_relation_type(*relation, old_type).map(drop),
            Action::RelationChangeWeight {
                relation,
                old_weight,
                ..
            } => model.change_relation_weight(*relation, *old_weight).map(drop),
            Action::Snapshot { .. } => Ok(()),
        }
    }

    // ===== Presentation =====

    pub fn action_type(&self) -> ActionType {
        match self {
            Action::ElementCreate { .. } => ActionType::ElementCreate,
            Action::ElementDelete { .. } => ActionType::ElementDelete,
            Action::ElementChangeName { .. } => ActionType::ElementChangeName,
            Action::ElementChangeType { .. } => ActionType::ElementChangeType,
            Action::ElementChangeAnnotation { .. } => ActionType::ElementChangeAnnotation,
            Action::ElementChangeParent { .. } => ActionType::ElementChangeParent,
            Action::ElementMoveUp { .. } => ActionType::ElementMoveUp,
            Action::ElementMoveDown { .. } => ActionType::ElementMoveDown,
            Action::ElementSort { .. } => ActionType::ElementSort,
            Action::RelationCreate { .. } => ActionType::RelationCreate,
            Action::RelationDelete { .. } => ActionType::RelationDelete,
            Action::RelationChangeType { .. } => ActionType::RelationChangeType,
            Action::RelationChangeWeight { .. } => ActionType::RelationChangeWeight,
            Action::Snapshot { .. } => ActionType::Snapshot,
        }
    }

    /// Element the action works on, once known
    ///
    /// `ElementCreate` reports the created element after it was applied.
    pub fn element_id(&self) -> Option<ElementId> {
        match self {
            Action::ElementCreate { created, .. } => *created,
            Action::ElementDelete { element, .. }
            | Action::ElementChangeName { element, .. }
            | Action::ElementChangeType { element, .. }
            | Action::ElementChangeAnnotation { element, .. }
            | Action::ElementChangeParent { element, .. }
            | Action::ElementMoveUp { element }
            | Action::ElementMoveDown { element }
            | Action::ElementSort { element, .. } => Some(*element),
            Action::RelationCreate { consumer, .. } => Some(*consumer),
            Action::RelationDelete { .. }
            | Action::RelationChangeType { .. }
            | Action::RelationChangeWeight { .. }
            | Action::Snapshot { .. } => None,
        }
    }

    /// Relation the action works on, once known
    pub fn relation_id(&self) -> Option<RelationId> {
        match self {
            Action::RelationCreate { created, .. } => *created,
            Action::RelationDelete { relation }
            | Action::RelationChangeType { relation, .. }
            | Action::RelationChangeWeight { relation, .. } => Some(*relation),
            _ => None,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Action::ElementCreate { .. } => "Create element",
            Action::ElementDelete { .. } => "Delete element",
            Action::ElementChangeName { .. } => "Change element name",
            Action::ElementChangeType { .. } => "Change element type",
            Action::ElementChangeAnnotation { .. } => "Change element annotation",
            Action::ElementChangeParent { .. } => "Change element parent",
            Action::ElementMoveUp { .. } => "Move up element",
            Action::ElementMoveDown { .. } => "Move down element",
            Action::ElementSort { .. } => "Sort element",
            Action::RelationCreate { .. } => "Create relation",
            Action::RelationDelete { .. } => "Delete relation",
            Action::RelationChangeType { .. } => "Change relation type",
            Action::RelationChangeWeight { .. } => "Change relation weight",
            Action::Snapshot { .. } => "Snapshot",
        }
    }

    /// One-line summary naming the affected entities
    pub fn description(&self, model: &DsmModel) -> String {
        let element = |id: ElementId| element_label(model, id);
        match self {
            Action::ElementCreate {
                parent,
                name,
                element_type,
                ..
            } => format!("parent={} name={} type={}", element(*parent), name, element_type),
            Action::ElementDelete { element: id, .. } => format!("element={}", element(*id)),
            Action::ElementChangeName {
                element: id,
                old_name,
                new_name,
            } => format!("element={} name={}->{}", element(*id), old_name, new_name),
            Action::ElementChangeType {
                element: id,
                old_type,
                new_type,
            } => format!("element={} type={}->{}", element(*id), old_type, new_type),
            Action::ElementChangeAnnotation { element: id, .. } => {
                format!("element={}", element(*id))
            }
            Action::ElementChangeParent {
                element: id,
                old_parent,
                new_parent,
                ..
            } => format!(
                "element={} parent={}->{}",
                element(*id),
                element(*old_parent),
                element(*new_parent)
            ),
            Action::ElementMoveUp { element: id } | Action::ElementMoveDown { element: id } => {
                format!("element={}", element(*id))
            }
            Action::ElementSort { element: id, order } => {
                format!("element={} order={:?}", element(*id), order)
            }
            Action::RelationCreate {
                consumer,
                provider,
                relation_type,
                weight,
                ..
            } => format!(
                "consumer={} provider={} type={} weight={}",
                element(*consumer),
                element(*provider),
                relation_type,
                weight
            ),
            Action::RelationDelete { relation } => relation_label(model, *relation),
            Action::RelationChangeType {
                relation,
                old_type,
                new_type,
            } => format!(
                "{} type={}->{}",
                relation_label(model, *relation),
                old_type,
                new_type
            ),
            Action::RelationChangeWeight {
                relation,
                old_weight,
                new_weight,
            } => format!(
                "{} weight={}->{}",
                relation_label(model, *relation),
                old_weight,
                new_weight
            ),
            Action::Snapshot { name, .. } => format!("name={}", name),
        }
    }

    // ===== Persistence =====

    /// Flatten to a string map
    pub fn to_record(&self) -> ActionRecord {
        let mut a = ActionAttributes::new();
        match self {
            Action::ElementCreate {
                parent,
                name,
                element_type,
                annotation,
                index,
                created,
                removed_relations,
            } => {
                a.set_element("parent", *parent);
                a.set_string("name", name);
                a.set_string("type", element_type);
                a.set_optional_string("annotation", annotation.as_deref());
                if let Some(index) = index {
                    a.set_usize("index", *index);
                }
                if let Some(created) = created {
                    a.set_element("created", *created);
                }
                a.set_relation_list("removed_relations", removed_relations);
            }
            Action::ElementDelete {
                element,
                parent,
                index,
                relations,
            } => {
                a.set_element("element", *element);
                if let Some(parent) = parent {
                    a.set_element("parent", *parent);
                }
                a.set_usize("index", *index);
                a.set_relation_list("relations", relations);
            }
            Action::ElementChangeName {
                element,
                old_name,
                new_name,
            } => {
                a.set_element("element", *element);
                a.set_string("old_name", old_name);
                a.set_string("new_name", new_name);
            }
            Action::ElementChangeType {
                element,
                old_type,
                new_type,
            } => {
                a.set_element("element", *element);
                a.set_string("old_type", old_type);
                a.set_string("new_type", new_type);
            }
            Action::ElementChangeAnnotation {
                element,
                old_annotation,
                new_annotation,
            } => {
                a.set_element("element", *element);
                a.set_optional_string("old_annotation", old_annotation.as_deref());
                a.set_optional_string("new_annotation", new_annotation.as_deref());
            }
            Action::ElementChangeParent {
                element,
                old_parent,
                old_index,
                new_parent,
                new_index,
            } => {
                a.set_element("element", *element);
                a.set_element("old_parent", *old_parent);
                a.set_usize("old_index", *old_index);
                a.set_element("new_parent", *new_parent);
                a.set_usize("new_index", *new_index);
            }
            Action::ElementMoveUp { element } | Action::ElementMoveDown { element } => {
                a.set_element("element", *element);
            }
            Action::ElementSort { element, order } => {
                a.set_element("element", *element);
                a.set_usize_list("order", order);
            }
            Action::RelationCreate {
                consumer,
                provider,
                relation_type,
                weight,
                annotation,
                created,
                merged,
            } => {
                a.set_element("consumer", *consumer);
                a.set_element("provider", *provider);
                a.set_string("type", relation_type);
                a.set_u32("weight", *weight);
                a.set_optional_string("annotation", annotation.as_deref());
                if let Some(created) = created {
                    a.set_relation("created", *created);
                }
                a.set_bool("merged", *merged);
            }
            Action::RelationDelete { relation } => {
                a.set_relation("relation", *relation);
            }
            Action::RelationChangeType {
                relation,
                old_type,
                new_type,
            } => {
                a.set_relation("relation", *relation);
                a.set_string("old_type", old_type);
                a.set_string("new_type", new_type);
            }
            Action::RelationChangeWeight {
                relation,
                old_weight,
                new_weight,
            } => {
                a.set_relation("relation", *relation);
                a.set_u32("old_weight", *old_weight);
                a.set_u32("new_weight", *new_weight);
            }
            Action::Snapshot {
                name,
                created_at,
                model_digest,
            } => {
                a.set_string("name", name);
                a.set_timestamp("created_at", *created_at);
                a.set_string("model_digest", model_digest);
            }
        }
        ActionRecord {
            action_type: self.action_type().to_string(),
            data: a.into_data(),
        }
    }

    /// Rebuild an action from its record; ids must be known to `model`
    ///
    /// # Errors
    ///
    /// * `UnknownActionType` - the tag is not registered
    /// * `InvalidActionData` - a key is missing, malformed or names an
    ///   unknown id
    pub fn from_record(model: &DsmModel, record: &ActionRecord) -> Result<Self> {
        let action_type: ActionType = record.action_type.parse()?;
        let decode = ACTION_REGISTRY
            .iter()
            .find(|(t, _)| *t == action_type)
            .map(|(_, decode)| *decode)
            .ok_or_else(|| DsmError::UnknownActionType {
                action_type: record.action_type.clone(),
            })?;
        let attributes = ActionReadOnlyAttributes::new(model, &record.action_type, &record.data);
        decode(&attributes)
    }
}

fn not_applied(action_type: ActionType) -> DsmError {
    DsmError::Internal {
        message: format!("{} was never applied", action_type),
    }
}

fn element_label(model: &DsmModel, id: ElementId) -> String {
    match model.elements().full_name(id) {
        Ok(name) => name,
        Err(_) => model
            .elements()
            .get_raw(id)
            .map(|e| e.name.clone())
            .unwrap_or_else(|| format!("#{}", id)),
    }
}

fn relation_label(model: &DsmModel, id: RelationId) -> String {
    match model.relations().get_raw(id) {
        Some(r) => format!(
            "consumer={} provider={} type={}",
            element_label(model, r.consumer),
            element_label(model, r.provider),
            r.relation_type
        ),
        None => format!("relation=#{}", id),
    }
}

// ===== Registry =====

type DecodeFn = fn(&ActionReadOnlyAttributes<'_>) -> Result<Action>;

/// Decoders keyed by tag; every `ActionType` has exactly one entry
static ACTION_REGISTRY: &[(ActionType, DecodeFn)] = &[
    (ActionType::ElementCreate, decode_element_create),
    (ActionType::ElementDelete, decode_element_delete),
    (ActionType::ElementChangeName, decode_element_change_name),
    (ActionType::ElementChangeType, decode_element_change_type),
    (ActionType::ElementChangeAnnotation, decode_element_change_annotation),
    (ActionType::ElementChangeParent, decode_element_change_parent),
    (ActionType::ElementMoveUp, decode_element_move_up),
    (ActionType::ElementMoveDown, decode_element_move_down),
    (ActionType::ElementSort, decode_element_sort),
    (ActionType::RelationCreate, decode_relation_create),
    (ActionType::RelationDelete, decode_relation_delete),
    (ActionType::RelationChangeType, decode_relation_change_type),
    (ActionType::RelationChangeWeight, decode_relation_change_weight),
    (ActionType::Snapshot, decode_snapshot),
];

fn decode_element_create(a: &ActionReadOnlyAttributes<'_>) -> Result<Action> {
    Ok(Action::ElementCreate {
        parent: a.get_element("parent")?,
        name: a.get_string("name")?,
        element_type: a.get_string("type")?,
        annotation: a.get_optional_string("annotation"),
        index: a.get_optional_usize("index")?,
        created: a.get_optional_element("created")?,
        removed_relations: a.get_relation_list("removed_relations")?,
    })
}

fn decode_element_delete(a: &ActionReadOnlyAttributes<'_>) -> Result<Action> {
    Ok(Action::ElementDelete {
        element: a.get_element("element")?,
        parent: a.get_optional_element("parent")?,
        index: a.get_usize("index")?,
        relations: a.get_relation_list("relations")?,
    })
}

fn decode_element_change_name(a: &ActionReadOnlyAttributes<'_>) -> Result<Action> {
    Ok(Action::ElementChangeName {
        element: a.get_element("element")?,
        old_name: a.get_string("old_name")?,
        new_name: a.get_string("new_name")?,
    })
}

fn decode_element_change_type(a: &ActionReadOnlyAttributes<'_>) -> Result<Action> {
    Ok(Action::ElementChangeType {
        element: a.get_element("element")?,
        old_type: a.get_string("old_type")?,
        new_type: a.get_string("new_type")?,
    })
}

fn decode_element_change_annotation(a: &ActionReadOnlyAttributes<'_>) -> Result<Action> {
    Ok(Action::ElementChangeAnnotation {
        element: a.get_element("element")?,
        old_annotation: a.get_optional_string("old_annotation"),
        new_annotation: a.get_optional_string("new_annotation"),
    })
}

fn decode_element_change_parent(a: &ActionReadOnlyAttributes<'_>) -> Result<Action> {
    Ok(Action::ElementChangeParent {
        element: a.get_element("element")?,
        old_parent: a.get_element("old_parent")?,
        old_index: a.get_usize("old_index")?,
        new_parent: a.get_element("new_parent")?,
        new_index: a.get_usize("new_index")?,
    })
}

fn decode_element_move_up(a: &ActionReadOnlyAttributes<'_>) -> Result<Action> {
    Ok(Action::ElementMoveUp {
        element: a.get_element("element")?,
    })
}

fn decode_element_move_down(a: &ActionReadOnlyAttributes<'_>) -> Result<Action> {
    Ok(Action::ElementMoveDown {
        element: a.get_element("element")?,
    })
}

fn decode_element_sort(a: &ActionReadOnlyAttributes<'_>) -> Result<Action> {
    Ok(Action::ElementSort {
        element: a.get_element("element")?,
        order: a.get_usize_list("order")?,
    })
}

fn decode_relation_create(a: &ActionReadOnlyAttributes<'_>) -> Result<Action> {
    Ok(Action::RelationCreate {
        consumer: a.get_element("consumer")?,
        provider: a.get_element("provider")?,
        relation_type: a.get_string("type")?,
        weight: a.get_u32("weight")?,
        annotation: a.get_optional_string("annotation"),
        created: a.get_optional_relation("created")?,
        merged: a.get_bool("merged")?,
    })
}

fn decode_relation_delete(a: &ActionReadOnlyAttributes<'_>) -> Result<Action> {
    Ok(Action::RelationDelete {
        relation: a.get_relation("relation")?,
    })
}

fn decode_relation_change_type(a: &ActionReadOnlyAttributes<'_>) -> Result<Action> {
    Ok(Action::RelationChangeType {
        relation: a.get_relation("relation")?,
        old_type: a.get_string("old_type")?,
        new_type: a.get_string("new_type")?,
    })
}

fn decode_relation_change_weight(a: &ActionReadOnlyAttributes<'_>) -> Result<Action> {
    Ok(Action::RelationChangeWeight {
        relation: a.get_relation("relation")?,
        old_weight: a.get_u32("old_weight")?,
        new_weight: a.get_u32("new_weight")?,
    })
}

fn decode_snapshot(a: &ActionReadOnlyAttributes<'_>) -> Result<Action> {
    Ok(Action::Snapshot {
        name: a.get_string("name")?,
        created_at: a.get_timestamp("created_at")?,
        model_digest: a.get_string("model_digest")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model_with_pkg() -> (DsmModel, ElementId, ElementId, ElementId) {
        let mut model = DsmModel::new();
        let a = model.create_element("Pkg.A", "A", "class", None, None).unwrap();
        let b = model.create_element("Pkg.B", "B", "class", None, None).unwrap();
        let pkg = model.elements().find_by_full_name("Pkg").unwrap();
        (model, pkg, a, b)
    }

    #[test]
    fn test_every_type_is_registered_once() {
        for (i, (t, _)) in ACTION_REGISTRY.iter().enumerate() {
            assert_eq!(t.as_str().parse::<ActionType>().unwrap(), *t);
            assert!(ACTION_REGISTRY[i + 1..].iter().all(|(other, _)| other != t));
        }
        assert_eq!(ACTION_REGISTRY.len(), 14);
    }

    #[test]
    fn test_element_create_redo_reuses_id() {
        let (mut model, pkg, _, _) = model_with_pkg();
        let mut action = Action::element_create(pkg, "C", "class", None, Some(0));
        action.apply(&mut model).unwrap();
        let Action::ElementCreate { created: Some(c), .. } = action.clone() else {
            panic!("element was not created");
        };
        assert_eq!(model.elements().get(pkg).unwrap().children[0], c);

        action.undo(&mut model).unwrap();
        assert!(!model.elements().contains(c));
        action.apply(&mut model).unwrap();
        assert!(model.elements().contains(c));
        assert_eq!(model.elements().get(pkg).unwrap().children[0], c);
    }

    #[test]
    fn test_merged_relation_create_undo_subtracts_weight() {
        let (mut model, _, a, b) = model_with_pkg();
        let added = model.add_relation(a, b, "call", 3, None).unwrap().unwrap();
        let mut action = Action::relation_create(a, b, "call", 2, None);
        action.apply(&mut model).unwrap();
        assert_eq!(model.relations().get(added.id).unwrap().weight, 5);

        action.undo(&mut model).unwrap();
        assert_eq!(model.relations().get(added.id).unwrap().weight, 3);
        assert_eq!(model.dependency_weight(a, b), 3);
    }

    #[test]
    fn test_merge_overflow_leaves_model_untouched() {
        let (mut model, _, a, b) = model_with_pkg();
        let added = model
            .add_relation(a, b, "call", u32::MAX - 1, None)
            .unwrap()
            .unwrap();
        let mut action = Action::relation_create(a, b, "call", 5, None);

        let err = action.apply(&mut model).unwrap_err();

        assert!(matches!(err, DsmError::WeightOverflow { .. }));
        assert_eq!(model.relations().get(added.id).unwrap().weight, u32::MAX - 1);
        assert_eq!(model.dependency_weight(a, b), u64::from(u32::MAX - 1));
        assert!(matches!(
            action,
            Action::RelationCreate {
                created: None,
                merged: false,
                ..
            }
        ));
    }

    #[test]
    fn test_self_relation_create_fails() {
        let (mut model, _, a, _) = model_with_pkg();
        let mut action = Action::relation_create(a, a, "call", 1, None);
        assert!(matches!(
            action.apply(&mut model),
            Err(DsmError::InvalidActionData { .. })
        ));
    }

    #[test]
    fn test_sort_undo_restores_children() {
        let (mut model, pkg, a, b) = model_with_pkg();
        let c = model.create_element("Pkg.C", "C", "class", None, None).unwrap();
        let mut action = Action::ElementSort {
            element: pkg,
            order: vec![2, 0, 1],
        };
        action.apply(&mut model).unwrap();
        assert_eq!(model.elements().get(pkg).unwrap().children, vec![c, a, b]);
        action.undo(&mut model).unwrap();
        assert_eq!(model.elements().get(pkg).unwrap().children, vec![a, b, c]);
    }

    #[test]
    fn test_record_round_trip_through_model() {
        let (mut model, pkg, _, b) = model_with_pkg();
        let mut action = Action::element_change_parent(&model, b, ElementId::ROOT, 0).unwrap();
        action.apply(&mut model).unwrap();

        let record = action.to_record();
        assert_eq!(record.action_type, "ElementChangeParent");
        assert_eq!(record.data["old_parent"], pkg.to_string());
        assert_eq!(record.data["old_index"], "1");
        let rebuilt = Action::from_record(&model, &record).unwrap();
        assert_eq!(rebuilt, action);
        assert_eq!(rebuilt.description(&model), "element=B parent=Pkg->");
    }

    #[test]
    fn test_from_record_rejects_unknown_type() {
        let model = DsmModel::new();
        let record = ActionRecord {
            action_type: "ElementTeleport".to_string(),
            data: BTreeMap::new(),
        };
        assert!(matches!(
            Action::from_record(&model, &record),
            Err(DsmError::UnknownActionType { .. })
        ));
    }

    #[test]
    fn test_snapshot_is_a_no_op() {
        let (mut model, _, _, _) = model_with_pkg();
        let before = model_digest(&model).unwrap();
        let mut action = Action::snapshot(&model, "baseline").unwrap();
        action.apply(&mut model).unwrap();
        action.undo(&mut model).unwrap();
        assert_eq!(model_digest(&model).unwrap(), before);
        let Action::Snapshot { model_digest: digest, .. } = &action else {
            panic!("not a snapshot");
        };
        assert_eq!(digest, &before);
    }
}
