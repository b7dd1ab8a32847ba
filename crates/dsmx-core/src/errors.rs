use dsmx_core_types::{ElementId, RelationId};
use thiserror::Error;

/// Result type alias using DsmError
pub type Result<T> = std::result::Result<T, DsmError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// This taxonomy provides a stable, structured classification of all errors
/// raised by the engine. Each kind maps to a stable error code that can be
/// used for programmatic error handling, testing, and external API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Structural/Validation
    InvalidInput,
    InvalidName,
    NotFound,
    Deleted,
    IllegalReparent,
    CycleDetected,
    DuplicateName,
    DuplicateRelation,

    // Mutation
    CannotDelete,
    IllegalMove,
    InvalidSortOrder,

    // Consistency
    InvariantViolation,

    // Algorithms
    UnknownAlgorithm,

    // History
    InvalidActionData,
    UnknownActionType,

    // Integration
    Config,
    Serialization,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::InvalidName => "ERR_INVALID_NAME",
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::Deleted => "ERR_DELETED",
            ExErrorKind::IllegalReparent => "ERR_ILLEGAL_REPARENT",
            ExErrorKind::CycleDetected => "ERR_CYCLE_DETECTED",
            ExErrorKind::DuplicateName => "ERR_DUPLICATE_NAME",
            ExErrorKind::DuplicateRelation => "ERR_DUPLICATE_RELATION",
            ExErrorKind::CannotDelete => "ERR_CANNOT_DELETE",
            ExErrorKind::IllegalMove => "ERR_ILLEGAL_MOVE",
            ExErrorKind::InvalidSortOrder => "ERR_INVALID_SORT_ORDER",
            ExErrorKind::InvariantViolation => "ERR_INVARIANT_VIOLATION",
            ExErrorKind::UnknownAlgorithm => "ERR_UNKNOWN_ALGORITHM",
            ExErrorKind::InvalidActionData => "ERR_INVALID_ACTION_DATA",
            ExErrorKind::UnknownActionType => "ERR_UNKNOWN_ACTION_TYPE",
            ExErrorKind::Config => "ERR_CONFIG",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// Canonical structured error type
///
/// This error type provides a structured representation of errors with
/// classification fields for programmatic handling and rich context for debugging.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    entity_id: Option<String>,
    message: String,
    source: Option<Box<ExError>>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            entity_id: None,
            message: String::new(),
            source: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add entity ID context
    pub fn with_entity_id(mut self, id: impl ToString) -> Self {
        self.entity_id = Some(id.to_string());
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add source error
    pub fn with_source(mut self, source: ExError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Get the operation context, if any
    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    /// Get the entity ID context, if any
    pub fn entity_id(&self) -> Option<&str> {
        self.entity_id.as_deref()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the source error, if any
    pub fn source_error(&self) -> Option<&ExError> {
        self.source.as_deref()
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(entity_id) = &self.entity_id {
            write!(f, " (entity_id: {})", entity_id)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

// ========== End Error Facility ==========

/// Error taxonomy for DSM model operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DsmError {
    // ===== Lookup Errors =====
    /// Element id is unknown to the model
    #[error("Element not found: {element_id}")]
    ElementNotFound { element_id: ElementId },

    /// Element exists but was deleted
    #[error("Element was deleted: {element_id}")]
    ElementDeleted { element_id: ElementId },

    /// Relation id is unknown to the model
    #[error("Relation not found: {relation_id}")]
    RelationNotFound { relation_id: RelationId },

    /// Relation exists but was deleted
    #[error("Relation was deleted: {relation_id}")]
    RelationDeleted { relation_id: RelationId },

    // ===== Structural Errors =====
    /// Moving an element below itself or one of its descendants
    #[error("Cycle detected: element {element_id} cannot be moved below {new_parent_id}")]
    CycleDetected {
        element_id: ElementId,
        new_parent_id: ElementId,
    },

    /// Reparenting that is structurally impossible (e.g. moving the root)
    #[error("Illegal reparent of element {element_id}: {reason}")]
    IllegalReparent { element_id: ElementId, reason: String },

    /// A sibling with the same name already exists
    #[error("Element {parent_id} already has a child named '{name}'")]
    DuplicateName { parent_id: ElementId, name: String },

    /// Element name is empty or contains a path separator
    #[error("Invalid element name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    /// A relation with the same (consumer, provider, type) key already exists
    #[error("Relation {consumer_id} -> {provider_id} of type '{relation_type}' already exists")]
    DuplicateRelation {
        consumer_id: ElementId,
        provider_id: ElementId,
        relation_type: String,
    },

    /// Merging into an existing relation would exceed `u32::MAX`
    #[error("Weight overflow merging {weight} into relation {relation_id}")]
    WeightOverflow { relation_id: RelationId, weight: u32 },

    // ===== Mutation Errors =====
    /// Element cannot be deleted (the root)
    #[error("Cannot delete element {element_id}: {reason}")]
    CannotDelete { element_id: ElementId, reason: String },

    /// Move up/down past the first/last sibling
    #[error("Illegal move of element {element_id}: {reason}")]
    IllegalMove { element_id: ElementId, reason: String },

    /// Sort order does not describe a permutation of the children
    #[error("Invalid sort order for children of {element_id}: {reason}")]
    InvalidSortOrder { element_id: ElementId, reason: String },

    // ===== Consistency Errors =====
    /// Model state breaks a structural invariant
    #[error("Invariant violation: {reason}")]
    InvariantViolation { reason: String },

    // ===== Algorithm Errors =====
    /// No sort algorithm registered under this name
    #[error("Unknown sort algorithm: {name}")]
    UnknownSortAlgorithm { name: String },

    // ===== History Errors =====
    /// Attribute map is missing a key or holds a malformed value
    #[error("Invalid data for action {action_type}: key '{key}' {reason}")]
    InvalidActionData {
        action_type: String,
        key: String,
        reason: String,
    },

    /// Action tag not present in the registry
    #[error("Unknown action type: {action_type}")]
    UnknownActionType { action_type: String },

    // ===== Generic Errors =====
    /// Configuration could not be parsed
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Serialization error (JSON encoding/decoding)
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// Generic internal error
    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Conversion from DsmError to ExError
impl From<DsmError> for ExError {
    fn from(err: DsmError) -> Self {
        let message = err.to_string();
        match err {
            DsmError::ElementNotFound { element_id } => {
                ExError::new(ExErrorKind::NotFound).with_entity_id(element_id)
            }
            DsmError::ElementDeleted { element_id } => {
                ExError::new(ExErrorKind::Deleted).with_entity_id(element_id)
            }
            DsmError::RelationNotFound { relation_id } => {
                ExError::new(ExErrorKind::NotFound).with_entity_id(relation_id)
            }
            DsmError::RelationDeleted { relation_id } => {
                ExError::new(ExErrorKind::Deleted).with_entity_id(relation_id)
            }
            DsmError::CycleDetected { element_id, .. } => ExError::new(ExErrorKind::CycleDetected)
                .with_entity_id(element_id)
                .with_op("change_element_parent"),
            DsmError::IllegalReparent { element_id, .. } => {
                ExError::new(ExErrorKind::IllegalReparent)
                    .with_entity_id(element_id)
                    .with_op("change_element_parent")
            }
            DsmError::DuplicateName { parent_id, .. } => {
                ExError::new(ExErrorKind::DuplicateName).with_entity_id(parent_id)
            }
            DsmError::InvalidName { .. } => ExError::new(ExErrorKind::InvalidName),
            DsmError::DuplicateRelation { consumer_id, .. } => {
                ExError::new(ExErrorKind::DuplicateRelation).with_entity_id(consumer_id)
            }
            DsmError::WeightOverflow { relation_id, .. } => {
                ExError::new(ExErrorKind::InvalidInput).with_entity_id(relation_id)
            }
            DsmError::CannotDelete { element_id, .. } => ExError::new(ExErrorKind::CannotDelete)
                .with_entity_id(element_id)
                .with_op("delete_element"),
            DsmError::IllegalMove { element_id, .. } => {
                ExError::new(ExErrorKind::IllegalMove).with_entity_id(element_id)
            }
            DsmError::InvalidSortOrder { element_id, .. } => {
                ExError::new(ExErrorKind::InvalidSortOrder).with_entity_id(element_id)
            }
            DsmError::InvariantViolation { .. } => ExError::new(ExErrorKind::InvariantViolation),
            DsmError::UnknownSortAlgorithm { .. } => {
                ExError::new(ExErrorKind::UnknownAlgorithm).with_op("sort")
            }
            DsmError::InvalidActionData { .. } => ExError::new(ExErrorKind::InvalidActionData),
            DsmError::UnknownActionType { .. } => ExError::new(ExErrorKind::UnknownActionType),
            DsmError::Config { .. } => ExError::new(ExErrorKind::Config),
            DsmError::Serialization { .. } => ExError::new(ExErrorKind::Serialization),
            DsmError::Internal { .. } => ExError::new(ExErrorKind::Internal),
        }
        .with_message(message)
    }
}

impl From<serde_json::Error> for DsmError {
    fn from(err: serde_json::Error) -> Self {
        DsmError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for DsmError {
    fn from(err: toml::de::Error) -> Self {
        DsmError::Config {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind_codes_are_unique() {
        let kinds = [
            ExErrorKind::InvalidInput,
            ExErrorKind::InvalidName,
            ExErrorKind::NotFound,
            ExErrorKind::Deleted,
            ExErrorKind::IllegalReparent,
            ExErrorKind::CycleDetected,
            ExErrorKind::DuplicateName,
            ExErrorKind::DuplicateRelation,
            ExErrorKind::CannotDelete,
            ExErrorKind::IllegalMove,
            ExErrorKind::InvalidSortOrder,
            ExErrorKind::InvariantViolation,
            ExErrorKind::UnknownAlgorithm,
            ExErrorKind::InvalidActionData,
            ExErrorKind::UnknownActionType,
            ExErrorKind::Config,
            ExErrorKind::Serialization,
            ExErrorKind::Internal,
        ];
        let codes: std::collections::HashSet<_> = kinds.iter().map(|k| k.code()).collect();
        assert_eq!(codes.len(), kinds.len());
    }

    #[test]
    fn test_display_includes_code_and_entity() {
        let err = ExError::new(ExErrorKind::NotFound)
            .with_op("find_element")
            .with_entity_id(ElementId(9))
            .with_message("Element not found");
        let text = err.to_string();
        assert!(text.starts_with("[ERR_NOT_FOUND]"));
        assert!(text.contains("find_element"));
        assert!(text.contains("entity_id: 9"));
    }

    #[test]
    fn test_source_chain() {
        let inner = ExError::new(ExErrorKind::Serialization);
        let outer = ExError::new(ExErrorKind::InvalidActionData).with_source(inner);
        assert_eq!(
            outer.source_error().map(|e| e.kind()),
            Some(ExErrorKind::Serialization)
        );
    }
}
