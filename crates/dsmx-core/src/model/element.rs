use dsmx_core_types::ElementId;
use serde::{Deserialize, Serialize};

/// Element - a node of the DSM hierarchy (file, type, module, ...)
///
/// Elements live in an arena owned by `ElementStore` and refer to each other
/// by id only: `parent` is a back-reference, `children` is the owning,
/// ordered list. Deleting an element marks it (and its subtree) as deleted so
/// the id stays reserved for undo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub id: ElementId,

    /// Local name segment (no dots)
    pub name: String,

    /// Type tag given by the importer; empty for auto-created containers
    pub element_type: String,

    pub annotation: Option<String>,

    /// None only for the root
    pub parent: Option<ElementId>,

    /// Child ids in display order
    pub children: Vec<ElementId>,

    /// Depth-first matrix index, valid after `assign_element_order`
    pub order: usize,

    pub expanded: bool,

    /// Tombstone flag
    pub deleted: bool,
}

impl Element {
    pub fn new(
        id: ElementId,
        name: String,
        element_type: String,
        annotation: Option<String>,
        parent: Option<ElementId>,
    ) -> Self {
        Self {
            id,
            name,
            element_type,
            annotation,
            parent,
            children: Vec::new(),
            order: 0,
            expanded: false,
            deleted: false,
        }
    }

    /// The root has no parent
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Leaves have no children
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    /// Position of `child` in this element's child list
    pub fn index_of_child(&self, child: ElementId) -> Option<usize> {
        self.children.iter().position(|c| *c == child)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_element_is_leaf() {
        let element = Element::new(
            ElementId(1),
            "a".to_string(),
            "class".to_string(),
            None,
            Some(ElementId::ROOT),
        );
        assert!(element.is_leaf());
        assert!(!element.is_root());
        assert!(!element.is_deleted());
        assert!(!element.expanded);
    }

    #[test]
    fn test_index_of_child() {
        let mut element = Element::new(ElementId(1), "p".to_string(), String::new(), None, None);
        element.children = vec![ElementId(4), ElementId(2), ElementId(9)];
        assert_eq!(element.index_of_child(ElementId(2)), Some(1));
        assert_eq!(element.index_of_child(ElementId(7)), None);
        assert!(element.has_children());
    }
}
