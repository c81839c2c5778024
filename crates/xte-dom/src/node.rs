//! Form tree node
//!
//! Sibling-linked node layout: parent, first/last child, prev/next sibling,
//! all stored as `NodeId` indices into the tree arena.

use crate::{NodeId, PathLabel};

/// A node of the rendered form tree
#[derive(Debug)]
pub struct Node {
    /// Parent node (NONE if root)
    pub parent: NodeId,
    /// First child
    pub first_child: NodeId,
    /// Last child (for O(1) append)
    pub last_child: NodeId,
    /// Previous sibling
    pub prev_sibling: NodeId,
    /// Next sibling
    pub next_sibling: NodeId,
    /// Node-specific data
    pub data: NodeData,
}

impl Node {
    fn unlinked(data: NodeData) -> Self {
        Self {
            parent: NodeId::NONE,
            first_child: NodeId::NONE,
            last_child: NodeId::NONE,
            prev_sibling: NodeId::NONE,
            next_sibling: NodeId::NONE,
            data,
        }
    }

    /// Create the schema root node
    pub fn schema_root() -> Self {
        Self::unlinked(NodeData::SchemaRoot)
    }

    /// Create an element node
    pub fn element(data: ElementData) -> Self {
        Self::unlinked(NodeData::Element(data))
    }

    /// Create a module marker node
    pub fn marker(marker: ModuleMarker) -> Self {
        Self::unlinked(NodeData::ModuleMarker(marker))
    }

    /// Check if this is an element
    #[inline]
    pub fn is_element(&self) -> bool {
        matches!(self.data, NodeData::Element(_))
    }

    /// Check if this is a module marker
    #[inline]
    pub fn is_marker(&self) -> bool {
        matches!(self.data, NodeData::ModuleMarker(_))
    }

    /// Get element data if this is an element
    #[inline]
    pub fn as_element(&self) -> Option<&ElementData> {
        match &self.data {
            NodeData::Element(e) => Some(e),
            _ => None,
        }
    }

    /// Get mutable element data
    #[inline]
    pub fn as_element_mut(&mut self) -> Option<&mut ElementData> {
        match &mut self.data {
            NodeData::Element(e) => Some(e),
            _ => None,
        }
    }

    /// Get marker data if this is a module marker
    #[inline]
    pub fn as_marker(&self) -> Option<&ModuleMarker> {
        match &self.data {
            NodeData::ModuleMarker(m) => Some(m),
            _ => None,
        }
    }

    /// Get mutable marker data
    #[inline]
    pub fn as_marker_mut(&mut self) -> Option<&mut ModuleMarker> {
        match &mut self.data {
            NodeData::ModuleMarker(m) => Some(m),
            _ => None,
        }
    }
}

/// Node-specific data
#[derive(Debug)]
pub enum NodeData {
    /// Root of the rendered template, excluded from derived paths
    SchemaRoot,
    /// Form element (occurrence, wrapper row, input group)
    Element(ElementData),
    /// Module attached at this position
    ModuleMarker(ModuleMarker),
}

/// Element-specific data
#[derive(Debug, Default)]
pub struct ElementData {
    /// Path label (`ns:element[3]`), absent on wrapper rows
    pub label: Option<PathLabel>,
    /// Server-assigned element id, key for generate/remove calls
    pub elem_id: Option<String>,
    /// CSS-style classes, occurrence siblings share one
    pub classes: Vec<String>,
    /// Rendered markup payload for this element
    pub markup: Option<String>,
    /// Whether the remove control is shown on this occurrence
    pub remove_visible: bool,
    /// Zero-occurrence placeholder left behind by a removal
    pub removed: bool,
}

impl ElementData {
    /// Create element data with a path label
    pub fn labeled(label: PathLabel) -> Self {
        Self {
            label: Some(label),
            ..Default::default()
        }
    }

    /// Create element data for an unlabeled wrapper row
    pub fn wrapper() -> Self {
        Self::default()
    }

    /// Set the server-assigned element id
    pub fn with_id(mut self, id: &str) -> Self {
        self.elem_id = Some(id.to_string());
        self
    }

    /// Add a class
    pub fn with_class(mut self, class: &str) -> Self {
        self.classes.push(class.to_string());
        self
    }

    /// Set the rendered markup payload
    pub fn with_markup(mut self, markup: &str) -> Self {
        self.markup = Some(markup.to_string());
        self
    }

    /// Check class membership
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    /// First class, if any (the occurrence-grouping class)
    pub fn primary_class(&self) -> Option<&str> {
        self.classes.first().map(|c| c.as_str())
    }
}

/// Module attachment marker
#[derive(Debug)]
pub struct ModuleMarker {
    /// Display/lookup key of the attached module
    pub module_url: String,
    /// Whether this module generates automatic keys
    pub auto_key: bool,
    /// Field identifier used by the keyref refresh service
    pub field_id: Option<String>,
    /// Serialized payload saved from the configuration dialog
    pub data: Option<String>,
    /// Rendered fragment for this module's field
    pub markup: Option<String>,
    /// A configuration dialog is currently open on this module
    pub dialog_active: bool,
}

impl ModuleMarker {
    /// Create a marker for a module
    pub fn new(module_url: &str, auto_key: bool) -> Self {
        Self {
            module_url: module_url.to_string(),
            auto_key,
            field_id: None,
            data: None,
            markup: None,
            dialog_active: false,
        }
    }

    /// Set the keyref field identifier
    pub fn with_field_id(mut self, id: &str) -> Self {
        self.field_id = Some(id.to_string());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_constructors() {
        assert!(Node::schema_root().parent.is_none());
        assert!(Node::element(ElementData::wrapper()).is_element());
        assert!(Node::marker(ModuleMarker::new("mod/popup", false)).is_marker());
    }

    #[test]
    fn test_element_classes() {
        let data = ElementData::wrapper()
            .with_class("occurrence")
            .with_class("removed");
        assert!(data.has_class("occurrence"));
        assert!(!data.has_class("module"));
        assert_eq!(data.primary_class(), Some("occurrence"));
    }

    #[test]
    fn test_marker_field_id() {
        let marker = ModuleMarker::new("mod/auto-key", true).with_field_id("key-1");
        assert!(marker.auto_key);
        assert_eq!(marker.field_id.as_deref(), Some("key-1"));
    }
}
