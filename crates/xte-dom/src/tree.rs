//! Form tree (arena-based allocation)
//!
//! Structural edits keep the sibling links and the occurrence numbering
//! consistent; removed nodes stay in the arena but are unlinked.

use crate::{ElementData, ModuleMarker, Node, NodeData, NodeId, PathLabel};

/// Result type for tree operations
pub type DomResult<T> = Result<T, DomError>;

/// Tree operation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    /// Node not found in the arena
    #[error("node not found")]
    NotFound,
    /// Operation would break the hierarchy (self-append, insert at root level)
    #[error("hierarchy request error")]
    HierarchyRequest,
    /// Operation not valid for this node type
    #[error("invalid node type")]
    InvalidNodeType,
}

/// Arena-based form tree; slot 0 is always the schema root
#[derive(Debug)]
pub struct FormTree {
    nodes: Vec<Node>,
}

impl FormTree {
    /// Create a tree holding only the schema root
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::schema_root()],
        }
    }

    /// Get a node by ID
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        if id.is_none() {
            return None;
        }
        self.nodes.get(id.0 as usize)
    }

    /// Get a mutable node by ID
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        if id.is_none() {
            return None;
        }
        self.nodes.get_mut(id.0 as usize)
    }

    /// Number of allocated nodes (including unlinked ones)
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if tree holds only the root
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// Allocate a node, returning its ID; the node starts unlinked
    pub fn alloc(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Allocate and append an element under `parent`
    pub fn add_element(&mut self, parent: NodeId, data: ElementData) -> DomResult<NodeId> {
        let id = self.alloc(Node::element(data));
        self.append_child(parent, id)?;
        Ok(id)
    }

    /// Allocate and append a module marker under `parent`
    pub fn add_marker(&mut self, parent: NodeId, marker: ModuleMarker) -> DomResult<NodeId> {
        let id = self.alloc(Node::marker(marker));
        self.append_child(parent, id)?;
        Ok(id)
    }

    /// Append `child` as the last child of `parent`
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<()> {
        if parent == child {
            return Err(DomError::HierarchyRequest);
        }
        self.get(child).ok_or(DomError::NotFound)?;
        self.detach(child)?;

        let last = self.get(parent).ok_or(DomError::NotFound)?.last_child;
        if last.is_none() {
            let p = self.get_mut(parent).ok_or(DomError::NotFound)?;
            p.first_child = child;
            p.last_child = child;
        } else {
            self.get_mut(last).ok_or(DomError::NotFound)?.next_sibling = child;
            self.get_mut(child).ok_or(DomError::NotFound)?.prev_sibling = last;
            self.get_mut(parent).ok_or(DomError::NotFound)?.last_child = child;
        }
        self.get_mut(child).ok_or(DomError::NotFound)?.parent = parent;
        Ok(())
    }

    /// Insert `node` as the next sibling of `anchor`
    pub fn insert_after(&mut self, anchor: NodeId, node: NodeId) -> DomResult<()> {
        if anchor == node {
            return Err(DomError::HierarchyRequest);
        }
        let (parent, next) = {
            let a = self.get(anchor).ok_or(DomError::NotFound)?;
            (a.parent, a.next_sibling)
        };
        if parent.is_none() {
            // Nothing may sit beside the schema root
            return Err(DomError::HierarchyRequest);
        }
        self.get(node).ok_or(DomError::NotFound)?;
        self.detach(node)?;

        self.get_mut(anchor).ok_or(DomError::NotFound)?.next_sibling = node;
        {
            let n = self.get_mut(node).ok_or(DomError::NotFound)?;
            n.parent = parent;
            n.prev_sibling = anchor;
            n.next_sibling = next;
        }
        if next.is_none() {
            self.get_mut(parent).ok_or(DomError::NotFound)?.last_child = node;
        } else {
            self.get_mut(next).ok_or(DomError::NotFound)?.prev_sibling = node;
        }
        Ok(())
    }

    /// Unlink `node` (and its subtree) from its parent and siblings
    pub fn detach(&mut self, node: NodeId) -> DomResult<()> {
        let (parent, prev, next) = {
            let n = self.get(node).ok_or(DomError::NotFound)?;
            (n.parent, n.prev_sibling, n.next_sibling)
        };
        if parent.is_none() && prev.is_none() && next.is_none() {
            return Ok(());
        }
        if prev.is_none() {
            if !parent.is_none() {
                self.get_mut(parent).ok_or(DomError::NotFound)?.first_child = next;
            }
        } else {
            self.get_mut(prev).ok_or(DomError::NotFound)?.next_sibling = next;
        }
        if next.is_none() {
            if !parent.is_none() {
                self.get_mut(parent).ok_or(DomError::NotFound)?.last_child = prev;
            }
        } else {
            self.get_mut(next).ok_or(DomError::NotFound)?.prev_sibling = prev;
        }
        let n = self.get_mut(node).ok_or(DomError::NotFound)?;
        n.parent = NodeId::NONE;
        n.prev_sibling = NodeId::NONE;
        n.next_sibling = NodeId::NONE;
        Ok(())
    }

    /// Iterate over the children of `parent`
    pub fn children(&self, parent: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        ChildIter {
            tree: self,
            next: self.get(parent).map(|n| n.first_child).unwrap_or(NodeId::NONE),
        }
    }

    /// Preorder traversal of the subtree rooted at `root` (inclusive)
    pub fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            if self.get(id).is_none() {
                continue;
            }
            out.push(id);
            let children: Vec<NodeId> = self.children(id).collect();
            for child in children.into_iter().rev() {
                stack.push(child);
            }
        }
        out
    }

    /// Nearest ancestor-or-self carrying a server-assigned element id
    pub fn identified_ancestor(&self, node: NodeId) -> Option<NodeId> {
        let mut current = node;
        while let Some(n) = self.get(current) {
            if n.as_element().is_some_and(|e| e.elem_id.is_some()) {
                return Some(current);
            }
            current = n.parent;
        }
        None
    }

    /// The module marker governing `node`: itself if it is a marker,
    /// otherwise the first marker among its siblings
    pub fn marker_for(&self, node: NodeId) -> Option<NodeId> {
        let n = self.get(node)?;
        if n.is_marker() {
            return Some(node);
        }
        self.children(n.parent)
            .find(|&id| self.get(id).is_some_and(Node::is_marker))
    }

    /// Siblings of `node` (inclusive) carrying the given class
    pub fn siblings_with_class(&self, node: NodeId, class: &str) -> Vec<NodeId> {
        let Some(parent) = self.get(node).map(|n| n.parent) else {
            return Vec::new();
        };
        self.children(parent)
            .filter(|&id| {
                self.get(id)
                    .and_then(Node::as_element)
                    .is_some_and(|e| e.has_class(class))
            })
            .collect()
    }

    /// Last sibling of `node` (inclusive) carrying the given class
    pub fn last_sibling_with_class(&self, node: NodeId, class: &str) -> Option<NodeId> {
        self.siblings_with_class(node, class).pop()
    }

    /// Count the auto-key fields reachable from the root
    pub fn count_auto_keys(&self) -> usize {
        self.descendants(NodeId::ROOT)
            .iter()
            .filter(|&&id| {
                self.get(id)
                    .and_then(Node::as_marker)
                    .is_some_and(|m| m.auto_key)
            })
            .count()
    }

    /// Find a reachable node by element id or keyref field id
    pub fn find_by_id(&self, id: &str) -> Option<NodeId> {
        self.descendants(NodeId::ROOT).into_iter().find(|&node| {
            let Some(n) = self.get(node) else {
                return false;
            };
            match &n.data {
                NodeData::Element(e) => e.elem_id.as_deref() == Some(id),
                NodeData::ModuleMarker(m) => m.field_id.as_deref() == Some(id),
                NodeData::SchemaRoot => false,
            }
        })
    }

    /// Replace the rendered markup payload of a node
    pub fn set_markup(&mut self, node: NodeId, markup: String) -> DomResult<()> {
        let n = self.get_mut(node).ok_or(DomError::NotFound)?;
        match &mut n.data {
            NodeData::Element(e) => e.markup = Some(markup),
            NodeData::ModuleMarker(m) => m.markup = Some(markup),
            NodeData::SchemaRoot => return Err(DomError::InvalidNodeType),
        }
        Ok(())
    }

    /// Renumber sibling occurrences matching `label` (prefix and name,
    /// ignoring index) to consecutive indices starting at 1
    pub fn renumber(&mut self, parent: NodeId, label: &PathLabel) -> DomResult<()> {
        self.get(parent).ok_or(DomError::NotFound)?;
        let matching: Vec<NodeId> = self
            .children(parent)
            .filter(|&id| {
                self.get(id)
                    .and_then(Node::as_element)
                    .and_then(|e| e.label.as_ref())
                    .is_some_and(|l| l.matches(label))
            })
            .collect();
        for (i, id) in matching.iter().enumerate() {
            if let Some(l) = self
                .get_mut(*id)
                .and_then(Node::as_element_mut)
                .and_then(|e| e.label.as_mut())
            {
                l.index = Some(i as u32 + 1);
            }
        }
        Ok(())
    }
}

impl Default for FormTree {
    fn default() -> Self {
        Self::new()
    }
}

struct ChildIter<'a> {
    tree: &'a FormTree,
    next: NodeId,
}

impl Iterator for ChildIter<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next.is_none() {
            return None;
        }
        let id = self.next;
        self.next = self
            .tree
            .get(id)
            .map(|n| n.next_sibling)
            .unwrap_or(NodeId::NONE);
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn occurrence(class: &str) -> ElementData {
        ElementData::wrapper().with_class(class)
    }

    #[test]
    fn test_append_and_children_order() {
        let mut tree = FormTree::new();
        let a = tree.add_element(NodeId::ROOT, occurrence("a")).unwrap();
        let b = tree.add_element(NodeId::ROOT, occurrence("b")).unwrap();
        let c = tree.add_element(NodeId::ROOT, occurrence("c")).unwrap();

        let children: Vec<NodeId> = tree.children(NodeId::ROOT).collect();
        assert_eq!(children, vec![a, b, c]);
        assert_eq!(tree.get(NodeId::ROOT).unwrap().last_child, c);
    }

    #[test]
    fn test_insert_after_links() {
        let mut tree = FormTree::new();
        let a = tree.add_element(NodeId::ROOT, occurrence("x")).unwrap();
        let c = tree.add_element(NodeId::ROOT, occurrence("x")).unwrap();
        let b = tree.alloc(Node::element(occurrence("x")));
        tree.insert_after(a, b).unwrap();

        let children: Vec<NodeId> = tree.children(NodeId::ROOT).collect();
        assert_eq!(children, vec![a, b, c]);

        // Insert after the last child updates the parent's last_child
        let d = tree.alloc(Node::element(occurrence("x")));
        tree.insert_after(c, d).unwrap();
        assert_eq!(tree.get(NodeId::ROOT).unwrap().last_child, d);
    }

    #[test]
    fn test_insert_beside_root_rejected() {
        let mut tree = FormTree::new();
        let a = tree.alloc(Node::element(occurrence("x")));
        assert_eq!(
            tree.insert_after(NodeId::ROOT, a),
            Err(DomError::HierarchyRequest)
        );
    }

    #[test]
    fn test_detach_middle_child() {
        let mut tree = FormTree::new();
        let a = tree.add_element(NodeId::ROOT, occurrence("x")).unwrap();
        let b = tree.add_element(NodeId::ROOT, occurrence("x")).unwrap();
        let c = tree.add_element(NodeId::ROOT, occurrence("x")).unwrap();

        tree.detach(b).unwrap();
        let children: Vec<NodeId> = tree.children(NodeId::ROOT).collect();
        assert_eq!(children, vec![a, c]);
        assert!(tree.get(b).unwrap().parent.is_none());

        // Detached subtrees are no longer reachable
        assert!(!tree.descendants(NodeId::ROOT).contains(&b));
    }

    #[test]
    fn test_identified_ancestor() {
        let mut tree = FormTree::new();
        let host = tree
            .add_element(NodeId::ROOT, occurrence("occ").with_id("elem-7"))
            .unwrap();
        let wrapper = tree.add_element(host, ElementData::wrapper()).unwrap();
        let leaf = tree.add_element(wrapper, ElementData::wrapper()).unwrap();

        assert_eq!(tree.identified_ancestor(leaf), Some(host));
        assert_eq!(tree.identified_ancestor(host), Some(host));
        assert_eq!(tree.identified_ancestor(NodeId::ROOT), None);
    }

    #[test]
    fn test_marker_for_sibling() {
        let mut tree = FormTree::new();
        let target = tree.add_element(NodeId::ROOT, occurrence("x")).unwrap();
        assert_eq!(tree.marker_for(target), None);

        let marker = tree
            .add_marker(NodeId::ROOT, ModuleMarker::new("mod/popup", false))
            .unwrap();
        assert_eq!(tree.marker_for(target), Some(marker));
        assert_eq!(tree.marker_for(marker), Some(marker));
    }

    #[test]
    fn test_count_auto_keys_skips_detached() {
        let mut tree = FormTree::new();
        let occ = tree.add_element(NodeId::ROOT, occurrence("x")).unwrap();
        tree.add_marker(occ, ModuleMarker::new("mod/auto-key", true).with_field_id("k1"))
            .unwrap();
        let second = tree
            .add_marker(occ, ModuleMarker::new("mod/auto-key", true).with_field_id("k2"))
            .unwrap();
        tree.add_marker(occ, ModuleMarker::new("mod/popup", false))
            .unwrap();

        assert_eq!(tree.count_auto_keys(), 2);
        tree.detach(second).unwrap();
        assert_eq!(tree.count_auto_keys(), 1);
    }

    #[test]
    fn test_find_by_id() {
        let mut tree = FormTree::new();
        let occ = tree
            .add_element(NodeId::ROOT, occurrence("x").with_id("elem-1"))
            .unwrap();
        let marker = tree
            .add_marker(occ, ModuleMarker::new("mod/auto-key", true).with_field_id("key-9"))
            .unwrap();

        assert_eq!(tree.find_by_id("elem-1"), Some(occ));
        assert_eq!(tree.find_by_id("key-9"), Some(marker));
        assert_eq!(tree.find_by_id("missing"), None);
    }

    #[test]
    fn test_renumber_occurrences() {
        let mut tree = FormTree::new();
        let label = PathLabel::parse("ns:item[1]").unwrap();
        let a = tree
            .add_element(NodeId::ROOT, ElementData::labeled(label.clone()))
            .unwrap();
        let b = tree
            .add_element(
                NodeId::ROOT,
                ElementData::labeled(PathLabel::parse("ns:item[7]").unwrap()),
            )
            .unwrap();
        let other = tree
            .add_element(
                NodeId::ROOT,
                ElementData::labeled(PathLabel::parse("ns:other[4]").unwrap()),
            )
            .unwrap();

        tree.renumber(NodeId::ROOT, &label).unwrap();
        let label_of = |id: NodeId| {
            tree.get(id)
                .and_then(Node::as_element)
                .and_then(|e| e.label.clone())
                .map(|l| l.to_string())
        };
        assert_eq!(label_of(a).as_deref(), Some("ns:item[1]"));
        assert_eq!(label_of(b).as_deref(), Some("ns:item[2]"));
        assert_eq!(label_of(other).as_deref(), Some("ns:other[4]"));
    }
}
