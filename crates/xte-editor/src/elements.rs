//! Repeated-element manager
//!
//! Adds and removes occurrences of multi-occurrence form elements. The
//! add/remove controls are locked page-wide while a request is in flight,
//! so structural edits never overlap.

use xte_dom::{
    DomError, ElementData, FragmentInfo, ModuleMarker, Node, NodeId, PathLabel, StructureEvent,
    AUTO_KEY_CLASS,
};
use xte_net::{ElementService, RemoveOutcome};

use crate::session::ControlsGuard;
use crate::{EditorError, EditorSession};

/// Class marking a zero-occurrence placeholder
const REMOVED_CLASS: &str = "removed";

struct HostInfo {
    id: NodeId,
    elem_id: String,
    class: Option<String>,
    label: Option<PathLabel>,
    removed: bool,
}

impl<S: ElementService> EditorSession<S> {
    /// Add an occurrence of the element containing `anchor`
    pub(crate) async fn add_occurrence(&mut self, anchor: NodeId) -> Result<NodeId, EditorError> {
        let _controls = ControlsGuard::acquire(&self.locks)?;
        self.add_occurrence_inner(anchor).await
    }

    async fn add_occurrence_inner(&mut self, anchor: NodeId) -> Result<NodeId, EditorError> {
        let host = self.host_info(anchor)?;
        tracing::info!("adding occurrence for {}", host.elem_id);
        let markup = self.services.generate_element(&host.elem_id).await?;

        let frag = xte_dom::scan(&markup);
        let mut data = ElementData::wrapper().with_markup(&markup);
        data.label = host.label.clone();
        data.elem_id = frag.elem_id.clone();
        data.classes = host.class.clone().into_iter().collect();
        data.remove_visible = true;
        let new_id = self.tree.alloc(Node::element(data));

        if host.removed {
            // The host was a zero-occurrence stand-in: replace it in place
            self.tree.insert_after(host.id, new_id)?;
            let parent = self.parent_of(host.id);
            self.tree.detach(host.id)?;
            self.log.push(StructureEvent::node_removed(host.id, parent));
            self.log.push(StructureEvent::node_inserted(new_id, parent));
        } else {
            let last = host
                .class
                .as_deref()
                .and_then(|c| self.tree.last_sibling_with_class(host.id, c))
                .unwrap_or(host.id);
            self.tree.insert_after(last, new_id)?;
            // With at least two occurrences, removal is legal everywhere
            if let Some(class) = host.class.as_deref() {
                for occ in self.tree.siblings_with_class(new_id, class) {
                    if let Some(e) = self.tree.get_mut(occ).and_then(Node::as_element_mut) {
                        e.remove_visible = true;
                    }
                }
            }
            let parent = self.parent_of(new_id);
            self.log.push(StructureEvent::node_inserted(new_id, parent));
        }

        self.init_modules(new_id, &frag)?;
        if let Some(label) = &host.label {
            self.tree.renumber(self.parent_of(new_id), label)?;
        }
        tracing::debug!("occurrence {} created", host.elem_id);
        Ok(new_id)
    }

    /// Remove the occurrence of the element containing `anchor`
    pub(crate) async fn remove_occurrence(&mut self, anchor: NodeId) -> Result<(), EditorError> {
        let _controls = ControlsGuard::acquire(&self.locks)?;
        self.remove_occurrence_inner(anchor).await
    }

    async fn remove_occurrence_inner(&mut self, anchor: NodeId) -> Result<(), EditorError> {
        let host = self.host_info(anchor)?;
        tracing::info!("removing occurrence {}", host.elem_id);
        let outcome = self.services.remove_element(&host.elem_id).await?;

        match outcome {
            RemoveOutcome::HideRemoveControls => {
                // Last removable occurrence of this class
                if let Some(class) = host.class.as_deref() {
                    for occ in self.tree.siblings_with_class(host.id, class) {
                        if let Some(e) = self.tree.get_mut(occ).and_then(Node::as_element_mut) {
                            e.remove_visible = false;
                        }
                    }
                }
            }
            RemoveOutcome::Rewrite { html } => {
                let frag = xte_dom::scan(&html);
                let removed = frag.classes.iter().any(|c| c == REMOVED_CLASS);
                let mut data = ElementData::wrapper().with_markup(&html);
                data.label = host.label.clone();
                data.elem_id = frag.elem_id.clone();
                data.classes = host.class.clone().into_iter().collect();
                if removed {
                    data.classes.push(REMOVED_CLASS.to_string());
                }
                data.removed = removed;
                data.remove_visible = !removed;
                let new_id = self.tree.alloc(Node::element(data));
                self.tree.insert_after(host.id, new_id)?;
                self.init_modules(new_id, &frag)?;
                let parent = self.parent_of(new_id);
                self.log.push(StructureEvent::node_inserted(new_id, parent));
            }
        }

        let parent = self.parent_of(host.id);
        self.tree.detach(host.id)?;
        self.log.push(StructureEvent::node_removed(host.id, parent));
        if let Some(label) = &host.label {
            self.tree.renumber(parent, label)?;
        }
        tracing::debug!("occurrence {} removed", host.elem_id);
        Ok(())
    }

    fn host_info(&self, anchor: NodeId) -> Result<HostInfo, EditorError> {
        let id = self
            .tree
            .identified_ancestor(anchor)
            .ok_or(EditorError::NoIdentifiedAncestor)?;
        let e = self
            .tree
            .get(id)
            .and_then(Node::as_element)
            .ok_or(DomError::NotFound)?;
        Ok(HostInfo {
            id,
            elem_id: e
                .elem_id
                .clone()
                .ok_or(EditorError::NoIdentifiedAncestor)?,
            class: e
                .primary_class()
                .filter(|&c| c != REMOVED_CLASS)
                .map(str::to_string),
            label: e.label.clone(),
            removed: e.removed,
        })
    }
}

impl<S> EditorSession<S> {
    /// Per-fragment module initialization: lift the auto-key fields scanned
    /// out of a freshly inserted fragment into marker nodes
    pub(crate) fn init_modules(
        &mut self,
        node: NodeId,
        frag: &FragmentInfo,
    ) -> Result<(), EditorError> {
        for field_id in &frag.auto_key_fields {
            self.tree.add_marker(
                node,
                ModuleMarker::new(AUTO_KEY_CLASS, true).with_field_id(field_id),
            )?;
        }
        if !frag.auto_key_fields.is_empty() {
            tracing::debug!(
                "initialized {} auto-key field(s) under {:?}",
                frag.auto_key_fields.len(),
                node
            );
        }
        Ok(())
    }

    pub(crate) fn parent_of(&self, node: NodeId) -> NodeId {
        self.tree
            .get(node)
            .map(|n| n.parent)
            .unwrap_or(NodeId::NONE)
    }
}
