//! Module binder
//!
//! Attaches and detaches modules at tree locations. The tree is a cache of
//! the remote store: it is only touched after the server confirms an insert
//! or delete, so a failed call leaves the prior state intact.

use xte_dom::{DomError, ModuleMarker, Node, NodeId, StructureEvent};
use xte_net::{DeleteModule, InsertModule, ModuleService};

use crate::filter::ModuleRow;
use crate::session::BusyGuard;
use crate::{EditorError, EditorSession};

impl<S: ModuleService> EditorSession<S> {
    /// Attach a module at `target`, keyed by the target's derived path
    pub(crate) async fn attach(
        &mut self,
        target: NodeId,
        row: ModuleRow,
    ) -> Result<NodeId, EditorError> {
        let _busy = BusyGuard::acquire(&self.locks, target)?;
        self.attach_inner(target, &row).await
    }

    async fn attach_inner(
        &mut self,
        target: NodeId,
        row: &ModuleRow,
    ) -> Result<NodeId, EditorError> {
        let xpath = xte_dom::xpath(&self.tree, target)?;
        let req = InsertModule {
            module_id: row.module_id.clone(),
            template_id: self.template_id.clone(),
            xpath,
        };
        tracing::info!("attaching module {} at {}", row.module_url, req.xpath);
        self.services.insert_module(&req).await?;

        if let Some(marker) = self.tree.marker_for(target) {
            // Already attached: replace the marker content in place
            let m = self
                .tree
                .get_mut(marker)
                .and_then(Node::as_marker_mut)
                .ok_or(DomError::NotFound)?;
            m.module_url = row.module_url.clone();
            m.auto_key = row.is_auto_key();
            self.log.push(StructureEvent::fragment_replaced(marker));
            Ok(marker)
        } else {
            let marker = self
                .tree
                .alloc(Node::marker(ModuleMarker::new(&row.module_url, row.is_auto_key())));
            self.tree.insert_after(target, marker)?;
            let parent = self
                .tree
                .get(marker)
                .map(|n| n.parent)
                .unwrap_or(NodeId::NONE);
            self.log.push(StructureEvent::node_inserted(marker, parent));
            Ok(marker)
        }
    }

    /// Detach the module attached at `target`
    pub(crate) async fn detach(&mut self, target: NodeId) -> Result<(), EditorError> {
        let _busy = BusyGuard::acquire(&self.locks, target)?;
        self.detach_inner(target).await
    }

    async fn detach_inner(&mut self, target: NodeId) -> Result<(), EditorError> {
        let xpath = xte_dom::xpath(&self.tree, target)?;
        let req = DeleteModule {
            xpath,
            template_id: self.template_id.clone(),
        };
        tracing::info!("detaching module at {}", req.xpath);
        self.services.delete_module(&req).await?;

        match self.tree.marker_for(target) {
            Some(marker) => {
                let parent = self
                    .tree
                    .get(marker)
                    .map(|n| n.parent)
                    .unwrap_or(NodeId::NONE);
                self.tree.detach(marker)?;
                self.log.push(StructureEvent::node_removed(marker, parent));
            }
            None => {
                // The server owns the attachment; a missing local marker
                // only means the view had nothing to drop.
                tracing::warn!("no module marker to remove at {:?}", target);
            }
        }
        Ok(())
    }
}

impl<S> EditorSession<S> {
    /// Store a configuration payload on the module attached at `node`.
    ///
    /// This is the save path the popup configurator forwards to.
    pub fn save_module_data(
        &mut self,
        node: NodeId,
        data: serde_json::Value,
    ) -> Result<(), EditorError> {
        let marker = self
            .tree
            .marker_for(node)
            .ok_or(EditorError::NoModuleAttached)?;
        let m = self
            .tree
            .get_mut(marker)
            .and_then(Node::as_marker_mut)
            .ok_or(DomError::NotFound)?;
        m.data = Some(data.to_string());
        tracing::debug!("saved module data on {:?}", marker);
        Ok(())
    }
}
