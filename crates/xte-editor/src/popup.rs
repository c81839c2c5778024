//! Popup configurator
//!
//! Each module kind may register a modal dialog configuration under its URL
//! key: dialog chrome options plus a data extractor producing the payload to
//! save. Opening snapshots the dialog content so cancel can undo unsaved
//! edits; save forwards the extracted payload to the module binder's save
//! path. Only one dialog may be active at a time.

use std::collections::HashMap;

use xte_dom::{FormTree, Node, NodeId};

use crate::{EditorError, EditorSession};

/// Dialog chrome options
#[derive(Debug, Clone)]
pub struct PopupOptions {
    /// Open as a modal dialog
    pub modal: bool,
    /// Dialog title, module URL is shown when absent
    pub title: Option<String>,
}

impl Default for PopupOptions {
    fn default() -> Self {
        Self {
            modal: true,
            title: None,
        }
    }
}

/// Produces the payload to save from the dialog's current state
pub type DataExtractor = Box<dyn Fn(&FormTree, NodeId) -> serde_json::Value>;

/// A registered dialog configuration
pub struct PopupConfig {
    pub options: PopupOptions,
    pub(crate) extractor: DataExtractor,
}

/// Popup configurations by module URL key
#[derive(Default)]
pub struct PopupRegistry {
    configs: HashMap<String, PopupConfig>,
}

impl PopupRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a configuration under a module URL key.
    ///
    /// Registration happens once per module kind at view mount; a repeated
    /// key replaces the earlier entry.
    pub fn register(&mut self, key: &str, options: PopupOptions, extractor: DataExtractor) {
        if self.configs.contains_key(key) {
            tracing::debug!("replacing popup configuration for {}", key);
        }
        self.configs
            .insert(key.to_string(), PopupConfig { options, extractor });
    }

    /// Look up the configuration for a module URL key
    pub fn get(&self, key: &str) -> Option<&PopupConfig> {
        self.configs.get(key)
    }

    /// Check whether a key is registered
    pub fn is_registered(&self, key: &str) -> bool {
        self.configs.contains_key(key)
    }
}

/// The single active dialog
#[derive(Debug)]
pub(crate) struct OpenDialog {
    pub node: NodeId,
    pub marker: NodeId,
    pub module_url: String,
    /// Dialog markup as it was before opening
    pub snapshot: Option<String>,
}

impl<S> EditorSession<S> {
    /// The module node whose dialog is currently open, if any
    pub fn active_dialog(&self) -> Option<NodeId> {
        self.open_dialog.as_ref().map(|d| d.marker)
    }

    /// Open the configuration dialog for the module attached at `node`
    pub fn open_popup(&mut self, node: NodeId) -> Result<(), EditorError> {
        if self.open_dialog.is_some() {
            return Err(EditorError::DialogAlreadyOpen);
        }
        let marker = self
            .tree
            .marker_for(node)
            .ok_or(EditorError::NoModuleAttached)?;
        let m = self
            .tree
            .get_mut(marker)
            .and_then(Node::as_marker_mut)
            .ok_or(EditorError::NoModuleAttached)?;
        let module_url = m.module_url.clone();
        if !self.popups.is_registered(&module_url) {
            return Err(EditorError::PopupNotRegistered(module_url));
        }
        let snapshot = m.markup.clone();
        m.dialog_active = true;
        tracing::debug!("opening popup {} on {:?}", module_url, marker);
        self.open_dialog = Some(OpenDialog {
            node,
            marker,
            module_url,
            snapshot,
        });
        Ok(())
    }

    /// Save the open dialog: run the registered extractor, forward the
    /// payload to the binder's save path and close
    pub fn save_popup(&mut self) -> Result<(), EditorError> {
        let dialog = self.open_dialog.take().ok_or(EditorError::DialogNotOpen)?;
        let config = self
            .popups
            .get(&dialog.module_url)
            .ok_or_else(|| EditorError::PopupNotRegistered(dialog.module_url.clone()))?;
        let data = (config.extractor)(&self.tree, dialog.node);
        self.save_module_data(dialog.node, data)?;
        self.close_dialog(dialog.marker);
        Ok(())
    }

    /// Close the open dialog, restoring its pre-open content
    pub fn cancel_popup(&mut self) -> Result<(), EditorError> {
        let dialog = self.open_dialog.take().ok_or(EditorError::DialogNotOpen)?;
        if let Some(m) = self.tree.get_mut(dialog.marker).and_then(Node::as_marker_mut) {
            m.markup = dialog.snapshot;
        }
        self.close_dialog(dialog.marker);
        Ok(())
    }

    fn close_dialog(&mut self, marker: NodeId) {
        if let Some(m) = self.tree.get_mut(marker).and_then(Node::as_marker_mut) {
            m.dialog_active = false;
        }
    }
}
