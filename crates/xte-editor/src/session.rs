//! Editor session
//!
//! One `EditorSession` per mounted editor view. It owns the form tree, the
//! service backend, the module table, the popup registry, the refresher
//! state and the structure-event log; page-level handlers become methods.

use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::rc::Rc;

use xte_dom::{ElementData, EventLog, FormTree, NodeId, StructureEvent};
use xte_net::{ElementService, KeyService, ModuleService};

use crate::autokey::AutoKeyRefresher;
use crate::filter::ModuleTable;
use crate::popup::{DataExtractor, OpenDialog, PopupOptions, PopupRegistry};
use crate::EditorError;

/// The explicit mutual-exclusion state of the editor.
///
/// `controls` is the page-wide add/remove disable flag; `busy` tracks nodes
/// with an attach/detach in flight. Shared behind `Rc` so an embedding UI
/// can read the state while an operation is suspended at a network call.
#[derive(Debug, Default)]
pub struct EditorLocks {
    controls: Cell<bool>,
    busy: RefCell<HashSet<NodeId>>,
}

impl EditorLocks {
    /// Whether the add/remove controls are currently disabled
    pub fn controls_locked(&self) -> bool {
        self.controls.get()
    }

    /// Whether a module request is in flight for `node`
    pub fn is_busy(&self, node: NodeId) -> bool {
        self.busy.borrow().contains(&node)
    }
}

/// Holds the page-wide control lock; released on drop, so a cancelled
/// operation cannot wedge the controls
pub(crate) struct ControlsGuard(Rc<EditorLocks>);

impl ControlsGuard {
    pub(crate) fn acquire(locks: &Rc<EditorLocks>) -> Result<Self, EditorError> {
        if locks.controls.replace(true) {
            return Err(EditorError::ControlsLocked);
        }
        Ok(Self(Rc::clone(locks)))
    }
}

impl Drop for ControlsGuard {
    fn drop(&mut self) {
        self.0.controls.set(false);
    }
}

/// Holds one node's busy flag; released on drop
pub(crate) struct BusyGuard(Rc<EditorLocks>, NodeId);

impl BusyGuard {
    pub(crate) fn acquire(locks: &Rc<EditorLocks>, node: NodeId) -> Result<Self, EditorError> {
        if !locks.busy.borrow_mut().insert(node) {
            return Err(EditorError::NodeBusy);
        }
        Ok(Self(Rc::clone(locks), node))
    }
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.busy.borrow_mut().remove(&self.1);
    }
}

/// A mounted editor view over one template
pub struct EditorSession<S> {
    pub(crate) tree: FormTree,
    pub(crate) services: S,
    pub(crate) template_id: String,
    pub(crate) target: Option<NodeId>,
    pub(crate) picker_open: bool,
    pub(crate) modules: ModuleTable,
    pub(crate) popups: PopupRegistry,
    pub(crate) open_dialog: Option<OpenDialog>,
    pub(crate) refresher: AutoKeyRefresher,
    pub(crate) locks: Rc<EditorLocks>,
    pub(crate) log: EventLog,
}

impl<S> EditorSession<S> {
    /// Create a session for the template identified by `template_id`
    pub fn new(template_id: &str, services: S) -> Self {
        Self {
            tree: FormTree::new(),
            services,
            template_id: template_id.to_string(),
            target: None,
            picker_open: false,
            modules: ModuleTable::new(),
            popups: PopupRegistry::new(),
            open_dialog: None,
            refresher: AutoKeyRefresher::default(),
            locks: Rc::new(EditorLocks::default()),
            log: EventLog::new(),
        }
    }

    /// The form tree
    pub fn tree(&self) -> &FormTree {
        &self.tree
    }

    /// Mutable access to the form tree, for populating the view
    pub fn tree_mut(&mut self) -> &mut FormTree {
        &mut self.tree
    }

    /// The template this session edits
    pub fn template_id(&self) -> &str {
        &self.template_id
    }

    /// The currently targeted tree node
    pub fn target(&self) -> Option<NodeId> {
        self.target
    }

    /// Whether the module picker dialog is open
    pub fn picker_open(&self) -> bool {
        self.picker_open
    }

    /// The module table backing the picker
    pub fn modules(&self) -> &ModuleTable {
        &self.modules
    }

    /// Mutable access to the module table
    pub fn modules_mut(&mut self) -> &mut ModuleTable {
        &mut self.modules
    }

    /// Refresher state, for inspection
    pub fn refresher(&self) -> &AutoKeyRefresher {
        &self.refresher
    }

    /// Handle to the mutual-exclusion state
    pub fn locks(&self) -> Rc<EditorLocks> {
        Rc::clone(&self.locks)
    }

    /// Target a node and open the picker showing normal modules
    pub fn show_module_manager(&mut self, target: NodeId) -> Result<(), EditorError> {
        self.tree.get(target).ok_or(xte_dom::DomError::NotFound)?;
        self.target = Some(target);
        self.modules.hide_auto_keys();
        self.picker_open = true;
        Ok(())
    }

    /// Target a node and open the picker showing auto-key modules
    pub fn show_auto_key_manager(&mut self, target: NodeId) -> Result<(), EditorError> {
        self.tree.get(target).ok_or(xte_dom::DomError::NotFound)?;
        self.target = Some(target);
        self.modules.show_auto_keys();
        self.picker_open = true;
        Ok(())
    }

    /// Register a popup configuration under a module URL key
    pub fn register_popup(&mut self, key: &str, options: PopupOptions, extractor: DataExtractor) {
        self.popups.register(key, options, extractor);
    }

    /// Load a server-rendered fragment under `parent`, lifting any auto-key
    /// fields it contains into marker nodes
    pub fn load_fragment(&mut self, parent: NodeId, markup: &str) -> Result<NodeId, EditorError> {
        let frag = xte_dom::scan(markup);
        let mut data = ElementData::wrapper().with_markup(markup);
        data.elem_id = frag.elem_id.clone();
        data.classes = frag.classes.clone();
        data.removed = frag.classes.iter().any(|c| c == "removed");
        let node = self.tree.add_element(parent, data)?;
        self.init_modules(node, &frag)?;
        self.log.push(StructureEvent::node_inserted(node, parent));
        Ok(node)
    }
}

impl<S> EditorSession<S>
where
    S: ModuleService + ElementService + KeyService,
{
    /// Insert the selected module at the current target.
    ///
    /// Closes the picker, attaches the module at the target's derived path
    /// and runs the auto-key refresh follow-up.
    pub async fn insert_module(&mut self, row: usize) -> Result<NodeId, EditorError> {
        let target = self.target.ok_or(EditorError::NoTarget)?;
        let row = self
            .modules
            .row(row)
            .cloned()
            .ok_or(EditorError::UnknownModule(row))?;
        self.picker_open = false;
        let marker = self.attach(target, row).await?;
        self.refresh_auto_keys().await?;
        Ok(marker)
    }

    /// Remove the module attached at the current target
    pub async fn delete_module(&mut self) -> Result<(), EditorError> {
        let target = self.target.ok_or(EditorError::NoTarget)?;
        self.picker_open = false;
        self.detach(target).await?;
        self.refresh_auto_keys().await?;
        Ok(())
    }

    /// Add an occurrence of the repeated element containing `anchor`
    pub async fn add_element(&mut self, anchor: NodeId) -> Result<NodeId, EditorError> {
        let node = self.add_occurrence(anchor).await?;
        self.refresh_auto_keys().await?;
        Ok(node)
    }

    /// Remove the occurrence of the repeated element containing `anchor`
    pub async fn remove_element(&mut self, anchor: NodeId) -> Result<(), EditorError> {
        self.remove_occurrence(anchor).await?;
        self.refresh_auto_keys().await?;
        Ok(())
    }
}
