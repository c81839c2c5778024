//! XTE Editor - template editor session
//!
//! The editing surface of the XML template editor: attaching and detaching
//! modules at tree locations, filtering the module picker, adding and
//! removing repeated form elements, configuring modules through popups, and
//! refreshing auto-generated key fields after structural changes.
//!
//! All remote effects go through the `xte-net` service contracts; the tree
//! is only mutated after the server confirms a change.

mod autokey;
mod binder;
mod elements;
mod files;
mod filter;
mod popup;
mod session;

pub use autokey::{AutoKeyRefresher, RefreshState};
pub use files::display_file_name;
pub use filter::{ModuleRow, ModuleTable};
pub use popup::{DataExtractor, PopupConfig, PopupOptions, PopupRegistry};
pub use session::{EditorLocks, EditorSession};

use xte_dom::{DomError, PathError};
use xte_net::NetError;

/// Editor operation errors
#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    /// No tree node has been targeted yet
    #[error("no tree node is targeted")]
    NoTarget,

    /// Module table row out of range
    #[error("no module at row {0}")]
    UnknownModule(usize),

    /// A mutating request is already in flight for this node
    #[error("a request is already in flight for this node")]
    NodeBusy,

    /// Add/remove controls are disabled by an in-flight request
    #[error("add/remove controls are locked by an in-flight request")]
    ControlsLocked,

    /// No ancestor carries a server-assigned element id
    #[error("no ancestor with an element id")]
    NoIdentifiedAncestor,

    /// The node has no module marker
    #[error("no module attached at this node")]
    NoModuleAttached,

    /// A configuration dialog is already active
    #[error("a configuration dialog is already open")]
    DialogAlreadyOpen,

    /// No configuration dialog is active
    #[error("no configuration dialog is open")]
    DialogNotOpen,

    /// No popup configuration registered under the module's URL key
    #[error("no popup configuration registered for {0}")]
    PopupNotRegistered(String),

    /// Tree operation failed
    #[error(transparent)]
    Dom(#[from] DomError),

    /// Path derivation failed
    #[error(transparent)]
    Path(#[from] PathError),

    /// Remote service failed
    #[error(transparent)]
    Net(#[from] NetError),
}
