//! XTE Form Tree - explicit model of the rendered template
//!
//! The server renders an XML template as a hierarchical form. This crate
//! models that structure explicitly (arena-allocated tree) so that path
//! derivation and structural edits operate on data instead of live markup.

mod events;
mod fragment;
mod node;
mod path;
mod tree;

pub use events::{EventLog, StructureEvent, StructureEventKind};
pub use fragment::{scan, FragmentInfo, AUTO_KEY_CLASS};
pub use node::{ElementData, ModuleMarker, Node, NodeData};
pub use path::{xpath, PathError, PathLabel};
pub use tree::{DomError, DomResult, FormTree};

/// Node identifier (index into arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Sentinel for "no node"
    pub const NONE: NodeId = NodeId(u32::MAX);

    /// The schema root, always the first node of a tree
    pub const ROOT: NodeId = NodeId(0);

    /// Check if this is the sentinel
    #[inline]
    pub fn is_none(self) -> bool {
        self == Self::NONE
    }
}
