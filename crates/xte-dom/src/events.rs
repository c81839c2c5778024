//! Structure events
//!
//! Components that mutate the form tree record an event for every change.
//! The auto-key refresher drains the log instead of observing mutations
//! implicitly, making the notification contract explicit.

use crate::NodeId;

/// Structure event types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructureEventKind {
    /// A node was linked into the tree
    NodeInserted,
    /// A node was unlinked from the tree
    NodeRemoved,
    /// A node's rendered fragment was replaced in place
    FragmentReplaced,
}

/// A recorded structure change
#[derive(Debug, Clone)]
pub struct StructureEvent {
    pub kind: StructureEventKind,
    pub target: NodeId,
    pub parent: Option<NodeId>,
}

impl StructureEvent {
    /// Record a node insertion
    pub fn node_inserted(target: NodeId, parent: NodeId) -> Self {
        Self {
            kind: StructureEventKind::NodeInserted,
            target,
            parent: Some(parent),
        }
    }

    /// Record a node removal
    pub fn node_removed(target: NodeId, parent: NodeId) -> Self {
        Self {
            kind: StructureEventKind::NodeRemoved,
            target,
            parent: Some(parent),
        }
    }

    /// Record an in-place fragment replacement
    pub fn fragment_replaced(target: NodeId) -> Self {
        Self {
            kind: StructureEventKind::FragmentReplaced,
            target,
            parent: None,
        }
    }
}

/// Ordered log of structure changes since the last drain
#[derive(Debug, Default)]
pub struct EventLog {
    events: Vec<StructureEvent>,
}

impl EventLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an event
    pub fn push(&mut self, event: StructureEvent) {
        tracing::trace!("structure event: {:?} on {:?}", event.kind, event.target);
        self.events.push(event);
    }

    /// Take all recorded events, leaving the log empty
    pub fn drain(&mut self) -> Vec<StructureEvent> {
        std::mem::take(&mut self.events)
    }

    /// Number of pending events
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Check if any events are pending
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
