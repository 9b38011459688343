//! Change notification boundary.
//!
//! After each committed mutation the engine reports the affected node ids to
//! registered listeners. The notification is the only re-render trigger for
//! external observers; they must not infer change by polling.

use crate::node::NodeId;

/// The set of node ids touched by one committed mutation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    /// Nodes that did not exist before the mutation
    pub created: Vec<NodeId>,
    /// Nodes whose `name`, `children`, or capability flags changed
    pub updated: Vec<NodeId>,
    /// Nodes removed from the store
    pub removed: Vec<NodeId>,
}

impl ChangeSet {
    pub fn created(id: NodeId) -> Self {
        Self {
            created: vec![id],
            ..Self::default()
        }
    }

    pub fn updated(id: NodeId) -> Self {
        Self {
            updated: vec![id],
            ..Self::default()
        }
    }

    /// All affected ids, created first, in report order.
    pub fn affected_ids(&self) -> impl Iterator<Item = &NodeId> {
        self.created
            .iter()
            .chain(self.updated.iter())
            .chain(self.removed.iter())
    }

    pub fn is_empty(&self) -> bool {
        self.created.is_empty() && self.updated.is_empty() && self.removed.is_empty()
    }
}

/// Observer boundary for the rendering/interaction layer.
pub trait ChangeListener: Send + Sync {
    fn tree_changed(&self, changes: &ChangeSet);
}
