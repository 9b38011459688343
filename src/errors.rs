use thiserror::Error;

use crate::node::NodeId;

#[derive(Error, Debug)]
pub enum TreeError {
    #[error("node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("cannot delete the root node: {0}")]
    RootDeletion(NodeId),

    #[error("cannot duplicate the root node: {0}")]
    RootDuplication(NodeId),

    #[error("move of {node} into {target} would create a cycle")]
    CyclicMove { node: NodeId, target: NodeId },

    #[error("node is not movable: {0}")]
    NotMovable(NodeId),

    #[error("node is not renamable: {0}")]
    NotRenamable(NodeId),

    #[error("identifier collision: {0}")]
    DuplicateId(NodeId),

    #[error("tree invariant violated: {reason}")]
    Inconsistent { reason: String },
}

pub type TreeResult<T> = Result<T, TreeError>;
