//! Whole-tree serialization: the exchange shape for external collaborators.
//!
//! Container-ness travels as `children` presence, exactly like the in-memory
//! model; no derived folder boolean is stored in either direction. Restoring
//! runs the full invariant validation so a hand-edited snapshot can never
//! produce an inconsistent store.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::errors::{TreeError, TreeResult};
use crate::node::{Node, NodeId};
use crate::store::TreeStore;

/// Serialized tree: `{ rootId, nodes }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeSnapshot {
    pub root_id: NodeId,
    /// BTreeMap keeps the serialized form stable for diffing.
    pub nodes: BTreeMap<NodeId, Node>,
}

impl TreeSnapshot {
    /// Capture the current store state.
    pub fn capture(store: &TreeStore) -> Self {
        let nodes = store
            .iter()
            .map(|(id, node)| (id.clone(), node.clone()))
            .collect();
        Self {
            root_id: store.root_id().clone(),
            nodes,
        }
    }

    /// Rebuild a store from the snapshot, validating every invariant.
    pub fn restore(self) -> TreeResult<TreeStore> {
        let mut nodes = self.nodes;
        let root = nodes
            .remove(&self.root_id)
            .ok_or_else(|| TreeError::Inconsistent {
                reason: format!("root {} missing from snapshot", self.root_id),
            })?;
        for (key, node) in &nodes {
            if key != &node.id {
                return Err(TreeError::Inconsistent {
                    reason: format!("map key {} disagrees with node id {}", key, node.id),
                });
            }
        }
        if root.id != self.root_id {
            return Err(TreeError::Inconsistent {
                reason: format!("map key {} disagrees with node id {}", self.root_id, root.id),
            });
        }

        let mut store = TreeStore::new(root);
        for (_, node) in nodes {
            store.insert_node(node);
        }
        store.validate()?;
        Ok(store)
    }
}
