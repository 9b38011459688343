//! Mutation engine: every structural edit of the hierarchy goes through here.
//!
//! Operations are atomic: all validation (existence, capability flags, cycle
//! checks) happens before the first store mutation, so a failure leaves the
//! tree exactly as it was. Successful operations return the affected-id set
//! and notify registered listeners.

use std::collections::HashMap;

use tracing::{debug, instrument};

use crate::errors::{TreeError, TreeResult};
use crate::ident::{IdProvider, UuidProvider};
use crate::node::{Category, Node, NodeId};
use crate::notify::{ChangeListener, ChangeSet};
use crate::store::TreeStore;

/// Suffix appended to the clone root's name by `duplicate_subtree`.
pub const COPY_MARKER: &str = " (Copy)";

/// Collision re-rolls before the id provider is declared broken.
const MAX_ID_REROLLS: usize = 8;

/// Placement of a child within its parent's ordered children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    Front,
    Back,
    /// Exact index, clamped to the current children length.
    At(usize),
}

impl Position {
    fn resolve(self, len: usize) -> usize {
        match self {
            Position::Front => 0,
            Position::Back => len,
            Position::At(index) => index.min(len),
        }
    }
}

/// Shape of a newly inserted node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Leaf,
    Container,
}

/// Capability flag selector for [`MutationEngine::set_capability`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Movable,
    Renamable,
}

/// Single mutation entry point over a [`TreeStore`].
pub struct MutationEngine {
    store: TreeStore,
    ids: Box<dyn IdProvider>,
    listeners: Vec<Box<dyn ChangeListener>>,
}

impl MutationEngine {
    /// Engine over a store holding only `root`, with random v4 ids.
    pub fn new(root: Node) -> Self {
        Self::with_provider(root, Box::new(UuidProvider))
    }

    /// Engine with a caller-supplied id provider (deterministic tests).
    pub fn with_provider(root: Node, ids: Box<dyn IdProvider>) -> Self {
        Self {
            store: TreeStore::new(root),
            ids,
            listeners: Vec::new(),
        }
    }

    /// Read-only view of the store, for search and external observers.
    pub fn store(&self) -> &TreeStore {
        &self.store
    }

    /// Register an observer notified after every committed mutation.
    pub fn add_listener(&mut self, listener: Box<dyn ChangeListener>) {
        self.listeners.push(listener);
    }

    // Read-through surface

    pub fn get(&self, id: &NodeId) -> TreeResult<&Node> {
        self.store.get(id)
    }

    pub fn children_of(&self, id: &NodeId) -> &[NodeId] {
        self.store.children_of(id)
    }

    pub fn parent_of(&self, id: &NodeId) -> Option<&NodeId> {
        self.store.parent_of(id)
    }

    // ============================================================
    // OPERATIONS
    // ============================================================

    /// Set a node's display name. No structural effect.
    #[instrument(level = "debug", skip(self))]
    pub fn rename(&mut self, id: &NodeId, new_name: &str) -> TreeResult<ChangeSet> {
        let node = self.store.get(id)?;
        if !node.renamable {
            return Err(TreeError::NotRenamable(id.clone()));
        }
        debug!("rename: {} '{}' -> '{}'", id, node.name, new_name);
        self.store.node_mut(id)?.name = new_name.to_string();
        Ok(self.commit(ChangeSet::updated(id.clone())))
    }

    /// Flip a capability flag. No structural effect.
    #[instrument(level = "debug", skip(self))]
    pub fn set_capability(
        &mut self,
        id: &NodeId,
        capability: Capability,
        value: bool,
    ) -> TreeResult<ChangeSet> {
        self.store.get(id)?;
        let node = self.store.node_mut(id)?;
        match capability {
            Capability::Movable => node.movable = value,
            Capability::Renamable => node.renamable = value,
        }
        Ok(self.commit(ChangeSet::updated(id.clone())))
    }

    /// Create a new node under `parent_id` at `position`.
    ///
    /// A leaf parent is folder-converted: it gains an empty `children`
    /// sequence the moment it receives its first child, and never loses it
    /// again.
    #[instrument(level = "debug", skip(self))]
    pub fn insert_child(
        &mut self,
        parent_id: &NodeId,
        name: &str,
        category: Category,
        kind: NodeKind,
        position: Position,
    ) -> TreeResult<ChangeSet> {
        let parent = self.store.get(parent_id)?;
        if !parent.movable {
            return Err(TreeError::NotMovable(parent_id.clone()));
        }
        let new_id = self.fresh_unique_id()?;
        debug!("insert_child: '{}' ({:?}) under {}", name, kind, parent_id);

        self.store.ensure_container(parent_id)?;
        let node = match kind {
            NodeKind::Leaf => Node::leaf(new_id.clone(), name, category),
            NodeKind::Container => Node::container(new_id.clone(), name, category),
        };
        self.store.insert_node(node);
        let index = position.resolve(self.store.children_of(parent_id).len());
        self.store.link_child(parent_id, new_id.clone(), index)?;

        Ok(self.commit(ChangeSet {
            created: vec![new_id],
            updated: vec![parent_id.clone()],
            removed: vec![],
        }))
    }

    /// Remove `id` and its entire descendant subtree.
    #[instrument(level = "debug", skip(self))]
    pub fn delete_subtree(&mut self, id: &NodeId) -> TreeResult<ChangeSet> {
        if id == self.store.root_id() {
            return Err(TreeError::RootDeletion(id.clone()));
        }
        let node = self.store.get(id)?;
        if !node.movable {
            return Err(TreeError::NotMovable(id.clone()));
        }
        let parent = self.parent_expected(id)?;

        let doomed = self.store.subtree_ids(id);
        debug!("delete_subtree: {} ({} node(s))", id, doomed.len());
        self.store.unlink_child(&parent, id)?;
        for victim in &doomed {
            self.store.remove_node(victim);
        }

        Ok(self.commit(ChangeSet {
            created: vec![],
            updated: vec![parent],
            removed: doomed,
        }))
    }

    /// Deep-clone the subtree rooted at `id`.
    ///
    /// Every node in the clone gets a fresh id; `category`, capability flags,
    /// names, and child ordering are preserved, except the clone root's name,
    /// which gains the copy marker. The clone lands immediately after the
    /// original among its siblings. Duplicating the root is disallowed.
    #[instrument(level = "debug", skip(self))]
    pub fn duplicate_subtree(&mut self, id: &NodeId) -> TreeResult<ChangeSet> {
        if id == self.store.root_id() {
            return Err(TreeError::RootDuplication(id.clone()));
        }
        self.store.get(id)?;
        let parent = self.parent_expected(id)?;

        // Allocate the full id mapping up front so a provider failure cannot
        // leave a half-inserted clone.
        let originals = self.store.subtree_ids(id);
        let mut id_map: HashMap<NodeId, NodeId> = HashMap::new();
        for original in &originals {
            let fresh = self.fresh_unique_id_excluding(&id_map)?;
            id_map.insert(original.clone(), fresh);
        }
        debug!("duplicate_subtree: {} ({} node(s))", id, originals.len());

        let mut created = Vec::with_capacity(originals.len());
        for original in &originals {
            let source = self.store.get(original)?.clone();
            let mut clone = Node {
                id: id_map[original].clone(),
                children: source.children.as_ref().map(|children| {
                    children.iter().map(|c| id_map[c].clone()).collect()
                }),
                ..source
            };
            if original == id {
                clone.name.push_str(COPY_MARKER);
            }
            created.push(clone.id.clone());
            self.store.insert_node(clone);
        }

        let siblings = self.store.children_of(&parent);
        let index = siblings
            .iter()
            .position(|sibling| sibling == id)
            .map(|i| i + 1)
            .unwrap_or(siblings.len());
        self.store.link_child(&parent, id_map[id].clone(), index)?;

        Ok(self.commit(ChangeSet {
            created,
            updated: vec![parent],
            removed: vec![],
        }))
    }

    /// Move `id` under `new_parent_id` at `position` (drag-and-drop).
    ///
    /// A structural move, not a copy: exactly one instance of `id` exists
    /// afterward. A leaf target is folder-converted. Moving a node into
    /// itself or any of its descendants fails with `CyclicMove`, which also
    /// covers every attempt to move the root.
    #[instrument(level = "debug", skip(self))]
    pub fn reparent(
        &mut self,
        id: &NodeId,
        new_parent_id: &NodeId,
        position: Position,
    ) -> TreeResult<ChangeSet> {
        let node = self.store.get(id)?;
        if !node.movable {
            return Err(TreeError::NotMovable(id.clone()));
        }
        self.store.get(new_parent_id)?;
        if self.store.is_ancestor_or_self(id, new_parent_id) {
            return Err(TreeError::CyclicMove {
                node: id.clone(),
                target: new_parent_id.clone(),
            });
        }
        let old_parent = self.parent_expected(id)?;
        debug!("reparent: {} from {} to {}", id, old_parent, new_parent_id);

        self.store.unlink_child(&old_parent, id)?;
        self.store.ensure_container(new_parent_id)?;
        let index = position.resolve(self.store.children_of(new_parent_id).len());
        self.store.link_child(new_parent_id, id.clone(), index)?;

        let mut updated = vec![id.clone(), old_parent];
        if !updated.contains(new_parent_id) {
            updated.push(new_parent_id.clone());
        }
        Ok(self.commit(ChangeSet {
            created: vec![],
            updated,
            removed: vec![],
        }))
    }

    // ============================================================
    // INTERNAL
    // ============================================================

    /// Parent of a non-root node. Absence means the single-parent invariant
    /// is broken, which the store reports as an inconsistency.
    fn parent_expected(&self, id: &NodeId) -> TreeResult<NodeId> {
        self.store
            .parent_of(id)
            .cloned()
            .ok_or_else(|| TreeError::Inconsistent {
                reason: format!("non-root node {id} has no parent"),
            })
    }

    fn fresh_unique_id(&self) -> TreeResult<NodeId> {
        self.fresh_unique_id_excluding(&HashMap::new())
    }

    /// Fresh id colliding neither with the store nor with `pending` values.
    fn fresh_unique_id_excluding(
        &self,
        pending: &HashMap<NodeId, NodeId>,
    ) -> TreeResult<NodeId> {
        let mut candidate = self.ids.fresh_id();
        for _ in 0..MAX_ID_REROLLS {
            let taken = self.store.contains(&candidate)
                || pending.values().any(|reserved| reserved == &candidate);
            if !taken {
                return Ok(candidate);
            }
            candidate = self.ids.fresh_id();
        }
        Err(TreeError::DuplicateId(candidate))
    }

    fn commit(&mut self, changes: ChangeSet) -> ChangeSet {
        for listener in &self.listeners {
            listener.tree_changed(&changes);
        }
        changes
    }
}
