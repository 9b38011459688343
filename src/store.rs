//! Map-based tree store for the node hierarchy.
//!
//! Owns the id-to-node map and the root id, keeps a derived child-to-parent index
//! for O(1) parent lookup, and validates the structural invariants on demand.
//! All mutation goes through the `MutationEngine`; the crate-visible raw
//! operations here leave invariant maintenance to that caller.

use std::collections::{HashMap, HashSet};

use itertools::Itertools;
use tracing::instrument;

use crate::errors::{TreeError, TreeResult};
use crate::node::{Node, NodeId};

/// Tree store: single owner of all nodes in one hierarchy.
#[derive(Debug)]
pub struct TreeStore {
    /// All nodes, keyed by id
    nodes: HashMap<NodeId, Node>,
    /// Designated root id
    root: NodeId,
    /// Derived reverse index: child id -> parent id. Maintained incrementally
    /// on every structural change.
    parents: HashMap<NodeId, NodeId>,
    /// Bumped on every mutation; lets read-side caches detect staleness.
    revision: u64,
}

impl TreeStore {
    /// Create a store holding only `root`.
    pub fn new(root: Node) -> Self {
        let root_id = root.id.clone();
        let mut parents = HashMap::new();
        for child in root.child_ids() {
            parents.insert(child.clone(), root_id.clone());
        }
        let mut nodes = HashMap::new();
        nodes.insert(root_id.clone(), root);
        Self {
            nodes,
            root: root_id,
            parents,
            revision: 0,
        }
    }

    pub fn root_id(&self) -> &NodeId {
        &self.root
    }

    /// Current revision counter. Any mutation moves it forward.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    #[instrument(level = "trace", skip(self))]
    pub fn get(&self, id: &NodeId) -> TreeResult<&Node> {
        self.nodes
            .get(id)
            .ok_or_else(|| TreeError::NodeNotFound(id.clone()))
    }

    /// Child ids in display order; empty for leaves and empty containers.
    #[instrument(level = "trace", skip(self))]
    pub fn children_of(&self, id: &NodeId) -> &[NodeId] {
        self.nodes.get(id).map(Node::child_ids).unwrap_or(&[])
    }

    /// Parent id, `None` for the root (and for unknown ids).
    #[instrument(level = "trace", skip(self))]
    pub fn parent_of(&self, id: &NodeId) -> Option<&NodeId> {
        self.parents.get(id)
    }

    /// True if `ancestor` lies on the parent chain of `id`, or is `id` itself.
    pub fn is_ancestor_or_self(&self, ancestor: &NodeId, id: &NodeId) -> bool {
        if ancestor == id {
            return true;
        }
        let mut current = self.parents.get(id);
        while let Some(p) = current {
            if p == ancestor {
                return true;
            }
            current = self.parents.get(p);
        }
        false
    }

    /// `id` plus all of its descendants, pre-order. Traversal is iterative
    /// over the children lists and cannot loop while the acyclicity invariant
    /// holds.
    #[instrument(level = "trace", skip(self))]
    pub fn subtree_ids(&self, id: &NodeId) -> Vec<NodeId> {
        let mut collected = Vec::new();
        let mut stack = vec![id.clone()];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.get(&current) {
                for child in node.child_ids().iter().rev() {
                    stack.push(child.clone());
                }
            }
            collected.push(current);
        }
        collected
    }

    /// Height of the tree (a lone root counts as 1).
    pub fn depth(&self) -> usize {
        self.calculate_depth(&self.root)
    }

    fn calculate_depth(&self, id: &NodeId) -> usize {
        match self.nodes.get(id) {
            Some(node) => {
                1 + node
                    .child_ids()
                    .iter()
                    .map(|child| self.calculate_depth(child))
                    .max()
                    .unwrap_or(0)
            }
            None => 0,
        }
    }

    /// Stable pre-order traversal from the root, children in stored order.
    pub fn iter(&self) -> PreOrderIter<'_> {
        PreOrderIter::new(self)
    }

    /// Leaves-first traversal from the root.
    pub fn iter_postorder(&self) -> PostOrderIter<'_> {
        PostOrderIter::new(self)
    }

    // ============================================================
    // RAW OPERATIONS (engine-only; callers maintain invariants)
    // ============================================================

    /// Mutable node access. Bumps the revision: callers only take this to
    /// change the node.
    pub(crate) fn node_mut(&mut self, id: &NodeId) -> TreeResult<&mut Node> {
        self.revision += 1;
        self.nodes
            .get_mut(id)
            .ok_or_else(|| TreeError::NodeNotFound(id.clone()))
    }

    /// Insert a detached node into the map and index any children it already
    /// carries (used by subtree cloning).
    pub(crate) fn insert_node(&mut self, node: Node) {
        self.revision += 1;
        for child in node.child_ids() {
            self.parents.insert(child.clone(), node.id.clone());
        }
        self.nodes.insert(node.id.clone(), node);
    }

    /// Remove a node from the map and drop its reverse-index entry. Children
    /// are not touched; the engine removes whole subtrees.
    pub(crate) fn remove_node(&mut self, id: &NodeId) -> Option<Node> {
        self.revision += 1;
        self.parents.remove(id);
        self.nodes.remove(id)
    }

    /// Give `id` an empty `children` sequence if it has none (leaf to container).
    /// Returns true when the conversion fired. The transition is one-way:
    /// nothing in the store ever removes an existing `children` sequence.
    pub(crate) fn ensure_container(&mut self, id: &NodeId) -> TreeResult<bool> {
        let node = self.node_mut(id)?;
        if node.children.is_none() {
            node.children = Some(Vec::new());
            return Ok(true);
        }
        Ok(false)
    }

    /// Splice `child` into `parent`'s children at `index` (clamped) and
    /// update the reverse index. The parent must already be a container.
    pub(crate) fn link_child(
        &mut self,
        parent: &NodeId,
        child: NodeId,
        index: usize,
    ) -> TreeResult<()> {
        let parent_node = self.node_mut(parent)?;
        let children = parent_node
            .children
            .as_mut()
            .ok_or_else(|| TreeError::Inconsistent {
                reason: format!("link target {parent} is not a container"),
            })?;
        let index = index.min(children.len());
        children.insert(index, child.clone());
        self.parents.insert(child, parent.clone());
        Ok(())
    }

    /// Remove `child` from `parent`'s children and the reverse index.
    pub(crate) fn unlink_child(&mut self, parent: &NodeId, child: &NodeId) -> TreeResult<()> {
        let child_key = child.clone();
        let parent_node = self.node_mut(parent)?;
        if let Some(children) = parent_node.children.as_mut() {
            children.retain(|c| c != &child_key);
        }
        self.parents.remove(&child_key);
        Ok(())
    }

    // ============================================================
    // INVARIANT VALIDATION
    // ============================================================

    /// Check the structural invariants explicitly:
    /// referenced child ids exist, every non-root node has exactly one parent,
    /// the tree is acyclic and fully reachable from the root, and the derived
    /// parent index agrees with the children lists.
    pub fn validate(&self) -> TreeResult<()> {
        if !self.nodes.contains_key(&self.root) {
            return Err(TreeError::Inconsistent {
                reason: format!("root {} missing from node map", self.root),
            });
        }

        let all_child_refs: Vec<&NodeId> =
            self.nodes.values().flat_map(|n| n.child_ids()).collect();

        for child in &all_child_refs {
            if !self.nodes.contains_key(child) {
                return Err(TreeError::Inconsistent {
                    reason: format!("dangling child reference: {child}"),
                });
            }
        }

        if let Some(dup) = all_child_refs.iter().duplicates().next() {
            return Err(TreeError::Inconsistent {
                reason: format!("node {dup} has more than one parent"),
            });
        }

        if all_child_refs.iter().any(|c| **c == self.root) {
            return Err(TreeError::Inconsistent {
                reason: format!("root {} appears as a child", self.root),
            });
        }

        // Reachability doubles as the cycle check: every non-root node must be
        // reached exactly once walking the children lists from the root.
        let mut visited: HashSet<&NodeId> = HashSet::new();
        let mut stack = vec![&self.root];
        while let Some(current) = stack.pop() {
            if !visited.insert(current) {
                return Err(TreeError::Inconsistent {
                    reason: format!("cycle detected at {current}"),
                });
            }
            if let Some(node) = self.nodes.get(current) {
                stack.extend(node.child_ids());
            }
        }
        if visited.len() != self.nodes.len() {
            return Err(TreeError::Inconsistent {
                reason: format!(
                    "{} node(s) unreachable from root",
                    self.nodes.len() - visited.len()
                ),
            });
        }

        for (child, parent) in &self.parents {
            let listed = self
                .nodes
                .get(parent)
                .map(|p| p.child_ids().contains(child))
                .unwrap_or(false);
            if !listed {
                return Err(TreeError::Inconsistent {
                    reason: format!("parent index stale: {child} -> {parent}"),
                });
            }
        }

        Ok(())
    }
}

pub struct PreOrderIter<'a> {
    store: &'a TreeStore,
    stack: Vec<&'a NodeId>,
}

impl<'a> PreOrderIter<'a> {
    fn new(store: &'a TreeStore) -> Self {
        Self {
            store,
            stack: vec![&store.root],
        }
    }
}

impl<'a> Iterator for PreOrderIter<'a> {
    type Item = (&'a NodeId, &'a Node);

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.stack.pop()?;
        let node = self.store.nodes.get(current)?;
        // Push children in reverse order for left-to-right traversal
        for child in node.child_ids().iter().rev() {
            self.stack.push(child);
        }
        Some((current, node))
    }
}

pub struct PostOrderIter<'a> {
    store: &'a TreeStore,
    stack: Vec<(&'a NodeId, bool)>,
}

impl<'a> PostOrderIter<'a> {
    fn new(store: &'a TreeStore) -> Self {
        Self {
            store,
            stack: vec![(&store.root, false)],
        }
    }
}

impl<'a> Iterator for PostOrderIter<'a> {
    type Item = (&'a NodeId, &'a Node);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((current, visited)) = self.stack.pop() {
            if let Some(node) = self.store.nodes.get(current) {
                if !visited {
                    self.stack.push((current, true));
                    for child in node.child_ids().iter().rev() {
                        self.stack.push((child, false));
                    }
                } else {
                    return Some((current, node));
                }
            }
        }
        None
    }
}
