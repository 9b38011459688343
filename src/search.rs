//! Substring search over the hierarchy with ancestor-match propagation.
//!
//! The index holds only the last query string plus a memo of per-node
//! subtree results. The memo is tagged with the store revision it was
//! computed against and dropped whenever the store moves on, so results are
//! always computed over the current snapshot.

use std::collections::HashMap;

use tracing::debug;

use crate::node::{Node, NodeId};
use crate::store::TreeStore;

/// Per-query match state over a [`TreeStore`] snapshot.
#[derive(Debug, Default)]
pub struct SearchIndex {
    query: String,
    /// Query lowered once at `set_query`
    lowered: String,
    /// node id -> "some proper descendant matches", valid at `memo_revision`
    memo: HashMap<NodeId, bool>,
    memo_revision: u64,
}

impl SearchIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the active query. An empty query deactivates search.
    pub fn set_query(&mut self, text: &str) {
        debug!("set_query: '{}'", text);
        self.query = text.to_string();
        self.lowered = text.to_lowercase();
        self.memo.clear();
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn is_active(&self) -> bool {
        !self.query.is_empty()
    }

    /// Case-insensitive substring test against the node's name.
    /// An empty query matches nothing.
    pub fn matches(&self, node: &Node) -> bool {
        !self.lowered.is_empty() && node.name.to_lowercase().contains(&self.lowered)
    }

    /// True iff any proper descendant of `id` directly matches. Used to mark
    /// "contains matches" on ancestors and to pick containers to auto-expand.
    pub fn subtree_contains_match(&mut self, store: &TreeStore, id: &NodeId) -> bool {
        if !self.is_active() {
            return false;
        }
        self.refresh_memo(store);
        self.contains_match_memoized(store, id)
    }

    /// First direct match in the store's stable pre-order from the root.
    pub fn first_match(&mut self, store: &TreeStore) -> Option<NodeId> {
        if !self.is_active() {
            return None;
        }
        store
            .iter()
            .find(|(_, node)| self.matches(node))
            .map(|(id, _)| id.clone())
    }

    fn refresh_memo(&mut self, store: &TreeStore) {
        if self.memo_revision != store.revision() {
            self.memo.clear();
            self.memo_revision = store.revision();
        }
    }

    fn contains_match_memoized(&mut self, store: &TreeStore, id: &NodeId) -> bool {
        if let Some(&cached) = self.memo.get(id) {
            return cached;
        }
        let children: Vec<NodeId> = store.children_of(id).to_vec();
        let mut result = false;
        for child in &children {
            let direct = store.get(child).map(|node| self.matches(node)).unwrap_or(false);
            if direct || self.contains_match_memoized(store, child) {
                result = true;
                break;
            }
        }
        self.memo.insert(id.clone(), result);
        result
    }
}
