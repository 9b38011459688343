//! Core entities: node identifiers, categories, and the node itself.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque unique identifier of a node. Immutable once assigned; primary key
/// in the [`TreeStore`](crate::store::TreeStore).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for NodeId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Descriptive tag of a node. Carries no structural behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    Conference,
    Division,
    Team,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Category::Conference => "Conference",
            Category::Division => "Division",
            Category::Team => "Team",
        };
        write!(f, "{s}")
    }
}

/// A single entry in the hierarchy.
///
/// Presence of `children` (even empty) makes the node a *container*; absence
/// makes it a *leaf*. This is the only folder-ness signal; there is no
/// separate boolean, neither in memory nor on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub name: String,
    pub category: Category,
    /// Ordered child ids. `None` for leaves.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<NodeId>>,
    /// Whether the node may be moved, deleted, or (for a parent) given children.
    #[serde(default = "default_true", skip_serializing_if = "is_true")]
    pub movable: bool,
    /// Whether the node may be renamed.
    #[serde(default = "default_true", skip_serializing_if = "is_true")]
    pub renamable: bool,
}

fn default_true() -> bool {
    true
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_true(v: &bool) -> bool {
    *v
}

impl Node {
    /// Create a leaf node (no `children` sequence).
    pub fn leaf(id: NodeId, name: impl Into<String>, category: Category) -> Self {
        Self {
            id,
            name: name.into(),
            category,
            children: None,
            movable: true,
            renamable: true,
        }
    }

    /// Create an empty container node.
    pub fn container(id: NodeId, name: impl Into<String>, category: Category) -> Self {
        Self {
            children: Some(Vec::new()),
            ..Self::leaf(id, name, category)
        }
    }

    /// Container-ness is derived strictly from `children` presence.
    pub fn is_container(&self) -> bool {
        self.children.is_some()
    }

    /// Child ids in display order; empty slice for leaves and empty containers.
    pub fn child_ids(&self) -> &[NodeId] {
        self.children.as_deref().unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_leaf_node_when_serialized_then_omits_children_and_default_flags() {
        let node = Node::leaf(NodeId::from("n1"), "East", Category::Division);
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"id": "n1", "name": "East", "category": "Division"})
        );
    }

    #[test]
    fn given_empty_container_when_serialized_then_keeps_children_field() {
        let node = Node::container(NodeId::from("n2"), "NFC", Category::Conference);
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["children"], serde_json::json!([]));
    }

    #[test]
    fn given_json_without_flags_when_deserialized_then_flags_default_to_true() {
        let node: Node =
            serde_json::from_str(r#"{"id": "x", "name": "Bears", "category": "Team"}"#).unwrap();
        assert!(node.movable);
        assert!(node.renamable);
        assert!(!node.is_container());
    }
}
