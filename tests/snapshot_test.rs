//! Integration tests for the serialized tree exchange shape.

use rstest::{fixture, rstest};

use orgtree::util::testing::init_test_setup;
use orgtree::{
    Category, MutationEngine, Node, NodeId, NodeKind, Position, SerialProvider, TreeSnapshot,
};

#[fixture]
fn league() -> MutationEngine {
    init_test_setup();
    let root = Node::container(NodeId::from("root"), "League", Category::Conference);
    let mut engine = MutationEngine::with_provider(root, Box::new(SerialProvider::new("n")));
    let root_id = NodeId::from("root");
    engine
        .insert_child(&root_id, "East", Category::Division, NodeKind::Container, Position::Back)
        .unwrap();
    engine
        .insert_child(&NodeId::from("n-1"), "Bears", Category::Team, NodeKind::Leaf, Position::Back)
        .unwrap();
    engine
}

// ============================================================
// Round trip
// ============================================================

#[rstest]
fn given_tree_when_round_tripping_through_json_then_structure_survives(league: MutationEngine) {
    let snapshot = TreeSnapshot::capture(league.store());
    let json = serde_json::to_string(&snapshot).unwrap();
    let parsed: TreeSnapshot = serde_json::from_str(&json).unwrap();
    let restored = parsed.restore().unwrap();

    assert_eq!(restored.root_id(), &NodeId::from("root"));
    assert_eq!(restored.len(), 3);
    assert_eq!(restored.children_of(&NodeId::from("n-1")), &[NodeId::from("n-2")]);
    assert_eq!(restored.parent_of(&NodeId::from("n-2")), Some(&NodeId::from("n-1")));
    restored.validate().unwrap();
}

#[rstest]
fn given_tree_when_serializing_then_wire_shape_matches_contract(league: MutationEngine) {
    let snapshot = TreeSnapshot::capture(league.store());
    let json = serde_json::to_value(&snapshot).unwrap();

    assert_eq!(json["rootId"], "root");
    // Leaf: no children key at all; container-ness travels as presence
    assert!(json["nodes"]["n-2"].get("children").is_none());
    assert_eq!(json["nodes"]["n-1"]["children"], serde_json::json!(["n-2"]));
    // Default-true capability flags are elided
    assert!(json["nodes"]["n-2"].get("movable").is_none());
}

// ============================================================
// Restore validation
// ============================================================

#[test]
fn given_snapshot_with_shared_child_when_restoring_then_fails() {
    let json = r#"{
        "rootId": "root",
        "nodes": {
            "root": {"id": "root", "name": "League", "category": "Conference",
                     "children": ["a", "b"]},
            "a": {"id": "a", "name": "East", "category": "Division", "children": ["c"]},
            "b": {"id": "b", "name": "West", "category": "Division", "children": ["c"]},
            "c": {"id": "c", "name": "Bears", "category": "Team"}
        }
    }"#;
    let snapshot: TreeSnapshot = serde_json::from_str(json).unwrap();
    let err = snapshot.restore().unwrap_err();
    assert!(err.to_string().contains("more than one parent"));
}

#[test]
fn given_snapshot_with_orphan_when_restoring_then_fails() {
    let json = r#"{
        "rootId": "root",
        "nodes": {
            "root": {"id": "root", "name": "League", "category": "Conference", "children": []},
            "stray": {"id": "stray", "name": "East", "category": "Division"}
        }
    }"#;
    let snapshot: TreeSnapshot = serde_json::from_str(json).unwrap();
    let err = snapshot.restore().unwrap_err();
    assert!(err.to_string().contains("unreachable"));
}

#[test]
fn given_snapshot_with_mismatched_key_when_restoring_then_fails() {
    let json = r#"{
        "rootId": "root",
        "nodes": {
            "root": {"id": "root", "name": "League", "category": "Conference", "children": ["a"]},
            "a": {"id": "zzz", "name": "East", "category": "Division"}
        }
    }"#;
    let snapshot: TreeSnapshot = serde_json::from_str(json).unwrap();
    let err = snapshot.restore().unwrap_err();
    assert!(err.to_string().contains("disagrees"));
}
