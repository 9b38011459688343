//! Diagnostic rendering of the hierarchy as an ASCII tree.

use termtree::Tree;

use crate::node::{Node, NodeId};
use crate::store::TreeStore;

pub trait TreeDisplay {
    fn to_tree_string(&self) -> Tree<String>;
}

fn label(node: &Node) -> String {
    format!("{} [{}]", node.name, node.category)
}

impl TreeDisplay for TreeStore {
    fn to_tree_string(&self) -> Tree<String> {
        fn build(store: &TreeStore, id: &NodeId, parent_tree: &mut Tree<String>) {
            for child_id in store.children_of(id) {
                if let Ok(child) = store.get(child_id) {
                    let mut child_tree = Tree::new(label(child));
                    build(store, child_id, &mut child_tree);
                    parent_tree.push(child_tree);
                }
            }
        }

        let root_id = self.root_id();
        let root_label = self
            .get(root_id)
            .map(label)
            .unwrap_or_else(|_| "Empty tree".to_string());
        let mut tree = Tree::new(root_label);
        build(self, root_id, &mut tree);
        tree
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Category;

    #[test]
    fn given_store_when_rendering_then_children_are_nested() {
        let mut root = Node::container(NodeId::from("root"), "League", Category::Conference);
        root.children = Some(vec![NodeId::from("a")]);
        let mut store = TreeStore::new(root);
        store.insert_node(Node::leaf(NodeId::from("a"), "East", Category::Division));

        let rendered = store.to_tree_string().to_string();
        assert!(rendered.contains("League [Conference]"));
        assert!(rendered.contains("East [Division]"));
    }
}
