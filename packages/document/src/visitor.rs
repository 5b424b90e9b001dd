//! Traversal contract.
//!
//! External consumers (export renderers, analysis passes) walk the tree
//! through this trait instead of reaching into engine internals. The default
//! implementation visits every node in document order.

use crate::node::DocumentNode;

/// Immutable document traversal.
///
/// Override `visit_node` to act on nodes; call [`walk_node`] inside the
/// override to keep descending.
pub trait Visitor: Sized {
    fn visit_node(&mut self, node: &DocumentNode) {
        walk_node(self, node);
    }
}

/// Visit `node`'s children in order.
pub fn walk_node<V: Visitor>(visitor: &mut V, node: &DocumentNode) {
    for child in &node.children {
        visitor.visit_node(child);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use penmark_common::NodeKey;

    struct TypeCollector(Vec<String>);

    impl Visitor for TypeCollector {
        fn visit_node(&mut self, node: &DocumentNode) {
            self.0.push(node.node_type.clone());
            walk_node(self, node);
        }
    }

    #[test]
    fn visits_in_document_order() {
        let root = DocumentNode::new(NodeKey::new("r"), "root")
            .child(DocumentNode::new(NodeKey::new("a"), "paragraph"))
            .child(
                DocumentNode::new(NodeKey::new("b"), "table")
                    .child(DocumentNode::new(NodeKey::new("c"), "table-row")),
            );

        let mut collector = TypeCollector(Vec::new());
        collector.visit_node(&root);
        assert_eq!(collector.0, ["root", "paragraph", "table", "table-row"]);
    }
}
