//! The document tree and its mutation contract.
//!
//! All mutation goes through `insert` / `set_attributes` / `remove`;
//! structural and addressing errors are rejected before anything is touched.
//! The resize engine and the rendering bridge never reach around this
//! contract.

use crate::builtins::{self, tags};
use crate::error::DocumentError;
use crate::node::{AttrMap, DocumentNode, NodePath};
use crate::registry::NodeTypeRegistry;
use crate::serializer;
use crate::visitor::Visitor;
use penmark_common::{KeyAllocator, NodeKey};
use serde_json::Value;
use tracing::debug;

/// Ordered, typed node structure representing editable content.
#[derive(Debug)]
pub struct DocumentTree {
    root: DocumentNode,
    keys: KeyAllocator,
}

impl Default for DocumentTree {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentTree {
    pub fn new() -> Self {
        let mut keys = KeyAllocator::new();
        let root = DocumentNode::new(keys.mint(), tags::ROOT);
        Self { root, keys }
    }

    /// Mint a key for a node about to be inserted.
    pub fn mint_key(&mut self) -> NodeKey {
        self.keys.mint()
    }

    pub fn root(&self) -> &DocumentNode {
        &self.root
    }

    /// Resolve a node by key anywhere in the tree.
    pub fn find(&self, key: &NodeKey) -> Option<&DocumentNode> {
        find_in(&self.root, key)
    }

    /// Resolve a node by path from the root.
    pub fn node_at(&self, path: &NodePath) -> Option<&DocumentNode> {
        let mut node = &self.root;
        for &index in path.indexes() {
            node = node.children.get(index)?;
        }
        Some(node)
    }

    fn node_at_mut(&mut self, path: &NodePath) -> Option<&mut DocumentNode> {
        let mut node = &mut self.root;
        for &index in path.indexes() {
            node = node.children.get_mut(index)?;
        }
        Some(node)
    }

    /// Insert `node` at `index` among `parent_path`'s children.
    ///
    /// The index is clamped to the child count. Fails with `InvalidPath` if
    /// the path does not resolve and `SchemaViolation` if the resulting
    /// structure would break the parent type's shape contract.
    pub fn insert(
        &mut self,
        parent_path: &NodePath,
        index: usize,
        node: DocumentNode,
    ) -> Result<(), DocumentError> {
        validate_subtree(&node)?;

        let parent = self
            .node_at(parent_path)
            .ok_or_else(|| DocumentError::InvalidPath(format!("{:?}", parent_path.indexes())))?;
        self.validate_placement(parent_path, parent, &node)?;

        let parent = self
            .node_at_mut(parent_path)
            .ok_or_else(|| DocumentError::InvalidPath(format!("{:?}", parent_path.indexes())))?;
        let index = index.min(parent.children.len());
        debug!(key = %node.key, node_type = %node.node_type, index, "inserting node");
        parent.children.insert(index, node);
        Ok(())
    }

    /// Append a node at the end of the root's children.
    pub fn append_to_root(&mut self, node: DocumentNode) -> Result<(), DocumentError> {
        let index = self.root.children.len();
        self.insert(&NodePath::root(), index, node)
    }

    /// Shallow-merge `partial` onto the node's attributes.
    pub fn set_attributes(&mut self, key: &NodeKey, partial: AttrMap) -> Result<(), DocumentError> {
        let node = find_in_mut(&mut self.root, key)
            .ok_or_else(|| DocumentError::NodeNotFound(key.clone()))?;
        debug!(%key, count = partial.len(), "merging attributes");
        node.merge_attributes(partial);
        Ok(())
    }

    /// Delete the node and its subtree. A no-op on an already-removed key:
    /// stale references surface as `NodeNotFound` only on lookups.
    pub fn remove(&mut self, key: &NodeKey) {
        if *key == self.root.key {
            debug!(%key, "ignoring removal of the root");
            return;
        }
        if remove_in(&mut self.root, key) {
            debug!(%key, "removed node");
        } else {
            debug!(%key, "removal of missing node ignored");
        }
    }

    pub fn visit<V: Visitor>(&self, visitor: &mut V) {
        visitor.visit_node(&self.root);
    }

    pub fn serialize(&self, registry: &NodeTypeRegistry) -> Value {
        serializer::serialize_node(&self.root, registry)
    }

    pub fn deserialize(blob: &Value, registry: &NodeTypeRegistry) -> Self {
        let mut keys = KeyAllocator::new();
        let mut root = serializer::deserialize_node(blob, registry, &mut keys);
        if root.node_type != tags::ROOT {
            root = DocumentNode::new(keys.mint(), tags::ROOT).child(root);
        }
        Self { root, keys }
    }

    fn validate_placement(
        &self,
        parent_path: &NodePath,
        parent: &DocumentNode,
        node: &DocumentNode,
    ) -> Result<(), DocumentError> {
        if builtins::is_leaf_type(&parent.node_type) {
            return Err(DocumentError::SchemaViolation(format!(
                "`{}` cannot have children",
                parent.node_type
            )));
        }

        match parent.node_type.as_str() {
            tags::TABLE => {
                if node.node_type != tags::TABLE_ROW {
                    return Err(DocumentError::SchemaViolation(format!(
                        "only rows may sit directly under a table, got `{}`",
                        node.node_type
                    )));
                }
                if let Some(first_row) = parent.children.first() {
                    if node.children.len() != first_row.children.len() {
                        return Err(DocumentError::SchemaViolation(format!(
                            "row with {} cells breaks a {}-column table",
                            node.children.len(),
                            first_row.children.len()
                        )));
                    }
                }
            }
            tags::TABLE_ROW => {
                if node.node_type != tags::TABLE_CELL {
                    return Err(DocumentError::SchemaViolation(format!(
                        "only cells may sit directly under a row, got `{}`",
                        node.node_type
                    )));
                }
                // A cell insert must leave every row of the grid with the
                // same cell count.
                let resulting = parent.children.len() + 1;
                if let Some(table) = self.enclosing_table(parent_path) {
                    let uneven = table
                        .children
                        .iter()
                        .filter(|row| row.key != parent.key)
                        .any(|row| row.children.len() != resulting);
                    if uneven {
                        return Err(DocumentError::SchemaViolation(
                            "cell insert would make the table non-rectangular".into(),
                        ));
                    }
                }
            }
            _ => {
                if node.node_type == tags::TABLE_ROW || node.node_type == tags::TABLE_CELL {
                    return Err(DocumentError::SchemaViolation(format!(
                        "`{}` only belongs inside a table",
                        node.node_type
                    )));
                }
            }
        }
        Ok(())
    }

    /// The table containing the row at `row_path`, if any.
    fn enclosing_table(&self, row_path: &NodePath) -> Option<&DocumentNode> {
        let indexes = row_path.indexes();
        if indexes.is_empty() {
            return None;
        }
        let table = self.node_at(&NodePath::from(&indexes[..indexes.len() - 1]))?;
        (table.node_type == tags::TABLE).then_some(table)
    }
}

fn find_in<'a>(node: &'a DocumentNode, key: &NodeKey) -> Option<&'a DocumentNode> {
    if node.key == *key {
        return Some(node);
    }
    node.children.iter().find_map(|child| find_in(child, key))
}

fn find_in_mut<'a>(node: &'a mut DocumentNode, key: &NodeKey) -> Option<&'a mut DocumentNode> {
    if node.key == *key {
        return Some(node);
    }
    node.children
        .iter_mut()
        .find_map(|child| find_in_mut(child, key))
}

fn remove_in(node: &mut DocumentNode, key: &NodeKey) -> bool {
    if let Some(position) = node.children.iter().position(|child| child.key == *key) {
        node.children.remove(position);
        return true;
    }
    node.children.iter_mut().any(|child| remove_in(child, key))
}

/// Table subtrees must arrive rectangular and well-shaped.
fn validate_subtree(node: &DocumentNode) -> Result<(), DocumentError> {
    if node.node_type == tags::TABLE {
        let mut cell_count = None;
        for row in &node.children {
            if row.node_type != tags::TABLE_ROW {
                return Err(DocumentError::SchemaViolation(format!(
                    "only rows may sit directly under a table, got `{}`",
                    row.node_type
                )));
            }
            for cell in &row.children {
                if cell.node_type != tags::TABLE_CELL {
                    return Err(DocumentError::SchemaViolation(format!(
                        "only cells may sit directly under a row, got `{}`",
                        cell.node_type
                    )));
                }
            }
            match cell_count {
                None => cell_count = Some(row.children.len()),
                Some(count) if count != row.children.len() => {
                    return Err(DocumentError::SchemaViolation(
                        "table rows have differing cell counts".into(),
                    ))
                }
                Some(_) => {}
            }
        }
    }
    if builtins::is_leaf_type(&node.node_type) && !node.children.is_empty() {
        return Err(DocumentError::SchemaViolation(format!(
            "`{}` cannot have children",
            node.node_type
        )));
    }
    for child in &node.children {
        validate_subtree(child)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paragraph(tree: &mut DocumentTree, text: &str) -> DocumentNode {
        DocumentNode::new(tree.mint_key(), tags::PARAGRAPH).attr("text", text)
    }

    fn grid(tree: &mut DocumentTree, rows: usize, cols: usize) -> DocumentNode {
        let mut table = DocumentNode::new(tree.mint_key(), tags::TABLE);
        for _ in 0..rows {
            let mut row = DocumentNode::new(tree.mint_key(), tags::TABLE_ROW);
            for _ in 0..cols {
                row = row.child(DocumentNode::new(tree.mint_key(), tags::TABLE_CELL));
            }
            table = table.child(row);
        }
        table
    }

    #[test]
    fn insert_at_bad_path_is_rejected() {
        let mut tree = DocumentTree::new();
        let node = paragraph(&mut tree, "a");
        let err = tree.insert(&NodePath::new(vec![3]), 0, node).unwrap_err();
        assert!(matches!(err, DocumentError::InvalidPath(_)));
    }

    #[test]
    fn non_row_under_table_is_rejected() {
        let mut tree = DocumentTree::new();
        let table = grid(&mut tree, 1, 2);
        tree.append_to_root(table).unwrap();

        let stray = paragraph(&mut tree, "stray");
        let err = tree.insert(&NodePath::new(vec![0]), 0, stray).unwrap_err();
        assert!(matches!(err, DocumentError::SchemaViolation(_)));
    }

    #[test]
    fn short_row_under_table_is_rejected() {
        let mut tree = DocumentTree::new();
        let table = grid(&mut tree, 2, 3);
        tree.append_to_root(table).unwrap();

        let short_row = DocumentNode::new(tree.mint_key(), tags::TABLE_ROW)
            .child(DocumentNode::new(tree.mint_key(), tags::TABLE_CELL));
        let err = tree.insert(&NodePath::new(vec![0]), 2, short_row).unwrap_err();
        assert!(matches!(err, DocumentError::SchemaViolation(_)));
    }

    #[test]
    fn cell_insert_that_breaks_the_grid_is_rejected() {
        let mut tree = DocumentTree::new();
        let table = grid(&mut tree, 2, 2);
        tree.append_to_root(table).unwrap();

        let cell = DocumentNode::new(tree.mint_key(), tags::TABLE_CELL);
        let err = tree
            .insert(&NodePath::new(vec![0, 0]), 2, cell)
            .unwrap_err();
        assert!(matches!(err, DocumentError::SchemaViolation(_)));
    }

    #[test]
    fn non_rectangular_table_subtree_is_rejected() {
        let mut tree = DocumentTree::new();
        let lopsided = DocumentNode::new(tree.mint_key(), tags::TABLE)
            .child(
                DocumentNode::new(tree.mint_key(), tags::TABLE_ROW)
                    .child(DocumentNode::new(tree.mint_key(), tags::TABLE_CELL)),
            )
            .child(DocumentNode::new(tree.mint_key(), tags::TABLE_ROW));
        let err = tree.append_to_root(lopsided).unwrap_err();
        assert!(matches!(err, DocumentError::SchemaViolation(_)));
    }

    #[test]
    fn children_under_a_decorator_are_rejected() {
        let mut tree = DocumentTree::new();
        let image = DocumentNode::new(tree.mint_key(), tags::IMAGE)
            .attr("src", "https://example.com/a.png");
        tree.append_to_root(image).unwrap();

        let stray = paragraph(&mut tree, "stray");
        let err = tree.insert(&NodePath::new(vec![0]), 0, stray).unwrap_err();
        assert!(matches!(err, DocumentError::SchemaViolation(_)));
    }

    #[test]
    fn set_attributes_on_stale_key_is_node_not_found() {
        let mut tree = DocumentTree::new();
        let node = paragraph(&mut tree, "a");
        let key = node.key.clone();
        tree.append_to_root(node).unwrap();
        tree.remove(&key);

        let err = tree.set_attributes(&key, AttrMap::new()).unwrap_err();
        assert_eq!(err, DocumentError::NodeNotFound(key));
    }

    #[test]
    fn remove_is_idempotent() {
        let mut tree = DocumentTree::new();
        let node = paragraph(&mut tree, "a");
        let key = node.key.clone();
        tree.append_to_root(node).unwrap();

        tree.remove(&key);
        tree.remove(&key);
        assert!(tree.find(&key).is_none());
    }

    #[test]
    fn remove_deletes_the_subtree() {
        let mut tree = DocumentTree::new();
        let table = grid(&mut tree, 2, 2);
        let table_key = table.key.clone();
        let cell_key = table.children[1].children[1].key.clone();
        tree.append_to_root(table).unwrap();

        tree.remove(&table_key);
        assert!(tree.find(&cell_key).is_none());
        assert!(tree.root().children.is_empty());
    }

    #[test]
    fn insert_index_is_clamped() {
        let mut tree = DocumentTree::new();
        let a = paragraph(&mut tree, "a");
        let b = paragraph(&mut tree, "b");
        tree.insert(&NodePath::root(), 0, a).unwrap();
        tree.insert(&NodePath::root(), 99, b).unwrap();
        assert_eq!(tree.root().children.len(), 2);
        assert_eq!(tree.root().children[1].attr_str("text"), Some("b"));
    }
}
