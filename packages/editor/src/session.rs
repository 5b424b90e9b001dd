//! The editing session.
//!
//! One session owns one document: the tree, the type registry, the decorator
//! bridge and the host clipboard. Every edit, whether from a toolbar action,
//! a resize commit or generated content, flows the same pipeline: mutate the
//! tree, reconcile decorator views, hand the resulting host updates back to
//! the caller.

use crate::clipboard::Clipboard;
use crate::config::EditorConfig;
use crate::ingest;
use penmark_common::NodeKey;
use penmark_document::builtins::tags;
use penmark_document::{
    table, AttrMap, DocumentError, DocumentNode, DocumentTree, NodePath, NodeTypeRegistry,
    TableGeometry,
};
use penmark_render::{DecoratorBridge, HostUpdate};
use penmark_resize::ResizeCommit;
use serde_json::Value;
use tracing::{debug, trace};

/// A semantic edit to the document.
#[derive(Debug, Clone)]
pub enum EditOp {
    Insert {
        parent_path: NodePath,
        index: usize,
        node: DocumentNode,
    },
    SetAttributes {
        key: NodeKey,
        attributes: AttrMap,
    },
    Remove {
        key: NodeKey,
    },
}

/// What one applied edit produced: the bumped document version and the host
/// updates needed to bring decorator views in line.
#[derive(Debug)]
pub struct UpdateResult {
    pub version: u64,
    pub updates: Vec<HostUpdate>,
}

/// A single user's editing state for one document.
pub struct EditorSession<C: Clipboard> {
    tree: DocumentTree,
    registry: NodeTypeRegistry,
    bridge: DecoratorBridge,
    clipboard: C,
    config: EditorConfig,
    version: u64,
}

impl<C: Clipboard> EditorSession<C> {
    /// A session over an empty document with the built-in node types.
    pub fn new(config: EditorConfig, clipboard: C) -> Self {
        Self::with_registry(NodeTypeRegistry::with_builtins(), config, clipboard)
    }

    /// A session with additional custom node types registered.
    pub fn with_registry(registry: NodeTypeRegistry, config: EditorConfig, clipboard: C) -> Self {
        Self {
            tree: DocumentTree::new(),
            registry,
            bridge: DecoratorBridge::new(),
            clipboard,
            config,
            version: 0,
        }
    }

    pub fn tree(&self) -> &DocumentTree {
        &self.tree
    }

    pub fn registry(&self) -> &NodeTypeRegistry {
        &self.registry
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn mint_key(&mut self) -> NodeKey {
        self.tree.mint_key()
    }

    /// Apply one edit: validate, mutate, reconcile.
    ///
    /// Attribute validation happens here, at the boundary of the action that
    /// caused it. An unknown code-block language or a malformed media URL
    /// blocks the insert with a field-level error and the tree is untouched.
    pub fn apply(&mut self, op: EditOp) -> Result<UpdateResult, DocumentError> {
        match op {
            EditOp::Insert {
                parent_path,
                index,
                node,
            } => {
                validate_attributes_deep(&self.registry, &node)?;
                self.tree.insert(&parent_path, index, node)?;
            }
            EditOp::SetAttributes { key, attributes } => {
                let node = self
                    .tree
                    .find(&key)
                    .ok_or_else(|| DocumentError::NodeNotFound(key.clone()))?;
                let mut merged = node.attributes.clone();
                for (name, value) in &attributes {
                    merged.insert(name.clone(), value.clone());
                }
                if let Some(definition) = self.registry.get(&node.node_type) {
                    (definition.validate)(&merged)?;
                }
                self.tree.set_attributes(&key, attributes)?;
            }
            EditOp::Remove { key } => {
                self.tree.remove(&key);
            }
        }
        Ok(self.finish_edit())
    }

    /// Persist a completed drag-resize into the table node's attributes.
    ///
    /// The engine hands over final geometry; this is the only place it turns
    /// into tree state, through the same attribute contract as every other
    /// edit.
    pub fn commit_resize(
        &mut self,
        table_key: &NodeKey,
        commit: &ResizeCommit,
    ) -> Result<UpdateResult, DocumentError> {
        let table_node = self
            .tree
            .find(table_key)
            .ok_or_else(|| DocumentError::NodeNotFound(table_key.clone()))?;
        if table_node.node_type != tags::TABLE {
            return Err(DocumentError::SchemaViolation(format!(
                "resize commit targets a `{}`, not a table",
                table_node.node_type
            )));
        }

        let geometry = TableGeometry {
            column_widths: commit.column_widths.clone(),
            row_heights: commit.row_heights.clone(),
            width: commit.table_size.map(|size| size.width),
        };
        debug!(%table_key, kind = ?commit.kind, "persisting resize commit");
        self.tree.set_attributes(table_key, geometry.to_attributes())?;
        Ok(self.finish_edit())
    }

    /// Stored table geometry, decoded and fitted to the table's current
    /// grid; what a host applies back onto live cells after load or edit.
    pub fn table_geometry(&self, table_key: &NodeKey) -> Option<TableGeometry> {
        let node = self.tree.find(table_key)?;
        if node.node_type != tags::TABLE {
            return None;
        }
        let mut geometry = TableGeometry::from_attributes(&node.attributes);
        let rows = node.children.len();
        let columns = node
            .children
            .first()
            .map(|row| row.children.len())
            .unwrap_or(0);
        geometry.column_widths = table::fit_to_count(geometry.column_widths, columns);
        geometry.row_heights = table::fit_to_count(geometry.row_heights, rows);
        Some(geometry)
    }

    /// Map generated Markdown into nodes appended at the end of the
    /// document.
    pub fn insert_generated_content(&mut self, markdown: &str) -> Result<UpdateResult, DocumentError> {
        let appended = ingest::append_markdown(&mut self.tree, markdown)?;
        debug!(appended, "inserted generated content");
        Ok(self.finish_edit())
    }

    /// Copy a code block's raw source to the clipboard. Non-critical:
    /// returns whether the copy happened, never an error.
    pub fn copy_code_block(&mut self, key: &NodeKey) -> bool {
        let Some(node) = self.tree.find(key) else {
            trace!(%key, "copy ignored, node is gone");
            return false;
        };
        if node.node_type != tags::CODE {
            trace!(%key, node_type = %node.node_type, "copy ignored, not a code block");
            return false;
        }
        let code = node.attr_str("code").unwrap_or("").to_string();
        match self.clipboard.write_text(&code) {
            Ok(()) => true,
            Err(error) => {
                trace!(%error, "clipboard write failed, ignoring");
                false
            }
        }
    }

    /// A rectangular starter table sized from the config.
    pub fn create_table(&mut self, rows: usize, columns: usize) -> DocumentNode {
        let width = self.config.default_table_width;
        let mut node = DocumentNode::new(self.tree.mint_key(), tags::TABLE).attr(
            table::ATTR_WIDTH,
            format!("{}px", table::format_unit(width)),
        );
        for _ in 0..rows {
            let mut row = DocumentNode::new(self.tree.mint_key(), tags::TABLE_ROW);
            for _ in 0..columns {
                row = row.child(DocumentNode::new(self.tree.mint_key(), tags::TABLE_CELL));
            }
            node = node.child(row);
        }
        node
    }

    /// Serialize the document for storage or export.
    pub fn save(&self) -> Value {
        self.tree.serialize(&self.registry)
    }

    /// Replace the document with a stored blob. Never fails: unknown or
    /// malformed blocks load as placeholders.
    pub fn load(&mut self, blob: &Value) -> UpdateResult {
        self.tree = DocumentTree::deserialize(blob, &self.registry);
        // Host views from the previous document are gone wholesale; start
        // the keyed mapping over.
        self.bridge = DecoratorBridge::new();
        self.finish_edit()
    }

    fn finish_edit(&mut self) -> UpdateResult {
        self.version += 1;
        let updates = self.bridge.reconcile(&self.tree, &self.registry);
        UpdateResult {
            version: self.version,
            updates,
        }
    }
}

fn validate_attributes_deep(
    registry: &NodeTypeRegistry,
    node: &DocumentNode,
) -> Result<(), DocumentError> {
    registry.validate(node)?;
    for child in &node.children {
        validate_attributes_deep(registry, child)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipboard::{MemoryClipboard, UnavailableClipboard};

    fn session() -> EditorSession<MemoryClipboard> {
        EditorSession::new(EditorConfig::default(), MemoryClipboard::new())
    }

    #[test]
    fn unknown_code_language_blocks_the_insert() {
        let mut session = session();
        let node = DocumentNode::new(session.mint_key(), tags::CODE)
            .attr("code", "++++")
            .attr("language", "brainfuck");

        let err = session
            .apply(EditOp::Insert {
                parent_path: NodePath::root(),
                index: 0,
                node,
            })
            .unwrap_err();
        assert!(matches!(err, DocumentError::InvalidAttribute { ref name, .. } if name == "language"));
        assert!(session.tree().root().children.is_empty(), "tree untouched");
        assert_eq!(session.version(), 0);
    }

    #[test]
    fn attribute_update_is_validated_against_the_merged_map() {
        let mut session = session();
        let node = DocumentNode::new(session.mint_key(), tags::CODE).attr("code", "print(1)");
        let key = node.key.clone();
        session
            .apply(EditOp::Insert {
                parent_path: NodePath::root(),
                index: 0,
                node,
            })
            .unwrap();

        let mut bad = AttrMap::new();
        bad.insert("language".into(), "brainfuck".into());
        let err = session
            .apply(EditOp::SetAttributes {
                key: key.clone(),
                attributes: bad,
            })
            .unwrap_err();
        assert!(matches!(err, DocumentError::InvalidAttribute { .. }));

        let mut good = AttrMap::new();
        good.insert("language".into(), "python".into());
        session
            .apply(EditOp::SetAttributes {
                key: key.clone(),
                attributes: good,
            })
            .unwrap();
        assert_eq!(
            session.tree().find(&key).unwrap().attr_str("language"),
            Some("python")
        );
    }

    #[test]
    fn copy_code_block_writes_the_raw_source() {
        let mut session = session();
        let node = DocumentNode::new(session.mint_key(), tags::CODE)
            .attr("code", "let x = 1;")
            .attr("language", "rust");
        let key = node.key.clone();
        session
            .apply(EditOp::Insert {
                parent_path: NodePath::root(),
                index: 0,
                node,
            })
            .unwrap();

        assert!(session.copy_code_block(&key));
        assert_eq!(session.clipboard.contents(), Some("let x = 1;"));
    }

    #[test]
    fn clipboard_failure_is_swallowed() {
        let mut session =
            EditorSession::new(EditorConfig::default(), UnavailableClipboard::default());
        let node = DocumentNode::new(session.mint_key(), tags::CODE).attr("code", "x");
        let key = node.key.clone();
        session
            .apply(EditOp::Insert {
                parent_path: NodePath::root(),
                index: 0,
                node,
            })
            .unwrap();

        assert!(!session.copy_code_block(&key));
    }

    #[test]
    fn copying_a_non_code_node_is_a_quiet_no_op() {
        let mut session = session();
        let node = DocumentNode::new(session.mint_key(), tags::PARAGRAPH).attr("text", "p");
        let key = node.key.clone();
        session
            .apply(EditOp::Insert {
                parent_path: NodePath::root(),
                index: 0,
                node,
            })
            .unwrap();

        assert!(!session.copy_code_block(&key));
        assert!(session.clipboard.contents().is_none());
    }
}
