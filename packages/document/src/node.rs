//! Document nodes and paths.

use penmark_common::NodeKey;
use serde_json::Value;

/// Node attributes: a shallow string-keyed map of JSON values.
pub type AttrMap = serde_json::Map<String, Value>;

/// A typed node in the document tree.
///
/// Nodes are exclusively owned by their parent. Decorator nodes carry their
/// payload in `attributes` and have no children; their visual form is a pure
/// function of the attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentNode {
    pub key: NodeKey,
    pub node_type: String,
    pub attributes: AttrMap,
    pub children: Vec<DocumentNode>,
}

impl DocumentNode {
    pub fn new(key: NodeKey, node_type: impl Into<String>) -> Self {
        Self {
            key,
            node_type: node_type.into(),
            attributes: AttrMap::new(),
            children: Vec::new(),
        }
    }

    /// Builder: set one attribute.
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Builder: append a child.
    pub fn child(mut self, node: DocumentNode) -> Self {
        self.children.push(node);
        self
    }

    /// String attribute accessor; `None` if absent or not a string.
    pub fn attr_str(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).and_then(Value::as_str)
    }

    /// Shallow-merge `partial` into this node's attributes.
    pub fn merge_attributes(&mut self, partial: AttrMap) {
        for (name, value) in partial {
            self.attributes.insert(name, value);
        }
    }

    /// Structural equality: type, attributes and child order, ignoring keys.
    ///
    /// This is the round-trip contract; key identity does not survive
    /// serialization.
    pub fn same_structure(&self, other: &DocumentNode) -> bool {
        self.node_type == other.node_type
            && self.attributes == other.attributes
            && self.children.len() == other.children.len()
            && self
                .children
                .iter()
                .zip(&other.children)
                .all(|(a, b)| a.same_structure(b))
    }
}

/// Address of a node as child indexes from the document root.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NodePath(Vec<usize>);

impl NodePath {
    /// The root itself.
    pub fn root() -> Self {
        Self::default()
    }

    pub fn new(indexes: impl Into<Vec<usize>>) -> Self {
        NodePath(indexes.into())
    }

    pub fn indexes(&self) -> &[usize] {
        &self.0
    }
}

impl From<Vec<usize>> for NodePath {
    fn from(indexes: Vec<usize>) -> Self {
        NodePath(indexes)
    }
}

impl From<&[usize]> for NodePath {
    fn from(indexes: &[usize]) -> Self {
        NodePath(indexes.to_vec())
    }
}
