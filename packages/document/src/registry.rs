//! Node type registry.
//!
//! Maps a type tag to its renderer, serializer and capability flags.
//! Lookup is O(1). Unknown tags encountered during deserialization degrade
//! to a placeholder entry (see [`crate::serializer`]) so a document load
//! never fails on a single unrecognized block.

use crate::error::{DocumentError, RenderError};
use crate::host::HostNode;
use crate::node::{AttrMap, DocumentNode};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Renders a node's attributes into a host-view description.
pub type RenderFn = Arc<dyn Fn(&DocumentNode) -> Result<HostNode, RenderError> + Send + Sync>;

/// Emits the type-specific attributes of a node into a serialized blob.
pub type SerializeFn = Arc<dyn Fn(&DocumentNode) -> Value + Send + Sync>;

/// Extracts and validates attributes from a serialized blob.
pub type DeserializeFn = Arc<dyn Fn(&Value) -> Result<AttrMap, DocumentError> + Send + Sync>;

/// Validates a node's attributes at insertion time.
pub type ValidateFn = Arc<dyn Fn(&AttrMap) -> Result<(), DocumentError> + Send + Sync>;

/// Capability flags of a node type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TypeFlags {
    /// Rendered through a registered renderer instead of normal text flow.
    pub is_decorator: bool,
    /// Participates in drag-resize (tables).
    pub resizable: bool,
    /// Hosts an inline editable surface (code blocks, blockquotes).
    pub inline_editable: bool,
}

/// Everything the editor knows about one node type.
#[derive(Clone)]
pub struct NodeTypeDefinition {
    /// Written into every serialized blob of this type.
    pub version: u32,
    pub flags: TypeFlags,
    pub render: RenderFn,
    pub serialize: SerializeFn,
    pub deserialize: DeserializeFn,
    pub validate: ValidateFn,
}

impl std::fmt::Debug for NodeTypeDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeTypeDefinition")
            .field("version", &self.version)
            .field("flags", &self.flags)
            .finish_non_exhaustive()
    }
}

impl NodeTypeDefinition {
    /// A definition using the shared blob codec: all attributes are emitted
    /// flat next to `type`/`version`, and extraction runs `validate` on the
    /// way in. Types with a custom wire shape replace the codec functions.
    pub fn with_default_codec(
        version: u32,
        flags: TypeFlags,
        render: RenderFn,
        validate: ValidateFn,
    ) -> Self {
        let deserialize_validate = validate.clone();
        Self {
            version,
            flags,
            render,
            serialize: Arc::new(crate::serializer::default_serialize),
            deserialize: Arc::new(move |blob| {
                let attrs = crate::serializer::strip_envelope(blob);
                deserialize_validate(&attrs)?;
                Ok(attrs)
            }),
            validate,
        }
    }
}

/// Registry of node type definitions, keyed by type tag.
#[derive(Debug, Clone, Default)]
pub struct NodeTypeRegistry {
    types: HashMap<String, NodeTypeDefinition>,
}

impl NodeTypeRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with every built-in type registered.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        crate::builtins::register_builtins(&mut registry);
        registry
    }

    pub fn register(&mut self, tag: impl Into<String>, definition: NodeTypeDefinition) {
        self.types.insert(tag.into(), definition);
    }

    pub fn get(&self, tag: &str) -> Option<&NodeTypeDefinition> {
        self.types.get(tag)
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.types.contains_key(tag)
    }

    pub fn is_decorator(&self, tag: &str) -> bool {
        self.types
            .get(tag)
            .map(|def| def.flags.is_decorator)
            .unwrap_or(false)
    }

    /// Validate a node's attributes against its type definition.
    ///
    /// Unregistered tags pass: validation only constrains known types.
    pub fn validate(&self, node: &DocumentNode) -> Result<(), DocumentError> {
        match self.types.get(&node.node_type) {
            Some(def) => (def.validate)(&node.attributes),
            None => Ok(()),
        }
    }
}
