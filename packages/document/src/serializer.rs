//! Tree serialization.
//!
//! Wire shape per node: `{ "type": ..., "version": ..., "key": ...,
//! <type-specific attributes>, "children": [...] }`. The round-trip contract
//! is structural: type, child order and attributes are preserved; key
//! identity is not (keys are re-minted on load).
//!
//! Deserialization never fails on a single bad block: an unregistered type
//! tag, or a registered type whose payload fails validation, degrades to an
//! `unsupported` placeholder node holding the original blob, and the rest of
//! the document loads normally. The placeholder re-emits that blob verbatim
//! when serialized, so a document survives a load/save cycle through an
//! editor that doesn't know one of its block types.

use crate::builtins::tags;
use crate::node::{AttrMap, DocumentNode};
use crate::registry::NodeTypeRegistry;
use penmark_common::KeyAllocator;
use serde_json::{Map, Value};
use tracing::warn;

pub const FIELD_TYPE: &str = "type";
pub const FIELD_VERSION: &str = "version";
pub const FIELD_KEY: &str = "key";
pub const FIELD_CHILDREN: &str = "children";

/// Attribute the placeholder keeps the original blob under.
pub const ATTR_RAW: &str = "raw";
/// Attribute the placeholder keeps the original type tag under.
pub const ATTR_ORIGINAL_TYPE: &str = "originalType";

fn is_envelope_field(name: &str) -> bool {
    matches!(name, FIELD_TYPE | FIELD_VERSION | FIELD_KEY | FIELD_CHILDREN)
}

/// Shared serializer: emit all attributes flat.
pub fn default_serialize(node: &DocumentNode) -> Value {
    Value::Object(node.attributes.clone())
}

/// Shared deserializer input: everything in the blob except the envelope.
pub fn strip_envelope(blob: &Value) -> AttrMap {
    match blob.as_object() {
        Some(map) => map
            .iter()
            .filter(|(name, _)| !is_envelope_field(name))
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect(),
        None => AttrMap::new(),
    }
}

pub fn serialize_node(node: &DocumentNode, registry: &NodeTypeRegistry) -> Value {
    // Placeholders round-trip the blob they degraded from, untouched.
    if node.node_type == tags::UNSUPPORTED {
        if let Some(raw) = node.attributes.get(ATTR_RAW) {
            return raw.clone();
        }
    }

    let definition = registry.get(&node.node_type);
    let version = definition.map(|def| def.version).unwrap_or(1);

    let mut blob = Map::new();
    blob.insert(FIELD_TYPE.into(), node.node_type.clone().into());
    blob.insert(FIELD_VERSION.into(), version.into());
    blob.insert(FIELD_KEY.into(), node.key.as_str().into());

    let attrs = match definition {
        Some(def) => (def.serialize)(node),
        None => default_serialize(node),
    };
    if let Value::Object(attrs) = attrs {
        for (name, value) in attrs {
            if !is_envelope_field(&name) {
                blob.insert(name, value);
            }
        }
    }

    if !node.children.is_empty() {
        let children = node
            .children
            .iter()
            .map(|child| serialize_node(child, registry))
            .collect();
        blob.insert(FIELD_CHILDREN.into(), Value::Array(children));
    }

    Value::Object(blob)
}

pub fn deserialize_node(
    blob: &Value,
    registry: &NodeTypeRegistry,
    keys: &mut KeyAllocator,
) -> DocumentNode {
    let tag = blob
        .get(FIELD_TYPE)
        .and_then(Value::as_str)
        .map(str::to_string);

    let Some(tag) = tag else {
        warn!("blob has no type tag, degrading to placeholder");
        return placeholder_node(blob, keys);
    };

    let Some(definition) = registry.get(&tag) else {
        warn!(%tag, "unknown node type, degrading to placeholder");
        return placeholder_node(blob, keys);
    };

    let attributes = match (definition.deserialize)(blob) {
        Ok(attributes) => attributes,
        Err(error) => {
            warn!(%tag, %error, "malformed payload, degrading to placeholder");
            return placeholder_node(blob, keys);
        }
    };

    let mut node = DocumentNode::new(keys.mint(), tag);
    node.attributes = attributes;
    if let Some(children) = blob.get(FIELD_CHILDREN).and_then(Value::as_array) {
        node.children = children
            .iter()
            .map(|child| deserialize_node(child, registry, keys))
            .collect();
    }
    node
}

fn placeholder_node(blob: &Value, keys: &mut KeyAllocator) -> DocumentNode {
    let original = blob
        .get(FIELD_TYPE)
        .and_then(Value::as_str)
        .unwrap_or("unknown");
    DocumentNode::new(keys.mint(), tags::UNSUPPORTED)
        .attr(ATTR_ORIGINAL_TYPE, original)
        .attr(ATTR_RAW, blob.clone())
}
