//! Host-view descriptions.
//!
//! A decorator renderer does not touch the host environment directly; it
//! returns a `HostNode` tree describing the view it wants. The rendering
//! bridge owns the mapping from node keys to live host views and updates
//! them in place when attributes change.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Description of a host view produced by a renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HostNode {
    Element {
        tag: String,
        #[serde(default, skip_serializing_if = "HashMap::is_empty")]
        attributes: HashMap<String, String>,
        #[serde(default, skip_serializing_if = "HashMap::is_empty")]
        styles: HashMap<String, String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        children: Vec<HostNode>,
    },
    Text {
        content: String,
    },
}

impl HostNode {
    pub fn element(tag: impl Into<String>) -> Self {
        HostNode::Element {
            tag: tag.into(),
            attributes: HashMap::new(),
            styles: HashMap::new(),
            children: Vec::new(),
        }
    }

    pub fn text(content: impl Into<String>) -> Self {
        HostNode::Text {
            content: content.into(),
        }
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        if let HostNode::Element { attributes, .. } = &mut self {
            attributes.insert(name.into(), value.into());
        }
        self
    }

    pub fn style(mut self, property: impl Into<String>, value: impl Into<String>) -> Self {
        if let HostNode::Element { styles, .. } = &mut self {
            styles.insert(property.into(), value.into());
        }
        self
    }

    pub fn child(mut self, node: HostNode) -> Self {
        if let HostNode::Element { children, .. } = &mut self {
            children.push(node);
        }
        self
    }

    /// Element tag, if this is an element.
    pub fn tag(&self) -> Option<&str> {
        match self {
            HostNode::Element { tag, .. } => Some(tag),
            HostNode::Text { .. } => None,
        }
    }
}
