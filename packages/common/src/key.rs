//! Node identity.
//!
//! Keys address nodes across re-renders: decorator host views are reconciled
//! by key, so a key must stay stable for the lifetime of its node within an
//! editing session. Keys are not required to survive serialization; loading a
//! document mints fresh ones.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Session-unique, stable identity of a document node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeKey(String);

impl NodeKey {
    pub fn new(raw: impl Into<String>) -> Self {
        NodeKey(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeKey {
    fn from(raw: &str) -> Self {
        NodeKey(raw.to_string())
    }
}

/// Mints keys unique within one editing session.
#[derive(Debug, Default)]
pub struct KeyAllocator {
    next: u64,
}

impl KeyAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mint(&mut self) -> NodeKey {
        let key = NodeKey(format!("n{}", self.next));
        self.next += 1;
        key
    }
}
