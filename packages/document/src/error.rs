//! Error types for document editing.

use penmark_common::NodeKey;
use thiserror::Error;

/// Errors surfaced by tree operations and attribute validation.
///
/// Structural and addressing errors are rejected before the tree is mutated;
/// none of them is fatal to the document.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DocumentError {
    #[error("invalid path: {0}")]
    InvalidPath(String),

    #[error("node not found: {0}")]
    NodeNotFound(NodeKey),

    #[error("schema violation: {0}")]
    SchemaViolation(String),

    #[error("invalid attribute `{name}`: {reason}")]
    InvalidAttribute { name: String, reason: String },
}

impl DocumentError {
    pub fn invalid_attribute(name: impl Into<String>, reason: impl Into<String>) -> Self {
        DocumentError::InvalidAttribute {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

/// A decorator renderer failed.
///
/// Caught per node: the failing node is shown as an error placeholder and the
/// rest of the document renders normally.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("render failed: {0}")]
pub struct RenderError(String);

impl RenderError {
    pub fn new(reason: impl Into<String>) -> Self {
        RenderError(reason.into())
    }

    pub fn reason(&self) -> &str {
        &self.0
    }
}
