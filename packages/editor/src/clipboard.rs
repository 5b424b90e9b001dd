//! Host clipboard access.
//!
//! The copy action on a code block is non-critical: a host without clipboard
//! access (headless export, sandboxed embed) must not surface an error to
//! the user, so failures are swallowed at the call site.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
#[error("clipboard unavailable: {0}")]
pub struct ClipboardError(pub String);

/// Writes plain text to the system clipboard.
pub trait Clipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError>;
}

/// In-memory clipboard for tests and headless sessions.
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    contents: Option<String>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> Option<&str> {
        self.contents.as_deref()
    }
}

impl Clipboard for MemoryClipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        self.contents = Some(text.to_string());
        Ok(())
    }
}

/// A clipboard that always fails; exercises the silent-failure path.
#[derive(Debug, Default)]
pub struct UnavailableClipboard;

impl Clipboard for UnavailableClipboard {
    fn write_text(&mut self, _text: &str) -> Result<(), ClipboardError> {
        Err(ClipboardError("no clipboard in this host".into()))
    }
}
