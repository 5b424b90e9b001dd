//! The Penmark editing session.
//!
//! Glues the layers together: tree mutations flow through an operation
//! pipeline (mutate → reconcile decorators → patches), resize commits are
//! encoded into table attributes, AI-generated Markdown is mapped into
//! document nodes, and the code-block copy action talks to the host
//! clipboard.

pub mod clipboard;
pub mod config;
pub mod ingest;
pub mod session;

pub use clipboard::{Clipboard, ClipboardError, MemoryClipboard};
pub use config::EditorConfig;
pub use session::{EditOp, EditorSession, UpdateResult};
