//! Document tree model for the Penmark editing core.
//!
//! The tree is the single source of truth for content and layout attributes.
//! Custom block types (image, video, blockquote, code block, table) are
//! described by a [`registry::NodeTypeRegistry`] entry carrying a renderer,
//! a serializer and capability flags; nodes whose rendering is delegated to
//! a registered renderer rather than normal text flow are *decorator* nodes.

pub mod builtins;
pub mod error;
pub mod host;
pub mod node;
pub mod registry;
pub mod serializer;
pub mod table;
pub mod tree;
pub mod visitor;

pub use error::{DocumentError, RenderError};
pub use host::HostNode;
pub use node::{AttrMap, DocumentNode, NodePath};
pub use registry::{NodeTypeDefinition, NodeTypeRegistry, TypeFlags};
pub use table::TableGeometry;
pub use tree::DocumentTree;
pub use visitor::{walk_node, Visitor};
