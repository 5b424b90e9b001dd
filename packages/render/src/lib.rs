//! Decorator rendering for the Penmark editing core.
//!
//! Decorator nodes are rendered outside the normal text flow: for every
//! decorator node in the tree, the bridge keeps exactly one live host view,
//! created on first appearance, patched in place on attribute changes, and
//! destroyed when the node goes away.

pub mod bridge;
pub mod differ;

pub use bridge::{DecoratorBridge, HostUpdate};
pub use differ::{diff_views, ViewPatch};
