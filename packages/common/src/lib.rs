//! Shared foundation types for the Penmark editing core.

pub mod geometry;
pub mod key;

pub use geometry::{Point, Rect, Size};
pub use key::{KeyAllocator, NodeKey};
