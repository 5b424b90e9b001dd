//! The transient drag session.
//!
//! Created on pointer-down over a handle, mutated on pointer-move, consumed
//! on pointer-up (or discarded by cancel). Never persisted, never reachable
//! from outside the engine.

use crate::handle::HandleKind;
use penmark_common::{Point, Size};

/// Grid coordinates of one affected cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRef {
    pub row: usize,
    pub column: usize,
}

/// State of one in-progress drag-resize gesture.
#[derive(Debug, Clone)]
pub struct ResizeSession {
    pub kind: HandleKind,
    /// Pointer position at pointer-down.
    pub anchor: Point,
    /// Extent of the primary target (first affected cell, or the table) at
    /// pointer-down; deltas apply against this, not against live geometry.
    pub initial_extent: Size,
    /// Every cell the drag writes to, with its pre-drag size. A column drag
    /// lists the whole column, a row drag the whole row, a cell drag the
    /// single cell; a table drag lists none.
    pub affected: Vec<(CellRef, Size)>,
}

impl ResizeSession {
    pub fn new(
        kind: HandleKind,
        anchor: Point,
        initial_extent: Size,
        affected: Vec<(CellRef, Size)>,
    ) -> Self {
        Self {
            kind,
            anchor,
            initial_extent,
            affected,
        }
    }
}
