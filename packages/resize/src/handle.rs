//! Handle geometry.
//!
//! Handles are hit-regions projected from the current rendered rectangles,
//! never stored positions: any resize moves rectangle boundaries, which
//! moves every other handle, so they are recomputed wholesale from the
//! surface.

use crate::surface::LayoutSurface;
use penmark_common::{Point, Rect};

/// Which boundary a handle drags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleKind {
    /// Right edge of a column; dragging resizes every cell in the column.
    Column(usize),
    /// Bottom edge of a row; dragging resizes every cell in the row.
    Row(usize),
    /// Bottom-right corner of one cell; dragging resizes width and height
    /// of that cell alone.
    Cell { row: usize, column: usize },
    /// Bottom-right corner of the table.
    Table,
}

/// An interactive hit-region over the rendered table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Handle {
    pub kind: HandleKind,
    pub rect: Rect,
}

/// Half-width of an edge grip strip.
pub const GRIP_REACH: f32 = 3.0;
/// Half-size of a corner grip square.
pub const CORNER_REACH: f32 = 5.0;

/// Project handle rectangles from the surface's current geometry.
pub fn compute_handles<S: LayoutSurface + ?Sized>(surface: &S) -> Vec<Handle> {
    let table = surface.table_rect();
    let rows = surface.row_count();
    let columns = surface.column_count();
    let mut handles = Vec::with_capacity(columns + rows + rows * columns + 1);

    for column in 0..columns {
        if let Some(rect) = surface.cell_rect(0, column) {
            handles.push(Handle {
                kind: HandleKind::Column(column),
                rect: Rect::new(
                    rect.right() - GRIP_REACH,
                    table.y,
                    GRIP_REACH * 2.0,
                    table.height,
                ),
            });
        }
    }
    for row in 0..rows {
        if let Some(rect) = surface.cell_rect(row, 0) {
            handles.push(Handle {
                kind: HandleKind::Row(row),
                rect: Rect::new(
                    table.x,
                    rect.bottom() - GRIP_REACH,
                    table.width,
                    GRIP_REACH * 2.0,
                ),
            });
        }
    }
    for row in 0..rows {
        for column in 0..columns {
            if let Some(rect) = surface.cell_rect(row, column) {
                handles.push(Handle {
                    kind: HandleKind::Cell { row, column },
                    rect: corner(rect.right(), rect.bottom()),
                });
            }
        }
    }
    handles.push(Handle {
        kind: HandleKind::Table,
        rect: corner(table.right(), table.bottom()),
    });

    handles
}

fn corner(x: f32, y: f32) -> Rect {
    Rect::new(
        x - CORNER_REACH,
        y - CORNER_REACH,
        CORNER_REACH * 2.0,
        CORNER_REACH * 2.0,
    )
}

/// Topmost handle under the pointer. Handles later in the list draw on top
/// (corners over edge strips), so the hit-test runs back to front.
pub fn handle_at(handles: &[Handle], point: Point) -> Option<Handle> {
    handles
        .iter()
        .rev()
        .find(|handle| handle.rect.contains(point))
        .copied()
}
