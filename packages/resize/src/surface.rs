//! Rendered-table geometry.
//!
//! The engine never talks to a concrete rendering host; it sees a
//! [`LayoutSurface`]: the rectangles of a rendered table and its cells,
//! live extent writes for the duration of a drag, and a change-observation
//! hook. Handle geometry must stay correct whenever anything changes the
//! rendered layout (typing inside a cell included), so invalidation comes
//! from the surface itself, not from manual calls threaded through editing
//! code.

use penmark_common::{Point, Rect, Size};
use std::cell::Cell;
use std::rc::Rc;
use tracing::warn;

/// Shared "the rendered subtree changed" flag.
///
/// The surface marks it on any structural or geometric change; the engine
/// drains it and recomputes handle positions. All mutation happens on the
/// UI thread, so a plain `Rc<Cell>` carries the flag.
#[derive(Debug, Clone, Default)]
pub struct SubtreeObserver {
    dirty: Rc<Cell<bool>>,
}

impl SubtreeObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_changed(&self) {
        self.dirty.set(true);
    }

    /// Read and clear the flag.
    pub fn take_changed(&self) -> bool {
        self.dirty.replace(false)
    }
}

/// Live geometry of one rendered table.
pub trait LayoutSurface {
    fn row_count(&self) -> usize;
    fn column_count(&self) -> usize;
    fn table_rect(&self) -> Rect;
    fn cell_rect(&self, row: usize, column: usize) -> Option<Rect>;

    /// Live, uncommitted extent write during a drag.
    fn set_cell_size(&mut self, row: usize, column: usize, size: Size);
    fn set_table_size(&mut self, size: Size);

    /// Register an observer to be marked on any subtree change.
    fn observe(&mut self, observer: SubtreeObserver);
}

/// In-memory table layout: cells flow left-to-right, top-to-bottom, each
/// column as wide as its widest cell, each row as tall as its tallest.
/// Backs the test suites and headless geometry restoration.
#[derive(Debug, Default)]
pub struct FixedGridSurface {
    origin: Point,
    cells: Vec<Vec<Size>>,
    table: Option<Size>,
    observers: Vec<SubtreeObserver>,
}

impl FixedGridSurface {
    pub fn new(rows: usize, columns: usize, cell: Size) -> Self {
        Self {
            origin: Point::default(),
            cells: vec![vec![cell; columns]; rows],
            table: None,
            observers: Vec::new(),
        }
    }

    pub fn with_origin(mut self, origin: Point) -> Self {
        self.origin = origin;
        self
    }

    /// Widest cell in the column.
    pub fn column_width(&self, column: usize) -> f32 {
        self.cells
            .iter()
            .filter_map(|row| row.get(column))
            .map(|size| size.width)
            .fold(0.0, f32::max)
    }

    /// Tallest cell in the row.
    pub fn row_height(&self, row: usize) -> f32 {
        self.cells
            .get(row)
            .map(|cells| cells.iter().map(|size| size.height).fold(0.0, f32::max))
            .unwrap_or(0.0)
    }

    fn column_offset(&self, column: usize) -> f32 {
        (0..column).map(|c| self.column_width(c)).sum()
    }

    fn row_offset(&self, row: usize) -> f32 {
        (0..row).map(|r| self.row_height(r)).sum()
    }

    fn notify(&self) {
        for observer in &self.observers {
            observer.mark_changed();
        }
    }

    /// Emulate a content edit growing a row (typing in a cell).
    pub fn grow_row_content(&mut self, row: usize, extra_height: f32) {
        if let Some(cells) = self.cells.get_mut(row) {
            for cell in cells.iter_mut() {
                cell.height += extra_height;
            }
            self.notify();
        }
    }
}

impl LayoutSurface for FixedGridSurface {
    fn row_count(&self) -> usize {
        self.cells.len()
    }

    fn column_count(&self) -> usize {
        self.cells.first().map(Vec::len).unwrap_or(0)
    }

    fn table_rect(&self) -> Rect {
        let size = self.table.unwrap_or_else(|| {
            Size::new(
                (0..self.column_count()).map(|c| self.column_width(c)).sum(),
                (0..self.row_count()).map(|r| self.row_height(r)).sum(),
            )
        });
        Rect::new(self.origin.x, self.origin.y, size.width, size.height)
    }

    fn cell_rect(&self, row: usize, column: usize) -> Option<Rect> {
        let size = *self.cells.get(row)?.get(column)?;
        Some(Rect::new(
            self.origin.x + self.column_offset(column),
            self.origin.y + self.row_offset(row),
            size.width,
            size.height,
        ))
    }

    fn set_cell_size(&mut self, row: usize, column: usize, size: Size) {
        if let Some(cell) = self.cells.get_mut(row).and_then(|cells| cells.get_mut(column)) {
            *cell = size;
            self.notify();
        }
    }

    fn set_table_size(&mut self, size: Size) {
        self.table = Some(size);
        self.notify();
    }

    fn observe(&mut self, observer: SubtreeObserver) {
        self.observers.push(observer);
    }
}

/// Re-apply persisted column widths and row heights onto live cells.
///
/// Runs on document load and whenever the table's layout attributes change,
/// regardless of whether the change came from a user drag or programmatic
/// insertion. Count mismatches are tolerated: the overlap is applied, the
/// rest keeps its current geometry.
pub fn apply_persisted_geometry<S: LayoutSurface + ?Sized>(
    surface: &mut S,
    column_widths: &[Option<f32>],
    row_heights: &[Option<f32>],
) {
    let rows = surface.row_count();
    let columns = surface.column_count();
    if column_widths.len() > columns || row_heights.len() > rows {
        warn!(
            stored_columns = column_widths.len(),
            columns,
            stored_rows = row_heights.len(),
            rows,
            "stored geometry does not match the current grid, applying the overlap"
        );
    }

    for (column, width) in column_widths.iter().take(columns).enumerate() {
        let Some(width) = width else { continue };
        for row in 0..rows {
            if let Some(rect) = surface.cell_rect(row, column) {
                surface.set_cell_size(row, column, Size::new(*width, rect.height));
            }
        }
    }
    for (row, height) in row_heights.iter().take(rows).enumerate() {
        let Some(height) = height else { continue };
        for column in 0..columns {
            if let Some(rect) = surface.cell_rect(row, column) {
                surface.set_cell_size(row, column, Size::new(rect.width, *height));
            }
        }
    }
}
