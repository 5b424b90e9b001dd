//! The resize state machine.
//!
//! Two states: idle, or exactly one drag in progress. Pointer-move mutates
//! live surface geometry only; the tree is untouched until pointer-up turns
//! the final geometry into a [`ResizeCommit`] for the session owner to
//! persist through the document tree's attribute contract. An explicit
//! `cancel` transition restores the pre-drag geometry and drops the session
//! without committing; the host calls it on Escape or focus loss.

use crate::handle::{compute_handles, handle_at, Handle, HandleKind};
use crate::session::{CellRef, ResizeSession};
use crate::surface::{LayoutSurface, SubtreeObserver};
use penmark_common::{Point, Size};
use serde::{Deserialize, Serialize};
use std::mem;
use tracing::{debug, trace};

/// Hard floors for committed geometry. The user cannot drag below these
/// regardless of movement magnitude.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResizeLimits {
    pub min_column_width: f32,
    pub min_row_height: f32,
    pub min_table_width: f32,
    pub min_table_height: f32,
}

impl Default for ResizeLimits {
    fn default() -> Self {
        Self {
            min_column_width: 50.0,
            min_row_height: 20.0,
            min_table_width: 100.0,
            min_table_height: 50.0,
        }
    }
}

/// Final geometry of a completed drag, read back from the surface.
///
/// Column widths come from the first row's cells, row heights from the
/// tallest cell of each row. `table_size` is set when the whole-table handle
/// was dragged.
#[derive(Debug, Clone, PartialEq)]
pub struct ResizeCommit {
    pub kind: HandleKind,
    pub column_widths: Vec<Option<f32>>,
    pub row_heights: Vec<Option<f32>>,
    pub table_size: Option<Size>,
}

#[derive(Debug)]
enum EngineState {
    Idle,
    Dragging(ResizeSession),
}

/// Drives drag-resize over one rendered table.
#[derive(Debug)]
pub struct ResizeEngine<S: LayoutSurface> {
    surface: S,
    limits: ResizeLimits,
    state: EngineState,
    handles: Vec<Handle>,
    observer: SubtreeObserver,
}

impl<S: LayoutSurface> ResizeEngine<S> {
    pub fn new(mut surface: S, limits: ResizeLimits) -> Self {
        let observer = SubtreeObserver::new();
        surface.observe(observer.clone());
        let handles = compute_handles(&surface);
        Self {
            surface,
            limits,
            state: EngineState::Idle,
            handles,
            observer,
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Host access for geometry restoration outside a drag. Live geometry is
    /// owned by the active session while one exists.
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Current handle rectangles, refreshed if the subtree changed.
    pub fn handles(&mut self) -> &[Handle] {
        self.sync();
        &self.handles
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, EngineState::Dragging(_))
    }

    /// The handle being dragged: the "active" visual marker for the host.
    pub fn active_handle(&self) -> Option<HandleKind> {
        match &self.state {
            EngineState::Dragging(session) => Some(session.kind),
            EngineState::Idle => None,
        }
    }

    /// Recompute handle geometry if the observed subtree changed.
    pub fn sync(&mut self) {
        if self.observer.take_changed() {
            trace!("subtree changed, recomputing handle geometry");
            self.handles = compute_handles(&self.surface);
        }
    }

    /// `Idle → Dragging` if the pointer lands on a handle. Returns whether a
    /// session started. At most one session exists at a time; a pointer-down
    /// during a drag is ignored.
    pub fn pointer_down(&mut self, point: Point) -> bool {
        self.sync();
        if self.is_dragging() {
            return false;
        }
        let Some(handle) = handle_at(&self.handles, point) else {
            return false;
        };

        let rows = self.surface.row_count();
        let columns = self.surface.column_count();
        let cell_size = |row: usize, column: usize| {
            self.surface
                .cell_rect(row, column)
                .map(|rect| rect.size())
                .unwrap_or_default()
        };

        let (initial_extent, affected) = match handle.kind {
            HandleKind::Column(column) => (
                cell_size(0, column),
                (0..rows)
                    .map(|row| (CellRef { row, column }, cell_size(row, column)))
                    .collect(),
            ),
            HandleKind::Row(row) => (
                cell_size(row, 0),
                (0..columns)
                    .map(|column| (CellRef { row, column }, cell_size(row, column)))
                    .collect(),
            ),
            HandleKind::Cell { row, column } => (
                cell_size(row, column),
                vec![(CellRef { row, column }, cell_size(row, column))],
            ),
            HandleKind::Table => (self.surface.table_rect().size(), Vec::new()),
        };

        debug!(kind = ?handle.kind, "resize drag started");
        self.state = EngineState::Dragging(ResizeSession::new(
            handle.kind,
            point,
            initial_extent,
            affected,
        ));
        true
    }

    /// `Dragging → Dragging`: apply the clamped delta to every affected
    /// element and reproject the handles. A no-op while idle.
    pub fn pointer_move(&mut self, point: Point) {
        let EngineState::Dragging(session) = &self.state else {
            return;
        };
        let kind = session.kind;
        let initial = session.initial_extent;
        let affected = session.affected.clone();
        let dx = point.x - session.anchor.x;
        let dy = point.y - session.anchor.y;

        match kind {
            HandleKind::Column(_) => {
                let width = (initial.width + dx).max(self.limits.min_column_width);
                for (cell, before) in affected {
                    self.surface
                        .set_cell_size(cell.row, cell.column, Size::new(width, before.height));
                }
            }
            HandleKind::Row(_) => {
                let height = (initial.height + dy).max(self.limits.min_row_height);
                for (cell, before) in affected {
                    self.surface
                        .set_cell_size(cell.row, cell.column, Size::new(before.width, height));
                }
            }
            HandleKind::Cell { row, column } => {
                let width = (initial.width + dx).max(self.limits.min_column_width);
                let height = (initial.height + dy).max(self.limits.min_row_height);
                self.surface.set_cell_size(row, column, Size::new(width, height));
            }
            HandleKind::Table => {
                let width = (initial.width + dx).max(self.limits.min_table_width);
                let height = (initial.height + dy).max(self.limits.min_table_height);
                self.surface.set_table_size(Size::new(width, height));
            }
        }

        trace!(dx, dy, "live resize");
        // Our own writes marked the observer; every handle moves with the
        // boundaries, so reproject them all.
        self.observer.take_changed();
        self.handles = compute_handles(&self.surface);
    }

    /// `Dragging → Idle`: read the final geometry off the surface and hand
    /// it back as a commit. Returns `None` while idle.
    pub fn pointer_up(&mut self) -> Option<ResizeCommit> {
        let EngineState::Dragging(session) = mem::replace(&mut self.state, EngineState::Idle)
        else {
            return None;
        };

        let rows = self.surface.row_count();
        let columns = self.surface.column_count();
        // Column widths come from the first row's cells; a row is as tall as
        // its tallest cell.
        let row_height = |row: usize| {
            (0..columns)
                .filter_map(|column| self.surface.cell_rect(row, column))
                .map(|rect| rect.height)
                .reduce(f32::max)
        };
        let commit = ResizeCommit {
            kind: session.kind,
            column_widths: (0..columns)
                .map(|column| self.surface.cell_rect(0, column).map(|rect| rect.width))
                .collect(),
            row_heights: (0..rows).map(row_height).collect(),
            table_size: matches!(session.kind, HandleKind::Table)
                .then(|| self.surface.table_rect().size()),
        };

        debug!(kind = ?commit.kind, "resize committed");
        // The attribute write this commit triggers may re-render the table
        // and move every rectangle; reproject once more.
        self.observer.take_changed();
        self.handles = compute_handles(&self.surface);
        Some(commit)
    }

    /// Abort the drag: restore pre-drag geometry, discard the session,
    /// commit nothing.
    pub fn cancel(&mut self) {
        let EngineState::Dragging(session) = mem::replace(&mut self.state, EngineState::Idle)
        else {
            return;
        };

        for (cell, before) in session.affected {
            self.surface.set_cell_size(cell.row, cell.column, before);
        }
        if matches!(session.kind, HandleKind::Table) {
            self.surface.set_table_size(session.initial_extent);
        }

        debug!("resize cancelled, geometry restored");
        self.observer.take_changed();
        self.handles = compute_handles(&self.surface);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::FixedGridSurface;

    fn engine(rows: usize, columns: usize, cell: Size) -> ResizeEngine<FixedGridSurface> {
        ResizeEngine::new(
            FixedGridSurface::new(rows, columns, cell),
            ResizeLimits::default(),
        )
    }

    /// Boundary point of the first column, away from any corner.
    fn column_grip(engine: &mut ResizeEngine<FixedGridSurface>, column: usize) -> Point {
        let handles = engine.handles();
        let handle = handles
            .iter()
            .find(|handle| handle.kind == HandleKind::Column(column))
            .unwrap();
        Point::new(handle.rect.x + handle.rect.width / 2.0, handle.rect.y + 1.0)
    }

    #[test]
    fn column_drag_commits_the_new_width_and_spares_the_rest() {
        let mut engine = engine(2, 2, Size::new(100.0, 40.0));
        let grip = column_grip(&mut engine, 0);

        assert!(engine.pointer_down(grip));
        engine.pointer_move(Point::new(grip.x + 40.0, grip.y));
        let commit = engine.pointer_up().unwrap();

        assert_eq!(commit.kind, HandleKind::Column(0));
        assert_eq!(commit.column_widths, vec![Some(140.0), Some(100.0)]);
        assert_eq!(commit.row_heights, vec![Some(40.0), Some(40.0)]);
        assert_eq!(commit.table_size, None);
    }

    #[test]
    fn column_drag_resizes_every_cell_in_the_column() {
        let mut engine = engine(3, 2, Size::new(100.0, 40.0));
        let grip = column_grip(&mut engine, 0);

        engine.pointer_down(grip);
        engine.pointer_move(Point::new(grip.x + 25.0, grip.y));
        engine.pointer_up();

        for row in 0..3 {
            assert_eq!(engine.surface().cell_rect(row, 0).unwrap().width, 125.0);
            assert_eq!(engine.surface().cell_rect(row, 1).unwrap().width, 100.0);
        }
    }

    #[test]
    fn over_shrinking_a_row_stops_at_the_floor() {
        let mut engine = engine(2, 2, Size::new(100.0, 80.0));
        let handles = engine.handles().to_vec();
        let row_handle = handles
            .iter()
            .find(|handle| handle.kind == HandleKind::Row(0))
            .unwrap();
        let grip = Point::new(row_handle.rect.x + 1.0, row_handle.rect.y + 1.0);

        engine.pointer_down(grip);
        engine.pointer_move(Point::new(grip.x, grip.y - 500.0));
        let commit = engine.pointer_up().unwrap();

        assert_eq!(commit.row_heights[0], Some(20.0));
        assert_eq!(commit.row_heights[1], Some(80.0));
    }

    #[test]
    fn cell_drag_clamps_both_axes_to_the_floors() {
        let mut engine = engine(2, 2, Size::new(100.0, 40.0));

        // The (0, 0) cell corner at (100, 40); corners win over edge strips.
        engine.pointer_down(Point::new(100.0, 40.0));
        assert_eq!(
            engine.active_handle(),
            Some(HandleKind::Cell { row: 0, column: 0 })
        );
        engine.pointer_move(Point::new(-400.0, -400.0));
        let commit = engine.pointer_up().unwrap();

        let cell = engine.surface().cell_rect(0, 0).unwrap();
        assert_eq!(cell.width, 50.0);
        assert_eq!(cell.height, 20.0);
        assert_eq!(commit.column_widths[0], Some(50.0));
        // The neighbor cell is untouched.
        assert_eq!(engine.surface().cell_rect(1, 0).unwrap().width, 100.0);
    }

    #[test]
    fn table_drag_clamps_to_the_table_floor() {
        let mut engine = engine(2, 2, Size::new(100.0, 40.0));
        let corner = {
            let rect = engine.surface().table_rect();
            Point::new(rect.right(), rect.bottom())
        };

        engine.pointer_down(corner);
        assert_eq!(engine.active_handle(), Some(HandleKind::Table));
        engine.pointer_move(Point::new(corner.x - 900.0, corner.y - 900.0));
        let commit = engine.pointer_up().unwrap();

        assert_eq!(commit.table_size, Some(Size::new(100.0, 50.0)));
    }

    #[test]
    fn grid_stays_rectangular_after_commits() {
        let mut engine = engine(3, 3, Size::new(100.0, 40.0));
        let grip = column_grip(&mut engine, 1);
        engine.pointer_down(grip);
        engine.pointer_move(Point::new(grip.x - 500.0, grip.y));
        engine.pointer_up();

        // Same cell count per row, and the dragged column floored.
        for row in 0..3 {
            for column in 0..3 {
                assert!(engine.surface().cell_rect(row, column).is_some());
            }
            assert_eq!(engine.surface().cell_rect(row, 1).unwrap().width, 50.0);
        }
    }

    #[test]
    fn handles_move_with_the_dragged_boundary() {
        let mut engine = engine(2, 2, Size::new(100.0, 40.0));
        let grip = column_grip(&mut engine, 0);
        engine.pointer_down(grip);
        engine.pointer_move(Point::new(grip.x + 40.0, grip.y));
        engine.pointer_up();

        let handles = engine.handles();
        let first = handles
            .iter()
            .find(|handle| handle.kind == HandleKind::Column(0))
            .unwrap();
        let second = handles
            .iter()
            .find(|handle| handle.kind == HandleKind::Column(1))
            .unwrap();
        assert_eq!(first.rect.x, 140.0 - crate::handle::GRIP_REACH);
        assert_eq!(second.rect.x, 240.0 - crate::handle::GRIP_REACH);
    }

    #[test]
    fn content_edits_elsewhere_reposition_handles() {
        let mut engine = engine(2, 2, Size::new(100.0, 40.0));
        let before = engine.handles().to_vec();

        // Typing grows row 0 without any resize interaction.
        engine.surface_mut().grow_row_content(0, 30.0);

        let after = engine.handles().to_vec();
        assert_ne!(before, after);
        let row1 = after
            .iter()
            .find(|handle| handle.kind == HandleKind::Row(1))
            .unwrap();
        assert_eq!(row1.rect.y, 110.0 - crate::handle::GRIP_REACH);
    }

    #[test]
    fn cancel_restores_pre_drag_geometry_without_a_commit() {
        let mut engine = engine(2, 2, Size::new(100.0, 40.0));
        let grip = column_grip(&mut engine, 0);
        engine.pointer_down(grip);
        engine.pointer_move(Point::new(grip.x + 60.0, grip.y));
        assert_eq!(engine.surface().cell_rect(0, 0).unwrap().width, 160.0);

        engine.cancel();
        assert!(!engine.is_dragging());
        assert_eq!(engine.surface().cell_rect(0, 0).unwrap().width, 100.0);
        assert_eq!(engine.pointer_up(), None, "nothing left to commit");
    }

    #[test]
    fn one_session_at_a_time() {
        let mut engine = engine(2, 2, Size::new(100.0, 40.0));
        let grip = column_grip(&mut engine, 0);
        assert!(engine.pointer_down(grip));
        let other = column_grip(&mut engine, 1);
        assert!(!engine.pointer_down(other));

        engine.pointer_up();
        assert!(engine.pointer_down(other));
        engine.pointer_up();
    }

    #[test]
    fn moves_and_releases_while_idle_are_ignored() {
        let mut engine = engine(2, 2, Size::new(100.0, 40.0));
        engine.pointer_move(Point::new(500.0, 500.0));
        assert_eq!(engine.pointer_up(), None);
        assert_eq!(engine.surface().cell_rect(0, 0).unwrap().width, 100.0);
    }

    #[test]
    fn pointer_down_away_from_handles_starts_nothing() {
        let mut engine = engine(2, 2, Size::new(100.0, 40.0));
        assert!(!engine.pointer_down(Point::new(50.0, 20.0)));
        assert!(!engine.is_dragging());
    }
}
