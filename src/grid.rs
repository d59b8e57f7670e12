//! Grid workspace layout.
//!
//! The overlay shows a fixed `columns × rows` block of cells, one per
//! regular workspace, plus a single cell for the special workspace centered
//! below the block.  Everything in this module is pure: the [`Grid`] is
//! built once per overlay and never mutated, and the scaling helpers map
//! monitor pixels into cell-local pixels.
//!
//! # Cell order
//!
//! Cells are stored in *build order*: row-major over the regular block
//! (workspace ids `1 ..= columns * rows`), special cell last.  Build order is
//! the tie-break for [`nearest_cell`]: when a point is exactly as close to
//! two cell centers, the earlier cell wins.

use crate::model::{Point, Size, WorkspaceId};

/// Dimensions of the grid, independent of where it is drawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridSpec {
    pub columns: usize,
    pub rows: usize,
    /// Size of every cell, special included.
    pub cell_size: Size,
    /// Horizontal (`width`) and vertical (`height`) gap between cells.
    pub spacing: Size,
    /// Distance from the top of the container to the first row.
    pub margin_top: i32,
    /// Vertical gap between the last row and the special cell.
    pub special_gap: i32,
}

impl Default for GridSpec {
    fn default() -> Self {
        Self {
            columns: 5,
            rows: 2,
            cell_size: Size::new(180, 120),
            spacing: Size::new(5, 5),
            margin_top: 40,
            special_gap: 20,
        }
    }
}

impl GridSpec {
    /// Width and height of the regular block, spacing included.
    pub fn block_size(&self) -> Size {
        let span = |n: usize, cell: i32, gap: i32| {
            let n = n as i32;
            if n == 0 {
                0
            } else {
                n * cell + (n - 1) * gap
            }
        };
        Size::new(
            span(self.columns, self.cell_size.width, self.spacing.width),
            span(self.rows, self.cell_size.height, self.spacing.height),
        )
    }
}

/// One rectangular slot of the overlay, bound to a workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridCell {
    pub origin: Point,
    pub size: Size,
    pub workspace: WorkspaceId,
}

impl GridCell {
    /// Center point, rounded down like the rest of the integer layout.
    pub fn center(&self) -> Point {
        Point::new(
            self.origin.x + self.size.width / 2,
            self.origin.y + self.size.height / 2,
        )
    }

    /// Origin that centers a rectangle of `size` inside this cell.
    pub fn centered_origin(&self, size: Size) -> Point {
        Point::new(
            self.origin.x + (self.size.width - size.width) / 2,
            self.origin.y + (self.size.height - size.height) / 2,
        )
    }
}

/// The immutable set of cells for one overlay instance.
#[derive(Debug, Clone)]
pub struct Grid {
    /// Regular cells in row-major order.
    cells: Vec<GridCell>,
    special: GridCell,
}

/// Lay out the grid inside a container of `container` pixels.
///
/// The regular block is centered horizontally and starts `margin_top` pixels
/// from the top.  The cell at `(col, row)` is bound to workspace
/// `row * columns + col + 1`.
pub fn build_grid(spec: &GridSpec, container: Size) -> Grid {
    let block = spec.block_size();
    let start_x = (container.width - block.width) / 2;
    let start_y = spec.margin_top;
    let pitch_x = spec.cell_size.width + spec.spacing.width;
    let pitch_y = spec.cell_size.height + spec.spacing.height;

    let mut cells = Vec::with_capacity(spec.columns * spec.rows);
    for row in 0..spec.rows {
        for col in 0..spec.columns {
            cells.push(GridCell {
                origin: Point::new(
                    start_x + col as i32 * pitch_x,
                    start_y + row as i32 * pitch_y,
                ),
                size: spec.cell_size,
                workspace: WorkspaceId::Regular((row * spec.columns + col + 1) as i32),
            });
        }
    }

    let special = GridCell {
        origin: Point::new(
            (container.width - spec.cell_size.width) / 2,
            start_y + block.height + spec.special_gap,
        ),
        size: spec.cell_size,
        workspace: WorkspaceId::Special,
    };

    Grid { cells, special }
}

impl Grid {
    /// Every cell in build order (row-major, special last).
    pub fn cells(&self) -> impl Iterator<Item = &GridCell> {
        self.cells.iter().chain(std::iter::once(&self.special))
    }

    /// Number of cells, special included.
    pub fn len(&self) -> usize {
        self.cells.len() + 1
    }

    /// Always `false`: a grid has at least its special cell.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// The cell reserved for the special workspace.
    pub fn special_cell(&self) -> &GridCell {
        &self.special
    }

    /// The cell bound to `workspace`, if the grid has a slot for it.
    pub fn cell_for_workspace(&self, workspace: WorkspaceId) -> Option<&GridCell> {
        self.cells().find(|c| c.workspace == workspace)
    }

    /// The cell whose center is nearest to `point`.
    pub fn nearest_cell(&self, point: Point) -> &GridCell {
        nearest_cell(self.cells(), point).unwrap_or(&self.special)
    }
}

/// Pick the cell whose center has the smallest Manhattan distance to
/// `point`.  The first cell in iteration order wins exact ties.
pub fn nearest_cell<'a>(
    cells: impl IntoIterator<Item = &'a GridCell>,
    point: Point,
) -> Option<&'a GridCell> {
    cells
        .into_iter()
        .min_by_key(|cell| cell.center().manhattan_distance(point))
}

fn scale_axis(raw: i32, cell: i32, monitor: i32) -> i32 {
    if monitor <= 0 {
        return 0;
    }
    (raw as f64 * cell as f64 / monitor as f64).round() as i32
}

/// Map a monitor-space position into cell-local space.
pub fn scale_position(monitor: Size, cell: Size, raw: Point) -> Point {
    Point::new(
        scale_axis(raw.x, cell.width, monitor.width),
        scale_axis(raw.y, cell.height, monitor.height),
    )
}

/// Map a monitor-space size into cell-local space, never below `min`.
pub fn scale_size(monitor: Size, cell: Size, raw: Size, min: Size) -> Size {
    Size::new(
        scale_axis(raw.width, cell.width, monitor.width).max(min.width),
        scale_axis(raw.height, cell.height, monitor.height).max(min.height),
    )
}

//  Tests
