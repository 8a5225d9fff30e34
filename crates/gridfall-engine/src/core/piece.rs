use arrayvec::ArrayVec;

use super::{
    grid::Grid,
    shape::{ShapeKind, ShapeMatrix},
};

/// The currently falling piece.
///
/// Transient per-drop state: shape kind, current orientation matrix, integer
/// anchor `(x, y)` (top-left of the bounding matrix in grid coordinates; `y`
/// may be negative while the piece is still in the spawn buffer above the
/// visible grid) and the precomputed shadow row.
///
/// The anchor is only ever set to a placement that passes the canonical
/// collision rule; every mutator asserts the matching `can_*` query, so the
/// engine must check before it acts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivePiece {
    kind: ShapeKind,
    matrix: ShapeMatrix,
    x: i32,
    y: i32,
    shadow_y: i32,
}

impl ActivePiece {
    /// Attempts to spawn a piece in its catalog orientation.
    ///
    /// The anchor is horizontally centered for the shape's bounding width and
    /// vertically placed so the matrix's bottom filled row lands on row 1.
    /// Returns `None` when the spawn placement fails the canonical rule,
    /// which is how a full board signals game over.
    #[expect(clippy::cast_possible_wrap)]
    pub fn spawn(kind: ShapeKind, grid: &Grid) -> Option<Self> {
        let matrix = kind.matrix();
        let x = (grid.width() - matrix.size()) as i32 / 2;
        let y = 1 - matrix.bottom_filled_row() as i32;
        if !Self::placement_fits(grid, &matrix, x, y) {
            return None;
        }
        let mut piece = Self {
            kind,
            matrix,
            x,
            y,
            shadow_y: y,
        };
        piece.update_shadow(grid);
        Some(piece)
    }

    /// The canonical collision rule.
    ///
    /// A candidate placement is legal iff every filled cell of `matrix`,
    /// translated by the anchor, stays inside `[0, width)` horizontally and
    /// above `height` vertically, and does not overlap a settled cell. Cells
    /// above the visible grid are always legal. The rule evaluates the
    /// candidate only; the grid never stores active-piece cells, so there is
    /// no footprint to exclude.
    #[must_use]
    #[expect(clippy::cast_possible_wrap)]
    pub fn placement_fits(grid: &Grid, matrix: &ShapeMatrix, x: i32, y: i32) -> bool {
        for (row, col) in matrix.filled_cells() {
            let target_x = x + col as i32;
            let target_y = y + row as i32;
            if target_x < 0 || target_x >= grid.width() as i32 {
                return false;
            }
            if target_y >= grid.height() as i32 {
                return false;
            }
            if target_y >= 0 && grid.is_occupied(target_y, target_x) {
                return false;
            }
        }
        true
    }

    #[must_use]
    pub fn can_move_down(&self, grid: &Grid) -> bool {
        Self::placement_fits(grid, &self.matrix, self.x, self.y + 1)
    }

    #[must_use]
    pub fn can_move_left(&self, grid: &Grid) -> bool {
        Self::placement_fits(grid, &self.matrix, self.x - 1, self.y)
    }

    #[must_use]
    pub fn can_move_right(&self, grid: &Grid) -> bool {
        Self::placement_fits(grid, &self.matrix, self.x + 1, self.y)
    }

    /// Whether the next clockwise orientation fits at the current anchor.
    #[must_use]
    pub fn can_rotate(&self, grid: &Grid) -> bool {
        Self::placement_fits(grid, &self.matrix.rotated_cw(), self.x, self.y)
    }

    /// Commits a one-row descent. The shadow row depends only on the anchor
    /// column and orientation, so it is not recomputed here.
    pub fn move_down(&mut self, grid: &Grid) {
        assert!(self.can_move_down(grid), "move_down without a passing check");
        self.y += 1;
    }

    pub fn move_left(&mut self, grid: &Grid) {
        assert!(self.can_move_left(grid), "move_left without a passing check");
        self.x -= 1;
        self.update_shadow(grid);
    }

    pub fn move_right(&mut self, grid: &Grid) {
        assert!(
            self.can_move_right(grid),
            "move_right without a passing check",
        );
        self.x += 1;
        self.update_shadow(grid);
    }

    /// Replaces the orientation with its clockwise rotation, anchor unchanged.
    /// Four rotations return any shape to its spawn orientation.
    pub fn rotate(&mut self, grid: &Grid) {
        assert!(self.can_rotate(grid), "rotate without a passing check");
        self.matrix.rotate_cw();
        self.update_shadow(grid);
    }

    /// Moves the piece straight to its shadow row, returning the number of
    /// rows descended.
    pub fn drop_to_shadow(&mut self) -> u32 {
        let steps = self.shadow_y - self.y;
        self.y = self.shadow_y;
        steps.unsigned_abs()
    }

    fn update_shadow(&mut self, grid: &Grid) {
        self.shadow_y = Self::lowest_viable_y(grid, &self.matrix, self.x, self.y);
    }

    /// Lowest anchor row the orientation can occupy at `x`.
    ///
    /// For each occupied column the grid's column profile is scanned below
    /// the piece for the first settled cell (or the floor), and the shape's
    /// per-column depth offset is subtracted; the minimum across columns is
    /// the hard-drop row. Recomputed when `x` or the orientation changes,
    /// not on every gravity tick.
    #[must_use]
    #[expect(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
    pub fn lowest_viable_y(grid: &Grid, matrix: &ShapeMatrix, x: i32, y: i32) -> i32 {
        let mut lowest = grid.height() as i32;
        for col in 0..matrix.size() {
            let Some(depth) = matrix.column_depth(col) else {
                continue;
            };
            let depth = depth as i32;
            let grid_col = (x + col as i32) as usize;
            let scan_from = (y + depth + 1).max(0) as usize;
            let floor = grid
                .column_profile(grid_col)
                .enumerate()
                .skip(scan_from)
                .find(|(_, cell)| !cell.is_empty())
                .map_or(grid.height(), |(row, _)| row);
            lowest = lowest.min(floor as i32 - 1 - depth);
        }
        lowest
    }

    #[must_use]
    pub fn kind(&self) -> ShapeKind {
        self.kind
    }

    #[must_use]
    pub fn matrix(&self) -> &ShapeMatrix {
        &self.matrix
    }

    #[must_use]
    pub fn x(&self) -> i32 {
        self.x
    }

    #[must_use]
    pub fn y(&self) -> i32 {
        self.y
    }

    /// Row the piece would occupy after a hard drop, given the current anchor
    /// column and orientation.
    #[must_use]
    pub fn shadow_y(&self) -> i32 {
        self.shadow_y
    }

    /// Grid-space `(row, col)` coordinates of the piece's filled cells.
    #[must_use]
    #[expect(clippy::cast_possible_wrap)]
    pub fn occupied_cells(&self) -> ArrayVec<(i32, i32), 4> {
        self.matrix
            .filled_cells()
            .into_iter()
            .map(|(row, col)| (self.y + row as i32, self.x + col as i32))
            .collect()
    }
}
