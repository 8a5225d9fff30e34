use serde::{Deserialize, Serialize};

use crate::ConfigError;

use super::shape::{ShapeKind, ShapeMatrix};

/// Grid dimensions. These are configuration, not constants: two-player
/// variants or tests may run engines with different board sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct GridConfig {
    width: usize,
    height: usize,
}

impl GridConfig {
    /// The classic 12×23 playfield.
    pub const DEFAULT: Self = Self {
        width: 12,
        height: 23,
    };

    /// Smallest edge that still fits the 4-wide line shape in any orientation.
    const MIN_EDGE: usize = 4;

    pub fn new(width: usize, height: usize) -> Result<Self, ConfigError> {
        if width < Self::MIN_EDGE {
            return Err(ConfigError::WidthTooSmall { width });
        }
        if height < Self::MIN_EDGE {
            return Err(ConfigError::HeightTooSmall { height });
        }
        Ok(Self { width, height })
    }

    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// A single settled cell.
///
/// Holds the kind of the shape that locked there, never the currently
/// falling piece; compositing the active piece over the grid is the
/// renderer's job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
pub enum Cell {
    #[default]
    Empty,
    Block(ShapeKind),
}

impl Cell {
    #[must_use]
    pub fn is_empty(self) -> bool {
        self == Cell::Empty
    }

    /// Nonzero color identifier of the settled block, 0 when empty.
    #[must_use]
    pub const fn color_id(self) -> u8 {
        match self {
            Cell::Empty => 0,
            Cell::Block(kind) => kind.color_id(),
        }
    }
}

/// The settled-cell board.
///
/// Stores only locked blocks; the active piece lives in
/// [`ActivePiece`](super::piece::ActivePiece) and is never written here until
/// it locks. Mutated exclusively by the engine on lock and line clear.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl Grid {
    /// Creates an empty grid with the given dimensions.
    #[must_use]
    pub fn new(config: GridConfig) -> Self {
        Self {
            width: config.width(),
            height: config.height(),
            cells: vec![Cell::Empty; config.width() * config.height()],
        }
    }

    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    #[must_use]
    pub const fn config(&self) -> GridConfig {
        GridConfig {
            width: self.width,
            height: self.height,
        }
    }

    const fn index(&self, row: usize, col: usize) -> usize {
        row * self.width + col
    }

    /// Returns the settled cell at `(row, col)`.
    ///
    /// # Panics
    ///
    /// Panics when the coordinate is outside the grid.
    #[must_use]
    pub fn cell(&self, row: usize, col: usize) -> Cell {
        assert!(row < self.height, "row {row} out of range 0..{}", self.height);
        assert!(col < self.width, "col {col} out of range 0..{}", self.width);
        self.cells[self.index(row, col)]
    }

    /// Whether a settled block occupies `(row, col)`.
    ///
    /// Rows above the visible grid (`row < 0`) are always unoccupied so that
    /// pieces can spawn in the buffer above the top edge.
    ///
    /// # Panics
    ///
    /// Panics when `col` is outside `[0, width)` or `row >= height`; such a
    /// query indicates a broken collision check in the caller.
    #[must_use]
    pub fn is_occupied(&self, row: i32, col: i32) -> bool {
        assert!(
            0 <= col && col < self.width as i32,
            "col {col} out of range 0..{}",
            self.width,
        );
        assert!(
            row < self.height as i32,
            "row {row} out of range ..{}",
            self.height,
        );
        if row < 0 {
            return false;
        }
        #[expect(clippy::cast_sign_loss)]
        let cell = self.cell(row as usize, col as usize);
        !cell.is_empty()
    }

    /// Writes the shape's cells into the grid, translated by the anchor.
    ///
    /// # Panics
    ///
    /// Every destination must be inside the grid and currently empty; the
    /// caller is required to have verified the placement with the canonical
    /// collision rule first, so a violation means a collision check was
    /// skipped and the grid state can no longer be trusted.
    pub fn lock_cells(&mut self, x: i32, y: i32, matrix: &ShapeMatrix, kind: ShapeKind) {
        for (row, col) in matrix.filled_cells() {
            #[expect(clippy::cast_possible_wrap)]
            let (target_y, target_x) = (y + row as i32, x + col as i32);
            assert!(
                0 <= target_y
                    && target_y < self.height as i32
                    && 0 <= target_x
                    && target_x < self.width as i32,
                "locking cell outside the grid at ({target_y}, {target_x})",
            );
            #[expect(clippy::cast_sign_loss)]
            let index = self.index(target_y as usize, target_x as usize);
            assert!(
                self.cells[index].is_empty(),
                "locking into an occupied cell at ({target_y}, {target_x})",
            );
            self.cells[index] = Cell::Block(kind);
        }
    }

    /// Whether every column in `row` holds a settled block.
    #[must_use]
    pub fn is_row_full(&self, row: usize) -> bool {
        self.row(row).iter().all(|cell| !cell.is_empty())
    }

    /// Removes every full row, shifting the rows above down and inserting
    /// empty rows at the top. Returns the number of rows removed.
    ///
    /// Scans bottom to top. After a removal the scan index is not advanced:
    /// the row that slid into the cleared slot must be re-tested at its new
    /// position, which is what makes multiple (possibly non-adjacent) full
    /// rows come out right.
    pub fn clear_full_rows(&mut self) -> usize {
        let mut cleared = 0;
        let mut row = self.height;
        while row > 0 {
            row -= 1;
            if self.is_row_full(row) {
                self.remove_row(row);
                cleared += 1;
                row += 1;
            }
        }
        cleared
    }

    fn remove_row(&mut self, row: usize) {
        self.cells.copy_within(0..row * self.width, self.width);
        self.cells[..self.width].fill(Cell::Empty);
    }

    /// Returns the cells of `col` top to bottom.
    ///
    /// Used for hard-drop depth computation: the first occupied cell in a
    /// column bounds how far the piece can fall in that column.
    ///
    /// # Panics
    ///
    /// Panics when `col` is outside `[0, width)`.
    pub fn column_profile(&self, col: usize) -> impl Iterator<Item = Cell> + '_ {
        assert!(col < self.width, "col {col} out of range 0..{}", self.width);
        (0..self.height).map(move |row| self.cells[self.index(row, col)])
    }

    fn row(&self, row: usize) -> &[Cell] {
        assert!(row < self.height, "row {row} out of range 0..{}", self.height);
        &self.cells[row * self.width..(row + 1) * self.width]
    }

    /// Returns the rows top to bottom, each a slice of settled cells.
    ///
    /// This is the read-only snapshot the rendering collaborator consumes.
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks(self.width)
    }

    /// Builds a grid from ASCII art for testing. `'#'` is a settled block,
    /// `'.'` an empty cell; other characters are ignored. The drawn rows are
    /// the bottom rows of the grid, rows above them stay empty.
    #[must_use]
    pub fn from_ascii(config: GridConfig, art: &str) -> Self {
        let mut grid = Self::new(config);
        let lines: Vec<&str> = art.lines().filter(|line| !line.trim().is_empty()).collect();
        assert!(
            lines.len() <= grid.height,
            "art has {} rows, grid only {}",
            lines.len(),
            grid.height,
        );

        let top = grid.height - lines.len();
        for (dy, line) in lines.iter().enumerate() {
            let cells: Vec<char> = line.chars().filter(|c| *c == '#' || *c == '.').collect();
            assert_eq!(
                cells.len(),
                grid.width,
                "each row must have exactly {} cells, got {} at row {dy}",
                grid.width,
                cells.len(),
            );
            for (col, &ch) in cells.iter().enumerate() {
                if ch == '#' {
                    let index = grid.index(top + dy, col);
                    grid.cells[index] = Cell::Block(ShapeKind::I);
                }
            }
        }
        grid
    }
}
