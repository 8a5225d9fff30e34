use arrayvec::ArrayVec;
use rand::{Rng, distr::StandardUniform, prelude::Distribution};
use serde::{Deserialize, Serialize};

/// Enum representing one of the seven canonical shapes.
///
/// Discriminants follow the catalog order, so `kind as u8 + 1` is the
/// color identifier written into the grid when the shape locks.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize, derive_more::Display,
)]
#[repr(u8)]
pub enum ShapeKind {
    /// L-shape.
    #[display("L")]
    L = 0,
    /// J-shape.
    #[display("J")]
    J = 1,
    /// S-shape.
    #[display("S")]
    S = 2,
    /// Z-shape.
    #[display("Z")]
    Z = 3,
    /// T-shape.
    #[display("T")]
    T = 4,
    /// O-shape (2×2 square).
    #[display("O")]
    O = 5,
    /// I-shape (4×4 line).
    #[display("I")]
    I = 6,
}

impl Distribution<ShapeKind> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> ShapeKind {
        match rng.random_range(0..=6) {
            0 => ShapeKind::L,
            1 => ShapeKind::J,
            2 => ShapeKind::S,
            3 => ShapeKind::Z,
            4 => ShapeKind::T,
            5 => ShapeKind::O,
            _ => ShapeKind::I,
        }
    }
}

impl ShapeKind {
    /// Number of shape kinds (7).
    pub const LEN: usize = 7;

    /// All shape kinds in catalog order.
    pub const ALL: [ShapeKind; Self::LEN] = [
        ShapeKind::L,
        ShapeKind::J,
        ShapeKind::S,
        ShapeKind::Z,
        ShapeKind::T,
        ShapeKind::O,
        ShapeKind::I,
    ];

    /// Returns the spawn-orientation matrix for this shape.
    ///
    /// The catalog entry itself is a process-wide constant; rotation always
    /// operates on the returned copy, never on the catalog.
    #[must_use]
    pub fn matrix(self) -> ShapeMatrix {
        CATALOG[self as usize]
    }

    /// Returns the nonzero cell value this shape leaves in the grid (1..=7).
    #[must_use]
    pub const fn color_id(self) -> u8 {
        self as u8 + 1
    }
}

/// Square boolean matrix describing a shape orientation.
///
/// The logical size is 2 (O), 3 (L, J, S, Z, T) or 4 (I); cells outside the
/// logical size are always empty. Coordinates are `(row, col)` with row 0 at
/// the top, matching grid coordinates once translated by a piece anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShapeMatrix {
    size: usize,
    cells: [[bool; 4]; 4],
}

impl ShapeMatrix {
    /// Logical edge length of the matrix (2, 3 or 4).
    #[must_use]
    pub const fn size(&self) -> usize {
        self.size
    }

    #[must_use]
    pub const fn is_filled(&self, row: usize, col: usize) -> bool {
        self.cells[row][col]
    }

    /// Rotates the matrix 90° clockwise in place.
    ///
    /// Works ring by ring: for each square layer the four corresponding edge
    /// cells are cyclically permuted (top→right, right→bottom, bottom→left,
    /// left→top). For odd sizes the center cell is untouched. Applying this
    /// four times restores the original matrix for every shape.
    pub const fn rotate_cw(&mut self) {
        let n = self.size;
        let mut layer = 0;
        while layer < n / 2 {
            let last = n - 1 - layer;
            let mut i = layer;
            while i < last {
                let offset = i - layer;
                let top = self.cells[layer][i];
                self.cells[layer][i] = self.cells[last - offset][layer];
                self.cells[last - offset][layer] = self.cells[last][last - offset];
                self.cells[last][last - offset] = self.cells[i][last];
                self.cells[i][last] = top;
                i += 1;
            }
            layer += 1;
        }
    }

    /// Returns a copy rotated 90° clockwise, leaving `self` untouched.
    #[must_use]
    pub const fn rotated_cw(mut self) -> Self {
        self.rotate_cw();
        self
    }

    /// Returns the `(row, col)` coordinates of the four filled cells.
    #[must_use]
    pub fn filled_cells(&self) -> ArrayVec<(usize, usize), 4> {
        let mut cells = ArrayVec::new();
        for row in 0..self.size {
            for col in 0..self.size {
                if self.cells[row][col] {
                    cells.push((row, col));
                }
            }
        }
        cells
    }

    /// Returns the lowest filled row in `col`, or `None` for an empty column.
    ///
    /// This is the per-column depth offset used for hard-drop computation.
    #[must_use]
    pub fn column_depth(&self, col: usize) -> Option<usize> {
        (0..self.size).rev().find(|&row| self.cells[row][col])
    }

    /// Returns the lowest row containing a filled cell.
    #[must_use]
    pub fn bottom_filled_row(&self) -> usize {
        (0..self.size)
            .rev()
            .find(|&row| self.cells[row].iter().any(|&c| c))
            .unwrap_or(0)
    }
}

const fn shape(size: usize, cells: [[bool; 4]; 4]) -> ShapeMatrix {
    ShapeMatrix { size, cells }
}

const CATALOG: [ShapeMatrix; ShapeKind::LEN] = {
    const C: bool = true;
    const E: bool = false;
    const EEEE: [bool; 4] = [E; 4];
    [
        // L-shape
        shape(3, [[E, E, C, E], [C, C, C, E], EEEE, EEEE]),
        // J-shape
        shape(3, [[C, E, E, E], [C, C, C, E], EEEE, EEEE]),
        // S-shape
        shape(3, [[E, C, C, E], [C, C, E, E], EEEE, EEEE]),
        // Z-shape
        shape(3, [[C, C, E, E], [E, C, C, E], EEEE, EEEE]),
        // T-shape
        shape(3, [[E, C, E, E], [C, C, C, E], EEEE, EEEE]),
        // O-shape
        shape(2, [[C, C, E, E], [C, C, E, E], EEEE, EEEE]),
        // I-shape
        shape(4, [EEEE, [C, C, C, C], EEEE, EEEE]),
    ]
};
