use rand::{Rng, SeedableRng as _};
use rand_pcg::Pcg32;

use crate::core::shape::ShapeKind;

/// Supplier of upcoming shapes.
///
/// The engine draws one shape per spawn; which distribution backs the draw is
/// pluggable so tests and replays can script the sequence.
pub trait PieceSource {
    fn next_shape(&mut self) -> ShapeKind;
}

/// Uniform random shape source.
///
/// Every draw is an independent uniform pick over the seven kinds. Seedable
/// for deterministic games.
#[derive(Debug, Clone)]
pub struct RandomSource {
    rng: Pcg32,
}

impl Default for RandomSource {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomSource {
    /// Creates a source seeded from the OS random data source.
    #[must_use]
    pub fn new() -> Self {
        Self::with_seed(rand::rng().random())
    }

    /// Like [`Self::new`], but with a fixed seed: the same seed always yields
    /// the same shape sequence.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
        }
    }
}

impl PieceSource for RandomSource {
    fn next_shape(&mut self) -> ShapeKind {
        self.rng.random()
    }
}

/// Scripted shape source for tests and replays. Cycles when exhausted.
#[derive(Debug, Clone)]
pub struct SequenceSource {
    shapes: Vec<ShapeKind>,
    cursor: usize,
}

impl SequenceSource {
    /// # Panics
    ///
    /// Panics when `shapes` is empty.
    #[must_use]
    pub fn new(shapes: Vec<ShapeKind>) -> Self {
        assert!(!shapes.is_empty(), "sequence source needs at least one shape");
        Self { shapes, cursor: 0 }
    }
}

impl PieceSource for SequenceSource {
    fn next_shape(&mut self) -> ShapeKind {
        let kind = self.shapes[self.cursor % self.shapes.len()];
        self.cursor += 1;
        kind
    }
}
