use std::{mem, time::Duration};

use serde::{Deserialize, Serialize};

use crate::core::{
    grid::{Grid, GridConfig},
    piece::ActivePiece,
    shape::ShapeKind,
};

use super::{
    generator::{PieceSource, RandomSource},
    stats::GameStats,
};

/// Engine state machine: `Spawning -> Falling -> (Locking -> Spawning) |
/// GameOver`.
///
/// `Spawning` and `Locking` only exist inside a transition; between public
/// calls the engine is either `Falling` (holding the active piece) or
/// `GameOver`. There is no "piece not yet placed" sentinel: the piece lives
/// in the `Falling` variant.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::IsVariant)]
pub enum State {
    Spawning,
    Falling(ActivePiece),
    Locking,
    GameOver,
}

/// Outcome of a gravity tick or hard drop, reported to the scoring and
/// scheduling collaborators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum TickEvent {
    /// The piece descended one row and keeps falling.
    Stepped,
    /// The piece locked; rows may have been cleared and a new piece spawned.
    /// The scheduler must re-read [`Engine::current_fall_delay`] after this,
    /// since the level may have changed.
    Locked { lines_cleared: usize, level: u32 },
    /// The piece locked but the next spawn was blocked; the game is over.
    GameOver { lines_cleared: usize },
    /// Nothing happened (the engine is not in the falling state).
    Ignored,
}

/// The orchestrator tying [`Grid`] and [`ActivePiece`] together.
///
/// Single-threaded and non-reentrant: every operation is a synchronous,
/// atomic state transition, driven by an external scheduler calling
/// [`tick`](Self::tick) and an input collaborator calling the `try_*`
/// methods. The engine holds no timers; pausing is the scheduler simply not
/// ticking.
///
/// # Example
///
/// ```
/// use gridfall_engine::{Engine, GridConfig, RandomSource};
///
/// let mut engine = Engine::with_source(GridConfig::DEFAULT, RandomSource::with_seed(1));
/// engine.try_move_left();
/// while !engine.state().is_game_over() {
///     engine.hard_drop();
/// }
/// assert!(engine.stats().score() > 0);
/// ```
#[derive(Debug, Clone)]
pub struct Engine<S = RandomSource> {
    grid: Grid,
    state: State,
    next: ShapeKind,
    source: S,
    stats: GameStats,
}

impl Engine<RandomSource> {
    /// Starts a game on an empty grid with an OS-seeded shape source.
    #[must_use]
    pub fn new(config: GridConfig) -> Self {
        Self::with_source(config, RandomSource::new())
    }
}

impl<S: PieceSource> Engine<S> {
    /// Starts a game on an empty grid with the given shape source.
    #[must_use]
    pub fn with_source(config: GridConfig, source: S) -> Self {
        Self::from_grid(Grid::new(config), source)
    }

    /// Starts a game on a pre-filled grid, e.g. for scripted scenarios or
    /// resuming a recorded board. Spawns the first piece immediately; a grid
    /// already blocked at the spawn rows yields an engine that is game over
    /// from the start.
    #[must_use]
    pub fn from_grid(grid: Grid, mut source: S) -> Self {
        let next = source.next_shape();
        let mut engine = Self {
            grid,
            state: State::Spawning,
            next,
            source,
            stats: GameStats::new(),
        };
        engine.spawn();
        engine
    }

    /// Gravity step: descend one row, or lock and respawn when the piece
    /// cannot fall further. Driven by the external scheduler on a cadence of
    /// [`current_fall_delay`](Self::current_fall_delay).
    pub fn tick(&mut self) -> TickEvent {
        let State::Falling(piece) = &mut self.state else {
            return TickEvent::Ignored;
        };
        if piece.can_move_down(&self.grid) {
            piece.move_down(&self.grid);
            return TickEvent::Stepped;
        }
        self.lock_active()
    }

    /// User move left. No-op (not an error) outside the falling state.
    /// Returns whether the piece moved, for action counting.
    pub fn try_move_left(&mut self) -> bool {
        let State::Falling(piece) = &mut self.state else {
            return false;
        };
        if !piece.can_move_left(&self.grid) {
            return false;
        }
        piece.move_left(&self.grid);
        self.stats.record_action();
        true
    }

    /// User move right; see [`try_move_left`](Self::try_move_left).
    pub fn try_move_right(&mut self) -> bool {
        let State::Falling(piece) = &mut self.state else {
            return false;
        };
        if !piece.can_move_right(&self.grid) {
            return false;
        }
        piece.move_right(&self.grid);
        self.stats.record_action();
        true
    }

    /// User rotation; see [`try_move_left`](Self::try_move_left).
    pub fn try_rotate(&mut self) -> bool {
        let State::Falling(piece) = &mut self.state else {
            return false;
        };
        if !piece.can_rotate(&self.grid) {
            return false;
        }
        piece.rotate(&self.grid);
        self.stats.record_action();
        true
    }

    /// User-accelerated descent of one row, scoring `5 + level`. Refusal
    /// means the piece is grounded; the next tick will lock it.
    pub fn try_soft_drop(&mut self) -> bool {
        let State::Falling(piece) = &mut self.state else {
            return false;
        };
        if !piece.can_move_down(&self.grid) {
            return false;
        }
        piece.move_down(&self.grid);
        self.stats.record_drop_steps(1);
        true
    }

    /// Hard drop: jump to the precomputed shadow row, scoring `5 + level`
    /// per row descended, then lock immediately as if the next tick had found
    /// no legal down-move.
    pub fn hard_drop(&mut self) -> TickEvent {
        let State::Falling(piece) = &mut self.state else {
            return TickEvent::Ignored;
        };
        let steps = piece.drop_to_shadow();
        self.stats.record_drop_steps(steps);
        self.lock_active()
    }

    fn lock_active(&mut self) -> TickEvent {
        let State::Falling(piece) = mem::replace(&mut self.state, State::Locking) else {
            panic!("lock attempted without a falling piece");
        };
        self.grid
            .lock_cells(piece.x(), piece.y(), piece.matrix(), piece.kind());
        let lines_cleared = self.grid.clear_full_rows();
        self.stats.record_lock(lines_cleared);

        self.state = State::Spawning;
        self.spawn();
        if self.state.is_game_over() {
            TickEvent::GameOver { lines_cleared }
        } else {
            TickEvent::Locked {
                lines_cleared,
                level: self.stats.level(),
            }
        }
    }

    /// Consumes the preview shape, draws a new one and tests the spawn
    /// placement; a refusal is the game-over condition.
    fn spawn(&mut self) {
        debug_assert!(self.state.is_spawning());
        let kind = mem::replace(&mut self.next, self.source.next_shape());
        match ActivePiece::spawn(kind, &self.grid) {
            Some(piece) => {
                self.stats.record_spawn();
                self.state = State::Falling(piece);
            }
            None => self.state = State::GameOver,
        }
    }

    /// Clears the grid and stats and re-enters the spawn transition. The
    /// only way out of `GameOver`.
    pub fn reset(&mut self) {
        self.grid = Grid::new(self.grid.config());
        self.stats = GameStats::new();
        self.state = State::Spawning;
        self.spawn();
    }

    /// Milliseconds between gravity ticks for the current level:
    /// `80 + 700 / level`. The scheduler owns the timer and re-reads this
    /// after every lock.
    #[must_use]
    pub fn current_fall_delay(&self) -> Duration {
        Duration::from_millis(80 + 700 / u64::from(self.stats.level()))
    }

    #[must_use]
    pub fn state(&self) -> &State {
        &self.state
    }

    #[must_use]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// The falling piece, when there is one.
    #[must_use]
    pub fn active_piece(&self) -> Option<&ActivePiece> {
        match &self.state {
            State::Falling(piece) => Some(piece),
            _ => None,
        }
    }

    /// Upcoming shape, for the preview display only.
    #[must_use]
    pub fn next_shape(&self) -> ShapeKind {
        self.next
    }

    #[must_use]
    pub fn stats(&self) -> &GameStats {
        &self.stats
    }

    /// Read-only projection for the rendering collaborator. Grid cells and
    /// active-piece cells stay disjoint; compositing them is the renderer's
    /// job.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            width: self.grid.width(),
            height: self.grid.height(),
            cells: self
                .grid
                .rows()
                .flat_map(|row| row.iter().map(|cell| cell.color_id()))
                .collect(),
            piece: self.active_piece().map(|piece| PieceSnapshot {
                kind: piece.kind(),
                cells: piece.occupied_cells().into_iter().collect(),
                anchor: (piece.x(), piece.y()),
                shadow_y: piece.shadow_y(),
            }),
            next: self.next,
            stats: self.stats.clone(),
        }
    }
}

/// Serializable view of the whole game for rendering or recording.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Snapshot {
    pub width: usize,
    pub height: usize,
    /// Settled cells row-major, top to bottom, as color ids (0 = empty).
    pub cells: Vec<u8>,
    pub piece: Option<PieceSnapshot>,
    pub next: ShapeKind,
    pub stats: GameStats,
}

/// Serializable view of the falling piece.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PieceSnapshot {
    pub kind: ShapeKind,
    /// Grid-space `(row, col)` coordinates of the four filled cells.
    pub cells: Vec<(i32, i32)>,
    /// Top-left of the bounding matrix in grid coordinates.
    pub anchor: (i32, i32),
    /// Row the piece would reach on a hard drop.
    pub shadow_y: i32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::grid::Cell;
    use crate::engine::generator::SequenceSource;

    fn scripted(shapes: &[ShapeKind]) -> Engine<SequenceSource> {
        Engine::with_source(GridConfig::DEFAULT, SequenceSource::new(shapes.to_vec()))
    }

    #[test]
    fn test_new_engine_is_falling_with_a_preview() {
        let engine = scripted(&[ShapeKind::T, ShapeKind::O]);
        assert!(engine.state().is_falling());
        assert_eq!(engine.active_piece().unwrap().kind(), ShapeKind::T);
        assert_eq!(engine.next_shape(), ShapeKind::O);
        assert_eq!(engine.stats().pieces_on_level(), 1);
    }

    #[test]
    fn test_tick_steps_until_lock() {
        let mut engine = scripted(&[ShapeKind::O]);
        let mut steps = 0;
        loop {
            match engine.tick() {
                TickEvent::Stepped => steps += 1,
                TickEvent::Locked { lines_cleared, .. } => {
                    assert_eq!(lines_cleared, 0);
                    break;
                }
                event => panic!("unexpected event {event:?}"),
            }
        }
        // O spawns with its bottom row on row 1 and locks on the floor.
        assert_eq!(steps, 21);
        // The locked cells are settled in the grid, a new piece is falling.
        assert_eq!(engine.grid().cell(22, 5), Cell::Block(ShapeKind::O));
        assert_eq!(engine.grid().cell(21, 6), Cell::Block(ShapeKind::O));
        assert!(engine.state().is_falling());
        assert_eq!(engine.stats().pieces_on_level(), 2);
    }

    #[test]
    fn test_gravity_ticks_do_not_score() {
        let mut engine = scripted(&[ShapeKind::O]);
        while engine.tick().is_stepped() {}
        assert_eq!(engine.stats().score(), 0);
        assert_eq!(engine.stats().actions(), 0);
    }

    #[test]
    fn test_soft_drop_scores_per_step() {
        let mut engine = scripted(&[ShapeKind::O]);
        assert!(engine.try_soft_drop());
        assert!(engine.try_soft_drop());
        assert_eq!(engine.stats().score(), 12); // 2 * (5 + 1)
        assert_eq!(engine.stats().actions(), 2);
    }

    #[test]
    fn test_moves_are_counted_and_bounded() {
        let mut engine = scripted(&[ShapeKind::O]);
        let mut moved = 0;
        while engine.try_move_left() {
            moved += 1;
        }
        assert_eq!(moved, 5); // O spawns at x = 5
        assert_eq!(engine.stats().actions(), 5);
        assert!(!engine.try_move_left(), "wall refusal is a no-op");
        assert_eq!(engine.stats().actions(), 5);
    }

    #[test]
    fn test_three_line_pieces_clear_one_row() {
        // Three I-pieces side by side cover all 12 columns of the bottom row.
        let mut engine = scripted(&[ShapeKind::I]);

        for _ in 0..4 {
            assert!(engine.try_move_left());
        }
        assert!(engine.hard_drop().is_locked());

        // Second I spawns already at columns 4..8.
        assert!(matches!(
            engine.hard_drop(),
            TickEvent::Locked { lines_cleared: 0, .. }
        ));

        for _ in 0..4 {
            assert!(engine.try_move_right());
        }
        assert_eq!(
            engine.hard_drop(),
            TickEvent::Locked {
                lines_cleared: 1,
                level: 1,
            },
        );

        assert_eq!(engine.stats().lines(), 1);
        // Each drop descends 21 rows at 5 + 1 points; the clear pays
        // 1000 * level * lines on top.
        assert_eq!(engine.stats().score(), 3 * 21 * 6 + 1000);
        // The cleared row leaves an empty grid behind.
        assert!(engine.grid().rows().all(|row| row.iter().all(|c| c.is_empty())));
    }

    #[test]
    fn test_blocked_spawn_is_game_over_not_falling() {
        let mut art = String::from("####.####.##\n####.####.##\n");
        for _ in 0..21 {
            art.push_str("............\n");
        }
        let grid = Grid::from_ascii(GridConfig::DEFAULT, &art);
        let engine = Engine::from_grid(grid, SequenceSource::new(vec![ShapeKind::T]));
        assert!(engine.state().is_game_over());
        assert!(engine.active_piece().is_none());
        assert_eq!(engine.stats().pieces_on_level(), 0, "a refused spawn is not counted");
    }

    #[test]
    fn test_game_over_ignores_all_input() {
        let mut art = String::from("####.####.##\n####.####.##\n");
        for _ in 0..21 {
            art.push_str("............\n");
        }
        let grid = Grid::from_ascii(GridConfig::DEFAULT, &art);
        let mut engine = Engine::from_grid(grid, SequenceSource::new(vec![ShapeKind::T]));
        assert!(engine.tick().is_ignored());
        assert!(engine.hard_drop().is_ignored());
        assert!(!engine.try_move_left());
        assert!(!engine.try_move_right());
        assert!(!engine.try_rotate());
        assert!(!engine.try_soft_drop());
    }

    #[test]
    fn test_reset_leaves_game_over() {
        let mut art = String::from("####.####.##\n####.####.##\n");
        for _ in 0..21 {
            art.push_str("............\n");
        }
        let grid = Grid::from_ascii(GridConfig::DEFAULT, &art);
        let mut engine = Engine::from_grid(grid, SequenceSource::new(vec![ShapeKind::T]));
        assert!(engine.state().is_game_over());
        engine.reset();
        assert!(engine.state().is_falling());
        assert_eq!(engine.stats().score(), 0);
        assert!(engine.grid().rows().all(|row| row.iter().all(|c| c.is_empty())));
    }

    #[test]
    fn test_fall_delay_shrinks_with_level() {
        let engine = scripted(&[ShapeKind::O]);
        assert_eq!(engine.current_fall_delay(), Duration::from_millis(780));
        // 80 + 700 / level flattens toward the 80ms floor.
        let mut stats = GameStats::new();
        for _ in 0..12 {
            stats.record_spawn();
        }
        assert_eq!(stats.level(), 2);
    }

    #[test]
    fn test_level_up_after_piece_quota_via_hard_drops() {
        let mut engine = scripted(&[ShapeKind::O, ShapeKind::I, ShapeKind::T]);
        // The first spawn happened at construction; 11 more locks reach the
        // level-1 quota of 12 pieces.
        for _ in 0..11 {
            assert!(!engine.state().is_game_over());
            engine.hard_drop();
        }
        assert_eq!(engine.stats().level(), 2);
    }

    #[test]
    fn test_seeded_engines_are_deterministic() {
        let mut a = Engine::with_source(GridConfig::DEFAULT, RandomSource::with_seed(99));
        let mut b = Engine::with_source(GridConfig::DEFAULT, RandomSource::with_seed(99));
        for _ in 0..10 {
            assert_eq!(a.active_piece(), b.active_piece());
            assert_eq!(a.next_shape(), b.next_shape());
            a.hard_drop();
            b.hard_drop();
        }
        assert_eq!(a.snapshot(), b.snapshot());
    }

    #[test]
    fn test_snapshot_projects_disjoint_grid_and_piece() {
        let mut engine = scripted(&[ShapeKind::O, ShapeKind::T]);
        engine.hard_drop();
        let snapshot = engine.snapshot();
        assert_eq!(snapshot.cells.len(), 12 * 23);
        // Locked O cells carry its color id.
        assert_eq!(snapshot.cells[22 * 12 + 5], ShapeKind::O.color_id());
        let piece = snapshot.piece.unwrap();
        assert_eq!(piece.kind, ShapeKind::T);
        for (row, col) in &piece.cells {
            let index = usize::try_from(*row).unwrap() * 12 + usize::try_from(*col).unwrap();
            assert_eq!(snapshot.cells[index], 0, "active piece must not be settled");
        }
    }

    #[test]
    fn test_snapshot_serde_round_trip() {
        let engine = scripted(&[ShapeKind::Z, ShapeKind::L]);
        let snapshot = engine.snapshot();
        let json = serde_json::to_string(&snapshot).unwrap();
        let back: Snapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snapshot);
    }
}
