use serde::{Deserialize, Serialize};

/// Accumulated scoring state, consumed by the scoring collaborator.
///
/// Rules match the classic game:
///
/// - each manual or forced down step scores `5 + level`
/// - a lock that clears `n` lines scores `1000 * level * n`
/// - the level rises after `10 + level * 2` pieces and the piece counter
///   resets
///
/// `actions` counts every successful user move for APM display; elapsed time
/// is owned by the scheduling collaborator, not tracked here.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct GameStats {
    score: u64,
    level: u32,
    lines: u32,
    pieces_on_level: u32,
    actions: u32,
}

impl Default for GameStats {
    fn default() -> Self {
        Self::new()
    }
}

impl GameStats {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            score: 0,
            level: 1,
            lines: 0,
            pieces_on_level: 0,
            actions: 0,
        }
    }

    #[must_use]
    pub const fn score(&self) -> u64 {
        self.score
    }

    /// Current level, starting at 1.
    #[must_use]
    pub const fn level(&self) -> u32 {
        self.level
    }

    /// Total rows cleared.
    #[must_use]
    pub const fn lines(&self) -> u32 {
        self.lines
    }

    /// Pieces spawned since the last level-up.
    #[must_use]
    pub const fn pieces_on_level(&self) -> u32 {
        self.pieces_on_level
    }

    /// Successful user actions, the APM numerator.
    #[must_use]
    pub const fn actions(&self) -> u32 {
        self.actions
    }

    /// Counts a successful horizontal move or rotation.
    pub const fn record_action(&mut self) {
        self.actions += 1;
    }

    /// Counts `steps` manual/forced down moves, scoring `5 + level` each.
    pub const fn record_drop_steps(&mut self, steps: u32) {
        self.actions += steps;
        self.score += (steps as u64) * (5 + self.level as u64);
    }

    /// Counts a spawned piece, raising the level every `10 + level * 2`
    /// pieces.
    pub const fn record_spawn(&mut self) {
        self.pieces_on_level += 1;
        if self.pieces_on_level >= 10 + self.level * 2 {
            self.level += 1;
            self.pieces_on_level = 0;
        }
    }

    /// Credits a lock that cleared `lines` rows.
    pub const fn record_lock(&mut self, lines: usize) {
        if lines > 0 {
            self.lines += lines as u32;
            self.score += 1000 * (self.level as u64) * (lines as u64);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_stats_start_at_level_one() {
        let stats = GameStats::new();
        assert_eq!(stats.level(), 1);
        assert_eq!(stats.score(), 0);
        assert_eq!(stats.lines(), 0);
        assert_eq!(stats.actions(), 0);
    }

    #[test]
    fn test_drop_steps_score_and_count() {
        let mut stats = GameStats::new();
        stats.record_drop_steps(3);
        assert_eq!(stats.score(), 18); // 3 * (5 + 1)
        assert_eq!(stats.actions(), 3);
    }

    #[test]
    fn test_lock_scoring_scales_with_level_and_lines() {
        let mut stats = GameStats::new();
        stats.record_lock(2);
        assert_eq!(stats.score(), 2000);
        assert_eq!(stats.lines(), 2);
        stats.record_lock(0);
        assert_eq!(stats.score(), 2000, "an empty lock scores nothing");
    }

    #[test]
    fn test_level_rises_after_piece_quota() {
        let mut stats = GameStats::new();
        // Level 1 quota is 10 + 2 = 12 pieces.
        for _ in 0..11 {
            stats.record_spawn();
            assert_eq!(stats.level(), 1);
        }
        stats.record_spawn();
        assert_eq!(stats.level(), 2);
        assert_eq!(stats.pieces_on_level(), 0);
        // Level 2 quota grows to 14.
        for _ in 0..13 {
            stats.record_spawn();
        }
        assert_eq!(stats.level(), 2);
        stats.record_spawn();
        assert_eq!(stats.level(), 3);
    }

    #[test]
    fn test_serde_round_trip() {
        let mut stats = GameStats::new();
        stats.record_drop_steps(4);
        stats.record_lock(1);
        let json = serde_json::to_string(&stats).unwrap();
        let back: GameStats = serde_json::from_str(&json).unwrap();
        assert_eq!(back, stats);
    }
}
