//! Game orchestration on top of the core data structures.
//!
//! - [`Engine`] - the spawn/fall/lock/clear state machine
//! - [`GameStats`] - score, level, lines and action counters
//! - [`PieceSource`] - pluggable supplier of upcoming shapes
//!
//! # Game flow
//!
//! 1. Construct an [`Engine`]; it spawns the first piece immediately.
//! 2. The scheduling collaborator calls [`Engine::tick`] on a cadence of
//!    [`Engine::current_fall_delay`], re-reading the delay after every lock.
//! 3. The input collaborator calls the `try_*` methods; each returns whether
//!    the action had an effect.
//! 4. When a piece can no longer fall it locks, full rows are cleared, and
//!    the next piece spawns - or the game ends if the spawn is blocked.
//! 5. After game over, [`Engine::reset`] starts a fresh game.

pub use self::{game::*, generator::*, stats::*};

mod game;
mod generator;
mod stats;
