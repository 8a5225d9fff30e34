//! Falling-block puzzle simulation engine.
//!
//! This crate is the pure core of the game: the settled-cell [`Grid`], the
//! seven-shape catalog with its rotation transform, the falling
//! [`ActivePiece`] with collision and hard-drop logic, and the [`Engine`]
//! state machine tying them together. Rendering, input decoding and tick
//! scheduling are external collaborators that drive the engine through its
//! public methods and read back snapshots; the core touches no display,
//! keyboard or timer.
//!
//! # Example
//!
//! ```
//! use gridfall_engine::{Engine, GridConfig, RandomSource};
//!
//! let mut engine = Engine::with_source(GridConfig::DEFAULT, RandomSource::with_seed(42));
//!
//! // One gravity tick; the scheduler would space these by
//! // `engine.current_fall_delay()`.
//! engine.tick();
//!
//! // User input.
//! engine.try_move_left();
//! engine.try_rotate();
//! let event = engine.hard_drop();
//! assert!(event.is_locked());
//! ```

pub use self::{core::*, engine::*};

pub mod core;
pub mod engine;

/// Rejected grid dimensions.
#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum ConfigError {
    #[display("grid width {width} cannot fit the 4-wide line shape")]
    WidthTooSmall { width: usize },
    #[display("grid height {height} cannot fit the 4-tall line shape")]
    HeightTooSmall { height: usize },
}
