//! Gomoku for the AlphaGomoku search engine.
//!
//! Provides [`Gomoku`], a k-in-a-row grid game implementing
//! `alphagomoku_core::Environment`, and [`GameRecord`] for saving and
//! replaying games as JSON.

mod gomoku;
mod record;

pub use gomoku::{Gomoku, Stone, DEFAULT_BOARD_SIZE, DEFAULT_WIN_LENGTH, WIN_REWARD};
pub use record::{GameRecord, MoveRecord};
