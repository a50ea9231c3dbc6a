//! Serialisable game records.
//!
//! A record stores the board geometry, the move list and the winner, and
//! can be replayed back into a [`Gomoku`] position.

use crate::gomoku::{Gomoku, Stone};
use alphagomoku_core::{Environment, Error, Outcome, Result};
use serde::{Deserialize, Serialize};

/// One placed stone.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRecord {
    pub player: Stone,
    pub row: usize,
    pub col: usize,
}

/// A complete or partial game.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    pub rows: usize,
    pub cols: usize,
    pub win_length: usize,
    pub moves: Vec<MoveRecord>,

    /// `None` while the game is running or if it was drawn.
    pub winner: Option<Stone>,
}

impl GameRecord {
    /// Captures the moves played in `game` so far.
    pub fn from_game(game: &Gomoku) -> Self {
        let mut player = Stone::Black;
        let moves = game
            .moves()
            .iter()
            .map(|&action| {
                let (row, col) = game.position_of(action);
                let record = MoveRecord { player, row, col };
                player = player.opposite();
                record
            })
            .collect();

        Self {
            rows: game.rows(),
            cols: game.cols(),
            win_length: game.win_length(),
            moves,
            winner: game.outcome().and_then(|o| o.winner().copied()),
        }
    }

    /// Replays the record into a fresh game.
    ///
    /// # Errors
    /// Fails if the geometry is invalid, a move is out of turn or illegal,
    /// or the stored winner disagrees with the replayed position.
    pub fn replay(&self) -> Result<Gomoku> {
        let mut game = Gomoku::with_size(self.rows, self.cols, self.win_length)?;
        for (i, mv) in self.moves.iter().enumerate() {
            if mv.player != game.current_player() {
                return Err(Error::InvalidArgument(format!(
                    "move {i} is played by {} out of turn",
                    mv.player
                )));
            }
            let action = game
                .action_at(mv.row, mv.col)
                .ok_or_else(|| Error::InvalidArgument(format!("move {i} is off the board")))?;
            game.step(action)?;
        }

        let replayed = game.outcome().and_then(|o| match o {
            Outcome::Winner(p) => Some(p),
            Outcome::Draw => None,
        });
        if replayed != self.winner {
            return Err(Error::InvalidArgument(format!(
                "recorded winner {:?} does not match replayed winner {:?}",
                self.winner, replayed
            )));
        }
        Ok(game)
    }

    /// Serialises to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::InvalidArgument(e.to_string()))
    }

    /// Parses a record from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::InvalidArgument(e.to_string()))
    }
}
