//! Gomoku: k-in-a-row on a rectangular grid.
//!
//! The board size and win length are configurable, so the same type plays
//! 15x15 five-in-a-row as well as 3x3 tic-tac-toe:
//! - Black moves first, players alternate
//! - A run of `win_length` or more stones through the last move wins
//! - A full board with no winner is a draw

use alphagomoku_core::{Environment, Error, Outcome, Result, Step};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default board edge length.
pub const DEFAULT_BOARD_SIZE: usize = 15;

/// Default number of stones in a row needed to win.
pub const DEFAULT_WIN_LENGTH: usize = 5;

/// Reward for the move that wins the game.
pub const WIN_REWARD: f32 = 1.0;

/// Gomoku player.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
pub enum Stone {
    Black,
    White,
}

impl Stone {
    /// Get the opposing player.
    pub fn opposite(self) -> Self {
        match self {
            Stone::Black => Stone::White,
            Stone::White => Stone::Black,
        }
    }
}

impl fmt::Display for Stone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stone::Black => write!(f, "B"),
            Stone::White => write!(f, "W"),
        }
    }
}

/// A Gomoku game in progress.
///
/// Cells are indexed row-major: `action = row * cols + col`.
#[derive(Clone, PartialEq, Eq, Debug, Hash)]
pub struct Gomoku {
    rows: usize,
    cols: usize,
    win_length: usize,
    board: Vec<Option<Stone>>,
    current: Stone,
    outcome: Option<Outcome<Stone>>,
    moves: Vec<usize>,
}

impl Gomoku {
    /// A standard 15x15 five-in-a-row game.
    pub fn new() -> Self {
        Self {
            rows: DEFAULT_BOARD_SIZE,
            cols: DEFAULT_BOARD_SIZE,
            win_length: DEFAULT_WIN_LENGTH,
            board: vec![None; DEFAULT_BOARD_SIZE * DEFAULT_BOARD_SIZE],
            current: Stone::Black,
            outcome: None,
            moves: Vec::new(),
        }
    }

    /// A game on a `rows x cols` board needing `win_length` in a row.
    ///
    /// # Errors
    /// Returns `Error::InvalidArgument` if a dimension is zero or the win
    /// length cannot fit on the board in any direction.
    pub fn with_size(rows: usize, cols: usize, win_length: usize) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(Error::InvalidArgument(format!(
                "board must be non-empty, got {rows}x{cols}"
            )));
        }
        if win_length == 0 || win_length > rows.max(cols) {
            return Err(Error::InvalidArgument(format!(
                "win length {win_length} does not fit a {rows}x{cols} board"
            )));
        }
        Ok(Self {
            rows,
            cols,
            win_length,
            board: vec![None; rows * cols],
            current: Stone::Black,
            outcome: None,
            moves: Vec::new(),
        })
    }

    /// 3x3 three-in-a-row.
    pub fn tic_tac_toe() -> Self {
        Self {
            rows: 3,
            cols: 3,
            win_length: 3,
            board: vec![None; 9],
            current: Stone::Black,
            outcome: None,
            moves: Vec::new(),
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn win_length(&self) -> usize {
        self.win_length
    }

    /// The final outcome, once the game is over.
    pub fn outcome(&self) -> Option<Outcome<Stone>> {
        self.outcome
    }

    /// Actions played so far, in order.
    pub fn moves(&self) -> &[usize] {
        &self.moves
    }

    /// Get the stone at `(row, col)`, if any.
    pub fn get(&self, row: usize, col: usize) -> Option<Stone> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        self.board[row * self.cols + col]
    }

    /// Action index for `(row, col)`.
    pub fn action_at(&self, row: usize, col: usize) -> Option<usize> {
        (row < self.rows && col < self.cols).then_some(row * self.cols + col)
    }

    /// `(row, col)` of an action index.
    pub fn position_of(&self, action: usize) -> (usize, usize) {
        (action / self.cols, action % self.cols)
    }

    /// Places a sequence of stones, alternating players from the current one.
    ///
    /// # Errors
    /// Fails on the first illegal action.
    pub fn play_all(&mut self, actions: &[usize]) -> Result<()> {
        for &action in actions {
            self.step(action)?;
        }
        Ok(())
    }

    /// Length of the longest run of `stone` through `action`.
    fn run_length(&self, action: usize, stone: Stone) -> usize {
        const DIRECTIONS: [(isize, isize); 4] = [(0, 1), (1, 0), (1, 1), (1, -1)];

        let (row, col) = self.position_of(action);
        let mut longest = 0;

        for (dr, dc) in DIRECTIONS {
            let mut count = 1;
            for sign in [1isize, -1] {
                let (mut r, mut c) = (row as isize, col as isize);
                loop {
                    r += sign * dr;
                    c += sign * dc;
                    if r < 0 || c < 0 || r >= self.rows as isize || c >= self.cols as isize {
                        break;
                    }
                    if self.board[r as usize * self.cols + c as usize] != Some(stone) {
                        break;
                    }
                    count += 1;
                }
            }
            longest = longest.max(count);
        }
        longest
    }

    fn is_full(&self) -> bool {
        self.board.iter().all(|c| c.is_some())
    }
}

impl Default for Gomoku {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment for Gomoku {
    type Player = Stone;
    /// Two planes of `rows * cols` cells: black stones, then white stones.
    type Observation = Vec<f32>;

    fn legal_actions(&self) -> Vec<usize> {
        if self.outcome.is_some() {
            return Vec::new();
        }
        self.board
            .iter()
            .enumerate()
            .filter(|(_, cell)| cell.is_none())
            .map(|(i, _)| i)
            .collect()
    }

    fn step(&mut self, action: usize) -> Result<Step<Stone>> {
        if self.outcome.is_some() {
            return Err(Error::GameOver);
        }
        match self.board.get(action) {
            Some(None) => {}
            _ => return Err(Error::IllegalAction(action)),
        }

        let mover = self.current;
        self.board[action] = Some(mover);
        self.moves.push(action);
        self.current = mover.opposite();

        if self.run_length(action, mover) >= self.win_length {
            let outcome = Outcome::Winner(mover);
            self.outcome = Some(outcome);
            Ok(Step::finished(WIN_REWARD, outcome))
        } else if self.is_full() {
            self.outcome = Some(Outcome::Draw);
            Ok(Step::finished(0.0, Outcome::Draw))
        } else {
            Ok(Step::ongoing(0.0))
        }
    }

    fn current_player(&self) -> Stone {
        self.current
    }

    fn is_done(&self) -> bool {
        self.outcome.is_some()
    }

    fn observe(&self) -> Vec<f32> {
        let cells = self.rows * self.cols;
        let mut obs = vec![0.0; 2 * cells];
        for (i, cell) in self.board.iter().enumerate() {
            match cell {
                Some(Stone::Black) => obs[i] = 1.0,
                Some(Stone::White) => obs[i + cells] = 1.0,
                None => {}
            }
        }
        obs
    }

    fn num_actions(&self) -> usize {
        self.rows * self.cols
    }

    fn board_shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }
}

impl fmt::Display for Gomoku {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "   ")?;
        for col in 0..self.cols {
            write!(f, "{col:>3}")?;
        }
        writeln!(f)?;
        for row in 0..self.rows {
            write!(f, "{row:>3}")?;
            for col in 0..self.cols {
                match self.board[row * self.cols + col] {
                    Some(stone) => write!(f, "  {stone}")?,
                    None => write!(f, "  .")?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
