use crate::Result;
use std::fmt::Debug;
use std::hash::Hash;

/// How a finished game ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Outcome<P> {
    /// The given player won.
    Winner(P),
    /// Nobody won.
    Draw,
}

impl<P: PartialEq> Outcome<P> {
    /// Returns the winner, if any.
    pub fn winner(&self) -> Option<&P> {
        match self {
            Outcome::Winner(p) => Some(p),
            Outcome::Draw => None,
        }
    }

    /// True if `player` won this game.
    pub fn is_won_by(&self, player: &P) -> bool {
        self.winner() == Some(player)
    }
}

/// The result of applying one action.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Step<P> {
    /// Whether the game has ended after this action.
    pub done: bool,

    /// Reward produced by the action.
    pub reward: f32,

    /// Final outcome, set exactly when `done` is true.
    pub outcome: Option<Outcome<P>>,
}

impl<P> Step<P> {
    /// A non-terminal step.
    pub fn ongoing(reward: f32) -> Self {
        Self {
            done: false,
            reward,
            outcome: None,
        }
    }

    /// A terminal step with the given outcome.
    pub fn finished(reward: f32, outcome: Outcome<P>) -> Self {
        Self {
            done: true,
            reward,
            outcome: Some(outcome),
        }
    }
}

/// A turn-based, two-player, zero-sum game as seen by the search.
///
/// Implementations are stateful: `step` mutates the position in place and
/// `Clone` must produce an independent deep copy, since every rollout plays
/// on its own clone.
pub trait Environment: Clone + Send + Sync {
    /// Player identity.
    type Player: Copy + Eq + Hash + Debug + Send + Sync;

    /// Board snapshot handed to an evaluator.
    type Observation;

    /// Legal actions as dense indices in ascending order.
    ///
    /// Empty once the game is over.
    fn legal_actions(&self) -> Vec<usize>;

    /// Applies `action` for the current player.
    ///
    /// # Errors
    /// Returns `Error::GameOver` if the game has already ended and
    /// `Error::IllegalAction` if `action` is not legal here.
    fn step(&mut self, action: usize) -> Result<Step<Self::Player>>;

    /// The player to move.
    fn current_player(&self) -> Self::Player;

    /// True once the game has ended.
    fn is_done(&self) -> bool;

    /// Snapshot of the board for evaluation.
    fn observe(&self) -> Self::Observation;

    /// Size of the dense action space.
    fn num_actions(&self) -> usize;

    /// Grid layout of the action space, `(rows, cols)`.
    fn board_shape(&self) -> (usize, usize) {
        (1, self.num_actions())
    }
}
