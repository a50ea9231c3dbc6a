//! Move choosers that can sit at the board in a match.

use alphagomoku_core::{Environment, Error, Result};
use alphagomoku_game::Gomoku;
use alphagomoku_mcts::{Mcts, SearchConfig};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Anything that picks a move for the side to play.
pub trait Player {
    fn name(&self) -> &str;

    /// Choose a legal move in `game`, which must not be finished.
    fn choose(&mut self, game: &Gomoku) -> Result<usize>;
}

/// Plays the move found by a tree search.
pub struct MctsPlayer {
    mcts: Mcts<Gomoku>,
    rng: ChaCha8Rng,
    temperature: f32,
    temperature_drop: usize,
}

impl MctsPlayer {
    /// Sample moves at `temperature` for the first `temperature_drop` moves
    /// of the game, then play greedily.
    pub fn new(config: SearchConfig, temperature: f32, temperature_drop: usize) -> Result<Self> {
        let rng = ChaCha8Rng::seed_from_u64(config.seed.wrapping_add(1));
        Ok(Self {
            mcts: Mcts::new(config)?,
            rng,
            temperature,
            temperature_drop,
        })
    }
}

impl Player for MctsPlayer {
    fn name(&self) -> &str {
        "mcts"
    }

    fn choose(&mut self, game: &Gomoku) -> Result<usize> {
        let result = self.mcts.search(game)?;
        let temperature = if game.moves().len() < self.temperature_drop {
            self.temperature
        } else {
            0.0
        };
        Ok(result.select_action(temperature, &mut self.rng))
    }
}

/// Plays a uniformly random legal move.
pub struct RandomPlayer {
    rng: ChaCha8Rng,
}

impl RandomPlayer {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl Player for RandomPlayer {
    fn name(&self) -> &str {
        "random"
    }

    fn choose(&mut self, game: &Gomoku) -> Result<usize> {
        let legal = game.legal_actions();
        if legal.is_empty() {
            return Err(Error::NoLegalActions);
        }
        Ok(legal[self.rng.gen_range(0..legal.len())])
    }
}
