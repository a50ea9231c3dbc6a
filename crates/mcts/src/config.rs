//! MCTS configuration parameters.
//!
//! These parameters control the behavior of the Monte Carlo Tree Search
//! algorithm. A config is immutable for the duration of a search.

use crate::policy::SelectionPolicy;
use alphagomoku_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// How a drawn rollout is credited to the nodes on its path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrawConvention {
    /// Draws add nothing to any node's value sum; visits still count.
    #[default]
    Neutral,

    /// Every node on a drawn path has the terminal value subtracted,
    /// matching a "does `to_play` equal the winner" test that is always
    /// false when there is no winner.
    Subtract,
}

/// MCTS configuration parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Number of simulations per search.
    pub num_simulations: usize,

    /// Exploration constant `C` of the classical UCB formula.
    pub exploration_constant: f32,

    /// Dirichlet noise alpha (for root exploration).
    /// Higher values = more uniform noise, lower = more concentrated.
    pub dirichlet_alpha: f32,

    /// Fraction of prior replaced with Dirichlet noise at root.
    /// 0 = no exploration noise, 1 = pure noise.
    pub exploration_fraction: f32,

    /// Pick the most visited root child instead of the best-scoring one.
    pub deterministic: bool,

    /// Use the MuZero log-corrected formula instead of the classical one.
    pub use_muzero: bool,

    /// MuZero exploration constant `c1`.
    pub muzero_c1: f32,

    /// MuZero log-correction base `c2`.
    pub muzero_c2: f32,

    /// Number of worker threads running rollouts. 1 runs sequentially.
    pub num_workers: usize,

    /// Seed for the search RNG (noise and rollouts).
    pub seed: u64,

    /// Credit assignment for drawn rollouts.
    pub draw_convention: DrawConvention,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            num_simulations: 80,
            exploration_constant: 1.0,
            dirichlet_alpha: 0.03,
            exploration_fraction: 0.25,
            deterministic: false,
            use_muzero: false,
            muzero_c1: 1.25,
            muzero_c2: 19652.0,
            num_workers: 1,
            seed: 0,
            draw_convention: DrawConvention::Neutral,
        }
    }
}

impl SearchConfig {
    /// Create a new config with the specified number of simulations.
    pub fn with_simulations(num_simulations: usize) -> Self {
        Self {
            num_simulations,
            ..Default::default()
        }
    }

    /// Create a config for evaluation: no root noise, most visited move.
    pub fn for_evaluation(num_simulations: usize) -> Self {
        Self {
            num_simulations,
            exploration_fraction: 0.0,
            deterministic: true,
            ..Default::default()
        }
    }

    /// True if Dirichlet noise is injected at the root.
    pub fn uses_root_noise(&self) -> bool {
        self.exploration_fraction > 0.0
    }

    /// The selection rule this config asks for.
    pub fn selection_policy(&self) -> SelectionPolicy {
        if self.use_muzero {
            SelectionPolicy::MuZero {
                c1: self.muzero_c1,
                c2: self.muzero_c2,
            }
        } else {
            SelectionPolicy::Classical {
                exploration_constant: self.exploration_constant,
            }
        }
    }

    /// Check the config before searching.
    ///
    /// # Errors
    /// Returns `Error::InvalidArgument` for a zero simulation budget and
    /// `Error::Config` for out-of-range parameters.
    pub fn validate(&self) -> Result<()> {
        if self.num_simulations == 0 {
            return Err(Error::InvalidArgument(
                "num_simulations must be at least 1".to_string(),
            ));
        }
        if self.num_workers == 0 {
            return Err(Error::Config("num_workers must be at least 1".to_string()));
        }
        if !(0.0..=1.0).contains(&self.exploration_fraction) {
            return Err(Error::Config(format!(
                "exploration_fraction {} is outside [0, 1]",
                self.exploration_fraction
            )));
        }
        if self.uses_root_noise() && !(self.dirichlet_alpha > 0.0) {
            return Err(Error::Config(format!(
                "dirichlet_alpha must be positive, got {}",
                self.dirichlet_alpha
            )));
        }
        if self.use_muzero {
            if !(self.muzero_c1 > 0.0) || !(self.muzero_c2 > 0.0) {
                return Err(Error::Config(format!(
                    "MuZero constants must be positive, got c1={} c2={}",
                    self.muzero_c1, self.muzero_c2
                )));
            }
        } else if !(self.exploration_constant > 0.0) {
            return Err(Error::Config(format!(
                "exploration_constant must be positive, got {}",
                self.exploration_constant
            )));
        }
        Ok(())
    }
}
