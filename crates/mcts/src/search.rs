//! Monte Carlo Tree Search driver.
//!
//! One call to [`Mcts::search`] goes through
//! `INIT -> (NOISE) -> SIMULATING x N -> AGGREGATING -> DONE`:
//!
//! 1. A fresh root is expanded eagerly with uniform priors over the legal
//!    actions, without consulting the evaluator.
//! 2. Dirichlet noise is mixed into the root priors if configured.
//! 3. `num_simulations` rollouts run, sequentially or on a rayon pool, each
//!    followed by backpropagation under the tree's write lock.
//! 4. The move is the best-scoring root child, or the most visited one in
//!    deterministic mode.
//!
//! Any rollout error aborts the whole search.

use crate::{
    config::{DrawConvention, SearchConfig},
    evaluator::{Evaluator, UniformEvaluator},
    node::NodeId,
    simulator::{SimulationResult, Simulator},
    state::{SearchState, SharedSearch},
    tree::Tree,
};
use alphagomoku_core::{Environment, Error, MetricsLogger, NoopLogger, Outcome, Result};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use std::collections::BTreeMap;
use tracing::debug;

/// Result of an MCTS search.
#[derive(Clone, Debug, PartialEq)]
pub struct SearchResult {
    /// The move chosen by the search.
    /// For temperature-based selection, use `select_action()` instead.
    pub best_action: usize,

    /// Visit count of each root child, by ascending action.
    pub visit_counts: Vec<(usize, u32)>,

    /// Mean value of each root child from the root mover's perspective.
    pub child_values: Vec<(usize, f32)>,

    /// Normalised visit counts over the whole action space.
    /// Length equals `env.num_actions()`, zero for illegal actions.
    pub policy: Vec<f32>,

    /// Mean value of the root from the perspective of the player to move.
    pub root_value: f32,

    /// Number of rollouts run.
    pub simulations: usize,

    /// Number of nodes in the tree after the search.
    pub tree_size: usize,
}

impl SearchResult {
    /// Select an action using temperature-based sampling.
    ///
    /// - temperature = 0: always return best action (greedy)
    /// - temperature = 1: sample proportional to visit counts
    /// - temperature > 1: more uniform distribution
    /// - temperature < 1: more peaked distribution
    ///
    /// Formula: P(a) ∝ N(a)^(1/τ) where τ is temperature
    pub fn select_action<R: Rng>(&self, temperature: f32, rng: &mut R) -> usize {
        if temperature <= 0.0 || self.visit_counts.len() <= 1 {
            return self.best_action;
        }

        let inv_temp = 1.0 / temperature as f64;
        let adjusted: Vec<f64> = self
            .visit_counts
            .iter()
            .map(|(_, count)| (*count as f64).powf(inv_temp))
            .collect();

        let sum: f64 = adjusted.iter().sum();
        if sum == 0.0 || !sum.is_finite() {
            return self.best_action;
        }

        let threshold: f64 = rng.gen::<f64>() * sum;
        let mut cumulative = 0.0;
        for (i, &weight) in adjusted.iter().enumerate() {
            cumulative += weight;
            if cumulative >= threshold {
                return self.visit_counts[i].0;
            }
        }

        self.best_action
    }

    /// Root child values laid out as a `rows x cols` grid, row-major by
    /// action index. Cells without a child are 0.
    pub fn value_grid(&self, rows: usize, cols: usize) -> Vec<Vec<f32>> {
        let mut grid = vec![vec![0.0; cols]; rows];
        for &(action, value) in &self.child_values {
            if cols > 0 && action / cols < rows {
                grid[action / cols][action % cols] = value;
            }
        }
        grid
    }
}

/// Monte Carlo Tree Search engine.
///
/// Generic over:
/// - `E`: the environment being searched
/// - `V`: the evaluator guiding expansion (uniform priors by default)
pub struct Mcts<E: Environment, V = UniformEvaluator> {
    config: SearchConfig,
    evaluator: V,
    logger: Box<dyn MetricsLogger>,
    rng: ChaCha8Rng,
    pool: Option<rayon::ThreadPool>,
    tree: Tree<E::Player>,
}

impl<E: Environment> Mcts<E, UniformEvaluator> {
    /// Create an engine without an evaluator: uniform priors everywhere.
    ///
    /// # Errors
    /// Fails if the config does not validate or the worker pool cannot be
    /// built.
    pub fn new(config: SearchConfig) -> Result<Self> {
        Self::with_evaluator(config, UniformEvaluator)
    }
}

impl<E, V> Mcts<E, V>
where
    E: Environment,
    V: Evaluator<E>,
{
    /// Create an engine whose expansions are guided by `evaluator`.
    ///
    /// # Errors
    /// Fails if the config does not validate or the worker pool cannot be
    /// built.
    pub fn with_evaluator(config: SearchConfig, evaluator: V) -> Result<Self> {
        config.validate()?;

        let pool = if config.num_workers > 1 {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(config.num_workers)
                .build()
                .map_err(|e| Error::Config(format!("failed to build worker pool: {e}")))?;
            Some(pool)
        } else {
            None
        };

        Ok(Self {
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            config,
            evaluator,
            logger: Box::new(NoopLogger),
            pool,
            tree: Tree::new(),
        })
    }

    /// Send per-search metrics to `logger`.
    pub fn with_logger(mut self, logger: impl MetricsLogger + 'static) -> Self {
        self.logger = Box::new(logger);
        self
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Tree built by the last search. Replaced when the next search starts.
    pub fn tree(&self) -> &Tree<E::Player> {
        &self.tree
    }

    /// Run MCTS from `env`, returning the chosen move and root statistics.
    ///
    /// `env` itself is never modified; every rollout plays on a clone.
    ///
    /// # Errors
    /// - `Error::NoLegalActions` if the game at `env` is over
    /// - any error raised by the environment or the evaluator during a
    ///   rollout
    pub fn search(&mut self, env: &E) -> Result<SearchResult> {
        let legal = env.legal_actions();
        if env.is_done() || legal.is_empty() {
            return Err(Error::NoLegalActions);
        }

        let mut tree = std::mem::take(&mut self.tree);
        tree.clear();
        tree.expand(NodeId::ROOT, env.current_player(), &legal, None, None, 0.0)?;
        if self.config.uses_root_noise() {
            tree.add_exploration_noise(
                NodeId::ROOT,
                self.config.dirichlet_alpha,
                self.config.exploration_fraction,
                &mut self.rng,
            )?;
        }

        let shared = SharedSearch::new(tree);
        let seeds: Vec<u64> = (0..self.config.num_simulations)
            .map(|_| self.rng.gen())
            .collect();
        self.simulate_all(env, &shared, &seeds)?;

        let state = shared.into_inner()?;
        let result = self.extract_result(env, &state)?;
        self.tree = state.tree;

        self.log_result(env, &result);
        Ok(result)
    }

    /// Run one rollout per seed and backpropagate each one.
    fn simulate_all(
        &self,
        env: &E,
        shared: &SharedSearch<E::Player>,
        seeds: &[u64],
    ) -> Result<()> {
        let simulator: Simulator<'_, E, V> =
            Simulator::new(shared, self.config.selection_policy(), &self.evaluator);
        let convention = self.config.draw_convention;

        let run_one = |seed: u64| -> Result<()> {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let result = simulator.run(env, &mut rng)?;
            let mut state = shared.write()?;
            backpropagate(&mut state, &result, convention);
            Ok(())
        };

        match &self.pool {
            Some(pool) => pool.install(|| seeds.par_iter().try_for_each(|&seed| run_one(seed))),
            None => seeds.iter().try_for_each(|&seed| run_one(seed)),
        }
    }

    fn extract_result(&self, env: &E, state: &SearchState<E::Player>) -> Result<SearchResult> {
        let tree = &state.tree;
        let root = tree.root();

        let visit_counts: Vec<(usize, u32)> = root
            .children
            .iter()
            .map(|&(action, id)| (action, tree.get(id).stats.visit_count))
            .collect();
        let child_values: Vec<(usize, f32)> = root
            .children
            .iter()
            .map(|&(action, id)| (action, tree.get(id).value_for(root.to_play.as_ref())))
            .collect();

        let best_action = if self.config.deterministic {
            most_visited(&visit_counts).ok_or(Error::NoLegalActions)?
        } else {
            self.config
                .selection_policy()
                .select_child(tree, NodeId::ROOT, &state.stats)?
                .0
        };

        let total_visits: u32 = visit_counts.iter().map(|(_, c)| *c).sum();
        let mut policy = vec![0.0; env.num_actions()];
        if total_visits > 0 {
            for &(action, count) in &visit_counts {
                if let Some(p) = policy.get_mut(action) {
                    *p = count as f32 / total_visits as f32;
                }
            }
        }

        Ok(SearchResult {
            best_action,
            visit_counts,
            child_values,
            policy,
            root_value: root.value(),
            simulations: self.config.num_simulations,
            tree_size: tree.len(),
        })
    }

    fn log_result(&self, env: &E, result: &SearchResult) {
        let root_visits = self.tree.root().stats.visit_count;

        let metrics = BTreeMap::from([
            ("simulations".to_string(), result.simulations as f64),
            ("tree_size".to_string(), result.tree_size as f64),
            ("root_value".to_string(), result.root_value as f64),
            ("root_visits".to_string(), root_visits as f64),
        ]);
        self.logger.log(&metrics);

        let (rows, cols) = env.board_shape();
        self.logger
            .log_array("child_values", &result.value_grid(rows, cols));

        debug!(
            best_action = result.best_action,
            root_value = result.root_value,
            root_visits,
            tree_size = result.tree_size,
            "search finished"
        );
    }
}

/// Most visited action, lowest action on ties.
fn most_visited(visit_counts: &[(usize, u32)]) -> Option<usize> {
    let mut best: Option<(usize, u32)> = None;
    for &(action, count) in visit_counts {
        if best.map_or(true, |(_, c)| count > c) {
            best = Some((action, count));
        }
    }
    best.map(|(action, _)| action)
}

/// Credit one rollout to every node on its path.
///
/// A node gains `terminal_value` if its mover won and loses it otherwise.
/// Draws follow `convention`. Afterwards the statistics see every updated
/// non-root node's value as its parent would score it.
pub fn backpropagate<P: Copy + PartialEq>(
    state: &mut SearchState<P>,
    result: &SimulationResult<P>,
    convention: DrawConvention,
) {
    let value = result.terminal_value;

    for &id in &result.path {
        let node = state.tree.get_mut(id);
        let contribution = match (&result.outcome, convention) {
            (Outcome::Winner(winner), _) if node.to_play.as_ref() == Some(winner) => value,
            (Outcome::Winner(_), _) => -value,
            (Outcome::Draw, DrawConvention::Neutral) => 0.0,
            (Outcome::Draw, DrawConvention::Subtract) => -value,
        };
        node.stats.record(contribution);
    }

    for pair in result.path.windows(2) {
        let parent_to_play = state.tree.get(pair[0]).to_play;
        let scored = state.tree.get(pair[1]).value_for(parent_to_play.as_ref());
        state.stats.update(scored);
    }
}

/// Search `env` once with a fresh engine and return the chosen move.
///
/// # Errors
/// See [`Mcts::new`] and [`Mcts::search`].
pub fn search<E: Environment>(env: &E, config: SearchConfig) -> Result<usize> {
    let mut mcts: Mcts<E> = Mcts::new(config)?;
    Ok(mcts.search(env)?.best_action)
}
