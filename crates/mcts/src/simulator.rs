//! A single rollout: selection, expansion, random playout.
//!
//! Each rollout plays on its own clone of the environment. Only the tree
//! (through [`SharedSearch`]) is shared with other rollouts.

use crate::evaluator::Evaluator;
use crate::node::NodeId;
use crate::policy::SelectionPolicy;
use crate::state::SharedSearch;
use alphagomoku_core::{Environment, Error, Outcome, Result, Step};
use rand::Rng;
use tracing::trace;

/// What one rollout produced.
#[derive(Clone, Debug, PartialEq)]
pub struct SimulationResult<P> {
    /// Tree nodes visited, root first. Positions reached by random play are
    /// not part of the tree and not listed.
    pub path: Vec<NodeId>,

    /// Reward of the move that ended the game.
    pub terminal_value: f32,

    /// How the game ended.
    pub outcome: Outcome<P>,
}

/// Runs rollouts against a shared tree.
pub struct Simulator<'a, E: Environment, V> {
    shared: &'a SharedSearch<E::Player>,
    policy: SelectionPolicy,
    evaluator: &'a V,
}

impl<'a, E, V> Simulator<'a, E, V>
where
    E: Environment,
    V: Evaluator<E>,
{
    pub fn new(
        shared: &'a SharedSearch<E::Player>,
        policy: SelectionPolicy,
        evaluator: &'a V,
    ) -> Self {
        Self {
            shared,
            policy,
            evaluator,
        }
    }

    /// Run one rollout from `root_env`, which is left untouched.
    ///
    /// # Errors
    /// Environment and evaluator failures propagate unchanged. An
    /// environment that has no legal actions but does not report the game as
    /// over is an `Error::InvalidState`.
    pub fn run<R: Rng>(&self, root_env: &E, rng: &mut R) -> Result<SimulationResult<E::Player>> {
        let mut env = root_env.clone();

        let (path, mut last_step) = self.select(&mut env)?;
        let frontier = *path.last().unwrap_or(&NodeId::ROOT);
        let reward = last_step.as_ref().map_or(0.0, |s| s.reward);

        if env.is_done() {
            self.mark_terminal(&env, frontier, reward)?;
        } else {
            self.expand(&env, &path, reward)?;
        }

        let mut playout_length = 0;
        while !env.is_done() {
            let legal = env.legal_actions();
            if legal.is_empty() {
                return Err(no_moves_but_running());
            }
            let action = legal[rng.gen_range(0..legal.len())];
            last_step = Some(env.step(action)?);
            playout_length += 1;
        }

        let last = last_step.ok_or_else(|| {
            Error::InvalidState("rollout started from a finished game".to_string())
        })?;
        let outcome = last.outcome.ok_or_else(|| {
            Error::InvalidState("final step reported done without an outcome".to_string())
        })?;

        trace!(
            depth = path.len(),
            playout_length,
            terminal_value = last.reward,
            "rollout finished"
        );

        Ok(SimulationResult {
            path,
            terminal_value: last.reward,
            outcome,
        })
    }

    /// Descend from the root while nodes are expanded, applying each chosen
    /// action to `env`.
    fn select(&self, env: &mut E) -> Result<(Vec<NodeId>, Option<Step<E::Player>>)> {
        let state = self.shared.read()?;
        let mut path = vec![NodeId::ROOT];
        let mut last_step = None;
        let mut current = NodeId::ROOT;

        while state.tree.get(current).is_expanded() {
            let (action, child) = self.policy.select_child(&state.tree, current, &state.stats)?;
            last_step = Some(env.step(action)?);
            path.push(child);
            current = child;
        }

        Ok((path, last_step))
    }

    /// Record who is to move at a finished position. Terminal nodes are
    /// never expanded.
    fn mark_terminal(&self, env: &E, node: NodeId, reward: f32) -> Result<()> {
        let mut state = self.shared.write()?;
        let node = state.tree.get_mut(node);
        node.terminal = true;
        node.reward = reward;
        if node.to_play.is_none() {
            node.to_play = Some(env.current_player());
        }
        Ok(())
    }

    /// Evaluate and expand the frontier node at the end of `path`.
    ///
    /// The evaluator runs without holding any lock. If another rollout
    /// expanded the node in the meantime, this expansion is dropped.
    fn expand(&self, env: &E, path: &[NodeId], reward: f32) -> Result<()> {
        let legal = env.legal_actions();
        if legal.is_empty() {
            return Err(no_moves_but_running());
        }

        let frontier = path[path.len() - 1];
        let parent_hidden_state = match path.len().checked_sub(2) {
            Some(i) => self.shared.read()?.tree.get(path[i]).hidden_state.clone(),
            None => None,
        };

        let prediction = self
            .evaluator
            .predict(&env.observe(), parent_hidden_state.as_ref())?;
        let logits = prediction.legal_logits(&legal, env.num_actions())?;

        let mut state = self.shared.write()?;
        if state.tree.get(frontier).is_expanded() {
            return Ok(());
        }
        state.tree.expand(
            frontier,
            env.current_player(),
            &legal,
            logits.as_deref(),
            prediction.hidden_state,
            reward,
        )
    }
}

fn no_moves_but_running() -> Error {
    Error::InvalidState("environment has no legal actions but the game is not over".to_string())
}
