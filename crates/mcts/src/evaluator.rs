//! Evaluation abstraction for MCTS.
//!
//! The `Evaluator` trait lets a policy network guide expansion:
//! - `UniformEvaluator` gives no logits, so every legal action gets the same prior
//! - A neural network returns policy logits and a hidden state per position

use crate::node::HiddenState;
use alphagomoku_core::{Environment, Error, Result};

/// Evaluator output for one position.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Prediction {
    /// Policy logits, either one per legal action (in ascending action
    /// order) or one per action index of the whole action space.
    /// `None` means uniform priors.
    pub policy_logits: Option<Vec<f32>>,

    /// State to store on the expanded node and pass to its children.
    pub hidden_state: Option<HiddenState>,
}

impl Prediction {
    /// No logits and no hidden state.
    pub fn uniform() -> Self {
        Self::default()
    }

    /// Logits restricted to `legal_actions`, in the same order.
    ///
    /// # Errors
    /// Returns `Error::Evaluator` if the logits match neither the number of
    /// legal actions nor the size of the action space.
    pub fn legal_logits(&self, legal_actions: &[usize], num_actions: usize) -> Result<Option<Vec<f32>>> {
        let Some(logits) = &self.policy_logits else {
            return Ok(None);
        };

        if logits.len() == legal_actions.len() {
            Ok(Some(logits.clone()))
        } else if logits.len() == num_actions {
            Ok(Some(legal_actions.iter().map(|&a| logits[a]).collect()))
        } else {
            Err(Error::Evaluator(format!(
                "got {} logits for {} legal actions out of {}",
                logits.len(),
                legal_actions.len(),
                num_actions
            )))
        }
    }
}

/// Trait for evaluating game positions.
///
/// Called once per expansion, synchronously, from whichever worker thread
/// reached the frontier node. A failure aborts the whole search.
pub trait Evaluator<E: Environment>: Send + Sync {
    /// Predict policy logits for `observation`, given the hidden state of the
    /// parent node (if it has one).
    fn predict(
        &self,
        observation: &E::Observation,
        parent_hidden_state: Option<&HiddenState>,
    ) -> Result<Prediction>;
}

/// The evaluator used when no network is configured.
///
/// Always predicts uniform priors.
#[derive(Clone, Copy, Debug, Default)]
pub struct UniformEvaluator;

impl<E: Environment> Evaluator<E> for UniformEvaluator {
    fn predict(
        &self,
        _observation: &E::Observation,
        _parent_hidden_state: Option<&HiddenState>,
    ) -> Result<Prediction> {
        Ok(Prediction::uniform())
    }
}

impl<E: Environment, V: Evaluator<E>> Evaluator<E> for &V {
    fn predict(
        &self,
        observation: &E::Observation,
        parent_hidden_state: Option<&HiddenState>,
    ) -> Result<Prediction> {
        (**self).predict(observation, parent_hidden_state)
    }
}
