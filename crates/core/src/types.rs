//! Probability distributions over actions.
//!
//! Policy: probability distribution summing to 1.0, built from raw
//! evaluator logits via softmax or as a uniform default.

use crate::{Error, Result};

/// A probability distribution over actions.
///
/// Invariant: All values are non-negative and sum to 1.0.
///
/// # Example
/// ```
/// use alphagomoku_core::Policy;
///
/// let policy = Policy::from_logits(&[0.0, 0.0, 0.0, 0.0]).unwrap();
/// assert!((policy[2] - 0.25).abs() < 1e-6);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Policy(Vec<f32>);

impl Policy {
    /// Create a policy from unnormalised logits using a softmax.
    ///
    /// The maximum logit is subtracted before exponentiating so large logits
    /// do not overflow.
    ///
    /// # Errors
    /// Returns error if `logits` is empty or contains a non-finite value.
    pub fn from_logits(logits: &[f32]) -> Result<Self> {
        if logits.is_empty() {
            return Err(Error::InvalidPolicy("policy cannot be empty".to_string()));
        }
        if logits.iter().any(|l| !l.is_finite()) {
            return Err(Error::InvalidPolicy(
                "logits contain non-finite values".to_string(),
            ));
        }

        let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        let exps: Vec<f32> = logits.iter().map(|&l| (l - max).exp()).collect();
        let sum: f32 = exps.iter().sum();
        Ok(Self(exps.into_iter().map(|e| e / sum).collect()))
    }

    /// Create a uniform policy over the given number of actions.
    ///
    /// # Errors
    /// Returns error if num_actions is zero.
    pub fn uniform(num_actions: usize) -> Result<Self> {
        if num_actions == 0 {
            return Err(Error::InvalidPolicy(
                "cannot create uniform policy with 0 actions".to_string(),
            ));
        }

        let prob = 1.0 / num_actions as f32;
        Ok(Self(vec![prob; num_actions]))
    }

    /// Get the number of actions in this policy.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if the policy is empty (should never be true for valid policies).
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over the probabilities.
    pub fn iter(&self) -> impl Iterator<Item = &f32> {
        self.0.iter()
    }
}

impl std::ops::Index<usize> for Policy {
    type Output = f32;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}
