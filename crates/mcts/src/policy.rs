//! Child selection rules.
//!
//! Classical (Csaba) UCB:
//!
//! ```text
//! score(a) = C * P(a) * sqrt(N) / (1 + N(a)) + norm(Q(a))     (Q term only once visited)
//! ```
//!
//! MuZero (appendix B.2 of the MuZero paper) adds a log correction to the
//! exploration weight:
//!
//! ```text
//! score(a) = P(a) * sqrt(N) / (1 + N(a)) * (c1 + ln((N + c2 + 1) / c2)) + norm(Q(a))
//! ```
//!
//! `N` is the parent's visit count, `Q(a)` the child's mean value from the
//! parent mover's perspective, and `norm` the per-search min/max rescaling.

use crate::node::{Node, NodeId};
use crate::statistics::TreeStatistics;
use crate::tree::Tree;
use alphagomoku_core::{Error, Result};

/// Scoring function used to pick a child during selection.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SelectionPolicy {
    /// Csaba's UCB formula.
    Classical { exploration_constant: f32 },

    /// MuZero's log-corrected PUCT.
    MuZero { c1: f32, c2: f32 },
}

impl SelectionPolicy {
    /// Score `child` for selection from `parent`.
    ///
    /// Scores are only comparable among siblings.
    pub fn score<P: PartialEq>(
        &self,
        parent: &Node<P>,
        child: &Node<P>,
        stats: &TreeStatistics,
    ) -> f32 {
        let parent_visits = parent.stats.visit_count as f32;
        let ucb_fraction = parent_visits.sqrt() / (1.0 + child.stats.visit_count as f32);
        let value = child.value_for(parent.to_play.as_ref());

        match *self {
            SelectionPolicy::Classical {
                exploration_constant,
            } => {
                let prior_score = exploration_constant * child.stats.prior * ucb_fraction;
                if child.stats.visit_count == 0 {
                    prior_score
                } else {
                    prior_score + stats.normalise(value)
                }
            }
            SelectionPolicy::MuZero { c1, c2 } => {
                let log_correction = ((parent_visits + c2 + 1.0) / c2).ln();
                let exploration = child.stats.prior * ucb_fraction * (c1 + log_correction);
                exploration + stats.normalise(value)
            }
        }
    }

    /// Highest-scoring child of `node`, lowest action on ties.
    ///
    /// # Errors
    /// Returns `Error::InvalidState` if the node is not expanded.
    pub fn select_child<P: PartialEq>(
        &self,
        tree: &Tree<P>,
        node: NodeId,
        stats: &TreeStatistics,
    ) -> Result<(usize, NodeId)> {
        let parent = tree.get(node);

        let mut best = None;
        let mut best_score = f32::NEG_INFINITY;
        for &(action, child_id) in &parent.children {
            let score = self.score(parent, tree.get(child_id), stats);
            if best.is_none() || score > best_score {
                best_score = score;
                best = Some((action, child_id));
            }
        }

        best.ok_or_else(|| {
            Error::InvalidState(format!(
                "cannot select a child of unexpanded node {}",
                node.index()
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLASSICAL: SelectionPolicy = SelectionPolicy::Classical {
        exploration_constant: 1.0,
    };
    const MUZERO: SelectionPolicy = SelectionPolicy::MuZero {
        c1: 1.25,
        c2: 19652.0,
    };

    fn parent(visits: u32) -> Node<u8> {
        let mut node = Node::root();
        node.to_play = Some(0);
        node.stats.visit_count = visits;
        node
    }

    fn child(prior: f32, visits: u32, value_sum: f32) -> Node<u8> {
        let mut node = Node::new(prior);
        node.to_play = Some(1);
        node.stats.visit_count = visits;
        node.stats.value_sum = value_sum;
        node
    }

    #[test]
    fn test_classical_unvisited_is_prior_score_only() {
        let stats = TreeStatistics::new();
        let score = CLASSICAL.score(&parent(16), &child(0.5, 0, 0.0), &stats);
        assert!((score - 0.5 * 4.0).abs() < 1e-6);
    }

    #[test]
    fn test_classical_visited_adds_normalised_parent_value() {
        let mut stats = TreeStatistics::new();
        stats.update(-1.0);
        stats.update(1.0);

        // Child lost twice from its own perspective, so the parent won twice.
        let score = CLASSICAL.score(&parent(9), &child(0.5, 2, -2.0), &stats);
        let expected = 0.5 * 3.0 / 3.0 + 1.0;
        assert!((score - expected).abs() < 1e-6);
    }

    #[test]
    fn test_muzero_score() {
        let stats = TreeStatistics::new();
        let n = 100.0_f32;
        let score = MUZERO.score(&parent(100), &child(0.2, 4, 0.0), &stats);

        let log_correction = ((n + 19652.0 + 1.0) / 19652.0).ln();
        let expected = 0.2 * (n.sqrt() / 5.0) * (1.25 + log_correction);
        assert!((score - expected).abs() < 1e-5);
    }

    #[test]
    fn test_muzero_includes_value_for_unvisited_child() {
        let mut stats = TreeStatistics::new();
        stats.update(-1.0);
        stats.update(1.0);
        // Unvisited value is 0, normalised to 0.5.
        let score = MUZERO.score(&parent(0), &child(0.3, 0, 0.0), &stats);
        assert!((score - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_select_child_unexpanded_is_error() {
        let tree: Tree<u8> = Tree::new();
        let err = CLASSICAL.select_child(&tree, NodeId::ROOT, &TreeStatistics::new());
        assert!(matches!(err, Err(Error::InvalidState(_))));
    }

    #[test]
    fn test_select_child_ties_pick_lowest_action() {
        let mut tree: Tree<u8> = Tree::new();
        tree.expand(NodeId::ROOT, 0, &[7, 3, 5], None, None, 0.0)
            .unwrap();
        let (action, child) = CLASSICAL
            .select_child(&tree, NodeId::ROOT, &TreeStatistics::new())
            .unwrap();
        assert_eq!(action, 3);
        assert_eq!(tree.root().child(3), Some(child));
    }

    #[test]
    fn test_select_child_prefers_higher_prior() {
        let mut tree: Tree<u8> = Tree::new();
        tree.expand(NodeId::ROOT, 0, &[0, 1, 2], Some(&[0.0, 3.0, 1.0]), None, 0.0)
            .unwrap();
        tree.get_mut(NodeId::ROOT).stats.visit_count = 4;

        for policy in [CLASSICAL, MUZERO] {
            let (action, _) = policy
                .select_child(&tree, NodeId::ROOT, &TreeStatistics::new())
                .unwrap();
            assert_eq!(action, 1);
        }
    }

    #[test]
    fn test_select_child_avoids_losing_move() {
        let mut tree: Tree<u8> = Tree::new();
        tree.expand(NodeId::ROOT, 0, &[0, 1], None, None, 0.0)
            .unwrap();
        tree.get_mut(NodeId::ROOT).stats.visit_count = 4;

        // Action 0 is a win for the opponent (to_play 1 scored +1), action 1 a loss for them.
        for (action, sum) in [(0, 2.0), (1, -2.0)] {
            let id = tree.root().child(action).unwrap();
            let node = tree.get_mut(id);
            node.to_play = Some(1);
            node.stats.visit_count = 2;
            node.stats.value_sum = sum;
        }
        let mut stats = TreeStatistics::new();
        stats.update(-1.0);
        stats.update(1.0);

        let (action, _) = CLASSICAL.select_child(&tree, NodeId::ROOT, &stats).unwrap();
        assert_eq!(action, 1);
    }
}
