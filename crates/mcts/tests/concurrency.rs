//! Multi-worker searches against one shared tree.

use alphagomoku_core::{Environment, Error, Result};
use alphagomoku_game::Gomoku;
use alphagomoku_mcts::{Evaluator, HiddenState, Mcts, Prediction, SearchConfig, Tree};
use std::sync::atomic::{AtomicUsize, Ordering};

fn workers(num_workers: usize, simulations: usize, seed: u64) -> SearchConfig {
    SearchConfig {
        num_workers,
        seed,
        exploration_fraction: 0.0,
        ..SearchConfig::with_simulations(simulations)
    }
}

/// Every visit a node receives passes through at most one of its children,
/// and a rollout that stops at the node itself adds to no child.
fn assert_no_lost_updates<P>(tree: &Tree<P>) {
    for (id, node) in tree.iter() {
        let child_visits: u32 = node
            .children
            .iter()
            .map(|(_, c)| tree.get(*c).stats.visit_count)
            .sum();
        assert!(
            node.stats.visit_count >= child_visits,
            "node {} has {} visits but its children have {}",
            id.index(),
            node.stats.visit_count,
            child_visits
        );
    }
}

fn visit_distribution(game: &Gomoku, config: SearchConfig) -> (usize, Vec<f32>) {
    let mut mcts = Mcts::new(config).unwrap();
    let result = mcts.search(game).unwrap();
    (result.best_action, result.policy)
}

#[test]
fn test_stress_counts_every_simulation() {
    let mut game = Gomoku::with_size(5, 5, 4).unwrap();
    game.play_all(&[12]).unwrap();

    for seed in 0..3 {
        let mut mcts = Mcts::new(workers(4, 2000, seed)).unwrap();
        let result = mcts.search(&game).unwrap();

        let tree = mcts.tree();
        assert_eq!(tree.root().stats.visit_count, 2000);
        let child_visits: u32 = result.visit_counts.iter().map(|(_, n)| n).sum();
        assert_eq!(child_visits, 2000);
        assert_no_lost_updates(tree);

        // One expansion per rollout at most, and no node expanded twice.
        assert!(tree.len() <= 1 + 24 + 2000 * 24);
        for (_, node) in tree.iter() {
            let mut actions: Vec<usize> = node.children.iter().map(|(a, _)| *a).collect();
            actions.dedup();
            assert_eq!(actions.len(), node.children.len());
        }
    }
}

#[test]
fn test_worker_count_invariance() {
    let mut game = Gomoku::tic_tac_toe();
    game.play_all(&[0, 3, 1, 4]).unwrap();

    let (single_best, single) = visit_distribution(&game, workers(1, 400, 17));
    let (multi_best, multi) = visit_distribution(&game, workers(4, 400, 17));

    assert_eq!(single_best, 2);
    assert_eq!(multi_best, 2);

    let total_variation: f32 = single
        .iter()
        .zip(&multi)
        .map(|(a, b)| (a - b).abs())
        .sum::<f32>()
        / 2.0;
    assert!(
        total_variation < 0.5,
        "visit distributions diverge: {single:?} vs {multi:?}"
    );
}

#[test]
fn test_multi_worker_matches_free_function_contract() {
    let mut game = Gomoku::tic_tac_toe();
    game.play_all(&[0, 3, 1, 4]).unwrap();

    let action = alphagomoku_mcts::search(&game, workers(4, 400, 5)).unwrap();
    assert!(game.legal_actions().contains(&action));
}

/// Succeeds a fixed number of times, then fails.
struct FlakyEvaluator {
    calls: AtomicUsize,
    fail_after: usize,
}

impl Evaluator<Gomoku> for FlakyEvaluator {
    fn predict(&self, _: &Vec<f32>, _: Option<&HiddenState>) -> Result<Prediction> {
        if self.calls.fetch_add(1, Ordering::SeqCst) >= self.fail_after {
            Err(Error::Evaluator("device lost".to_string()))
        } else {
            Ok(Prediction::uniform())
        }
    }
}

#[test]
fn test_evaluator_failure_aborts_parallel_search() {
    let game = Gomoku::with_size(5, 5, 4).unwrap();
    let evaluator = FlakyEvaluator {
        calls: AtomicUsize::new(0),
        fail_after: 10,
    };

    let mut mcts = Mcts::with_evaluator(workers(4, 500, 1), evaluator).unwrap();
    assert!(matches!(mcts.search(&game), Err(Error::Evaluator(_))));
}

/// Hidden states flow from each expanded node to its children's evaluation.
struct DepthEvaluator;

impl Evaluator<Gomoku> for DepthEvaluator {
    fn predict(&self, _: &Vec<f32>, parent: Option<&HiddenState>) -> Result<Prediction> {
        let depth = parent.map_or(0.0, |h| h[0]);
        Ok(Prediction {
            policy_logits: None,
            hidden_state: Some(vec![depth + 1.0]),
        })
    }
}

#[test]
fn test_hidden_states_follow_tree_depth() {
    let game = Gomoku::with_size(4, 4, 3).unwrap();
    let mut mcts = Mcts::with_evaluator(workers(4, 300, 8), DepthEvaluator).unwrap();
    mcts.search(&game).unwrap();

    // The root is expanded without the evaluator, so depth-1 nodes see no
    // parent state and record 1.
    let tree = mcts.tree();
    for &(_, child) in &tree.root().children {
        let child = tree.get(child);
        if let Some(state) = &child.hidden_state {
            assert_eq!(state, &vec![1.0]);
            for &(_, grandchild) in &child.children {
                if let Some(state) = &tree.get(grandchild).hidden_state {
                    assert_eq!(state, &vec![2.0]);
                }
            }
        }
    }
}
