//! Property-based tests for the search engine.
//!
//! These check the invariants every search result must satisfy:
//! - Policy sums to 1.0 (±1e-5) and is zero off the legal actions
//! - Root value lies in [-1, 1]
//! - Root visits equal the number of simulations
//! - Same seed, same result

use alphagomoku_core::Environment;
use alphagomoku_game::Gomoku;
use alphagomoku_mcts::{Mcts, SearchConfig};
use proptest::prelude::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Tolerance for policy sum validation
const POLICY_SUM_TOLERANCE: f32 = 1e-5;

// =============================================================================
// Strategies for generating test inputs
// =============================================================================

/// Generate a random number of simulations (10-150 for fast tests)
fn arb_simulations() -> impl Strategy<Value = usize> {
    10usize..150
}

/// Generate a random, unfinished tic-tac-toe position by making random moves
fn arb_position() -> impl Strategy<Value = Gomoku> {
    (0usize..8, any::<u64>()).prop_map(|(num_moves, seed)| {
        let mut game = Gomoku::tic_tac_toe();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        for _ in 0..num_moves {
            let legal = game.legal_actions();
            let mut next = game.clone();
            next.step(legal[rng.gen_range(0..legal.len())]).unwrap();
            if next.is_done() {
                break;
            }
            game = next;
        }

        game
    })
}

fn arb_config() -> impl Strategy<Value = SearchConfig> {
    (arb_simulations(), any::<u64>(), any::<bool>(), any::<bool>()).prop_map(
        |(simulations, seed, deterministic, use_muzero)| SearchConfig {
            seed,
            deterministic,
            use_muzero,
            ..SearchConfig::with_simulations(simulations)
        },
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_policy_is_distribution_over_legal_actions(
        config in arb_config(),
        game in arb_position(),
    ) {
        let mut mcts = Mcts::new(config).unwrap();
        let result = mcts.search(&game).unwrap();
        let legal = game.legal_actions();

        let policy_sum: f32 = result.policy.iter().sum();
        prop_assert!(
            (policy_sum - 1.0).abs() < POLICY_SUM_TOLERANCE,
            "Policy sum {} is not 1.0",
            policy_sum
        );
        prop_assert_eq!(result.policy.len(), game.num_actions());
        for (action, &p) in result.policy.iter().enumerate() {
            prop_assert!(p >= 0.0);
            if !legal.contains(&action) {
                prop_assert_eq!(p, 0.0, "illegal action {} has mass", action);
            }
        }
        prop_assert!(legal.contains(&result.best_action));
    }

    #[test]
    fn prop_visits_match_simulations(
        config in arb_config(),
        game in arb_position(),
    ) {
        let simulations = config.num_simulations;
        let mut mcts = Mcts::new(config).unwrap();
        let result = mcts.search(&game).unwrap();

        let child_visits: u32 = result.visit_counts.iter().map(|(_, n)| n).sum();
        prop_assert_eq!(child_visits as usize, simulations);
        prop_assert_eq!(mcts.tree().root().stats.visit_count as usize, simulations);
        prop_assert!((-1.0..=1.0).contains(&result.root_value));
        for (_, value) in &result.child_values {
            prop_assert!((-1.0..=1.0).contains(value));
        }
    }

    #[test]
    fn prop_deterministic_under_seed(
        config in arb_config(),
        game in arb_position(),
    ) {
        let mut first = Mcts::new(config.clone()).unwrap();
        let mut second = Mcts::new(config).unwrap();

        prop_assert_eq!(first.search(&game).unwrap(), second.search(&game).unwrap());
    }

    #[test]
    fn prop_deterministic_mode_picks_most_visited(
        simulations in arb_simulations(),
        seed in any::<u64>(),
        game in arb_position(),
    ) {
        let config = SearchConfig {
            seed,
            ..SearchConfig::for_evaluation(simulations)
        };
        let mut mcts = Mcts::new(config).unwrap();
        let result = mcts.search(&game).unwrap();

        let max_visits = result.visit_counts.iter().map(|(_, n)| *n).max().unwrap();
        let best_visits = result
            .visit_counts
            .iter()
            .find(|(a, _)| *a == result.best_action)
            .map(|(_, n)| *n)
            .unwrap();
        prop_assert_eq!(best_visits, max_visits);
    }
}
