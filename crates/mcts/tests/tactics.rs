//! Tests verifying the engine finds forced wins and plays tic-tac-toe soundly.
//!
//! All searches here use random rollouts with uniform priors, no evaluator.

use alphagomoku_core::{Environment, Outcome};
use alphagomoku_game::{Gomoku, Stone};
use alphagomoku_mcts::{Mcts, SearchConfig};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

fn position(rows: usize, cols: usize, win_length: usize, moves: &[usize]) -> Gomoku {
    let mut game = Gomoku::with_size(rows, cols, win_length).unwrap();
    game.play_all(moves).unwrap();
    game
}

/// Scoring-rule move choice without root noise.
fn scored(simulations: usize, seed: u64) -> SearchConfig {
    SearchConfig {
        exploration_fraction: 0.0,
        seed,
        ..SearchConfig::with_simulations(simulations)
    }
}

fn evaluation(simulations: usize, seed: u64) -> SearchConfig {
    SearchConfig {
        seed,
        ..SearchConfig::for_evaluation(simulations)
    }
}

/// Play one game of tic-tac-toe between the engine and a uniformly random
/// opponent. Returns the outcome.
fn play_against_random(engine_colour: Stone, seed: u64, simulations: usize) -> Outcome<Stone> {
    let mut mcts = Mcts::new(evaluation(simulations, seed)).unwrap();
    let mut rng = ChaCha8Rng::seed_from_u64(seed + 1000);
    let mut game = Gomoku::tic_tac_toe();

    while !game.is_done() {
        let action = if game.current_player() == engine_colour {
            mcts.search(&game).unwrap().best_action
        } else {
            let legal = game.legal_actions();
            legal[rng.gen_range(0..legal.len())]
        };
        game.step(action).unwrap();
    }

    game.outcome().unwrap()
}

/// X X _
/// O O _
/// _ _ _
/// X to move wins at 2.
#[test]
fn test_finds_win_in_one() {
    let game = position(3, 3, 3, &[0, 3, 1, 4]);

    for seed in [1, 7, 42] {
        let mut mcts = Mcts::new(scored(200, seed)).unwrap();
        let result = mcts.search(&game).unwrap();
        assert_eq!(result.best_action, 2, "seed {seed}: {result:?}");
    }

    let mut mcts = Mcts::new(evaluation(200, 3)).unwrap();
    assert_eq!(mcts.search(&game).unwrap().best_action, 2);
}

#[test]
fn test_muzero_rule_finds_win_in_one() {
    let game = position(3, 3, 3, &[0, 3, 1, 4]);
    let config = SearchConfig {
        use_muzero: true,
        ..evaluation(200, 11)
    };

    let mut mcts = Mcts::new(config).unwrap();
    assert_eq!(mcts.search(&game).unwrap().best_action, 2);
}

/// X _ _
/// O O _
/// _ _ X
/// X to move must block at 5.
#[test]
fn test_blocks_opponent_win() {
    let game = position(3, 3, 3, &[0, 3, 8, 4]);

    let mut mcts = Mcts::new(evaluation(300, 5)).unwrap();
    let result = mcts.search(&game).unwrap();
    assert_eq!(result.best_action, 5, "{result:?}");
}

/// Black holds three of the bottom row on a 5x5 board with four in a row to
/// win; the completing cell is the second-to-last action.
#[test]
fn test_finds_win_on_larger_board() {
    let game = position(5, 5, 4, &[20, 0, 21, 1, 22, 7]);
    let winning = game.action_at(4, 3).unwrap();

    let mut mcts = Mcts::new(scored(300, 9)).unwrap();
    assert_eq!(mcts.search(&game).unwrap().best_action, winning);

    let wide = SearchConfig {
        exploration_constant: 4.0,
        ..evaluation(300, 9)
    };
    let mut mcts = Mcts::new(wide).unwrap();
    assert_eq!(mcts.search(&game).unwrap().best_action, winning);
}

#[test]
fn test_winning_child_has_positive_value() {
    let game = position(3, 3, 3, &[0, 3, 1, 4]);
    let mut mcts = Mcts::new(evaluation(200, 2)).unwrap();
    let result = mcts.search(&game).unwrap();

    let (_, value) = result
        .child_values
        .iter()
        .find(|(action, _)| *action == 2)
        .copied()
        .unwrap();
    assert!((value - 1.0).abs() < 1e-6, "winning move value {value}");
    assert!(result.root_value > 0.0);
}

#[test]
fn test_never_loses_as_first_player() {
    for seed in 0..20 {
        let outcome = play_against_random(Stone::Black, seed, 500);
        assert!(
            !outcome.is_won_by(&Stone::White),
            "engine (black) lost with seed {seed}"
        );
    }
}

#[test]
fn test_never_loses_as_second_player() {
    for seed in 0..20 {
        let outcome = play_against_random(Stone::White, seed, 500);
        assert!(
            !outcome.is_won_by(&Stone::Black),
            "engine (white) lost with seed {seed}"
        );
    }
}
