//! Monte Carlo Tree Search for two-player board games.
//!
//! This crate provides a generic MCTS engine that can search any game
//! implementing the `alphagomoku_core::Environment` trait.
//!
//! # Features
//!
//! - **Generic**: Works with any `Environment` implementation
//! - **Two selection rules**: Classical UCB or the MuZero log-corrected PUCT
//! - **Evaluator Abstraction**: Optional policy guidance at expansion, with
//!   uniform priors and random rollouts as the fallback
//! - **Dirichlet Noise**: Adds exploration noise at the root node
//! - **Worker Pool**: Rollouts can run on a rayon pool against one shared tree
//! - **Temperature Sampling**: Supports temperature-based action selection
//!
//! # Example
//!
//! ```
//! use alphagomoku_game::Gomoku;
//! use alphagomoku_mcts::{Mcts, SearchConfig};
//!
//! // X X _
//! // O O _
//! // _ _ _
//! let mut game = Gomoku::tic_tac_toe();
//! game.play_all(&[0, 3, 1, 4]).unwrap();
//!
//! let mut mcts = Mcts::new(SearchConfig::for_evaluation(200)).unwrap();
//! let result = mcts.search(&game).unwrap();
//! assert_eq!(result.best_action, 2);
//! println!("Root value: {}", result.root_value);
//! ```

pub mod config;
pub mod evaluator;
mod node;
mod policy;
pub mod search;
mod simulator;
mod state;
mod statistics;
mod tree;

pub use config::{DrawConvention, SearchConfig};
pub use evaluator::{Evaluator, Prediction, UniformEvaluator};
pub use node::{HiddenState, Node, NodeId, NodeStats};
pub use policy::SelectionPolicy;
pub use search::{backpropagate, search, Mcts, SearchResult};
pub use simulator::{SimulationResult, Simulator};
pub use state::{SearchState, SharedSearch};
pub use statistics::TreeStatistics;
pub use tree::Tree;
