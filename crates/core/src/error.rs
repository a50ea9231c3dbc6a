use thiserror::Error;

/// Errors that can occur while playing or searching a game.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Illegal action: {0}")]
    IllegalAction(usize),

    #[error("Game is already over")]
    GameOver,

    #[error("No legal actions available")]
    NoLegalActions,

    #[error("Invalid policy: {0}")]
    InvalidPolicy(String),

    #[error("Evaluator failed: {0}")]
    Evaluator(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Convenience Result type for game and search operations
pub type Result<T> = std::result::Result<T, Error>;
