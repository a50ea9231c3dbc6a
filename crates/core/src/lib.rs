//! AlphaGomoku Core - game abstractions shared by the search and the games
//!
//! This crate provides the `Environment` trait that any game must implement
//! to be searched, along with the narrow adapter interfaces the search
//! consumes.
//!
//! # Types
//!
//! - [`Environment`] - Stateful, cloneable two-player game
//! - [`Step`] / [`Outcome`] - Result of applying an action
//! - [`Policy`] - Probability distribution over actions (sums to 1.0)
//! - [`MetricsLogger`] - Diagnostics sink, [`NoopLogger`] by default

mod environment;
mod error;
mod logger;
mod types;

pub use environment::{Environment, Outcome, Step};
pub use error::{Error, Result};
pub use logger::{MetricsLogger, NoopLogger, TracingLogger};
pub use types::Policy;
