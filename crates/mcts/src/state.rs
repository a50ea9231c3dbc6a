//! Tree and statistics shared by concurrent rollouts.

use crate::statistics::TreeStatistics;
use crate::tree::Tree;
use alphagomoku_core::{Error, Result};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Everything a rollout reads or writes that outlives the rollout.
#[derive(Clone, Debug, Default)]
pub struct SearchState<P> {
    pub tree: Tree<P>,
    pub stats: TreeStatistics,
}

/// A [`SearchState`] behind a reader/writer lock.
///
/// Selection holds the read lock while descending; expansion and
/// backpropagation take the write lock, so every read-modify-write on a node
/// or on the statistics is atomic with respect to other rollouts.
#[derive(Debug)]
pub struct SharedSearch<P> {
    inner: RwLock<SearchState<P>>,
}

impl<P> SharedSearch<P> {
    /// Wrap `tree` with fresh statistics.
    pub fn new(tree: Tree<P>) -> Self {
        Self {
            inner: RwLock::new(SearchState {
                tree,
                stats: TreeStatistics::new(),
            }),
        }
    }

    pub fn read(&self) -> Result<RwLockReadGuard<'_, SearchState<P>>> {
        self.inner.read().map_err(|_| poisoned())
    }

    pub fn write(&self) -> Result<RwLockWriteGuard<'_, SearchState<P>>> {
        self.inner.write().map_err(|_| poisoned())
    }

    pub fn into_inner(self) -> Result<SearchState<P>> {
        self.inner.into_inner().map_err(|_| poisoned())
    }
}

fn poisoned() -> Error {
    Error::InvalidState("search tree lock poisoned by a panicking rollout".to_string())
}
