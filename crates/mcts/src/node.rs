//! MCTS node types for tree storage.
//!
//! Uses arena allocation with indices for cache locality and simpler memory management.

/// Opaque evaluator state carried from a node to its children's evaluation.
pub type HiddenState = Vec<f32>;

/// Index into the node arena.
///
/// This is a lightweight handle that references a node in the tree.
/// Using indices instead of pointers avoids Rc/RefCell overhead.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// The root node is always at index 0.
    pub const ROOT: NodeId = NodeId(0);

    /// Position of the node in the arena.
    pub fn index(self) -> usize {
        self.0
    }
}

/// Statistics for a single MCTS node.
#[derive(Clone, Debug)]
pub struct NodeStats {
    /// Number of times this node was visited during search.
    pub visit_count: u32,

    /// Sum of backpropagated values, from the perspective of `to_play`.
    pub value_sum: f32,

    /// Prior probability of choosing this node from its parent.
    pub prior: f32,
}

impl NodeStats {
    /// Create new stats with the given prior probability.
    pub fn new(prior: f32) -> Self {
        Self {
            visit_count: 0,
            value_sum: 0.0,
            prior,
        }
    }

    /// Mean backpropagated value.
    ///
    /// Returns 0.0 if the node has never been visited.
    pub fn value(&self) -> f32 {
        if self.visit_count == 0 {
            0.0
        } else {
            self.value_sum / self.visit_count as f32
        }
    }

    /// Count one visit worth `contribution`.
    pub fn record(&mut self, contribution: f32) {
        self.visit_count += 1;
        self.value_sum += contribution;
    }
}

/// A node in the MCTS tree.
///
/// Each node represents a game position reached by the action stored in its
/// parent's child list.
#[derive(Clone, Debug)]
pub struct Node<P> {
    /// Node statistics (visits, value, prior).
    pub stats: NodeStats,

    /// Player to move at this position. Unset until the node is expanded or
    /// found to be terminal.
    pub to_play: Option<P>,

    /// Children as `(action, node_id)` pairs in ascending action order.
    pub children: Vec<(usize, NodeId)>,

    /// Evaluator state for this position.
    pub hidden_state: Option<HiddenState>,

    /// Reward of the action that led here.
    pub reward: f32,

    /// Whether this node represents a finished game.
    pub terminal: bool,
}

impl<P> Node<P> {
    /// Create a new unexpanded node.
    pub fn new(prior: f32) -> Self {
        Self {
            stats: NodeStats::new(prior),
            to_play: None,
            children: Vec::new(),
            hidden_state: None,
            reward: 0.0,
            terminal: false,
        }
    }

    /// Create the root node.
    pub fn root() -> Self {
        Self::new(1.0)
    }

    /// Mean value from the perspective of `to_play`.
    pub fn value(&self) -> f32 {
        self.stats.value()
    }

    /// A node is expanded once it has children.
    pub fn is_expanded(&self) -> bool {
        !self.children.is_empty()
    }

    /// Child reached by `action`, if present.
    pub fn child(&self, action: usize) -> Option<NodeId> {
        self.children
            .binary_search_by_key(&action, |(a, _)| *a)
            .ok()
            .map(|i| self.children[i].1)
    }
}

impl<P: PartialEq> Node<P> {
    /// This node's value as seen by a parent whose mover is `parent_to_play`.
    ///
    /// Values are stored from the node's own mover's perspective, so they
    /// flip sign whenever the mover changes.
    pub fn value_for(&self, parent_to_play: Option<&P>) -> f32 {
        match (parent_to_play, self.to_play.as_ref()) {
            (Some(parent), Some(own)) if parent == own => self.value(),
            _ => -self.value(),
        }
    }
}
