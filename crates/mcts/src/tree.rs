//! Arena-allocated MCTS tree.
//!
//! Using a Vec<Node> with indices provides better cache locality
//! and simpler ownership compared to Rc<RefCell<Node>>. Every node is owned
//! by the arena; parent/child links are indices, so the structure stays a
//! strict tree and nothing is freed until the whole tree is cleared.

use crate::node::{HiddenState, Node, NodeId};
use alphagomoku_core::{Error, Policy, Result};
use rand::Rng;
use rand_distr::{Dirichlet, Distribution};

/// Arena-allocated MCTS tree.
///
/// Nodes are stored in a contiguous vector and referenced by index.
#[derive(Clone, Debug)]
pub struct Tree<P> {
    nodes: Vec<Node<P>>,
}

impl<P> Tree<P> {
    /// Create a new tree with an empty root node.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::root()],
        }
    }

    /// Get a reference to a node by ID.
    ///
    /// # Panics
    /// Panics if the NodeId does not belong to this tree.
    pub fn get(&self, id: NodeId) -> &Node<P> {
        &self.nodes[id.0]
    }

    /// Get a mutable reference to a node by ID.
    ///
    /// # Panics
    /// Panics if the NodeId does not belong to this tree.
    pub fn get_mut(&mut self, id: NodeId) -> &mut Node<P> {
        &mut self.nodes[id.0]
    }

    /// Add a new node to the tree, returning its ID.
    fn add(&mut self, node: Node<P>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    /// Clear the tree for reuse, keeping only a fresh root.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.nodes.push(Node::root());
    }

    /// Get the number of nodes in the tree.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the tree is empty (never true, the root always exists).
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Get the root node.
    pub fn root(&self) -> &Node<P> {
        self.get(NodeId::ROOT)
    }

    /// Iterate over all nodes in allocation order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node<P>)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }

    /// Expand a node by adding one zero-visit child per legal action.
    ///
    /// Priors are the softmax of `policy_logits` (one logit per legal
    /// action, in the same order) or uniform when no logits are given.
    ///
    /// # Errors
    /// - `Error::InvalidArgument` if `legal_actions` is empty, contains a
    ///   duplicate, or the logits do not match it
    /// - `Error::InvalidState` if the node is already expanded
    pub fn expand(
        &mut self,
        id: NodeId,
        to_play: P,
        legal_actions: &[usize],
        policy_logits: Option<&[f32]>,
        hidden_state: Option<HiddenState>,
        reward: f32,
    ) -> Result<()> {
        if legal_actions.is_empty() {
            return Err(Error::InvalidArgument(
                "cannot expand a node with no legal actions".to_string(),
            ));
        }
        if self.get(id).is_expanded() {
            return Err(Error::InvalidState(format!(
                "node {} is already expanded",
                id.index()
            )));
        }

        let priors = match policy_logits {
            Some(logits) if logits.len() != legal_actions.len() => {
                return Err(Error::InvalidArgument(format!(
                    "{} logits for {} legal actions",
                    logits.len(),
                    legal_actions.len()
                )));
            }
            Some(logits) => Policy::from_logits(logits)?,
            None => Policy::uniform(legal_actions.len())?,
        };

        let mut edges: Vec<(usize, f32)> = legal_actions
            .iter()
            .copied()
            .zip(priors.iter().copied())
            .collect();
        edges.sort_by_key(|(action, _)| *action);
        if edges.windows(2).any(|w| w[0].0 == w[1].0) {
            return Err(Error::InvalidArgument(
                "legal actions contain duplicates".to_string(),
            ));
        }

        let children = edges
            .into_iter()
            .map(|(action, prior)| (action, self.add(Node::new(prior))))
            .collect();

        let node = self.get_mut(id);
        node.to_play = Some(to_play);
        node.hidden_state = hidden_state;
        node.reward = reward;
        node.children = children;
        Ok(())
    }

    /// Mix Dirichlet noise into the priors of a node's children.
    ///
    /// `prior = prior * (1 - fraction) + noise * fraction`, with one
    /// Dirichlet draw over all children. A single child is left unchanged,
    /// since the only one-element Dirichlet sample is 1.
    ///
    /// # Errors
    /// - `Error::InvalidState` if the node has no children yet
    /// - `Error::InvalidArgument` if `alpha` is not a valid concentration
    pub fn add_exploration_noise<R: Rng>(
        &mut self,
        id: NodeId,
        alpha: f32,
        fraction: f32,
        rng: &mut R,
    ) -> Result<()> {
        let children: Vec<NodeId> = self.get(id).children.iter().map(|(_, c)| *c).collect();
        if children.is_empty() {
            return Err(Error::InvalidState(format!(
                "node {} has no children to add noise to",
                id.index()
            )));
        }
        if children.len() < 2 {
            return Ok(());
        }

        // Sampled in f64: small alphas underflow every f32 component to 0.
        let dirichlet = Dirichlet::new(&vec![alpha as f64; children.len()])
            .map_err(|e| Error::InvalidArgument(format!("dirichlet alpha {alpha}: {e}")))?;
        let noise: Vec<f64> = dirichlet.sample(rng);

        for (child_id, n) in children.into_iter().zip(noise) {
            let child = self.get_mut(child_id);
            child.stats.prior = child.stats.prior * (1.0 - fraction) + n as f32 * fraction;
        }
        Ok(())
    }
}

impl<P> Default for Tree<P> {
    fn default() -> Self {
        Self::new()
    }
}
