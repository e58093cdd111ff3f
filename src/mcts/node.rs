//! Information-set nodes.
//!
//! A node stands for every concrete state reachable from the root by the same
//! action sequence, so one node is visited under many determinizations. Its
//! children cover the actions that were legal in at least one of them.

use crate::game::ActionKey;
use std::collections::BTreeMap;

/// Smallest prior a child can carry.
pub const MIN_PRIOR: f64 = 1e-8;

/// Index of a node in its [`Tree`](crate::mcts::tree::Tree).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// The root node is always at index 0.
    pub const ROOT: NodeId = NodeId(0);
}

/// A node in the ISMCTS tree.
#[derive(Debug, Clone)]
pub struct Node<A> {
    /// Action that led here (None for the root).
    pub action: Option<A>,

    /// Children keyed by canonical action key.
    pub children: BTreeMap<ActionKey, NodeId>,

    /// Informational back-reference; never used for ownership.
    pub parent: Option<NodeId>,

    /// Plies from the root.
    pub depth: usize,

    /// Number of backpropagations through this node.
    pub visit_count: u32,

    /// Sum of all values backpropagated through this node.
    pub total_value: f64,

    /// `total_value / visit_count`, 0 while unvisited.
    pub mean_value: f64,

    /// Oracle prior, floored at [`MIN_PRIOR`].
    pub prior: f64,

    /// Times this node was on a backpropagated path.
    pub availability_count: u32,
}

impl<A> Node<A> {
    pub fn root() -> Self {
        Self {
            action: None,
            children: BTreeMap::new(),
            parent: None,
            depth: 0,
            visit_count: 0,
            total_value: 0.0,
            mean_value: 0.0,
            prior: 1.0,
            availability_count: 0,
        }
    }

    pub fn new_child(action: A, parent: NodeId, depth: usize, prior: f64) -> Self {
        Self {
            action: Some(action),
            parent: Some(parent),
            depth,
            prior: prior.max(MIN_PRIOR),
            ..Self::root()
        }
    }

    /// Folds one backpropagated value into the statistics.
    pub fn record(&mut self, value: f64) {
        self.visit_count += 1;
        self.total_value += value;
        self.mean_value = self.total_value / f64::from(self.visit_count);
        self.availability_count += 1;
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}
