//! Arena-allocated search tree.
//!
//! Nodes live in a `Vec` and refer to each other by [`NodeId`], so the tree has
//! a single owner and parent links cannot form ownership cycles. A tree is
//! built fresh for every search and dropped when the search returns.

use crate::game::ActionKey;
use crate::mcts::node::{Node, NodeId};

#[derive(Debug)]
pub struct Tree<A> {
    nodes: Vec<Node<A>>,
}

impl<A> Tree<A> {
    /// Create a new tree with an empty root node.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::root()],
        }
    }

    /// # Panics
    /// Panics if the NodeId does not belong to this tree.
    pub fn get(&self, id: NodeId) -> &Node<A> {
        &self.nodes[id.0]
    }

    /// # Panics
    /// Panics if the NodeId does not belong to this tree.
    pub fn get_mut(&mut self, id: NodeId) -> &mut Node<A> {
        &mut self.nodes[id.0]
    }

    pub fn root(&self) -> &Node<A> {
        self.get(NodeId::ROOT)
    }

    /// Child of `parent` reached by `key`, if it exists.
    pub fn child(&self, parent: NodeId, key: &ActionKey) -> Option<NodeId> {
        self.get(parent).children.get(key).copied()
    }

    /// Adds a child under `parent`. An existing child for `key` is kept as is.
    pub fn add_child(&mut self, parent: NodeId, key: ActionKey, action: A, prior: f64) -> NodeId {
        if let Some(existing) = self.child(parent, &key) {
            return existing;
        }
        let depth = self.get(parent).depth + 1;
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new_child(action, parent, depth, prior));
        self.get_mut(parent).children.insert(key, id);
        id
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: the root exists from construction.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Node<A>> {
        self.nodes.iter()
    }
}

impl<A> Default for Tree<A> {
    fn default() -> Self {
        Self::new()
    }
}
