//! PUCT selection over information-set nodes.
//!
//! Selection only runs at nodes that are fully expanded for the current
//! determinization. Children whose action is illegal in that determinization
//! are skipped, not penalized.

use crate::game::ActionKey;
use crate::mcts::node::NodeId;
use crate::mcts::tree::Tree;
use crate::{IsmctsError, Result};

/// `Q + c * P * sqrt(N_parent) / (1 + N_child)`
pub fn puct_score(
    mean_value: f64,
    prior: f64,
    parent_visits: u32,
    child_visits: u32,
    exploration_weight: f64,
) -> f64 {
    mean_value
        + exploration_weight * prior * f64::from(parent_visits).sqrt() / (1.0 + f64::from(child_visits))
}

/// True when every currently legal action already has a child.
pub fn is_fully_expanded<A>(tree: &Tree<A>, node_id: NodeId, legal_keys: &[ActionKey]) -> bool {
    let children = &tree.get(node_id).children;
    legal_keys.iter().all(|key| children.contains_key(key))
}

/// Picks the legal action with the highest PUCT score.
///
/// Returns the index into `legal_keys` and the chosen child. Ties go to the
/// first action in legal order.
///
/// # Errors
/// `SearchInvariantViolation` when no legal action has a child.
pub fn select_child<A>(
    tree: &Tree<A>,
    node_id: NodeId,
    legal_keys: &[ActionKey],
    exploration_weight: f64,
) -> Result<(usize, NodeId)> {
    let parent_visits = tree.get(node_id).visit_count;
    let mut best: Option<(usize, NodeId)> = None;
    let mut best_score = f64::NEG_INFINITY;

    for (index, key) in legal_keys.iter().enumerate() {
        let Some(child_id) = tree.child(node_id, key) else {
            continue;
        };
        let child = tree.get(child_id);
        let score = puct_score(
            child.mean_value,
            child.prior,
            parent_visits,
            child.visit_count,
            exploration_weight,
        );

        if best.is_none() || score > best_score {
            best_score = score;
            best = Some((index, child_id));
        }
    }

    best.ok_or_else(|| {
        IsmctsError::SearchInvariantViolation(format!(
            "no child among {} legal actions at node {:?} (depth {})",
            legal_keys.len(),
            node_id,
            tree.get(node_id).depth
        ))
    })
}
