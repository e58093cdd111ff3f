//! Root extraction: the chosen action, the visit policy and the value estimate.

use crate::game::ActionKey;
use crate::mcts::node::NodeId;
use crate::mcts::tree::Tree;
use rand::Rng;
use serde::Serialize;
use std::collections::BTreeMap;

/// Below this temperature the most visited action is taken deterministically.
pub const GREEDY_TEMPERATURE: f64 = 0.01;

/// Statistics of one root child.
#[derive(Debug, Clone, Serialize)]
pub struct ChildStat<A> {
    pub action_key: ActionKey,
    pub action: A,
    pub visit_count: u32,
    pub mean_value: f64,
    pub prior: f64,
    /// Share of root visits (0 for actions illegal in the searched state).
    pub probability: f64,
}

/// Counters collected while searching, mostly for logs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SearchStats {
    pub determinizations: usize,
    pub simulations: usize,
    pub nodes: usize,
    /// Deepest path (in plies) reached by a simulation.
    pub max_depth: usize,
    pub terminal_evaluations: usize,
    pub depth_cutoffs: usize,
    pub oracle_calls: usize,
}

/// Result of one search.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResult<A> {
    /// Action to play.
    pub action: A,

    /// Visit distribution over the legal actions of the searched state.
    pub policy: BTreeMap<ActionKey, f64>,

    /// Visit-weighted mean of the root children values (acting player's view).
    pub value: f64,

    /// Root children, most visited first.
    pub child_stats: Vec<ChildStat<A>>,

    pub stats: SearchStats,
}

impl<A> SearchResult<A> {
    pub fn probability(&self, key: &ActionKey) -> f64 {
        self.policy.get(key).copied().unwrap_or(0.0)
    }

    pub fn child(&self, key: &ActionKey) -> Option<&ChildStat<A>> {
        self.child_stats.iter().find(|stat| &stat.action_key == key)
    }
}

/// Visit count of the root child for each legal key (0 when unexplored).
pub fn root_visit_counts<A>(tree: &Tree<A>, legal_keys: &[ActionKey]) -> Vec<u32> {
    legal_keys
        .iter()
        .map(|key| {
            tree.child(NodeId::ROOT, key)
                .map(|id| tree.get(id).visit_count)
                .unwrap_or(0)
        })
        .collect()
}

/// Normalized visit counts over the legal actions; uniform if the root was never visited.
pub fn extract_policy<A>(tree: &Tree<A>, legal_keys: &[ActionKey]) -> BTreeMap<ActionKey, f64> {
    let root_visits = tree.root().visit_count;
    if root_visits == 0 {
        let uniform = 1.0 / legal_keys.len().max(1) as f64;
        return legal_keys.iter().map(|key| (key.clone(), uniform)).collect();
    }

    legal_keys
        .iter()
        .zip(root_visit_counts(tree, legal_keys))
        .map(|(key, visits)| (key.clone(), f64::from(visits) / f64::from(root_visits)))
        .collect()
}

/// `sum(child_visits / root_visits * child_mean)`, 0 if the root was never visited.
pub fn extract_value<A>(tree: &Tree<A>) -> f64 {
    let root = tree.root();
    if root.visit_count == 0 {
        return 0.0;
    }
    let root_visits = f64::from(root.visit_count);
    root.children
        .values()
        .map(|&id| {
            let child = tree.get(id);
            f64::from(child.visit_count) / root_visits * child.mean_value
        })
        .sum()
}

/// Root children sorted by visit count, highest first.
pub fn collect_child_stats<A: Clone>(
    tree: &Tree<A>,
    policy: &BTreeMap<ActionKey, f64>,
) -> Vec<ChildStat<A>> {
    let mut stats: Vec<ChildStat<A>> = tree
        .root()
        .children
        .iter()
        .filter_map(|(key, &id)| {
            let child = tree.get(id);
            child.action.clone().map(|action| ChildStat {
                action_key: key.clone(),
                action,
                visit_count: child.visit_count,
                mean_value: child.mean_value,
                prior: child.prior,
                probability: policy.get(key).copied().unwrap_or(0.0),
            })
        })
        .collect();
    stats.sort_by(|a, b| b.visit_count.cmp(&a.visit_count));
    stats
}

/// Index of the largest count; the first maximum wins ties.
pub fn argmax_visits(visit_counts: &[u32]) -> usize {
    let mut best = 0;
    for (index, &count) in visit_counts.iter().enumerate() {
        if count > visit_counts[best] {
            best = index;
        }
    }
    best
}

/// Samples an index with probability proportional to `max(count, 1)^(1/T)`.
///
/// Weights are computed relative to the largest count so high visit counts
/// and small temperatures cannot overflow.
pub fn sample_by_temperature<R: Rng + ?Sized>(visit_counts: &[u32], temperature: f64, rng: &mut R) -> usize {
    if visit_counts.len() <= 1 {
        return 0;
    }
    if temperature < GREEDY_TEMPERATURE {
        return argmax_visits(visit_counts);
    }

    let inv_temp = 1.0 / temperature;
    let max_log = visit_counts
        .iter()
        .map(|&c| f64::from(c.max(1)).ln())
        .fold(f64::NEG_INFINITY, f64::max);
    let weights: Vec<f64> = visit_counts
        .iter()
        .map(|&c| ((f64::from(c.max(1)).ln() - max_log) * inv_temp).exp())
        .collect();
    let total: f64 = weights.iter().sum();

    let draw: f64 = rng.random::<f64>();
    let mut cumulative = 0.0;
    for (index, weight) in weights.iter().enumerate() {
        cumulative += weight / total;
        if draw < cumulative {
            return index;
        }
    }

    // Rounding left the draw above the last cumulative value
    weights.len() - 1
}
