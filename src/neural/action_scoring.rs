//! Action-scoring oracles.
//!
//! Instead of a fixed-size policy head, an action-scoring network rates each
//! `(state, action)` pair and the policy is the softmax of those scores over the
//! legal actions. The legal actions arrive through `set_context`, which the
//! engine calls right before every prediction.

use crate::game::{ActionKey, Game};
use crate::neural::policy_value_net::{PolicyValueOracle, Prediction};
use crate::{IsmctsError, Result};
use std::collections::HashMap;

/// Scores legal actions and estimates the value of a state.
pub trait ActionScorer {
    /// One raw score per entry of `action_features`, in the same order.
    /// Non-finite scores mask the action out of the policy.
    fn score_actions(&mut self, state_features: &[f32], action_features: &[Vec<f32>]) -> Result<Vec<f32>>;

    /// Value estimate in `[-1, 1]`.
    fn value(&mut self, state_features: &[f32]) -> Result<f32>;
}

/// Adapts an [`ActionScorer`] to the [`PolicyValueOracle`] interface.
pub struct ScoringOracle<'g, G: Game, S> {
    game: &'g G,
    scorer: S,
    context: Vec<(ActionKey, Vec<f32>)>,
}

impl<'g, G: Game, S: ActionScorer> ScoringOracle<'g, G, S> {
    pub fn new(game: &'g G, scorer: S) -> Self {
        Self {
            game,
            scorer,
            context: Vec::new(),
        }
    }

    pub fn into_scorer(self) -> S {
        self.scorer
    }

    fn score(&mut self, features: &[f32]) -> Result<Prediction> {
        let action_features: Vec<Vec<f32>> = self.context.iter().map(|(_, f)| f.clone()).collect();
        let scores = self.scorer.score_actions(features, &action_features)?;
        if scores.len() != self.context.len() {
            return Err(IsmctsError::Oracle(format!(
                "scorer returned {} scores for {} legal actions",
                scores.len(),
                self.context.len()
            )));
        }

        let policy: HashMap<ActionKey, f64> = self
            .context
            .iter()
            .map(|(key, _)| key.clone())
            .zip(masked_softmax(&scores))
            .collect();
        let value = f64::from(self.scorer.value(features)?);

        Ok(Prediction::new(policy, value))
    }
}

impl<'g, G: Game, S: ActionScorer> PolicyValueOracle<G> for ScoringOracle<'g, G, S> {
    fn set_context(&mut self, _state: &G::State, legal_actions: &[G::Action]) -> Result<()> {
        self.context = legal_actions
            .iter()
            .map(|action| Ok((self.game.action_key(action)?, self.game.encode_action(action))))
            .collect::<Result<Vec<_>>>()?;
        Ok(())
    }

    async fn predict(&mut self, features: &[f32]) -> Result<Prediction> {
        self.score(features)
    }

    fn supports_sync(&self) -> bool {
        true
    }

    fn predict_sync(&mut self, features: &[f32]) -> Result<Prediction> {
        self.score(features)
    }
}

/// Numerically stable softmax. Non-finite scores get probability zero; if every
/// score is masked the result is uniform.
pub fn masked_softmax(scores: &[f32]) -> Vec<f64> {
    if scores.is_empty() {
        return Vec::new();
    }

    let max = scores
        .iter()
        .filter(|s| s.is_finite())
        .map(|&s| f64::from(s))
        .fold(f64::NEG_INFINITY, f64::max);
    if max == f64::NEG_INFINITY {
        return vec![1.0 / scores.len() as f64; scores.len()];
    }

    let exps: Vec<f64> = scores
        .iter()
        .map(|&s| {
            if s.is_finite() {
                (f64::from(s) - max).exp()
            } else {
                0.0
            }
        })
        .collect();
    let sum: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}
