//! Policy/value oracle interface used by the search to seed priors and score leaves.

use crate::game::{ActionKey, Game};
use crate::{IsmctsError, Result};
use std::collections::HashMap;

/// Output of a single oracle query.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Prediction {
    /// Prior probability per action key.
    ///
    /// An empty map means "uniform over the legal actions"; keys missing from a
    /// non-empty map get the prior floor.
    pub policy: HashMap<ActionKey, f64>,

    /// Value estimate in `[-1, 1]` from the perspective the state was encoded for.
    pub value: f64,
}

impl Prediction {
    pub fn new(policy: HashMap<ActionKey, f64>, value: f64) -> Self {
        Self { policy, value }
    }

    /// Uniform policy with the given value.
    pub fn uniform(value: f64) -> Self {
        Self {
            policy: HashMap::new(),
            value,
        }
    }
}

/// Pluggable policy/value oracle.
///
/// `predict` is the asynchronous entry point every oracle provides. Oracles
/// that can answer without suspending also report [`supports_sync`] and
/// implement [`predict_sync`]; the engine then runs its fast path and only
/// yields to the scheduler every few simulations.
///
/// [`supports_sync`]: PolicyValueOracle::supports_sync
/// [`predict_sync`]: PolicyValueOracle::predict_sync
#[allow(async_fn_in_trait)]
pub trait PolicyValueOracle<G: Game> {
    /// Receives the raw state and legal-action list right before each prediction.
    /// Action-scoring oracles need this to score actions relative to the state.
    fn set_context(&mut self, _state: &G::State, _legal_actions: &[G::Action]) -> Result<()> {
        Ok(())
    }

    async fn predict(&mut self, features: &[f32]) -> Result<Prediction>;

    fn supports_sync(&self) -> bool {
        false
    }

    fn predict_sync(&mut self, _features: &[f32]) -> Result<Prediction> {
        Err(IsmctsError::Oracle(
            "synchronous prediction is not supported by this oracle".to_string(),
        ))
    }
}

/// Default oracle: uniform policy, zero value.
#[derive(Clone, Copy, Debug, Default)]
pub struct UniformOracle;

impl<G: Game> PolicyValueOracle<G> for UniformOracle {
    async fn predict(&mut self, _features: &[f32]) -> Result<Prediction> {
        Ok(Prediction::uniform(0.0))
    }

    fn supports_sync(&self) -> bool {
        true
    }

    fn predict_sync(&mut self, _features: &[f32]) -> Result<Prediction> {
        Ok(Prediction::uniform(0.0))
    }
}
