//! Collaborator interface between the search engine and a concrete rule engine.
//!
//! The engine never interprets cards or effects itself. Everything it knows about
//! a game comes through the [`Game`] trait: legal-move generation, pure state
//! transitions, determinization of hidden zones and terminal scoring.

pub mod action_key;

pub use action_key::ActionKey;

use rand::RngCore;
use serde::Serialize;
use std::fmt::Debug;

/// Length of the fallback state encoding handed to the oracle.
pub const STATE_FEATURES: usize = 501;

/// Length of the fallback per-action encoding used by action-scoring oracles.
pub const ACTION_FEATURES: usize = 54;

/// A two-player, turn-based game with hidden information.
///
/// Turns are assumed to alternate between the two players; the search flips the
/// sign of a value at every ply when backpropagating.
pub trait Game {
    /// Opaque game state. Concrete after [`Game::determinize`].
    type State: Clone;

    /// A move. Serialized to build its [`ActionKey`] unless
    /// [`Game::action_key`] is overridden.
    type Action: Clone + Debug + Serialize;

    /// Player identifier used as the search perspective.
    type Player: Copy + Debug;

    /// Legal actions in enumeration order. Must be deterministic for a fixed
    /// state and empty exactly when the state is terminal.
    fn legal_actions(&self, state: &Self::State) -> Vec<Self::Action>;

    /// Applies an action, returning a new state (must not mutate the input).
    fn apply_action(&self, state: &Self::State, action: &Self::Action) -> Self::State;

    /// Samples a concrete state consistent with what `perspective` knows,
    /// e.g. by shuffling unseen cards back into hidden zones.
    ///
    /// The default is the identity, which is correct for perfect-information games.
    fn determinize(
        &self,
        state: &Self::State,
        _perspective: Self::Player,
        _rng: &mut dyn RngCore,
    ) -> Self::State {
        state.clone()
    }

    /// Outcome of a terminal state for `perspective`: `1.0` win, `-1.0` loss, `0.0` draw.
    fn terminal_value(&self, _state: &Self::State, _perspective: Self::Player) -> f64 {
        0.0
    }

    /// Fixed-size feature vector handed to the oracle.
    fn encode_state(&self, _state: &Self::State, _perspective: Self::Player) -> Vec<f32> {
        vec![0.0; STATE_FEATURES]
    }

    /// Fixed-size feature vector for a single action (action-scoring oracles only).
    fn encode_action(&self, _action: &Self::Action) -> Vec<f32> {
        vec![0.0; ACTION_FEATURES]
    }

    /// Canonical key indexing the search tree and the returned policy.
    fn action_key(&self, action: &Self::Action) -> crate::Result<ActionKey> {
        ActionKey::canonical(action)
    }
}
