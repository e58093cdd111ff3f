pub mod action_scoring;
pub mod policy_value_net;

// Re-export key components for convenience
pub use action_scoring::{masked_softmax, ActionScorer, ScoringOracle};
pub use policy_value_net::{PolicyValueOracle, Prediction, UniformOracle};
