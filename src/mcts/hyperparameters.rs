//! ISMCTS configuration.
//!
//! All tunables of the search live here. A configuration is validated when an
//! engine is built from it; an invalid configuration never reaches a search.

use crate::{IsmctsError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Search configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IsmctsConfig {
    // ========== Budget ==========
    /// Concrete states sampled per search (outer loop).
    /// Default: 10
    pub num_determinizations: usize,

    /// Simulations run against each determinization (inner loop).
    /// Default: 100
    pub num_simulations: usize,

    /// Deepest node (in plies from the root) that may still be expanded.
    /// Reaching it stops the descent and scores the state with the oracle.
    /// Default: 50
    pub max_depth: usize,

    // ========== PUCT ==========
    /// Exploration constant `c` in `Q + c * P * sqrt(N) / (1 + n)`.
    /// Default: 1.5
    pub exploration_weight: f64,

    /// Seed child priors from the oracle policy; uniform priors otherwise.
    /// Default: true
    pub use_neural_net_prior: bool,

    // ========== Temperature Annealing ==========
    /// Temperature used up to `temperature_decay_start`.
    /// Default: 1.0
    pub temperature_start: f64,

    /// Temperature reached at `temperature_decay_end`.
    /// Below 0.01 the root move is the most visited one.
    /// Default: 0.1
    pub temperature_end: f64,

    /// Turn at which the temperature starts decreasing.
    /// Default: 0
    pub temperature_decay_start: u32,

    /// Turn at which the temperature reaches `temperature_end`.
    /// Default: 30
    pub temperature_decay_end: u32,

    // ========== Root Noise ==========
    /// Symmetric Dirichlet concentration. `<= 0` disables root noise.
    /// Default: 0.3
    pub dirichlet_alpha: f64,

    /// Share of each root prior replaced by noise.
    /// Default: 0.25
    pub dirichlet_epsilon: f64,

    // ========== Scheduling ==========
    /// Simulations between cooperative yields when the oracle answers synchronously.
    /// Default: 50
    pub yield_interval: usize,
}

impl Default for IsmctsConfig {
    fn default() -> Self {
        Self {
            num_determinizations: 10,
            num_simulations: 100,
            max_depth: 50,
            exploration_weight: 1.5,
            use_neural_net_prior: true,
            temperature_start: 1.0,
            temperature_end: 0.1,
            temperature_decay_start: 0,
            temperature_decay_end: 30,
            dirichlet_alpha: 0.3,
            dirichlet_epsilon: 0.25,
            yield_interval: 50,
        }
    }
}

impl IsmctsConfig {
    /// Greedy configuration: no root noise and argmax move selection.
    pub fn for_evaluation(num_determinizations: usize, num_simulations: usize) -> Self {
        Self {
            num_determinizations,
            num_simulations,
            temperature_start: 0.0,
            temperature_end: 0.0,
            dirichlet_alpha: 0.0,
            ..Default::default()
        }
    }

    /// Parses a JSON document; absent fields keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| IsmctsError::InvalidConfiguration(format!("unparsable config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Rejects configurations the search cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.num_determinizations < 1 {
            return Err(IsmctsError::InvalidConfiguration(format!(
                "num_determinizations must be >= 1, got {}",
                self.num_determinizations
            )));
        }
        if self.num_simulations < 1 {
            return Err(IsmctsError::InvalidConfiguration(format!(
                "num_simulations must be >= 1, got {}",
                self.num_simulations
            )));
        }
        if !self.exploration_weight.is_finite() || self.exploration_weight < 0.0 {
            return Err(IsmctsError::InvalidConfiguration(format!(
                "exploration_weight must be a finite value >= 0, got {}",
                self.exploration_weight
            )));
        }
        if self.max_depth < 1 {
            return Err(IsmctsError::InvalidConfiguration(format!(
                "max_depth must be >= 1, got {}",
                self.max_depth
            )));
        }
        // Non-positive alphas switch noise off; infinite ones cannot be sampled
        if self.dirichlet_alpha.is_nan()
            || self.dirichlet_alpha == f64::INFINITY
            || !(0.0..=1.0).contains(&self.dirichlet_epsilon)
        {
            return Err(IsmctsError::InvalidConfiguration(format!(
                "dirichlet noise needs a numeric alpha and epsilon in [0, 1], got alpha={} epsilon={}",
                self.dirichlet_alpha, self.dirichlet_epsilon
            )));
        }
        if !self.temperature_start.is_finite() || !self.temperature_end.is_finite() {
            return Err(IsmctsError::InvalidConfiguration(format!(
                "temperatures must be finite, got start={} end={}",
                self.temperature_start, self.temperature_end
            )));
        }
        if self.yield_interval < 1 {
            return Err(IsmctsError::InvalidConfiguration(format!(
                "yield_interval must be >= 1, got {}",
                self.yield_interval
            )));
        }
        Ok(())
    }

    /// Total simulations of one search.
    pub fn total_simulations(&self) -> usize {
        self.num_determinizations * self.num_simulations
    }

    /// Temperature for the given turn, linearly annealed from
    /// `temperature_start` to `temperature_end`. Without a turn the start
    /// temperature applies.
    pub fn get_temperature(&self, turn: Option<u32>) -> f64 {
        let Some(turn) = turn else {
            return self.temperature_start;
        };
        if turn <= self.temperature_decay_start {
            self.temperature_start
        } else if turn >= self.temperature_decay_end {
            self.temperature_end
        } else {
            // Linear interpolation
            let progress = f64::from(turn - self.temperature_decay_start)
                / f64::from(self.temperature_decay_end - self.temperature_decay_start);
            self.temperature_start + progress * (self.temperature_end - self.temperature_start)
        }
    }

    /// Create a configuration string for logging
    pub fn to_config_string(&self) -> String {
        format!(
            "dets={}_sims={}_depth={}_c={:.2}_nnprior={}_temp[{:.2}->{:.2}@{}..{}]_dir[{:.2},{:.2}]",
            self.num_determinizations,
            self.num_simulations,
            self.max_depth,
            self.exploration_weight,
            self.use_neural_net_prior,
            self.temperature_start,
            self.temperature_end,
            self.temperature_decay_start,
            self.temperature_decay_end,
            self.dirichlet_alpha,
            self.dirichlet_epsilon
        )
    }
}
