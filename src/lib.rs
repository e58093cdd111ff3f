//! # TCG ISMCTS
//!
//! Decision engine for two-player trading card games with hidden information.
//!
//! ## Features
//!
//! - **Search**: Information-Set Monte Carlo Tree Search with PUCT selection
//! - **Oracles**: pluggable policy/value predictors, sync or async
//! - **Exploration**: Dirichlet root noise and temperature-annealed move choice
//! - **Logging**: file or stderr logging through `flexi_logger`
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tcg_ismcts::{IsmctsConfig, IsmctsEngine, SearchRequest};
//!
//! let mut engine = IsmctsEngine::new(IsmctsConfig::default())?;
//! let result = engine
//!     .search(&game, SearchRequest::new(&state, me).at_turn(turn), &mut oracle)
//!     .await?;
//! play(result.action);
//! ```

// ============================================================================
// PUBLIC API MODULES
// ============================================================================

/// Game collaborator interface and action keys
pub mod game;

/// Information-Set Monte Carlo Tree Search engine
pub mod mcts;

/// Policy/value oracles
pub mod neural;

/// Logger setup
pub mod logging;

// ============================================================================
// PUBLIC API RE-EXPORTS
// ============================================================================

pub use game::{ActionKey, Game};

pub use mcts::{IsmctsConfig, IsmctsEngine, SearchRequest, SearchResult, SearchStats};

pub use neural::{ActionScorer, PolicyValueOracle, Prediction, ScoringOracle, UniformOracle};

pub use logging::{setup_logging, LoggingConfig};

// ============================================================================
// ERROR TYPES
// ============================================================================

/// Main error type of the search engine
#[derive(Debug, thiserror::Error)]
pub enum IsmctsError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Internal consistency failure, e.g. a fully expanded node with no selectable child.
    #[error("Search invariant violated: {0}")]
    SearchInvariantViolation(String),

    #[error("Root state has no legal actions")]
    NoLegalActions,

    #[error("Oracle error: {0}")]
    Oracle(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Logging error: {0}")]
    Logging(#[from] flexi_logger::FlexiLoggerError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, IsmctsError>;

// ============================================================================
// LIBRARY VERSION INFO
// ============================================================================

/// Library version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Library description
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
