pub mod algorithm;
pub mod hyperparameters;
pub mod mcts_result;
pub mod node;
pub mod noise;
pub mod selection;
pub mod tree;

pub use algorithm::{IsmctsEngine, ProgressCallback, SearchRequest};
pub use hyperparameters::IsmctsConfig;
pub use mcts_result::{ChildStat, SearchResult, SearchStats};
pub use node::{Node, NodeId};
pub use tree::Tree;
