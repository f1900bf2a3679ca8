//! The computer opponent: an arena-backed search tree and the Monte Carlo
//! Tree Search engine that drives it with random rollouts.

pub mod mcts;
pub mod tree;

pub use mcts::{
    decide_move, search, simulate, MctsAgent, MctsConfig, MoveStats, Rollout, SearchSummary,
    DEFAULT_EXPLORATION, DEFAULT_ITERATIONS,
};
pub use tree::{NodeId, SearchNode, SearchTree};
