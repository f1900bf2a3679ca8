//! # MCTS Connect Four
//!
//! Connect Four on the classic 6x7 board against a computer opponent that
//! picks its moves with Monte Carlo Tree Search over random rollouts.
//! Play happens in a Ratatui terminal UI or a plain line-based console.
//!
//! ## Modules
//!
//! - [`game`]: Board, players, win/draw detection, turn state machine
//! - [`ai`]: Search tree and the MCTS engine
//! - [`ui`]: Terminal UI and console front ends
//! - [`config`]: TOML configuration loading and validation
//! - [`error`]: Structured error types

pub mod ai;
pub mod config;
pub mod error;
pub mod game;
pub mod ui;
