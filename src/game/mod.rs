//! Core Connect Four game logic: board representation, players, win/draw
//! detection and the human-vs-computer turn state machine.

mod board;
pub mod detector;
mod player;
mod state;

pub use board::{Board, Cell, COLS, ROWS};
pub use detector::{check_game_status, check_winner, is_draw, GameStatus};
pub use player::Player;
pub use state::{GameState, LastMove, Phase};
