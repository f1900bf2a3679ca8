//! Front ends for a human-vs-computer game: a ratatui terminal UI and a
//! plain line-based console.

mod app;
pub mod console;
mod game_view;

pub use app::App;
pub use console::{outcome_message, render_board_text, Console};
