use std::io;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{backend::Backend, Terminal};
use tracing::{info, warn};

use crate::ai::MctsAgent;
use crate::error::MoveError;
use crate::game::{GameState, GameStatus, Phase, Player, COLS};

pub struct App {
    game_state: GameState,
    agent: MctsAgent,
    selected_column: usize,
    should_quit: bool,
    message: Option<String>,
}

impl App {
    pub fn new(human: Player, agent: MctsAgent) -> Self {
        App {
            game_state: GameState::new(human),
            agent,
            selected_column: 3, // Start in middle
            should_quit: false,
            message: None,
        }
    }

    pub fn game_state(&self) -> &GameState {
        &self.game_state
    }

    /// Main application loop
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            terminal.draw(|f| self.render(f))?;

            if self.should_quit {
                break;
            }

            // The board is drawn with the "thinking" header before the search starts
            if self.game_state.phase() == Phase::ComputerTurn {
                self.computer_move()?;
                continue;
            }

            self.handle_events()?;
        }
        Ok(())
    }

    /// Handle keyboard events
    fn handle_events(&mut self) -> io::Result<()> {
        if event::poll(std::time::Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    self.handle_key(key);
                }
            }
        }
        Ok(())
    }

    /// Handle key press
    fn handle_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Left => {
                self.selected_column = self.selected_column.saturating_sub(1);
            }
            KeyCode::Right => {
                if self.selected_column < COLS - 1 {
                    self.selected_column += 1;
                }
            }
            KeyCode::Enter | KeyCode::Char(' ') => {
                self.human_move(self.selected_column);
            }
            KeyCode::Char(c @ '0'..='6') => {
                let column = c as usize - '0' as usize;
                self.selected_column = column;
                self.human_move(column);
            }
            KeyCode::Char('r') => {
                self.game_state.restart();
                self.selected_column = 3;
                self.message = Some("New game started!".to_string());
                info!("game restarted");
            }
            _ => {}
        }
    }

    /// Drop the human's disc in `column`
    fn human_move(&mut self, column: usize) {
        match self.game_state.phase() {
            Phase::HumanTurn => {}
            Phase::ComputerTurn => return,
            Phase::GameOver(_) => {
                self.message = Some("Game over! Press 'r' to restart.".to_string());
                return;
            }
        }

        match self.game_state.play(column) {
            Ok(row) => {
                info!(player = %self.game_state.human(), column, row, "human move");
                self.message = None;
                self.announce_result();
            }
            Err(MoveError::ColumnFull(_)) => {
                self.message = Some("Column is full!".to_string());
            }
            Err(MoveError::InvalidColumn(_)) => {
                self.message = Some("Invalid column!".to_string());
            }
            Err(MoveError::GameOver) => {
                self.message = Some("Game is over!".to_string());
            }
        }
    }

    /// Let the computer search and play its reply
    fn computer_move(&mut self) -> io::Result<()> {
        let player = self.game_state.computer();
        let summary = self
            .agent
            .search(self.game_state.board(), player)
            .map_err(|e| {
                warn!(error = %e, "computer could not move");
                io::Error::other(e)
            })?;
        self.game_state.play(summary.column).map_err(io::Error::other)?;
        info!(%player, column = summary.column, iterations = summary.iterations, "computer move");

        let stats = summary.moves.iter().find(|m| m.column == summary.column);
        self.message = Some(match stats {
            Some(stats) => format!(
                "Computer played column {} ({} visits, {:.0}% wins)",
                summary.column,
                stats.visits,
                stats.win_rate() * 100.0
            ),
            None => format!("Computer played column {}", summary.column),
        });
        self.announce_result();
        Ok(())
    }

    fn announce_result(&mut self) {
        let text = match self.game_state.status() {
            GameStatus::Win(player) if player == self.game_state.human() => "You win!".to_string(),
            GameStatus::Win(player) => format!("{} (computer) wins!", player.name()),
            GameStatus::Draw => "It's a draw!".to_string(),
            GameStatus::InProgress => return,
        };
        self.message = Some(text);
    }

    /// Render the UI
    fn render(&self, frame: &mut ratatui::Frame) {
        super::game_view::render(frame, &self.game_state, self.selected_column, &self.message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::MctsConfig;
    use crossterm::event::KeyModifiers;
    use ratatui::backend::TestBackend;

    fn app(human: Player) -> App {
        let agent = MctsAgent::new(MctsConfig {
            iterations: 30,
            seed: Some(4),
            ..Default::default()
        });
        App::new(human, agent)
    }

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    #[test]
    fn test_cursor_stays_on_board() {
        let mut app = app(Player::X);
        for _ in 0..10 {
            press(&mut app, KeyCode::Right);
        }
        assert_eq!(app.selected_column, COLS - 1);
        for _ in 0..10 {
            press(&mut app, KeyCode::Left);
        }
        assert_eq!(app.selected_column, 0);
    }

    #[test]
    fn test_digit_drops_and_hands_turn_to_computer() {
        let mut app = app(Player::X);
        press(&mut app, KeyCode::Char('5'));
        assert_eq!(app.selected_column, 5);
        assert_eq!(app.game_state().board().disc_count(), 1);
        assert_eq!(app.game_state().phase(), Phase::ComputerTurn);

        // Keys are ignored for drops until the computer has answered
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.game_state().board().disc_count(), 1);

        app.computer_move().unwrap();
        assert_eq!(app.game_state().board().disc_count(), 2);
        assert_eq!(app.game_state().phase(), Phase::HumanTurn);
        assert!(app.message.as_deref().unwrap().starts_with("Computer played column"));
    }

    #[test]
    fn test_full_column_message() {
        let mut app = app(Player::X);
        for _ in 0..6 {
            app.game_state.play(0).unwrap();
        }
        assert_eq!(app.game_state().phase(), Phase::HumanTurn);

        press(&mut app, KeyCode::Char('0'));
        assert_eq!(app.message.as_deref(), Some("Column is full!"));
        assert_eq!(app.game_state().board().disc_count(), 6);
    }

    #[test]
    fn test_restart_and_quit() {
        let mut app = app(Player::O);
        app.computer_move().unwrap();
        press(&mut app, KeyCode::Char('r'));
        assert_eq!(app.game_state().board().disc_count(), 0);
        assert_eq!(app.message.as_deref(), Some("New game started!"));

        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);
    }

    #[test]
    fn test_render_draws_board() {
        let app = app(Player::X);
        let mut terminal = Terminal::new(TestBackend::new(60, 30)).unwrap();
        terminal.draw(|f| app.render(f)).unwrap();

        let buffer = terminal.backend().buffer();
        let text: String = buffer.content().iter().map(|cell| cell.symbol()).collect();
        assert!(text.contains("Connect Four"));
        assert!(text.contains("Your turn"));
    }
}
