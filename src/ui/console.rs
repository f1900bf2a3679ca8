//! Line-based front end: prints the grid, prompts for a column number and
//! lets the computer answer.

use std::io::{self, BufRead, Write};
use std::time::Duration;

use crossterm::cursor::MoveTo;
use crossterm::queue;
use crossterm::terminal::{Clear, ClearType};
use tracing::info;

use crate::ai::MctsAgent;
use crate::config::UiConfig;
use crate::game::{Board, Cell, GameState, GameStatus, Phase, Player, COLS, ROWS};

/// Render the board as an ASCII grid with column numbers on top.
pub fn render_board_text(board: &Board) -> String {
    let separator = format!("+{}", "---+".repeat(COLS));
    let header = (0..COLS)
        .map(|col| col.to_string())
        .collect::<Vec<_>>()
        .join("   ");

    let mut out = format!("  {header}\n{separator}\n");
    for row in 0..ROWS {
        let cells = (0..COLS)
            .map(|col| match board.get(row, col) {
                Cell::Empty => ' ',
                Cell::Disc(player) => player.symbol(),
            })
            .map(String::from)
            .collect::<Vec<_>>()
            .join(" | ");
        out.push_str(&format!("| {cells} |\n{separator}\n"));
    }
    out
}

/// Final line printed when the game ends.
pub fn outcome_message(status: GameStatus) -> String {
    match status {
        GameStatus::Win(player) => format!("Player {player} has won the game"),
        GameStatus::Draw => "Game Over, It is a Draw".to_string(),
        GameStatus::InProgress => "Game in progress".to_string(),
    }
}

pub struct Console<R, W> {
    input: R,
    output: W,
    config: UiConfig,
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, output: W, config: UiConfig) -> Self {
        Console {
            input,
            output,
            config,
        }
    }

    /// Play `state` to the end, asking the human for moves on their turn.
    pub fn run(&mut self, state: &mut GameState, agent: &mut MctsAgent) -> io::Result<GameStatus> {
        self.show(state.board())?;

        loop {
            match state.phase() {
                Phase::GameOver(status) => {
                    writeln!(self.output, "{}", outcome_message(status))?;
                    info!(?status, "game over");
                    return Ok(status);
                }
                Phase::HumanTurn => {
                    let player = state.human();
                    writeln!(self.output, "It is Player {player} (Human)'s turn.")?;
                    let Some(column) = self.prompt_column(state.board(), player)? else {
                        return Err(io::Error::new(
                            io::ErrorKind::UnexpectedEof,
                            "input closed before the game ended",
                        ));
                    };
                    let row = state.play(column).map_err(io::Error::other)?;
                    info!(%player, column, row, "human move");
                    writeln!(
                        self.output,
                        "Thanks, you have placed your disc at (Row {row}, Column {column})"
                    )?;
                    self.show(state.board())?;
                }
                Phase::ComputerTurn => {
                    let player = state.computer();
                    writeln!(self.output, "It is Player {player} (MCTS AI)'s turn.")?;
                    let summary = agent
                        .search(state.board(), player)
                        .map_err(io::Error::other)?;
                    state.play(summary.column).map_err(io::Error::other)?;
                    info!(
                        %player,
                        column = summary.column,
                        iterations = summary.iterations,
                        "computer move"
                    );
                    writeln!(self.output, "AI chooses column {}.", summary.column)?;
                    self.show(state.board())?;
                }
            }
        }
    }

    /// Ask until the human names an open column. `None` on end of input.
    pub fn prompt_column(&mut self, board: &Board, player: Player) -> io::Result<Option<usize>> {
        loop {
            write!(
                self.output,
                "Hi player {player}, which column do you want to place your disc? "
            )?;
            self.output.flush()?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                return Ok(None);
            }

            let Ok(value) = line.trim().parse::<i64>() else {
                writeln!(self.output, "Sorry, only integers allowed.")?;
                continue;
            };
            if value < 0 || value >= COLS as i64 {
                writeln!(self.output, "Sorry, choose a number between 0 and {}", COLS - 1)?;
                continue;
            }
            let column = value as usize;
            if board.is_column_full(column) {
                writeln!(
                    self.output,
                    "Sorry, that column is filled. Please choose a different column."
                )?;
                continue;
            }

            return Ok(Some(column));
        }
    }

    fn show(&mut self, board: &Board) -> io::Result<()> {
        if self.config.display_delay_ms > 0 {
            std::thread::sleep(Duration::from_millis(self.config.display_delay_ms));
        }
        if self.config.clear_screen {
            queue!(self.output, Clear(ClearType::All), MoveTo(0, 0))?;
        }
        write!(self.output, "{}", render_board_text(board))?;
        self.output.flush()
    }
}
