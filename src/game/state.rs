use crate::error::MoveError;

use super::detector::{check_game_status, GameStatus};
use super::{Board, Player};

/// Whose move the session is waiting for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    HumanTurn,
    ComputerTurn,
    GameOver(GameStatus),
}

/// A record of the last disc placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LastMove {
    pub player: Player,
    pub row: usize,
    pub column: usize,
}

/// One human-vs-computer game. X always moves first.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GameState {
    board: Board,
    human: Player,
    to_move: Player,
    phase: Phase,
    last_move: Option<LastMove>,
}

impl GameState {
    /// Create a fresh game with the human playing `human`
    pub fn new(human: Player) -> Self {
        let to_move = Player::X;
        GameState {
            board: Board::new(),
            human,
            to_move,
            phase: Self::phase_for(human, to_move),
            last_move: None,
        }
    }

    /// Start over with the same sides
    pub fn restart(&mut self) {
        *self = GameState::new(self.human);
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn human(&self) -> Player {
        self.human
    }

    pub fn computer(&self) -> Player {
        self.human.other()
    }

    /// Player whose disc goes in next, `None` once the game is over
    pub fn to_move(&self) -> Option<Player> {
        (!self.is_over()).then_some(self.to_move)
    }

    pub fn last_move(&self) -> Option<LastMove> {
        self.last_move
    }

    pub fn status(&self) -> GameStatus {
        match self.phase {
            Phase::GameOver(status) => status,
            _ => GameStatus::InProgress,
        }
    }

    pub fn is_over(&self) -> bool {
        matches!(self.phase, Phase::GameOver(_))
    }

    /// Drop the side-to-move's disc in `column` and advance the phase.
    /// Returns the row where the disc landed.
    pub fn play(&mut self, column: usize) -> Result<usize, MoveError> {
        if self.is_over() {
            return Err(MoveError::GameOver);
        }

        let player = self.to_move;
        let (board, row) = self.board.place(column, player)?;
        self.board = board;
        self.last_move = Some(LastMove { player, row, column });
        self.to_move = player.other();

        let status = check_game_status(&self.board);
        self.phase = if status.is_over() {
            Phase::GameOver(status)
        } else {
            Self::phase_for(self.human, self.to_move)
        };

        Ok(row)
    }

    fn phase_for(human: Player, to_move: Player) -> Phase {
        if to_move == human {
            Phase::HumanTurn
        } else {
            Phase::ComputerTurn
        }
    }
}
