//! Win and draw detection.

use super::board::{Board, Cell, COLS, ROWS};
use super::Player;

/// Length of a winning line.
pub const CONNECT: usize = 4;

/// Row/column steps for the four line orientations: horizontal, vertical,
/// diagonal down-right and diagonal up-right.
const DIRECTIONS: [(isize, isize); 4] = [(0, 1), (1, 0), (1, 1), (-1, 1)];

/// Result of checking a board after a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    InProgress,
    Win(Player),
    Draw,
}

impl GameStatus {
    pub fn is_over(self) -> bool {
        self != GameStatus::InProgress
    }

    pub fn winner(self) -> Option<Player> {
        match self {
            GameStatus::Win(player) => Some(player),
            _ => None,
        }
    }
}

/// Return the owner of the first complete four-in-a-row found on the board.
///
/// Every run of four cells in each orientation is visited exactly once:
/// a run is identified by its starting cell, and only starts whose far end
/// stays on the board are considered.
pub fn check_winner(board: &Board) -> Option<Player> {
    for &(dr, dc) in &DIRECTIONS {
        for row in 0..ROWS {
            for col in 0..COLS {
                let end_row = row as isize + dr * (CONNECT as isize - 1);
                let end_col = col as isize + dc * (CONNECT as isize - 1);
                if !in_bounds(end_row, end_col) {
                    continue;
                }
                if let Some(player) = run_owner(board, row, col, dr, dc) {
                    return Some(player);
                }
            }
        }
    }
    None
}

/// True iff the board is full and nobody owns a line.
pub fn is_draw(board: &Board) -> bool {
    board.is_full() && check_winner(board).is_none()
}

/// Classify a board for the turn loop.
pub fn check_game_status(board: &Board) -> GameStatus {
    if let Some(player) = check_winner(board) {
        GameStatus::Win(player)
    } else if board.is_full() {
        GameStatus::Draw
    } else {
        GameStatus::InProgress
    }
}

/// Check whether the disc at (row, col) is part of a four-in-a-row.
///
/// Only lines through that one cell are inspected, so after a move this
/// answers the same question as [`check_winner`] as long as the board had no
/// winner before the move.
pub fn wins_through(board: &Board, row: usize, col: usize) -> bool {
    let cell = board.get(row, col);
    if cell == Cell::Empty {
        return false;
    }

    DIRECTIONS.iter().any(|&(dr, dc)| {
        let count = 1
            + count_from(board, row, col, dr, dc, cell)
            + count_from(board, row, col, -dr, -dc, cell);
        count >= CONNECT
    })
}

/// Count consecutive `cell`s stepping away from (row, col), not counting the start.
fn count_from(board: &Board, row: usize, col: usize, dr: isize, dc: isize, cell: Cell) -> usize {
    let mut count = 0;
    let mut r = row as isize + dr;
    let mut c = col as isize + dc;
    while in_bounds(r, c) && board.get(r as usize, c as usize) == cell {
        count += 1;
        r += dr;
        c += dc;
    }
    count
}

fn run_owner(board: &Board, row: usize, col: usize, dr: isize, dc: isize) -> Option<Player> {
    let first = board.get(row, col).owner()?;
    let owned = (1..CONNECT as isize).all(|i| {
        let r = (row as isize + dr * i) as usize;
        let c = (col as isize + dc * i) as usize;
        board.get(r, c) == Cell::Disc(first)
    });
    owned.then_some(first)
}

fn in_bounds(row: isize, col: isize) -> bool {
    row >= 0 && row < ROWS as isize && col >= 0 && col < COLS as isize
}
