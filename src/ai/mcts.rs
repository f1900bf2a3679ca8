use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, trace};

use crate::ai::tree::{NodeId, SearchTree};
use crate::error::SearchError;
use crate::game::{check_game_status, detector, Board, GameStatus, Player};

/// Iterations per move in live play.
pub const DEFAULT_ITERATIONS: u32 = 500;

/// UCB1 exploration constant, sqrt(2).
pub const DEFAULT_EXPLORATION: f64 = std::f64::consts::SQRT_2;

// ─── Config ──────────────────────────────────────────────────────────────────

/// Search parameters.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct MctsConfig {
    /// Selection/expansion/simulation/backpropagation rounds per move (0 → use 1).
    pub iterations: u32,
    /// Exploration constant in the UCB1 formula.
    pub exploration: f64,
    /// Optional wall-clock limit per move; the search stops early when it
    /// runs out, after at least one iteration.
    pub time_limit_ms: Option<u64>,
    /// Seed for the rollout RNG. Unset means seed from the OS.
    pub seed: Option<u64>,
}

impl Default for MctsConfig {
    fn default() -> Self {
        MctsConfig {
            iterations: DEFAULT_ITERATIONS,
            exploration: DEFAULT_EXPLORATION,
            time_limit_ms: None,
            seed: None,
        }
    }
}

impl MctsConfig {
    pub fn with_iterations(iterations: u32) -> Self {
        MctsConfig {
            iterations,
            ..Default::default()
        }
    }
}

// ─── Results ─────────────────────────────────────────────────────────────────

/// Statistics of one root move after a search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveStats {
    pub column: usize,
    pub visits: u32,
    pub wins: u32,
}

impl MoveStats {
    pub fn win_rate(&self) -> f64 {
        if self.visits == 0 {
            0.0
        } else {
            self.wins as f64 / self.visits as f64
        }
    }
}

/// Outcome of one decision.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchSummary {
    /// Chosen column: the most visited root move.
    pub column: usize,
    pub iterations: u32,
    pub nodes: usize,
    pub elapsed: Duration,
    /// Root moves in ascending column order.
    pub moves: Vec<MoveStats>,
}

/// Result of a single random playout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rollout {
    pub winner: Option<Player>,
    /// Discs dropped during the playout.
    pub moves: usize,
}

// ─── Engine ──────────────────────────────────────────────────────────────────

/// Pick a column for `player` with a fresh search of `iterations` rounds.
pub fn decide_move(board: &Board, player: Player, iterations: u32) -> Result<usize, SearchError> {
    let config = MctsConfig::with_iterations(iterations);
    search(board, player, &config, &mut rand::rng()).map(|summary| summary.column)
}

/// Run a full search from `board` with `player` to move.
///
/// Win counts in the tree are kept from `player`'s side at every depth, so
/// UCB1 ranks children by `player`'s expected benefit even where the
/// opponent is to move. The tree is dropped before returning.
pub fn search<R: Rng + ?Sized>(
    board: &Board,
    player: Player,
    config: &MctsConfig,
    rng: &mut R,
) -> Result<SearchSummary, SearchError> {
    let start = Instant::now();
    let deadline = config.time_limit_ms.map(|ms| start + Duration::from_millis(ms));
    let budget = config.iterations.max(1);

    let mut tree = SearchTree::new(*board, player);
    let mut iterations = 0;
    while iterations < budget {
        if iterations > 0 && deadline.is_some_and(|d| Instant::now() >= d) {
            debug!(iterations, budget, "search deadline reached");
            break;
        }
        run_iteration(&mut tree, player, config.exploration, rng);
        iterations += 1;
    }

    let root = tree.root();
    let (column, _) = tree
        .most_visited_child(root)
        .ok_or(SearchError::NoLegalMoves)?;

    let moves: Vec<MoveStats> = tree
        .get(root)
        .children()
        .iter()
        .map(|&(column, id)| {
            let child = tree.get(id);
            MoveStats {
                column,
                visits: child.visits(),
                wins: child.wins(),
            }
        })
        .collect();

    let summary = SearchSummary {
        column,
        iterations,
        nodes: tree.len(),
        elapsed: start.elapsed(),
        moves,
    };
    debug!(
        player = %player,
        column,
        iterations,
        nodes = summary.nodes,
        elapsed_ms = summary.elapsed.as_millis() as u64,
        "search complete"
    );
    Ok(summary)
}

/// One round of selection, expansion, simulation and backpropagation.
fn run_iteration<R: Rng + ?Sized>(
    tree: &mut SearchTree,
    perspective: Player,
    exploration: f64,
    rng: &mut R,
) {
    let node = select(tree, exploration);
    let node = if tree.get(node).is_terminal() {
        node
    } else {
        tree.expand(node).unwrap_or(node)
    };

    let leaf = tree.get(node);
    let rollout = simulate(leaf.board(), leaf.to_move(), rng);
    trace!(winner = ?rollout.winner, moves = rollout.moves, "rollout");

    tree.backpropagate(node, rollout.winner, perspective);
}

/// Descend from the root while the current node is fully expanded and has
/// children.
fn select(tree: &SearchTree, exploration: f64) -> NodeId {
    let mut node = tree.root();
    loop {
        let current = tree.get(node);
        if !current.is_fully_expanded() || current.children().is_empty() {
            return node;
        }
        match tree.select_best_child(node, exploration) {
            Some(child) => node = child,
            None => return node,
        }
    }
}

/// Play uniformly random legal moves on a private copy of `board`, starting
/// with `to_move`, until someone connects four or the board fills up.
pub fn simulate<R: Rng + ?Sized>(board: &Board, to_move: Player, rng: &mut R) -> Rollout {
    match check_game_status(board) {
        GameStatus::Win(player) => return Rollout { winner: Some(player), moves: 0 },
        GameStatus::Draw => return Rollout { winner: None, moves: 0 },
        GameStatus::InProgress => {}
    }

    let mut working = *board;
    let mut player = to_move;
    let mut moves = 0;

    loop {
        let columns = working.valid_moves();
        let column = columns[rng.random_range(0..columns.len())];
        let Ok((next, row)) = working.place(column, player) else {
            unreachable!("valid_moves returned full column {column}");
        };
        working = next;
        moves += 1;

        if detector::wins_through(&working, row, column) {
            return Rollout { winner: Some(player), moves };
        }
        if working.is_full() {
            return Rollout { winner: None, moves };
        }
        player = player.other();
    }
}

// ─── Agent ───────────────────────────────────────────────────────────────────

/// The computer opponent: a config plus its own rollout RNG.
pub struct MctsAgent {
    config: MctsConfig,
    rng: StdRng,
    last_summary: Option<SearchSummary>,
}

impl MctsAgent {
    pub fn new(config: MctsConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        MctsAgent {
            config,
            rng,
            last_summary: None,
        }
    }

    pub fn config(&self) -> &MctsConfig {
        &self.config
    }

    /// Search and return the chosen column.
    pub fn select_action(&mut self, board: &Board, player: Player) -> Result<usize, SearchError> {
        self.search(board, player).map(|summary| summary.column)
    }

    /// Search and return the full summary. The summary is also kept for
    /// [`MctsAgent::last_summary`].
    pub fn search(&mut self, board: &Board, player: Player) -> Result<SearchSummary, SearchError> {
        let summary = search(board, player, &self.config, &mut self.rng)?;
        self.last_summary = Some(summary.clone());
        Ok(summary)
    }

    pub fn last_summary(&self) -> Option<&SearchSummary> {
        self.last_summary.as_ref()
    }

    pub fn name(&self) -> &str {
        "MCTS"
    }
}

impl Default for MctsAgent {
    fn default() -> Self {
        Self::new(MctsConfig::default())
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{check_winner, COLS, ROWS};

    fn play(moves: &[(usize, Player)]) -> Board {
        moves.iter().fold(Board::new(), |board, &(col, player)| {
            board.apply_move(col, player).unwrap()
        })
    }

    fn seeded(iterations: u32, seed: u64) -> MctsAgent {
        MctsAgent::new(MctsConfig {
            iterations,
            seed: Some(seed),
            ..Default::default()
        })
    }

    /// Every column but 6 filled without a line of four.
    fn one_column_left() -> Board {
        let mut board = Board::new();
        for col in 0..COLS - 1 {
            for row in (0..ROWS).rev() {
                // Pairs of columns share a colour pattern, shifted by one row
                // every two columns, so no line of four forms.
                let flip = (row + col / 2) % 2 == 0;
                let player = if flip { Player::X } else { Player::O };
                board = board.apply_move(col, player).unwrap();
            }
        }
        board
    }

    #[test]
    fn test_default_config() {
        let config = MctsConfig::default();
        assert_eq!(config.iterations, 500);
        assert!((config.exploration - 1.4142).abs() < 1e-4);
        assert_eq!(config.time_limit_ms, None);
    }

    #[test]
    fn test_selects_legal_action() {
        let mut agent = seeded(50, 1);
        let board = play(&[(0, Player::X), (0, Player::O), (0, Player::X), (0, Player::O), (0, Player::X), (0, Player::O)]);
        for _ in 0..5 {
            let column = agent.select_action(&board, Player::X).unwrap();
            assert!(board.valid_moves().contains(&column), "column {column} not legal");
        }
        assert_eq!(agent.name(), "MCTS");
    }

    #[test]
    fn test_single_legal_move_is_chosen_for_any_budget() {
        let board = one_column_left();
        assert_eq!(check_winner(&board), None);
        assert_eq!(board.valid_moves(), vec![6]);

        for iterations in [0, 1, 2, 10, 200] {
            assert_eq!(decide_move(&board, Player::O, iterations), Ok(6));
        }
    }

    #[test]
    fn test_no_legal_moves_on_full_board() {
        let mut board = one_column_left();
        for i in 0..ROWS {
            let player = if i % 2 == 0 { Player::O } else { Player::X };
            board = board.apply_move(6, player).unwrap();
        }
        assert!(board.is_full());
        assert_eq!(decide_move(&board, Player::O, 100), Err(SearchError::NoLegalMoves));
    }

    #[test]
    fn test_no_legal_moves_on_won_board() {
        let board = play(&[(2, Player::X); 4]);
        assert_eq!(decide_move(&board, Player::O, 100), Err(SearchError::NoLegalMoves));
    }

    #[test]
    fn test_summary_accounts_for_every_iteration() {
        let mut agent = seeded(300, 3);
        let summary = agent.search(&Board::new(), Player::X).unwrap();

        assert_eq!(summary.iterations, 300);
        assert_eq!(summary.moves.len(), 7);
        let columns: Vec<usize> = summary.moves.iter().map(|m| m.column).collect();
        assert_eq!(columns, vec![0, 1, 2, 3, 4, 5, 6]);

        // Every iteration passes through exactly one root child
        let visits: u32 = summary.moves.iter().map(|m| m.visits).sum();
        assert_eq!(visits, 300);

        let best = summary.moves.iter().map(|m| m.visits).max().unwrap();
        let chosen = summary.moves.iter().find(|m| m.column == summary.column).unwrap();
        assert_eq!(chosen.visits, best);
        assert_eq!(agent.last_summary(), Some(&summary));
    }

    #[test]
    fn test_seeded_search_is_reproducible() {
        let board = play(&[(3, Player::X), (2, Player::O), (3, Player::X)]);
        let a = seeded(400, 11).search(&board, Player::O).unwrap();
        let b = seeded(400, 11).search(&board, Player::O).unwrap();
        assert_eq!(a.column, b.column);
        assert_eq!(a.moves, b.moves);
    }

    #[test]
    fn test_time_limit_runs_at_least_one_iteration() {
        let mut agent = MctsAgent::new(MctsConfig {
            iterations: u32::MAX,
            time_limit_ms: Some(0),
            seed: Some(5),
            ..Default::default()
        });
        let summary = agent.search(&Board::new(), Player::O).unwrap();
        assert_eq!(summary.iterations, 1);
        assert_eq!(summary.column, 0);
    }

    #[test]
    fn test_rollout_terminates_within_board_capacity() {
        let mut rng = StdRng::seed_from_u64(99);
        for _ in 0..500 {
            let rollout = simulate(&Board::new(), Player::X, &mut rng);
            assert!(rollout.moves <= ROWS * COLS);
            assert!(rollout.moves >= 7, "no one can win in fewer than 7 discs");
        }
    }

    #[test]
    fn test_rollout_on_terminal_board_plays_nothing() {
        let mut rng = StdRng::seed_from_u64(0);
        let board = play(&[(5, Player::O); 4]);
        let rollout = simulate(&board, Player::X, &mut rng);
        assert_eq!(rollout, Rollout { winner: Some(Player::O), moves: 0 });
    }

    #[test]
    fn test_rollout_does_not_touch_input() {
        let mut rng = StdRng::seed_from_u64(8);
        let board = play(&[(3, Player::X), (4, Player::O)]);
        let before = board;
        let _ = simulate(&board, Player::X, &mut rng);
        assert_eq!(board, before);
    }

    #[test]
    fn test_takes_immediate_win() {
        // O has three on the bottom row at 4,5,6; column 3 wins
        let board = play(&[
            (4, Player::O),
            (0, Player::X),
            (5, Player::O),
            (0, Player::X),
            (6, Player::O),
            (1, Player::X),
        ]);
        for seed in 0..5 {
            let column = seeded(1000, seed).select_action(&board, Player::O).unwrap();
            assert_eq!(column, 3, "seed {seed} missed the winning move");
        }
    }

    #[test]
    fn test_blocks_horizontal_threat() {
        // X holds the bottom row at 0,1,2; O must answer in column 3
        let board = play(&[
            (6, Player::O),
            (0, Player::X),
            (6, Player::O),
            (1, Player::X),
            (5, Player::O),
            (2, Player::X),
        ]);
        assert_eq!(board.landing_row(3), Some(5));

        let runs = 10;
        let blocked = (0..runs)
            .filter(|&seed| seeded(1000, seed).select_action(&board, Player::O).unwrap() == 3)
            .count();
        assert!(blocked >= 7, "blocked only {blocked}/{runs} times");
    }

    #[test]
    fn beats_random_player() {
        let mut rng = StdRng::seed_from_u64(2024);
        let games = 10;
        let mut wins = 0;

        for game in 0..games {
            let mut agent = seeded(300, game);
            // Alternate who moves first
            let computer = if game % 2 == 0 { Player::X } else { Player::O };
            let mut board = Board::new();
            let mut to_move = Player::X;

            while !check_game_status(&board).is_over() {
                let column = if to_move == computer {
                    agent.select_action(&board, computer).unwrap()
                } else {
                    let moves = board.valid_moves();
                    moves[rng.random_range(0..moves.len())]
                };
                board = board.apply_move(column, to_move).unwrap();
                to_move = to_move.other();
            }

            if check_winner(&board) == Some(computer) {
                wins += 1;
            }
        }

        assert!(wins >= 8, "MCTS won only {wins}/{games} against random play");
    }
}
