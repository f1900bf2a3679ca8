//! Search tree with arena allocation.
//!
//! Nodes live in a contiguous `Vec` and refer to each other by [`NodeId`].
//! The parent link is only an index used to walk back up during
//! backpropagation; the arena owns every node and the whole tree is dropped
//! at once when a decision has been made.

use crate::game::{check_game_status, Board, GameStatus, Player};

/// Index into the node arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
    #[inline]
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// A node in the search tree.
#[derive(Debug, Clone)]
pub struct SearchNode {
    board: Board,
    /// Player whose disc goes in next from `board`.
    to_move: Player,
    /// Cached detector result for `board`.
    status: GameStatus,
    parent: Option<NodeId>,
    /// (column, child) pairs in insertion order, which is ascending column
    /// order because expansion always takes the lowest untried column.
    children: Vec<(usize, NodeId)>,
    visits: u32,
    /// Rollouts through this node won by the search's perspective player.
    wins: u32,
}

impl SearchNode {
    fn new(board: Board, to_move: Player, parent: Option<NodeId>) -> Self {
        SearchNode {
            board,
            to_move,
            status: check_game_status(&board),
            parent,
            children: Vec::new(),
            visits: 0,
            wins: 0,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn to_move(&self) -> Player {
        self.to_move
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[(usize, NodeId)] {
        &self.children
    }

    pub fn visits(&self) -> u32 {
        self.visits
    }

    pub fn wins(&self) -> u32 {
        self.wins
    }

    /// Won or drawn position
    pub fn is_terminal(&self) -> bool {
        self.status.is_over()
    }

    /// True iff every legal move from this board already has a child.
    pub fn is_fully_expanded(&self) -> bool {
        self.children.len() == self.board.valid_move_count()
    }

    /// Lowest legal column that has no child yet.
    pub fn untried_move(&self) -> Option<usize> {
        self.board
            .valid_moves()
            .into_iter()
            .find(|&col| !self.children.iter().any(|&(c, _)| c == col))
    }

    /// UCB1 score of this node as seen from a parent with `parent_visits`.
    /// Must only be called on visited nodes.
    #[inline]
    pub fn ucb1(&self, parent_visits: u32, exploration: f64) -> f64 {
        let visits = self.visits as f64;
        let exploit = self.wins as f64 / visits;
        let explore = ((parent_visits as f64).ln() / visits).sqrt();
        exploit + exploration * explore
    }
}

/// Search tree rooted at the position the computer has to move from.
#[derive(Debug)]
pub struct SearchTree {
    nodes: Vec<SearchNode>,
}

impl SearchTree {
    /// Create a tree holding only the root.
    pub fn new(board: Board, to_move: Player) -> Self {
        let mut nodes = Vec::with_capacity(1024);
        nodes.push(SearchNode::new(board, to_move, None));
        SearchTree { nodes }
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    #[inline]
    pub fn get(&self, id: NodeId) -> &SearchNode {
        &self.nodes[id.index()]
    }

    #[inline]
    fn get_mut(&mut self, id: NodeId) -> &mut SearchNode {
        &mut self.nodes[id.index()]
    }

    /// Number of nodes in the tree.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: the root exists from construction.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Pick the child of `id` to descend into.
    ///
    /// An unvisited child is returned immediately. Otherwise the child with
    /// the strictly greatest UCB1 score wins, so ties go to the child that was
    /// inserted first. Returns `None` if `id` has no children.
    pub fn select_best_child(&self, id: NodeId, exploration: f64) -> Option<NodeId> {
        let node = self.get(id);
        let mut best: Option<NodeId> = None;
        let mut best_score = f64::NEG_INFINITY;

        for &(_, child_id) in &node.children {
            let child = self.get(child_id);
            if child.visits == 0 {
                return Some(child_id);
            }

            let score = child.ucb1(node.visits, exploration);
            if score > best_score {
                best_score = score;
                best = Some(child_id);
            }
        }

        best
    }

    /// Create one child of `id` for its lowest untried column.
    /// Returns `None` when every legal move already has a child.
    pub fn expand(&mut self, id: NodeId) -> Option<NodeId> {
        let node = self.get(id);
        let column = node.untried_move()?;
        let mover = node.to_move;
        let board = node.board.apply_move(column, mover).ok()?;

        let child_id = NodeId(self.nodes.len() as u32);
        self.nodes.push(SearchNode::new(board, mover.other(), Some(id)));
        self.get_mut(id).children.push((column, child_id));
        Some(child_id)
    }

    /// Add one visit to `id` and every ancestor up to the root, and one win
    /// wherever `winner` is the `perspective` player.
    pub fn backpropagate(&mut self, id: NodeId, winner: Option<Player>, perspective: Player) {
        let won = winner == Some(perspective);
        let mut current = Some(id);

        while let Some(node_id) = current {
            let node = self.get_mut(node_id);
            node.visits += 1;
            if won {
                node.wins += 1;
            }
            current = node.parent;
        }
    }

    /// Child of `id` with the most visits, first one on ties.
    pub fn most_visited_child(&self, id: NodeId) -> Option<(usize, NodeId)> {
        let mut best: Option<(usize, NodeId)> = None;
        let mut best_visits = 0;

        for &(column, child_id) in &self.get(id).children {
            let visits = self.get(child_id).visits;
            if best.is_none() || visits > best_visits {
                best = Some((column, child_id));
                best_visits = visits;
            }
        }

        best
    }
}
