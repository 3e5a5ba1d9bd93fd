//! Move generation and alpha-beta search.
//!
//! A ply is a king step followed by blocking one empty square. The full
//! removal space is large, so generation only pairs each legal step with a
//! short, prioritised list of removal candidates (see [`removal_candidates`]).
//! The search is plain depth-first minimax over owned board copies with an
//! explicit maximizing flag.

use crate::game::{Action, BOARD_SIZE, Board, Cell, Player, Position};
use log::debug;

/// Win/loss sentinel. Larger than any value [`evaluate_board`] can produce.
pub const WIN_SCORE: i32 = 1_000_000;

/// Maximum number of removal squares paired with each step
pub const REMOVAL_CANDIDATES: usize = 12;

const MOBILITY_WEIGHT: i32 = 20;

/// Collect up to [`REMOVAL_CANDIDATES`] empty squares, in priority order:
/// around the opponent, around the mover, then by distance from the centre.
pub fn removal_candidates(board: &Board, player: Player) -> Vec<Position> {
    let own = board.player_position(player);
    let opponent = board.player_position(player.opponent());

    let mut used = [[false; BOARD_SIZE]; BOARD_SIZE];
    let mut candidates = Vec::with_capacity(REMOVAL_CANDIDATES);

    let mut try_add = |pos: Position, candidates: &mut Vec<Position>| {
        if candidates.len() >= REMOVAL_CANDIDATES || used[pos.row][pos.col] {
            return;
        }
        if board.cell(pos) == Cell::Empty {
            used[pos.row][pos.col] = true;
            candidates.push(pos);
        }
    };

    for pos in opponent.neighbors().chain(own.neighbors()) {
        try_add(pos, &mut candidates);
    }

    let max_distance = 2 * (BOARD_SIZE / 2);
    'rings: for distance in 0..=max_distance {
        for row in 0..BOARD_SIZE {
            for col in 0..BOARD_SIZE {
                if candidates.len() >= REMOVAL_CANDIDATES {
                    break 'rings;
                }
                let pos = Position::new(row, col);
                if pos.center_distance() == distance {
                    try_add(pos, &mut candidates);
                }
            }
        }
    }

    candidates
}

/// Every (step, removal) pair for `player`, steps in scan order and removals
/// in candidate order.
pub fn generate_moves(board: &Board, player: Player) -> Vec<Action> {
    let from = board.player_position(player);
    let candidates = removal_candidates(board, player);

    let mut actions = Vec::new();
    for to in board.step_targets(player) {
        for &remove in &candidates {
            if remove == to {
                continue;
            }
            // The square being left is free once the step is made
            if remove != from && board.cell(remove) != Cell::Empty {
                continue;
            }
            actions.push(Action::new(to, remove));
        }
    }

    actions
}

/// Successor board after `player` plays `action`. The input is untouched.
pub fn apply_move(board: &Board, action: &Action, player: Player) -> Board {
    let mut next = board.clone();
    let moved = next.move_player(player, action.to);
    debug_assert!(moved, "generated illegal step {} for {}", action.to, player);
    let removed = next.remove_cell_at(action.remove);
    debug_assert!(
        removed,
        "generated illegal removal {} for {}",
        action.remove,
        player
    );
    next
}

/// Mobility difference from `ai_player`'s point of view
pub fn evaluate_board(board: &Board, ai_player: Player) -> i32 {
    let mine = board.mobility(ai_player) as i32;
    let theirs = board.mobility(ai_player.opponent()) as i32;
    MOBILITY_WEIGHT * (mine - theirs)
}

/// Tie-break score for a removal, measured on the board after the step.
/// Never mixed into search values.
pub fn removal_quality(board: &Board, remove: Position, ai_player: Player) -> i32 {
    let ai = board.player_position(ai_player);
    let opponent = board.player_position(ai_player.opponent());

    let mut score = 0;
    if opponent.is_adjacent(remove) {
        score += 10;
    }
    if ai.is_adjacent(remove) {
        score -= 4;
    }
    score - (remove.center_distance() / 3) as i32
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchResult {
    pub action: Action,
    pub score: i32,
    pub nodes: u64,
}

/// Depth-limited minimax. Counts visited nodes; pruning can be switched off
/// to get the full-width value of a position.
#[derive(Debug, Clone)]
pub struct Searcher {
    pruning: bool,
    nodes: u64,
}

impl Searcher {
    pub fn new() -> Self {
        Searcher {
            pruning: true,
            nodes: 0,
        }
    }

    /// Searcher that never cuts off siblings
    pub fn full_width() -> Self {
        Searcher {
            pruning: false,
            nodes: 0,
        }
    }

    pub fn is_pruning(&self) -> bool {
        self.pruning
    }

    /// Nodes visited since the last root search
    pub fn nodes(&self) -> u64 {
        self.nodes
    }

    pub fn minimax(
        &mut self,
        board: &Board,
        depth: u32,
        maximizing: bool,
        ai_player: Player,
        mut alpha: i32,
        mut beta: i32,
    ) -> i32 {
        self.nodes += 1;

        let current = if maximizing {
            ai_player
        } else {
            ai_player.opponent()
        };

        if !board.has_any_move(current) {
            return if current == ai_player {
                -WIN_SCORE
            } else {
                WIN_SCORE
            };
        }

        if depth == 0 {
            return evaluate_board(board, ai_player);
        }

        let actions = generate_moves(board, current);

        if maximizing {
            let mut best = -WIN_SCORE;
            for action in &actions {
                let next = apply_move(board, action, current);
                let value = self.minimax(&next, depth - 1, false, ai_player, alpha, beta);

                best = best.max(value);
                alpha = alpha.max(value);
                if self.pruning && beta <= alpha {
                    break;
                }
            }
            best
        } else {
            let mut best = WIN_SCORE;
            for action in &actions {
                let next = apply_move(board, action, current);
                let value = self.minimax(&next, depth - 1, true, ai_player, alpha, beta);

                best = best.min(value);
                beta = beta.min(value);
                if self.pruning && beta <= alpha {
                    break;
                }
            }
            best
        }
    }

    /// Root search for `ai_player`. Returns `None` when there is nothing to
    /// play, which means `ai_player` has lost.
    ///
    /// Root actions are tried in generation order with the alpha bound
    /// carried across siblings. Equal values keep the earlier action unless
    /// the later one has a strictly better [`removal_quality`].
    pub fn search(&mut self, board: &Board, ai_player: Player, depth: u32) -> Option<SearchResult> {
        self.nodes = 0;
        let depth = depth.max(1);

        let actions = generate_moves(board, ai_player);
        let first = *actions.first()?;

        let mut best_action = first;
        let mut best_score = -WIN_SCORE;
        let mut best_quality = None;
        let mut alpha = -WIN_SCORE;
        let beta = WIN_SCORE;

        for action in &actions {
            let next = apply_move(board, action, ai_player);
            let value = self.minimax(&next, depth - 1, false, ai_player, alpha, beta);

            if value > best_score {
                best_score = value;
                best_action = *action;
                best_quality = None;
            } else if value == best_score {
                let incumbent = match best_quality {
                    Some(quality) => quality,
                    None => {
                        let after = apply_move(board, &best_action, ai_player);
                        removal_quality(&after, best_action.remove, ai_player)
                    }
                };
                let challenger = removal_quality(&next, action.remove, ai_player);
                if challenger > incumbent {
                    best_action = *action;
                    best_quality = Some(challenger);
                } else {
                    best_quality = Some(incumbent);
                }
            }

            alpha = alpha.max(value);
            if self.pruning && beta <= alpha {
                break;
            }
        }

        debug!(
            "{} searched {} root actions to depth {}: best {} score {} ({} nodes)",
            ai_player,
            actions.len(),
            depth,
            best_action,
            best_score,
            self.nodes
        );

        Some(SearchResult {
            action: best_action,
            score: best_score,
            nodes: self.nodes,
        })
    }
}

impl Default for Searcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Alpha-beta value of `board` with the given mover and window
pub fn minimax(
    board: &Board,
    depth: u32,
    maximizing: bool,
    ai_player: Player,
    alpha: i32,
    beta: i32,
) -> i32 {
    Searcher::new().minimax(board, depth, maximizing, ai_player, alpha, beta)
}

/// Best action for `ai_player`, or `None` if it has no move
pub fn find_best_move(board: &Board, ai_player: Player, depth: u32) -> Option<Action> {
    Searcher::new()
        .search(board, ai_player, depth)
        .map(|result| result.action)
}
