use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Board size constant
pub const BOARD_SIZE: usize = 7;

/// King-step offsets in scan order (row-major, centre skipped)
pub const KING_STEPS: [(i32, i32); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cell {
    Empty,
    Blocked,
    PlayerA,
    PlayerB,
}

impl Cell {
    /// The player standing on this cell, if any
    pub fn occupant(&self) -> Option<Player> {
        match self {
            Cell::PlayerA => Some(Player::A),
            Cell::PlayerB => Some(Player::B),
            Cell::Empty | Cell::Blocked => None,
        }
    }

    pub fn symbol(&self) -> char {
        match self {
            Cell::Empty => '.',
            Cell::Blocked => '#',
            Cell::PlayerA => 'A',
            Cell::PlayerB => 'B',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Player {
    A,
    B,
}

impl Player {
    pub fn opponent(&self) -> Player {
        match self {
            Player::A => Player::B,
            Player::B => Player::A,
        }
    }

    /// Grid marker for this player
    pub fn marker(&self) -> Cell {
        match self {
            Player::A => Cell::PlayerA,
            Player::B => Cell::PlayerB,
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Player::A => write!(f, "Player A"),
            Player::B => write!(f, "Player B"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub fn new(row: usize, col: usize) -> Self {
        Position { row, col }
    }

    /// Step by a signed offset, returning `None` when it leaves the board
    pub fn offset(&self, dr: i32, dc: i32) -> Option<Position> {
        let r = self.row as i32 + dr;
        let c = self.col as i32 + dc;
        if Board::is_inside(r, c) {
            Some(Position::new(r as usize, c as usize))
        } else {
            None
        }
    }

    /// All on-board king-step neighbours, in scan order
    pub fn neighbors(self) -> impl Iterator<Item = Position> {
        KING_STEPS
            .into_iter()
            .filter_map(move |(dr, dc)| self.offset(dr, dc))
    }

    pub fn is_on_board(&self) -> bool {
        self.row < BOARD_SIZE && self.col < BOARD_SIZE
    }

    /// Chebyshev distance exactly 1
    pub fn is_adjacent(&self, other: Position) -> bool {
        let dr = self.row.abs_diff(other.row);
        let dc = self.col.abs_diff(other.col);
        dr <= 1 && dc <= 1 && !(dr == 0 && dc == 0)
    }

    /// Manhattan distance from the centre square
    pub fn center_distance(&self) -> usize {
        let center = BOARD_SIZE / 2;
        self.row.abs_diff(center) + self.col.abs_diff(center)
    }
}

/// Square notation: row letter then column digit, e.g. `b3` is row 1, col 2.
/// Off-board positions fall back to `(row, col)`.
impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.is_on_board() {
            return write!(f, "({}, {})", self.row, self.col);
        }
        let row = (b'a' + self.row as u8) as char;
        write!(f, "{}{}", row, self.col + 1)
    }
}

impl FromStr for Position {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || GameError::InvalidSquare(s.to_string());
        let mut chars = s.trim().chars();
        let (Some(r), Some(c), None) = (chars.next(), chars.next(), chars.next()) else {
            return Err(invalid());
        };

        let r = r.to_ascii_lowercase();
        let last_row = (b'a' + BOARD_SIZE as u8 - 1) as char;
        if !('a'..=last_row).contains(&r) {
            return Err(invalid());
        }
        let col = c
            .to_digit(10)
            .filter(|&d| d >= 1 && d as usize <= BOARD_SIZE)
            .ok_or_else(invalid)?;

        Ok(Position::new((r as u8 - b'a') as usize, col as usize - 1))
    }
}

/// One ply: step to `to`, then block `remove`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Action {
    pub to: Position,
    pub remove: Position,
}

impl Action {
    pub fn new(to: Position, remove: Position) -> Self {
        Action { to, remove }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} x{}", self.to, self.remove)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GameError {
    #[error("Invalid square: {0:?}")]
    InvalidSquare(String),
    #[error("Illegal move: cannot step to {}", .0.to)]
    IllegalMove(Action),
    #[error("Illegal removal: cannot block {}", .0.remove)]
    IllegalRemoval(Action),
    #[error("Game already over")]
    GameOver,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Board {
    grid: [[Cell; BOARD_SIZE]; BOARD_SIZE],
    player_a: Position,
    player_b: Position,
}

impl Board {
    /// Fresh board: A on the top edge, B on the bottom edge, both mid-column
    pub fn new() -> Self {
        let mid = BOARD_SIZE / 2;
        let mut board = Board {
            grid: [[Cell::Empty; BOARD_SIZE]; BOARD_SIZE],
            player_a: Position::new(0, mid),
            player_b: Position::new(BOARD_SIZE - 1, mid),
        };
        board.grid[0][mid] = Cell::PlayerA;
        board.grid[BOARD_SIZE - 1][mid] = Cell::PlayerB;
        board
    }

    pub fn is_inside(row: i32, col: i32) -> bool {
        row >= 0 && row < BOARD_SIZE as i32 && col >= 0 && col < BOARD_SIZE as i32
    }

    /// Cell lookup. Callers are expected to pass an on-board position.
    pub fn cell(&self, pos: Position) -> Cell {
        self.grid[pos.row][pos.col]
    }

    pub fn player_position(&self, player: Player) -> Position {
        match player {
            Player::A => self.player_a,
            Player::B => self.player_b,
        }
    }

    /// Whether `player` may step onto `pos` (ignores adjacency)
    fn is_open_for(&self, player: Player, pos: Position) -> bool {
        match self.cell(pos) {
            Cell::Empty => true,
            Cell::Blocked => false,
            cell @ (Cell::PlayerA | Cell::PlayerB) => cell.occupant() == Some(player),
        }
    }

    /// Step `player` one king move to `to`. Returns false and leaves the
    /// board unchanged if the step is illegal.
    pub fn move_player(&mut self, player: Player, to: Position) -> bool {
        if !to.is_on_board() {
            return false;
        }

        let from = self.player_position(player);
        if !from.is_adjacent(to) || !self.is_open_for(player, to) {
            return false;
        }

        self.grid[from.row][from.col] = Cell::Empty;
        self.grid[to.row][to.col] = player.marker();
        match player {
            Player::A => self.player_a = to,
            Player::B => self.player_b = to,
        }

        self.debug_check_invariants();
        true
    }

    /// Block an empty cell. Blocked or occupied cells are rejected.
    pub fn remove_cell_at(&mut self, pos: Position) -> bool {
        if !pos.is_on_board() {
            return false;
        }

        match self.cell(pos) {
            Cell::Empty => {
                self.grid[pos.row][pos.col] = Cell::Blocked;
                true
            }
            Cell::Blocked | Cell::PlayerA | Cell::PlayerB => false,
        }
    }

    /// Legal step destinations for `player` right now
    pub fn step_targets(&self, player: Player) -> impl Iterator<Item = Position> + '_ {
        self.player_position(player)
            .neighbors()
            .filter(move |&pos| self.is_open_for(player, pos))
    }

    pub fn mobility(&self, player: Player) -> usize {
        self.step_targets(player).count()
    }

    pub fn has_any_move(&self, player: Player) -> bool {
        self.step_targets(player).next().is_some()
    }

    pub fn blocked_count(&self) -> usize {
        self.grid
            .iter()
            .flatten()
            .filter(|&&cell| cell == Cell::Blocked)
            .count()
    }

    fn debug_check_invariants(&self) {
        debug_assert_eq!(self.cell(self.player_a), Cell::PlayerA);
        debug_assert_eq!(self.cell(self.player_b), Cell::PlayerB);
        debug_assert_eq!(
            self.grid
                .iter()
                .flatten()
                .filter(|cell| cell.occupant().is_some())
                .count(),
            2
        );
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "   ")?;
        for col in 0..BOARD_SIZE {
            write!(f, " {}", col + 1)?;
        }
        writeln!(f)?;
        writeln!(f, "   {}", "-".repeat(BOARD_SIZE * 2 + 1))?;

        for row in 0..BOARD_SIZE {
            write!(f, " {} |", (b'a' + row as u8) as char)?;
            for col in 0..BOARD_SIZE {
                write!(f, " {}", self.cell(Position::new(row, col)).symbol())?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// A game in progress: the board plus turn bookkeeping
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    board: Board,
    current_player: Player,
    ply_count: usize,
    winner: Option<Player>,
}

impl GameState {
    /// Player A moves first
    pub fn new() -> Self {
        Self::from_board(Board::new(), Player::A)
    }

    /// Start from an arbitrary position with `to_move` on turn
    pub fn from_board(board: Board, to_move: Player) -> Self {
        let winner = if board.has_any_move(to_move) {
            None
        } else {
            Some(to_move.opponent())
        };
        GameState {
            board,
            current_player: to_move,
            ply_count: 0,
            winner,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn current_player(&self) -> Player {
        self.current_player
    }

    pub fn ply_count(&self) -> usize {
        self.ply_count
    }

    pub fn winner(&self) -> Option<Player> {
        self.winner
    }

    pub fn is_game_over(&self) -> bool {
        self.winner.is_some()
    }

    /// Play one ply for the player on turn
    pub fn play(&mut self, action: Action) -> Result<(), GameError> {
        if self.is_game_over() {
            return Err(GameError::GameOver);
        }

        let mover = self.current_player;
        let mut next = self.board.clone();
        if !next.move_player(mover, action.to) {
            return Err(GameError::IllegalMove(action));
        }
        if !next.remove_cell_at(action.remove) {
            return Err(GameError::IllegalRemoval(action));
        }

        self.board = next;
        self.current_player = mover.opponent();
        self.ply_count += 1;

        if !self.board.has_any_move(self.current_player) {
            self.winner = Some(mover);
        }

        Ok(())
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}
