pub mod arena;
pub mod bot;
pub mod engine;
pub mod game;

pub use arena::*;
pub use bot::*;
pub use engine::{
    REMOVAL_CANDIDATES, SearchResult, Searcher, WIN_SCORE, apply_move, evaluate_board,
    find_best_move, generate_moves, minimax, removal_candidates, removal_quality,
};
pub use game::*;
