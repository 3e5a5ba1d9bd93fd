use crate::engine::{self, Searcher};
use crate::game::{Action, GameState, Player};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

/// Trait that all players (engine-driven or human) implement
pub trait Bot: Send {
    /// Get the name of the bot
    fn name(&self) -> &str;

    /// Choose an action for the player on turn.
    /// `None` means the bot has nothing to play and concedes.
    fn get_move(&mut self, state: &GameState) -> Option<Action>;

    /// Notified when the game starts
    fn game_start(&mut self, _player: Player) {}

    /// Notified when an action is played (by either player)
    fn notify_move(&mut self, _player: Player, _action: Action) {}

    /// Notified when the game ends
    fn game_end(&mut self) {}
}

/// Minimax bot with alpha-beta pruning at a fixed depth
pub struct AlphaBetaBot {
    name: String,
    depth: u32,
    searcher: Searcher,
    last_score: Option<i32>,
}

impl AlphaBetaBot {
    pub fn new(name: String, depth: u32) -> Self {
        AlphaBetaBot {
            name,
            depth,
            searcher: Searcher::new(),
            last_score: None,
        }
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Search value of the most recent move, from this bot's side
    pub fn last_score(&self) -> Option<i32> {
        self.last_score
    }
}

impl Bot for AlphaBetaBot {
    fn name(&self) -> &str {
        &self.name
    }

    fn get_move(&mut self, state: &GameState) -> Option<Action> {
        let result = self
            .searcher
            .search(state.board(), state.current_player(), self.depth)?;
        self.last_score = Some(result.score);
        Some(result.action)
    }

    fn game_start(&mut self, _player: Player) {
        self.last_score = None;
    }
}

/// One-ply bot: maximises mobility difference right after its own action
pub struct GreedyBot {
    name: String,
}

impl GreedyBot {
    pub fn new(name: String) -> Self {
        GreedyBot { name }
    }

    fn evaluate_move(&self, state: &GameState, action: &Action) -> (i32, i32) {
        let player = state.current_player();
        let next = engine::apply_move(state.board(), action, player);
        (
            engine::evaluate_board(&next, player),
            engine::removal_quality(&next, action.remove, player),
        )
    }
}

impl Bot for GreedyBot {
    fn name(&self) -> &str {
        &self.name
    }

    fn get_move(&mut self, state: &GameState) -> Option<Action> {
        let moves = engine::generate_moves(state.board(), state.current_player());

        // max_by_key keeps the last maximum, so walk the list in reverse to
        // prefer the earliest generated action on ties
        moves
            .into_iter()
            .rev()
            .max_by_key(|action| self.evaluate_move(state, action))
    }
}

/// Uniformly random legal action, reproducible from a seed
pub struct RandomBot {
    name: String,
    rng: StdRng,
}

impl RandomBot {
    pub fn new(name: String, seed: u64) -> Self {
        RandomBot {
            name,
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Bot for RandomBot {
    fn name(&self) -> &str {
        &self.name
    }

    fn get_move(&mut self, state: &GameState) -> Option<Action> {
        let moves = engine::generate_moves(state.board(), state.current_player());
        moves.choose(&mut self.rng).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{WIN_SCORE, generate_moves};
    use crate::game::Board;
    use crate::game::tests::{place, pos};

    fn finished_state() -> GameState {
        let mut board = Board::new();
        for sq in ["f3", "f4", "f5", "g3", "g5"] {
            board.remove_cell_at(pos(sq));
        }
        GameState::from_board(board, Player::B)
    }

    #[test]
    fn test_bots_return_generated_actions() {
        let state = GameState::new();
        let legal = generate_moves(state.board(), Player::A);

        let mut bots: Vec<Box<dyn Bot>> = vec![
            Box::new(AlphaBetaBot::new("ab".to_string(), 2)),
            Box::new(GreedyBot::new("greedy".to_string())),
            Box::new(RandomBot::new("random".to_string(), 42)),
        ];
        for bot in bots.iter_mut() {
            let action = bot.get_move(&state).unwrap();
            assert!(legal.contains(&action), "{} played {}", bot.name(), action);
        }
    }

    #[test]
    fn test_bots_concede_without_moves() {
        let state = finished_state();
        assert!(AlphaBetaBot::new("ab".into(), 3).get_move(&state).is_none());
        assert!(GreedyBot::new("greedy".into()).get_move(&state).is_none());
        assert!(RandomBot::new("random".into(), 1).get_move(&state).is_none());
    }

    #[test]
    fn test_greedy_matches_depth_one_search() {
        let state = GameState::new();
        let greedy = GreedyBot::new("greedy".into()).get_move(&state);
        let searched = AlphaBetaBot::new("ab".into(), 1).get_move(&state);
        assert_eq!(greedy, searched);
    }

    #[test]
    fn test_random_bot_is_reproducible() {
        let state = GameState::new();
        let mut a = RandomBot::new("a".into(), 9);
        let mut b = RandomBot::new("b".into(), 9);
        for _ in 0..5 {
            assert_eq!(a.get_move(&state), b.get_move(&state));
        }
    }

    #[test]
    fn test_alphabeta_bot_reports_winning_score() {
        let mut board = Board::new();
        place(&mut board, Player::B, pos("g1"));
        board.remove_cell_at(pos("f1"));
        board.remove_cell_at(pos("g2"));
        let state = GameState::from_board(board, Player::A);

        let mut bot = AlphaBetaBot::new("ab".into(), 2);
        assert_eq!(bot.depth(), 2);
        let action = bot.get_move(&state).unwrap();
        assert_eq!(action.remove, pos("f2"));
        assert_eq!(bot.last_score(), Some(WIN_SCORE));
    }
}
