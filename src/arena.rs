use crate::bot::Bot;
use crate::game::{Action, GameState, Player};
use clap::ValueEnum;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Search depth presets offered to human players
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn depth(&self) -> u32 {
        match self {
            Difficulty::Easy => 1,
            Difficulty::Medium => 3,
            Difficulty::Hard => 4,
        }
    }
}

pub struct MatchConfig {
    /// Safety cap on plies; every game ends well before the default
    pub max_plies: usize,
    /// Print the board after each ply
    pub verbose: bool,
}

impl Default for MatchConfig {
    fn default() -> Self {
        MatchConfig {
            max_plies: 64,
            verbose: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchResult {
    /// The loser had no legal step on their turn
    Win {
        winner_name: String,
        winner: Player,
        plies: usize,
    },
    /// A bot returned no action or an illegal one while it could still move
    Forfeit {
        violator: String,
        winner_name: String,
        winner: Player,
        reason: String,
    },
    /// `max_plies` reached without a result
    Unfinished { plies: usize },
}

impl MatchResult {
    pub fn winner(&self) -> Option<Player> {
        match self {
            MatchResult::Win { winner, .. } => Some(*winner),
            MatchResult::Forfeit { winner, .. } => Some(*winner),
            MatchResult::Unfinished { .. } => None,
        }
    }

    pub fn winner_name(&self) -> Option<&str> {
        match self {
            MatchResult::Win { winner_name, .. } => Some(winner_name),
            MatchResult::Forfeit { winner_name, .. } => Some(winner_name),
            MatchResult::Unfinished { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlyRecord {
    pub player: Player,
    pub action: Action,
    pub elapsed_ms: u64,
}

/// Names, plies and outcome of a finished match
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub player_a: String,
    pub player_b: String,
    pub plies: Vec<PlyRecord>,
    pub result: MatchResult,
}

pub struct Match {
    config: MatchConfig,
    state: GameState,
    bot_a: Box<dyn Bot>,
    bot_b: Box<dyn Bot>,
    plies: Vec<PlyRecord>,
}

impl Match {
    /// `bot_a` plays first
    pub fn new(bot_a: Box<dyn Bot>, bot_b: Box<dyn Bot>, config: MatchConfig) -> Self {
        Self::from_state(bot_a, bot_b, config, GameState::new())
    }

    pub fn from_state(
        bot_a: Box<dyn Bot>,
        bot_b: Box<dyn Bot>,
        config: MatchConfig,
        state: GameState,
    ) -> Self {
        Match {
            config,
            state,
            bot_a,
            bot_b,
            plies: Vec::new(),
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    fn bot_name(&self, player: Player) -> &str {
        match player {
            Player::A => self.bot_a.name(),
            Player::B => self.bot_b.name(),
        }
    }

    pub fn play(mut self) -> MatchRecord {
        self.bot_a.game_start(Player::A);
        self.bot_b.game_start(Player::B);

        info!(
            "Match starting: {} (A) vs {} (B)",
            self.bot_a.name(),
            self.bot_b.name()
        );
        if self.config.verbose {
            println!("{} (A) vs {} (B)\n", self.bot_a.name(), self.bot_b.name());
            println!("{}", self.state.board());
        }

        let result = loop {
            if let Some(winner) = self.state.winner() {
                break MatchResult::Win {
                    winner_name: self.bot_name(winner).to_string(),
                    winner,
                    plies: self.state.ply_count(),
                };
            }
            if self.plies.len() >= self.config.max_plies {
                break MatchResult::Unfinished {
                    plies: self.plies.len(),
                };
            }
            if let Some(result) = self.play_ply() {
                break result;
            }
        };

        self.bot_a.game_end();
        self.bot_b.game_end();

        match result.winner_name() {
            Some(name) => info!("Match over after {} plies: {} wins", self.plies.len(), name),
            None => info!("Match stopped after {} plies", self.plies.len()),
        }

        MatchRecord {
            player_a: self.bot_a.name().to_string(),
            player_b: self.bot_b.name().to_string(),
            plies: self.plies,
            result,
        }
    }

    fn play_ply(&mut self) -> Option<MatchResult> {
        let player = self.state.current_player();
        let bot = match player {
            Player::A => &mut self.bot_a,
            Player::B => &mut self.bot_b,
        };

        let start = Instant::now();
        let action = bot.get_move(&self.state);
        let elapsed = start.elapsed();

        let Some(action) = action else {
            return Some(self.forfeit(player, "no action returned".to_string()));
        };

        if let Err(e) = self.state.play(action) {
            return Some(self.forfeit(player, e.to_string()));
        }

        self.record(player, action, elapsed);
        None
    }

    fn record(&mut self, player: Player, action: Action, elapsed: Duration) {
        info!(
            "Ply {}: {} ({}) plays {} in {:?}",
            self.state.ply_count(),
            self.bot_name(player),
            player,
            action,
            elapsed
        );

        self.bot_a.notify_move(player, action);
        self.bot_b.notify_move(player, action);
        self.plies.push(PlyRecord {
            player,
            action,
            elapsed_ms: elapsed.as_millis() as u64,
        });

        if self.config.verbose {
            println!("{} plays {}", self.bot_name(player), action);
            println!("{}", self.state.board());
        }
    }

    fn forfeit(&self, player: Player, reason: String) -> MatchResult {
        let violator = self.bot_name(player).to_string();
        warn!("{} ({}) forfeits: {}", violator, player, reason);

        let winner = player.opponent();
        MatchResult::Forfeit {
            violator,
            winner_name: self.bot_name(winner).to_string(),
            winner,
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bot::{AlphaBetaBot, GreedyBot, RandomBot};
    use crate::game::Board;
    use crate::game::tests::{place, pos};

    /// Bot that replays a fixed script
    struct ScriptedBot {
        moves: Vec<Action>,
    }

    impl Bot for ScriptedBot {
        fn name(&self) -> &str {
            "scripted"
        }

        fn get_move(&mut self, _state: &GameState) -> Option<Action> {
            if self.moves.is_empty() {
                None
            } else {
                Some(self.moves.remove(0))
            }
        }
    }

    fn check_record(record: &MatchRecord) {
        let mut state = GameState::new();
        for (i, ply) in record.plies.iter().enumerate() {
            let expected = if i % 2 == 0 { Player::A } else { Player::B };
            assert_eq!(ply.player, expected);
            state.play(ply.action).unwrap();
        }
        if let MatchResult::Win { winner, plies, .. } = &record.result {
            assert_eq!(state.winner(), Some(*winner));
            assert_eq!(*plies, record.plies.len());
        }
    }

    #[test]
    fn test_difficulty_depths() {
        assert_eq!(Difficulty::Easy.depth(), 1);
        assert_eq!(Difficulty::Medium.depth(), 3);
        assert_eq!(Difficulty::Hard.depth(), 4);
    }

    #[test]
    fn test_random_match_ends_with_winner() {
        for seed in 0..5 {
            let record = Match::new(
                Box::new(RandomBot::new("r1".into(), seed)),
                Box::new(RandomBot::new("r2".into(), seed + 100)),
                MatchConfig::default(),
            )
            .play();

            assert!(record.result.winner().is_some(), "{:?}", record.result);
            assert!(record.plies.len() < MatchConfig::default().max_plies);
            check_record(&record);
        }
    }

    #[test]
    fn test_alphabeta_beats_random() {
        let mut wins = 0;
        for seed in 0..3 {
            let record = Match::new(
                Box::new(AlphaBetaBot::new("ab".into(), 2)),
                Box::new(RandomBot::new("random".into(), seed)),
                MatchConfig::default(),
            )
            .play();

            check_record(&record);
            if record.result.winner_name() == Some("ab") {
                wins += 1;
            }
        }
        assert!(wins >= 2, "alpha-beta won only {wins} of 3");
    }

    #[test]
    fn test_greedy_vs_greedy_is_deterministic() {
        let play = || {
            Match::new(
                Box::new(GreedyBot::new("g1".into())),
                Box::new(GreedyBot::new("g2".into())),
                MatchConfig::default(),
            )
            .play()
        };
        let first = play();
        let second = play();
        let actions = |r: &MatchRecord| r.plies.iter().map(|p| p.action).collect::<Vec<_>>();

        assert_eq!(actions(&first), actions(&second));
        assert_eq!(first.result, second.result);
        check_record(&first);
    }

    #[test]
    fn test_illegal_action_forfeits() {
        let scripted = ScriptedBot {
            moves: vec![Action::new(pos("c4"), pos("d4"))],
        };
        let record = Match::new(
            Box::new(scripted),
            Box::new(GreedyBot::new("greedy".into())),
            MatchConfig::default(),
        )
        .play();

        match &record.result {
            MatchResult::Forfeit {
                violator,
                winner,
                reason,
                ..
            } => {
                assert_eq!(violator, "scripted");
                assert_eq!(*winner, Player::B);
                assert!(reason.starts_with("Illegal move"));
            }
            other => panic!("expected forfeit, got {other:?}"),
        }
        assert!(record.plies.is_empty());
    }

    #[test]
    fn test_empty_script_forfeits_after_last_action() {
        let scripted = ScriptedBot {
            moves: vec![Action::new(pos("b4"), pos("a4"))],
        };
        let record = Match::new(
            Box::new(scripted),
            Box::new(GreedyBot::new("greedy".into())),
            MatchConfig::default(),
        )
        .play();

        assert_eq!(record.plies.len(), 2);
        assert_eq!(record.result.winner(), Some(Player::B));
    }

    #[test]
    fn test_max_plies_stops_match() {
        let config = MatchConfig {
            max_plies: 3,
            verbose: false,
        };
        let record = Match::new(
            Box::new(GreedyBot::new("g1".into())),
            Box::new(GreedyBot::new("g2".into())),
            config,
        )
        .play();

        assert_eq!(record.result, MatchResult::Unfinished { plies: 3 });
        assert_eq!(record.plies.len(), 3);
    }

    /// B in the g1 corner with f2 as its only exit
    fn cornered_b() -> Board {
        let mut board = Board::new();
        place(&mut board, Player::B, pos("g1"));
        board.remove_cell_at(pos("f1"));
        board.remove_cell_at(pos("g2"));
        board
    }

    #[test]
    fn test_match_from_endgame_state() {
        let state = GameState::from_board(cornered_b(), Player::A);
        let game = Match::from_state(
            Box::new(AlphaBetaBot::new("ab".into(), 2)),
            Box::new(GreedyBot::new("greedy".into())),
            MatchConfig::default(),
            state,
        );
        assert_eq!(game.state().current_player(), Player::A);
        assert!(!game.state().is_game_over());

        let record = game.play();
        assert_eq!(record.plies.len(), 1);
        assert_eq!(record.plies[0].action.remove, pos("f2"));
        assert_eq!(
            record.result,
            MatchResult::Win {
                winner_name: "ab".to_string(),
                winner: Player::A,
                plies: 1,
            }
        );
    }

    #[test]
    fn test_match_from_finished_state() {
        let mut board = cornered_b();
        board.remove_cell_at(pos("f2"));
        let game = Match::from_state(
            Box::new(GreedyBot::new("g1".into())),
            Box::new(GreedyBot::new("g2".into())),
            MatchConfig::default(),
            GameState::from_board(board, Player::B),
        );
        assert_eq!(game.state().winner(), Some(Player::A));

        let record = game.play();
        assert!(record.plies.is_empty());
        assert_eq!(record.result.winner_name(), Some("g1"));
    }

    #[test]
    fn test_match_record_serializes() {
        let record = Match::new(
            Box::new(GreedyBot::new("g1".into())),
            Box::new(RandomBot::new("r".into(), 5)),
            MatchConfig::default(),
        )
        .play();

        let json = serde_json::to_string(&record).unwrap();
        let back: MatchRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }
}
