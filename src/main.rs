use blockade_arena::*;
use clap::{Parser, ValueEnum};
use log::error;
use std::io::{self, Write};
use std::process::ExitCode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Play against the engine from the terminal
    Human,
    /// Engine against a built-in opponent
    SelfPlay,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Side {
    A,
    B,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Opponent {
    AlphaBeta,
    Greedy,
    Random,
}

#[derive(Parser, Debug)]
#[command(
    name = "blockade-arena",
    about = "Step one square, block one square; whoever cannot step loses"
)]
struct Args {
    #[arg(long, value_enum, default_value_t = Mode::Human)]
    mode: Mode,

    /// Engine strength (easy = depth 1, medium = 3, hard = 4)
    #[arg(long, value_enum, default_value_t = Difficulty::Medium)]
    difficulty: Difficulty,

    /// Explicit search depth, overrides --difficulty
    #[arg(long)]
    depth: Option<u32>,

    /// Side the human plays; A moves first
    #[arg(long, value_enum, default_value_t = Side::B)]
    human_side: Side,

    /// Engine's opponent in self-play
    #[arg(long, value_enum, default_value_t = Opponent::Random)]
    opponent: Opponent,

    /// Seed for the random opponent
    #[arg(long, default_value_t = 1)]
    seed: u64,

    /// Print the finished match record as JSON
    #[arg(long)]
    json: bool,
}

/// Reads squares from stdin, re-prompting until each half of the ply is legal
struct HumanBot {
    name: String,
    stdin: io::Stdin,
}

impl HumanBot {
    fn new(name: String) -> Self {
        HumanBot {
            name,
            stdin: io::stdin(),
        }
    }

    /// `None` on end of input or a read error
    fn prompt(&mut self, text: &str) -> Option<String> {
        print!("{}", text);
        if let Err(e) = io::stdout().flush() {
            error!("failed to flush stdout: {}", e);
        }

        let mut line = String::new();
        match self.stdin.read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => Some(line.trim().to_string()),
            Err(e) => {
                error!("failed to read input: {}", e);
                None
            }
        }
    }
}

impl Bot for HumanBot {
    fn name(&self) -> &str {
        &self.name
    }

    fn get_move(&mut self, state: &GameState) -> Option<Action> {
        let player = state.current_player();
        let mut board = state.board().clone();
        println!("{} ({}), it's your turn.", self.name, player);

        let to = loop {
            let input = self.prompt("Enter your move target (e.g. b3): ")?;
            match input.parse::<Position>() {
                Ok(to) if board.move_player(player, to) => break to,
                Ok(_) => println!("Invalid move! Please try again."),
                Err(e) => println!("{}", e),
            }
        };

        println!("\n{}", board);

        let remove = loop {
            let input = self.prompt("Enter a square to remove (e.g. c4): ")?;
            match input.parse::<Position>() {
                Ok(remove) if board.remove_cell_at(remove) => break remove,
                Ok(_) => println!("Invalid removal! Try again."),
                Err(e) => println!("{}", e),
            }
        };

        Some(Action::new(to, remove))
    }
}

fn opponent_bot(args: &Args, depth: u32) -> Box<dyn Bot> {
    match args.opponent {
        Opponent::AlphaBeta => Box::new(AlphaBetaBot::new("AlphaBeta".to_string(), depth)),
        Opponent::Greedy => Box::new(GreedyBot::new("Greedy".to_string())),
        Opponent::Random => Box::new(RandomBot::new("Random".to_string(), args.seed)),
    }
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    let depth = args.depth.unwrap_or_else(|| args.difficulty.depth());
    let engine: Box<dyn Bot> = Box::new(AlphaBetaBot::new(format!("AI (depth {})", depth), depth));

    let (bot_a, bot_b) = match args.mode {
        Mode::Human => {
            let human: Box<dyn Bot> = Box::new(HumanBot::new("Human".to_string()));
            match args.human_side {
                Side::A => (human, engine),
                Side::B => (engine, human),
            }
        }
        Mode::SelfPlay => (engine, opponent_bot(&args, depth)),
    };

    println!("Blockade - step one square, then block one square.");
    println!("A moves first. Whoever cannot step on their turn loses.\n");

    let config = MatchConfig {
        verbose: true,
        ..MatchConfig::default()
    };
    let record = Match::new(bot_a, bot_b, config).play();

    match &record.result {
        MatchResult::Win {
            winner_name,
            winner,
            plies,
        } => {
            println!("{} has no legal moves. Game over!", winner.opponent());
            println!("Winner: {} ({}) after {} plies", winner_name, winner, plies);
        }
        MatchResult::Forfeit {
            violator,
            winner_name,
            reason,
            ..
        } => {
            println!(
                "{} forfeits ({}). Winner: {}",
                violator, reason, winner_name
            );
        }
        MatchResult::Unfinished { plies } => {
            println!("Stopped after {} plies without a winner", plies);
        }
    }

    if args.json {
        match serde_json::to_string_pretty(&record) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                error!("failed to serialize match record: {}", e);
                return ExitCode::FAILURE;
            }
        }
    }

    ExitCode::SUCCESS
}
