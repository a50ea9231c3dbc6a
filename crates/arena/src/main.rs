//! Match runner and position analyser for the k-in-a-row engine.
//!
//! `play` pits the tree search against a random player over many games and
//! saves every game as JSON. `analyze` replays a saved game and reports what
//! the engine would play next.

mod players;

use alphagomoku_core::{Environment, TracingLogger};
use alphagomoku_game::{GameRecord, Gomoku, Stone, DEFAULT_BOARD_SIZE, DEFAULT_WIN_LENGTH};
use alphagomoku_mcts::{Mcts, SearchConfig};
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use players::{MctsPlayer, Player, RandomPlayer};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

/// Tree-search match runner for k-in-a-row games.
#[derive(Parser)]
#[command(name = "alphagomoku-arena")]
#[command(about = "Play and analyse k-in-a-row games with Monte Carlo Tree Search")]
struct Cli {
    /// Log level used when RUST_LOG is unset.
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

/// Search settings shared by every subcommand. Flags override the config file.
#[derive(clap::Args, Clone, Debug, Default)]
struct SearchArgs {
    /// TOML file with search settings. Without one, searches run without
    /// root noise and play the most visited move.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of MCTS simulations per move.
    #[arg(short, long)]
    simulations: Option<usize>,

    /// Worker threads per search.
    #[arg(short, long)]
    workers: Option<usize>,

    /// Random seed for reproducibility.
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Play the engine against a random opponent.
    Play {
        /// Number of games to play.
        #[arg(short, long, default_value = "10")]
        games: usize,

        /// Board rows and columns.
        #[arg(long, default_value_t = DEFAULT_BOARD_SIZE)]
        board_size: usize,

        /// Stones in a row needed to win.
        #[arg(long, default_value_t = DEFAULT_WIN_LENGTH)]
        win_length: usize,

        /// Temperature for move selection (1.0 = proportional to visit counts).
        #[arg(short, long, default_value = "0.0")]
        temperature: f32,

        /// Move number after which temperature drops to 0 (greedy).
        #[arg(long, default_value = "0")]
        temperature_drop: usize,

        /// Output directory for game records.
        #[arg(short, long, default_value = "data/games")]
        output: PathBuf,

        #[command(flatten)]
        search: SearchArgs,
    },

    /// Search the final position of a saved game.
    Analyze {
        /// Game record written by `play`.
        record: PathBuf,

        #[command(flatten)]
        search: SearchArgs,
    },
}

fn init_tracing(level: &str) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}

/// Load `path` (if any) and apply the command-line overrides.
///
/// Without a config file the search uses evaluation settings: no root
/// noise, most visited move.
fn load_config(args: &SearchArgs) -> Result<SearchConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            parse_config(&text).with_context(|| format!("Invalid config file: {:?}", path))?
        }
        None => SearchConfig::for_evaluation(SearchConfig::default().num_simulations),
    };

    if let Some(simulations) = args.simulations {
        config.num_simulations = simulations;
    }
    if let Some(workers) = args.workers {
        config.num_workers = workers;
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }

    config.validate()?;
    Ok(config)
}

fn parse_config(text: &str) -> Result<SearchConfig> {
    Ok(toml::from_str(text)?)
}

/// Match results from the engine's point of view.
#[derive(Debug, Default, PartialEq)]
struct MatchSummary {
    engine_wins: usize,
    random_wins: usize,
    draws: usize,
}

impl MatchSummary {
    fn record(&mut self, winner: Option<Stone>, engine_colour: Stone) {
        match winner {
            Some(stone) if stone == engine_colour => self.engine_wins += 1,
            Some(_) => self.random_wins += 1,
            None => self.draws += 1,
        }
    }

    fn total(&self) -> usize {
        self.engine_wins + self.random_wins + self.draws
    }

    fn win_rate(&self) -> f32 {
        if self.total() == 0 {
            0.0
        } else {
            self.engine_wins as f32 / self.total() as f32
        }
    }
}

/// Colour the engine plays in game `index`. Colours alternate for fairness.
fn engine_colour(index: usize) -> Stone {
    if index % 2 == 0 {
        Stone::Black
    } else {
        Stone::White
    }
}

/// Play one game from `start` between the engine and a random player.
fn play_game(
    start: &Gomoku,
    config: &SearchConfig,
    engine_colour: Stone,
    temperature: f32,
    temperature_drop: usize,
) -> Result<GameRecord> {
    let mut engine = MctsPlayer::new(config.clone(), temperature, temperature_drop)?;
    let mut random = RandomPlayer::new(config.seed.wrapping_add(7));

    let mut game = start.clone();
    while !game.is_done() {
        let player: &mut dyn Player = if game.current_player() == engine_colour {
            &mut engine
        } else {
            &mut random
        };
        let action = player.choose(&game)?;
        debug!(player = player.name(), action, "move");
        game.step(action)?;
    }

    Ok(GameRecord::from_game(&game))
}

fn cmd_play(
    games: usize,
    board_size: usize,
    win_length: usize,
    temperature: f32,
    temperature_drop: usize,
    output: PathBuf,
    config: SearchConfig,
) -> Result<()> {
    let start = Gomoku::with_size(board_size, board_size, win_length)?;
    fs::create_dir_all(&output)
        .with_context(|| format!("Failed to create output directory: {:?}", output))?;

    info!(
        games,
        board_size,
        win_length,
        simulations = config.num_simulations,
        workers = config.num_workers,
        seed = config.seed,
        "starting match"
    );
    let started = Instant::now();

    let records: Vec<GameRecord> = (0..games)
        .into_par_iter()
        .map(|i| {
            let game_config = SearchConfig {
                seed: config.seed.wrapping_add(i as u64 * 1000),
                ..config.clone()
            };
            play_game(&start, &game_config, engine_colour(i), temperature, temperature_drop)
                .with_context(|| format!("Game {} failed", i))
        })
        .collect::<Result<_>>()?;

    let mut summary = MatchSummary::default();
    for (i, record) in records.iter().enumerate() {
        summary.record(record.winner, engine_colour(i));

        let filename = output.join(format!("game_{:06}.json", i));
        fs::write(&filename, record.to_json()?)
            .with_context(|| format!("Failed to write file: {:?}", filename))?;
    }

    let total_moves: usize = records.iter().map(|r| r.moves.len()).sum();
    println!("\nCompleted in {:.2}s", started.elapsed().as_secs_f64());
    println!("Games played: {}", summary.total());
    println!(
        "Average game length: {:.1} moves",
        total_moves as f64 / games.max(1) as f64
    );
    println!("Files saved to: {:?}", output);
    println!(
        "\nEngine wins: {}, Random wins: {}, Draws: {}",
        summary.engine_wins, summary.random_wins, summary.draws
    );
    println!("Win rate: {:.1}%", summary.win_rate() * 100.0);

    Ok(())
}

fn cmd_analyze(record: &Path, config: SearchConfig) -> Result<()> {
    let json = fs::read_to_string(record)
        .with_context(|| format!("Failed to read game record: {:?}", record))?;
    let game = GameRecord::from_json(&json)?
        .replay()
        .with_context(|| format!("Game record does not replay: {:?}", record))?;

    println!("{game}");
    if game.is_done() {
        bail!("Game is already over ({:?})", game.outcome());
    }

    let mut mcts: Mcts<Gomoku> = Mcts::new(config)?.with_logger(TracingLogger);
    let result = mcts.search(&game)?;
    let (row, col) = game.position_of(result.best_action);

    println!(
        "{} to play: ({}, {}) after {} simulations, root value {:+.3}",
        game.current_player(),
        row,
        col,
        result.simulations,
        result.root_value
    );
    for cells in result.value_grid(game.rows(), game.cols()) {
        let rendered: Vec<String> = cells.iter().map(|v| format!("{v:+.2}")).collect();
        println!("{}", rendered.join(" "));
    }

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    match cli.command {
        Commands::Play {
            games,
            board_size,
            win_length,
            temperature,
            temperature_drop,
            output,
            search,
        } => cmd_play(
            games,
            board_size,
            win_length,
            temperature,
            temperature_drop,
            output,
            load_config(&search)?,
        ),

        Commands::Analyze { record, search } => cmd_analyze(&record, load_config(&search)?),
    }
}
