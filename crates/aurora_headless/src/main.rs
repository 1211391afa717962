//! Headless Aurora Protocol runner.
//!
//! Plays games without a presentation layer for CI, balance testing and
//! replay verification. Logs go to stderr; reports go to stdout.
//!
//! # Usage
//!
//! ```bash
//! # Play one seeded game, save its replay and record the score
//! cargo run -p aurora_headless -- play --seed 42 --replay game.replay --scores scores.json
//!
//! # Run a batch of 500 games with the cautious preset
//! cargo run -p aurora_headless -- batch --count 500 --strategy cautious --output results/
//!
//! # Check a replay still reproduces
//! cargo run -p aurora_headless -- replay --file game.replay --verify
//! ```

use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::filter::{EnvFilter, LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use aurora_core::content::ContentTables;
use aurora_core::replay::Replay;
use aurora_headless::{
    batch::{run_batch, verify_determinism, BatchConfig},
    game_runner::{run_game, GameConfig, DEFAULT_MAX_ACTIONS},
    highscores::HighScoreTable,
    metrics::GameOutcome,
    strategies::{Strategy, StrategyError},
};

#[derive(Parser)]
#[command(name = "aurora_headless")]
#[command(about = "Headless Aurora Protocol runner for auto-play, balance and replays")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Auto-play a single game
    Play {
        /// Random seed
        #[arg(long, default_value = "0")]
        seed: u64,

        /// Player 1 (offense) name
        #[arg(long, default_value = "Player 1")]
        player1: String,

        /// Player 2 (defense) name
        #[arg(long, default_value = "Player 2")]
        player2: String,

        /// Strategy preset
        #[arg(short, long, default_value = "balanced")]
        strategy: String,

        /// Strategy RON file (overrides the preset)
        #[arg(long)]
        strategy_file: Option<PathBuf>,

        /// Content RON file (defaults to the built-in tables)
        #[arg(long)]
        content: Option<PathBuf>,

        /// Action budget
        #[arg(long, default_value_t = DEFAULT_MAX_ACTIONS)]
        max_actions: u32,

        /// Write the replay here
        #[arg(long)]
        replay: Option<PathBuf>,

        /// Record the final score in this high-score file
        #[arg(long)]
        scores: Option<PathBuf>,

        /// Print the full battle log
        #[arg(long)]
        log: bool,
    },

    /// Run a batch of games for balance testing
    Batch {
        /// Number of games to run
        #[arg(short, long, default_value = "100")]
        count: u32,

        /// Maximum parallel games (0 = auto)
        #[arg(short, long, default_value = "0")]
        parallel: u32,

        /// Output directory for results
        #[arg(short, long, default_value = "results")]
        output: PathBuf,

        /// Starting random seed
        #[arg(long, default_value = "0")]
        seed: u64,

        /// Strategy preset
        #[arg(short, long, default_value = "balanced")]
        strategy: String,

        /// Strategy RON file (overrides the preset)
        #[arg(long)]
        strategy_file: Option<PathBuf>,

        /// Action budget per game
        #[arg(long, default_value_t = DEFAULT_MAX_ACTIONS)]
        max_actions: u32,
    },

    /// Verify determinism by running the same seed multiple times
    Verify {
        /// Seed to verify
        #[arg(long, default_value = "12345")]
        seed: u64,

        /// Number of verification runs
        #[arg(short, long, default_value = "5")]
        runs: u32,

        /// Strategy preset
        #[arg(short, long, default_value = "balanced")]
        strategy: String,
    },

    /// Replay a recorded game
    Replay {
        /// Replay file path
        #[arg(short, long)]
        file: PathBuf,

        /// Verify the replay reproduces the recorded hash
        #[arg(long)]
        verify: bool,

        /// Print the full battle log
        #[arg(long)]
        log: bool,
    },

    /// Show the high-score table
    Scores {
        /// High-score file
        #[arg(short, long, default_value = "highscores.json")]
        file: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true),
        )
        .with(filter)
        .init();

    match cli.command {
        Commands::Play {
            seed,
            player1,
            player2,
            strategy,
            strategy_file,
            content,
            max_actions,
            replay,
            scores,
            log,
        } => {
            let strategy = resolve_strategy(&strategy, strategy_file.as_deref());
            let content = match content {
                Some(path) => match ContentTables::load(&path) {
                    Ok(tables) => tables,
                    Err(e) => fatal(&format!("Cannot load content '{}': {e}", path.display())),
                },
                None => ContentTables::builtin().clone(),
            };
            let config = GameConfig {
                max_actions,
                content: Arc::new(content),
                ..GameConfig::new(seed)
                    .with_players(&player1, &player2)
                    .with_strategy(strategy)
            };
            cmd_play(config, replay.as_deref(), scores.as_deref(), log);
        }
        Commands::Batch {
            count,
            parallel,
            output,
            seed,
            strategy,
            strategy_file,
            max_actions,
        } => {
            let config = BatchConfig {
                game_count: count,
                parallel_games: parallel,
                seed_start: seed,
                strategy: resolve_strategy(&strategy, strategy_file.as_deref()),
                max_actions,
                output_dir: output,
            };
            cmd_batch(config);
        }
        Commands::Verify {
            seed,
            runs,
            strategy,
        } => {
            cmd_verify(seed, runs, &resolve_strategy(&strategy, None));
        }
        Commands::Replay { file, verify, log } => {
            cmd_replay(&file, verify, log);
        }
        Commands::Scores { file } => {
            cmd_scores(file);
        }
    }
}

fn fatal(message: &str) -> ! {
    tracing::error!("{message}");
    eprintln!("FATAL: {message}");
    process::exit(1);
}

fn resolve_strategy(preset: &str, file: Option<&Path>) -> Strategy {
    let loaded: Result<Strategy, StrategyError> = match file {
        Some(path) => Strategy::load(path),
        None => Strategy::preset(preset),
    };
    let strategy = match loaded {
        Ok(strategy) => strategy,
        Err(e) => fatal(&e.to_string()),
    };
    for problem in strategy.validate(ContentTables::builtin()) {
        tracing::warn!(strategy = %strategy.name, "{problem}");
    }
    strategy
}

/// Play one game and report it
fn cmd_play(config: GameConfig, replay: Option<&Path>, scores: Option<&Path>, log: bool) {
    let players = (config.player1.clone(), config.player2.clone());
    let result = match run_game(config) {
        Ok(result) => result,
        Err(e) => fatal(&format!("Game failed to start: {e}")),
    };

    if log {
        for line in &result.final_state.battle_log {
            println!("{line}");
        }
        println!();
    }

    let metrics = &result.metrics;
    println!("{}", "=".repeat(50));
    println!("GAME OVER: {:?}", metrics.outcome);
    println!("{}", "=".repeat(50));
    println!("Seed: {}", metrics.seed);
    println!("Strategy: {}", metrics.strategy);
    println!("Rounds cleared: {}", metrics.rounds_cleared);
    println!("Total score: {}", metrics.total_score);
    println!(
        "Actions: {} ({} rejected)",
        metrics.actions, metrics.rejected_actions
    );
    println!(
        "Items: {} found, {} used",
        metrics.items_found, metrics.items_used
    );
    for round in &metrics.rounds {
        println!(
            "  Round {} vs {:<18} {:<4} turns={:<3} dealt={:<4} taken={:<4} score={}",
            round.round,
            round.enemy,
            if round.won { "WON" } else { "LOST" },
            round.turns,
            round.damage_dealt,
            round.damage_taken,
            round.score
        );
    }
    if let Some(enemy) = &metrics.defeated_by {
        println!("Defeated by: {enemy}");
    }
    println!("State hash: {:016x}", metrics.final_state_hash);

    if let Some(path) = replay {
        if let Err(e) = result.replay.save(path) {
            fatal(&format!("Failed to save replay: {e}"));
        }
        println!("Replay saved to: {}", path.display());
    }

    if let Some(path) = scores {
        if metrics.outcome == GameOutcome::Timeout {
            tracing::warn!("Game timed out, score not recorded");
            return;
        }
        let mut table = match HighScoreTable::open(path) {
            Ok(table) => table,
            Err(e) => fatal(&e.to_string()),
        };
        match table.record(&players.0, &players.1, metrics.total_score) {
            Ok(Some(rank)) => println!("New high score! Rank #{rank}"),
            Ok(None) => println!("Score did not make the top {}", table.entries().len()),
            Err(e) => fatal(&e.to_string()),
        }
    }
}

/// Run a batch of games for balance testing
fn cmd_batch(config: BatchConfig) {
    let output = config.output_dir.clone();
    let num_cpus = std::thread::available_parallelism()
        .map(|p| p.get())
        .unwrap_or(1);

    tracing::info!(
        count = config.game_count,
        parallel = config.parallel_games,
        seed = config.seed_start,
        strategy = %config.strategy.name,
        max_actions = config.max_actions,
        output = %output.display(),
        cpus_available = num_cpus,
        "Batch configuration"
    );

    if let Err(e) = std::fs::create_dir_all(&output) {
        fatal(&format!(
            "Cannot create output directory '{}': {e}",
            output.display()
        ));
    }

    let results = run_batch(config);

    let results_path = output.join("batch_results.json");
    if let Err(e) = results.save(&results_path) {
        fatal(&format!("Failed to save results: {e}"));
    }

    let summary = &results.summary;
    eprintln!("\n{}", "=".repeat(50));
    eprintln!("BATCH COMPLETE");
    eprintln!("{}", "=".repeat(50));
    eprintln!("Games played: {}", results.games.len());
    if !results.errors.is_empty() {
        eprintln!("Games FAILED: {}", results.errors.len());
    }
    eprintln!("Duration: {:.1}s", results.duration_seconds);
    eprintln!(
        "Throughput: {:.1} games/sec",
        results.games.len() as f64 / results.duration_seconds.max(0.001)
    );
    eprintln!(
        "\nCompleted: {} | Defeated: {} | Timed out: {}",
        summary.completed, summary.defeats, summary.timeouts
    );
    eprintln!("Win rate: {:.1}%", summary.win_rate * 100.0);
    eprintln!(
        "Score: avg {:.1}, min {}, max {}",
        summary.avg_score, summary.min_score, summary.max_score
    );
    eprintln!("Rounds cleared: avg {:.2}", summary.avg_rounds_cleared);
    if !summary.defeats_by_enemy.is_empty() {
        eprintln!("\nDefeats by enemy:");
        for (enemy, count) in &summary.defeats_by_enemy {
            eprintln!("  {enemy}: {count}");
        }
    }

    if !results.errors.is_empty() {
        eprintln!("\nGAME FAILURES:");
        for error in results.errors.iter().take(10) {
            eprintln!(
                "  Game {} (seed {}): {}",
                error.game_index, error.seed, error.message
            );
        }
        if results.errors.len() > 10 {
            eprintln!("  ... and {} more failures", results.errors.len() - 10);
        }
    }

    eprintln!("\nResults saved to: {}", results_path.display());
}

/// Verify determinism
fn cmd_verify(seed: u64, runs: u32, strategy: &Strategy) {
    tracing::info!(seed, runs, strategy = %strategy.name, "Verifying determinism");

    if verify_determinism(seed, runs, strategy) {
        println!("PASS: {runs} runs of seed {seed} produced identical results");
    } else {
        eprintln!("FAIL: Non-deterministic results detected for seed {seed}");
        process::exit(1);
    }
}

/// Replay a recorded game
fn cmd_replay(file: &Path, verify: bool, log: bool) {
    let replay = match Replay::load(file) {
        Ok(replay) => replay,
        Err(e) => fatal(&format!("Failed to load replay: {e}")),
    };
    tracing::info!(
        seed = replay.seed,
        steps = replay.step_count(),
        "Loaded replay"
    );

    let state = replay.play();
    if log {
        for line in &state.battle_log {
            println!("{line}");
        }
        println!();
    }
    println!(
        "{} & {} | seed {} | {} steps",
        replay.player1,
        replay.player2,
        replay.seed,
        replay.step_count()
    );
    println!(
        "Final: round {} {} | score {} | hash {:016x}",
        state.round,
        state.phase,
        state.total_score,
        state.state_hash()
    );

    if verify {
        match replay.verify() {
            Ok(true) => println!("PASS: replay reproduces hash {:016x}", state.state_hash()),
            Ok(false) => {
                let expected = replay
                    .final_hash
                    .map_or_else(|| "none".to_string(), |h| format!("{h:016x}"));
                eprintln!(
                    "FAIL: expected hash {expected}, got {:016x}",
                    state.state_hash()
                );
                process::exit(1);
            }
            Err(e) => fatal(&e.to_string()),
        }
    }
}

/// Show the high-score table
fn cmd_scores(file: PathBuf) {
    let table = match HighScoreTable::open(file) {
        Ok(table) => table,
        Err(e) => fatal(&e.to_string()),
    };
    if table.entries().is_empty() {
        println!("No high scores yet.");
        return;
    }
    println!("{:<4} {:>8}  {:<24} {}", "#", "SCORE", "TEAM", "DATE");
    for (i, entry) in table.entries().iter().enumerate() {
        println!(
            "{:<4} {:>8}  {:<24} {}",
            i + 1,
            entry.score,
            format!("{} & {}", entry.player1, entry.player2),
            entry.date.format("%Y-%m-%d %H:%M")
        );
    }
}
