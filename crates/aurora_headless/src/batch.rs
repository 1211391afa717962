//! Batch game runner for balance testing.
//!
//! Runs many seeded games in parallel using rayon and aggregates their
//! metrics into a [`BatchSummary`].

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use aurora_core::content::ContentTables;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::game_runner::{run_game, GameConfig, DEFAULT_MAX_ACTIONS};
use crate::metrics::{BatchSummary, GameMetrics, GameOutcome};
use crate::strategies::Strategy;

/// Configuration for a batch run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Number of games to run.
    pub game_count: u32,
    /// Maximum parallel games (0 = use rayon default).
    pub parallel_games: u32,
    /// Seed of the first game; game `i` uses `seed_start + i`.
    pub seed_start: u64,
    /// Strategy played by every game.
    pub strategy: Strategy,
    /// Action budget per game.
    pub max_actions: u32,
    /// Output directory for results.
    pub output_dir: PathBuf,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            game_count: 100,
            parallel_games: 0,
            seed_start: 0,
            strategy: Strategy::default(),
            max_actions: DEFAULT_MAX_ACTIONS,
            output_dir: PathBuf::from("results"),
        }
    }
}

impl BatchConfig {
    /// Config for `game_count` games with defaults elsewhere.
    #[must_use]
    pub fn new(game_count: u32) -> Self {
        Self {
            game_count,
            ..Default::default()
        }
    }

    /// Set output directory.
    #[must_use]
    pub fn with_output(mut self, dir: PathBuf) -> Self {
        self.output_dir = dir;
        self
    }

    /// Set seed start.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed_start = seed;
        self
    }

    /// Set the strategy.
    #[must_use]
    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Set the thread count.
    #[must_use]
    pub fn with_threads(mut self, threads: u32) -> Self {
        self.parallel_games = threads;
        self
    }
}

/// Results from a batch run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResults {
    /// Configuration used.
    pub config: BatchConfig,
    /// Individual game metrics, ordered by seed.
    pub games: Vec<GameMetrics>,
    /// Aggregate summary.
    pub summary: BatchSummary,
    /// Total runtime.
    pub duration_seconds: f64,
    /// Games that could not be started.
    pub errors: Vec<BatchError>,
}

impl BatchResults {
    /// Save results to a JSON file.
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }

    /// Load results from a JSON file.
    pub fn load(path: &Path) -> std::io::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        serde_json::from_str(&json).map_err(std::io::Error::other)
    }
}

/// A game that failed to run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchError {
    /// Game index.
    pub game_index: u32,
    /// Seed used.
    pub seed: u64,
    /// Error message.
    pub message: String,
}

/// Progress tracking shared across worker threads.
#[derive(Debug)]
pub struct BatchProgress {
    /// Total games.
    pub total: u32,
    completed: AtomicU32,
    cleared: AtomicU32,
    start_time: Instant,
}

impl BatchProgress {
    /// Create a new progress tracker.
    #[must_use]
    pub fn new(total: u32) -> Self {
        Self {
            total,
            completed: AtomicU32::new(0),
            cleared: AtomicU32::new(0),
            start_time: Instant::now(),
        }
    }

    /// Record a finished game.
    pub fn record(&self, outcome: GameOutcome) {
        self.completed.fetch_add(1, Ordering::Relaxed);
        if outcome == GameOutcome::Completed {
            self.cleared.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Games finished so far.
    #[must_use]
    pub fn current(&self) -> u32 {
        self.completed.load(Ordering::Relaxed)
    }

    /// Completion percentage.
    #[must_use]
    pub fn percentage(&self) -> f64 {
        f64::from(self.current()) / f64::from(self.total.max(1)) * 100.0
    }

    /// Fraction of finished games where every round was won.
    #[must_use]
    pub fn clear_rate(&self) -> f64 {
        let completed = self.current();
        if completed == 0 {
            return 0.0;
        }
        f64::from(self.cleared.load(Ordering::Relaxed)) / f64::from(completed)
    }

    /// Estimated time remaining.
    #[must_use]
    pub fn eta(&self) -> Duration {
        let completed = self.current();
        if completed == 0 {
            return Duration::ZERO;
        }
        let per_game = self.start_time.elapsed().as_secs_f64() / f64::from(completed);
        let remaining = self.total.saturating_sub(completed);
        Duration::from_secs_f64(per_game * f64::from(remaining))
    }

    /// Display progress to stderr.
    pub fn display(&self) {
        let eta = self.eta();
        eprintln!("╔════════════════════════════════════╗");
        eprintln!(
            "║ Batch Progress: {:>4}/{:<4} ({:>5.1}%) ║",
            self.current(),
            self.total,
            self.percentage()
        );
        eprintln!(
            "║ ETA: {:>28} ║",
            format!("{}m {}s", eta.as_secs() / 60, eta.as_secs() % 60)
        );
        eprintln!("║ Clear rate: {:>21.1}% ║", self.clear_rate() * 100.0);
        eprintln!("╚════════════════════════════════════╝");
    }
}

fn run_single_game(
    index: u32,
    config: &BatchConfig,
    content: &Arc<ContentTables>,
) -> Result<GameMetrics, BatchError> {
    let seed = config.seed_start.wrapping_add(u64::from(index));
    let game = GameConfig {
        max_actions: config.max_actions,
        content: Arc::clone(content),
        ..GameConfig::new(seed).with_strategy(config.strategy.clone())
    };
    run_game(game)
        .map(|result| result.metrics)
        .map_err(|e| BatchError {
            game_index: index,
            seed,
            message: e.to_string(),
        })
}

/// Run a batch of games.
#[must_use]
pub fn run_batch(config: BatchConfig) -> BatchResults {
    let start = Instant::now();
    let progress = BatchProgress::new(config.game_count);
    let content = Arc::new(ContentTables::builtin().clone());

    info!(
        games = config.game_count,
        seed_start = config.seed_start,
        strategy = %config.strategy.name,
        "Starting batch run"
    );

    let play = || -> Vec<Result<GameMetrics, BatchError>> {
        (0..config.game_count)
            .into_par_iter()
            .map(|i| {
                let result = run_single_game(i, &config, &content);
                match &result {
                    Ok(metrics) => {
                        progress.record(metrics.outcome);
                        let completed = progress.current();
                        if completed % 10 == 0 {
                            debug!(completed, total = config.game_count, "Progress");
                        }
                        if completed % 100 == 0 {
                            progress.display();
                        }
                    }
                    Err(e) => warn!(game = i, seed = e.seed, error = %e.message, "Game failed"),
                }
                result
            })
            .collect()
    };

    let results = if config.parallel_games > 0 {
        match rayon::ThreadPoolBuilder::new()
            .num_threads(config.parallel_games as usize)
            .build()
        {
            Ok(pool) => pool.install(play),
            Err(e) => {
                warn!(error = %e, "Could not build thread pool, using the global one");
                play()
            }
        }
    } else {
        play()
    };

    let mut games = Vec::with_capacity(results.len());
    let mut errors = Vec::new();
    for result in results {
        match result {
            Ok(metrics) => games.push(metrics),
            Err(e) => errors.push(e),
        }
    }

    let summary = BatchSummary::from_games(&games);
    let duration_seconds = start.elapsed().as_secs_f64();

    info!(
        games = games.len(),
        seconds = duration_seconds,
        win_rate = summary.win_rate,
        "Batch complete"
    );

    BatchResults {
        config,
        games,
        summary,
        duration_seconds,
        errors,
    }
}

/// Run the same seed `runs` times and check every game ends in the same state.
#[must_use]
pub fn verify_determinism(seed: u64, runs: u32, strategy: &Strategy) -> bool {
    let hashes: Vec<Option<u64>> = (0..runs)
        .map(|_| {
            run_game(GameConfig::new(seed).with_strategy(strategy.clone()))
                .ok()
                .map(|result| result.metrics.final_state_hash)
        })
        .collect();

    match hashes.first() {
        Some(Some(first)) => hashes.iter().all(|h| *h == Some(*first)),
        _ => false,
    }
}
