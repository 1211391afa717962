//! Headless runner for Aurora Protocol.
//!
//! Plays whole games without a presentation layer so the battle engine can
//! be exercised by scripts and CI:
//!
//! - **Auto-play**: data-driven [`Strategy`] presets drive both players
//! - **Balance batches**: many seeded games in parallel, summarized as JSON
//! - **Replay verification**: re-run a recorded game and compare hashes
//! - **High scores**: a persistent top-ten table
//!
//! # Example
//!
//! ```bash
//! # Play one game and print the battle log
//! cargo run -p aurora_headless -- play --seed 7 --log
//!
//! # Run a balance batch
//! cargo run -p aurora_headless -- batch --count 1000 --strategy aggressive
//!
//! # Verify determinism
//! cargo run -p aurora_headless -- verify --seed 12345 --runs 5
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod batch;
pub mod game_runner;
pub mod highscores;
pub mod metrics;
pub mod strategies;

pub use batch::{run_batch, verify_determinism, BatchConfig, BatchResults};
pub use game_runner::{run_game, GameConfig, GameResult};
pub use highscores::{HighScore, HighScoreError, HighScoreTable};
pub use metrics::{BatchSummary, GameMetrics, GameOutcome, MetricsCollector};
pub use strategies::{Strategy, StrategyError};
