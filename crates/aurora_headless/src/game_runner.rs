//! Whole-game execution for headless testing.
//!
//! Plays a seeded battle to completion with a [`Strategy`] driving both
//! players, collecting [`GameMetrics`] and a replay along the way.
//!
//! Every loop is bounded by `max_actions` so a strategy that stalls can
//! never hang a batch.

use std::sync::Arc;

use aurora_core::content::ContentTables;
use aurora_core::prelude::*;
use tracing::{debug, info, warn};

use crate::metrics::{GameMetrics, MetricsCollector};
use crate::strategies::Strategy;

/// Default cap on submitted actions per game.
pub const DEFAULT_MAX_ACTIONS: u32 = 2_000;

/// Configuration for a single game run.
#[derive(Debug, Clone)]
pub struct GameConfig {
    /// Random seed for determinism.
    pub seed: u64,
    /// Player 1 name.
    pub player1: String,
    /// Player 2 name.
    pub player2: String,
    /// Strategy for both players.
    pub strategy: Strategy,
    /// Maximum actions before the game is abandoned.
    pub max_actions: u32,
    /// Content tables to play on.
    pub content: Arc<ContentTables>,
    /// Game ID for tracking.
    pub game_id: String,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new(0)
    }
}

impl GameConfig {
    /// Built-in content, balanced strategy and default names.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            player1: "Player 1".to_string(),
            player2: "Player 2".to_string(),
            strategy: Strategy::default(),
            max_actions: DEFAULT_MAX_ACTIONS,
            content: Arc::new(ContentTables::builtin().clone()),
            game_id: format!("game_{seed}"),
        }
    }

    /// Set the strategy.
    #[must_use]
    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Set the player names.
    #[must_use]
    pub fn with_players(mut self, player1: &str, player2: &str) -> Self {
        self.player1 = player1.to_string();
        self.player2 = player2.to_string();
        self
    }
}

/// Result of a completed game run.
#[derive(Debug, Clone)]
pub struct GameResult {
    /// Collected metrics.
    pub metrics: GameMetrics,
    /// Final battle state.
    pub final_state: BattleState,
    /// Recorded inputs, finalized with the final hash.
    pub replay: Replay,
}

/// Run a complete game.
pub fn run_game(config: GameConfig) -> Result<GameResult> {
    let mut battle = Battle::with_rng(
        Arc::clone(&config.content),
        &config.player1,
        &config.player2,
        SeededRng::new(config.seed),
        config.seed,
    )?;
    let mut collector = MetricsCollector::new(&config.game_id, &config.strategy.name, config.seed);

    info!(
        game = %config.game_id,
        seed = config.seed,
        strategy = %config.strategy.name,
        "Starting game"
    );

    let mut actions = 0;
    while actions < config.max_actions {
        let state = battle.state().clone();
        if state.is_finished() {
            break;
        }

        if state.phase == Phase::Victory {
            let next = battle.advance_round().clone();
            collector.on_advance(&state, &next);
            debug!(round = next.round, score = next.total_score, "Round advanced");
            continue;
        }

        let Some(actor) = state.turn_phase.actor() else {
            warn!(turn_phase = %state.turn_phase, "Battle resting in an automatic phase");
            break;
        };

        let planned = match config.strategy.choose_item(&state) {
            Some(item) => (ActionKind::Item, item),
            None => {
                let action = config.strategy.choose(&state, actor, &config.content);
                (action.kind, action.ability)
            }
        };
        let result = battle.dispatch(actor, planned.0, &planned.1);
        actions += 1;
        collector.on_action(planned.0, result.accepted, &state, battle.state());
        if !result.accepted {
            debug!(%actor, ability = %planned.1, "Action rejected, waiting instead");
            let before = battle.state().clone();
            let result = battle.dispatch(actor, ActionKind::Skip, "");
            actions += 1;
            collector.on_action(ActionKind::Skip, result.accepted, &before, battle.state());
        }
    }

    let final_state = battle.state().clone();
    let metrics = collector.finalize(&final_state);
    info!(
        game = %config.game_id,
        outcome = ?metrics.outcome,
        rounds = metrics.rounds_cleared,
        score = metrics.total_score,
        "Game finished"
    );

    Ok(GameResult {
        metrics,
        replay: battle.replay(),
        final_state,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::GameOutcome;

    #[test]
    fn test_game_runs_to_an_end() {
        let result = run_game(GameConfig::new(1)).unwrap();
        let state = &result.final_state;
        assert!(state.is_finished() || result.metrics.outcome == GameOutcome::Timeout);
        assert_eq!(result.metrics.total_score, state.total_score);
        assert_eq!(result.metrics.final_state_hash, state.state_hash());
        assert!(result.metrics.actions > 0);
    }

    #[test]
    fn test_same_seed_same_game() {
        let a = run_game(GameConfig::new(77)).unwrap();
        let b = run_game(GameConfig::new(77)).unwrap();
        assert_eq!(a.metrics, b.metrics);
        assert_eq!(a.final_state, b.final_state);
    }

    #[test]
    fn test_replay_reproduces_game() {
        let result = run_game(GameConfig::new(5).with_players("Ada", "Bo")).unwrap();
        assert!(result.replay.verify().unwrap());
        assert_eq!(result.replay.play(), result.final_state);
    }

    #[test]
    fn test_action_budget_is_respected() {
        let config = GameConfig {
            max_actions: 3,
            ..GameConfig::new(9)
        };
        let result = run_game(config).unwrap();
        assert!(result.metrics.actions <= 4);
        assert_eq!(result.metrics.outcome, GameOutcome::Timeout);
    }

    #[test]
    fn test_every_preset_plays() {
        for name in Strategy::preset_names() {
            let strategy = Strategy::preset(name).unwrap();
            let result = run_game(GameConfig::new(3).with_strategy(strategy)).unwrap();
            assert_eq!(result.metrics.strategy.to_lowercase(), *name);
        }
    }
}
