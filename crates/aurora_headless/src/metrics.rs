//! Game metrics collection for balance analysis.
//!
//! Metrics are derived from successive battle states, so the collector
//! never needs hooks inside the core.

use std::collections::BTreeMap;

use aurora_core::prelude::{ActionKind, BattleState, Phase};
use serde::{Deserialize, Serialize};

/// How a game ended.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameOutcome {
    /// All rounds won.
    Completed,
    /// Aurora was defeated.
    Defeated,
    /// The action budget ran out first.
    #[default]
    Timeout,
}

/// Metrics for one round.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundMetrics {
    /// Round number.
    pub round: u32,
    /// Enemy faced.
    pub enemy: String,
    /// Whether the enemy was defeated.
    pub won: bool,
    /// Full turns played.
    pub turns: u32,
    /// Damage dealt to the enemy.
    pub damage_dealt: u32,
    /// Damage Aurora took after shields.
    pub damage_taken: u32,
    /// Critical hits landed by player 1.
    pub critical_hits: u32,
    /// Distinct abilities used.
    pub distinct_abilities: u32,
    /// Score banked for the round (0 if lost).
    pub score: u64,
    /// Aurora's health when the round ended.
    pub health_left: u32,
}

/// Complete metrics for a single game.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameMetrics {
    /// Unique game identifier.
    pub game_id: String,
    /// Strategy name.
    pub strategy: String,
    /// Random seed used.
    pub seed: u64,
    /// How the game ended.
    pub outcome: GameOutcome,
    /// Rounds won.
    pub rounds_cleared: u32,
    /// Final total score.
    pub total_score: u64,
    /// Player actions submitted.
    pub actions: u32,
    /// Actions the battle rejected.
    pub rejected_actions: u32,
    /// Items picked up from loot drops.
    pub items_found: u32,
    /// Items consumed.
    pub items_used: u32,
    /// Per-round breakdown.
    pub rounds: Vec<RoundMetrics>,
    /// Enemy that defeated Aurora.
    pub defeated_by: Option<String>,
    /// Final battle state hash (for determinism validation).
    pub final_state_hash: u64,
}

impl GameMetrics {
    /// Create a new game metrics instance.
    #[must_use]
    pub fn new(game_id: impl Into<String>, strategy: impl Into<String>, seed: u64) -> Self {
        Self {
            game_id: game_id.into(),
            strategy: strategy.into(),
            seed,
            ..Default::default()
        }
    }

    /// Full turns played across all rounds.
    #[must_use]
    pub fn total_turns(&self) -> u32 {
        self.rounds.iter().map(|r| r.turns).sum()
    }

    /// Damage dealt across all rounds.
    #[must_use]
    pub fn total_damage_dealt(&self) -> u64 {
        self.rounds.iter().map(|r| u64::from(r.damage_dealt)).sum()
    }
}

/// Builds [`GameMetrics`] by observing a battle from the outside.
#[derive(Debug, Clone)]
pub struct MetricsCollector {
    metrics: GameMetrics,
}

impl MetricsCollector {
    /// Create a new collector.
    #[must_use]
    pub fn new(game_id: &str, strategy: &str, seed: u64) -> Self {
        Self {
            metrics: GameMetrics::new(game_id, strategy, seed),
        }
    }

    /// Record one dispatched action given the engine's verdict and the
    /// states around it.
    pub fn on_action(
        &mut self,
        kind: ActionKind,
        accepted: bool,
        before: &BattleState,
        after: &BattleState,
    ) {
        self.metrics.actions += 1;
        if !accepted {
            self.metrics.rejected_actions += 1;
            return;
        }

        let held_before = before.aurora.available_items.len();
        let held_after = after.aurora.available_items.len();
        if kind == ActionKind::Item {
            self.metrics.items_used += 1;
        } else if held_after > held_before {
            self.metrics.items_found += (held_after - held_before) as u32;
        }

        if after.phase.is_terminal() && !before.phase.is_terminal() {
            self.on_round_end(after);
        }
    }

    /// Record the score banked by a round advance.
    pub fn on_advance(&mut self, before: &BattleState, after: &BattleState) {
        let gained = after.total_score.saturating_sub(before.total_score);
        if let Some(round) = self.metrics.rounds.last_mut() {
            if round.round == before.round && round.won {
                round.score = gained;
            }
        }
    }

    fn on_round_end(&mut self, state: &BattleState) {
        let won = state.phase == Phase::Victory;
        let stats = &state.battle_stats;
        self.metrics.rounds.push(RoundMetrics {
            round: state.round,
            enemy: state.current_enemy.name().to_string(),
            won,
            turns: stats.turns_elapsed,
            damage_dealt: stats.damage_dealt,
            damage_taken: stats.damage_taken,
            critical_hits: stats.critical_hits,
            distinct_abilities: stats.abilities_used.len() as u32,
            score: 0,
            health_left: state.aurora.health,
        });
        if won {
            self.metrics.rounds_cleared += 1;
        } else {
            self.metrics.defeated_by = Some(state.current_enemy.name().to_string());
        }
    }

    /// Finalize with the last state observed.
    #[must_use]
    pub fn finalize(mut self, state: &BattleState) -> GameMetrics {
        self.metrics.outcome = if state.game_complete {
            GameOutcome::Completed
        } else if state.phase == Phase::GameOver {
            GameOutcome::Defeated
        } else {
            GameOutcome::Timeout
        };
        self.metrics.total_score = state.total_score;
        self.metrics.final_state_hash = state.state_hash();
        self.metrics
    }

    /// Metrics gathered so far.
    #[must_use]
    pub fn current(&self) -> &GameMetrics {
        &self.metrics
    }
}

/// Summary statistics across multiple games.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Total games played.
    pub total_games: u32,
    /// Games where every round was won.
    pub completed: u32,
    /// Games lost.
    pub defeats: u32,
    /// Games cut off by the action budget.
    pub timeouts: u32,
    /// Fraction of games completed.
    pub win_rate: f64,
    /// Average final score.
    pub avg_score: f64,
    /// Best final score.
    pub max_score: u64,
    /// Worst final score.
    pub min_score: u64,
    /// Average rounds won per game.
    pub avg_rounds_cleared: f64,
    /// Average full turns per game.
    pub avg_turns: f64,
    /// Times each enemy was defeated.
    pub enemies_defeated: BTreeMap<String, u32>,
    /// Times each enemy defeated Aurora.
    pub defeats_by_enemy: BTreeMap<String, u32>,
}

impl BatchSummary {
    /// Calculate summary from a list of game metrics.
    #[must_use]
    pub fn from_games(games: &[GameMetrics]) -> Self {
        if games.is_empty() {
            return Self::default();
        }

        let count = games.len() as f64;
        let mut summary = Self {
            total_games: games.len() as u32,
            min_score: u64::MAX,
            ..Default::default()
        };

        let mut score_sum = 0u64;
        let mut rounds_sum = 0u64;
        let mut turns_sum = 0u64;

        for game in games {
            match game.outcome {
                GameOutcome::Completed => summary.completed += 1,
                GameOutcome::Defeated => summary.defeats += 1,
                GameOutcome::Timeout => summary.timeouts += 1,
            }
            score_sum += game.total_score;
            rounds_sum += u64::from(game.rounds_cleared);
            turns_sum += u64::from(game.total_turns());
            summary.max_score = summary.max_score.max(game.total_score);
            summary.min_score = summary.min_score.min(game.total_score);

            for round in game.rounds.iter().filter(|r| r.won) {
                *summary
                    .enemies_defeated
                    .entry(round.enemy.clone())
                    .or_default() += 1;
            }
            if let Some(enemy) = &game.defeated_by {
                *summary.defeats_by_enemy.entry(enemy.clone()).or_default() += 1;
            }
        }

        summary.win_rate = f64::from(summary.completed) / count;
        summary.avg_score = score_sum as f64 / count;
        summary.avg_rounds_cleared = rounds_sum as f64 / count;
        summary.avg_turns = turns_sum as f64 / count;
        summary
    }

    /// Enemy responsible for the most defeats.
    #[must_use]
    pub fn deadliest_enemy(&self) -> Option<&str> {
        self.defeats_by_enemy
            .iter()
            .max_by_key(|(_, count)| **count)
            .map(|(name, _)| name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aurora_core::prelude::{create_battle, ActorRole, Battle};

    fn game(outcome: GameOutcome, score: u64, defeated_by: Option<&str>) -> GameMetrics {
        GameMetrics {
            outcome,
            total_score: score,
            rounds_cleared: 1,
            rounds: vec![RoundMetrics {
                round: 1,
                enemy: "Script Kiddie".to_string(),
                won: true,
                turns: 4,
                ..Default::default()
            }],
            defeated_by: defeated_by.map(String::from),
            ..GameMetrics::new("g", "Balanced", 1)
        }
    }

    #[test]
    fn test_game_metrics_new() {
        let metrics = GameMetrics::new("game_1", "Balanced", 42);
        assert_eq!(metrics.game_id, "game_1");
        assert_eq!(metrics.seed, 42);
        assert_eq!(metrics.outcome, GameOutcome::Timeout);
    }

    #[test]
    fn test_batch_summary() {
        let games = vec![
            game(GameOutcome::Completed, 900, None),
            game(GameOutcome::Defeated, 300, Some("Malware Bot")),
            game(GameOutcome::Defeated, 200, Some("Malware Bot")),
            game(GameOutcome::Timeout, 100, None),
        ];
        let summary = BatchSummary::from_games(&games);
        assert_eq!(summary.total_games, 4);
        assert_eq!(summary.completed, 1);
        assert_eq!(summary.defeats, 2);
        assert_eq!(summary.timeouts, 1);
        assert!((summary.win_rate - 0.25).abs() < f64::EPSILON);
        assert!((summary.avg_score - 375.0).abs() < f64::EPSILON);
        assert_eq!(summary.max_score, 900);
        assert_eq!(summary.min_score, 100);
        assert!((summary.avg_turns - 4.0).abs() < f64::EPSILON);
        assert_eq!(summary.enemies_defeated["Script Kiddie"], 4);
        assert_eq!(summary.deadliest_enemy(), Some("Malware Bot"));
    }

    #[test]
    fn test_empty_summary() {
        let summary = BatchSummary::from_games(&[]);
        assert_eq!(summary.total_games, 0);
        assert_eq!(summary.deadliest_enemy(), None);
    }

    #[test]
    fn test_collector_counts_rejections() {
        let state = create_battle("Ada", "Bo");
        let mut log_only = state.clone();
        log_only.log("Ability 'X' not found.");

        let mut collector = MetricsCollector::new("g", "Balanced", 1);
        collector.on_action(ActionKind::Attack, false, &state, &log_only);
        assert_eq!(collector.current().actions, 1);
        assert_eq!(collector.current().rejected_actions, 1);
    }

    #[test]
    fn test_collector_uses_engine_verdict() {
        let mut battle = Battle::seeded("Ada", "Bo", 3);
        let mut collector = MetricsCollector::new("g", "Balanced", 3);

        let before = battle.state().clone();
        let result = battle.dispatch(ActorRole::Player1, ActionKind::Item, "Power Surge");
        collector.on_action(ActionKind::Item, result.accepted, &before, battle.state());
        assert_eq!(collector.current().rejected_actions, 1);
        assert_eq!(collector.current().items_used, 0);

        let before = battle.state().clone();
        let result = battle.dispatch(ActorRole::Player1, ActionKind::Skip, "");
        collector.on_action(ActionKind::Skip, result.accepted, &before, battle.state());
        assert_eq!(collector.current().actions, 2);
        assert_eq!(collector.current().rejected_actions, 1);
    }

    #[test]
    fn test_collector_records_round_end() {
        let before = create_battle("Ada", "Bo");
        let mut after = before.clone();
        after.phase = Phase::Victory;
        after.battle_stats.turns_elapsed = 3;
        after.current_enemy.current_health = 0;

        let mut collector = MetricsCollector::new("g", "Balanced", 1);
        collector.on_action(ActionKind::Attack, true, &before, &after);

        let mut advanced = after.clone();
        advanced.total_score = 250;
        advanced.round = 2;
        collector.on_advance(&after, &advanced);

        let metrics = collector.finalize(&advanced);
        assert_eq!(metrics.rounds_cleared, 1);
        assert_eq!(metrics.rounds[0].turns, 3);
        assert_eq!(metrics.rounds[0].score, 250);
        assert_eq!(metrics.total_score, 250);
        assert_eq!(metrics.outcome, GameOutcome::Timeout);
    }
}
