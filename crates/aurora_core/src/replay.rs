//! Replay system for recording and playing back games.
//!
//! A replay stores the seed, the player names and every input submitted to a
//! [`Battle`]. Re-running the inputs on a fresh seeded battle reproduces the
//! game exactly, which the stored final hash confirms.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::battle::Battle;
use crate::error::{BattleError, Result};
use crate::state::{ActionKind, ActorRole, BattleState};

/// Replay file format version for compatibility.
pub const REPLAY_VERSION: u32 = 1;

/// One recorded input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReplayStep {
    /// A dispatched player action, accepted or not.
    Action {
        /// Acting player.
        actor: ActorRole,
        /// Action kind.
        kind: ActionKind,
        /// Ability or item identifier.
        ability: String,
    },
    /// A round advance request.
    AdvanceRound,
}

/// Complete replay data structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Replay {
    /// Replay format version.
    pub version: u32,
    /// Seed of the battle RNG.
    pub seed: u64,
    /// Player 1 name as given at creation.
    pub player1: String,
    /// Player 2 name as given at creation.
    pub player2: String,
    /// Inputs in submission order.
    pub steps: Vec<ReplayStep>,
    /// State hash after the last step, once finalized.
    pub final_hash: Option<u64>,
}

impl Replay {
    /// Start an empty replay.
    #[must_use]
    pub fn new(seed: u64, player1: &str, player2: &str) -> Self {
        Self {
            version: REPLAY_VERSION,
            seed,
            player1: player1.to_string(),
            player2: player2.to_string(),
            steps: Vec::new(),
            final_hash: None,
        }
    }

    /// Record an input.
    pub fn record(&mut self, step: ReplayStep) {
        self.steps.push(step);
    }

    /// Store the final state hash.
    pub fn finalize(&mut self, final_hash: u64) {
        self.final_hash = Some(final_hash);
    }

    /// Save the replay to a file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let bytes = bincode::serialize(self)
            .map_err(|e| BattleError::Replay(format!("Failed to serialize replay: {e}")))?;
        std::fs::write(path.as_ref(), bytes)?;
        Ok(())
    }

    /// Load a replay from a file, checking its version.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let bytes = std::fs::read(path.as_ref())?;
        let replay: Self = bincode::deserialize(&bytes)
            .map_err(|e| BattleError::Replay(format!("Failed to deserialize replay: {e}")))?;

        if replay.version != REPLAY_VERSION {
            return Err(BattleError::Replay(format!(
                "Replay version mismatch: expected {REPLAY_VERSION}, got {}",
                replay.version
            )));
        }

        Ok(replay)
    }

    /// Re-run every step on a fresh seeded battle, returning the final state.
    #[must_use]
    pub fn play(&self) -> BattleState {
        let mut battle = Battle::seeded(&self.player1, &self.player2, self.seed);
        for step in &self.steps {
            match step {
                ReplayStep::Action {
                    actor,
                    kind,
                    ability,
                } => {
                    battle.dispatch(*actor, *kind, ability);
                }
                ReplayStep::AdvanceRound => {
                    battle.advance_round();
                }
            }
        }
        battle.into_state()
    }

    /// Re-run the replay and compare against the stored final hash.
    pub fn verify(&self) -> Result<bool> {
        let expected = self
            .final_hash
            .ok_or_else(|| BattleError::Replay("Replay has no final hash".to_string()))?;
        let actual = self.play().state_hash();
        if actual != expected {
            tracing::warn!(expected, actual, "Replay hash mismatch");
        }
        Ok(actual == expected)
    }

    /// Number of recorded steps.
    #[must_use]
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorded_battle() -> Battle {
        let mut battle = Battle::seeded("Ada", "Bo", 1234);
        battle.dispatch(ActorRole::Player1, ActionKind::Attack, "Code Injection");
        battle.dispatch(ActorRole::Player2, ActionKind::Defend, "Encrypted Shield");
        battle.dispatch(ActorRole::Player1, ActionKind::Attack, "Data Breach");
        battle.dispatch(ActorRole::Player2, ActionKind::Skip, "");
        battle
    }

    #[test]
    fn test_replay_reproduces_state() {
        let battle = recorded_battle();
        let replay = battle.replay();
        assert_eq!(replay.step_count(), 4);
        assert_eq!(replay.play(), *battle.state());
        assert!(replay.verify().unwrap());
    }

    #[test]
    fn test_tampered_replay_fails_verification() {
        let mut replay = recorded_battle().replay();
        replay.steps.pop();
        assert!(!replay.verify().unwrap());
    }

    #[test]
    fn test_unfinalized_replay_cannot_verify() {
        let replay = Replay::new(1, "Ada", "Bo");
        assert!(matches!(replay.verify(), Err(BattleError::Replay(_))));
    }

    #[test]
    fn test_replay_save_load() {
        let replay = recorded_battle().replay();
        let temp_path = std::env::temp_dir().join("aurora_test_replay.bin");
        replay.save(&temp_path).unwrap();

        let loaded = Replay::load(&temp_path).unwrap();
        assert_eq!(loaded, replay);

        let _ = std::fs::remove_file(temp_path);
    }

    #[test]
    fn test_version_mismatch_rejected() {
        let mut replay = recorded_battle().replay();
        replay.version = REPLAY_VERSION + 1;
        let temp_path = std::env::temp_dir().join("aurora_test_replay_version.bin");
        replay.save(&temp_path).unwrap();

        let err = Replay::load(&temp_path).unwrap_err();
        assert!(err.to_string().contains("version mismatch"));

        let _ = std::fs::remove_file(temp_path);
    }
}
