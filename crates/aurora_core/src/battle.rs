//! Battle state machine.
//!
//! [`dispatch`] is the single entry point for player input. It validates the
//! request, runs the action processor on a working copy, advances the turn
//! phase and, when the turn passes to the enemy, runs the enemy turn and
//! effect resolution in the same call:
//!
//! ```text
//! PLAYER1 --(player 1 acts)--> PLAYER2 --(player 2 acts)--> ENEMY --(auto)--> EFFECT_RESOLUTION --(auto)--> PLAYER1
//! ```
//!
//! Rejected input never escapes as an error: the state comes back unchanged
//! apart from one log line describing the problem.
//!
//! [`Battle`] wraps the free functions into an owning engine that also
//! records a [`Replay`].

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::actions;
use crate::content::{script_kiddie, ContentTables};
use crate::effects::resolve_effects;
use crate::enemy_ai::enemy_turn;
use crate::error::{BattleError, Result};
use crate::math::percent_of;
use crate::replay::{Replay, ReplayStep};
use crate::rng::{BattleRng, SeededRng};
use crate::scoring::calculate_score;
use crate::state::{
    ActionKind, ActorRole, BattleState, BattleStats, EnemyState, Phase, TurnPhase, MAX_ROUNDS,
};

/// Health restored between rounds, in percent of max health.
pub const ROUND_HEALTH_RESTORE_PERCENT: u32 = 30;
/// Energy restored between rounds, in percent of max energy.
pub const ROUND_ENERGY_RESTORE_PERCENT: u32 = 50;

/// Log lines produced while the battle was in one turn phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    /// Phase that produced the lines.
    pub turn_phase: TurnPhase,
    /// Lines appended to the battle log, in order.
    pub lines: Vec<String>,
}

/// Result of one [`dispatch_traced`] call.
///
/// `frames` lets a presentation layer replay the automatic cascade at its
/// own pace; `state` is already final.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    /// State after the whole cascade.
    pub state: BattleState,
    /// One frame per phase that ran.
    pub frames: Vec<Frame>,
    /// Whether the action was accepted.
    pub accepted: bool,
}

/// What [`Battle::dispatch`] reports back to its caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatched {
    /// Whether the action was accepted.
    pub accepted: bool,
    /// One frame per phase that ran.
    pub frames: Vec<Frame>,
}

/// Start a new game against the built-in round progression.
#[must_use]
pub fn create_battle(player1_name: &str, player2_name: &str) -> BattleState {
    create_battle_with(ContentTables::builtin(), player1_name, player2_name).unwrap_or_else(
        |err| {
            tracing::warn!(%err, "Built-in content incomplete, using the opening enemy");
            start(BattleState::new(player1_name, player2_name, &script_kiddie()))
        },
    )
}

/// Start a new game against caller-supplied content.
pub fn create_battle_with(
    content: &ContentTables,
    player1_name: &str,
    player2_name: &str,
) -> Result<BattleState> {
    let enemy = content
        .enemy_for_round(1)
        .ok_or_else(|| BattleError::MissingContent("enemy for round 1".to_string()))?;
    Ok(start(BattleState::new(player1_name, player2_name, enemy)))
}

fn start(mut state: BattleState) -> BattleState {
    state.phase = Phase::Battle;
    state.log("Battle begun! Player 1's turn.");
    tracing::info!(
        player1 = %state.player1.name,
        player2 = %state.player2.name,
        enemy = %state.current_enemy.name(),
        "Battle created"
    );
    state
}

/// Apply one player action using the built-in content.
#[must_use]
pub fn dispatch<R: BattleRng>(
    state: &BattleState,
    actor: ActorRole,
    kind: ActionKind,
    ability: &str,
    rng: &mut R,
) -> BattleState {
    dispatch_traced(state, actor, kind, ability, rng).state
}

/// Apply one player action using caller-supplied content.
#[must_use]
pub fn dispatch_with<R: BattleRng>(
    content: &ContentTables,
    state: &BattleState,
    actor: ActorRole,
    kind: ActionKind,
    ability: &str,
    rng: &mut R,
) -> BattleState {
    dispatch_traced_with(content, state, actor, kind, ability, rng).state
}

/// Like [`dispatch`], also returning the per-phase log frames.
#[must_use]
pub fn dispatch_traced<R: BattleRng>(
    state: &BattleState,
    actor: ActorRole,
    kind: ActionKind,
    ability: &str,
    rng: &mut R,
) -> Transition {
    dispatch_traced_with(ContentTables::builtin(), state, actor, kind, ability, rng)
}

/// Like [`dispatch_with`], also returning the per-phase log frames.
#[must_use]
pub fn dispatch_traced_with<R: BattleRng>(
    content: &ContentTables,
    state: &BattleState,
    actor: ActorRole,
    kind: ActionKind,
    ability: &str,
    rng: &mut R,
) -> Transition {
    let mut next = state.clone();
    if next.phase == Phase::Setup {
        next.phase = Phase::Battle;
    }

    let mut working = next.clone();
    working.action_in_progress = true;
    let line = match run_action(&mut working, content, actor, kind, ability, rng) {
        Ok(line) => line,
        Err(err) => {
            if err.is_user_error() {
                tracing::debug!(%actor, %kind, ability, %err, "Action rejected");
            } else {
                tracing::warn!(%actor, %kind, ability, %err, "Action failed");
            }
            let line = err.to_string();
            next.log(line.clone());
            return Transition {
                frames: vec![Frame {
                    turn_phase: next.turn_phase,
                    lines: vec![line],
                }],
                state: next,
                accepted: false,
            };
        }
    };

    let mut next = working;
    if matches!(kind, ActionKind::Attack | ActionKind::Defend) {
        next.player_mut(actor).abilities_used.insert(ability.to_string());
        next.battle_stats.abilities_used.insert(ability.to_string());
    }
    next.log(line.clone());
    let mut frames = vec![Frame {
        turn_phase: next.turn_phase,
        lines: vec![line],
    }];

    if kind == ActionKind::Item && !next.phase.is_terminal() {
        next.action_in_progress = false;
        return Transition {
            state: next,
            frames,
            accepted: true,
        };
    }

    if next.phase.is_terminal() {
        next.turn_phase = TurnPhase::Player1;
    } else {
        next.turn_phase = next.turn_phase.next();
        if next.turn_phase == TurnPhase::Enemy {
            run_cascade(&mut next, &mut frames, rng);
        }
    }

    if next.phase == Phase::Victory {
        if let Some(line) = roll_loot(&mut next, content, rng) {
            next.log(line.clone());
            if let Some(frame) = frames.last_mut() {
                frame.lines.push(line);
            }
        }
    }

    next.action_in_progress = false;
    Transition {
        state: next,
        frames,
        accepted: true,
    }
}

fn run_action<R: BattleRng>(
    state: &mut BattleState,
    content: &ContentTables,
    actor: ActorRole,
    kind: ActionKind,
    ability: &str,
    rng: &mut R,
) -> Result<String> {
    if state.phase.is_terminal() {
        return Err(BattleError::BattleOver(state.phase));
    }
    if !kind.allowed_for(actor) {
        return Err(BattleError::InvalidAction { actor, kind });
    }
    if state.turn_phase != actor.turn_phase() {
        return Err(BattleError::WrongTurn {
            actor,
            turn_phase: state.turn_phase,
        });
    }
    match kind {
        ActionKind::Attack => actions::attack(state, content, ability, rng),
        ActionKind::Defend => actions::defend(state, content, ability),
        ActionKind::Item => actions::use_item(state, ability),
        ActionKind::Skip => Ok(actions::skip(state, actor)),
    }
}

fn run_cascade<R: BattleRng>(state: &mut BattleState, frames: &mut Vec<Frame>, rng: &mut R) {
    let lines = enemy_turn(state, rng);
    state.battle_log.extend(lines.iter().cloned());
    frames.push(Frame {
        turn_phase: TurnPhase::Enemy,
        lines,
    });

    state.turn_phase = TurnPhase::EffectResolution;
    let lines = resolve_effects(state);
    state.battle_log.extend(lines.iter().cloned());
    frames.push(Frame {
        turn_phase: TurnPhase::EffectResolution,
        lines,
    });

    #[cfg(feature = "debug-validation")]
    debug_validate(state);
}

fn roll_loot<R: BattleRng>(
    state: &mut BattleState,
    content: &ContentTables,
    rng: &mut R,
) -> Option<String> {
    let item = rng
        .loot_drop(content.items(), state.current_enemy.template.drop_chance)?
        .clone();
    let line = format!("{} dropped {}!", state.current_enemy.name(), item.name);
    tracing::info!(item = %item.name, "Loot dropped");
    state.aurora.available_items.push(item);
    Some(line)
}

/// Bank the round score and set up the next round using the built-in content.
#[must_use]
pub fn advance_round(state: &BattleState) -> BattleState {
    advance_round_with(ContentTables::builtin(), state)
}

/// Bank the round score and set up the next round using caller-supplied content.
///
/// Only acts on a won round. On the final round the score is banked once and
/// the game is marked complete; the phase stays VICTORY.
#[must_use]
pub fn advance_round_with(content: &ContentTables, state: &BattleState) -> BattleState {
    let mut next = state.clone();

    if next.game_complete {
        next.log(format!(
            "The game is already complete. Final score: {}",
            next.total_score
        ));
        return next;
    }
    if next.phase != Phase::Victory {
        tracing::debug!(phase = %next.phase, "Round advance rejected");
        next.log(format!(
            "Cannot advance: round {} is not won (phase {}).",
            next.round, next.phase
        ));
        return next;
    }

    let final_round = next.round >= MAX_ROUNDS;
    let next_enemy = if final_round {
        None
    } else {
        match content.enemy_for_round(next.round + 1) {
            Some(enemy) => Some(enemy),
            None => {
                let err = BattleError::MissingContent(format!("enemy for round {}", next.round + 1));
                tracing::warn!(%err, "Round advance aborted");
                next.log(err.to_string());
                return next;
            }
        }
    };

    let score = calculate_score(&next.battle_stats, &next.player1, &next.player2);
    next.total_score += score.total;
    tracing::info!(round = next.round, score = score.total, total = next.total_score, "Round scored");

    let Some(enemy) = next_enemy else {
        next.game_complete = true;
        next.log(format!("Final round complete! Total score: {}", next.total_score));
        return next;
    };

    let aurora = &mut next.aurora;
    aurora.heal(percent_of(aurora.max_health, ROUND_HEALTH_RESTORE_PERCENT));
    aurora.restore_energy(percent_of(aurora.max_energy, ROUND_ENERGY_RESTORE_PERCENT));
    aurora.status_effects.clear();
    aurora.cooldowns.clear();

    next.round += 1;
    next.phase = Phase::Battle;
    next.turn_phase = TurnPhase::Player1;
    next.turn_counter = 0;
    next.battle_stats = BattleStats::default();
    next.current_enemy = EnemyState::from_template(enemy);
    next.action_in_progress = false;
    next.log(format!(
        "Round {} begins! A {} appears! Player 1's turn.",
        next.round, enemy.name
    ));
    next
}

#[cfg(feature = "debug-validation")]
fn debug_validate(state: &BattleState) {
    let aurora = &state.aurora;
    debug_assert!(aurora.health <= aurora.max_health, "health above max");
    debug_assert!(aurora.energy <= aurora.max_energy, "energy above max");
    debug_assert!(
        state.current_enemy.current_health <= state.current_enemy.template.health,
        "enemy health above max"
    );
    debug_assert!(
        aurora
            .status_effects
            .iter()
            .chain(&state.current_enemy.status_effects)
            .all(|e| e.remaining_duration > 0),
        "expired status effect kept"
    );
}

/// Owning battle engine: state, RNG, content and replay recording.
#[derive(Debug, Clone)]
pub struct Battle<R: BattleRng = SeededRng> {
    state: BattleState,
    rng: R,
    content: Arc<ContentTables>,
    replay: Replay,
}

impl Battle<SeededRng> {
    /// New game on the built-in content with a seeded RNG.
    #[must_use]
    pub fn seeded(player1_name: &str, player2_name: &str, seed: u64) -> Self {
        Self {
            state: create_battle(player1_name, player2_name),
            rng: SeededRng::new(seed),
            content: Arc::new(ContentTables::builtin().clone()),
            replay: Replay::new(seed, player1_name, player2_name),
        }
    }

    /// Restart with new players and a fresh seed.
    pub fn new_game(&mut self, player1_name: &str, player2_name: &str, seed: u64) -> Result<()> {
        self.state = create_battle_with(&self.content, player1_name, player2_name)?;
        self.rng = SeededRng::new(seed);
        self.replay = Replay::new(seed, player1_name, player2_name);
        Ok(())
    }
}

impl<R: BattleRng> Battle<R> {
    /// New game on caller-supplied content and RNG.
    ///
    /// `seed` is stored in the replay; it is only meaningful when `rng` is a
    /// [`SeededRng`] built from it.
    pub fn with_rng(
        content: Arc<ContentTables>,
        player1_name: &str,
        player2_name: &str,
        rng: R,
        seed: u64,
    ) -> Result<Self> {
        Ok(Self {
            state: create_battle_with(&content, player1_name, player2_name)?,
            rng,
            content,
            replay: Replay::new(seed, player1_name, player2_name),
        })
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> &BattleState {
        &self.state
    }

    /// Content the battle runs on.
    #[must_use]
    pub fn content(&self) -> &ContentTables {
        &self.content
    }

    /// Submit a player action.
    ///
    /// Rejected input is recorded in the replay too, since its log line
    /// changes the state.
    pub fn dispatch(&mut self, actor: ActorRole, kind: ActionKind, ability: &str) -> Dispatched {
        let transition =
            dispatch_traced_with(&self.content, &self.state, actor, kind, ability, &mut self.rng);
        self.replay.record(ReplayStep::Action {
            actor,
            kind,
            ability: ability.to_string(),
        });
        self.state = transition.state;
        Dispatched {
            accepted: transition.accepted,
            frames: transition.frames,
        }
    }

    /// Advance to the next round (or complete the game).
    pub fn advance_round(&mut self) -> &BattleState {
        self.state = advance_round_with(&self.content, &self.state);
        self.replay.record(ReplayStep::AdvanceRound);
        &self.state
    }

    /// Replay recorded so far, finalized with the current state hash.
    #[must_use]
    pub fn replay(&self) -> Replay {
        let mut replay = self.replay.clone();
        replay.finalize(self.state.state_hash());
        replay
    }

    /// Consume the engine, returning the final state.
    #[must_use]
    pub fn into_state(self) -> BattleState {
        self.state
    }
}
