//! Battle state invariants.
//!
//! Every state returned by `dispatch` or `advance_round` must satisfy these.

use aurora_core::prelude::*;

/// Return a description of every violated invariant.
#[must_use]
pub fn check_invariants(state: &BattleState) -> Vec<String> {
    let mut violations = Vec::new();
    let aurora = &state.aurora;
    let enemy = &state.current_enemy;

    if aurora.health > aurora.max_health {
        violations.push(format!(
            "aurora health {} exceeds max {}",
            aurora.health, aurora.max_health
        ));
    }
    if aurora.energy > aurora.max_energy {
        violations.push(format!(
            "aurora energy {} exceeds max {}",
            aurora.energy, aurora.max_energy
        ));
    }
    if enemy.current_health > enemy.template.health {
        violations.push(format!(
            "{} health {} exceeds max {}",
            enemy.name(),
            enemy.current_health,
            enemy.template.health
        ));
    }
    for effect in aurora.status_effects.iter().chain(&enemy.status_effects) {
        if effect.remaining_duration == 0 {
            violations.push(format!(
                "expired {} effect from {} still listed",
                effect.kind, effect.source
            ));
        }
    }
    if !(1..=MAX_ROUNDS).contains(&state.round) {
        violations.push(format!("round {} out of range", state.round));
    }
    if state.action_in_progress {
        violations.push("action still marked in progress".to_string());
    }
    if matches!(state.turn_phase, TurnPhase::Enemy | TurnPhase::EffectResolution) {
        violations.push(format!("resting in automatic phase {}", state.turn_phase));
    }
    if state.phase.is_terminal() && state.turn_phase != TurnPhase::Player1 {
        violations.push(format!(
            "terminal phase {} with turn phase {}",
            state.phase, state.turn_phase
        ));
    }
    if state.game_complete && state.phase != Phase::Victory {
        violations.push(format!("game complete in phase {}", state.phase));
    }

    violations
}

/// Assert every invariant holds.
///
/// # Panics
///
/// Panics listing the violations if any invariant is broken.
pub fn assert_invariants(state: &BattleState) {
    let violations = check_invariants(state);
    assert!(
        violations.is_empty(),
        "Battle state invariants violated:\n  {}",
        violations.join("\n  ")
    );
}
