//! End-of-turn effect resolution.

use crate::data::EffectKind;
use crate::state::{BattleState, Phase, StatusEffect, TurnPhase, ENERGY_REGEN_PER_TURN};

/// Logged when the battle continues into a new turn.
pub const NEW_TURN_LINE: &str = "New turn begins. Player 1's turn.";
/// Closing line of every resolution step.
pub const RESOLVED_LINE: &str = "Effects resolved. Player 1's turn begins.";

/// Tick every effect once and drop the expired ones.
fn tick(effects: &mut Vec<StatusEffect>, mut apply: impl FnMut(&StatusEffect)) {
    for effect in effects.iter_mut() {
        apply(effect);
        effect.remaining_duration = effect.remaining_duration.saturating_sub(1);
    }
    effects.retain(|e| e.remaining_duration > 0);
}

/// Resolve status effects, check the outcome and hand the turn back to player 1.
pub fn resolve_effects(state: &mut BattleState) -> Vec<String> {
    let mut lines = Vec::new();

    let mut aurora_effects = std::mem::take(&mut state.aurora.status_effects);
    let aurora = &mut state.aurora;
    tick(&mut aurora_effects, |effect| match effect.kind {
        EffectKind::DamageOverTime { damage } => {
            aurora.health = aurora.health.saturating_sub(damage);
            lines.push(format!("Aurora takes {damage} damage from {}!", effect.source));
        }
        EffectKind::EnergyDrain { amount } => {
            let drained = amount.min(aurora.energy);
            aurora.energy -= drained;
            lines.push(format!("Aurora loses {drained} energy from {}!", effect.source));
        }
        _ => {}
    });
    state.aurora.status_effects = aurora_effects;

    let mut enemy_effects = std::mem::take(&mut state.current_enemy.status_effects);
    let enemy = &mut state.current_enemy;
    let stats = &mut state.battle_stats;
    tick(&mut enemy_effects, |effect| {
        if let EffectKind::DamageOverTime { damage } = effect.kind {
            enemy.current_health = enemy.current_health.saturating_sub(damage);
            stats.damage_dealt += damage;
            lines.push(format!(
                "{} takes {damage} damage from {}!",
                enemy.template.name, effect.source
            ));
        }
    });
    state.current_enemy.status_effects = enemy_effects;

    if let Some(outcome) = state.check_outcome() {
        tracing::info!(phase = %state.phase, "Round decided during effect resolution");
        lines.push(outcome);
    }

    if state.phase == Phase::Battle {
        state.aurora.restore_energy(ENERGY_REGEN_PER_TURN);
        state.aurora.reduce_cooldowns(1);
        state.battle_stats.turns_elapsed += 1;
        state.turn_counter += 1;
        lines.push(NEW_TURN_LINE.to_string());
    }

    state.turn_phase = TurnPhase::Player1;
    state.action_in_progress = false;
    lines.push(RESOLVED_LINE.to_string());
    lines
}
