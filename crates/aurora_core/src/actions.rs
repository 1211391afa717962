//! Player action processors.
//!
//! Each processor mutates a working copy of the state and returns the log
//! line for the action. Preconditions are checked before anything is
//! mutated, so on `Err` the caller can discard the working copy and keep the
//! original state untouched.

use crate::content::ContentTables;
use crate::data::{AbilityDefinition, EffectKind, ItemEffect, SupportEffect};
use crate::error::{BattleError, Result};
use crate::math::reduce_by_defense;
use crate::rng::BattleRng;
use crate::state::{
    push_effect, ActionKind, ActorRole, BattleState, PlayerRole, StatusEffect, WAIT_ENERGY,
};

/// Minimum damage a landed hit deals.
pub const MIN_HIT_DAMAGE: u32 = 1;

fn check_ready(state: &BattleState, ability: &AbilityDefinition) -> Result<()> {
    let turns = state.aurora.cooldown(&ability.name);
    if turns > 0 {
        return Err(BattleError::OnCooldown {
            ability: ability.name.clone(),
            turns,
        });
    }
    if state.aurora.energy < ability.required_energy() {
        return Err(BattleError::InsufficientEnergy {
            ability: ability.name.clone(),
            required: ability.energy_cost,
            available: state.aurora.energy,
        });
    }
    Ok(())
}

fn lookup<'a>(
    content: &'a ContentTables,
    role: PlayerRole,
    name: &str,
) -> Result<&'a AbilityDefinition> {
    content
        .ability(role, name)
        .ok_or_else(|| BattleError::UnknownAbility(name.to_string()))
}

/// Resolve an offensive ability against the current enemy.
pub fn attack<R: BattleRng>(
    state: &mut BattleState,
    content: &ContentTables,
    ability_name: &str,
    rng: &mut R,
) -> Result<String> {
    let ability = lookup(content, PlayerRole::Offense, ability_name)?;
    let damage = ability.damage().ok_or_else(|| BattleError::AbilityMismatch {
        ability: ability.name.clone(),
        kind: ActionKind::Attack,
    })?;
    check_ready(state, ability)?;

    let roll = rng.roll_damage(damage, state.aurora.crit_chance);
    let dodged = rng.roll(state.current_enemy.template.dodge_chance);

    state
        .aurora
        .cooldowns
        .insert(ability.name.clone(), ability.cooldown);
    state.aurora.spend_energy(ability.energy_cost);

    if dodged {
        state.player1.consecutive_hits = 0;
        tracing::debug!(ability = %ability.name, "Attack dodged");
        return Ok(format!(
            "{} dodged {}!",
            state.current_enemy.name(),
            ability.name
        ));
    }

    let ignores_defense = state
        .aurora
        .has_effect(|k| matches!(k, EffectKind::IgnoreDefense));
    let defense = if ignores_defense {
        state
            .aurora
            .status_effects
            .retain(|e| !matches!(e.kind, EffectKind::IgnoreDefense));
        0
    } else {
        state.current_enemy.template.defense
    };

    let dealt = reduce_by_defense(roll.damage, defense, 0, MIN_HIT_DAMAGE);
    let enemy = &mut state.current_enemy;
    enemy.current_health = enemy.current_health.saturating_sub(dealt);

    if let Some(template) = ability.status_effect() {
        push_effect(
            &mut enemy.status_effects,
            StatusEffect::from_template(template, &ability.name),
        );
    }

    state.battle_stats.damage_dealt += dealt;
    if roll.critical {
        state.battle_stats.critical_hits += 1;
        state.player1.critical_hits += 1;
    }
    state.player1.consecutive_hits += 1;

    let crit = if roll.critical { "CRITICAL HIT! " } else { "" };
    let mut line = format!(
        "{crit}{} deals {dealt} damage to {}!",
        ability.name,
        state.current_enemy.name()
    );
    if let Some(outcome) = state.check_outcome() {
        line.push(' ');
        line.push_str(&outcome);
    }
    tracing::debug!(ability = %ability.name, dealt, critical = roll.critical, "Attack landed");
    Ok(line)
}

/// Resolve a defensive ability on Aurora.
pub fn defend(state: &mut BattleState, content: &ContentTables, ability_name: &str) -> Result<String> {
    let ability = lookup(content, PlayerRole::Defense, ability_name)?;
    let support = ability.support().ok_or_else(|| BattleError::AbilityMismatch {
        ability: ability.name.clone(),
        kind: ActionKind::Defend,
    })?;
    check_ready(state, ability)?;

    let aurora = &mut state.aurora;
    let effect_message = match support {
        SupportEffect::DefenseUp { percent, duration } => {
            push_effect(
                &mut aurora.status_effects,
                StatusEffect {
                    kind: EffectKind::DefenseUp { percent },
                    remaining_duration: duration,
                    source: ability.name.clone(),
                },
            );
            format!("Defense increased by {percent}% for {duration} turns")
        }
        SupportEffect::Shield { amount } => {
            aurora.shield = aurora.shield.saturating_add(amount);
            format!("Shield added for {amount} damage")
        }
        SupportEffect::Heal { amount } => {
            let restored = aurora.heal(amount);
            format!("Restored {restored} health")
        }
        SupportEffect::EnergyRestore { amount } => {
            let restored = aurora.restore_energy(amount);
            format!("Restored {restored} energy")
        }
        SupportEffect::CooldownReduction { turns } => {
            aurora.reduce_cooldowns(turns);
            format!("Reduced all cooldowns by {turns} turns")
        }
        SupportEffect::AllStatsUp { percent, duration } => {
            push_effect(
                &mut aurora.status_effects,
                StatusEffect {
                    kind: EffectKind::AllStatsUp { percent },
                    remaining_duration: duration,
                    source: ability.name.clone(),
                },
            );
            format!("All stats increased by {percent}% for {duration} turns")
        }
    };

    aurora.cooldowns.insert(ability.name.clone(), ability.cooldown);
    aurora.spend_energy(ability.energy_cost);
    state.player2.consecutive_hits += 1;

    tracing::debug!(ability = %ability.name, "Support ability used");
    Ok(format!("{} used! {effect_message}", ability.name))
}

/// Consume an item from Aurora's inventory.
pub fn use_item(state: &mut BattleState, item_name: &str) -> Result<String> {
    let index = state
        .aurora
        .available_items
        .iter()
        .position(|i| i.name == item_name)
        .ok_or_else(|| BattleError::UnknownItem(item_name.to_string()))?;
    let item = state.aurora.available_items.remove(index);

    let aurora = &mut state.aurora;
    match item.effect {
        ItemEffect::ClearDebuffs => {
            aurora.clear_debuffs();
        }
        ItemEffect::IgnoreDefense => push_effect(
            &mut aurora.status_effects,
            StatusEffect {
                kind: EffectKind::IgnoreDefense,
                remaining_duration: 1,
                source: item.name.clone(),
            },
        ),
        ItemEffect::Heal { amount } => {
            aurora.heal(amount);
        }
        ItemEffect::EnergyRestore { amount } => {
            aurora.restore_energy(amount);
        }
    }

    tracing::debug!(item = %item.name, "Item used");
    Ok(format!("Used item: {}!", item.name))
}

/// Wait a turn and regain energy.
pub fn skip(state: &mut BattleState, actor: ActorRole) -> String {
    state.aurora.restore_energy(WAIT_ENERGY);
    let player = state.player_mut(actor);
    player.consecutive_hits = 0;
    format!("{} waits and regains energy.", player.name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::script_kiddie;
    use crate::rng::ScriptedRng;
    use crate::state::Phase;

    fn battle() -> BattleState {
        let mut state = BattleState::new("Ada", "Bo", &script_kiddie());
        state.phase = Phase::Battle;
        state
    }

    fn content() -> &'static ContentTables {
        ContentTables::builtin()
    }

    #[test]
    fn test_attack_subtracts_enemy_defense() {
        let mut state = battle();
        let mut rng = ScriptedRng::new().with_ranges([20]);
        let line = attack(&mut state, content(), "Data Breach", &mut rng).unwrap();
        // Script Kiddie has 3 defense
        assert_eq!(state.current_enemy.current_health, 50 - 17);
        assert_eq!(line, "Data Breach deals 17 damage to Script Kiddie!");
        assert_eq!(state.player1.consecutive_hits, 1);
        assert_eq!(state.battle_stats.damage_dealt, 17);
    }

    #[test]
    fn test_attack_crit_is_logged_and_counted() {
        let mut state = battle();
        let mut rng = ScriptedRng::new().with_ranges([20]).with_rolls([true, false]);
        let line = attack(&mut state, content(), "Data Breach", &mut rng).unwrap();
        assert!(line.starts_with("CRITICAL HIT! "));
        assert_eq!(state.current_enemy.current_health, 50 - 27);
        assert_eq!(state.battle_stats.critical_hits, 1);
        assert_eq!(state.player1.critical_hits, 1);
    }

    #[test]
    fn test_dodged_attack_still_costs() {
        let mut state = battle();
        state.player1.consecutive_hits = 3;
        let mut rng = ScriptedRng::new().with_rolls([false, true]);
        let line = attack(&mut state, content(), "Code Injection", &mut rng).unwrap();
        assert_eq!(line, "Script Kiddie dodged Code Injection!");
        assert_eq!(state.current_enemy.current_health, 50);
        assert_eq!(state.aurora.energy, 35);
        assert_eq!(state.aurora.cooldown("Code Injection"), 2);
        assert_eq!(state.player1.consecutive_hits, 0);
    }

    #[test]
    fn test_attack_rejections_leave_state_alone() {
        let mut state = battle();
        let before = state.clone();
        let mut rng = ScriptedRng::new();

        let err = attack(&mut state, content(), "Firewall", &mut rng).unwrap_err();
        assert!(matches!(err, BattleError::UnknownAbility(_)));

        state.aurora.energy = 10;
        let err = attack(&mut state, content(), "System Reset", &mut rng).unwrap_err();
        assert_eq!(err.to_string(), "Not enough energy to use System Reset. Need 50 energy.");

        state.aurora.energy = before.aurora.energy;
        state.aurora.cooldowns.insert("Code Injection".to_string(), 2);
        let err = attack(&mut state, content(), "Code Injection", &mut rng).unwrap_err();
        assert_eq!(err.to_string(), "Code Injection is on cooldown for 2 more turns.");
        assert_eq!(state.current_enemy, before.current_enemy);
    }

    #[test]
    fn test_status_effect_pushed_on_hit() {
        let mut state = battle();
        let mut rng = ScriptedRng::new();
        attack(&mut state, content(), "Virus Upload", &mut rng).unwrap();
        let effect = &state.current_enemy.status_effects[0];
        assert_eq!(effect.kind, EffectKind::DamageOverTime { damage: 8 });
        assert_eq!(effect.remaining_duration, 3);
        assert_eq!(effect.source, "Virus Upload");
    }

    #[test]
    fn test_ignore_defense_is_consumed() {
        let mut state = battle();
        state.aurora.available_items = vec![content().item("Backdoor Access").unwrap().clone()];
        use_item(&mut state, "Backdoor Access").unwrap();
        assert!(state.aurora.available_items.is_empty());

        let mut rng = ScriptedRng::new().with_ranges([20]);
        attack(&mut state, content(), "Data Breach", &mut rng).unwrap();
        assert_eq!(state.current_enemy.current_health, 30);
        assert!(!state
            .aurora
            .has_effect(|k| matches!(k, EffectKind::IgnoreDefense)));
    }

    #[test]
    fn test_killing_blow_sets_victory() {
        let mut state = battle();
        state.current_enemy.current_health = 5;
        let mut rng = ScriptedRng::new();
        let line = attack(&mut state, content(), "Data Breach", &mut rng).unwrap();
        assert_eq!(state.current_enemy.current_health, 0);
        assert_eq!(state.phase, Phase::Victory);
        assert!(line.ends_with("Script Kiddie has been defeated!"));
    }

    #[test]
    fn test_defend_effects() {
        let mut state = battle();
        state.aurora.health = 40;

        let line = defend(&mut state, content(), "Data Patch").unwrap();
        assert_eq!(line, "Data Patch used! Restored 30 health");
        assert_eq!(state.aurora.health, 70);
        assert_eq!(state.aurora.energy, 35);

        let line = defend(&mut state, content(), "Firewall").unwrap();
        assert_eq!(line, "Firewall used! Defense increased by 50% for 1 turns");
        assert_eq!(state.aurora.defense_bonus(), 50);

        let line = defend(&mut state, content(), "Hack Acceleration").unwrap();
        assert_eq!(line, "Hack Acceleration used! Reduced all cooldowns by 1 turns");
        assert_eq!(state.aurora.cooldown("Data Patch"), 2);
        assert_eq!(state.aurora.cooldown("Hack Acceleration"), 5);
        assert_eq!(state.player2.consecutive_hits, 3);
    }

    #[test]
    fn test_energy_restore_clamps_at_max() {
        let mut state = battle();
        state.aurora.energy = 90;
        let line = defend(&mut state, content(), "Energy Restore").unwrap();
        assert_eq!(line, "Energy Restore used! Restored 10 energy");
        assert_eq!(state.aurora.energy, 100);
        assert_eq!(state.aurora.cooldown("Energy Restore"), 3);
    }

    #[test]
    fn test_all_stats_up_is_a_marker() {
        let mut state = battle();
        state.aurora.energy = 100;
        let line = defend(&mut state, content(), "System Override").unwrap();
        assert_eq!(line, "System Override used! All stats increased by 50% for 3 turns");
        assert_eq!(state.aurora.energy, 50);
        assert_eq!(state.aurora.status_effects.len(), 1);
        assert_eq!(
            state.aurora.status_effects[0].kind,
            EffectKind::AllStatsUp { percent: 50 }
        );
        assert_eq!(state.aurora.defense_bonus(), 0);

        // attack damage is the plain roll minus enemy defense
        let mut rng = ScriptedRng::new().with_ranges([20]);
        attack(&mut state, content(), "Data Breach", &mut rng).unwrap();
        assert_eq!(state.battle_stats.damage_dealt, 17);

        for _ in 0..3 {
            crate::effects::resolve_effects(&mut state);
        }
        assert!(state.aurora.status_effects.is_empty());
    }

    #[test]
    fn test_firewall_shield_does_not_raise_enemy_defense() {
        let mut state = battle();
        // an enemy-cast defense marker on either side leaves player damage alone
        for list in [
            &mut state.aurora.status_effects,
            &mut state.current_enemy.status_effects,
        ] {
            list.push(StatusEffect {
                kind: EffectKind::SelfDefenseUp { percent: 50 },
                remaining_duration: 2,
                source: "Firewall Shield".to_string(),
            });
        }
        let mut rng = ScriptedRng::new().with_ranges([20]);
        let line = attack(&mut state, content(), "Data Breach", &mut rng).unwrap();
        assert_eq!(line, "Data Breach deals 17 damage to Script Kiddie!");
        assert_eq!(state.current_enemy.current_health, 33);
    }

    #[test]
    fn test_heal_logs_actual_amount() {
        let mut state = battle();
        state.aurora.health = 90;
        let line = defend(&mut state, content(), "Quantum Repair").unwrap();
        assert_eq!(line, "Quantum Repair used! Restored 10 health");
        assert_eq!(state.aurora.health, 100);
    }

    #[test]
    fn test_clear_debuffs_keeps_buffs() {
        let mut state = battle();
        for kind in [
            EffectKind::Stun,
            EffectKind::DefenseUp { percent: 50 },
            EffectKind::EnergyDrain { amount: 15 },
        ] {
            state.aurora.status_effects.push(StatusEffect {
                kind,
                remaining_duration: 2,
                source: "test".to_string(),
            });
        }
        state.aurora.available_items = vec![content().item("Debug Tool").unwrap().clone()];
        assert_eq!(use_item(&mut state, "Debug Tool").unwrap(), "Used item: Debug Tool!");
        assert_eq!(state.aurora.status_effects.len(), 1);
        assert_eq!(
            state.aurora.status_effects[0].kind,
            EffectKind::DefenseUp { percent: 50 }
        );
    }

    #[test]
    fn test_unknown_item() {
        let mut state = battle();
        let err = use_item(&mut state, "Power Surge").unwrap_err();
        assert_eq!(err.to_string(), "Item Power Surge not found in inventory.");
    }

    #[test]
    fn test_skip_clamps_energy() {
        let mut state = battle();
        state.aurora.energy = 98;
        state.player2.consecutive_hits = 4;
        let line = skip(&mut state, ActorRole::Player2);
        assert_eq!(line, "Bo waits and regains energy.");
        assert_eq!(state.aurora.energy, 100);
        assert_eq!(state.player2.consecutive_hits, 0);
    }
}
