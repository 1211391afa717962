//! Enemy turn: ability selection and resolution against Aurora.

use crate::actions::MIN_HIT_DAMAGE;
use crate::data::EnemyAbility;
use crate::math::reduce_by_defense;
use crate::rng::BattleRng;
use crate::state::{push_effect, BattleState, StatusEffect};

/// Choose the enemy's ability for this turn.
///
/// Picks uniformly among abilities off cooldown, falling back to a basic
/// attack with the enemy's base damage range.
pub fn choose_ability<R: BattleRng>(state: &BattleState, rng: &mut R) -> EnemyAbility {
    let enemy = &state.current_enemy;
    let available: Vec<&EnemyAbility> = enemy
        .template
        .abilities
        .iter()
        .filter(|a| enemy.cooldown(&a.name) == 0)
        .collect();
    rng.pick(&available).map_or_else(
        || EnemyAbility::basic_attack(&enemy.template),
        |ability| (*ability).clone(),
    )
}

/// Run the enemy's turn, returning the log lines it produced.
///
/// Does not touch `turn_phase`; the state machine advances it.
pub fn enemy_turn<R: BattleRng>(state: &mut BattleState, rng: &mut R) -> Vec<String> {
    let name = state.current_enemy.name().to_string();
    if state.current_enemy.is_stunned() {
        tracing::debug!(enemy = %name, "Enemy stunned");
        return vec![format!("{name} is stunned and cannot act!")];
    }

    for remaining in state.current_enemy.cooldowns.values_mut() {
        *remaining = remaining.saturating_sub(1);
    }

    let ability = choose_ability(state, rng);
    tracing::debug!(enemy = %name, ability = %ability.name, "Enemy acts");

    let roll = rng.roll_damage(ability.damage, state.current_enemy.template.crit_chance());
    if rng.roll(state.aurora.dodge_chance) {
        set_cooldown(state, &ability);
        return vec![format!("Aurora dodged {}!", ability.name)];
    }

    // every landed ability deals at least 1, including 0-0 utility abilities
    let aurora = &mut state.aurora;
    let damage = reduce_by_defense(
        roll.damage,
        aurora.defense,
        aurora.defense_bonus(),
        MIN_HIT_DAMAGE,
    );

    let absorbed = damage.min(aurora.shield);
    let taken = damage - absorbed;
    aurora.shield -= absorbed;
    aurora.health = aurora.health.saturating_sub(taken);
    state.battle_stats.damage_taken += taken;

    let mut line = if absorbed == 0 {
        let crit = if roll.critical { "CRITICAL HIT! " } else { "" };
        format!("{crit}{name} uses {} for {taken} damage!", ability.name)
    } else if taken == 0 {
        format!("Shield absorbs {absorbed} damage from {}!", ability.name)
    } else {
        format!(
            "Shield absorbs {absorbed} damage, Aurora takes {taken} damage from {}!",
            ability.name
        )
    };

    if let Some(template) = ability.status_effect {
        push_effect(
            &mut state.aurora.status_effects,
            StatusEffect::from_template(template, &ability.name),
        );
        line.push_str(&format!(" {} effect applied!", template.kind));
    }

    set_cooldown(state, &ability);

    if let Some(outcome) = state.check_outcome() {
        line.push(' ');
        line.push_str(&outcome);
    }
    vec![line]
}

fn set_cooldown(state: &mut BattleState, ability: &EnemyAbility) {
    if !ability.is_basic_attack() {
        state
            .current_enemy
            .cooldowns
            .insert(ability.name.clone(), ability.cooldown);
    }
}
