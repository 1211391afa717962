//! End-to-end battle scenarios driven through the public state machine.

use aurora_core::data::{DamageRange, BASIC_ATTACK};
use aurora_core::prelude::*;
use aurora_test_utils::invariants::assert_invariants;

fn battle() -> BattleState {
    create_battle("Ada", "Bo")
}

/// Strip the enemy's special abilities so it always uses a basic attack of
/// exactly `damage`.
fn fixed_basic_attack(state: &mut BattleState, damage: u32) {
    let template = &mut state.current_enemy.template;
    template.abilities.clear();
    template.damage = DamageRange::new(damage, damage);
}

fn numeric_snapshot(state: &BattleState) -> (Aurora, EnemyState) {
    (state.aurora.clone(), state.current_enemy.clone())
}

#[test]
fn lethal_enemy_hit_ends_the_game() {
    let mut state = battle();
    state.aurora.health = 10;
    state.aurora.defense = 5;
    fixed_basic_attack(&mut state, 50);

    // no crit, no dodge
    let mut rng = ScriptedRng::new();
    let state = dispatch(&state, ActorRole::Player1, ActionKind::Skip, "", &mut rng);
    let state = dispatch(&state, ActorRole::Player2, ActionKind::Skip, "", &mut rng);

    assert_eq!(state.aurora.health, 0);
    assert_eq!(state.phase, Phase::GameOver);
    assert!(state.is_finished());
    assert!(state
        .battle_log
        .iter()
        .any(|l| l.ends_with("Aurora has been defeated!")));

    let after = dispatch(
        &state,
        ActorRole::Player1,
        ActionKind::Attack,
        "Data Breach",
        &mut rng,
    );
    assert_eq!(numeric_snapshot(&after), numeric_snapshot(&state));
}

#[test]
fn player_attack_subtracts_enemy_defense() {
    for rolled in 15..=25 {
        let mut state = battle();
        state.current_enemy.template.defense = 10;
        let before = state.current_enemy.current_health;

        let mut rng = ScriptedRng::new().with_ranges([rolled]);
        let next = dispatch(
            &state,
            ActorRole::Player1,
            ActionKind::Attack,
            "Data Breach",
            &mut rng,
        );

        let dealt = before - next.current_enemy.current_health;
        assert_eq!(dealt, rolled - 10);
        assert!((5..=15).contains(&dealt));
        assert_eq!(next.battle_stats.damage_dealt, dealt);
        assert_eq!(next.turn_phase, TurnPhase::Player2);
    }
}

#[test]
fn shield_absorbs_enemy_hit() {
    let mut state = battle();
    state.aurora.defense = 0;
    fixed_basic_attack(&mut state, 30);

    let mut rng = ScriptedRng::new();
    let state = dispatch(&state, ActorRole::Player1, ActionKind::Skip, "", &mut rng);
    assert_eq!(state.aurora.shield, 0);

    let transition = dispatch_traced(
        &state,
        ActorRole::Player2,
        ActionKind::Defend,
        "Encrypted Shield",
        &mut rng,
    );
    assert!(transition.accepted);
    assert_eq!(
        transition.frames[0].lines,
        ["Encrypted Shield used! Shield added for 50 damage"]
    );
    assert_eq!(
        transition.frames[1].lines,
        [format!("Shield absorbs 30 damage from {BASIC_ATTACK}!")]
    );

    let next = transition.state;
    assert_eq!(next.aurora.shield, 20);
    assert_eq!(next.aurora.health, state.aurora.health);
    assert_eq!(next.battle_stats.damage_taken, 0);
}

#[test]
fn waiting_clamps_energy_and_breaks_streak() {
    let mut state = battle();
    state.aurora.energy = 95;
    state.player1.consecutive_hits = 3;

    let next = dispatch(
        &state,
        ActorRole::Player1,
        ActionKind::Skip,
        "",
        &mut ScriptedRng::new(),
    );
    assert_eq!(next.aurora.energy, 100);
    assert_eq!(next.player1.consecutive_hits, 0);
    assert_eq!(next.turn_phase, TurnPhase::Player2);
    assert_eq!(
        next.battle_log.last().map(String::as_str),
        Some("Ada waits and regains energy.")
    );
}

#[test]
fn final_round_completes_the_game() {
    let mut state = battle();
    state.round = MAX_ROUNDS;
    state.phase = Phase::Victory;
    state.battle_stats.turns_elapsed = 5;
    let enemy_before = state.current_enemy.clone();

    let next = advance_round(&state);
    assert_eq!(next.phase, Phase::Victory);
    assert_eq!(next.round, MAX_ROUNDS);
    assert_eq!(next.current_enemy, enemy_before);
    assert!(next.game_complete);
    assert_eq!(next.total_score, 100);
    assert_eq!(
        next.battle_log.last().map(String::as_str),
        Some("Final round complete! Total score: 100")
    );

    let again = advance_round(&next);
    assert_eq!(again.total_score, next.total_score);
    assert!(again
        .battle_log
        .last()
        .is_some_and(|l| l.starts_with("The game is already complete")));
}

#[test]
fn one_action_each_closes_the_turn_cycle() {
    let mut state = battle();
    let mut rng = SeededRng::new(11);
    for turn in 0..3 {
        assert_eq!(state.turn_phase, TurnPhase::Player1);
        assert_eq!(state.turn_counter, turn);
        state = dispatch(
            &state,
            ActorRole::Player1,
            ActionKind::Attack,
            "Data Breach",
            &mut rng,
        );
        if state.phase != Phase::Battle {
            return;
        }
        assert_eq!(state.turn_phase, TurnPhase::Player2);
        state = dispatch(
            &state,
            ActorRole::Player2,
            ActionKind::Defend,
            "Firewall",
            &mut rng,
        );
        if state.phase != Phase::Battle {
            return;
        }
        assert_eq!(state.turn_phase, TurnPhase::Player1);
        assert_eq!(state.turn_counter, turn + 1);
    }
}

#[test]
fn unknown_ability_is_idempotent() {
    let state = battle();
    let mut rng = ScriptedRng::new();

    let once = dispatch(
        &state,
        ActorRole::Player1,
        ActionKind::Attack,
        "Nonexistent",
        &mut rng,
    );
    let twice = dispatch(
        &once,
        ActorRole::Player1,
        ActionKind::Attack,
        "Nonexistent",
        &mut rng,
    );

    assert_eq!(numeric_snapshot(&once), numeric_snapshot(&state));
    assert_eq!(numeric_snapshot(&twice), numeric_snapshot(&state));
    assert_eq!(once.battle_log.len(), state.battle_log.len() + 1);
    assert_eq!(twice.battle_log.len(), state.battle_log.len() + 2);
    assert_eq!(
        twice.battle_log.last().map(String::as_str),
        Some("Ability 'Nonexistent' not found.")
    );
    assert_eq!(twice.turn_phase, TurnPhase::Player1);
}

#[test]
fn overwhelming_defense_still_takes_one_damage() {
    let mut state = battle();
    state.current_enemy.template.defense = 500;
    let before = state.current_enemy.current_health;

    let next = dispatch(
        &state,
        ActorRole::Player1,
        ActionKind::Attack,
        "Data Breach",
        &mut ScriptedRng::new(),
    );
    assert_eq!(next.current_enemy.current_health, before - 1);

    let mut state = battle();
    state.aurora.defense = 500;
    fixed_basic_attack(&mut state, 12);
    let mut rng = ScriptedRng::new();
    let state = dispatch(&state, ActorRole::Player1, ActionKind::Skip, "", &mut rng);
    let health = state.aurora.health;
    let next = dispatch(&state, ActorRole::Player2, ActionKind::Skip, "", &mut rng);
    assert_eq!(next.aurora.health, health - 1);
}

#[test]
fn backdoor_access_bypasses_defense_once() {
    let mut state = battle();
    state.current_enemy.template.defense = 10;
    let backdoor = ContentTables::builtin()
        .item("Backdoor Access")
        .cloned()
        .unwrap();
    state.aurora.available_items.push(backdoor);

    let mut rng = ScriptedRng::new().with_ranges([20]);
    let state = dispatch(
        &state,
        ActorRole::Player1,
        ActionKind::Item,
        "Backdoor Access",
        &mut rng,
    );
    assert_eq!(state.turn_phase, TurnPhase::Player1);
    let before = state.current_enemy.current_health;

    let next = dispatch(
        &state,
        ActorRole::Player1,
        ActionKind::Attack,
        "Data Breach",
        &mut rng,
    );
    assert_eq!(before - next.current_enemy.current_health, 20);
    assert!(!next.aurora.has_effect(|k| *k == EffectKind::IgnoreDefense));
}

#[test]
fn whole_game_with_seeded_engine_stays_in_bounds() {
    let mut battle = Battle::seeded("Ada", "Bo", 2024);
    for _ in 0..400 {
        if battle.state().is_finished() {
            break;
        }
        if battle.state().phase == Phase::Victory {
            let before = battle.state().total_score;
            let after = battle.advance_round().total_score;
            assert!(after >= before);
            continue;
        }
        let actor = battle.state().turn_phase.actor().unwrap();
        match actor {
            ActorRole::Player1 => battle.dispatch(actor, ActionKind::Attack, "Data Breach"),
            ActorRole::Player2 => battle.dispatch(actor, ActionKind::Defend, "Firewall"),
        };

        assert_invariants(battle.state());
    }

    let replay = battle.replay();
    assert!(replay.verify().unwrap());
}
