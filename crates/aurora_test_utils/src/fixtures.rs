//! Test fixtures and helpers.
//!
//! Pre-built battle states for consistent testing.

use aurora_core::content::ContentTables;
use aurora_core::data::{DamageRange, ItemDefinition};
use aurora_core::prelude::*;

/// Player 1 name used by fixtures.
pub const PLAYER1: &str = "Ada";
/// Player 2 name used by fixtures.
pub const PLAYER2: &str = "Bo";

/// Look up a built-in item by name.
///
/// # Panics
///
/// Panics if the item is not in the built-in table.
#[must_use]
pub fn item(name: &str) -> ItemDefinition {
    ContentTables::builtin()
        .item(name)
        .cloned()
        .unwrap_or_else(|| panic!("no built-in item named {name}"))
}

/// Fluent builder for battle states.
///
/// # Example
///
/// ```
/// use aurora_test_utils::fixtures::BattleBuilder;
///
/// let state = BattleBuilder::new()
///     .aurora_health(10)
///     .enemy_basic_attack(50)
///     .build();
/// assert_eq!(state.aurora.health, 10);
/// ```
#[derive(Debug, Clone)]
pub struct BattleBuilder {
    state: BattleState,
}

impl Default for BattleBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl BattleBuilder {
    /// Round-1 battle with the default player names.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: create_battle(PLAYER1, PLAYER2),
        }
    }

    /// Battle in `round` against that round's built-in enemy.
    ///
    /// # Panics
    ///
    /// Panics if the built-in tables have no enemy for `round`.
    #[must_use]
    pub fn round(mut self, round: u32) -> Self {
        let enemy = get_enemy_for_round(round)
            .unwrap_or_else(|| panic!("no built-in enemy for round {round}"));
        self.state.round = round;
        self.state.current_enemy = EnemyState::from_template(enemy);
        self
    }

    /// Set Aurora's health.
    #[must_use]
    pub fn aurora_health(mut self, health: u32) -> Self {
        self.state.aurora.health = health;
        self
    }

    /// Set Aurora's energy.
    #[must_use]
    pub fn aurora_energy(mut self, energy: u32) -> Self {
        self.state.aurora.energy = energy;
        self
    }

    /// Set Aurora's base defense.
    #[must_use]
    pub fn aurora_defense(mut self, defense: u32) -> Self {
        self.state.aurora.defense = defense;
        self
    }

    /// Set Aurora's shield.
    #[must_use]
    pub fn shield(mut self, shield: u32) -> Self {
        self.state.aurora.shield = shield;
        self
    }

    /// Give Aurora a built-in item.
    #[must_use]
    pub fn with_item(mut self, name: &str) -> Self {
        self.state.aurora.available_items.push(item(name));
        self
    }

    /// Set the enemy's current health.
    #[must_use]
    pub fn enemy_health(mut self, health: u32) -> Self {
        self.state.current_enemy.current_health = health;
        self
    }

    /// Set the enemy's defense.
    #[must_use]
    pub fn enemy_defense(mut self, defense: u32) -> Self {
        self.state.current_enemy.template.defense = defense;
        self
    }

    /// Make the enemy use only a basic attack of exactly `damage`.
    #[must_use]
    pub fn enemy_basic_attack(mut self, damage: u32) -> Self {
        let template = &mut self.state.current_enemy.template;
        template.abilities.clear();
        template.damage = DamageRange::new(damage, damage);
        self
    }

    /// Set the battle phase.
    #[must_use]
    pub fn phase(mut self, phase: Phase) -> Self {
        self.state.phase = phase;
        self
    }

    /// Finish building.
    #[must_use]
    pub fn build(self) -> BattleState {
        self.state
    }
}

/// Play one full turn cycle: player 1 acts, then player 2.
#[must_use]
pub fn play_turn<R: BattleRng>(
    state: &BattleState,
    player1: (ActionKind, &str),
    player2: (ActionKind, &str),
    rng: &mut R,
) -> BattleState {
    let state = dispatch(state, ActorRole::Player1, player1.0, player1.1, rng);
    dispatch(&state, ActorRole::Player2, player2.0, player2.1, rng)
}
