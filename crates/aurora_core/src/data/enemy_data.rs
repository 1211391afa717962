//! Enemy data structures for data-driven round progression.

use serde::{Deserialize, Serialize};

use super::effect_data::{DamageRange, StatusEffectTemplate};

/// Name of the fallback ability used when nothing else is available.
pub const BASIC_ATTACK: &str = "Basic Attack";

/// Crit chance applied to enemies that do not specify one.
pub const DEFAULT_ENEMY_CRIT_CHANCE: u32 = 15;

/// Ability belonging to a single enemy template.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnemyAbility {
    /// Unique name within the enemy's ability list.
    pub name: String,

    /// Flavour text.
    #[serde(default)]
    pub description: String,

    /// Damage rolled before crit and defense. A zero range skips the hit.
    pub damage: DamageRange,

    /// Turns before the enemy can use the ability again.
    #[serde(default)]
    pub cooldown: u32,

    /// Status effect applied when the ability resolves.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_effect: Option<StatusEffectTemplate>,
}

impl EnemyAbility {
    /// Implicit attack built from the enemy's base damage range.
    #[must_use]
    pub fn basic_attack(template: &EnemyDefinition) -> Self {
        Self {
            name: BASIC_ATTACK.to_string(),
            description: "A standard attack".to_string(),
            damage: template.damage,
            cooldown: 0,
            status_effect: None,
        }
    }

    /// Whether this is the implicit basic attack.
    #[must_use]
    pub fn is_basic_attack(&self) -> bool {
        self.name == BASIC_ATTACK
    }
}

/// Data-driven enemy definition, instantiated once per round.
///
/// # Example RON
///
/// ```ron
/// EnemyDefinition(
///     name: "Script Kiddie",
///     health: 50,
///     damage: DamageRange(min: 5, max: 10),
///     defense: 3,
///     crit_chance: Some(10),
///     dodge_chance: 5,
///     abilities: [
///         EnemyAbility(
///             name: "Copy-Paste Attack",
///             damage: DamageRange(min: 8, max: 15),
///             cooldown: 0,
///         ),
///     ],
///     score_value: 100,
///     drop_chance: 30,
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnemyDefinition {
    /// Display name.
    pub name: String,

    /// Flavour text.
    #[serde(default)]
    pub description: String,

    /// Maximum health.
    pub health: u32,

    /// Base damage range, used by the basic attack.
    pub damage: DamageRange,

    /// Flat damage reduction against player attacks.
    #[serde(default)]
    pub defense: u32,

    /// Crit chance in percent; [`DEFAULT_ENEMY_CRIT_CHANCE`] when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crit_chance: Option<u32>,

    /// Chance in percent to dodge player attacks.
    #[serde(default)]
    pub dodge_chance: u32,

    /// Enemy-specific abilities, in menu order.
    #[serde(default)]
    pub abilities: Vec<EnemyAbility>,

    /// Score credited for defeating this enemy.
    #[serde(default)]
    pub score_value: u32,

    /// Chance in percent to drop an item on defeat.
    #[serde(default)]
    pub drop_chance: u32,
}

impl EnemyDefinition {
    /// Effective crit chance in percent.
    #[must_use]
    pub fn crit_chance(&self) -> u32 {
        self.crit_chance.unwrap_or(DEFAULT_ENEMY_CRIT_CHANCE)
    }

    /// Look up an ability by name.
    #[must_use]
    pub fn ability(&self, name: &str) -> Option<&EnemyAbility> {
        self.abilities.iter().find(|a| a.name == name)
    }

    /// Validate internal consistency, returning one message per problem.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.health == 0 {
            errors.push(format!("{}: health must be positive", self.name));
        }
        if self.damage.min > self.damage.max {
            errors.push(format!("{}: base damage min exceeds max", self.name));
        }
        for (field, value) in [
            ("crit_chance", self.crit_chance()),
            ("dodge_chance", self.dodge_chance),
            ("drop_chance", self.drop_chance),
        ] {
            if value > 100 {
                errors.push(format!("{}: {field} {value} exceeds 100", self.name));
            }
        }
        for ability in &self.abilities {
            if ability.damage.min > ability.damage.max {
                errors.push(format!(
                    "{}: ability {} damage min exceeds max",
                    self.name, ability.name
                ));
            }
            if ability.status_effect.is_some_and(|t| t.duration == 0) {
                errors.push(format!(
                    "{}: ability {} status effect has zero duration",
                    self.name, ability.name
                ));
            }
            if self.abilities.iter().filter(|a| a.name == ability.name).count() > 1 {
                errors.push(format!(
                    "{}: duplicate ability {}",
                    self.name, ability.name
                ));
            }
        }
        errors
    }
}
