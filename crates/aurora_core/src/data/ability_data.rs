//! Ability and item data structures for data-driven content.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::effect_data::{DamageRange, ItemEffect, StatusEffectTemplate, SupportEffect};

/// Which menu an ability belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Affinity {
    /// Player 1 attack abilities.
    Offensive,
    /// Player 2 support abilities.
    Defensive,
    /// Consumable items.
    Item,
}

impl fmt::Display for Affinity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Offensive => "offensive",
            Self::Defensive => "defensive",
            Self::Item => "item",
        };
        f.write_str(name)
    }
}

/// What an ability does when it resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AbilityEffect {
    /// Damages the enemy, optionally attaching a status effect on hit.
    Damage {
        /// Damage rolled before crit and defense.
        damage: DamageRange,
        /// Status effect applied when the hit lands.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        status_effect: Option<StatusEffectTemplate>,
    },
    /// Supports Aurora.
    Support(SupportEffect),
}

/// Data-driven ability definition.
///
/// # Example RON
///
/// ```ron
/// AbilityDefinition(
///     name: "Virus Upload",
///     description: "Uploads a virus that deals damage over time",
///     energy_cost: 20,
///     cooldown: 3,
///     affinity: Offensive,
///     effect: Damage(
///         damage: DamageRange(min: 15, max: 20),
///         status_effect: Some(StatusEffectTemplate(
///             kind: DamageOverTime(damage: 8),
///             duration: 3,
///         )),
///     ),
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AbilityDefinition {
    /// Unique name, also the identifier callers dispatch with.
    pub name: String,

    /// Flavour text for menus.
    #[serde(default)]
    pub description: String,

    /// Energy spent on use. Negative values grant energy.
    #[serde(default)]
    pub energy_cost: i32,

    /// Turns before the ability can be used again.
    #[serde(default)]
    pub cooldown: u32,

    /// Menu the ability belongs to.
    pub affinity: Affinity,

    /// Ultimate abilities are the most expensive in each menu.
    #[serde(default)]
    pub ultimate: bool,

    /// Resolution payload.
    pub effect: AbilityEffect,
}

impl AbilityDefinition {
    /// Damage range, if this is an attack.
    #[must_use]
    pub const fn damage(&self) -> Option<DamageRange> {
        match self.effect {
            AbilityEffect::Damage { damage, .. } => Some(damage),
            AbilityEffect::Support(_) => None,
        }
    }

    /// Status effect attached to an attack.
    #[must_use]
    pub const fn status_effect(&self) -> Option<StatusEffectTemplate> {
        match self.effect {
            AbilityEffect::Damage { status_effect, .. } => status_effect,
            AbilityEffect::Support(_) => None,
        }
    }

    /// Support payload, if this is a defensive ability.
    #[must_use]
    pub const fn support(&self) -> Option<SupportEffect> {
        match self.effect {
            AbilityEffect::Support(effect) => Some(effect),
            AbilityEffect::Damage { .. } => None,
        }
    }

    /// Energy this ability requires Aurora to hold. Zero for free or granting abilities.
    #[must_use]
    pub fn required_energy(&self) -> u32 {
        u32::try_from(self.energy_cost).unwrap_or(0)
    }

    /// Validate internal consistency, returning one message per problem.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.name.trim().is_empty() {
            errors.push("ability has an empty name".to_string());
        }
        match (self.affinity, &self.effect) {
            (Affinity::Offensive, AbilityEffect::Damage { damage, status_effect }) => {
                if damage.min > damage.max {
                    errors.push(format!(
                        "{}: damage min {} exceeds max {}",
                        self.name, damage.min, damage.max
                    ));
                }
                if let Some(template) = status_effect {
                    if template.duration == 0 {
                        errors.push(format!("{}: status effect has zero duration", self.name));
                    }
                }
            }
            (Affinity::Defensive, AbilityEffect::Support(support)) => {
                if let SupportEffect::DefenseUp { duration: 0, .. }
                | SupportEffect::AllStatsUp { duration: 0, .. } = support
                {
                    errors.push(format!("{}: support effect has zero duration", self.name));
                }
            }
            (affinity, _) => {
                errors.push(format!(
                    "{}: {affinity} ability has a mismatched effect",
                    self.name
                ));
            }
        }
        errors
    }
}

/// Single-use inventory item.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemDefinition {
    /// Unique name, also the identifier callers dispatch with.
    pub name: String,

    /// Flavour text for menus.
    #[serde(default)]
    pub description: String,

    /// What using the item does.
    pub effect: ItemEffect,
}

impl ItemDefinition {
    /// Validate internal consistency.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        if self.name.trim().is_empty() {
            vec!["item has an empty name".to_string()]
        } else {
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::effect_data::EffectKind;

    fn attack(min: u32, max: u32) -> AbilityDefinition {
        AbilityDefinition {
            name: "Probe".to_string(),
            description: String::new(),
            energy_cost: 10,
            cooldown: 1,
            affinity: Affinity::Offensive,
            ultimate: false,
            effect: AbilityEffect::Damage {
                damage: DamageRange::new(min, max),
                status_effect: None,
            },
        }
    }

    #[test]
    fn test_valid_attack_has_no_errors() {
        assert!(attack(5, 10).validate().is_empty());
    }

    #[test]
    fn test_inverted_range_is_reported() {
        let errors = attack(10, 5).validate();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("exceeds max"));
    }

    #[test]
    fn test_zero_duration_status_is_reported() {
        let mut ability = attack(5, 10);
        ability.effect = AbilityEffect::Damage {
            damage: DamageRange::new(5, 10),
            status_effect: Some(StatusEffectTemplate::new(EffectKind::Stun, 0)),
        };
        assert_eq!(ability.validate().len(), 1);
    }

    #[test]
    fn test_mismatched_affinity_is_reported() {
        let mut ability = attack(5, 10);
        ability.affinity = Affinity::Defensive;
        assert!(ability.validate()[0].contains("mismatched"));
    }

    #[test]
    fn test_negative_cost_requires_no_energy() {
        let mut ability = attack(5, 10);
        ability.energy_cost = -25;
        assert_eq!(ability.required_energy(), 0);
        ability.energy_cost = 30;
        assert_eq!(ability.required_energy(), 30);
    }
}
