//! Effect definitions shared by abilities, enemy abilities and items.
//!
//! Every effect is a closed, tagged variant carrying its own payload, so an
//! unhandled kind is a compile error rather than a silently ignored string.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Inclusive damage range rolled uniformly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DamageRange {
    /// Minimum damage (inclusive).
    pub min: u32,
    /// Maximum damage (inclusive).
    pub max: u32,
}

impl DamageRange {
    /// Create a new damage range.
    #[must_use]
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    /// Whether `value` falls inside this range.
    #[must_use]
    pub const fn contains(&self, value: u32) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Kind and payload of a timed status effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectKind {
    /// Deals `damage` to the holder at every effect resolution.
    DamageOverTime {
        /// Damage per turn.
        damage: u32,
    },
    /// Drains up to `amount` energy from Aurora at every effect resolution.
    EnergyDrain {
        /// Energy per turn.
        amount: u32,
    },
    /// Holder skips its action.
    Stun,
    /// Slows the holder by `percent` (marker).
    Slow {
        /// Slow percentage.
        percent: u32,
    },
    /// Raises the holder's defense by `percent` against incoming hits.
    DefenseUp {
        /// Defense bonus percentage.
        percent: u32,
    },
    /// Lowers the holder's defense by `percent` (marker).
    DefenseDown {
        /// Defense penalty percentage.
        percent: u32,
    },
    /// Raises all of Aurora's stats by `percent` (marker).
    AllStatsUp {
        /// Stat bonus percentage.
        percent: u32,
    },
    /// Aurora's next attack ignores enemy defense.
    IgnoreDefense,
    /// Aurora cannot use special abilities (marker).
    AbilityBlock,
    /// Aurora cannot use ultimates (marker).
    UltimateBlock,
    /// Buff removal (marker).
    ClearBuffs,
    /// Enemy defense buff; lands on Aurora's list like every enemy effect (marker).
    SelfDefenseUp {
        /// Defense bonus percentage.
        percent: u32,
    },
    /// Enemy self-repair; lands on Aurora's list like every enemy effect (marker).
    SelfHeal {
        /// Health restored.
        amount: u32,
    },
}

impl EffectKind {
    /// Snake-case identifier, as shown in the battle log.
    #[must_use]
    pub const fn id(&self) -> &'static str {
        match self {
            Self::DamageOverTime { .. } => "damage_over_time",
            Self::EnergyDrain { .. } => "energy_drain",
            Self::Stun => "stun",
            Self::Slow { .. } => "slow",
            Self::DefenseUp { .. } => "defense_up",
            Self::DefenseDown { .. } => "defense_down",
            Self::AllStatsUp { .. } => "all_stats_up",
            Self::IgnoreDefense => "ignore_defense",
            Self::AbilityBlock => "ability_block",
            Self::UltimateBlock => "ultimate_block",
            Self::ClearBuffs => "clear_buffs",
            Self::SelfDefenseUp { .. } => "self_defense_up",
            Self::SelfHeal { .. } => "self_heal",
        }
    }

    /// Negative effects removed by the Debug Tool item.
    #[must_use]
    pub const fn is_debuff(&self) -> bool {
        matches!(
            self,
            Self::DamageOverTime { .. }
                | Self::DefenseDown { .. }
                | Self::EnergyDrain { .. }
                | Self::Stun
                | Self::AbilityBlock
                | Self::UltimateBlock
        )
    }

    /// Defense bonus this effect contributes to its holder.
    ///
    /// Only `defense_up` counts; the enemy's `self_defense_up` is a marker.
    #[must_use]
    pub const fn defense_bonus(&self) -> u32 {
        match self {
            Self::DefenseUp { percent } => *percent,
            _ => 0,
        }
    }
}

impl fmt::Display for EffectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id().replace('_', " "))
    }
}

/// Status effect attached to an ability, instantiated when the ability lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StatusEffectTemplate {
    /// Effect kind and payload.
    pub kind: EffectKind,
    /// Turns the effect lasts once applied.
    pub duration: u32,
}

impl StatusEffectTemplate {
    /// Create a new template.
    #[must_use]
    pub const fn new(kind: EffectKind, duration: u32) -> Self {
        Self { kind, duration }
    }
}

/// Effect of a defensive/support ability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SupportEffect {
    /// Reduce incoming damage by `percent` of defense for `duration` turns.
    DefenseUp {
        /// Defense bonus percentage.
        percent: u32,
        /// Turns the bonus lasts.
        duration: u32,
    },
    /// Add `amount` to Aurora's shield.
    Shield {
        /// Shield points added.
        amount: u32,
    },
    /// Heal Aurora by `amount`, clamped to max health.
    Heal {
        /// Health restored.
        amount: u32,
    },
    /// Restore `amount` energy, clamped to max energy.
    EnergyRestore {
        /// Energy restored.
        amount: u32,
    },
    /// Reduce every running cooldown by `turns`.
    CooldownReduction {
        /// Turns removed.
        turns: u32,
    },
    /// Mark all stats raised by `percent` for `duration` turns.
    AllStatsUp {
        /// Stat bonus percentage.
        percent: u32,
        /// Turns the bonus lasts.
        duration: u32,
    },
}

/// Effect of a single-use item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemEffect {
    /// Remove all debuffs from Aurora.
    ClearDebuffs,
    /// Next attack ignores enemy defense.
    IgnoreDefense,
    /// Heal Aurora by `amount`.
    Heal {
        /// Health restored.
        amount: u32,
    },
    /// Restore `amount` energy.
    EnergyRestore {
        /// Energy restored.
        amount: u32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debuff_classification() {
        assert!(EffectKind::DamageOverTime { damage: 5 }.is_debuff());
        assert!(EffectKind::Stun.is_debuff());
        assert!(EffectKind::UltimateBlock.is_debuff());
        assert!(!EffectKind::DefenseUp { percent: 50 }.is_debuff());
        assert!(!EffectKind::Slow { percent: 20 }.is_debuff());
        assert!(!EffectKind::IgnoreDefense.is_debuff());
    }

    #[test]
    fn test_only_defense_up_adds_defense() {
        assert_eq!(EffectKind::DefenseUp { percent: 50 }.defense_bonus(), 50);
        assert_eq!(EffectKind::SelfDefenseUp { percent: 50 }.defense_bonus(), 0);
        assert_eq!(EffectKind::AllStatsUp { percent: 20 }.defense_bonus(), 0);
    }

    #[test]
    fn test_display_uses_spaced_id() {
        assert_eq!(
            EffectKind::DamageOverTime { damage: 8 }.to_string(),
            "damage over time"
        );
        assert_eq!(EffectKind::Stun.to_string(), "stun");
    }

    #[test]
    fn test_range_contains() {
        assert!(DamageRange::new(0, 0).contains(0));
        assert!(DamageRange::new(15, 25).contains(15));
        assert!(!DamageRange::new(15, 25).contains(26));
    }
}
