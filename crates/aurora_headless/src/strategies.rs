//! Scripted player strategies for headless playtesting.
//!
//! A strategy is an ordered list of rules per player. On each turn the
//! first rule whose condition holds and whose ability is ready is played;
//! when none applies the player waits.

use std::path::Path;

use aurora_core::content::ContentTables;
use aurora_core::prelude::{ActionKind, ActorRole, BattleState, PlayerRole};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for strategy operations.
#[derive(Error, Debug)]
pub enum StrategyError {
    /// File not found.
    #[error("Strategy file not found: {0}")]
    FileNotFound(String),
    /// Failed to read file.
    #[error("Failed to read strategy file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse RON.
    #[error("Failed to parse strategy: {0}")]
    ParseError(#[from] ron::error::SpannedError),
    /// No preset with this name.
    #[error("Unknown strategy preset: '{0}' (expected balanced, aggressive or cautious)")]
    UnknownPreset(String),
}

/// When a rule fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Condition {
    /// Every turn.
    Always,
    /// Aurora's health is below this percent of max.
    HealthBelow(u32),
    /// Aurora's energy is below this percent of max.
    EnergyBelow(u32),
    /// The enemy's health is below this percent of max.
    EnemyHealthBelow(u32),
    /// Aurora has no shield.
    NoShield,
    /// Aurora carries at least one debuff.
    Debuffed,
}

impl Condition {
    /// Whether the condition holds in `state`.
    #[must_use]
    pub fn holds(self, state: &BattleState) -> bool {
        let aurora = &state.aurora;
        let enemy = &state.current_enemy;
        match self {
            Self::Always => true,
            Self::HealthBelow(percent) => below(aurora.health, aurora.max_health, percent),
            Self::EnergyBelow(percent) => below(aurora.energy, aurora.max_energy, percent),
            Self::EnemyHealthBelow(percent) => {
                below(enemy.current_health, enemy.template.health, percent)
            }
            Self::NoShield => aurora.shield == 0,
            Self::Debuffed => aurora.has_effect(|k| k.is_debuff()),
        }
    }
}

fn below(value: u32, max: u32, percent: u32) -> bool {
    u64::from(value) * 100 < u64::from(max) * u64::from(percent)
}

/// Play `ability` when `when` holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    /// Ability or item name.
    pub ability: String,
    /// Trigger condition.
    pub when: Condition,
}

impl Rule {
    /// Shorthand constructor.
    #[must_use]
    pub fn new(ability: &str, when: Condition) -> Self {
        Self {
            ability: ability.to_string(),
            when,
        }
    }
}

/// Action chosen by a strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedAction {
    /// Action kind.
    pub kind: ActionKind,
    /// Ability or item name; empty for a skip.
    pub ability: String,
}

impl PlannedAction {
    /// Wait a turn.
    #[must_use]
    pub fn skip() -> Self {
        Self {
            kind: ActionKind::Skip,
            ability: String::new(),
        }
    }
}

/// A complete auto-play strategy for both players.
///
/// # Example RON
///
/// ```ron
/// Strategy(
///     name: "Glass Cannon",
///     description: "All in on damage",
///     offense: [
///         (ability: "System Reset", when: Always),
///         (ability: "Data Breach", when: Always),
///     ],
///     defense: [
///         (ability: "Energy Restore", when: EnergyBelow(50)),
///     ],
///     items: [],
///     energy_reserve: 0,
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Strategy {
    /// Strategy name.
    pub name: String,
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
    /// Player 1 rules in priority order.
    pub offense: Vec<Rule>,
    /// Player 2 rules in priority order.
    pub defense: Vec<Rule>,
    /// Item rules, checked at the start of either player's turn.
    #[serde(default)]
    pub items: Vec<Rule>,
    /// Energy kept back from abilities that cost energy.
    #[serde(default)]
    pub energy_reserve: u32,
}

impl Default for Strategy {
    fn default() -> Self {
        Self::balanced()
    }
}

impl Strategy {
    /// Load a strategy from a RON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, StrategyError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(StrategyError::FileNotFound(path.display().to_string()));
        }
        let contents = std::fs::read_to_string(path)?;
        Self::from_ron_str(&contents)
    }

    /// Load from a RON string.
    pub fn from_ron_str(ron: &str) -> Result<Self, StrategyError> {
        let strategy: Strategy = ron::from_str(ron)?;
        Ok(strategy)
    }

    /// Look up a built-in preset by name.
    pub fn preset(name: &str) -> Result<Self, StrategyError> {
        match name.trim().to_ascii_lowercase().as_str() {
            "balanced" | "default" => Ok(Self::balanced()),
            "aggressive" | "rush" => Ok(Self::aggressive()),
            "cautious" | "turtle" => Ok(Self::cautious()),
            _ => Err(StrategyError::UnknownPreset(name.to_string())),
        }
    }

    /// Names of the built-in presets.
    #[must_use]
    pub fn preset_names() -> &'static [&'static str] {
        &["balanced", "aggressive", "cautious"]
    }

    /// Mix of damage and upkeep.
    #[must_use]
    pub fn balanced() -> Self {
        use Condition::{Always, Debuffed, EnemyHealthBelow, EnergyBelow, HealthBelow, NoShield};
        Self {
            name: "Balanced".to_string(),
            description: "Steady damage with healing when hurt".to_string(),
            offense: vec![
                Rule::new("System Reset", EnemyHealthBelow(60)),
                Rule::new("Buffer Overflow", Always),
                Rule::new("Code Injection", Always),
                Rule::new("Virus Upload", Always),
                Rule::new("Data Breach", Always),
            ],
            defense: vec![
                Rule::new("Quantum Repair", HealthBelow(40)),
                Rule::new("Data Patch", HealthBelow(60)),
                Rule::new("Energy Restore", EnergyBelow(40)),
                Rule::new("Encrypted Shield", NoShield),
                Rule::new("Firewall", Always),
            ],
            items: vec![
                Rule::new("Emergency Patch", HealthBelow(30)),
                Rule::new("Debug Tool", Debuffed),
                Rule::new("Power Surge", EnergyBelow(20)),
            ],
            energy_reserve: 15,
        }
    }

    /// Spend everything on damage.
    #[must_use]
    pub fn aggressive() -> Self {
        use Condition::{Always, EnergyBelow, HealthBelow};
        Self {
            name: "Aggressive".to_string(),
            description: "Biggest available attack every turn".to_string(),
            offense: vec![
                Rule::new("System Reset", Always),
                Rule::new("Buffer Overflow", Always),
                Rule::new("Code Injection", Always),
                Rule::new("Virus Upload", Always),
                Rule::new("Data Breach", Always),
            ],
            defense: vec![
                Rule::new("Hack Acceleration", Always),
                Rule::new("Energy Restore", EnergyBelow(60)),
                Rule::new("Data Patch", HealthBelow(25)),
                Rule::new("Firewall", Always),
            ],
            items: vec![
                Rule::new("Backdoor Access", Always),
                Rule::new("Power Surge", EnergyBelow(30)),
                Rule::new("Emergency Patch", HealthBelow(20)),
            ],
            energy_reserve: 0,
        }
    }

    /// Keep Aurora topped up, attack with what is left.
    #[must_use]
    pub fn cautious() -> Self {
        use Condition::{Always, Debuffed, EnergyBelow, HealthBelow, NoShield};
        Self {
            name: "Cautious".to_string(),
            description: "Shields and heals first, cheap attacks".to_string(),
            offense: vec![
                Rule::new("Virus Upload", Always),
                Rule::new("Data Breach", Always),
            ],
            defense: vec![
                Rule::new("Quantum Repair", HealthBelow(60)),
                Rule::new("Data Patch", HealthBelow(80)),
                Rule::new("Encrypted Shield", NoShield),
                Rule::new("System Override", Always),
                Rule::new("Energy Restore", EnergyBelow(50)),
                Rule::new("Firewall", Always),
            ],
            items: vec![
                Rule::new("Emergency Patch", HealthBelow(50)),
                Rule::new("Debug Tool", Debuffed),
                Rule::new("Power Surge", EnergyBelow(30)),
            ],
            energy_reserve: 25,
        }
    }

    /// Names this strategy refers to that `content` does not define.
    #[must_use]
    pub fn validate(&self, content: &ContentTables) -> Vec<String> {
        let mut errors = Vec::new();
        for rule in &self.offense {
            if content.ability(PlayerRole::Offense, &rule.ability).is_none() {
                errors.push(format!("Unknown offensive ability '{}'", rule.ability));
            }
        }
        for rule in &self.defense {
            if content.ability(PlayerRole::Defense, &rule.ability).is_none() {
                errors.push(format!("Unknown defensive ability '{}'", rule.ability));
            }
        }
        for rule in &self.items {
            if content.item(&rule.ability).is_none() {
                errors.push(format!("Unknown item '{}'", rule.ability));
            }
        }
        errors
    }

    /// Item to use before acting, if any rule fires for an item in stock.
    #[must_use]
    pub fn choose_item(&self, state: &BattleState) -> Option<String> {
        self.items
            .iter()
            .filter(|rule| rule.when.holds(state))
            .find(|rule| {
                state
                    .aurora
                    .available_items
                    .iter()
                    .any(|item| item.name == rule.ability)
            })
            .map(|rule| rule.ability.clone())
    }

    /// Ability action for `actor`, or a skip when nothing is ready.
    #[must_use]
    pub fn choose(
        &self,
        state: &BattleState,
        actor: ActorRole,
        content: &ContentTables,
    ) -> PlannedAction {
        let role = actor.role();
        let (rules, kind) = match role {
            PlayerRole::Offense => (&self.offense, ActionKind::Attack),
            PlayerRole::Defense => (&self.defense, ActionKind::Defend),
        };
        let aurora = &state.aurora;

        rules
            .iter()
            .filter(|rule| rule.when.holds(state))
            .find(|rule| {
                let Some(ability) = content.ability(role, &rule.ability) else {
                    return false;
                };
                let cost = ability.required_energy();
                let affordable = cost == 0
                    || (aurora.energy >= cost && aurora.energy - cost >= self.energy_reserve);
                aurora.cooldown(&ability.name) == 0 && affordable
            })
            .map_or_else(PlannedAction::skip, |rule| PlannedAction {
                kind,
                ability: rule.ability.clone(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aurora_core::prelude::create_battle;

    fn content() -> &'static ContentTables {
        ContentTables::builtin()
    }

    #[test]
    fn test_presets_are_valid() {
        for name in Strategy::preset_names() {
            let strategy = Strategy::preset(name).unwrap();
            assert!(strategy.validate(content()).is_empty(), "{name}");
        }
    }

    #[test]
    fn test_unknown_preset() {
        assert!(matches!(
            Strategy::preset("berserk"),
            Err(StrategyError::UnknownPreset(_))
        ));
    }

    #[test]
    fn test_opening_choices() {
        let state = create_battle("Ada", "Bo");
        let strategy = Strategy::balanced();

        // 50 energy, reserve 15: Buffer Overflow (30) is affordable
        let attack = strategy.choose(&state, ActorRole::Player1, content());
        assert_eq!(attack.kind, ActionKind::Attack);
        assert_eq!(attack.ability, "Buffer Overflow");

        let defend = strategy.choose(&state, ActorRole::Player2, content());
        assert_eq!(defend.kind, ActionKind::Defend);
        assert_eq!(defend.ability, "Encrypted Shield");
    }

    #[test]
    fn test_falls_back_when_exhausted() {
        let mut state = create_battle("Ada", "Bo");
        state.aurora.energy = 0;
        let attack = Strategy::cautious().choose(&state, ActorRole::Player1, content());
        assert_eq!(attack.ability, "Data Breach");

        let strategy = Strategy {
            offense: vec![Rule::new("Code Injection", Condition::Always)],
            ..Strategy::aggressive()
        };
        assert_eq!(
            strategy.choose(&state, ActorRole::Player1, content()),
            PlannedAction::skip()
        );
    }

    #[test]
    fn test_conditions() {
        let mut state = create_battle("Ada", "Bo");
        assert!(!Condition::HealthBelow(50).holds(&state));
        state.aurora.health = 49;
        assert!(Condition::HealthBelow(50).holds(&state));
        assert!(Condition::NoShield.holds(&state));
        assert!(!Condition::Debuffed.holds(&state));
    }

    #[test]
    fn test_choose_item_requires_stock() {
        let mut state = create_battle("Ada", "Bo");
        state.aurora.health = 10;
        let strategy = Strategy::balanced();
        assert_eq!(strategy.choose_item(&state), None);

        let patch = content().item("Emergency Patch").cloned().unwrap();
        state.aurora.available_items.push(patch);
        assert_eq!(
            strategy.choose_item(&state).as_deref(),
            Some("Emergency Patch")
        );
    }

    #[test]
    fn test_strategy_from_ron() {
        let ron = r#"
            Strategy(
                name: "Glass Cannon",
                offense: [(ability: "Data Breach", when: Always)],
                defense: [(ability: "Energy Restore", when: EnergyBelow(50))],
            )
        "#;
        let strategy = Strategy::from_ron_str(ron).unwrap();
        assert_eq!(strategy.name, "Glass Cannon");
        assert!(strategy.items.is_empty());
        assert_eq!(strategy.energy_reserve, 0);
        assert!(strategy.validate(content()).is_empty());
    }

    #[test]
    fn test_strategy_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Strategy::load(dir.path().join("none.ron")).unwrap_err();
        assert!(matches!(err, StrategyError::FileNotFound(_)));
    }

    #[test]
    fn test_strategy_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cautious.ron");
        let text = ron::ser::to_string_pretty(&Strategy::cautious(), Default::default()).unwrap();
        std::fs::write(&path, text).unwrap();
        assert_eq!(Strategy::load(&path).unwrap(), Strategy::cautious());
    }
}
