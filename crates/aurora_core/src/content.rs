//! Content tables: abilities, items and the enemy round progression.
//!
//! The built-in tables are compiled in and shared through [`ContentTables::builtin`].
//! An alternative set can be loaded from RON with [`ContentTables::load`]; it is
//! validated before use.

use std::path::Path;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::data::{
    AbilityDefinition, AbilityEffect, Affinity, DamageRange, EffectKind, EnemyAbility,
    EnemyDefinition, ItemDefinition, ItemEffect, StatusEffectTemplate, SupportEffect,
};
use crate::error::{BattleError, Result};
use crate::state::{PlayerRole, MAX_ROUNDS};

/// All static battle content.
///
/// `enemies[n]` is the enemy for round `n + 1`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentTables {
    /// Player 1 attack menu.
    pub offensive: Vec<AbilityDefinition>,
    /// Player 2 support menu.
    pub defensive: Vec<AbilityDefinition>,
    /// Loot table.
    pub items: Vec<ItemDefinition>,
    /// Round progression.
    pub enemies: Vec<EnemyDefinition>,
}

impl ContentTables {
    /// Built-in tables, constructed once.
    #[must_use]
    pub fn builtin() -> &'static Self {
        static TABLES: OnceLock<ContentTables> = OnceLock::new();
        TABLES.get_or_init(|| Self {
            offensive: offensive_abilities(),
            defensive: defensive_abilities(),
            items: items(),
            enemies: enemies(),
        })
    }

    /// Abilities available to a role, in menu order.
    #[must_use]
    pub fn abilities_for_role(&self, role: PlayerRole) -> &[AbilityDefinition] {
        match role {
            PlayerRole::Offense => &self.offensive,
            PlayerRole::Defense => &self.defensive,
        }
    }

    /// Find an ability by name within a role's menu.
    #[must_use]
    pub fn ability(&self, role: PlayerRole, name: &str) -> Option<&AbilityDefinition> {
        self.abilities_for_role(role).iter().find(|a| a.name == name)
    }

    /// Find an item definition by name.
    #[must_use]
    pub fn item(&self, name: &str) -> Option<&ItemDefinition> {
        self.items.iter().find(|i| i.name == name)
    }

    /// Loot table.
    #[must_use]
    pub fn items(&self) -> &[ItemDefinition] {
        &self.items
    }

    /// Enemy template for a 1-based round.
    #[must_use]
    pub fn enemy_for_round(&self, round: u32) -> Option<&EnemyDefinition> {
        let index = usize::try_from(round.checked_sub(1)?).ok()?;
        self.enemies.get(index)
    }

    /// Validate internal consistency, returning one message per problem.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        for (label, abilities, affinity) in [
            ("offensive", &self.offensive, Affinity::Offensive),
            ("defensive", &self.defensive, Affinity::Defensive),
        ] {
            if abilities.is_empty() {
                errors.push(format!("no {label} abilities defined"));
            }
            for ability in abilities {
                if ability.affinity != affinity {
                    errors.push(format!(
                        "{}: listed as {label} but has {} affinity",
                        ability.name, ability.affinity
                    ));
                }
                errors.extend(ability.validate());
                if abilities.iter().filter(|a| a.name == ability.name).count() > 1 {
                    errors.push(format!("duplicate {label} ability {}", ability.name));
                }
            }
        }

        for item in &self.items {
            errors.extend(item.validate());
        }

        let rounds = usize::try_from(MAX_ROUNDS).unwrap_or(usize::MAX);
        if self.enemies.len() < rounds {
            errors.push(format!(
                "{} enemies defined but {MAX_ROUNDS} rounds need one each",
                self.enemies.len()
            ));
        }
        for enemy in &self.enemies {
            errors.extend(enemy.validate());
        }

        errors
    }

    /// Fail with [`BattleError::InvalidContent`] if validation reports problems.
    pub fn ensure_valid(&self) -> Result<()> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(BattleError::InvalidContent(errors.join("; ")))
        }
    }

    /// Serialize to pretty RON.
    pub fn to_ron_string(&self) -> Result<String> {
        let config = ron::ser::PrettyConfig::new().depth_limit(6);
        ron::ser::to_string_pretty(self, config).map_err(|e| BattleError::DataParse {
            path: "<memory>".to_string(),
            message: e.to_string(),
        })
    }

    /// Parse and validate tables from a RON string.
    pub fn from_ron_str(source: &str) -> Result<Self> {
        Self::parse(source, "<memory>")
    }

    /// Load and validate tables from a RON file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let tables = Self::parse(&contents, &path.display().to_string())?;
        tracing::info!(
            path = %path.display(),
            offensive = tables.offensive.len(),
            defensive = tables.defensive.len(),
            items = tables.items.len(),
            enemies = tables.enemies.len(),
            "Loaded content tables"
        );
        Ok(tables)
    }

    fn parse(source: &str, path: &str) -> Result<Self> {
        let tables: Self = ron::from_str(source).map_err(|e| BattleError::DataParse {
            path: path.to_string(),
            message: e.to_string(),
        })?;
        tables.ensure_valid()?;
        Ok(tables)
    }
}

/// Built-in abilities for a role, in menu order.
#[must_use]
pub fn get_abilities_for_role(role: PlayerRole) -> &'static [AbilityDefinition] {
    ContentTables::builtin().abilities_for_role(role)
}

/// Built-in enemy for a 1-based round.
#[must_use]
pub fn get_enemy_for_round(round: u32) -> Option<&'static EnemyDefinition> {
    ContentTables::builtin().enemy_for_round(round)
}

fn attack(
    name: &str,
    description: &str,
    energy_cost: i32,
    damage: (u32, u32),
    cooldown: u32,
    status_effect: Option<StatusEffectTemplate>,
) -> AbilityDefinition {
    AbilityDefinition {
        name: name.to_string(),
        description: description.to_string(),
        energy_cost,
        cooldown,
        affinity: Affinity::Offensive,
        ultimate: false,
        effect: AbilityEffect::Damage {
            damage: DamageRange::new(damage.0, damage.1),
            status_effect,
        },
    }
}

fn support(
    name: &str,
    description: &str,
    energy_cost: i32,
    effect: SupportEffect,
    cooldown: u32,
) -> AbilityDefinition {
    AbilityDefinition {
        name: name.to_string(),
        description: description.to_string(),
        energy_cost,
        cooldown,
        affinity: Affinity::Defensive,
        ultimate: false,
        effect: AbilityEffect::Support(effect),
    }
}

fn status(kind: EffectKind, duration: u32) -> Option<StatusEffectTemplate> {
    Some(StatusEffectTemplate::new(kind, duration))
}

fn offensive_abilities() -> Vec<AbilityDefinition> {
    vec![
        attack(
            "Data Breach",
            "A standard attack that deals damage based on Aurora's stats",
            0,
            (15, 25),
            0,
            None,
        ),
        attack(
            "Code Injection",
            "Inject malicious code that deals extra damage",
            15,
            (25, 35),
            2,
            None,
        ),
        attack(
            "Virus Upload",
            "Upload a virus that deals damage over time",
            20,
            (15, 20),
            3,
            status(EffectKind::DamageOverTime { damage: 8 }, 3),
        ),
        attack(
            "Buffer Overflow",
            "Exploit a vulnerability for high damage with a chance to stun",
            30,
            (30, 45),
            4,
            status(EffectKind::Stun, 1),
        ),
        AbilityDefinition {
            ultimate: true,
            ..attack(
                "System Reset",
                "Powerful attack that resets all enemy buffs and deals massive damage",
                50,
                (50, 70),
                6,
                status(EffectKind::ClearBuffs, 1),
            )
        },
    ]
}

fn defensive_abilities() -> Vec<AbilityDefinition> {
    vec![
        support(
            "Firewall",
            "Raise defenses to reduce incoming damage",
            0,
            SupportEffect::DefenseUp {
                percent: 50,
                duration: 1,
            },
            0,
        ),
        support(
            "Quantum Repair",
            "Advanced healing algorithm that restores a significant amount of health",
            25,
            SupportEffect::Heal { amount: 45 },
            4,
        ),
        support(
            "Energy Restore",
            "Restore Aurora's energy reserves",
            0,
            SupportEffect::EnergyRestore { amount: 25 },
            3,
        ),
        support(
            "Data Patch",
            "Repair damaged code to restore health",
            15,
            SupportEffect::Heal { amount: 30 },
            3,
        ),
        support(
            "Encrypted Shield",
            "Create a powerful shield that absorbs damage",
            25,
            SupportEffect::Shield { amount: 50 },
            4,
        ),
        support(
            "Hack Acceleration",
            "Boost Aurora's speed, reducing cooldowns on all abilities",
            20,
            SupportEffect::CooldownReduction { turns: 1 },
            5,
        ),
        AbilityDefinition {
            ultimate: true,
            ..support(
                "System Override",
                "Override the system to enhance all of Aurora's abilities",
                50,
                SupportEffect::AllStatsUp {
                    percent: 50,
                    duration: 3,
                },
                6,
            )
        },
    ]
}

fn items() -> Vec<ItemDefinition> {
    let item = |name: &str, description: &str, effect| ItemDefinition {
        name: name.to_string(),
        description: description.to_string(),
        effect,
    };
    vec![
        item(
            "Debug Tool",
            "Remove all negative status effects",
            ItemEffect::ClearDebuffs,
        ),
        item(
            "Backdoor Access",
            "Bypass enemy defenses for the next attack",
            ItemEffect::IgnoreDefense,
        ),
        item(
            "Emergency Patch",
            "Instantly restore 50 health",
            ItemEffect::Heal { amount: 50 },
        ),
        item(
            "Power Surge",
            "Fully restore energy",
            ItemEffect::EnergyRestore { amount: 100 },
        ),
    ]
}

fn enemy_ability(
    name: &str,
    description: &str,
    damage: (u32, u32),
    cooldown: u32,
    status_effect: Option<StatusEffectTemplate>,
) -> EnemyAbility {
    EnemyAbility {
        name: name.to_string(),
        description: description.to_string(),
        damage: DamageRange::new(damage.0, damage.1),
        cooldown,
        status_effect,
    }
}

/// Round-1 enemy of the built-in progression.
pub(crate) fn script_kiddie() -> EnemyDefinition {
    EnemyDefinition {
        name: "Script Kiddie".to_string(),
        description: "Novice hackers with basic skills, easily defeated but still dangerous in numbers.".to_string(),
        health: 50,
        damage: DamageRange::new(5, 10),
        defense: 3,
        crit_chance: Some(10),
        dodge_chance: 5,
        abilities: vec![
            enemy_ability("Copy-Paste Attack", "Uses borrowed code for a weak attack", (8, 15), 0, None),
            enemy_ability(
                "DDoS Attempt",
                "Tries to overload Aurora with requests",
                (12, 20),
                2,
                status(EffectKind::Slow { percent: 20 }, 1),
            ),
        ],
        score_value: 100,
        drop_chance: 30,
    }
}

fn enemies() -> Vec<EnemyDefinition> {
    vec![
        script_kiddie(),
        EnemyDefinition {
            name: "Malware Bot".to_string(),
            description: "Automated programs designed to corrupt data and steal information.".to_string(),
            health: 80,
            damage: DamageRange::new(8, 15),
            defense: 5,
            crit_chance: Some(15),
            dodge_chance: 10,
            abilities: vec![
                enemy_ability(
                    "Data Corruption",
                    "Corrupts Aurora's data, causing damage over time",
                    (5, 10),
                    3,
                    status(EffectKind::DamageOverTime { damage: 5 }, 2),
                ),
                enemy_ability("Trojan Horse", "Sneaky attack that bypasses defenses", (15, 25), 4, None),
            ],
            score_value: 200,
            drop_chance: 40,
        },
        EnemyDefinition {
            name: "Firewall Guardian".to_string(),
            description: "Powerful security programs that protect valuable data.".to_string(),
            health: 120,
            damage: DamageRange::new(12, 20),
            defense: 8,
            crit_chance: Some(15),
            dodge_chance: 15,
            abilities: vec![
                enemy_ability(
                    "Security Lockdown",
                    "Prevents Aurora from using special abilities",
                    (10, 15),
                    4,
                    status(EffectKind::AbilityBlock, 1),
                ),
                enemy_ability(
                    "Firewall Shield",
                    "Increases defense temporarily",
                    (0, 0),
                    3,
                    status(EffectKind::SelfDefenseUp { percent: 50 }, 2),
                ),
                enemy_ability(
                    "Security Breach Protocol",
                    "Heavy damage attack with a long cooldown",
                    (25, 35),
                    5,
                    None,
                ),
            ],
            score_value: 300,
            drop_chance: 50,
        },
        EnemyDefinition {
            name: "Data Corruptor".to_string(),
            description: "Advanced malicious programs that can manipulate the digital environment.".to_string(),
            health: 150,
            damage: DamageRange::new(15, 25),
            defense: 10,
            crit_chance: Some(20),
            dodge_chance: 15,
            abilities: vec![
                enemy_ability(
                    "Memory Leak",
                    "Drains Aurora's energy",
                    (10, 15),
                    3,
                    status(EffectKind::EnergyDrain { amount: 15 }, 1),
                ),
                enemy_ability(
                    "Data Fragmentation",
                    "Deals damage and has a chance to decrease Aurora's defense",
                    (15, 25),
                    4,
                    status(EffectKind::DefenseDown { percent: 30 }, 2),
                ),
                enemy_ability(
                    "System Crash",
                    "Powerful attack that has a chance to stun Aurora",
                    (30, 40),
                    6,
                    status(EffectKind::Stun, 1),
                ),
            ],
            score_value: 400,
            drop_chance: 60,
        },
        EnemyDefinition {
            name: "System Admin".to_string(),
            description: "The final boss, a powerful AI controlling the entire system.".to_string(),
            health: 250,
            damage: DamageRange::new(20, 30),
            defense: 15,
            crit_chance: Some(25),
            dodge_chance: 20,
            abilities: vec![
                enemy_ability("Root Access", "Uses admin privileges to deal significant damage", (30, 45), 4, None),
                enemy_ability(
                    "System Restore",
                    "Heals itself by restoring from backup",
                    (0, 0),
                    5,
                    status(EffectKind::SelfHeal { amount: 50 }, 1),
                ),
                enemy_ability(
                    "Permissions Denied",
                    "Blocks Aurora's most powerful ability",
                    (15, 25),
                    5,
                    status(EffectKind::UltimateBlock, 2),
                ),
                enemy_ability(
                    "System Purge",
                    "Ultimate attack that deals massive damage",
                    (40, 60),
                    7,
                    status(EffectKind::DamageOverTime { damage: 10 }, 2),
                ),
            ],
            score_value: 1000,
            drop_chance: 100,
        },
    ]
}
