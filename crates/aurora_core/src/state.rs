//! Battle state types.
//!
//! [`BattleState`] is a plain value: every transition in [`crate::battle`]
//! takes one by reference and returns a new one. All collections are ordered
//! (`BTreeMap`, `BTreeSet`, `Vec`) so hashing and serialization are stable.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::data::{EffectKind, EnemyDefinition, ItemDefinition, StatusEffectTemplate};
use crate::error::BattleError;
use crate::math::clamp_add;

/// Number of rounds in a full game.
pub const MAX_ROUNDS: u32 = 5;

/// Energy Aurora regenerates at the end of every full turn.
pub const ENERGY_REGEN_PER_TURN: u32 = 5;

/// Energy granted by the wait/skip action.
pub const WAIT_ENERGY: u32 = 5;

/// Aurora's starting health and maximum health.
pub const AURORA_BASE_HEALTH: u32 = 100;
/// Aurora's starting energy.
pub const AURORA_BASE_ENERGY: u32 = 50;
/// Aurora's maximum energy.
pub const AURORA_MAX_ENERGY: u32 = 100;
/// Aurora's flat defense.
pub const AURORA_BASE_DEFENSE: u32 = 10;
/// Aurora's crit chance in percent.
pub const AURORA_CRIT_CHANCE: u32 = 15;
/// Aurora's dodge chance in percent.
pub const AURORA_DODGE_CHANCE: u32 = 10;

/// Game phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Phase {
    /// Created but not started.
    #[default]
    Setup,
    /// Round in progress.
    Battle,
    /// Enemy defeated (or final round complete).
    Victory,
    /// Aurora defeated.
    GameOver,
}

impl Phase {
    /// Whether the round has ended.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Victory | Self::GameOver)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Setup => "SETUP",
            Self::Battle => "BATTLE",
            Self::Victory => "VICTORY",
            Self::GameOver => "GAME_OVER",
        };
        f.write_str(name)
    }
}

/// Position in the turn cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TurnPhase {
    /// Offense player acts.
    #[default]
    Player1,
    /// Defense player acts.
    Player2,
    /// Enemy acts automatically.
    Enemy,
    /// Status effects tick automatically.
    EffectResolution,
}

impl TurnPhase {
    /// Next phase in the cycle.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Player1 => Self::Player2,
            Self::Player2 => Self::Enemy,
            Self::Enemy => Self::EffectResolution,
            Self::EffectResolution => Self::Player1,
        }
    }

    /// Actor that owns this phase, if any.
    #[must_use]
    pub const fn actor(self) -> Option<ActorRole> {
        match self {
            Self::Player1 => Some(ActorRole::Player1),
            Self::Player2 => Some(ActorRole::Player2),
            Self::Enemy | Self::EffectResolution => None,
        }
    }
}

impl fmt::Display for TurnPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Player1 => "PLAYER1",
            Self::Player2 => "PLAYER2",
            Self::Enemy => "ENEMY",
            Self::EffectResolution => "EFFECT_RESOLUTION",
        };
        f.write_str(name)
    }
}

/// Which human player submits an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ActorRole {
    /// Offense player.
    Player1,
    /// Defense player.
    Player2,
}

impl ActorRole {
    /// Role this actor plays.
    #[must_use]
    pub const fn role(self) -> PlayerRole {
        match self {
            Self::Player1 => PlayerRole::Offense,
            Self::Player2 => PlayerRole::Defense,
        }
    }

    /// Turn phase this actor owns.
    #[must_use]
    pub const fn turn_phase(self) -> TurnPhase {
        match self {
            Self::Player1 => TurnPhase::Player1,
            Self::Player2 => TurnPhase::Player2,
        }
    }
}

impl fmt::Display for ActorRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Player1 => "player1",
            Self::Player2 => "player2",
        })
    }
}

impl FromStr for ActorRole {
    type Err = BattleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "player1" | "p1" | "1" => Ok(Self::Player1),
            "player2" | "p2" | "2" => Ok(Self::Player2),
            _ => Err(BattleError::MalformedAction(s.to_string())),
        }
    }
}

/// Fixed role assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerRole {
    /// Uses offensive abilities.
    Offense,
    /// Uses defensive abilities.
    Defense,
}

/// Kind of action a player submits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionKind {
    /// Offensive ability (player 1 only).
    Attack,
    /// Defensive ability (player 2 only).
    Defend,
    /// Consume an inventory item.
    Item,
    /// Wait and regain energy.
    Skip,
}

impl ActionKind {
    /// Whether `actor` may submit this kind of action.
    #[must_use]
    pub const fn allowed_for(self, actor: ActorRole) -> bool {
        match self {
            Self::Attack => matches!(actor, ActorRole::Player1),
            Self::Defend => matches!(actor, ActorRole::Player2),
            Self::Item | Self::Skip => true,
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Attack => "attack",
            Self::Defend => "defend",
            Self::Item => "item",
            Self::Skip => "skip",
        })
    }
}

impl FromStr for ActionKind {
    type Err = BattleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "attack" => Ok(Self::Attack),
            "defend" => Ok(Self::Defend),
            "item" => Ok(Self::Item),
            "skip" | "wait" => Ok(Self::Skip),
            _ => Err(BattleError::MalformedAction(s.to_string())),
        }
    }
}

/// One of the two human players.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Player {
    /// Fixed role.
    pub role: PlayerRole,
    /// Display name.
    pub name: String,
    /// Critical hits landed over the whole game.
    pub critical_hits: u32,
    /// Distinct abilities this player has used.
    pub abilities_used: BTreeSet<String>,
    /// Successful actions in a row; reset on dodge or skip.
    pub consecutive_hits: u32,
}

impl Player {
    /// Create a player, substituting `fallback` for a blank name.
    #[must_use]
    pub fn new(role: PlayerRole, name: &str, fallback: &str) -> Self {
        let name = if name.trim().is_empty() {
            fallback.to_string()
        } else {
            name.trim().to_string()
        };
        Self {
            role,
            name,
            critical_hits: 0,
            abilities_used: BTreeSet::new(),
            consecutive_hits: 0,
        }
    }
}

/// Live status effect attached to Aurora or the enemy.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StatusEffect {
    /// Kind and payload.
    pub kind: EffectKind,
    /// Turns left; always positive while in a list.
    pub remaining_duration: u32,
    /// Ability or item that applied it.
    pub source: String,
}

impl StatusEffect {
    /// Instantiate a template applied by `source`.
    #[must_use]
    pub fn from_template(template: StatusEffectTemplate, source: &str) -> Self {
        Self {
            kind: template.kind,
            remaining_duration: template.duration,
            source: source.to_string(),
        }
    }
}

/// Push `effect` unless it would already be expired.
pub(crate) fn push_effect(effects: &mut Vec<StatusEffect>, effect: StatusEffect) {
    if effect.remaining_duration > 0 {
        effects.push(effect);
    }
}

/// Sum of defense bonuses in an effect list, in percent.
fn defense_bonus(effects: &[StatusEffect]) -> u32 {
    effects.iter().map(|e| e.kind.defense_bonus()).sum()
}

/// The shared character.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Aurora {
    /// Current health, `0..=max_health`.
    pub health: u32,
    /// Maximum health.
    pub max_health: u32,
    /// Current energy, `0..=max_energy`.
    pub energy: u32,
    /// Maximum energy.
    pub max_energy: u32,
    /// Flat damage reduction.
    pub defense: u32,
    /// Crit chance in percent.
    pub crit_chance: u32,
    /// Dodge chance in percent.
    pub dodge_chance: u32,
    /// Damage absorbed before health.
    pub shield: u32,
    /// Active status effects, in application order.
    pub status_effects: Vec<StatusEffect>,
    /// Ability name to turns remaining.
    pub cooldowns: BTreeMap<String, u32>,
    /// Single-use items.
    pub available_items: Vec<ItemDefinition>,
}

impl Default for Aurora {
    fn default() -> Self {
        Self {
            health: AURORA_BASE_HEALTH,
            max_health: AURORA_BASE_HEALTH,
            energy: AURORA_BASE_ENERGY,
            max_energy: AURORA_MAX_ENERGY,
            defense: AURORA_BASE_DEFENSE,
            crit_chance: AURORA_CRIT_CHANCE,
            dodge_chance: AURORA_DODGE_CHANCE,
            shield: 0,
            status_effects: Vec::new(),
            cooldowns: BTreeMap::new(),
            available_items: Vec::new(),
        }
    }
}

impl Aurora {
    /// Turns left on an ability's cooldown.
    #[must_use]
    pub fn cooldown(&self, ability: &str) -> u32 {
        self.cooldowns.get(ability).copied().unwrap_or(0)
    }

    /// Whether any active effect matches `predicate`.
    pub fn has_effect(&self, predicate: impl Fn(&EffectKind) -> bool) -> bool {
        self.status_effects.iter().any(|e| predicate(&e.kind))
    }

    /// Total active defense bonus in percent.
    #[must_use]
    pub fn defense_bonus(&self) -> u32 {
        defense_bonus(&self.status_effects)
    }

    /// Heal up to `amount`, returning the health actually restored.
    pub fn heal(&mut self, amount: u32) -> u32 {
        let before = self.health;
        self.health = clamp_add(self.health, i64::from(amount), self.max_health);
        self.health - before
    }

    /// Restore up to `amount` energy, returning the energy actually restored.
    pub fn restore_energy(&mut self, amount: u32) -> u32 {
        let before = self.energy;
        self.energy = clamp_add(self.energy, i64::from(amount), self.max_energy);
        self.energy - before
    }

    /// Pay an energy cost. Negative costs grant energy.
    pub fn spend_energy(&mut self, cost: i32) {
        self.energy = clamp_add(self.energy, -i64::from(cost), self.max_energy);
    }

    /// Lower every running cooldown by `turns`, flooring at zero.
    pub fn reduce_cooldowns(&mut self, turns: u32) {
        for remaining in self.cooldowns.values_mut() {
            *remaining = remaining.saturating_sub(turns);
        }
    }

    /// Remove all debuffs, returning how many were removed.
    pub fn clear_debuffs(&mut self) -> usize {
        let before = self.status_effects.len();
        self.status_effects.retain(|e| !e.kind.is_debuff());
        before - self.status_effects.len()
    }
}

/// The enemy for the current round.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnemyState {
    /// Template the enemy was built from.
    pub template: EnemyDefinition,
    /// Current health, `0..=template.health`.
    pub current_health: u32,
    /// Active status effects, in application order.
    pub status_effects: Vec<StatusEffect>,
    /// Ability name to turns remaining.
    pub cooldowns: BTreeMap<String, u32>,
}

impl EnemyState {
    /// Instantiate at full health.
    #[must_use]
    pub fn from_template(template: &EnemyDefinition) -> Self {
        Self {
            template: template.clone(),
            current_health: template.health,
            status_effects: Vec::new(),
            cooldowns: BTreeMap::new(),
        }
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.template.name
    }

    /// Turns left on an ability's cooldown.
    #[must_use]
    pub fn cooldown(&self, ability: &str) -> u32 {
        self.cooldowns.get(ability).copied().unwrap_or(0)
    }

    /// Whether the enemy skips its next action.
    #[must_use]
    pub fn is_stunned(&self) -> bool {
        self.status_effects
            .iter()
            .any(|e| matches!(e.kind, EffectKind::Stun))
    }
}

/// Per-round accumulators used for scoring.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BattleStats {
    /// Full turns completed this round.
    pub turns_elapsed: u32,
    /// Damage dealt to the enemy, including damage over time.
    pub damage_dealt: u32,
    /// Damage Aurora took to health.
    pub damage_taken: u32,
    /// Critical hits landed this round.
    pub critical_hits: u32,
    /// Distinct abilities used this round.
    pub abilities_used: BTreeSet<String>,
}

/// Root battle state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BattleState {
    /// Game phase.
    pub phase: Phase,
    /// Current round, `1..=MAX_ROUNDS`.
    pub round: u32,
    /// Position in the turn cycle.
    pub turn_phase: TurnPhase,
    /// Full turns completed this round.
    pub turn_counter: u32,
    /// Offense player.
    pub player1: Player,
    /// Defense player.
    pub player2: Player,
    /// Shared character.
    pub aurora: Aurora,
    /// Enemy for this round.
    pub current_enemy: EnemyState,
    /// Per-round scoring accumulators.
    pub battle_stats: BattleStats,
    /// Sum of completed round scores.
    pub total_score: u64,
    /// Player-facing log, append-only.
    pub battle_log: Vec<String>,
    /// Set while a transition is being applied; always false between calls.
    pub action_in_progress: bool,
    /// Set once the final round's score has been banked.
    pub game_complete: bool,
}

impl BattleState {
    /// Fresh round-1 state in [`Phase::Setup`] against `enemy`.
    #[must_use]
    pub fn new(player1_name: &str, player2_name: &str, enemy: &EnemyDefinition) -> Self {
        Self {
            phase: Phase::Setup,
            round: 1,
            turn_phase: TurnPhase::Player1,
            turn_counter: 0,
            player1: Player::new(PlayerRole::Offense, player1_name, "Player 1"),
            player2: Player::new(PlayerRole::Defense, player2_name, "Player 2"),
            aurora: Aurora::default(),
            current_enemy: EnemyState::from_template(enemy),
            battle_stats: BattleStats::default(),
            total_score: 0,
            battle_log: Vec::new(),
            action_in_progress: false,
            game_complete: false,
        }
    }

    /// Player record for an actor.
    #[must_use]
    pub const fn player(&self, actor: ActorRole) -> &Player {
        match actor {
            ActorRole::Player1 => &self.player1,
            ActorRole::Player2 => &self.player2,
        }
    }

    /// Mutable player record for an actor.
    pub fn player_mut(&mut self, actor: ActorRole) -> &mut Player {
        match actor {
            ActorRole::Player1 => &mut self.player1,
            ActorRole::Player2 => &mut self.player2,
        }
    }

    /// Append a line to the battle log.
    pub fn log(&mut self, line: impl Into<String>) {
        self.battle_log.push(line.into());
    }

    /// Set VICTORY or GAME_OVER if a side has fallen. Victory takes precedence.
    ///
    /// Returns the log line for a newly reached outcome.
    pub fn check_outcome(&mut self) -> Option<String> {
        if self.phase.is_terminal() {
            return None;
        }
        if self.current_enemy.current_health == 0 {
            self.phase = Phase::Victory;
            return Some(format!("{} has been defeated!", self.current_enemy.name()));
        }
        if self.aurora.health == 0 {
            self.phase = Phase::GameOver;
            return Some("Aurora has been defeated!".to_string());
        }
        None
    }

    /// Whether the whole game has ended.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.game_complete || matches!(self.phase, Phase::GameOver)
    }

    /// Deterministic hash of the whole state.
    ///
    /// The first eight bytes (little endian) of the SHA-256 of the bincode
    /// encoding, so hashes stored in replay files stay comparable across
    /// builds and toolchains.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = Sha256::new();
        if let Ok(bytes) = bincode::serialize(self) {
            hasher.update(&bytes);
        }
        let digest = hasher.finalize();
        let mut prefix = [0u8; 8];
        prefix.copy_from_slice(&digest[..8]);
        u64::from_le_bytes(prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::DamageRange;

    fn dummy_enemy() -> EnemyDefinition {
        EnemyDefinition {
            name: "Dummy".to_string(),
            description: String::new(),
            health: 30,
            damage: DamageRange::new(1, 2),
            defense: 10,
            crit_chance: None,
            dodge_chance: 0,
            abilities: Vec::new(),
            score_value: 0,
            drop_chance: 0,
        }
    }

    #[test]
    fn test_turn_phase_cycle() {
        let mut phase = TurnPhase::Player1;
        for _ in 0..4 {
            phase = phase.next();
        }
        assert_eq!(phase, TurnPhase::Player1);
        assert_eq!(TurnPhase::Player2.next(), TurnPhase::Enemy);
        assert_eq!(TurnPhase::Enemy.actor(), None);
    }

    #[test]
    fn test_parse_actor_and_action() {
        assert_eq!("player1".parse::<ActorRole>().ok(), Some(ActorRole::Player1));
        assert_eq!(" P2 ".parse::<ActorRole>().ok(), Some(ActorRole::Player2));
        assert!("enemy".parse::<ActorRole>().is_err());
        assert_eq!("wait".parse::<ActionKind>().ok(), Some(ActionKind::Skip));
        assert!(matches!(
            "cast".parse::<ActionKind>(),
            Err(BattleError::MalformedAction(_))
        ));
    }

    #[test]
    fn test_action_permissions() {
        assert!(ActionKind::Attack.allowed_for(ActorRole::Player1));
        assert!(!ActionKind::Attack.allowed_for(ActorRole::Player2));
        assert!(!ActionKind::Defend.allowed_for(ActorRole::Player1));
        assert!(ActionKind::Skip.allowed_for(ActorRole::Player2));
    }

    #[test]
    fn test_blank_names_fall_back() {
        let state = BattleState::new("  ", "Bea", &dummy_enemy());
        assert_eq!(state.player1.name, "Player 1");
        assert_eq!(state.player2.name, "Bea");
    }

    #[test]
    fn test_aurora_clamps() {
        let mut aurora = Aurora {
            health: 90,
            energy: 95,
            ..Aurora::default()
        };
        assert_eq!(aurora.heal(30), 10);
        assert_eq!(aurora.restore_energy(30), 5);
        aurora.spend_energy(120);
        assert_eq!(aurora.energy, 0);
        aurora.spend_energy(-25);
        assert_eq!(aurora.energy, 25);
    }

    #[test]
    fn test_zero_duration_is_not_pushed() {
        let mut effects = Vec::new();
        push_effect(
            &mut effects,
            StatusEffect::from_template(StatusEffectTemplate::new(EffectKind::Stun, 0), "x"),
        );
        assert!(effects.is_empty());
    }

    #[test]
    fn test_victory_precedes_defeat() {
        let mut state = BattleState::new("A", "B", &dummy_enemy());
        state.phase = Phase::Battle;
        state.current_enemy.current_health = 0;
        state.aurora.health = 0;
        assert_eq!(state.check_outcome().as_deref(), Some("Dummy has been defeated!"));
        assert_eq!(state.phase, Phase::Victory);
        assert_eq!(state.check_outcome(), None);
        assert_eq!(state.phase, Phase::Victory);
    }

    #[test]
    fn test_state_hash_tracks_changes() {
        let a = BattleState::new("A", "B", &dummy_enemy());
        let mut b = a.clone();
        assert_eq!(a.state_hash(), b.state_hash());
        b.aurora.shield = 1;
        assert_ne!(a.state_hash(), b.state_hash());
    }

    #[test]
    fn test_state_hash_is_sha256_of_encoding() {
        let state = BattleState::new("A", "B", &dummy_enemy());
        let bytes = bincode::serialize(&state).unwrap();
        let digest = Sha256::digest(&bytes);
        let expected = u64::from_le_bytes(digest[..8].try_into().unwrap());
        assert_eq!(state.state_hash(), expected);

        let restored: BattleState = bincode::deserialize(&bytes).unwrap();
        assert_eq!(restored.state_hash(), expected);
    }
}
