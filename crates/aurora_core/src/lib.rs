//! # Aurora Core
//!
//! Turn-resolution engine for Aurora Protocol, a two-player cooperative
//! battle game: an offense player and a defense player share one character,
//! Aurora, against a computer-controlled enemy over five rounds.
//!
//! This crate contains **only** battle logic:
//! - No rendering
//! - No terminal IO
//! - No wall clock
//! - No ambient randomness (all rolls go through [`rng::BattleRng`])
//!
//! This separation enables:
//! - Any presentation layer on top of the same rules
//! - Headless auto-play and balance runs
//! - Replay recording and verification
//! - Determinism testing
//!
//! ## Crate Structure
//!
//! - [`battle`] - State machine: `create_battle`, `dispatch`, `advance_round`
//! - [`state`] - Battle state types
//! - [`content`] - Ability, item and enemy tables
//! - [`actions`] - Player action processors
//! - [`enemy_ai`] - Enemy turn
//! - [`effects`] - End-of-turn effect resolution
//! - [`scoring`] - Round scoring
//! - [`rng`] - Random number service
//! - [`replay`] - Replay recording and playback

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod actions;
pub mod battle;
pub mod content;
pub mod data;
pub mod effects;
pub mod enemy_ai;
pub mod error;
pub mod math;
pub mod replay;
pub mod rng;
pub mod scoring;
pub mod state;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::battle::{
        advance_round, advance_round_with, create_battle, create_battle_with, dispatch,
        dispatch_traced, dispatch_traced_with, dispatch_with, Battle, Dispatched, Frame, Transition,
    };
    pub use crate::content::{get_abilities_for_role, get_enemy_for_round, ContentTables};
    pub use crate::data::{
        AbilityDefinition, AbilityEffect, Affinity, DamageRange, EffectKind, EnemyAbility,
        EnemyDefinition, ItemDefinition, ItemEffect, StatusEffectTemplate, SupportEffect,
    };
    pub use crate::error::{BattleError, Result};
    pub use crate::replay::{Replay, ReplayStep};
    pub use crate::rng::{BattleRng, ScriptedRng, SeededRng};
    pub use crate::scoring::{calculate_score, ScoreBreakdown};
    pub use crate::state::{
        ActionKind, ActorRole, Aurora, BattleState, BattleStats, EnemyState, Phase, Player,
        PlayerRole, StatusEffect, TurnPhase, MAX_ROUNDS,
    };
}
