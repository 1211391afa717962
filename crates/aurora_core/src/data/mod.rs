//! Data structures for battle content.
//!
//! This module contains pure data structures that define abilities, items,
//! enemies and the effects they apply. All structs are designed to be
//! deserialized from RON files.
//!
//! **Note:** This module contains no IO - it only defines data types.
//! Loading and the built-in tables live in [`crate::content`].

mod ability_data;
mod effect_data;
mod enemy_data;

pub use ability_data::{AbilityDefinition, AbilityEffect, Affinity, ItemDefinition};
pub use effect_data::{
    DamageRange, EffectKind, ItemEffect, StatusEffectTemplate, SupportEffect,
};
pub use enemy_data::{EnemyAbility, EnemyDefinition, BASIC_ATTACK, DEFAULT_ENEMY_CRIT_CHANCE};
