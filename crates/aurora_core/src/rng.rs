//! Random number service.
//!
//! All randomness in a battle goes through [`BattleRng`]. Games use
//! [`SeededRng`]; tests script exact outcomes with [`ScriptedRng`].

use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::data::DamageRange;
use crate::math::critical;

/// Outcome of a damage roll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DamageRoll {
    /// Damage after the crit multiplier.
    pub damage: u32,
    /// Whether the roll was a critical hit.
    pub critical: bool,
}

/// Narrow source of randomness for battle resolution.
pub trait BattleRng {
    /// Uniform integer in `min..=max`. Returns `min` when `max < min`.
    fn range_inclusive(&mut self, min: u32, max: u32) -> u32;

    /// `true` with probability `chance_percent`/100.
    fn roll(&mut self, chance_percent: u32) -> bool;

    /// Uniform index in `0..len`. `len` must be positive.
    fn pick_index(&mut self, len: usize) -> usize;

    /// Roll damage in `range`, then roll a critical hit at `crit_chance`.
    fn roll_damage(&mut self, range: DamageRange, crit_chance: u32) -> DamageRoll {
        let base = self.range_inclusive(range.min, range.max);
        let is_critical = self.roll(crit_chance);
        DamageRoll {
            damage: if is_critical { critical(base) } else { base },
            critical: is_critical,
        }
    }

    /// Uniformly pick one element.
    fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T>
    where
        Self: Sized,
    {
        if items.is_empty() {
            return None;
        }
        items.get(self.pick_index(items.len()))
    }

    /// Pick one element with probability proportional to `weight`.
    ///
    /// Falls back to the first element when all weights are zero.
    fn weighted_pick<'a, T>(&mut self, items: &'a [T], weight: impl Fn(&T) -> u32) -> Option<&'a T>
    where
        Self: Sized,
    {
        let total: u32 = items.iter().map(&weight).sum();
        if total == 0 {
            return items.first();
        }
        let mut remaining = self.range_inclusive(1, total);
        for item in items {
            let w = weight(item);
            if remaining <= w {
                return Some(item);
            }
            remaining -= w;
        }
        items.first()
    }

    /// Roll `drop_chance`, then pick a random item on success.
    fn loot_drop<'a, T>(&mut self, items: &'a [T], drop_chance: u32) -> Option<&'a T>
    where
        Self: Sized,
    {
        if !self.roll(drop_chance) {
            return None;
        }
        self.pick(items)
    }
}

/// Reproducible RNG seeded from a `u64`.
#[derive(Debug, Clone)]
pub struct SeededRng {
    seed: u64,
    inner: StdRng,
}

impl SeededRng {
    /// Create an RNG from a seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            inner: StdRng::seed_from_u64(seed),
        }
    }

    /// Seed this RNG was created with.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }
}

impl BattleRng for SeededRng {
    fn range_inclusive(&mut self, min: u32, max: u32) -> u32 {
        if max <= min {
            return min;
        }
        self.inner.random_range(min..=max)
    }

    fn roll(&mut self, chance_percent: u32) -> bool {
        self.inner.random_range(0..100) < chance_percent
    }

    fn pick_index(&mut self, len: usize) -> usize {
        if len <= 1 {
            return 0;
        }
        self.inner.random_range(0..len)
    }
}

/// RNG that replays queued outcomes.
///
/// Each call takes the next value from its queue. Empty queues yield the
/// minimum of a range, `false` for rolls and index 0, i.e. "no crit, no dodge,
/// first ability".
#[derive(Debug, Clone, Default)]
pub struct ScriptedRng {
    ranges: VecDeque<u32>,
    rolls: VecDeque<bool>,
    picks: VecDeque<usize>,
}

impl ScriptedRng {
    /// RNG with empty queues.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue range results. Values are clamped into the requested range.
    #[must_use]
    pub fn with_ranges(mut self, values: impl IntoIterator<Item = u32>) -> Self {
        self.ranges.extend(values);
        self
    }

    /// Queue roll results.
    #[must_use]
    pub fn with_rolls(mut self, values: impl IntoIterator<Item = bool>) -> Self {
        self.rolls.extend(values);
        self
    }

    /// Queue pick indices. Values are clamped to the slice length.
    #[must_use]
    pub fn with_picks(mut self, values: impl IntoIterator<Item = usize>) -> Self {
        self.picks.extend(values);
        self
    }

    /// Whether every queued value has been consumed.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.ranges.is_empty() && self.rolls.is_empty() && self.picks.is_empty()
    }
}

impl BattleRng for ScriptedRng {
    fn range_inclusive(&mut self, min: u32, max: u32) -> u32 {
        let max = max.max(min);
        self.ranges.pop_front().map_or(min, |v| v.clamp(min, max))
    }

    fn roll(&mut self, _chance_percent: u32) -> bool {
        self.rolls.pop_front().unwrap_or(false)
    }

    fn pick_index(&mut self, len: usize) -> usize {
        let last = len.saturating_sub(1);
        self.picks.pop_front().map_or(0, |i| i.min(last))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_rng_is_reproducible() {
        let mut a = SeededRng::new(42);
        let mut b = SeededRng::new(42);
        for _ in 0..50 {
            assert_eq!(a.range_inclusive(1, 100), b.range_inclusive(1, 100));
            assert_eq!(a.roll(50), b.roll(50));
        }
        assert_eq!(a.seed(), 42);
    }

    #[test]
    fn test_seeded_range_stays_in_bounds() {
        let mut rng = SeededRng::new(7);
        for _ in 0..200 {
            let v = rng.range_inclusive(15, 25);
            assert!((15..=25).contains(&v));
        }
        assert_eq!(rng.range_inclusive(0, 0), 0);
    }

    #[test]
    fn test_certain_and_impossible_rolls() {
        let mut rng = SeededRng::new(1);
        for _ in 0..100 {
            assert!(rng.roll(100));
            assert!(!rng.roll(0));
        }
    }

    #[test]
    fn test_scripted_defaults() {
        let mut rng = ScriptedRng::new();
        assert_eq!(rng.range_inclusive(15, 25), 15);
        assert!(!rng.roll(99));
        assert_eq!(rng.pick_index(3), 0);
    }

    #[test]
    fn test_scripted_values_are_clamped() {
        let mut rng = ScriptedRng::new().with_ranges([100, 0]).with_picks([9]);
        assert_eq!(rng.range_inclusive(15, 25), 25);
        assert_eq!(rng.range_inclusive(15, 25), 15);
        assert_eq!(rng.pick_index(3), 2);
        assert!(rng.is_exhausted());
    }

    #[test]
    fn test_roll_damage_applies_crit() {
        let mut rng = ScriptedRng::new().with_ranges([20]).with_rolls([true]);
        let roll = rng.roll_damage(DamageRange::new(15, 25), 15);
        assert_eq!(roll, DamageRoll { damage: 30, critical: true });
    }

    #[test]
    fn test_weighted_pick() {
        let items = [("a", 1), ("b", 3), ("c", 0)];
        let mut rng = ScriptedRng::new().with_ranges([1, 2, 4]);
        assert_eq!(rng.weighted_pick(&items, |i| i.1).map(|i| i.0), Some("a"));
        assert_eq!(rng.weighted_pick(&items, |i| i.1).map(|i| i.0), Some("b"));
        assert_eq!(rng.weighted_pick(&items, |i| i.1).map(|i| i.0), Some("b"));
        let zeros = [("x", 0)];
        assert_eq!(rng.weighted_pick(&zeros, |i| i.1).map(|i| i.0), Some("x"));
    }

    #[test]
    fn test_loot_drop() {
        let items = ["Debug Tool", "Power Surge"];
        let mut rng = ScriptedRng::new().with_rolls([false, true]).with_picks([1]);
        assert_eq!(rng.loot_drop(&items, 30), None);
        assert_eq!(rng.loot_drop(&items, 30), Some(&"Power Surge"));
        assert_eq!(rng.loot_drop::<&str>(&[], 100), None);
    }
}
