//! Integer arithmetic helpers for battle maths.
//!
//! Chances and fractional modifiers are stored as whole percentages and
//! evaluated with integer arithmetic, flooring where the rules call for a
//! floor. This keeps every result exact and identical across platforms.

/// Critical hits multiply damage by 3/2 (floored).
pub const CRIT_NUMERATOR: u32 = 3;
/// Denominator for the critical hit multiplier.
pub const CRIT_DENOMINATOR: u32 = 2;

/// Apply the critical hit multiplier (x1.5, floored).
#[must_use]
pub const fn critical(damage: u32) -> u32 {
    damage.saturating_mul(CRIT_NUMERATOR) / CRIT_DENOMINATOR
}

/// `percent`% of `value`, floored.
#[must_use]
pub const fn percent_of(value: u32, percent: u32) -> u32 {
    ((value as u64 * percent as u64) / 100) as u32
}

/// Damage left after subtracting `defense` scaled by `(100 + bonus_percent)%`.
///
/// Defense may become fractional after scaling, so the subtraction is done in
/// hundredths and floored. The result never drops below `floor`.
#[must_use]
pub fn reduce_by_defense(damage: u32, defense: u32, bonus_percent: u32, floor: u32) -> u32 {
    let scaled_damage = i64::from(damage) * 100;
    let scaled_defense = i64::from(defense) * (100 + i64::from(bonus_percent));
    let remaining = (scaled_damage - scaled_defense).div_euclid(100);
    remaining.max(i64::from(floor)) as u32
}

/// Add a signed delta to `value`, clamped to `[0, max]`.
#[must_use]
pub fn clamp_add(value: u32, delta: i64, max: u32) -> u32 {
    (i64::from(value) + delta).clamp(0, i64::from(max)) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_critical_floors() {
        assert_eq!(critical(20), 30);
        assert_eq!(critical(15), 22);
        assert_eq!(critical(0), 0);
    }

    #[test]
    fn test_percent_of() {
        assert_eq!(percent_of(100, 30), 30);
        assert_eq!(percent_of(85, 30), 25);
        assert_eq!(percent_of(100, 50), 50);
    }

    #[test]
    fn test_reduce_by_defense_without_bonus() {
        assert_eq!(reduce_by_defense(25, 10, 0, 1), 15);
        assert_eq!(reduce_by_defense(50, 5, 0, 1), 45);
    }

    #[test]
    fn test_reduce_by_defense_floors_at_minimum() {
        assert_eq!(reduce_by_defense(5, 10, 0, 1), 1);
        assert_eq!(reduce_by_defense(10, 10, 0, 1), 1);
    }

    #[test]
    fn test_reduce_by_defense_with_fractional_defense() {
        // 10 defense at +50% = 15
        assert_eq!(reduce_by_defense(20, 10, 50, 1), 5);
        // 5 defense at +50% = 7.5, 20 - 7.5 = 12.5 -> 12
        assert_eq!(reduce_by_defense(20, 5, 50, 1), 12);
    }

    #[test]
    fn test_clamp_add() {
        assert_eq!(clamp_add(95, 5, 100), 100);
        assert_eq!(clamp_add(95, 10, 100), 100);
        assert_eq!(clamp_add(10, -15, 100), 0);
        assert_eq!(clamp_add(40, -15, 100), 25);
    }
}
