//! Round scoring.
//!
//! ```text
//! score = VICTORY_BASE
//!       + damage_taken * HEALTH_REMAINING
//!       + max(0, PAR_TURNS - turns_elapsed) * QUICK_BATTLE
//!       + distinct_abilities * VARIETY_BONUS
//!       + critical_hits * CRITICAL_HIT
//! total = floor(score * (1 + max_consecutive_hits * 10%))
//! ```
//!
//! The second term rewards damage *taken*, not health remaining, despite the
//! multiplier's name. It is kept as-is so scores stay comparable with
//! existing high-score tables.

use serde::{Deserialize, Serialize};

use crate::state::{BattleStats, Player};

/// Flat score for winning a round.
pub const VICTORY_BASE: u64 = 100;
/// Multiplier applied to damage taken.
pub const HEALTH_REMAINING: u64 = 2;
/// Bonus per turn under par.
pub const QUICK_BATTLE: u64 = 50;
/// Expected number of turns per round.
pub const PAR_TURNS: u32 = 5;
/// Bonus per distinct ability used.
pub const VARIETY_BONUS: u64 = 20;
/// Bonus per critical hit.
pub const CRITICAL_HIT: u64 = 10;
/// Percent added to the multiplier per consecutive hit.
pub const CONSECUTIVE_SUCCESS_PERCENT: u64 = 10;

/// Itemised round score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    /// Flat victory award.
    pub victory: u64,
    /// Damage-taken term.
    pub damage_taken: u64,
    /// Quick-battle term.
    pub quick_battle: u64,
    /// Ability-variety term.
    pub variety: u64,
    /// Critical-hit term.
    pub critical_hits: u64,
    /// Best consecutive-hit streak of the two players.
    pub consecutive_hits: u32,
    /// Final score after the streak multiplier.
    pub total: u64,
}

impl ScoreBreakdown {
    /// Sum before the streak multiplier.
    #[must_use]
    pub const fn subtotal(&self) -> u64 {
        self.victory + self.damage_taken + self.quick_battle + self.variety + self.critical_hits
    }
}

/// Score a won round.
#[must_use]
pub fn calculate_score(stats: &BattleStats, player1: &Player, player2: &Player) -> ScoreBreakdown {
    let consecutive_hits = player1.consecutive_hits.max(player2.consecutive_hits);
    let mut breakdown = ScoreBreakdown {
        victory: VICTORY_BASE,
        damage_taken: u64::from(stats.damage_taken) * HEALTH_REMAINING,
        quick_battle: u64::from(PAR_TURNS.saturating_sub(stats.turns_elapsed)) * QUICK_BATTLE,
        variety: stats.abilities_used.len() as u64 * VARIETY_BONUS,
        critical_hits: u64::from(stats.critical_hits) * CRITICAL_HIT,
        consecutive_hits,
        total: 0,
    };
    let multiplier = 100 + u64::from(consecutive_hits) * CONSECUTIVE_SUCCESS_PERCENT;
    breakdown.total = breakdown.subtotal() * multiplier / 100;
    breakdown
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::PlayerRole;

    fn players(p1_streak: u32, p2_streak: u32) -> (Player, Player) {
        let mut p1 = Player::new(PlayerRole::Offense, "Ada", "Player 1");
        let mut p2 = Player::new(PlayerRole::Defense, "Bo", "Player 2");
        p1.consecutive_hits = p1_streak;
        p2.consecutive_hits = p2_streak;
        (p1, p2)
    }

    #[test]
    fn test_minimal_score() {
        let stats = BattleStats {
            turns_elapsed: 9,
            ..BattleStats::default()
        };
        let (p1, p2) = players(0, 0);
        assert_eq!(calculate_score(&stats, &p1, &p2).total, VICTORY_BASE);
    }

    #[test]
    fn test_every_term() {
        let stats = BattleStats {
            turns_elapsed: 3,
            damage_dealt: 80,
            damage_taken: 12,
            critical_hits: 2,
            abilities_used: ["Data Breach", "Firewall", "Code Injection"]
                .into_iter()
                .map(String::from)
                .collect(),
        };
        let (p1, p2) = players(2, 3);
        let score = calculate_score(&stats, &p1, &p2);
        // 100 + 24 + 100 + 60 + 20 = 304, x1.3 = 395.2
        assert_eq!(score.subtotal(), 304);
        assert_eq!(score.consecutive_hits, 3);
        assert_eq!(score.total, 395);
    }
}
