//! Cumulative experience to level conversion
//!
//! Levels are never stored. They are always derived from a monotonically
//! increasing counter by walking a requirement ladder, so the display path
//! and the save/load path go through the same function.

use serde::{Deserialize, Serialize};

use crate::consts::GOAL_LADDER;

/// Result of walking a counter up a requirement ladder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelProgress {
    /// Current level (1-based)
    pub level: u32,
    /// Counter left over inside the current level
    pub remainder: u64,
    /// Requirement to reach the next level, `None` when the ladder is exhausted
    pub next_requirement: Option<u64>,
}

/// Walk `counter` forward while it covers the requirement of the current level.
///
/// `requirement(level)` returns the cost of going from `level` to `level + 1`,
/// or `None` once the ladder has no further steps.
fn walk_ladder(counter: u64, mut requirement: impl FnMut(u32) -> Option<u64>) -> LevelProgress {
    let mut level = 1;
    let mut remainder = counter;
    loop {
        match requirement(level) {
            Some(req) if remainder >= req => {
                remainder -= req;
                level += 1;
            }
            next_requirement => {
                return LevelProgress {
                    level,
                    remainder,
                    next_requirement,
                };
            }
        }
    }
}

/// XP needed to go from `level` to `level + 1`: `base * L * (L + 1) / 2`.
///
/// A zero base is treated as 1 so the ladder always grows.
#[inline]
pub fn requirement_for_level(level: u32, base_amount: u64) -> u64 {
    let l = u64::from(level);
    let triangle = l.saturating_mul(l + 1) / 2;
    base_amount.max(1).saturating_mul(triangle)
}

/// Convert a cumulative XP total into level, in-level remainder and next requirement
pub fn level_from_cumulative_xp(total_xp: u64, base_amount: u64) -> LevelProgress {
    walk_ladder(total_xp, |level| {
        Some(requirement_for_level(level, base_amount))
    })
}

/// Total XP consumed to reach the start of `level`
pub fn cumulative_xp_for_level(level: u32, base_amount: u64) -> u64 {
    (1..level.max(1)).fold(0u64, |acc, l| {
        acc.saturating_add(requirement_for_level(l, base_amount))
    })
}

/// Walk a counter along a fixed table of per-step requirements.
///
/// Stops at the first entry the counter can't fully cover; once the table is
/// exhausted the level stays at `table.len() + 1` and the rest is remainder.
pub fn level_from_table(counter: u64, table: &[u64]) -> LevelProgress {
    walk_ladder(counter, |level| {
        table.get(level as usize - 1).copied()
    })
}

/// Long-lived player progression counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlayerProgression {
    /// Cumulative player XP (never decreases)
    pub total_xp: u64,
    /// Cumulative XP fed into the goal brick
    pub goal_xp: u64,
}

impl PlayerProgression {
    pub fn new() -> Self {
        Self::default()
    }

    /// Player level derived from the cumulative counter
    pub fn level(&self, base_amount: u64) -> LevelProgress {
        level_from_cumulative_xp(self.total_xp, base_amount)
    }

    /// Goal brick level derived from its own counter and ladder table
    pub fn goal_level(&self) -> LevelProgress {
        level_from_table(self.goal_xp, &GOAL_LADDER)
    }

    /// Add XP and return how many levels were gained
    pub fn add_xp(&mut self, amount: u64, base_amount: u64) -> u32 {
        let before = self.level(base_amount).level;
        self.total_xp = self.total_xp.saturating_add(amount);
        self.level(base_amount).level - before
    }

    /// Add goal XP and return how many goal levels were gained
    pub fn add_goal_xp(&mut self, amount: u64) -> u32 {
        let before = self.goal_level().level;
        self.goal_xp = self.goal_xp.saturating_add(amount);
        self.goal_level().level - before
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_zero_xp_is_level_one() {
        let p = level_from_cumulative_xp(0, 50);
        assert_eq!(p.level, 1);
        assert_eq!(p.remainder, 0);
        assert_eq!(p.next_requirement, Some(50));
    }

    #[test]
    fn test_exact_requirement_levels_up() {
        let p = level_from_cumulative_xp(50, 50);
        assert_eq!(p.level, 2);
        assert_eq!(p.remainder, 0);
        assert_eq!(p.next_requirement, Some(150));
    }

    #[test]
    fn test_just_short_of_level_three() {
        // 50 spent on 1 -> 2, 150 needed for 2 -> 3
        let p = level_from_cumulative_xp(149, 50);
        assert_eq!(p.level, 2);
        assert_eq!(p.remainder, 99);
        let p = level_from_cumulative_xp(200, 50);
        assert_eq!(p.level, 3);
        assert_eq!(p.remainder, 0);
    }

    #[test]
    fn test_cumulative_inverse() {
        assert_eq!(cumulative_xp_for_level(1, 50), 0);
        assert_eq!(cumulative_xp_for_level(2, 50), 50);
        assert_eq!(cumulative_xp_for_level(3, 50), 200);
        let total = cumulative_xp_for_level(12, 50);
        assert_eq!(level_from_cumulative_xp(total, 50).level, 12);
        assert_eq!(level_from_cumulative_xp(total - 1, 50).level, 11);
    }

    #[test]
    fn test_zero_base_terminates() {
        let p = level_from_cumulative_xp(10, 0);
        assert_eq!(p.level, 4);
        assert_eq!(p.remainder, 0);
    }

    #[test]
    fn test_table_walk_stops_at_uncovered_entry() {
        let table = [10, 20, 30];
        let p = level_from_table(25, &table);
        assert_eq!(p.level, 2);
        assert_eq!(p.remainder, 15);
        assert_eq!(p.next_requirement, Some(20));
    }

    #[test]
    fn test_table_walk_exhausted() {
        let table = [10, 20, 30];
        let p = level_from_table(75, &table);
        assert_eq!(p.level, 4);
        assert_eq!(p.remainder, 15);
        assert_eq!(p.next_requirement, None);
    }

    #[test]
    fn test_add_xp_reports_levels_gained() {
        let mut prog = PlayerProgression::new();
        assert_eq!(prog.add_xp(49, 50), 0);
        assert_eq!(prog.add_xp(151, 50), 2);
        assert_eq!(prog.level(50).level, 3);
        assert_eq!(prog.add_goal_xp(100), 1);
        assert_eq!(prog.goal_level().level, 2);
    }

    proptest! {
        #[test]
        fn prop_level_walk_is_consistent(total in 0u64..50_000_000, base in 1u64..500) {
            let p = level_from_cumulative_xp(total, base);
            let consumed = cumulative_xp_for_level(p.level, base);
            prop_assert!(consumed <= total);
            prop_assert_eq!(consumed + p.remainder, total);
            prop_assert!(p.next_requirement.unwrap() > p.remainder);
            prop_assert_eq!(p, level_from_cumulative_xp(total, base));
        }

        #[test]
        fn prop_table_walk_never_overshoots(counter in 0u64..100_000) {
            let p = level_from_table(counter, &GOAL_LADDER);
            let consumed: u64 = GOAL_LADDER.iter().take(p.level as usize - 1).sum();
            prop_assert_eq!(consumed + p.remainder, counter);
            if let Some(next) = p.next_requirement {
                prop_assert!(next > p.remainder);
            }
        }
    }
}
