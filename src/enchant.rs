//! Ball enchantments
//!
//! Every ball archetype climbs its own ladder. An attempt succeeds with a
//! probability set by the energy (EP) the player supplies; success applies one
//! random permanent outcome and raises the cost multiplier for the next reagent
//! batch. The recorded outcome history is all that is saved; bonuses are
//! rebuilt by replaying it in order.

use std::collections::BTreeMap;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::consts::{
    ENCHANT_COST_GROWTH_MAX, ENCHANT_COST_GROWTH_MIN, ENCHANT_COST_GROWTH_REPLAY,
    ENCHANT_REQUIRED_EP,
};
use crate::error::{CoreError, CoreResult};

/// Ball archetypes
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BallKind {
    Basic,
    Heavy,
    Splash,
    Sniper,
    Poison,
}

impl BallKind {
    pub const ALL: [BallKind; 5] = [
        BallKind::Basic,
        BallKind::Heavy,
        BallKind::Splash,
        BallKind::Sniper,
        BallKind::Poison,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BallKind::Basic => "basic",
            BallKind::Heavy => "heavy",
            BallKind::Splash => "splash",
            BallKind::Sniper => "sniper",
            BallKind::Poison => "poison",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.as_str() == s)
    }

    /// Outcomes an enchant of this ball can roll
    pub fn outcomes(&self) -> &'static [EnchantOutcome] {
        use EnchantOutcome::*;
        match self {
            BallKind::Basic => &[Damage, Speed, Size, CritChance],
            BallKind::Heavy => &[Damage, Sharpen, Size, Pierce],
            BallKind::Splash => &[Damage, SplashRadius, Speed, Overcharge],
            BallKind::Sniper => &[Sharpen, CritChance, Overcharge, Speed],
            BallKind::Poison => &[PoisonDamage, PoisonDuration, Speed, Size],
        }
    }
}

/// Permanent stat outcomes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnchantOutcome {
    Damage,
    Sharpen,
    Speed,
    Size,
    CritChance,
    Overcharge,
    SplashRadius,
    Pierce,
    PoisonDamage,
    PoisonDuration,
}

impl EnchantOutcome {
    pub const ALL: [EnchantOutcome; 10] = [
        EnchantOutcome::Damage,
        EnchantOutcome::Sharpen,
        EnchantOutcome::Speed,
        EnchantOutcome::Size,
        EnchantOutcome::CritChance,
        EnchantOutcome::Overcharge,
        EnchantOutcome::SplashRadius,
        EnchantOutcome::Pierce,
        EnchantOutcome::PoisonDamage,
        EnchantOutcome::PoisonDuration,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EnchantOutcome::Damage => "damage",
            EnchantOutcome::Sharpen => "sharpen",
            EnchantOutcome::Speed => "speed",
            EnchantOutcome::Size => "size",
            EnchantOutcome::CritChance => "crit_chance",
            EnchantOutcome::Overcharge => "overcharge",
            EnchantOutcome::SplashRadius => "splash_radius",
            EnchantOutcome::Pierce => "pierce",
            EnchantOutcome::PoisonDamage => "poison_damage",
            EnchantOutcome::PoisonDuration => "poison_duration",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|o| o.as_str() == s)
    }

    /// Apply this outcome to a ball's bonus accumulators
    pub fn apply(&self, bonuses: &mut BallBonuses) {
        match self {
            EnchantOutcome::Damage => bonuses.damage_add += 2.0,
            EnchantOutcome::Sharpen => bonuses.damage_mult *= 1.1,
            EnchantOutcome::Speed => bonuses.speed_mult *= 1.05,
            EnchantOutcome::Size => bonuses.size_add += 0.1,
            EnchantOutcome::CritChance => {
                bonuses.crit_chance = (bonuses.crit_chance + 0.05).min(1.0)
            }
            EnchantOutcome::Overcharge => bonuses.crit_multiplier = 3.0,
            EnchantOutcome::SplashRadius => bonuses.splash_radius += 0.5,
            EnchantOutcome::Pierce => bonuses.pierce += 1,
            EnchantOutcome::PoisonDamage => bonuses.poison_dps += 1.0,
            EnchantOutcome::PoisonDuration => bonuses.poison_duration += 0.5,
        }
    }
}

/// Accumulated bonuses for one ball archetype
#[derive(Debug, Clone, PartialEq)]
pub struct BallBonuses {
    pub damage_add: f64,
    pub damage_mult: f64,
    pub speed_mult: f64,
    pub size_add: f64,
    pub crit_chance: f64,
    pub crit_multiplier: f64,
    pub splash_radius: f64,
    pub pierce: u32,
    pub poison_dps: f64,
    pub poison_duration: f64,
}

impl Default for BallBonuses {
    fn default() -> Self {
        Self {
            damage_add: 0.0,
            damage_mult: 1.0,
            speed_mult: 1.0,
            size_add: 0.0,
            crit_chance: 0.0,
            crit_multiplier: 2.0,
            splash_radius: 0.0,
            pierce: 0,
            poison_dps: 0.0,
            poison_duration: 0.0,
        }
    }
}

/// Ladder state for one ball archetype
#[derive(Debug, Clone, PartialEq)]
pub struct EnchantState {
    /// 1 ..= max_level()
    pub level: u32,
    /// Outcomes in the order they were rolled
    pub history: Vec<EnchantOutcome>,
    pub bonuses: BallBonuses,
    /// Scales reagent production costs; compounds on every success
    pub cost_multiplier: f64,
}

impl Default for EnchantState {
    fn default() -> Self {
        Self {
            level: 1,
            history: Vec::new(),
            bonuses: BallBonuses::default(),
            cost_multiplier: 1.0,
        }
    }
}

impl EnchantState {
    pub fn is_maxed(&self) -> bool {
        self.level >= max_level()
    }

    fn apply_success(&mut self, outcome: EnchantOutcome, cost_growth: f64) {
        outcome.apply(&mut self.bonuses);
        self.history.push(outcome);
        self.level += 1;
        self.cost_multiplier *= cost_growth;
    }
}

/// Result of one enchant attempt
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnchantAttempt {
    pub success: bool,
    pub outcome: Option<EnchantOutcome>,
    /// Probability the attempt was rolled at
    pub rate: f64,
}

/// Terminal ladder level (no more attempts accepted)
pub const fn max_level() -> u32 {
    ENCHANT_REQUIRED_EP.len() as u32 + 1
}

/// EP needed for a guaranteed success at `level`, `None` once maxed
pub fn required_ep(level: u32) -> Option<f64> {
    let index = level.checked_sub(1)? as usize;
    ENCHANT_REQUIRED_EP.get(index).copied()
}

/// `min(1, supplied / required)`; zero at max level or for unusable input
pub fn compute_success_rate(level: u32, supplied_ep: f64) -> f64 {
    match required_ep(level) {
        Some(required) if supplied_ep.is_finite() && supplied_ep > 0.0 => {
            (supplied_ep / required).min(1.0)
        }
        _ => 0.0,
    }
}

/// Enchant ladders for every ball archetype
#[derive(Debug, Clone, PartialEq)]
pub struct Enchantments {
    balls: BTreeMap<BallKind, EnchantState>,
}

impl Default for Enchantments {
    fn default() -> Self {
        Self::new()
    }
}

impl Enchantments {
    pub fn new() -> Self {
        Self {
            balls: BallKind::ALL
                .iter()
                .map(|k| (*k, EnchantState::default()))
                .collect(),
        }
    }

    pub fn state(&self, ball: BallKind) -> &EnchantState {
        // Every kind is inserted in new()
        &self.balls[&ball]
    }

    pub fn iter(&self) -> impl Iterator<Item = (BallKind, &EnchantState)> {
        self.balls.iter().map(|(k, s)| (*k, s))
    }

    fn state_mut(&mut self, ball: BallKind) -> &mut EnchantState {
        self.balls.entry(ball).or_default()
    }

    pub fn success_rate(&self, ball: BallKind, supplied_ep: f64) -> f64 {
        compute_success_rate(self.state(ball).level, supplied_ep)
    }

    /// Reagent cost after the ball's escalation
    pub fn production_cost(&self, ball: BallKind, base_cost: f64) -> f64 {
        base_cost * self.state(ball).cost_multiplier
    }

    /// Roll one enchant attempt. Reagents are the caller's to consume.
    pub fn attempt<R: Rng + ?Sized>(
        &mut self,
        ball: BallKind,
        supplied_ep: f64,
        rng: &mut R,
    ) -> CoreResult<EnchantAttempt> {
        let state = self.state_mut(ball);
        if state.is_maxed() {
            return Err(CoreError::EnchantmentMaxed);
        }

        let rate = compute_success_rate(state.level, supplied_ep);
        let success = rng.random::<f64>() < rate;
        if !success {
            log::debug!("Enchant of {} failed at {:.0}%", ball.as_str(), rate * 100.0);
            return Ok(EnchantAttempt {
                success,
                outcome: None,
                rate,
            });
        }

        let outcomes = ball.outcomes();
        let outcome = outcomes[rng.random_range(0..outcomes.len())];
        let growth = rng.random_range(ENCHANT_COST_GROWTH_MIN..=ENCHANT_COST_GROWTH_MAX);
        state.apply_success(outcome, growth);
        log::info!(
            "Enchanted {} to level {} with {}",
            ball.as_str(),
            state.level,
            outcome.as_str()
        );

        Ok(EnchantAttempt {
            success,
            outcome: Some(outcome),
            rate,
        })
    }

    /// Reset a ball and re-apply a recorded history in order.
    ///
    /// Uses a fixed cost growth per step so the result is reproducible.
    /// Entries past the top of the ladder or outside the ball's outcome set
    /// are dropped.
    pub fn replay(&mut self, ball: BallKind, history: &[EnchantOutcome], cost_growth: f64) {
        let growth = if cost_growth.is_finite() && cost_growth > 0.0 {
            cost_growth
        } else {
            ENCHANT_COST_GROWTH_REPLAY
        };
        let state = self.state_mut(ball);
        *state = EnchantState::default();

        for outcome in history {
            if state.is_maxed() {
                log::warn!("Dropping enchant history past max level for {}", ball.as_str());
                break;
            }
            if !ball.outcomes().contains(outcome) {
                log::warn!(
                    "Skipping {} on {}: not in its outcome set",
                    outcome.as_str(),
                    ball.as_str()
                );
                continue;
            }
            state.apply_success(*outcome, growth);
        }
    }
}
