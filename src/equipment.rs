//! Equipment archetypes and random drops
//!
//! Each archetype is a plain table row: static text plus two function
//! pointers, one scaling the effect by rarity and one rendering it as text.
//! Items are immutable values; upgrading produces a new item.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::consts::{RARITY_WEIGHTS, RARITY_WEIGHTS_LUCKY};
use crate::error::{CoreError, CoreResult};
use crate::weighted;

/// Rarity tiers, ordered from most to least common
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    Common,
    Rare,
    Epic,
}

impl Rarity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rarity::Common => "Common",
            Rarity::Rare => "Rare",
            Rarity::Epic => "Epic",
        }
    }

    /// The next tier up, if any
    pub fn next(&self) -> Option<Rarity> {
        match self {
            Rarity::Common => Some(Rarity::Rare),
            Rarity::Rare => Some(Rarity::Epic),
            Rarity::Epic => None,
        }
    }

    /// Weight table for a rarity roll. Rarer tiers come first so they are
    /// checked first against the draw.
    pub fn roll_weights(better_luck: bool) -> [(Rarity, f64); 3] {
        let [epic, rare, common] = if better_luck {
            RARITY_WEIGHTS_LUCKY
        } else {
            RARITY_WEIGHTS
        };
        [
            (Rarity::Epic, epic),
            (Rarity::Rare, rare),
            (Rarity::Common, common),
        ]
    }
}

/// A rarity-scaled effect value
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EffectValue {
    /// Single number (percent or flat, depending on the archetype)
    Scalar(f64),
    /// Chance-based effect with a magnitude
    Proc { chance: f64, amount: f64 },
}

/// Static per-archetype configuration fed to the describe function
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectConfig {
    /// What the bonus applies to, e.g. "ball damage"
    pub subject: &'static str,
}

/// One row of the equipment table
#[derive(Debug)]
pub struct Archetype {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub config: Option<EffectConfig>,
    effect: fn(Rarity) -> EffectValue,
    describe: fn(&EffectValue, Option<&EffectConfig>) -> String,
}

impl Archetype {
    pub fn effect(&self, rarity: Rarity) -> EffectValue {
        (self.effect)(rarity)
    }

    pub fn describe_effect(&self, value: &EffectValue) -> String {
        (self.describe)(value, self.config.as_ref())
    }
}

/// A concrete item instance
#[derive(Debug, Clone, PartialEq)]
pub struct Equipment {
    pub id: &'static str,
    pub rarity: Rarity,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub effect: EffectValue,
    /// Precomputed human-readable effect
    pub effect_text: String,
}

impl Equipment {
    /// A copy of this item one rarity tier higher, `None` at Epic
    pub fn upgraded(&self) -> Option<Equipment> {
        let rarity = self.rarity.next()?;
        instantiate(self.id, rarity).ok()
    }
}

/// Minimal persisted form of an item; everything else is rebuilt from the table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquipmentRef {
    pub id: String,
    pub rarity: Rarity,
}

impl From<&Equipment> for EquipmentRef {
    fn from(item: &Equipment) -> Self {
        Self {
            id: item.id.to_string(),
            rarity: item.rarity,
        }
    }
}

fn scaled(common: f64, rare: f64, epic: f64, rarity: Rarity) -> f64 {
    match rarity {
        Rarity::Common => common,
        Rarity::Rare => rare,
        Rarity::Epic => epic,
    }
}

fn fmt_num(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.1}")
    }
}

fn describe_percent(value: &EffectValue, config: Option<&EffectConfig>) -> String {
    let subject = config.map(|c| c.subject).unwrap_or("everything");
    match value {
        EffectValue::Scalar(v) => format!("+{}% {}", fmt_num(*v), subject),
        EffectValue::Proc { chance, amount } => {
            format!("{}% chance of +{}% {}", fmt_num(*chance), fmt_num(*amount), subject)
        }
    }
}

fn describe_flat(value: &EffectValue, config: Option<&EffectConfig>) -> String {
    let subject = config.map(|c| c.subject).unwrap_or("bonus");
    match value {
        EffectValue::Scalar(v) => format!("+{} {}", fmt_num(*v), subject),
        EffectValue::Proc { chance, amount } => {
            format!("{}% chance of +{} {}", fmt_num(*chance), fmt_num(*amount), subject)
        }
    }
}

fn describe_split(value: &EffectValue, _config: Option<&EffectConfig>) -> String {
    match value {
        EffectValue::Proc { chance, amount } => {
            let plural = if *amount == 1.0 { "" } else { "s" };
            format!(
                "{}% chance to split into {} extra ball{}",
                fmt_num(*chance),
                fmt_num(*amount),
                plural
            )
        }
        EffectValue::Scalar(v) => format!("{}% chance to split", fmt_num(*v)),
    }
}

fn describe_ignite(value: &EffectValue, _config: Option<&EffectConfig>) -> String {
    match value {
        EffectValue::Proc { chance, amount } => format!(
            "{}% chance to ignite bricks for {} damage per second",
            fmt_num(*chance),
            fmt_num(*amount)
        ),
        EffectValue::Scalar(v) => format!("Ignites bricks for {} damage per second", fmt_num(*v)),
    }
}

/// Every equipment archetype, in catalog order
pub static ARCHETYPES: [Archetype; 10] = [
    Archetype {
        id: "whetstone",
        name: "Whetstone",
        description: "Keeps every ball's edge sharp.",
        icon: "🗡",
        config: Some(EffectConfig { subject: "ball damage" }),
        effect: |r| EffectValue::Scalar(scaled(10.0, 20.0, 35.0, r)),
        describe: describe_percent,
    },
    Archetype {
        id: "feather",
        name: "Feather",
        description: "Lighter balls fly faster.",
        icon: "🪶",
        config: Some(EffectConfig { subject: "ball speed" }),
        effect: |r| EffectValue::Scalar(scaled(5.0, 10.0, 18.0, r)),
        describe: describe_percent,
    },
    Archetype {
        id: "lucky_coin",
        name: "Lucky Coin",
        description: "Bricks cough up extra change.",
        icon: "🪙",
        config: Some(EffectConfig { subject: "coins from bricks" }),
        effect: |r| EffectValue::Scalar(scaled(10.0, 25.0, 50.0, r)),
        describe: describe_percent,
    },
    Archetype {
        id: "gem_lens",
        name: "Gem Lens",
        description: "Spots gems hidden in the mortar.",
        icon: "🔎",
        config: Some(EffectConfig { subject: "gem drop chance" }),
        effect: |r| EffectValue::Scalar(scaled(2.0, 4.0, 8.0, r)),
        describe: describe_percent,
    },
    Archetype {
        id: "granary_plans",
        name: "Granary Plans",
        description: "Better shelving for the harvest.",
        icon: "📜",
        config: Some(EffectConfig { subject: "food storage" }),
        effect: |r| EffectValue::Scalar(scaled(10.0, 20.0, 40.0, r)),
        describe: describe_percent,
    },
    Archetype {
        id: "saw_blade",
        name: "Saw Blade",
        description: "Lumberyards cut twice as clean.",
        icon: "🪚",
        config: Some(EffectConfig { subject: "wood production" }),
        effect: |r| EffectValue::Scalar(scaled(10.0, 20.0, 40.0, r)),
        describe: describe_percent,
    },
    Archetype {
        id: "splitter",
        name: "Splitter",
        description: "Balls sometimes divide on impact.",
        icon: "✂",
        config: None,
        effect: |r| EffectValue::Proc {
            chance: scaled(5.0, 10.0, 20.0, r),
            amount: scaled(1.0, 1.0, 2.0, r),
        },
        describe: describe_split,
    },
    Archetype {
        id: "ember_core",
        name: "Ember Core",
        description: "A smoldering heart that sets bricks alight.",
        icon: "🔥",
        config: None,
        effect: |r| EffectValue::Proc {
            chance: scaled(10.0, 15.0, 25.0, r),
            amount: scaled(2.0, 4.0, 8.0, r),
        },
        describe: describe_ignite,
    },
    Archetype {
        id: "magnet",
        name: "Magnet",
        description: "Pulls drops toward the paddle.",
        icon: "🧲",
        config: Some(EffectConfig { subject: "pickup radius" }),
        effect: |r| EffectValue::Scalar(scaled(1.0, 2.0, 3.0, r)),
        describe: describe_flat,
    },
    Archetype {
        id: "hourglass",
        name: "Hourglass",
        description: "Time away still counts for something.",
        icon: "⌛",
        config: Some(EffectConfig { subject: "offline progress" }),
        effect: |r| EffectValue::Scalar(scaled(5.0, 10.0, 20.0, r)),
        describe: describe_percent,
    },
];

/// Look up an archetype by id
pub fn archetype(id: &str) -> Option<&'static Archetype> {
    ARCHETYPES.iter().find(|a| a.id == id)
}

/// Build an item for an archetype and rarity
pub fn instantiate(id: &str, rarity: Rarity) -> CoreResult<Equipment> {
    let arch = archetype(id).ok_or_else(|| CoreError::UnknownArchetype(id.to_string()))?;
    let effect = arch.effect(rarity);
    Ok(Equipment {
        id: arch.id,
        rarity,
        name: arch.name,
        description: arch.description,
        icon: arch.icon,
        effect,
        effect_text: arch.describe_effect(&effect),
    })
}

/// Roll a random item the player doesn't already own.
///
/// Returns `Ok(None)` once every archetype is excluded.
pub fn draw_random<R: Rng + ?Sized>(
    rng: &mut R,
    excluded: &[&str],
    better_luck: bool,
) -> CoreResult<Option<Equipment>> {
    let available: Vec<&Archetype> = ARCHETYPES
        .iter()
        .filter(|a| !excluded.contains(&a.id))
        .collect();
    if available.is_empty() {
        log::debug!("Equipment collection exhausted");
        return Ok(None);
    }

    let arch = available[rng.random_range(0..available.len())];
    let rarity = weighted::choose_copied(rng, &Rarity::roll_weights(better_luck))?;
    let item = instantiate(arch.id, rarity)?;
    log::info!("Rolled {} {} ({})", rarity.as_str(), item.name, item.effect_text);
    Ok(Some(item))
}
