//! Bricks placed on the home base

use glam::{IVec2, UVec2};
use serde::{Deserialize, Serialize};

use crate::resources::ResourceKind;

/// Stable brick identity, independent of the cells it covers
pub type BrickId = u32;

/// Brick types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BrickKind {
    #[default]
    Normal,
    Armored,
    Gold,
    Gem,
    /// The goal brick levels up from its own XP ladder
    Goal,
    // Buildings
    Granary,
    Lumberyard,
    Warehouse,
    Enchanter,
}

impl BrickKind {
    pub const ALL: [BrickKind; 9] = [
        BrickKind::Normal,
        BrickKind::Armored,
        BrickKind::Gold,
        BrickKind::Gem,
        BrickKind::Goal,
        BrickKind::Granary,
        BrickKind::Lumberyard,
        BrickKind::Warehouse,
        BrickKind::Enchanter,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BrickKind::Normal => "normal",
            BrickKind::Armored => "armored",
            BrickKind::Gold => "gold",
            BrickKind::Gem => "gem",
            BrickKind::Goal => "goal",
            BrickKind::Granary => "granary",
            BrickKind::Lumberyard => "lumberyard",
            BrickKind::Warehouse => "warehouse",
            BrickKind::Enchanter => "enchanter",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.as_str() == s)
    }

    /// Footprint used when a brick is created without an explicit size
    pub fn default_size(&self) -> UVec2 {
        match self {
            BrickKind::Goal | BrickKind::Granary | BrickKind::Lumberyard | BrickKind::Enchanter => {
                UVec2::new(2, 2)
            }
            BrickKind::Warehouse => UVec2::new(3, 2),
            _ => UVec2::ONE,
        }
    }

    /// Storage added per building level
    pub fn storage_per_level(&self) -> &'static [(ResourceKind, f64)] {
        match self {
            BrickKind::Granary => &[(ResourceKind::Food, 50.0)],
            BrickKind::Lumberyard => &[(ResourceKind::Wood, 50.0)],
            BrickKind::Warehouse => &[
                (ResourceKind::Stone, 25.0),
                (ResourceKind::Iron, 25.0),
                (ResourceKind::Crystal, 25.0),
            ],
            _ => &[],
        }
    }
}

/// A brick on the board
#[derive(Debug, Clone, PartialEq)]
pub struct Brick {
    /// Assigned by the board on placement
    pub id: BrickId,
    pub kind: BrickKind,
    pub level: u32,
    /// Top-left cell of the footprint
    pub anchor: IVec2,
    /// Footprint in cells
    pub size: UVec2,
    pub health: f64,
    pub max_health: f64,
    pub coins: f64,
    pub max_coins: f64,
    pub gems: f64,
    pub max_gems: f64,
}

impl Brick {
    /// A full-health brick of the given kind and level with its default footprint
    pub fn new(kind: BrickKind, level: u32) -> Self {
        let level = level.max(1);
        let max_health = 10.0 * f64::from(level);
        let max_coins = match kind {
            BrickKind::Gold => 5.0 * f64::from(level),
            _ => f64::from(level),
        };
        let max_gems = match kind {
            BrickKind::Gem => f64::from(level),
            _ => 0.0,
        };
        Self {
            id: 0,
            kind,
            level,
            anchor: IVec2::ZERO,
            size: kind.default_size(),
            health: max_health,
            max_health,
            coins: max_coins,
            max_coins,
            gems: max_gems,
            max_gems,
        }
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.size = UVec2::new(width.max(1), height.max(1));
        self
    }

    /// Whether the cell lies inside this brick's footprint
    pub fn covers(&self, cell: IVec2) -> bool {
        let rel = cell - self.anchor;
        rel.x >= 0 && rel.y >= 0 && (rel.x as u32) < self.size.x && (rel.y as u32) < self.size.y
    }

    pub fn is_building(&self) -> bool {
        !self.kind.storage_per_level().is_empty() || self.kind == BrickKind::Enchanter
    }

    /// Storage this brick contributes at its current level
    pub fn storage_bonus(&self) -> impl Iterator<Item = (ResourceKind, f64)> + '_ {
        let level = f64::from(self.level);
        self.kind
            .storage_per_level()
            .iter()
            .map(move |(kind, per_level)| (*kind, per_level * level))
    }

    /// Apply damage, returning true when the brick breaks
    pub fn damage(&mut self, amount: f64) -> bool {
        self.health = (self.health - amount.max(0.0)).max(0.0);
        self.health <= 0.0
    }
}
