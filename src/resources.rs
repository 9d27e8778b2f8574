//! Resource stockpiles
//!
//! Stock never goes negative. Capacities are not persisted; they are
//! recomputed from the buildings on the board.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// Every stockpiled resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Food,
    Wood,
    // Building materials
    Stone,
    Iron,
    Crystal,
    // Enchanter reagents
    Ember,
    Frost,
    Spark,
    Venom,
    Aether,
    Gems,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 11] = [
        ResourceKind::Food,
        ResourceKind::Wood,
        ResourceKind::Stone,
        ResourceKind::Iron,
        ResourceKind::Crystal,
        ResourceKind::Ember,
        ResourceKind::Frost,
        ResourceKind::Spark,
        ResourceKind::Venom,
        ResourceKind::Aether,
        ResourceKind::Gems,
    ];

    pub const MATERIALS: [ResourceKind; 3] =
        [ResourceKind::Stone, ResourceKind::Iron, ResourceKind::Crystal];

    pub const REAGENTS: [ResourceKind; 5] = [
        ResourceKind::Ember,
        ResourceKind::Frost,
        ResourceKind::Spark,
        ResourceKind::Venom,
        ResourceKind::Aether,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Food => "food",
            ResourceKind::Wood => "wood",
            ResourceKind::Stone => "stone",
            ResourceKind::Iron => "iron",
            ResourceKind::Crystal => "crystal",
            ResourceKind::Ember => "ember",
            ResourceKind::Frost => "frost",
            ResourceKind::Spark => "spark",
            ResourceKind::Venom => "venom",
            ResourceKind::Aether => "aether",
            ResourceKind::Gems => "gems",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.as_str() == s)
    }

    /// Storage ceiling before any building bonus (`None` = unlimited)
    pub fn base_capacity(&self) -> Option<f64> {
        match self {
            ResourceKind::Food | ResourceKind::Wood => Some(100.0),
            ResourceKind::Stone | ResourceKind::Iron | ResourceKind::Crystal => Some(50.0),
            _ => None,
        }
    }

    /// Enchant energy provided by one unit, for reagents
    pub fn energy_per_unit(&self) -> Option<f64> {
        match self {
            ResourceKind::Ember => Some(10.0),
            ResourceKind::Frost => Some(10.0),
            ResourceKind::Spark => Some(15.0),
            ResourceKind::Venom => Some(15.0),
            ResourceKind::Aether => Some(40.0),
            _ => None,
        }
    }
}

/// Named stockpiles with optional ceilings
#[derive(Debug, Clone, PartialEq)]
pub struct ResourcePool {
    stock: BTreeMap<ResourceKind, f64>,
    capacity: BTreeMap<ResourceKind, f64>,
}

impl Default for ResourcePool {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourcePool {
    /// Empty stock with base capacities
    pub fn new() -> Self {
        let mut pool = Self {
            stock: ResourceKind::ALL.iter().map(|k| (*k, 0.0)).collect(),
            capacity: BTreeMap::new(),
        };
        pool.recompute_capacities(std::iter::empty());
        pool
    }

    pub fn amount(&self, kind: ResourceKind) -> f64 {
        self.stock.get(&kind).copied().unwrap_or(0.0)
    }

    pub fn capacity(&self, kind: ResourceKind) -> Option<f64> {
        self.capacity.get(&kind).copied()
    }

    /// Current stock for every resource
    pub fn iter(&self) -> impl Iterator<Item = (ResourceKind, f64)> + '_ {
        self.stock.iter().map(|(k, v)| (*k, *v))
    }

    /// Overwrite a stockpile, sanitising the value to a finite non-negative number
    pub fn set(&mut self, kind: ResourceKind, amount: f64) {
        let clean = if amount.is_finite() { amount.max(0.0) } else { 0.0 };
        if clean != amount {
            log::warn!("Clamped {} from {} to {}", kind.as_str(), amount, clean);
        }
        self.stock.insert(kind, clean);
    }

    /// Add to a stockpile up to its capacity. Returns the amount actually stored.
    pub fn add(&mut self, kind: ResourceKind, amount: f64) -> f64 {
        if !amount.is_finite() || amount <= 0.0 {
            return 0.0;
        }
        let current = self.amount(kind);
        let target = match self.capacity(kind) {
            Some(cap) => (current + amount).min(cap.max(current)),
            None => current + amount,
        };
        self.stock.insert(kind, target);
        target - current
    }

    /// Whether every listed cost can be paid
    pub fn can_afford(&self, costs: &[(ResourceKind, f64)]) -> bool {
        costs.iter().all(|(k, amt)| self.amount(*k) >= *amt)
    }

    /// Pay a single cost, leaving stock untouched on failure
    pub fn spend(&mut self, kind: ResourceKind, amount: f64) -> CoreResult<()> {
        self.spend_all(&[(kind, amount)])
    }

    /// Pay every cost or none of them
    pub fn spend_all(&mut self, costs: &[(ResourceKind, f64)]) -> CoreResult<()> {
        if costs.iter().any(|(_, amt)| !amt.is_finite() || *amt < 0.0) || !self.can_afford(costs) {
            return Err(CoreError::InsufficientResources);
        }
        for (kind, amount) in costs {
            let left = (self.amount(*kind) - amount).max(0.0);
            self.stock.insert(*kind, left);
        }
        Ok(())
    }

    /// Reset ceilings to base and add building bonuses on top
    pub fn recompute_capacities(&mut self, bonuses: impl IntoIterator<Item = (ResourceKind, f64)>) {
        self.capacity = ResourceKind::ALL
            .iter()
            .filter_map(|k| k.base_capacity().map(|c| (*k, c)))
            .collect();
        for (kind, bonus) in bonuses {
            if let Some(cap) = self.capacity.get_mut(&kind) {
                *cap += bonus;
            }
        }
    }
}
