//! Player inventory: stacked items, owned equipment and unlocked slots
//!
//! Detached overlays live in the board's overlay relation, not here.

use std::collections::BTreeMap;

use crate::enchant::BallKind;
use crate::equipment::Equipment;
use crate::error::{CoreError, CoreResult};

/// Equipment slots every ball starts with
pub const DEFAULT_SLOTS: u32 = 1;
pub const MAX_SLOTS: u32 = 4;

#[derive(Debug, Clone, PartialEq)]
pub struct Inventory {
    items: BTreeMap<String, u32>,
    equipment: Vec<Equipment>,
    unlocked_slots: BTreeMap<BallKind, u32>,
}

impl Default for Inventory {
    fn default() -> Self {
        Self::new()
    }
}

impl Inventory {
    pub fn new() -> Self {
        Self {
            items: BTreeMap::new(),
            equipment: Vec::new(),
            unlocked_slots: BallKind::ALL.iter().map(|b| (*b, DEFAULT_SLOTS)).collect(),
        }
    }

    pub fn item_count(&self, id: &str) -> u32 {
        self.items.get(id).copied().unwrap_or(0)
    }

    pub fn items(&self) -> impl Iterator<Item = (&str, u32)> {
        self.items.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn add_item(&mut self, id: &str, count: u32) {
        if count == 0 {
            return;
        }
        let stack = self.items.entry(id.to_string()).or_insert(0);
        *stack = stack.saturating_add(count);
    }

    /// Take items off a stack; fails without change if there aren't enough
    pub fn take_item(&mut self, id: &str, count: u32) -> CoreResult<()> {
        let have = self.item_count(id);
        if have < count {
            return Err(CoreError::InsufficientResources);
        }
        if have == count {
            self.items.remove(id);
        } else {
            self.items.insert(id.to_string(), have - count);
        }
        Ok(())
    }

    pub fn equipment(&self) -> &[Equipment] {
        &self.equipment
    }

    /// Archetype ids already collected, for excluding from drops
    pub fn owned_archetypes(&self) -> Vec<&'static str> {
        self.equipment.iter().map(|e| e.id).collect()
    }

    pub fn add_equipment(&mut self, item: Equipment) {
        self.equipment.push(item);
    }

    /// Swap an owned item for its next rarity tier. Returns false at Epic.
    pub fn upgrade_equipment(&mut self, index: usize) -> bool {
        let Some(upgraded) = self.equipment.get(index).and_then(Equipment::upgraded) else {
            return false;
        };
        self.equipment[index] = upgraded;
        true
    }

    pub fn slots(&self, ball: BallKind) -> u32 {
        self.unlocked_slots.get(&ball).copied().unwrap_or(DEFAULT_SLOTS)
    }

    pub fn slot_counts(&self) -> impl Iterator<Item = (BallKind, u32)> + '_ {
        BallKind::ALL.iter().map(|b| (*b, self.slots(*b)))
    }

    pub fn set_slots(&mut self, ball: BallKind, slots: u32) {
        self.unlocked_slots
            .insert(ball, slots.clamp(DEFAULT_SLOTS, MAX_SLOTS));
    }

    /// Unlock one more slot; false when already at the cap
    pub fn unlock_slot(&mut self, ball: BallKind) -> bool {
        let current = self.slots(ball);
        if current >= MAX_SLOTS {
            return false;
        }
        self.set_slots(ball, current + 1);
        true
    }
}
