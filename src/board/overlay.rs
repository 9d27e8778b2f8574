//! Overlays and the brick they are attached to
//!
//! The link is an id-keyed relation kept on both sides: each overlay records
//! its host brick, and a reverse index maps a brick to its overlay. An overlay
//! without a host sits in the player's inventory.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use super::brick::BrickId;
use crate::error::{CoreError, CoreResult};

/// Stable overlay identity
pub type OverlayId = u32;

/// Overlay types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlayKind {
    Spikes,
    Shield,
    Regen,
    Bounty,
    Mirror,
}

impl OverlayKind {
    pub const ALL: [OverlayKind; 5] = [
        OverlayKind::Spikes,
        OverlayKind::Shield,
        OverlayKind::Regen,
        OverlayKind::Bounty,
        OverlayKind::Mirror,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OverlayKind::Spikes => "spikes",
            OverlayKind::Shield => "shield",
            OverlayKind::Regen => "regen",
            OverlayKind::Bounty => "bounty",
            OverlayKind::Mirror => "mirror",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.as_str() == s)
    }
}

/// A detachable brick upgrade
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Overlay {
    pub id: OverlayId,
    pub kind: OverlayKind,
    pub level: u32,
    /// Brick this overlay is attached to, `None` while in the inventory
    host: Option<BrickId>,
}

impl Overlay {
    pub fn host(&self) -> Option<BrickId> {
        self.host
    }
}

/// All overlays plus the overlay <-> brick relation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverlayRelation {
    overlays: BTreeMap<OverlayId, Overlay>,
    by_brick: HashMap<BrickId, OverlayId>,
    next_id: OverlayId,
}

impl OverlayRelation {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            ..Default::default()
        }
    }

    /// Create an unattached overlay and return its fresh id
    pub fn create(&mut self, kind: OverlayKind, level: u32) -> OverlayId {
        let id = self.next_id.max(1);
        self.next_id = id + 1;
        self.overlays.insert(
            id,
            Overlay {
                id,
                kind,
                level: level.max(1),
                host: None,
            },
        );
        id
    }

    pub fn get(&self, id: OverlayId) -> Option<&Overlay> {
        self.overlays.get(&id)
    }

    /// Overlay attached to a brick, if any
    pub fn on_brick(&self, brick: BrickId) -> Option<&Overlay> {
        self.by_brick.get(&brick).and_then(|id| self.overlays.get(id))
    }

    /// Link an overlay and a brick on both sides.
    ///
    /// Re-attaching the same pair is a no-op.
    pub fn attach(&mut self, overlay: OverlayId, brick: BrickId) -> CoreResult<()> {
        let current_host = self
            .overlays
            .get(&overlay)
            .ok_or(CoreError::UnknownOverlay(overlay))?
            .host;
        match current_host {
            Some(host) if host == brick => return Ok(()),
            Some(_) => return Err(CoreError::AlreadyHosted(overlay)),
            None => {}
        }
        if let Some(existing) = self.by_brick.get(&brick) {
            if *existing != overlay {
                return Err(CoreError::AlreadyOverlaid(brick));
            }
        }

        self.by_brick.insert(brick, overlay);
        if let Some(o) = self.overlays.get_mut(&overlay) {
            o.host = Some(brick);
        }
        Ok(())
    }

    /// Unlink an overlay from its host. No-op when already detached.
    pub fn detach(&mut self, overlay: OverlayId) -> CoreResult<()> {
        let o = self
            .overlays
            .get_mut(&overlay)
            .ok_or(CoreError::UnknownOverlay(overlay))?;
        if let Some(host) = o.host.take() {
            self.by_brick.remove(&host);
        }
        Ok(())
    }

    /// Detach whatever overlay a brick carries, returning its id
    pub fn detach_brick(&mut self, brick: BrickId) -> Option<OverlayId> {
        let id = self.by_brick.remove(&brick)?;
        if let Some(o) = self.overlays.get_mut(&id) {
            o.host = None;
        }
        Some(id)
    }

    /// Delete an overlay entirely, detaching it first
    pub fn remove(&mut self, overlay: OverlayId) -> Option<Overlay> {
        let mut o = self.overlays.remove(&overlay)?;
        if let Some(host) = o.host.take() {
            self.by_brick.remove(&host);
        }
        Some(o)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Overlay> {
        self.overlays.values()
    }

    /// Overlays sitting in the inventory
    pub fn unattached(&self) -> impl Iterator<Item = &Overlay> {
        self.overlays.values().filter(|o| o.host.is_none())
    }

    pub fn len(&self) -> usize {
        self.overlays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.overlays.is_empty()
    }

    /// Both sides of the relation agree
    pub fn is_consistent(&self) -> bool {
        let forward = self.overlays.values().filter_map(|o| o.host.map(|h| (h, o.id)));
        let forward_count = forward
            .clone()
            .filter(|(h, id)| self.by_brick.get(h) == Some(id))
            .count();
        forward.count() == forward_count && forward_count == self.by_brick.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attach_sets_both_sides() {
        let mut rel = OverlayRelation::new();
        let o = rel.create(OverlayKind::Spikes, 2);
        rel.attach(o, 10).unwrap();
        assert_eq!(rel.get(o).unwrap().host(), Some(10));
        assert_eq!(rel.on_brick(10).unwrap().id, o);
        assert!(rel.is_consistent());
        // Same pair again is fine
        rel.attach(o, 10).unwrap();
    }

    #[test]
    fn test_attach_conflicts() {
        let mut rel = OverlayRelation::new();
        let a = rel.create(OverlayKind::Shield, 1);
        let b = rel.create(OverlayKind::Regen, 1);
        rel.attach(a, 1).unwrap();
        assert!(matches!(rel.attach(a, 2), Err(CoreError::AlreadyHosted(id)) if id == a));
        assert!(matches!(rel.attach(b, 1), Err(CoreError::AlreadyOverlaid(1))));
        assert!(matches!(rel.attach(99, 1), Err(CoreError::UnknownOverlay(99))));
        assert!(rel.is_consistent());
        assert_eq!(rel.get(b).unwrap().host(), None);
    }

    #[test]
    fn test_detach_clears_both_sides() {
        let mut rel = OverlayRelation::new();
        let o = rel.create(OverlayKind::Bounty, 1);
        rel.attach(o, 4).unwrap();
        rel.detach(o).unwrap();
        assert!(rel.on_brick(4).is_none());
        assert_eq!(rel.get(o).unwrap().host(), None);
        rel.detach(o).unwrap();
        assert_eq!(rel.unattached().count(), 1);
        assert!(rel.is_consistent());
    }

    #[test]
    fn test_detach_brick_and_remove() {
        let mut rel = OverlayRelation::new();
        let o = rel.create(OverlayKind::Mirror, 3);
        rel.attach(o, 8).unwrap();
        assert_eq!(rel.detach_brick(8), Some(o));
        assert_eq!(rel.detach_brick(8), None);
        rel.attach(o, 9).unwrap();
        let removed = rel.remove(o).unwrap();
        assert_eq!(removed.kind, OverlayKind::Mirror);
        assert!(rel.on_brick(9).is_none());
        assert!(rel.is_empty());
    }

    #[test]
    fn test_ids_are_fresh() {
        let mut rel = OverlayRelation::new();
        let a = rel.create(OverlayKind::Spikes, 1);
        rel.remove(a);
        let b = rel.create(OverlayKind::Spikes, 1);
        assert_ne!(a, b);
    }
}
