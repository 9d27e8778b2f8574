//! Version 1 overlay links
//!
//! Version 1 saves listed every overlay in the inventory with its own id and
//! had bricks point at that id. On load the inventory overlays get fresh ids,
//! so this index maps the stored ids to the new ones before bricks are placed.

use std::collections::HashMap;

use super::envelope::OverlayRecord;
use crate::board::{Board, BrickId, OverlayId};
use crate::error::{CoreError, CoreResult};

#[derive(Debug, Default)]
pub struct LegacyOverlayIndex {
    ids: HashMap<u32, OverlayId>,
}

impl LegacyOverlayIndex {
    /// Create every inventory overlay on the board (unattached) and remember
    /// the stored id of each one that had one.
    pub fn load(board: &mut Board, records: &[OverlayRecord]) -> Self {
        let mut index = Self::default();
        for record in records {
            let id = board.add_overlay(record.kind, record.level);
            if let Some(stored) = record.id {
                if index.ids.contains_key(&stored) {
                    log::warn!("Duplicate overlay id {stored} in save, keeping the first");
                    continue;
                }
                index.ids.insert(stored, id);
            }
        }
        index
    }

    pub fn resolve(&self, stored: u32) -> Option<OverlayId> {
        self.ids.get(&stored).copied()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Attach the overlay a brick referenced by stored id
    pub fn attach(&self, board: &mut Board, stored: u32, brick: BrickId) -> CoreResult<()> {
        let overlay = self
            .resolve(stored)
            .ok_or(CoreError::UnknownOverlay(stored))?;
        board.attach_overlay(overlay, brick)
    }
}
