//! Home base board
//!
//! The board owns three things kept in step with each other:
//! - `grid`: which brick covers each cell
//! - `bricks`: brick data keyed by id
//! - `overlays`: every overlay and the overlay <-> brick relation

pub mod brick;
pub mod grid;
pub mod overlay;

use std::collections::BTreeMap;

use glam::IVec2;

pub use brick::{Brick, BrickId, BrickKind};
pub use grid::Grid;
pub use overlay::{Overlay, OverlayId, OverlayKind, OverlayRelation};

use crate::error::{CoreError, CoreResult};
use crate::resources::ResourceKind;

/// Grid plus the bricks and overlays placed on it
#[derive(Debug, Clone, PartialEq)]
pub struct Board {
    grid: Grid,
    bricks: BTreeMap<BrickId, Brick>,
    overlays: OverlayRelation,
    next_brick_id: BrickId,
}

impl Board {
    pub fn new(cols: u32, rows: u32) -> Self {
        Self {
            grid: Grid::new(cols, rows),
            bricks: BTreeMap::new(),
            overlays: OverlayRelation::new(),
            next_brick_id: 1,
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn cols(&self) -> u32 {
        self.grid.cols()
    }

    pub fn rows(&self) -> u32 {
        self.grid.rows()
    }

    /// Shift between center-relative coordinates and grid cells
    pub fn origin_offset(&self) -> IVec2 {
        IVec2::new((self.cols() / 2) as i32, (self.rows() / 2) as i32)
    }

    /// Shift a center-relative position onto the grid.
    ///
    /// Positions too far out to shift fail with `OutOfBounds`.
    pub fn centered_to_grid(&self, pos: IVec2) -> CoreResult<IVec2> {
        let offset = self.origin_offset();
        match (pos.x.checked_add(offset.x), pos.y.checked_add(offset.y)) {
            (Some(col), Some(row)) => Ok(IVec2::new(col, row)),
            _ => Err(CoreError::OutOfBounds {
                col: pos.x,
                row: pos.y,
            }),
        }
    }

    pub fn grid_to_centered(&self, cell: IVec2) -> IVec2 {
        cell - self.origin_offset()
    }

    /// Place a brick with its top-left corner at `anchor`, assigning a fresh id
    pub fn place_brick(&mut self, mut brick: Brick, anchor: IVec2) -> CoreResult<BrickId> {
        let id = self.next_brick_id;
        self.grid.place(id, anchor, brick.size)?;
        self.next_brick_id += 1;
        brick.id = id;
        brick.anchor = anchor;
        self.bricks.insert(id, brick);
        Ok(id)
    }

    /// Remove a brick. Its overlay, if any, goes back to the inventory.
    pub fn remove_brick(&mut self, id: BrickId) -> CoreResult<Brick> {
        let brick = self.bricks.remove(&id).ok_or(CoreError::UnknownBrick(id))?;
        self.grid.remove(id);
        self.overlays.detach_brick(id);
        Ok(brick)
    }

    pub fn brick(&self, id: BrickId) -> Option<&Brick> {
        self.bricks.get(&id)
    }

    pub fn brick_mut(&mut self, id: BrickId) -> Option<&mut Brick> {
        self.bricks.get_mut(&id)
    }

    /// Brick covering a cell
    pub fn brick_at(&self, cell: IVec2) -> Option<&Brick> {
        self.grid.get(cell).and_then(|id| self.bricks.get(&id))
    }

    /// Every placed brick once, in row-major order of first covered cell
    pub fn bricks(&self) -> impl Iterator<Item = &Brick> {
        self.grid.ids().filter_map(|id| self.bricks.get(&id))
    }

    pub fn brick_count(&self) -> usize {
        self.bricks.len()
    }

    pub fn overlays(&self) -> &OverlayRelation {
        &self.overlays
    }

    /// Put a new overlay into the inventory
    pub fn add_overlay(&mut self, kind: OverlayKind, level: u32) -> OverlayId {
        self.overlays.create(kind, level)
    }

    /// Attach an inventory overlay to a placed brick
    pub fn attach_overlay(&mut self, overlay: OverlayId, brick: BrickId) -> CoreResult<()> {
        if !self.bricks.contains_key(&brick) {
            return Err(CoreError::UnknownBrick(brick));
        }
        self.overlays.attach(overlay, brick)
    }

    pub fn detach_overlay(&mut self, overlay: OverlayId) -> CoreResult<()> {
        self.overlays.detach(overlay)
    }

    pub fn overlay_on(&self, brick: BrickId) -> Option<&Overlay> {
        self.overlays.on_brick(brick)
    }

    /// Storage bonuses contributed by every placed building
    pub fn storage_bonuses(&self) -> Vec<(ResourceKind, f64)> {
        self.bricks.values().flat_map(Brick::storage_bonus).collect()
    }

}
