//! Cell grid mapping cells to the bricks that cover them
//!
//! A brick spanning several cells stores the same id in each of them.
//! Coordinates are top-left relative: column grows right, row grows down.

use std::collections::HashSet;

use glam::{IVec2, UVec2};

use super::brick::BrickId;
use crate::error::{CoreError, CoreResult};

/// Fixed-size grid of optional brick ids, stored row-major
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    cols: u32,
    rows: u32,
    cells: Vec<Option<BrickId>>,
}

impl Grid {
    pub fn new(cols: u32, rows: u32) -> Self {
        Self {
            cols,
            rows,
            cells: vec![None; cols as usize * rows as usize],
        }
    }

    #[inline]
    pub fn cols(&self) -> u32 {
        self.cols
    }

    #[inline]
    pub fn rows(&self) -> u32 {
        self.rows
    }

    #[inline]
    pub fn in_bounds(&self, cell: IVec2) -> bool {
        cell.x >= 0 && cell.y >= 0 && (cell.x as u32) < self.cols && (cell.y as u32) < self.rows
    }

    fn index(&self, cell: IVec2) -> Option<usize> {
        self.in_bounds(cell)
            .then(|| cell.y as usize * self.cols as usize + cell.x as usize)
    }

    /// Brick covering a cell, if any (out-of-bounds cells are empty)
    pub fn get(&self, cell: IVec2) -> Option<BrickId> {
        self.index(cell).and_then(|i| self.cells[i])
    }

    /// Every cell of a footprint, row by row. Zero sizes count as one cell.
    ///
    /// Only meaningful for footprints that passed [`Grid::can_place`].
    pub fn footprint(anchor: IVec2, size: UVec2) -> impl Iterator<Item = IVec2> {
        let size = size
            .clamp(UVec2::ONE, UVec2::splat(i32::MAX as u32))
            .as_ivec2();
        (0..size.y).flat_map(move |dy| (0..size.x).map(move |dx| anchor + IVec2::new(dx, dy)))
    }

    /// Check a footprint fits without writing anything
    pub fn can_place(&self, anchor: IVec2, size: UVec2) -> CoreResult<()> {
        let size = size.max(UVec2::ONE);
        if !self.in_bounds(anchor) || size.x > self.cols || size.y > self.rows {
            return Err(CoreError::OutOfBounds {
                col: anchor.x,
                row: anchor.y,
            });
        }
        let far = anchor
            .x
            .checked_add_unsigned(size.x - 1)
            .zip(anchor.y.checked_add_unsigned(size.y - 1))
            .map(|(col, row)| IVec2::new(col, row));
        match far {
            Some(far) if self.in_bounds(far) => {}
            Some(far) => {
                return Err(CoreError::OutOfBounds {
                    col: far.x,
                    row: far.y,
                });
            }
            None => {
                return Err(CoreError::OutOfBounds {
                    col: anchor.x,
                    row: anchor.y,
                });
            }
        }
        for cell in Self::footprint(anchor, size) {
            if self.get(cell).is_some() {
                return Err(CoreError::CellOccupied {
                    col: cell.x,
                    row: cell.y,
                });
            }
        }
        Ok(())
    }

    /// Write `id` into every footprint cell, or nothing on failure
    pub fn place(&mut self, id: BrickId, anchor: IVec2, size: UVec2) -> CoreResult<()> {
        self.can_place(anchor, size)?;
        for cell in Self::footprint(anchor, size) {
            if let Some(i) = self.index(cell) {
                self.cells[i] = Some(id);
            }
        }
        Ok(())
    }

    /// Clear every cell holding `id`. Returns how many cells were cleared.
    pub fn remove(&mut self, id: BrickId) -> usize {
        let mut cleared = 0;
        for cell in self.cells.iter_mut().filter(|c| **c == Some(id)) {
            *cell = None;
            cleared += 1;
        }
        cleared
    }

    /// Distinct brick ids in row-major scan order, each yielded once
    pub fn ids(&self) -> impl Iterator<Item = BrickId> + '_ {
        let mut seen = HashSet::new();
        self.cells
            .iter()
            .filter_map(|c| *c)
            .filter(move |id| seen.insert(*id))
    }

    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(Option::is_none)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_place_multi_cell() {
        let mut grid = Grid::new(4, 4);
        grid.place(7, IVec2::new(1, 1), UVec2::new(2, 2)).unwrap();
        assert_eq!(grid.get(IVec2::new(1, 1)), Some(7));
        assert_eq!(grid.get(IVec2::new(2, 2)), Some(7));
        assert_eq!(grid.get(IVec2::new(3, 3)), None);
        assert_eq!(grid.ids().collect::<Vec<_>>(), vec![7]);
    }

    #[test]
    fn test_place_over_occupied_cell() {
        let mut grid = Grid::new(4, 4);
        grid.place(1, IVec2::new(1, 1), UVec2::ONE).unwrap();
        let err = grid.place(2, IVec2::ZERO, UVec2::new(2, 2)).unwrap_err();
        assert!(matches!(err, CoreError::CellOccupied { col: 1, row: 1 }));
        // Nothing partially written
        assert_eq!(grid.get(IVec2::ZERO), None);
    }

    #[test]
    fn test_place_out_of_bounds() {
        let mut grid = Grid::new(4, 4);
        let err = grid.place(1, IVec2::new(5, 5), UVec2::new(2, 2)).unwrap_err();
        assert!(matches!(err, CoreError::OutOfBounds { .. }));
        let err = grid.place(1, IVec2::new(3, 0), UVec2::new(2, 1)).unwrap_err();
        assert!(matches!(err, CoreError::OutOfBounds { col: 4, row: 0 }));
        let err = grid.place(1, IVec2::new(-1, 0), UVec2::ONE).unwrap_err();
        assert!(matches!(err, CoreError::OutOfBounds { .. }));
        assert!(grid.is_empty());
    }

    #[test]
    fn test_oversized_footprint_rejected() {
        let mut grid = Grid::new(8, 8);
        for size in [UVec2::new(3_000_000_000, 1), UVec2::new(1, u32::MAX), UVec2::new(9, 1)] {
            let err = grid.place(1, IVec2::ZERO, size).unwrap_err();
            assert!(matches!(err, CoreError::OutOfBounds { col: 0, row: 0 }));
        }
        assert!(grid.is_empty());
        assert_eq!(grid.ids().count(), 0);
    }

    #[test]
    fn test_remove_clears_whole_footprint() {
        let mut grid = Grid::new(5, 5);
        grid.place(3, IVec2::new(0, 0), UVec2::new(3, 2)).unwrap();
        grid.place(4, IVec2::new(4, 4), UVec2::ONE).unwrap();
        assert_eq!(grid.remove(3), 6);
        assert_eq!(grid.ids().collect::<Vec<_>>(), vec![4]);
        assert_eq!(grid.remove(3), 0);
    }

    #[test]
    fn test_ids_row_major_order() {
        let mut grid = Grid::new(4, 3);
        grid.place(9, IVec2::new(0, 2), UVec2::ONE).unwrap();
        grid.place(5, IVec2::new(2, 0), UVec2::new(2, 2)).unwrap();
        grid.place(6, IVec2::new(0, 0), UVec2::ONE).unwrap();
        assert_eq!(grid.ids().collect::<Vec<_>>(), vec![6, 5, 9]);
    }

    proptest! {
        #[test]
        fn prop_placements_never_overlap(
            placements in prop::collection::vec((0i32..10, 0i32..10, 1u32..4, 1u32..4), 1..30)
        ) {
            let mut grid = Grid::new(10, 10);
            let mut expected_cells = 0usize;
            for (i, (x, y, w, h)) in placements.into_iter().enumerate() {
                let id = i as BrickId + 1;
                if grid.place(id, IVec2::new(x, y), UVec2::new(w, h)).is_ok() {
                    expected_cells += (w * h) as usize;
                }
            }
            let filled = (0..10)
                .flat_map(|y| (0..10).map(move |x| IVec2::new(x, y)))
                .filter(|c| grid.get(*c).is_some())
                .count();
            prop_assert_eq!(filled, expected_cells);
            let ids: Vec<_> = grid.ids().collect();
            let unique: HashSet<_> = ids.iter().copied().collect();
            prop_assert_eq!(ids.len(), unique.len());
        }
    }
}
