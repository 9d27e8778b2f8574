//! Level layout strings
//!
//! A flat, unversioned format for sharing a board's bricks. Records are
//! separated by `;`, fields by `,`:
//!
//! `col,row,type,health,maxHealth,coins,maxCoins,gems,maxGems,overlay,width,height,level`
//!
//! Coordinates are grid cells (top-left origin). `overlay` is an overlay type
//! or `null`. The trailing `level` may be missing and defaults to 1; records
//! with fewer than 12 fields are skipped.

use glam::IVec2;

use crate::board::{Board, Brick, BrickKind, OverlayKind};

/// Fields a record needs before it is considered at all
pub const MIN_FIELDS: usize = 12;

const NO_OVERLAY: &str = "null";

/// Serialize every brick on the board
pub fn encode(board: &Board) -> String {
    board
        .bricks()
        .map(|b| {
            let overlay = board
                .overlay_on(b.id)
                .map_or(NO_OVERLAY, |o| o.kind.as_str());
            format!(
                "{},{},{},{},{},{},{},{},{},{},{},{},{}",
                b.anchor.x,
                b.anchor.y,
                b.kind.as_str(),
                b.health,
                b.max_health,
                b.coins,
                b.max_coins,
                b.gems,
                b.max_gems,
                overlay,
                b.size.x,
                b.size.y,
                b.level
            )
        })
        .collect::<Vec<_>>()
        .join(";")
}

/// A parsed record before placement
#[derive(Debug, Clone, PartialEq)]
struct LayoutRecord {
    anchor: IVec2,
    brick: Brick,
    overlay: Option<OverlayKind>,
}

fn parse_record(raw: &str) -> Option<LayoutRecord> {
    let fields: Vec<&str> = raw.split(',').map(str::trim).collect();
    if fields.len() < MIN_FIELDS {
        log::warn!("Skipping layout record with {} fields: '{raw}'", fields.len());
        return None;
    }

    let num = |i: usize| -> Option<f64> {
        fields[i].parse::<f64>().ok().filter(|v| v.is_finite())
    };
    let parsed = (|| {
        let col = fields[0].parse::<i32>().ok()?;
        let row = fields[1].parse::<i32>().ok()?;
        let kind = BrickKind::from_str(fields[2])?;
        let width = fields[10].parse::<u32>().ok()?;
        let height = fields[11].parse::<u32>().ok()?;
        let level = fields
            .get(12)
            .and_then(|f| f.parse::<u32>().ok())
            .unwrap_or(1);

        let mut brick = Brick::new(kind, level).with_size(width, height);
        // Current values never exceed their maximum
        brick.max_health = num(4)?.max(0.0);
        brick.health = num(3)?.clamp(0.0, brick.max_health);
        brick.max_coins = num(6)?.max(0.0);
        brick.coins = num(5)?.clamp(0.0, brick.max_coins);
        brick.max_gems = num(8)?.max(0.0);
        brick.gems = num(7)?.clamp(0.0, brick.max_gems);

        let overlay = match fields[9] {
            "" | NO_OVERLAY => None,
            other => {
                let kind = OverlayKind::from_str(other);
                if kind.is_none() {
                    log::warn!("Ignoring unknown overlay '{other}' in layout");
                }
                kind
            }
        };
        Some(LayoutRecord {
            anchor: IVec2::new(col, row),
            brick,
            overlay,
        })
    })();

    if parsed.is_none() {
        log::warn!("Skipping malformed layout record: '{raw}'");
    }
    parsed
}

/// Build a fresh board from a layout string.
///
/// Records that don't parse or don't fit are skipped; the rest are placed in order.
pub fn decode(text: &str, cols: u32, rows: u32) -> Board {
    let mut board = Board::new(cols, rows);
    for raw in text.split(';').map(str::trim).filter(|r| !r.is_empty()) {
        let Some(record) = parse_record(raw) else {
            continue;
        };
        let id = match board.place_brick(record.brick, record.anchor) {
            Ok(id) => id,
            Err(e) => {
                log::warn!("Skipping layout brick at {}: {e}", record.anchor);
                continue;
            }
        };
        if let Some(kind) = record.overlay {
            let overlay = board.add_overlay(kind, 1);
            if let Err(e) = board.attach_overlay(overlay, id) {
                log::warn!("Layout overlay not attached: {e}");
            }
        }
    }
    board
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_with_and_without_level() {
        let text = "0,0,gold,5,10,3,3,0,0,null,1,1,4;2,1,granary,20,20,0,0,0,0,spikes,2,2";
        let board = decode(text, 8, 8);
        assert_eq!(board.brick_count(), 2);

        let gold = board.brick_at(IVec2::new(0, 0)).unwrap();
        assert_eq!(gold.kind, BrickKind::Gold);
        assert_eq!(gold.level, 4);
        assert_eq!((gold.health, gold.max_health, gold.coins), (5.0, 10.0, 3.0));
        assert!(board.overlay_on(gold.id).is_none());

        let granary = board.brick_at(IVec2::new(3, 2)).unwrap();
        assert_eq!(granary.level, 1);
        assert_eq!(board.overlay_on(granary.id).unwrap().kind, OverlayKind::Spikes);
    }

    #[test]
    fn test_short_and_malformed_records_skipped() {
        let text = "0,0,normal,1,1,0,0,0,0,null,1;\
                    1,0,normal,x,1,0,0,0,0,null,1,1;\
                    2,0,boulder,1,1,0,0,0,0,null,1,1;\
                    3,0,normal,1,1,0,0,0,0,null,1,1;;";
        let board = decode(text, 8, 8);
        assert_eq!(board.brick_count(), 1);
        assert_eq!(board.bricks().next().unwrap().anchor, IVec2::new(3, 0));
    }

    #[test]
    fn test_overlapping_and_out_of_bounds_skipped() {
        let text = "0,0,normal,1,1,0,0,0,0,null,2,2,1;\
                    1,1,normal,1,1,0,0,0,0,shield,1,1,1;\
                    7,7,normal,1,1,0,0,0,0,null,2,1,1";
        let board = decode(text, 8, 8);
        assert_eq!(board.brick_count(), 1);
        // The skipped brick's overlay was never created
        assert!(board.overlays().is_empty());
    }

    #[test]
    fn test_current_values_clamped_to_max() {
        let board = decode("1,1,gem,50,20,9,4,-3,2,null,1,1,2", 4, 4);
        let brick = board.brick_at(IVec2::new(1, 1)).unwrap();
        assert_eq!((brick.health, brick.max_health), (20.0, 20.0));
        assert_eq!((brick.coins, brick.max_coins), (4.0, 4.0));
        assert_eq!((brick.gems, brick.max_gems), (0.0, 2.0));
    }

    #[test]
    fn test_oversized_footprint_skipped() {
        let text = "0,0,warehouse,10,10,0,0,0,0,null,3000000000,1,1;\
                    0,0,normal,1,1,0,0,0,0,null,1,4294967295,1;\
                    2,2,normal,1,1,0,0,0,0,null,1,1,1";
        let board = decode(text, 8, 8);
        assert_eq!(board.brick_count(), 1);
        assert_eq!(board.bricks().count(), 1);
        assert!(board.storage_bonuses().is_empty());
        assert_eq!(encode(&board), "2,2,normal,1,1,0,0,0,0,null,1,1,1");
    }

    #[test]
    fn test_encode_then_decode_matches() {
        let mut board = Board::new(6, 6);
        let a = board
            .place_brick(Brick::new(BrickKind::Warehouse, 2), IVec2::new(1, 1))
            .unwrap();
        board
            .place_brick(Brick::new(BrickKind::Gem, 3), IVec2::new(0, 5))
            .unwrap();
        let overlay = board.add_overlay(OverlayKind::Mirror, 1);
        board.attach_overlay(overlay, a).unwrap();

        let text = encode(&board);
        assert_eq!(
            text.split(';').next().unwrap(),
            "1,1,warehouse,20,20,2,2,0,0,mirror,3,2,2"
        );
        let back = decode(&text, 6, 6);
        let before: Vec<_> = board.bricks().cloned().collect();
        let after: Vec<_> = back.bricks().cloned().collect();
        assert_eq!(before, after);
        assert_eq!(encode(&back), text);
    }

    #[test]
    fn test_empty_board_encodes_empty() {
        assert_eq!(encode(&Board::new(3, 3)), "");
        assert_eq!(decode("", 3, 3).brick_count(), 0);
    }
}
