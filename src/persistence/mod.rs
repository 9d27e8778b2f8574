//! Save/load persistence
//!
//! Features:
//! - Versioned JSON envelope (`envelope`)
//! - Version 1 overlay-id resolution (`migration`)
//! - Flat level layout strings for sharing boards (`layout`)
//!
//! Imports never touch live state: they build a fresh `GameState` that the
//! caller swaps in only when the whole document was accepted.

pub mod envelope;
pub mod layout;
pub mod migration;

pub use envelope::{
    BrickRecord, HomeBaseRecord, InventoryRecord, OverlayData, OverlayRecord, SaveDocument, export,
    export_json, import_json,
};
