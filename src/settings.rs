//! Game settings and tuning knobs
//!
//! Persisted separately from game saves as a small JSON file. Missing fields
//! fall back to their defaults so older settings files keep loading.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::{BOARD_COLS, BOARD_ROWS, ENCHANT_COST_GROWTH_REPLAY, XP_BASE_AMOUNT};
use crate::error::CoreResult;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Use the improved rarity weights for equipment drops
    pub better_luck: bool,
    /// Base amount in the player level formula
    pub xp_base_amount: u64,
    /// Home base dimensions (cells)
    pub board_cols: u32,
    pub board_rows: u32,
    /// Fixed RNG seed; `None` seeds from entropy
    pub rng_seed: Option<u64>,
    /// Cost growth per step when replaying saved enchantments
    pub enchant_replay_multiplier: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            better_luck: false,
            xp_base_amount: XP_BASE_AMOUNT,
            board_cols: BOARD_COLS,
            board_rows: BOARD_ROWS,
            rng_seed: None,
            enchant_replay_multiplier: ENCHANT_COST_GROWTH_REPLAY,
        }
    }
}

impl Settings {
    pub fn from_json(json: &str) -> CoreResult<Self> {
        let mut settings: Settings = serde_json::from_str(json)?;
        settings.sanitize();
        Ok(settings)
    }

    pub fn to_json(&self) -> CoreResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load settings from disk, using defaults if the file is missing or broken
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from {}", path.display());
                    settings
                }
                Err(e) => {
                    log::warn!("Ignoring settings file {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(_) => {
                log::info!("Using default settings");
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> CoreResult<()> {
        std::fs::write(path, self.to_json()?)?;
        log::info!("Settings saved");
        Ok(())
    }

    /// Keep values inside the ranges the core can work with
    fn sanitize(&mut self) {
        self.xp_base_amount = self.xp_base_amount.max(1);
        self.board_cols = self.board_cols.clamp(1, 256);
        self.board_rows = self.board_rows.clamp(1, 256);
        if !self.enchant_replay_multiplier.is_finite() || self.enchant_replay_multiplier <= 0.0 {
            self.enchant_replay_multiplier = ENCHANT_COST_GROWTH_REPLAY;
        }
    }
}
