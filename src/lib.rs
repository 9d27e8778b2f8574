//! Idle Bricks - progression and itemization core for an incremental brick breaker
//!
//! Core modules:
//! - `progression`: Cumulative XP to level conversion
//! - `weighted`: Weighted random choice
//! - `equipment`: Equipment archetypes and random drops
//! - `enchant`: Per-ball enchantment ladders
//! - `resources` / `inventory`: Player stockpiles
//! - `board`: Home base grid, bricks and their overlays
//! - `state`: The live game state every operation works on
//! - `persistence`: Versioned save documents and level layout strings
//! - `settings`: Player-facing configuration

pub mod board;
pub mod enchant;
pub mod equipment;
pub mod error;
pub mod inventory;
pub mod persistence;
pub mod progression;
pub mod resources;
pub mod settings;
pub mod state;
pub mod weighted;

pub use error::{CoreError, CoreResult};
pub use settings::Settings;
pub use state::{GameEvent, GameState};

/// Game configuration constants
pub mod consts {
    /// Default home base dimensions (cells)
    pub const BOARD_COLS: u32 = 16;
    pub const BOARD_ROWS: u32 = 12;

    /// XP base amount for the player level formula
    pub const XP_BASE_AMOUNT: u64 = 50;

    /// Goal brick XP needed for each step up its ladder, in order
    pub const GOAL_LADDER: [u64; 10] = [
        100, 300, 600, 1_000, 1_500, 2_500, 4_000, 6_000, 9_000, 13_500,
    ];

    /// Enchant energy required at each level (index = level - 1)
    pub const ENCHANT_REQUIRED_EP: [f64; 10] = [
        100.0, 250.0, 500.0, 900.0, 1_500.0, 2_400.0, 3_800.0, 6_000.0, 9_500.0, 15_000.0,
    ];

    /// Range the enchant cost multiplier grows by after a success
    pub const ENCHANT_COST_GROWTH_MIN: f64 = 1.15;
    pub const ENCHANT_COST_GROWTH_MAX: f64 = 1.30;
    /// Growth used when replaying saved enchantments (midpoint of the range)
    pub const ENCHANT_COST_GROWTH_REPLAY: f64 = 1.225;

    /// Equipment rarity weights (epic, rare, common)
    pub const RARITY_WEIGHTS: [f64; 3] = [5.0, 25.0, 70.0];
    pub const RARITY_WEIGHTS_LUCKY: [f64; 3] = [10.0, 35.0, 55.0];

    /// Current save document version
    pub const SAVE_VERSION: u32 = 2;
}
