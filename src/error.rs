//! Error types shared by every core module

use thiserror::Error;

/// Errors raised by progression, itemization, board and save handling
#[derive(Debug, Error)]
pub enum CoreError {
    /// Save or settings input that could not be parsed
    #[error("invalid format: {0}")]
    InvalidFormat(String),

    /// Save document written by a newer or incompatible schema
    #[error("unsupported save version {0}")]
    UnsupportedVersion(u32),

    /// A footprint cell fell outside the grid
    #[error("cell ({col}, {row}) is outside the board")]
    OutOfBounds { col: i32, row: i32 },

    /// A footprint cell is already taken by another brick
    #[error("cell ({col}, {row}) is already occupied")]
    CellOccupied { col: i32, row: i32 },

    #[error("unknown equipment archetype '{0}'")]
    UnknownArchetype(String),

    /// Weighted choice over an empty list or a non-positive total
    #[error("weighted choice needs at least one positive weight")]
    InvalidWeights,

    /// Overlay is already attached to a different brick
    #[error("overlay {0} is already attached to another brick")]
    AlreadyHosted(u32),

    /// Brick already hosts a different overlay
    #[error("brick {0} already carries an overlay")]
    AlreadyOverlaid(u32),

    #[error("no brick with id {0}")]
    UnknownBrick(u32),

    #[error("no overlay with id {0}")]
    UnknownOverlay(u32),

    /// Ball archetype already sits at the top of its enchant ladder
    #[error("enchantment ladder is already at max level")]
    EnchantmentMaxed,

    #[error("not enough resources")]
    InsufficientResources,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl CoreError {
    /// Short message suitable for showing to the player
    pub fn user_message(&self) -> &'static str {
        match self {
            CoreError::InvalidFormat(_) => "That save file could not be read.",
            CoreError::UnsupportedVersion(_) => {
                "That save was made by a newer version of the game."
            }
            CoreError::OutOfBounds { .. } | CoreError::CellOccupied { .. } => {
                "There is no room for that brick."
            }
            CoreError::UnknownArchetype(_) | CoreError::InvalidWeights => {
                "Something went wrong. Please try again."
            }
            CoreError::AlreadyHosted(_) | CoreError::AlreadyOverlaid(_) => {
                "That brick already has an upgrade attached."
            }
            CoreError::UnknownBrick(_) | CoreError::UnknownOverlay(_) => {
                "That item no longer exists."
            }
            CoreError::EnchantmentMaxed => "This ball is already fully enchanted.",
            CoreError::InsufficientResources => "You don't have enough resources.",
            CoreError::Io(_) => "The file could not be accessed.",
        }
    }

    /// Whether the error came from reading a save, before any state changed
    pub fn is_load_rejection(&self) -> bool {
        matches!(
            self,
            CoreError::InvalidFormat(_) | CoreError::UnsupportedVersion(_)
        )
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::InvalidFormat(err.to_string())
    }
}

/// Result alias for core operations
pub type CoreResult<T> = Result<T, CoreError>;
