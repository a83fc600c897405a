//! Errors surfaced by tile resolution.

use thiserror::Error;

use crate::coord::{CoordError, TileCoordinate};
use crate::wire::DecodeError;

/// Result type for tile resolution.
pub type TileResult<T> = Result<T, TileError>;

/// Reasons a tile could not be resolved.
///
/// Each variant is fatal for the tile it was raised for; other tiles are
/// unaffected. Missing optional fields and dangling indices are not errors
/// and never appear here.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TileError {
    /// The bytes are not a valid coverage tile.
    #[error(transparent)]
    Malformed(#[from] DecodeError),

    /// The input exceeds the configured size limit and was not decoded.
    #[error("Tile too large: {size} bytes (max: {max})")]
    TooLarge { size: usize, max: usize },

    /// The coordinate embedded in the tile differs from the caller's.
    #[error("Tile coordinate mismatch: expected {expected}, tile contains {found}")]
    CoordinateMismatch {
        expected: TileCoordinate,
        found: TileCoordinate,
    },

    /// The tile coordinate is outside the slippy-map grid.
    #[error("Tile coordinate out of range: {0}")]
    OutOfRange(#[from] CoordError),
}

impl TileError {
    /// Whether the failure stems from the input bytes themselves.
    pub fn is_malformed(&self) -> bool {
        matches!(self, TileError::Malformed(_) | TileError::TooLarge { .. })
    }
}
