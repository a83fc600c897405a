//! CLI error types.

use std::io;
use std::path::PathBuf;

use panotile::{ConfigError, TileError};
use thiserror::Error;

/// Errors reported by CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// A tile file could not be read.
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A single tile failed to resolve.
    #[error("{}: {source}", path.display())]
    Tile {
        path: PathBuf,
        #[source]
        source: TileError,
    },

    /// Some tiles of a batch failed to resolve.
    #[error("{failed} of {total} tiles failed to resolve")]
    TilesFailed { failed: usize, total: usize },

    /// Output could not be serialized.
    #[error("Failed to write output: {0}")]
    Output(#[from] serde_json::Error),
}
