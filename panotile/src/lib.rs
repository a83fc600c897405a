//! panotile - Street-level imagery coverage tile decoding
//!
//! Coverage tiles pack panorama records, upload batches and per-face
//! projection parameters into one protobuf message, linking them by array
//! index and storing positions relative to the tile. This library turns
//! such a tile into self-contained [`ResolvedPano`] values:
//!
//! ```text
//! wire (decode) ──► xref (follow indices) ──► geodetic (absolute position) ──► resolver
//! ```
//!
//! Fetching tiles, enumerating tile indices and downloading imagery are left
//! to the caller.
//!
//! # Example
//!
//! ```no_run
//! use panotile::coord::TileCoordinate;
//!
//! let bytes = std::fs::read("17_70000_43000.pb")?;
//! let panos = panotile::resolve_tile(&bytes, Some(TileCoordinate::new(70_000, 43_000, 17)))?;
//! for pano in &panos {
//!     println!("{} {:?} {:?}", pano.panoid, pano.latitude, pano.longitude);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod coord;
pub mod error;
pub mod geodetic;
pub mod resolver;
pub mod wire;
pub mod xref;

pub use config::{ConfigError, ConfigFile, ResolverConfig};
pub use coord::{CoordError, TileCoordinate};
pub use error::{TileError, TileResult};
pub use geodetic::{GeodeticModel, GeographicPosition, ProvisionalModel};
pub use resolver::{
    resolve_tile, resolve_tiles, ResolvedPano, ResolvedProjection, TileInput, TileResolver,
};
pub use wire::{decode_tile, encode_tile, CoverageType, DecodeError, DecodedTile};
