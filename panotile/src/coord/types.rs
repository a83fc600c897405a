//! Tile coordinate types and validation errors.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Maximum latitude representable in Web Mercator (degrees).
pub const MAX_LAT: f64 = 85.05112878;

/// Minimum latitude representable in Web Mercator (degrees).
pub const MIN_LAT: f64 = -85.05112878;

/// Minimum longitude (degrees).
pub const MIN_LON: f64 = -180.0;

/// Maximum longitude (degrees).
pub const MAX_LON: f64 = 180.0;

/// Lowest zoom level of the slippy-map grid.
pub const MIN_ZOOM: i32 = 0;

/// Highest zoom level accepted.
///
/// Tile indices are carried as `i32` on the wire, so `2^30` columns is the
/// largest grid whose every index remains representable.
pub const MAX_ZOOM: i32 = 30;

/// Zoom level at which the coverage service publishes its tiles.
pub const COVERAGE_ZOOM: i32 = 17;

/// Errors raised for tile coordinates or positions outside the valid grid.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoordError {
    /// Zoom level is below zero or above [`MAX_ZOOM`].
    #[error("Invalid zoom level {0} (expected 0..=30)")]
    InvalidZoom(i32),

    /// Column lies outside `[0, 2^z)`.
    #[error("Tile column {x} outside grid of {size} columns at zoom {z}")]
    ColumnOutOfRange { x: i32, z: i32, size: i64 },

    /// Row lies outside `[0, 2^z)`.
    #[error("Tile row {y} outside grid of {size} rows at zoom {z}")]
    RowOutOfRange { y: i32, z: i32, size: i64 },

    /// Latitude outside the Web Mercator domain.
    #[error("Invalid latitude {0} (expected -85.05112878..=85.05112878)")]
    InvalidLatitude(f64),

    /// Longitude outside [-180, 180].
    #[error("Invalid longitude {0} (expected -180..=180)")]
    InvalidLongitude(f64),
}

/// Slippy-map tile index `(x, y, z)`.
///
/// Doubles as the wire message embedded in a coverage tile (fields 1-3), so
/// the same value flows from decoded bytes to the geodetic transform without
/// conversion.
///
/// - `x`: column, increasing eastward
/// - `y`: row, increasing southward
/// - `z`: zoom level
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, prost::Message)]
pub struct TileCoordinate {
    #[prost(int32, tag = "1")]
    pub x: i32,
    #[prost(int32, tag = "2")]
    pub y: i32,
    #[prost(int32, tag = "3")]
    pub z: i32,
}

impl TileCoordinate {
    /// Create a tile coordinate without validating it.
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Number of tiles along each axis at this zoom level.
    ///
    /// Only meaningful for zoom levels accepted by [`TileCoordinate::validate`].
    #[inline]
    pub fn grid_size(&self) -> i64 {
        1i64 << self.z.clamp(MIN_ZOOM, MAX_ZOOM)
    }

    /// Check that the zoom level is supported and that `x`/`y` fall inside
    /// the grid for that zoom.
    pub fn validate(&self) -> Result<(), CoordError> {
        if !(MIN_ZOOM..=MAX_ZOOM).contains(&self.z) {
            return Err(CoordError::InvalidZoom(self.z));
        }
        let size = self.grid_size();
        if self.x < 0 || i64::from(self.x) >= size {
            return Err(CoordError::ColumnOutOfRange {
                x: self.x,
                z: self.z,
                size,
            });
        }
        if self.y < 0 || i64::from(self.y) >= size {
            return Err(CoordError::RowOutOfRange {
                y: self.y,
                z: self.z,
                size,
            });
        }
        Ok(())
    }
}

impl fmt::Display for TileCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.z, self.x, self.y)
    }
}

/// Geographic bounding box of a tile, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TileBounds {
    pub north: f64,
    pub south: f64,
    pub west: f64,
    pub east: f64,
}

impl TileBounds {
    /// Midpoint of the box in latitude/longitude.
    ///
    /// This is the arithmetic centre in degrees, which differs slightly from
    /// the Mercator-space centre of the tile at higher latitudes.
    pub fn center(&self) -> (f64, f64) {
        (
            (self.north + self.south) / 2.0,
            (self.west + self.east) / 2.0,
        )
    }

    /// Whether a point lies inside the box (edges inclusive).
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        (self.south..=self.north).contains(&lat) && (self.west..=self.east).contains(&lon)
    }
}
