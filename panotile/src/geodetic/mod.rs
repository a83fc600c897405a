//! Conversion of tile-relative raw values to geographic positions.
//!
//! A panorama's [`RawLocation`] is relative to the tile it was delivered in:
//!
//! - `longitude_offset` / `latitude_offset` are fractions of the tile span,
//!   in units of 1/[`OFFSET_RESOLUTION`]. Longitude runs west to east,
//!   latitude south to north. The fractions are applied in Web Mercator
//!   space, i.e. linearly between the tile's west/east longitudes and
//!   linearly in projected `y` between its south/north edges.
//! - `heading`, `roll` and `tilt` are fractions of a full turn, in units of
//!   1/[`ANGLE_UNITS_PER_TURN`].
//! - `elevation` uses an encoding whose reference surface is not known.
//!
//! # Approximations
//!
//! Two conversions are not verified against reference data and are kept as
//! single functions so they can be corrected in one place:
//!
//! - [`elevation_from_raw`] treats one raw unit as one metre.
//! - [`heading_correction`] removes a longitude-dependent offset from the
//!   raw heading.
//!
//! Callers needing a different model implement [`GeodeticModel`] and pass
//! it to the resolver.

use serde::Serialize;

use crate::coord::{grid_to_lat_lon, CoordError, TileCoordinate};
use crate::wire::RawLocation;

/// Raw offset units per tile span.
pub const OFFSET_RESOLUTION: f64 = 1_000_000.0;

/// Raw angle units per full turn.
pub const ANGLE_UNITS_PER_TURN: f64 = 16_384.0;

/// Metres per raw elevation unit (approximation).
pub const ELEVATION_METRES_PER_UNIT: f64 = 1.0;

/// Absolute position and orientation of a panorama.
///
/// - `heading`: degrees in [0, 360), counter-clockwise from geographic north
/// - `roll`, `tilt`: degrees in [-180, 180)
/// - `elevation`: metres, approximate (see [`elevation_from_raw`])
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeographicPosition {
    pub latitude: f64,
    pub longitude: f64,
    pub elevation: f64,
    pub heading: f64,
    pub roll: f64,
    pub tilt: f64,
}

/// Converts a raw offset to a fraction of the tile span.
#[inline]
pub fn offset_fraction(raw: i32) -> f64 {
    f64::from(raw) / OFFSET_RESOLUTION
}

/// Converts a raw angle to degrees without normalizing it.
#[inline]
pub fn raw_angle_to_degrees(raw: i32) -> f64 {
    f64::from(raw) * 360.0 / ANGLE_UNITS_PER_TURN
}

/// Normalizes an angle into [0, 360).
#[inline]
pub fn normalize_heading(degrees: f64) -> f64 {
    let wrapped = degrees.rem_euclid(360.0);
    // rem_euclid rounds to exactly 360 for tiny negative inputs
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Normalizes an angle into [-180, 180).
#[inline]
pub fn normalize_signed(degrees: f64) -> f64 {
    normalize_heading(degrees + 180.0) - 180.0
}

/// Longitude-dependent offset between the service's heading reference and
/// geographic north, in degrees.
///
/// Provisional: the offset equals the longitude. Subtracted from the raw
/// heading by [`GeodeticModel::heading`].
#[inline]
pub fn heading_correction(longitude: f64) -> f64 {
    longitude
}

/// Converts a raw elevation to metres.
///
/// Approximate: the height reference (ellipsoid or geoid) and unit of the
/// encoding are unconfirmed.
#[inline]
pub fn elevation_from_raw(raw: i32) -> f64 {
    f64::from(raw) * ELEVATION_METRES_PER_UNIT
}

/// Converts raw tile offsets to latitude/longitude in degrees.
///
/// Offsets outside `[0, OFFSET_RESOLUTION)` describe points beyond the tile
/// and are converted the same way; longitude wraps around the antimeridian.
pub fn offset_to_lat_lon(
    tile: &TileCoordinate,
    longitude_offset: i32,
    latitude_offset: i32,
) -> Result<(f64, f64), CoordError> {
    tile.validate()?;

    let grid_x = f64::from(tile.x) + offset_fraction(longitude_offset);
    // Latitude offsets count up from the southern edge, grid rows count down
    // from the northern one.
    let grid_y = f64::from(tile.y) + 1.0 - offset_fraction(latitude_offset);

    Ok(grid_to_lat_lon(grid_x, grid_y, tile.z))
}

/// Conversion rules from raw location values to geographic ones.
///
/// Every method has a default matching the free functions of this module;
/// implementors override only what they know better.
pub trait GeodeticModel {
    /// Elevation in metres.
    fn elevation(&self, raw: i32) -> f64 {
        elevation_from_raw(raw)
    }

    /// Offset to remove from a raw heading at the given longitude.
    fn heading_correction(&self, longitude: f64) -> f64 {
        heading_correction(longitude)
    }

    /// Heading in [0, 360).
    fn heading(&self, raw: i32, longitude: f64) -> f64 {
        normalize_heading(raw_angle_to_degrees(raw) - self.heading_correction(longitude))
    }

    /// Roll or tilt in [-180, 180).
    fn attitude(&self, raw: i32) -> f64 {
        normalize_signed(raw_angle_to_degrees(raw))
    }

    /// Full conversion of a raw location inside `tile`.
    ///
    /// Fails when `tile` is outside the slippy-map grid.
    fn to_geographic(
        &self,
        tile: &TileCoordinate,
        location: &RawLocation,
    ) -> Result<GeographicPosition, CoordError> {
        let (latitude, longitude) =
            offset_to_lat_lon(tile, location.longitude_offset, location.latitude_offset)?;

        Ok(GeographicPosition {
            latitude,
            longitude,
            elevation: self.elevation(location.elevation),
            heading: self.heading(location.heading, longitude),
            roll: self.attitude(location.roll),
            tilt: self.attitude(location.tilt),
        })
    }
}

/// The model built from this module's provisional conversions.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProvisionalModel;

impl GeodeticModel for ProvisionalModel {}

/// Converts a raw location using [`ProvisionalModel`].
pub fn to_geographic(
    tile: &TileCoordinate,
    location: &RawLocation,
) -> Result<GeographicPosition, CoordError> {
    ProvisionalModel.to_geographic(tile, location)
}
