//! Coordinate conversion module
//!
//! Provides conversions between geographic coordinates (latitude/longitude)
//! and the Web Mercator slippy-map grid that coverage tiles are keyed on.
//!
//! Positions inside a tile are expressed as fractions of the tile span in
//! Mercator space, which is linear in longitude and linear in the projected
//! `y` axis, but not in latitude.

mod types;

pub use types::{
    CoordError, TileBounds, TileCoordinate, COVERAGE_ZOOM, MAX_LAT, MAX_LON, MAX_ZOOM, MIN_LAT,
    MIN_LON, MIN_ZOOM,
};

use std::f64::consts::PI;

/// Converts geographic coordinates to the tile containing them.
///
/// # Arguments
///
/// * `lat` - Latitude in degrees (-85.05112878 to 85.05112878)
/// * `lon` - Longitude in degrees (-180.0 to 180.0)
/// * `zoom` - Zoom level (0 to 30)
///
/// # Returns
///
/// A `Result` containing the tile coordinates or an error if inputs are invalid.
#[inline]
pub fn tile_containing(lat: f64, lon: f64, zoom: i32) -> Result<TileCoordinate, CoordError> {
    if !(MIN_LAT..=MAX_LAT).contains(&lat) {
        return Err(CoordError::InvalidLatitude(lat));
    }
    if !(MIN_LON..=MAX_LON).contains(&lon) {
        return Err(CoordError::InvalidLongitude(lon));
    }
    if !(MIN_ZOOM..=MAX_ZOOM).contains(&zoom) {
        return Err(CoordError::InvalidZoom(zoom));
    }

    let n = 2.0_f64.powi(zoom);
    let max_index = n - 1.0;

    // lon = 180 and lat = MIN_LAT land exactly on the far edge; keep them in the last tile
    let x = ((lon + 180.0) / 360.0 * n).floor().min(max_index);

    let lat_rad = lat.to_radians();
    let y = ((1.0 - lat_rad.tan().asinh() / PI) / 2.0 * n)
        .floor()
        .clamp(0.0, max_index);

    Ok(TileCoordinate::new(x as i32, y as i32, zoom))
}

/// Converts a fractional grid position to latitude/longitude.
///
/// `tile_x` and `tile_y` are tile indices that may carry a fractional part
/// (e.g. `10.5` is the middle of column 10). Longitude is wrapped into
/// [-180, 180]; latitude always falls inside the Mercator domain because the
/// inverse projection is bounded.
#[inline]
pub fn grid_to_lat_lon(tile_x: f64, tile_y: f64, zoom: i32) -> (f64, f64) {
    let n = 2.0_f64.powi(zoom);

    let lon = wrap_longitude(tile_x / n * 360.0 - 180.0);

    let y = tile_y / n;
    let lat_rad = (PI * (1.0 - 2.0 * y)).sinh().atan();

    (lat_rad.to_degrees(), lon)
}

/// Returns the latitude/longitude of the tile's northwest corner.
#[inline]
pub fn tile_to_lat_lon(tile: &TileCoordinate) -> (f64, f64) {
    grid_to_lat_lon(f64::from(tile.x), f64::from(tile.y), tile.z)
}

/// Returns the geographic bounding box of a validated tile.
pub fn tile_bounds(tile: &TileCoordinate) -> Result<TileBounds, CoordError> {
    tile.validate()?;

    let n = 2.0_f64.powi(tile.z);
    let x = f64::from(tile.x);
    let y = f64::from(tile.y);

    // Edge longitudes are computed without wrapping so the east edge of the
    // last column stays at +180 instead of folding back to -180.
    let west = x / n * 360.0 - 180.0;
    let east = (x + 1.0) / n * 360.0 - 180.0;
    let (north, _) = grid_to_lat_lon(x, y, tile.z);
    let (south, _) = grid_to_lat_lon(x, y + 1.0, tile.z);

    Ok(TileBounds {
        north,
        south,
        west,
        east,
    })
}

/// Normalizes a longitude into [-180, 180].
///
/// Values already in range are returned unchanged, so both -180 and 180 are
/// preserved.
#[inline]
pub fn wrap_longitude(lon: f64) -> f64 {
    if (MIN_LON..=MAX_LON).contains(&lon) {
        return lon;
    }
    let wrapped = (lon + 180.0).rem_euclid(360.0) - 180.0;
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    wrapped.clamp(MIN_LON, MAX_LON)
}
