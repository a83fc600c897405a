//! Protobuf messages of the coverage tile format.
//!
//! Field numbers are fixed by the service and must never be renumbered.
//! Fields whose meaning is unknown are kept as `opaqueN` so they survive a
//! decode/encode cycle untouched.

use std::fmt;

use prost::{Enumeration, Message};
use serde::Serialize;

use crate::coord::TileCoordinate;

/// A decoded coverage tile, before any cross-reference is followed.
///
/// The three collections are flat and indexable; panoramas refer into
/// `batches` and `projections` by position.
#[derive(Clone, PartialEq, Message)]
pub struct DecodedTile {
    #[prost(message, repeated, tag = "1")]
    pub panos: Vec<RawPano>,
    #[prost(message, repeated, tag = "4")]
    pub batches: Vec<RawBatch>,
    #[prost(message, repeated, tag = "5")]
    pub projections: Vec<RawProjection>,
    /// Coordinate the service embedded in the tile, if any.
    #[prost(message, optional, tag = "6")]
    pub coordinate: Option<TileCoordinate>,
}

/// One panorama record.
#[derive(Clone, PartialEq, Message)]
pub struct RawPano {
    /// Numeric panorama id (up to 20 decimal digits).
    #[prost(uint64, tag = "1")]
    pub panoid: u64,
    #[prost(int32, optional, tag = "4")]
    pub opaque4: Option<i32>,
    /// Capture time in milliseconds since the Unix epoch.
    #[prost(int64, optional, tag = "5")]
    pub timestamp_millis: Option<i64>,
    /// Index into [`DecodedTile::batches`].
    #[prost(int32, optional, tag = "7")]
    pub batch_index: Option<i32>,
    /// Indices into [`DecodedTile::projections`], one per image face.
    #[prost(int32, repeated, tag = "9")]
    pub projection_indices: Vec<i32>,
    #[prost(message, optional, tag = "10")]
    pub location: Option<RawLocation>,
    #[prost(message, optional, tag = "12")]
    pub aux: Option<AuxValues>,
}

/// Tile-relative position and orientation of a panorama, all raw integers.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Message)]
pub struct RawLocation {
    #[prost(int32, tag = "1")]
    pub longitude_offset: i32,
    #[prost(int32, tag = "2")]
    pub latitude_offset: i32,
    #[prost(int32, tag = "3")]
    pub elevation: i32,
    #[prost(int32, tag = "4")]
    pub heading: i32,
    #[prost(int32, tag = "5")]
    pub roll: i32,
    #[prost(int32, tag = "6")]
    pub tilt: i32,
}

/// Small auxiliary integers attached to a panorama (observed range 0..63).
#[derive(Clone, PartialEq, Eq, Message)]
pub struct AuxValues {
    #[prost(int32, repeated, tag = "1")]
    pub values: Vec<i32>,
}

/// Capture method of a batch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Enumeration, Serialize)]
#[serde(rename_all = "lowercase")]
#[repr(i32)]
pub enum CoverageType {
    Default = 0,
    /// Car-mounted camera.
    Car = 2,
    /// Backpack-mounted camera.
    Trekker = 3,
}

impl fmt::Display for CoverageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoverageType::Default => write!(f, "default"),
            CoverageType::Car => write!(f, "car"),
            CoverageType::Trekker => write!(f, "trekker"),
        }
    }
}

/// Upload batch that groups panoramas and classifies their coverage.
#[derive(Clone, PartialEq, Eq, Message)]
pub struct RawBatch {
    #[prost(int32, optional, tag = "1")]
    pub opaque1: Option<i32>,
    #[prost(int32, optional, tag = "3")]
    pub batch_id: Option<i32>,
    #[prost(int32, optional, tag = "4")]
    pub opaque4: Option<i32>,
    #[prost(int32, optional, tag = "5")]
    pub opaque5: Option<i32>,
    /// Raw [`CoverageType`] value. Kept as an integer so values added by the
    /// service later are preserved instead of rejected.
    #[prost(enumeration = "CoverageType", optional, tag = "6")]
    pub coverage_type: Option<i32>,
    #[prost(int32, optional, tag = "9")]
    pub opaque9: Option<i32>,
    #[prost(int32, optional, tag = "10")]
    pub opaque10: Option<i32>,
    #[prost(int32, optional, tag = "11")]
    pub opaque11: Option<i32>,
    #[prost(int32, optional, tag = "12")]
    pub opaque12: Option<i32>,
}

impl RawBatch {
    /// Interpreted coverage type; `None` when absent or not a known value.
    pub fn coverage(&self) -> Option<CoverageType> {
        self.coverage_type
            .and_then(|raw| CoverageType::try_from(raw).ok())
    }

    /// Present opaque fields as `(field number, value)` pairs, in field order.
    ///
    /// A coverage value outside [`CoverageType`] is reported here as field 6.
    pub fn opaque_fields(&self) -> Vec<(u32, i32)> {
        let unknown_coverage = self.coverage_type.filter(|_| self.coverage().is_none());
        [
            (1, self.opaque1),
            (4, self.opaque4),
            (5, self.opaque5),
            (6, unknown_coverage),
            (9, self.opaque9),
            (10, self.opaque10),
            (11, self.opaque11),
            (12, self.opaque12),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.map(|v| (field, v)))
        .collect()
    }
}

/// Image projection of one panorama face.
#[derive(Clone, PartialEq, Message)]
pub struct RawProjection {
    #[prost(int32, tag = "1")]
    pub face: i32,
    #[prost(message, optional, tag = "4")]
    pub lens: Option<LensParams>,
    #[prost(message, optional, tag = "5")]
    pub pose: Option<CameraPose>,
    #[prost(int32, optional, tag = "6")]
    pub opaque6: Option<i32>,
}

/// Lens model parameters of a face.
///
/// `fov_s`/`fov_h` are the angular extents of the face, `k2`..`k4` radial
/// distortion terms, `cx`/`cy` the principal point and `lx`/`ly` the
/// lens offset. `model` selects the projection family.
#[derive(Clone, Copy, PartialEq, Message, Serialize)]
pub struct LensParams {
    #[prost(double, tag = "1")]
    pub model: f64,
    #[prost(double, tag = "2")]
    pub fov_s: f64,
    #[prost(double, tag = "3")]
    pub fov_h: f64,
    #[prost(double, tag = "4")]
    pub k2: f64,
    #[prost(double, tag = "5")]
    pub k3: f64,
    #[prost(double, tag = "6")]
    pub k4: f64,
    #[prost(double, tag = "7")]
    pub cx: f64,
    #[prost(double, tag = "8")]
    pub cy: f64,
    #[prost(double, tag = "9")]
    pub lx: f64,
    #[prost(double, tag = "10")]
    pub ly: f64,
}

/// Position and orientation of a face's camera relative to the panorama
/// centre.
#[derive(Clone, Copy, PartialEq, Message, Serialize)]
pub struct CameraPose {
    #[prost(double, tag = "1")]
    pub x: f64,
    #[prost(double, tag = "2")]
    pub y: f64,
    #[prost(double, tag = "3")]
    pub z: f64,
    #[prost(double, tag = "4")]
    pub yaw: f64,
    #[prost(double, tag = "5")]
    pub pitch: f64,
    #[prost(double, tag = "6")]
    pub roll: f64,
}
