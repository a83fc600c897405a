//! Output types of tile resolution.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::geodetic::GeographicPosition;
use crate::wire::{CameraPose, CoverageType, LensParams, RawProjection};

/// A panorama with every reference and raw value resolved.
///
/// Geographic fields are `None` when the raw record had no location or the
/// tile coordinate was unknown; they are never filled with zeros.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedPano {
    pub panoid: u64,
    /// Capture time in milliseconds since the Unix epoch.
    pub timestamp_millis: Option<i64>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Metres, approximate.
    pub elevation: Option<f64>,
    /// Degrees in [0, 360).
    pub heading: Option<f64>,
    /// Degrees in [-180, 180).
    pub roll: Option<f64>,
    /// Degrees in [-180, 180).
    pub tilt: Option<f64>,
    pub coverage_type: Option<CoverageType>,
    pub batch_id: Option<i32>,
    /// One entry per face, in the order the panorama listed them.
    pub projections: Vec<ResolvedProjection>,
    /// Values of fields whose meaning is unknown, keyed by origin
    /// (`pano.4`, `pano.aux[0]`, `batch.9`, `projection[1].6`, ...).
    pub auxiliary: BTreeMap<String, i64>,
}

impl ResolvedPano {
    /// A panorama with only its id set.
    pub fn new(panoid: u64) -> Self {
        Self {
            panoid,
            timestamp_millis: None,
            latitude: None,
            longitude: None,
            elevation: None,
            heading: None,
            roll: None,
            tilt: None,
            coverage_type: None,
            batch_id: None,
            projections: Vec::new(),
            auxiliary: BTreeMap::new(),
        }
    }

    /// Copies a converted position into the geographic fields.
    pub fn set_position(&mut self, position: GeographicPosition) {
        self.latitude = Some(position.latitude);
        self.longitude = Some(position.longitude);
        self.elevation = Some(position.elevation);
        self.heading = Some(position.heading);
        self.roll = Some(position.roll);
        self.tilt = Some(position.tilt);
    }

    /// The geographic fields as one value, if present.
    pub fn position(&self) -> Option<GeographicPosition> {
        Some(GeographicPosition {
            latitude: self.latitude?,
            longitude: self.longitude?,
            elevation: self.elevation?,
            heading: self.heading?,
            roll: self.roll?,
            tilt: self.tilt?,
        })
    }

    /// Whether latitude and longitude are known.
    pub fn is_located(&self) -> bool {
        self.latitude.is_some() && self.longitude.is_some()
    }

    /// Capture time as a UTC timestamp.
    pub fn captured_at(&self) -> Option<DateTime<Utc>> {
        self.timestamp_millis
            .and_then(DateTime::<Utc>::from_timestamp_millis)
    }

    pub fn heading_radians(&self) -> Option<f64> {
        self.heading.map(f64::to_radians)
    }

    pub fn roll_radians(&self) -> Option<f64> {
        self.roll.map(f64::to_radians)
    }

    pub fn tilt_radians(&self) -> Option<f64> {
        self.tilt.map(f64::to_radians)
    }
}

/// Projection parameters of one panorama face.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ResolvedProjection {
    pub face: i32,
    pub lens: Option<LensParams>,
    pub pose: Option<CameraPose>,
}

impl From<&RawProjection> for ResolvedProjection {
    fn from(raw: &RawProjection) -> Self {
        Self {
            face: raw.face,
            lens: raw.lens,
            pose: raw.pose,
        }
    }
}
