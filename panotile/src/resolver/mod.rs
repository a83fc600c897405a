//! Tile resolution facade.
//!
//! Runs the full pipeline for a tile:
//!
//! ```text
//! bytes ──► decode_tile ──► resolve_references ──► GeodeticModel ──► Vec<ResolvedPano>
//! ```
//!
//! Resolution is pure: the same bytes always give the same output, and
//! tiles can be resolved concurrently without coordination. Batches of
//! tiles are spread over a rayon pool by [`TileResolver::resolve_many`].
//!
//! # Example
//!
//! ```
//! use panotile::coord::TileCoordinate;
//! use panotile::resolver::resolve_tile;
//! use panotile::wire::{encode_tile, DecodedTile, RawLocation, RawPano};
//!
//! let tile = DecodedTile {
//!     panos: vec![RawPano {
//!         panoid: 42,
//!         location: Some(RawLocation {
//!             longitude_offset: 500_000,
//!             latitude_offset: 500_000,
//!             ..Default::default()
//!         }),
//!         ..Default::default()
//!     }],
//!     coordinate: Some(TileCoordinate::new(70_000, 43_000, 17)),
//!     ..Default::default()
//! };
//!
//! let panos = resolve_tile(&encode_tile(&tile), None).unwrap();
//! assert_eq!(panos[0].panoid, 42);
//! assert!(panos[0].is_located());
//! ```

mod types;

pub use types::{ResolvedPano, ResolvedProjection};

use std::collections::HashSet;

use rayon::prelude::*;
use tracing::{debug, trace, warn};

use crate::config::ResolverConfig;
use crate::coord::TileCoordinate;
use crate::error::{TileError, TileResult};
use crate::geodetic::{GeodeticModel, ProvisionalModel};
use crate::wire::{decode_tile, DecodedTile};
use crate::xref::{resolve_references, PanoRefs};

/// One tile to resolve in a batch.
#[derive(Debug, Clone, Copy)]
pub struct TileInput<'a> {
    pub data: &'a [u8],
    /// Coordinate the caller requested the tile for, if known.
    pub expected: Option<TileCoordinate>,
}

impl<'a> TileInput<'a> {
    pub fn new(data: &'a [u8], expected: Option<TileCoordinate>) -> Self {
        Self { data, expected }
    }
}

/// Resolves coverage tiles into [`ResolvedPano`]s.
///
/// Generic over the [`GeodeticModel`] so the provisional elevation and
/// heading conversions can be replaced without touching decoding.
#[derive(Debug, Clone, Default)]
pub struct TileResolver<M = ProvisionalModel> {
    config: ResolverConfig,
    model: M,
}

impl TileResolver<ProvisionalModel> {
    /// Creates a resolver using the provisional geodetic model.
    pub fn new(config: ResolverConfig) -> Self {
        Self {
            config,
            model: ProvisionalModel,
        }
    }
}

impl<M: GeodeticModel> TileResolver<M> {
    /// Creates a resolver with a custom geodetic model.
    pub fn with_model(config: ResolverConfig, model: M) -> Self {
        Self { config, model }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Decodes and resolves one tile.
    ///
    /// # Errors
    ///
    /// - [`TileError::TooLarge`] if `data` exceeds `max_tile_bytes`
    /// - [`TileError::Malformed`] if `data` is not a valid tile
    /// - [`TileError::CoordinateMismatch`] if `expected` disagrees with the
    ///   coordinate embedded in the tile
    /// - [`TileError::OutOfRange`] if the coordinate in use is off the grid
    pub fn resolve(
        &self,
        data: &[u8],
        expected: Option<TileCoordinate>,
    ) -> TileResult<Vec<ResolvedPano>> {
        if data.len() > self.config.max_tile_bytes {
            return Err(TileError::TooLarge {
                size: data.len(),
                max: self.config.max_tile_bytes,
            });
        }

        let tile = decode_tile(data)?;
        self.resolve_decoded(&tile, expected)
    }

    /// Resolves an already decoded tile.
    pub fn resolve_decoded(
        &self,
        tile: &DecodedTile,
        expected: Option<TileCoordinate>,
    ) -> TileResult<Vec<ResolvedPano>> {
        let coordinate = effective_coordinate(expected, tile.coordinate)?;
        if let Some(coordinate) = &coordinate {
            coordinate.validate()?;
        } else if tile.panos.iter().any(|p| p.location.is_some()) {
            warn!(
                panos = tile.panos.len(),
                "Tile has no coordinate, positions left unresolved"
            );
        }

        let mut seen = HashSet::with_capacity(tile.panos.len());
        let mut resolved = Vec::with_capacity(tile.panos.len());

        for refs in resolve_references(tile) {
            if !seen.insert(refs.pano.panoid) {
                warn!(
                    panoid = refs.pano.panoid,
                    position = refs.position,
                    "Duplicate panoid in tile"
                );
            }
            if self.config.skip_unlocated && refs.pano.location.is_none() {
                trace!(panoid = refs.pano.panoid, "Skipping pano without location");
                continue;
            }
            resolved.push(self.resolve_pano(&refs, coordinate.as_ref())?);
        }

        debug!(
            coordinate = ?coordinate,
            panos = tile.panos.len(),
            resolved = resolved.len(),
            batches = tile.batches.len(),
            projections = tile.projections.len(),
            "Resolved tile"
        );

        Ok(resolved)
    }

    fn resolve_pano(
        &self,
        refs: &PanoRefs<'_>,
        coordinate: Option<&TileCoordinate>,
    ) -> TileResult<ResolvedPano> {
        let raw = refs.pano;
        let mut pano = ResolvedPano::new(raw.panoid);
        pano.timestamp_millis = raw.timestamp_millis;

        if let (Some(location), Some(coordinate)) = (&raw.location, coordinate) {
            pano.set_position(self.model.to_geographic(coordinate, location)?);
        }

        if let Some(value) = raw.opaque4 {
            pano.auxiliary.insert("pano.4".to_string(), i64::from(value));
        }
        if let Some(aux) = &raw.aux {
            for (i, value) in aux.values.iter().enumerate() {
                pano.auxiliary
                    .insert(format!("pano.aux[{}]", i), i64::from(*value));
            }
        }

        if let Some(batch) = refs.batch {
            pano.coverage_type = batch.coverage();
            pano.batch_id = batch.batch_id;
            for (field, value) in batch.opaque_fields() {
                pano.auxiliary
                    .insert(format!("batch.{}", field), i64::from(value));
            }
        }

        for (i, projection) in refs.projections.iter().enumerate() {
            if let Some(value) = projection.opaque6 {
                pano.auxiliary
                    .insert(format!("projection[{}].6", i), i64::from(value));
            }
            pano.projections.push(ResolvedProjection::from(*projection));
        }

        trace!(
            panoid = pano.panoid,
            located = pano.is_located(),
            faces = pano.projections.len(),
            "Resolved pano"
        );

        Ok(pano)
    }
}

impl<M: GeodeticModel + Sync> TileResolver<M> {
    /// Resolves independent tiles in parallel.
    ///
    /// Returns one result per input, in input order. A failing tile does not
    /// affect the others.
    pub fn resolve_many(&self, inputs: &[TileInput<'_>]) -> Vec<TileResult<Vec<ResolvedPano>>> {
        let run = || {
            inputs
                .par_iter()
                .map(|input| self.resolve(input.data, input.expected))
                .collect()
        };

        match self.config.threads {
            Some(threads) => match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
                Ok(pool) => pool.install(run),
                Err(e) => {
                    warn!(threads, error = %e, "Failed to build thread pool, using shared pool");
                    run()
                }
            },
            None => run(),
        }
    }
}

/// Picks the coordinate to resolve positions against.
///
/// The caller's expectation and the embedded coordinate must agree when both
/// are present; otherwise whichever exists is used.
pub fn effective_coordinate(
    expected: Option<TileCoordinate>,
    embedded: Option<TileCoordinate>,
) -> TileResult<Option<TileCoordinate>> {
    match (expected, embedded) {
        (Some(expected), Some(found)) if expected != found => {
            Err(TileError::CoordinateMismatch { expected, found })
        }
        (expected, embedded) => Ok(expected.or(embedded)),
    }
}

/// Resolves one tile with the default configuration and model.
pub fn resolve_tile(
    data: &[u8],
    expected: Option<TileCoordinate>,
) -> TileResult<Vec<ResolvedPano>> {
    TileResolver::new(ResolverConfig::default()).resolve(data, expected)
}

/// Resolves many tiles in parallel with the default configuration and model.
pub fn resolve_tiles(inputs: &[TileInput<'_>]) -> Vec<TileResult<Vec<ResolvedPano>>> {
    TileResolver::new(ResolverConfig::default()).resolve_many(inputs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::CoordError;
    use crate::wire::{
        encode_tile, AuxValues, CoverageType, RawBatch, RawLocation, RawPano, RawProjection,
    };

    fn resolver() -> TileResolver {
        TileResolver::new(ResolverConfig::default())
    }

    fn located_pano(panoid: u64) -> RawPano {
        RawPano {
            panoid,
            timestamp_millis: Some(1_600_000_000_000),
            batch_index: Some(0),
            projection_indices: vec![0],
            location: Some(RawLocation {
                longitude_offset: 500_000,
                latitude_offset: 500_000,
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    fn tile_with(panos: Vec<RawPano>, coordinate: Option<TileCoordinate>) -> DecodedTile {
        DecodedTile {
            panos,
            batches: vec![RawBatch {
                batch_id: Some(7),
                coverage_type: Some(CoverageType::Car as i32),
                opaque9: Some(4),
                ..Default::default()
            }],
            projections: vec![RawProjection {
                face: 0,
                opaque6: Some(1),
                ..Default::default()
            }],
            coordinate,
        }
    }

    #[test]
    fn test_effective_coordinate() {
        let a = TileCoordinate::new(1, 2, 17);
        let b = TileCoordinate::new(1, 3, 17);

        assert_eq!(effective_coordinate(None, None).unwrap(), None);
        assert_eq!(effective_coordinate(Some(a), None).unwrap(), Some(a));
        assert_eq!(effective_coordinate(None, Some(b)).unwrap(), Some(b));
        assert_eq!(effective_coordinate(Some(a), Some(a)).unwrap(), Some(a));
        assert_eq!(
            effective_coordinate(Some(a), Some(b)).unwrap_err(),
            TileError::CoordinateMismatch {
                expected: a,
                found: b
            }
        );
    }

    #[test]
    fn test_resolves_located_pano() {
        let coordinate = TileCoordinate::new(10, 20, 14);
        let tile = tile_with(vec![located_pano(1)], Some(coordinate));
        let panos = resolver().resolve_decoded(&tile, None).unwrap();

        assert_eq!(panos.len(), 1);
        let pano = &panos[0];
        assert!(pano.is_located());
        assert_eq!(pano.coverage_type, Some(CoverageType::Car));
        assert_eq!(pano.batch_id, Some(7));
        assert_eq!(pano.projections.len(), 1);
        assert_eq!(pano.timestamp_millis, Some(1_600_000_000_000));
        assert_eq!(pano.auxiliary.get("batch.9"), Some(&4));
        assert_eq!(pano.auxiliary.get("projection[0].6"), Some(&1));
    }

    #[test]
    fn test_expected_coordinate_used_when_tile_has_none() {
        let tile = tile_with(vec![located_pano(1)], None);
        let expected = TileCoordinate::new(10, 20, 14);
        let panos = resolver().resolve_decoded(&tile, Some(expected)).unwrap();
        assert!(panos[0].is_located());
    }

    #[test]
    fn test_no_coordinate_leaves_positions_absent() {
        let tile = tile_with(vec![located_pano(1)], None);
        let panos = resolver().resolve_decoded(&tile, None).unwrap();

        assert!(!panos[0].is_located());
        assert!(panos[0].heading.is_none());
        assert!(panos[0].elevation.is_none());
        assert_eq!(panos[0].coverage_type, Some(CoverageType::Car));
    }

    #[test]
    fn test_mismatched_coordinate_fails() {
        let tile = tile_with(vec![located_pano(1)], Some(TileCoordinate::new(10, 20, 14)));
        let result = resolver().resolve_decoded(&tile, Some(TileCoordinate::new(10, 21, 14)));
        assert!(matches!(result, Err(TileError::CoordinateMismatch { .. })));
    }

    #[test]
    fn test_out_of_range_coordinate_fails() {
        let tile = tile_with(vec![], Some(TileCoordinate::new(0, 0, -2)));
        let result = resolver().resolve_decoded(&tile, None);
        assert_eq!(
            result.unwrap_err(),
            TileError::OutOfRange(CoordError::InvalidZoom(-2))
        );
    }

    #[test]
    fn test_skip_unlocated() {
        let unlocated = RawPano {
            panoid: 2,
            ..Default::default()
        };
        let tile = tile_with(
            vec![located_pano(1), unlocated],
            Some(TileCoordinate::new(10, 20, 14)),
        );

        let all = resolver().resolve_decoded(&tile, None).unwrap();
        assert_eq!(all.len(), 2);

        let config = ResolverConfig {
            skip_unlocated: true,
            ..Default::default()
        };
        let located = TileResolver::new(config).resolve_decoded(&tile, None).unwrap();
        assert_eq!(located.len(), 1);
        assert_eq!(located[0].panoid, 1);
    }

    #[test]
    fn test_duplicate_panoids_preserved() {
        let tile = tile_with(
            vec![located_pano(5), located_pano(5)],
            Some(TileCoordinate::new(10, 20, 14)),
        );
        let panos = resolver().resolve_decoded(&tile, None).unwrap();
        assert_eq!(panos.len(), 2);
        assert_eq!(panos[0], panos[1]);
    }

    #[test]
    fn test_pano_auxiliary_values() {
        let pano = RawPano {
            panoid: 3,
            opaque4: Some(0),
            aux: Some(AuxValues {
                values: vec![12, 63],
            }),
            ..Default::default()
        };
        let tile = tile_with(vec![pano], None);
        let panos = resolver().resolve_decoded(&tile, None).unwrap();

        let aux = &panos[0].auxiliary;
        assert_eq!(aux.get("pano.4"), Some(&0));
        assert_eq!(aux.get("pano.aux[0]"), Some(&12));
        assert_eq!(aux.get("pano.aux[1]"), Some(&63));
        assert!(panos[0].coverage_type.is_none());
        assert!(panos[0].batch_id.is_none());
    }

    #[test]
    fn test_too_large_rejected_before_decoding() {
        let config = ResolverConfig {
            max_tile_bytes: 4,
            ..Default::default()
        };
        let result = TileResolver::new(config).resolve(&[0u8; 5], None);
        assert_eq!(result.unwrap_err(), TileError::TooLarge { size: 5, max: 4 });
    }

    #[test]
    fn test_custom_model_is_used() {
        struct Flat;
        impl GeodeticModel for Flat {
            fn elevation(&self, _raw: i32) -> f64 {
                -1.0
            }
        }

        let tile = tile_with(vec![located_pano(1)], Some(TileCoordinate::new(10, 20, 14)));
        let panos = TileResolver::with_model(ResolverConfig::default(), Flat)
            .resolve_decoded(&tile, None)
            .unwrap();
        assert_eq!(panos[0].elevation, Some(-1.0));
    }

    #[test]
    fn test_resolve_many_keeps_order_and_isolates_failures() {
        let coordinate = TileCoordinate::new(10, 20, 14);
        let good = encode_tile(&tile_with(vec![located_pano(1)], Some(coordinate)));
        let other = encode_tile(&tile_with(vec![located_pano(2)], Some(coordinate)));
        let bad = [0x0Au8, 0x05];

        let inputs = [
            TileInput::new(&good, Some(coordinate)),
            TileInput::new(&bad, None),
            TileInput::new(&other, None),
        ];

        for threads in [None, Some(2)] {
            let config = ResolverConfig {
                threads,
                ..Default::default()
            };
            let results = TileResolver::new(config).resolve_many(&inputs);

            assert_eq!(results.len(), 3);
            assert_eq!(results[0].as_ref().unwrap()[0].panoid, 1);
            assert!(matches!(results[1], Err(TileError::Malformed(_))));
            assert_eq!(results[2].as_ref().unwrap()[0].panoid, 2);
        }
    }
}
