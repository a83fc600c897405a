//! Cross-reference resolution between the records of a decoded tile.
//!
//! Panoramas point at their batch and projections by array index. This
//! module turns those indices into borrowed references in a separate pass,
//! so decoding stays total and resolution can tolerate broken links:
//!
//! - a missing or out-of-range batch index yields no batch
//! - out-of-range projection indices are dropped, the rest keep their order
//!
//! Neither case is an error; callers see the gap as an absent value.

use tracing::warn;

use crate::wire::{DecodedTile, RawBatch, RawPano, RawProjection};

/// A panorama together with the records it refers to.
#[derive(Debug, Clone, PartialEq)]
pub struct PanoRefs<'a> {
    /// Position of the panorama within [`DecodedTile::panos`].
    pub position: usize,
    pub pano: &'a RawPano,
    pub batch: Option<&'a RawBatch>,
    /// Referenced projections, in the order of `projection_indices`.
    pub projections: Vec<&'a RawProjection>,
}

/// Looks up a wire index in a collection.
///
/// Negative and out-of-range indices resolve to `None`.
#[inline]
pub fn lookup<T>(items: &[T], index: i32) -> Option<&T> {
    usize::try_from(index).ok().and_then(|i| items.get(i))
}

/// Resolves the batch and projection references of every panorama.
///
/// Output order matches `tile.panos`; duplicated panoramas stay separate.
pub fn resolve_references(tile: &DecodedTile) -> Vec<PanoRefs<'_>> {
    tile.panos
        .iter()
        .enumerate()
        .map(|(position, pano)| resolve_pano(tile, position, pano))
        .collect()
}

fn resolve_pano<'a>(tile: &'a DecodedTile, position: usize, pano: &'a RawPano) -> PanoRefs<'a> {
    let batch = pano.batch_index.and_then(|index| {
        let batch = lookup(&tile.batches, index);
        if batch.is_none() {
            warn!(
                panoid = pano.panoid,
                index,
                batches = tile.batches.len(),
                "Batch index out of range"
            );
        }
        batch
    });

    let projections = pano
        .projection_indices
        .iter()
        .filter_map(|&index| {
            let projection = lookup(&tile.projections, index);
            if projection.is_none() {
                warn!(
                    panoid = pano.panoid,
                    index,
                    projections = tile.projections.len(),
                    "Projection index out of range, skipping"
                );
            }
            projection
        })
        .collect();

    PanoRefs {
        position,
        pano,
        batch,
        projections,
    }
}

/// Counts of references that could not be followed in a tile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReferenceReport {
    /// Panoramas in the tile.
    pub panos: usize,
    /// Panoramas without a batch index.
    pub missing_batch: usize,
    /// Batch indices pointing outside the batch list.
    pub dangling_batch: usize,
    /// Projection indices pointing outside the projection list.
    pub dangling_projections: usize,
}

impl ReferenceReport {
    /// Whether every present index resolved.
    pub fn is_consistent(&self) -> bool {
        self.dangling_batch == 0 && self.dangling_projections == 0
    }
}

/// Audits the references of a tile without resolving them.
pub fn reference_report(tile: &DecodedTile) -> ReferenceReport {
    tile.panos
        .iter()
        .fold(ReferenceReport::default(), |mut report, pano| {
            report.panos += 1;
            match pano.batch_index {
                None => report.missing_batch += 1,
                Some(index) if lookup(&tile.batches, index).is_none() => {
                    report.dangling_batch += 1
                }
                Some(_) => {}
            }
            report.dangling_projections += pano
                .projection_indices
                .iter()
                .filter(|&&index| lookup(&tile.projections, index).is_none())
                .count();
            report
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch(id: i32) -> RawBatch {
        RawBatch {
            batch_id: Some(id),
            ..Default::default()
        }
    }

    fn projection(face: i32) -> RawProjection {
        RawProjection {
            face,
            ..Default::default()
        }
    }

    fn pano(panoid: u64, batch_index: Option<i32>, projection_indices: Vec<i32>) -> RawPano {
        RawPano {
            panoid,
            batch_index,
            projection_indices,
            ..Default::default()
        }
    }

    fn tile(panos: Vec<RawPano>) -> DecodedTile {
        DecodedTile {
            panos,
            batches: vec![batch(10), batch(11)],
            projections: vec![projection(0), projection(1), projection(2)],
            coordinate: None,
        }
    }

    #[test]
    fn test_lookup_bounds() {
        let items = [1, 2, 3];
        assert_eq!(lookup(&items, 0), Some(&1));
        assert_eq!(lookup(&items, 2), Some(&3));
        assert_eq!(lookup(&items, 3), None);
        assert_eq!(lookup(&items, -1), None);
        assert_eq!(lookup::<i32>(&[], 0), None);
    }

    #[test]
    fn test_resolves_batch_and_projections() {
        let tile = tile(vec![pano(1, Some(1), vec![2, 0])]);
        let refs = resolve_references(&tile);

        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].position, 0);
        assert_eq!(refs[0].batch.and_then(|b| b.batch_id), Some(11));
        let faces: Vec<i32> = refs[0].projections.iter().map(|p| p.face).collect();
        assert_eq!(faces, vec![2, 0]);
    }

    #[test]
    fn test_missing_batch_index_yields_no_batch() {
        let tile = tile(vec![pano(1, None, vec![])]);
        let refs = resolve_references(&tile);
        assert!(refs[0].batch.is_none());
    }

    #[test]
    fn test_out_of_range_batch_index_yields_no_batch() {
        let tile = tile(vec![pano(1, Some(2), vec![]), pano(2, Some(-5), vec![])]);
        let refs = resolve_references(&tile);
        assert!(refs[0].batch.is_none());
        assert!(refs[1].batch.is_none());
    }

    #[test]
    fn test_out_of_range_projection_indices_are_omitted() {
        let tile = tile(vec![pano(1, Some(0), vec![1, 7, -1, 0, 3, 2])]);
        let refs = resolve_references(&tile);
        let faces: Vec<i32> = refs[0].projections.iter().map(|p| p.face).collect();
        assert_eq!(faces, vec![1, 0, 2]);
    }

    #[test]
    fn test_repeated_projection_index_is_kept() {
        let tile = tile(vec![pano(1, None, vec![1, 1])]);
        let refs = resolve_references(&tile);
        assert_eq!(refs[0].projections.len(), 2);
    }

    #[test]
    fn test_duplicate_panoids_stay_separate() {
        let tile = tile(vec![pano(9, Some(0), vec![]), pano(9, Some(1), vec![])]);
        let refs = resolve_references(&tile);
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[0].batch.and_then(|b| b.batch_id), Some(10));
        assert_eq!(refs[1].batch.and_then(|b| b.batch_id), Some(11));
        assert_eq!(refs[1].position, 1);
    }

    #[test]
    fn test_reference_report() {
        let tile = tile(vec![
            pano(1, Some(0), vec![0, 5]),
            pano(2, None, vec![9, 8]),
            pano(3, Some(4), vec![1]),
        ]);
        let report = reference_report(&tile);
        assert_eq!(
            report,
            ReferenceReport {
                panos: 3,
                missing_batch: 1,
                dangling_batch: 1,
                dangling_projections: 3,
            }
        );
        assert!(!report.is_consistent());
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let tile = tile(vec![pano(1, Some(1), vec![0, 4, 2]), pano(2, Some(3), vec![])]);
        assert_eq!(resolve_references(&tile), resolve_references(&tile));
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn test_valid_indices_survive_in_order(
                indices in proptest::collection::vec(-4i32..8, 0..16)
            ) {
                let tile = tile(vec![pano(1, None, indices.clone())]);
                let refs = resolve_references(&tile);

                let expected: Vec<i32> =
                    indices.into_iter().filter(|i| (0..3).contains(i)).collect();
                let faces: Vec<i32> = refs[0].projections.iter().map(|p| p.face).collect();
                prop_assert_eq!(faces, expected);
            }

            #[test]
            fn test_batch_present_iff_index_in_range(index in proptest::option::of(-4i32..6)) {
                let tile = tile(vec![pano(1, index, vec![])]);
                let refs = resolve_references(&tile);
                let in_range = matches!(index, Some(0..=1));
                prop_assert_eq!(refs[0].batch.is_some(), in_range);
            }
        }
    }
}
