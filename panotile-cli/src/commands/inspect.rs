//! Tile inspection command.
//!
//! Prints record counts and reference health of a tile without computing
//! positions.

use std::path::Path;

use panotile::wire::decode_tile;
use panotile::xref::reference_report;
use panotile::TileError;

use crate::error::CliError;

/// Run the inspect command.
pub fn run(file: &Path) -> Result<(), CliError> {
    let data = std::fs::read(file).map_err(|source| CliError::Read {
        path: file.to_path_buf(),
        source,
    })?;

    let tile = decode_tile(data.as_slice()).map_err(|e| CliError::Tile {
        path: file.to_path_buf(),
        source: TileError::from(e),
    })?;

    println!("File:        {}", file.display());
    println!("Size:        {} bytes", data.len());
    match tile.coordinate {
        Some(coordinate) => println!("Coordinate:  {}", coordinate),
        None => println!("Coordinate:  (none)"),
    }
    println!("Panoramas:   {}", tile.panos.len());
    println!("Batches:     {}", tile.batches.len());
    println!("Projections: {}", tile.projections.len());

    let located = tile.panos.iter().filter(|p| p.location.is_some()).count();
    println!("Located:     {}/{}", located, tile.panos.len());

    let report = reference_report(&tile);
    println!();
    println!("References:");
    println!("  Without batch:          {}", report.missing_batch);
    println!("  Dangling batch:         {}", report.dangling_batch);
    println!("  Dangling projections:   {}", report.dangling_projections);
    if !report.is_consistent() {
        println!("  (dangling references resolve to absent values)");
    }

    for (i, batch) in tile.batches.iter().enumerate() {
        let coverage = batch
            .coverage()
            .map(|c| c.to_string())
            .unwrap_or_else(|| "-".to_string());
        let opaque = batch.opaque_fields();
        if opaque.is_empty() {
            println!("Batch {}: id={:?} coverage={}", i, batch.batch_id, coverage);
        } else {
            println!(
                "Batch {}: id={:?} coverage={} unknown={:?}",
                i, batch.batch_id, coverage, opaque
            );
        }
    }

    Ok(())
}
