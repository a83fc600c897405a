//! Tile resolution command.

use std::path::{Path, PathBuf};

use clap::{Args, ValueEnum};
use panotile::{ResolvedPano, TileCoordinate, TileInput, TileResolver};
use serde::Serialize;
use tracing::{error, info};

use crate::error::CliError;

/// Output format for resolved panoramas.
#[derive(Debug, Clone, Copy, Default, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    /// One JSON document per run, grouped by file
    #[default]
    Json,
    /// One line per panorama
    Summary,
}

/// Arguments for `panotile resolve`.
#[derive(Debug, Args)]
pub struct ResolveArgs {
    /// Tile files to resolve
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Coordinate the tiles were requested for, as z/x/y
    #[arg(long, value_parser = parse_tile)]
    pub tile: Option<TileCoordinate>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Drop panoramas without a location
    #[arg(long)]
    pub skip_unlocated: bool,

    /// Worker threads (defaults to the configured value)
    #[arg(long)]
    pub threads: Option<usize>,
}

#[derive(Serialize)]
struct FileOutput<'a> {
    file: &'a Path,
    panos: &'a [ResolvedPano],
}

/// Parses a tile coordinate written as `z/x/y`.
pub fn parse_tile(s: &str) -> Result<TileCoordinate, String> {
    let parts: Vec<&str> = s.split('/').collect();
    if parts.len() != 3 {
        return Err(format!("expected z/x/y, got '{}'", s));
    }

    let parse = |part: &str, name: &str| -> Result<i32, String> {
        part.trim()
            .parse()
            .map_err(|_| format!("invalid {} '{}'", name, part))
    };
    let z = parse(parts[0], "zoom")?;
    let x = parse(parts[1], "column")?;
    let y = parse(parts[2], "row")?;

    let coordinate = TileCoordinate::new(x, y, z);
    coordinate.validate().map_err(|e| e.to_string())?;
    Ok(coordinate)
}

/// Run the resolve command.
pub fn run(args: ResolveArgs, config_path: Option<&Path>) -> Result<(), CliError> {
    let config = super::load_config(config_path)?;

    // CLI flags take precedence over the config file
    let mut resolver_config = config.resolver;
    if args.skip_unlocated {
        resolver_config.skip_unlocated = true;
    }
    if args.threads.is_some() {
        resolver_config.threads = args.threads;
    }

    let contents = args
        .files
        .iter()
        .map(|path| {
            std::fs::read(path).map_err(|source| CliError::Read {
                path: path.clone(),
                source,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let inputs: Vec<TileInput<'_>> = contents
        .iter()
        .map(|data| TileInput::new(data, args.tile))
        .collect();

    info!(tiles = inputs.len(), "Resolving tiles");
    let resolver = TileResolver::new(resolver_config);
    let results = resolver.resolve_many(&inputs);

    let mut resolved = Vec::with_capacity(results.len());
    let mut failures = Vec::new();
    for (path, result) in args.files.iter().zip(results) {
        match result {
            Ok(panos) => resolved.push((path.as_path(), panos)),
            Err(e) => {
                error!(file = %path.display(), error = %e, "Tile failed to resolve");
                failures.push((path.clone(), e));
            }
        }
    }

    match args.format {
        OutputFormat::Json => print_json(&resolved)?,
        OutputFormat::Summary => print_summary(&resolved),
    }

    let total = args.files.len();
    match failures.len() {
        0 => Ok(()),
        1 if total == 1 => {
            let (path, source) = failures.remove(0);
            Err(CliError::Tile { path, source })
        }
        failed => Err(CliError::TilesFailed { failed, total }),
    }
}

fn print_json(resolved: &[(&Path, Vec<ResolvedPano>)]) -> Result<(), CliError> {
    let output: Vec<FileOutput<'_>> = resolved
        .iter()
        .map(|(file, panos)| FileOutput { file, panos })
        .collect();
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_summary(resolved: &[(&Path, Vec<ResolvedPano>)]) {
    for (file, panos) in resolved {
        println!("{} ({} panoramas)", file.display(), panos.len());
        for pano in panos {
            println!("  {}", summary_line(pano));
        }
    }
}

fn summary_line(pano: &ResolvedPano) -> String {
    let position = match (pano.latitude, pano.longitude) {
        (Some(lat), Some(lon)) => format!("{:>11.6} {:>11.6}", lat, lon),
        _ => format!("{:>11} {:>11}", "-", "-"),
    };
    let heading = pano
        .heading
        .map(|h| format!("{:>6.1}", h))
        .unwrap_or_else(|| format!("{:>6}", "-"));
    let coverage = pano
        .coverage_type
        .map(|c| c.to_string())
        .unwrap_or_else(|| "-".to_string());
    let captured = pano
        .captured_at()
        .map(|t| t.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "-".to_string());

    format!(
        "{:>20} {} {} {:<8} {}",
        pano.panoid, position, heading, coverage, captured
    )
}
