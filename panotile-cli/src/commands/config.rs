//! Configuration management CLI commands.

use std::path::Path;

use clap::Subcommand;
use panotile::config::config_file_path;

use crate::error::CliError;

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Show the configuration file path
    Path,

    /// Print the effective resolver settings
    Show,
}

/// Run a config subcommand.
pub fn run(command: ConfigCommands, config_path: Option<&Path>) -> Result<(), CliError> {
    match command {
        ConfigCommands::Path => run_path(),
        ConfigCommands::Show => run_show(config_path),
    }
}

fn run_path() -> Result<(), CliError> {
    match config_file_path() {
        Some(path) => {
            let status = if path.exists() { "" } else { " (not present)" };
            println!("{}{}", path.display(), status);
        }
        None => println!("(no configuration directory on this platform)"),
    }
    Ok(())
}

fn run_show(config_path: Option<&Path>) -> Result<(), CliError> {
    let config = super::load_config(config_path)?;
    let resolver = &config.resolver;

    println!("[resolver]");
    println!("max_tile_bytes = {}", resolver.max_tile_bytes);
    println!("skip_unlocated = {}", resolver.skip_unlocated);
    match resolver.threads {
        Some(threads) => println!("threads = {}", threads),
        None => println!("threads = auto"),
    }
    Ok(())
}
