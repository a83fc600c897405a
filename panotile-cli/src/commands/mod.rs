//! CLI command implementations.

pub mod config;
pub mod inspect;
pub mod resolve;

use std::path::Path;

use panotile::ConfigFile;

use crate::error::CliError;

/// Loads the configuration from `--config` if given, else the default file.
pub fn load_config(path: Option<&Path>) -> Result<ConfigFile, CliError> {
    let config = match path {
        Some(path) => ConfigFile::load_from(path)?,
        None => ConfigFile::load()?,
    };
    Ok(config)
}
