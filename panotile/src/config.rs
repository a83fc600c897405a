//! Resolver configuration.
//!
//! Settings can be built in code or loaded from an INI file:
//!
//! ```ini
//! [resolver]
//! max_tile_bytes = 8388608
//! skip_unlocated = false
//! threads = 4
//! ```
//!
//! The default file lives at `<config dir>/panotile/config.ini`. A missing
//! file yields the defaults; unknown keys are ignored.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use ini::Ini;
use thiserror::Error;

// ==================== Resolver Defaults ====================

/// Default upper bound on the size of a single tile in bytes.
///
/// Coverage tiles are a few kilobytes to a few hundred kilobytes; anything
/// far larger is not a tile.
pub const DEFAULT_MAX_TILE_BYTES: usize = 8 * 1024 * 1024;

/// Default for dropping panoramas that carry no location.
pub const DEFAULT_SKIP_UNLOCATED: bool = false;

/// INI section holding resolver settings.
pub const RESOLVER_SECTION: &str = "resolver";

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read or is not valid INI.
    #[error("Failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: ini::Error,
    },

    /// A key holds a value of the wrong type.
    #[error("Invalid value '{value}' for {section}.{key}")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
    },
}

/// Settings for [`crate::resolver::TileResolver`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverConfig {
    /// Inputs larger than this are rejected before decoding.
    ///
    /// Default: 8 MiB.
    pub max_tile_bytes: usize,

    /// Drop panoramas without a location instead of passing them through
    /// with empty geographic fields.
    ///
    /// Default: false.
    pub skip_unlocated: bool,

    /// Worker threads for batch resolution.
    ///
    /// `None` uses the shared rayon pool. Default: `None`.
    pub threads: Option<usize>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            max_tile_bytes: DEFAULT_MAX_TILE_BYTES,
            skip_unlocated: DEFAULT_SKIP_UNLOCATED,
            threads: None,
        }
    }
}

/// Contents of the configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigFile {
    pub resolver: ResolverConfig,
}

impl ConfigFile {
    /// Loads the default configuration file, falling back to defaults when
    /// it does not exist.
    pub fn load() -> Result<Self, ConfigError> {
        match config_file_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Loads configuration from a specific file.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let ini = Ini::load_from_file(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ini(&ini)
    }

    /// Builds configuration from parsed INI contents.
    pub fn from_ini(ini: &Ini) -> Result<Self, ConfigError> {
        let mut resolver = ResolverConfig::default();

        if let Some(section) = ini.section(Some(RESOLVER_SECTION)) {
            if let Some(value) = section.get("max_tile_bytes") {
                resolver.max_tile_bytes = parse_value("max_tile_bytes", value)?;
            }
            if let Some(value) = section.get("skip_unlocated") {
                resolver.skip_unlocated = parse_value("skip_unlocated", value)?;
            }
            if let Some(value) = section.get("threads") {
                resolver.threads = match value.trim() {
                    "" | "auto" => None,
                    other => Some(parse_value("threads", other)?),
                };
            }
        }

        Ok(Self { resolver })
    }
}

/// Path of the default configuration file, if a config directory exists.
pub fn config_file_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("panotile").join("config.ini"))
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        section: RESOLVER_SECTION.to_string(),
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn from_str(contents: &str) -> Result<ConfigFile, ConfigError> {
        let ini = Ini::load_from_str(contents).expect("valid ini");
        ConfigFile::from_ini(&ini)
    }

    #[test]
    fn test_defaults() {
        let config = ResolverConfig::default();
        assert_eq!(config.max_tile_bytes, DEFAULT_MAX_TILE_BYTES);
        assert!(!config.skip_unlocated);
        assert_eq!(config.threads, None);
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        assert_eq!(from_str("").unwrap(), ConfigFile::default());
    }

    #[test]
    fn test_all_keys() {
        let config = from_str(
            "[resolver]\nmax_tile_bytes = 1024\nskip_unlocated = true\nthreads = 3\n",
        )
        .unwrap();
        assert_eq!(config.resolver.max_tile_bytes, 1024);
        assert!(config.resolver.skip_unlocated);
        assert_eq!(config.resolver.threads, Some(3));
    }

    #[test]
    fn test_threads_auto() {
        let config = from_str("[resolver]\nthreads = auto\n").unwrap();
        assert_eq!(config.resolver.threads, None);
    }

    #[test]
    fn test_unknown_keys_and_sections_ignored() {
        let config = from_str("[resolver]\ncolour = blue\n[other]\nx = 1\n").unwrap();
        assert_eq!(config, ConfigFile::default());
    }

    #[test]
    fn test_invalid_value() {
        let err = from_str("[resolver]\nmax_tile_bytes = lots\n").unwrap_err();
        match err {
            ConfigError::InvalidValue { key, value, .. } => {
                assert_eq!(key, "max_tile_bytes");
                assert_eq!(value, "lots");
            }
            other => panic!("Expected InvalidValue, got {:?}", other),
        }
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[resolver]").unwrap();
        writeln!(file, "skip_unlocated = true").unwrap();

        let config = ConfigFile::load_from(file.path()).unwrap();
        assert!(config.resolver.skip_unlocated);
        assert_eq!(config.resolver.max_tile_bytes, DEFAULT_MAX_TILE_BYTES);
    }

    #[test]
    fn test_load_from_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = ConfigFile::load_from(&dir.path().join("absent.ini"));
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn test_config_path_ends_with_file_name() {
        if let Some(path) = config_file_path() {
            assert!(path.ends_with("panotile/config.ini"));
        }
    }
}
