//! RON config loader
//!
//! Loads tuning values from an external RON file, with fallback to the
//! built-in defaults.

use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;

use super::config::GameConfig;
use crate::error::{GridtankError, Result};

/// Config file name, looked up in the working directory and then in the
/// user's config directory
pub const CONFIG_FILE: &str = "gridtank.ron";

/// Candidate config locations, in priority order
pub fn config_search_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(CONFIG_FILE)];
    if let Some(dirs) = ProjectDirs::from("", "", "gridtank") {
        paths.push(dirs.config_dir().join(CONFIG_FILE));
    }
    paths
}

/// Read, parse and validate a config file
pub fn load_config_from(path: &Path) -> Result<GameConfig> {
    let content = fs::read_to_string(path).map_err(|source| GridtankError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config: GameConfig = ron::from_str(&content).map_err(|source| GridtankError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    config.validate()?;
    Ok(config)
}

/// Load the first config file found, or the defaults.
///
/// A broken file is reported and skipped rather than aborting the game.
pub fn load_config() -> GameConfig {
    for path in config_search_paths() {
        if !path.exists() {
            continue;
        }
        match load_config_from(&path) {
            Ok(config) => {
                log::info!("Loaded config from {}", path.display());
                return config;
            }
            Err(e) => log::warn!("Ignoring config: {}", e),
        }
    }
    log::info!("Using default config");
    GameConfig::default()
}

/// Write the default config as pretty RON, creating parent directories
pub fn export_default_config(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| GridtankError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let ron = ron::ser::to_string_pretty(&GameConfig::default(), ron::ser::PrettyConfig::default())?;
    fs::write(path, ron).map_err(|source| GridtankError::Io {
        path: path.to_path_buf(),
        source,
    })
}
