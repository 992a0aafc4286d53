//! Game configuration
//!
//! Tuning values and loading them from external RON files.

pub mod config;
pub mod loader;

pub use config::GameConfig;
pub use loader::{config_search_paths, export_default_config, load_config, load_config_from, CONFIG_FILE};
