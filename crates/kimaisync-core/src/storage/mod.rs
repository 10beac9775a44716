mod checkpoint;
mod config;
mod store;

pub use checkpoint::{strip_offset, Checkpoint};
pub use config::{Config, ConfigKey, Connection, MappingTable, Settings, DO_NOT_MAP};
pub use store::ConfigStore;

use std::path::PathBuf;

/// Returns `~/.config/kimaisync/kimaisync.toml`.
///
/// Falls back to the working directory when no config directory can be
/// determined. The directory itself is created on first persist.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("kimaisync")
        .join("kimaisync.toml")
}
