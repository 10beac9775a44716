pub mod status;
pub mod sync;

use std::path::PathBuf;

use kimaisync_core::ConfigStore;

pub fn store(path: Option<PathBuf>) -> ConfigStore {
    path.map(ConfigStore::new)
        .unwrap_or_else(ConfigStore::at_default_location)
}
