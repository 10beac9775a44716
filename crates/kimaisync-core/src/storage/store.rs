//! Durable home of the [`Config`].

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use super::config::Config;
use crate::error::ConfigError;

/// Reads and atomically replaces the configuration file.
///
/// A persist writes the whole document to a temporary file next to the
/// target, syncs it, then renames it over the target. Readers see either
/// the previous or the new document, never a mix.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `~/.config/kimaisync/kimaisync.toml`.
    pub fn at_default_location() -> Self {
        Self::new(super::default_config_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load from disk, or an empty config on first run.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(&self) -> Result<Config, ConfigError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "no config file yet, starting empty");
                return Ok(Config::default());
            }
            Err(e) => {
                return Err(ConfigError::LoadFailed {
                    path: self.path.clone(),
                    message: e.to_string(),
                })
            }
        };

        toml::from_str(&content).map_err(|e| ConfigError::ParseFailed {
            path: self.path.clone(),
            message: e.to_string(),
        })
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written.
    pub fn persist(&self, config: &Config) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: self.path.clone(),
            message,
        };

        let content = toml::to_string_pretty(config).map_err(|e| save_failed(e.to_string()))?;

        let parent = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(parent).map_err(|e| save_failed(e.to_string()))?;

        let mut temp = NamedTempFile::new_in(parent).map_err(|e| save_failed(e.to_string()))?;
        temp.write_all(content.as_bytes())
            .and_then(|_| temp.as_file().sync_all())
            .map_err(|e| save_failed(e.to_string()))?;
        temp.persist(&self.path)
            .map_err(|e| save_failed(e.error.to_string()))?;

        tracing::trace!(path = %self.path.display(), "config persisted");
        Ok(())
    }
}
