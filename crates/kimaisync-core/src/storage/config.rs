//! TOML-based sync configuration.
//!
//! Holds everything a run needs to resume:
//! - Connection parameters for source and destination
//! - The source customer name
//! - Project and activity mapping tables
//! - The last-synced checkpoint
//!
//! Stored at `~/.config/kimaisync/kimaisync.toml` unless a path is given.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::checkpoint::Checkpoint;
use crate::error::ConfigError;

/// Project mapping value meaning "never sync this project".
pub const DO_NOT_MAP: &str = "0";

const MASK: &str = "********";

/// Source id to destination id, both string-keyed.
///
/// Entries are only ever added; an existing key is never overwritten.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MappingTable(BTreeMap<String, String>);

impl MappingTable {
    pub fn get(&self, source: u64) -> Option<&str> {
        self.0.get(&source.to_string()).map(String::as_str)
    }

    pub fn contains(&self, source: u64) -> bool {
        self.0.contains_key(&source.to_string())
    }

    /// Add a mapping. Returns `false` and leaves the table untouched when
    /// `source` is already mapped.
    pub fn insert(&mut self, source: u64, target: impl Into<String>) -> bool {
        use std::collections::btree_map::Entry;
        match self.0.entry(source.to_string()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(target.into());
                true
            }
        }
    }

    /// Whether `source` was deliberately excluded from syncing.
    pub fn is_ignored(&self, source: u64) -> bool {
        self.get(source) == Some(DO_NOT_MAP)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<const N: usize> From<[(u64, u64); N]> for MappingTable {
    fn from(pairs: [(u64, u64); N]) -> Self {
        Self(
            pairs
                .into_iter()
                .map(|(s, d)| (s.to_string(), d.to_string()))
                .collect(),
        )
    }
}

/// Connection-level configuration keys, in prompting order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    SourceUrl,
    SourceApiKey,
    SourceCustomer,
    DestinationUrl,
    DestinationApiKey,
}

impl ConfigKey {
    pub const ALL: [ConfigKey; 5] = [
        ConfigKey::SourceUrl,
        ConfigKey::SourceApiKey,
        ConfigKey::SourceCustomer,
        ConfigKey::DestinationUrl,
        ConfigKey::DestinationApiKey,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigKey::SourceUrl => "source_url",
            ConfigKey::SourceApiKey => "source_apikey",
            ConfigKey::SourceCustomer => "source_customer",
            ConfigKey::DestinationUrl => "destination_url",
            ConfigKey::DestinationApiKey => "destination_apikey",
        }
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Persisted sync state.
///
/// Connection fields stay optional here because a first run starts from an
/// empty file; [`Config::settings`] is the point where they become required.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_apikey: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_customer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_apikey: Option<String>,
    #[serde(default)]
    pub project_mapping: MappingTable,
    #[serde(default)]
    pub activity_mapping: MappingTable,
    #[serde(default)]
    pub checkpoint: Checkpoint,
}

/// Where to reach one installation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    pub url: String,
    pub api_key: String,
}

/// Fully resolved connection settings for a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub source: Connection,
    pub destination: Connection,
    pub customer: String,
}

impl Config {
    pub fn value(&self, key: ConfigKey) -> Option<&str> {
        match key {
            ConfigKey::SourceUrl => self.source_url.as_deref(),
            ConfigKey::SourceApiKey => self.source_apikey.as_deref(),
            ConfigKey::SourceCustomer => self.source_customer.as_deref(),
            ConfigKey::DestinationUrl => self.destination_url.as_deref(),
            ConfigKey::DestinationApiKey => self.destination_apikey.as_deref(),
        }
    }

    pub fn set_value(&mut self, key: ConfigKey, value: impl Into<String>) {
        let slot = match key {
            ConfigKey::SourceUrl => &mut self.source_url,
            ConfigKey::SourceApiKey => &mut self.source_apikey,
            ConfigKey::SourceCustomer => &mut self.source_customer,
            ConfigKey::DestinationUrl => &mut self.destination_url,
            ConfigKey::DestinationApiKey => &mut self.destination_apikey,
        };
        *slot = Some(value.into());
    }

    /// Keys that still have no usable value.
    pub fn missing_keys(&self) -> Vec<ConfigKey> {
        ConfigKey::ALL
            .into_iter()
            .filter(|k| self.value(*k).map_or(true, |v| v.trim().is_empty()))
            .collect()
    }

    /// Connection settings, once every key is present.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingKey`] naming the first absent key.
    pub fn settings(&self) -> Result<Settings, ConfigError> {
        let require = |key: ConfigKey| -> Result<String, ConfigError> {
            match self.value(key) {
                Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
                _ => Err(ConfigError::MissingKey(key.as_str().to_string())),
            }
        };

        Ok(Settings {
            source: Connection {
                url: require(ConfigKey::SourceUrl)?,
                api_key: require(ConfigKey::SourceApiKey)?,
            },
            customer: require(ConfigKey::SourceCustomer)?,
            destination: Connection {
                url: require(ConfigKey::DestinationUrl)?,
                api_key: require(ConfigKey::DestinationApiKey)?,
            },
        })
    }

    /// Copy with API keys masked, for display.
    pub fn redacted(&self) -> Self {
        let mask = |v: &Option<String>| v.as_ref().map(|_| MASK.to_string());
        Self {
            source_apikey: mask(&self.source_apikey),
            destination_apikey: mask(&self.destination_apikey),
            ..self.clone()
        }
    }
}
