//! Connection settings resolution.

use super::prompt::Prompt;
use crate::error::Result;
use crate::storage::{Checkpoint, Config, ConfigKey, ConfigStore, Settings};

/// Values given explicitly for this run, e.g. on the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    pub source_url: Option<String>,
    pub source_apikey: Option<String>,
    pub source_customer: Option<String>,
    pub destination_url: Option<String>,
    pub destination_apikey: Option<String>,
}

impl Overrides {
    pub fn get(&self, key: ConfigKey) -> Option<&str> {
        let value = match key {
            ConfigKey::SourceUrl => &self.source_url,
            ConfigKey::SourceApiKey => &self.source_apikey,
            ConfigKey::SourceCustomer => &self.source_customer,
            ConfigKey::DestinationUrl => &self.destination_url,
            ConfigKey::DestinationApiKey => &self.destination_apikey,
        };
        value.as_deref().filter(|v| !v.trim().is_empty())
    }
}

/// Keys that select which source timesheets the checkpoint describes.
fn scopes_checkpoint(key: ConfigKey) -> bool {
    matches!(key, ConfigKey::SourceUrl | ConfigKey::SourceCustomer)
}

/// Fill every connection key from overrides, stored state or the prompt,
/// in that order of precedence, and persist if anything changed.
///
/// Overriding the stored source url or customer with a different value
/// clears the checkpoint; it only ever describes one source stream.
///
/// # Errors
///
/// Fails when the prompt cannot answer (in non-interactive mode this is a
/// missing-key configuration error) or the config cannot be persisted.
pub fn resolve_settings<P>(
    config: &mut Config,
    overrides: &Overrides,
    store: &ConfigStore,
    prompt: &mut P,
) -> Result<Settings>
where
    P: Prompt + ?Sized,
{
    let mut updated = false;

    for key in ConfigKey::ALL {
        if let Some(value) = overrides.get(key) {
            let value = value.trim();
            let stored = config.value(key).map(str::trim).filter(|v| !v.is_empty());
            if stored != Some(value) {
                if scopes_checkpoint(key) && stored.is_some() && !config.checkpoint.is_empty() {
                    tracing::info!(%key, "source changed, checkpoint reset");
                    config.checkpoint = Checkpoint::default();
                }
                config.set_value(key, value);
                updated = true;
            }
            continue;
        }

        if config.value(key).is_some_and(|v| !v.trim().is_empty()) {
            continue;
        }

        let answer = loop {
            let answer = prompt.ask_value(key)?;
            let answer = answer.trim();
            if !answer.is_empty() {
                break answer.to_string();
            }
        };
        config.set_value(key, answer);
        updated = true;
    }

    if updated {
        store.persist(config)?;
        tracing::debug!(path = %store.path().display(), "connection settings saved");
    }

    Ok(config.settings()?)
}
