//! One-way timesheet synchronisation between two Kimai installations.
//!
//! [`synchronize`] is the whole protocol: settings, log-on, customer,
//! mappings, timesheets. The pieces are public so callers can drive them
//! individually.

pub mod engine;
pub mod mapping;
pub mod prompt;
pub mod settings;
pub mod transform;

#[cfg(test)]
mod mapping_tests;

pub use engine::{SyncEngine, SyncPhase, SyncReport, DEFAULT_PAGE_SIZE};
pub use mapping::MappingResolver;
pub use prompt::{MappingRequest, NonInteractive, Prompt, ScriptedPrompt};
pub use settings::{resolve_settings, Overrides};
pub use transform::{transfer_payload, EXCLUDED_FIELDS};

use std::fmt;

use crate::api::{KimaiApi, Side};
use crate::error::{ApiError, Result, SyncError};
use crate::storage::{ConfigStore, Connection};

/// Kind of entity a mapping table covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Project,
    Activity,
}

impl EntityKind {
    /// Projects may be left unmapped on purpose; every activity needs a
    /// destination.
    pub fn allows_skip(&self) -> bool {
        matches!(self, EntityKind::Project)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Project => "project",
            EntityKind::Activity => "activity",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Options for [`synchronize`].
#[derive(Debug, Clone)]
pub struct SyncOptions {
    pub overrides: Overrides,
    pub page_size: u32,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            overrides: Overrides::default(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Run the full protocol against the config in `store`.
///
/// `connect` builds an API client for one side once its connection
/// settings are known.
///
/// # Errors
///
/// Any configuration, API, mapping or persistence failure. Progress up to
/// the failure is kept in `store`.
pub fn synchronize<A, F, P>(
    store: &ConfigStore,
    options: &SyncOptions,
    prompt: &mut P,
    mut connect: F,
) -> Result<SyncReport>
where
    A: KimaiApi,
    F: FnMut(Side, &Connection) -> Result<A, ApiError>,
    P: Prompt + ?Sized,
{
    let mut config = store.load()?;
    let settings = resolve_settings(&mut config, &options.overrides, store, prompt)?;

    let destination =
        connect(Side::Destination, &settings.destination).map_err(SyncError::api(Side::Destination))?;
    let source = connect(Side::Source, &settings.source).map_err(SyncError::api(Side::Source))?;

    SyncEngine::new(source, destination, &mut config, store, prompt)
        .with_page_size(options.page_size)
        .run(&settings.customer)
}
