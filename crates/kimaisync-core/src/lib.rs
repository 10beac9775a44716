//! # kimaisync Core Library
//!
//! Copies finished timesheets from one Kimai installation to another,
//! resuming where the previous run stopped.
//!
//! ## Architecture
//!
//! - **API**: [`KimaiApi`] facade and its reqwest implementation
//!   [`KimaiClient`]
//! - **Storage**: TOML [`Config`] with mapping tables and the sync
//!   [`Checkpoint`], written atomically by [`ConfigStore`]
//! - **Sync**: [`MappingResolver`] for project/activity mappings and
//!   [`SyncEngine`] for the incremental transfer
//!
//! The engine is strictly sequential: one blocking request at a time, state
//! persisted after every mapping and every transferred record.

pub mod api;
pub mod error;
pub mod storage;
pub mod sync;

pub use api::{EntityRef, KimaiApi, KimaiClient, Side, Timesheet, TimesheetQuery};
pub use error::{ApiError, ConfigError, SyncError};
pub use storage::{Checkpoint, Config, ConfigKey, ConfigStore, Connection, MappingTable, Settings};
pub use sync::{
    synchronize, EntityKind, MappingResolver, NonInteractive, Overrides, Prompt, SyncEngine,
    SyncOptions, SyncPhase, SyncReport,
};
