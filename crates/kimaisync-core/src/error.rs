//! Core error types for kimaisync-core.
//!
//! Fatal conditions are split by kind so callers can tell a missing
//! configuration value from a rejected credential or a broken mapping.
//! Operator typos during mapping selection never reach this module; the
//! resolver re-prompts for those.

use std::path::PathBuf;
use thiserror::Error;

use crate::api::Side;
use crate::sync::EntityKind;

/// Top-level error for a sync run.
#[derive(Error, Debug)]
pub enum SyncError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A remote call failed on one side
    #[error("{side} API error: {source}")]
    Api {
        side: Side,
        #[source]
        source: ApiError,
    },

    /// The configured customer does not exist on the source
    #[error("source customer '{0}' not found")]
    CustomerNotFound(String),

    /// A timesheet referenced an id the mapping phase never resolved
    #[error("no {kind} mapping for source id {id}; mapping tables are out of sync with the source")]
    UnmappedEntity { kind: EntityKind, id: u64 },

    /// A mapping is missing and no operator is available to supply it
    #[error("mapping missing for {kind} '{name}' (id {id})")]
    MappingRequired {
        kind: EntityKind,
        id: u64,
        name: String,
    },

    /// Stored checkpoint cannot be turned into a query filter
    #[error("invalid checkpoint timestamp '{0}'")]
    InvalidCheckpoint(String),

    /// The prompt could not deliver an answer (input closed, IO failure)
    #[error("prompt failed: {0}")]
    Prompt(String),
}

impl SyncError {
    /// Attach the side a remote failure happened on.
    pub fn api(side: Side) -> impl FnOnce(ApiError) -> SyncError {
        move |source| SyncError::Api { side, source }
    }
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Failed to parse configuration
    #[error("Failed to parse configuration {path}: {message}")]
    ParseFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Missing required configuration key
    #[error("Config parameter {0} unknown")]
    MissingKey(String),
}

/// Errors surfaced by the remote API facade.
#[derive(Error, Debug)]
pub enum ApiError {
    /// HTTP 401
    #[error("wrong API key")]
    Unauthorized,

    /// Any other non-success status
    #[error("API request failed, status code = {status}")]
    Status { status: u16 },

    /// A resource call was made before `login`
    #[error("you have to log on first")]
    NotLoggedIn,

    /// Connection, TLS or timeout failure
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Response body did not match the expected shape
    #[error("cannot decode response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Base url cannot be parsed
    #[error("invalid url '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    /// Failed to start the runtime that drives requests
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    /// True when the service rejected the credentials.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized)
    }
}

/// Result type alias for SyncError
pub type Result<T, E = SyncError> = std::result::Result<T, E>;
