//! Sync progress marker.

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::api::Timesheet;
use crate::error::SyncError;

const NAIVE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";
const NAIVE_FRACTION_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";
const OFFSET_FORMATS: [&str; 3] = [
    "%Y-%m-%dT%H:%M:%S%z",
    "%Y-%m-%dT%H:%M:%S%:z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
];

/// Last timesheet durably written to the destination.
///
/// Every source timesheet at or before this point in the `(begin, id)`
/// stream order is already on the destination.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    /// `begin` exactly as the source reported it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_begin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_source_id: Option<u64>,
}

impl Checkpoint {
    pub fn is_empty(&self) -> bool {
        self.last_begin.is_none() && self.last_source_id.is_none()
    }

    /// Server-side `begin` filter for resuming, offset stripped.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::InvalidCheckpoint`] when the stored timestamp
    /// cannot be parsed.
    pub fn begin_filter(&self) -> Result<Option<String>, SyncError> {
        self.last_begin.as_deref().map(strip_offset).transpose()
    }

    /// Whether `id` is at or below the id floor.
    pub fn covers(&self, id: u64) -> bool {
        self.last_source_id.is_some_and(|last| id <= last)
    }

    /// Move past `timesheet`. Refuses to go backwards and returns whether the
    /// checkpoint changed.
    pub fn advance(&mut self, timesheet: &Timesheet) -> bool {
        if self.covers(timesheet.id) {
            return false;
        }
        self.last_begin = Some(timesheet.begin.clone());
        self.last_source_id = Some(timesheet.id);
        true
    }
}

/// Drop any UTC offset from a Kimai timestamp, keeping wall-clock time.
///
/// `2024-01-01T09:00:00+0100` becomes `2024-01-01T09:00:00`; timestamps
/// without an offset are normalised to the same shape.
pub fn strip_offset(timestamp: &str) -> Result<String, SyncError> {
    let timestamp = timestamp.trim();

    let naive = OFFSET_FORMATS
        .iter()
        .find_map(|fmt| DateTime::parse_from_str(timestamp, fmt).ok())
        .or_else(|| DateTime::parse_from_rfc3339(timestamp).ok())
        .map(|dt| dt.naive_local())
        .or_else(|| NaiveDateTime::parse_from_str(timestamp, NAIVE_FORMAT).ok())
        .or_else(|| NaiveDateTime::parse_from_str(timestamp, NAIVE_FRACTION_FORMAT).ok())
        .ok_or_else(|| SyncError::InvalidCheckpoint(timestamp.to_string()))?;

    Ok(naive.format(NAIVE_FORMAT).to_string())
}
