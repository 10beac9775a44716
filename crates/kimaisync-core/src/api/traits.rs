use serde_json::{Map, Value};

use super::types::{EntityRef, Page, Timesheet, TimesheetQuery};
use crate::error::ApiError;

/// The subset of a time-tracking installation the sync engine talks to.
///
/// Implementations are blocking: each call returns only once the remote
/// side has answered. Every method except `login` fails with
/// [`ApiError::NotLoggedIn`] until `login` has succeeded.
pub trait KimaiApi {
    /// Reachability check with the configured credentials.
    fn login(&mut self) -> Result<(), ApiError>;

    /// First customer matching `term`, if any.
    fn find_customer(&self, term: &str) -> Result<Option<EntityRef>, ApiError>;

    /// Projects owned by `customer`.
    fn projects(&self, customer: u64) -> Result<Vec<EntityRef>, ApiError>;

    /// Every project visible to the credentials.
    fn all_projects(&self) -> Result<Vec<EntityRef>, ApiError>;

    /// Activities usable within `project`.
    fn activities(&self, project: u64, order_by: Option<&str>) -> Result<Vec<EntityRef>, ApiError>;

    /// Every activity visible to the credentials.
    fn all_activities(&self, order_by: Option<&str>) -> Result<Vec<EntityRef>, ApiError>;

    /// One page of timesheets matching `query`.
    fn timesheets(&self, query: &TimesheetQuery) -> Result<Page<Timesheet>, ApiError>;

    /// Create the timesheet, or update it in place when `payload` has an `id`.
    fn save_timesheet(&self, payload: Map<String, Value>) -> Result<Value, ApiError>;
}
