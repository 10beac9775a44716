pub mod client;
pub mod traits;
pub mod types;

pub use client::KimaiClient;
pub use traits::KimaiApi;
pub use types::{Direction, EntityRef, Page, Side, Timesheet, TimesheetQuery};
