//! Wire types for the Kimai REST API.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Which installation a call went to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Source,
    Destination,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Source => f.write_str("source"),
            Side::Destination => f.write_str("destination"),
        }
    }
}

/// A customer, project or activity as one side reports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRef {
    pub id: u64,
    pub name: String,
}

impl EntityRef {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// A timesheet record as listed by the source.
///
/// Fields the sync logic does not inspect stay in `extra` so they reach the
/// destination unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timesheet {
    pub id: u64,
    pub begin: String,
    #[serde(default)]
    pub end: Option<String>,
    pub project: u64,
    pub activity: u64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Timesheet {
    /// Running entries have no end yet.
    pub fn is_finished(&self) -> bool {
        self.end.as_deref().is_some_and(|end| !end.trim().is_empty())
    }
}

/// Sort direction for list endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

/// Filter for `GET timesheets`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimesheetQuery {
    pub customer: Option<u64>,
    pub project: Option<u64>,
    pub order_by: Option<String>,
    /// Offset-naive `YYYY-MM-DDTHH:MM:SS`.
    pub begin: Option<String>,
    pub direction: Option<Direction>,
    pub page: Option<u32>,
    pub size: Option<u32>,
}

impl TimesheetQuery {
    /// All timesheets of a customer, oldest first.
    pub fn for_customer(customer: u64) -> Self {
        Self {
            customer: Some(customer),
            order_by: Some("begin".to_string()),
            direction: Some(Direction::Asc),
            ..Self::default()
        }
    }

    pub fn with_begin(mut self, begin: Option<String>) -> Self {
        self.begin = begin;
        self
    }

    pub fn with_page(mut self, page: u32, size: u32) -> Self {
        self.page = Some(page);
        self.size = Some(size);
        self
    }

    /// Query parameters in the order the endpoint documents them.
    pub fn pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(customer) = self.customer {
            pairs.push(("customer", customer.to_string()));
        }
        if let Some(project) = self.project {
            pairs.push(("project", project.to_string()));
        }
        if let Some(order_by) = &self.order_by {
            pairs.push(("orderBy", order_by.clone()));
        }
        if let Some(begin) = &self.begin {
            pairs.push(("begin", begin.clone()));
        }
        if let Some(direction) = self.direction {
            pairs.push(("order", direction.as_str().to_string()));
        }
        if let Some(page) = self.page {
            pairs.push(("page", page.to_string()));
        }
        if let Some(size) = self.size {
            pairs.push(("size", size.to_string()));
        }
        pairs
    }
}

/// One page of a paginated collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// From the `X-Total-Pages` header when the server sends it.
    pub total_pages: Option<u32>,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items,
            total_pages: None,
        }
    }

    /// Whether another page should be requested after `page` of `size`.
    pub fn has_more(&self, page: u32, size: u32) -> bool {
        match self.total_pages {
            Some(total) => page < total,
            None => self.items.len() as u32 >= size && size > 0,
        }
    }
}
