//! In-memory Kimai installation for engine tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use kimaisync_core::api::Page;
use kimaisync_core::storage::strip_offset;
use kimaisync_core::{ApiError, EntityRef, KimaiApi, Timesheet, TimesheetQuery};
use serde_json::{Map, Value};

#[derive(Default)]
struct State {
    customers: Vec<EntityRef>,
    projects: Vec<(u64, EntityRef)>,
    activities: Vec<(u64, EntityRef)>,
    timesheets: Vec<(u64, Timesheet)>,
    saved: Vec<Map<String, Value>>,
    calls: Vec<String>,
    logged_on: bool,
    reject_login: bool,
    fail_saves_after: Option<usize>,
    report_total_pages: bool,
}

/// Cheap to clone; clones share state so a test can keep a handle while the
/// engine owns another.
#[derive(Clone, Default)]
pub struct FakeKimai {
    state: Rc<RefCell<State>>,
}

impl FakeKimai {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_customer(self, id: u64, name: &str) -> Self {
        self.state
            .borrow_mut()
            .customers
            .push(EntityRef::new(id, name));
        self
    }

    pub fn with_project(self, customer: u64, id: u64, name: &str) -> Self {
        self.state
            .borrow_mut()
            .projects
            .push((customer, EntityRef::new(id, name)));
        self
    }

    pub fn with_activity(self, project: u64, id: u64, name: &str) -> Self {
        self.state
            .borrow_mut()
            .activities
            .push((project, EntityRef::new(id, name)));
        self
    }

    pub fn with_timesheet(self, customer: u64, record: Value) -> Self {
        let timesheet: Timesheet = serde_json::from_value(record).expect("valid timesheet");
        self.state
            .borrow_mut()
            .timesheets
            .push((customer, timesheet));
        self
    }

    pub fn rejecting_login(self) -> Self {
        self.state.borrow_mut().reject_login = true;
        self
    }

    /// Accept `n` saves, then answer every further save with HTTP 500.
    pub fn failing_saves_after(self, n: usize) -> Self {
        self.state.borrow_mut().fail_saves_after = Some(n);
        self
    }

    pub fn reporting_total_pages(self) -> Self {
        self.state.borrow_mut().report_total_pages = true;
        self
    }

    pub fn heal(&self) {
        self.state.borrow_mut().fail_saves_after = None;
    }

    pub fn saved(&self) -> Vec<Map<String, Value>> {
        self.state.borrow().saved.clone()
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.borrow().calls.clone()
    }

    pub fn calls_starting_with(&self, prefix: &str) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| c.starts_with(prefix))
            .collect()
    }

    fn record(&self, call: String) -> Result<(), ApiError> {
        let mut state = self.state.borrow_mut();
        state.calls.push(call);
        if state.logged_on {
            Ok(())
        } else {
            Err(ApiError::NotLoggedIn)
        }
    }
}

impl KimaiApi for FakeKimai {
    fn login(&mut self) -> Result<(), ApiError> {
        let mut state = self.state.borrow_mut();
        state.calls.push("ping".into());
        if state.reject_login {
            return Err(ApiError::Unauthorized);
        }
        state.logged_on = true;
        Ok(())
    }

    fn find_customer(&self, term: &str) -> Result<Option<EntityRef>, ApiError> {
        self.record(format!("customers term={term}"))?;
        Ok(self
            .state
            .borrow()
            .customers
            .iter()
            .find(|c| c.name.contains(term))
            .cloned())
    }

    fn projects(&self, customer: u64) -> Result<Vec<EntityRef>, ApiError> {
        self.record(format!("projects customer={customer}"))?;
        Ok(self
            .state
            .borrow()
            .projects
            .iter()
            .filter(|(c, _)| *c == customer)
            .map(|(_, p)| p.clone())
            .collect())
    }

    fn all_projects(&self) -> Result<Vec<EntityRef>, ApiError> {
        self.record("projects".into())?;
        Ok(self
            .state
            .borrow()
            .projects
            .iter()
            .map(|(_, p)| p.clone())
            .collect())
    }

    fn activities(&self, project: u64, _order_by: Option<&str>) -> Result<Vec<EntityRef>, ApiError> {
        self.record(format!("activities project={project}"))?;
        Ok(self
            .state
            .borrow()
            .activities
            .iter()
            .filter(|(p, _)| *p == project)
            .map(|(_, a)| a.clone())
            .collect())
    }

    fn all_activities(&self, order_by: Option<&str>) -> Result<Vec<EntityRef>, ApiError> {
        self.record(format!("activities orderBy={}", order_by.unwrap_or("")))?;
        let mut all: Vec<EntityRef> = self
            .state
            .borrow()
            .activities
            .iter()
            .map(|(_, a)| a.clone())
            .collect();
        all.sort_by_key(|a| a.id);
        Ok(all)
    }

    fn timesheets(&self, query: &TimesheetQuery) -> Result<Page<Timesheet>, ApiError> {
        self.record(format!(
            "timesheets begin={} page={}",
            query.begin.as_deref().unwrap_or("-"),
            query.page.unwrap_or(1)
        ))?;

        let state = self.state.borrow();
        let mut matching: Vec<Timesheet> = state
            .timesheets
            .iter()
            .filter(|(c, _)| query.customer.map_or(true, |q| q == *c))
            .map(|(_, t)| t.clone())
            .filter(|t| match &query.begin {
                Some(floor) => strip_offset(&t.begin).expect("fake begin") >= *floor,
                None => true,
            })
            .collect();
        matching.sort_by(|a, b| (&a.begin, a.id).cmp(&(&b.begin, b.id)));

        let size = query.size.unwrap_or(50).max(1) as usize;
        let page = query.page.unwrap_or(1).max(1) as usize;
        let total_pages = matching.len().div_ceil(size) as u32;
        let items = matching
            .into_iter()
            .skip((page - 1) * size)
            .take(size)
            .collect();

        Ok(Page {
            items,
            total_pages: state.report_total_pages.then_some(total_pages),
        })
    }

    fn save_timesheet(&self, payload: Map<String, Value>) -> Result<Value, ApiError> {
        self.record("save timesheet".into())?;
        let mut state = self.state.borrow_mut();
        if let Some(limit) = state.fail_saves_after {
            if state.saved.len() >= limit {
                return Err(ApiError::Status { status: 500 });
            }
        }
        let mut created = payload.clone();
        created.insert("id".into(), Value::from(1000 + state.saved.len() as u64));
        state.saved.push(payload);
        Ok(Value::Object(created))
    }
}
