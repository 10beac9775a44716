//! Incremental one-way timesheet sync.
//!
//! A run walks `INIT -> AUTH_DEST -> AUTH_SRC -> RESOLVE_CUSTOMER ->
//! RESOLVE_MAPPINGS -> STREAM_TIMESHEETS -> DONE`; any failure ends in
//! `FAILED`. State is persisted after every mapping and every transfer, so
//! an interrupted run loses at most the record in flight.

use std::fmt;

use serde_json::Value;
use tracing::{debug, info};

use super::mapping::MappingResolver;
use super::prompt::Prompt;
use super::transform::transfer_payload;
use super::EntityKind;
use crate::api::{EntityRef, KimaiApi, Side, Timesheet, TimesheetQuery};
use crate::error::{Result, SyncError};
use crate::storage::{Config, ConfigStore};

/// Timesheets requested per page.
pub const DEFAULT_PAGE_SIZE: u32 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    Init,
    AuthDestination,
    AuthSource,
    ResolveCustomer,
    ResolveMappings,
    StreamTimesheets,
    Done,
    Failed,
}

impl fmt::Display for SyncPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SyncPhase::Init => "init",
            SyncPhase::AuthDestination => "auth_destination",
            SyncPhase::AuthSource => "auth_source",
            SyncPhase::ResolveCustomer => "resolve_customer",
            SyncPhase::ResolveMappings => "resolve_mappings",
            SyncPhase::StreamTimesheets => "stream_timesheets",
            SyncPhase::Done => "done",
            SyncPhase::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// What a run did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub transferred: usize,
    /// Running entries without an end.
    pub skipped_unfinished: usize,
    /// At or below the checkpoint id.
    pub skipped_already_synced: usize,
    /// Belonging to a project mapped to "do not map".
    pub skipped_ignored_project: usize,
    pub mappings_added: usize,
}

pub struct SyncEngine<'a, S, D, P: ?Sized> {
    source: S,
    destination: D,
    config: &'a mut Config,
    store: &'a ConfigStore,
    prompt: &'a mut P,
    resolver: MappingResolver,
    page_size: u32,
    phase: SyncPhase,
    report: SyncReport,
}

impl<'a, S, D, P> SyncEngine<'a, S, D, P>
where
    S: KimaiApi,
    D: KimaiApi,
    P: Prompt + ?Sized,
{
    pub fn new(
        source: S,
        destination: D,
        config: &'a mut Config,
        store: &'a ConfigStore,
        prompt: &'a mut P,
    ) -> Self {
        Self {
            source,
            destination,
            config,
            store,
            prompt,
            resolver: MappingResolver::new(),
            page_size: DEFAULT_PAGE_SIZE,
            phase: SyncPhase::Init,
            report: SyncReport::default(),
        }
    }

    pub fn with_page_size(mut self, size: u32) -> Self {
        self.page_size = size.max(1);
        self
    }

    pub fn phase(&self) -> SyncPhase {
        self.phase
    }

    /// Sync all finished timesheets of `customer` not yet on the destination.
    ///
    /// # Errors
    ///
    /// Every error is fatal for the run. Progress made before the error is
    /// already persisted.
    pub fn run(&mut self, customer: &str) -> Result<SyncReport> {
        match self.run_phases(customer) {
            Ok(()) => {
                self.enter(SyncPhase::Done);
                info!(
                    transferred = self.report.transferred,
                    skipped_unfinished = self.report.skipped_unfinished,
                    skipped_already_synced = self.report.skipped_already_synced,
                    skipped_ignored_project = self.report.skipped_ignored_project,
                    "sync finished"
                );
                Ok(self.report.clone())
            }
            Err(e) => {
                self.enter(SyncPhase::Failed);
                Err(e)
            }
        }
    }

    fn run_phases(&mut self, customer: &str) -> Result<()> {
        self.enter(SyncPhase::AuthDestination);
        self.destination
            .login()
            .map_err(SyncError::api(Side::Destination))?;

        self.enter(SyncPhase::AuthSource);
        self.source.login().map_err(SyncError::api(Side::Source))?;

        self.enter(SyncPhase::ResolveCustomer);
        let customer = self
            .source
            .find_customer(customer)
            .map_err(SyncError::api(Side::Source))?
            .ok_or_else(|| SyncError::CustomerNotFound(customer.to_string()))?;
        info!(id = customer.id, name = %customer.name, "source customer resolved");

        self.enter(SyncPhase::ResolveMappings);
        self.resolve_mappings(&customer)?;

        self.enter(SyncPhase::StreamTimesheets);
        self.stream_timesheets(&customer)
    }

    fn enter(&mut self, phase: SyncPhase) {
        info!(from = %self.phase, to = %phase, "sync phase");
        self.phase = phase;
    }

    fn resolve_mappings(&mut self, customer: &EntityRef) -> Result<()> {
        let destination = &self.destination;

        let projects = self
            .source
            .projects(customer.id)
            .map_err(SyncError::api(Side::Source))?;
        self.report.mappings_added += self.resolver.resolve(
            EntityKind::Project,
            &projects,
            self.config,
            self.store,
            || {
                destination
                    .all_projects()
                    .map_err(SyncError::api(Side::Destination))
            },
            self.prompt,
        )?;

        for project in &projects {
            if self.config.project_mapping.is_ignored(project.id) {
                debug!(id = project.id, name = %project.name, "project not synced, skipping its activities");
                continue;
            }
            let activities = self
                .source
                .activities(project.id, Some("id"))
                .map_err(SyncError::api(Side::Source))?;
            self.report.mappings_added += self.resolver.resolve(
                EntityKind::Activity,
                &activities,
                self.config,
                self.store,
                || {
                    destination
                        .all_activities(Some("id"))
                        .map_err(SyncError::api(Side::Destination))
                },
                self.prompt,
            )?;
        }
        Ok(())
    }

    fn stream_timesheets(&mut self, customer: &EntityRef) -> Result<()> {
        let begin = self.config.checkpoint.begin_filter()?;
        if let Some(begin) = &begin {
            info!(
                begin = %begin,
                last_source_id = ?self.config.checkpoint.last_source_id,
                "resuming from checkpoint"
            );
        }
        let query = TimesheetQuery::for_customer(customer.id).with_begin(begin);

        let mut page = 1;
        loop {
            let batch = self
                .source
                .timesheets(&query.clone().with_page(page, self.page_size))
                .map_err(SyncError::api(Side::Source))?;
            let more = batch.has_more(page, self.page_size);

            for timesheet in batch.items {
                self.process(timesheet)?;
            }

            if !more {
                return Ok(());
            }
            page += 1;
        }
    }

    fn process(&mut self, timesheet: Timesheet) -> Result<()> {
        if !timesheet.is_finished() {
            debug!(id = timesheet.id, begin = %timesheet.begin, "still running, skipped");
            self.report.skipped_unfinished += 1;
            return Ok(());
        }
        if self.config.checkpoint.covers(timesheet.id) {
            debug!(id = timesheet.id, "already synced, skipped");
            self.report.skipped_already_synced += 1;
            return Ok(());
        }
        if self.config.project_mapping.is_ignored(timesheet.project) {
            debug!(id = timesheet.id, project = timesheet.project, "project not synced, skipped");
            self.report.skipped_ignored_project += 1;
            return Ok(());
        }

        let payload = transfer_payload(
            &timesheet,
            &self.config.project_mapping,
            &self.config.activity_mapping,
        )?;
        let trace = Value::Object(payload.clone());

        self.destination
            .save_timesheet(payload)
            .map_err(SyncError::api(Side::Destination))?;

        self.config.checkpoint.advance(&timesheet);
        self.store.persist(self.config)?;
        self.report.transferred += 1;

        info!(id = timesheet.id, begin = %timesheet.begin, "timesheet transferred");
        debug!(payload = %trace, "transferred record");
        Ok(())
    }
}
