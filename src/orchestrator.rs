//! Eligibility and dispatch loop.
//!
//! Each fetched item goes through one pass of:
//!
//! ```text
//! Fetched --(marker present / completed)--> Skipped (already processed)
//!    |----(scheduled time not passed)-----> Skipped (not due yet)
//!    `--> Eligible --send--> mark --------> Dispatched
//!                     `-- any failure ----> Errored
//! ```
//!
//! Outcomes fold into a `RunSummary`. A failing item never stops the loop,
//! and a failed item is not retried within the run: it has no marker, so the
//! next scheduled run reconsiders it from scratch.

use crate::dispatch::{DispatchPayload, DispatchSender};
use crate::error::ItemError;
use crate::event_type::extract_event_type;
use crate::payload::extract_custom_payload;
use crate::source::{self, CalendarApi, Item, SourceType, TasksApi};

/// Counters reported as the run's outputs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub dispatched: u32,
    pub skipped: u32,
    pub errored: u32,
}

impl RunSummary {
    pub fn record(&mut self, outcome: &ItemOutcome) {
        match outcome {
            ItemOutcome::Dispatched => self.dispatched += 1,
            ItemOutcome::SkippedProcessed | ItemOutcome::SkippedNotDue => self.skipped += 1,
            ItemOutcome::Errored(_) => self.errored += 1,
        }
    }
}

/// Terminal state of one item in one run.
#[derive(Debug)]
pub enum ItemOutcome {
    Dispatched,
    SkippedProcessed,
    SkippedNotDue,
    Errored(ItemError),
}

/// Run-wide settings the loop needs besides the provider handles.
#[derive(Debug, Clone)]
pub struct DispatchSettings {
    pub calendar_ids: Vec<String>,
    pub task_list_ids: Vec<String>,
    pub lookback_minutes: u32,
    pub repository: String,
    pub default_event_type: String,
    pub run_url: String,
}

pub struct Orchestrator<'a> {
    calendar: &'a dyn CalendarApi,
    tasks: &'a dyn TasksApi,
    sender: &'a dyn DispatchSender,
    settings: &'a DispatchSettings,
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        calendar: &'a dyn CalendarApi,
        tasks: &'a dyn TasksApi,
        sender: &'a dyn DispatchSender,
        settings: &'a DispatchSettings,
    ) -> Self {
        Self {
            calendar,
            tasks,
            sender,
            settings,
        }
    }

    /// Process calendar events, then tasks. Categories without containers are not fetched.
    pub async fn run(&self) -> RunSummary {
        let mut summary = RunSummary::default();

        if !self.settings.calendar_ids.is_empty() {
            log::info!("Processing calendar events...");
            let events = source::fetch_events(
                self.calendar,
                &self.settings.calendar_ids,
                self.settings.lookback_minutes,
            )
            .await;
            log::info!("Found {} events", events.len());
            self.process_items(&events, &mut summary).await;
        }

        if !self.settings.task_list_ids.is_empty() {
            log::info!("Processing tasks...");
            let tasks = source::fetch_tasks(
                self.tasks,
                &self.settings.task_list_ids,
                self.settings.lookback_minutes,
            )
            .await;
            log::info!("Found {} tasks", tasks.len());
            self.process_items(&tasks, &mut summary).await;
        }

        summary
    }

    async fn process_items(&self, items: &[Item], summary: &mut RunSummary) {
        for item in items {
            let outcome = self.process_item(item).await;
            if let ItemOutcome::Errored(ref e) = outcome {
                let note = if e.dispatched_unmarked() {
                    " (dispatched but not marked; will be dispatched again next run)"
                } else {
                    ""
                };
                log::warn!(
                    "Failed to process {} {}: {}{}",
                    item.source_type(),
                    item.id(),
                    e,
                    note
                );
            }
            summary.record(&outcome);
        }
    }

    /// Decide eligibility for one item and, if eligible, dispatch and mark it.
    pub async fn process_item(&self, item: &Item) -> ItemOutcome {
        if !item.is_incomplete() {
            let reason = match item.source_type() {
                SourceType::Event => "already processed",
                SourceType::Task => "already completed",
            };
            log::debug!("Skipping {} {}: {}", item.source_type(), item.id(), reason);
            return ItemOutcome::SkippedProcessed;
        }

        if !item.is_past_scheduled_time() {
            log::debug!(
                "Skipping {} {}: scheduled time not yet passed",
                item.source_type(),
                item.id()
            );
            return ItemOutcome::SkippedNotDue;
        }

        match self.dispatch(item).await {
            Ok(()) => ItemOutcome::Dispatched,
            Err(e) => ItemOutcome::Errored(e),
        }
    }

    async fn dispatch(&self, item: &Item) -> Result<(), ItemError> {
        let event_type = extract_event_type(
            item.title(),
            item.body(),
            &self.settings.default_event_type,
        );
        let payload = DispatchPayload::for_item(item, extract_custom_payload(item.body()));

        log::info!(
            "Dispatching {}: {} (type: {})",
            item.source_type(),
            item.title().unwrap_or("(untitled)"),
            event_type
        );
        self.sender
            .send(&self.settings.repository, &event_type, &payload)
            .await?;

        source::mark_processed(item, self.calendar, self.tasks, &self.settings.run_url).await?;
        Ok(())
    }
}
