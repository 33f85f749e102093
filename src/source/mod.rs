//! Item sources: calendar events and tasks, uniformly processed.
//!
//! Each adapter fetches raw provider items in a time window, annotates them
//! with their container id and an `is_incomplete` flag, and writes the
//! completion marker back after a dispatch. The provider calls themselves go
//! through the `CalendarApi` / `TasksApi` seams so the workflow can run
//! against the real Google client or an in-memory fake.

pub mod calendar;
pub mod tasks;

use async_trait::async_trait;
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::google_api::GoogleApiError;

pub use calendar::{fetch_events, CalendarEvent};
pub use tasks::{fetch_tasks, GoogleTask};

/// Fixed forward buffer past "now" so items starting imminently are seen.
pub const BUFFER_MINUTES: i64 = 10;

// ============================================================================
// Provider seams
// ============================================================================

#[async_trait]
pub trait CalendarApi: Send + Sync {
    /// List events (including recurring instances) starting within the window.
    async fn list_events(
        &self,
        calendar_id: &str,
        window: &TimeWindow,
    ) -> Result<Vec<Value>, GoogleApiError>;

    /// Replace an event's description.
    async fn patch_event_description(
        &self,
        calendar_id: &str,
        event_id: &str,
        description: &str,
    ) -> Result<(), GoogleApiError>;
}

#[async_trait]
pub trait TasksApi: Send + Sync {
    /// List tasks, completed and hidden included, due within the window.
    async fn list_tasks(
        &self,
        task_list_id: &str,
        window: &TimeWindow,
    ) -> Result<Vec<Value>, GoogleApiError>;

    /// Replace a task's notes.
    async fn patch_task_notes(
        &self,
        task_list_id: &str,
        task_id: &str,
        notes: &str,
    ) -> Result<(), GoogleApiError>;
}

// ============================================================================
// Time window
// ============================================================================

/// Query window `[now - lookback, now + BUFFER_MINUTES]`, in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub min: DateTime<Utc>,
    pub max: DateTime<Utc>,
}

impl TimeWindow {
    pub fn lookback(now: DateTime<Utc>, lookback_minutes: u32) -> Self {
        Self {
            min: now - Duration::minutes(i64::from(lookback_minutes)),
            max: now + Duration::minutes(BUFFER_MINUTES),
        }
    }

    /// Lower bound as an ISO-8601 UTC instant (`2026-02-08T14:00:00.000Z`).
    pub fn min_iso(&self) -> String {
        self.min.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    pub fn max_iso(&self) -> String {
        self.max.to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

// ============================================================================
// Item
// ============================================================================

/// Discriminant carried in the dispatch payload as `source_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    Event,
    Task,
}

impl std::fmt::Display for SourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceType::Event => f.write_str("event"),
            SourceType::Task => f.write_str("task"),
        }
    }
}

/// A calendar event or a task, as fetched for one run.
#[derive(Debug, Clone)]
pub enum Item {
    Event(CalendarEvent),
    Task(GoogleTask),
}

impl Item {
    pub fn source_type(&self) -> SourceType {
        match self {
            Item::Event(_) => SourceType::Event,
            Item::Task(_) => SourceType::Task,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Item::Event(e) => &e.id,
            Item::Task(t) => &t.id,
        }
    }

    /// Event summary or task title.
    pub fn title(&self) -> Option<&str> {
        match self {
            Item::Event(e) => e.summary.as_deref(),
            Item::Task(t) => t.title.as_deref(),
        }
    }

    /// Event description or task notes.
    pub fn body(&self) -> Option<&str> {
        match self {
            Item::Event(e) => e.description.as_deref(),
            Item::Task(t) => t.notes.as_deref(),
        }
    }

    /// Event start or task due instant.
    pub fn scheduled_at(&self) -> Option<DateTime<Utc>> {
        match self {
            Item::Event(e) => e.start_time(),
            Item::Task(t) => t.due_time(),
        }
    }

    /// Calendar id or task list id the item was fetched from.
    pub fn container_id(&self) -> &str {
        match self {
            Item::Event(e) => &e.calendar_id,
            Item::Task(t) => &t.task_list_id,
        }
    }

    pub fn is_incomplete(&self) -> bool {
        match self {
            Item::Event(e) => e.is_incomplete,
            Item::Task(t) => t.is_incomplete,
        }
    }

    /// Provider JSON exactly as returned.
    pub fn raw(&self) -> &Value {
        match self {
            Item::Event(e) => &e.raw,
            Item::Task(t) => &t.raw,
        }
    }

    /// Whether the scheduled instant is strictly before now. Undated items never are.
    pub fn is_past_scheduled_time(&self) -> bool {
        self.is_past_scheduled_time_at(Utc::now())
    }

    pub fn is_past_scheduled_time_at(&self, now: DateTime<Utc>) -> bool {
        match self.scheduled_at() {
            Some(at) => at < now,
            None => {
                log::debug!("{} {} has no scheduled time", self.source_type(), self.id());
                false
            }
        }
    }
}

/// Write the completion marker into the item's free-text field.
///
/// Single-field PATCH, no read-modify-write: two concurrent runs that both
/// read the item unmarked will both dispatch it.
pub async fn mark_processed(
    item: &Item,
    calendar: &dyn CalendarApi,
    tasks: &dyn TasksApi,
    run_url: &str,
) -> Result<(), GoogleApiError> {
    match item {
        Item::Event(event) => calendar::update_event_description(calendar, event, run_url).await,
        Item::Task(task) => tasks::update_task_notes(tasks, task, run_url).await,
    }
}

/// Parse an RFC 3339 instant or a bare `YYYY-MM-DD` date (midnight UTC).
pub fn parse_instant(s: &str) -> Option<DateTime<Utc>> {
    if s.is_empty() {
        return None;
    }
    if s.contains('T') {
        DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    } else {
        chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|dt| DateTime::<Utc>::from_naive_utc_and_offset(dt, Utc))
    }
}
