//! Calendar events: fetch, annotate, mark.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use super::{parse_instant, CalendarApi, Item, TimeWindow};
use crate::google_api::GoogleApiError;
use crate::marker::{append_marker, has_marker};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventFields {
    #[serde(default)]
    id: String,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    description: Option<String>,
    start: Option<EventDateTime>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventDateTime {
    date_time: Option<String>,
    date: Option<String>,
}

/// A Google Calendar event plus the metadata the workflow needs.
#[derive(Debug, Clone)]
pub struct CalendarEvent {
    pub id: String,
    pub summary: Option<String>,
    pub description: Option<String>,
    /// `start.dateTime`, or `start.date` for all-day events.
    pub start: Option<String>,
    pub calendar_id: String,
    /// No completion marker in the description.
    pub is_incomplete: bool,
    pub raw: Value,
}

impl CalendarEvent {
    pub fn from_raw(raw: Value, calendar_id: &str) -> Result<Self, serde_json::Error> {
        let fields: EventFields = serde_json::from_value(raw.clone())?;
        let start = fields
            .start
            .and_then(|s| s.date_time.or(s.date))
            .filter(|s| !s.is_empty());
        let is_incomplete = !has_marker(fields.description.as_deref());

        Ok(Self {
            id: fields.id,
            summary: fields.summary,
            description: fields.description,
            start,
            calendar_id: calendar_id.to_string(),
            is_incomplete,
            raw,
        })
    }

    pub fn start_time(&self) -> Option<DateTime<Utc>> {
        self.start.as_deref().and_then(parse_instant)
    }
}

/// Fetch events from each calendar over `[now - lookback, now + 10min]`.
///
/// A calendar that fails to list is logged and contributes no events.
pub async fn fetch_events(
    api: &dyn CalendarApi,
    calendar_ids: &[String],
    lookback_minutes: u32,
) -> Vec<Item> {
    let window = TimeWindow::lookback(Utc::now(), lookback_minutes);
    fetch_events_in(api, calendar_ids, &window).await
}

pub async fn fetch_events_in(
    api: &dyn CalendarApi,
    calendar_ids: &[String],
    window: &TimeWindow,
) -> Vec<Item> {
    log::debug!(
        "Fetching events from {} to {}",
        window.min_iso(),
        window.max_iso()
    );

    let mut all_events = Vec::new();

    for calendar_id in calendar_ids {
        log::debug!("Fetching events from calendar: {}", calendar_id);
        let raw_events = match api.list_events(calendar_id, window).await {
            Ok(items) => items,
            Err(e) => {
                log::warn!("Failed to fetch events from calendar {}: {}", calendar_id, e);
                continue;
            }
        };
        log::debug!("Found {} events in calendar {}", raw_events.len(), calendar_id);

        for raw in raw_events {
            match CalendarEvent::from_raw(raw, calendar_id) {
                Ok(event) => all_events.push(Item::Event(event)),
                Err(e) => {
                    log::warn!("Skipping unreadable event in calendar {}: {}", calendar_id, e)
                }
            }
        }
    }

    all_events
}

pub(crate) async fn update_event_description(
    api: &dyn CalendarApi,
    event: &CalendarEvent,
    run_url: &str,
) -> Result<(), GoogleApiError> {
    let new_description = append_marker(event.description.as_deref(), run_url);
    api.patch_event_description(&event.calendar_id, &event.id, &new_description)
        .await?;
    log::debug!("Updated description for event {}", event.id);
    Ok(())
}
