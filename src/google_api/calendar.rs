//! Google Calendar API v3: events in a window, description patch.

use async_trait::async_trait;
use serde_json::{json, Value};

use super::{endpoint, GoogleApiError, GoogleClient};
use crate::source::{CalendarApi, TimeWindow};

#[async_trait]
impl CalendarApi for GoogleClient {
    /// Expands recurring events into instances and orders by start time.
    /// Handles pagination via `nextPageToken`.
    async fn list_events(
        &self,
        calendar_id: &str,
        window: &TimeWindow,
    ) -> Result<Vec<Value>, GoogleApiError> {
        let url = endpoint(&self.calendar_base, &["calendars", calendar_id, "events"])?;
        let time_min = window.min_iso();
        let time_max = window.max_iso();

        self.list_all(
            url,
            &[
                ("timeMin", time_min.as_str()),
                ("timeMax", time_max.as_str()),
                ("singleEvents", "true"),
                ("orderBy", "startTime"),
                ("maxResults", "250"),
            ],
        )
        .await
    }

    async fn patch_event_description(
        &self,
        calendar_id: &str,
        event_id: &str,
        description: &str,
    ) -> Result<(), GoogleApiError> {
        let url = endpoint(
            &self.calendar_base,
            &["calendars", calendar_id, "events", event_id],
        )?;
        self.patch(url, &json!({ "description": description })).await
    }
}
