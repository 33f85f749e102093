//! Dispatch GitHub `repository_dispatch` events for Google Calendar events
//! and Google Tasks whose scheduled time has passed.
//!
//! Each item is dispatched once and then marked by appending a marker to its
//! description or notes. The marker is the only state: there is no local
//! store, so re-running is safe as long as runs do not overlap.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod event_type;
pub mod google_api;
pub mod logging;
pub mod marker;
pub mod orchestrator;
pub mod payload;
pub mod source;

#[cfg(test)]
mod test_log;

use config::ActionInputs;
use dispatch::GitHubDispatcher;
use error::RunError;
use google_api::{auth, GoogleClient};
use orchestrator::{DispatchSettings, Orchestrator, RunSummary};

/// Run one polling pass: authenticate, then dispatch every due, unprocessed item.
///
/// Configuration and authentication failures abort the run. Everything after
/// that is per-container or per-item and only shows up in the counters.
pub async fn run(inputs: &ActionInputs) -> Result<RunSummary, RunError> {
    log::debug!("Time range: {} minutes", inputs.time_range);
    log::debug!("Calendar IDs: {}", inputs.calendar_ids.join(", "));
    log::debug!("Task list IDs: {}", inputs.task_list_ids.join(", "));
    log::debug!("Repository: {}", inputs.repository);
    log::debug!("Default event type: {}", inputs.event_type);

    if !inputs.has_containers() {
        log::warn!("No calendar IDs or task list IDs provided. Nothing to process.");
        return Ok(RunSummary::default());
    }

    let http = reqwest::Client::new();

    log::info!("Authenticating with Google APIs...");
    let credentials = auth::resolve_credentials(
        inputs.google_credentials.as_deref(),
        inputs.credentials_file.as_deref(),
    )?;
    let token = auth::fetch_access_token(&http, &credentials).await?;
    let google = GoogleClient::new(http.clone(), token.token)?;

    let dispatcher = GitHubDispatcher::with_api_base(
        http,
        inputs.github_token.clone(),
        &inputs.github_api_url,
    )
    .map_err(RunError::DispatchSetup)?;

    log::info!("Run URL: {}", inputs.run_url);

    let settings = DispatchSettings {
        calendar_ids: inputs.calendar_ids.clone(),
        task_list_ids: inputs.task_list_ids.clone(),
        lookback_minutes: inputs.time_range,
        repository: inputs.repository.clone(),
        default_event_type: inputs.event_type.clone(),
        run_url: inputs.run_url.clone(),
    };
    let summary = Orchestrator::new(&google, &google, &dispatcher, &settings)
        .run()
        .await;

    log::info!("Processing complete!");
    log::info!("Dispatched: {}", summary.dispatched);
    log::info!("Skipped: {}", summary.skipped);
    log::info!("Errors: {}", summary.errored);

    Ok(summary)
}
