//! Action inputs and step outputs.
//!
//! Inputs arrive the way the Actions runner passes them: input `name` is read
//! from `INPUT_<NAME>` (uppercased, spaces to underscores). Runner context
//! comes from the standard `GITHUB_*` variables.

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::dispatch::github::GITHUB_API_BASE;
use crate::dispatch::RepositoryRef;
use crate::error::ConfigError;
use crate::orchestrator::RunSummary;

pub const DEFAULT_TIME_RANGE_MINUTES: u32 = 30;
pub const DEFAULT_EVENT_TYPE: &str = "calendar-dispatch";
const DEFAULT_SERVER_URL: &str = "https://github.com";

/// Everything a run needs, resolved from the environment.
#[derive(Debug, Clone)]
pub struct ActionInputs {
    pub github_token: String,
    /// Lookback window in minutes.
    pub time_range: u32,
    pub calendar_ids: Vec<String>,
    pub task_list_ids: Vec<String>,
    /// Inline credential JSON from the `google-credentials` input.
    pub google_credentials: Option<String>,
    /// `GOOGLE_APPLICATION_CREDENTIALS`.
    pub credentials_file: Option<PathBuf>,
    /// Validated `owner/repo`.
    pub repository: String,
    pub event_type: String,
    pub run_url: String,
    pub github_api_url: String,
}

impl ActionInputs {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve inputs through an arbitrary variable lookup.
    pub fn from_lookup<F>(env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let input = |name: &str| non_empty(env(input_env_name(name).as_str()));
        let var = |key: &str| non_empty(env(key));

        let github_token = input("github-token").ok_or(ConfigError::MissingInput("github-token"))?;

        let time_range = match input("time-range") {
            Some(value) => value.parse::<u32>().map_err(|_| ConfigError::InvalidNumber {
                name: "time-range",
                value,
            })?,
            None => DEFAULT_TIME_RANGE_MINUTES,
        };

        let current_repository = var("GITHUB_REPOSITORY");
        let repository = input("repository")
            .or_else(|| current_repository.clone())
            .ok_or(ConfigError::NoRepository)?;
        RepositoryRef::parse(&repository)?;

        let server_url = var("GITHUB_SERVER_URL").unwrap_or_else(|| DEFAULT_SERVER_URL.to_string());
        let run_id = var("GITHUB_RUN_ID").unwrap_or_else(|| "local".to_string());
        let run_url = build_run_url(
            &server_url,
            current_repository.as_deref().unwrap_or(&repository),
            &run_id,
        );

        Ok(Self {
            github_token,
            time_range,
            calendar_ids: split_ids(input("calendar-ids").as_deref().unwrap_or("")),
            task_list_ids: split_ids(input("task-list-ids").as_deref().unwrap_or("")),
            google_credentials: input("google-credentials"),
            credentials_file: var("GOOGLE_APPLICATION_CREDENTIALS").map(PathBuf::from),
            repository,
            event_type: input("event-type").unwrap_or_else(|| DEFAULT_EVENT_TYPE.to_string()),
            run_url,
            github_api_url: var("GITHUB_API_URL").unwrap_or_else(|| GITHUB_API_BASE.to_string()),
        })
    }

    pub fn has_containers(&self) -> bool {
        !self.calendar_ids.is_empty() || !self.task_list_ids.is_empty()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// `google-credentials` -> `INPUT_GOOGLE-CREDENTIALS`
fn input_env_name(name: &str) -> String {
    format!("INPUT_{}", name.replace(' ', "_").to_uppercase())
}

/// Comma-separated ids, trimmed, empties dropped.
pub fn split_ids(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(String::from)
        .collect()
}

/// Link recorded in the marker so a processed item points back at its run.
pub fn build_run_url(server_url: &str, repository: &str, run_id: &str) -> String {
    format!(
        "{}/{}/actions/runs/{}",
        server_url.trim_end_matches('/'),
        repository,
        run_id
    )
}

/// Append `dispatched-count`, `skipped-count` and `error-count` to the
/// `GITHUB_OUTPUT` file, or log them when there is none.
pub fn write_outputs(summary: &RunSummary, output_file: Option<&Path>) -> Result<(), ConfigError> {
    let lines = [
        ("dispatched-count", summary.dispatched),
        ("skipped-count", summary.skipped),
        ("error-count", summary.errored),
    ];

    let Some(path) = output_file else {
        for (name, value) in lines {
            log::info!("{}={}", name, value);
        }
        return Ok(());
    };

    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;
    for (name, value) in lines {
        writeln!(file, "{}={}", name, value)?;
    }
    Ok(())
}
