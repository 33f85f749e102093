//! Google Tasks: fetch, annotate, mark.
//!
//! Unlike events, a task's incompleteness comes from the provider status
//! (`completed` or not), not from the marker. The marker is still written
//! back after dispatch.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use super::{parse_instant, Item, TasksApi, TimeWindow};
use crate::google_api::GoogleApiError;
use crate::marker::append_marker;

const STATUS_COMPLETED: &str = "completed";

#[derive(Debug, Deserialize)]
struct TaskFields {
    #[serde(default)]
    id: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    notes: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    due: Option<String>,
}

/// A Google Task plus the metadata the workflow needs.
#[derive(Debug, Clone)]
pub struct GoogleTask {
    pub id: String,
    pub title: Option<String>,
    pub notes: Option<String>,
    pub due: Option<String>,
    pub task_list_id: String,
    /// Provider status is anything but `completed`.
    pub is_incomplete: bool,
    pub raw: Value,
}

impl GoogleTask {
    pub fn from_raw(raw: Value, task_list_id: &str) -> Result<Self, serde_json::Error> {
        let fields: TaskFields = serde_json::from_value(raw.clone())?;
        let is_incomplete = fields.status.as_deref() != Some(STATUS_COMPLETED);

        Ok(Self {
            id: fields.id,
            title: fields.title,
            notes: fields.notes,
            due: fields.due.filter(|d| !d.is_empty()),
            task_list_id: task_list_id.to_string(),
            is_incomplete,
            raw,
        })
    }

    pub fn due_time(&self) -> Option<DateTime<Utc>> {
        self.due.as_deref().and_then(parse_instant)
    }
}

/// Fetch tasks from each task list due within `[now - lookback, now + 10min]`.
///
/// A task list that fails to list is logged and contributes no tasks.
pub async fn fetch_tasks(
    api: &dyn TasksApi,
    task_list_ids: &[String],
    lookback_minutes: u32,
) -> Vec<Item> {
    let window = TimeWindow::lookback(Utc::now(), lookback_minutes);
    fetch_tasks_in(api, task_list_ids, &window).await
}

pub async fn fetch_tasks_in(
    api: &dyn TasksApi,
    task_list_ids: &[String],
    window: &TimeWindow,
) -> Vec<Item> {
    log::debug!("Fetching tasks from {} to {}", window.min_iso(), window.max_iso());

    let mut all_tasks = Vec::new();

    for task_list_id in task_list_ids {
        log::debug!("Fetching tasks from task list: {}", task_list_id);
        let raw_tasks = match api.list_tasks(task_list_id, window).await {
            Ok(items) => items,
            Err(e) => {
                log::warn!("Failed to fetch tasks from task list {}: {}", task_list_id, e);
                continue;
            }
        };
        log::debug!("Found {} tasks in task list {}", raw_tasks.len(), task_list_id);

        for raw in raw_tasks {
            match GoogleTask::from_raw(raw, task_list_id) {
                Ok(task) => all_tasks.push(Item::Task(task)),
                Err(e) => {
                    log::warn!("Skipping unreadable task in task list {}: {}", task_list_id, e)
                }
            }
        }
    }

    all_tasks
}

pub(crate) async fn update_task_notes(
    api: &dyn TasksApi,
    task: &GoogleTask,
    run_url: &str,
) -> Result<(), GoogleApiError> {
    let new_notes = append_marker(task.notes.as_deref(), run_url);
    api.patch_task_notes(&task.task_list_id, &task.id, &new_notes).await?;
    log::debug!("Updated notes for task {}", task.id);
    Ok(())
}
