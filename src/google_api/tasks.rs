//! Google Tasks API v1: tasks due in a window, notes patch.

use async_trait::async_trait;
use serde_json::{json, Value};

use super::{endpoint, GoogleApiError, GoogleClient};
use crate::source::{TasksApi, TimeWindow};

#[async_trait]
impl TasksApi for GoogleClient {
    async fn list_tasks(
        &self,
        task_list_id: &str,
        window: &TimeWindow,
    ) -> Result<Vec<Value>, GoogleApiError> {
        let url = endpoint(&self.tasks_base, &["lists", task_list_id, "tasks"])?;
        let due_min = window.min_iso();
        let due_max = window.max_iso();

        // Completed tasks are requested too; they are counted as skipped.
        self.list_all(
            url,
            &[
                ("dueMin", due_min.as_str()),
                ("dueMax", due_max.as_str()),
                ("showCompleted", "true"),
                ("showHidden", "true"),
                ("maxResults", "100"),
            ],
        )
        .await
    }

    async fn patch_task_notes(
        &self,
        task_list_id: &str,
        task_id: &str,
        notes: &str,
    ) -> Result<(), GoogleApiError> {
        let url = endpoint(&self.tasks_base, &["lists", task_list_id, "tasks", task_id])?;
        self.patch(url, &json!({ "notes": notes })).await
    }
}
