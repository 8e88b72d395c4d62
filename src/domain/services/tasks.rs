#[cfg(test)]
#[path = "tasks_test.rs"]
mod tests;

use anyhow::Result;

use super::SessionManager;
use crate::domain::models::ApiBox;
use crate::domain::models::ApiError;
use crate::domain::models::Task;
use crate::domain::models::TaskCounts;
use crate::domain::models::TaskDraft;
use crate::domain::models::TaskFilter;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The cache matches a fresh server response.
    Updated,
    /// The request failed; the previous cache was kept and the error slot set.
    Failed,
    /// The credential was rejected, the session was torn down, and the cache
    /// cleared.
    SessionExpired,
    /// Nothing was submitted (empty-after-trim input).
    Skipped,
}

/// Synchronizes the local task cache with the server for the active session
/// and derives filtered views and counts. The cache is only ever replaced
/// wholesale from a list response, never patched in place, so it always
/// matches some past server response for the current credential.
pub struct TaskListController {
    api: ApiBox,
    tasks: Vec<Task>,
    error: Option<String>,
}

impl TaskListController {
    pub fn new(api: ApiBox) -> TaskListController {
        return TaskListController {
            api,
            tasks: vec![],
            error: None,
        };
    }

    pub fn all(&self) -> &[Task] {
        return &self.tasks;
    }

    pub fn error(&self) -> Option<&str> {
        return self.error.as_deref();
    }

    /// Drops the cache. Called whenever the session it was fetched under
    /// stops existing.
    pub fn clear(&mut self) {
        self.tasks.clear();
        self.error = None;
    }

    pub fn filtered_view(&self, filter: TaskFilter) -> Vec<Task> {
        return filter.apply(&self.tasks);
    }

    pub fn counts(&self) -> TaskCounts {
        return TaskCounts::tally(&self.tasks);
    }

    /// Fetches the full list and replaces the cache atomically. A 401 is not
    /// a generic error: it tears the session down through the session
    /// manager. Any other failure keeps the previous cache, since stale data
    /// beats a blanked view.
    pub async fn refresh(&mut self, session: &mut SessionManager) -> Result<SyncOutcome> {
        let credential = match session.credential() {
            Some(credential) => credential.to_string(),
            None => {
                self.clear();
                return Ok(SyncOutcome::SessionExpired);
            }
        };

        match self.api.list_tasks(&credential).await {
            Ok(tasks) => {
                self.tasks = tasks;
                self.error = None;
                return Ok(SyncOutcome::Updated);
            }
            Err(ApiError::Unauthorized) => {
                tracing::info!("Task list fetch was rejected, ending session");
                session.expire().await?;
                self.clear();
                return Ok(SyncOutcome::SessionExpired);
            }
            Err(err) => {
                tracing::error!(error = ?err, "Failed to fetch the task list");
                self.error = Some(err.to_string());
                return Ok(SyncOutcome::Failed);
            }
        }
    }

    /// Submits a new task and then re-fetches the list, whether or not the
    /// submission succeeded. Empty-after-trim titles are dropped silently
    /// with no network call.
    pub async fn create(
        &mut self,
        title: &str,
        session: &mut SessionManager,
    ) -> Result<SyncOutcome> {
        let draft = match TaskDraft::from_input(title) {
            Some(draft) => draft,
            None => return Ok(SyncOutcome::Skipped),
        };

        let credential = match session.credential() {
            Some(credential) => credential.to_string(),
            None => {
                self.clear();
                return Ok(SyncOutcome::SessionExpired);
            }
        };

        let res = self.api.create_task(&credential, &draft).await.map(|_| ());
        return self.finish_mutation(res, "Failed to add task", session).await;
    }

    /// Flips `completed` by submitting the task's full representation with
    /// the title unchanged, then re-fetches.
    pub async fn toggle(
        &mut self,
        task: &Task,
        session: &mut SessionManager,
    ) -> Result<SyncOutcome> {
        let credential = match session.credential() {
            Some(credential) => credential.to_string(),
            None => {
                self.clear();
                return Ok(SyncOutcome::SessionExpired);
            }
        };

        let update = task.toggled();
        let res = self.api.update_task(&credential, &update).await.map(|_| ());
        return self
            .finish_mutation(res, "Failed to update task", session)
            .await;
    }

    pub async fn remove(&mut self, id: i64, session: &mut SessionManager) -> Result<SyncOutcome> {
        let credential = match session.credential() {
            Some(credential) => credential.to_string(),
            None => {
                self.clear();
                return Ok(SyncOutcome::SessionExpired);
            }
        };

        let res = self.api.delete_task(&credential, id).await;
        return self
            .finish_mutation(res, "Failed to delete task", session)
            .await;
    }

    /// Shared tail of every mutation. No optimistic local change was applied,
    /// so there is nothing to roll back: the re-fetch is the sole source of
    /// truth. A submission error is written to the error slot after the
    /// re-fetch so it stays visible even when the re-fetch succeeds.
    async fn finish_mutation(
        &mut self,
        res: Result<(), ApiError>,
        error_label: &str,
        session: &mut SessionManager,
    ) -> Result<SyncOutcome> {
        let submit_err = match res {
            Ok(()) => None,
            Err(ApiError::Unauthorized) => {
                tracing::info!("Task mutation was rejected, ending session");
                session.expire().await?;
                self.clear();
                return Ok(SyncOutcome::SessionExpired);
            }
            Err(err) => {
                tracing::error!(error = ?err, label = error_label, "Task mutation failed");
                Some(err)
            }
        };

        let outcome = self.refresh(session).await?;

        if let Some(err) = submit_err {
            if outcome != SyncOutcome::SessionExpired {
                self.error = Some(format!("{error_label}: {err}"));
                return Ok(SyncOutcome::Failed);
            }
        }

        return Ok(outcome);
    }
}
