//! Ownership-scoped access to tasks.
//!
//! Every call takes the authenticated user's id and passes it down to the
//! repository, which ANDs it into the lookup or mutation. A task owned by
//! someone else is reported exactly like a missing one.

use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use tasklane_core::storage::{RepositoryError, TaskRepository};
use tasklane_core::task::{
    apply_update, build_task, CreateTaskRequest, ListTasksParams, Paginated, Task, TaskQuery,
    UpdateTaskRequest,
};

#[derive(Clone)]
pub struct TaskAccessor {
    repository: Arc<dyn TaskRepository>,
}

impl TaskAccessor {
    pub fn new(repository: Arc<dyn TaskRepository>) -> Self {
        Self { repository }
    }

    /// Lists one page of the user's tasks.
    ///
    /// Fails with `ValidationErrors` when the query parameters are malformed.
    pub async fn list(&self, user_id: Uuid, params: ListTasksParams) -> Result<Paginated<Task>> {
        let query = TaskQuery::from_params(params)?;
        let page = self.repository.find_all_for_owner(user_id, &query).await?;

        tracing::debug!(
            %user_id,
            page = query.page,
            total = page.total,
            cacheable = query.is_cacheable(),
            "Listed tasks"
        );
        Ok(Paginated::from_page(page, query.page))
    }

    pub async fn get(&self, user_id: Uuid, id: Uuid) -> Result<Task> {
        let task = self
            .repository
            .find_by_id(user_id, id)
            .await?
            .ok_or_else(|| RepositoryError::task_not_found(id))?;
        Ok(task)
    }

    /// Validates and stores a new task owned by `user_id`. Due dates are
    /// checked against the UTC date of `now`.
    pub async fn create(
        &self,
        user_id: Uuid,
        request: CreateTaskRequest,
        now: DateTime<Utc>,
    ) -> Result<Task> {
        let task = build_task(user_id, request, now.date_naive(), now)?;
        self.repository.create(&task).await?;
        Ok(task)
    }

    /// Applies a partial update. Ownership is checked before validation so
    /// that other users' tasks never produce a 422.
    pub async fn update(
        &self,
        user_id: Uuid,
        id: Uuid,
        request: UpdateTaskRequest,
        now: DateTime<Utc>,
    ) -> Result<Task> {
        let existing = self.get(user_id, id).await?;
        let updated = apply_update(&existing, request, now.date_naive(), now)?;

        if updated != existing {
            self.repository.update(user_id, &updated).await?;
        }
        Ok(updated)
    }

    pub async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<()> {
        self.repository.delete(user_id, id).await?;
        Ok(())
    }
}
