//! Cached task repository decorator.
//!
//! Only unfiltered list pages and single found tasks are cached. Filtered or
//! sorted lists always go to the repository.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use tasklane_core::cache::{
    deserialize_task, deserialize_task_page, serialize_task, serialize_task_page, task_key,
    task_list_key, task_list_pattern, Cache, SerializationError,
};
use tasklane_core::storage::{Result, TaskRepository};
use tasklane_core::task::{Task, TaskPage, TaskQuery};

/// Cached task repository decorator.
///
/// Cache failures never fail a request: a failed read is a miss and a failed
/// write or invalidation is logged.
///
/// # Type Parameters
///
/// * `R` - The underlying repository implementation
/// * `C` - The cache implementation
pub struct CachedTaskRepository<R: ?Sized, C: ?Sized> {
    repository: Arc<R>,
    cache: Arc<C>,
    ttl: Duration,
}

impl<R, C> CachedTaskRepository<R, C>
where
    R: TaskRepository + ?Sized,
    C: Cache + ?Sized,
{
    /// Creates a new cached task repository whose entries live for `ttl`.
    pub fn new(repository: Arc<R>, cache: Arc<C>, ttl: Duration) -> Self {
        Self {
            repository,
            cache,
            ttl,
        }
    }

    /// Drops every cached list page of `owner`, plus one task when given.
    async fn invalidate(&self, owner: Uuid, task_id: Option<Uuid>) {
        if let Some(task_id) = task_id {
            if let Err(err) = self.cache.delete(&task_key(owner, task_id)).await {
                tracing::warn!(user_id = %owner, %task_id, error = %err, "Failed to invalidate task cache");
            }
        }

        if let Err(err) = self.cache.delete_pattern(&task_list_pattern(owner)).await {
            tracing::warn!(user_id = %owner, error = %err, "Failed to invalidate task list cache");
        }
    }

    async fn store(&self, key: &str, bytes: std::result::Result<Vec<u8>, SerializationError>) {
        match bytes {
            Ok(bytes) => {
                if let Err(err) = self.cache.set(key, &bytes, Some(self.ttl)).await {
                    tracing::warn!(key, error = %err, "Failed to populate cache");
                }
            }
            Err(err) => tracing::warn!(key, error = %err, "Failed to serialize cache value"),
        }
    }
}

#[async_trait]
impl<R, C> TaskRepository for CachedTaskRepository<R, C>
where
    R: TaskRepository + ?Sized + 'static,
    C: Cache + ?Sized + 'static,
{
    async fn find_by_id(&self, owner: Uuid, id: Uuid) -> Result<Option<Task>> {
        let cache_key = task_key(owner, id);

        match self.cache.get(&cache_key).await {
            Ok(Some(bytes)) => match deserialize_task(&bytes) {
                Ok(task) if task.is_owned_by(owner) => {
                    tracing::trace!(task_id = %id, "Cache hit for task");
                    return Ok(Some(task));
                }
                Ok(_) => tracing::warn!(task_id = %id, "Cached task has a different owner"),
                Err(err) => {
                    tracing::warn!(task_id = %id, error = %err, "Cached task deserialization failed")
                }
            },
            Ok(None) => {}
            Err(err) => tracing::warn!(task_id = %id, error = %err, "Cache read failed"),
        }

        tracing::trace!(task_id = %id, "Cache miss for task");
        let task = self.repository.find_by_id(owner, id).await?;

        if let Some(ref t) = task {
            self.store(&cache_key, serialize_task(t)).await;
        }

        Ok(task)
    }

    async fn find_all_for_owner(&self, owner: Uuid, query: &TaskQuery) -> Result<TaskPage> {
        let Some(fingerprint) = query.fingerprint() else {
            return self.repository.find_all_for_owner(owner, query).await;
        };
        let cache_key = task_list_key(owner, &fingerprint);

        match self.cache.get(&cache_key).await {
            Ok(Some(bytes)) => match deserialize_task_page(&bytes) {
                Ok(page) => {
                    tracing::trace!(user_id = %owner, page = query.page, "Cache hit for task list");
                    return Ok(page);
                }
                Err(err) => {
                    tracing::warn!(user_id = %owner, error = %err, "Cached task list deserialization failed")
                }
            },
            Ok(None) => {}
            Err(err) => tracing::warn!(user_id = %owner, error = %err, "Cache read failed"),
        }

        tracing::trace!(user_id = %owner, page = query.page, "Cache miss for task list");
        let page = self.repository.find_all_for_owner(owner, query).await?;

        self.store(&cache_key, serialize_task_page(&page)).await;

        Ok(page)
    }

    async fn create(&self, task: &Task) -> Result<()> {
        self.repository.create(task).await?;
        self.invalidate(task.user_id, None).await;

        tracing::debug!(task_id = %task.id, user_id = %task.user_id, "Task created");
        Ok(())
    }

    async fn update(&self, owner: Uuid, task: &Task) -> Result<()> {
        self.repository.update(owner, task).await?;
        self.invalidate(owner, Some(task.id)).await;

        tracing::debug!(task_id = %task.id, user_id = %owner, "Task updated");
        Ok(())
    }

    async fn delete(&self, owner: Uuid, id: Uuid) -> Result<()> {
        self.repository.delete(owner, id).await?;
        self.invalidate(owner, Some(id)).await;

        tracing::debug!(task_id = %id, user_id = %owner, "Task deleted");
        Ok(())
    }
}
