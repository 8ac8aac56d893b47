//! In-memory repository implementation.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use tasklane_core::storage::{RepositoryError, Result, TaskRepository, UserRepository};
use tasklane_core::task::{sort_tasks, Task, TaskPage, TaskQuery};
use tasklane_core::user::User;

/// In-memory storage backend.
///
/// Data is lost when the last clone is dropped.
#[derive(Debug, Clone)]
pub struct InMemoryRepository {
    tasks: Arc<RwLock<HashMap<Uuid, Task>>>,
    users: Arc<RwLock<HashMap<Uuid, User>>>,
}

impl Default for InMemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryRepository {
    /// Creates a new empty in-memory repository.
    pub fn new() -> Self {
        Self {
            tasks: Arc::new(RwLock::new(HashMap::new())),
            users: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl TaskRepository for InMemoryRepository {
    async fn find_by_id(&self, owner: Uuid, id: Uuid) -> Result<Option<Task>> {
        let tasks = self.tasks.read().await;
        Ok(tasks.get(&id).filter(|t| t.is_owned_by(owner)).cloned())
    }

    async fn find_all_for_owner(&self, owner: Uuid, query: &TaskQuery) -> Result<TaskPage> {
        let tasks = self.tasks.read().await;
        let mut matching: Vec<Task> = tasks
            .values()
            .filter(|t| t.is_owned_by(owner))
            .filter(|t| query.matches(t))
            .cloned()
            .collect();
        drop(tasks);

        sort_tasks(&mut matching, query.direction());
        Ok(TaskPage::from_sorted(matching, query.page))
    }

    async fn create(&self, task: &Task) -> Result<()> {
        let mut tasks = self.tasks.write().await;
        if tasks.contains_key(&task.id) {
            return Err(RepositoryError::AlreadyExists {
                entity_type: "Task",
                id: task.id.to_string(),
            });
        }
        tasks.insert(task.id, task.clone());
        Ok(())
    }

    async fn update(&self, owner: Uuid, task: &Task) -> Result<()> {
        let mut tasks = self.tasks.write().await;
        let Some(existing) = tasks.get_mut(&task.id).filter(|t| t.is_owned_by(owner)) else {
            return Err(RepositoryError::task_not_found(task.id));
        };

        existing.title = task.title.clone();
        existing.description = task.description.clone();
        existing.due_date = task.due_date;
        existing.updated_at = task.updated_at;
        Ok(())
    }

    async fn delete(&self, owner: Uuid, id: Uuid) -> Result<()> {
        let mut tasks = self.tasks.write().await;
        if !tasks.get(&id).is_some_and(|t| t.is_owned_by(owner)) {
            return Err(RepositoryError::task_not_found(id));
        }
        tasks.remove(&id);
        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemoryRepository {
    async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
        let users = self.users.read().await;
        Ok(users.get(&id).cloned())
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let users = self.users.read().await;
        Ok(users.values().find(|user| user.email == email).cloned())
    }

    async fn create_user(&self, user: &User) -> Result<()> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == user.email) {
            return Err(RepositoryError::email_taken(&user.email));
        }
        if users.contains_key(&user.id) {
            return Err(RepositoryError::AlreadyExists {
                entity_type: "User",
                id: user.id.to_string(),
            });
        }
        users.insert(user.id, user.clone());
        Ok(())
    }
}
