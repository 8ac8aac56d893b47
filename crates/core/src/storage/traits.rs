use async_trait::async_trait;
use uuid::Uuid;

use crate::task::{Task, TaskPage, TaskQuery};
use crate::user::User;

use super::Result;

/// Persistence for tasks, always scoped to an owner.
///
/// A task owned by someone else behaves exactly like a task that does not
/// exist: lookups return `None` and writes fail with `NotFound`.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Gets one of the owner's tasks by ID.
    async fn find_by_id(&self, owner: Uuid, id: Uuid) -> Result<Option<Task>>;

    /// Returns the requested page of the owner's tasks, filtered and ordered
    /// per `query`, along with the total number of matches.
    async fn find_all_for_owner(&self, owner: Uuid, query: &TaskQuery) -> Result<TaskPage>;

    /// Inserts a new task. Its `user_id` is the owner.
    async fn create(&self, task: &Task) -> Result<()>;

    /// Replaces the mutable fields of one of the owner's tasks.
    async fn update(&self, owner: Uuid, task: &Task) -> Result<()>;

    /// Deletes one of the owner's tasks.
    async fn delete(&self, owner: Uuid, id: Uuid) -> Result<()>;
}

/// Persistence for user accounts.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn get_user(&self, id: Uuid) -> Result<Option<User>>;

    /// Looks up a user by (already normalized) email address.
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Inserts a new user. Fails with `AlreadyExists` if the email is taken.
    async fn create_user(&self, user: &User) -> Result<()>;
}
