//! SQLite repository implementation.

use async_trait::async_trait;
use rusqlite::functions::FunctionFlags;
use tokio_rusqlite::Connection;
use uuid::Uuid;

use tasklane_core::storage::{RepositoryError, Result, TaskRepository, UserRepository};
use tasklane_core::task::{Task, TaskPage, TaskQuery};
use tasklane_core::user::User;

use super::conversions::{format_date, format_datetime, row_to_task, row_to_user};
use super::error::map_tokio_rusqlite_error;
use super::query::{build_list_statement, UNICODE_LOWER};
use super::schema;

/// Helper to wrap rusqlite errors for tokio_rusqlite closures.
fn wrap_err(e: rusqlite::Error) -> tokio_rusqlite::Error {
    tokio_rusqlite::Error::Rusqlite(e)
}

/// SQLite-based repository for users and tasks.
pub struct SqliteRepository {
    conn: Connection,
}

impl SqliteRepository {
    /// Opens (or creates) the database file at `path` and applies the schema.
    pub async fn new(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .await
            .map_err(|e| RepositoryError::ConnectionFailed(e.to_string()))?;

        Self::init_schema(&conn).await?;

        Ok(Self { conn })
    }

    /// Creates a repository backed by an in-memory database.
    pub async fn new_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| RepositoryError::ConnectionFailed(e.to_string()))?;

        Self::init_schema(&conn).await?;

        Ok(Self { conn })
    }

    /// Registers `unicode_lower` and applies the schema.
    async fn init_schema(conn: &Connection) -> Result<()> {
        conn.call(|conn| {
            conn.create_scalar_function(
                UNICODE_LOWER,
                1,
                FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
                |ctx| {
                    let text: Option<String> = ctx.get(0)?;
                    Ok(text.map(|t| t.to_lowercase()))
                },
            )
            .map_err(wrap_err)?;

            conn.execute_batch(schema::CREATE_TABLES)
                .map_err(wrap_err)?;
            Ok(())
        })
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))
    }
}

// ============================================================================
// TaskRepository implementation
// ============================================================================

#[async_trait]
impl TaskRepository for SqliteRepository {
    async fn find_by_id(&self, owner: Uuid, id: Uuid) -> Result<Option<Task>> {
        let id_str = id.to_string();
        let owner_str = owner.to_string();

        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare(schema::SELECT_TASK_BY_ID).map_err(wrap_err)?;
                match stmt.query_row([&id_str, &owner_str], row_to_task) {
                    Ok(task) => Ok(Some(task)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(wrap_err(e)),
                }
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Task", id.to_string()))
    }

    async fn find_all_for_owner(&self, owner: Uuid, query: &TaskQuery) -> Result<TaskPage> {
        let statement = build_list_statement(owner, query);

        self.conn
            .call(move |conn| {
                let params = rusqlite::params_from_iter(statement.params.iter());
                let total: i64 = conn
                    .query_row(&statement.count_sql, params, |row| row.get(0))
                    .map_err(wrap_err)?;

                let mut stmt = conn.prepare(&statement.select_sql).map_err(wrap_err)?;
                let rows = stmt
                    .query_map(
                        rusqlite::params_from_iter(statement.params.iter()),
                        row_to_task,
                    )
                    .map_err(wrap_err)?;

                let mut tasks = Vec::new();
                for row_result in rows {
                    tasks.push(row_result.map_err(wrap_err)?);
                }
                Ok(TaskPage::new(tasks, total.max(0) as usize))
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Task", owner.to_string()))
    }

    async fn create(&self, task: &Task) -> Result<()> {
        let task_id = task.id.to_string();
        let params = (
            task.id.to_string(),
            task.user_id.to_string(),
            task.title.clone(),
            task.description.clone(),
            task.due_date.as_ref().map(format_date),
            format_datetime(&task.created_at),
            format_datetime(&task.updated_at),
        );

        self.conn
            .call(move |conn| {
                conn.execute(schema::INSERT_TASK, params).map_err(wrap_err)?;
                Ok(())
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Task", task_id))
    }

    async fn update(&self, owner: Uuid, task: &Task) -> Result<()> {
        let task_id = task.id.to_string();
        let params = (
            task.id.to_string(),
            owner.to_string(),
            task.title.clone(),
            task.description.clone(),
            task.due_date.as_ref().map(format_date),
            format_datetime(&task.updated_at),
        );

        self.conn
            .call(move |conn| {
                let rows = conn.execute(schema::UPDATE_TASK, params).map_err(wrap_err)?;
                if rows == 0 {
                    Err(wrap_err(rusqlite::Error::QueryReturnedNoRows))
                } else {
                    Ok(())
                }
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Task", task_id))
    }

    async fn delete(&self, owner: Uuid, id: Uuid) -> Result<()> {
        let params = (id.to_string(), owner.to_string());

        self.conn
            .call(move |conn| {
                let rows = conn.execute(schema::DELETE_TASK, params).map_err(wrap_err)?;
                if rows == 0 {
                    Err(wrap_err(rusqlite::Error::QueryReturnedNoRows))
                } else {
                    Ok(())
                }
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Task", id.to_string()))
    }
}

// ============================================================================
// UserRepository implementation
// ============================================================================

#[async_trait]
impl UserRepository for SqliteRepository {
    async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
        let id_str = id.to_string();

        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare(schema::SELECT_USER_BY_ID).map_err(wrap_err)?;
                match stmt.query_row([&id_str], row_to_user) {
                    Ok(user) => Ok(Some(user)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(wrap_err(e)),
                }
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "User", id.to_string()))
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let email = email.to_string();
        let lookup = email.clone();

        self.conn
            .call(move |conn| {
                let mut stmt = conn
                    .prepare(schema::SELECT_USER_BY_EMAIL)
                    .map_err(wrap_err)?;
                match stmt.query_row([&lookup], row_to_user) {
                    Ok(user) => Ok(Some(user)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(wrap_err(e)),
                }
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "User", email))
    }

    async fn create_user(&self, user: &User) -> Result<()> {
        // The only unique column a caller can collide on is the email.
        let email = user.email.clone();
        let params = (
            user.id.to_string(),
            user.name.clone(),
            user.email.clone(),
            user.password_hash.clone(),
            format_datetime(&user.created_at),
            format_datetime(&user.updated_at),
        );

        self.conn
            .call(move |conn| {
                conn.execute(schema::INSERT_USER, params).map_err(wrap_err)?;
                Ok(())
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "User", email))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate, Utc};
    use tasklane_core::task::SortDirection;

    async fn repo() -> SqliteRepository {
        SqliteRepository::new_in_memory().await.unwrap()
    }

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn titles(page: &TaskPage) -> Vec<&str> {
        page.tasks.iter().map(|t| t.title.as_str()).collect()
    }

    #[tokio::test]
    async fn test_task_create_and_find() {
        let repo = repo().await;
        let owner = Uuid::new_v4();
        let task = Task::new(owner, "Buy milk")
            .with_description("Oat")
            .with_due_date(date(2030, 5, 1));

        repo.create(&task).await.unwrap();

        assert_eq!(repo.find_by_id(owner, task.id).await.unwrap(), Some(task.clone()));
        assert!(repo.find_by_id(Uuid::new_v4(), task.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_task_create_duplicate_id() {
        let repo = repo().await;
        let task = Task::new(Uuid::new_v4(), "Once");
        repo.create(&task).await.unwrap();

        let err = repo.create(&task).await.unwrap_err();
        assert!(matches!(err, RepositoryError::AlreadyExists { entity_type: "Task", .. }));
    }

    #[tokio::test]
    async fn test_task_update_scoped_to_owner() {
        let repo = repo().await;
        let owner = Uuid::new_v4();
        let task = Task::new(owner, "Original").with_due_date(date(2030, 1, 1));
        repo.create(&task).await.unwrap();

        let mut changed = task.clone();
        changed.title = "Renamed".to_string();
        changed.due_date = None;
        changed.updated_at = task.updated_at + Duration::seconds(5);

        let err = repo.update(Uuid::new_v4(), &changed).await.unwrap_err();
        assert_eq!(err, RepositoryError::task_not_found(task.id));

        repo.update(owner, &changed).await.unwrap();
        assert_eq!(repo.find_by_id(owner, task.id).await.unwrap(), Some(changed));
    }

    #[tokio::test]
    async fn test_task_delete_scoped_to_owner() {
        let repo = repo().await;
        let owner = Uuid::new_v4();
        let task = Task::new(owner, "Delete me");
        repo.create(&task).await.unwrap();

        assert!(repo.delete(Uuid::new_v4(), task.id).await.unwrap_err().is_not_found());

        repo.delete(owner, task.id).await.unwrap();
        assert!(repo.find_by_id(owner, task.id).await.unwrap().is_none());
        assert!(repo.delete(owner, task.id).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_list_paginates_and_counts() {
        let repo = repo().await;
        let owner = Uuid::new_v4();
        for i in 0..23 {
            repo.create(&Task::new(owner, format!("task {i}"))).await.unwrap();
        }
        repo.create(&Task::new(Uuid::new_v4(), "not mine")).await.unwrap();

        let page = repo.find_all_for_owner(owner, &TaskQuery::page(3)).await.unwrap();

        assert_eq!(page.total, 23);
        assert_eq!(page.tasks.len(), 3);
    }

    #[tokio::test]
    async fn test_list_ordering_matches_in_memory_rules() {
        let repo = repo().await;
        let owner = Uuid::new_v4();
        let base = Utc::now();

        repo.create(&Task::new(owner, "undated old").with_created_at(base - Duration::hours(1)))
            .await
            .unwrap();
        repo.create(&Task::new(owner, "undated new").with_created_at(base))
            .await
            .unwrap();
        repo.create(&Task::new(owner, "march").with_due_date(date(2030, 3, 1)))
            .await
            .unwrap();
        repo.create(&Task::new(owner, "may").with_due_date(date(2030, 5, 1)))
            .await
            .unwrap();

        let desc = repo
            .find_all_for_owner(owner, &TaskQuery::default())
            .await
            .unwrap();
        assert_eq!(titles(&desc), ["may", "march", "undated new", "undated old"]);

        let asc = repo
            .find_all_for_owner(owner, &TaskQuery::default().with_sort(SortDirection::Asc))
            .await
            .unwrap();
        assert_eq!(titles(&asc), ["march", "may", "undated new", "undated old"]);
    }

    #[tokio::test]
    async fn test_list_search_and_range() {
        let repo = repo().await;
        let owner = Uuid::new_v4();

        repo.create(&Task::new(owner, "Quarterly REPORT").with_due_date(date(2030, 3, 10)))
            .await
            .unwrap();
        repo.create(&Task::new(owner, "Email").with_description("attach the report"))
            .await
            .unwrap();
        repo.create(&Task::new(owner, "100% done")).await.unwrap();
        repo.create(&Task::new(owner, "1000 done")).await.unwrap();

        let search = repo
            .find_all_for_owner(owner, &TaskQuery::default().with_search("report"))
            .await
            .unwrap();
        assert_eq!(search.total, 2);

        let ranged = repo
            .find_all_for_owner(
                owner,
                &TaskQuery::default()
                    .with_search("report")
                    .with_due_date_range(Some(date(2030, 3, 1)), None),
            )
            .await
            .unwrap();
        assert_eq!(titles(&ranged), ["Quarterly REPORT"]);

        let literal = repo
            .find_all_for_owner(owner, &TaskQuery::default().with_search("100%"))
            .await
            .unwrap();
        assert_eq!(titles(&literal), ["100% done"]);
    }

    #[tokio::test]
    async fn test_search_folds_non_ascii_case() {
        let repo = repo().await;
        let owner = Uuid::new_v4();

        repo.create(&Task::new(owner, "ÄPFEL kaufen")).await.unwrap();
        repo.create(&Task::new(owner, "Notes").with_description("Straße fegen"))
            .await
            .unwrap();
        repo.create(&Task::new(owner, "Birnen")).await.unwrap();

        let apples = repo
            .find_all_for_owner(owner, &TaskQuery::default().with_search("äpfel"))
            .await
            .unwrap();
        assert_eq!(titles(&apples), ["ÄPFEL kaufen"]);

        let street = repo
            .find_all_for_owner(owner, &TaskQuery::default().with_search("STRASSE"))
            .await
            .unwrap();
        assert_eq!(street.total, 0);

        let street = repo
            .find_all_for_owner(owner, &TaskQuery::default().with_search("STRAßE"))
            .await
            .unwrap();
        assert_eq!(titles(&street), ["Notes"]);
    }

    #[tokio::test]
    async fn test_user_create_and_lookup() {
        let repo = repo().await;
        let user = User::new("Ada", "ada@example.com", "$argon2id$hash");

        repo.create_user(&user).await.unwrap();

        assert_eq!(repo.get_user(user.id).await.unwrap(), Some(user.clone()));
        assert_eq!(
            repo.get_user_by_email("ada@example.com").await.unwrap(),
            Some(user)
        );
        assert!(repo.get_user_by_email("nobody@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_user_duplicate_email() {
        let repo = repo().await;
        repo.create_user(&User::new("Ada", "ada@example.com", "h"))
            .await
            .unwrap();

        let err = repo
            .create_user(&User::new("Imposter", "ada@example.com", "h"))
            .await
            .unwrap_err();

        assert_eq!(err, RepositoryError::email_taken("ada@example.com"));
    }
}
