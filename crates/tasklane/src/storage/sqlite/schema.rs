//! SQLite schema definitions and SQL query constants.
//!
//! Pure data, no I/O. The list query is assembled in `query.rs` because its
//! WHERE clause depends on which filters are present.

/// SQL statement to create all tables.
pub const CREATE_TABLES: &str = r#"
-- Users table
CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    email TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

-- Tasks table
CREATE TABLE IF NOT EXISTS tasks (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    title TEXT NOT NULL,
    description TEXT,
    due_date TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

-- Indexes for efficient queries
CREATE INDEX IF NOT EXISTS idx_tasks_user_id ON tasks(user_id);
CREATE INDEX IF NOT EXISTS idx_tasks_user_due_date ON tasks(user_id, due_date);
"#;

// User queries
pub const INSERT_USER: &str = r#"
INSERT INTO users (id, name, email, password_hash, created_at, updated_at)
VALUES (?1, ?2, ?3, ?4, ?5, ?6)
"#;

pub const SELECT_USER_BY_ID: &str = r#"
SELECT id, name, email, password_hash, created_at, updated_at
FROM users
WHERE id = ?1
"#;

pub const SELECT_USER_BY_EMAIL: &str = r#"
SELECT id, name, email, password_hash, created_at, updated_at
FROM users
WHERE email = ?1
"#;

// Task queries
pub const TASK_COLUMNS: &str = "id, user_id, title, description, due_date, created_at, updated_at";

pub const INSERT_TASK: &str = r#"
INSERT INTO tasks (id, user_id, title, description, due_date, created_at, updated_at)
VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
"#;

pub const SELECT_TASK_BY_ID: &str = r#"
SELECT id, user_id, title, description, due_date, created_at, updated_at
FROM tasks
WHERE id = ?1 AND user_id = ?2
"#;

pub const UPDATE_TASK: &str = r#"
UPDATE tasks
SET title = ?3, description = ?4, due_date = ?5, updated_at = ?6
WHERE id = ?1 AND user_id = ?2
"#;

pub const DELETE_TASK: &str = r#"
DELETE FROM tasks
WHERE id = ?1 AND user_id = ?2
"#;
