use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::validation::ValidationErrors;

use super::error::TaskError;
use super::requests::{CreateTaskRequest, UpdateTaskRequest};
use super::types::Task;

/// Maximum number of characters in a task title.
pub const TITLE_MAX_CHARS: usize = 255;

/// Validates a title, returning the trimmed value.
pub fn validate_title(title: Option<&str>) -> Result<String, TaskError> {
    let title = title.map(str::trim).unwrap_or_default();
    if title.is_empty() {
        return Err(TaskError::TitleRequired);
    }
    if title.chars().count() > TITLE_MAX_CHARS {
        return Err(TaskError::TitleTooLong);
    }
    Ok(title.to_string())
}

/// Parses a YYYY-MM-DD date.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

/// Validates a due date against `today`. Dates before today are rejected.
pub fn validate_due_date(raw: &str, today: NaiveDate) -> Result<NaiveDate, TaskError> {
    let date = parse_date(raw).ok_or(TaskError::InvalidDueDate)?;
    if date < today {
        return Err(TaskError::DueDateInPast);
    }
    Ok(date)
}

/// Builds a new task owned by `user_id` from a create request.
///
/// All field errors are collected before returning.
pub fn build_task(
    user_id: Uuid,
    request: CreateTaskRequest,
    today: NaiveDate,
    now: DateTime<Utc>,
) -> Result<Task, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let title = validate_title(request.title.as_deref())
        .map_err(|e| e.record(&mut errors))
        .ok();

    let due_date = match request.due_date.as_deref() {
        Some(raw) => validate_due_date(raw, today)
            .map(Some)
            .map_err(|e| e.record(&mut errors))
            .unwrap_or_default(),
        None => None,
    };

    let title = errors.into_result(title)?.unwrap_or_default();

    Ok(Task {
        id: Uuid::new_v4(),
        user_id,
        title,
        description: request.description,
        due_date,
        created_at: now,
        updated_at: now,
    })
}

/// Applies a partial update to `task`, returning the updated copy.
///
/// Only supplied fields change. `user_id`, `id` and `created_at` are never
/// touched; `updated_at` moves to `now` when at least one field was supplied.
pub fn apply_update(
    task: &Task,
    request: UpdateTaskRequest,
    today: NaiveDate,
    now: DateTime<Utc>,
) -> Result<Task, ValidationErrors> {
    let mut errors = ValidationErrors::new();
    let mut updated = task.clone();
    let touched = !request.is_empty();

    if let Some(title) = request.title {
        match validate_title(title.as_deref()) {
            Ok(title) => updated.title = title,
            Err(e) => e.record(&mut errors),
        }
    }

    if let Some(description) = request.description {
        updated.description = description;
    }

    if let Some(due_date) = request.due_date {
        match due_date.as_deref().map(|raw| validate_due_date(raw, today)) {
            Some(Ok(date)) => updated.due_date = Some(date),
            Some(Err(e)) => e.record(&mut errors),
            None => updated.due_date = None,
        }
    }

    if touched {
        updated.updated_at = now;
    }

    errors.into_result(updated)
}
