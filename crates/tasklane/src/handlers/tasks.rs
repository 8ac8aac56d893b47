//! Task CRUD handlers under `/api/tasks`.

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use tasklane_auth::{json_data_errors, CurrentUser};
use tasklane_core::storage::RepositoryError;
use tasklane_core::task::{
    CreateTaskRequest, ListTasksParams, Paginated, Task, UpdateTaskRequest, TASKS_PATH,
};

use crate::{handlers::AppError, state::AppState};

#[derive(Debug, Serialize)]
pub struct TaskCreatedResponse {
    pub message: &'static str,
    pub task: Task,
}

/// A path id that is not a UUID cannot name any task.
fn parse_task_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| RepositoryError::task_not_found(raw).into())
}

fn parse_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    body.map(|Json(value)| value).map_err(|e| match e {
        JsonRejection::JsonDataError(e) => json_data_errors(&e).into(),
        e => AppError::malformed_body(format!("Failed to parse request body: {e}")),
    })
}

/// GET /api/tasks - One page of the caller's tasks.
#[axum::debug_handler]
pub async fn list_tasks(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(params): Query<ListTasksParams>,
) -> Result<Json<Paginated<Task>>, AppError> {
    let page = state.tasks.list(user.id, params).await?;
    Ok(Json(page))
}

/// POST /api/tasks - Create a task owned by the caller.
#[axum::debug_handler]
pub async fn create_task(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    body: Result<Json<CreateTaskRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let request = parse_body(body)?;
    let task = state.tasks.create(user.id, request, Utc::now()).await?;

    tracing::info!(task_id = %task.id, user_id = %user.id, "Created task");

    let location = format!("{TASKS_PATH}/{}", task.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(TaskCreatedResponse {
            message: "Task created successfully",
            task,
        }),
    ))
}

/// GET /api/tasks/{id}
#[axum::debug_handler]
pub async fn get_task(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<Task>, AppError> {
    let id = parse_task_id(&id)?;
    let task = state.tasks.get(user.id, id).await?;
    Ok(Json(task))
}

/// PUT /api/tasks/{id} - Partial update; only supplied fields change.
#[axum::debug_handler]
pub async fn update_task(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    body: Result<Json<UpdateTaskRequest>, JsonRejection>,
) -> Result<Json<Task>, AppError> {
    let id = parse_task_id(&id)?;
    let request = parse_body(body)?;
    let task = state.tasks.update(user.id, id, request, Utc::now()).await?;

    tracing::info!(task_id = %task.id, user_id = %user.id, "Updated task");
    Ok(Json(task))
}

/// DELETE /api/tasks/{id}
#[axum::debug_handler]
pub async fn delete_task(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id = parse_task_id(&id)?;
    state.tasks.delete(user.id, id).await?;

    tracing::info!(task_id = %id, user_id = %user.id, "Deleted task");
    Ok(StatusCode::NO_CONTENT)
}
