//! Maps handler failures onto JSON error responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use tasklane_core::storage::{repository_error_to_status_code, RepositoryError};
use tasklane_core::validation::ValidationErrors;

const NOT_FOUND_MESSAGE: &str = "Task not found.";
const SERVER_ERROR_MESSAGE: &str = "Server Error";

/// Handler error. Wraps any error and picks the status by downcasting to the
/// typed errors the accessor and repositories raise.
#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

impl AppError {
    /// A 400 for request bodies that are not valid JSON.
    pub fn malformed_body(message: impl std::fmt::Display) -> Self {
        Self(anyhow::Error::new(MalformedBody(message.to_string())))
    }

    pub fn status(&self) -> StatusCode {
        if self.0.downcast_ref::<ValidationErrors>().is_some() {
            StatusCode::UNPROCESSABLE_ENTITY
        } else if self.0.downcast_ref::<MalformedBody>().is_some() {
            StatusCode::BAD_REQUEST
        } else if let Some(repo_error) = self.0.downcast_ref::<RepositoryError>() {
            let code = repository_error_to_status_code(repo_error);
            StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
struct MalformedBody(String);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if let Some(errors) = self.0.downcast_ref::<ValidationErrors>() {
            let body = json!({ "message": errors.summary(), "errors": errors.errors() });
            return (status, Json(body)).into_response();
        }

        let message = match status {
            StatusCode::NOT_FOUND => NOT_FOUND_MESSAGE.to_string(),
            StatusCode::BAD_REQUEST | StatusCode::CONFLICT => self.0.to_string(),
            _ => {
                tracing::error!(error = ?self.0, %status, "Request failed");
                SERVER_ERROR_MESSAGE.to_string()
            }
        };

        (status, Json(json!({ "message": message }))).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
