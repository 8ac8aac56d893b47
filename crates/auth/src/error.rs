use axum::{
    extract::rejection::JsonDataError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tasklane_core::storage::RepositoryError;
use tasklane_core::validation::ValidationErrors;
use thiserror::Error;

/// Auth errors for the tasklane_auth crate.
///
/// Wraps the core `AuthError` together with the failures the credential
/// service can hit while talking to storage.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error(transparent)]
    Core(#[from] tasklane_core::auth::AuthError),

    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// The request body could not be read as JSON.
    #[error("{0}")]
    MalformedBody(String),
}

/// Field errors for a JSON body that parsed but did not fit the target type,
/// such as a number where a string is expected.
pub fn json_data_errors(rejection: &JsonDataError) -> ValidationErrors {
    let text = rejection.body_text();
    let detail = text
        .split_once("target type: ")
        .map_or(text.as_str(), |(_, detail)| detail);
    ValidationErrors::from_deserialize_error(detail)
}

impl AuthError {
    pub fn status(&self) -> StatusCode {
        use tasklane_core::auth::AuthError as CoreError;

        match self {
            AuthError::Core(CoreError::InvalidCredentials)
            | AuthError::Core(CoreError::TokenNotFound)
            | AuthError::Core(CoreError::TokenExpired) => StatusCode::UNAUTHORIZED,
            AuthError::Core(_) | AuthError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AuthError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AuthError::MalformedBody(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        use tasklane_core::auth::AuthError as CoreError;

        let status = self.status();
        let body = match &self {
            AuthError::Core(CoreError::InvalidCredentials) => {
                json!({ "message": "Invalid credentials" })
            }
            AuthError::Core(CoreError::TokenNotFound | CoreError::TokenExpired) => {
                json!({ "message": "Unauthenticated." })
            }
            AuthError::Validation(errors) => json!({
                "message": errors.summary(),
                "errors": errors.errors(),
            }),
            AuthError::MalformedBody(message) => json!({ "message": message }),
            AuthError::Core(_) | AuthError::Repository(_) => {
                tracing::error!(error = %self, "auth request failed");
                json!({ "message": "Server Error" })
            }
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use tasklane_core::auth::AuthError as CoreError;

    async fn body_json(err: AuthError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_invalid_credentials_response() {
        let (status, body) = body_json(CoreError::InvalidCredentials.into()).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Invalid credentials");
    }

    #[tokio::test]
    async fn test_expired_token_response() {
        let (status, body) = body_json(CoreError::TokenExpired.into()).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Unauthenticated.");
    }

    #[tokio::test]
    async fn test_validation_response() {
        let errors = ValidationErrors::single("email", "The email has already been taken.");
        let (status, body) = body_json(errors.into()).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["message"], "The email has already been taken.");
        assert_eq!(body["errors"]["email"][0], "The email has already been taken.");
    }

    #[tokio::test]
    async fn test_storage_failure_is_opaque() {
        let (status, body) =
            body_json(CoreError::Storage("disk I/O error".to_string()).into()).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "Server Error");
    }
}
