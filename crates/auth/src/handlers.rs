//! HTTP handlers for auth routes.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tasklane_core::auth::{AccessToken, LoginRequest, RegisterRequest, TokenValue};
use tasklane_core::user::User;

use crate::error::{json_data_errors, AuthError};
use crate::extractors::CurrentUser;
use crate::service;
use crate::AuthState;

const TOKEN_TYPE: &str = "Bearer";

/// Body returned by register and login.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub message: &'static str,
    pub user: User,
    pub access_token: TokenValue,
    pub expires_at: DateTime<Utc>,
    pub token_type: &'static str,
}

impl SessionResponse {
    fn new(message: &'static str, user: User, token: AccessToken) -> Self {
        Self {
            message,
            user,
            access_token: token.token,
            expires_at: token.expires_at,
            token_type: TOKEN_TYPE,
        }
    }
}

/// Body returned by refresh.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: TokenValue,
    pub token_type: &'static str,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

/// Unwraps a JSON body. Wrong-typed fields are validation errors; anything
/// that is not JSON at all is a malformed body.
fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AuthError> {
    payload.map(|Json(body)| body).map_err(|e| match e {
        JsonRejection::JsonDataError(e) => AuthError::Validation(json_data_errors(&e)),
        e => AuthError::MalformedBody(format!("Failed to parse request body: {e}")),
    })
}

/// Creates the auth router.
///
/// Routes:
/// - `POST /register` - Create an account and issue a token
/// - `POST /login` - Issue a token for valid credentials
/// - `POST /logout` - Revoke all tokens of the current user
/// - `POST /refresh-token` - Replace all tokens of the current user with a new one
pub fn auth_routes() -> Router<AuthState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/refresh-token", post(refresh_token))
}

pub async fn register(
    State(state): State<AuthState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<SessionResponse>), AuthError> {
    let (user, token) = service::register(&state, body(payload)?).await?;
    Ok((
        StatusCode::CREATED,
        Json(SessionResponse::new("User registered successfully", user, token)),
    ))
}

pub async fn login(
    State(state): State<AuthState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<SessionResponse>, AuthError> {
    let (user, token) = service::login(&state, body(payload)?).await?;
    Ok(Json(SessionResponse::new("Login successful", user, token)))
}

pub async fn logout(
    CurrentUser(user): CurrentUser,
    State(state): State<AuthState>,
) -> Result<Json<MessageResponse>, AuthError> {
    service::logout(&state, user.id).await?;
    Ok(Json(MessageResponse {
        message: "Logged out successfully",
    }))
}

pub async fn refresh_token(
    CurrentUser(user): CurrentUser,
    State(state): State<AuthState>,
) -> Result<Json<TokenResponse>, AuthError> {
    let token = service::refresh(&state, user.id).await?;
    Ok(Json(TokenResponse {
        access_token: token.token,
        token_type: TOKEN_TYPE,
        expires_at: token.expires_at,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request};
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::service::tests::test_state;

    fn app(state: AuthState) -> Router {
        auth_routes().with_state(state)
    }

    fn post_json(uri: &str, body: Value, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    async fn send(state: &AuthState, request: Request<Body>) -> (StatusCode, Value) {
        let response = app(state.clone()).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    async fn register_ada(state: &AuthState) -> String {
        let (status, body) = send(
            state,
            post_json(
                "/register",
                json!({"name": "Ada", "email": "ada@example.com", "password": "secret1"}),
                None,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        body["access_token"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_register_response_shape() {
        let state = test_state();
        let (status, body) = send(
            &state,
            post_json(
                "/register",
                json!({"name": "Ada", "email": "ada@example.com", "password": "secret1"}),
                None,
            ),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["message"], "User registered successfully");
        assert_eq!(body["token_type"], "Bearer");
        assert_eq!(body["user"]["email"], "ada@example.com");
        assert!(body["user"].get("password_hash").is_none());
        assert_eq!(body["access_token"].as_str().unwrap().len(), 40);
        assert!(body["expires_at"].is_string());
    }

    #[tokio::test]
    async fn test_register_validation_errors() {
        let state = test_state();
        let (status, body) = send(
            &state,
            post_json("/register", json!({"email": "nope", "password": "123"}), None),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["errors"]["name"].is_array());
        assert!(body["errors"]["email"].is_array());
        assert!(body["errors"]["password"].is_array());
    }

    #[tokio::test]
    async fn test_login_invalid_credentials() {
        let state = test_state();
        register_ada(&state).await;

        let (status, body) = send(
            &state,
            post_json(
                "/login",
                json!({"email": "ada@example.com", "password": "wrong!"}),
                None,
            ),
        )
        .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, json!({"message": "Invalid credentials"}));
    }

    #[tokio::test]
    async fn test_login_success() {
        let state = test_state();
        register_ada(&state).await;

        let (status, body) = send(
            &state,
            post_json(
                "/login",
                json!({"email": "Ada@Example.com", "password": "secret1"}),
                None,
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Login successful");
        assert_eq!(body["user"]["name"], "Ada");
    }

    #[tokio::test]
    async fn test_logout_then_token_is_rejected() {
        let state = test_state();
        let token = register_ada(&state).await;

        let (status, body) = send(&state, post_json("/logout", json!({}), Some(&token))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Logged out successfully");

        let (status, body) = send(&state, post_json("/logout", json!({}), Some(&token))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Unauthenticated.");
    }

    #[tokio::test]
    async fn test_refresh_rotates_token() {
        let state = test_state();
        let old = register_ada(&state).await;

        let (status, body) =
            send(&state, post_json("/refresh-token", json!({}), Some(&old))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["token_type"], "Bearer");
        let new = body["access_token"].as_str().unwrap().to_string();

        let (status, _) = send(&state, post_json("/refresh-token", json!({}), Some(&old))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = send(&state, post_json("/logout", json!({}), Some(&new))).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_missing_token_is_unauthenticated() {
        let state = test_state();
        let (status, _) = send(&state, post_json("/logout", json!({}), None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let state = test_state();
        let request = Request::builder()
            .method("POST")
            .uri("/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();

        let (status, _) = send(&state, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_wrong_typed_field_is_unprocessable() {
        let state = test_state();

        let (status, body) = send(
            &state,
            post_json(
                "/register",
                json!({"name": "Ada", "email": "ada@example.com", "password": 123456}),
                None,
            ),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            body["errors"]["password"][0],
            "The password field must be a string."
        );
        assert_eq!(body["message"], "The password field must be a string.");

        let (status, body) = send(
            &state,
            post_json("/login", json!({"email": 7, "password": "secret1"}), None),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["errors"]["email"].is_array());
    }
}
