//! Credential and token service.
//!
//! Every function takes the [`AuthState`] explicitly; handlers and the
//! [`CurrentUser`](crate::CurrentUser) extractor are thin wrappers around
//! these.

use chrono::Utc;
use tasklane_core::auth::{
    is_token_expired, issue_token, validate_login, validate_registration, AccessToken,
    AuthError as CoreError, LoginRequest, RegisterRequest, TokenValue, EMAIL_TAKEN,
};
use tasklane_core::storage::RepositoryError;
use tasklane_core::user::User;
use tasklane_core::validation::ValidationErrors;
use uuid::Uuid;

use crate::error::AuthError;
use crate::password::{hash_password, verify_password};
use crate::state::AuthState;

fn email_taken() -> AuthError {
    ValidationErrors::single("email", EMAIL_TAKEN).into()
}

async fn issue(state: &AuthState, user_id: Uuid) -> Result<AccessToken, AuthError> {
    let token = issue_token(user_id, Utc::now(), state.config.token_ttl);
    state.tokens.create_token(&token).await?;
    Ok(token)
}

/// Creates an account and issues its first token.
pub async fn register(
    state: &AuthState,
    request: RegisterRequest,
) -> Result<(User, AccessToken), AuthError> {
    let registration = validate_registration(request)?;

    if state
        .users
        .get_user_by_email(&registration.email)
        .await?
        .is_some()
    {
        return Err(email_taken());
    }

    let password_hash = hash_password(registration.password).await?;
    let user = User::new(registration.name, registration.email, password_hash);

    match state.users.create_user(&user).await {
        Ok(()) => {}
        // Lost a race with a concurrent registration for the same email.
        Err(RepositoryError::AlreadyExists { .. }) => return Err(email_taken()),
        Err(e) => return Err(e.into()),
    }

    let token = issue(state, user.id).await?;
    tracing::info!(user_id = %user.id, "user registered");

    Ok((user, token))
}

/// Verifies credentials and issues an additional token. Existing tokens stay valid.
pub async fn login(
    state: &AuthState,
    request: LoginRequest,
) -> Result<(User, AccessToken), AuthError> {
    let credentials = validate_login(request)?;

    let Some(user) = state.users.get_user_by_email(&credentials.email).await? else {
        tracing::debug!("login for unknown email");
        return Err(CoreError::InvalidCredentials.into());
    };

    if !verify_password(credentials.password, user.password_hash.clone()).await? {
        tracing::debug!(user_id = %user.id, "login with wrong password");
        return Err(CoreError::InvalidCredentials.into());
    }

    let token = issue(state, user.id).await?;
    Ok((user, token))
}

/// Revokes every token of `user_id`.
pub async fn logout(state: &AuthState, user_id: Uuid) -> Result<(), AuthError> {
    state.tokens.delete_user_tokens(user_id).await?;
    tracing::debug!(user_id = %user_id, "tokens revoked");
    Ok(())
}

/// Revokes every token of `user_id` and issues exactly one new one.
pub async fn refresh(state: &AuthState, user_id: Uuid) -> Result<AccessToken, AuthError> {
    state.tokens.delete_user_tokens(user_id).await?;
    issue(state, user_id).await
}

/// Resolves a presented bearer token to its user.
///
/// Unknown, revoked and expired tokens all fail with an unauthenticated
/// error, as does a token whose user no longer exists.
pub async fn authenticate(state: &AuthState, value: &TokenValue) -> Result<User, AuthError> {
    let token = state
        .tokens
        .get_token(value)
        .await?
        .ok_or(CoreError::TokenNotFound)?;

    if is_token_expired(&token, Utc::now()) {
        return Err(CoreError::TokenExpired.into());
    }

    let user = state
        .users
        .get_user(token.user_id)
        .await?
        .ok_or(CoreError::TokenNotFound)?;

    Ok(user)
}
