use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{AccessToken, AuthError, TokenValue};

/// Result type for auth operations.
pub type Result<T> = std::result::Result<T, AuthError>;

/// Access token storage abstraction.
#[async_trait]
pub trait TokenRepository: Send + Sync {
    /// Store a newly issued token.
    async fn create_token(&self, token: &AccessToken) -> Result<()>;

    /// Retrieve a token by value. Expired tokens may still be returned;
    /// callers check expiry.
    async fn get_token(&self, value: &TokenValue) -> Result<Option<AccessToken>>;

    /// Revoke every token of a user.
    async fn delete_user_tokens(&self, user_id: Uuid) -> Result<()>;

    /// Remove tokens that expired at or before `now`. Returns how many were removed.
    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize>;
}
