use chrono::{DateTime, Duration, Utc};
use rand::{distr::Alphanumeric, Rng};
use uuid::Uuid;

use super::{AccessToken, TokenValue};

/// Length of a generated bearer token.
pub const TOKEN_LENGTH: usize = 40;

/// Generate a cryptographically random token value.
pub fn generate_token() -> TokenValue {
    let value: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LENGTH)
        .map(char::from)
        .collect();
    TokenValue::new(value)
}

/// Issue a fresh token for `user_id`, valid for `ttl` from `now`.
pub fn issue_token(user_id: Uuid, now: DateTime<Utc>, ttl: Duration) -> AccessToken {
    AccessToken {
        token: generate_token(),
        user_id,
        created_at: now,
        expires_at: calculate_expiry(now, ttl),
    }
}

/// Check if a token has expired. A token is dead at its expiry instant.
pub fn is_token_expired(token: &AccessToken, now: DateTime<Utc>) -> bool {
    token.expires_at <= now
}

/// Calculate token expiry from creation time and TTL.
///
/// Saturates at the latest representable instant instead of overflowing.
pub fn calculate_expiry(created_at: DateTime<Utc>, ttl: Duration) -> DateTime<Utc> {
    created_at
        .checked_add_signed(ttl)
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Canonical form of an email address used for storage and lookup.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
