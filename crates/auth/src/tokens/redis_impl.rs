//! Redis token storage implementation.
//!
//! Each token lives under its own key with a native expiry, so Redis drops
//! expired tokens on its own. A per-user set tracks token values for
//! revocation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fred::prelude::*;
use uuid::Uuid;

use tasklane_core::auth::{AccessToken, AuthError, Result, TokenRepository, TokenValue};

/// Redis-backed token storage.
pub struct RedisTokenStore {
    pool: Pool,
}

fn storage_error(e: fred::error::Error) -> AuthError {
    AuthError::Storage(e.to_string())
}

impl RedisTokenStore {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    /// Builds a pool for `url`, connects it and waits until it is ready.
    pub async fn connect(url: &str, pool_size: usize) -> Result<Self> {
        let config = Config::from_url(url).map_err(storage_error)?;
        let pool = Builder::from_config(config)
            .build_pool(pool_size)
            .map_err(storage_error)?;
        pool.init().await.map_err(storage_error)?;
        Ok(Self::new(pool))
    }

    fn token_key(value: &TokenValue) -> String {
        format!("access_token:{}", value)
    }

    fn user_tokens_key(user_id: Uuid) -> String {
        format!("user_tokens:{}", user_id)
    }
}

#[async_trait]
impl TokenRepository for RedisTokenStore {
    async fn create_token(&self, token: &AccessToken) -> Result<()> {
        let key = Self::token_key(&token.token);
        let value = serde_json::to_string(token).map_err(|e| AuthError::Storage(e.to_string()))?;

        // Already-expired tokens are not worth storing.
        let ttl_secs = (token.expires_at - Utc::now()).num_seconds();
        if ttl_secs <= 0 {
            return Ok(());
        }

        self.pool
            .set::<(), _, _>(&key, &value, Some(Expiration::EX(ttl_secs)), None, false)
            .await
            .map_err(storage_error)?;

        let user_key = Self::user_tokens_key(token.user_id);
        self.pool
            .sadd::<(), _, _>(&user_key, token.token.as_str())
            .await
            .map_err(storage_error)?;

        // The set lives as long as its longest-lived token. -1 means no TTL yet.
        let set_ttl: i64 = self.pool.ttl(&user_key).await.map_err(storage_error)?;
        if set_ttl < ttl_secs {
            self.pool
                .expire::<(), _>(&user_key, ttl_secs, None)
                .await
                .map_err(storage_error)?;
        }

        Ok(())
    }

    async fn get_token(&self, value: &TokenValue) -> Result<Option<AccessToken>> {
        let json: Option<String> = self
            .pool
            .get(Self::token_key(value))
            .await
            .map_err(storage_error)?;

        json.map(|json| serde_json::from_str(&json).map_err(|e| AuthError::Storage(e.to_string())))
            .transpose()
    }

    async fn delete_user_tokens(&self, user_id: Uuid) -> Result<()> {
        let user_key = Self::user_tokens_key(user_id);

        let values: Vec<String> = self
            .pool
            .smembers(&user_key)
            .await
            .map_err(storage_error)?;

        for value in &values {
            self.pool
                .del::<(), _>(format!("access_token:{}", value))
                .await
                .map_err(storage_error)?;
        }

        self.pool
            .del::<(), _>(&user_key)
            .await
            .map_err(storage_error)?;

        Ok(())
    }

    async fn purge_expired(&self, _now: DateTime<Utc>) -> Result<usize> {
        // Token keys carry their own EX; nothing to sweep.
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use tasklane_core::auth::issue_token;

    async fn store() -> Option<RedisTokenStore> {
        let url =
            std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string());
        RedisTokenStore::connect(&url, 1).await.ok()
    }

    #[tokio::test]
    async fn test_token_lifecycle() {
        let Some(store) = store().await else {
            eprintln!("Skipping test: Redis not available");
            return;
        };
        let user = Uuid::new_v4();
        let token = issue_token(user, Utc::now(), Duration::minutes(5));

        store.create_token(&token).await.unwrap();
        assert_eq!(store.get_token(&token.token).await.unwrap(), Some(token.clone()));

        store.delete_user_tokens(user).await.unwrap();
        assert!(store.get_token(&token.token).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_user_token_set_expires_with_latest_token() {
        let Some(store) = store().await else {
            eprintln!("Skipping test: Redis not available");
            return;
        };
        let user = Uuid::new_v4();
        let key = RedisTokenStore::user_tokens_key(user);

        let long = issue_token(user, Utc::now(), Duration::minutes(10));
        store.create_token(&long).await.unwrap();
        let ttl: i64 = store.pool.ttl(&key).await.unwrap();
        assert!(ttl > 500 && ttl <= 600, "ttl was {ttl}");

        // A shorter-lived token must not shorten the set's lifetime.
        let short = issue_token(user, Utc::now(), Duration::minutes(1));
        store.create_token(&short).await.unwrap();
        let ttl: i64 = store.pool.ttl(&key).await.unwrap();
        assert!(ttl > 500, "ttl was {ttl}");

        store.delete_user_tokens(user).await.unwrap();
    }
}
