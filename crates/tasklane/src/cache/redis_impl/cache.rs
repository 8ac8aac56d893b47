//! Redis cache implementation.
//!
//! Task keys are tracked in a per-user Redis Set (`tasks:{user_id}:_keys`) so
//! that pattern deletion never needs SCAN.
//!
//! The multi-command operations here are not atomic. A crash between commands
//! can leave a stale member in a tracking set; SREM and DEL on missing
//! members are no-ops, so later calls clean up after it.

use std::time::Duration;

use async_trait::async_trait;
use redis::AsyncCommands;

use tasklane_core::cache::{
    extract_user_id_from_key, extract_user_id_from_pattern, is_tracked_key, pattern_matches,
    tracking_key, Cache, Result,
};

use super::error::map_redis_error;

/// Redis cache backend using a connection manager.
pub struct RedisCache {
    conn: redis::aio::ConnectionManager,
}

impl RedisCache {
    /// Connects to Redis at `url` (e.g. `redis://localhost:6379`).
    ///
    /// # Errors
    ///
    /// Returns `CacheError::ConnectionFailed` if the connection cannot be established.
    pub async fn new(url: &str) -> Result<Self> {
        let client = redis::Client::open(url).map_err(map_redis_error)?;
        let conn = redis::aio::ConnectionManager::new(client)
            .await
            .map_err(map_redis_error)?;
        Ok(Self { conn })
    }
}

#[async_trait]
impl Cache for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut conn = self.conn.clone();
        let result: Option<Vec<u8>> = conn.get(key).await.map_err(map_redis_error)?;
        Ok(result)
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> Result<()> {
        let mut conn = self.conn.clone();

        match ttl {
            Some(duration) => {
                let seconds = duration.as_secs().max(1);
                conn.set_ex::<_, _, ()>(key, value, seconds)
                    .await
                    .map_err(map_redis_error)?;
            }
            None => {
                conn.set::<_, _, ()>(key, value)
                    .await
                    .map_err(map_redis_error)?;
            }
        }

        if is_tracked_key(key) {
            if let Some(user_id) = extract_user_id_from_key(key) {
                conn.sadd::<_, _, ()>(tracking_key(user_id), key)
                    .await
                    .map_err(map_redis_error)?;
            }
        }

        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut conn = self.conn.clone();

        if let Some(user_id) = extract_user_id_from_key(key) {
            conn.srem::<_, _, ()>(tracking_key(user_id), key)
                .await
                .map_err(map_redis_error)?;
        }

        conn.del::<_, ()>(key).await.map_err(map_redis_error)?;

        Ok(())
    }

    async fn delete_pattern(&self, pattern: &str) -> Result<()> {
        // Only user-scoped keys are tracked.
        let Some(user_id) = extract_user_id_from_pattern(pattern) else {
            return Ok(());
        };

        let mut conn = self.conn.clone();
        let tracking_key = tracking_key(user_id);

        let tracked_keys: Vec<String> = conn
            .smembers(&tracking_key)
            .await
            .map_err(map_redis_error)?;

        let keys_to_delete: Vec<&String> = tracked_keys
            .iter()
            .filter(|k| pattern_matches(pattern, k))
            .collect();

        if !keys_to_delete.is_empty() {
            conn.del::<_, ()>(&keys_to_delete)
                .await
                .map_err(map_redis_error)?;
            conn.srem::<_, _, ()>(&tracking_key, &keys_to_delete)
                .await
                .map_err(map_redis_error)?;
        }

        Ok(())
    }
}
