use std::time::Duration;

use async_trait::async_trait;

use super::Result;

/// Byte-oriented key/value cache.
///
/// Implementations must keep a per-user tracking set of the keys they store
/// under `tasks:{user_id}:` so that [`Cache::delete_pattern`] can remove a
/// user's list pages without scanning the keyspace.
#[async_trait]
pub trait Cache: Send + Sync {
    /// Gets a value by key. Expired entries read as `None`.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Sets a value with an optional TTL.
    async fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> Result<()>;

    /// Deletes a value by key. Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<()>;

    /// Deletes all values matching a glob pattern (e.g. `tasks:{id}:list:*`).
    async fn delete_pattern(&self, pattern: &str) -> Result<()>;
}
