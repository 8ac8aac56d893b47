//! In-memory cache with LRU eviction and lazy TTL expiry.
//!
//! Keys under `tasks:{user_id}:` are tracked per user so that deleting a
//! user's list pages touches only that user's keys. Expired entries are
//! dropped when read and by [`MemoryCache::purge_expired`], which the server
//! runs periodically.

use std::collections::{HashMap, HashSet};
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use lru::LruCache;
use tokio::sync::RwLock;
use uuid::Uuid;

use tasklane_core::cache::{
    extract_user_id_from_key, extract_user_id_from_pattern, is_tracked_key, pattern_matches,
    Cache, Result,
};

#[derive(Debug, Clone)]
struct CacheEntry {
    value: Vec<u8>,
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn new(value: Vec<u8>, ttl: Option<Duration>) -> Self {
        let expires_at = ttl.map(|d| Instant::now() + d);
        Self { value, expires_at }
    }

    fn is_expired_at(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|exp| now >= exp)
    }
}

type Tracking = HashMap<Uuid, HashSet<String>>;

fn track(tracking: &mut Tracking, key: &str) {
    if !is_tracked_key(key) {
        return;
    }
    if let Some(user_id) = extract_user_id_from_key(key) {
        tracking.entry(user_id).or_default().insert(key.to_string());
    }
}

fn untrack(tracking: &mut Tracking, key: &str) {
    let Some(user_id) = extract_user_id_from_key(key) else {
        return;
    };
    if let Some(keys) = tracking.get_mut(&user_id) {
        keys.remove(key);
        if keys.is_empty() {
            tracking.remove(&user_id);
        }
    }
}

/// Thread-safe LRU cache shared behind `Arc<RwLock<_>>`.
///
/// Lock order is always `store` then `tracking`.
#[derive(Debug, Clone)]
pub struct MemoryCache {
    store: Arc<RwLock<LruCache<String, CacheEntry>>>,
    /// user_id -> keys currently stored for that user.
    tracking: Arc<RwLock<Tracking>>,
}

impl MemoryCache {
    /// Creates a cache holding at most `max_entries` values. A capacity of
    /// zero is raised to one.
    pub fn new(max_entries: usize) -> Self {
        let capacity = NonZeroUsize::new(max_entries).unwrap_or(NonZeroUsize::MIN);
        Self {
            store: Arc::new(RwLock::new(LruCache::new(capacity))),
            tracking: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Drops every expired entry. Returns how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut store = self.store.write().await;

        let expired: Vec<String> = store
            .iter()
            .filter(|(_, entry)| entry.is_expired_at(now))
            .map(|(key, _)| key.clone())
            .collect();

        if expired.is_empty() {
            return 0;
        }

        let mut tracking = self.tracking.write().await;
        for key in &expired {
            store.pop(key);
            untrack(&mut tracking, key);
        }

        expired.len()
    }

    /// Number of live and not-yet-purged entries.
    pub async fn len(&self) -> usize {
        self.store.read().await.len()
    }

    /// Number of keys tracked for `user_id`.
    pub async fn tracked_count(&self, user_id: Uuid) -> usize {
        self.tracking
            .read()
            .await
            .get(&user_id)
            .map_or(0, HashSet::len)
    }
}

#[async_trait]
impl Cache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut store = self.store.write().await;

        let expired = match store.get(key) {
            None => return Ok(None),
            Some(entry) if !entry.is_expired_at(Instant::now()) => {
                return Ok(Some(entry.value.clone()))
            }
            Some(_) => true,
        };

        if expired {
            store.pop(key);
            untrack(&mut *self.tracking.write().await, key);
        }
        Ok(None)
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> Result<()> {
        let mut store = self.store.write().await;
        let evicted = store.push(key.to_string(), CacheEntry::new(value.to_vec(), ttl));

        let mut tracking = self.tracking.write().await;
        if let Some((evicted_key, _)) = evicted {
            if evicted_key != key {
                untrack(&mut tracking, &evicted_key);
            }
        }
        track(&mut tracking, key);

        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut store = self.store.write().await;
        store.pop(key);
        untrack(&mut *self.tracking.write().await, key);
        Ok(())
    }

    async fn delete_pattern(&self, pattern: &str) -> Result<()> {
        let mut store = self.store.write().await;
        let mut tracking = self.tracking.write().await;

        let Some(user_id) = extract_user_id_from_pattern(pattern) else {
            // Not scoped to a user: fall back to a full pass over the store.
            let matching: Vec<String> = store
                .iter()
                .filter(|(key, _)| pattern_matches(pattern, key))
                .map(|(key, _)| key.clone())
                .collect();
            for key in matching {
                store.pop(&key);
                untrack(&mut tracking, &key);
            }
            return Ok(());
        };

        let Some(keys) = tracking.get_mut(&user_id) else {
            return Ok(());
        };

        keys.retain(|key| {
            if pattern_matches(pattern, key) {
                store.pop(key);
                false
            } else {
                true
            }
        });
        if keys.is_empty() {
            tracking.remove(&user_id);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tasklane_core::cache::{task_key, task_list_key, task_list_pattern};

    const TEST_MAX_ENTRIES: usize = 1000;

    #[tokio::test]
    async fn test_set_and_get() {
        let cache = MemoryCache::new(TEST_MAX_ENTRIES);

        cache.set("some:key", b"value", None).await.unwrap();

        assert_eq!(cache.get("some:key").await.unwrap(), Some(b"value".to_vec()));
        assert_eq!(cache.get("missing:key").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_delete() {
        let cache = MemoryCache::new(TEST_MAX_ENTRIES);
        let user = Uuid::new_v4();
        let key = task_key(user, Uuid::new_v4());

        cache.set(&key, b"task", None).await.unwrap();
        assert_eq!(cache.tracked_count(user).await, 1);

        cache.delete(&key).await.unwrap();

        assert!(cache.get(&key).await.unwrap().is_none());
        assert_eq!(cache.tracked_count(user).await, 0);
        // Deleting again is fine.
        cache.delete(&key).await.unwrap();
    }

    #[tokio::test]
    async fn test_ttl_expiration() {
        let cache = MemoryCache::new(TEST_MAX_ENTRIES);
        let user = Uuid::new_v4();
        let key = task_list_key(user, "page=1");

        cache
            .set(&key, b"page", Some(Duration::from_millis(50)))
            .await
            .unwrap();
        assert!(cache.get(&key).await.unwrap().is_some());

        tokio::time::sleep(Duration::from_millis(100)).await;

        assert!(cache.get(&key).await.unwrap().is_none());
        assert_eq!(cache.len().await, 0);
        assert_eq!(cache.tracked_count(user).await, 0);
    }

    #[tokio::test]
    async fn test_no_ttl_never_expires() {
        let cache = MemoryCache::new(TEST_MAX_ENTRIES);

        cache.set("forever", b"value", None).await.unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;

        assert!(cache.get("forever").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_purge_expired() {
        let cache = MemoryCache::new(TEST_MAX_ENTRIES);
        let user = Uuid::new_v4();

        cache
            .set(&task_list_key(user, "page=1"), b"a", Some(Duration::from_millis(20)))
            .await
            .unwrap();
        cache
            .set(&task_list_key(user, "page=2"), b"b", Some(Duration::from_secs(60)))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(cache.purge_expired().await, 1);
        assert_eq!(cache.len().await, 1);
        assert_eq!(cache.tracked_count(user).await, 1);
    }

    #[tokio::test]
    async fn test_delete_pattern_clears_every_page_of_one_user() {
        let cache = MemoryCache::new(TEST_MAX_ENTRIES);
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        let alice_task = task_key(alice, Uuid::new_v4());

        for page in 1..=3 {
            let fingerprint = format!("page={page}");
            cache.set(&task_list_key(alice, &fingerprint), b"a", None).await.unwrap();
            cache.set(&task_list_key(bob, &fingerprint), b"b", None).await.unwrap();
        }
        cache.set(&alice_task, b"task", None).await.unwrap();

        cache.delete_pattern(&task_list_pattern(alice)).await.unwrap();

        for page in 1..=3 {
            let fingerprint = format!("page={page}");
            assert!(cache.get(&task_list_key(alice, &fingerprint)).await.unwrap().is_none());
            assert!(cache.get(&task_list_key(bob, &fingerprint)).await.unwrap().is_some());
        }
        // Item keys are not list pages.
        assert!(cache.get(&alice_task).await.unwrap().is_some());
        assert_eq!(cache.tracked_count(alice).await, 1);
        assert_eq!(cache.tracked_count(bob).await, 3);
    }

    #[tokio::test]
    async fn test_delete_pattern_no_matches() {
        let cache = MemoryCache::new(TEST_MAX_ENTRIES);

        cache
            .delete_pattern(&task_list_pattern(Uuid::new_v4()))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_delete_pattern_without_user_falls_back_to_scan() {
        let cache = MemoryCache::new(TEST_MAX_ENTRIES);

        cache.set("misc:1", b"1", None).await.unwrap();
        cache.set("misc:2", b"2", None).await.unwrap();
        cache.set("other:1", b"3", None).await.unwrap();

        cache.delete_pattern("misc:*").await.unwrap();

        assert!(cache.get("misc:1").await.unwrap().is_none());
        assert!(cache.get("misc:2").await.unwrap().is_none());
        assert!(cache.get("other:1").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_overwrite_value() {
        let cache = MemoryCache::new(TEST_MAX_ENTRIES);
        let user = Uuid::new_v4();
        let key = task_list_key(user, "page=1");

        cache.set(&key, b"old", None).await.unwrap();
        cache.set(&key, b"new", None).await.unwrap();

        assert_eq!(cache.get(&key).await.unwrap(), Some(b"new".to_vec()));
        assert_eq!(cache.tracked_count(user).await, 1);
    }

    #[tokio::test]
    async fn test_lru_eviction() {
        let cache = MemoryCache::new(2);
        let user = Uuid::new_v4();
        let first = task_list_key(user, "page=1");
        let second = task_list_key(user, "page=2");
        let third = task_list_key(user, "page=3");

        cache.set(&first, b"1", None).await.unwrap();
        cache.set(&second, b"2", None).await.unwrap();
        // Touch `first` so `second` becomes least recently used.
        cache.get(&first).await.unwrap();
        cache.set(&third, b"3", None).await.unwrap();

        assert!(cache.get(&first).await.unwrap().is_some());
        assert!(cache.get(&second).await.unwrap().is_none());
        assert!(cache.get(&third).await.unwrap().is_some());
        assert_eq!(cache.tracked_count(user).await, 2);
    }

    #[tokio::test]
    async fn test_zero_capacity_is_raised_to_one() {
        let cache = MemoryCache::new(0);

        cache.set("a", b"1", None).await.unwrap();
        cache.set("b", b"2", None).await.unwrap();

        assert_eq!(cache.len().await, 1);
        assert!(cache.get("b").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_clone_shares_state() {
        let cache = MemoryCache::new(TEST_MAX_ENTRIES);
        let clone = cache.clone();

        cache.set("shared", b"value", None).await.unwrap();

        assert!(clone.get("shared").await.unwrap().is_some());
    }
}
