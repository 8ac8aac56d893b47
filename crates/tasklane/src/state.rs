//! Application state and backend wiring.
//!
//! Backends are picked at compile time via feature flags; the handlers only
//! ever see trait objects.

use std::{sync::Arc, time::Duration};

use chrono::Utc;
use tokio::{sync::broadcast, task::JoinHandle};

use tasklane_auth::{AuthConfig, AuthState};
use tasklane_core::auth::TokenRepository;
use tasklane_core::storage::TaskRepository;

use crate::{accessor::TaskAccessor, config::Config, storage::CachedTaskRepository};

// ============================================================================
// Compile-time feature validation
// ============================================================================

#[cfg(all(feature = "auth-sqlite", feature = "auth-redis"))]
compile_error!("Cannot enable both 'auth-sqlite' and 'auth-redis' token store features");

#[cfg(feature = "inmemory")]
type Storage = crate::storage::InMemoryRepository;

#[cfg(feature = "sqlite")]
type Storage = crate::storage::SqliteRepository;

#[cfg(feature = "memory")]
type CacheBackend = crate::cache::MemoryCache;

#[cfg(feature = "redis")]
type CacheBackend = crate::cache::RedisCache;

/// Shared application state, cloned into every handler.
#[derive(Clone)]
pub struct AppState {
    /// Ownership-scoped task access (cached unless disabled).
    pub tasks: TaskAccessor,
    /// Token and user stores used by the auth routes and `CurrentUser`.
    pub auth: AuthState,
    /// Shutdown signal for background tasks.
    pub shutdown_tx: broadcast::Sender<()>,
    /// Memory cache handle kept for the sweeper; `None` when the cache is off.
    #[cfg(feature = "memory")]
    memory_cache: Option<Arc<crate::cache::MemoryCache>>,
    sweep_interval: Duration,
}

impl AsRef<AuthState> for AppState {
    fn as_ref(&self) -> &AuthState {
        &self.auth
    }
}

#[cfg(feature = "inmemory")]
async fn open_storage(_config: &Config) -> anyhow::Result<Arc<Storage>> {
    Ok(Arc::new(crate::storage::InMemoryRepository::new()))
}

#[cfg(feature = "sqlite")]
async fn open_storage(config: &Config) -> anyhow::Result<Arc<Storage>> {
    let repo = crate::storage::SqliteRepository::new(&config.sqlite_path).await?;
    Ok(Arc::new(repo))
}

#[cfg(feature = "memory")]
async fn open_cache(config: &Config) -> anyhow::Result<Arc<CacheBackend>> {
    Ok(Arc::new(crate::cache::MemoryCache::new(
        config.cache_max_entries,
    )))
}

#[cfg(feature = "redis")]
async fn open_cache(config: &Config) -> anyhow::Result<Arc<CacheBackend>> {
    Ok(Arc::new(crate::cache::RedisCache::new(&config.redis_url).await?))
}

#[cfg(not(any(feature = "auth-sqlite", feature = "auth-redis")))]
async fn open_token_store(_config: &Config) -> anyhow::Result<Arc<dyn TokenRepository>> {
    Ok(Arc::new(tasklane_auth::InMemoryTokenStore::new()))
}

#[cfg(feature = "auth-sqlite")]
async fn open_token_store(config: &Config) -> anyhow::Result<Arc<dyn TokenRepository>> {
    let url = format!("sqlite://{}?mode=rwc", config.sqlite_path);
    Ok(Arc::new(tasklane_auth::SqliteTokenStore::connect(&url).await?))
}

#[cfg(feature = "auth-redis")]
async fn open_token_store(config: &Config) -> anyhow::Result<Arc<dyn TokenRepository>> {
    const POOL_SIZE: usize = 4;
    Ok(Arc::new(
        tasklane_auth::RedisTokenStore::connect(&config.redis_url, POOL_SIZE).await?,
    ))
}

impl AppState {
    /// Opens every backend selected by the enabled features.
    pub async fn new(config: &Config, auth_config: AuthConfig) -> anyhow::Result<Self> {
        let storage = open_storage(config).await?;
        let tokens = open_token_store(config).await?;

        let mut cache: Option<Arc<CacheBackend>> = None;
        let tasks: Arc<dyn TaskRepository> = if config.cache_enabled {
            let backend = open_cache(config).await?;
            cache = Some(backend.clone());
            Arc::new(CachedTaskRepository::new(
                storage.clone(),
                backend,
                config.cache_ttl(),
            ))
        } else {
            tracing::info!("Task cache disabled");
            storage.clone()
        };

        #[cfg(not(feature = "memory"))]
        let _ = cache;

        let (shutdown_tx, _) = broadcast::channel(1);

        Ok(Self {
            tasks: TaskAccessor::new(tasks),
            auth: AuthState::new(tokens, storage, auth_config),
            shutdown_tx,
            #[cfg(feature = "memory")]
            memory_cache: cache,
            sweep_interval: config.cache_sweep_interval(),
        })
    }

    /// Spawns the background task that drops expired cache entries and
    /// tokens. It stops when [`AppState::signal_shutdown`] is called.
    pub fn spawn_sweeper(&self) -> JoinHandle<()> {
        let state = self.clone();
        let mut shutdown_rx = self.subscribe_shutdown();

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(state.sweep_interval);
            // The first tick completes immediately.
            interval.tick().await;

            loop {
                tokio::select! {
                    _ = interval.tick() => state.sweep().await,
                    _ = shutdown_rx.recv() => {
                        tracing::debug!("Sweeper shutting down");
                        break;
                    }
                }
            }
        })
    }

    /// Runs one sweep.
    pub async fn sweep(&self) {
        #[cfg(feature = "memory")]
        if let Some(cache) = &self.memory_cache {
            let purged = cache.purge_expired().await;
            if purged > 0 {
                tracing::debug!(purged, "Purged expired cache entries");
            }
        }

        match self.auth.tokens.purge_expired(Utc::now()).await {
            Ok(0) => {}
            Ok(purged) => tracing::debug!(purged, "Purged expired tokens"),
            Err(err) => tracing::warn!(error = %err, "Failed to purge expired tokens"),
        }
    }

    /// Subscribe to shutdown signal.
    pub fn subscribe_shutdown(&self) -> broadcast::Receiver<()> {
        self.shutdown_tx.subscribe()
    }

    /// Signal background tasks to shut down.
    pub fn signal_shutdown(&self) {
        let _ = self.shutdown_tx.send(());
    }
}
